use std::time::Duration;

use color_print::cformat;
use futures::stream::{self, BoxStream, StreamExt};
use regex::Regex;
use url::Url;

use super::conversation_state::{Message, MessageBody, ProductCard};
use crate::scrape_client::{Price, Product};

pub const SEARCHING_TEXT: &str = "Searching for products...";
pub const NO_PRODUCTS_TEXT: &str = "No products found for your query.";
pub const REVEAL_DELAY: Duration = Duration::from_millis(1500);

/// What to show for a finished query.
pub enum Reveal {
    /// Nothing matched; a single notice to show right away.
    NoResults(Message),
    /// One message per product, each emitted after the reveal delay.
    Products(BoxStream<'static, Message>),
}

/// Turn a result list into a lazy, sequential reveal.
pub fn reveal(products: Vec<Product>, delay: Duration) -> Reveal {
    if products.is_empty() {
        return Reveal::NoResults(Message::bot(NO_PRODUCTS_TEXT));
    }

    let messages = stream::iter(products)
        .then(move |product| async move {
            tokio::time::sleep(delay).await;
            product_message(&product)
        })
        .boxed();

    Reveal::Products(messages)
}

pub fn product_message(product: &Product) -> Message {
    Message {
        body: MessageBody::Product(ProductCard {
            name: product.name.clone(),
            price: format_price(product.price.as_ref()),
            link: product.link.clone(),
        }),
        is_user: false,
    }
}

/// Price as US dollars, or "N/A" when it is not a number.
pub fn format_price(price: Option<&Price>) -> String {
    let amount = match price {
        Some(Price::Number(n)) => Some(*n),
        Some(Price::Text(text)) => parse_float(text),
        None => None,
    };

    match amount {
        Some(n) if n.is_finite() => format_usd(n),
        _ => "N/A".to_string(),
    }
}

/// Parse the leading number of a string, ignoring whatever trails it
/// ("12.50 MXN" is 12.5).
pub fn parse_float(text: &str) -> Option<f64> {
    let re = Regex::new(r"^\s*([+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?)").ok()?;
    let number = re.captures(text)?.get(1)?.as_str();
    number.parse().ok()
}

/// en-US currency formatting: `$1,234.50`, `-$3.00`.
///
/// Rounds half away from zero on the shortest decimal form of `amount`, so
/// `1.005` is `$1.01` and arbitrarily large values keep every digit.
pub fn format_usd(amount: f64) -> String {
    let shortest = format!("{}", amount.abs());
    let (whole, fraction) = shortest.split_once('.').unwrap_or((shortest.as_str(), ""));

    let mut fraction: Vec<u8> = fraction.bytes().collect();
    fraction.resize(fraction.len().max(3), b'0');

    // Digits of the amount in cents, most significant first.
    let mut cents: Vec<u8> = whole.bytes().chain(fraction[..2].iter().copied()).collect();
    if fraction[2] >= b'5' {
        round_up(&mut cents);
    }

    let (dollars, cents) = cents.split_at(cents.len() - 2);
    let dollars = std::str::from_utf8(dollars).unwrap_or("0");
    let cents = std::str::from_utf8(cents).unwrap_or("00");

    let mut grouped = String::with_capacity(dollars.len() + dollars.len() / 3);
    for (i, ch) in dollars.chars().enumerate() {
        if i > 0 && (dollars.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let is_zero = grouped.chars().all(|c| c == '0' || c == ',') && cents == "00";
    let sign = if amount < 0.0 && !is_zero { "-" } else { "" };
    format!("{}${}.{}", sign, grouped, cents)
}

/// Add one to a string of ASCII digits, growing it on overflow.
fn round_up(digits: &mut Vec<u8>) {
    for digit in digits.iter_mut().rev() {
        if *digit == b'9' {
            *digit = b'0';
        } else {
            *digit += 1;
            return;
        }
    }
    digits.insert(0, b'1');
}

/// Terminal rendering of a message.
pub fn render(message: &Message) -> String {
    if message.is_user {
        return cformat!("<blue,bold>tú ></blue,bold> {}", message.text().unwrap_or_default());
    }

    match &message.body {
        MessageBody::Text(text) => cformat!("<cyan>{}</cyan>", text),
        MessageBody::Product(card) => {
            let link = match Url::parse(&card.link) {
                // OSC 8 makes the label clickable in terminals that support it.
                Ok(url) => format!(
                    "\x1b]8;;{}\x1b\\[Link to product]\x1b]8;;\x1b\\ {}",
                    url,
                    cformat!("<dim>{}</dim>", url)
                ),
                Err(_) if card.link.is_empty() => cformat!("<dim>[No link]</dim>"),
                Err(_) => cformat!("[Link to product] <dim>{}</dim>", card.link),
            };
            format!(
                "{}\n{}\n{}",
                cformat!("<bold>{}</bold>", card.name),
                cformat!("Price: <green>{}</green>", card.price),
                link
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use tokio::time::Instant;

    use super::*;

    fn product(name: &str, price: Option<Price>, link: &str) -> Product {
        Product {
            name: name.to_string(),
            price,
            link: link.to_string(),
        }
    }

    fn text(s: &str) -> Option<Price> {
        Some(Price::Text(s.to_string()))
    }

    fn card(message: &Message) -> &ProductCard {
        match &message.body {
            MessageBody::Product(card) => card,
            other => panic!("expected a product card, got {:?}", other),
        }
    }

    #[test]
    fn formats_prices_as_dollars() {
        assert_eq!(format_price(text("9.99").as_ref()), "$9.99");
        assert_eq!(format_price(Some(&Price::Number(1234.5))), "$1,234.50");
        assert_eq!(format_price(Some(&Price::Number(1_000_000.0))), "$1,000,000.00");
        assert_eq!(format_price(text("12.5 MXN").as_ref()), "$12.50");
        assert_eq!(format_price(text(" 0.005").as_ref()), "$0.01");
        assert_eq!(format_price(Some(&Price::Number(-3.0))), "-$3.00");
    }

    #[test]
    fn large_prices_keep_every_digit() {
        assert_eq!(
            format_price(Some(&Price::Number(1e20))),
            "$100,000,000,000,000,000,000.00"
        );
        assert_eq!(format_price(text("123456789012345678901").as_ref()), "$123,456,789,012,345,680,000.00");
    }

    #[test]
    fn halfway_cents_round_up() {
        assert_eq!(format_usd(1.005), "$1.01");
        assert_eq!(format_usd(2.675), "$2.68");
        assert_eq!(format_usd(9.995), "$10.00");
        assert_eq!(format_usd(999.999), "$1,000.00");
        assert_eq!(format_usd(1.004), "$1.00");
        assert_eq!(format_usd(-0.001), "$0.00");
        assert_eq!(format_usd(0.0), "$0.00");
    }

    #[test]
    fn non_numeric_prices_are_not_available() {
        assert_eq!(format_price(text("abc").as_ref()), "N/A");
        assert_eq!(format_price(text("N/A").as_ref()), "N/A");
        assert_eq!(format_price(text("").as_ref()), "N/A");
        assert_eq!(format_price(text("$9.99").as_ref()), "N/A");
        assert_eq!(format_price(None), "N/A");
        assert_eq!(format_price(Some(&Price::Number(f64::NAN))), "N/A");
    }

    #[test]
    fn parse_float_reads_the_leading_number() {
        assert_eq!(parse_float("9.99"), Some(9.99));
        assert_eq!(parse_float("1e3"), Some(1000.0));
        assert_eq!(parse_float(".5"), Some(0.5));
        assert_eq!(parse_float("x1"), None);
    }

    #[tokio::test]
    async fn empty_results_yield_one_notice() {
        match reveal(Vec::new(), REVEAL_DELAY) {
            Reveal::NoResults(message) => assert_eq!(message.text(), Some(NO_PRODUCTS_TEXT)),
            Reveal::Products(_) => panic!("expected the no-results notice"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn products_appear_one_per_delay_in_order() {
        let products = vec![
            product("A", text("9.99"), "http://x"),
            product("B", text("abc"), ""),
        ];
        let Reveal::Products(mut messages) = reveal(products, REVEAL_DELAY) else {
            panic!("expected a product reveal");
        };

        let start = Instant::now();
        assert!(
            tokio::time::timeout(Duration::from_millis(100), messages.next())
                .await
                .is_err(),
            "nothing is shown before the delay"
        );

        let first = messages.next().await.unwrap();
        assert!(start.elapsed() >= REVEAL_DELAY);
        assert_eq!(card(&first).name, "A");
        assert_eq!(card(&first).price, "$9.99");
        assert_eq!(card(&first).link, "http://x");

        let second = messages.next().await.unwrap();
        assert!(start.elapsed() >= REVEAL_DELAY * 2);
        assert_eq!(card(&second).name, "B");
        assert_eq!(card(&second).price, "N/A");

        assert!(messages.next().await.is_none());
    }

    #[test]
    fn render_includes_name_price_and_link() {
        let rendered = render(&product_message(&product("A", text("9.99"), "http://x.com/a")));
        assert!(rendered.contains('A'));
        assert!(rendered.contains("$9.99"));
        assert!(rendered.contains("http://x.com/a"));
        assert!(rendered.contains("[Link to product]"));
    }

    #[test]
    fn render_marks_user_messages() {
        let rendered = render(&Message::user("laptop"));
        assert!(rendered.contains("tú >"));
        assert!(rendered.ends_with("laptop"));
    }
}
