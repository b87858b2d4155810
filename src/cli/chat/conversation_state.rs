/// A product as shown in the chat, with its price already formatted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductCard {
    pub name: String,
    pub price: String,
    pub link: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageBody {
    Text(String),
    Product(ProductCard),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub body: MessageBody,
    pub is_user: bool,
}

impl Message {
    pub fn user(text: &str) -> Self {
        Self {
            body: MessageBody::Text(text.to_string()),
            is_user: true,
        }
    }

    pub fn bot(text: &str) -> Self {
        Self {
            body: MessageBody::Text(text.to_string()),
            is_user: false,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match &self.body {
            MessageBody::Text(text) => Some(text),
            MessageBody::Product(_) => None,
        }
    }
}

/// Transcript of the session, in display order.
pub struct ConversationState {
    messages: Vec<Message>,
}

impl ConversationState {
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
        }
    }

    pub fn add_user_message(&mut self, message: &str) {
        self.messages.push(Message::user(message));
    }

    pub fn add_bot_message(&mut self, message: &str) {
        self.messages.push(Message::bot(message));
    }

    pub fn add_message(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn get_messages(&self) -> &[Message] {
        &self.messages
    }

    /// Restart the visible conversation at the given question.
    pub fn reseed(&mut self, question: &str) {
        self.messages.clear();
        self.add_bot_message(question);
    }
}
