pub mod conversation_state;
pub mod flow_state;
pub mod input_source;
pub mod parse;
pub mod presenter;
pub mod prompt;
pub mod questions;

use std::io::Write;
use std::process::ExitCode;
use std::time::Duration;

use conversation_state::{ConversationState, Message};
use eyre::Result;
use flow_state::{FlowState, FlowStore};
use futures::stream::{BoxStream, StreamExt};
use input_source::TypeAhead;
use parse::parse;
use presenter::{render, reveal, Reveal, SEARCHING_TEXT};
use prompt::generate_prompt;
use questions::question_for;
use rustyline::error::ReadlineError;
use tracing::{debug, error, info, warn};

use crate::scrape_client::ProductSource;

const WELCOME_TEXT: &str = "
Comparador de precios

Answer two quick questions and I'll look up prices for you.

/help         Show the help dialogue
/quit         Quit the application
";

const HELP_TEXT: &str = "
Comparador de precios

Answer each question and press Enter. Reply \"no\" to skip the model.

/reset        Forget the current answers and start over
/history      Show the conversation so far
/help         Show this help dialogue
/quit         Quit the application
";

const BUSY_TEXT: &str = "Still showing results, please wait.";
const RESET_TEXT: &str = "Starting over.";

pub struct ChatContext {
    output: Box<dyn Write>,
    input: Option<String>,
    interactive: bool,
    conversation_state: ConversationState,
    flow: FlowStore,
    source: Box<dyn ProductSource>,
    reveal_delay: Duration,
    pending_reveal: Option<BoxStream<'static, Message>>,
    type_ahead: Box<dyn TypeAhead>,
}

impl ChatContext {
    pub fn new(
        output: Box<dyn Write>,
        input: Option<String>,
        interactive: bool,
        flow: FlowStore,
        source: Box<dyn ProductSource>,
        reveal_delay: Duration,
        type_ahead: Box<dyn TypeAhead>,
    ) -> Self {
        Self {
            output,
            input,
            interactive,
            conversation_state: ConversationState::new(),
            flow,
            source,
            reveal_delay,
            pending_reveal: None,
            type_ahead,
        }
    }

    pub async fn run(&mut self) -> Result<ExitCode> {
        if self.interactive {
            self.print_welcome()?;
        }

        self.start()?;

        // Non-interactive mode answers the current question and exits
        if let Some(input) = self.input.take() {
            self.handle_input(&input).await?;
            return Ok(ExitCode::SUCCESS);
        }

        if self.interactive {
            self.run_interactive().await?;
        }

        Ok(ExitCode::SUCCESS)
    }

    #[cfg(test)]
    pub fn conversation(&self) -> &ConversationState {
        &self.conversation_state
    }

    #[cfg(test)]
    pub fn flow_state(&self) -> &FlowState {
        self.flow.state()
    }

    /// A reveal is armed and has not been driven to completion yet.
    pub fn is_busy(&self) -> bool {
        self.pending_reveal.is_some()
    }

    /// Show the question for the restored flow step.
    pub fn start(&mut self) -> Result<()> {
        if self.flow.state().is_complete() {
            // A finished flow that was never cleared, most likely an
            // interrupted search; begin again.
            warn!("Discarding completed flow state from a previous session");
            self.clear_flow()?;
        }
        let question = question_for(self.flow.state().step).unwrap_or_default();

        debug!("Resuming at step {}", self.flow.state().step);
        self.conversation_state.reseed(question);
        writeln!(self.output, "{}", render(&Message::bot(question)))?;
        Ok(())
    }

    fn print_welcome(&mut self) -> Result<()> {
        writeln!(self.output, "{}", WELCOME_TEXT)?;
        Ok(())
    }

    async fn run_interactive(&mut self) -> Result<()> {
        let mut rl = prompt::rl()?;

        loop {
            let prompt_text = generate_prompt(self.flow.state().step);
            let readline = rl.readline(&prompt_text);

            match readline {
                Ok(line) => {
                    if line.trim().is_empty() {
                        continue;
                    }

                    rl.add_history_entry(line.as_str());

                    if line.trim() == "/quit" {
                        break;
                    }

                    if let Err(e) = self.handle_input(&line).await {
                        writeln!(self.output, "Error: {}", e)?;
                    }
                }
                Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
                Err(e) => {
                    writeln!(self.output, "Error: {}", e)?;
                    break;
                }
            }
        }

        Ok(())
    }

    async fn handle_input(&mut self, input: &str) -> Result<()> {
        match input.trim() {
            "/help" => {
                writeln!(self.output, "{}", HELP_TEXT)?;
            }
            "/reset" => {
                self.reset()?;
            }
            "/history" => {
                for message in self.conversation_state.get_messages() {
                    writeln!(self.output, "{}", render(message))?;
                }
            }
            _ => {
                // The prompt is not shown again until every product is out.
                self.submit(input).await?;
                self.finish_reveal().await?;
            }
        }

        Ok(())
    }

    /// Take one answer from the user.
    ///
    /// Records the answer for the current question and either asks the next
    /// one or runs the search. A search arms the product reveal; call
    /// [`finish_reveal`](Self::finish_reveal) to show it. Answers that arrive
    /// while a reveal is pending are rejected.
    pub async fn submit(&mut self, raw: &str) -> Result<()> {
        if raw.trim().is_empty() {
            return Ok(());
        }

        if self.is_busy() {
            debug!("Rejecting {:?} while results are being shown", raw);
            return self.say(BUSY_TEXT);
        }

        self.conversation_state.add_user_message(raw);

        let mut state = self.flow.state().clone();
        let value = parse(state.step, raw);
        debug!("Step {} answered with {:?}", state.step, value);
        state.record_answer(value);

        if let Err(e) = self.flow.save(state.clone()) {
            error!("Failed to persist flow state: {}", e);
            writeln!(self.output, "Error: {}", e)?;
        }

        if let Some(question) = question_for(state.step) {
            return self.say(question);
        }

        let query = state.query();
        self.say(SEARCHING_TEXT)?;
        info!("Searching for {:?}", query);

        let products = self.source.fetch_products(&query).await;
        info!("Query returned {} product(s)", products.len());
        self.clear_flow()?;

        match reveal(products, self.reveal_delay) {
            Reveal::NoResults(message) => {
                self.show(message)?;
                self.clear_flow()?;
                self.discard_type_ahead()?;
                self.ask_first_question()?;
            }
            Reveal::Products(messages) => {
                self.pending_reveal = Some(messages);
            }
        }

        Ok(())
    }

    /// Show every pending product, one per reveal delay, then start over.
    ///
    /// Lines typed while products are being shown are answered with a
    /// notice and dropped; they never reach the next question.
    pub async fn finish_reveal(&mut self) -> Result<()> {
        loop {
            let next = match self.pending_reveal.as_mut() {
                Some(messages) => messages.next().await,
                None => return Ok(()),
            };

            match next {
                Some(message) => {
                    self.show(message)?;
                    self.discard_type_ahead()?;
                }
                None => break,
            }
        }

        self.pending_reveal = None;
        self.ask_first_question()
    }

    fn discard_type_ahead(&mut self) -> Result<()> {
        for line in self.type_ahead.take_lines() {
            if line.trim().is_empty() {
                continue;
            }
            debug!("Discarding {:?} typed while results were shown", line);
            self.say(BUSY_TEXT)?;
        }
        Ok(())
    }

    /// Drop the answers so far and ask the first question again.
    pub fn reset(&mut self) -> Result<()> {
        self.pending_reveal = None;
        self.clear_flow()?;
        self.say(RESET_TEXT)?;
        self.ask_first_question()
    }

    fn ask_first_question(&mut self) -> Result<()> {
        match question_for(self.flow.state().step) {
            Some(question) => self.say(question),
            None => Ok(()),
        }
    }

    fn clear_flow(&mut self) -> Result<()> {
        if let Err(e) = self.flow.clear() {
            error!("Failed to clear flow state: {}", e);
            writeln!(self.output, "Error: {}", e)?;
        }
        Ok(())
    }

    fn say(&mut self, text: &str) -> Result<()> {
        self.show(Message::bot(text))
    }

    fn show(&mut self, message: Message) -> Result<()> {
        writeln!(self.output, "{}", render(&message))?;
        self.output.flush()?;
        self.conversation_state.add_message(message);
        Ok(())
    }
}
