//! Line-oriented terminal front end.
//!
//! [`Terminal`] draws the controller's current view, reads one answer and
//! turns it into workflow actions. It works over any `BufRead`/`Write`
//! pair, so the whole loop can be driven from a script in tests.

pub mod input;
pub mod render;

use std::io::{BufRead, Write};
use std::ops::ControlFlow;

use tracing::debug;

use crate::error::Result;
use crate::workflow::{Action, CheckoutForm, Controller, Notice, Session, View};

use self::input::Command;

const FORM_FIELDS: [&str; 4] = ["Borrower", "Equipment", "Container", "Note (optional)"];

/// Interactive session over a reader and a writer.
#[derive(Debug)]
pub struct Terminal<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Terminal<R, W> {
    /// Create a terminal over the given streams.
    #[must_use]
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Consume the terminal, returning the writer.
    #[must_use]
    pub fn into_output(self) -> W {
        self.output
    }

    /// Run until the user quits or input ends.
    ///
    /// # Errors
    ///
    /// Returns an error if the streams fail or a store query for a view
    /// fails. Rejected checkouts and returns are shown, not returned.
    pub fn run(&mut self, controller: &mut Controller<'_>) -> Result<()> {
        let mut session = Session::default();

        loop {
            let view = controller.view(&session)?;
            render::screen(
                &mut self.output,
                &view,
                session.notice.as_ref(),
                controller.display(),
            )?;

            let command = match self.read_command(&view)? {
                Some(Command::ChooseContainer) => match self.read_container(&view)? {
                    Some(command) => command,
                    None => break,
                },
                Some(command) => command,
                None => break,
            };

            match command {
                Command::Dispatch(actions) => {
                    for action in actions {
                        session = controller.dispatch(session, action);
                    }
                }
                Command::Quit => break,
                Command::Invalid(message) => {
                    debug!(%message, "Ignoring input");
                    render::notice_line(&mut self.output, &Notice::failure(message))?;
                }
                Command::ChooseContainer => {}
            }
        }

        writeln!(self.output, "Bye.")?;
        self.output.flush()?;
        Ok(())
    }

    /// Read whatever the current screen asks for. `None` means input ended.
    fn read_command(&mut self, view: &View) -> Result<Option<Command>> {
        let command = match view {
            View::Select => self.prompt("Choose")?.map(|l| input::parse_select(&l)),
            View::CheckoutForm { containers, .. } => self.read_form(containers)?,
            View::CheckoutCards {
                available,
                selected,
                ..
            } => self
                .prompt("Cards")?
                .map(|l| input::parse_cards(&l, available, selected)),
            View::Return {
                containers,
                container: None,
                ..
            }
            | View::List {
                containers,
                container: None,
                ..
            } => self
                .prompt("Container")?
                .map(|l| input::parse_container_choice(&l, containers)),
            View::Return { cards, .. } => self
                .prompt("Return")?
                .map(|l| input::parse_return(&l, cards)),
            View::List { .. } => self.prompt("List")?.map(|l| input::parse_list(&l)),
        };
        Ok(command)
    }

    fn read_container(&mut self, view: &View) -> Result<Option<Command>> {
        let containers = match view {
            View::Return { containers, .. } | View::List { containers, .. } => containers,
            _ => return Ok(Some(Command::Invalid("no containers here".to_string()))),
        };
        for (i, container) in containers.iter().enumerate() {
            writeln!(self.output, "  {}) {container}", i + 1)?;
        }
        Ok(self
            .prompt("Container")?
            .map(|l| input::parse_container_choice(&l, containers)))
    }

    fn read_form(&mut self, containers: &[String]) -> Result<Option<Command>> {
        let mut answers: [String; 4] = Default::default();
        for (answer, label) in answers.iter_mut().zip(FORM_FIELDS) {
            match self.field(label)? {
                Some(ControlFlow::Continue(text)) => *answer = text,
                Some(ControlFlow::Break(command)) => return Ok(Some(command)),
                None => return Ok(None),
            }
        }
        let [borrower, equipment, container, note] = answers;

        let form = CheckoutForm {
            borrower,
            equipment,
            container: input::parse_container(&container, containers),
            note,
        };
        Ok(Some(Command::Dispatch(vec![Action::SubmitForm(form)])))
    }

    fn field(&mut self, label: &str) -> Result<Option<ControlFlow<Command, String>>> {
        Ok(self.prompt(label)?.map(|line| match input::form_escape(&line) {
            Some(command) => ControlFlow::Break(command),
            None => ControlFlow::Continue(line),
        }))
    }

    fn prompt(&mut self, label: &str) -> Result<Option<String>> {
        write!(self.output, "{label}> ")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::config::DisplayConfig;
    use crate::logging::init_test_logging;
    use crate::seed::SeedPlan;
    use crate::storage::InventoryStore;

    fn seeded_store() -> InventoryStore {
        init_test_logging();
        let mut store = InventoryStore::open_in_memory().unwrap();
        store.seed_if_empty(&SeedPlan::default()).unwrap();
        store
    }

    fn run_script(store: &mut InventoryStore, script: &str) -> String {
        let mut controller = Controller::new(store, DisplayConfig::default());
        let mut terminal = Terminal::new(Cursor::new(script.to_string()), Vec::new());
        terminal.run(&mut controller).unwrap();
        String::from_utf8(terminal.into_output()).unwrap()
    }

    #[test]
    fn test_checkout_through_terminal() {
        let mut store = seeded_store();
        let output = run_script(&mut store, "1\nAlice\nCamA\n1\nInterview\n1 2\nc\nq\n");

        assert!(output.contains("OK: checkout complete: SD1-1, SD1-2"));
        assert!(output.ends_with("Bye.\n"));
        let out = store.list_checked_out("SD1").unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].checkout.as_ref().unwrap().borrower, "Alice");
    }

    #[test]
    fn test_form_validation_is_shown() {
        let mut store = seeded_store();
        let output = run_script(&mut store, "1\n\nCamA\n1\n\n/q\n");

        assert!(output.contains("Error: enter the borrower name"));
        assert_eq!(store.list_checked_out("SD1").unwrap().len(), 0);
    }

    #[test]
    fn test_form_escape_goes_back() {
        let mut store = seeded_store();
        let output = run_script(&mut store, "1\n/b\nq\n");

        assert_eq!(output.matches("== SD card inventory ==").count(), 2);
    }

    #[test]
    fn test_confirm_without_selection() {
        let mut store = seeded_store();
        let output = run_script(&mut store, "1\nAlice\nCamA\nSD2\n\nc\nq\n");

        assert!(output.contains("Error: select at least one card"));
    }

    #[test]
    fn test_invalid_input_is_reported() {
        let mut store = seeded_store();
        let output = run_script(&mut store, "7\nq\n");

        assert!(output.contains("Error: unknown choice: 7"));
    }

    #[test]
    fn test_return_through_terminal() {
        let mut store = seeded_store();
        run_script(&mut store, "1\nBob\nDrone\nmicroSD\n\n5\nc\nq\n");
        assert_eq!(store.list_checked_out("microSD").unwrap().len(), 1);

        let output = run_script(&mut store, "2\n3\nr 5\nq\n");
        assert!(output.contains("Borrower:    Bob"));
        assert!(output.contains("OK: returned microSD-5"));
        assert!(store.list_checked_out("microSD").unwrap().is_empty());
    }

    #[test]
    fn test_list_and_change_container() {
        let mut store = seeded_store();
        let output = run_script(&mut store, "3\n1\nc\n2\nb\nq\n");

        assert!(output.contains("SD1-40"));
        assert!(output.contains("SD2-40"));
        assert_eq!(output.matches("== SD card inventory ==").count(), 2);
    }

    #[test]
    fn test_end_of_input_quits() {
        let mut store = seeded_store();
        let output = run_script(&mut store, "1\nAlice\n");

        assert!(output.ends_with("Bye.\n"));
    }
}
