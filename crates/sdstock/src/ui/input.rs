//! Turning typed lines into workflow actions.

use crate::card::Card;
use crate::workflow::{Action, Mode, SelectedCard};

/// What a typed line asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Dispatch these actions in order.
    Dispatch(Vec<Action>),
    /// Ask for a (different) container.
    ChooseContainer,
    /// Leave the program.
    Quit,
    /// The line could not be understood; show the message.
    Invalid(String),
}

/// Parse a free-text form answer: `/b` and `/q` are the only commands.
#[must_use]
pub fn form_escape(line: &str) -> Option<Command> {
    match line.trim() {
        "/b" => Some(Command::Dispatch(vec![Action::Back])),
        "/q" => Some(Command::Quit),
        _ => None,
    }
}

fn navigation(line: &str) -> Option<Command> {
    match line.trim().to_ascii_lowercase().as_str() {
        "b" | "/b" | "back" => Some(Command::Dispatch(vec![Action::Back])),
        "q" | "/q" | "quit" => Some(Command::Quit),
        _ => None,
    }
}

/// Parse a choice on the select screen.
#[must_use]
pub fn parse_select(line: &str) -> Command {
    let mode = match line.trim().to_ascii_lowercase().as_str() {
        "1" | "checkout" => Mode::Checkout,
        "2" | "return" => Mode::Return,
        "3" | "list" => Mode::List,
        "q" | "/q" | "quit" => return Command::Quit,
        other => return Command::Invalid(format!("unknown choice: {other}")),
    };
    Command::Dispatch(vec![Action::Open(mode)])
}

/// Resolve a container typed by number (1-based) or by name.
#[must_use]
pub fn parse_container(line: &str, containers: &[String]) -> Option<String> {
    let line = line.trim();
    if let Ok(n) = line.parse::<usize>() {
        return n
            .checked_sub(1)
            .and_then(|i| containers.get(i))
            .cloned();
    }
    containers
        .iter()
        .find(|c| c.eq_ignore_ascii_case(line))
        .cloned()
}

/// Parse a line on a container prompt.
#[must_use]
pub fn parse_container_choice(line: &str, containers: &[String]) -> Command {
    if let Some(command) = navigation(line) {
        return command;
    }
    match parse_container(line, containers) {
        Some(container) => Command::Dispatch(vec![Action::ChooseContainer(container)]),
        None => Command::Invalid(format!("unknown container: {}", line.trim())),
    }
}

fn find_card<'c>(token: &str, cards: &'c [Card]) -> Option<&'c Card> {
    match token.parse::<u32>() {
        Ok(index) => cards.iter().find(|c| c.index == index),
        Err(_) => cards.iter().find(|c| c.label.eq_ignore_ascii_case(token)),
    }
}

fn find_selected(token: &str, selected: &[SelectedCard]) -> Option<i64> {
    let index = token.parse::<u32>().ok();
    selected
        .iter()
        .find(|card| match index {
            Some(index) => card.index == Some(index),
            None => card.label.eq_ignore_ascii_case(token),
        })
        .map(|card| card.id)
}

/// Parse a line on the card selection screen.
///
/// Indexes or labels (separated by spaces or commas) toggle cards; `c`
/// confirms. Tokens are matched against the available cards first, then
/// against the current selection, so a card taken by someone else can
/// still be deselected.
#[must_use]
pub fn parse_cards(line: &str, available: &[Card], selected: &[SelectedCard]) -> Command {
    if let Some(command) = navigation(line) {
        return command;
    }
    if line.trim().eq_ignore_ascii_case("c") {
        return Command::Dispatch(vec![Action::ConfirmCheckout]);
    }

    let tokens: Vec<&str> = line
        .split(|ch: char| ch.is_whitespace() || ch == ',')
        .filter(|t| !t.is_empty())
        .collect();
    if tokens.is_empty() {
        return Command::Invalid("type card indexes to select them, or c to confirm".to_string());
    }

    let mut actions = Vec::with_capacity(tokens.len());
    for token in tokens {
        let id = find_card(token, available)
            .map(|card| card.id)
            .or_else(|| find_selected(token, selected));
        match id {
            Some(id) => actions.push(Action::ToggleCard(id)),
            None => return Command::Invalid(format!("no available card {token}")),
        }
    }
    Command::Dispatch(actions)
}

/// Parse a line on the return screen: `r <index>` returns a card.
#[must_use]
pub fn parse_return(line: &str, checked_out: &[Card]) -> Command {
    if let Some(command) = navigation(line) {
        return command;
    }
    let mut words = line.split_whitespace();
    match (words.next(), words.next(), words.next()) {
        (Some(c), None, None) if c.eq_ignore_ascii_case("c") => Command::ChooseContainer,
        (Some(r), Some(token), None) if r.eq_ignore_ascii_case("r") => {
            match find_card(token, checked_out) {
                Some(card) => Command::Dispatch(vec![Action::ReturnCard(card.id)]),
                None => Command::Invalid(format!("no checked-out card {token}")),
            }
        }
        _ => Command::Invalid("use r <index> to return a card".to_string()),
    }
}

/// Parse a line on the inventory listing.
#[must_use]
pub fn parse_list(line: &str) -> Command {
    if let Some(command) = navigation(line) {
        return command;
    }
    if line.trim().eq_ignore_ascii_case("c") {
        Command::ChooseContainer
    } else {
        Command::Invalid("use c to choose another container".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::Capacity;

    fn cards() -> Vec<Card> {
        (1..=3)
            .map(|index| Card {
                id: i64::from(index) + 100,
                label: format!("SD1-{index}"),
                index,
                capacity: Capacity::Gb32,
                container: "SD1".to_string(),
                checkout: None,
            })
            .collect()
    }

    fn containers() -> Vec<String> {
        vec!["SD1".to_string(), "SD2".to_string(), "microSD".to_string()]
    }

    #[test]
    fn test_parse_select() {
        assert_eq!(
            parse_select("1"),
            Command::Dispatch(vec![Action::Open(Mode::Checkout)])
        );
        assert_eq!(
            parse_select(" list "),
            Command::Dispatch(vec![Action::Open(Mode::List)])
        );
        assert_eq!(parse_select("q"), Command::Quit);
        assert!(matches!(parse_select("9"), Command::Invalid(_)));
    }

    #[test]
    fn test_parse_container_by_number_and_name() {
        let containers = containers();
        assert_eq!(parse_container("2", &containers), Some("SD2".to_string()));
        assert_eq!(
            parse_container("microsd", &containers),
            Some("microSD".to_string())
        );
        assert_eq!(parse_container("0", &containers), None);
        assert_eq!(parse_container("4", &containers), None);
        assert_eq!(parse_container("SD9", &containers), None);
    }

    #[test]
    fn test_parse_container_choice() {
        let containers = containers();
        assert_eq!(
            parse_container_choice("1", &containers),
            Command::Dispatch(vec![Action::ChooseContainer("SD1".to_string())])
        );
        assert_eq!(
            parse_container_choice("b", &containers),
            Command::Dispatch(vec![Action::Back])
        );
        assert!(matches!(
            parse_container_choice("x", &containers),
            Command::Invalid(_)
        ));
    }

    #[test]
    fn test_parse_cards_toggles_by_index_and_label() {
        assert_eq!(
            parse_cards("1, sd1-3", &cards(), &[]),
            Command::Dispatch(vec![Action::ToggleCard(101), Action::ToggleCard(103)])
        );
    }

    #[test]
    fn test_parse_cards_commands() {
        assert_eq!(
            parse_cards("c", &cards(), &[]),
            Command::Dispatch(vec![Action::ConfirmCheckout])
        );
        assert_eq!(
            parse_cards("b", &cards(), &[]),
            Command::Dispatch(vec![Action::Back])
        );
        assert_eq!(parse_cards("q", &cards(), &[]), Command::Quit);
    }

    #[test]
    fn test_parse_cards_rejects_unknown() {
        assert!(matches!(parse_cards("1 7", &cards(), &[]), Command::Invalid(m) if m.contains('7')));
        assert!(matches!(parse_cards("   ", &cards(), &[]), Command::Invalid(_)));
    }

    #[test]
    fn test_parse_cards_deselects_taken_card() {
        // SD1-7 was selected, then checked out elsewhere.
        let selected = vec![SelectedCard {
            id: 107,
            label: "SD1-7".to_string(),
            index: Some(7),
        }];
        assert_eq!(
            parse_cards("7", &cards(), &selected),
            Command::Dispatch(vec![Action::ToggleCard(107)])
        );
        assert_eq!(
            parse_cards("sd1-7, 2", &cards(), &selected),
            Command::Dispatch(vec![Action::ToggleCard(107), Action::ToggleCard(102)])
        );
        assert!(matches!(
            parse_cards("8", &cards(), &selected),
            Command::Invalid(_)
        ));
    }

    #[test]
    fn test_parse_cards_prefers_available_card() {
        let selected = vec![SelectedCard {
            id: 102,
            label: "SD1-2".to_string(),
            index: Some(2),
        }];
        assert_eq!(
            parse_cards("2", &cards(), &selected),
            Command::Dispatch(vec![Action::ToggleCard(102)])
        );
    }

    #[test]
    fn test_parse_return() {
        assert_eq!(
            parse_return("r 2", &cards()),
            Command::Dispatch(vec![Action::ReturnCard(102)])
        );
        assert_eq!(parse_return("c", &cards()), Command::ChooseContainer);
        assert!(matches!(parse_return("r 9", &cards()), Command::Invalid(_)));
        assert!(matches!(parse_return("2", &cards()), Command::Invalid(_)));
    }

    #[test]
    fn test_parse_list() {
        assert_eq!(parse_list("c"), Command::ChooseContainer);
        assert_eq!(parse_list("back"), Command::Dispatch(vec![Action::Back]));
        assert!(matches!(parse_list("x"), Command::Invalid(_)));
    }

    #[test]
    fn test_form_escape() {
        assert_eq!(form_escape("/q"), Some(Command::Quit));
        assert_eq!(
            form_escape(" /b "),
            Some(Command::Dispatch(vec![Action::Back]))
        );
        assert_eq!(form_escape("b"), None);
    }
}
