//! The checkout / return / list workflow.
//!
//! A [`Session`] is an explicit value describing where the user is: the
//! current screen, the checkout form, the accumulated card selection and the
//! outcome of the last action. [`reduce`] is a pure function from a session
//! and an [`Action`] to the next session plus an optional [`Effect`] that
//! must be run against the store. The [`Controller`] runs effects and feeds
//! their results back in as actions.

mod controller;
mod form;

use std::collections::BTreeSet;

pub use controller::{Controller, SelectedCard, View};
pub use form::{CheckoutForm, CheckoutTicket};

use crate::error::{ActionError, ActionResult};
use crate::storage::CheckoutRequest;

/// The three workflows reachable from the select screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Lend a batch of cards.
    Checkout,
    /// Take cards back.
    Return,
    /// Browse the inventory.
    List,
}

/// Steps of the checkout workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutStep {
    /// Collecting borrower, equipment, container and note.
    Form,
    /// Picking cards from the validated container.
    Cards(CheckoutTicket),
}

/// Which screen is showing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Screen {
    /// Mode selection. Initial screen.
    #[default]
    Select,
    /// Checkout workflow.
    Checkout(CheckoutStep),
    /// Return workflow, optionally with a container chosen.
    Return {
        /// Container whose checked-out cards are shown.
        container: Option<String>,
    },
    /// Inventory listing, optionally with a container chosen.
    List {
        /// Container being listed.
        container: Option<String>,
    },
}

impl Screen {
    /// The workflow this screen belongs to, `None` on the select screen.
    #[must_use]
    pub fn mode(&self) -> Option<Mode> {
        match self {
            Self::Select => None,
            Self::Checkout(_) => Some(Mode::Checkout),
            Self::Return { .. } => Some(Mode::Return),
            Self::List { .. } => Some(Mode::List),
        }
    }
}

/// Outcome of the last action, shown once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Whether the action succeeded.
    pub success: bool,
    /// Message for the user.
    pub message: String,
}

impl Notice {
    /// A success notice.
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    /// A failure notice.
    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

impl From<&ActionError> for Notice {
    fn from(err: &ActionError) -> Self {
        Self::failure(err.to_string())
    }
}

/// Complete workflow state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    /// Current screen.
    pub screen: Screen,
    /// Last submitted checkout form.
    pub form: CheckoutForm,
    /// Card ids selected for checkout.
    pub selection: BTreeSet<i64>,
    /// Outcome of the last action.
    pub notice: Option<Notice>,
}

/// Something the user did, or the result of an effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Enter a workflow from the select screen.
    Open(Mode),
    /// Go back to the select screen, discarding checkout input.
    Back,
    /// Submit the checkout form.
    SubmitForm(CheckoutForm),
    /// Add or remove a card from the checkout selection.
    ToggleCard(i64),
    /// Check out the selected cards.
    ConfirmCheckout,
    /// Pick the container on the return or list screen.
    ChooseContainer(String),
    /// Return one card.
    ReturnCard(i64),
    /// Result of a checkout effect.
    CheckoutFinished(ActionResult<Vec<String>>),
    /// Result of a return effect.
    ReturnFinished(ActionResult<String>),
}

/// Store work requested by a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Check out `ids` with the given details.
    Checkout {
        /// Cards to check out.
        ids: BTreeSet<i64>,
        /// Borrower details.
        request: CheckoutRequest,
    },
    /// Return one card.
    Return {
        /// Card to return.
        id: i64,
    },
}

/// The next session and the store work it asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    /// Session after the action.
    pub session: Session,
    /// Store work to run, if any.
    pub effect: Option<Effect>,
}

impl Transition {
    fn stay(session: Session) -> Self {
        Self {
            session,
            effect: None,
        }
    }
}

/// Apply an action to a session.
///
/// Actions that make no sense on the current screen leave the session as
/// it was.
#[must_use]
pub fn reduce(mut session: Session, action: Action) -> Transition {
    // Finished actions carry their own notice; anything the user does
    // replaces the previous one.
    if !matches!(
        action,
        Action::CheckoutFinished(_) | Action::ReturnFinished(_)
    ) {
        session.notice = None;
    }

    match (session.screen.clone(), action) {
        (Screen::Select, Action::Open(mode)) => {
            session.form = CheckoutForm::default();
            session.selection.clear();
            session.screen = match mode {
                Mode::Checkout => Screen::Checkout(CheckoutStep::Form),
                Mode::Return => Screen::Return { container: None },
                Mode::List => Screen::List { container: None },
            };
            Transition::stay(session)
        }

        (_, Action::Back) => Transition::stay(Session::default()),

        (Screen::Checkout(step), Action::SubmitForm(form)) => {
            match form.validate() {
                Ok(ticket) => {
                    let same_container = matches!(
                        &step,
                        CheckoutStep::Cards(current) if current.container == ticket.container
                    );
                    if !same_container {
                        session.selection.clear();
                    }
                    session.screen = Screen::Checkout(CheckoutStep::Cards(ticket));
                }
                Err(err) => session.notice = Some(Notice::from(&err)),
            }
            session.form = form;
            Transition::stay(session)
        }

        (Screen::Checkout(CheckoutStep::Cards(_)), Action::ToggleCard(id)) => {
            if !session.selection.remove(&id) {
                session.selection.insert(id);
            }
            Transition::stay(session)
        }

        (Screen::Checkout(CheckoutStep::Cards(ticket)), Action::ConfirmCheckout) => {
            if session.selection.is_empty() {
                session.notice = Some(Notice::from(&ActionError::validation(
                    "select at least one card",
                )));
                return Transition::stay(session);
            }
            let effect = Effect::Checkout {
                ids: session.selection.clone(),
                request: ticket.request,
            };
            Transition {
                session,
                effect: Some(effect),
            }
        }

        (Screen::Checkout(CheckoutStep::Cards(_)), Action::CheckoutFinished(result)) => {
            match result {
                Ok(labels) => {
                    session = Session::default();
                    session.notice = Some(Notice::success(format!(
                        "checkout complete: {}",
                        labels.join(", ")
                    )));
                }
                Err(err) => session.notice = Some(Notice::from(&err)),
            }
            Transition::stay(session)
        }

        (Screen::Return { .. }, Action::ChooseContainer(container)) => {
            session.screen = Screen::Return {
                container: Some(container),
            };
            Transition::stay(session)
        }

        (Screen::List { .. }, Action::ChooseContainer(container)) => {
            session.screen = Screen::List {
                container: Some(container),
            };
            Transition::stay(session)
        }

        (
            Screen::Return {
                container: Some(_),
            },
            Action::ReturnCard(id),
        ) => Transition {
            session,
            effect: Some(Effect::Return { id }),
        },

        (Screen::Return { .. }, Action::ReturnFinished(result)) => {
            session.notice = Some(match result {
                Ok(label) => Notice::success(format!("returned {label}")),
                Err(err) => Notice::from(&err),
            });
            Transition::stay(session)
        }

        _ => Transition::stay(session),
    }
}
