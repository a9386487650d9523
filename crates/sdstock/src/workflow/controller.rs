//! Runs workflow effects against the store and builds screen views.

use tracing::debug;

use crate::card::{Card, ListingRow};
use crate::config::DisplayConfig;
use crate::error::Result;
use crate::storage::InventoryStore;

use super::{reduce, Action, CheckoutForm, CheckoutStep, CheckoutTicket, Effect, Screen, Session};

/// Everything a front end needs to draw the current screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    /// Mode selection.
    Select,
    /// The checkout form.
    CheckoutForm {
        /// Containers to choose from.
        containers: Vec<String>,
        /// Last submitted input.
        form: CheckoutForm,
    },
    /// Card selection for a validated checkout.
    CheckoutCards {
        /// The validated form.
        ticket: CheckoutTicket,
        /// Available cards in the container, by index.
        available: Vec<Card>,
        /// Selected cards, in id order. May include cards that are no
        /// longer available after a rejected checkout.
        selected: Vec<SelectedCard>,
    },
    /// Return screen.
    Return {
        /// Containers to choose from.
        containers: Vec<String>,
        /// Chosen container.
        container: Option<String>,
        /// Checked-out cards in the chosen container.
        cards: Vec<Card>,
    },
    /// Inventory listing.
    List {
        /// Containers to choose from.
        containers: Vec<String>,
        /// Chosen container.
        container: Option<String>,
        /// Every card in the chosen container, flattened.
        rows: Vec<ListingRow>,
    },
}

/// A card in the checkout selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedCard {
    /// Card id.
    pub id: i64,
    /// Card label, or `#<id>` when the card no longer exists.
    pub label: String,
    /// Index within the container, when the card exists.
    pub index: Option<u32>,
}

impl From<&Card> for SelectedCard {
    fn from(card: &Card) -> Self {
        Self {
            id: card.id,
            label: card.label.clone(),
            index: Some(card.index),
        }
    }
}

/// Drives a [`Session`] against an [`InventoryStore`].
#[derive(Debug)]
pub struct Controller<'a> {
    store: &'a mut InventoryStore,
    display: DisplayConfig,
}

impl<'a> Controller<'a> {
    /// Create a controller over a store.
    #[must_use]
    pub fn new(store: &'a mut InventoryStore, display: DisplayConfig) -> Self {
        Self { store, display }
    }

    /// Display settings used when building views.
    #[must_use]
    pub fn display(&self) -> &DisplayConfig {
        &self.display
    }

    /// Apply a user action, running any store work it triggers.
    ///
    /// Store failures during checkout or return end up in the returned
    /// session's notice; they never escape as errors.
    pub fn dispatch(&mut self, session: Session, action: Action) -> Session {
        debug!(screen = ?session.screen, ?action, "Dispatching action");
        let transition = reduce(session, action);
        match transition.effect {
            Some(effect) => {
                let finished = self.run(effect);
                self.dispatch(transition.session, finished)
            }
            None => transition.session,
        }
    }

    fn run(&mut self, effect: Effect) -> Action {
        match effect {
            Effect::Checkout { ids, request } => {
                Action::CheckoutFinished(self.store.checkout(&ids, &request))
            }
            Effect::Return { id } => Action::ReturnFinished(self.store.return_card(id)),
        }
    }

    /// Build the view for the session's current screen.
    ///
    /// # Errors
    ///
    /// Returns an error if a store query fails.
    pub fn view(&self, session: &Session) -> Result<View> {
        let view = match &session.screen {
            Screen::Select => View::Select,
            Screen::Checkout(CheckoutStep::Form) => View::CheckoutForm {
                containers: self.store.list_containers()?,
                form: session.form.clone(),
            },
            Screen::Checkout(CheckoutStep::Cards(ticket)) => {
                let available = self.store.list_available(&ticket.container)?;
                let mut selected = Vec::with_capacity(session.selection.len());
                for id in &session.selection {
                    let card = match available.iter().find(|card| card.id == *id) {
                        Some(card) => SelectedCard::from(card),
                        None => self.store.get(*id)?.as_ref().map_or_else(
                            || SelectedCard {
                                id: *id,
                                label: format!("#{id}"),
                                index: None,
                            },
                            SelectedCard::from,
                        ),
                    };
                    selected.push(card);
                }
                View::CheckoutCards {
                    ticket: ticket.clone(),
                    available,
                    selected,
                }
            }
            Screen::Return { container } => View::Return {
                containers: self.store.list_containers()?,
                container: container.clone(),
                cards: match container {
                    Some(c) => self.store.list_checked_out(c)?,
                    None => Vec::new(),
                },
            },
            Screen::List { container } => View::List {
                containers: self.store.list_containers()?,
                container: container.clone(),
                rows: match container {
                    Some(c) => self.store.listing(c, &self.display.date_format)?,
                    None => Vec::new(),
                },
            },
        };
        Ok(view)
    }
}
