//! The checkout form and its validation.

use crate::error::{ActionError, ActionResult};
use crate::storage::CheckoutRequest;

/// Raw checkout form input, as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckoutForm {
    /// Borrower name. Required.
    pub borrower: String,
    /// Equipment name. Required.
    pub equipment: String,
    /// Chosen container. Required.
    pub container: Option<String>,
    /// Usage note. Optional.
    pub note: String,
}

/// A validated checkout form: the container to pick cards from and the
/// details to stamp on them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutTicket {
    /// Container whose available cards are offered.
    pub container: String,
    /// Borrower details.
    pub request: CheckoutRequest,
}

impl CheckoutForm {
    /// Validate the form, reporting the first missing required field.
    ///
    /// Fields are trimmed; whitespace-only input counts as missing.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError::Validation`] naming the missing field.
    pub fn validate(&self) -> ActionResult<CheckoutTicket> {
        let borrower = self.borrower.trim();
        if borrower.is_empty() {
            return Err(ActionError::validation("enter the borrower name"));
        }
        let equipment = self.equipment.trim();
        if equipment.is_empty() {
            return Err(ActionError::validation("enter the equipment"));
        }
        let container = match self.container.as_deref().map(str::trim) {
            Some(container) if !container.is_empty() => container,
            _ => return Err(ActionError::validation("choose a card container")),
        };

        Ok(CheckoutTicket {
            container: container.to_string(),
            request: CheckoutRequest {
                borrower: borrower.to_string(),
                equipment: equipment.to_string(),
                note: self.note.trim().to_string(),
            },
        })
    }
}
