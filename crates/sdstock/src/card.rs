//! Core card types for sdstock.
//!
//! This module defines the data structures for a physical SD card, its
//! lending status and the metadata attached to it while it is checked out.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Lending status of a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardStatus {
    /// The card is on the shelf and can be checked out.
    Available,
    /// The card is with a borrower.
    CheckedOut,
}

impl CardStatus {
    /// The value stored in the `status` column.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::CheckedOut => "checked_out",
        }
    }

    /// Human-readable label used by the front end.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Available => "Available",
            Self::CheckedOut => "Checked out",
        }
    }
}

impl fmt::Display for CardStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CardStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(Self::Available),
            "checked_out" => Ok(Self::CheckedOut),
            other => Err(Error::corrupt_row(format!("unknown card status: {other}"))),
        }
    }
}

/// Storage capacity band of a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Capacity {
    /// 32 GB.
    #[serde(rename = "32G")]
    Gb32,
    /// 64 GB.
    #[serde(rename = "64G")]
    Gb64,
    /// 128 GB.
    #[serde(rename = "128G")]
    Gb128,
}

impl Capacity {
    /// The value stored in the `capacity` column.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Gb32 => "32G",
            Self::Gb64 => "64G",
            Self::Gb128 => "128G",
        }
    }
}

impl fmt::Display for Capacity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Capacity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "32G" => Ok(Self::Gb32),
            "64G" => Ok(Self::Gb64),
            "128G" => Ok(Self::Gb128),
            other => Err(Error::corrupt_row(format!("unknown capacity: {other}"))),
        }
    }
}

/// Metadata attached to a card while it is checked out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkout {
    /// When the card was checked out.
    pub checked_out_at: DateTime<Utc>,
    /// Who took the card.
    pub borrower: String,
    /// The equipment the card went into.
    pub equipment: String,
    /// Free-text description of the shoot. May be empty.
    pub note: String,
}

impl Checkout {
    /// Render the checkout date in local time with the given strftime format.
    #[must_use]
    pub fn date(&self, format: &str) -> String {
        self.checked_out_at
            .with_timezone(&Local)
            .format(format)
            .to_string()
    }
}

/// A physical SD card.
///
/// The checkout metadata is present exactly when the card is checked out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    /// Row identifier assigned by the store.
    pub id: i64,
    /// Label written on the card, e.g. `SD1-7`.
    pub label: String,
    /// Position within the container, used for display ordering.
    pub index: u32,
    /// Capacity band.
    pub capacity: Capacity,
    /// Container (card case) the card lives in.
    pub container: String,
    /// Present while the card is checked out.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checkout: Option<Checkout>,
}

impl Card {
    /// Current lending status.
    #[must_use]
    pub fn status(&self) -> CardStatus {
        if self.checkout.is_some() {
            CardStatus::CheckedOut
        } else {
            CardStatus::Available
        }
    }

    /// Whether the card can be checked out.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.checkout.is_none()
    }

    /// Short form shown in selection grids, e.g. `SD1-7 (32G)`.
    #[must_use]
    pub fn short_label(&self) -> String {
        format!("{} ({})", self.label, self.capacity)
    }

    /// Flatten the card into display fields.
    #[must_use]
    pub fn to_listing(&self, date_format: &str) -> ListingRow {
        let (date, borrower, equipment, note) = match &self.checkout {
            Some(c) => (
                c.date(date_format),
                c.borrower.clone(),
                c.equipment.clone(),
                c.note.clone(),
            ),
            None => Default::default(),
        };
        ListingRow {
            label: self.label.clone(),
            status: self.status(),
            capacity: self.capacity,
            checkout_date: date,
            borrower,
            equipment,
            container: self.container.clone(),
            note,
        }
    }
}

/// A card flattened for the inventory listing.
///
/// Checkout fields are empty strings when the card is not checked out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListingRow {
    /// Card label.
    pub label: String,
    /// Lending status.
    pub status: CardStatus,
    /// Capacity band.
    pub capacity: Capacity,
    /// Checkout date, or empty.
    pub checkout_date: String,
    /// Borrower, or empty.
    pub borrower: String,
    /// Equipment, or empty.
    pub equipment: String,
    /// Container label.
    pub container: String,
    /// Usage note, or empty.
    pub note: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_card(checkout: Option<Checkout>) -> Card {
        Card {
            id: 1,
            label: "SD1-1".to_string(),
            index: 1,
            capacity: Capacity::Gb32,
            container: "SD1".to_string(),
            checkout,
        }
    }

    fn sample_checkout() -> Checkout {
        Checkout {
            checked_out_at: Utc::now(),
            borrower: "Alice".to_string(),
            equipment: "CamA".to_string(),
            note: "Interview".to_string(),
        }
    }

    #[test]
    fn test_status_round_trip_strings() {
        assert_eq!("available".parse::<CardStatus>().unwrap(), CardStatus::Available);
        assert_eq!(
            "checked_out".parse::<CardStatus>().unwrap(),
            CardStatus::CheckedOut
        );
        assert!("lost".parse::<CardStatus>().is_err());
    }

    #[test]
    fn test_capacity_parse() {
        assert_eq!("128G".parse::<Capacity>().unwrap(), Capacity::Gb128);
        assert!("256G".parse::<Capacity>().is_err());
    }

    #[test]
    fn test_capacity_serializes_as_label() {
        let json = serde_json::to_string(&Capacity::Gb64).unwrap();
        assert_eq!(json, "\"64G\"");
    }

    #[test]
    fn test_status_follows_checkout() {
        assert_eq!(sample_card(None).status(), CardStatus::Available);
        assert_eq!(
            sample_card(Some(sample_checkout())).status(),
            CardStatus::CheckedOut
        );
    }

    #[test]
    fn test_short_label() {
        assert_eq!(sample_card(None).short_label(), "SD1-1 (32G)");
    }

    #[test]
    fn test_listing_blank_when_available() {
        let row = sample_card(None).to_listing("%Y-%m-%d");
        assert_eq!(row.status, CardStatus::Available);
        assert!(row.checkout_date.is_empty());
        assert!(row.borrower.is_empty());
        assert!(row.equipment.is_empty());
        assert!(row.note.is_empty());
        assert_eq!(row.container, "SD1");
    }

    #[test]
    fn test_listing_filled_when_checked_out() {
        let row = sample_card(Some(sample_checkout())).to_listing("%Y-%m-%d");
        assert_eq!(row.status, CardStatus::CheckedOut);
        assert_eq!(row.checkout_date.len(), 10);
        assert_eq!(row.borrower, "Alice");
        assert_eq!(row.equipment, "CamA");
        assert_eq!(row.note, "Interview");
    }
}
