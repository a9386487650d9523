//! Storage layer for sdstock.
//!
//! This module provides the `SQLite`-backed inventory store: per-container
//! queries, first-run seeding, and the two mutating actions (batch checkout
//! and single return), each of which runs in one immediate transaction.

pub mod migrations;
pub mod schema;

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use chrono::{DateTime, Utc};
use rusqlite::types::{Type, Value};
use rusqlite::vtab::array;
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::card::{Capacity, Card, CardStatus, Checkout, ListingRow};
use crate::error::{ActionError, ActionResult, Error, Result};
use crate::seed::SeedPlan;

use self::schema::CARD_COLUMNS;

/// Borrower details stamped on every card of a checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutRequest {
    /// Who takes the cards.
    pub borrower: String,
    /// The equipment the cards go into.
    pub equipment: String,
    /// Free-text usage note. May be empty.
    pub note: String,
}

/// Inventory store for SD cards.
///
/// Owns the single database connection. Read queries take `&self`;
/// checkout, return and seeding take `&mut self` because they open a
/// transaction.
#[derive(Debug)]
pub struct InventoryStore {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Connection,
}

impl InventoryStore {
    /// Open or create an inventory database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist,
    /// and brings the schema up to date. Does not seed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        Self::prepare(&conn)?;

        info!("Database opened successfully at {}", path.display());
        Ok(Self { path, conn })
    }

    /// Create an in-memory store for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        Self::prepare(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn,
        })
    }

    fn prepare(conn: &Connection) -> Result<()> {
        // `rarray()` lets id sets be bound as a single parameter.
        array::load_module(conn)?;
        migrations::initialize_schema(conn)
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Insert the seed enumeration if the cards table is empty.
    ///
    /// Returns the number of cards inserted, which is 0 when the table
    /// already has rows.
    ///
    /// # Errors
    ///
    /// Returns an error if the plan is incomplete or the insert fails; in
    /// that case nothing is inserted.
    pub fn seed_if_empty(&mut self, plan: &SeedPlan) -> Result<usize> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let existing: i64 = tx.query_row("SELECT COUNT(*) FROM cards", [], |row| row.get(0))?;
        if existing > 0 {
            debug!("Skipping seed, {} cards already present", existing);
            return Ok(0);
        }

        let cards = plan.cards()?;
        {
            let mut stmt = tx.prepare_cached(
                r"
                INSERT INTO cards (label, card_index, status, capacity, container)
                VALUES (?1, ?2, ?3, ?4, ?5)
                ",
            )?;
            for card in &cards {
                stmt.execute(params![
                    card.label,
                    card.index,
                    CardStatus::Available.as_str(),
                    card.capacity.as_str(),
                    card.container,
                ])?;
            }
        }
        tx.commit()?;

        info!(
            "Seeded {} cards in {} containers",
            cards.len(),
            plan.containers.len()
        );
        Ok(cards.len())
    }

    /// Distinct container labels, in the order they were seeded.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn list_containers(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT container FROM cards GROUP BY container ORDER BY MIN(id)")?;
        let containers = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        Ok(containers)
    }

    /// Available cards in a container, by index.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn list_available(&self, container: &str) -> Result<Vec<Card>> {
        self.query_cards(
            "WHERE container = ?1 AND status = ?2 ORDER BY card_index",
            params![container, CardStatus::Available.as_str()],
        )
    }

    /// Checked-out cards in a container, by index, with checkout metadata.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn list_checked_out(&self, container: &str) -> Result<Vec<Card>> {
        self.query_cards(
            "WHERE container = ?1 AND status = ?2 ORDER BY card_index",
            params![container, CardStatus::CheckedOut.as_str()],
        )
    }

    /// Every card in a container, by index.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn list_all(&self, container: &str) -> Result<Vec<Card>> {
        self.query_cards(
            "WHERE container = ?1 ORDER BY card_index",
            params![container],
        )
    }

    /// Every card in a container flattened for display.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn listing(&self, container: &str, date_format: &str) -> Result<Vec<ListingRow>> {
        Ok(self
            .list_all(container)?
            .iter()
            .map(|card| card.to_listing(date_format))
            .collect())
    }

    /// Get a card by its id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn get(&self, id: i64) -> Result<Option<Card>> {
        Ok(self
            .query_cards("WHERE id = ?1", params![id])?
            .into_iter()
            .next())
    }

    /// Get a card by its label.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn find_by_label(&self, label: &str) -> Result<Option<Card>> {
        Ok(self
            .query_cards("WHERE label = ?1", params![label])?
            .into_iter()
            .next())
    }

    /// Map labels to card ids.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownLabel`] for the first label that matches no card.
    pub fn resolve_labels<S: AsRef<str>>(&self, labels: &[S]) -> Result<BTreeSet<i64>> {
        let mut ids = BTreeSet::new();
        for label in labels {
            let label = label.as_ref();
            let id: Option<i64> = self
                .conn
                .query_row("SELECT id FROM cards WHERE label = ?1", [label], |row| {
                    row.get(0)
                })
                .optional()?;
            ids.insert(id.ok_or_else(|| Error::UnknownLabel(label.to_string()))?);
        }
        Ok(ids)
    }

    /// Count all cards.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn count(&self) -> Result<i64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM cards", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Check out a batch of cards.
    ///
    /// Either every card in `ids` moves to checked out with the request
    /// stamped on it, or none does. Ids that do not exist count as
    /// unavailable. Returns the labels of the checked-out cards.
    ///
    /// # Errors
    ///
    /// - [`ActionError::Validation`] if `ids` is empty
    /// - [`ActionError::Unavailable`] naming every card that is not available
    /// - [`ActionError::Store`] if the transaction fails
    pub fn checkout(
        &mut self,
        ids: &BTreeSet<i64>,
        request: &CheckoutRequest,
    ) -> ActionResult<Vec<String>> {
        if ids.is_empty() {
            return Err(ActionError::validation("select at least one card"));
        }

        let result = self.checkout_batch(ids, request);
        match &result {
            Ok(labels) => info!(
                "Checked out {} to {} ({})",
                labels.join(", "),
                request.borrower,
                request.equipment
            ),
            Err(ActionError::Store(detail)) => error!("Checkout rolled back: {}", detail),
            Err(err) => warn!("Checkout rejected: {}", err),
        }
        result
    }

    fn checkout_batch(
        &mut self,
        ids: &BTreeSet<i64>,
        request: &CheckoutRequest,
    ) -> ActionResult<Vec<String>> {
        let id_set: array::Array = Rc::new(ids.iter().copied().map(Value::from).collect());
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let mut stmt =
            tx.prepare("SELECT id, label, status FROM cards WHERE id IN rarray(?1) ORDER BY id")?;
        let found: Vec<(i64, String, String)> = stmt
            .query_map([id_set.clone()], |row| {
                Ok((row.get(0)?, row.get(1)?, row.get(2)?))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        drop(stmt);

        let mut unavailable_ids = Vec::new();
        let mut unavailable_labels = Vec::new();
        for id in ids {
            match found.iter().find(|(found_id, _, _)| found_id == id) {
                Some((_, _, status)) if status == CardStatus::Available.as_str() => {}
                Some((_, label, _)) => {
                    unavailable_ids.push(*id);
                    unavailable_labels.push(Some(label.clone()));
                }
                None => {
                    unavailable_ids.push(*id);
                    unavailable_labels.push(None);
                }
            }
        }
        if !unavailable_ids.is_empty() {
            tx.rollback()?;
            return Err(ActionError::Unavailable {
                ids: unavailable_ids,
                labels: unavailable_labels,
            });
        }

        let updated = tx.execute(
            r"
            UPDATE cards
            SET status = ?1, checked_out_at = ?2, borrower = ?3, equipment = ?4, note = ?5
            WHERE id IN rarray(?6) AND status = ?7
            ",
            params![
                CardStatus::CheckedOut.as_str(),
                Utc::now().to_rfc3339(),
                request.borrower,
                request.equipment,
                request.note,
                id_set,
                CardStatus::Available.as_str(),
            ],
        )?;
        if updated != ids.len() {
            tx.rollback()?;
            return Err(ActionError::Store(format!(
                "expected to update {} cards, updated {updated}",
                ids.len()
            )));
        }

        tx.commit()?;
        Ok(found.into_iter().map(|(_, label, _)| label).collect())
    }

    /// Return a checked-out card to the shelf, clearing its checkout fields.
    ///
    /// Returns the card's label.
    ///
    /// # Errors
    ///
    /// - [`ActionError::InvalidState`] if the card is missing or not checked out
    /// - [`ActionError::Store`] if the transaction fails
    pub fn return_card(&mut self, id: i64) -> ActionResult<String> {
        let result = self.return_one(id);
        match &result {
            Ok(label) => info!("Returned {}", label),
            Err(ActionError::Store(detail)) => error!("Return rolled back: {}", detail),
            Err(err) => warn!("Return rejected: {}", err),
        }
        result
    }

    fn return_one(&mut self, id: i64) -> ActionResult<String> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let current: Option<(String, String)> = tx
            .query_row(
                "SELECT label, status FROM cards WHERE id = ?1",
                [id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let label = match current {
            Some((label, status)) if status == CardStatus::CheckedOut.as_str() => label,
            _ => {
                tx.rollback()?;
                return Err(ActionError::InvalidState { id });
            }
        };

        tx.execute(
            r"
            UPDATE cards
            SET status = ?1, checked_out_at = NULL, borrower = NULL, equipment = NULL, note = NULL
            WHERE id = ?2
            ",
            params![CardStatus::Available.as_str(), id],
        )?;
        tx.commit()?;
        Ok(label)
    }

    /// Get per-container totals.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn stats(&self) -> Result<InventoryStats> {
        let mut stmt = self.conn.prepare(
            r"
            SELECT container, COUNT(*), SUM(CASE WHEN status = ?1 THEN 1 ELSE 0 END)
            FROM cards GROUP BY container ORDER BY MIN(id)
            ",
        )?;
        let containers = stmt
            .query_map([CardStatus::CheckedOut.as_str()], |row| {
                let total: i64 = row.get(1)?;
                let checked_out: i64 = row.get(2)?;
                Ok(ContainerStats {
                    container: row.get(0)?,
                    total,
                    available: total - checked_out,
                    checked_out,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let db_size_bytes = if self.path.to_string_lossy() == ":memory:" {
            0
        } else {
            std::fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0)
        };

        Ok(InventoryStats {
            total: containers.iter().map(|c| c.total).sum(),
            checked_out: containers.iter().map(|c| c.checked_out).sum(),
            containers,
            db_size_bytes,
        })
    }

    fn query_cards(&self, filter: &str, params: &[&dyn rusqlite::ToSql]) -> Result<Vec<Card>> {
        let sql = format!("SELECT {CARD_COLUMNS} FROM cards {filter}");
        debug!("Querying cards: {}", filter);
        let mut stmt = self.conn.prepare(&sql)?;
        let cards = stmt
            .query_map(params, Self::row_to_card)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(cards)
    }

    /// Convert a database row to a Card.
    ///
    /// Rejects rows whose status disagrees with their checkout columns.
    fn row_to_card(row: &rusqlite::Row) -> rusqlite::Result<Card> {
        let id: i64 = row.get(0)?;
        let label: String = row.get(1)?;
        let index: u32 = row.get(2)?;
        let status_str: String = row.get(3)?;
        let capacity_str: String = row.get(4)?;
        let checked_out_at: Option<String> = row.get(5)?;
        let borrower: Option<String> = row.get(6)?;
        let equipment: Option<String> = row.get(7)?;
        let container: String = row.get(8)?;
        let note: Option<String> = row.get(9)?;

        let status: CardStatus = status_str.parse().map_err(|e| conversion_error(3, e))?;
        let capacity: Capacity = capacity_str.parse().map_err(|e| conversion_error(4, e))?;

        let checkout = match (status, checked_out_at, borrower, equipment) {
            (CardStatus::CheckedOut, Some(at), Some(borrower), Some(equipment)) => {
                let checked_out_at = DateTime::parse_from_rfc3339(&at)
                    .map_err(|e| conversion_error(5, e))?
                    .with_timezone(&Utc);
                Some(Checkout {
                    checked_out_at,
                    borrower,
                    equipment,
                    note: note.unwrap_or_default(),
                })
            }
            (CardStatus::Available, None, None, None) if note.is_none() => None,
            _ => {
                return Err(conversion_error(
                    3,
                    Error::corrupt_row(format!(
                        "{label}: status {status} disagrees with checkout columns"
                    )),
                ))
            }
        };

        Ok(Card {
            id,
            label,
            index,
            capacity,
            container,
            checkout,
        })
    }
}

fn conversion_error(column: usize, err: impl std::fmt::Display) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(column, Type::Text, err.to_string().into())
}

/// Card counts for one container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContainerStats {
    /// Container label.
    pub container: String,
    /// Cards in the container.
    pub total: i64,
    /// Cards on the shelf.
    pub available: i64,
    /// Cards with a borrower.
    pub checked_out: i64,
}

/// Statistics about the inventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InventoryStats {
    /// Total number of cards.
    pub total: i64,
    /// Cards currently checked out.
    pub checked_out: i64,
    /// Per-container breakdown, in seed order.
    pub containers: Vec<ContainerStats>,
    /// Size of the database file in bytes.
    pub db_size_bytes: u64,
}
