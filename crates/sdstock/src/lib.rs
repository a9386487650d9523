//! `sdstock` - A single-tenant SD card inventory tracker
//!
//! This library keeps a fixed enumeration of SD cards in `SQLite`, checks
//! batches of them out to borrowers atomically, takes them back one at a
//! time, and drives an interactive select/checkout/return/list workflow.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod card;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod seed;
pub mod storage;
pub mod ui;
pub mod workflow;

pub use card::{Capacity, Card, CardStatus, Checkout, ListingRow};
pub use config::Config;
pub use error::{ActionError, ActionResult, Error, Result};
pub use logging::init_logging;
pub use seed::SeedPlan;
pub use storage::{CheckoutRequest, InventoryStats, InventoryStore};
