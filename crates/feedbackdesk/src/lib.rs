//! `feedbackdesk` - collect and review internal feature requests
//!
//! Departments submit structured requests to a hosted table; reviewers list,
//! filter, expand, delete and export them. Deletion is behind a shared admin
//! password that is a convenience switch, not access control.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod desk;
pub mod error;
pub mod export;
pub mod gate;
pub mod logging;
pub mod record;
pub mod store;
pub mod view;

pub use config::Config;
pub use desk::Desk;
pub use error::{Error, Result};
pub use gate::{AccessGate, Elevation};
pub use logging::init_logging;
pub use record::{FeedbackRecord, NewFeedback, Priority};
pub use store::{open_store, RecordStore};
