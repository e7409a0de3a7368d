//! Fatal error kinds surfaced before a simulation starts.
//!
//! Anything that can go wrong *inside* the hourly loop degrades numerically
//! instead (see the guards in the economics and engine modules), so this enum
//! only covers malformed inputs that make a full-year run meaningless.

use thiserror::Error;

use crate::config::ConfigError;
use crate::tech::Category;

/// Errors that abort a run before the hourly loop begins.
#[derive(Error, Debug)]
pub enum SimError {
    /// An hourly series has fewer than 8760 values.
    #[error("profile \"{profile}\" has {len} hourly values, expected at least 8760")]
    ProfileTooShort { profile: String, len: usize },

    /// No technology of category `Load` was supplied.
    #[error("scenario has no load technology")]
    MissingLoad,

    /// The load technology references no profile, or an absent one.
    #[error("load profile \"{profile}\" is missing from the hourly profile table")]
    MissingLoadProfile { profile: String },

    /// A name in the merit or dispatch order has no technology record.
    #[error("technology \"{name}\" appears in an order list but is not defined")]
    UnknownTechnology { name: String },

    /// A technology is listed more than once across the order lists.
    #[error("technology \"{name}\" appears more than once in the dispatch/merit order")]
    DuplicateInOrder { name: String },

    /// A technology sits in the wrong order list for its category.
    #[error("technology \"{name}\" of category {category} cannot be placed in that order list")]
    WrongOrderList { name: String, category: Category },

    /// A technology record violates a structural invariant.
    #[error("technology \"{name}\" is invalid: {reason}")]
    InvalidTechnology { name: String, reason: String },

    /// Scenario configuration could not be loaded or validated.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// I/O failure at the boundary (exports).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the crate.
pub type SimResult<T> = Result<T, SimError>;
