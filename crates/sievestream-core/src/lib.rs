//! Sievestream Core
//!
//! Core types shared across sievestream components.
//!
//! This crate provides:
//! - The [`Decision`] model returned by keyword callbacks
//! - [`ActionContext`], the per-match snapshot handed to callbacks
//! - [`StreamHistory`], the append-only record of a stream run
//! - Error types and result handling

pub mod context;
pub mod decision;
pub mod error;
pub mod history;

pub use context::{ActionContext, Callback};
pub use decision::Decision;
pub use error::{Error, Result};
pub use history::{ActionRecord, OutputRecord, StreamHistory};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::context::{ActionContext, Callback};
    pub use crate::decision::Decision;
    pub use crate::error::{Error, Result};
    pub use crate::history::{ActionRecord, OutputRecord, StreamHistory};
}
