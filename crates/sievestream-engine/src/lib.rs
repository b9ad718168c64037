//! Sievestream Engine
//!
//! The streaming keyword matcher and dispatch engine.
//!
//! This crate provides:
//! - [`KeywordRegistry`], mapping keywords to ordered callback lists
//! - [`StreamProcessor`], the prefix-safe matcher/dispatcher core
//! - Ready-made callbacks in [`actions`]
//! - Declarative YAML rule sets in [`rules`]
//! - Pipeline adapters over iterators and async streams in [`pipeline`]
//!
//! # Example
//!
//! ```
//! use sievestream_engine::{actions, sanitize, KeywordRegistry, PipelineConfig};
//! use std::sync::Arc;
//!
//! let mut registry = KeywordRegistry::new();
//! registry.register("secret", actions::replace("[REDACTED]")).unwrap();
//!
//! let source = vec!["a sec".to_string(), "ret plan".to_string()];
//! let pipeline = sanitize(Arc::new(registry), source, PipelineConfig::default()).unwrap();
//! let output: String = pipeline.map(|u| u.unwrap()).collect();
//! assert_eq!(output, "a [REDACTED] plan");
//! ```

pub mod actions;
pub mod pipeline;
pub mod processor;
pub mod registry;
pub mod rules;

pub use pipeline::{
    sanitize, sanitize_stream, OutputMode, PipelineConfig, SanitizeIter, SanitizeStream,
};
pub use processor::StreamProcessor;
pub use registry::KeywordRegistry;
pub use rules::{Rule, RuleSet};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::actions;
    pub use crate::pipeline::{sanitize, sanitize_stream, OutputMode, PipelineConfig};
    pub use crate::processor::StreamProcessor;
    pub use crate::registry::KeywordRegistry;
    pub use crate::rules::{Rule, RuleSet};
    pub use sievestream_core::prelude::*;
}
