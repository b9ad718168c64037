//! Keyword registry
//!
//! Maps keywords to ordered lists of callbacks. The registry holds no
//! matching logic; the processor compiles its keyword set into an
//! automaton at construction time. Mutating a registry while a stream run
//! holds it is unsupported, which the `Arc` handed to the processor
//! enforces.

use sievestream_core::{Callback, Error, Result};
use std::collections::HashMap;

/// Registry of keywords and their associated callbacks
#[derive(Default)]
pub struct KeywordRegistry {
    entries: HashMap<String, Vec<Callback>>,

    /// Keywords in first-registration order; pattern ids in the compiled
    /// automaton index into this
    order: Vec<String>,
}

impl KeywordRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback for a keyword.
    ///
    /// Registering the same keyword again accumulates callbacks; they run
    /// in registration order when the keyword matches.
    pub fn register(&mut self, keyword: impl Into<String>, callback: Callback) -> Result<()> {
        let keyword = keyword.into();
        if keyword.is_empty() {
            return Err(Error::config("keyword must be a non-empty string"));
        }

        match self.entries.get_mut(&keyword) {
            Some(callbacks) => callbacks.push(callback),
            None => {
                self.order.push(keyword.clone());
                self.entries.insert(keyword, vec![callback]);
            }
        }
        Ok(())
    }

    /// Remove all callbacks for a keyword. Unknown keywords are ignored.
    pub fn deregister(&mut self, keyword: &str) {
        if self.entries.remove(keyword).is_some() {
            self.order.retain(|k| k != keyword);
        }
    }

    /// Callbacks registered for a keyword, in registration order.
    /// Empty for unknown keywords, never an error.
    pub fn lookup(&self, keyword: &str) -> &[Callback] {
        self.entries
            .get(keyword)
            .map(|callbacks| callbacks.as_slice())
            .unwrap_or(&[])
    }

    /// Registered keywords in first-registration order
    pub fn keywords(&self) -> &[String] {
        &self.order
    }

    /// Length in bytes of the longest registered keyword (0 when empty)
    pub fn max_len(&self) -> usize {
        self.order.iter().map(|k| k.len()).max().unwrap_or(0)
    }

    /// Whether any keyword is registered
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Number of registered keywords
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether `tail` is a strict prefix of some registered keyword
    pub fn has_strict_prefix(&self, tail: &str) -> bool {
        self.order
            .iter()
            .any(|k| k.len() > tail.len() && k.starts_with(tail))
    }
}

impl std::fmt::Debug for KeywordRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeywordRegistry")
            .field("keywords", &self.order)
            .finish()
    }
}
