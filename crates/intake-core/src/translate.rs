//! # Message Translation
//!
//! Validation messages are translated through an injected function
//! rather than a global. The engine holds one [`Translator`] and runs
//! every message template through it before parameter interpolation;
//! the default is identity, so an untranslated deployment sees the
//! English templates unchanged.

use std::fmt;
use std::sync::Arc;

/// Injected message-translation function.
///
/// Cheap to clone; the closure is shared behind an `Arc`.
#[derive(Clone)]
pub struct Translator {
    translate: Arc<dyn Fn(&str) -> String + Send + Sync>,
}

impl Translator {
    /// Identity translator: every template passes through unchanged.
    pub fn identity() -> Self {
        Self { translate: Arc::new(|s| s.to_string()) }
    }

    /// Wrap a translation function.
    pub fn new<F>(translate: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        Self { translate: Arc::new(translate) }
    }

    /// Translate one message template.
    pub fn translate(&self, template: &str) -> String {
        (self.translate)(template)
    }
}

impl Default for Translator {
    fn default() -> Self {
        Self::identity()
    }
}

impl fmt::Debug for Translator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Translator(..)")
    }
}
