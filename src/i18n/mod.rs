//! Language bindings for the canonical word fields.
//!
//! Every record carries three canonical spellings (`word`, `word2`, `word3`),
//! each bound to one language. The default binding is English, French and
//! Vietnamese; deployments may rebind them through `CANONICAL_LANGUAGES`.
//!
//! # Example
//!
//! ```
//! use vocab_server::i18n::{CanonicalField, LanguageBindings};
//!
//! let bindings = LanguageBindings::default();
//! assert_eq!(bindings.code(CanonicalField::Word2), "fr");
//! ```

mod bindings;

pub use bindings::{CanonicalField, LanguageBindings};
