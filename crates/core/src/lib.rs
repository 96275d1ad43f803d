//! Core types for the FinSpeak query engine
//!
//! This crate provides the foundational types used across all other crates:
//! - Fund records, NAV points and the immutable knowledge base
//! - Snapshot handle for reload-by-swap
//! - CSV loader
//! - Language definitions, text normalization
//! - Answer types and the explanation capability trait
//! - Error types

pub mod answer;
pub mod error;
pub mod fund;
pub mod knowledge_base;
pub mod language;
pub mod loader;
pub mod snapshot;
pub mod text;
pub mod traits;

pub use answer::{Answer, AnswerData, ErrorKind, ExplanationSource, IntentKind, MatchCandidate};
pub use error::{Error, Result};
pub use fund::{FundId, FundRecord, NavPoint, SUPPORTED_PERIOD_MONTHS};
pub use knowledge_base::{KnowledgeBase, KnowledgeBaseBuilder};
pub use language::Language;
pub use loader::{load_from_readers, load_knowledge_base};
pub use snapshot::KnowledgeBaseHandle;
pub use text::{canonicalize, normalize};

pub use traits::{Explainer, Explanation};
