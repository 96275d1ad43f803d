//! Capability traits
//!
//! ```text
//! Explanation:
//!   - Explainer: financial term -> plain-language explanation
//! ```

mod explainer;

pub use explainer::{Explainer, Explanation};
