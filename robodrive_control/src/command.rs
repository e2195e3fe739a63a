//! Motion command decision logic.
//!
//! - [`arbitration`] - Ordered transition table and arbitration policies

pub mod arbitration;
