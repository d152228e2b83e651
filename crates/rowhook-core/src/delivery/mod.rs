//! Inbound delivery handling.

pub mod classifier;

pub use classifier::{classify, classify_body, respond};
