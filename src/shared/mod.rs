//! Shared Module
//!
//! Cross-cutting concerns shared by all layers.

pub mod errors;
