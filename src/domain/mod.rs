//! Domain Layer
//!
//! Core business entities and value types.

pub mod models;
