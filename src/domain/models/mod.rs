//! Domain Models

pub mod network;
pub mod unit;
