//! Error Types
//!
//! Domain-specific error types for the registry and unit-conversion layers.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::domain::models::network::KeyValue;

/// Errors raised by registry mutations
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The supplied network configuration failed validation
    #[error("invalid network descriptor: {0:?}")]
    InvalidDescriptor(Vec<String>),

    /// A scalar value of the new descriptor is already claimed in the
    /// flat reverse-lookup index by another registered network
    #[error("value {value} is already indexed by network '{owner}'")]
    DuplicateKey { value: KeyValue, owner: String },
}

/// Errors raised by unit construction and conversion
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnitError {
    /// The denomination code is not in the fixed table
    #[error("unknown denomination code '{0}'")]
    UnknownDenomination(String),

    /// Exchange rates must be strictly positive
    #[error("invalid exchange rate: {0}")]
    InvalidExchangeRate(Decimal),

    /// The amount does not fit the integer smallest-unit representation
    #[error("amount {0} is not representable in the smallest unit")]
    AmountOutOfRange(Decimal),
}
