//! Network parameter registry and unit conversion for blockchain key
//! management.
//!
//! Two independent components:
//!
//! - [`NetworkRegistry`] — an in-memory catalog of named network
//!   descriptors (address version bytes, extended-key version prefixes,
//!   wire magic, ports, DNS seeds) with lookup by any scalar value, used
//!   by key serialization and address encoding to tell chain variants
//!   apart.
//! - [`Unit`] — an immutable monetary amount backed by an integer count
//!   of the smallest indivisible denomination, with drift-free conversion
//!   across a fixed denomination table and to fiat at a caller-supplied
//!   exchange rate.
//!
//! ```
//! use chain_params::{Denomination, NetworkField, NetworkRegistry, Unit};
//! use rust_decimal_macros::dec;
//!
//! let registry = NetworkRegistry::new();
//! let testnet = registry.get_by_fields(0x6f_u8, &[NetworkField::Pubkeyhash]).unwrap();
//! assert_eq!(testnet.name(), "testnet");
//!
//! let unit = Unit::new(dec!(1.3), Denomination::Mega).unwrap();
//! assert_eq!(unit.to(Denomination::Kilo), dec!(1300));
//! ```

pub mod domain;
pub mod registry;
pub mod shared;

pub use domain::models::network::{
    KeyValue, MagicBytes, Network, NetworkConfig, NetworkField, VariantConfig,
};
pub use domain::models::unit::{Denomination, Unit, UnitObject};
pub use registry::{Lookup, NetworkRegistry};
pub use shared::errors::{RegistryError, UnitError};
