//! Network Domain Model
//!
//! Represents one protocol variant (mainnet, testnet, custom chain) as an
//! immutable parameter set: address version bytes, extended-key version
//! prefixes, wire magic, port and DNS seeds. The test network additionally
//! carries an alternate parameter set that can be toggled at runtime.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::Validate;

lazy_static! {
    /// Regex for validating DNS seed hostnames
    static ref HOSTNAME_REGEX: Regex =
        Regex::new(r"^[A-Za-z0-9]([A-Za-z0-9-]*[A-Za-z0-9])?(\.[A-Za-z0-9]([A-Za-z0-9-]*[A-Za-z0-9])?)*$")
            .expect("valid regex");
}

/// Validates a list of DNS seed hostnames
fn validate_seed_list(seeds: &[String]) -> Result<(), validator::ValidationError> {
    for seed in seeds {
        if seed.len() > 253 || !HOSTNAME_REGEX.is_match(seed) {
            let mut error = validator::ValidationError::new("hostname");
            error.message = Some(format!("'{seed}' is not a valid DNS seed hostname").into());
            return Err(error);
        }
    }
    Ok(())
}

/// 4-byte wire magic identifying a network, stored big-endian.
///
/// Wire-protocol consumers need the raw bytes, not the integer, so the
/// buffer form is the canonical representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MagicBytes([u8; 4]);

impl MagicBytes {
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value.to_be_bytes())
    }

    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }

    #[must_use]
    pub const fn to_u32(self) -> u32 {
        u32::from_be_bytes(self.0)
    }
}

impl From<u32> for MagicBytes {
    fn from(value: u32) -> Self {
        Self::new(value)
    }
}

impl From<[u8; 4]> for MagicBytes {
    fn from(bytes: [u8; 4]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for MagicBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08x}", self.to_u32())
    }
}

/// A scalar value usable as a reverse-lookup index key.
///
/// The index namespace is deliberately flat: names, aliases, version bytes,
/// extended-key versions and ports all share it, so a caller can resolve a
/// network from a raw value without knowing which field it came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeyValue {
    Text(String),
    Integer(u64),
    Magic(MagicBytes),
}

impl fmt::Display for KeyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => write!(f, "'{text}'"),
            Self::Integer(value) => write!(f, "{value}"),
            Self::Magic(magic) => write!(f, "0x{magic}"),
        }
    }
}

impl From<&str> for KeyValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for KeyValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<u8> for KeyValue {
    fn from(value: u8) -> Self {
        Self::Integer(u64::from(value))
    }
}

impl From<u16> for KeyValue {
    fn from(value: u16) -> Self {
        Self::Integer(u64::from(value))
    }
}

impl From<u32> for KeyValue {
    fn from(value: u32) -> Self {
        Self::Integer(u64::from(value))
    }
}

impl From<u64> for KeyValue {
    fn from(value: u64) -> Self {
        Self::Integer(value)
    }
}

impl From<MagicBytes> for KeyValue {
    fn from(magic: MagicBytes) -> Self {
        Self::Magic(magic)
    }
}

impl From<[u8; 4]> for KeyValue {
    fn from(bytes: [u8; 4]) -> Self {
        Self::Magic(MagicBytes::from(bytes))
    }
}

/// Named scalar fields of a network descriptor, for restricted lookups.
///
/// Some byte values are legitimately reused across fields (one network's
/// `privatekey` byte may equal another's `scripthash` byte); restricting a
/// lookup to specific fields disambiguates which semantic field is meant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkField {
    Name,
    Alias,
    Pubkeyhash,
    Privatekey,
    Scripthash,
    ExtPublicKeyVersion,
    ExtPrivateKeyVersion,
    MagicBytes,
    Port,
}

/// One set of wire-level parameters (magic, port, seeds).
///
/// The test network carries two of these; which one resolves is decided by
/// the alternate-mode flag at read time.
#[derive(Debug, Clone, Default)]
struct VariantParams {
    magic: Option<MagicBytes>,
    port: Option<u16>,
    dns_seeds: Vec<String>,
}

impl VariantParams {
    fn from_config(magic: Option<u32>, port: Option<u16>, dns_seeds: Vec<String>) -> Self {
        Self {
            magic: magic.map(MagicBytes::new),
            port,
            dns_seeds,
        }
    }
}

/// Alternate wire-parameter set for a network (regtest-like configuration)
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct VariantConfig {
    pub magic_bytes: Option<u32>,
    pub port: Option<u16>,
    #[serde(default)]
    #[validate(custom(function = "validate_seed_list"))]
    pub dns_seeds: Vec<String>,
}

/// Configuration record for registering a network.
///
/// All fields except `name` are optional; absent fields are not indexed
/// and resolve to `None` on the built descriptor.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NetworkConfig {
    #[validate(length(min = 1, max = 100, message = "name must be between 1 and 100 characters"))]
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 100, message = "alias must be between 1 and 100 characters"))]
    pub alias: Option<String>,

    pub pubkeyhash: Option<u8>,
    pub privatekey: Option<u8>,
    pub scripthash: Option<u8>,
    pub ext_public_key_version: Option<u32>,
    pub ext_private_key_version: Option<u32>,
    pub magic_bytes: Option<u32>,
    pub port: Option<u16>,

    #[serde(default)]
    #[validate(custom(function = "validate_seed_list"))]
    pub dns_seeds: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub alternate: Option<VariantConfig>,
}

/// Network descriptor entity.
///
/// Every field is fixed at construction; the only mutable state is the
/// alternate-mode flag, kept atomic so resolved reads stay lock-free.
#[derive(Debug)]
pub struct Network {
    name: String,
    alias: Option<String>,
    pubkeyhash: Option<u8>,
    privatekey: Option<u8>,
    scripthash: Option<u8>,
    ext_public_key_version: Option<u32>,
    ext_private_key_version: Option<u32>,
    primary: VariantParams,
    alternate: Option<VariantParams>,
    alternate_enabled: AtomicBool,
}

impl Network {
    /// Build a descriptor from a validated configuration record
    pub(crate) fn from_config(config: NetworkConfig) -> Self {
        Self {
            name: config.name,
            alias: config.alias,
            pubkeyhash: config.pubkeyhash,
            privatekey: config.privatekey,
            scripthash: config.scripthash,
            ext_public_key_version: config.ext_public_key_version,
            ext_private_key_version: config.ext_private_key_version,
            primary: VariantParams::from_config(config.magic_bytes, config.port, config.dns_seeds),
            alternate: config.alternate.map(|alternate| {
                VariantParams::from_config(alternate.magic_bytes, alternate.port, alternate.dns_seeds)
            }),
            alternate_enabled: AtomicBool::new(false),
        }
    }

    /// The active parameter set given the alternate-mode flag
    fn params(&self) -> &VariantParams {
        if self.alternate_mode_enabled() {
            if let Some(alternate) = &self.alternate {
                return alternate;
            }
        }
        &self.primary
    }

    // Getters

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    #[must_use]
    pub fn pubkeyhash(&self) -> Option<u8> {
        self.pubkeyhash
    }

    #[must_use]
    pub fn privatekey(&self) -> Option<u8> {
        self.privatekey
    }

    #[must_use]
    pub fn scripthash(&self) -> Option<u8> {
        self.scripthash
    }

    #[must_use]
    pub fn ext_public_key_version(&self) -> Option<u32> {
        self.ext_public_key_version
    }

    #[must_use]
    pub fn ext_private_key_version(&self) -> Option<u32> {
        self.ext_private_key_version
    }

    /// Wire magic of the active parameter set
    #[must_use]
    pub fn magic_bytes(&self) -> Option<MagicBytes> {
        self.params().magic
    }

    /// Port of the active parameter set
    #[must_use]
    pub fn port(&self) -> Option<u16> {
        self.params().port
    }

    /// DNS seeds of the active parameter set
    #[must_use]
    pub fn dns_seeds(&self) -> &[String] {
        &self.params().dns_seeds
    }

    #[must_use]
    pub fn has_alternate(&self) -> bool {
        self.alternate.is_some()
    }

    #[must_use]
    pub fn alternate_mode_enabled(&self) -> bool {
        self.alternate_enabled.load(Ordering::Acquire)
    }

    /// Switch between the primary and alternate parameter sets.
    ///
    /// A no-op for resolution purposes when the network carries no
    /// alternate set.
    pub fn set_alternate_mode(&self, enabled: bool) {
        self.alternate_enabled.store(enabled, Ordering::Release);
    }

    /// Resolved value of one scalar field, as a lookup key.
    ///
    /// `MagicBytes` and `Port` resolve through the active parameter set,
    /// so restricted lookups see the same values direct reads do.
    #[must_use]
    pub fn field_value(&self, field: NetworkField) -> Option<KeyValue> {
        match field {
            NetworkField::Name => Some(KeyValue::Text(self.name.clone())),
            NetworkField::Alias => self.alias.clone().map(KeyValue::Text),
            NetworkField::Pubkeyhash => self.pubkeyhash.map(KeyValue::from),
            NetworkField::Privatekey => self.privatekey.map(KeyValue::from),
            NetworkField::Scripthash => self.scripthash.map(KeyValue::from),
            NetworkField::ExtPublicKeyVersion => self.ext_public_key_version.map(KeyValue::from),
            NetworkField::ExtPrivateKeyVersion => self.ext_private_key_version.map(KeyValue::from),
            NetworkField::MagicBytes => self.magic_bytes().map(KeyValue::Magic),
            NetworkField::Port => self.port().map(KeyValue::from),
        }
    }

    /// Every scalar value this descriptor claims in the reverse index.
    ///
    /// Seed lists are composite and never indexed. Both parameter sets of
    /// a network with an alternate configuration are indexed, so lookups
    /// by either variant's magic or port resolve regardless of the flag.
    pub(crate) fn index_keys(&self) -> Vec<KeyValue> {
        let mut keys = vec![KeyValue::Text(self.name.clone())];
        if let Some(alias) = &self.alias {
            keys.push(KeyValue::Text(alias.clone()));
        }
        for byte in [self.pubkeyhash, self.privatekey, self.scripthash] {
            if let Some(value) = byte {
                keys.push(KeyValue::from(value));
            }
        }
        for version in [self.ext_public_key_version, self.ext_private_key_version] {
            if let Some(value) = version {
                keys.push(KeyValue::from(value));
            }
        }
        for variant in std::iter::once(&self.primary).chain(self.alternate.as_ref()) {
            if let Some(magic) = variant.magic {
                keys.push(KeyValue::Magic(magic));
            }
            if let Some(port) = variant.port {
                keys.push(KeyValue::from(port));
            }
        }
        keys
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_network_config() -> NetworkConfig {
        NetworkConfig {
            name: "customnet".to_string(),
            alias: Some("mynet".to_string()),
            pubkeyhash: Some(0x10),
            privatekey: Some(0x90),
            scripthash: Some(0x08),
            ext_public_key_version: Some(0x0278_b20e),
            ext_private_key_version: Some(0x0278_ade4),
            magic_bytes: Some(0xe7be_b4d4),
            port: Some(20001),
            dns_seeds: vec!["localhost".to_string(), "mynet.localhost".to_string()],
            alternate: None,
        }
    }

    #[test]
    fn test_magic_bytes_big_endian() {
        let magic = MagicBytes::new(0xe7be_b4d4);
        assert_eq!(magic.as_bytes(), &[0xe7, 0xbe, 0xb4, 0xd4]);
        assert_eq!(magic.to_u32(), 0xe7be_b4d4);
        assert_eq!(magic.to_string(), "e7beb4d4");
    }

    #[test]
    fn test_network_from_config() {
        let network = Network::from_config(test_network_config());
        assert_eq!(network.name(), "customnet");
        assert_eq!(network.alias(), Some("mynet"));
        assert_eq!(network.pubkeyhash(), Some(0x10));
        assert_eq!(network.privatekey(), Some(0x90));
        assert_eq!(network.scripthash(), Some(0x08));
        assert_eq!(network.ext_public_key_version(), Some(0x0278_b20e));
        assert_eq!(network.ext_private_key_version(), Some(0x0278_ade4));
        assert_eq!(network.magic_bytes(), Some(MagicBytes::new(0xe7be_b4d4)));
        assert_eq!(network.port(), Some(20001));
        assert_eq!(network.dns_seeds(), ["localhost", "mynet.localhost"]);
        assert!(!network.has_alternate());
        assert_eq!(network.to_string(), "customnet");
    }

    #[test]
    fn test_absent_fields_resolve_to_none() {
        let network = Network::from_config(NetworkConfig {
            name: "somenet".to_string(),
            ..NetworkConfig::default()
        });
        assert_eq!(network.alias(), None);
        assert_eq!(network.pubkeyhash(), None);
        assert_eq!(network.magic_bytes(), None);
        assert_eq!(network.port(), None);
        assert!(network.dns_seeds().is_empty());
        assert_eq!(network.index_keys(), [KeyValue::Text("somenet".to_string())]);
    }

    #[test]
    fn test_alternate_mode_resolution() {
        let mut config = test_network_config();
        config.alternate = Some(VariantConfig {
            magic_bytes: Some(0x1241_1000),
            port: Some(12411),
            dns_seeds: vec![],
        });
        let network = Network::from_config(config);

        assert_eq!(network.port(), Some(20001));
        network.set_alternate_mode(true);
        assert!(network.alternate_mode_enabled());
        assert_eq!(network.port(), Some(12411));
        assert_eq!(network.magic_bytes(), Some(MagicBytes::new(0x1241_1000)));
        assert!(network.dns_seeds().is_empty());
        network.set_alternate_mode(false);
        assert_eq!(network.port(), Some(20001));
        assert_eq!(network.magic_bytes(), Some(MagicBytes::new(0xe7be_b4d4)));
    }

    #[test]
    fn test_alternate_mode_without_alternate_params() {
        let network = Network::from_config(test_network_config());
        network.set_alternate_mode(true);
        // No alternate set: resolution falls back to the primary values.
        assert_eq!(network.port(), Some(20001));
    }

    #[test]
    fn test_field_value_tracks_active_variant() {
        let mut config = test_network_config();
        config.alternate = Some(VariantConfig {
            magic_bytes: Some(0x1241_1000),
            port: Some(12411),
            dns_seeds: vec![],
        });
        let network = Network::from_config(config);

        assert_eq!(
            network.field_value(NetworkField::Port),
            Some(KeyValue::Integer(20001))
        );
        network.set_alternate_mode(true);
        assert_eq!(
            network.field_value(NetworkField::Port),
            Some(KeyValue::Integer(12411))
        );
        assert_eq!(
            network.field_value(NetworkField::Name),
            Some(KeyValue::Text("customnet".to_string()))
        );
    }

    #[test]
    fn test_index_keys_cover_both_variants_and_skip_seeds() {
        let mut config = test_network_config();
        config.alternate = Some(VariantConfig {
            magic_bytes: Some(0x1241_1000),
            port: Some(12411),
            dns_seeds: vec!["alt.localhost".to_string()],
        });
        let keys = Network::from_config(config).index_keys();

        assert!(keys.contains(&KeyValue::Integer(20001)));
        assert!(keys.contains(&KeyValue::Integer(12411)));
        assert!(keys.contains(&KeyValue::Magic(MagicBytes::new(0xe7be_b4d4))));
        assert!(keys.contains(&KeyValue::Magic(MagicBytes::new(0x1241_1000))));
        assert!(!keys
            .iter()
            .any(|key| *key == KeyValue::Text("localhost".to_string())));
    }

    #[test]
    fn test_config_validation_rejects_bad_seed_hostname() {
        let mut config = test_network_config();
        config.dns_seeds = vec!["not a hostname!".to_string()];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_rejects_empty_name() {
        let config = NetworkConfig::default();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_serde_field_names() {
        let config = test_network_config();
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["name"], "customnet");
        assert_eq!(json["extPublicKeyVersion"], 0x0278_b20e);
        assert_eq!(json["magicBytes"], 0xe7be_b4d4u32);
        assert_eq!(json["dnsSeeds"][0], "localhost");
    }
}
