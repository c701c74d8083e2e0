//! Network Registry
//!
//! In-memory catalog of network descriptors with a flat reverse-lookup
//! index over every scalar field value. The registry is an explicitly
//! constructed object seeded with the two built-in networks; consumers
//! hold a reference instead of relying on ambient global state.
//!
//! Mutations take a write lock over the ordered sequence and the index;
//! lookups take a read lock. Alternate-mode resolution is atomic on the
//! descriptor itself, so resolved reads need no lock at all.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use validator::Validate;

use crate::domain::models::network::{
    KeyValue, Network, NetworkConfig, NetworkField, VariantConfig,
};
use crate::shared::errors::RegistryError;

/// Argument to [`NetworkRegistry::get`]: either a descriptor handle (for
/// an identity check) or a scalar value to resolve through the reverse
/// index.
#[derive(Debug, Clone)]
pub enum Lookup {
    Descriptor(Arc<Network>),
    Value(KeyValue),
}

impl From<Arc<Network>> for Lookup {
    fn from(network: Arc<Network>) -> Self {
        Self::Descriptor(network)
    }
}

impl From<&Arc<Network>> for Lookup {
    fn from(network: &Arc<Network>) -> Self {
        Self::Descriptor(Arc::clone(network))
    }
}

impl From<KeyValue> for Lookup {
    fn from(value: KeyValue) -> Self {
        Self::Value(value)
    }
}

macro_rules! lookup_from_scalar {
    ($($ty:ty),+) => {
        $(impl From<$ty> for Lookup {
            fn from(value: $ty) -> Self {
                Self::Value(KeyValue::from(value))
            }
        })+
    };
}

lookup_from_scalar!(&str, String, u8, u16, u32, u64, [u8; 4], crate::domain::models::network::MagicBytes);

/// Catalog state: insertion-ordered descriptors plus the flat value index
#[derive(Default)]
struct RegistryState {
    networks: Vec<Arc<Network>>,
    index: HashMap<KeyValue, Arc<Network>>,
}

impl RegistryState {
    fn insert(&mut self, network: Arc<Network>) {
        for key in network.index_keys() {
            self.index.insert(key, Arc::clone(&network));
        }
        self.networks.push(network);
    }
}

/// Registry of network descriptors.
///
/// Seeded at construction with the `livenet`/`mainnet` and
/// `testnet`/`regtest` built-ins; custom networks may be added and
/// removed at runtime.
pub struct NetworkRegistry {
    state: RwLock<RegistryState>,
    livenet: Arc<Network>,
    testnet: Arc<Network>,
}

fn builtin_livenet() -> NetworkConfig {
    NetworkConfig {
        name: "livenet".to_string(),
        alias: Some("mainnet".to_string()),
        pubkeyhash: Some(0x14),
        privatekey: Some(0x2c),
        scripthash: Some(0x28),
        ext_public_key_version: Some(0x140e_1b13),
        ext_private_key_version: Some(0x140e_1b1a),
        magic_bytes: Some(0x1142_1000),
        port: Some(11421),
        dns_seeds: vec![],
        alternate: None,
    }
}

fn builtin_testnet() -> NetworkConfig {
    NetworkConfig {
        name: "testnet".to_string(),
        alias: Some("regtest".to_string()),
        pubkeyhash: Some(0x6f),
        privatekey: Some(0xef),
        scripthash: Some(0xc4),
        ext_public_key_version: Some(0x0435_87cf),
        ext_private_key_version: Some(0x0435_8394),
        magic_bytes: Some(0x1141_1000),
        port: Some(11411),
        dns_seeds: vec![],
        alternate: Some(VariantConfig {
            magic_bytes: Some(0x1241_1000),
            port: Some(12411),
            dns_seeds: vec![],
        }),
    }
}

impl NetworkRegistry {
    /// Create a registry seeded with the built-in networks
    #[must_use]
    pub fn new() -> Self {
        let livenet = Arc::new(Network::from_config(builtin_livenet()));
        let testnet = Arc::new(Network::from_config(builtin_testnet()));
        let mut state = RegistryState::default();
        state.insert(Arc::clone(&livenet));
        state.insert(Arc::clone(&testnet));
        Self {
            state: RwLock::new(state),
            livenet,
            testnet,
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, RegistryState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, RegistryState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// The built-in production network
    #[must_use]
    pub fn livenet(&self) -> &Arc<Network> {
        &self.livenet
    }

    /// The built-in test network
    #[must_use]
    pub fn testnet(&self) -> &Arc<Network> {
        &self.testnet
    }

    /// The network assumed when none is specified
    #[must_use]
    pub fn default_network(&self) -> &Arc<Network> {
        &self.livenet
    }

    /// Register a custom network.
    ///
    /// Every non-absent scalar field is claimed in the reverse index;
    /// seed lists are composite and never indexed.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::InvalidDescriptor` if the configuration
    /// fails validation, or `RegistryError::DuplicateKey` if any of its
    /// scalar values is already indexed by a registered network.
    pub fn add(&self, config: NetworkConfig) -> Result<Arc<Network>, RegistryError> {
        config
            .validate()
            .map_err(|errors| RegistryError::InvalidDescriptor(flatten_validation_errors(&errors)))?;

        tracing::info!(name = %config.name, "registering network");
        let network = Arc::new(Network::from_config(config));

        let mut state = self.write();
        for key in network.index_keys() {
            if let Some(owner) = state.index.get(&key) {
                tracing::warn!(
                    name = %network.name(),
                    key = %key,
                    owner = %owner.name(),
                    "rejecting network: index key already claimed"
                );
                return Err(RegistryError::DuplicateKey {
                    value: key,
                    owner: owner.name().to_string(),
                });
            }
        }
        state.insert(Arc::clone(&network));
        tracing::info!(name = %network.name(), "network registered");
        Ok(network)
    }

    /// Resolve a network from a scalar value or a descriptor handle.
    ///
    /// A descriptor handle resolves to itself when registered; a scalar
    /// value resolves through the flat reverse index. Absence is `None`,
    /// never an error.
    pub fn get(&self, lookup: impl Into<Lookup>) -> Option<Arc<Network>> {
        match lookup.into() {
            Lookup::Descriptor(network) => self
                .read()
                .networks
                .iter()
                .find(|candidate| Arc::ptr_eq(candidate, &network))
                .cloned(),
            Lookup::Value(value) => self.read().index.get(&value).cloned(),
        }
    }

    /// Resolve a network from a scalar value, restricted to the given
    /// fields.
    ///
    /// Descriptors are scanned in registration order; the first whose
    /// resolved value at *any* of the fields equals `value` wins.
    pub fn get_by_fields(
        &self,
        value: impl Into<KeyValue>,
        fields: &[NetworkField],
    ) -> Option<Arc<Network>> {
        let value = value.into();
        self.read()
            .networks
            .iter()
            .find(|network| {
                fields
                    .iter()
                    .any(|field| network.field_value(*field).as_ref() == Some(&value))
            })
            .cloned()
    }

    /// Unregister a network.
    ///
    /// Removes the ordered-sequence entry and every index entry owned by
    /// the descriptor. A no-op when the descriptor is not registered.
    pub fn remove(&self, network: &Arc<Network>) {
        let mut state = self.write();
        let before = state.networks.len();
        state
            .networks
            .retain(|candidate| !Arc::ptr_eq(candidate, network));
        if state.networks.len() == before {
            tracing::debug!(name = %network.name(), "remove: network not registered");
            return;
        }
        state.index.retain(|_, owner| !Arc::ptr_eq(owner, network));
        tracing::info!(name = %network.name(), "network removed");
    }

    /// Switch the built-in test network to its alternate parameter set
    pub fn enable_alternate_mode(&self) {
        tracing::debug!(name = %self.testnet.name(), "enabling alternate mode");
        self.testnet.set_alternate_mode(true);
    }

    /// Restore the built-in test network's primary parameter set
    pub fn disable_alternate_mode(&self) {
        tracing::debug!(name = %self.testnet.name(), "disabling alternate mode");
        self.testnet.set_alternate_mode(false);
    }
}

impl Default for NetworkRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn flatten_validation_errors(errors: &validator::ValidationErrors) -> Vec<String> {
    let mut messages = Vec::new();
    collect_validation_messages(errors, "", &mut messages);
    messages
}

/// Walk every error kind so messages from `#[validate(nested)]` fields
/// survive flattening.
fn collect_validation_messages(
    errors: &validator::ValidationErrors,
    prefix: &str,
    messages: &mut Vec<String>,
) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{prefix}.{field}")
        };
        match kind {
            validator::ValidationErrorsKind::Field(field_errors) => {
                for error in field_errors {
                    match &error.message {
                        Some(message) => messages.push(format!("{path}: {message}")),
                        None => messages.push(format!("{path}: {}", error.code)),
                    }
                }
            }
            validator::ValidationErrorsKind::Struct(nested) => {
                collect_validation_messages(nested, &path, messages);
            }
            validator::ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    collect_validation_messages(nested, &format!("{path}[{index}]"), messages);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::network::MagicBytes;

    fn custom_config() -> NetworkConfig {
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
    fn test_seeds_builtin_networks() {
        let registry = NetworkRegistry::new();
        assert_eq!(registry.livenet().name(), "livenet");
        assert_eq!(registry.testnet().name(), "testnet");
        assert!(Arc::ptr_eq(registry.default_network(), registry.livenet()));
        assert!(Arc::ptr_eq(
            &registry.get("mainnet").unwrap(),
            registry.livenet()
        ));
        assert!(Arc::ptr_eq(
            &registry.get("regtest").unwrap(),
            registry.testnet()
        ));
    }

    #[test]
    fn test_indexes_both_testnet_variants_eagerly() {
        let registry = NetworkRegistry::new();
        // The alternate port/magic resolve to testnet even while the flag
        // is off.
        assert!(Arc::ptr_eq(
            &registry.get(12411u16).unwrap(),
            registry.testnet()
        ));
        assert!(Arc::ptr_eq(
            &registry.get(MagicBytes::new(0x1241_1000)).unwrap(),
            registry.testnet()
        ));
    }

    #[test]
    fn test_add_rejects_duplicate_index_key() {
        let registry = NetworkRegistry::new();
        let mut config = custom_config();
        config.pubkeyhash = Some(0x6f); // claimed by testnet

        let result = registry.add(config);
        assert!(matches!(
            result,
            Err(RegistryError::DuplicateKey { value: KeyValue::Integer(0x6f), .. })
        ));
        assert!(registry.get("customnet").is_none());
    }

    #[test]
    fn test_add_rejects_invalid_descriptor() {
        let registry = NetworkRegistry::new();
        let result = registry.add(NetworkConfig::default());
        assert!(matches!(result, Err(RegistryError::InvalidDescriptor(_))));
    }

    #[test]
    fn test_nested_validation_messages_survive_flattening() {
        let registry = NetworkRegistry::new();
        let mut config = custom_config();
        config.alternate = Some(VariantConfig {
            magic_bytes: None,
            port: None,
            dns_seeds: vec!["bad host!".to_string()],
        });

        match registry.add(config) {
            Err(RegistryError::InvalidDescriptor(messages)) => {
                assert!(!messages.is_empty());
                assert!(messages
                    .iter()
                    .any(|message| message.contains("alternate") && message.contains("bad host!")));
            }
            other => panic!("expected InvalidDescriptor, got {other:?}"),
        }
    }

    #[test]
    fn test_remove_unregistered_is_noop() {
        let registry = NetworkRegistry::new();
        let other = NetworkRegistry::new();
        let foreign = Arc::clone(other.livenet());

        registry.remove(&foreign);
        assert!(registry.get("livenet").is_some());
    }

    #[test]
    fn test_identity_lookup() {
        let registry = NetworkRegistry::new();
        let custom = registry.add(custom_config()).unwrap();
        assert!(Arc::ptr_eq(&registry.get(&custom).unwrap(), &custom));

        registry.remove(&custom);
        assert!(registry.get(&custom).is_none());
    }

    #[test]
    fn test_alternate_mode_toggle_is_idempotent() {
        let registry = NetworkRegistry::new();
        registry.enable_alternate_mode();
        registry.enable_alternate_mode();
        assert_eq!(registry.testnet().port(), Some(12411));
        registry.disable_alternate_mode();
        registry.disable_alternate_mode();
        assert_eq!(registry.testnet().port(), Some(11411));
    }
}
