//! Configuration for the mock backend.
//!
//! The mock can be tuned from a YAML file so that test suites can share one
//! fixture layout:
//!
//! ```yaml
//! url: https://engine.example/ovirt-engine/api
//! nic_name_scope: vm
//! fixture:
//!   cluster_name: Test cluster
//!   storage_domain_available_bytes: 21474836480
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default engine API URL reported by the mock.
pub const DEFAULT_URL: &str = "https://localhost/ovirt-engine/api";

/// Mock backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MockConfig {
    /// Engine API URL reported by the client
    pub url: String,

    /// How NIC names are scoped on a VM
    pub nic_name_scope: NicNameScope,

    /// Seed data for the bootstrap fixture
    pub fixture: FixtureConfig,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            nic_name_scope: NicNameScope::default(),
            fixture: FixtureConfig::default(),
        }
    }
}

/// Rule deciding when two NICs on the same VM collide by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NicNameScope {
    /// Same name is allowed when the (vNIC profile, network) pair differs.
    ProfileAndNetwork,
    /// A name may be used by only one NIC per VM, whatever its profile and
    /// network. This is how a live engine behaves.
    Vm,
}

impl Default for NicNameScope {
    fn default() -> Self {
        Self::ProfileAndNetwork
    }
}

/// Names and sizes used when seeding a new mock.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FixtureConfig {
    pub cluster_name: String,
    pub storage_domain_name: String,
    /// Free space reported by the seeded storage domain
    pub storage_domain_available_bytes: u64,
    pub datacenter_name: String,
    pub network_name: String,
    pub vnic_profile_name: String,
}

impl Default for FixtureConfig {
    fn default() -> Self {
        Self {
            cluster_name: "Test cluster".to_string(),
            storage_domain_name: "Test storage domain".to_string(),
            storage_domain_available_bytes: 10 * 1024 * 1024 * 1024, // 10GiB
            datacenter_name: "test".to_string(),
            network_name: "ovirtmgmt".to_string(),
            vnic_profile_name: "ovirtmgmt".to_string(),
        }
    }
}

impl MockConfig {
    /// Load and validate configuration from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: MockConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.url.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "url".to_string(),
                message: "must not be empty".to_string(),
            });
        }

        let names = [
            ("fixture.cluster_name", &self.fixture.cluster_name),
            ("fixture.storage_domain_name", &self.fixture.storage_domain_name),
            ("fixture.datacenter_name", &self.fixture.datacenter_name),
            ("fixture.network_name", &self.fixture.network_name),
            ("fixture.vnic_profile_name", &self.fixture.vnic_profile_name),
        ];
        for (field, value) in names {
            if value.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    message: "must not be empty".to_string(),
                });
            }
        }

        if self.fixture.storage_domain_available_bytes == 0 {
            return Err(ConfigError::InvalidValue {
                field: "fixture.storage_domain_available_bytes".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }

        Ok(())
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}
