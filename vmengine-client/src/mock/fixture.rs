//! Baseline content of a new mock.

use tracing::info;

use super::store::Store;
use crate::config::FixtureConfig;
use crate::error::Result;

/// IDs of the resources seeded into every new mock.
#[derive(Debug, Clone, Default)]
pub struct Fixture {
    pub cluster_id: String,
    pub host_id: String,
    pub storage_domain_id: String,
    pub datacenter_id: String,
    pub network_id: String,
    pub vnic_profile_id: String,
    pub blank_template_id: String,
}

/// Seed a referentially valid starting state through the regular factories.
pub(super) fn seed(store: &mut Store, config: &FixtureConfig) -> Result<Fixture> {
    let blank = store.insert_blank_template();
    let cluster = store.create_cluster(&config.cluster_name)?;
    let host = store.create_host(&cluster.id)?;
    let storage_domain =
        store.create_storage_domain(&config.storage_domain_name, config.storage_domain_available_bytes)?;
    let datacenter = store.create_datacenter(&config.datacenter_name, &[cluster.id.clone()])?;
    let network = store.create_network(&datacenter.id, &config.network_name)?;
    let vnic_profile = store.create_vnic_profile(&network.id, &config.vnic_profile_name)?;

    info!(
        cluster_id = %cluster.id,
        datacenter_id = %datacenter.id,
        storage_domain_id = %storage_domain.id,
        "Mock fixture seeded"
    );

    Ok(Fixture {
        cluster_id: cluster.id,
        host_id: host.id,
        storage_domain_id: storage_domain.id,
        datacenter_id: datacenter.id,
        network_id: network.id,
        vnic_profile_id: vnic_profile.id,
        blank_template_id: blank.id,
    })
}
