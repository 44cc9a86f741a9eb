//! Clusters, hosts, storage domains, datacenters, networks and vNIC profiles.

use tracing::{debug, info};

use super::store::{fresh_id, require, Store};
use crate::error::{EngineError, Result};
use crate::types::*;

impl Store {
    pub(super) fn create_cluster(&mut self, name: &str) -> Result<Cluster> {
        require("cluster name", name)?;

        let cluster = Cluster {
            client: self.owner.clone(),
            id: fresh_id(&self.clusters),
            name: name.to_string(),
        };
        self.clusters.insert(cluster.id.clone(), cluster.clone());

        info!(cluster_id = %cluster.id, "Mock cluster created");
        Ok(cluster)
    }

    pub(super) fn list_clusters(&self) -> Vec<Cluster> {
        let mut clusters: Vec<Cluster> = self.clusters.values().cloned().collect();
        clusters.sort_by(|a, b| (&a.name, &a.id).cmp(&(&b.name, &b.id)));
        debug!(count = clusters.len(), "Listed clusters");
        clusters
    }

    pub(super) fn create_host(&mut self, cluster_id: &str) -> Result<Host> {
        require("cluster ID", cluster_id)?;
        self.cluster(cluster_id)?;

        let host = Host {
            client: self.owner.clone(),
            id: fresh_id(&self.hosts),
            cluster_id: cluster_id.to_string(),
            status: HostStatus::Up,
        };
        self.hosts.insert(host.id.clone(), host.clone());

        info!(host_id = %host.id, cluster_id = %cluster_id, "Mock host created");
        Ok(host)
    }

    pub(super) fn get_host(&self, id: &str) -> Result<Host> {
        self.hosts
            .get(id)
            .cloned()
            .ok_or_else(|| EngineError::not_found("host", id))
    }

    pub(super) fn list_hosts(&self) -> Vec<Host> {
        let mut hosts: Vec<Host> = self.hosts.values().cloned().collect();
        hosts.sort_by(|a, b| a.id.cmp(&b.id));
        hosts
    }

    /// Seed the blank template under its well-known ID.
    pub(super) fn insert_blank_template(&mut self) -> Template {
        let blank = Template {
            client: self.owner.clone(),
            id: BLANK_TEMPLATE_ID.to_string(),
            name: "Blank".to_string(),
            description: "Blank template".to_string(),
        };
        self.templates.insert(blank.id.clone(), blank.clone());
        blank
    }

    pub(super) fn list_templates(&self) -> Vec<Template> {
        let mut templates: Vec<Template> = self.templates.values().cloned().collect();
        templates.sort_by(|a, b| (&a.name, &a.id).cmp(&(&b.name, &b.id)));
        templates
    }

    pub(super) fn create_storage_domain(&mut self, name: &str, available: u64) -> Result<StorageDomain> {
        require("storage domain name", name)?;

        let storage_domain = StorageDomain {
            client: self.owner.clone(),
            id: fresh_id(&self.storage_domains),
            name: name.to_string(),
            available,
            status: StorageDomainStatus::Active,
            external_status: StorageDomainExternalStatus::NotApplicable,
        };
        self.storage_domains
            .insert(storage_domain.id.clone(), storage_domain.clone());

        info!(storage_domain_id = %storage_domain.id, available, "Mock storage domain created");
        Ok(storage_domain)
    }

    pub(super) fn list_storage_domains(&self) -> Vec<StorageDomain> {
        let mut domains: Vec<StorageDomain> = self.storage_domains.values().cloned().collect();
        domains.sort_by(|a, b| (&a.name, &a.id).cmp(&(&b.name, &b.id)));
        domains
    }

    pub(super) fn create_datacenter(&mut self, name: &str, cluster_ids: &[String]) -> Result<Datacenter> {
        require("datacenter name", name)?;

        let mut members: Vec<String> = Vec::with_capacity(cluster_ids.len());
        for cluster_id in cluster_ids {
            self.cluster(cluster_id)?;
            if members.contains(cluster_id) {
                return Err(EngineError::bad_argument(format!(
                    "cluster {} listed more than once",
                    cluster_id
                )));
            }
            members.push(cluster_id.clone());
        }

        let datacenter = Datacenter {
            client: self.owner.clone(),
            id: fresh_id(&self.datacenters),
            name: name.to_string(),
            cluster_ids: members,
        };
        self.datacenters
            .insert(datacenter.id.clone(), datacenter.clone());

        info!(
            datacenter_id = %datacenter.id,
            clusters = datacenter.cluster_ids.len(),
            "Mock datacenter created"
        );
        Ok(datacenter)
    }

    pub(super) fn list_datacenters(&self) -> Vec<Datacenter> {
        let mut datacenters: Vec<Datacenter> = self.datacenters.values().cloned().collect();
        datacenters.sort_by(|a, b| (&a.name, &a.id).cmp(&(&b.name, &b.id)));
        datacenters
    }

    pub(super) fn list_datacenter_clusters(&self, datacenter_id: &str) -> Result<Vec<Cluster>> {
        self.datacenter(datacenter_id)?
            .cluster_ids
            .iter()
            .map(|id| self.cluster(id).cloned())
            .collect()
    }

    pub(super) fn create_network(&mut self, datacenter_id: &str, name: &str) -> Result<Network> {
        require("datacenter ID", datacenter_id)?;
        require("network name", name)?;
        self.datacenter(datacenter_id)?;

        let network = Network {
            client: self.owner.clone(),
            id: fresh_id(&self.networks),
            name: name.to_string(),
            datacenter_id: datacenter_id.to_string(),
        };
        self.networks.insert(network.id.clone(), network.clone());

        info!(network_id = %network.id, datacenter_id = %datacenter_id, "Mock network created");
        Ok(network)
    }

    pub(super) fn list_networks(&self) -> Vec<Network> {
        let mut networks: Vec<Network> = self.networks.values().cloned().collect();
        networks.sort_by(|a, b| (&a.name, &a.id).cmp(&(&b.name, &b.id)));
        networks
    }

    pub(super) fn create_vnic_profile(&mut self, network_id: &str, name: &str) -> Result<VnicProfile> {
        require("network ID", network_id)?;
        require("vNIC profile name", name)?;
        self.network(network_id)?;

        let profile = VnicProfile {
            client: self.owner.clone(),
            id: fresh_id(&self.vnic_profiles),
            name: name.to_string(),
            network_id: network_id.to_string(),
        };
        self.vnic_profiles.insert(profile.id.clone(), profile.clone());

        info!(vnic_profile_id = %profile.id, network_id = %network_id, "Mock vNIC profile created");
        Ok(profile)
    }

    pub(super) fn list_vnic_profiles(&self) -> Vec<VnicProfile> {
        let mut profiles: Vec<VnicProfile> = self.vnic_profiles.values().cloned().collect();
        profiles.sort_by(|a, b| (&a.name, &a.id).cmp(&(&b.name, &b.id)));
        profiles
    }
}
