//! In-memory state of one mock graph.

use bytes::Bytes;
use std::collections::HashMap;
use uuid::Uuid;

use crate::config::NicNameScope;
use crate::error::{EngineError, Result};
use crate::traits::ClientRef;
use crate::types::*;

/// Every entity collection of a mock graph.
///
/// Always accessed through the single mutex owned by
/// [`MockClient`](super::MockClient), so a method on `&mut Store` runs
/// atomically with respect to other callers.
pub(super) struct Store {
    /// Back-reference handed to every handle created here.
    pub(super) owner: ClientRef,
    pub(super) nic_name_scope: NicNameScope,
    pub(super) clusters: HashMap<String, Cluster>,
    pub(super) hosts: HashMap<String, Host>,
    pub(super) templates: HashMap<String, Template>,
    pub(super) storage_domains: HashMap<String, StorageDomain>,
    pub(super) datacenters: HashMap<String, Datacenter>,
    pub(super) networks: HashMap<String, Network>,
    pub(super) vnic_profiles: HashMap<String, VnicProfile>,
    pub(super) vms: HashMap<String, VmRecord>,
    pub(super) nics: HashMap<String, Nic>,
    pub(super) disks: HashMap<String, DiskRecord>,
}

/// A VM plus the devices it owns.
pub(super) struct VmRecord {
    pub(super) vm: Vm,
    /// NIC IDs in creation order
    pub(super) nic_ids: Vec<String>,
    pub(super) attachments: Vec<DiskAttachment>,
}

/// A disk plus its image payload.
pub(super) struct DiskRecord {
    pub(super) disk: Disk,
    pub(super) data: Bytes,
}

impl Store {
    pub(super) fn new(owner: ClientRef, nic_name_scope: NicNameScope) -> Self {
        Self {
            owner,
            nic_name_scope,
            clusters: HashMap::new(),
            hosts: HashMap::new(),
            templates: HashMap::new(),
            storage_domains: HashMap::new(),
            datacenters: HashMap::new(),
            networks: HashMap::new(),
            vnic_profiles: HashMap::new(),
            vms: HashMap::new(),
            nics: HashMap::new(),
            disks: HashMap::new(),
        }
    }

    pub(super) fn cluster(&self, id: &str) -> Result<&Cluster> {
        self.clusters
            .get(id)
            .ok_or_else(|| EngineError::not_found("cluster", id))
    }

    pub(super) fn template(&self, id: &str) -> Result<&Template> {
        self.templates
            .get(id)
            .ok_or_else(|| EngineError::not_found("template", id))
    }

    pub(super) fn storage_domain(&self, id: &str) -> Result<&StorageDomain> {
        self.storage_domains
            .get(id)
            .ok_or_else(|| EngineError::not_found("storage domain", id))
    }

    pub(super) fn datacenter(&self, id: &str) -> Result<&Datacenter> {
        self.datacenters
            .get(id)
            .ok_or_else(|| EngineError::not_found("datacenter", id))
    }

    pub(super) fn network(&self, id: &str) -> Result<&Network> {
        self.networks
            .get(id)
            .ok_or_else(|| EngineError::not_found("network", id))
    }

    pub(super) fn vnic_profile(&self, id: &str) -> Result<&VnicProfile> {
        self.vnic_profiles
            .get(id)
            .ok_or_else(|| EngineError::not_found("vNIC profile", id))
    }

    pub(super) fn vm_record(&self, id: &str) -> Result<&VmRecord> {
        self.vms
            .get(id)
            .ok_or_else(|| EngineError::not_found("VM", id))
    }

    pub(super) fn vm_record_mut(&mut self, id: &str) -> Result<&mut VmRecord> {
        self.vms
            .get_mut(id)
            .ok_or_else(|| EngineError::not_found("VM", id))
    }

    pub(super) fn disk_record(&self, id: &str) -> Result<&DiskRecord> {
        self.disks
            .get(id)
            .ok_or_else(|| EngineError::not_found("disk", id))
    }
}

/// Generate an ID not yet used in `collection`.
pub(super) fn fresh_id<V>(collection: &HashMap<String, V>) -> String {
    loop {
        let id = Uuid::new_v4().to_string();
        if !collection.contains_key(&id) {
            return id;
        }
    }
}

/// Reject empty required fields.
pub(super) fn require(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(EngineError::bad_argument(format!("{} cannot be empty", field)));
    }
    Ok(())
}
