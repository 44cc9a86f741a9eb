//! Engine client abstraction.

use bytes::Bytes;
use std::fmt;
use std::sync::{Arc, Weak};

use crate::error::{EngineError, Result};
use crate::types::*;

/// Operations offered by an engine client.
///
/// The in-memory [`MockClient`](crate::MockClient) implements this trait with
/// the same existence and uniqueness checks the engine performs, so code
/// written against `dyn EngineClient` can be tested without a live server.
pub trait EngineClient: Send + Sync {
    /// Engine API URL.
    fn url(&self) -> &str;

    // =========================================================================
    // Clusters & Hosts
    // =========================================================================

    /// Create a cluster.
    fn create_cluster(&self, name: &str) -> Result<Cluster>;

    /// Get a cluster by ID.
    fn get_cluster(&self, id: &str) -> Result<Cluster>;

    /// List all clusters.
    fn list_clusters(&self) -> Result<Vec<Cluster>>;

    /// Register a host in an existing cluster.
    fn create_host(&self, cluster_id: &str) -> Result<Host>;

    /// Get a host by ID.
    fn get_host(&self, id: &str) -> Result<Host>;

    /// List all hosts.
    fn list_hosts(&self) -> Result<Vec<Host>>;

    // =========================================================================
    // Templates
    // =========================================================================

    /// Get the template that always exists.
    fn get_blank_template(&self) -> Result<Template>;

    /// Get a template by ID.
    fn get_template(&self, id: &str) -> Result<Template>;

    /// List all templates, the blank template included.
    fn list_templates(&self) -> Result<Vec<Template>>;

    /// Create a template from an existing VM.
    fn create_template(&self, vm_id: &str, name: &str, description: &str) -> Result<Template>;

    /// Remove a template. The blank template cannot be removed.
    fn remove_template(&self, id: &str) -> Result<()>;

    // =========================================================================
    // Storage Domains
    // =========================================================================

    /// Create a storage domain with `available` free bytes.
    fn create_storage_domain(&self, name: &str, available: u64) -> Result<StorageDomain>;

    /// Get a storage domain by ID.
    fn get_storage_domain(&self, id: &str) -> Result<StorageDomain>;

    /// List all storage domains.
    fn list_storage_domains(&self) -> Result<Vec<StorageDomain>>;

    // =========================================================================
    // Datacenters & Networks
    // =========================================================================

    /// Create a datacenter whose members are the given, existing clusters.
    fn create_datacenter(&self, name: &str, cluster_ids: &[String]) -> Result<Datacenter>;

    /// Get a datacenter by ID.
    fn get_datacenter(&self, id: &str) -> Result<Datacenter>;

    /// List all datacenters.
    fn list_datacenters(&self) -> Result<Vec<Datacenter>>;

    /// Member clusters of a datacenter, in member order.
    fn list_datacenter_clusters(&self, datacenter_id: &str) -> Result<Vec<Cluster>>;

    /// Create a network in an existing datacenter.
    fn create_network(&self, datacenter_id: &str, name: &str) -> Result<Network>;

    /// Get a network by ID.
    fn get_network(&self, id: &str) -> Result<Network>;

    /// List all networks.
    fn list_networks(&self) -> Result<Vec<Network>>;

    /// Create a vNIC profile on an existing network.
    fn create_vnic_profile(&self, network_id: &str, name: &str) -> Result<VnicProfile>;

    /// Get a vNIC profile by ID.
    fn get_vnic_profile(&self, id: &str) -> Result<VnicProfile>;

    /// List all vNIC profiles.
    fn list_vnic_profiles(&self) -> Result<Vec<VnicProfile>>;

    // =========================================================================
    // VMs
    // =========================================================================

    /// Create a VM in `cluster_id` from `template_id`.
    fn create_vm(
        &self,
        cluster_id: &str,
        name: &str,
        template_id: &str,
        params: VmParams,
    ) -> Result<Vm>;

    /// Get a VM by ID.
    fn get_vm(&self, id: &str) -> Result<Vm>;

    /// List all VMs.
    fn list_vms(&self) -> Result<Vec<Vm>>;

    /// Remove a VM together with its NICs and disk attachments.
    fn remove_vm(&self, id: &str) -> Result<()>;

    // =========================================================================
    // NICs
    // =========================================================================

    /// Create a NIC on a VM. The name must not collide with another NIC of that VM.
    fn create_nic(&self, vm_id: &str, name: &str, vnic_profile_id: &str) -> Result<Nic>;

    /// Get a NIC of a VM.
    fn get_nic(&self, vm_id: &str, id: &str) -> Result<Nic>;

    /// NICs of a VM in creation order.
    fn list_nics(&self, vm_id: &str) -> Result<Vec<Nic>>;

    /// Remove a NIC from a VM.
    fn remove_nic(&self, vm_id: &str, id: &str) -> Result<()>;

    // =========================================================================
    // Disks
    // =========================================================================

    /// Create a disk on a storage domain.
    fn create_disk(
        &self,
        storage_domain_id: &str,
        format: ImageFormat,
        provisioned_size: u64,
        params: DiskParams,
    ) -> Result<Disk>;

    /// Get a disk by ID.
    fn get_disk(&self, id: &str) -> Result<Disk>;

    /// List all disks.
    fn list_disks(&self) -> Result<Vec<Disk>>;

    /// Remove a disk, detaching it from every VM first.
    fn remove_disk(&self, id: &str) -> Result<()>;

    /// Replace a disk's image contents.
    fn upload_image(&self, disk_id: &str, data: Bytes) -> Result<()>;

    /// Read back a disk's image contents.
    fn download_image(&self, disk_id: &str) -> Result<Bytes>;

    /// Attach an existing disk to a VM.
    fn attach_disk(
        &self,
        vm_id: &str,
        disk_id: &str,
        interface: DiskInterface,
        params: DiskAttachmentParams,
    ) -> Result<DiskAttachment>;

    /// Get a disk attachment of a VM.
    fn get_disk_attachment(&self, vm_id: &str, id: &str) -> Result<DiskAttachment>;

    /// Disk attachments of a VM in attach order.
    fn list_disk_attachments(&self, vm_id: &str) -> Result<Vec<DiskAttachment>>;

    /// Detach a disk from a VM. The disk itself is kept.
    fn detach_disk(&self, vm_id: &str, attachment_id: &str) -> Result<()>;
}

/// Non-owning reference from a resource handle back to its client.
///
/// The client alone owns the resources; handles only use this reference to
/// issue further operations.
#[derive(Clone)]
pub struct ClientRef(Weak<dyn EngineClient>);

impl ClientRef {
    pub(crate) fn new(client: Weak<dyn EngineClient>) -> Self {
        Self(client)
    }

    /// Get the client, failing if it has already been dropped.
    pub fn upgrade(&self) -> Result<Arc<dyn EngineClient>> {
        self.0
            .upgrade()
            .ok_or_else(|| EngineError::bug("the client owning this resource has been dropped"))
    }
}

impl fmt::Debug for ClientRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientRef")
            .field("alive", &(self.0.strong_count() > 0))
            .finish()
    }
}
