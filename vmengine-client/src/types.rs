//! Resource handles returned by an [`EngineClient`](crate::EngineClient).
//!
//! Handles are immutable snapshots of an engine object. They can only be
//! obtained from a client, and each one keeps a non-owning reference back to
//! that client so scoped operations (creating a NIC on a VM, removing a disk)
//! can be issued from the handle itself.

use bytes::Bytes;

use crate::error::Result;
use crate::traits::ClientRef;

/// ID of the template every engine ships with.
pub const BLANK_TEMPLATE_ID: &str = "00000000-0000-0000-0000-000000000000";

// =============================================================================
// CLUSTERS & HOSTS
// =============================================================================

/// A group of hosts forming the scheduling domain for VMs.
#[derive(Debug, Clone)]
pub struct Cluster {
    pub(crate) client: ClientRef,
    pub(crate) id: String,
    pub(crate) name: String,
}

impl Cluster {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Hosts that belong to this cluster.
    pub fn hosts(&self) -> Result<Vec<Host>> {
        let hosts = self.client.upgrade()?.list_hosts()?;
        Ok(hosts.into_iter().filter(|h| h.cluster_id == self.id).collect())
    }
}

/// Host power/management state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostStatus {
    Up,
    Down,
    Maintenance,
    NonOperational,
    Installing,
    Unknown,
}

impl HostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            HostStatus::Up => "up",
            HostStatus::Down => "down",
            HostStatus::Maintenance => "maintenance",
            HostStatus::NonOperational => "non_operational",
            HostStatus::Installing => "installing",
            HostStatus::Unknown => "unknown",
        }
    }
}

/// A hypervisor host.
#[derive(Debug, Clone)]
pub struct Host {
    pub(crate) client: ClientRef,
    pub(crate) id: String,
    pub(crate) cluster_id: String,
    pub(crate) status: HostStatus,
}

impl Host {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn cluster_id(&self) -> &str {
        &self.cluster_id
    }

    pub fn status(&self) -> HostStatus {
        self.status
    }

    /// Fetch the cluster this host belongs to.
    pub fn cluster(&self) -> Result<Cluster> {
        self.client.upgrade()?.get_cluster(&self.cluster_id)
    }
}

// =============================================================================
// TEMPLATES
// =============================================================================

/// A reusable VM definition.
#[derive(Debug, Clone)]
pub struct Template {
    pub(crate) client: ClientRef,
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) description: String,
}

impl Template {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// True for the always-present blank template.
    pub fn is_blank(&self) -> bool {
        self.id == BLANK_TEMPLATE_ID
    }

    pub fn remove(&self) -> Result<()> {
        self.client.upgrade()?.remove_template(&self.id)
    }
}

// =============================================================================
// STORAGE DOMAINS
// =============================================================================

/// Internal status of a storage domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageDomainStatus {
    Active,
    Inactive,
    Maintenance,
    Unattached,
    Locked,
    Unknown,
}

impl StorageDomainStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageDomainStatus::Active => "active",
            StorageDomainStatus::Inactive => "inactive",
            StorageDomainStatus::Maintenance => "maintenance",
            StorageDomainStatus::Unattached => "unattached",
            StorageDomainStatus::Locked => "locked",
            StorageDomainStatus::Unknown => "unknown",
        }
    }
}

/// Status reported by an external storage provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageDomainExternalStatus {
    NotApplicable,
    Ok,
    Info,
    Warning,
    Error,
    Failure,
}

impl StorageDomainExternalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageDomainExternalStatus::NotApplicable => "",
            StorageDomainExternalStatus::Ok => "ok",
            StorageDomainExternalStatus::Info => "info",
            StorageDomainExternalStatus::Warning => "warning",
            StorageDomainExternalStatus::Error => "error",
            StorageDomainExternalStatus::Failure => "failure",
        }
    }
}

/// A storage backend providing capacity for disks.
#[derive(Debug, Clone)]
pub struct StorageDomain {
    pub(crate) client: ClientRef,
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) available: u64,
    pub(crate) status: StorageDomainStatus,
    pub(crate) external_status: StorageDomainExternalStatus,
}

impl StorageDomain {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Free space in bytes.
    pub fn available(&self) -> u64 {
        self.available
    }

    pub fn status(&self) -> StorageDomainStatus {
        self.status
    }

    pub fn external_status(&self) -> StorageDomainExternalStatus {
        self.external_status
    }

    /// Disks stored on this domain.
    pub fn disks(&self) -> Result<Vec<Disk>> {
        let disks = self.client.upgrade()?.list_disks()?;
        Ok(disks.into_iter().filter(|d| d.storage_domain_id == self.id).collect())
    }
}

// =============================================================================
// DATACENTERS & NETWORKS
// =============================================================================

/// Top-level grouping of clusters.
#[derive(Debug, Clone)]
pub struct Datacenter {
    pub(crate) client: ClientRef,
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) cluster_ids: Vec<String>,
}

impl Datacenter {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Member cluster IDs in the order they were added.
    pub fn cluster_ids(&self) -> &[String] {
        &self.cluster_ids
    }

    pub fn has_cluster(&self, cluster_id: &str) -> bool {
        self.cluster_ids.iter().any(|id| id == cluster_id)
    }

    /// Fetch the member clusters.
    pub fn clusters(&self) -> Result<Vec<Cluster>> {
        self.client.upgrade()?.list_datacenter_clusters(&self.id)
    }
}

/// A logical network inside a datacenter.
#[derive(Debug, Clone)]
pub struct Network {
    pub(crate) client: ClientRef,
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) datacenter_id: String,
}

impl Network {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn datacenter_id(&self) -> &str {
        &self.datacenter_id
    }

    pub fn datacenter(&self) -> Result<Datacenter> {
        self.client.upgrade()?.get_datacenter(&self.datacenter_id)
    }
}

/// Attachment configuration a NIC binds to.
#[derive(Debug, Clone)]
pub struct VnicProfile {
    pub(crate) client: ClientRef,
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) network_id: String,
}

impl VnicProfile {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn network_id(&self) -> &str {
        &self.network_id
    }

    pub fn network(&self) -> Result<Network> {
        self.client.upgrade()?.get_network(&self.network_id)
    }
}

// =============================================================================
// VMS & NICS
// =============================================================================

/// Optional parameters for VM creation.
#[derive(Debug, Clone, Default)]
pub struct VmParams {
    /// Free-form comment
    pub comment: Option<String>,
}

impl VmParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the VM comment.
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }
}

/// A virtual machine.
#[derive(Debug, Clone)]
pub struct Vm {
    pub(crate) client: ClientRef,
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) cluster_id: String,
    pub(crate) template_id: String,
    pub(crate) comment: String,
}

impl Vm {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cluster_id(&self) -> &str {
        &self.cluster_id
    }

    pub fn template_id(&self) -> &str {
        &self.template_id
    }

    pub fn comment(&self) -> &str {
        &self.comment
    }

    pub fn cluster(&self) -> Result<Cluster> {
        self.client.upgrade()?.get_cluster(&self.cluster_id)
    }

    pub fn template(&self) -> Result<Template> {
        self.client.upgrade()?.get_template(&self.template_id)
    }

    /// Create a NIC on this VM.
    pub fn create_nic(&self, name: &str, vnic_profile_id: &str) -> Result<Nic> {
        self.client.upgrade()?.create_nic(&self.id, name, vnic_profile_id)
    }

    pub fn get_nic(&self, nic_id: &str) -> Result<Nic> {
        self.client.upgrade()?.get_nic(&self.id, nic_id)
    }

    /// NICs of this VM in creation order.
    pub fn nics(&self) -> Result<Vec<Nic>> {
        self.client.upgrade()?.list_nics(&self.id)
    }

    /// Attach an existing disk to this VM.
    pub fn attach_disk(
        &self,
        disk_id: &str,
        interface: DiskInterface,
        params: DiskAttachmentParams,
    ) -> Result<DiskAttachment> {
        self.client.upgrade()?.attach_disk(&self.id, disk_id, interface, params)
    }

    pub fn disk_attachments(&self) -> Result<Vec<DiskAttachment>> {
        self.client.upgrade()?.list_disk_attachments(&self.id)
    }

    /// Remove the VM together with its NICs and disk attachments.
    pub fn remove(&self) -> Result<()> {
        self.client.upgrade()?.remove_vm(&self.id)
    }
}

/// A virtual network interface attached to a VM.
#[derive(Debug, Clone)]
pub struct Nic {
    pub(crate) client: ClientRef,
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) vm_id: String,
    pub(crate) vnic_profile_id: String,
    pub(crate) network_id: String,
}

impl Nic {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn vm_id(&self) -> &str {
        &self.vm_id
    }

    pub fn vnic_profile_id(&self) -> &str {
        &self.vnic_profile_id
    }

    pub fn network_id(&self) -> &str {
        &self.network_id
    }

    pub fn vm(&self) -> Result<Vm> {
        self.client.upgrade()?.get_vm(&self.vm_id)
    }

    pub fn vnic_profile(&self) -> Result<VnicProfile> {
        self.client.upgrade()?.get_vnic_profile(&self.vnic_profile_id)
    }

    /// Remove the NIC and detach it from its VM.
    pub fn remove(&self) -> Result<()> {
        self.client.upgrade()?.remove_nic(&self.vm_id, &self.id)
    }
}

// =============================================================================
// DISKS
// =============================================================================

/// On-disk image format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// Copy-on-write (qcow2)
    Cow,
    Raw,
}

impl ImageFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageFormat::Cow => "cow",
            ImageFormat::Raw => "raw",
        }
    }
}

/// Disk status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiskStatus {
    Ok,
    Locked,
    Illegal,
}

impl DiskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiskStatus::Ok => "ok",
            DiskStatus::Locked => "locked",
            DiskStatus::Illegal => "illegal",
        }
    }
}

/// Optional parameters for disk creation.
#[derive(Debug, Clone)]
pub struct DiskParams {
    pub alias: Option<String>,
    /// Thin provisioning
    pub sparse: bool,
}

impl Default for DiskParams {
    fn default() -> Self {
        Self {
            alias: None,
            sparse: true,
        }
    }
}

impl DiskParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn with_sparse(mut self, sparse: bool) -> Self {
        self.sparse = sparse;
        self
    }
}

/// A disk image on a storage domain.
#[derive(Debug, Clone)]
pub struct Disk {
    pub(crate) client: ClientRef,
    pub(crate) id: String,
    pub(crate) alias: String,
    pub(crate) storage_domain_id: String,
    pub(crate) format: ImageFormat,
    pub(crate) provisioned_size: u64,
    pub(crate) total_size: u64,
    pub(crate) sparse: bool,
    pub(crate) status: DiskStatus,
}

impl Disk {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    pub fn storage_domain_id(&self) -> &str {
        &self.storage_domain_id
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    /// Size visible to the guest, in bytes.
    pub fn provisioned_size(&self) -> u64 {
        self.provisioned_size
    }

    /// Bytes of image data actually stored.
    pub fn total_size(&self) -> u64 {
        self.total_size
    }

    pub fn sparse(&self) -> bool {
        self.sparse
    }

    pub fn status(&self) -> DiskStatus {
        self.status
    }

    pub fn storage_domain(&self) -> Result<StorageDomain> {
        self.client.upgrade()?.get_storage_domain(&self.storage_domain_id)
    }

    /// Replace the image contents.
    pub fn upload_image(&self, data: Bytes) -> Result<()> {
        self.client.upgrade()?.upload_image(&self.id, data)
    }

    pub fn download_image(&self) -> Result<Bytes> {
        self.client.upgrade()?.download_image(&self.id)
    }

    pub fn remove(&self) -> Result<()> {
        self.client.upgrade()?.remove_disk(&self.id)
    }
}

/// Bus a disk is attached through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiskInterface {
    Virtio,
    VirtioScsi,
    Sata,
    Ide,
}

impl DiskInterface {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiskInterface::Virtio => "virtio",
            DiskInterface::VirtioScsi => "virtio_scsi",
            DiskInterface::Sata => "sata",
            DiskInterface::Ide => "ide",
        }
    }
}

/// Optional parameters for attaching a disk.
#[derive(Debug, Clone)]
pub struct DiskAttachmentParams {
    pub bootable: bool,
    pub active: bool,
}

impl Default for DiskAttachmentParams {
    fn default() -> Self {
        Self {
            bootable: false,
            active: true,
        }
    }
}

impl DiskAttachmentParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bootable(mut self, bootable: bool) -> Self {
        self.bootable = bootable;
        self
    }

    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }
}

/// Link between a VM and a disk.
#[derive(Debug, Clone)]
pub struct DiskAttachment {
    pub(crate) client: ClientRef,
    pub(crate) id: String,
    pub(crate) vm_id: String,
    pub(crate) disk_id: String,
    pub(crate) interface: DiskInterface,
    pub(crate) bootable: bool,
    pub(crate) active: bool,
}

impl DiskAttachment {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn vm_id(&self) -> &str {
        &self.vm_id
    }

    pub fn disk_id(&self) -> &str {
        &self.disk_id
    }

    pub fn interface(&self) -> DiskInterface {
        self.interface
    }

    pub fn bootable(&self) -> bool {
        self.bootable
    }

    pub fn active(&self) -> bool {
        self.active
    }

    pub fn vm(&self) -> Result<Vm> {
        self.client.upgrade()?.get_vm(&self.vm_id)
    }

    pub fn disk(&self) -> Result<Disk> {
        self.client.upgrade()?.get_disk(&self.disk_id)
    }

    /// Detach the disk from the VM; the disk itself is kept.
    pub fn detach(&self) -> Result<()> {
        self.client.upgrade()?.detach_disk(&self.vm_id, &self.id)
    }
}
