//! In-memory mock of the engine for testing higher level code.
//!
//! [`MockClient`] keeps one map per resource kind behind a single mutex. Every
//! factory validates its arguments, resolves every referenced parent, allocates
//! a fresh ID and stores the new resource while holding that lock, so
//! concurrent callers never observe a partial write and racing creations that
//! violate a uniqueness rule cannot both succeed.

mod disk;
mod fixture;
mod infra;
mod nic;
mod store;
mod vm;

use bytes::Bytes;
use rand::distributions::Alphanumeric;
use rand::Rng;
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use tracing::{info, instrument};

use crate::config::MockConfig;
use crate::error::{EngineError, ErrorKind, Result};
use crate::traits::{ClientRef, EngineClient};
use crate::types::*;

pub use fixture::Fixture;
use store::Store;

/// Mock engine client backed by an in-memory resource graph.
///
/// Each instance is an independent graph, so parallel tests can each own one.
/// Share an instance between threads by cloning the `Arc`.
pub struct MockClient {
    url: String,
    store: Mutex<Store>,
    fixture: Fixture,
}

impl MockClient {
    /// Create a mock seeded with the default fixture.
    pub fn new() -> Result<Arc<Self>> {
        Self::with_config(MockConfig::default())
    }

    /// Create a mock seeded according to `config`.
    pub fn with_config(config: MockConfig) -> Result<Arc<Self>> {
        config
            .validate()
            .map_err(|e| EngineError::wrap(e, ErrorKind::BadArgument, "invalid mock configuration"))?;

        let mut seed_error = None;
        let client = Arc::new_cyclic(|me: &Weak<MockClient>| {
            let owner: Weak<dyn EngineClient> = me.clone();
            let mut store = Store::new(ClientRef::new(owner), config.nic_name_scope);
            let fixture = fixture::seed(&mut store, &config.fixture).unwrap_or_else(|e| {
                seed_error = Some(e);
                Fixture::default()
            });
            Self {
                url: config.url.clone(),
                store: Mutex::new(store),
                fixture,
            }
        });

        if let Some(err) = seed_error {
            return Err(err);
        }

        info!(url = %client.url, "Created mock engine client");
        Ok(client)
    }

    /// IDs of the resources seeded at construction.
    pub fn fixture(&self) -> &Fixture {
        &self.fixture
    }

    fn store(&self) -> Result<MutexGuard<'_, Store>> {
        self.store
            .lock()
            .map_err(|_| EngineError::bug("mock store lock poisoned"))
    }
}

/// Random alphanumeric string for unique test resource names.
pub fn generate_random_id(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

impl EngineClient for MockClient {
    fn url(&self) -> &str {
        &self.url
    }

    #[instrument(skip(self))]
    fn create_cluster(&self, name: &str) -> Result<Cluster> {
        self.store()?.create_cluster(name)
    }

    fn get_cluster(&self, id: &str) -> Result<Cluster> {
        self.store()?.cluster(id).cloned()
    }

    fn list_clusters(&self) -> Result<Vec<Cluster>> {
        Ok(self.store()?.list_clusters())
    }

    #[instrument(skip(self))]
    fn create_host(&self, cluster_id: &str) -> Result<Host> {
        self.store()?.create_host(cluster_id)
    }

    fn get_host(&self, id: &str) -> Result<Host> {
        self.store()?.get_host(id)
    }

    fn list_hosts(&self) -> Result<Vec<Host>> {
        Ok(self.store()?.list_hosts())
    }

    fn get_blank_template(&self) -> Result<Template> {
        self.store()?.template(BLANK_TEMPLATE_ID).cloned()
    }

    fn get_template(&self, id: &str) -> Result<Template> {
        self.store()?.template(id).cloned()
    }

    fn list_templates(&self) -> Result<Vec<Template>> {
        Ok(self.store()?.list_templates())
    }

    #[instrument(skip(self))]
    fn create_template(&self, vm_id: &str, name: &str, description: &str) -> Result<Template> {
        self.store()?.create_template(vm_id, name, description)
    }

    #[instrument(skip(self))]
    fn remove_template(&self, id: &str) -> Result<()> {
        self.store()?.remove_template(id)
    }

    #[instrument(skip(self))]
    fn create_storage_domain(&self, name: &str, available: u64) -> Result<StorageDomain> {
        self.store()?.create_storage_domain(name, available)
    }

    fn get_storage_domain(&self, id: &str) -> Result<StorageDomain> {
        self.store()?.storage_domain(id).cloned()
    }

    fn list_storage_domains(&self) -> Result<Vec<StorageDomain>> {
        Ok(self.store()?.list_storage_domains())
    }

    #[instrument(skip(self))]
    fn create_datacenter(&self, name: &str, cluster_ids: &[String]) -> Result<Datacenter> {
        self.store()?.create_datacenter(name, cluster_ids)
    }

    fn get_datacenter(&self, id: &str) -> Result<Datacenter> {
        self.store()?.datacenter(id).cloned()
    }

    fn list_datacenters(&self) -> Result<Vec<Datacenter>> {
        Ok(self.store()?.list_datacenters())
    }

    fn list_datacenter_clusters(&self, datacenter_id: &str) -> Result<Vec<Cluster>> {
        self.store()?.list_datacenter_clusters(datacenter_id)
    }

    #[instrument(skip(self))]
    fn create_network(&self, datacenter_id: &str, name: &str) -> Result<Network> {
        self.store()?.create_network(datacenter_id, name)
    }

    fn get_network(&self, id: &str) -> Result<Network> {
        self.store()?.network(id).cloned()
    }

    fn list_networks(&self) -> Result<Vec<Network>> {
        Ok(self.store()?.list_networks())
    }

    #[instrument(skip(self))]
    fn create_vnic_profile(&self, network_id: &str, name: &str) -> Result<VnicProfile> {
        self.store()?.create_vnic_profile(network_id, name)
    }

    fn get_vnic_profile(&self, id: &str) -> Result<VnicProfile> {
        self.store()?.vnic_profile(id).cloned()
    }

    fn list_vnic_profiles(&self) -> Result<Vec<VnicProfile>> {
        Ok(self.store()?.list_vnic_profiles())
    }

    #[instrument(skip(self, params), fields(vm_name = %name))]
    fn create_vm(
        &self,
        cluster_id: &str,
        name: &str,
        template_id: &str,
        params: VmParams,
    ) -> Result<Vm> {
        self.store()?.create_vm(cluster_id, name, template_id, params)
    }

    fn get_vm(&self, id: &str) -> Result<Vm> {
        Ok(self.store()?.vm_record(id)?.vm.clone())
    }

    fn list_vms(&self) -> Result<Vec<Vm>> {
        Ok(self.store()?.list_vms())
    }

    #[instrument(skip(self))]
    fn remove_vm(&self, id: &str) -> Result<()> {
        self.store()?.remove_vm(id)
    }

    #[instrument(skip(self))]
    fn create_nic(&self, vm_id: &str, name: &str, vnic_profile_id: &str) -> Result<Nic> {
        self.store()?.create_nic(vm_id, name, vnic_profile_id)
    }

    fn get_nic(&self, vm_id: &str, id: &str) -> Result<Nic> {
        self.store()?.get_nic(vm_id, id)
    }

    fn list_nics(&self, vm_id: &str) -> Result<Vec<Nic>> {
        self.store()?.list_nics(vm_id)
    }

    #[instrument(skip(self))]
    fn remove_nic(&self, vm_id: &str, id: &str) -> Result<()> {
        self.store()?.remove_nic(vm_id, id)
    }

    #[instrument(skip(self, params))]
    fn create_disk(
        &self,
        storage_domain_id: &str,
        format: ImageFormat,
        provisioned_size: u64,
        params: DiskParams,
    ) -> Result<Disk> {
        self.store()?
            .create_disk(storage_domain_id, format, provisioned_size, params)
    }

    fn get_disk(&self, id: &str) -> Result<Disk> {
        Ok(self.store()?.disk_record(id)?.disk.clone())
    }

    fn list_disks(&self) -> Result<Vec<Disk>> {
        Ok(self.store()?.list_disks())
    }

    #[instrument(skip(self))]
    fn remove_disk(&self, id: &str) -> Result<()> {
        self.store()?.remove_disk(id)
    }

    #[instrument(skip(self, data), fields(size = data.len()))]
    fn upload_image(&self, disk_id: &str, data: Bytes) -> Result<()> {
        self.store()?.upload_image(disk_id, data)
    }

    fn download_image(&self, disk_id: &str) -> Result<Bytes> {
        self.store()?.download_image(disk_id)
    }

    #[instrument(skip(self, params))]
    fn attach_disk(
        &self,
        vm_id: &str,
        disk_id: &str,
        interface: DiskInterface,
        params: DiskAttachmentParams,
    ) -> Result<DiskAttachment> {
        self.store()?.attach_disk(vm_id, disk_id, interface, params)
    }

    fn get_disk_attachment(&self, vm_id: &str, id: &str) -> Result<DiskAttachment> {
        self.store()?.get_disk_attachment(vm_id, id)
    }

    fn list_disk_attachments(&self, vm_id: &str) -> Result<Vec<DiskAttachment>> {
        self.store()?.list_disk_attachments(vm_id)
    }

    #[instrument(skip(self))]
    fn detach_disk(&self, vm_id: &str, attachment_id: &str) -> Result<()> {
        self.store()?.detach_disk(vm_id, attachment_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Barrier;
    use std::thread;

    #[test]
    fn test_random_id() {
        let id = generate_random_id(5);
        assert_eq!(id.len(), 5);
        assert!(id.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_invalid_config_is_bad_argument() {
        let mut config = MockConfig::default();
        config.url = String::new();

        let err = MockClient::with_config(config).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::BadArgument);
        assert!(err.message().starts_with("invalid mock configuration"));
    }

    #[test]
    fn test_handles_fail_after_client_dropped() {
        let client = MockClient::new().unwrap();
        let vm = client
            .create_vm(&client.fixture().cluster_id, "orphan", BLANK_TEMPLATE_ID, VmParams::new())
            .unwrap();
        drop(client);

        let err = vm.nics().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Bug);
    }

    #[test]
    fn test_concurrent_nic_creation_single_winner() {
        let client = MockClient::new().unwrap();
        let vm = client
            .create_vm(&client.fixture().cluster_id, "race", BLANK_TEMPLATE_ID, VmParams::new())
            .unwrap();
        let profile = client.fixture().vnic_profile_id.clone();
        let barrier = Barrier::new(2);

        let results: Vec<Result<Nic>> = thread::scope(|s| {
            let handles: Vec<_> = (0..2)
                .map(|_| {
                    let vm = vm.clone();
                    let profile = profile.clone();
                    let barrier = &barrier;
                    s.spawn(move || {
                        barrier.wait();
                        vm.create_nic("eth0", &profile)
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        let loser = results.iter().find_map(|r| r.as_ref().err()).unwrap();
        assert_eq!(loser.kind(), ErrorKind::BadArgument);

        let nics = vm.nics().unwrap();
        assert_eq!(nics.len(), 1);
        assert_eq!(nics[0].name(), "eth0");
    }

    #[test]
    fn test_concurrent_vm_creation_distinct_ids() {
        let client = MockClient::new().unwrap();
        let cluster = client.fixture().cluster_id.clone();

        let ids: Vec<String> = thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|t| {
                    let client = Arc::clone(&client);
                    let cluster = cluster.clone();
                    s.spawn(move || {
                        (0..25)
                            .map(|i| {
                                client
                                    .create_vm(&cluster, &format!("vm-{}-{}", t, i), BLANK_TEMPLATE_ID, VmParams::new())
                                    .unwrap()
                                    .id()
                                    .to_string()
                            })
                            .collect::<Vec<_>>()
                    })
                })
                .collect();
            handles
                .into_iter()
                .flat_map(|h| h.join().unwrap())
                .collect()
        });

        let unique: HashSet<&String> = ids.iter().collect();
        assert_eq!(unique.len(), 200);
        assert_eq!(client.list_vms().unwrap().len(), 200);
    }
}
