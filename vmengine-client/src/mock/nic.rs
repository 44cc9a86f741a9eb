//! NIC operations.

use tracing::info;

use super::store::{fresh_id, require, Store};
use crate::config::NicNameScope;
use crate::error::{EngineError, Result};
use crate::types::*;

impl Store {
    pub(super) fn create_nic(&mut self, vm_id: &str, name: &str, vnic_profile_id: &str) -> Result<Nic> {
        require("VM ID", vm_id)?;
        require("NIC name", name)?;
        require("vNIC profile ID", vnic_profile_id)?;
        self.vm_record(vm_id)?;
        let network_id = self.vnic_profile(vnic_profile_id)?.network_id.clone();
        self.check_nic_name(vm_id, name, vnic_profile_id, &network_id)?;

        let nic = Nic {
            client: self.owner.clone(),
            id: fresh_id(&self.nics),
            name: name.to_string(),
            vm_id: vm_id.to_string(),
            vnic_profile_id: vnic_profile_id.to_string(),
            network_id,
        };
        self.vm_record_mut(vm_id)?.nic_ids.push(nic.id.clone());
        self.nics.insert(nic.id.clone(), nic.clone());

        info!(nic_id = %nic.id, vm_id = %vm_id, nic_name = %name, "Mock NIC created");
        Ok(nic)
    }

    /// Reject `name` if another NIC on the VM collides under the configured scope.
    fn check_nic_name(&self, vm_id: &str, name: &str, vnic_profile_id: &str, network_id: &str) -> Result<()> {
        let record = self.vm_record(vm_id)?;
        let clash = record
            .nic_ids
            .iter()
            .filter_map(|id| self.nics.get(id))
            .filter(|nic| nic.name == name)
            .find(|nic| match self.nic_name_scope {
                NicNameScope::Vm => true,
                NicNameScope::ProfileAndNetwork => {
                    nic.vnic_profile_id == vnic_profile_id && nic.network_id == network_id
                }
            });

        match clash {
            Some(existing) => Err(EngineError::bad_argument(format!(
                "VM {} already has a NIC named {} (NIC ID {})",
                vm_id, name, existing.id
            ))),
            None => Ok(()),
        }
    }

    pub(super) fn get_nic(&self, vm_id: &str, id: &str) -> Result<Nic> {
        self.vm_record(vm_id)?;
        self.nics
            .get(id)
            .filter(|nic| nic.vm_id == vm_id)
            .cloned()
            .ok_or_else(|| EngineError::not_found("NIC", id))
    }

    pub(super) fn list_nics(&self, vm_id: &str) -> Result<Vec<Nic>> {
        let record = self.vm_record(vm_id)?;
        Ok(record
            .nic_ids
            .iter()
            .filter_map(|id| self.nics.get(id))
            .cloned()
            .collect())
    }

    pub(super) fn remove_nic(&mut self, vm_id: &str, id: &str) -> Result<()> {
        let record = self.vm_record_mut(vm_id)?;
        let position = record
            .nic_ids
            .iter()
            .position(|nic_id| nic_id == id)
            .ok_or_else(|| EngineError::not_found("NIC", id))?;
        record.nic_ids.remove(position);
        self.nics.remove(id);

        info!(nic_id = %id, vm_id = %vm_id, "Mock NIC removed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::MockClient;
    use crate::config::{MockConfig, NicNameScope};
    use crate::error::ErrorKind;
    use crate::traits::EngineClient;
    use crate::types::*;
    use std::sync::Arc;

    const NIC_NAME: &str = "test_duplicate_name";

    fn client_with_vm(scope: NicNameScope) -> (Arc<MockClient>, Vm) {
        let config = MockConfig {
            nic_name_scope: scope,
            ..MockConfig::default()
        };
        let client = MockClient::with_config(config).unwrap();
        let vm = client
            .create_vm(
                &client.fixture().cluster_id,
                "nic_test",
                BLANK_TEMPLATE_ID,
                VmParams::new(),
            )
            .unwrap();
        (client, vm)
    }

    #[test]
    fn test_nic_creation_and_removal() {
        let (client, vm) = client_with_vm(NicNameScope::ProfileAndNetwork);
        let profile = client.fixture().vnic_profile_id.clone();

        assert!(vm.nics().unwrap().is_empty());
        let nic = vm.create_nic("eth0", &profile).unwrap();
        assert_eq!(nic.vm_id(), vm.id());
        assert_eq!(nic.network_id(), client.fixture().network_id);
        assert_eq!(vm.nics().unwrap().len(), 1);
        assert_eq!(vm.get_nic(nic.id()).unwrap().name(), "eth0");

        nic.remove().unwrap();
        assert!(vm.nics().unwrap().is_empty());
        assert_eq!(nic.remove().unwrap_err().kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_duplicate_name_same_profile_rejected() {
        let (client, vm) = client_with_vm(NicNameScope::ProfileAndNetwork);
        let profile = client.fixture().vnic_profile_id.clone();

        let first = vm.create_nic(NIC_NAME, &profile).unwrap();
        let err = vm.create_nic(NIC_NAME, &profile).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BadArgument);
        assert!(err.message().contains(NIC_NAME));
        assert_eq!(vm.nics().unwrap().len(), 1);

        first.remove().unwrap();
        assert!(vm.nics().unwrap().is_empty());
        vm.create_nic(NIC_NAME, &profile).unwrap();
        assert_eq!(vm.nics().unwrap().len(), 1);
    }

    #[test]
    fn test_duplicate_name_other_profile_same_network() {
        let (client, vm) = client_with_vm(NicNameScope::ProfileAndNetwork);
        let profile = client.fixture().vnic_profile_id.clone();
        let other = client
            .create_vnic_profile(&client.fixture().network_id, "second-profile")
            .unwrap();

        vm.create_nic(NIC_NAME, &profile).unwrap();
        vm.create_nic(NIC_NAME, other.id()).unwrap();
        assert_eq!(vm.nics().unwrap().len(), 2);
    }

    #[test]
    fn test_duplicate_name_other_profile_other_network() {
        let (client, vm) = client_with_vm(NicNameScope::ProfileAndNetwork);
        let profile = client.fixture().vnic_profile_id.clone();
        let network = client
            .create_network(&client.fixture().datacenter_id, "backend")
            .unwrap();
        let other = client.create_vnic_profile(network.id(), "backend").unwrap();

        vm.create_nic(NIC_NAME, &profile).unwrap();
        let nic = vm.create_nic(NIC_NAME, other.id()).unwrap();
        assert_eq!(nic.network_id(), network.id());
        assert_eq!(vm.nics().unwrap().len(), 2);
    }

    #[test]
    fn test_vm_scope_rejects_any_reuse() {
        let (client, vm) = client_with_vm(NicNameScope::Vm);
        let profile = client.fixture().vnic_profile_id.clone();
        let network = client
            .create_network(&client.fixture().datacenter_id, "backend")
            .unwrap();
        let other = client.create_vnic_profile(network.id(), "backend").unwrap();

        vm.create_nic(NIC_NAME, &profile).unwrap();
        let err = vm.create_nic(NIC_NAME, other.id()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BadArgument);
        assert_eq!(vm.nics().unwrap().len(), 1);
    }

    #[test]
    fn test_same_name_on_different_vms() {
        let (client, vm) = client_with_vm(NicNameScope::Vm);
        let profile = client.fixture().vnic_profile_id.clone();
        let other_vm = client
            .create_vm(&client.fixture().cluster_id, "other", BLANK_TEMPLATE_ID, VmParams::new())
            .unwrap();

        vm.create_nic(NIC_NAME, &profile).unwrap();
        other_vm.create_nic(NIC_NAME, &profile).unwrap();
    }

    #[test]
    fn test_nic_reference_validation() {
        let (client, vm) = client_with_vm(NicNameScope::ProfileAndNetwork);
        let profile = client.fixture().vnic_profile_id.clone();

        let err = client.create_nic("missing-vm", "eth0", &profile).unwrap_err();
        assert_eq!(err.message(), "VM with ID missing-vm not found");

        let err = vm.create_nic("eth0", "missing-profile").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.message(), "vNIC profile with ID missing-profile not found");

        let err = vm.create_nic("", &profile).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BadArgument);
        assert!(vm.nics().unwrap().is_empty());
    }

    #[test]
    fn test_get_nic_is_scoped_to_vm() {
        let (client, vm) = client_with_vm(NicNameScope::ProfileAndNetwork);
        let profile = client.fixture().vnic_profile_id.clone();
        let other_vm = client
            .create_vm(&client.fixture().cluster_id, "other", BLANK_TEMPLATE_ID, VmParams::new())
            .unwrap();

        let nic = vm.create_nic("eth0", &profile).unwrap();
        let err = client.get_nic(other_vm.id(), nic.id()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        let err = client.remove_nic(other_vm.id(), nic.id()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(vm.nics().unwrap().len(), 1);
    }

    #[test]
    fn test_vm_removal_drops_nics() {
        let (client, vm) = client_with_vm(NicNameScope::ProfileAndNetwork);
        let profile = client.fixture().vnic_profile_id.clone();
        let nic = vm.create_nic("eth0", &profile).unwrap();

        vm.remove().unwrap();
        assert_eq!(nic.vm().unwrap_err().kind(), ErrorKind::NotFound);
        assert_eq!(client.list_nics(vm.id()).unwrap_err().kind(), ErrorKind::NotFound);
    }
}
