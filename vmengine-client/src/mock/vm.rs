//! VM and template operations.

use tracing::{debug, info};

use super::store::{fresh_id, require, Store, VmRecord};
use crate::error::{EngineError, Result};
use crate::types::*;

impl Store {
    pub(super) fn create_vm(
        &mut self,
        cluster_id: &str,
        name: &str,
        template_id: &str,
        params: VmParams,
    ) -> Result<Vm> {
        require("cluster ID", cluster_id)?;
        require("name", name)?;
        require("template ID", template_id)?;
        self.cluster(cluster_id)?;
        self.template(template_id)?;

        let vm = Vm {
            client: self.owner.clone(),
            id: fresh_id(&self.vms),
            name: name.to_string(),
            cluster_id: cluster_id.to_string(),
            template_id: template_id.to_string(),
            comment: params.comment.unwrap_or_default(),
        };
        self.vms.insert(
            vm.id.clone(),
            VmRecord {
                vm: vm.clone(),
                nic_ids: Vec::new(),
                attachments: Vec::new(),
            },
        );

        info!(vm_id = %vm.id, vm_name = %vm.name, "Mock VM created");
        Ok(vm)
    }

    pub(super) fn list_vms(&self) -> Vec<Vm> {
        let mut vms: Vec<Vm> = self.vms.values().map(|r| r.vm.clone()).collect();
        vms.sort_by(|a, b| (&a.name, &a.id).cmp(&(&b.name, &b.id)));
        debug!(count = vms.len(), "Listed VMs");
        vms
    }

    pub(super) fn remove_vm(&mut self, id: &str) -> Result<()> {
        let record = self
            .vms
            .remove(id)
            .ok_or_else(|| EngineError::not_found("VM", id))?;

        for nic_id in &record.nic_ids {
            self.nics.remove(nic_id);
        }

        info!(
            vm_id = %id,
            nics = record.nic_ids.len(),
            disk_attachments = record.attachments.len(),
            "Mock VM removed"
        );
        Ok(())
    }

    pub(super) fn create_template(&mut self, vm_id: &str, name: &str, description: &str) -> Result<Template> {
        require("VM ID", vm_id)?;
        require("template name", name)?;
        self.vm_record(vm_id)?;

        let template = Template {
            client: self.owner.clone(),
            id: fresh_id(&self.templates),
            name: name.to_string(),
            description: description.to_string(),
        };
        self.templates.insert(template.id.clone(), template.clone());

        info!(template_id = %template.id, vm_id = %vm_id, "Mock template created");
        Ok(template)
    }

    pub(super) fn remove_template(&mut self, id: &str) -> Result<()> {
        if id == BLANK_TEMPLATE_ID {
            return Err(EngineError::bad_argument("the blank template cannot be removed"));
        }
        self.templates
            .remove(id)
            .ok_or_else(|| EngineError::not_found("template", id))?;

        info!(template_id = %id, "Mock template removed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::MockClient;
    use crate::error::ErrorKind;
    use crate::traits::EngineClient;
    use crate::types::*;
    use std::collections::HashSet;

    #[test]
    fn test_create_vm_unknown_cluster() {
        let client = MockClient::new().unwrap();

        let err = client
            .create_vm("no-such-cluster", "vm", BLANK_TEMPLATE_ID, VmParams::new())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(err.message().contains("cluster"));
        assert!(err.message().contains("no-such-cluster"));
        assert!(client.list_vms().unwrap().is_empty());
    }

    #[test]
    fn test_create_vm_unknown_template() {
        let client = MockClient::new().unwrap();
        let cluster = client.fixture().cluster_id.clone();

        let err = client
            .create_vm(&cluster, "vm", "no-such-template", VmParams::new())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.message(), "template with ID no-such-template not found");
        assert!(client.list_vms().unwrap().is_empty());
    }

    #[test]
    fn test_create_vm_empty_fields() {
        let client = MockClient::new().unwrap();
        let cluster = client.fixture().cluster_id.clone();

        let err = client.create_vm(&cluster, "", BLANK_TEMPLATE_ID, VmParams::new()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BadArgument);
        assert_eq!(err.message(), "name cannot be empty");

        // Syntax is checked before references.
        let err = client.create_vm("missing", "vm", "", VmParams::new()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BadArgument);
        assert_eq!(err.message(), "template ID cannot be empty");
    }

    #[test]
    fn test_create_vm_ids_are_distinct() {
        let client = MockClient::new().unwrap();
        let cluster = client.fixture().cluster_id.clone();

        let mut ids = HashSet::new();
        for i in 0..100 {
            let vm = client
                .create_vm(&cluster, &format!("vm-{}", i), BLANK_TEMPLATE_ID, VmParams::new())
                .unwrap();
            assert_eq!(vm.cluster_id(), cluster);
            assert_eq!(vm.template_id(), BLANK_TEMPLATE_ID);
            ids.insert(vm.id().to_string());
        }
        assert_eq!(ids.len(), 100);
        assert_eq!(client.list_vms().unwrap().len(), 100);
    }

    #[test]
    fn test_vm_handle_round_trip() {
        let client = MockClient::new().unwrap();
        let cluster = client.fixture().cluster_id.clone();

        let vm = client
            .create_vm(&cluster, "web", BLANK_TEMPLATE_ID, VmParams::new().with_comment("frontend"))
            .unwrap();
        let fetched = client.get_vm(vm.id()).unwrap();
        assert_eq!(fetched.name(), "web");
        assert_eq!(fetched.comment(), "frontend");
        assert_eq!(vm.cluster().unwrap().id(), cluster);
        assert!(vm.template().unwrap().is_blank());

        vm.remove().unwrap();
        assert_eq!(client.get_vm(vm.id()).unwrap_err().kind(), ErrorKind::NotFound);
        assert_eq!(vm.remove().unwrap_err().kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_template_from_vm() {
        let client = MockClient::new().unwrap();
        let cluster = client.fixture().cluster_id.clone();
        let vm = client.create_vm(&cluster, "base", BLANK_TEMPLATE_ID, VmParams::new()).unwrap();

        let template = client.create_template(vm.id(), "golden", "golden image").unwrap();
        assert!(!template.is_blank());
        let clone = client.create_vm(&cluster, "clone", template.id(), VmParams::new()).unwrap();
        assert_eq!(clone.template().unwrap().name(), "golden");

        template.remove().unwrap();
        assert_eq!(client.list_templates().unwrap().len(), 1);

        let err = client.create_template("missing", "t", "").unwrap_err();
        assert_eq!(err.message(), "VM with ID missing not found");
    }

    #[test]
    fn test_blank_template_cannot_be_removed() {
        let client = MockClient::new().unwrap();
        let blank = client.get_blank_template().unwrap();

        let err = blank.remove().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BadArgument);
        assert!(client.get_template(BLANK_TEMPLATE_ID).is_ok());
    }
}
