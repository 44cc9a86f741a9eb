//! Disk and disk attachment operations.

use bytes::Bytes;
use tracing::{debug, info};

use super::store::{fresh_id, require, DiskRecord, Store};
use crate::error::{EngineError, Result};
use crate::types::*;

impl Store {
    pub(super) fn create_disk(
        &mut self,
        storage_domain_id: &str,
        format: ImageFormat,
        provisioned_size: u64,
        params: DiskParams,
    ) -> Result<Disk> {
        require("storage domain ID", storage_domain_id)?;
        if provisioned_size == 0 {
            return Err(EngineError::bad_argument("provisioned size must be greater than 0"));
        }
        if let Some(alias) = &params.alias {
            require("disk alias", alias)?;
        }
        self.storage_domain(storage_domain_id)?;

        let id = fresh_id(&self.disks);
        let disk = Disk {
            client: self.owner.clone(),
            alias: params.alias.unwrap_or_else(|| format!("disk-{}", &id[..8])),
            id,
            storage_domain_id: storage_domain_id.to_string(),
            format,
            provisioned_size,
            total_size: 0,
            sparse: params.sparse,
            status: DiskStatus::Ok,
        };
        self.disks.insert(
            disk.id.clone(),
            DiskRecord {
                disk: disk.clone(),
                data: Bytes::new(),
            },
        );

        info!(
            disk_id = %disk.id,
            storage_domain_id = %storage_domain_id,
            format = format.as_str(),
            provisioned_size,
            "Mock disk created"
        );
        Ok(disk)
    }

    pub(super) fn list_disks(&self) -> Vec<Disk> {
        let mut disks: Vec<Disk> = self.disks.values().map(|r| r.disk.clone()).collect();
        disks.sort_by(|a, b| (&a.alias, &a.id).cmp(&(&b.alias, &b.id)));
        debug!(count = disks.len(), "Listed disks");
        disks
    }

    pub(super) fn remove_disk(&mut self, id: &str) -> Result<()> {
        self.disks
            .remove(id)
            .ok_or_else(|| EngineError::not_found("disk", id))?;

        for record in self.vms.values_mut() {
            record.attachments.retain(|a| a.disk_id != id);
        }

        info!(disk_id = %id, "Mock disk removed");
        Ok(())
    }

    pub(super) fn upload_image(&mut self, disk_id: &str, data: Bytes) -> Result<()> {
        let record = self
            .disks
            .get_mut(disk_id)
            .ok_or_else(|| EngineError::not_found("disk", disk_id))?;

        let size = data.len() as u64;
        if size > record.disk.provisioned_size {
            return Err(EngineError::bad_argument(format!(
                "image of {} bytes does not fit disk {} of {} bytes",
                size, disk_id, record.disk.provisioned_size
            )));
        }

        record.disk.total_size = size;
        record.data = data;

        info!(disk_id = %disk_id, size, "Mock disk image uploaded");
        Ok(())
    }

    pub(super) fn download_image(&self, disk_id: &str) -> Result<Bytes> {
        Ok(self.disk_record(disk_id)?.data.clone())
    }

    pub(super) fn attach_disk(
        &mut self,
        vm_id: &str,
        disk_id: &str,
        interface: DiskInterface,
        params: DiskAttachmentParams,
    ) -> Result<DiskAttachment> {
        require("VM ID", vm_id)?;
        require("disk ID", disk_id)?;
        self.vm_record(vm_id)?;
        self.disk_record(disk_id)?;

        let owner = self.owner.clone();
        let record = self.vm_record_mut(vm_id)?;
        if record.attachments.iter().any(|a| a.disk_id == disk_id) {
            return Err(EngineError::bad_argument(format!(
                "disk {} is already attached to VM {}",
                disk_id, vm_id
            )));
        }
        if params.bootable && record.attachments.iter().any(|a| a.bootable) {
            return Err(EngineError::bad_argument(format!(
                "VM {} already has a bootable disk",
                vm_id
            )));
        }

        // The engine reuses the disk ID as the attachment ID.
        let attachment = DiskAttachment {
            client: owner,
            id: disk_id.to_string(),
            vm_id: vm_id.to_string(),
            disk_id: disk_id.to_string(),
            interface,
            bootable: params.bootable,
            active: params.active,
        };
        record.attachments.push(attachment.clone());

        info!(vm_id = %vm_id, disk_id = %disk_id, interface = interface.as_str(), "Mock disk attached");
        Ok(attachment)
    }

    pub(super) fn get_disk_attachment(&self, vm_id: &str, id: &str) -> Result<DiskAttachment> {
        self.vm_record(vm_id)?
            .attachments
            .iter()
            .find(|a| a.id == id)
            .cloned()
            .ok_or_else(|| EngineError::not_found("disk attachment", id))
    }

    pub(super) fn list_disk_attachments(&self, vm_id: &str) -> Result<Vec<DiskAttachment>> {
        Ok(self.vm_record(vm_id)?.attachments.clone())
    }

    pub(super) fn detach_disk(&mut self, vm_id: &str, attachment_id: &str) -> Result<()> {
        let record = self.vm_record_mut(vm_id)?;
        let position = record
            .attachments
            .iter()
            .position(|a| a.id == attachment_id)
            .ok_or_else(|| EngineError::not_found("disk attachment", attachment_id))?;
        record.attachments.remove(position);

        info!(vm_id = %vm_id, attachment_id = %attachment_id, "Mock disk detached");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::MockClient;
    use crate::error::ErrorKind;
    use crate::traits::EngineClient;
    use crate::types::*;
    use bytes::Bytes;

    const MIB: u64 = 1024 * 1024;

    #[test]
    fn test_disk_lifecycle() {
        let client = MockClient::new().unwrap();
        let sd = client.fixture().storage_domain_id.clone();

        let disk = client
            .create_disk(&sd, ImageFormat::Cow, MIB, DiskParams::new().with_alias("root"))
            .unwrap();
        assert_eq!(disk.alias(), "root");
        assert_eq!(disk.format(), ImageFormat::Cow);
        assert!(disk.sparse());
        assert_eq!(disk.status(), DiskStatus::Ok);
        assert_eq!(disk.status().as_str(), "ok");
        assert_eq!(disk.format().as_str(), "cow");
        assert_eq!(disk.storage_domain().unwrap().id(), sd);
        assert_eq!(client.list_disks().unwrap().len(), 1);
        assert_eq!(disk.storage_domain().unwrap().disks().unwrap().len(), 1);

        disk.remove().unwrap();
        assert!(client.list_disks().unwrap().is_empty());
        assert_eq!(client.get_disk(disk.id()).unwrap_err().kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_disk_validation() {
        let client = MockClient::new().unwrap();
        let sd = client.fixture().storage_domain_id.clone();

        let err = client.create_disk(&sd, ImageFormat::Raw, 0, DiskParams::new()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BadArgument);

        let err = client
            .create_disk("missing", ImageFormat::Raw, MIB, DiskParams::new())
            .unwrap_err();
        assert_eq!(err.message(), "storage domain with ID missing not found");
        assert!(client.list_disks().unwrap().is_empty());
    }

    #[test]
    fn test_image_upload_and_download() {
        let client = MockClient::new().unwrap();
        let sd = client.fixture().storage_domain_id.clone();
        let disk = client.create_disk(&sd, ImageFormat::Raw, 16, DiskParams::new()).unwrap();

        disk.upload_image(Bytes::from_static(b"bootsector")).unwrap();
        assert_eq!(disk.download_image().unwrap(), Bytes::from_static(b"bootsector"));
        assert_eq!(client.get_disk(disk.id()).unwrap().total_size(), 10);

        let err = disk.upload_image(Bytes::from(vec![0u8; 17])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BadArgument);
        assert_eq!(disk.download_image().unwrap().len(), 10);
    }

    #[test]
    fn test_attach_and_detach() {
        let client = MockClient::new().unwrap();
        let fixture = client.fixture().clone();
        let vm = client
            .create_vm(&fixture.cluster_id, "vm", BLANK_TEMPLATE_ID, VmParams::new())
            .unwrap();
        let disk = client
            .create_disk(&fixture.storage_domain_id, ImageFormat::Cow, MIB, DiskParams::new())
            .unwrap();

        let attachment = vm
            .attach_disk(disk.id(), DiskInterface::Virtio, DiskAttachmentParams::new().with_bootable(true))
            .unwrap();
        assert_eq!(attachment.id(), disk.id());
        assert!(attachment.bootable());
        assert!(attachment.active());
        assert_eq!(attachment.disk().unwrap().id(), disk.id());
        let fetched = client.get_disk_attachment(vm.id(), attachment.id()).unwrap();
        assert_eq!(fetched.interface(), DiskInterface::Virtio);
        assert_eq!(fetched.vm().unwrap().id(), vm.id());

        let err = vm
            .attach_disk(disk.id(), DiskInterface::Sata, DiskAttachmentParams::new())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BadArgument);

        attachment.detach().unwrap();
        assert!(vm.disk_attachments().unwrap().is_empty());
        // The disk outlives the attachment.
        assert!(client.get_disk(disk.id()).is_ok());
    }

    #[test]
    fn test_single_bootable_disk_per_vm() {
        let client = MockClient::new().unwrap();
        let fixture = client.fixture().clone();
        let vm = client
            .create_vm(&fixture.cluster_id, "vm", BLANK_TEMPLATE_ID, VmParams::new())
            .unwrap();
        let boot = client
            .create_disk(&fixture.storage_domain_id, ImageFormat::Cow, MIB, DiskParams::new())
            .unwrap();
        let data = client
            .create_disk(&fixture.storage_domain_id, ImageFormat::Cow, MIB, DiskParams::new())
            .unwrap();

        let bootable = DiskAttachmentParams::new().with_bootable(true);
        vm.attach_disk(boot.id(), DiskInterface::Virtio, bootable.clone()).unwrap();
        let err = vm.attach_disk(data.id(), DiskInterface::Virtio, bootable).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BadArgument);
        vm.attach_disk(data.id(), DiskInterface::VirtioScsi, DiskAttachmentParams::new())
            .unwrap();
        assert_eq!(vm.disk_attachments().unwrap().len(), 2);
    }

    #[test]
    fn test_disk_removal_detaches() {
        let client = MockClient::new().unwrap();
        let fixture = client.fixture().clone();
        let vm = client
            .create_vm(&fixture.cluster_id, "vm", BLANK_TEMPLATE_ID, VmParams::new())
            .unwrap();
        let disk = client
            .create_disk(&fixture.storage_domain_id, ImageFormat::Raw, MIB, DiskParams::new())
            .unwrap();
        vm.attach_disk(disk.id(), DiskInterface::Ide, DiskAttachmentParams::new())
            .unwrap();

        disk.remove().unwrap();
        assert!(vm.disk_attachments().unwrap().is_empty());
    }

    #[test]
    fn test_attach_missing_references() {
        let client = MockClient::new().unwrap();
        let fixture = client.fixture().clone();
        let vm = client
            .create_vm(&fixture.cluster_id, "vm", BLANK_TEMPLATE_ID, VmParams::new())
            .unwrap();

        let err = vm
            .attach_disk("missing", DiskInterface::Virtio, DiskAttachmentParams::new())
            .unwrap_err();
        assert_eq!(err.message(), "disk with ID missing not found");

        let err = client.detach_disk(vm.id(), "missing").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
