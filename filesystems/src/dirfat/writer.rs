// Directory creation
// Allocates a cluster for the child, links it from the parent and commits the allocation table

use fatdir_core::{DirHandle, FatDirError};
use log::{debug, info};
use std::io::{Read, Seek, Write};
use super::directory::{validate_name, ChildPointer, DirEntry};
use super::image::FatImage;
use super::path_resolver::PathResolver;
use super::pointer_chain::{next_slot, NextSlot};

pub struct DirectoryWriter<'a, D> {
    image: &'a mut FatImage<D>,
}

impl<'a, D: Read + Write + Seek> DirectoryWriter<'a, D> {
    pub fn new(image: &'a mut FatImage<D>) -> Self {
        Self { image }
    }

    /// Create directory `name` under `parent` and return its handle.
    ///
    /// Clusters are reserved in memory before anything is written, so `DiskFull`
    /// and name errors leave the image untouched. The allocation table is written
    /// last; until then the new clusters still read as free.
    pub fn mkdir(&mut self, parent: DirHandle, name: &str) -> Result<DirHandle, FatDirError> {
        validate_name(name)?;

        let mut parent_entry = self.image.read_entry(parent)?;
        if PathResolver::new(self.image).find_child(parent, name)?.is_some() {
            return Err(FatDirError::AlreadyExists(format!(
                "Directory {} already has a child named '{}'",
                parent, name
            )));
        }

        let slot = next_slot(self.image, parent, parent_entry.children_count)?;
        let needed = match slot {
            NextSlot::Free { .. } => 1,
            NextSlot::Overflow { .. } => 2,
        };
        let added_slots = needed as u16;
        let new_count = parent_entry
            .children_count
            .checked_add(added_slots)
            .ok_or_else(|| FatDirError::CorruptImage(format!(
                "Directory {} children count overflows",
                parent
            )))?;

        let clusters = self.image.fat_mut().allocate_many(needed)?;
        let child = DirHandle::new(clusters[0]);
        debug!("Allocated cluster {} for '{}' under {}", child, name, parent);

        let entry = DirEntry::new_directory(name)?;
        self.image.write_directory_cluster(child.cluster(), &entry)?;

        let pointer = ChildPointer::to_entry(child.cluster());
        match slot {
            NextSlot::Free { cluster, offset } => {
                self.image.write_pointer(cluster, offset, &pointer)?;
            }
            NextSlot::Overflow { cluster, offset } => {
                let overflow = clusters[1];
                debug!("Directory {} spills into overflow cluster {}", parent, overflow);
                self.image.write_overflow_cluster(overflow, &[pointer])?;
                self.image.write_pointer(cluster, offset, &ChildPointer::to_overflow(overflow))?;
            }
        }

        parent_entry.children_count = new_count;
        self.image.write_entry(parent, &parent_entry)?;
        self.image.flush_fat()?;

        info!("Created directory '{}' at cluster {} under {}", name, child, parent);
        Ok(child)
    }
}
