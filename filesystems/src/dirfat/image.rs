// Loaded image handle
// Owns the device, the decoded superblock and the working copy of the allocation table

use fatdir_core::{DirHandle, FatDirError};
use log::debug;
use std::io::{Read, Seek, SeekFrom, Write};
use super::allocator::AllocationTable;
use super::constants::*;
use super::directory::{ChildPointer, DirEntry};
use super::superblock::Superblock;

pub struct FatImage<D> {
    device: D,
    superblock: Superblock,
    fat: AllocationTable,
}

impl<D: Read + Write + Seek> FatImage<D> {
    /// Load the superblock and allocation table from a formatted device
    pub fn open(mut device: D) -> Result<Self, FatDirError> {
        let device_len = device.seek(SeekFrom::End(0))?;
        if device_len < SUPERBLOCK_SIZE as u64 {
            return Err(FatDirError::CorruptImage(format!(
                "Image of {} bytes is too small to hold a superblock",
                device_len
            )));
        }

        let mut sb_bytes = [0u8; SUPERBLOCK_SIZE];
        device.seek(SeekFrom::Start(0))?;
        device.read_exact(&mut sb_bytes)?;
        let superblock = Superblock::decode(&sb_bytes)?;

        if device_len < superblock.image_bytes() {
            return Err(FatDirError::CorruptImage(format!(
                "Image is {} bytes but the superblock describes {}",
                device_len,
                superblock.image_bytes()
            )));
        }

        let mut fat_bytes = vec![0u8; superblock.data_length as usize * FAT_ENTRY_SIZE];
        device.seek(SeekFrom::Start(superblock.fat_start as u64 * superblock.cluster_bytes()))?;
        device.read_exact(&mut fat_bytes)?;
        let fat = AllocationTable::from_bytes(&fat_bytes, superblock.data_length)?;

        debug!(
            "Opened image: {} data clusters of {} bytes, {} free",
            superblock.data_length,
            superblock.cluster_bytes(),
            fat.free_count()
        );

        Ok(Self { device, superblock, fat })
    }

    pub fn superblock(&self) -> &Superblock {
        &self.superblock
    }

    pub fn fat(&self) -> &AllocationTable {
        &self.fat
    }

    pub fn fat_mut(&mut self) -> &mut AllocationTable {
        &mut self.fat
    }

    pub fn into_inner(self) -> D {
        self.device
    }

    pub fn cluster_bytes(&self) -> usize {
        self.superblock.cluster_bytes() as usize
    }

    /// Pointer slots following the entry in a directory's own cluster
    pub fn initial_capacity(&self) -> usize {
        (self.cluster_bytes() - ENTRY_SIZE) / POINTER_SIZE
    }

    /// Pointer slots in an overflow cluster
    pub fn overflow_capacity(&self) -> usize {
        self.cluster_bytes() / POINTER_SIZE
    }

    /// Fail unless `cluster` lies inside the data area
    pub fn check_cluster(&self, cluster: u16) -> Result<(), FatDirError> {
        if cluster >= self.superblock.data_length {
            return Err(FatDirError::CorruptImage(format!(
                "Cluster {} is outside the data area of {} clusters",
                cluster, self.superblock.data_length
            )));
        }
        Ok(())
    }

    fn data_offset(&self, cluster: u16, offset: usize) -> Result<u64, FatDirError> {
        self.check_cluster(cluster)?;
        let cluster_bytes = self.superblock.cluster_bytes();
        Ok((self.superblock.data_start as u64 + cluster as u64) * cluster_bytes + offset as u64)
    }

    pub fn read_cluster(&mut self, cluster: u16) -> Result<Vec<u8>, FatDirError> {
        let offset = self.data_offset(cluster, 0)?;
        let mut buf = vec![0u8; self.cluster_bytes()];
        self.device.seek(SeekFrom::Start(offset))?;
        self.device.read_exact(&mut buf)?;
        Ok(buf)
    }

    /// Write `bytes` at `offset` within a data cluster
    pub fn write_in_cluster(&mut self, cluster: u16, offset: usize, bytes: &[u8]) -> Result<(), FatDirError> {
        if offset + bytes.len() > self.cluster_bytes() {
            return Err(FatDirError::InvalidInput(format!(
                "Write of {} bytes at offset {} overruns a {}-byte cluster",
                bytes.len(),
                offset,
                self.cluster_bytes()
            )));
        }
        let pos = self.data_offset(cluster, offset)?;
        self.device.seek(SeekFrom::Start(pos))?;
        self.device.write_all(bytes)?;
        Ok(())
    }

    /// Decode the directory entry at a handle, refusing anything that is not a directory
    pub fn read_entry(&mut self, handle: DirHandle) -> Result<DirEntry, FatDirError> {
        let cluster = handle.cluster();
        if cluster >= self.superblock.data_length || !self.fat.is_allocated(cluster) {
            return Err(FatDirError::InvalidInput(format!(
                "Handle {} does not refer to an allocated cluster",
                handle
            )));
        }

        let pos = self.data_offset(cluster, 0)?;
        let mut bytes = [0u8; ENTRY_SIZE];
        self.device.seek(SeekFrom::Start(pos))?;
        self.device.read_exact(&mut bytes)?;

        let entry = DirEntry::decode(&bytes)?;
        if !entry.is_directory() {
            return Err(FatDirError::InvalidInput(format!(
                "Handle {} does not hold a directory entry (type {})",
                handle, entry.entry_type
            )));
        }
        if entry.name_len == 0 {
            return Err(FatDirError::InvalidInput(format!(
                "Handle {} holds an unnamed record, not a directory",
                handle
            )));
        }
        Ok(entry)
    }

    /// Rewrite only the entry header of a directory cluster
    pub fn write_entry(&mut self, handle: DirHandle, entry: &DirEntry) -> Result<(), FatDirError> {
        self.write_in_cluster(handle.cluster(), 0, &entry.encode())
    }

    /// Write a whole directory cluster: the entry followed by empty pointer slots
    pub fn write_directory_cluster(&mut self, cluster: u16, entry: &DirEntry) -> Result<(), FatDirError> {
        let mut buf = vec![0u8; self.cluster_bytes()];
        buf[..ENTRY_SIZE].copy_from_slice(&entry.encode());
        self.write_in_cluster(cluster, 0, &buf)
    }

    /// Write a whole overflow cluster holding `pointers` followed by empty slots
    pub fn write_overflow_cluster(&mut self, cluster: u16, pointers: &[ChildPointer]) -> Result<(), FatDirError> {
        if pointers.len() > self.overflow_capacity() {
            return Err(FatDirError::InvalidInput(format!(
                "{} pointers do not fit an overflow cluster of {} slots",
                pointers.len(),
                self.overflow_capacity()
            )));
        }
        let mut buf = vec![0u8; self.cluster_bytes()];
        for (slot, ptr) in buf.chunks_exact_mut(POINTER_SIZE).zip(pointers) {
            slot.copy_from_slice(&ptr.encode());
        }
        self.write_in_cluster(cluster, 0, &buf)
    }

    pub fn write_pointer(&mut self, cluster: u16, offset: usize, ptr: &ChildPointer) -> Result<(), FatDirError> {
        self.write_in_cluster(cluster, offset, &ptr.encode())
    }

    /// Persist the whole allocation table region
    pub fn flush_fat(&mut self) -> Result<(), FatDirError> {
        let pos = self.superblock.fat_start as u64 * self.superblock.cluster_bytes();
        self.device.seek(SeekFrom::Start(pos))?;
        self.device.write_all(&self.fat.to_bytes())?;
        self.device.flush()?;
        debug!("Flushed allocation table ({} free)", self.fat.free_count());
        Ok(())
    }
}
