// Allocation table: one big-endian status word per data cluster
// Status is either free or allocated; there is no chain-continuation value

use byteorder::{BigEndian, ByteOrder};
use fatdir_core::FatDirError;
use log::{debug, trace};
use super::constants::*;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocationTable {
    entries: Vec<u16>,
}

impl AllocationTable {
    /// Table with every cluster free
    pub fn new(data_length: u16) -> Self {
        Self {
            entries: vec![FAT_FREE; data_length as usize],
        }
    }

    /// Decode `data_length` status words from the start of the table region
    pub fn from_bytes(bytes: &[u8], data_length: u16) -> Result<Self, FatDirError> {
        let needed = data_length as usize * FAT_ENTRY_SIZE;
        if bytes.len() < needed {
            return Err(FatDirError::CorruptImage(format!(
                "Allocation table needs {} bytes, got {}",
                needed,
                bytes.len()
            )));
        }

        let entries = bytes[..needed]
            .chunks_exact(FAT_ENTRY_SIZE)
            .map(BigEndian::read_u16)
            .collect();
        Ok(Self { entries })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = vec![0u8; self.entries.len() * FAT_ENTRY_SIZE];
        for (chunk, &status) in bytes.chunks_exact_mut(FAT_ENTRY_SIZE).zip(&self.entries) {
            BigEndian::write_u16(chunk, status);
        }
        bytes
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn status(&self, cluster: u16) -> Option<u16> {
        self.entries.get(cluster as usize).copied()
    }

    pub fn is_allocated(&self, cluster: u16) -> bool {
        self.status(cluster) == Some(FAT_ALLOCATED)
    }

    pub fn free_count(&self) -> usize {
        self.entries.iter().filter(|&&s| s == FAT_FREE).count()
    }

    /// Mark a specific cluster allocated (used for the root at format time)
    pub fn mark_allocated(&mut self, cluster: u16) -> Result<(), FatDirError> {
        let slot = self.slot_mut(cluster)?;
        *slot = FAT_ALLOCATED;
        Ok(())
    }

    /// First-fit allocation from index 0 upward
    pub fn allocate(&mut self) -> Result<u16, FatDirError> {
        let index = self
            .entries
            .iter()
            .position(|&s| s == FAT_FREE)
            .ok_or(FatDirError::DiskFull)?;
        self.entries[index] = FAT_ALLOCATED;
        trace!("Allocated data cluster {}", index);
        Ok(index as u16)
    }

    /// Allocate `count` clusters, or none of them
    pub fn allocate_many(&mut self, count: usize) -> Result<Vec<u16>, FatDirError> {
        if self.free_count() < count {
            debug!("Need {} free clusters, only {} available", count, self.free_count());
            return Err(FatDirError::DiskFull);
        }
        (0..count).map(|_| self.allocate()).collect()
    }

    pub fn free(&mut self, cluster: u16) -> Result<(), FatDirError> {
        let slot = self.slot_mut(cluster)?;
        *slot = FAT_FREE;
        trace!("Freed data cluster {}", cluster);
        Ok(())
    }

    fn slot_mut(&mut self, cluster: u16) -> Result<&mut u16, FatDirError> {
        let len = self.entries.len();
        self.entries.get_mut(cluster as usize).ok_or_else(|| {
            FatDirError::InvalidInput(format!(
                "Cluster {} is outside the data area of {} clusters",
                cluster, len
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_fit() {
        let mut fat = AllocationTable::new(4);
        assert_eq!(fat.allocate().unwrap(), 0);
        assert_eq!(fat.allocate().unwrap(), 1);
        fat.free(0).unwrap();
        assert_eq!(fat.allocate().unwrap(), 0);
        assert_eq!(fat.allocate().unwrap(), 2);
        assert_eq!(fat.free_count(), 1);
    }

    #[test]
    fn test_disk_full() {
        let mut fat = AllocationTable::new(2);
        fat.allocate().unwrap();
        fat.allocate().unwrap();
        assert!(matches!(fat.allocate(), Err(FatDirError::DiskFull)));
    }

    #[test]
    fn test_allocate_many_is_all_or_nothing() {
        let mut fat = AllocationTable::new(3);
        fat.mark_allocated(0).unwrap();
        fat.mark_allocated(2).unwrap();
        let before = fat.clone();

        assert!(matches!(fat.allocate_many(2), Err(FatDirError::DiskFull)));
        assert_eq!(fat, before);
        assert_eq!(fat.allocate_many(1).unwrap(), vec![1]);
    }

    #[test]
    fn test_byte_form() {
        let mut fat = AllocationTable::new(3);
        fat.mark_allocated(0).unwrap();
        let bytes = fat.to_bytes();
        assert_eq!(bytes, vec![0xFF, 0xFE, 0xFF, 0xFF, 0xFF, 0xFF]);
        assert_eq!(AllocationTable::from_bytes(&bytes, 3).unwrap(), fat);
        assert!(AllocationTable::from_bytes(&bytes, 4).is_err());
    }

    #[test]
    fn test_out_of_range_cluster() {
        let mut fat = AllocationTable::new(2);
        assert!(matches!(fat.free(2), Err(FatDirError::InvalidInput(_))));
        assert!(!fat.is_allocated(5));
    }
}
