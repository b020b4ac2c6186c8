// Superblock at image offset 0

use byteorder::{BigEndian, ByteOrder};
use fatdir_core::{FatDirError, FormatOptions, MIN_SECTOR_SIZE};
use super::constants::*;
use super::layout::Layout;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Superblock {
    pub sector_size: u16,
    pub cluster_size: u16,
    pub disk_size: u16,
    pub fat_start: u16,
    pub fat_length: u16,
    pub data_start: u16,
    pub data_length: u16,
    pub disk_name: [u8; DISK_NAME_LEN],
}

impl Superblock {
    pub fn new(options: &FormatOptions, layout: &Layout) -> Self {
        let mut disk_name = [0u8; DISK_NAME_LEN];
        let label = options.label.as_bytes();
        let len = label.len().min(DISK_NAME_LEN);
        disk_name[..len].copy_from_slice(&label[..len]);

        Self {
            sector_size: options.sector_size,
            cluster_size: options.cluster_size,
            disk_size: options.disk_size,
            fat_start: layout.fat_start,
            fat_length: layout.fat_length,
            data_start: layout.data_start,
            data_length: layout.data_length,
            disk_name,
        }
    }

    pub fn cluster_bytes(&self) -> u64 {
        self.sector_size as u64 * self.cluster_size as u64
    }

    pub fn image_bytes(&self) -> u64 {
        self.cluster_bytes() * self.disk_size as u64
    }

    /// Label with the zero tail trimmed
    pub fn label(&self) -> String {
        let end = self.disk_name.iter().position(|&b| b == 0).unwrap_or(DISK_NAME_LEN);
        String::from_utf8_lossy(&self.disk_name[..end]).into_owned()
    }

    pub fn encode(&self) -> [u8; SUPERBLOCK_SIZE] {
        let mut bytes = [0u8; SUPERBLOCK_SIZE];
        BigEndian::write_u16(&mut bytes[SB_SECTOR_SIZE..], self.sector_size);
        BigEndian::write_u16(&mut bytes[SB_CLUSTER_SIZE..], self.cluster_size);
        BigEndian::write_u16(&mut bytes[SB_DISK_SIZE..], self.disk_size);
        BigEndian::write_u16(&mut bytes[SB_FAT_START..], self.fat_start);
        BigEndian::write_u16(&mut bytes[SB_FAT_LENGTH..], self.fat_length);
        BigEndian::write_u16(&mut bytes[SB_DATA_START..], self.data_start);
        BigEndian::write_u16(&mut bytes[SB_DATA_LENGTH..], self.data_length);
        bytes[SB_DISK_NAME..SB_DISK_NAME + DISK_NAME_LEN].copy_from_slice(&self.disk_name);
        bytes
    }

    /// Decode and check the geometry. Anything inconsistent is a corrupt image.
    pub fn decode(bytes: &[u8]) -> Result<Self, FatDirError> {
        if bytes.len() < SUPERBLOCK_SIZE {
            return Err(FatDirError::CorruptImage(format!(
                "Superblock needs {} bytes, got {}",
                SUPERBLOCK_SIZE,
                bytes.len()
            )));
        }

        let mut disk_name = [0u8; DISK_NAME_LEN];
        disk_name.copy_from_slice(&bytes[SB_DISK_NAME..SB_DISK_NAME + DISK_NAME_LEN]);

        let sb = Self {
            sector_size: BigEndian::read_u16(&bytes[SB_SECTOR_SIZE..]),
            cluster_size: BigEndian::read_u16(&bytes[SB_CLUSTER_SIZE..]),
            disk_size: BigEndian::read_u16(&bytes[SB_DISK_SIZE..]),
            fat_start: BigEndian::read_u16(&bytes[SB_FAT_START..]),
            fat_length: BigEndian::read_u16(&bytes[SB_FAT_LENGTH..]),
            data_start: BigEndian::read_u16(&bytes[SB_DATA_START..]),
            data_length: BigEndian::read_u16(&bytes[SB_DATA_LENGTH..]),
            disk_name,
        };
        sb.check()?;
        Ok(sb)
    }

    fn check(&self) -> Result<(), FatDirError> {
        if self.sector_size < MIN_SECTOR_SIZE || self.cluster_size == 0 {
            return Err(FatDirError::CorruptImage(format!(
                "Invalid geometry: sector size {}, cluster size {}",
                self.sector_size, self.cluster_size
            )));
        }
        if self.fat_start != FAT_START_CLUSTER || self.fat_length == 0 || self.data_length == 0 {
            return Err(FatDirError::CorruptImage(format!(
                "Invalid regions: fat {}+{}, data length {}",
                self.fat_start, self.fat_length, self.data_length
            )));
        }
        if self.data_start as u32 != self.fat_start as u32 + self.fat_length as u32 {
            return Err(FatDirError::CorruptImage(format!(
                "Data area starts at {} but allocation table ends at {}",
                self.data_start,
                self.fat_start as u32 + self.fat_length as u32
            )));
        }
        if self.data_start as u32 + self.data_length as u32 > self.disk_size as u32 {
            return Err(FatDirError::CorruptImage(format!(
                "Data area {}+{} overruns disk of {} clusters",
                self.data_start, self.data_length, self.disk_size
            )));
        }
        let cluster_bytes = self.cluster_bytes() as u32;
        if Layout::fat_clusters_needed(self.data_length as u32, cluster_bytes) > self.fat_length as u32 {
            return Err(FatDirError::CorruptImage(format!(
                "Allocation table of {} clusters cannot hold {} entries",
                self.fat_length, self.data_length
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dirfat::layout::calculate_layout;

    fn driver_superblock() -> Superblock {
        let options = FormatOptions::default();
        let layout = calculate_layout(&options).unwrap();
        Superblock::new(&options, &layout)
    }

    #[test]
    fn test_encoded_fields() {
        let bytes = driver_superblock().encode();
        assert_eq!(&bytes[0..14], &[0, 64, 0, 1, 0, 10, 0, 1, 0, 1, 0, 2, 0, 8]);
        assert_eq!(bytes[14], b'A');
        assert!(bytes[15..46].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_decode_checks_geometry() {
        let sb = driver_superblock();
        assert_eq!(Superblock::decode(&sb.encode()).unwrap(), sb);
        assert_eq!(sb.label(), "A");

        let mut bad = sb.clone();
        bad.data_start = 3;
        assert!(matches!(Superblock::decode(&bad.encode()), Err(FatDirError::CorruptImage(_))));

        let mut bad = sb.clone();
        bad.data_length = 9;
        assert!(matches!(Superblock::decode(&bad.encode()), Err(FatDirError::CorruptImage(_))));

        // An unformatted image reads back as all 0xFF
        assert!(Superblock::decode(&[0xFF; SUPERBLOCK_SIZE]).is_err());
    }
}
