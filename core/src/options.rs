use crate::FatDirError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Image file used when the caller does not name one
pub const DEFAULT_IMAGE_NAME: &str = "FileSystem.bin";

/// Smallest sector size that still holds a superblock
pub const MIN_SECTOR_SIZE: u16 = 64;

/// Fixed length of the superblock disk label
pub const LABEL_CAPACITY: usize = 32;

/// Geometry and label for a new image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatOptions {
    /// Bytes per sector (>= 64)
    pub sector_size: u16,
    /// Sectors per cluster (>= 1)
    pub cluster_size: u16,
    /// Total disk size in clusters
    pub disk_size: u16,
    pub label: String,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            sector_size: 64,
            cluster_size: 1,
            disk_size: 10,
            label: "A".to_string(),
        }
    }
}

impl FormatOptions {
    pub fn new(sector_size: u16, cluster_size: u16, disk_size: u16) -> Self {
        Self {
            sector_size,
            cluster_size,
            disk_size,
            ..Self::default()
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Load options from a JSON file. Missing fields take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, FatDirError> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Bytes in one cluster
    pub fn cluster_bytes(&self) -> u64 {
        self.sector_size as u64 * self.cluster_size as u64
    }

    /// Bytes in the whole image
    pub fn image_bytes(&self) -> u64 {
        self.cluster_bytes() * self.disk_size as u64
    }

    pub fn validate(&self) -> Result<(), FatDirError> {
        if self.sector_size < MIN_SECTOR_SIZE {
            return Err(FatDirError::LayoutInfeasible(format!(
                "Sector size {} is below the minimum of {} bytes",
                self.sector_size, MIN_SECTOR_SIZE
            )));
        }
        if self.cluster_size == 0 {
            return Err(FatDirError::LayoutInfeasible(
                "Cluster size must be at least 1 sector".to_string(),
            ));
        }
        if self.disk_size == 0 {
            return Err(FatDirError::LayoutInfeasible(
                "Disk size must be at least 1 cluster".to_string(),
            ));
        }
        if self.cluster_bytes() > u32::MAX as u64 {
            return Err(FatDirError::LayoutInfeasible(format!(
                "Cluster of {} bytes is too large",
                self.cluster_bytes()
            )));
        }
        if self.label.len() > LABEL_CAPACITY {
            return Err(FatDirError::InvalidInput(format!(
                "Disk label '{}' exceeds {} bytes",
                self.label, LABEL_CAPACITY
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_match_driver_geometry() {
        let options = FormatOptions::default();
        assert_eq!(options.sector_size, 64);
        assert_eq!(options.cluster_size, 1);
        assert_eq!(options.disk_size, 10);
        assert_eq!(options.image_bytes(), 640);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_geometry() {
        assert!(matches!(
            FormatOptions::new(32, 1, 10).validate(),
            Err(FatDirError::LayoutInfeasible(_))
        ));
        assert!(matches!(
            FormatOptions::new(64, 0, 10).validate(),
            Err(FatDirError::LayoutInfeasible(_))
        ));
        assert!(matches!(
            FormatOptions::new(64, 1, 10).with_label("x".repeat(33)).validate(),
            Err(FatDirError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_load_partial_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "sector_size": 512, "disk_size": 64 }}"#).unwrap();

        let options = FormatOptions::from_json_file(file.path()).unwrap();
        assert_eq!(options.sector_size, 512);
        assert_eq!(options.cluster_size, 1);
        assert_eq!(options.disk_size, 64);
        assert_eq!(options.label, "A");
    }
}
