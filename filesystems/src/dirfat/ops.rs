// Path-based operations on an image file
// Every call opens the image, reloads superblock and allocation table, and closes it again

use fatdir_core::{DirHandle, FatDirError, FormatOptions};
use log::debug;
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use super::directory::DirEntry;
use super::formatter::format_image;
use super::image::FatImage;
use super::path_resolver::{split_path, ListedEntry, PathResolver};
use super::superblock::Superblock;
use super::writer::DirectoryWriter;

/// Summary of an image's geometry and usage
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageInfo {
    pub label: String,
    pub sector_size: u16,
    pub cluster_size: u16,
    pub cluster_bytes: u64,
    pub disk_size: u16,
    pub fat_start: u16,
    pub fat_length: u16,
    pub data_start: u16,
    pub data_length: u16,
    pub free_clusters: usize,
    pub root_children: u16,
}

/// An image file addressed by path
#[derive(Debug, Clone)]
pub struct DirFs {
    path: PathBuf,
}

impl DirFs {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open(&self, writable: bool) -> Result<FatImage<File>, FatDirError> {
        debug!("Opening {} (writable: {})", self.path.display(), writable);
        let file = OpenOptions::new().read(true).write(writable).open(&self.path)?;
        FatImage::open(file)
    }

    /// Create or replace the image file
    pub fn format(&self, options: &FormatOptions) -> Result<Superblock, FatDirError> {
        format_image(&self.path, options)
    }

    pub fn opendir(&self, path: &str) -> Result<DirHandle, FatDirError> {
        let mut image = self.open(false)?;
        PathResolver::new(&mut image).resolve(path)
    }

    pub fn mkdir(&self, parent: DirHandle, name: &str) -> Result<DirHandle, FatDirError> {
        let mut image = self.open(true)?;
        DirectoryWriter::new(&mut image).mkdir(parent, name)
    }

    /// Create the last component of `path` inside the directory named by the rest
    pub fn mkdir_path(&self, path: &str) -> Result<DirHandle, FatDirError> {
        let components = split_path(path)?;
        let (name, parents) = match components.split_last() {
            Some((name, parents)) if !parents.is_empty() => (*name, parents),
            _ => {
                return Err(FatDirError::InvalidPath(format!(
                    "'{}' names the root, which already exists",
                    path
                )))
            }
        };

        let mut image = self.open(true)?;
        let parent = PathResolver::new(&mut image).resolve(&parents.join("/"))?;
        DirectoryWriter::new(&mut image).mkdir(parent, name)
    }

    pub fn read_entry(&self, handle: DirHandle) -> Result<DirEntry, FatDirError> {
        self.open(false)?.read_entry(handle)
    }

    pub fn list(&self, path: &str) -> Result<Vec<ListedEntry>, FatDirError> {
        let mut image = self.open(false)?;
        let mut resolver = PathResolver::new(&mut image);
        let handle = resolver.resolve(path)?;
        resolver.list(handle)
    }

    pub fn info(&self) -> Result<ImageInfo, FatDirError> {
        let mut image = self.open(false)?;
        let root_children = image.read_entry(DirHandle::ROOT)?.children_count;
        let sb = image.superblock();

        Ok(ImageInfo {
            label: sb.label(),
            sector_size: sb.sector_size,
            cluster_size: sb.cluster_size,
            cluster_bytes: sb.cluster_bytes(),
            disk_size: sb.disk_size,
            fat_start: sb.fat_start,
            fat_length: sb.fat_length,
            data_start: sb.data_start,
            data_length: sb.data_length,
            free_clusters: image.fat().free_count(),
            root_children,
        })
    }
}
