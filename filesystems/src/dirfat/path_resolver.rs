// Path resolution and directory listing

use fatdir_core::{DirHandle, FatDirError};
use log::{debug, trace};
use std::io::{Read, Seek, Write};
use super::constants::ROOT_NAME;
use super::directory::DirEntry;
use super::image::FatImage;
use super::pointer_chain::child_clusters;

/// A child found while listing a directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListedEntry {
    pub handle: DirHandle,
    pub entry: DirEntry,
}

/// Split an absolute path into its directory names.
///
/// Empty components from repeated, leading or trailing separators are dropped.
/// The first name must be the root.
pub fn split_path(path: &str) -> Result<Vec<&str>, FatDirError> {
    let components: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    match components.first() {
        None => Err(FatDirError::InvalidPath(format!("'{}' names no directory", path))),
        Some(&first) if first != ROOT_NAME => Err(FatDirError::InvalidPath(format!(
            "'{}' does not start at '{}'",
            path, ROOT_NAME
        ))),
        Some(_) => Ok(components),
    }
}

pub struct PathResolver<'a, D> {
    image: &'a mut FatImage<D>,
}

impl<'a, D: Read + Write + Seek> PathResolver<'a, D> {
    pub fn new(image: &'a mut FatImage<D>) -> Self {
        Self { image }
    }

    /// Resolve an absolute path to a directory handle
    pub fn resolve(&mut self, path: &str) -> Result<DirHandle, FatDirError> {
        debug!("Resolving path: {}", path);
        let components = split_path(path)?;

        let mut current = DirHandle::ROOT;
        for component in &components[1..] {
            trace!("Looking up '{}' in directory {}", component, current);
            current = self
                .find_child(current, component)?
                .ok_or_else(|| FatDirError::PathNotFound(format!(
                    "'{}' has no component '{}'",
                    path, component
                )))?;
        }

        debug!("Resolved {} to handle {}", path, current);
        Ok(current)
    }

    /// Handle of the child named `name`, if the directory has one
    pub fn find_child(&mut self, parent: DirHandle, name: &str) -> Result<Option<DirHandle>, FatDirError> {
        let entry = self.image.read_entry(parent)?;
        for cluster in child_clusters(self.image, parent, entry.children_count)? {
            let child = DirHandle::new(cluster);
            if self.image.read_entry(child)?.name_matches(name) {
                return Ok(Some(child));
            }
        }
        Ok(None)
    }

    /// Children of a directory in slot order, overflow clusters included
    pub fn list(&mut self, handle: DirHandle) -> Result<Vec<ListedEntry>, FatDirError> {
        let entry = self.image.read_entry(handle)?;
        child_clusters(self.image, handle, entry.children_count)?
            .into_iter()
            .map(|cluster| {
                let handle = DirHandle::new(cluster);
                Ok(ListedEntry {
                    handle,
                    entry: self.image.read_entry(handle)?,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dirfat::formatter::format_device;
    use fatdir_core::FormatOptions;
    use std::io::Cursor;

    fn formatted() -> FatImage<Cursor<Vec<u8>>> {
        let mut device = Cursor::new(Vec::new());
        format_device(&mut device, &FormatOptions::default()).unwrap();
        FatImage::open(device).unwrap()
    }

    #[test]
    fn test_split_path() {
        assert_eq!(split_path("root").unwrap(), vec!["root"]);
        assert_eq!(split_path("/root//help/").unwrap(), vec!["root", "help"]);
        assert!(matches!(split_path(""), Err(FatDirError::InvalidPath(_))));
        assert!(matches!(split_path("///"), Err(FatDirError::InvalidPath(_))));
        assert!(matches!(split_path("notroot/x"), Err(FatDirError::InvalidPath(_))));
        assert!(matches!(split_path("help/root"), Err(FatDirError::InvalidPath(_))));
    }

    #[test]
    fn test_resolve_root() {
        let mut image = formatted();
        let mut resolver = PathResolver::new(&mut image);
        assert_eq!(resolver.resolve("root").unwrap(), DirHandle::ROOT);
        assert_eq!(resolver.resolve("root/").unwrap(), DirHandle::ROOT);
        assert_eq!(resolver.resolve("/root").unwrap(), DirHandle::ROOT);
    }

    #[test]
    fn test_resolve_missing() {
        let mut image = formatted();
        let mut resolver = PathResolver::new(&mut image);
        assert!(matches!(resolver.resolve("root/missing"), Err(FatDirError::PathNotFound(_))));
        assert!(matches!(resolver.resolve("root/x/y"), Err(FatDirError::PathNotFound(_))));
    }

    #[test]
    fn test_list_empty_root() {
        let mut image = formatted();
        assert!(PathResolver::new(&mut image).list(DirHandle::ROOT).unwrap().is_empty());
    }
}
