// Directory entry and child pointer records
// An entry sits at the start of its cluster; child pointers follow it packed back to back

use byteorder::{BigEndian, ByteOrder, ReadBytesExt};
use fatdir_core::FatDirError;
use std::io::{Cursor, Read};
use super::constants::*;
use super::timestamps::{current_timestamp, join_timestamp, unpack_timestamp};
use chrono::NaiveDateTime;

/// Directory entry as stored on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub entry_type: u8,
    pub creation_date: u16,
    pub creation_time: u16,
    pub name_len: u8,
    pub name: [u8; ENTRY_NAME_CAPACITY],
    pub size: u32,
    pub children_count: u16,
}

impl DirEntry {
    /// New empty directory stamped with the current local time
    pub fn new_directory(name: &str) -> Result<Self, FatDirError> {
        let (date, time) = current_timestamp();
        Self::with_timestamp(name, date, time)
    }

    pub fn with_timestamp(name: &str, creation_date: u16, creation_time: u16) -> Result<Self, FatDirError> {
        let name_bytes = validate_name(name)?;
        let mut buf = [0u8; ENTRY_NAME_CAPACITY];
        buf[..name_bytes.len()].copy_from_slice(name_bytes);

        Ok(Self {
            entry_type: ENTRY_TYPE_DIRECTORY,
            creation_date,
            creation_time,
            name_len: name_bytes.len() as u8,
            name: buf,
            size: 0,
            children_count: 0,
        })
    }

    pub fn is_directory(&self) -> bool {
        self.entry_type == ENTRY_TYPE_DIRECTORY
    }

    /// Stored name bytes, without the zero tail
    pub fn name_bytes(&self) -> &[u8] {
        let len = (self.name_len as usize).min(ENTRY_NAME_CAPACITY);
        &self.name[..len]
    }

    pub fn name_string(&self) -> String {
        String::from_utf8_lossy(self.name_bytes()).into_owned()
    }

    pub fn name_matches(&self, component: &str) -> bool {
        self.name_bytes() == component.as_bytes()
    }

    pub fn created(&self) -> Option<NaiveDateTime> {
        unpack_timestamp(join_timestamp(self.creation_date, self.creation_time))
    }

    pub fn encode(&self) -> [u8; ENTRY_SIZE] {
        let mut bytes = [0u8; ENTRY_SIZE];
        bytes[0] = self.entry_type;
        BigEndian::write_u16(&mut bytes[1..3], self.creation_date);
        BigEndian::write_u16(&mut bytes[3..5], self.creation_time);
        bytes[5] = self.name_len;
        bytes[6..22].copy_from_slice(&self.name);
        BigEndian::write_u32(&mut bytes[22..26], self.size);
        BigEndian::write_u16(&mut bytes[26..28], self.children_count);
        bytes
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, FatDirError> {
        if bytes.len() < ENTRY_SIZE {
            return Err(FatDirError::CorruptImage(format!(
                "Directory entry needs {} bytes, got {}",
                ENTRY_SIZE,
                bytes.len()
            )));
        }

        let mut r = Cursor::new(&bytes[..ENTRY_SIZE]);
        let entry_type = r.read_u8()?;
        let creation_date = r.read_u16::<BigEndian>()?;
        let creation_time = r.read_u16::<BigEndian>()?;
        let name_len = r.read_u8()?;
        let mut name = [0u8; ENTRY_NAME_CAPACITY];
        r.read_exact(&mut name)?;
        let size = r.read_u32::<BigEndian>()?;
        let children_count = r.read_u16::<BigEndian>()?;

        if name_len as usize > ENTRY_NAME_CAPACITY {
            return Err(FatDirError::CorruptImage(format!(
                "Directory entry name length {} exceeds {}",
                name_len, ENTRY_NAME_CAPACITY
            )));
        }

        Ok(Self {
            entry_type,
            creation_date,
            creation_time,
            name_len,
            name,
            size,
            children_count,
        })
    }
}

/// Reject names that do not fit the entry's name buffer
pub fn validate_name(name: &str) -> Result<&[u8], FatDirError> {
    let bytes = name.as_bytes();
    if bytes.len() > ENTRY_NAME_CAPACITY {
        return Err(FatDirError::NameTooLong {
            name: name.to_string(),
            len: bytes.len(),
        });
    }
    if bytes.is_empty() || bytes.contains(&b'/') || bytes.contains(&0) {
        return Err(FatDirError::InvalidInput(format!(
            "Invalid directory name: '{}'",
            name
        )));
    }
    Ok(bytes)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerType {
    Empty,
    Entry,
    Link,
}

impl PointerType {
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            PTR_TYPE_EMPTY => Some(PointerType::Empty),
            PTR_TYPE_ENTRY => Some(PointerType::Entry),
            PTR_TYPE_LINK => Some(PointerType::Link),
            _ => None,
        }
    }

    pub fn tag(self) -> u8 {
        match self {
            PointerType::Empty => PTR_TYPE_EMPTY,
            PointerType::Entry => PTR_TYPE_ENTRY,
            PointerType::Link => PTR_TYPE_LINK,
        }
    }
}

/// Child pointer slot: a child entry, an overflow link, or nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChildPointer {
    pub kind: PointerType,
    pub reserved: u8,
    pub start: u16,
}

impl ChildPointer {
    pub fn empty() -> Self {
        Self { kind: PointerType::Empty, reserved: 0, start: 0 }
    }

    pub fn to_entry(cluster: u16) -> Self {
        Self { kind: PointerType::Entry, reserved: 0, start: cluster }
    }

    pub fn to_overflow(cluster: u16) -> Self {
        Self { kind: PointerType::Link, reserved: 0, start: cluster }
    }

    pub fn encode(&self) -> [u8; POINTER_SIZE] {
        let start = self.start.to_be_bytes();
        [self.kind.tag(), self.reserved, start[0], start[1]]
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, FatDirError> {
        if bytes.len() < POINTER_SIZE {
            return Err(FatDirError::CorruptImage(format!(
                "Child pointer needs {} bytes, got {}",
                POINTER_SIZE,
                bytes.len()
            )));
        }

        let mut r = Cursor::new(&bytes[..POINTER_SIZE]);
        let tag = r.read_u8()?;
        let reserved = r.read_u8()?;
        let start = r.read_u16::<BigEndian>()?;

        let kind = PointerType::from_tag(tag).ok_or_else(|| {
            FatDirError::CorruptImage(format!("Unknown child pointer type {}", tag))
        })?;

        Ok(Self { kind, reserved, start })
    }
}
