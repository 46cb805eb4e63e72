//! flat memory image bundling many assets for flash
//!
//! Layout: a 1024 byte directory (4 directory units then 60 file units, 16
//! bytes each) followed by the file data in insertion order.
//!
//! | Field  | Bytes | Directory unit        | File unit                |
//! |--------|-------|-----------------------|--------------------------|
//! | name   | 8     | lowercase, not NUL terminated                    |
//! | offset | 4     | index of first file   | byte offset in the image |
//! | size   | 4     | number of files       | byte length              |

use std::fmt;

use log::debug;

use crate::core::{Wav12Error, Wav12Result};
use crate::reader::Cursor;

pub const NAME_LEN: usize = 8;
pub const NUM_DIRS: usize = 4;
pub const NUM_FILES: usize = 60;
pub const UNIT_SIZE: usize = NAME_LEN + 8;
pub const DIRECTORY_SIZE: usize = (NUM_DIRS + NUM_FILES) * UNIT_SIZE;

/// one 16 byte directory entry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemUnit {
    name: [u8; NAME_LEN],
    pub offset: u32,
    pub size: u32,
}

impl MemUnit {
    fn new(name: &str, offset: u32, size: u32) -> Wav12Result<Self> {
        Ok(MemUnit {
            name: pack_name(name)?,
            offset,
            size,
        })
    }

    /// the stored name, without padding
    pub fn name(&self) -> String {
        let end = self.name.iter().position(|&b| b == 0).unwrap_or(NAME_LEN);
        String::from_utf8_lossy(&self.name[..end]).into_owned()
    }

    fn is_unused(&self) -> bool {
        self.name[0] == 0
    }

    fn to_bytes(self) -> [u8; UNIT_SIZE] {
        let mut out = [0u8; UNIT_SIZE];
        out[..NAME_LEN].copy_from_slice(&self.name);
        out[NAME_LEN..NAME_LEN + 4].copy_from_slice(&self.offset.to_le_bytes());
        out[NAME_LEN + 4..].copy_from_slice(&self.size.to_le_bytes());
        out
    }

    fn read(cursor: &mut Cursor) -> Wav12Result<Self> {
        let mut name = [0u8; NAME_LEN];
        name.copy_from_slice(cursor.read_bytes(NAME_LEN)?);
        Ok(MemUnit {
            name,
            offset: cursor.read_u32_le()?,
            size: cursor.read_u32_le()?,
        })
    }
}

/// lowercase and truncate to the fixed name field
fn pack_name(name: &str) -> Wav12Result<[u8; NAME_LEN]> {
    if name.is_empty() {
        return Err(Wav12Error::InvalidAsset("empty image entry name".to_string()));
    }
    let mut out = [0u8; NAME_LEN];
    for (slot, b) in out.iter_mut().zip(name.bytes()) {
        *slot = b.to_ascii_lowercase();
    }
    Ok(out)
}

/// accumulates directories and files, then lays out the image
#[derive(Debug, Default)]
pub struct MemImageBuilder {
    dirs: Vec<MemUnit>,
    files: Vec<MemUnit>,
    data: Vec<u8>,
}

impl MemImageBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// start a directory; following files land in it
    pub fn add_dir(&mut self, name: &str) -> Wav12Result<()> {
        if self.dirs.len() == NUM_DIRS {
            return Err(Wav12Error::out_of_bounds(
                "image directories",
                NUM_DIRS + 1,
                NUM_DIRS,
            ));
        }
        self.dirs
            .push(MemUnit::new(name, self.files.len() as u32, 0)?);
        Ok(())
    }

    /// append a file to the most recent directory
    pub fn add_file(&mut self, name: &str, data: &[u8]) -> Wav12Result<()> {
        if self.files.len() == NUM_FILES {
            return Err(Wav12Error::out_of_bounds(
                "image files",
                NUM_FILES + 1,
                NUM_FILES,
            ));
        }
        let offset = DIRECTORY_SIZE + self.data.len();
        let end = offset + data.len();
        if end > u32::MAX as usize {
            return Err(Wav12Error::out_of_bounds(
                "image bytes",
                end,
                u32::MAX as usize,
            ));
        }
        let unit = MemUnit::new(name, offset as u32, data.len() as u32)?;
        let dir = self.dirs.last_mut().ok_or_else(|| {
            Wav12Error::InvalidAsset(format!("file '{}' added before any directory", name))
        })?;

        dir.size += 1;
        self.files.push(unit);
        self.data.extend_from_slice(data);
        Ok(())
    }

    pub fn num_files(&self) -> usize {
        self.files.len()
    }

    /// directory followed by file data
    pub fn build(&self) -> Vec<u8> {
        let mut image = Vec::with_capacity(DIRECTORY_SIZE + self.data.len());
        let blank = MemUnit::default();
        for i in 0..NUM_DIRS {
            image.extend_from_slice(&self.dirs.get(i).unwrap_or(&blank).to_bytes());
        }
        for i in 0..NUM_FILES {
            image.extend_from_slice(&self.files.get(i).unwrap_or(&blank).to_bytes());
        }
        image.extend_from_slice(&self.data);

        debug!(
            "built memory image: {} dirs, {} files, {} bytes",
            self.dirs.len(),
            self.files.len(),
            image.len()
        );
        image
    }
}

/// read-only view over a built image
#[derive(Debug, Clone)]
pub struct MemImage<'a> {
    data: &'a [u8],
    dirs: Vec<MemUnit>,
    files: Vec<MemUnit>,
}

impl<'a> MemImage<'a> {
    pub fn parse(data: &'a [u8]) -> Wav12Result<Self> {
        let mut cursor = Cursor::new(data);
        let mut dirs = Vec::with_capacity(NUM_DIRS);
        for _ in 0..NUM_DIRS {
            let unit = MemUnit::read(&mut cursor)?;
            if !unit.is_unused() {
                dirs.push(unit);
            }
        }
        let mut files = Vec::with_capacity(NUM_FILES);
        for _ in 0..NUM_FILES {
            files.push(MemUnit::read(&mut cursor)?);
        }
        debug_assert_eq!(cursor.pos(), DIRECTORY_SIZE);

        for dir in &dirs {
            let end = dir.offset as usize + dir.size as usize;
            if end > NUM_FILES {
                return Err(Wav12Error::InvalidAsset(format!(
                    "directory '{}' lists files {}..{}",
                    dir.name(),
                    dir.offset,
                    end
                )));
            }
            for file in &files[dir.offset as usize..end] {
                if file.offset as usize + file.size as usize > data.len() {
                    return Err(Wav12Error::InvalidAsset(format!(
                        "file '{}' runs past the end of the image",
                        file.name()
                    )));
                }
            }
        }

        Ok(MemImage { data, dirs, files })
    }

    pub fn dirs(&self) -> &[MemUnit] {
        &self.dirs
    }

    pub fn files_in(&self, dir: &MemUnit) -> &[MemUnit] {
        let start = dir.offset as usize;
        &self.files[start..start + dir.size as usize]
    }

    pub fn file_data(&self, file: &MemUnit) -> &'a [u8] {
        let start = file.offset as usize;
        &self.data[start..start + file.size as usize]
    }

    /// look up a file by directory and file name (case-insensitive, first 8 chars)
    pub fn find(&self, dir: &str, file: &str) -> Option<&'a [u8]> {
        let dir_key = pack_name(dir).ok()?;
        let file_key = pack_name(file).ok()?;
        let dir = self.dirs.iter().find(|d| d.name == dir_key)?;
        self.files_in(dir)
            .iter()
            .find(|f| f.name == file_key)
            .map(|f| self.file_data(f))
    }
}

impl fmt::Display for MemImage<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Memory image: {} bytes", self.data.len())?;
        for dir in &self.dirs {
            writeln!(f, "{}/ ({} files)", dir.name(), dir.size)?;
            for file in self.files_in(dir) {
                writeln!(
                    f,
                    "  {:<8} offset={:>8} size={:>8}",
                    file.name(),
                    file.offset,
                    file.size
                )?;
            }
        }
        Ok(())
    }
}
