use std::path::{Path, PathBuf};

use crate::vm::{Machine, MachineError, ROM_MAX_SIZE};

/// A named CHIP-8 program image. ROMs are raw opcode streams with no header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rom {
    pub name: String,
    pub data: Vec<u8>,
}

#[derive(Debug, thiserror::Error)]
pub enum RomError {
    #[error("Failed to read ROM file {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("ROM file {} is too large ({size} bytes), max size is {max_size} bytes", path.display())]
    TooLarge {
        path: PathBuf,
        size: usize,
        max_size: usize,
    },
}

impl Rom {
    pub fn new(name: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    /// Reads a ROM image from disk, named after the file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, RomError> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|source| RomError::Read {
            path: path.to_owned(),
            source,
        })?;

        if data.len() > ROM_MAX_SIZE {
            return Err(RomError::TooLarge {
                path: path.to_owned(),
                size: data.len(),
                max_size: ROM_MAX_SIZE,
            });
        }

        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Ok(Self::new(name, data))
    }
}

impl Machine {
    pub fn load_rom(&mut self, rom: &Rom) -> Result<(), MachineError> {
        self.load(&rom.name, &rom.data)
    }
}
