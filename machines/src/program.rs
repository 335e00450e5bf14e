//! Program images for loading into machine memory.
//!
//! Two formats: a raw binary placed at an explicit load address, and the
//! PRG layout whose first two bytes hold the little-endian load address.

use std::path::Path;

use retroscope_core::core::Machine;
use retroscope_core::cpu::m6510::RESET_VECTOR;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors that can occur when reading a program image.
#[derive(Debug)]
pub enum ProgramLoadError {
    /// Underlying I/O error (file not found, permission denied, etc.)
    Io(std::io::Error),

    /// The image holds no bytes to load.
    Empty,

    /// A PRG file shorter than its two-byte load address header.
    MissingHeader,

    /// The image runs past $FFFF.
    Overflow { load_address: u16, len: usize },
}

impl std::fmt::Display for ProgramLoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Empty => write!(f, "program image is empty"),
            Self::MissingHeader => write!(f, "PRG file is missing its load address"),
            Self::Overflow { load_address, len } => write!(
                f,
                "{len} bytes at ${load_address:04X} overflow the 64K address space"
            ),
        }
    }
}

impl std::error::Error for ProgramLoadError {}

impl From<std::io::Error> for ProgramLoadError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

// ---------------------------------------------------------------------------
// ProgramImage
// ---------------------------------------------------------------------------

/// A block of code or data and the address it loads at.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProgramImage {
    pub load_address: u16,
    pub bytes: Vec<u8>,
}

impl ProgramImage {
    /// Raw binary at an explicit load address.
    pub fn from_raw(load_address: u16, bytes: Vec<u8>) -> Result<Self, ProgramLoadError> {
        if bytes.is_empty() {
            return Err(ProgramLoadError::Empty);
        }
        if load_address as usize + bytes.len() > 0x10000 {
            return Err(ProgramLoadError::Overflow {
                load_address,
                len: bytes.len(),
            });
        }
        Ok(Self {
            load_address,
            bytes,
        })
    }

    /// PRG layout: two-byte little-endian load address, then the payload.
    pub fn from_prg(data: &[u8]) -> Result<Self, ProgramLoadError> {
        let [lo, hi, payload @ ..] = data else {
            return Err(ProgramLoadError::MissingHeader);
        };
        Self::from_raw(u16::from_le_bytes([*lo, *hi]), payload.to_vec())
    }

    pub fn load_raw_file(path: &Path, load_address: u16) -> Result<Self, ProgramLoadError> {
        Self::from_raw(load_address, std::fs::read(path)?)
    }

    pub fn load_prg_file(path: &Path) -> Result<Self, ProgramLoadError> {
        Self::from_prg(&std::fs::read(path)?)
    }

    /// Address of the last byte.
    pub fn end_address(&self) -> u16 {
        (self.load_address as usize + self.bytes.len() - 1) as u16
    }

    /// Copy the image into `machine` and point the reset vector at `start`,
    /// or at the load address when `start` is `None`.
    pub fn load_into(&self, machine: &mut dyn Machine, start: Option<u16>) {
        machine.load_memory(self.load_address, &self.bytes);
        let [lo, hi] = start.unwrap_or(self.load_address).to_le_bytes();
        machine.poke_memory(RESET_VECTOR, lo);
        machine.poke_memory(RESET_VECTOR.wrapping_add(1), hi);
    }
}
