//! Flat byte-addressable memory.
//!
//! The LS-8 address space is a single byte wide, so all 256 addresses are
//! always installed and plain reads/writes are total. Bounds errors surface
//! at the arithmetic seams instead (instruction fetch, program counter
//! advance, stack pointer moves) and when installing an oversized image.

use crate::error::VmError;
use serde::{Deserialize, Serialize};

/// Memory size in bytes.
pub const MEM_SIZE: usize = 256;

/// Memory subsystem: 256 bytes, zero-initialized.
#[derive(Clone, Serialize, Deserialize)]
pub struct Memory {
    /// Flat byte storage.
    data: Vec<u8>,
}

impl Memory {
    /// Create a new zeroed memory.
    pub fn new() -> Self {
        Self {
            data: vec![0; MEM_SIZE],
        }
    }

    /// Install a program image starting at address 0.
    ///
    /// Bytes past the image keep their current contents.
    pub fn load(&mut self, image: &[u8]) -> Result<(), VmError> {
        if image.len() > MEM_SIZE {
            return Err(VmError::ProgramTooLarge { len: image.len() });
        }
        self.data[..image.len()].copy_from_slice(image);
        Ok(())
    }

    /// Read the byte at `addr`.
    #[inline]
    pub fn read(&self, addr: u8) -> u8 {
        self.data[addr as usize]
    }

    /// Write a byte to `addr`.
    #[inline]
    pub fn write(&mut self, addr: u8, val: u8) {
        self.data[addr as usize] = val;
    }

    /// The full address space, for inspection.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_zeroed() {
        let mem = Memory::new();
        assert!(mem.as_bytes().iter().all(|&b| b == 0));
        assert_eq!(mem.as_bytes().len(), MEM_SIZE);
    }

    #[test]
    fn test_read_write() {
        let mut mem = Memory::new();
        mem.write(0xF3, 0xAB);
        assert_eq!(mem.read(0xF3), 0xAB);
        assert_eq!(mem.read(0xF2), 0);
        mem.write(0xFF, 1);
        assert_eq!(mem.read(0xFF), 1);
    }

    #[test]
    fn test_load_image() {
        let mut mem = Memory::new();
        mem.load(&[0x82, 0x00, 0x08]).unwrap();
        assert_eq!(mem.read(0), 0x82);
        assert_eq!(mem.read(1), 0x00);
        assert_eq!(mem.read(2), 0x08);
        assert_eq!(mem.read(3), 0);
    }

    #[test]
    fn test_load_full_address_space() {
        let mut mem = Memory::new();
        mem.load(&[0x11; MEM_SIZE]).unwrap();
        assert_eq!(mem.read(0xFF), 0x11);
    }

    #[test]
    fn test_load_too_large() {
        let mut mem = Memory::new();
        let err = mem.load(&[0; MEM_SIZE + 1]).unwrap_err();
        assert_eq!(err, VmError::ProgramTooLarge { len: MEM_SIZE + 1 });
    }
}
