// (c) 2023 John A. Breaux
// This code is licensed under MIT license (see LICENSE for details)

//! The Mem represents the CPU's memory
//!
//! Contains some handy utils for reading and writing

use crate::error::{Error, Result};
use std::{
    fmt::{Debug, Display, Formatter},
    ops::Range,
    slice::SliceIndex,
};

/// Size of the Chip-8's address space, in bytes
pub const MEM_SIZE: usize = 0x1000;
/// Address where programs are loaded, and where execution begins
pub const PROGRAM_START: u16 = 0x200;
/// Address of the built-in hexadecimal font
pub const FONT_START: u16 = 0x000;
/// Number of bytes in each font glyph
pub const FONT_HEIGHT: u16 = 5;

/// The built-in hexadecimal font: 16 glyphs, 5 bytes each
#[rustfmt::skip]
pub const CHARSET: [u8; 0x50] = [
    0xf0, 0x90, 0x90, 0x90, 0xf0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xf0, 0x10, 0xf0, 0x80, 0xf0, // 2
    0xf0, 0x10, 0xf0, 0x10, 0xf0, // 3
    0x90, 0x90, 0xf0, 0x10, 0x10, // 4
    0xf0, 0x80, 0xf0, 0x10, 0xf0, // 5
    0xf0, 0x80, 0xf0, 0x90, 0xf0, // 6
    0xf0, 0x10, 0x20, 0x40, 0x40, // 7
    0xf0, 0x90, 0xf0, 0x90, 0xf0, // 8
    0xf0, 0x90, 0xf0, 0x10, 0xf0, // 9
    0xf0, 0x90, 0xf0, 0x90, 0x90, // A
    0xe0, 0x90, 0xe0, 0x90, 0xe0, // B
    0xf0, 0x80, 0x80, 0x80, 0xf0, // C
    0xe0, 0x90, 0x90, 0x90, 0xe0, // D
    0xf0, 0x80, 0xf0, 0x80, 0xf0, // E
    0xf0, 0x80, 0xf0, 0x80, 0x80, // F
];

/// Represents a named region in memory
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Region {
    /// Character ROM (but writable!)
    Charset,
    /// Interpreter-reserved memory, which contains the [Region::Charset]
    Reserved,
    /// Program memory
    Program,
}

impl Region {
    /// Gets the range of addresses covered by this [Region]
    /// # Examples
    /// ```rust
    /// # use chirp8::*;
    /// assert_eq!(Program.range(), 0x200..0x1000);
    /// ```
    pub fn range(&self) -> Range<usize> {
        match self {
            Region::Charset => FONT_START as usize..FONT_START as usize + CHARSET.len(),
            Region::Reserved => 0..PROGRAM_START as usize,
            Region::Program => PROGRAM_START as usize..MEM_SIZE,
        }
    }
}

impl Display for Region {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Region::Charset => "Charset",
                Region::Reserved => "Reserved",
                Region::Program => "Program",
            }
        )
    }
}

/// Flat, 4 KiB memory with the font preloaded
#[derive(Clone, PartialEq, Eq)]
pub struct Mem {
    memory: Box<[u8; MEM_SIZE]>,
}

impl Mem {
    /// Constructs a new, zeroed [Mem] with the charset loaded
    /// # Examples
    /// ```rust
    /// # use chirp8::*;
    /// let mem = Mem::new();
    /// assert_eq!(mem.get_region(Charset), &CHARSET[..]);
    /// assert!(mem.get_region(Program).iter().all(|&b| b == 0));
    /// ```
    pub fn new() -> Self {
        let mut mem = Mem {
            memory: Box::new([0; MEM_SIZE]),
        };
        mem.memory[Region::Charset.range()].copy_from_slice(&CHARSET);
        mem
    }

    /// Gets the length of the backing memory, which is always [MEM_SIZE]
    pub fn len(&self) -> usize {
        self.memory.len()
    }

    /// Always false. Here to keep clippy happy about [Mem::len]
    pub fn is_empty(&self) -> bool {
        self.memory.is_empty()
    }

    /// Gets a slice of [Mem] memory
    /// # Examples
    /// ```rust
    /// # use chirp8::*;
    /// let mem = Mem::new();
    /// assert!(mem.get(0xffe..0x1000).is_some());
    /// assert!(mem.get(0xfff..0x1001).is_none());
    /// ```
    #[inline(always)]
    pub fn get<I>(&self, index: I) -> Option<&<I as SliceIndex<[u8]>>::Output>
    where
        I: SliceIndex<[u8]>,
    {
        self.memory.get(index)
    }

    /// Gets a mutable slice of [Mem] memory
    /// # Examples
    /// ```rust
    /// # use chirp8::*;
    /// let mut mem = Mem::new();
    /// mem.get_mut(0x300..0x302).unwrap().copy_from_slice(&[0xa2, 0x30]);
    /// assert_eq!(0xa230, mem.read_word(0x300).unwrap());
    /// assert!(mem.get_mut(0x1000).is_none());
    /// ```
    #[inline(always)]
    pub fn get_mut<I>(&mut self, index: I) -> Option<&mut <I as SliceIndex<[u8]>>::Output>
    where
        I: SliceIndex<[u8]>,
    {
        self.memory.get_mut(index)
    }

    /// Gets `len` bytes starting at `addr`, or [Error::OutOfBounds]
    #[inline]
    pub fn slice(&self, addr: usize, len: usize) -> Result<&[u8]> {
        addr.checked_add(len)
            .and_then(|end| self.memory.get(addr..end))
            .ok_or(Error::OutOfBounds { addr, len })
    }

    /// Gets `len` mutable bytes starting at `addr`, or [Error::OutOfBounds]
    #[inline]
    pub fn slice_mut(&mut self, addr: usize, len: usize) -> Result<&mut [u8]> {
        addr.checked_add(len)
            .and_then(|end| self.memory.get_mut(addr..end))
            .ok_or(Error::OutOfBounds { addr, len })
    }

    /// Reads the byte at `addr`
    /// # Examples
    /// ```rust
    /// # use chirp8::*;
    /// let mem = Mem::new();
    /// assert_eq!(0xf0, mem.read(0x000).unwrap());
    /// assert!(mem.read(0x1000).is_err());
    /// ```
    #[inline]
    pub fn read(&self, addr: usize) -> Result<u8> {
        Ok(self.slice(addr, 1)?[0])
    }

    /// Reads a big-endian word at `addr`
    #[inline]
    pub fn read_word(&self, addr: usize) -> Result<u16> {
        let bytes = self.slice(addr, 2)?;
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    /// Writes `data` to `addr`
    /// # Examples
    /// ```rust
    /// # use chirp8::*;
    /// let mut mem = Mem::new();
    /// mem.write(0x300, 0x12).unwrap();
    /// assert_eq!(0x12, mem.read(0x300).unwrap());
    /// assert!(mem.write(0x1000, 0x12).is_err());
    /// ```
    #[inline]
    pub fn write(&mut self, addr: usize, data: u8) -> Result<()> {
        self.slice_mut(addr, 1)?[0] = data;
        Ok(())
    }

    /// Overwrites `data.len()` bytes starting at `offset`.
    ///
    /// Fails without writing anything if the block doesn't fit.
    /// # Examples
    /// ```rust
    /// # use chirp8::*;
    /// let mut mem = Mem::new();
    /// mem.load_block(0xffe, &[1, 2]).unwrap();
    /// assert!(mem.load_block(0xfff, &[1, 2]).is_err());
    /// assert_eq!(2, mem.read(0xfff).unwrap());
    /// ```
    pub fn load_block(&mut self, offset: usize, data: &[u8]) -> Result<&mut Self> {
        self.slice_mut(offset, data.len())?.copy_from_slice(data);
        Ok(self)
    }

    /// Loads data into the start of a named [Region]
    ///
    /// Fails with [Error::OutOfBounds] if the data is larger than the region.
    pub fn load_region(&mut self, name: Region, data: &[u8]) -> Result<&mut Self> {
        let range = name.range();
        if data.len() > range.len() {
            return Err(Error::OutOfBounds {
                addr: range.start,
                len: data.len(),
            });
        }
        self.load_block(range.start, data)
    }

    /// Fills a [Region] with zeroes
    pub fn clear_region(&mut self, name: Region) -> &mut Self {
        self.memory[name.range()].fill(0);
        self
    }

    /// Gets a slice of a named [Region] of memory
    #[inline(always)]
    pub fn get_region(&self, name: Region) -> &[u8] {
        &self.memory[name.range()]
    }

    /// Gets the entire backing memory
    pub fn as_slice(&self) -> &[u8] {
        self.memory.as_slice()
    }
}

impl Default for Mem {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for Mem {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let used = self.memory.iter().filter(|&&b| b != 0).count();
        f.debug_struct("Mem")
            .field("len", &self.memory.len())
            .field("nonzero", &used)
            .finish_non_exhaustive()
    }
}

impl Display for Mem {
    /// Prints a hexdump of memory, skipping lines of zeroes
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (line, chunk) in self.memory.chunks_exact(16).enumerate() {
            if chunk.iter().all(|&b| b == 0) {
                continue;
            }
            write!(f, "{:03x}:", line * 16)?;
            for pair in chunk.chunks_exact(2) {
                write!(f, " {:02x}{:02x}", pair[0], pair[1])?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
