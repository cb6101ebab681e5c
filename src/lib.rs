// (c) 2023 John A. Breaux
// This code is licensed under MIT license (see LICENSE for details)

//! This crate implements a deterministic Chip-8 interpreter as if it were a real CPU
//! architecture: 4 KiB of memory, sixteen 8-bit registers, a 16-frame call stack,
//! two 60Hz timers, a 16-key keypad, and a 64x32 monochrome screen.
//!
//! The whole machine can be captured to, and restored from, a JSON [Snapshot].
//!
//! # Examples
//! ```rust
//! use chirp8::*;
//! let mut chip8 = Chip8::default();
//! chip8.load_program(&[
//!     0x60, 0x05, // mov  #05, v0
//!     0xf0, 0x29, // font v0, I
//!     0xd1, 0x15, // draw #5, v1, v1
//! ])?;
//! for _ in 0..3 {
//!     chip8.step()?;
//! }
//! assert_eq!(0x206, chip8.cpu.pc());
//! assert!(!chip8.screen.is_clear());
//! # Ok::<(), Error>(())
//! ```

pub mod cpu;
pub mod error;
pub mod screen;
pub mod snapshot;

// Common imports for chirp8
pub use cpu::{
    flags::Flags,
    instruction::{
        disassembler::{Dis, Disassembler},
        Insn,
    },
    mem::{Mem, Region, Region::*, CHARSET, MEM_SIZE, PROGRAM_START},
    quirks::Quirks,
    stack::{Stack, STACK_DEPTH},
    State, CPU,
};
pub use error::{Error, Result};
pub use screen::{Screen, HEIGHT, WIDTH};
pub use snapshot::Snapshot;

/// Holds the state of a Chip-8
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Chip8 {
    /// Contains the registers, memory, and timers
    pub cpu: CPU,
    /// Contains the framebuffer
    pub screen: Screen,
}

impl Chip8 {
    /// Constructs a Chip-8 whose CPU is configured with the provided [Flags]
    pub fn new(flags: Flags) -> Self {
        Chip8 {
            cpu: CPU::new(flags),
            screen: Screen::default(),
        }
    }

    /// Constructs a Chip-8 with a seeded random number generator
    pub fn with_seed(seed: u64) -> Self {
        Chip8 {
            cpu: CPU::with_seed(seed),
            screen: Screen::default(),
        }
    }

    /// Reinitializes the machine, and loads `rom` at 0x200.
    ///
    /// If `rom` is too large, nothing changes.
    pub fn load_program(&mut self, rom: &[u8]) -> Result<&mut Self> {
        self.cpu.load_program(rom)?;
        self.screen.clear();
        Ok(self)
    }

    /// Executes a single instruction. See [CPU::step]
    pub fn step(&mut self) -> Result<&mut Self> {
        self.cpu.step(&mut self.screen)?;
        Ok(self)
    }

    /// Executes `steps` instructions, then ticks the timers once
    pub fn multistep(&mut self, steps: usize) -> Result<&mut Self> {
        self.cpu.multistep(&mut self.screen, steps)?;
        Ok(self)
    }

    /// Decrements the timers. See [CPU::tick]
    pub fn tick(&mut self) -> &mut Self {
        self.cpu.tick();
        self
    }

    /// Presses a key. See [CPU::press]
    pub fn press(&mut self, key: usize) -> Result<bool> {
        self.cpu.press(key)
    }

    /// Releases a key. See [CPU::release]
    pub fn release(&mut self, key: usize) -> Result<bool> {
        self.cpu.release(key)
    }
}
