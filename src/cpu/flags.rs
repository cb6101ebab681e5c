// (c) 2023 John A. Breaux
// This code is licensed under MIT license (see LICENSE for details)

//! Represents flags that aid in implementation but aren't a part of the Chip-8 itself

use super::Quirks;

/// Represents flags that aid in operation, but aren't inherent to the CPU
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Flags {
    /// Set when debug (live disassembly) mode enabled
    pub debug: bool,
    /// Set when unknown opcodes should be returned as errors, rather than only reported
    pub strict: bool,
    /// Set when the debug-console opcodes (`00ea`, `00eb`, `00ec`, `8bba`, `fx95`, `fx97`) run
    pub console: bool,
    /// Set when the emulator is waiting for a keypress
    pub keypause: bool,
    /// Set to the last key that's been *pressed* during a keypause
    pub lastkey: Option<usize>,
    /// Represents the set of emulator [Quirks] to enable
    pub quirks: Quirks,
}

impl Flags {
    /// Toggles debug mode
    ///
    /// # Examples
    /// ```rust
    /// # use chirp8::*;
    /// let mut cpu = CPU::default();
    /// assert_eq!(false, cpu.flags.debug);
    /// // Toggle debug mode
    /// cpu.flags.debug();
    /// assert_eq!(true, cpu.flags.debug);
    /// ```
    pub fn debug(&mut self) {
        self.debug = !self.debug
    }

    /// Returns true if the CPU is parked on a `Fx0A` waiting for input
    pub fn is_waiting(&self) -> bool {
        self.keypause
    }
}
