// (c) 2023 John A. Breaux
// This code is licensed under MIT license (see LICENSE for details)

//! Decodes and runs instructions


pub mod behavior;
pub mod flags;
pub mod instruction;
pub mod mem;
pub mod quirks;
pub mod stack;

use self::{
    flags::Flags,
    instruction::{
        disassembler::{Dis, Disassembler},
        Insn,
    },
    mem::{Mem, Region, PROGRAM_START},
    quirks::Quirks,
    stack::Stack,
};
use crate::{
    error::{Error, Result},
    screen::Screen,
};
use imperative_rs::InstructionSet;
use owo_colors::OwoColorize;
use rand::{rngs::StdRng, SeedableRng};
use std::fmt::Debug;

type Reg = usize;
type Adr = u16;
type Nib = u8;

/// The architectural state of a [CPU]: everything but the screen that a
/// [Snapshot](crate::snapshot::Snapshot) carries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct State {
    /// All 4 KiB of memory
    pub mem: Mem,
    /// The return-address stack, including its stack pointer
    pub stack: Stack,
    /// Program counter
    pub pc: Adr,
    /// Index register
    pub i: Adr,
    /// General purpose registers v0..=vF
    pub v: [u8; 16],
    /// Delay timer
    pub delay: u8,
    /// Sound timer
    pub sound: u8,
    /// Keypad
    pub keys: [bool; 16],
}

/// Represents the internal state of the CPU interpreter
#[derive(Clone)]
pub struct CPU {
    /// Flags that control how the CPU behaves, but which aren't inherent to the
    /// chip-8. Includes [Quirks], strictness, live disassembly, etc.
    pub flags: Flags,
    // memory
    mem: Mem,
    stack: Stack,
    // registers
    pc: Adr,
    i: Adr,
    v: [u8; 16],
    delay: u8,
    sound: u8,
    // I/O
    keys: [bool; 16],
    // Execution data
    cycle: usize,
    unknown: usize,
    rng: StdRng,
    disassembler: Dis,
}

// public interface
impl CPU {
    /// Constructs a new CPU with the provided [Flags]
    /// # Examples
    /// ```rust
    /// # use chirp8::*;
    /// let cpu = CPU::new(Flags {
    ///     quirks: Quirks::vip(),
    ///     ..Default::default()
    /// });
    /// assert_eq!(0x200, cpu.pc());
    /// ```
    pub fn new(flags: Flags) -> Self {
        CPU {
            flags,
            ..Default::default()
        }
    }

    /// Constructs a new CPU whose random number generator is seeded with `seed`,
    /// so that `Cxbb` produces the same sequence on every run.
    /// # Examples
    /// ```rust
    /// # use chirp8::*;
    /// let (mut a, mut b) = (CPU::with_seed(8), CPU::with_seed(8));
    /// let mut screen = Screen::default();
    /// for cpu in [&mut a, &mut b] {
    ///     cpu.load_program(&[0xc0, 0xff]).unwrap(); // rand #ff, v0
    ///     cpu.step(&mut screen).unwrap();
    /// }
    /// assert_eq!(a.v()[0], b.v()[0]);
    /// ```
    pub fn with_seed(seed: u64) -> Self {
        CPU {
            rng: StdRng::seed_from_u64(seed),
            ..Default::default()
        }
    }

    /// Reinitializes the CPU, then loads bytes into the CPU's program space.
    ///
    /// If the program doesn't fit in program space, returns [Error::OutOfBounds]
    /// and leaves the CPU untouched.
    /// # Examples
    /// ```rust
    /// # use chirp8::*;
    /// let mut cpu = CPU::default();
    /// cpu.load_program(&[0x00, 0xe0]).unwrap();
    /// assert_eq!(0x00e0, cpu.mem().read_word(0x200).unwrap());
    /// assert!(cpu.load_program(&[0; 0xe01]).is_err());
    /// ```
    pub fn load_program(&mut self, rom: &[u8]) -> Result<&mut Self> {
        let capacity = Region::Program.range().len();
        if rom.len() > capacity {
            return Err(Error::OutOfBounds {
                addr: PROGRAM_START as usize,
                len: rom.len(),
            });
        }
        self.reset();
        self.mem.load_region(Region::Program, rom)?;
        log::debug!("loaded {} byte program at {PROGRAM_START:03x}", rom.len());
        Ok(self)
    }

    /// Presses a key, and reports whether the key's state changed.
    /// If key does not exist, returns [Error::InvalidKey].
    ///
    /// If [Flags::keypause] is set, the key is latched into [Flags::lastkey]
    /// for the waiting `Fx0A` to pick up.
    /// # Examples
    /// ```rust
    /// # use chirp8::*;
    /// let mut cpu = CPU::default();
    ///
    /// // press key `7`
    /// let did_press = cpu.press(0x7).unwrap();
    /// assert!(did_press);
    ///
    /// // press key `7` again, even though it's already pressed
    /// let did_press = cpu.press(0x7).unwrap();
    /// // it was already pressed, so nothing's changed.
    /// assert!(!did_press);
    /// ```
    pub fn press(&mut self, key: usize) -> Result<bool> {
        let Some(keyref) = self.keys.get_mut(key) else {
            return Err(Error::InvalidKey { key });
        };
        if self.flags.keypause && self.flags.lastkey.is_none() {
            self.flags.lastkey = Some(key);
        }
        Ok(!std::mem::replace(keyref, true))
    }

    /// Releases a key, and reports whether the key's state changed.
    /// If key is outside range `0..=0xF`, returns [Error::InvalidKey].
    /// # Examples
    /// ```rust
    /// # use chirp8::*;
    /// let mut cpu = CPU::default();
    /// // press key `7`
    /// cpu.press(0x7).unwrap();
    /// // release key `7`
    /// let changed = cpu.release(0x7).unwrap();
    /// assert!(changed); // key released
    /// // try releasing `7` again
    /// let changed = cpu.release(0x7).unwrap();
    /// assert!(!changed); // key was not held
    /// ```
    pub fn release(&mut self, key: usize) -> Result<bool> {
        let Some(keyref) = self.keys.get_mut(key) else {
            return Err(Error::InvalidKey { key });
        };
        Ok(std::mem::replace(keyref, false))
    }

    /// Reports whether a key is held. Keys outside `0..=0xF` are never held.
    pub fn is_pressed(&self, key: usize) -> bool {
        self.keys.get(key).copied().unwrap_or_default()
    }

    /// Gets the state of every key
    pub fn keys(&self) -> &[bool; 16] {
        &self.keys
    }

    /// Sets a general purpose register in the CPU.
    /// If the register doesn't exist, returns [Error::InvalidRegister]
    /// # Examples
    /// ```rust
    /// # use chirp8::*;
    /// // Create a new CPU, and set v4 to 0x41
    /// let mut cpu = CPU::default();
    /// cpu.set_v(0x4, 0x41).unwrap();
    /// assert_eq!(0x41, cpu.v()[4]);
    /// assert!(cpu.set_v(0x10, 0x41).is_err());
    /// ```
    pub fn set_v(&mut self, reg: Reg, value: u8) -> Result<()> {
        if let Some(gpr) = self.v.get_mut(reg) {
            *gpr = value;
            Ok(())
        } else {
            Err(Error::InvalidRegister { reg })
        }
    }

    /// Gets the general purpose registers
    /// # Examples
    /// ```rust
    /// # use chirp8::*;
    /// let mut cpu = CPU::default();
    /// cpu.set_v(0x0, 0x41).unwrap();
    /// assert_eq!(
    ///     cpu.v(),
    ///     &[0x41, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]
    /// )
    /// ```
    pub fn v(&self) -> &[u8; 16] {
        &self.v
    }

    /// Gets the program counter
    /// # Examples
    /// ```rust
    /// # use chirp8::*;
    /// let mut cpu = CPU::default();
    /// assert_eq!(0x200, cpu.pc());
    /// ```
    pub fn pc(&self) -> Adr {
        self.pc
    }

    /// Gets the I register
    pub fn i(&self) -> Adr {
        self.i
    }

    /// Gets the call [Stack]
    pub fn stack(&self) -> &Stack {
        &self.stack
    }

    /// Gets the stack pointer
    pub fn sp(&self) -> usize {
        self.stack.sp()
    }

    /// Gets CPU memory
    pub fn mem(&self) -> &Mem {
        &self.mem
    }

    /// Gets CPU memory, mutably
    /// # Examples
    /// ```rust
    /// # use chirp8::*;
    /// let (mut cpu, mut screen) = (CPU::default(), Screen::default());
    /// // patch in `mov #42, v0`
    /// cpu.mem_mut().load_block(0x200, &[0x60, 0x42])?;
    /// cpu.step(&mut screen)?;
    /// assert_eq!(0x42, cpu.v()[0]);
    /// # Ok::<(), Error>(())
    /// ```
    pub fn mem_mut(&mut self) -> &mut Mem {
        &mut self.mem
    }

    /// Gets the value in the Sound Timer register
    pub fn sound(&self) -> u8 {
        self.sound
    }

    /// Returns true while the sound timer is running
    pub fn sound_active(&self) -> bool {
        self.sound > 0
    }

    /// Gets the value in the Delay Timer register
    pub fn delay(&self) -> u8 {
        self.delay
    }

    /// Gets the number of cycles the CPU has executed
    /// # Examples
    /// ```rust
    /// # use chirp8::*;
    /// let mut cpu = CPU::default();
    /// assert_eq!(0x0, cpu.cycle());
    /// ```
    pub fn cycle(&self) -> usize {
        self.cycle
    }

    /// Gets the number of unknown opcodes the CPU has stepped over
    pub fn unknown_opcodes(&self) -> usize {
        self.unknown
    }

    /// Resets the emulator to its freshly-initialized state.
    ///
    /// Clears memory (reloading the charset), stack, registers, timers, keys,
    /// cycle count and keypause, and sets the program counter to 0x200.
    ///
    /// Does not touch [Quirks], the other configuration [Flags], or the random number generator.
    pub fn reset(&mut self) {
        self.flags = Flags {
            keypause: false,
            lastkey: None,
            ..self.flags.clone()
        };
        self.mem = Mem::new();
        self.stack = Stack::new();
        // Reset the program counter
        self.pc = PROGRAM_START;
        // Zero the registers
        self.i = 0;
        self.v = [0; 16];
        self.delay = 0;
        self.sound = 0;
        // I/O
        self.keys = [false; 16];
        // Execution data
        self.cycle = 0;
        self.unknown = 0;
        log::debug!("cpu initialized");
    }

    /// Decrements the delay and sound timers, stopping at 0.
    ///
    /// Call this at 60Hz, independently of [CPU::step]
    /// # Examples
    /// ```rust
    /// # use chirp8::*;
    /// let mut cpu = CPU::default();
    /// cpu.tick();
    /// assert_eq!(0, cpu.delay());
    /// assert_eq!(0, cpu.sound());
    /// ```
    pub fn tick(&mut self) -> &mut Self {
        self.delay = self.delay.saturating_sub(1);
        self.sound = self.sound.saturating_sub(1);
        self
    }

    /// Executes `steps` instructions, then ticks the timers once
    /// # Examples
    /// ```rust
    /// # use chirp8::*;
    /// let mut cpu = CPU::default();
    /// let mut screen = Screen::default();
    /// cpu.load_program(&[
    ///     0x00, 0xe0, // cls
    ///     0x12, 0x02, // jump 0x202 (pc)
    /// ]).unwrap();
    /// cpu.multistep(&mut screen, 0x20)
    ///     .expect("The program should only have valid opcodes.");
    /// assert_eq!(0x202, cpu.pc());
    /// assert_eq!(0x20, cpu.cycle());
    /// ```
    pub fn multistep(&mut self, screen: &mut Screen, steps: usize) -> Result<&mut Self> {
        for _ in 0..steps {
            self.step(screen)?;
        }
        Ok(self.tick())
    }

    /// Executes a single instruction
    ///
    /// The program counter is advanced past the instruction *before* it executes.
    /// If the instruction fails with a fatal [Error], the program counter is rolled
    /// back to the faulting instruction, and no other state has changed.
    ///
    /// Unknown opcodes are logged and counted, and otherwise skipped. If
    /// [Flags::strict] is set, they're also returned as [Error::UnknownOpcode].
    /// # Examples
    /// ```rust
    /// # use chirp8::*;
    /// let mut cpu = CPU::default();
    /// let mut screen = Screen::default();
    /// cpu.load_program(&[
    ///     0x00, 0xe0, // cls
    ///     0x12, 0x02, // jump 0x202 (pc)
    /// ]).unwrap();
    /// cpu.step(&mut screen)
    ///     .expect("0x00e0 (cls) should be a valid opcode.");
    /// assert_eq!(0x202, cpu.pc());
    /// assert_eq!(1, cpu.cycle());
    /// ```
    /// Returns [Error::UnknownOpcode] if the instruction is unknown, and [Flags::strict] is set.
    /// ```rust
    /// # use chirp8::*;
    /// let mut cpu = CPU::default();
    /// cpu.flags.strict = true;
    /// let mut screen = Screen::default();
    /// cpu.load_program(&[
    ///     0xff, 0xff, // invalid!
    ///     0x12, 0x02, // jump 0x202 (pc)
    /// ]).unwrap();
    /// cpu.step(&mut screen)
    ///     .expect_err("Should return Error::UnknownOpcode { 0xffff }");
    /// assert_eq!(0x202, cpu.pc());
    /// ```
    pub fn step(&mut self, screen: &mut Screen) -> Result<&mut Self> {
        let pc = self.pc;
        // fetch opcode
        let word = self.mem.read_word(pc as usize)?;
        self.cycle += 1;

        // Print opcode disassembly:
        if self.flags.debug {
            log::trace!(
                "{:3} {:03x}: {:<36}",
                self.cycle.bright_black(),
                pc,
                self.disassembler.once(word)
            );
        }

        self.pc = pc.wrapping_add(2);
        // decode opcode
        let result = match Insn::decode(&word.to_be_bytes()) {
            Ok((_, insn)) if insn.is_console() && !self.flags.console => self.unknown(word),
            Ok((_, insn)) => self.execute(screen, insn),
            Err(_) => self.unknown(word),
        };
        match result {
            Err(e) if e.is_fatal() => {
                self.pc = pc;
                Err(e)
            }
            Err(e) => Err(e),
            Ok(()) => Ok(self),
        }
    }

    /// Gets the architectural [State] of the CPU
    pub fn state(&self) -> State {
        State {
            mem: self.mem.clone(),
            stack: self.stack.clone(),
            pc: self.pc,
            i: self.i,
            v: self.v,
            delay: self.delay,
            sound: self.sound,
            keys: self.keys,
        }
    }

    /// Replaces the architectural [State] of the CPU wholesale.
    ///
    /// Releases keypause, since the [State] doesn't carry it.
    pub fn set_state(&mut self, state: State) -> &mut Self {
        let State {
            mem,
            stack,
            pc,
            i,
            v,
            delay,
            sound,
            keys,
        } = state;
        (self.mem, self.stack) = (mem, stack);
        (self.pc, self.i, self.v) = (pc, i, v);
        (self.delay, self.sound, self.keys) = (delay, sound, keys);
        self.flags.keypause = false;
        self.flags.lastkey = None;
        self
    }

    /// Dumps the current state of all CPU registers, and the cycle count
    /// # Examples
    /// ```rust
    /// # use chirp8::*;
    /// let mut cpu = CPU::default();
    /// println!("{}", cpu.dump());
    /// ```
    /// outputs
    /// ```text
    /// PC: 0200, SP: 00, I: 0000
    /// v0: 00 v1: 00 v2: 00 v3: 00
    /// v4: 00 v5: 00 v6: 00 v7: 00
    /// v8: 00 v9: 00 vA: 00 vB: 00
    /// vC: 00 vD: 00 vE: 00 vF: 00
    /// DLY: 0, SND: 0, CYC:      0
    /// ```
    pub fn dump(&self) -> String {
        format!(
            "PC: {:04x}, SP: {:02x}, I: {:04x}\n{}DLY: {}, SND: {}, CYC: {:6}",
            self.pc,
            self.stack.sp(),
            self.i,
            self.v
                .into_iter()
                .enumerate()
                .map(|(i, gpr)| {
                    format!(
                        "v{i:X}: {gpr:02x} {}",
                        match i % 4 {
                            3 => "\n",
                            _ => "",
                        }
                    )
                })
                .collect::<String>(),
            self.delay,
            self.sound,
            self.cycle,
        )
    }
}

impl CPU {
    /// Reports an unknown opcode. The pc has already moved past it.
    fn unknown(&mut self, word: u16) -> Result<()> {
        self.unknown += 1;
        log::warn!(
            "unknown opcode {word:04x} at {:03x}",
            self.pc.wrapping_sub(2)
        );
        if self.flags.strict {
            Err(Error::UnknownOpcode { word })
        } else {
            Ok(())
        }
    }
}

impl Debug for CPU {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CPU")
            .field("flags", &self.flags)
            .field("mem", &self.mem)
            .field("stack", &self.stack)
            .field("pc", &self.pc)
            .field("i", &self.i)
            .field("v", &self.v)
            .field("delay", &self.delay)
            .field("sound", &self.sound)
            .field("keys", &self.keys)
            .field("cycle", &self.cycle)
            .field("unknown", &self.unknown)
            .field("disassembler", &self.disassembler)
            .finish_non_exhaustive()
    }
}

impl PartialEq for CPU {
    /// Compares everything but the random number generator
    fn eq(&self, other: &Self) -> bool {
        self.flags == other.flags
            && self.mem == other.mem
            && self.stack == other.stack
            && self.pc == other.pc
            && self.i == other.i
            && self.v == other.v
            && self.delay == other.delay
            && self.sound == other.sound
            && self.keys == other.keys
            && self.cycle == other.cycle
            && self.unknown == other.unknown
            && self.disassembler == other.disassembler
    }
}

impl Default for CPU {
    /// Constructs a new CPU with sane defaults
    ///
    /// | value  | default | description
    /// |--------|---------|------------
    /// | font   |`0x0000` | Location of font memory.
    /// | pc     |`0x0200` | Start location.
    ///
    /// # Examples
    /// ```rust
    /// use chirp8::*;
    /// let mut cpu = CPU::default();
    /// ```
    fn default() -> Self {
        CPU {
            flags: Flags::default(),
            mem: Mem::new(),
            stack: Stack::new(),
            pc: PROGRAM_START,
            i: 0,
            v: [0; 16],
            delay: 0,
            sound: 0,
            keys: [false; 16],
            cycle: 0,
            unknown: 0,
            rng: StdRng::from_entropy(),
            disassembler: Dis::default(),
        }
    }
}
