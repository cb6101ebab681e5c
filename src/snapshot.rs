// (c) 2023 John A. Breaux
// This code is licensed under MIT license (see LICENSE for details)

//! Captures and restores the complete state of a [Chip8] as a flat JSON document
//!
//! Every integer on the wire is read as a signed 64-bit value, and range-checked
//! here, so that a malformed document is rejected instead of silently truncated.

use crate::{
    cpu::{
        mem::{Mem, MEM_SIZE},
        stack::{Stack, STACK_DEPTH},
        State,
    },
    error::{Error, Result},
    screen::{Screen, HEIGHT, WIDTH},
    Chip8,
};
use serde::{Deserialize, Serialize};
use serde_json::error::Category;
use std::io::{Read, Write};

/// The value of a lit pixel, as written by some older snapshot producers
const LEGACY_LIT: i64 = 0xffff_ffff;

/// A flat, versionless picture of a [Chip8]
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// Program counter
    pub pc: i64,
    /// The I register
    pub index: i64,
    /// Stack pointer, the number of frames in use
    pub sp: i64,
    /// Delay timer
    pub delay_timer: i64,
    /// Sound timer
    pub sound_timer: i64,
    /// v0..=vF
    pub registers: Vec<i64>,
    /// Key states, 0 (up) or 1 (down)
    pub keypad: Vec<i64>,
    /// Up to 16 return addresses. Missing slots read as 0.
    pub stack: Vec<i64>,
    /// All 4096 bytes of memory
    pub memory: Vec<i64>,
    /// 32 rows of 64 pixels
    pub video: Vec<Vec<i64>>,
}

impl Snapshot {
    /// Encodes the snapshot as compact JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Encodes the snapshot as indented JSON
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Decodes a snapshot from JSON. The result has not been validated;
    /// that happens in [Chip8::restore].
    ///
    /// A document which parses, but doesn't describe a snapshot (a missing
    /// field, a value that isn't an integer in 64 bits), is an
    /// [Error::InvalidSnapshot] of the field `document`.
    /// # Examples
    /// ```rust
    /// # use chirp8::*;
    /// let snapshot = Chip8::default().capture();
    /// let json = snapshot.to_json()?;
    /// assert!(json.starts_with(r#"{"pc":512,"index":0,"sp":0,"delayTimer":0"#));
    /// assert_eq!(snapshot, Snapshot::from_json(&json)?);
    /// # Ok::<(), Error>(())
    /// ```
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(decode_error)
    }

    /// Writes the snapshot to `writer` as indented JSON
    pub fn to_writer(&self, writer: impl Write) -> Result<()> {
        Ok(serde_json::to_writer_pretty(writer, self)?)
    }

    /// Reads a snapshot from `reader`
    pub fn from_reader(reader: impl Read) -> Result<Self> {
        serde_json::from_reader(reader).map_err(decode_error)
    }
}

impl Chip8 {
    /// Captures the complete state of the machine.
    ///
    /// All 16 stack slots are written, including ones above the stack pointer.
    pub fn capture(&self) -> Snapshot {
        let State {
            mem,
            stack,
            pc,
            i,
            v,
            delay,
            sound,
            keys,
        } = self.cpu.state();
        Snapshot {
            pc: pc.into(),
            index: i.into(),
            sp: stack.sp() as i64,
            delay_timer: delay.into(),
            sound_timer: sound.into(),
            registers: v.into_iter().map(i64::from).collect(),
            keypad: keys.into_iter().map(i64::from).collect(),
            stack: stack.slots().iter().copied().map(i64::from).collect(),
            memory: mem.as_slice().iter().copied().map(i64::from).collect(),
            video: self
                .screen
                .rows()
                .iter()
                .map(|row| row.iter().copied().map(i64::from).collect())
                .collect(),
        }
    }

    /// Replaces the complete state of the machine with the contents of `snapshot`.
    ///
    /// The snapshot is validated in full before anything is touched. On failure,
    /// returns [Error::InvalidSnapshot] naming the offending field, and the
    /// machine is unchanged.
    ///
    /// Configuration [Flags](crate::Flags), the random number generator, and the
    /// cycle counter are kept. A pending `Fx0A` key wait is abandoned.
    /// # Examples
    /// ```rust
    /// # use chirp8::*;
    /// let mut chip8 = Chip8::default();
    /// let mut snapshot = chip8.capture();
    /// snapshot.registers[3] = 0x41;
    /// chip8.restore(&snapshot)?;
    /// assert_eq!(0x41, chip8.cpu.v()[3]);
    ///
    /// snapshot.pc = 0x1000;
    /// assert!(chip8.restore(&snapshot).is_err());
    /// # Ok::<(), Error>(())
    /// ```
    pub fn restore(&mut self, snapshot: &Snapshot) -> Result<&mut Self> {
        let (state, screen) = snapshot.validate()?;
        log::debug!("restoring snapshot at pc {:03x}", state.pc);
        self.cpu.set_state(state);
        self.screen = screen;
        Ok(self)
    }
}

// validation
impl Snapshot {
    /// Checks every field, and builds the machine state it describes
    fn validate(&self) -> Result<(State, Screen)> {
        let pc = word("pc", self.pc)?;
        if pc as usize >= MEM_SIZE {
            return Err(invalid("pc", format!("{pc:#x} is outside of memory")));
        }
        let i = word("index", self.index)?;
        let delay = byte("delayTimer", self.delay_timer)?;
        let sound = byte("soundTimer", self.sound_timer)?;
        let v = array("registers", &self.registers, byte)?;
        let keys = array("keypad", &self.keypad, key)?;
        let stack = self.validate_stack()?;

        let memory = exact("memory", &self.memory, MEM_SIZE)?
            .iter()
            .map(|&b| byte("memory", b))
            .collect::<Result<Vec<u8>>>()?;
        let mut mem = Mem::new();
        mem.load_block(0, &memory)?;

        exact("video", &self.video, HEIGHT)?;
        let mut pixels = [[0; WIDTH]; HEIGHT];
        for (dest, row) in pixels.iter_mut().zip(&self.video) {
            *dest = array("video", row, pixel)?;
        }

        let state = State {
            mem,
            stack,
            pc,
            i,
            v,
            delay,
            sound,
            keys,
        };
        Ok((state, Screen::from_rows(pixels)))
    }

    fn validate_stack(&self) -> Result<Stack> {
        if self.stack.len() > STACK_DEPTH {
            return Err(invalid(
                "stack",
                format!("{} entries is more than {STACK_DEPTH}", self.stack.len()),
            ));
        }
        let sp = usize::try_from(self.sp)
            .ok()
            .filter(|&sp| sp <= STACK_DEPTH)
            .ok_or_else(|| invalid("sp", format!("{} is not in 0..={STACK_DEPTH}", self.sp)))?;
        if sp > self.stack.len() {
            return Err(invalid(
                "sp",
                format!("{sp} is past the end of a {}-entry stack", self.stack.len()),
            ));
        }
        let mut slots = [0; STACK_DEPTH];
        for (slot, &addr) in slots.iter_mut().zip(&self.stack) {
            *slot = word("stack", addr)?;
        }
        Stack::from_parts(slots, sp).ok_or_else(|| invalid("sp", format!("{sp} is out of range")))
    }
}

/// Syntax and I/O errors stay [Error::Json]. Everything else is a bad snapshot.
fn decode_error(err: serde_json::Error) -> Error {
    match err.classify() {
        Category::Data => invalid("document", err.to_string()),
        Category::Io | Category::Syntax | Category::Eof => err.into(),
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> Error {
    Error::InvalidSnapshot {
        field,
        reason: reason.into(),
    }
}

fn exact<'a, T>(field: &'static str, values: &'a [T], len: usize) -> Result<&'a [T]> {
    if values.len() == len {
        Ok(values)
    } else {
        Err(invalid(
            field,
            format!("expected {len} entries, found {}", values.len()),
        ))
    }
}

fn array<T: Copy + Default, const N: usize>(
    field: &'static str,
    values: &[i64],
    conv: fn(&'static str, i64) -> Result<T>,
) -> Result<[T; N]> {
    let mut out = [T::default(); N];
    for (dest, &value) in out.iter_mut().zip(exact(field, values, N)?) {
        *dest = conv(field, value)?;
    }
    Ok(out)
}

fn byte(field: &'static str, value: i64) -> Result<u8> {
    u8::try_from(value).map_err(|_| invalid(field, format!("{value} is not in 0..=255")))
}

fn word(field: &'static str, value: i64) -> Result<u16> {
    u16::try_from(value).map_err(|_| invalid(field, format!("{value} is not in 0..=65535")))
}

fn key(field: &'static str, value: i64) -> Result<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        _ => Err(invalid(field, format!("{value} is neither 0 nor 1"))),
    }
}

fn pixel(field: &'static str, value: i64) -> Result<u8> {
    match value {
        0 => Ok(0),
        1 | LEGACY_LIT => Ok(1),
        _ => Err(invalid(field, format!("{value} is not a pixel value"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reject(snapshot: &Snapshot) -> &'static str {
        let mut chip8 = Chip8::with_seed(0);
        let before = chip8.clone();
        match chip8.restore(snapshot).map(|_| ()) {
            Err(Error::InvalidSnapshot { field, .. }) => {
                assert_eq!(before, chip8, "failed restore must not touch the machine");
                field
            }
            other => panic!("expected InvalidSnapshot, got {other:?}"),
        }
    }

    fn base() -> Snapshot {
        Chip8::default().capture()
    }

    #[test]
    fn capture_writes_every_slot() {
        let snapshot = base();
        assert_eq!(16, snapshot.registers.len());
        assert_eq!(16, snapshot.keypad.len());
        assert_eq!(16, snapshot.stack.len());
        assert_eq!(4096, snapshot.memory.len());
        assert_eq!(32, snapshot.video.len());
        assert!(snapshot.video.iter().all(|row| row.len() == 64));
        assert_eq!(512, snapshot.pc);
    }

    #[test]
    fn bad_pc() {
        assert_eq!("pc", reject(&Snapshot { pc: 4096, ..base() }));
        assert_eq!("pc", reject(&Snapshot { pc: -1, ..base() }));
    }

    #[test]
    fn bad_lengths() {
        let mut s = base();
        s.registers.pop();
        assert_eq!("registers", reject(&s));
        let mut s = base();
        s.keypad.push(0);
        assert_eq!("keypad", reject(&s));
        let mut s = base();
        s.stack.push(0);
        assert_eq!("stack", reject(&s));
        let mut s = base();
        s.memory.pop();
        assert_eq!("memory", reject(&s));
        let mut s = base();
        s.video.pop();
        assert_eq!("video", reject(&s));
        let mut s = base();
        s.video[31].push(0);
        assert_eq!("video", reject(&s));
    }

    #[test]
    fn bad_values() {
        assert_eq!("index", reject(&Snapshot { index: 0x10000, ..base() }));
        assert_eq!("delayTimer", reject(&Snapshot { delay_timer: 256, ..base() }));
        assert_eq!("soundTimer", reject(&Snapshot { sound_timer: -1, ..base() }));
        let mut s = base();
        s.registers[0xf] = 256;
        assert_eq!("registers", reject(&s));
        let mut s = base();
        s.keypad[3] = 2;
        assert_eq!("keypad", reject(&s));
        let mut s = base();
        s.stack[0] = 0x10000;
        assert_eq!("stack", reject(&s));
        let mut s = base();
        s.memory[0x800] = 0x100;
        assert_eq!("memory", reject(&s));
        let mut s = base();
        s.video[0][0] = 2;
        assert_eq!("video", reject(&s));
    }

    #[test]
    fn bad_sp() {
        assert_eq!("sp", reject(&Snapshot { sp: 17, ..base() }));
        assert_eq!("sp", reject(&Snapshot { sp: -1, ..base() }));
        let short = Snapshot {
            sp: 3,
            stack: vec![0x202, 0x204],
            ..base()
        };
        assert_eq!("sp", reject(&short));
    }

    #[test]
    fn short_stack() {
        let mut chip8 = Chip8::default();
        chip8
            .restore(&Snapshot {
                sp: 2,
                stack: vec![0x202, 0x204],
                ..base()
            })
            .unwrap();
        assert_eq!(2, chip8.cpu.sp());
        assert_eq!(&[0x202, 0x204], chip8.cpu.stack().frames());
        assert_eq!(0, chip8.cpu.stack().slots()[15]);
    }

    #[test]
    fn legacy_pixels() {
        let mut s = base();
        s.video[4][9] = 0xffff_ffff;
        let mut chip8 = Chip8::default();
        chip8.restore(&s).unwrap();
        assert_eq!(Some(1), chip8.screen.get(9, 4));
        // and it's written back out canonically
        assert_eq!(1, chip8.capture().video[4][9]);
    }
}
