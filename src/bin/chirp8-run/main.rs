// (c) 2023 John A. Breaux
// This code is licensed under MIT license (see LICENSE for details)

//! Chirp8: A headless chip-8 interpreter in Rust
//!
//! Runs a ROM (or a saved snapshot) for a number of frames, then prints the screen.

use chirp8::{Chip8, Error, Flags, Quirks, Result, Snapshot};
use gumdrop::*;
use owo_colors::OwoColorize;
use std::{
    fs::{read, File},
    io::{BufReader, BufWriter},
    path::PathBuf,
    time::{Duration, Instant},
};

pub fn main() -> Result<()> {
    env_logger::init();
    let options = Arguments::parse_args_default_or_exit();
    let output = options.output.clone();
    let mut state = State::new(options)?;
    for result in &mut state {
        if let Err(e) = result {
            eprintln!("{}", e.bold().red());
            break;
        }
    }
    println!("{}", state.ch8.screen);
    eprintln!("{}", state.ch8.cpu.dump().cyan());
    if state.ch8.cpu.unknown_opcodes() > 0 {
        eprintln!(
            "{}",
            format_args!("skipped {} unknown opcodes", state.ch8.cpu.unknown_opcodes()).yellow()
        );
    }
    if let Some(path) = output {
        state
            .ch8
            .capture()
            .to_writer(BufWriter::new(File::create(&path)?))?;
        log::info!("wrote snapshot to {}", path.display());
    }
    Ok(())
}

/// Parses a hexadecimal string into a u16
fn parse_hex(value: &str) -> std::result::Result<u16, std::num::ParseIntError> {
    u16::from_str_radix(value.trim_start_matches("0x"), 16)
}

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Options, Hash)]
struct Arguments {
    #[options(help = "Load a ROM to run on Chirp8.", free)]
    pub file: Option<PathBuf>,
    #[options(help = "Print this help message.")]
    help: bool,
    #[options(help = "Restore a JSON snapshot before running.", meta = "PATH")]
    pub load: Option<PathBuf>,
    #[options(help = "Write a JSON snapshot on exit.", meta = "PATH")]
    pub output: Option<PathBuf>,

    #[options(help = "Log a disassembly of every instruction (at trace level).")]
    pub debug: bool,
    #[options(short = "S", help = "Stop on unknown opcodes.")]
    pub strict: bool,
    #[options(short = "C", help = "Enable the debug console instructions.")]
    pub console: bool,

    #[options(help = "Set the number of frames to run.", default = "60", meta = "N")]
    pub frames: usize,
    #[options(help = "Set the instructions-per-frame rate.", default = "10", meta = "IPF")]
    pub step: usize,
    #[options(help = "Pace frames in realtime, at this many per second.", meta = "FR")]
    pub frame_rate: Option<u64>,
    #[options(help = "Seed the random number generator.", meta = "SEED")]
    pub rng_seed: Option<u64>,

    #[options(short = "V", help = "Start from the original COSMAC VIP's quirks.")]
    pub vip: bool,
    #[options(short = "z", help = "Toggle setting vF to 0 after a bitwise operation.")]
    pub vfreset: bool,
    #[options(short = "c", help = "Toggle leaving I alone after a DMA instruction.")]
    pub memory: bool,
    #[options(short = "v", help = "Toggle shifting vX in place, ignoring vY.")]
    pub shift: bool,
    #[options(short = "w", help = "Toggle wrapping sprites at the screen edge.")]
    pub wrap: bool,

    #[options(
        long = "press",
        help = "Hold a key for the whole run.",
        parse(try_from_str = "parse_hex"),
        meta = "KEY"
    )]
    pub keys: Vec<u16>,
}

#[derive(Debug)]
struct State {
    pub frames: usize,
    pub step: usize,
    pub rate: Option<u64>,
    pub ch8: Chip8,
    pub ft: Instant,
}

impl State {
    fn new(options: Arguments) -> Result<Self> {
        let mut ch8 = match options.rng_seed {
            Some(seed) => Chip8::with_seed(seed),
            None => Chip8::default(),
        };
        ch8.cpu.flags = Flags {
            debug: options.debug,
            strict: options.strict,
            console: options.console,
            quirks: if options.vip {
                Quirks::vip()
            } else {
                Quirks::default()
            },
            ..Default::default()
        };
        // Flip the state of the quirks
        let quirks = &mut ch8.cpu.flags.quirks;
        quirks.bin_ops ^= options.vfreset;
        quirks.dma_inc ^= options.memory;
        quirks.shift ^= options.shift;
        quirks.screen_wrap ^= options.wrap;
        log::debug!("{:?}", ch8.cpu.flags);

        if let Some(file) = &options.file {
            ch8.load_program(&read(file)?)?;
        }
        if let Some(path) = &options.load {
            let snapshot = Snapshot::from_reader(BufReader::new(File::open(path)?))?;
            ch8.restore(&snapshot)?;
        }
        if options.file.is_none() && options.load.is_none() {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "nothing to run: pass a ROM, or --load a snapshot",
            )));
        }
        for key in options.keys {
            ch8.press(key as usize)?;
        }
        Ok(State {
            frames: options.frames,
            step: options.step,
            rate: options.frame_rate,
            ch8,
            ft: Instant::now(),
        })
    }
    fn wait_for_next_frame(&mut self) {
        if let Some(rate) = self.rate.filter(|&rate| rate > 0) {
            let rate = Duration::from_nanos(1_000_000_000 / rate + 1);
            std::thread::sleep(rate.saturating_sub(self.ft.elapsed()));
            self.ft += rate;
        }
    }
}

impl Iterator for State {
    type Item = Result<()>;

    /// Runs one frame: `step` instructions, then a timer tick
    fn next(&mut self) -> Option<Self::Item> {
        self.frames = self.frames.checked_sub(1)?;
        self.wait_for_next_frame();
        Some(self.ch8.multistep(self.step).map(|_| ()))
    }
}
