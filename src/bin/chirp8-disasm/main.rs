// (c) 2023 John A. Breaux
// This code is licensed under MIT license (see LICENSE for details)

//! Disassembles a Chip-8 ROM to the terminal

use chirp8::{Dis, Disassembler, Result, PROGRAM_START};
use gumdrop::*;
use owo_colors::OwoColorize;
use std::{fs::read, path::PathBuf};

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Options, Hash)]
struct Arguments {
    #[options(help = "Show help text")]
    help: bool,
    #[options(help = "Load a ROM to disassemble", free, required)]
    pub file: PathBuf,
    #[options(
        help = "Load address (usually 200)",
        parse(try_from_str = "parse_hex"),
        meta = "ADDR"
    )]
    pub loadaddr: Option<u16>,
    #[options(help = "Start disassembling at offset...")]
    pub offset: usize,
}

/// Parses a hexadecimal string into a u16
fn parse_hex(value: &str) -> std::result::Result<u16, std::num::ParseIntError> {
    u16::from_str_radix(value.trim_start_matches("0x"), 16)
}

fn main() -> Result<()> {
    env_logger::init();
    let options = Arguments::parse_args_default_or_exit();
    let contents = read(&options.file)?;
    let loadaddr = options.loadaddr.unwrap_or(PROGRAM_START) as usize;
    let disassembler = Dis::default();
    let body = contents.get(options.offset..).unwrap_or_default();
    log::debug!(
        "disassembling {} bytes of {}",
        body.len(),
        options.file.display()
    );
    for (index, pair) in body.chunks_exact(2).enumerate() {
        let insn = u16::from_be_bytes([pair[0], pair[1]]);
        println!(
            "{:03x}: {} {:04x}",
            loadaddr + options.offset + 2 * index,
            disassembler.once(insn),
            insn.bright_black(),
        );
    }
    if let [odd] = body.chunks_exact(2).remainder() {
        println!(
            "{:03x}: {}",
            loadaddr + options.offset + body.len() - 1,
            format_args!("db     #{odd:02x}").bright_black()
        );
    }
    Ok(())
}
