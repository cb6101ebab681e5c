// (c) 2023 John A. Breaux
// This code is licensed under MIT license (see LICENSE for details)

//! Error type for Chirp8

use thiserror::Error;

/// Result type, equivalent to [std::result::Result]<T, [enum@Error]>
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for Chirp8.
#[derive(Debug, Error)]
pub enum Error {
    /// Tried to touch memory outside of `0..4096`
    #[error("memory access of {len} byte(s) at {addr:03x} is out of bounds")]
    OutOfBounds {
        /// The first address of the offending access
        addr: usize,
        /// The number of bytes in the offending access
        len: usize,
    },
    /// Called a subroutine with every stack frame in use
    #[error("stack overflow: call at {pc:03x} would exceed 16 frames")]
    StackOverflow {
        /// The address of the offending call
        pc: u16,
    },
    /// Returned from a subroutine with nothing on the stack
    #[error("stack underflow: return at {pc:03x} with an empty stack")]
    StackUnderflow {
        /// The address of the offending return
        pc: u16,
    },
    /// A snapshot failed validation, and was not applied
    #[error("invalid snapshot field `{field}`: {reason}")]
    InvalidSnapshot {
        /// The name of the offending field, as it appears on the wire
        field: &'static str,
        /// What was wrong with it
        reason: String,
    },
    /// Represents an unrecognized opcode
    #[error("opcode {word:04x} not recognized")]
    UnknownOpcode {
        /// The offending word
        word: u16,
    },
    /// Tried to press a key that doesn't exist
    #[error("tried to press key {key:X} which does not exist")]
    InvalidKey {
        /// The offending key
        key: usize,
    },
    /// Tried to get/set an out-of-bounds register
    #[error("tried to access register v{reg:X} which does not exist")]
    InvalidRegister {
        /// The offending register
        reg: usize,
    },
    /// Error originated in [serde_json]
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    /// Error originated in [std::io]
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Reports whether this error halts execution.
    ///
    /// Only [Error::UnknownOpcode] leaves the machine runnable.
    /// # Examples
    /// ```rust
    /// # use chirp8::error::Error;
    /// assert!(Error::StackUnderflow { pc: 0x200 }.is_fatal());
    /// assert!(!Error::UnknownOpcode { word: 0xffff }.is_fatal());
    /// ```
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            Error::UnknownOpcode { .. } | Error::InvalidKey { .. } | Error::InvalidRegister { .. }
        )
    }
}
