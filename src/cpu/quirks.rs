// (c) 2023 John A. Breaux
// This code is licensed under MIT license (see LICENSE for details)

//! Controls the [Quirks] behavior of the CPU on a granular level.

/// Controls the quirk behavior of the CPU on a granular level.
///
/// `true` is the modern, CHIP-48-like behavior. The [Default] enables every quirk.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Quirks {
    /// Binary ops in `8xy`(`1`, `2`, `3`) shouldn't set vF to 0
    pub bin_ops: bool,
    /// Shift ops in `8xy`(`6`, `E`) should source from vX instead of vY
    pub shift: bool,
    /// DMA instructions `Fx55`/`Fx65` shouldn't change I to I + x + 1
    pub dma_inc: bool,
    /// Draw operations should wrap from bottom to top and side to side
    pub screen_wrap: bool,
}

impl Quirks {
    /// The behavior of the original COSMAC VIP interpreter
    /// # Examples
    /// ```rust
    /// # use chirp8::*;
    /// let vip = Quirks::vip();
    /// assert!(!vip.shift && !vip.dma_inc && !vip.bin_ops && !vip.screen_wrap);
    /// ```
    pub fn vip() -> Self {
        Self::from(false)
    }
}

impl From<bool> for Quirks {
    fn from(value: bool) -> Self {
        Quirks {
            bin_ops: value,
            shift: value,
            dma_inc: value,
            screen_wrap: value,
        }
    }
}

impl Default for Quirks {
    fn default() -> Self {
        Self::from(true)
    }
}
