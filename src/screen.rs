// (c) 2023 John A. Breaux
// This code is licensed under MIT license (see LICENSE for details)

//! Stores and displays the Chip-8's framebuffer

use std::fmt::{Display, Formatter, Result};

/// Width of the framebuffer, in pixels
pub const WIDTH: usize = 64;
/// Height of the framebuffer, in pixels
pub const HEIGHT: usize = 32;

/// A 64x32 grid of pixels. Pixels are 0 (off) or 1 (on).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Screen {
    pixels: [[u8; WIDTH]; HEIGHT],
}

impl Default for Screen {
    fn default() -> Self {
        Screen {
            pixels: [[0; WIDTH]; HEIGHT],
        }
    }
}

impl Screen {
    /// Constructs a new, cleared screen
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a screen from rows of pixels
    pub fn from_rows(pixels: [[u8; WIDTH]; HEIGHT]) -> Self {
        Screen { pixels }
    }

    /// Clears the screen to 0
    pub fn clear(&mut self) -> &mut Self {
        self.pixels = [[0; WIDTH]; HEIGHT];
        self
    }

    /// Gets the pixel at (x, y), or [None] if it's off the screen
    /// # Examples
    /// ```rust
    /// # use chirp8::*;
    /// let screen = Screen::default();
    /// assert_eq!(Some(0), screen.get(63, 31));
    /// assert_eq!(None, screen.get(64, 0));
    /// ```
    pub fn get(&self, x: usize, y: usize) -> Option<u8> {
        self.pixels.get(y)?.get(x).copied()
    }

    /// Gets the rows of the screen, top to bottom
    pub fn rows(&self) -> &[[u8; WIDTH]; HEIGHT] {
        &self.pixels
    }

    /// Returns true if every pixel is off
    pub fn is_clear(&self) -> bool {
        self.pixels.iter().flatten().all(|&p| p == 0)
    }

    /// XORs an 8-pixel-wide sprite onto the screen with its top-left corner at (x, y).
    ///
    /// The origin always wraps. When `wrap` is set, the sprite's pixels wrap around
    /// both edges; otherwise pixels past an edge are clipped.
    ///
    /// Returns true if any pixel was turned off.
    /// # Examples
    /// ```rust
    /// # use chirp8::*;
    /// let mut screen = Screen::default();
    /// assert!(!screen.draw_sprite(62, 0, &[0xf0], true));
    /// assert_eq!(Some(1), screen.get(63, 0));
    /// assert_eq!(Some(1), screen.get(0, 0));
    /// assert!(screen.draw_sprite(62, 0, &[0xf0], true));
    /// assert!(screen.is_clear());
    /// ```
    pub fn draw_sprite(&mut self, x: usize, y: usize, sprite: &[u8], wrap: bool) -> bool {
        let (x, y) = (x % WIDTH, y % HEIGHT);
        let mut collision = false;
        for (line, &byte) in sprite.iter().enumerate() {
            let row = y + line;
            if !wrap && row >= HEIGHT {
                break;
            }
            let row = &mut self.pixels[row % HEIGHT];
            for bit in 0..8 {
                if byte & (0x80 >> bit) == 0 {
                    continue;
                }
                let col = x + bit;
                if !wrap && col >= WIDTH {
                    break;
                }
                let pixel = &mut row[col % WIDTH];
                collision |= *pixel != 0;
                *pixel ^= 1;
            }
        }
        collision
    }
}

impl Display for Screen {
    /// Renders the screen as text, two pixels tall per character
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        for pair in self.pixels.chunks_exact(2) {
            for (&top, &bottom) in pair[0].iter().zip(pair[1].iter()) {
                write!(
                    f,
                    "{}",
                    match (top != 0, bottom != 0) {
                        (false, false) => ' ',
                        (true, false) => '▀',
                        (false, true) => '▄',
                        (true, true) => '█',
                    }
                )?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collision_and_restore() {
        let mut screen = Screen::new();
        let sprite = [0xff; 4];
        assert!(!screen.draw_sprite(10, 10, &sprite, true));
        for y in 10..14 {
            for x in 10..18 {
                assert_eq!(Some(1), screen.get(x, y));
            }
        }
        assert!(screen.draw_sprite(10, 10, &sprite, true));
        assert!(screen.is_clear());
    }

    #[test]
    fn wraps_both_axes() {
        let mut screen = Screen::new();
        screen.draw_sprite(60, 30, &[0xff, 0xff, 0xff], true);
        for x in [60, 61, 62, 63, 0, 1, 2, 3] {
            for y in [30, 31, 0] {
                assert_eq!(Some(1), screen.get(x, y), "({x}, {y})");
            }
        }
        assert_eq!(Some(0), screen.get(4, 0));
        assert_eq!(Some(0), screen.get(60, 1));
    }

    #[test]
    fn clips_when_not_wrapping() {
        let mut screen = Screen::new();
        screen.draw_sprite(60, 31, &[0xff, 0xff], false);
        assert_eq!(4, screen.rows().iter().flatten().filter(|&&p| p == 1).count());
        assert_eq!(Some(0), screen.get(0, 31));
        assert_eq!(Some(0), screen.get(60, 0));
    }

    #[test]
    fn origin_wraps() {
        let mut screen = Screen::new();
        screen.draw_sprite(64 + 5, 32 + 2, &[0x80], false);
        assert_eq!(Some(1), screen.get(5, 2));
    }

    #[test]
    fn partial_collision() {
        let mut screen = Screen::new();
        screen.draw_sprite(0, 0, &[0x80], true);
        assert!(screen.draw_sprite(0, 0, &[0xc0], true));
        assert_eq!(Some(0), screen.get(0, 0));
        assert_eq!(Some(1), screen.get(1, 0));
    }

    #[test]
    fn display_renders_half_blocks() {
        let mut screen = Screen::new();
        screen.draw_sprite(0, 0, &[0x80, 0x40], true);
        let text = screen.to_string();
        let first = text.lines().next().unwrap();
        assert!(first.starts_with("▀▄"));
        assert_eq!(HEIGHT / 2, text.lines().count());
    }
}
