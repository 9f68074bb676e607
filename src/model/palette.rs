// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Layer display colors.
//!
//! A fixed palette of eight named colors, each with a hex code and a
//! luminance-based choice of readable text color.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ComposerError, Result};

/// Colors a layer can be drawn with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LayerColor {
    Pink,
    Red,
    Orange,
    Yellow,
    Green,
    Mint,
    Cyan,
    Violet,
}

impl LayerColor {
    /// All colors in palette order
    pub const ALL: [LayerColor; 8] = [
        LayerColor::Pink,
        LayerColor::Red,
        LayerColor::Orange,
        LayerColor::Yellow,
        LayerColor::Green,
        LayerColor::Mint,
        LayerColor::Cyan,
        LayerColor::Violet,
    ];

    /// Hex code of this color, e.g. `#FA9DCD`
    pub fn hex_code(self) -> &'static str {
        match self {
            LayerColor::Pink => "#FA9DCD",
            LayerColor::Red => "#F7394C",
            LayerColor::Orange => "#F77A31",
            LayerColor::Yellow => "#FFEE51",
            LayerColor::Green => "#C6F679",
            LayerColor::Mint => "#77E6A9",
            LayerColor::Cyan => "#40D0FF",
            LayerColor::Violet => "#8D56E8",
        }
    }

    /// Symbolic name used in project files
    pub fn name(self) -> &'static str {
        match self {
            LayerColor::Pink => "Pink",
            LayerColor::Red => "Red",
            LayerColor::Orange => "Orange",
            LayerColor::Yellow => "Yellow",
            LayerColor::Green => "Green",
            LayerColor::Mint => "Mint",
            LayerColor::Cyan => "Cyan",
            LayerColor::Violet => "Violet",
        }
    }

    /// Text color that reads best on top of this color.
    ///
    /// Uses `L = 0.299R + 0.587G + 0.114B` with a cutoff of 139.
    pub fn best_contrast(self) -> Contrast {
        // Palette codes always parse
        let (red, green, blue) = parse_rgb(self.hex_code()).unwrap_or((0, 0, 0));
        let luminance = 0.299 * red as f64 + 0.587 * green as f64 + 0.114 * blue as f64;

        if luminance < 139.0 {
            Contrast::White
        } else {
            Contrast::Black
        }
    }
}

impl fmt::Display for LayerColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LayerColor {
    type Err = ComposerError;

    fn from_str(s: &str) -> Result<Self> {
        LayerColor::ALL
            .iter()
            .copied()
            .find(|color| color.name() == s)
            .ok_or_else(|| ComposerError::validation(format!("unknown layer color: {}", s)))
    }
}

/// Text color choice returned by [`LayerColor::best_contrast`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contrast {
    White,
    Black,
}

impl Contrast {
    /// Hex code of the text color
    pub fn hex_code(self) -> &'static str {
        match self {
            Contrast::White => "#FFFFFF",
            Contrast::Black => "#000000",
        }
    }
}

impl fmt::Display for Contrast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Contrast::White => write!(f, "white"),
            Contrast::Black => write!(f, "black"),
        }
    }
}

/// Check that `code` is a `#` followed by exactly six hex digits
pub fn validate_hex_code(code: &str) -> Result<()> {
    let valid = code.len() == 7
        && code.starts_with('#')
        && code[1..].chars().all(|c| c.is_ascii_hexdigit());

    if valid {
        Ok(())
    } else {
        Err(ComposerError::validation(format!(
            "invalid color code: {:?} (expected #RRGGBB)",
            code
        )))
    }
}

/// Decode `#RRGGBB` into channel values
pub fn parse_rgb(code: &str) -> Result<(u8, u8, u8)> {
    validate_hex_code(code)?;

    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&code[range], 16)
            .map_err(|_| ComposerError::validation(format!("invalid color code: {:?}", code)))
    };

    Ok((channel(1..3)?, channel(3..5)?, channel(5..7)?))
}
