// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Pitch spellings for note units.
//!
//! Twelve pitch classes, with sharp and flat spellings of the black keys
//! kept distinct. Enharmonic pairs share a value but not a name.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ComposerError, Result};

/// Pitch of a note, independent of octave
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Pitch {
    C,
    Cs, // C#
    Db, // D♭
    D,
    Ds, // D#
    Eb, // E♭
    E,
    F,
    Fs, // F#
    Gb, // G♭
    G,
    Gs, // G#
    Ab, // A♭
    A,
    As, // A#
    Bb, // B♭
    B,
}

impl Pitch {
    /// All spellings, in ascending pitch order
    pub const ALL: [Pitch; 17] = [
        Pitch::C,
        Pitch::Cs,
        Pitch::Db,
        Pitch::D,
        Pitch::Ds,
        Pitch::Eb,
        Pitch::E,
        Pitch::F,
        Pitch::Fs,
        Pitch::Gb,
        Pitch::G,
        Pitch::Gs,
        Pitch::Ab,
        Pitch::A,
        Pitch::As,
        Pitch::Bb,
        Pitch::B,
    ];

    /// Pitch class (0-11), C = 0
    pub fn value(self) -> u8 {
        match self {
            Pitch::C => 0,
            Pitch::Cs | Pitch::Db => 1,
            Pitch::D => 2,
            Pitch::Ds | Pitch::Eb => 3,
            Pitch::E => 4,
            Pitch::F => 5,
            Pitch::Fs | Pitch::Gb => 6,
            Pitch::G => 7,
            Pitch::Gs | Pitch::Ab => 8,
            Pitch::A => 9,
            Pitch::As | Pitch::Bb => 10,
            Pitch::B => 11,
        }
    }

    /// Display name, e.g. `C#` or `D♭`
    pub fn name(self) -> &'static str {
        match self {
            Pitch::C => "C",
            Pitch::Cs => "C#",
            Pitch::Db => "D♭",
            Pitch::D => "D",
            Pitch::Ds => "D#",
            Pitch::Eb => "E♭",
            Pitch::E => "E",
            Pitch::F => "F",
            Pitch::Fs => "F#",
            Pitch::Gb => "G♭",
            Pitch::G => "G",
            Pitch::Gs => "G#",
            Pitch::Ab => "A♭",
            Pitch::A => "A",
            Pitch::As => "A#",
            Pitch::Bb => "B♭",
            Pitch::B => "B",
        }
    }

    /// ASCII token used in project files, e.g. `Cs` or `Db`
    pub fn token(self) -> &'static str {
        match self {
            Pitch::C => "C",
            Pitch::Cs => "Cs",
            Pitch::Db => "Db",
            Pitch::D => "D",
            Pitch::Ds => "Ds",
            Pitch::Eb => "Eb",
            Pitch::E => "E",
            Pitch::F => "F",
            Pitch::Fs => "Fs",
            Pitch::Gb => "Gb",
            Pitch::G => "G",
            Pitch::Gs => "Gs",
            Pitch::Ab => "Ab",
            Pitch::A => "A",
            Pitch::As => "As",
            Pitch::Bb => "Bb",
            Pitch::B => "B",
        }
    }

    /// Sharp spelling for a pitch class
    pub fn from_value(value: u8) -> Self {
        match value % 12 {
            0 => Pitch::C,
            1 => Pitch::Cs,
            2 => Pitch::D,
            3 => Pitch::Ds,
            4 => Pitch::E,
            5 => Pitch::F,
            6 => Pitch::Fs,
            7 => Pitch::G,
            8 => Pitch::Gs,
            9 => Pitch::A,
            10 => Pitch::As,
            _ => Pitch::B,
        }
    }

    /// Check whether two spellings name the same pitch class
    pub fn is_enharmonic(self, other: Pitch) -> bool {
        self.value() == other.value()
    }
}

impl fmt::Display for Pitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Pitch {
    type Err = ComposerError;

    /// Parse a project-file token (`C`, `Cs`, `Db`, ...)
    fn from_str(s: &str) -> Result<Self> {
        Pitch::ALL
            .iter()
            .copied()
            .find(|pitch| pitch.token() == s)
            .ok_or_else(|| ComposerError::validation(format!("unknown pitch: {}", s)))
    }
}
