// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Beat-indexed timeline model.
//!
//! This module provides:
//! - Units: notes and drum hits spanning inclusive beat ranges
//! - Layers: tracks of non-overlapping units with placement queries
//! - Songs: ordered layers plus a tempo
//! - Palette, pitch and instrument tables used by the above

pub mod instrument;
pub mod layer;
pub mod palette;
pub mod pitch;
pub mod song;
pub mod unit;

pub use layer::Layer;
pub use palette::{validate_hex_code, Contrast, LayerColor};
pub use pitch::Pitch;
pub use song::Song;
pub use unit::{Unit, Voice};

/// A position on the timeline, in beats
pub type Beat = i32;

/// Upper bound on song length in beats
pub const MAX_BEATS: Beat = 10_000;

/// Empty beats shown after the final beat in an editor grid
pub const EXTRA_BEATS: Beat = 32;

/// Fixed MIDI channel (0-based) for drum units
pub const PERCUSSION_CHANNEL: u8 = 9;

/// Fixed MIDI channel (0-based) for note units
pub const MELODIC_CHANNEL: u8 = 1;

/// Valid instrument indexes for note units
pub const NOTE_INSTRUMENTS: std::ops::RangeInclusive<u8> = 0..=127;

/// Valid instrument indexes for drum units
pub const DRUM_INSTRUMENTS: std::ops::RangeInclusive<u8> = 34..=80;

/// Valid octaves for note units
pub const OCTAVES: std::ops::RangeInclusive<i8> = -1..=8;

/// Valid layer volumes
pub const VOLUMES: std::ops::RangeInclusive<u8> = 0..=100;

/// Valid song tempos in BPM
pub const TEMPOS: std::ops::RangeInclusive<u16> = 10..=500;

/// Tempo of a newly created song
pub const DEFAULT_TEMPO: u16 = 60;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants() {
        assert_eq!(MAX_BEATS, 10_000);
        assert_eq!(PERCUSSION_CHANNEL, 9);
        assert_eq!(MELODIC_CHANNEL, 1);
        assert!(TEMPOS.contains(&DEFAULT_TEMPO));
        assert!(!DRUM_INSTRUMENTS.contains(&33));
        assert!(DRUM_INSTRUMENTS.contains(&80));
    }

    #[test]
    fn test_song_creation() {
        let song = Song::new();
        assert_eq!(song.tempo(), DEFAULT_TEMPO);
        assert!(song.layers().is_empty());
        assert_eq!(song.final_beat(), 0);
    }

    #[test]
    fn test_layer_creation() {
        let layer = Layer::new("Bass", 80, LayerColor::Cyan, false).unwrap();
        assert_eq!(layer.name(), "Bass");
        assert!(layer.units().is_empty());
    }
}
