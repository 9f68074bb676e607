// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Serialization of songs.
//!
//! This module provides:
//! - Project text: the editable save format, with a strict parser
//! - MIDI export: Type 1 standard MIDI files
//!
//! Both are pure functions of a song snapshot; neither mutates the song.

pub mod midi;
pub mod text;

pub use midi::{encode_song, write_midi_file, MidiMessage, MidiSequence, MidiTrack, TrackEvent, PPQN};
pub use text::{load_project, parse_project_text, save_project, to_project_text};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Layer, LayerColor, Pitch, Song, Unit};

    #[test]
    fn test_codecs_do_not_mutate() {
        let mut song = Song::new();
        let mut layer = Layer::new("Keys", 70, LayerColor::Orange, false).unwrap();
        layer.add_unit(Unit::note(6, 8, 4, Pitch::F, 3).unwrap()).unwrap();
        layer.add_unit(Unit::note(0, 2, 4, Pitch::Gs, 3).unwrap()).unwrap();
        song.add_layer(layer);

        let before = song.clone();
        let _ = to_project_text(&song);
        let _ = encode_song(&song);
        assert_eq!(song, before);
    }

    #[test]
    fn test_parsed_song_exports_identically() {
        let mut song = Song::new();
        song.set_tempo(140).unwrap();
        let mut layer = Layer::new("Beat", 90, LayerColor::Green, false).unwrap();
        layer.add_unit(Unit::drum(0, 0, 35).unwrap()).unwrap();
        layer.add_unit(Unit::drum(2, 3, 37).unwrap()).unwrap();
        song.add_layer(layer);

        let parsed = parse_project_text(&to_project_text(&song)).unwrap();
        assert_eq!(encode_song(&parsed), encode_song(&song));
    }
}
