// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Standard MIDI file export.
//!
//! Songs are exported as Type 1 (multi-track) files at 8 ticks per quarter
//! note, one beat per tick. The first track carries the tempo; each
//! unmuted, non-empty layer then gets its own track in song order.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use tracing::{debug, info, warn};

use crate::error::Result;
use crate::model::{Layer, Song, Voice, MELODIC_CHANNEL, PERCUSSION_CHANNEL};

/// Ticks per quarter note
pub const PPQN: u16 = 8;

/// Channel message carried by a track event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiMessage {
    NoteOn { channel: u8, key: u8, velocity: u8 },
    NoteOff { channel: u8, key: u8, velocity: u8 },
    ProgramChange { channel: u8, program: u8 },
}

impl MidiMessage {
    /// Get channel
    pub fn channel(&self) -> u8 {
        match *self {
            MidiMessage::NoteOn { channel, .. }
            | MidiMessage::NoteOff { channel, .. }
            | MidiMessage::ProgramChange { channel, .. } => channel,
        }
    }

    fn write_to(&self, data: &mut Vec<u8>) {
        match *self {
            MidiMessage::NoteOn { channel, key, velocity } => {
                data.extend_from_slice(&[0x90 | (channel & 0x0F), key & 0x7F, velocity & 0x7F])
            }
            MidiMessage::NoteOff { channel, key, velocity } => {
                data.extend_from_slice(&[0x80 | (channel & 0x0F), key & 0x7F, velocity & 0x7F])
            }
            MidiMessage::ProgramChange { channel, program } => {
                data.extend_from_slice(&[0xC0 | (channel & 0x0F), program & 0x7F])
            }
        }
    }
}

/// A message at an absolute tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackEvent {
    /// Absolute tick
    pub tick: u32,
    /// Message
    pub message: MidiMessage,
}

impl TrackEvent {
    fn new(tick: u32, message: MidiMessage) -> Self {
        Self { tick, message }
    }
}

/// Events exported from one layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MidiTrack {
    /// Track name (the layer name)
    name: String,
    /// Events ordered by tick
    events: Vec<TrackEvent>,
}

impl MidiTrack {
    /// Build the track for a layer.
    ///
    /// Units are visited by end beat; events sharing a tick keep the order
    /// they were generated in.
    pub fn from_layer(layer: &Layer) -> Self {
        let mut units: Vec<_> = layer.units().iter().collect();
        units.sort_by_key(|u| u.end_beat());

        let velocity = layer.volume();
        let mut events = Vec::with_capacity(units.len() * 3);

        for unit in units {
            let start = unit.start_beat() as u32;
            let end = unit.end_beat() as u32 + 1;

            let (channel, key) = match unit.voice() {
                Voice::Drum => (PERCUSSION_CHANNEL, unit.instrument() + 1),
                Voice::Note { .. } => {
                    events.push(TrackEvent::new(
                        start,
                        MidiMessage::ProgramChange {
                            channel: MELODIC_CHANNEL,
                            program: unit.instrument(),
                        },
                    ));
                    (MELODIC_CHANNEL, unit.midi_number().unwrap_or_default())
                }
            };

            events.push(TrackEvent::new(
                start,
                MidiMessage::NoteOn { channel, key, velocity },
            ));
            events.push(TrackEvent::new(
                end,
                MidiMessage::NoteOff { channel, key, velocity },
            ));
        }

        events.sort_by_key(|e| e.tick);

        Self {
            name: layer.name().to_string(),
            events,
        }
    }

    /// Get name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get events
    pub fn events(&self) -> &[TrackEvent] {
        &self.events
    }
}

/// A multi-track sequence ready to be written as a MIDI file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MidiSequence {
    /// Tempo in BPM
    tempo: u16,
    /// One track per exported layer
    tracks: Vec<MidiTrack>,
}

impl MidiSequence {
    /// Build the sequence for a song, skipping muted and empty layers
    pub fn from_song(song: &Song) -> Self {
        let tracks: Vec<MidiTrack> = song
            .layers()
            .iter()
            .filter(|layer| !layer.is_muted() && !layer.is_empty())
            .map(MidiTrack::from_layer)
            .collect();

        debug!(tempo = song.tempo(), tracks = tracks.len(), "MIDI sequence built");

        Self {
            tempo: song.tempo(),
            tracks,
        }
    }

    /// Get tempo
    pub fn tempo(&self) -> u16 {
        self.tempo
    }

    /// Get PPQN
    pub fn ppqn(&self) -> u16 {
        PPQN
    }

    /// Get layer tracks (the tempo track is not included)
    pub fn tracks(&self) -> &[MidiTrack] {
        &self.tracks
    }

    /// Encode as a Type 1 standard MIDI file
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();

        // +1 for tempo track
        let num_tracks = (self.tracks.len() + 1) as u16;
        write_header(&mut bytes, 1, num_tracks, PPQN);

        let mut tempo_track = Vec::new();
        write_variable_length(&mut tempo_track, 0);
        tempo_track.extend_from_slice(&tempo_meta(self.tempo));
        write_track(&mut bytes, tempo_track);

        for track in &self.tracks {
            let mut data = Vec::new();

            write_variable_length(&mut data, 0);
            data.extend_from_slice(&[0xFF, 0x03]);
            write_variable_length(&mut data, track.name.len() as u32);
            data.extend_from_slice(track.name.as_bytes());

            let mut last_tick = 0u32;
            for event in &track.events {
                write_variable_length(&mut data, event.tick - last_tick);
                event.message.write_to(&mut data);
                last_tick = event.tick;
            }

            write_track(&mut bytes, data);
        }

        bytes
    }

    /// Write the encoded file to `writer`
    pub fn write<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(&self.to_bytes())
    }
}

/// Encode a song as MIDI file bytes.
///
/// Returns `None` when the song's final beat is 0; such songs are never
/// written.
pub fn encode_song(song: &Song) -> Option<Vec<u8>> {
    if song.final_beat() == 0 {
        return None;
    }
    Some(MidiSequence::from_song(song).to_bytes())
}

/// Write a song as a MIDI file at `path`.
///
/// Returns `Ok(false)` without touching the file system when the song is
/// empty.
pub fn write_midi_file<P: AsRef<Path>>(song: &Song, path: P) -> Result<bool> {
    let path = path.as_ref();

    let Some(bytes) = encode_song(song) else {
        warn!(path = %path.display(), "song is empty, MIDI export skipped");
        return Ok(false);
    };

    let mut writer = BufWriter::new(File::create(path)?);
    writer.write_all(&bytes)?;
    writer.flush()?;

    info!(path = %path.display(), bytes = bytes.len(), "MIDI file exported");
    Ok(true)
}

fn tempo_meta(bpm: u16) -> [u8; 6] {
    let microseconds = 60_000_000u32 / bpm.max(1) as u32;
    [
        0xFF,
        0x51,
        0x03,
        ((microseconds >> 16) & 0xFF) as u8,
        ((microseconds >> 8) & 0xFF) as u8,
        (microseconds & 0xFF) as u8,
    ]
}

/// Write MIDI file header chunk
fn write_header(bytes: &mut Vec<u8>, format: u16, num_tracks: u16, ppqn: u16) {
    bytes.extend_from_slice(b"MThd");
    // Chunk length (always 6)
    bytes.extend_from_slice(&6u32.to_be_bytes());
    bytes.extend_from_slice(&format.to_be_bytes());
    bytes.extend_from_slice(&num_tracks.to_be_bytes());
    bytes.extend_from_slice(&ppqn.to_be_bytes());
}

/// Write a track chunk, appending end-of-track to `data`
fn write_track(bytes: &mut Vec<u8>, mut data: Vec<u8>) {
    write_variable_length(&mut data, 0);
    data.extend_from_slice(&[0xFF, 0x2F, 0x00]);

    bytes.extend_from_slice(b"MTrk");
    bytes.extend_from_slice(&(data.len() as u32).to_be_bytes());
    bytes.extend_from_slice(&data);
}

/// Write variable-length quantity
fn write_variable_length(bytes: &mut Vec<u8>, mut value: u32) {
    let mut buffer = [0u8; 5];
    let mut len = 0;

    buffer[len] = (value & 0x7F) as u8;
    len += 1;
    value >>= 7;

    while value > 0 {
        buffer[len] = (value & 0x7F) as u8 | 0x80;
        len += 1;
        value >>= 7;
    }

    bytes.extend(buffer[..len].iter().rev());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LayerColor, Pitch, Unit, MAX_BEATS};

    fn drum_song() -> Song {
        let mut song = Song::new();
        let mut layer = Layer::new("Drums", 80, LayerColor::Red, false).unwrap();
        layer.add_unit(Unit::drum(0, 1, 40).unwrap()).unwrap();
        song.add_layer(layer);
        song
    }

    #[test]
    fn test_drum_events() {
        let sequence = MidiSequence::from_song(&drum_song());
        assert_eq!(sequence.tracks().len(), 1);

        let events = sequence.tracks()[0].events();
        assert_eq!(
            events,
            &[
                TrackEvent::new(0, MidiMessage::NoteOn { channel: 9, key: 41, velocity: 80 }),
                TrackEvent::new(2, MidiMessage::NoteOff { channel: 9, key: 41, velocity: 80 }),
            ]
        );
    }

    #[test]
    fn test_note_events() {
        let mut song = Song::new();
        let mut layer = Layer::new("Lead", 64, LayerColor::Pink, false).unwrap();
        layer.add_unit(Unit::note(3, 4, 25, Pitch::A, 4).unwrap()).unwrap();
        song.add_layer(layer);

        let sequence = MidiSequence::from_song(&song);
        assert_eq!(
            sequence.tracks()[0].events(),
            &[
                TrackEvent::new(3, MidiMessage::ProgramChange { channel: 1, program: 25 }),
                TrackEvent::new(3, MidiMessage::NoteOn { channel: 1, key: 69, velocity: 64 }),
                TrackEvent::new(5, MidiMessage::NoteOff { channel: 1, key: 69, velocity: 64 }),
            ]
        );
        assert!(sequence.tracks()[0]
            .events()
            .iter()
            .all(|e| e.message.channel() == MELODIC_CHANNEL));
    }

    #[test]
    fn test_drums_use_percussion_channel() {
        let sequence = MidiSequence::from_song(&drum_song());
        assert_eq!(sequence.ppqn(), 8);
        assert_eq!(sequence.tempo(), 60);
        assert!(sequence.tracks()[0]
            .events()
            .iter()
            .all(|e| e.message.channel() == PERCUSSION_CHANNEL));
    }

    #[test]
    fn test_last_beat_delta_fits_two_bytes() {
        let mut song = Song::new();
        let mut layer = Layer::new("End", 80, LayerColor::Red, false).unwrap();
        layer.add_unit(Unit::drum(MAX_BEATS, MAX_BEATS, 40).unwrap()).unwrap();
        song.add_layer(layer);

        let bytes = encode_song(&song).unwrap();
        // Delta 10000 = 0xCE 0x10, then note-off one tick later
        let tail = [0xCE, 0x10, 0x99, 41, 80, 0x01, 0x89, 41, 80, 0x00, 0xFF, 0x2F, 0x00];
        assert!(bytes.ends_with(&tail));
    }

    #[test]
    fn test_events_sorted_by_tick() {
        let mut song = Song::new();
        let mut layer = Layer::new("Lead", 64, LayerColor::Pink, false).unwrap();
        layer.add_unit(Unit::note(0, 0, 0, Pitch::C, 4).unwrap()).unwrap();
        layer.add_unit(Unit::note(1, 3, 0, Pitch::D, 4).unwrap()).unwrap();
        song.add_layer(layer);

        let sequence = MidiSequence::from_song(&song);
        let ticks: Vec<u32> = sequence.tracks()[0].events().iter().map(|e| e.tick).collect();
        assert_eq!(ticks, vec![0, 0, 1, 1, 1, 4]);

        // First note's off comes before the second note's program change at tick 1
        assert!(matches!(
            sequence.tracks()[0].events()[2].message,
            MidiMessage::NoteOff { key: 60, .. }
        ));
    }

    #[test]
    fn test_muted_and_empty_layers_are_skipped() {
        let mut song = drum_song();
        song.add_layer(Layer::new("Empty", 80, LayerColor::Red, false).unwrap());
        let mut muted = Layer::new("Muted", 80, LayerColor::Red, true).unwrap();
        muted.add_unit(Unit::drum(0, 5, 40).unwrap()).unwrap();
        song.add_layer(muted);

        let sequence = MidiSequence::from_song(&song);
        assert_eq!(sequence.tracks().len(), 1);
        assert_eq!(sequence.tracks()[0].name(), "Drums");
    }

    #[test]
    fn test_drum_bytes() {
        let bytes = encode_song(&drum_song()).unwrap();

        // Header: format 1, 2 tracks, 8 PPQN
        assert_eq!(&bytes[0..4], b"MThd");
        assert_eq!(&bytes[4..8], &[0, 0, 0, 6]);
        assert_eq!(&bytes[8..10], &[0, 1]);
        assert_eq!(&bytes[10..12], &[0, 2]);
        assert_eq!(&bytes[12..14], &[0, 8]);

        // Tempo track: 60 BPM = 1,000,000 = 0x0F4240 microseconds per quarter
        let tempo_track = [
            b'M', b'T', b'r', b'k', 0, 0, 0, 11,
            0x00, 0xFF, 0x51, 0x03, 0x0F, 0x42, 0x40,
            0x00, 0xFF, 0x2F, 0x00,
        ];
        assert_eq!(&bytes[14..33], &tempo_track);

        let layer_track = [
            b'M', b'T', b'r', b'k', 0, 0, 0, 21,
            0x00, 0xFF, 0x03, 0x05, b'D', b'r', b'u', b'm', b's',
            0x00, 0x99, 41, 80,
            0x02, 0x89, 41, 80,
            0x00, 0xFF, 0x2F, 0x00,
        ];
        assert_eq!(&bytes[33..], &layer_track);
    }

    #[test]
    fn test_empty_song_encodes_nothing() {
        assert!(encode_song(&Song::new()).is_none());

        let mut song = Song::new();
        song.add_layer(Layer::new("Empty", 80, LayerColor::Red, false).unwrap());
        assert!(encode_song(&song).is_none());
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let song = drum_song();
        assert_eq!(encode_song(&song), encode_song(&song));
    }

    #[test]
    fn test_variable_length() {
        let mut buffer = Vec::new();

        write_variable_length(&mut buffer, 0);
        assert_eq!(buffer, vec![0x00]);

        buffer.clear();
        write_variable_length(&mut buffer, 127);
        assert_eq!(buffer, vec![0x7F]);

        buffer.clear();
        write_variable_length(&mut buffer, 128);
        assert_eq!(buffer, vec![0x81, 0x00]);

        buffer.clear();
        write_variable_length(&mut buffer, 16383);
        assert_eq!(buffer, vec![0xFF, 0x7F]);

        buffer.clear();
        write_variable_length(&mut buffer, 0x0FFF_FFFF);
        assert_eq!(buffer, vec![0xFF, 0xFF, 0xFF, 0x7F]);
    }

    #[test]
    fn test_tempo_meta() {
        // 120 BPM = 500000 = 0x07A120
        assert_eq!(tempo_meta(120), [0xFF, 0x51, 0x03, 0x07, 0xA1, 0x20]);
    }

    #[test]
    fn test_write_midi_file() {
        let dir = tempfile::tempdir().unwrap();

        let path = dir.path().join("song.mid");
        assert!(write_midi_file(&drum_song(), &path).unwrap());
        assert_eq!(std::fs::read(&path).unwrap(), encode_song(&drum_song()).unwrap());

        let empty = dir.path().join("empty.mid");
        assert!(!write_midi_file(&Song::new(), &empty).unwrap());
        assert!(!empty.exists());
    }

    #[test]
    fn test_write_midi_file_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("song.mid");
        assert!(write_midi_file(&drum_song(), &path).is_err());
    }
}
