// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Sound units placed on a layer.
//!
//! A unit is either a pitched note or a drum hit, spanning an inclusive
//! range of beats. Construction validates the range and the instrument;
//! the beat range only changes through [`Layer::move_unit`](super::Layer::move_unit).

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{Beat, Pitch, DRUM_INSTRUMENTS, MAX_BEATS, NOTE_INSTRUMENTS, OCTAVES};
use crate::error::{ComposerError, Result};

/// What a unit sounds like
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Voice {
    /// Pitched note played with a melodic program
    Note { pitch: Pitch, octave: i8 },
    /// Hit on the percussion channel
    Drum,
}

/// A note or drum hit over `start_beat..=end_beat`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Unit {
    start_beat: Beat,
    end_beat: Beat,
    instrument: u8,
    voice: Voice,
}

impl Unit {
    /// Create a note unit
    pub fn note(
        start_beat: Beat,
        end_beat: Beat,
        instrument: u8,
        pitch: Pitch,
        octave: i8,
    ) -> Result<Self> {
        validate_bounds(start_beat, end_beat)?;
        validate_note_instrument(instrument)?;
        validate_octave(octave)?;

        Ok(Self {
            start_beat,
            end_beat,
            instrument,
            voice: Voice::Note { pitch, octave },
        })
    }

    /// Create a drum unit
    pub fn drum(start_beat: Beat, end_beat: Beat, instrument: u8) -> Result<Self> {
        validate_bounds(start_beat, end_beat)?;
        validate_drum_instrument(instrument)?;

        Ok(Self {
            start_beat,
            end_beat,
            instrument,
            voice: Voice::Drum,
        })
    }

    /// First beat covered
    pub fn start_beat(&self) -> Beat {
        self.start_beat
    }

    /// Last beat covered
    pub fn end_beat(&self) -> Beat {
        self.end_beat
    }

    /// Number of beats covered
    pub fn duration(&self) -> Beat {
        self.end_beat - self.start_beat + 1
    }

    /// Instrument index (melodic program for notes, percussion index for drums)
    pub fn instrument(&self) -> u8 {
        self.instrument
    }

    /// Get voice
    pub fn voice(&self) -> Voice {
        self.voice
    }

    /// Check if this is a drum unit
    pub fn is_drum(&self) -> bool {
        matches!(self.voice, Voice::Drum)
    }

    /// Pitch of a note, `None` for drums
    pub fn pitch(&self) -> Option<Pitch> {
        match self.voice {
            Voice::Note { pitch, .. } => Some(pitch),
            Voice::Drum => None,
        }
    }

    /// Octave of a note, `None` for drums
    pub fn octave(&self) -> Option<i8> {
        match self.voice {
            Voice::Note { octave, .. } => Some(octave),
            Voice::Drum => None,
        }
    }

    /// MIDI key number of a note: `pitch + 12 * (octave + 1)`
    pub fn midi_number(&self) -> Option<u8> {
        match self.voice {
            Voice::Note { pitch, octave } => {
                Some((pitch.value() as i16 + 12 * (octave as i16 + 1)) as u8)
            }
            Voice::Drum => None,
        }
    }

    /// Pitch and octave as shown to a user, e.g. `C#4`
    pub fn pitch_format(&self) -> Option<String> {
        match self.voice {
            Voice::Note { pitch, octave } => Some(format!("{}{}", pitch.name(), octave)),
            Voice::Drum => None,
        }
    }

    /// Check if `beat` falls inside this unit
    pub fn overlaps_beat(&self, beat: Beat) -> bool {
        self.start_beat <= beat && beat <= self.end_beat
    }

    /// Check if any beat of `start..=end` falls inside this unit
    pub fn overlaps_range(&self, start: Beat, end: Beat) -> bool {
        start <= self.end_beat && self.start_beat <= end
    }

    /// Set instrument, validated against this unit's voice
    pub fn set_instrument(&mut self, instrument: u8) -> Result<()> {
        match self.voice {
            Voice::Note { .. } => validate_note_instrument(instrument)?,
            Voice::Drum => validate_drum_instrument(instrument)?,
        }
        self.instrument = instrument;
        Ok(())
    }

    /// Set pitch of a note
    pub fn set_pitch(&mut self, new_pitch: Pitch) -> Result<()> {
        match &mut self.voice {
            Voice::Note { pitch, .. } => {
                *pitch = new_pitch;
                Ok(())
            }
            Voice::Drum => Err(ComposerError::validation("drum units have no pitch")),
        }
    }

    /// Set octave of a note
    pub fn set_octave(&mut self, new_octave: i8) -> Result<()> {
        validate_octave(new_octave)?;
        match &mut self.voice {
            Voice::Note { octave, .. } => {
                *octave = new_octave;
                Ok(())
            }
            Voice::Drum => Err(ComposerError::validation("drum units have no octave")),
        }
    }

    /// Replace the beat range. Placement checks are the caller's job.
    pub(crate) fn set_bounds(&mut self, start_beat: Beat, end_beat: Beat) {
        self.start_beat = start_beat;
        self.end_beat = end_beat;
    }
}

/// Project-file line for this unit
impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.voice {
            Voice::Note { pitch, octave } => write!(
                f,
                "note {} {} {} {} {}",
                self.start_beat,
                self.end_beat,
                self.instrument,
                pitch.token(),
                octave
            ),
            Voice::Drum => write!(
                f,
                "drum {} {} {}",
                self.start_beat, self.end_beat, self.instrument
            ),
        }
    }
}

fn validate_bounds(start_beat: Beat, end_beat: Beat) -> Result<()> {
    if start_beat < 0 {
        return Err(ComposerError::validation(format!(
            "start beat {} cannot be negative",
            start_beat
        )));
    }
    if start_beat > end_beat {
        return Err(ComposerError::validation(format!(
            "start beat {} is after end beat {}",
            start_beat, end_beat
        )));
    }
    if end_beat > MAX_BEATS {
        return Err(ComposerError::validation(format!(
            "end beat {} is past the last beat {}",
            end_beat, MAX_BEATS
        )));
    }
    Ok(())
}

fn validate_note_instrument(instrument: u8) -> Result<()> {
    if NOTE_INSTRUMENTS.contains(&instrument) {
        Ok(())
    } else {
        Err(ComposerError::validation(format!(
            "note instrument {} must be from 0-127",
            instrument
        )))
    }
}

fn validate_drum_instrument(instrument: u8) -> Result<()> {
    if DRUM_INSTRUMENTS.contains(&instrument) {
        Ok(())
    } else {
        Err(ComposerError::validation(format!(
            "drum instrument {} must be from 34-80",
            instrument
        )))
    }
}

fn validate_octave(octave: i8) -> Result<()> {
    if OCTAVES.contains(&octave) {
        Ok(())
    } else {
        Err(ComposerError::validation(format!(
            "octave {} must be from -1 through 8",
            octave
        )))
    }
}
