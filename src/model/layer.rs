// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Layers: independent tracks of non-overlapping units.
//!
//! A layer plays one unit at a time; chords come from stacking layers.
//! Units are kept ordered by end beat, which is also start-beat order
//! since no two units in a layer share a beat. The free-beat queries
//! rely on that ordering.

use tracing::debug;

use super::{Beat, LayerColor, Pitch, Unit, MAX_BEATS, VOLUMES};
use crate::error::{ComposerError, Result};

/// A track of units plus display and playback metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layer {
    /// Layer name (non-empty, single line)
    name: String,
    /// Velocity for every unit (0-100)
    volume: u8,
    /// Display color
    color: LayerColor,
    /// Whether the layer is silenced on playback and export
    mute: bool,
    /// Units, ordered by end beat
    units: Vec<Unit>,
    /// Highest end beat over all units, 0 when empty
    final_beat: Beat,
}

impl Layer {
    /// Create an empty layer
    pub fn new(name: impl Into<String>, volume: u8, color: LayerColor, mute: bool) -> Result<Self> {
        let name = name.into();
        validate_name(&name)?;
        validate_volume(volume)?;

        Ok(Self {
            name,
            volume,
            color,
            mute,
            units: Vec::new(),
            final_beat: 0,
        })
    }

    /// Get name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the layer
    pub fn set_name(&mut self, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        validate_name(&name)?;
        self.name = name;
        Ok(())
    }

    /// Get volume
    pub fn volume(&self) -> u8 {
        self.volume
    }

    /// Set volume (0-100)
    pub fn set_volume(&mut self, volume: u8) -> Result<()> {
        validate_volume(volume)?;
        self.volume = volume;
        Ok(())
    }

    /// Get color
    pub fn color(&self) -> LayerColor {
        self.color
    }

    /// Set color
    pub fn set_color(&mut self, color: LayerColor) {
        self.color = color;
    }

    /// Check if muted
    pub fn is_muted(&self) -> bool {
        self.mute
    }

    /// Set mute
    pub fn set_mute(&mut self, mute: bool) {
        self.mute = mute;
    }

    /// Toggle mute
    pub fn toggle_mute(&mut self) {
        self.mute = !self.mute;
    }

    /// Highest beat covered by any unit, 0 when empty
    pub fn final_beat(&self) -> Beat {
        self.final_beat
    }

    /// Units ordered by end beat
    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    /// Get unit count
    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    /// Check if the layer has no units
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Add a unit.
    ///
    /// Fails with [`ComposerError::Overlap`] if any of its beats is already
    /// covered; the layer is unchanged in that case.
    pub fn add_unit(&mut self, unit: Unit) -> Result<()> {
        if self.range_overlaps_unit(unit.start_beat(), unit.end_beat(), None) {
            return Err(ComposerError::Overlap {
                start: unit.start_beat(),
                end: unit.end_beat(),
            });
        }

        if unit.end_beat() > self.final_beat {
            self.final_beat = unit.end_beat();
        }

        debug!(layer = %self.name, unit = %unit, "unit added");
        self.insert_sorted(unit);
        Ok(())
    }

    /// Remove a unit equal to `unit`, returning it if present
    pub fn remove_unit(&mut self, unit: &Unit) -> Option<Unit> {
        let index = self.units.iter().position(|u| u == unit)?;
        let removed = self.units.remove(index);

        if removed.end_beat() == self.final_beat {
            self.final_beat = self.units.last().map_or(0, Unit::end_beat);
        }

        debug!(layer = %self.name, unit = %removed, "unit removed");
        Some(removed)
    }

    /// Move a unit to `new_start..=new_end`.
    ///
    /// The new range may overlap the unit's current beats but no other
    /// unit. On success the final beat is recomputed from every unit.
    pub fn move_unit(&mut self, unit: &Unit, new_start: Beat, new_end: Beat) -> Result<()> {
        if new_end < new_start {
            return Err(ComposerError::validation(format!(
                "new end beat {} is before new start beat {}",
                new_end, new_start
            )));
        }
        if new_start < 0 {
            return Err(ComposerError::validation(format!(
                "new start beat {} cannot be negative",
                new_start
            )));
        }
        if new_end > MAX_BEATS {
            return Err(ComposerError::validation(format!(
                "new end beat {} is past the last beat {}",
                new_end, MAX_BEATS
            )));
        }

        let index = self.index_of(unit)?;
        if self.range_overlaps_unit(new_start, new_end, Some(unit)) {
            return Err(ComposerError::Overlap {
                start: new_start,
                end: new_end,
            });
        }

        let mut moved = self.units.remove(index);
        moved.set_bounds(new_start, new_end);
        debug!(layer = %self.name, unit = %moved, "unit moved");
        self.insert_sorted(moved);
        self.final_beat = self.recompute_final_beat();
        Ok(())
    }

    /// Change the instrument of a unit in this layer
    pub fn set_unit_instrument(&mut self, unit: &Unit, instrument: u8) -> Result<()> {
        let index = self.index_of(unit)?;
        self.units[index].set_instrument(instrument)
    }

    /// Change the pitch of a note in this layer
    pub fn set_unit_pitch(&mut self, unit: &Unit, pitch: Pitch) -> Result<()> {
        let index = self.index_of(unit)?;
        self.units[index].set_pitch(pitch)
    }

    /// Change the octave of a note in this layer
    pub fn set_unit_octave(&mut self, unit: &Unit, octave: i8) -> Result<()> {
        let index = self.index_of(unit)?;
        self.units[index].set_octave(octave)
    }

    /// Check if `beat` is covered by any unit
    pub fn beat_overlaps_unit(&self, beat: Beat) -> bool {
        self.units.iter().any(|u| u.overlaps_beat(beat))
    }

    /// Check if `beat` is covered by any unit other than `excluding`
    pub fn beat_overlaps_unit_excluding(&self, beat: Beat, excluding: &Unit) -> bool {
        self.units
            .iter()
            .filter(|u| *u != excluding)
            .any(|u| u.overlaps_beat(beat))
    }

    /// Check if any beat of `start..=end` is covered by a unit other than `excluding`.
    ///
    /// An empty range (`start > end`) never overlaps.
    pub fn range_overlaps_unit(&self, start: Beat, end: Beat, excluding: Option<&Unit>) -> bool {
        if start > end {
            return false;
        }

        self.units
            .iter()
            .filter(|u| Some(*u) != excluding)
            .any(|u| u.overlaps_range(start, end))
    }

    /// First beat of the free run that ends just before `beat`.
    ///
    /// Returns the end of the nearest unit finishing before `beat` plus one,
    /// or 0 when no unit lies to the left.
    pub fn left_free_beat(&self, beat: Beat) -> Result<Beat> {
        if beat < 0 {
            return Err(ComposerError::Range(beat));
        }
        Ok(self.left_free_from(beat))
    }

    /// [`left_free_beat`](Self::left_free_beat) from a unit's start beat
    pub fn left_free_beat_of(&self, unit: &Unit) -> Beat {
        self.left_free_from(unit.start_beat())
    }

    /// Last beat of the free run that starts just after `beat`.
    ///
    /// Returns the start of the nearest unit beginning after `beat` minus
    /// one, or [`MAX_BEATS`] when no unit lies to the right.
    pub fn right_free_beat(&self, beat: Beat) -> Result<Beat> {
        if beat < 0 {
            return Err(ComposerError::Range(beat));
        }
        Ok(self.right_free_from(beat))
    }

    /// [`right_free_beat`](Self::right_free_beat) from a unit's end beat
    pub fn right_free_beat_of(&self, unit: &Unit) -> Beat {
        self.right_free_from(unit.end_beat())
    }

    /// Sort units by end beat (stable)
    pub fn sort_units(&mut self) {
        self.units.sort_by_key(Unit::end_beat);
    }

    fn left_free_from(&self, beat: Beat) -> Beat {
        let Some(last) = self.units.last() else {
            return 0;
        };

        match self.units.iter().position(|u| u.end_beat() >= beat) {
            Some(0) => 0,
            Some(i) => self.units[i - 1].end_beat() + 1,
            None => last.end_beat() + 1,
        }
    }

    fn right_free_from(&self, beat: Beat) -> Beat {
        let Some(first) = self.units.first() else {
            return MAX_BEATS;
        };

        match self.units.iter().rposition(|u| u.start_beat() <= beat) {
            Some(i) if i == self.units.len() - 1 => MAX_BEATS,
            Some(i) => self.units[i + 1].start_beat() - 1,
            None => first.start_beat() - 1,
        }
    }

    fn insert_sorted(&mut self, unit: Unit) {
        let at = self
            .units
            .partition_point(|u| u.end_beat() <= unit.end_beat());
        self.units.insert(at, unit);
    }

    fn index_of(&self, unit: &Unit) -> Result<usize> {
        self.units
            .iter()
            .position(|u| u == unit)
            .ok_or(ComposerError::UnitNotFound)
    }

    fn recompute_final_beat(&self) -> Beat {
        self.units.iter().map(Unit::end_beat).max().unwrap_or(0)
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(ComposerError::validation("layer name cannot be empty"));
    }
    if name.contains(['\n', '\r']) {
        return Err(ComposerError::validation("layer name must be a single line"));
    }
    Ok(())
}

fn validate_volume(volume: u8) -> Result<()> {
    if VOLUMES.contains(&volume) {
        Ok(())
    } else {
        Err(ComposerError::validation(format!(
            "volume {} must be between 0 and 100",
            volume
        )))
    }
}
