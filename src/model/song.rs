// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Songs: an ordered list of layers plus a tempo.
//!
//! Layer order is meaningful: it is the display order and the track order
//! on export. Layers are independent, so units on different layers may
//! sound at the same time.

use tracing::debug;

use super::{Beat, Layer, DEFAULT_TEMPO, EXTRA_BEATS, MAX_BEATS, TEMPOS};
use crate::error::{ComposerError, Result};

/// A multi-layer composition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Song {
    /// Tempo in BPM (10-500)
    tempo: u16,
    /// Layers in display/export order
    layers: Vec<Layer>,
}

impl Song {
    /// Create an empty song at the default tempo
    pub fn new() -> Self {
        Self {
            tempo: DEFAULT_TEMPO,
            layers: Vec::new(),
        }
    }

    /// Get tempo
    pub fn tempo(&self) -> u16 {
        self.tempo
    }

    /// Set tempo (10-500 BPM)
    pub fn set_tempo(&mut self, tempo: u16) -> Result<()> {
        if !TEMPOS.contains(&tempo) {
            return Err(ComposerError::validation(format!(
                "tempo {} must be between 10 and 500 BPM",
                tempo
            )));
        }
        self.tempo = tempo;
        Ok(())
    }

    /// Get layers
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Get a layer by index
    pub fn layer(&self, index: usize) -> Option<&Layer> {
        self.layers.get(index)
    }

    /// Get a mutable layer by index
    pub fn layer_mut(&mut self, index: usize) -> Option<&mut Layer> {
        self.layers.get_mut(index)
    }

    /// Get layer count
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Append a layer, returning its index
    pub fn add_layer(&mut self, layer: Layer) -> usize {
        debug!(layer = %layer.name(), "layer added");
        self.layers.push(layer);
        self.layers.len() - 1
    }

    /// Remove the layer at `index`
    pub fn remove_layer(&mut self, index: usize) -> Option<Layer> {
        if index < self.layers.len() {
            let layer = self.layers.remove(index);
            debug!(layer = %layer.name(), "layer removed");
            Some(layer)
        } else {
            None
        }
    }

    /// Highest final beat over all layers, 0 when there are no units
    pub fn final_beat(&self) -> Beat {
        self.layers.iter().map(Layer::final_beat).max().unwrap_or(0)
    }

    /// Number of beat columns an editor grid shows for this song
    pub fn grid_length(&self) -> Beat {
        (self.final_beat() + EXTRA_BEATS).min(MAX_BEATS)
    }
}

impl Default for Song {
    fn default() -> Self {
        Self::new()
    }
}
