// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Editing session.
//!
//! Holds the song being edited together with its file path and an
//! unsaved-changes flag. Front ends drive every edit through a session so
//! the flag stays accurate; the session is the only owner of the song.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::codec::{load_project, save_project, write_midi_file};
use crate::config::Settings;
use crate::error::{ComposerError, Result};
use crate::model::{Layer, Song};

const UNTITLED: &str = "Untitled";

/// The open song and its file state
#[derive(Debug, Clone)]
pub struct Session {
    song: Song,
    path: Option<PathBuf>,
    unsaved_changes: bool,
    settings: Settings,
}

impl Session {
    /// Start a session with a new song
    pub fn new(settings: Settings) -> Self {
        let song = new_song(&settings);
        Self {
            song,
            path: None,
            unsaved_changes: false,
            settings,
        }
    }

    /// Start a session by opening a project file
    pub fn open_file<P: AsRef<Path>>(settings: Settings, path: P) -> Result<Self> {
        let mut session = Self::new(settings);
        session.open(path)?;
        Ok(session)
    }

    /// Get song
    pub fn song(&self) -> &Song {
        &self.song
    }

    /// Get settings
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Path of the open file, if any
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Check for edits since the last save or open
    pub fn has_unsaved_changes(&self) -> bool {
        self.unsaved_changes
    }

    /// File name of the open file, or "Untitled"
    pub fn display_name(&self) -> String {
        self.path
            .as_deref()
            .and_then(Path::file_name)
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| UNTITLED.to_string())
    }

    /// Window title: the display name, starred when there are unsaved changes
    pub fn title(&self) -> String {
        if self.unsaved_changes {
            format!("*{}", self.display_name())
        } else {
            self.display_name()
        }
    }

    /// Replace the song with a new one and forget the file path
    pub fn new_song(&mut self) {
        self.song = new_song(&self.settings);
        self.path = None;
        self.unsaved_changes = false;
        info!("new song");
    }

    /// Open a project file, replacing the current song.
    ///
    /// On failure the current song and path are kept.
    pub fn open<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        let song = load_project(path)?;

        self.song = song;
        self.path = Some(path.to_path_buf());
        self.unsaved_changes = false;
        Ok(())
    }

    /// Save to the open file
    pub fn save(&mut self) -> Result<()> {
        let path = self.path.clone().ok_or(ComposerError::NoOpenPath)?;
        save_project(&self.song, &path)?;
        self.unsaved_changes = false;
        Ok(())
    }

    /// Save to `path` and make it the open file
    pub fn save_as<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        save_project(&self.song, path)?;
        self.path = Some(path.to_path_buf());
        self.unsaved_changes = false;
        Ok(())
    }

    /// Export the song as a MIDI file. Returns `false` if the song is empty.
    pub fn export_midi<P: AsRef<Path>>(&self, path: P) -> Result<bool> {
        write_midi_file(&self.song, path)
    }

    /// Set tempo (10-500 BPM)
    pub fn set_tempo(&mut self, tempo: u16) -> Result<()> {
        self.song.set_tempo(tempo)?;
        self.unsaved_changes = true;
        Ok(())
    }

    /// Append a layer, returning its index
    pub fn add_layer(&mut self, layer: Layer) -> usize {
        self.unsaved_changes = true;
        self.song.add_layer(layer)
    }

    /// Append a layer named `name` using the default volume and color
    pub fn new_layer(&mut self, name: impl Into<String>) -> Result<usize> {
        let layer = Layer::new(
            name,
            self.settings.layer.default_volume,
            self.settings.layer.default_color,
            false,
        )?;
        Ok(self.add_layer(layer))
    }

    /// Remove the layer at `index`
    pub fn remove_layer(&mut self, index: usize) -> Option<Layer> {
        let removed = self.song.remove_layer(index);
        if removed.is_some() {
            self.unsaved_changes = true;
        }
        removed
    }

    /// Edit a layer. Marks the session as changed.
    pub fn layer_mut(&mut self, index: usize) -> Option<&mut Layer> {
        let layer = self.song.layer_mut(index)?;
        self.unsaved_changes = true;
        Some(layer)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

fn new_song(settings: &Settings) -> Song {
    let mut song = Song::new();
    if let Err(e) = song.set_tempo(settings.song.default_tempo) {
        warn!(
            tempo = settings.song.default_tempo,
            error = %e,
            "default tempo rejected, using {}",
            song.tempo()
        );
    }
    song
}
