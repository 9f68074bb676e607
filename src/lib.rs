// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Beatline - beat-indexed multi-track composition
//!
//! A song is an ordered list of layers, each holding non-overlapping note
//! or drum units on an integer beat grid. Songs save to a line-oriented
//! project format and export to Standard MIDI Files.

pub mod codec;
pub mod config;
pub mod error;
pub mod model;
pub mod session;

pub use error::{ComposerError, Result};
pub use model::{Beat, Layer, LayerColor, Pitch, Song, Unit, Voice};
pub use session::Session;
