// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Project file text format.
//!
//! ```text
//! tempo 120
//!
//! layer Pink 80 Melody
//! *layer Cyan 100 Drums
//! --------------------------
//!
//! Melody
//!
//! note 0 3 0 C 4
//!
//! note 4 5 0 Eb 4
//! --------------------------
//!
//! Drums
//!
//! drum 0 0 35
//! ```
//!
//! A header line per layer (`*` marks a muted layer) is followed by one
//! section per layer, in the same order, listing its units by end beat.
//! Parsing accepts exactly what [`to_project_text`] writes.

use std::fs;
use std::iter::Peekable;
use std::path::Path;
use std::str::{FromStr, Lines};

use tracing::{debug, info};

use crate::error::{ComposerError, Result};
use crate::model::{Beat, Layer, LayerColor, Pitch, Song, Unit};

/// Line separating layer sections
pub const SECTION_SEPARATOR: &str = "--------------------------";

const MUTED_MARKER: char = '*';

/// Serialize a song to project text
pub fn to_project_text(song: &Song) -> String {
    let mut text = String::new();

    text.push_str("tempo ");
    text.push_str(&song.tempo().to_string());
    text.push_str("\n\n");

    for layer in song.layers() {
        if layer.is_muted() {
            text.push(MUTED_MARKER);
        }
        text.push_str(&format!(
            "layer {} {} {}\n",
            layer.color(),
            layer.volume(),
            layer.name()
        ));
    }

    for layer in song.layers() {
        text.push_str(SECTION_SEPARATOR);
        text.push_str("\n\n");
        text.push_str(layer.name());
        text.push('\n');

        for unit in sorted_units(layer) {
            text.push('\n');
            text.push_str(&unit.to_string());
        }

        text.push('\n');
    }

    debug!(layers = song.layer_count(), bytes = text.len(), "song serialized");
    text
}

/// Parse project text into a new song.
///
/// Nothing is returned unless the whole text is valid.
pub fn parse_project_text(text: &str) -> Result<Song> {
    let mut reader = LineReader::new(text);
    let mut song = Song::new();

    let tempo_line = reader.expect_line("tempo line")?;
    let tempo = parse_keyword_value::<u16>(&reader, tempo_line, "tempo")?;
    song.set_tempo(tempo).map_err(|e| reader.error(e.to_string()))?;
    reader.expect_blank()?;

    let mut layers = Vec::new();
    while let Some(line) = reader.peek() {
        if line == SECTION_SEPARATOR {
            break;
        }
        reader.next_line();
        layers.push(parse_layer_header(&reader, line)?);
    }

    for layer in &mut layers {
        let separator = reader.expect_line("section separator")?;
        if separator != SECTION_SEPARATOR {
            return Err(reader.error(format!("expected {:?}", SECTION_SEPARATOR)));
        }
        reader.expect_blank()?;

        let name = reader.expect_line("layer name")?;
        if name != layer.name() {
            return Err(reader.error(format!(
                "section {:?} does not match layer {:?}",
                name,
                layer.name()
            )));
        }

        parse_units(&mut reader, layer)?;
    }

    if let Some(extra) = reader.next_line() {
        return Err(reader.error(format!("unexpected trailing line {:?}", extra)));
    }

    for layer in layers {
        song.add_layer(layer);
    }
    Ok(song)
}

/// Write a song's project text to `path`
pub fn save_project<P: AsRef<Path>>(song: &Song, path: P) -> Result<()> {
    let path = path.as_ref();
    fs::write(path, to_project_text(song))?;
    info!(path = %path.display(), "project saved");
    Ok(())
}

/// Read and parse a project file
pub fn load_project<P: AsRef<Path>>(path: P) -> Result<Song> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    let song = parse_project_text(&text)?;
    info!(path = %path.display(), layers = song.layer_count(), "project loaded");
    Ok(song)
}

/// Units of a layer by end beat, without touching the layer
fn sorted_units(layer: &Layer) -> Vec<&Unit> {
    let mut units: Vec<&Unit> = layer.units().iter().collect();
    units.sort_by_key(|u| u.end_beat());
    units
}

fn parse_layer_header(reader: &LineReader<'_>, line: &str) -> Result<Layer> {
    let (mute, rest) = match line.strip_prefix(MUTED_MARKER) {
        Some(rest) => (true, rest),
        None => (false, line),
    };

    let mut fields = rest.splitn(4, ' ');
    if fields.next() != Some("layer") {
        return Err(reader.error("expected layer header"));
    }

    let color = fields
        .next()
        .ok_or_else(|| reader.error("missing layer color"))?;
    let color = LayerColor::from_str(color).map_err(|e| reader.error(e.to_string()))?;

    let volume = fields
        .next()
        .ok_or_else(|| reader.error("missing layer volume"))?;
    let volume = parse_number::<u8>(reader, volume, "volume")?;

    let name = fields
        .next()
        .ok_or_else(|| reader.error("missing layer name"))?;

    Layer::new(name, volume, color, mute).map_err(|e| reader.error(e.to_string()))
}

fn parse_units(reader: &mut LineReader<'_>, layer: &mut Layer) -> Result<()> {
    // The section name is always followed by exactly one blank line
    reader.expect_blank()?;
    if matches!(reader.peek(), None | Some(SECTION_SEPARATOR)) {
        return Ok(());
    }

    loop {
        let line = reader.expect_line("unit line")?;
        let unit = parse_unit(reader, line)?;
        layer
            .add_unit(unit)
            .map_err(|e| reader.error(e.to_string()))?;

        match reader.peek() {
            None | Some(SECTION_SEPARATOR) => return Ok(()),
            Some("") => {
                reader.next_line();
            }
            Some(_) => return Err(reader.error_at_next("expected a blank line before unit")),
        }
    }
}

fn parse_unit(reader: &LineReader<'_>, line: &str) -> Result<Unit> {
    let fields: Vec<&str> = line.split(' ').collect();

    let unit = match fields.as_slice() {
        ["note", start, end, instrument, pitch, octave] => {
            let pitch = Pitch::from_str(pitch).map_err(|e| reader.error(e.to_string()))?;
            Unit::note(
                parse_number::<Beat>(reader, start, "start beat")?,
                parse_number::<Beat>(reader, end, "end beat")?,
                parse_number::<u8>(reader, instrument, "instrument")?,
                pitch,
                parse_number::<i8>(reader, octave, "octave")?,
            )
        }
        ["drum", start, end, instrument] => Unit::drum(
            parse_number::<Beat>(reader, start, "start beat")?,
            parse_number::<Beat>(reader, end, "end beat")?,
            parse_number::<u8>(reader, instrument, "instrument")?,
        ),
        _ => return Err(reader.error(format!("malformed unit line {:?}", line))),
    };

    unit.map_err(|e| reader.error(e.to_string()))
}

fn parse_keyword_value<T: FromStr>(reader: &LineReader<'_>, line: &str, keyword: &str) -> Result<T> {
    match line.split_once(' ') {
        Some((key, value)) if key == keyword => parse_number(reader, value, keyword),
        _ => Err(reader.error(format!("expected `{} <value>`", keyword))),
    }
}

fn parse_number<T: FromStr>(reader: &LineReader<'_>, field: &str, what: &str) -> Result<T> {
    // `str::parse` accepts a leading '+', the writer never emits one
    if field.starts_with('+') {
        return Err(reader.error(format!("invalid {}: {:?}", what, field)));
    }
    field
        .parse()
        .map_err(|_| reader.error(format!("invalid {}: {:?}", what, field)))
}

/// Line cursor that remembers the current line number for errors
struct LineReader<'a> {
    lines: Peekable<Lines<'a>>,
    line_number: usize,
}

impl<'a> LineReader<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            lines: text.lines().peekable(),
            line_number: 0,
        }
    }

    fn peek(&mut self) -> Option<&'a str> {
        self.lines.peek().copied()
    }

    fn next_line(&mut self) -> Option<&'a str> {
        let line = self.lines.next();
        if line.is_some() {
            self.line_number += 1;
        }
        line
    }

    fn expect_line(&mut self, what: &str) -> Result<&'a str> {
        self.next_line()
            .ok_or_else(|| ComposerError::format(self.line_number + 1, format!("missing {}", what)))
    }

    fn expect_blank(&mut self) -> Result<()> {
        match self.expect_line("blank line")? {
            "" => Ok(()),
            _ => Err(self.error("expected a blank line")),
        }
    }

    /// Error attributed to the last consumed line
    fn error(&self, message: impl Into<String>) -> ComposerError {
        ComposerError::format(self.line_number.max(1), message)
    }

    /// Error attributed to the line about to be read
    fn error_at_next(&self, message: impl Into<String>) -> ComposerError {
        ComposerError::format(self.line_number + 1, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MAX_BEATS;

    fn sample_song() -> Song {
        let mut song = Song::new();
        song.set_tempo(120).unwrap();

        let mut melody = Layer::new("Melody", 80, LayerColor::Pink, false).unwrap();
        melody.add_unit(Unit::note(4, 5, 0, Pitch::Eb, 4).unwrap()).unwrap();
        melody.add_unit(Unit::note(0, 3, 0, Pitch::C, 4).unwrap()).unwrap();
        song.add_layer(melody);

        let mut drums = Layer::new("Drums", 100, LayerColor::Cyan, true).unwrap();
        drums.add_unit(Unit::drum(0, 0, 35).unwrap()).unwrap();
        song.add_layer(drums);

        song
    }

    #[test]
    fn test_write_format() {
        let expected = "tempo 120\n\
                        \n\
                        layer Pink 80 Melody\n\
                        *layer Cyan 100 Drums\n\
                        --------------------------\n\
                        \n\
                        Melody\n\
                        \n\
                        note 0 3 0 C 4\n\
                        \n\
                        note 4 5 0 Eb 4\n\
                        --------------------------\n\
                        \n\
                        Drums\n\
                        \n\
                        drum 0 0 35\n";

        assert_eq!(to_project_text(&sample_song()), expected);
    }

    #[test]
    fn test_write_empty_song() {
        assert_eq!(to_project_text(&Song::new()), "tempo 60\n\n");
    }

    #[test]
    fn test_write_empty_layer() {
        let mut song = Song::new();
        song.add_layer(Layer::new("Blank", 10, LayerColor::Red, false).unwrap());
        assert_eq!(
            to_project_text(&song),
            "tempo 60\n\nlayer Red 10 Blank\n--------------------------\n\nBlank\n\n"
        );
    }

    #[test]
    fn test_round_trip() {
        let song = sample_song();
        let parsed = parse_project_text(&to_project_text(&song)).unwrap();
        assert_eq!(parsed, song);
    }

    #[test]
    fn test_round_trip_empty_layers_and_spaces_in_names() {
        let mut song = Song::new();
        song.add_layer(Layer::new("First Layer", 0, LayerColor::Violet, true).unwrap());
        let mut second = Layer::new("second  layer ", 55, LayerColor::Yellow, false).unwrap();
        second.add_unit(Unit::note(10, 10, 127, Pitch::Gb, -1).unwrap()).unwrap();
        song.add_layer(second);
        song.add_layer(Layer::new("Third", 100, LayerColor::Green, false).unwrap());

        let parsed = parse_project_text(&to_project_text(&song)).unwrap();
        assert_eq!(parsed, song);
    }

    #[test]
    fn test_parse_empty_song() {
        let song = parse_project_text("tempo 90\n\n").unwrap();
        assert_eq!(song.tempo(), 90);
        assert!(song.layers().is_empty());
    }

    #[test]
    fn test_parse_crlf() {
        let text = to_project_text(&sample_song()).replace('\n', "\r\n");
        assert_eq!(parse_project_text(&text).unwrap(), sample_song());
    }

    #[test]
    fn test_rejects_bad_tempo() {
        assert!(matches!(
            parse_project_text("tempo 5\n\n"),
            Err(ComposerError::Format { line: 1, .. })
        ));
        assert!(parse_project_text("tempo  60\n\n").is_err());
        assert!(parse_project_text("bpm 60\n\n").is_err());
        assert!(parse_project_text("tempo +60\n\n").is_err());
        assert!(parse_project_text("").is_err());
    }

    #[test]
    fn test_rejects_missing_blank_after_tempo() {
        assert!(parse_project_text("tempo 60\nlayer Pink 80 A\n").is_err());
    }

    #[test]
    fn test_rejects_unknown_color() {
        let text = "tempo 60\n\nlayer Blue 80 A\n--------------------------\n\nA\n\n";
        let err = parse_project_text(text).unwrap_err();
        assert!(matches!(err, ComposerError::Format { line: 3, .. }));
    }

    #[test]
    fn test_rejects_mismatched_section_name() {
        let text = "tempo 60\n\nlayer Pink 80 A\n--------------------------\n\nB\n\n";
        assert!(matches!(
            parse_project_text(text),
            Err(ComposerError::Format { line: 6, .. })
        ));
    }

    #[test]
    fn test_rejects_missing_section() {
        let text = "tempo 60\n\nlayer Pink 80 A\nlayer Red 80 B\n--------------------------\n\nA\n\n";
        assert!(parse_project_text(text).is_err());
    }

    #[test]
    fn test_rejects_extra_section() {
        let mut text = to_project_text(&sample_song());
        text.push_str("--------------------------\n\nGhost\n\n");
        assert!(parse_project_text(&text).is_err());
    }

    #[test]
    fn test_rejects_overlapping_units() {
        let text = "tempo 60\n\nlayer Pink 80 A\n--------------------------\n\nA\n\n\
                    drum 0 3 40\n\ndrum 3 4 40\n";
        assert!(matches!(
            parse_project_text(text),
            Err(ComposerError::Format { line: 10, .. })
        ));
    }

    #[test]
    fn test_rejects_malformed_units() {
        let base = "tempo 60\n\nlayer Pink 80 A\n--------------------------\n\nA\n\n";
        for unit in [
            "note 0 1 0 C",
            "note 0 1 0 H 4",
            "note 0 1 0 C 9",
            "drum 0 1 20",
            "drum 0 1 40 extra",
            "drum  0 1 40",
            "drum 2 1 40",
            "drum -1 1 40",
            "cymbal 0 1 40",
        ] {
            let text = format!("{}{}\n", base, unit);
            assert!(parse_project_text(&text).is_err(), "{}", unit);
        }
    }

    #[test]
    fn test_rejects_missing_blank_between_units() {
        let text = "tempo 60\n\nlayer Pink 80 A\n--------------------------\n\nA\n\n\
                    drum 0 0 40\ndrum 2 2 40\n";
        assert!(parse_project_text(text).is_err());
    }

    #[test]
    fn test_rejects_missing_blank_in_empty_section() {
        let text = "tempo 60\n\nlayer Pink 80 A\nlayer Red 80 B\n\
                    --------------------------\n\nA\n--------------------------\n\nB";
        assert!(matches!(
            parse_project_text(text),
            Err(ComposerError::Format { line: 8, .. })
        ));

        let last = "tempo 60\n\nlayer Pink 80 A\n--------------------------\n\nA";
        assert!(parse_project_text(last).is_err());
        assert!(parse_project_text(&format!("{}\n\n", last)).is_ok());
    }

    #[test]
    fn test_rejects_blank_line_closing_a_section() {
        let text = "tempo 60\n\nlayer Pink 80 A\n--------------------------\n\nA\n\n\
                    drum 0 0 40\n\n";
        assert!(parse_project_text(text).is_err());
    }

    #[test]
    fn test_rejects_beats_past_limit() {
        let base = "tempo 60\n\nlayer Pink 80 A\n--------------------------\n\nA\n\n";
        let at_limit = format!("{}drum 0 {} 40\n", base, MAX_BEATS);
        assert_eq!(parse_project_text(&at_limit).unwrap().final_beat(), MAX_BEATS);

        let huge = format!("{}drum 0 2147483647 40\n", base);
        assert!(matches!(
            parse_project_text(&huge),
            Err(ComposerError::Format { line: 8, .. })
        ));
    }

    #[test]
    fn test_rejects_trailing_blank_lines() {
        let mut text = to_project_text(&sample_song());
        text.push_str("\n\n");
        assert!(parse_project_text(&text).is_err());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("song.mycomposer");

        save_project(&sample_song(), &path).unwrap();
        assert_eq!(load_project(&path).unwrap(), sample_song());
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_project(dir.path().join("missing.mycomposer"));
        assert!(matches!(result, Err(ComposerError::Io(_))));
    }
}
