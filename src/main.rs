// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

use anyhow::{anyhow, Context, Result};
use beatline::codec::{load_project, MidiSequence};
use beatline::config::Settings;
use beatline::model::instrument::{melodic_name, percussion_name};
use beatline::Session;
use std::env;
use std::path::{Path, PathBuf};
use tracing::{debug, Level};

fn print_usage() {
    println!("Beatline - Beat-indexed multi-track composer");
    println!();
    println!("Usage: beatline [--config <FILE>] [--verbose] <COMMAND>");
    println!();
    println!("Commands:");
    println!("  --info <PROJECT>               Print layers and units of a project");
    println!("  --check <PROJECT>              Validate a project file");
    println!("  --export-midi <PROJECT> [OUT]  Export a project as a MIDI file");
    println!("  --new <PROJECT> [BPM]          Create an empty project");
    println!("  --help                         Show this help message");
}

fn print_info(path: &Path) -> Result<()> {
    let song = load_project(path)?;

    println!("{}", path.display());
    println!("Tempo: {} BPM", song.tempo());
    println!("Length: {} beats", song.final_beat());
    println!();

    for (index, layer) in song.layers().iter().enumerate() {
        let mute = if layer.is_muted() { " (muted)" } else { "" };
        println!(
            "[{}] {}{} - {} {}, volume {}",
            index,
            layer.name(),
            mute,
            layer.color(),
            layer.color().hex_code(),
            layer.volume()
        );

        for unit in layer.units() {
            match unit.pitch_format() {
                Some(pitch) => println!(
                    "    {:>5}-{:<5} {:<6} {}",
                    unit.start_beat(),
                    unit.end_beat(),
                    pitch,
                    melodic_name(unit.instrument()).unwrap_or("?")
                ),
                None => println!(
                    "    {:>5}-{:<5} {:<6} {}",
                    unit.start_beat(),
                    unit.end_beat(),
                    "drum",
                    percussion_name(unit.instrument()).unwrap_or("?")
                ),
            }
        }
    }
    Ok(())
}

fn check_project(path: &Path) -> Result<()> {
    let song = load_project(path)?;
    let units: usize = song.layers().iter().map(|layer| layer.unit_count()).sum();
    println!(
        "OK: {} layers, {} units, {} beats",
        song.layer_count(),
        units,
        song.final_beat()
    );
    Ok(())
}

fn export_midi(settings: Settings, project: &Path, out: Option<&str>) -> Result<()> {
    let out = match out {
        Some(out) => settings.files.midi_path(out),
        None => project.with_extension(&settings.files.midi_extension),
    };

    let session = Session::open_file(settings, project)?;
    if session.export_midi(&out)? {
        let tracks = MidiSequence::from_song(session.song()).tracks().len();
        println!("Wrote {} ({} tracks)", out.display(), tracks);
    } else {
        println!("Nothing to export: {} is empty", project.display());
    }
    Ok(())
}

fn new_project(settings: Settings, project: &str, bpm: Option<&str>) -> Result<()> {
    let path = settings.files.project_path(project);
    let mut session = Session::new(settings);

    if let Some(bpm) = bpm {
        let bpm: u16 = bpm
            .parse()
            .map_err(|_| anyhow!("Invalid tempo: {}", bpm))?;
        session.set_tempo(bpm)?;
    }

    session.save_as(&path)?;
    debug!(tempo = session.song().tempo(), "new project");
    println!("Created {}", path.display());
    Ok(())
}

fn main() -> Result<()> {
    let mut args: Vec<String> = env::args().skip(1).collect();

    let mut config: Option<PathBuf> = None;
    let mut level = Level::INFO;
    loop {
        match args.first().map(String::as_str) {
            Some("--config") => {
                if args.len() < 2 {
                    eprintln!("Error: --config requires a file");
                    std::process::exit(1);
                }
                config = Some(PathBuf::from(args.remove(1)));
                args.remove(0);
            }
            Some("--verbose") => {
                level = Level::DEBUG;
                args.remove(0);
            }
            _ => break,
        }
    }

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .init();

    let settings = Settings::load_or_default(config.as_deref())
        .context("Failed to load settings")?;

    let Some(command) = args.first() else {
        println!("Beatline - Beat-indexed multi-track composer");
        println!("Run with --help for usage information");
        return Ok(());
    };

    match command.as_str() {
        "--info" | "--check" => {
            if args.len() < 2 {
                eprintln!("Error: {} requires a project file", command);
                std::process::exit(1);
            }
            let path = Path::new(&args[1]);
            if command == "--info" {
                print_info(path)?;
            } else {
                check_project(path)?;
            }
        }
        "--export-midi" => {
            if args.len() < 2 {
                eprintln!("Error: --export-midi requires a project file");
                std::process::exit(1);
            }
            export_midi(settings, Path::new(&args[1]), args.get(2).map(String::as_str))?;
        }
        "--new" => {
            if args.len() < 2 {
                eprintln!("Error: --new requires a project file");
                std::process::exit(1);
            }
            new_project(settings, &args[1], args.get(2).map(String::as_str))?;
        }
        "--help" | "-h" => {
            print_usage();
        }
        other => {
            eprintln!("Unknown option: {}", other);
            print_usage();
            std::process::exit(1);
        }
    }

    Ok(())
}
