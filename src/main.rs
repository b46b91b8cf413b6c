//! clavio CLI: plays MIDI scores on in-game instruments.
//!
//! Loads a song, shows its compatibility with the chosen layout, and
//! runs an interactive hotkey loop so playback can be started from the
//! terminal while the game window has focus. Key actions go through
//! whatever [`cv_engine::KeyActuator`] backend is wired in; this
//! binary ships the logging backend, which prints each press and
//! release instead of injecting it.

use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use cv_engine::{AlwaysFocused, LoggingActuator, NullActuator};
use cv_ir::Layout;
use cv_master::{Config, PlaybackState, Player, SharpPolicy};

#[derive(Parser, Debug)]
#[command(name = "clavio", about = "Plays MIDI scores on in-game instruments")]
struct Args {
    /// MIDI file to load, or a directory to list MIDI files from.
    /// Falls back to the last song in the config.
    song: Option<PathBuf>,

    /// Instrument layout: keys22, keys15-double, keys15-triple,
    /// drums, xylophone, keys36.
    #[arg(long, value_parser = parse_layout)]
    layout: Option<Layout>,

    /// Fold out-of-range notes into range by octaves.
    #[arg(long)]
    transpose: bool,

    /// Play sharps as the natural below instead of skipping them
    /// (15-key layouts only).
    #[arg(long)]
    snap_sharps: bool,

    /// Playback speed factor, 0.25 to 1.5.
    #[arg(long)]
    speed: Option<f64>,

    /// Path to the settings file.
    #[arg(long, default_value = "clavio.json")]
    config: PathBuf,

    /// Print score details and per-layout compatibility, then exit.
    #[arg(long)]
    info: bool,

    /// Suppress per-key output from the logging backend.
    #[arg(long)]
    quiet: bool,
}

fn parse_layout(s: &str) -> Result<Layout, String> {
    match s {
        "keys22" => Ok(Layout::Keys22),
        "keys15-double" => Ok(Layout::Keys15Double),
        "keys15-triple" => Ok(Layout::Keys15Triple),
        "drums" => Ok(Layout::Drums),
        "xylophone" => Ok(Layout::Xylophone),
        "keys36" => Ok(Layout::Keys36),
        other => Err(format!("unknown layout '{other}'")),
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = Args::parse();

    let mut config = Config::load(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;
    if let Some(layout) = args.layout {
        config.layout = layout;
    }
    if args.transpose {
        config.transpose = true;
    }
    if args.snap_sharps {
        config.sharp_policy = SharpPolicy::Snap;
    }
    if let Some(speed) = args.speed {
        config.speed = speed;
    }

    let actuator: Arc<dyn cv_engine::KeyActuator> = if args.quiet {
        Arc::new(NullActuator)
    } else {
        Arc::new(LoggingActuator)
    };
    let mut player = Player::new(actuator, Arc::new(AlwaysFocused));
    player.apply_config(&config);

    let song = args
        .song
        .clone()
        .or_else(|| config.last_song.clone())
        .context("no song given and no last song in config")?;
    if song.is_dir() {
        list_songs(&song)?;
        return Ok(());
    }
    player
        .load_midi_file(&song)
        .with_context(|| format!("loading {}", song.display()))?;
    config.last_song = Some(song.clone());

    print_summary(&player, &song);
    if args.info {
        print_layout_table(&player);
        return Ok(());
    }

    interactive(&mut player)?;

    config.layout = player.layout();
    config.transpose = player.transpose();
    config.sharp_policy = player.sharp_policy();
    config.speed = player.speed();
    config
        .save(&args.config)
        .with_context(|| format!("saving {}", args.config.display()))?;
    Ok(())
}

fn list_songs(dir: &std::path::Path) -> Result<()> {
    let mut songs: Vec<PathBuf> = std::fs::read_dir(dir)
        .with_context(|| format!("reading {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("mid") || e.eq_ignore_ascii_case("midi"))
        })
        .collect();
    songs.sort();

    if songs.is_empty() {
        println!("No MIDI files in {}", dir.display());
        return Ok(());
    }
    for song in songs {
        println!("{}", song.display());
    }
    Ok(())
}

fn print_summary(player: &Player, song: &std::path::Path) {
    let Some(score) = player.score() else { return };
    println!("Song:     {}", song.display());
    println!("Notes:    {}", score.len());
    println!("Duration: {:.1}s", score.duration());
    if let Some((playable, total)) = player.compatibility() {
        println!(
            "Layout:   {} ({playable}/{total} notes playable)",
            player.layout()
        );
    }
    println!();
}

fn print_layout_table(player: &Player) {
    let Some(score) = player.score() else { return };
    println!("Compatibility by layout:");
    for layout in Layout::ALL {
        let (playable, total) = cv_keymap::compatibility(
            score.notes(),
            layout,
            layout.supports_transpose() && player.transpose(),
            player.sharp_policy(),
        );
        println!("  {layout:<24} {playable}/{total}");
    }
}

/// Hotkey loop. Space toggles playback, [ and ] nudge speed, l/t/s
/// change the mapping while stopped, Esc is the emergency stop, q
/// quits.
fn interactive(player: &mut Player) -> Result<()> {
    println!("space: play/stop   [ ]: speed   l: layout   t: transpose   s: sharps");
    println!("esc: emergency stop   q: quit");
    println!();

    terminal::enable_raw_mode()?;
    let _guard = RawModeGuard; // auto drops when out of scope

    loop {
        print_status(player)?;

        if !event::poll(Duration::from_millis(100))? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        // Raw mode disables the terminal's own Ctrl+C handling.
        let ctrl_c = key.code == KeyCode::Char('c')
            && key.modifiers.contains(KeyModifiers::CONTROL);
        if ctrl_c {
            player.stop();
            player.release_all_keys();
            break;
        }

        match key.code {
            KeyCode::Char('q') => {
                player.stop();
                break;
            }
            KeyCode::Esc => {
                player.stop();
                player.release_all_keys();
                print!("\r\n");
            }
            KeyCode::Char(' ') => {
                if player.is_playing() {
                    player.stop();
                } else {
                    player.play();
                }
                print!("\r\n");
            }
            KeyCode::Char('[') => player.set_speed(player.speed() - 0.05),
            KeyCode::Char(']') => player.set_speed(player.speed() + 0.05),
            KeyCode::Char('l') if !player.is_playing() => {
                player.set_layout(next_layout(player.layout()));
                print!("\r\n");
            }
            KeyCode::Char('t') if !player.is_playing() => {
                player.set_transpose(!player.transpose());
            }
            KeyCode::Char('s') if !player.is_playing() => {
                let next = match player.sharp_policy() {
                    SharpPolicy::Skip => SharpPolicy::Snap,
                    SharpPolicy::Snap => SharpPolicy::Skip,
                };
                player.set_sharp_policy(next);
            }
            _ => {}
        }
    }

    println!("\r");
    Ok(())
}

fn next_layout(current: Layout) -> Layout {
    let idx = Layout::ALL.iter().position(|&l| l == current).unwrap_or(0);
    Layout::ALL[(idx + 1) % Layout::ALL.len()]
}

fn print_status(player: &Player) -> Result<()> {
    let duration = player.score().map(|s| s.duration()).unwrap_or(0.0);
    let status = match player.state() {
        PlaybackState::Stopped => "stopped".to_string(),
        PlaybackState::CountingDown => {
            format!("starting in {}", player.countdown_remaining())
        }
        PlaybackState::Playing if player.suspended() => "paused (no focus)".to_string(),
        PlaybackState::Playing => {
            format!("{:5.1}s / {:.1}s", player.position(), duration)
        }
    };

    let compat = player
        .compatibility()
        .map(|(p, t)| format!("{p}/{t}"))
        .unwrap_or_default();
    print!(
        "\r{status} | {} | x{:.2} | {compat} playable   ",
        player.layout(),
        player.speed()
    );
    io::stdout().flush()?;
    Ok(())
}

struct RawModeGuard;

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}
