//! Strider CLI - write a controller config and drive the character headlessly

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;
use tracing::{info, warn};

use strider::config::ControllerConfig;
use strider::game::{Action, CharacterState, GameInstance, KeyEvent, TickReport};

const DEFAULT_CONFIG_FILE: &str = "strider.toml";

#[derive(Parser)]
#[command(name = "strider")]
#[command(about = "Third-person character controller driver", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default controller config
    Init {
        /// Target file or directory (default: ./strider.toml)
        path: Option<PathBuf>,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Run the controller against a scripted input sequence
    Run {
        /// Controller config (default: built-in defaults)
        #[arg(short, long, env = "STRIDER_CONFIG")]
        config: Option<PathBuf>,
        /// Input script with [[segment]] entries (default: built-in demo)
        #[arg(short, long)]
        script: Option<PathBuf>,
        /// Stop after this many ticks even if the script is longer
        #[arg(short, long)]
        ticks: Option<u64>,
        /// Print one JSON tick report per line
        #[arg(long)]
        json: bool,
        /// Sleep between ticks to run at the configured tick rate
        #[arg(long)]
        realtime: bool,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Init { path, force } => init_config(path, force),
        Commands::Run {
            config,
            script,
            ticks,
            json,
            realtime,
        } => run_controller(config, script, ticks, json, realtime),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

// =============================================================================
// Init
// =============================================================================

fn init_config(path: Option<PathBuf>, force: bool) -> Result<()> {
    let target = match path {
        Some(p) if p.is_dir() => p.join(DEFAULT_CONFIG_FILE),
        Some(p) => p,
        None => PathBuf::from(DEFAULT_CONFIG_FILE),
    };
    if target.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", target.display());
    }

    let body = ControllerConfig::default().to_toml_string()?;
    let content = format!(
        "# Strider controller config.\n\
         # Every key is optional; removed keys fall back to the values below.\n\
         # Angles are radians, speeds are units per second.\n\n{}",
        body
    );
    std::fs::write(&target, content)
        .with_context(|| format!("writing {}", target.display()))?;

    println!("Created {}", target.display());
    println!();
    println!("  strider run --config {}", target.display());
    Ok(())
}

// =============================================================================
// Input script
// =============================================================================

#[derive(Debug, Deserialize)]
struct InputScript {
    #[serde(rename = "segment", default)]
    segments: Vec<Segment>,
}

/// A stretch of ticks with a fixed set of held keys.
#[derive(Debug, Clone, Deserialize)]
struct Segment {
    ticks: u64,
    #[serde(default)]
    keys: Vec<String>,
    /// Manual camera drag applied every tick of the segment.
    #[serde(default)]
    orbit: Option<[f32; 2]>,
    /// Manual camera zoom applied every tick of the segment.
    #[serde(default)]
    zoom: Option<f32>,
}

impl Segment {
    fn holding(ticks: u64, keys: &[&str]) -> Self {
        Self {
            ticks,
            keys: keys.iter().map(|k| k.to_string()).collect(),
            orbit: None,
            zoom: None,
        }
    }
}

impl InputScript {
    /// Ticks across all segments, saturating on absurd script lengths.
    fn total_ticks(&self) -> u64 {
        self.segments
            .iter()
            .fold(0u64, |total, s| total.saturating_add(s.ticks))
    }
}

fn demo_script() -> InputScript {
    InputScript {
        segments: vec![
            Segment::holding(30, &[]),
            Segment::holding(60, &["w"]),
            Segment::holding(60, &["w", "a"]),
            Segment::holding(1, &["Space"]),
            Segment::holding(90, &[]),
        ],
    }
}

fn load_script(path: &Path) -> Result<InputScript> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading script {}", path.display()))?;
    let script: InputScript =
        toml::from_str(&content).with_context(|| format!("parsing script {}", path.display()))?;
    if script.segments.is_empty() {
        bail!("script {} has no [[segment]] entries", path.display());
    }
    Ok(script)
}

// =============================================================================
// Run
// =============================================================================

#[derive(Debug, Default)]
struct RunSummary {
    ticks: u64,
    jumps: u64,
    transitions: u64,
    ticks_in_state: [u64; 3],
    skipped: u64,
}

impl RunSummary {
    fn record(&mut self, report: &TickReport) {
        self.ticks += 1;
        if report.jump {
            self.jumps += 1;
        }
        if report.transition.is_some() {
            self.transitions += 1;
        }
        if !report.skipped.is_empty() {
            self.skipped += 1;
        }
        self.ticks_in_state[report.state.ordinal()] += 1;
    }
}

fn load_config(path: Option<&Path>) -> Result<ControllerConfig> {
    match path {
        Some(p) => Ok(ControllerConfig::from_file(p)?),
        None => Ok(ControllerConfig::default()),
    }
}

fn run_controller(
    config_path: Option<PathBuf>,
    script_path: Option<PathBuf>,
    max_ticks: Option<u64>,
    json: bool,
    realtime: bool,
) -> Result<()> {
    let config = load_config(config_path.as_deref())?;
    let script = match script_path.as_deref() {
        Some(p) => load_script(p)?,
        None => demo_script(),
    };

    // Reject keys nothing is bound to before running anything.
    for segment in &script.segments {
        for key in &segment.keys {
            if config.keys.action_for(key).is_none() {
                bail!(
                    "key {:?} is not bound to any action ({})",
                    key,
                    Action::ALL.map(|a| a.name()).join(", ")
                );
            }
        }
    }

    let tick_interval = Duration::from_secs_f32(config.world.timestep());
    let mut instance = GameInstance::spawn(config);
    let total = script.total_ticks();
    let limit = max_ticks.unwrap_or(total).min(total);
    info!(segments = script.segments.len(), ticks = limit, "running input script");

    let stdout = std::io::stdout();
    let mut summary = RunSummary::default();
    let mut held: BTreeSet<String> = BTreeSet::new();

    'segments: for segment in &script.segments {
        let wanted: BTreeSet<String> = segment.keys.iter().cloned().collect();
        for key in held.difference(&wanted) {
            instance.push_key(KeyEvent::Released(key.clone()));
        }
        for key in wanted.difference(&held) {
            instance.push_key(KeyEvent::Pressed(key.clone()));
        }
        held = wanted;

        for _ in 0..segment.ticks {
            if summary.ticks >= limit {
                break 'segments;
            }
            apply_manual_camera(&mut instance, segment);

            let report = instance.tick();
            summary.record(&report);
            if let Some(transition) = report.transition {
                info!(
                    tick = report.tick,
                    from = ?transition.from,
                    to = ?transition.to,
                    "transition"
                );
            }
            if json {
                serde_json::to_writer(stdout.lock(), &report)?;
                println!();
            }
            if realtime {
                thread::sleep(tick_interval);
            }
        }
    }

    print_summary(&instance, &summary);
    Ok(())
}

fn apply_manual_camera(instance: &mut GameInstance, segment: &Segment) {
    if segment.orbit.is_none() && segment.zoom.is_none() {
        return;
    }
    let Some(camera) = instance.camera.as_mut() else {
        warn!("camera adjustment requested but no camera is mounted");
        return;
    };
    if let Some([d_azimuth, d_polar]) = segment.orbit {
        camera.orbit(d_azimuth, d_polar);
    }
    if let Some(scale) = segment.zoom {
        camera.zoom(scale);
    }
}

fn print_summary(instance: &GameInstance, summary: &RunSummary) {
    eprintln!();
    eprintln!("Ran {} ticks", summary.ticks);
    eprintln!("  jumps:       {}", summary.jumps);
    eprintln!("  transitions: {}", summary.transitions);
    for state in CharacterState::ALL {
        eprintln!(
            "  {:<12} {} ticks",
            format!("{:?}:", state).to_lowercase(),
            summary.ticks_in_state[state.ordinal()]
        );
    }
    if summary.skipped > 0 {
        eprintln!("  not ready:   {} ticks", summary.skipped);
    }
    if let Some(p) = instance.character_position() {
        eprintln!("  position:    ({:.2}, {:.2}, {:.2})", p.x, p.y, p.z);
    }
    if let Some(camera) = instance.camera.as_ref() {
        let s = camera.spherical();
        eprintln!(
            "  camera:      radius {:.2}, polar {:.2}, azimuth {:.2}",
            s.radius, s.polar, s.azimuth
        );
    }
    eprintln!("  final state: {:?}", instance.state());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_ticks_saturates() {
        let script = InputScript {
            segments: vec![Segment::holding(u64::MAX, &["w"]), Segment::holding(5, &[])],
        };
        assert_eq!(script.total_ticks(), u64::MAX);
    }

    #[test]
    fn test_demo_script_length() {
        assert_eq!(demo_script().total_ticks(), 241);
    }
}
