//! dIGIT WorLd headless runner
//!
//! Loads a stage, plays it with the seeded idle driver at the fixed
//! timestep and prints what happened. Sound goes to a logging sink.

use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::Parser;

use digit_world::audio::{LoggingAudio, dispatch};
use digit_world::consts::{FPS, SIM_DT};
use digit_world::sim::{GameSession, IdleDriver, SessionPhase, StageData, StageId, tick};
use digit_world::{Progress, Settings, StageProgress};

#[derive(Parser, Debug)]
#[command(name = "digit-world")]
#[command(about = "Run a dIGIT WorLd stage headlessly with a seeded idle player")]
struct Args {
    /// Stage file, e.g. stages/stage1-1.json
    stage: PathBuf,

    /// Seconds of play to simulate
    #[arg(short, long, default_value = "30")]
    seconds: f32,

    /// Seed for the idle input driver
    #[arg(long, default_value = "1")]
    seed: u64,

    /// Settings file (display size, volumes)
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Override display width
    #[arg(long)]
    width: Option<f32>,

    /// Override display height
    #[arg(long)]
    height: Option<f32>,

    /// World number to record a clear under (default: from the file name)
    #[arg(long, requires = "stage_num")]
    world: Option<u32>,

    /// Stage number within the world
    #[arg(long, requires = "world")]
    stage_num: Option<u32>,

    /// Progress file (defaults to ~/.digitworld/progress.json)
    #[arg(long)]
    progress: Option<PathBuf>,

    /// Keep progress in memory only
    #[arg(long)]
    no_save: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let settings = args
        .settings
        .as_deref()
        .map(Settings::load_or_default)
        .unwrap_or_default();
    let mut display = settings.display;
    if let Some(w) = args.width {
        display.width = w;
    }
    if let Some(h) = args.height {
        display.height = h;
    }

    let data = StageData::load_or_default(&args.stage);
    if data.digits.is_empty() {
        bail!("stage {} has no digits", args.stage.display());
    }
    let stage_id = match (args.world, args.stage_num) {
        (Some(world), Some(stage)) => Some(StageId::new(world, stage)),
        _ => StageId::from_path(&args.stage),
    };

    let mut progress = match (args.no_save, args.progress.or_else(Progress::default_path)) {
        (false, Some(path)) => Progress::open(path),
        _ => Progress::in_memory(),
    };
    if let Some(id) = stage_id
        && !progress.is_stage_unlocked(id.world, id.stage)
    {
        log::warn!("Stage {id} is locked; playing it anyway");
    }

    let mut audio = LoggingAudio::default();
    settings.apply(&mut audio);

    log::info!(
        "dIGIT WorLd starting: {} at {}x{}, seed {}",
        args.stage.display(),
        display.width,
        display.height,
        args.seed
    );

    let mut session = GameSession::new(display, data.blueprint(&display), stage_id);
    let mut driver = IdleDriver::new(args.seed);
    let frames = (args.seconds.max(0.0) * FPS as f32).round() as u64;

    let mut played = 0;
    for _ in 0..frames {
        let input = driver.next_input(&session);
        tick(&mut session, &input, SIM_DT, &mut progress);
        dispatch(&mut audio, &session.drain_events());
        played += 1;
        if session.phase == SessionPhase::Exited {
            break;
        }
    }

    let manager = &session.manager;
    println!("=== dIGIT WorLd ===");
    println!("Stage:      {}", args.stage.display());
    println!("Simulated:  {:.2}s ({played} frames)", session.clock);
    println!(
        "Keys:       {}/{} consecutive, {} collected total",
        manager.consecutive_keys(),
        manager.target_keys(),
        session.player.key_count
    );
    println!(
        "Sequence:   {}/{} (loop {})",
        manager.current_sequence_index(),
        manager.total_sequences(),
        manager.current_loop()
    );
    println!("Restarts:   {}", session.deaths);
    println!(
        "Cleared:    {}",
        if manager.is_stage_clear() { "yes" } else { "no" }
    );
    for (name, count) in audio.tally() {
        println!("  sound {name:<12} x{count}");
    }

    Ok(())
}
