//! Headless run: fixed-step ticks with scripted input, an event log and an
//! optional JSON dump of sampled frames

use anyhow::{Context, Result};
use flurry_core::Mode;
use flurry_particles::{emit, RecordingSink, ShapeBatches, SinkRecord, SleighPose};
use flurry_runtime::{Choreographer, ChoreographyConfig, GameClock, GameEvent};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

pub struct SimulateArgs {
    pub config: Option<PathBuf>,
    pub seconds: f32,
    pub fps: u32,
    pub particles: Option<usize>,
    pub seed: Option<u64>,
    pub mode: Option<Mode>,
    pub taps: Vec<f32>,
    pub upload: Option<PathBuf>,
    pub upload_at: f32,
    pub dump: Option<PathBuf>,
    pub every: u64,
    pub stride: usize,
}

#[derive(Serialize)]
struct FrameDump {
    frame: u64,
    time: f32,
    mode: Mode,
    explosion: bool,
    wish: Option<String>,
    sleigh: Option<SleighPose>,
    particles: Vec<SinkRecord>,
}

#[derive(Serialize)]
struct RunDump {
    config: ChoreographyConfig,
    events: Vec<GameEvent>,
    frames: Vec<FrameDump>,
}

/// Scripted inputs, fired when the clock passes their time
enum Cue {
    Tap,
    Upload(Vec<u8>),
}

pub fn run(args: SimulateArgs) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => ChoreographyConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => ChoreographyConfig::default(),
    };
    if let Some(count) = args.particles {
        config.particles.count = count;
    }
    if args.seed.is_some() {
        config.particles.seed = args.seed;
    }

    let mut cues: Vec<(f32, Cue)> = args.taps.iter().map(|&t| (t, Cue::Tap)).collect();
    if let Some(path) = &args.upload {
        let bytes = std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
        cues.push((args.upload_at, Cue::Upload(bytes)));
    }
    cues.sort_by(|a, b| a.0.total_cmp(&b.0));
    let mut cues = cues.into_iter().peekable();

    let mut choreo = Choreographer::new(config.clone()).context("Failed to start choreographer")?;
    choreo.wait_for_targets(Duration::from_secs(30));
    if let Some(mode) = args.mode {
        choreo.set_mode(mode, 0.0);
    }
    println!("Simulating {:.1}s at {} fps, {} particles", args.seconds, args.fps, choreo.field().len());

    let fps = args.fps.max(1);
    let dt = 1.0 / fps as f64;
    let total_frames = (args.seconds.max(0.0) as f64 * fps as f64).ceil() as u64;
    let every = args.every.max(1);

    let mut clock = GameClock::new();
    let mut batches = ShapeBatches::new();
    let mut events = Vec::new();
    let mut frames = Vec::new();

    for _ in 0..total_frames {
        clock.advance(dt);
        let (elapsed, delta) = clock.frame_times();

        while let Some((_, cue)) = cues.next_if(|(at, _)| *at <= elapsed) {
            match cue {
                Cue::Tap => choreo.tap(elapsed),
                Cue::Upload(bytes) => {
                    if let Err(e) = choreo.upload_image(&bytes, elapsed) {
                        log::warn!("[simulate] upload failed: {e}");
                    }
                }
            }
        }

        choreo.tick(elapsed, delta);
        batches.pack(choreo.field().instances());

        for event in choreo.drain_events() {
            print_event(&event);
            events.push(event);
        }

        if args.dump.is_some() && clock.frame % every == 0 {
            let mut sink = RecordingSink::with_stride(args.stride);
            emit(choreo.field(), &mut sink);
            frames.push(FrameDump {
                frame: clock.frame,
                time: elapsed,
                mode: choreo.mode(),
                explosion: choreo.explosion_active(),
                wish: choreo.wish_text().map(str::to_string),
                sleigh: choreo.sleigh_pose(),
                particles: sink.records,
            });
        }
    }

    println!(
        "Finished at {:.2}s in {} mode ({} frames, {} instances packed)",
        choreo.now(),
        choreo.mode(),
        clock.frame,
        batches.total()
    );

    if let Some(path) = &args.dump {
        let dump = RunDump {
            config,
            events,
            frames,
        };
        let json = serde_json::to_string(&dump).context("Failed to serialize frame dump")?;
        std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
        println!("Wrote {} frames to {}", dump.frames.len(), path.display());
    }
    Ok(())
}

fn print_event(event: &GameEvent) {
    match event {
        GameEvent::ModeChanged { from, to, cause, at } => {
            println!("[{:>7.2}s] {} -> {} ({:?})", at, from, to, cause)
        }
        GameEvent::ReachedTop { at } => println!("[{:>7.2}s] sleigh reached the treetop", at),
        GameEvent::ExplosionStarted { at } => println!("[{:>7.2}s] explosion", at),
        GameEvent::ExplosionEnded { at } => println!("[{:>7.2}s] explosion signal ended", at),
        GameEvent::TargetsPublished { mode } => log::debug!("[simulate] targets ready: {}", mode),
        GameEvent::UploadRejected { reason } => println!("upload rejected: {}", reason),
    }
}
