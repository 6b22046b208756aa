//! Canopy controller host entry point.
//!
//! Runs the interaction loop against a simulated actuator while a scripted
//! visitor walks across the pads and an operator pulls the safety stop.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    Adapters (outer ring)                     │
//! │                                                              │
//! │  SimulatedActuator   LogEventSink   JsonConfigStore          │
//! │  (ActuatorPort)      (EventSink)    (ConfigPort)             │
//! │                                                              │
//! │  ─────────────── Port Trait Boundary ───────────────         │
//! │                                                              │
//! │  ┌────────────────────────────────────────────────────┐      │
//! │  │        InteractionController (pure logic)          │      │
//! │  │  FSM · Pads · Safety · Actuator · Animation        │      │
//! │  └────────────────────────────────────────────────────┘      │
//! │                                                              │
//! │  EventQueue (producers → control loop)                       │
//! └──────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use tracing_subscriber::EnvFilter;

use canopy::adapters::config_store::JsonConfigStore;
use canopy::adapters::log_sink::LogEventSink;
use canopy::adapters::simulated::SimulatedActuator;
use canopy::animation::frame::Zone;
use canopy::app::commands::ControlEvent;
use canopy::app::ports::ConfigPort;
use canopy::app::service::InteractionController;
use canopy::events::EventQueue;

static EVENTS: EventQueue = EventQueue::new();

#[derive(Parser, Debug)]
#[command(name = "canopy", about = "Interaction control loop for the canopy installation")]
struct Args {
    /// JSON configuration file; defaults are used when it does not exist.
    #[arg(short, long, env = "CANOPY_CONFIG", default_value = "canopy.json")]
    config: PathBuf,

    /// Number of control ticks to run before exiting.
    #[arg(short, long, default_value_t = 400)]
    ticks: u64,

    /// Write the effective configuration back to `--config` and exit.
    #[arg(long)]
    write_config: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    info!("=== Canopy controller v{} ===", env!("CARGO_PKG_VERSION"));

    // ── Configuration ─────────────────────────────────────────
    let store = JsonConfigStore::new(&args.config);
    let config = store
        .load()
        .with_context(|| format!("loading {}", args.config.display()))?;
    if args.write_config {
        store
            .save(&config)
            .with_context(|| format!("writing {}", args.config.display()))?;
        info!("Configuration written to {}", args.config.display());
        return Ok(());
    }
    let tick = Duration::from_millis(u64::from(config.tick_interval_ms));
    let pad_count = config.pad_count;

    // ── Core ──────────────────────────────────────────────────
    let mut hw = SimulatedActuator::new();
    let mut sink = LogEventSink::new();
    let mut controller = InteractionController::new(config).context("invalid configuration")?;

    let epoch = Instant::now();
    let now_ms = || epoch.elapsed().as_millis() as u64;
    controller.start(now_ms(), &mut sink);

    // ── Producers ─────────────────────────────────────────────
    let visitor = thread::spawn(move || visitor_script(pad_count, tick));

    // ── Control loop ──────────────────────────────────────────
    for n in 0..args.ticks {
        let started = Instant::now();

        while let Some(feedback) = hw.take_feedback() {
            if EVENTS.submit_feedback(feedback).is_err() {
                warn!("Feedback dropped, queue full");
            }
        }
        if EVENTS.submit_tick().is_err() {
            warn!("Tick dropped, queue full");
        }
        EVENTS.drain_into(&mut controller, now_ms(), &mut hw, &mut sink);

        if n % 20 == 0 {
            let frame = controller.animation_frame();
            let cap = frame.strip(Zone::Cap, 0).and_then(|s| s.first()).copied();
            let stem = frame.strip(Zone::Stem, 0).and_then(|s| s.first()).copied();
            info!(
                "FRAME | step={} cap={:?} stem={:?}",
                frame.step_index, cap, stem
            );
            match serde_json::to_string(&controller.status()) {
                Ok(json) => info!("STATUS | {}", json),
                Err(e) => warn!("STATUS | serialise failed: {}", e),
            }
        }

        if let Some(rest) = tick.checked_sub(started.elapsed()) {
            thread::sleep(rest);
        }
    }

    if visitor.join().is_err() {
        warn!("Visitor script panicked");
    }
    info!("Done after {} ticks", controller.tick_count());
    Ok(())
}

/// A visitor steps on and off the pads, then an operator hits the safety
/// stop and releases it.
fn visitor_script(pad_count: u8, tick: Duration) {
    let pause = |ticks: u32| thread::sleep(tick * ticks);
    let submit = |result: Result<(), ControlEvent>| {
        if let Err(event) = result {
            warn!("Visitor event dropped: {:?}", event);
        }
    };

    pause(20);
    for pad in 0..pad_count {
        submit(EVENTS.submit_sensor_reading(pad, 85.0));
        pause(10);
        submit(EVENTS.submit_sensor_reading(pad, 3.0));
    }

    pause(40);
    submit(EVENTS.submit_interaction_request());
    pause(30);
    submit(EVENTS.submit_safety_request("E-STOP"));
    pause(10);
    submit(EVENTS.submit_sensor_reading(0, 90.0));
    submit(EVENTS.submit_interaction_request());
    pause(40);
    submit(EVENTS.submit_sensor_reading(0, 0.0));
    submit(EVENTS.submit_safety_clear());
}
