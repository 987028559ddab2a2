/**
 * Replay a captured Dabble byte stream through the pipeline.
 *
 * Capture format, one chunk per line:
 *     <time ms> <hex byte> <hex byte> ...
 * Blank lines and lines starting with '#' are skipped.
 *
 * Usage: cargo run --example replay_capture -- capture.txt
 */

use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Arc;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use dabble_link::actuator::{PinId, RecordingSink};
use dabble_link::clock::ManualClock;
use dabble_link::gamepad::{BUTTONS, DIRECTIONS};
use dabble_link::indicators::{bind_indicators, DEFAULT_BINDINGS};
use dabble_link::link::LinkPipeline;
use dabble_link::protocol::standard_table;
use dabble_link::ramp::{ServoController, ServoOptions};
use dabble_link::steering::{Steering, SteeringOptions};

#[derive(Parser, Debug)]
#[command(name = "replay_capture")]
struct Args{
    capture: PathBuf,

    /// Print every gamepad event, not only "-on"
    #[arg(long)]
    all_events: bool,
}

fn parse_line(line: &str) -> Option<(u64, Vec<u8>)>{
    let mut fields = line.split_whitespace();
    let at = fields.next()?.parse().ok()?;
    let bytes = fields
        .map(|f| u8::from_str_radix(f.trim_start_matches("0x"), 16).ok())
        .collect::<Option<Vec<u8>>>()?;
    Some((at, bytes))
}

fn main() -> Result<(), Box<dyn std::error::Error>>{
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let text = std::fs::read_to_string(&args.capture)?;

    let clock = ManualClock::new(0);
    let sink = RecordingSink::new();
    let mut pipeline = LinkPipeline::new(Arc::new(standard_table()), clock.clone());

    let servo = Rc::new(RefCell::new(ServoController::new(
        PinId(8),
        sink.clone(),
        clock.clone(),
        ServoOptions{ range: 2.0, initial_position: Some(0.5) },
    )));
    let steering = Steering::new(Rc::clone(&servo), SteeringOptions::default());
    steering.attach(pipeline.bus());
    bind_indicators(pipeline.bus(), Rc::new(RefCell::new(sink.clone())), &DEFAULT_BINDINGS);

    let controls = BUTTONS.iter().chain(DIRECTIONS.iter()).map(|&(_, name)| name);
    for name in controls{
        let suffixes: &[&str] = if args.all_events { &["on", "off"] } else { &["on"] };
        for suffix in suffixes{
            pipeline.bus().subscribe(&format!("gamepad-{}-{}", name, suffix), |_, event|{
                println!("  {}", event);
            });
        }
    }

    for (lineno, line) in text.lines().enumerate(){
        let line = line.trim();
        if line.is_empty() || line.starts_with('#'){
            continue;
        }
        let Some((at, bytes)) = parse_line(line) else{
            eprintln!("line {}: could not parse {:?}", lineno + 1, line);
            continue;
        };

        clock.set(at);
        ServoController::poll_shared(&servo);
        let done = pipeline.feed_all(&bytes);
        println!("[{:>6} ms] {} bytes, {} commands, steering {:?}", at, bytes.len(), done, steering.state());
    }

    let frames = pipeline.frame_stats();
    let dispatch = pipeline.dispatch_stats();
    println!();
    println!("ready={} stale={} unknown={} overrun={} dropped={}",
        frames.ready, frames.stale, frames.unknown, frames.overrun, frames.dropped);
    println!("handled={} unhandled={} faulted={}", dispatch.handled, dispatch.unhandled, dispatch.faulted);
    println!("servo position={:?}, {} actuator writes", servo.borrow().position(), sink.len());
    Ok(())
}
