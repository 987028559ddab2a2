/**
 * Dabble Bridge
 *
 * Reads Dabble app commands from the Bluetooth serial module and drives:
 * 1. the steering servo from the direction pad
 * 2. the indicator LEDs from start/cross/triangle
 * 3. the drive motors (startup self-test only)
 *
 * Usage: dabble_bridge [--config link.toml] [--port /dev/ttyACM0] [--baud 9600]
 */

use std::cell::RefCell;
use std::path::PathBuf;
use std::process::ExitCode;
use std::rc::Rc;
use std::sync::Arc;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use dabble_link::actuator::{PinId, TracingSink};
use dabble_link::clock::{Clock, MonotonicClock};
use dabble_link::indicators::{bind_indicators, DEFAULT_BINDINGS};
use dabble_link::link::{stop_link, LinkPipeline, SerialLink};
use dabble_link::protocol::standard_table;
use dabble_link::ramp::{Direction, MotorController, ServoController};
use dabble_link::steering::Steering;
use dabble_link::LinkConfig;

type Sink = Rc<RefCell<TracingSink>>;

//(offset ms, forward speed % on both wheels)
const SELF_TEST: [(u64, f32); 5] = [(0, 100.0), (1000, 33.0), (2000, 25.0), (3000, 70.0), (4000, 0.0)];

#[derive(Parser, Debug)]
#[command(name = "dabble_bridge")]
#[command(about = "Dabble gamepad over serial to servo, LEDs and motors", long_about = None)]
struct Cli{
    /// TOML config file; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Serial device
    #[arg(long, env = "DABBLE_PORT")]
    port: Option<String>,

    #[arg(long)]
    baud: Option<u32>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Run the motor speed sequence after connecting
    #[arg(long)]
    self_test: bool,
}

struct SelfTest{
    started_at: u64,
    next: usize,
}

impl SelfTest{
    fn new(now: u64) -> Self{
        SelfTest{ started_at: now, next: 0 }
    }

    fn poll(&mut self, now: u64, motor: &mut MotorController<Sink, MonotonicClock>){
        while let Some(&(offset, speed)) = SELF_TEST.get(self.next){
            if now.saturating_sub(self.started_at) < offset{
                break;
            }
            tracing::info!(speed, "self-test step");
            motor.set_speed(speed, Direction::Forward);
            self.next += 1;
        }
    }

    fn done(&self) -> bool{
        self.next >= SELF_TEST.len()
    }
}

fn load_config(cli: &Cli) -> dabble_link::Result<LinkConfig>{
    let mut config = match &cli.config{
        Some(path) => LinkConfig::load(path)?,
        None => LinkConfig::default(),
    };
    if let Some(port) = &cli.port{
        config = config.with_port(port);
    }
    if let Some(baud) = cli.baud{
        config = config.with_baud(baud);
    }
    Ok(config)
}

fn run(cli: Cli) -> dabble_link::Result<()>{
    let config = load_config(&cli)?;
    let clock = MonotonicClock::new();
    let sink: Sink = Rc::new(RefCell::new(TracingSink));

    let mut pipeline = LinkPipeline::new(Arc::new(standard_table()), clock)
        .with_staleness(config.staleness_ms);

    let servo = Rc::new(RefCell::new(ServoController::new(
        PinId(config.servo.pin),
        Rc::clone(&sink),
        clock,
        config.servo.options(),
    )));
    //center on startup
    servo.borrow_mut().move_default(0.5);

    let steering = Steering::new(Rc::clone(&servo), config.servo.steering());
    steering.attach(pipeline.bus());

    if config.indicators{
        let subscriptions = bind_indicators(pipeline.bus(), Rc::clone(&sink), &DEFAULT_BINDINGS);
        tracing::debug!(count = subscriptions.len(), "indicator listeners bound");
    }

    let (left, right) = config.motor.wheels();
    let mut motor = MotorController::new(left, right, Rc::clone(&sink), clock);
    let mut self_test = cli.self_test.then(|| SelfTest::new(clock.now_ms()));

    let mut link = SerialLink::open(&config)?;
    let running = link.running_flag();
    let result = ctrlc::set_handler(move ||{
        tracing::info!("interrupt received, stopping");
        stop_link(&running);
    });
    if let Err(e) = result{
        tracing::warn!(error = %e, "could not install Ctrl+C handler");
    }

    tracing::info!(port = %config.port, baud = config.baud_rate, "bridge running, Ctrl+C to stop");

    link.run(&mut pipeline, |_|{
        ServoController::poll_shared(&servo);
        motor.poll();
        if let Some(test) = self_test.as_mut(){
            test.poll(clock.now_ms(), &mut motor);
            if test.done(){
                self_test = None;
            }
        }
    })?;

    let frames = pipeline.frame_stats();
    let dispatch = pipeline.dispatch_stats();
    tracing::info!(
        ready = frames.ready,
        stale = frames.stale,
        unknown = frames.unknown,
        faulted = dispatch.faulted,
        "link closed"
    );

    steering.detach(pipeline.bus());
    motor.halt();
    Ok(())
}

fn main() -> ExitCode{
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .init();

    match run(cli){
        Ok(()) => ExitCode::SUCCESS,
        Err(e) =>{
            tracing::error!(error = %e, "bridge failed");
            ExitCode::FAILURE
        }
    }
}
