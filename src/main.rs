/* 3rd party libraries */
use clap::{Arg, ArgMatches, Command};
use crossbeam_channel as cbc;
use log::{info, warn};
use std::io;
use std::path::Path;
use std::thread::Builder;
use std::time::Duration;

/* Custom libraries */
use liftsim::config::{self, Config};
use liftsim::console::{parse_call, ConsoleView, StdinInput};
use liftsim::shared::{AcceptanceResult, CallRequest, ElevatorResult, ViewUpdate};
use liftsim::unwrap_or_exit;
use liftsim::{Dispatcher, Runner};

const DEFAULT_CONFIG: &str = "config.toml";

/* Main */
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let matches = cli().get_matches();

    // Load the configuration
    let config = unwrap_or_exit!(load_config(&matches), "failed to load configuration");

    // View channel and console view thread
    let (view_tx, view_rx) = cbc::unbounded::<ViewUpdate>();
    let view = ConsoleView::new(view_rx, matches.is_present("json"));
    let view_thread = unwrap_or_exit!(Builder::new()
        .name("view".into())
        .spawn(move || view.run()));

    match matches.values_of("call") {
        Some(calls) => {
            let calls: Vec<&str> = calls.collect();
            let interval = unwrap_or_exit!(matches.value_of("interval").unwrap_or("0").parse::<u64>());
            run_scripted(&config, view_tx, &calls, Duration::from_millis(interval));
        }
        None => run_interactive(&config, view_tx),
    }

    // All view senders are gone once the simulation is done
    let _ = view_thread.join();
}

fn cli() -> Command<'static> {
    Command::new("liftsim")
        .about("Simulates dispatch and door control for a bank of elevator cars")
        .arg(
            Arg::new("config")
                .long("config")
                .takes_value(true)
                .value_name("PATH")
                .help("Configuration file (defaults to ./config.toml if present)"),
        )
        .arg(
            Arg::new("call")
                .long("call")
                .short('c')
                .takes_value(true)
                .multiple_occurrences(true)
                .value_name("FLOOR[:up|down]")
                .help("Run a scripted simulation on virtual time with these calls"),
        )
        .arg(
            Arg::new("interval")
                .long("interval")
                .takes_value(true)
                .value_name("MS")
                .requires("call")
                .help("Simulated time between two scripted calls"),
        )
        .arg(
            Arg::new("time-scale")
                .long("time-scale")
                .takes_value(true)
                .value_name("FACTOR")
                .help("Simulated seconds per wall-clock second in interactive mode"),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("Print view updates as JSON lines"),
        )
}

fn load_config(matches: &ArgMatches) -> ElevatorResult<Config> {
    let mut config = match matches.value_of("config") {
        Some(path) => config::load_config(path)?,
        None if Path::new(DEFAULT_CONFIG).exists() => config::load_config(DEFAULT_CONFIG)?,
        None => {
            info!("No {} found, using default configuration", DEFAULT_CONFIG);
            Config::default()
        }
    };

    if let Some(scale) = matches.value_of("time-scale") {
        config.runner.time_scale = scale.parse::<f64>().map_err(|_| {
            liftsim::ElevatorError::InvalidConfiguration(format!("time scale '{}' is not a number", scale))
        })?;
    }
    config.validate()?;
    Ok(config)
}

// Submits every call on virtual time and runs until all cars are idle
fn run_scripted(config: &Config, view_tx: cbc::Sender<ViewUpdate>, calls: &[&str], interval: Duration) {
    let mut dispatcher = unwrap_or_exit!(Dispatcher::new(config, view_tx));

    for (i, input) in calls.iter().enumerate() {
        if i > 0 {
            dispatcher.advance_by(interval);
        }
        match parse_call(input).and_then(|call| dispatcher.submit_call(call.floor, call.direction)) {
            Ok(result) => info!("Call '{}': {:?}", input, result),
            Err(e) => warn!("Call '{}' rejected: {}", input, e),
        }
    }

    let finished = dispatcher.run_until_idle();
    info!("Simulation finished at {:.1}s", finished.as_secs_f64());
}

// Reads calls from stdin and drives the simulation in wall-clock time
fn run_interactive(config: &Config, view_tx: cbc::Sender<ViewUpdate>) {
    // Initialize channels
    let (call_tx, call_rx) = cbc::unbounded::<CallRequest>();
    let (outcome_tx, outcome_rx) = cbc::unbounded::<(CallRequest, ElevatorResult<AcceptanceResult>)>();
    let (_terminate_tx, terminate_rx) = cbc::unbounded::<()>();

    // Start the runner
    let runner = unwrap_or_exit!(
        Runner::new(config, view_tx, call_rx, outcome_tx, terminate_rx),
        "failed to start runner"
    );
    let runner_thread = unwrap_or_exit!(runner.spawn());

    // Report call outcomes
    let outcome_thread = unwrap_or_exit!(Builder::new().name("outcomes".into()).spawn(move || {
        for (call, result) in outcome_rx.iter() {
            match result {
                Ok(result) => info!("Floor {} call: {:?}", call.floor, result),
                Err(e) => warn!("Floor {} call rejected: {}", call.floor, e),
            }
        }
    }));

    info!(
        "Enter calls as '<floor> [up|down]', 'quit' to stop ({} floors, {} cars)",
        config.elevator.n_floors, config.elevator.n_cars
    );
    let stdin = io::stdin();
    let input = StdinInput::new(stdin.lock(), call_tx);
    if let Err(e) = input.run() {
        warn!("Input source stopped: {}", e);
    }

    let _ = runner_thread.join();
    let _ = outcome_thread.join();
}
