use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use smtc_logger_common::board::{BoardPointer, DummyBoard, ThermocoupleBoard};
use smtc_logger_common::config::Config;
use smtc_logger_common::csvlog::{self, CsvLog};
use smtc_logger_common::keylistener::spawn_key_listener;
use smtc_logger_common::sampler::{Sampler, SystemClock};
use smtc_logger_common::StopFlag;

/// Read all thermocouple temperatures of the board in a loop, hit ENTER to exit.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// CSV file to log the readings into. Readings are only printed when omitted.
    output: Option<PathBuf>,
}

/// Our App struct that owns the board, the optional CSV log and the stop flag.
///
/// Everything that can fail before sampling starts happens in `new`, so a missing board or an
/// unwritable log file ends the program before the first reading.
struct App {
    sampler: Sampler<BoardPointer, SystemClock>,
    log: Option<CsvLog<BufWriter<File>>>,
    stop: StopFlag,
}

impl App {
    fn new(args: Args, config: Config) -> anyhow::Result<Self> {
        let mut board = open_board(&config)?;
        match board.firmware_version() {
            Ok(version) => log::info!(
                "Thermocouple card {} firmware version {version}",
                board.stack()
            ),
            Err(e) => log::warn!("Could not read firmware version: {e}"),
        }

        let output = args.output.as_deref();
        let log = csvlog::open_output(output).with_context(|| {
            let path = output.map(|path| path.display().to_string()).unwrap_or_default();
            format!("Could not open {path} for writing")
        })?;

        Ok(Self {
            sampler: Sampler::new(board, SystemClock, config.sample_interval),
            log,
            stop: StopFlag::new(),
        })
    }

    /// Run the sampling loop until Enter is pressed.
    fn run(mut self) -> anyhow::Result<()> {
        println!("Read all thermocouples temperature in a loop, hit ENTER to exit");

        // The listener is never joined, it dies with the process.
        spawn_key_listener(std::io::BufReader::new(std::io::stdin()), self.stop.clone())
            .context("Could not start the key listener")?;

        let mut stdout = std::io::stdout();
        let iterations = self.sampler.run(&mut stdout, self.log, &self.stop)?;
        log::info!("Done after {iterations} samples");
        Ok(())
    }
}

fn open_board(config: &Config) -> anyhow::Result<BoardPointer> {
    if config.dummy {
        return open_dummy_board();
    }
    open_bus_board(config)
}

fn open_dummy_board() -> anyhow::Result<BoardPointer> {
    log::info!("Using the dummy thermocouple board");
    let board = DummyBoard::new().context("Could not load the dummy board data")?;
    Ok(Box::new(board))
}

#[cfg(target_os = "linux")]
fn open_bus_board(config: &Config) -> anyhow::Result<BoardPointer> {
    use smtc_logger_common::board::SequentBoard;

    let board = SequentBoard::open(&config.i2c_bus, config.stack)
        .with_context(|| format!("Could not open {}", config.i2c_bus.display()))?;
    Ok(Box::new(board))
}

#[cfg(not(target_os = "linux"))]
fn open_bus_board(_config: &Config) -> anyhow::Result<BoardPointer> {
    log::warn!("No I2C bus support on this platform");
    open_dummy_board()
}

/// A minimal main function that initializes the App and runs it.
fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = Args::parse();
    let config = Config::from_env()?;

    App::new(args, config)?.run()
}
