// Copyright © SixtyFPS GmbH <info@slint.dev>
// SPDX-License-Identifier: MIT

use chrono::NaiveTime;
use std::io::{self, Write};
use std::time::Duration;

use crate::board::{BoardError, ThermocoupleBoard, CHANNELS, CHANNEL_COUNT};
use crate::csvlog::CsvLog;
use crate::StopFlag;

/// The readings of all channels taken in one pass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sample {
    pub time: NaiveTime,
    pub temperatures: [f32; CHANNEL_COUNT],
}

impl Sample {
    /// Time of the sample as `HH:MM:SS`.
    pub fn timestamp(&self) -> String {
        self.time.format("%H:%M:%S").to_string()
    }
}

/// Console line. Each channel reads `<n>-><value>°C` followed by two spaces, and channels
/// are separated by one more space.
impl std::fmt::Display for Sample {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (channel, value) in CHANNELS.zip(self.temperatures) {
            if channel > 1 {
                f.write_str(" ")?;
            }
            write!(f, "{channel}->{value:?}°C  ")?;
        }
        Ok(())
    }
}

/// Source of wall clock time and delays for the loop.
pub trait Clock {
    fn now(&self) -> NaiveTime;
    fn sleep(&self, duration: Duration);
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveTime {
        chrono::Local::now().time()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SamplerError {
    #[error("reading thermocouple channel {channel} failed")]
    Board {
        channel: u8,
        #[source]
        source: BoardError,
    },
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Reads all channels of a board at a fixed interval until asked to stop.
pub struct Sampler<B, C> {
    board: B,
    clock: C,
    interval: Duration,
}

impl<B: ThermocoupleBoard, C: Clock> Sampler<B, C> {
    pub fn new(board: B, clock: C, interval: Duration) -> Self {
        Self {
            board,
            clock,
            interval,
        }
    }

    #[cfg(test)]
    pub fn board_mut(&mut self) -> &mut B {
        &mut self.board
    }

    /// Reads channels 1 to 8 in order. The first failing channel aborts the pass.
    pub fn sample(&mut self) -> Result<Sample, SamplerError> {
        let time = self.clock.now();
        let mut temperatures = [0.0; CHANNEL_COUNT];
        for (channel, slot) in CHANNELS.zip(temperatures.iter_mut()) {
            *slot = self
                .board
                .read_temperature(channel)
                .map_err(|source| SamplerError::Board { channel, source })?;
        }
        Ok(Sample { time, temperatures })
    }

    /// Runs the loop and returns the number of completed iterations.
    ///
    /// `stop` is only looked at after the delay that ends each iteration, so the loop always
    /// completes at least one iteration and at most one more after a stop was requested.
    /// The log is flushed and closed once the loop stops. On error the loop returns right
    /// away and nothing is printed or logged for the failed iteration.
    pub fn run<O, L>(
        &mut self,
        out: &mut O,
        mut csv_log: Option<CsvLog<L>>,
        stop: &StopFlag,
    ) -> Result<u64, SamplerError>
    where
        O: Write,
        L: Write,
    {
        let mut iterations = 0;
        loop {
            let sample = self.sample()?;
            writeln!(out, "{sample}")?;
            writeln!(out)?;
            out.flush()?;

            if let Some(csv_log) = csv_log.as_mut() {
                csv_log.append(&sample)?;
            }
            log::trace!("Sample {iterations}: {sample:?}");

            self.clock.sleep(self.interval);
            iterations += 1;

            if stop.is_requested() {
                break;
            }
        }

        if let Some(csv_log) = csv_log {
            csv_log.finish()?;
        }
        writeln!(out)?;
        log::debug!("Stopped after {iterations} iterations");
        Ok(iterations)
    }
}

#[cfg(test)]
const FIRST: [f32; 8] = [20.1, 20.2, 20.3, 20.4, 20.5, 20.6, 20.7, 20.8];

/// Board that records every channel read and can fail on a given read.
#[cfg(test)]
#[derive(Default)]
struct ScriptedBoard {
    reads: Vec<u8>,
    fail_on_read: Option<usize>,
}

#[cfg(test)]
impl ThermocoupleBoard for ScriptedBoard {
    fn stack(&self) -> u8 {
        0
    }

    fn read_temperature(&mut self, channel: u8) -> Result<f32, BoardError> {
        if self.fail_on_read == Some(self.reads.len()) {
            return Err(BoardError::Bus("no ack".into()));
        }
        self.reads.push(channel);
        Ok(FIRST[usize::from(channel - 1)])
    }

    fn firmware_version(&mut self) -> Result<crate::board::FirmwareVersion, BoardError> {
        Ok(crate::board::FirmwareVersion::default())
    }
}

/// Fixed time of day. Raises the stop flag once `stop_after` sleeps happened.
#[cfg(test)]
struct FakeClock {
    stop: StopFlag,
    stop_after: usize,
    sleeps: std::cell::Cell<usize>,
    slept: std::cell::RefCell<Vec<Duration>>,
}

#[cfg(test)]
impl FakeClock {
    fn new(stop: &StopFlag, stop_after: usize) -> Self {
        Self {
            stop: stop.clone(),
            stop_after,
            sleeps: std::cell::Cell::new(0),
            slept: std::cell::RefCell::new(Vec::new()),
        }
    }
}

#[cfg(test)]
impl Clock for &FakeClock {
    fn now(&self) -> NaiveTime {
        NaiveTime::from_hms_opt(12, 34, 56).unwrap()
    }

    fn sleep(&self, duration: Duration) {
        self.slept.borrow_mut().push(duration);
        self.sleeps.set(self.sleeps.get() + 1);
        if self.sleeps.get() >= self.stop_after {
            self.stop.request();
        }
    }
}

#[test]
fn test_console_line_format() {
    let sample = Sample {
        time: NaiveTime::from_hms_opt(0, 0, 0).unwrap(),
        temperatures: FIRST,
    };
    assert_eq!(
        sample.to_string(),
        "1->20.1°C   2->20.2°C   3->20.3°C   4->20.4°C   \
         5->20.5°C   6->20.6°C   7->20.7°C   8->20.8°C  "
    );
    assert_eq!(sample.timestamp(), "00:00:00");
}

#[test]
fn test_reads_every_channel_once_in_order() {
    let stop = StopFlag::new();
    let clock = FakeClock::new(&stop, 3);
    let mut sampler = Sampler::new(ScriptedBoard::default(), &clock, Duration::from_secs(1));

    let iterations = sampler
        .run(&mut std::io::sink(), None::<CsvLog<Vec<u8>>>, &stop)
        .unwrap();

    assert_eq!(iterations, 3);
    let expected: Vec<u8> = (0..3).flat_map(|_| 1..=8).collect();
    assert_eq!(sampler.board_mut().reads, expected);
    assert_eq!(*clock.slept.borrow(), vec![Duration::from_secs(1); 3]);
}

#[test]
fn test_stop_requested_before_start_still_runs_one_iteration() {
    let stop = StopFlag::new();
    stop.request();
    let clock = FakeClock::new(&stop, usize::MAX);
    let mut sampler = Sampler::new(ScriptedBoard::default(), &clock, Duration::ZERO);

    let iterations = sampler
        .run(&mut std::io::sink(), None::<CsvLog<Vec<u8>>>, &stop)
        .unwrap();
    assert_eq!(iterations, 1);
}

#[test]
fn test_logs_header_and_one_row_when_stopped_before_second_iteration() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("log.csv");
    let stop = StopFlag::new();
    let clock = FakeClock::new(&stop, 1);
    let mut sampler = Sampler::new(ScriptedBoard::default(), &clock, Duration::ZERO);

    let mut console: Vec<u8> = Vec::new();
    let log = CsvLog::create(&path).unwrap();
    sampler.run(&mut console, Some(log), &stop).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines,
        vec![
            "Time, t1, t2, t3, t4, t5, t6, t7, t8",
            "12:34:56, 20.1, 20.2, 20.3, 20.4, 20.5, 20.6, 20.7, 20.8",
        ]
    );

    let console = String::from_utf8(console).unwrap();
    assert!(console.starts_with("1->20.1°C   2->20.2°C"));
    assert!(console.ends_with("8->20.8°C  \n\n\n"));
}

#[test]
fn test_board_error_aborts_the_iteration() {
    let stop = StopFlag::new();
    let clock = FakeClock::new(&stop, usize::MAX);
    let board = ScriptedBoard {
        fail_on_read: Some(2),
        ..ScriptedBoard::default()
    };
    let mut sampler = Sampler::new(board, &clock, Duration::ZERO);

    let mut console: Vec<u8> = Vec::new();
    let err = sampler
        .run(&mut console, None::<CsvLog<Vec<u8>>>, &stop)
        .unwrap_err();

    assert!(matches!(
        err,
        SamplerError::Board {
            channel: 3,
            source: BoardError::Bus(_)
        }
    ));
    assert!(console.is_empty());
    assert_eq!(sampler.board_mut().reads, vec![1, 2]);
    assert!(clock.slept.borrow().is_empty());
}

#[test]
fn test_failed_iteration_writes_no_partial_row() {
    let stop = StopFlag::new();
    let clock = FakeClock::new(&stop, usize::MAX);
    let board = ScriptedBoard {
        // Fails on channel 5 of the second iteration.
        fail_on_read: Some(12),
        ..ScriptedBoard::default()
    };
    let mut sampler = Sampler::new(board, &clock, Duration::ZERO);

    let mut logged: Vec<u8> = Vec::new();
    let log = CsvLog::new(&mut logged).unwrap();
    assert!(sampler.run(&mut std::io::sink(), Some(log), &stop).is_err());

    let text = String::from_utf8(logged).unwrap();
    assert_eq!(text.lines().count(), 2);
}

#[test]
fn test_same_readings_give_identical_rows() {
    let frames = vec![FIRST, [1.5, -2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.25]];
    let mut runs = Vec::new();
    for _ in 0..2 {
        let stop = StopFlag::new();
        let clock = FakeClock::new(&stop, 2);
        let board = crate::board::DummyBoard::from_frames(0, frames.clone());
        let mut sampler = Sampler::new(board, &clock, Duration::ZERO);
        let mut logged: Vec<u8> = Vec::new();
        let log = CsvLog::new(&mut logged).unwrap();
        sampler.run(&mut std::io::sink(), Some(log), &stop).unwrap();
        runs.push(String::from_utf8(logged).unwrap());
    }

    assert_eq!(runs[0], runs[1]);
    assert!(runs[0].ends_with("12:34:56, 1.5, -2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.25\n"));
}
