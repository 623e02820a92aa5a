// Copyright © SixtyFPS GmbH <info@slint.dev>
// SPDX-License-Identifier: MIT

use serde::Deserialize;
use std::ops::RangeInclusive;

/// Number of thermocouple inputs on one board.
pub const CHANNEL_COUNT: usize = 8;

/// Valid channel numbers, as printed on the board.
pub const CHANNELS: RangeInclusive<u8> = 1..=8;

/// Valid stack levels. Level 0 is the base board.
pub const STACK_LEVELS: RangeInclusive<u8> = 0..=7;

/// Error of the underlying bus implementation.
pub type BusError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    #[error("invalid stack level {0}, expected [0..7]")]
    InvalidStack(u8),
    #[error("thermocouple channel number {0} out of range, expected [1..8]")]
    InvalidChannel(u8),
    #[error("thermocouple card id {stack} not detected")]
    NotDetected {
        stack: u8,
        #[source]
        source: BusError,
    },
    #[error("bus communication failed")]
    Bus(#[source] BusError),
}

/// Firmware revision reported by the board.
#[derive(Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FirmwareVersion {
    pub major: u8,
    pub minor: u8,
}

impl std::fmt::Display for FirmwareVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{:02}", self.major, self.minor)
    }
}

pub type BoardPointer = Box<dyn ThermocoupleBoard + Send>;

/// The board trait the sampling loop reads temperatures through.
pub trait ThermocoupleBoard {
    /// Stack level of the addressed board.
    fn stack(&self) -> u8;

    /// Reads the temperature of `channel` (1..=8) in degrees Celsius.
    fn read_temperature(&mut self, channel: u8) -> Result<f32, BoardError>;

    /// Reads the firmware revision.
    fn firmware_version(&mut self) -> Result<FirmwareVersion, BoardError>;
}

impl<T: ThermocoupleBoard + ?Sized> ThermocoupleBoard for Box<T> {
    fn stack(&self) -> u8 {
        (**self).stack()
    }

    fn read_temperature(&mut self, channel: u8) -> Result<f32, BoardError> {
        (**self).read_temperature(channel)
    }

    fn firmware_version(&mut self) -> Result<FirmwareVersion, BoardError> {
        (**self).firmware_version()
    }
}

pub fn check_channel(channel: u8) -> Result<(), BoardError> {
    if CHANNELS.contains(&channel) {
        Ok(())
    } else {
        Err(BoardError::InvalidChannel(channel))
    }
}

pub fn check_stack(stack: u8) -> Result<(), BoardError> {
    if STACK_LEVELS.contains(&stack) {
        Ok(())
    } else {
        Err(BoardError::InvalidStack(stack))
    }
}

#[test]
fn test_channel_and_stack_ranges() {
    assert!(check_channel(1).is_ok());
    assert!(check_channel(8).is_ok());
    assert!(matches!(check_channel(0), Err(BoardError::InvalidChannel(0))));
    assert!(matches!(check_channel(9), Err(BoardError::InvalidChannel(9))));

    assert!(check_stack(0).is_ok());
    assert!(check_stack(7).is_ok());
    assert!(matches!(check_stack(8), Err(BoardError::InvalidStack(8))));
}

#[test]
fn test_firmware_version_display() {
    let version = FirmwareVersion { major: 1, minor: 3 };
    assert_eq!(version.to_string(), "1.03");
}
