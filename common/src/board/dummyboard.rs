// Copyright © SixtyFPS GmbH <info@slint.dev>
// SPDX-License-Identifier: MIT

use serde::Deserialize;

use crate::board::thermocoupleboard::{
    check_channel, BoardError, FirmwareVersion, ThermocoupleBoard, CHANNEL_COUNT,
};

/// A board without hardware. Replays recorded frames of eight readings, one frame per
/// pass over the channels, and starts over after the last one.
#[derive(Deserialize, Clone, Debug, Default)]
pub struct DummyBoard {
    stack: u8,
    firmware: FirmwareVersion,
    frames: Vec<[f32; CHANNEL_COUNT]>,
    #[serde(skip)]
    cursor: usize,
}

impl DummyBoard {
    pub fn new() -> Result<Self, serde_json::Error> {
        let json_data = std::include_str!("./dummyboard.json");

        serde_json::from_str::<Self>(json_data)
    }

    pub fn from_frames(stack: u8, frames: Vec<[f32; CHANNEL_COUNT]>) -> Self {
        Self {
            stack,
            frames,
            ..Self::default()
        }
    }
}

impl ThermocoupleBoard for DummyBoard {
    fn stack(&self) -> u8 {
        self.stack
    }

    fn read_temperature(&mut self, channel: u8) -> Result<f32, BoardError> {
        check_channel(channel)?;
        if self.frames.is_empty() {
            return Err(BoardError::Bus("no recorded frames".into()));
        }

        let frame = &self.frames[self.cursor % self.frames.len()];
        let value = frame[usize::from(channel - 1)];

        // The last channel completes a frame.
        if usize::from(channel) == CHANNEL_COUNT {
            self.cursor = (self.cursor + 1) % self.frames.len();
        }
        Ok(value)
    }

    fn firmware_version(&mut self) -> Result<FirmwareVersion, BoardError> {
        Ok(self.firmware)
    }
}

#[test]
fn test_dummy_board() {
    let mut board = DummyBoard::new().unwrap();

    assert_eq!(board.stack(), 0);
    assert_eq!(board.firmware_version().unwrap().to_string(), "1.03");
    assert_eq!(board.read_temperature(1).unwrap(), 21.4);
    assert_eq!(board.read_temperature(8).unwrap(), 20.2);
    // Second frame after the eighth channel was read.
    assert_eq!(board.read_temperature(1).unwrap(), 21.5);
    assert!(matches!(board.read_temperature(9), Err(BoardError::InvalidChannel(9))));
}

#[test]
fn test_dummy_board_wraps_around() {
    let mut board = DummyBoard::from_frames(2, vec![[1.0; CHANNEL_COUNT], [2.0; CHANNEL_COUNT]]);

    for expected in [1.0, 2.0, 1.0] {
        for channel in 1..=8 {
            assert_eq!(board.read_temperature(channel).unwrap(), expected);
        }
    }
    assert_eq!(board.stack(), 2);
}

#[test]
fn test_dummy_board_without_frames_fails() {
    let mut board = DummyBoard::from_frames(0, Vec::new());
    assert!(matches!(board.read_temperature(1), Err(BoardError::Bus(_))));
}
