// Copyright © SixtyFPS GmbH <info@slint.dev>
// SPDX-License-Identifier: MIT

mod thermocoupleboard;
mod dummyboard;
mod sequentboard;

pub use thermocoupleboard::{
    check_channel, check_stack, BoardError, BoardPointer, BusError, FirmwareVersion,
    ThermocoupleBoard, CHANNELS, CHANNEL_COUNT, STACK_LEVELS,
};

pub use dummyboard::DummyBoard;

#[cfg(target_os = "linux")]
pub use sequentboard::SequentBoard;
