// Copyright © SixtyFPS GmbH <info@slint.dev>
// SPDX-License-Identifier: MIT

use crate::board::thermocoupleboard::{check_channel, check_stack, BoardError};

/// I2C address of the board at stack level 0.
pub const SLAVE_OWN_ADDRESS_BASE: u16 = 0x16;

pub const REVISION_MAJOR_REGISTER: u8 = 0x31;
pub const REVISION_MINOR_REGISTER: u8 = 0x32;

const TEMPERATURE_BASE_REGISTER: u8 = 0x00;
const TEMPERATURE_DATA_SIZE: u8 = 2;
const TEMPERATURE_SCALE_FACTOR: f32 = 10.0;

/// Bus address of the board at `stack`.
pub fn address_for_stack(stack: u8) -> Result<u16, BoardError> {
    check_stack(stack)?;
    Ok(SLAVE_OWN_ADDRESS_BASE + u16::from(stack))
}

/// First register of the 16 bit temperature value of `channel`.
pub fn temperature_register(channel: u8) -> Result<u8, BoardError> {
    check_channel(channel)?;
    Ok(TEMPERATURE_BASE_REGISTER + TEMPERATURE_DATA_SIZE * (channel - 1))
}

/// The board reports tenths of a degree as a signed word.
pub fn decode_temperature(raw: u16) -> f32 {
    f32::from(raw as i16) / TEMPERATURE_SCALE_FACTOR
}

#[cfg(target_os = "linux")]
pub use self::linux::SequentBoard;

#[cfg(target_os = "linux")]
mod linux {
    use super::*;
    use crate::board::thermocoupleboard::{FirmwareVersion, ThermocoupleBoard};
    use i2cdev::core::I2CDevice;
    use i2cdev::linux::LinuxI2CDevice;
    use std::path::Path;

    /// Eight thermocouple board on a Linux I2C bus.
    pub struct SequentBoard {
        device: LinuxI2CDevice,
        stack: u8,
    }

    impl SequentBoard {
        /// Opens the board at `stack` on `bus` and checks that it answers.
        pub fn open(bus: impl AsRef<Path>, stack: u8) -> Result<Self, BoardError> {
            let address = address_for_stack(stack)?;
            let mut device = LinuxI2CDevice::new(bus.as_ref(), address)
                .map_err(|e| BoardError::Bus(e.into()))?;

            device
                .smbus_read_byte_data(REVISION_MAJOR_REGISTER)
                .map_err(|e| BoardError::NotDetected {
                    stack,
                    source: e.into(),
                })?;

            log::debug!(
                "Thermocouple card {stack} found at {:#04x} on {}",
                address,
                bus.as_ref().display()
            );
            Ok(Self { device, stack })
        }
    }

    impl ThermocoupleBoard for SequentBoard {
        fn stack(&self) -> u8 {
            self.stack
        }

        fn read_temperature(&mut self, channel: u8) -> Result<f32, BoardError> {
            let register = temperature_register(channel)?;
            let raw = self
                .device
                .smbus_read_word_data(register)
                .map_err(|e| BoardError::Bus(e.into()))?;
            Ok(decode_temperature(raw))
        }

        fn firmware_version(&mut self) -> Result<FirmwareVersion, BoardError> {
            let major = self
                .device
                .smbus_read_byte_data(REVISION_MAJOR_REGISTER)
                .map_err(|e| BoardError::Bus(e.into()))?;
            let minor = self
                .device
                .smbus_read_byte_data(REVISION_MINOR_REGISTER)
                .map_err(|e| BoardError::Bus(e.into()))?;
            Ok(FirmwareVersion { major, minor })
        }
    }
}

#[test]
fn test_board_addressing() {
    assert_eq!(address_for_stack(0).unwrap(), 0x16);
    assert_eq!(address_for_stack(7).unwrap(), 0x1d);
    assert!(matches!(address_for_stack(8), Err(BoardError::InvalidStack(8))));
}

#[test]
fn test_temperature_registers() {
    assert_eq!(temperature_register(1).unwrap(), 0x00);
    assert_eq!(temperature_register(2).unwrap(), 0x02);
    assert_eq!(temperature_register(8).unwrap(), 0x0e);
    assert!(matches!(temperature_register(0), Err(BoardError::InvalidChannel(0))));
}

#[test]
fn test_decode_temperature() {
    assert_eq!(decode_temperature(201), 20.1);
    assert_eq!(decode_temperature(0), 0.0);
    // -12.5 °C as two's complement
    assert_eq!(decode_temperature((-125i16) as u16), -12.5);
}
