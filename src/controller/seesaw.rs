//! Seesaw register protocol for the gamepad breakout.
//!
//! Every command is a register base byte followed by a function byte. Reads
//! are a command write followed by a separate read of the response; all
//! multi-byte registers are big-endian.

use std::sync::Arc;
use std::time::Duration;

use super::clock::Clock;
use super::transport::{BusTransport, TransportError};

/// Default 7-bit bus address of the gamepad breakout
pub const DEVICE_ADDRESS: u16 = 0x50;

pub const STATUS_BASE: u8 = 0x00;
pub const STATUS_SWRST: u8 = 0x7F;
pub const RESET_ASSERT: u8 = 0xFF;

pub const ADC_BASE: u8 = 0x09;
pub const ADC_CHANNEL_OFFSET: u8 = 0x07;

pub const GPIO_BASE: u8 = 0x01;
pub const GPIO_BULK: u8 = 0x04;

pub const JOYSTICK_X_CHANNEL: u8 = 14;
pub const JOYSTICK_Y_CHANNEL: u8 = 15;

/// Highest ADC channel the command byte can address
pub const MAX_ADC_CHANNEL: u8 = 31;

pub const DEFAULT_RESET_SETTLE: Duration = Duration::from_millis(500);

#[derive(Debug, thiserror::Error)]
pub enum SeesawError {
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("ADC channel {0} out of range (0-31)")]
    InvalidChannel(u8),

    #[error("Device has not been reset")]
    NotReset,
}

/// Driver for one seesaw peripheral behind its own transport
pub struct SeesawDriver {
    transport: Box<dyn BusTransport>,
    clock: Arc<dyn Clock>,
    reset_settle: Duration,
    ready: bool,
}

impl SeesawDriver {
    pub fn new(transport: Box<dyn BusTransport>, clock: Arc<dyn Clock>) -> Self {
        Self::with_reset_settle(transport, clock, DEFAULT_RESET_SETTLE)
    }

    pub fn with_reset_settle(
        transport: Box<dyn BusTransport>,
        clock: Arc<dyn Clock>,
        reset_settle: Duration,
    ) -> Self {
        Self {
            transport,
            clock,
            reset_settle,
            ready: false,
        }
    }

    /// Issues a software reset and blocks until the chip has settled.
    ///
    /// Reads are refused until this has returned successfully.
    pub fn reset(&mut self) -> Result<(), SeesawError> {
        self.ready = false;
        self.write_command(&[STATUS_BASE, STATUS_SWRST, RESET_ASSERT])?;
        self.clock.sleep(self.reset_settle);
        self.ready = true;
        Ok(())
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Reads one 10-bit ADC sample. The value is passed through unvalidated.
    pub fn read_analog(&mut self, channel: u8) -> Result<u16, SeesawError> {
        if channel > MAX_ADC_CHANNEL {
            return Err(SeesawError::InvalidChannel(channel));
        }
        let mut buf = [0u8; 2];
        self.write_then_read(&[ADC_BASE, ADC_CHANNEL_OFFSET + channel], &mut buf)?;
        Ok(u16::from_be_bytes(buf))
    }

    /// Reads the raw level of every GPIO pin as one bitmask.
    pub fn read_digital_bulk(&mut self) -> Result<u32, SeesawError> {
        let mut buf = [0u8; 4];
        self.write_then_read(&[GPIO_BASE, GPIO_BULK], &mut buf)?;
        Ok(u32::from_be_bytes(buf))
    }

    fn write_then_read(&mut self, command: &[u8], buffer: &mut [u8]) -> Result<(), SeesawError> {
        if !self.ready {
            return Err(SeesawError::NotReset);
        }
        self.write_command(command)?;

        let actual = self.transport.read(buffer)?;
        if actual != buffer.len() {
            return Err(TransportError::ShortRead {
                expected: buffer.len(),
                actual,
            }
            .into());
        }
        Ok(())
    }

    fn write_command(&mut self, command: &[u8]) -> Result<(), SeesawError> {
        let actual = self.transport.write(command)?;
        if actual != command.len() {
            return Err(TransportError::ShortWrite {
                expected: command.len(),
                actual,
            }
            .into());
        }
        Ok(())
    }
}
