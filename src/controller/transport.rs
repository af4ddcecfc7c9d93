//! Bus transport seam between the seesaw driver and the Linux I2C device node.
//!
//! The driver only needs blocking byte writes and reads against an already
//! addressed peripheral. [`I2cTransport`] provides that over `rppal`; tests
//! use the fake in `controller::testing`.

use rppal::i2c::I2c;
use tracing::debug;

/// Errors raised while opening or talking to the bus
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The device node for the bus could not be opened
    #[error("Failed to open I2C bus {bus}: {source}")]
    Open {
        bus: u8,
        #[source]
        source: rppal::i2c::Error,
    },

    /// Addressing the peripheral failed
    #[error("Failed to select I2C device 0x{address:02x}: {source}")]
    DeviceSelect {
        address: u16,
        #[source]
        source: rppal::i2c::Error,
    },

    #[error("Failed to set I2C timeout: {source}")]
    Timeout {
        #[source]
        source: rppal::i2c::Error,
    },

    #[error("I2C transfer failed: {0}")]
    Bus(#[from] rppal::i2c::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Short write: expected {expected} bytes, wrote {actual}")]
    ShortWrite { expected: usize, actual: usize },

    #[error("Short read: expected {expected} bytes, got {actual}")]
    ShortRead { expected: usize, actual: usize },
}

/// Blocking byte transport to a single, already selected peripheral.
///
/// Implementations release the underlying handle on drop.
pub trait BusTransport: Send {
    /// Writes `bytes` and returns how many were accepted
    fn write(&mut self, bytes: &[u8]) -> Result<usize, TransportError>;

    /// Fills `buffer` and returns how many bytes were read
    fn read(&mut self, buffer: &mut [u8]) -> Result<usize, TransportError>;
}

/// `/dev/i2c-N` transport with one peripheral selected
pub struct I2cTransport {
    i2c: I2c,
    bus: u8,
    address: u16,
}

impl I2cTransport {
    /// Opens `bus`, selects `address` and optionally applies a transaction timeout.
    pub fn open(bus: u8, address: u16, timeout_ms: Option<u32>) -> Result<Self, TransportError> {
        let mut i2c = I2c::with_bus(bus).map_err(|source| TransportError::Open { bus, source })?;

        i2c.set_slave_address(address)
            .map_err(|source| TransportError::DeviceSelect { address, source })?;

        if let Some(timeout) = timeout_ms {
            i2c.set_timeout(timeout)
                .map_err(|source| TransportError::Timeout { source })?;
        }

        Ok(Self { i2c, bus, address })
    }

    pub fn bus(&self) -> u8 {
        self.bus
    }

    pub fn address(&self) -> u16 {
        self.address
    }
}

impl BusTransport for I2cTransport {
    fn write(&mut self, bytes: &[u8]) -> Result<usize, TransportError> {
        Ok(self.i2c.write(bytes)?)
    }

    fn read(&mut self, buffer: &mut [u8]) -> Result<usize, TransportError> {
        Ok(self.i2c.read(buffer)?)
    }
}

impl Drop for I2cTransport {
    fn drop(&mut self) {
        debug!(
            "Releasing I2C bus {} (device 0x{:02x})",
            self.bus, self.address
        );
    }
}
