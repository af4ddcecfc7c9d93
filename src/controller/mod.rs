//! Seesaw gamepad input subsystem
//!
//! Processing runs bottom-up through these modules:
//!
//! 1. [`transport`] - Byte-level I2C access to the addressed peripheral
//! 2. [`seesaw`] - Register commands: reset, ADC read, bulk GPIO read
//! 3. [`signal`] - Axis inversion and active-low button decoding
//! 4. [`direction`] - Nine-way classification around the dead zone
//! 5. [`poll_loop`] - Reset-once, then sample at a fixed cadence
//!
//! # Architecture
//!
//! ```text
//! I2C bus ──► SeesawDriver ──► Coordinate / Buttons ──► Direction ──► TickObserver
//!             (raw samples)    (conditioned)            (classified)
//! ```

pub mod clock;
pub mod direction;
pub mod poll_loop;
pub mod seesaw;
pub mod signal;
pub mod transport;

#[cfg(test)]
pub mod testing;

pub use clock::{Clock, SystemClock};
pub use direction::{classify, Direction, Orientation};
pub use poll_loop::{PollError, PollSettings, Poller, TickObserver, TickReport, TracingObserver};
pub use seesaw::{SeesawDriver, SeesawError};
pub use signal::{condition_axis, condition_buttons, Buttons, Coordinate};
pub use transport::{BusTransport, I2cTransport, TransportError};
