//! Conversion of raw seesaw readings into joystick coordinates and button sets.

use std::fmt;

use bitflags::bitflags;

/// Full scale of the 10-bit ADC
pub const AXIS_MAX: u16 = 1023;

/// Corrects the inverted wiring of a stick axis.
///
/// Samples above full scale saturate to 0 so the result stays in range.
pub fn condition_axis(raw: u16) -> u16 {
    AXIS_MAX.saturating_sub(raw)
}

/// Orientation-corrected stick position, both axes in `0..=1023`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Coordinate {
    pub x: u16,
    pub y: u16,
}

impl Coordinate {
    pub fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }

    pub fn from_raw(raw_x: u16, raw_y: u16) -> Self {
        Self::new(condition_axis(raw_x), condition_axis(raw_y))
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "X: {}, Y: {}", self.x, self.y)
    }
}

bitflags! {
    /// Pressed buttons, keyed by the GPIO pin each one is wired to
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Buttons: u32 {
        const SELECT = 1 << 0;
        const B = 1 << 1;
        const Y = 1 << 2;
        const A = 1 << 5;
        const X = 1 << 6;
        const START = 1 << 16;
    }
}

impl Buttons {
    /// Display names of the pressed buttons in a stable order
    pub fn pressed(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.iter_names().map(|(name, _)| name)
    }
}

impl fmt::Display for Buttons {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "none");
        }
        let names: Vec<&str> = self.pressed().collect();
        write!(f, "{}", names.join(" "))
    }
}

/// Decodes a bulk GPIO read. Buttons pull their line low when pressed;
/// pins that are not wired to a button are discarded.
pub fn condition_buttons(raw: u32) -> Buttons {
    Buttons::from_bits_truncate(!raw)
}
