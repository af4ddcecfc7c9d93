//! Nine-way joystick direction from a calibrated coordinate.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::signal::Coordinate;

/// Lowest calibrated value still treated as centered
pub const CENTER_LOW: u16 = 411;
/// Highest calibrated value still treated as centered
pub const CENTER_HIGH: u16 = 611;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Centered,
    Up,
    Down,
    Left,
    Right,
    UpLeft,
    UpRight,
    DownLeft,
    DownRight,
}

impl Direction {
    pub const ALL: [Direction; 9] = [
        Direction::Centered,
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
        Direction::UpLeft,
        Direction::UpRight,
        Direction::DownLeft,
        Direction::DownRight,
    ];
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Direction::Centered => "centered",
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
            Direction::UpLeft => "up left",
            Direction::UpRight => "up right",
            Direction::DownLeft => "down left",
            Direction::DownRight => "down right",
        };
        f.write_str(label)
    }
}

/// Which end of the Y axis counts as "up".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Low Y is up, like screen coordinates
    #[default]
    Screen,
    /// Low Y is down
    Cartesian,
}

/// Position of one axis relative to the dead-zone band
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Zone {
    Below,
    Within,
    Above,
}

impl Zone {
    pub fn of(value: u16) -> Self {
        if value < CENTER_LOW {
            Zone::Below
        } else if value > CENTER_HIGH {
            Zone::Above
        } else {
            Zone::Within
        }
    }
}

pub fn classify(coord: Coordinate, orientation: Orientation) -> Direction {
    // Normalise Y so that Below means "up" before picking a label
    let y = match (orientation, Zone::of(coord.y)) {
        (Orientation::Screen, zone) => zone,
        (Orientation::Cartesian, Zone::Below) => Zone::Above,
        (Orientation::Cartesian, Zone::Above) => Zone::Below,
        (Orientation::Cartesian, Zone::Within) => Zone::Within,
    };

    match (Zone::of(coord.x), y) {
        (Zone::Within, Zone::Within) => Direction::Centered,
        (Zone::Below, Zone::Below) => Direction::UpLeft,
        (Zone::Above, Zone::Below) => Direction::UpRight,
        (Zone::Below, Zone::Above) => Direction::DownLeft,
        (Zone::Above, Zone::Above) => Direction::DownRight,
        (Zone::Below, Zone::Within) => Direction::Left,
        (Zone::Above, Zone::Within) => Direction::Right,
        (Zone::Within, Zone::Below) => Direction::Up,
        (Zone::Within, Zone::Above) => Direction::Down,
    }
}
