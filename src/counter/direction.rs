use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::geometry::Side;

/// Which crossings are counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Up,
    Down,
    Both,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Both => "both",
        }
    }

    pub fn counts(self, crossing: Crossing) -> bool {
        match self {
            Self::Both => true,
            Self::Up => crossing == Crossing::Up,
            Self::Down => crossing == Crossing::Down,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "up" => Ok(Self::Up),
            "down" => Ok(Self::Down),
            "both" => Ok(Self::Both),
            _ => Err(Error::UnknownDirection(s.to_string())),
        }
    }
}

/// An observed side transition.
///
/// `Up` is a move from the positive half-plane to the negative one, `Down`
/// the reverse. Which way that is on screen depends on the order of the line
/// endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Crossing {
    Up,
    Down,
}

impl Crossing {
    /// Transition between two observations, if both are off the line and differ.
    pub fn between(previous: Side, current: Side) -> Option<Self> {
        if previous.is_on_line() || current.is_on_line() || previous == current {
            return None;
        }
        if previous.sign() > current.sign() {
            Some(Self::Up)
        } else {
            Some(Self::Down)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crossing_between() {
        assert_eq!(
            Crossing::between(Side::Positive, Side::Negative),
            Some(Crossing::Up)
        );
        assert_eq!(
            Crossing::between(Side::Negative, Side::Positive),
            Some(Crossing::Down)
        );
        assert_eq!(Crossing::between(Side::Positive, Side::Positive), None);
        assert_eq!(Crossing::between(Side::On, Side::Negative), None);
        assert_eq!(Crossing::between(Side::Positive, Side::On), None);
    }

    #[test]
    fn test_direction_filter() {
        assert!(Direction::Up.counts(Crossing::Up));
        assert!(!Direction::Up.counts(Crossing::Down));
        assert!(Direction::Down.counts(Crossing::Down));
        assert!(!Direction::Down.counts(Crossing::Up));
        assert!(Direction::Both.counts(Crossing::Up));
        assert!(Direction::Both.counts(Crossing::Down));
    }

    #[test]
    fn test_parse_direction() {
        assert_eq!("UP".parse::<Direction>(), Ok(Direction::Up));
        assert_eq!(" both ".parse::<Direction>(), Ok(Direction::Both));
        assert_eq!(
            "sideways".parse::<Direction>(),
            Err(Error::UnknownDirection("sideways".into()))
        );
        assert_eq!(Direction::Down.to_string(), "down");
    }
}
