use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::counter::Direction;
use crate::geometry::LinePosition;

/// Identities unseen for longer than this are evicted.
pub const DEFAULT_STALE_AFTER: Duration = Duration::from_secs(5);

/// Configuration snapshot for the LineCounter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CounterConfig {
    pub enabled: bool,
    pub line: LinePosition,
    pub direction: Direction,
    pub stale_after_ms: u64,
}

impl Default for CounterConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            line: LinePosition::default(),
            direction: Direction::Up,
            stale_after_ms: DEFAULT_STALE_AFTER.as_millis() as u64,
        }
    }
}

impl CounterConfig {
    pub fn with_line(mut self, line: LinePosition) -> Self {
        self.line = line;
        self
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_stale_after(mut self, stale_after: Duration) -> Self {
        self.stale_after_ms = stale_after.as_millis() as u64;
        self
    }

    pub fn stale_after(&self) -> Duration {
        Duration::from_millis(self.stale_after_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::FrameSize;

    #[test]
    fn test_deserialize_pixel_line() {
        let json = r#"{
            "enabled": true,
            "line": {"units": "pixels", "points": [[400, 600], [1200, 600]], "frame": {"width": 1600, "height": 900}},
            "direction": "down"
        }"#;
        let config: CounterConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.direction, Direction::Down);
        assert_eq!(config.stale_after(), DEFAULT_STALE_AFTER);
        assert_eq!(
            config.line,
            LinePosition::Pixels {
                points: [[400.0, 600.0], [1200.0, 600.0]],
                frame: FrameSize::new(1600, 900),
            }
        );
    }

    #[test]
    fn test_deserialize_defaults() {
        let config: CounterConfig = serde_json::from_str(r#"{"enabled": false}"#).unwrap();
        assert!(!config.enabled);
        assert_eq!(config.line, LinePosition::default());
        assert_eq!(config.direction, Direction::Up);
    }

    #[test]
    fn test_round_trip_fraction_line() {
        let config = CounterConfig::default()
            .with_line(LinePosition::Fractions {
                points: [[0.1, 0.2], [0.9, 0.8]],
            })
            .with_direction(Direction::Both)
            .with_stale_after(Duration::from_secs(2));
        let json = serde_json::to_string(&config).unwrap();

        assert!(json.contains(r#""units":"fractions""#));
        assert!(json.contains(r#""direction":"both""#));
        let back: CounterConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
