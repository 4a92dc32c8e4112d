//! Line-crossing counter.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet};
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, info, trace, warn};

use crate::counter::{
    CounterConfig, Crossing, Direction, GridResolver, IdentityResolver, TrackedVehicle,
};
use crate::detection::Detection;
use crate::error::Result;
use crate::geometry::{CountingLine, FrameSize, LineGeometry, LinePosition};

/// Outcome of one `update` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountResult<K> {
    /// Crossings counted since construction or the last reset
    pub total_count: u64,
    /// Crossings counted in this update
    pub new_counts: usize,
    /// Keys that crossed in this update, in detection order
    pub new_vehicle_ids: Vec<K>,
}

impl<K> Default for CountResult<K> {
    fn default() -> Self {
        Self {
            total_count: 0,
            new_counts: 0,
            new_vehicle_ids: Vec::new(),
        }
    }
}

/// Counts identities that change side of the counting line.
///
/// Frames must be fed in arrival order; side transitions are inferred from
/// consecutive observations of the same key.
pub struct LineCounter<R: IdentityResolver = GridResolver> {
    enabled: bool,
    direction: Direction,
    stale_after: Duration,
    geometry: LineGeometry,
    resolver: R,
    tracked: HashMap<R::Key, TrackedVehicle>,
    // (last_seen, key) per observation; entries are stale once the key is
    // seen again, and are skipped when popped.
    expiry: BinaryHeap<Reverse<(Instant, R::Key)>>,
    crossed_ids: HashSet<R::Key>,
    total_count: u64,
}

impl LineCounter<GridResolver> {
    /// Counter with the default 20 px grid resolver.
    pub fn new(config: CounterConfig) -> Result<Self> {
        Self::with_resolver(config, GridResolver::default())
    }
}

impl<R: IdentityResolver> LineCounter<R> {
    pub fn with_resolver(config: CounterConfig, resolver: R) -> Result<Self> {
        let line = CountingLine::try_from(&config.line)?;
        info!(
            enabled = config.enabled,
            direction = %config.direction,
            line = ?line.fractions(),
            "LineCounter initialized"
        );
        Ok(Self {
            enabled: config.enabled,
            direction: config.direction,
            stale_after: config.stale_after(),
            geometry: LineGeometry::new(line),
            resolver,
            tracked: HashMap::new(),
            expiry: BinaryHeap::new(),
            crossed_ids: HashSet::new(),
            total_count: 0,
        })
    }

    /// Process one frame worth of detections.
    ///
    /// `frame` is the size of the frame the detections were produced on; the
    /// line is projected onto it before the side test. Detections whose key
    /// cannot be resolved are skipped without affecting the others.
    pub fn update(
        &mut self,
        detections: &[Detection],
        frame: FrameSize,
        now: Instant,
    ) -> CountResult<R::Key> {
        if !self.enabled {
            return CountResult::default();
        }

        let mut new_vehicle_ids = Vec::new();

        match self.geometry.equation_for(frame) {
            Ok(equation) => {
                for detection in detections {
                    let Some(center) = detection.center() else {
                        trace!(?detection, "skipping detection with non-finite box");
                        continue;
                    };
                    let Some(key) = self.resolver.resolve(detection) else {
                        trace!(?detection, "no identity for detection");
                        continue;
                    };
                    let side = equation.side_of(&center);

                    match self.tracked.get_mut(&key) {
                        Some(vehicle) => {
                            let crossing = Crossing::between(vehicle.side, side)
                                .filter(|crossing| self.direction.counts(*crossing));

                            if let Some(crossing) = crossing {
                                if !vehicle.crossed {
                                    vehicle.crossed = true;
                                    if self.crossed_ids.insert(key.clone()) {
                                        self.total_count += 1;
                                        debug!(
                                            ?key,
                                            ?crossing,
                                            total = self.total_count,
                                            "vehicle crossed line"
                                        );
                                        new_vehicle_ids.push(key.clone());
                                    }
                                }
                            }
                            vehicle.observe(center, side, now);
                        }
                        None => {
                            trace!(?key, ?side, "new identity");
                            self.tracked.insert(
                                key.clone(),
                                TrackedVehicle::new(detection.class_id, center, side, now),
                            );
                        }
                    }
                    self.expiry.push(Reverse((now, key)));
                }
            }
            Err(err) => {
                warn!(%err, "skipping frame detections");
            }
        }

        self.evict_stale(now);

        CountResult {
            total_count: self.total_count,
            new_counts: new_vehicle_ids.len(),
            new_vehicle_ids,
        }
    }

    /// Drop identities whose last sighting is older than `stale_after`.
    fn evict_stale(&mut self, now: Instant) {
        let mut evicted = 0usize;
        while let Some(Reverse((seen, key))) = self.expiry.peek() {
            match self.tracked.get(key) {
                Some(vehicle) if vehicle.last_seen == *seen => {
                    if !vehicle.is_stale(now, self.stale_after) {
                        break;
                    }
                    self.tracked.remove(key);
                    evicted += 1;
                }
                // Superseded by a later sighting, or already evicted.
                _ => {}
            }
            self.expiry.pop();
        }
        if evicted > 0 {
            debug!(evicted, remaining = self.tracked.len(), "evicted stale identities");
        }
    }

    /// Clear the count, the crossed set and every tracked identity.
    pub fn reset(&mut self) {
        self.total_count = 0;
        self.crossed_ids.clear();
        self.tracked.clear();
        self.expiry.clear();
        self.resolver.reset();
        info!("Vehicle counter reset");
    }

    /// Replace the counting line and reset. On error nothing changes.
    pub fn set_line(&mut self, position: &LinePosition) -> Result<()> {
        let line = CountingLine::try_from(position)?;
        self.geometry.set_line(line);
        self.reset();
        info!(line = ?line.fractions(), "Line position updated");
        Ok(())
    }

    /// Apply a configuration snapshot. A changed line resets the counter;
    /// other fields are swapped in place.
    pub fn apply_config(&mut self, config: &CounterConfig) -> Result<()> {
        let line = CountingLine::try_from(&config.line)?;
        if line != *self.geometry.line() {
            self.geometry.set_line(line);
            self.reset();
        }
        self.enabled = config.enabled;
        self.direction = config.direction;
        self.stale_after = config.stale_after();
        info!(
            enabled = self.enabled,
            direction = %self.direction,
            line = ?line.fractions(),
            "counter configuration applied"
        );
        Ok(())
    }

    /// Current settings as a config snapshot.
    pub fn config(&self) -> CounterConfig {
        CounterConfig {
            enabled: self.enabled,
            line: self.geometry.line().to_position(),
            direction: self.direction,
            stale_after_ms: self.stale_after.as_millis() as u64,
        }
    }

    pub fn total_count(&self) -> u64 {
        self.total_count
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn line(&self) -> &CountingLine {
        self.geometry.line()
    }

    pub fn tracked_len(&self) -> usize {
        self.tracked.len()
    }

    pub fn vehicle(&self, key: &R::Key) -> Option<&TrackedVehicle> {
        self.tracked.get(key)
    }

    pub fn tracked(&self) -> impl Iterator<Item = (&R::Key, &TrackedVehicle)> {
        self.tracked.iter()
    }

    /// Whether the key has ever been counted since the last reset.
    pub fn has_crossed(&self, key: &R::Key) -> bool {
        self.crossed_ids.contains(key)
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }
}
