//! CountingPipeline for combining detection with line counting.

use std::time::Instant;

use crossbeam_channel::{Receiver, Sender, unbounded};
use tracing::{info, warn};

use crate::counter::{CountResult, CounterConfig, GridResolver, IdentityResolver, LineCounter};
use crate::error::Result;
use crate::geometry::FrameSize;

use super::{DetectionFilter, DetectionSource};

/// Detector, filter and counter driven one frame at a time.
///
/// Configuration changes sent through `config_sender()` from other threads
/// are only applied between frames, so an update never sees a half-applied
/// configuration.
pub struct CountingPipeline<D: DetectionSource, R: IdentityResolver = GridResolver> {
    detector: D,
    filter: DetectionFilter,
    counter: LineCounter<R>,
    config_tx: Sender<CounterConfig>,
    config_rx: Receiver<CounterConfig>,
}

impl<D: DetectionSource> CountingPipeline<D, GridResolver> {
    /// Pipeline with the default vehicle filter and grid resolver.
    pub fn new(detector: D, config: CounterConfig) -> Result<Self> {
        Ok(Self::with_counter(
            detector,
            DetectionFilter::default(),
            LineCounter::new(config)?,
        ))
    }
}

impl<D: DetectionSource, R: IdentityResolver> CountingPipeline<D, R> {
    pub fn with_counter(detector: D, filter: DetectionFilter, counter: LineCounter<R>) -> Self {
        let (config_tx, config_rx) = unbounded();
        Self {
            detector,
            filter,
            counter,
            config_tx,
            config_rx,
        }
    }

    /// Handle for pushing configuration snapshots from another thread.
    pub fn config_sender(&self) -> Sender<CounterConfig> {
        self.config_tx.clone()
    }

    /// Run detection on one frame and count crossings.
    ///
    /// Pending configuration updates are applied first. The newest snapshot
    /// that validates takes effect; older ones are discarded. Detector failures are returned unchanged and leave
    /// the counter untouched.
    pub fn process_frame(
        &mut self,
        input: &[u8],
        width: u32,
        height: u32,
        now: Instant,
    ) -> std::result::Result<CountResult<R::Key>, D::Error> {
        self.apply_pending_config();

        let detections = self.detector.detect(input, width, height)?;
        let detections = self.filter.apply(detections);
        Ok(self
            .counter
            .update(&detections, FrameSize::new(width, height), now))
    }

    fn apply_pending_config(&mut self) {
        let pending: Vec<CounterConfig> = self.config_rx.try_iter().collect();
        let mut superseded = pending.len();
        for config in pending.iter().rev() {
            superseded -= 1;
            match self.counter.apply_config(config) {
                Ok(()) => {
                    info!(superseded, "pipeline picked up new counter configuration");
                    return;
                }
                Err(err) => warn!(%err, "rejected counter configuration update"),
            }
        }
    }

    pub fn detector(&self) -> &D {
        &self.detector
    }

    pub fn detector_mut(&mut self) -> &mut D {
        &mut self.detector
    }

    pub fn filter(&self) -> &DetectionFilter {
        &self.filter
    }

    pub fn set_filter(&mut self, filter: DetectionFilter) {
        self.filter = filter;
    }

    pub fn counter(&self) -> &LineCounter<R> {
        &self.counter
    }

    pub fn counter_mut(&mut self) -> &mut LineCounter<R> {
        &mut self.counter
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::counter::Direction;
    use crate::detection::{Detection, DetectionBuilder};
    use crate::geometry::LinePosition;
    use std::time::Duration;

    /// Replays one scripted frame of detections per call.
    struct ScriptedDetector {
        frames: Vec<Vec<Detection>>,
        calls: usize,
    }

    impl DetectionSource for ScriptedDetector {
        type Error = String;

        fn detect(
            &mut self,
            _input: &[u8],
            _width: u32,
            _height: u32,
        ) -> std::result::Result<Vec<Detection>, Self::Error> {
            let frame = self
                .frames
                .get(self.calls)
                .cloned()
                .ok_or_else(|| "end of script".to_string());
            self.calls += 1;
            frame
        }
    }

    fn vehicle(cy: f32, class_id: u32) -> Detection {
        DetectionBuilder::new()
            .centered(105.0, cy, 30.0)
            .confidence(0.9)
            .class_id(class_id)
            .build()
    }

    fn config() -> CounterConfig {
        CounterConfig::default()
            .with_line(LinePosition::Pixels {
                points: [[0.0, 110.0], [200.0, 110.0]],
                frame: FrameSize::new(200, 200),
            })
            .with_direction(Direction::Both)
    }

    #[test]
    fn test_pipeline_counts_filtered_detections() {
        let detector = ScriptedDetector {
            frames: vec![
                vec![vehicle(115.0, 2), vehicle(115.0, 0)],
                vec![vehicle(105.0, 2), vehicle(105.0, 0)],
            ],
            calls: 0,
        };
        let mut pipeline = CountingPipeline::new(detector, config()).unwrap();
        let t0 = Instant::now();

        pipeline.process_frame(&[], 200, 200, t0).unwrap();
        let result = pipeline
            .process_frame(&[], 200, 200, t0 + Duration::from_millis(33))
            .unwrap();

        // The person (class 0) is filtered out before counting.
        assert_eq!(result.total_count, 1);
        assert_eq!(result.new_vehicle_ids[0].class_id, 2);

        let err = pipeline.process_frame(&[], 200, 200, t0 + Duration::from_millis(66));
        assert_eq!(err, Err("end of script".to_string()));
        assert_eq!(pipeline.counter().total_count(), 1);
    }

    #[test]
    fn test_config_updates_apply_at_frame_boundary() {
        let detector = ScriptedDetector {
            frames: vec![vec![vehicle(115.0, 2)], vec![vehicle(105.0, 2)]],
            calls: 0,
        };
        let mut pipeline = CountingPipeline::new(detector, config()).unwrap();
        let sender = pipeline.config_sender();

        let bad = config().with_line(LinePosition::Fractions {
            points: [[0.2, 0.2], [0.2, 0.2]],
        });
        let disabled = config().with_enabled(false);
        std::thread::spawn(move || {
            sender.send(bad).unwrap();
            sender.send(disabled).unwrap();
        })
        .join()
        .unwrap();

        let t0 = Instant::now();
        let result = pipeline.process_frame(&[], 200, 200, t0).unwrap();
        assert!(!pipeline.counter().is_enabled());
        assert_eq!(result, CountResult::default());

        // A degenerate line on its own is rejected and the old line is kept.
        let line_before = *pipeline.counter().line();
        pipeline
            .config_sender()
            .send(config().with_line(LinePosition::Fractions {
                points: [[0.2, 0.2], [0.2, 0.2]],
            }))
            .unwrap();
        pipeline.process_frame(&[], 200, 200, t0).unwrap();
        assert_eq!(*pipeline.counter().line(), line_before);
    }

    #[test]
    fn test_invalid_update_falls_back_to_earlier_snapshot() {
        let detector = ScriptedDetector {
            frames: vec![vec![]],
            calls: 0,
        };
        let mut pipeline = CountingPipeline::new(detector, config()).unwrap();
        let sender = pipeline.config_sender();

        let moved = config().with_line(LinePosition::Fractions {
            points: [[0.0, 0.25], [1.0, 0.25]],
        });
        sender.send(moved).unwrap();
        sender
            .send(config().with_line(LinePosition::Fractions {
                points: [[0.4, 0.4], [0.4, 0.4]],
            }))
            .unwrap();

        pipeline.process_frame(&[], 200, 200, Instant::now()).unwrap();
        assert_eq!(
            pipeline.counter().line().fractions(),
            [[0.0, 0.25], [1.0, 0.25]]
        );
    }
}
