//! Recent-movement history and derived walking track.
//!
//! Keeps a short ring buffer of position samples so the presentation layer
//! can show a live-location trail (e.g. while an SOS is active) and derive
//! a coarse direction of travel from position deltas.
//!
//! # Design
//!
//! - Stores the last 30 samples at 1Hz (30 seconds of movement)
//! - Track is the bearing from oldest to newest sample
//! - Below a minimum displacement no track is reported (standing still)

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::coord::{bearing_deg, Position};

/// Default maximum samples to retain (30 seconds at 1Hz).
const DEFAULT_MAX_SAMPLES: usize = 30;

/// Default minimum interval between samples (1Hz).
const DEFAULT_SAMPLE_INTERVAL: Duration = Duration::from_secs(1);

/// Minimum displacement in meters for a reliable track.
///
/// Below this a pedestrian is effectively stationary and a derived
/// bearing would be GPS noise.
const MIN_DISTANCE_FOR_TRACK_M: f64 = 25.0;

/// A single recorded position sample.
#[derive(Debug, Clone, Copy)]
pub struct TrackSample {
    /// Where the user was.
    pub position: Position,
    /// When the sample was recorded.
    pub timestamp: Instant,
}

/// Configuration for the track history.
#[derive(Debug, Clone)]
pub struct TrackConfig {
    /// Maximum samples to retain.
    pub max_samples: usize,
    /// Minimum interval between samples.
    pub sample_interval: Duration,
    /// Minimum displacement for track derivation, in meters.
    pub min_distance_m: f64,
}

impl Default for TrackConfig {
    fn default() -> Self {
        Self {
            max_samples: DEFAULT_MAX_SAMPLES,
            sample_interval: DEFAULT_SAMPLE_INTERVAL,
            min_distance_m: MIN_DISTANCE_FOR_TRACK_M,
        }
    }
}

/// Ring buffer of recent position samples.
#[derive(Debug)]
pub struct TrackHistory {
    /// Recent samples, oldest first.
    samples: VecDeque<TrackSample>,
    config: TrackConfig,
    /// Last accepted sample time, for rate limiting.
    last_sample_time: Option<Instant>,
}

impl Default for TrackHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl TrackHistory {
    /// Create a history with default configuration.
    pub fn new() -> Self {
        Self::with_config(TrackConfig::default())
    }

    /// Create with custom configuration.
    pub fn with_config(config: TrackConfig) -> Self {
        Self {
            samples: VecDeque::with_capacity(config.max_samples),
            config,
            last_sample_time: None,
        }
    }

    /// Record a position sample.
    ///
    /// Samples arriving faster than the configured interval are dropped.
    /// Returns true if the sample was recorded.
    pub fn record(&mut self, position: Position) -> bool {
        let now = Instant::now();

        if let Some(last) = self.last_sample_time {
            if now.duration_since(last) < self.config.sample_interval {
                return false;
            }
        }

        self.samples.push_back(TrackSample {
            position,
            timestamp: now,
        });
        self.last_sample_time = Some(now);

        while self.samples.len() > self.config.max_samples {
            self.samples.pop_front();
        }

        true
    }

    /// Record a sample with an explicit timestamp (for testing).
    #[cfg(test)]
    pub fn record_at(&mut self, position: Position, timestamp: Instant) {
        self.samples.push_back(TrackSample {
            position,
            timestamp,
        });

        while self.samples.len() > self.config.max_samples {
            self.samples.pop_front();
        }
    }

    /// Derive the direction of travel from the history.
    ///
    /// Returns the bearing from the oldest to the newest sample in degrees
    /// (0 = North, 90 = East), or None with fewer than two samples or when
    /// the displacement is below the configured minimum.
    pub fn derived_track(&self) -> Option<f64> {
        if self.samples.len() < 2 {
            return None;
        }

        let oldest = self.samples.front()?;
        let newest = self.samples.back()?;

        let displacement_m = oldest.position.distance_m(&newest.position);
        if displacement_m < self.config.min_distance_m {
            return None;
        }

        Some(bearing_deg(&oldest.position, &newest.position))
    }

    /// Number of samples in the history.
    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    /// Whether the history is empty.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Time span covered by the history.
    pub fn time_span(&self) -> Option<Duration> {
        let oldest = self.samples.front()?;
        let newest = self.samples.back()?;
        Some(newest.timestamp.duration_since(oldest.timestamp))
    }

    /// The most recent recorded position.
    pub fn latest_position(&self) -> Option<Position> {
        self.samples.back().map(|sample| sample.position)
    }

    /// Iterate samples, oldest first.
    pub fn samples(&self) -> impl Iterator<Item = &TrackSample> {
        self.samples.iter()
    }

    /// Drop all samples.
    pub fn clear(&mut self) {
        self.samples.clear();
        self.last_sample_time = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(lat: f64, lon: f64) -> Position {
        Position {
            latitude: lat,
            longitude: lon,
        }
    }

    fn fast_config() -> TrackConfig {
        TrackConfig {
            sample_interval: Duration::from_millis(1),
            ..Default::default()
        }
    }

    #[test]
    fn test_starts_empty() {
        let history = TrackHistory::new();
        assert!(history.is_empty());
        assert!(history.derived_track().is_none());
        assert!(history.latest_position().is_none());
    }

    #[test]
    fn test_rate_limiting() {
        let mut history = TrackHistory::with_config(TrackConfig {
            sample_interval: Duration::from_millis(100),
            ..Default::default()
        });

        assert!(history.record(at(51.505, -0.09)));
        // Immediate second sample is dropped.
        assert!(!history.record(at(51.506, -0.09)));
        assert_eq!(history.sample_count(), 1);

        std::thread::sleep(Duration::from_millis(110));
        assert!(history.record(at(51.506, -0.09)));
        assert_eq!(history.sample_count(), 2);
    }

    #[test]
    fn test_trims_to_max_samples() {
        let mut history = TrackHistory::with_config(TrackConfig {
            max_samples: 5,
            ..fast_config()
        });

        let base = Instant::now();
        for i in 0..10 {
            history.record_at(at(51.5 + i as f64 * 0.001, -0.09), base + Duration::from_secs(i));
        }

        assert_eq!(history.sample_count(), 5);
        // Oldest retained sample is number 5.
        let oldest = history.samples().next().unwrap();
        assert!((oldest.position.latitude - 51.505).abs() < 1e-9);
    }

    #[test]
    fn test_track_heading_north() {
        let mut history = TrackHistory::with_config(fast_config());
        let base = Instant::now();

        history.record_at(at(51.505, -0.09), base);
        history.record_at(at(51.51, -0.09), base + Duration::from_secs(30));

        let track = history.derived_track().unwrap();
        assert!(track < 1.0 || track > 359.0, "expected ~0°, got {track}°");
    }

    #[test]
    fn test_track_heading_east() {
        let mut history = TrackHistory::with_config(fast_config());
        let base = Instant::now();

        history.record_at(at(51.505, -0.09), base);
        history.record_at(at(51.505, -0.08), base + Duration::from_secs(30));

        let track = history.derived_track().unwrap();
        assert!((track - 90.0).abs() < 1.0, "expected ~90°, got {track}°");
    }

    #[test]
    fn test_no_track_when_stationary() {
        let mut history = TrackHistory::with_config(fast_config());
        let base = Instant::now();

        history.record_at(at(51.505, -0.09), base);
        history.record_at(at(51.505, -0.09), base + Duration::from_secs(10));

        assert!(history.derived_track().is_none());
    }

    #[test]
    fn test_no_track_below_min_displacement() {
        let mut history = TrackHistory::with_config(fast_config());
        let base = Instant::now();

        // ~11m north, below the 25m minimum.
        history.record_at(at(51.505, -0.09), base);
        history.record_at(at(51.5051, -0.09), base + Duration::from_secs(10));

        assert!(history.derived_track().is_none());
    }

    #[test]
    fn test_time_span() {
        let mut history = TrackHistory::with_config(fast_config());
        let base = Instant::now();

        assert!(history.time_span().is_none());

        history.record_at(at(51.505, -0.09), base);
        history.record_at(at(51.506, -0.09), base + Duration::from_secs(10));
        history.record_at(at(51.507, -0.09), base + Duration::from_secs(20));

        assert_eq!(history.time_span().unwrap(), Duration::from_secs(20));
    }

    #[test]
    fn test_latest_position() {
        let mut history = TrackHistory::with_config(fast_config());
        let base = Instant::now();

        history.record_at(at(51.505, -0.09), base);
        history.record_at(at(51.51, -0.1), base + Duration::from_secs(5));

        assert_eq!(history.latest_position().unwrap(), at(51.51, -0.1));
    }

    #[test]
    fn test_clear() {
        let mut history = TrackHistory::with_config(fast_config());
        history.record(at(51.505, -0.09));
        assert!(!history.is_empty());

        history.clear();
        assert!(history.is_empty());
        assert!(history.latest_position().is_none());
    }
}
