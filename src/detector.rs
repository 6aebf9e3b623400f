//! Ring of angular range sensors with moving-obstacle classification.
//!
//! Keeps the latest and previous reading per sensor plus a short rolling
//! history. A sensor staring at a static wall reports a near-constant
//! distance; one watching something move reports a jittery one. The
//! variance of the history window separates the two.

use crate::core::math::variance;
use crate::error::{NavError, Result};
use std::collections::VecDeque;
use std::f32::consts::PI;

/// A single range reading: `None` when the sensor saw no return.
pub type SensorReading = Option<f32>;

/// A sensor flagged as observing a moving obstacle.
#[derive(Clone, Copy, Debug)]
pub struct MovingObstacle {
    /// Fixed bearing of the reporting sensor, radians
    pub angle: f32,
    /// Most recent distance reading, meters
    pub distance: f32,
    /// Variance of the history window that triggered the flag
    pub variance: f32,
}

/// Fixed ring of evenly spaced range sensors.
#[derive(Clone, Debug)]
pub struct ObstacleDetector {
    /// Sensor bearings, 2π·i/N for sensor i
    angles: Vec<f32>,
    previous: Vec<SensorReading>,
    current: Vec<SensorReading>,
    /// Rolling FIFO of recent readings per sensor
    history: Vec<VecDeque<SensorReading>>,
    history_size: usize,
}

impl ObstacleDetector {
    /// Create a detector with `sensor_count` sensors spread evenly around
    /// 2π, keeping `history_size` readings per sensor.
    pub fn new(sensor_count: usize, history_size: usize) -> Self {
        let angles = (0..sensor_count)
            .map(|i| 2.0 * PI * i as f32 / sensor_count as f32)
            .collect();
        Self {
            angles,
            previous: vec![None; sensor_count],
            current: vec![None; sensor_count],
            history: vec![VecDeque::new(); sensor_count],
            history_size,
        }
    }

    /// Number of sensors in the ring.
    #[inline]
    pub fn sensor_count(&self) -> usize {
        self.angles.len()
    }

    /// Ingest one full ring of readings.
    ///
    /// The reading count must match the sensor count exactly; on mismatch
    /// the update is rejected and no state changes. On success the current
    /// readings shift to previous and each sensor's history gains the new
    /// value, evicting the oldest once full.
    pub fn update_readings(&mut self, readings: &[SensorReading]) -> Result<()> {
        if readings.len() != self.sensor_count() {
            return Err(NavError::SensorCountMismatch {
                expected: self.sensor_count(),
                actual: readings.len(),
            });
        }

        self.previous = std::mem::replace(&mut self.current, readings.to_vec());

        for (history, &reading) in self.history.iter_mut().zip(readings) {
            history.push_back(reading);
            if history.len() > self.history_size {
                history.pop_front();
            }
        }

        Ok(())
    }

    /// Report sensors whose history variance exceeds `threshold`.
    ///
    /// Sensors with fewer than two samples, or any absent reading in the
    /// window, are skipped rather than flagged.
    pub fn detect_moving_obstacles(&self, threshold: f32) -> Vec<MovingObstacle> {
        let mut moving = Vec::new();

        for (i, history) in self.history.iter().enumerate() {
            if history.len() < 2 {
                continue;
            }

            let Some(window) = history.iter().copied().collect::<Option<Vec<f32>>>() else {
                continue; // a gap in the window means no reliable classification
            };

            let var = variance(&window);
            if var > threshold {
                moving.push(MovingObstacle {
                    angle: self.angles[i],
                    distance: window[window.len() - 1],
                    variance: var,
                });
            }
        }

        moving
    }

    /// Current readings with their fixed bearings, in sensor-index order.
    pub fn get_sensor_data(&self) -> Vec<(f32, SensorReading)> {
        self.angles.iter().copied().zip(self.current.iter().copied()).collect()
    }

    /// Readings from the previous update, in sensor-index order.
    pub fn previous_readings(&self) -> &[SensorReading] {
        &self.previous
    }
}
