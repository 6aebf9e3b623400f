//! Probabilistic occupancy grid.
//!
//! A 2D belief map over discretized space. Each cell holds the probability
//! that the corresponding patch of floor is occupied, starting at 0.5
//! (unknown). Range-sensor hits are fused with the binary Bayes rule and
//! every cell relaxes back toward 0.5 over time so that stale observations
//! lose influence in dynamic environments.

use crate::config::MapConfig;
use crate::core::Point2D;

/// Occupancy probability grid in row-major layout.
///
/// World coordinates map to cells by dividing by `resolution`; coordinates
/// outside the mapped area are clamped to the nearest border cell rather
/// than rejected.
#[derive(Clone, Debug)]
pub struct OccupancyGrid {
    /// Cell probabilities, row-major, `cells_y` rows of `cells_x`
    cells: Vec<f32>,
    /// Grid width in cells
    cells_x: usize,
    /// Grid height in cells
    cells_y: usize,
    /// Resolution in meters per cell
    resolution: f32,
    /// Per-cycle relaxation toward 0.5
    decay_factor: f32,
    /// Default reliability of a sensor observation
    sensor_accuracy: f32,
    /// Maximum usable sensor range in meters
    max_range: f32,
    /// Probability at or above which a cell counts as occupied
    occupied_threshold: f32,
}

impl OccupancyGrid {
    /// Create a grid covering `width` x `height` meters with the default
    /// sensor model.
    pub fn new(width: f32, height: f32, resolution: f32) -> Self {
        Self::from_config(&MapConfig {
            width,
            height,
            resolution,
            ..MapConfig::default()
        })
    }

    /// Create a grid from a full map configuration.
    pub fn from_config(config: &MapConfig) -> Self {
        let cells_x = (config.width / config.resolution) as usize;
        let cells_y = (config.height / config.resolution) as usize;
        Self {
            cells: vec![0.5; cells_x * cells_y],
            cells_x,
            cells_y,
            resolution: config.resolution,
            decay_factor: config.decay_factor,
            sensor_accuracy: config.sensor_accuracy,
            max_range: config.max_sensor_range,
            occupied_threshold: config.occupied_threshold,
        }
    }

    /// Grid width in cells
    #[inline]
    pub fn cells_x(&self) -> usize {
        self.cells_x
    }

    /// Grid height in cells
    #[inline]
    pub fn cells_y(&self) -> usize {
        self.cells_y
    }

    /// Resolution in meters per cell
    #[inline]
    pub fn resolution(&self) -> f32 {
        self.resolution
    }

    /// Maximum usable sensor range in meters
    #[inline]
    pub fn max_range(&self) -> f32 {
        self.max_range
    }

    /// Convert world coordinates to a flat cell index, clamping
    /// out-of-bounds coordinates to the nearest border cell.
    #[inline]
    fn world_to_index(&self, x: f32, y: f32) -> usize {
        let gx = ((x / self.resolution).floor() as i64).clamp(0, self.cells_x as i64 - 1);
        let gy = ((y / self.resolution).floor() as i64).clamp(0, self.cells_y as i64 - 1);
        gy as usize * self.cells_x + gx as usize
    }

    /// Current occupancy probability of the cell containing (x, y).
    #[inline]
    pub fn probability(&self, x: f32, y: f32) -> f32 {
        self.cells[self.world_to_index(x, y)]
    }

    /// Fuse a single observation into the cell containing (x, y).
    ///
    /// Applies the binary Bayes rule: an `occupied` observation with
    /// reliability `accuracy` pulls the cell probability up, a free
    /// observation pulls it down. For priors in (0, 1) and accuracy in
    /// (0, 1) the result stays in [0, 1].
    pub fn update_cell(&mut self, x: f32, y: f32, occupied: bool, accuracy: f32) {
        let idx = self.world_to_index(x, y);
        let p = self.cells[idx];

        let p_new = if occupied {
            (accuracy * p) / (accuracy * p + (1.0 - accuracy) * (1.0 - p))
        } else {
            ((1.0 - accuracy) * p) / ((1.0 - accuracy) * p + accuracy * (1.0 - p))
        };

        self.cells[idx] = p_new;
    }

    /// Fuse a full ring of range readings taken at `position`.
    ///
    /// Each returning reading within range is ray-cast from the robot to
    /// the hit point in half-cell steps: intermediate samples are fused as
    /// free space and the hit point itself as occupied. Readings with no
    /// return or beyond `max_range` contribute nothing, not even free
    /// space along the beam.
    pub fn update_from_sensor_data(&mut self, position: Point2D, readings: &[(f32, Option<f32>)]) {
        for &(angle, reading) in readings {
            let Some(distance) = reading else {
                continue;
            };
            if distance > self.max_range {
                log::trace!("discarding reading at {angle:.2} rad: {distance:.2} m out of range");
                continue;
            }

            let hit = position.point_at(angle, distance);

            let ray_length = distance.min(self.max_range);
            let steps = (ray_length / (self.resolution * 0.5)) as usize;

            // All sampled points short of the hit are free space.
            for i in 0..steps.saturating_sub(1) {
                let ratio = i as f32 / steps as f32;
                let sample = position.point_at(angle, ratio * ray_length);
                self.update_cell(sample.x, sample.y, false, self.sensor_accuracy);
            }

            // The hit itself is an obstacle, but only when strictly inside
            // the sensor range; a max-range return is treated as no hit.
            if distance < self.max_range {
                self.update_cell(hit.x, hit.y, true, self.sensor_accuracy);
            }
        }
    }

    /// Relax every cell toward 0.5 by the configured decay factor.
    ///
    /// Must be called exactly once per sensing cycle; the decay rate is
    /// calibrated to tick cadence, not wall-clock time.
    pub fn apply_time_decay(&mut self) {
        for p in &mut self.cells {
            *p += self.decay_factor * (0.5 - *p);
        }
    }

    /// Threshold test against an explicit occupancy threshold.
    #[inline]
    pub fn is_cell_occupied(&self, x: f32, y: f32, threshold: f32) -> bool {
        self.probability(x, y) >= threshold
    }

    /// Threshold test against the configured default threshold.
    #[inline]
    pub fn is_occupied(&self, x: f32, y: f32) -> bool {
        self.is_cell_occupied(x, y, self.occupied_threshold)
    }
}
