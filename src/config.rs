//! Configuration loading for DishaNav
//!
//! All tuning constants of the navigation core live here, with defaults
//! matching the calibrated values the controller was validated with.
//! Configurations can be deserialized from TOML, with every field optional.

use crate::error::Result;
use serde::Deserialize;
use std::path::Path;

/// Main configuration structure
#[derive(Clone, Debug, Default, Deserialize)]
pub struct NavConfig {
    #[serde(default)]
    pub map: MapConfig,
    #[serde(default)]
    pub sensor: SensorConfig,
    #[serde(default)]
    pub control: ControlConfig,
}

impl NavConfig {
    /// Parse a configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Load a configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }
}

/// Occupancy grid parameters
#[derive(Clone, Debug, Deserialize)]
pub struct MapConfig {
    /// Mapped area width in meters (default: 20.0)
    #[serde(default = "default_map_width")]
    pub width: f32,

    /// Mapped area height in meters (default: 20.0)
    #[serde(default = "default_map_height")]
    pub height: f32,

    /// Grid resolution in meters per cell (default: 0.1)
    #[serde(default = "default_resolution")]
    pub resolution: f32,

    /// Per-cycle relaxation of cell probabilities toward 0.5 (default: 0.01)
    #[serde(default = "default_decay_factor")]
    pub decay_factor: f32,

    /// Probability above which a cell counts as occupied (default: 0.7)
    #[serde(default = "default_occupied_threshold")]
    pub occupied_threshold: f32,

    /// Reliability of a range sensor observation (default: 0.9)
    #[serde(default = "default_sensor_accuracy")]
    pub sensor_accuracy: f32,

    /// Maximum usable sensor range in meters (default: 4.0)
    #[serde(default = "default_max_sensor_range")]
    pub max_sensor_range: f32,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            width: default_map_width(),
            height: default_map_height(),
            resolution: default_resolution(),
            decay_factor: default_decay_factor(),
            occupied_threshold: default_occupied_threshold(),
            sensor_accuracy: default_sensor_accuracy(),
            max_sensor_range: default_max_sensor_range(),
        }
    }
}

/// Range-sensor ring parameters
#[derive(Clone, Debug, Deserialize)]
pub struct SensorConfig {
    /// Number of range sensors spaced evenly around the robot (default: 8)
    #[serde(default = "default_sensor_count")]
    pub sensor_count: usize,

    /// Rolling window of readings kept per sensor (default: 5)
    #[serde(default = "default_history_size")]
    pub history_size: usize,

    /// Reading variance above which a sensor is flagged as seeing a
    /// moving obstacle (default: 0.2)
    #[serde(default = "default_motion_variance_threshold")]
    pub motion_variance_threshold: f32,

    /// Elevated accuracy used when force-marking moving obstacle cells
    /// (default: 0.95)
    #[serde(default = "default_moving_obstacle_accuracy")]
    pub moving_obstacle_accuracy: f32,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            sensor_count: default_sensor_count(),
            history_size: default_history_size(),
            motion_variance_threshold: default_motion_variance_threshold(),
            moving_obstacle_accuracy: default_moving_obstacle_accuracy(),
        }
    }
}

/// Path-following and reactive-avoidance parameters
#[derive(Clone, Debug, Deserialize)]
pub struct ControlConfig {
    /// Distance at which a waypoint counts as reached, meters (default: 0.2)
    #[serde(default = "default_waypoint_threshold")]
    pub waypoint_threshold: f32,

    /// Range below which a forward obstacle triggers the reactive
    /// override, meters (default: 0.5)
    #[serde(default = "default_obstacle_threshold")]
    pub obstacle_threshold: f32,

    /// Minimum distance from the nearest node before a new topological
    /// node is spawned, meters (default: 1.0)
    #[serde(default = "default_node_spacing")]
    pub node_spacing: f32,

    /// Radius within which new nodes auto-connect to existing ones,
    /// meters (default: 2.0)
    #[serde(default = "default_auto_connect_radius")]
    pub auto_connect_radius: f32,

    /// Forward velocity gain, m/s at zero heading error (default: 0.3)
    #[serde(default = "default_linear_gain")]
    pub linear_gain: f32,

    /// Proportional gain on heading error, 1/s (default: 0.5)
    #[serde(default = "default_angular_gain")]
    pub angular_gain: f32,

    /// Half-angle of the forward cone scanned for obstacles, radians
    /// (default: 0.5)
    #[serde(default = "default_forward_cone")]
    pub forward_cone: f32,

    /// Turn rate commanded while dodging an obstacle, rad/s (default: 0.5)
    #[serde(default = "default_avoid_turn_rate")]
    pub avoid_turn_rate: f32,

    /// Sampling interval for path validity checks, meters (default: 0.1)
    #[serde(default = "default_path_check_step")]
    pub path_check_step: f32,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            waypoint_threshold: default_waypoint_threshold(),
            obstacle_threshold: default_obstacle_threshold(),
            node_spacing: default_node_spacing(),
            auto_connect_radius: default_auto_connect_radius(),
            linear_gain: default_linear_gain(),
            angular_gain: default_angular_gain(),
            forward_cone: default_forward_cone(),
            avoid_turn_rate: default_avoid_turn_rate(),
            path_check_step: default_path_check_step(),
        }
    }
}

fn default_map_width() -> f32 {
    20.0
}

fn default_map_height() -> f32 {
    20.0
}

fn default_resolution() -> f32 {
    0.1
}

fn default_decay_factor() -> f32 {
    0.01
}

fn default_occupied_threshold() -> f32 {
    0.7
}

fn default_sensor_accuracy() -> f32 {
    0.9
}

fn default_max_sensor_range() -> f32 {
    4.0
}

fn default_sensor_count() -> usize {
    8
}

fn default_history_size() -> usize {
    5
}

fn default_motion_variance_threshold() -> f32 {
    0.2
}

fn default_moving_obstacle_accuracy() -> f32 {
    0.95
}

fn default_waypoint_threshold() -> f32 {
    0.2
}

fn default_obstacle_threshold() -> f32 {
    0.5
}

fn default_node_spacing() -> f32 {
    1.0
}

fn default_auto_connect_radius() -> f32 {
    2.0
}

fn default_linear_gain() -> f32 {
    0.3
}

fn default_angular_gain() -> f32 {
    0.5
}

fn default_forward_cone() -> f32 {
    0.5
}

fn default_avoid_turn_rate() -> f32 {
    0.5
}

fn default_path_check_step() -> f32 {
    0.1
}
