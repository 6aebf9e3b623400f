//! Navigation controller and its command/status types.
//!
//! This module owns the full sense→map→plan→control tick: sensor
//! ingestion, map growth, replanning and the reactive velocity command.

mod controller;

pub use controller::NavigationController;

use std::fmt;

/// A differential-drive velocity command.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct VelocityCommand {
    /// Forward velocity in m/s
    pub linear: f32,
    /// Counter-clockwise angular velocity in rad/s
    pub angular: f32,
}

impl VelocityCommand {
    /// Full stop.
    pub const STOP: VelocityCommand = VelocityCommand {
        linear: 0.0,
        angular: 0.0,
    };

    /// Create a new command.
    #[inline]
    pub fn new(linear: f32, angular: f32) -> Self {
        Self { linear, angular }
    }
}

/// Outcome of one navigation tick.
///
/// Every variant is non-fatal: a degraded tick reports its status and the
/// caller simply drives the next tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum NavStatus {
    /// No goal has been set; nothing to do.
    NoGoal,
    /// Planning or replanning failed this tick; retry after the pose or
    /// map changes.
    PlanningFailed,
    /// The robot is within the arrival tolerance of the goal.
    GoalReached,
    /// En route, carrying the velocity command for this tick.
    Moving(VelocityCommand),
}

impl fmt::Display for NavStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NavStatus::NoGoal => write!(f, "no goal set"),
            NavStatus::PlanningFailed => write!(f, "path planning failed, will retry next tick"),
            NavStatus::GoalReached => write!(f, "goal reached"),
            NavStatus::Moving(cmd) => write!(
                f,
                "moving: linear={:.2}, angular={:.2}",
                cmd.linear, cmd.angular
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_display() {
        assert_eq!(NavStatus::NoGoal.to_string(), "no goal set");
        assert_eq!(NavStatus::GoalReached.to_string(), "goal reached");
        assert_eq!(
            NavStatus::Moving(VelocityCommand::new(0.3, -0.15)).to_string(),
            "moving: linear=0.30, angular=-0.15"
        );
    }

    #[test]
    fn test_stop_command() {
        assert_eq!(VelocityCommand::STOP, VelocityCommand::new(0.0, 0.0));
    }
}
