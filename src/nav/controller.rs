//! The navigation controller: owns the map, the detector and the
//! navigation state, and orchestrates the per-tick pipeline.

use super::{NavStatus, VelocityCommand};
use crate::config::{ControlConfig, NavConfig, SensorConfig};
use crate::core::math::normalize_angle;
use crate::core::{Point2D, Pose2D};
use crate::detector::{ObstacleDetector, SensorReading};
use crate::error::Result;
use crate::graph::{HybridMap, NodeId};
use crate::grid::OccupancyGrid;
use crate::planning;
use std::f32::consts::PI;

/// Perception-to-motion controller for a single robot.
///
/// The caller drives the tick sequence: [`update_position`], then
/// [`update_sensor_data`], then [`navigate_to_goal`]. All state lives in
/// this one object and every operation runs to completion synchronously;
/// the design assumes exactly one logical thread owns the controller.
///
/// [`update_position`]: NavigationController::update_position
/// [`update_sensor_data`]: NavigationController::update_sensor_data
/// [`navigate_to_goal`]: NavigationController::navigate_to_goal
pub struct NavigationController {
    map: HybridMap,
    detector: ObstacleDetector,
    pose: Pose2D,
    goal: Option<Point2D>,
    path: Option<Vec<NodeId>>,
    control: ControlConfig,
    sensor: SensorConfig,
}

impl NavigationController {
    /// Create a controller from a configuration.
    ///
    /// The topological graph starts with a single node at the origin so
    /// that the first planning attempt always has a start anchor.
    pub fn new(config: NavConfig) -> Self {
        let grid = OccupancyGrid::from_config(&config.map);
        let mut map = HybridMap::new(grid, config.control.auto_connect_radius);
        map.add_node(0.0, 0.0);

        let detector =
            ObstacleDetector::new(config.sensor.sensor_count, config.sensor.history_size);

        Self {
            map,
            detector,
            pose: Pose2D::identity(),
            goal: None,
            path: None,
            control: config.control,
            sensor: config.sensor,
        }
    }

    /// Set a new navigation target and return its graph anchor.
    ///
    /// When every existing node is more than the node-spacing away, a new
    /// node is created at the goal and connected to the nearest one so the
    /// goal stays reachable. The raw coordinates, not the anchor id, are
    /// what navigation steers toward.
    pub fn set_goal(&mut self, x: f32, y: f32) -> NodeId {
        self.goal = Some(Point2D::new(x, y));
        log::info!("goal set to ({x:.2}, {y:.2})");

        let nearest = self.map.find_nearest_node(x, y);
        match nearest {
            Some((id, dist)) if dist <= self.control.node_spacing => id,
            _ => {
                let goal_id = self.map.add_node(x, y);
                if let Some((nearest_id, _)) = nearest
                    && let Err(e) = self.map.connect_nodes(nearest_id, goal_id)
                {
                    log::warn!("failed to anchor goal node: {e}");
                }
                goal_id
            }
        }
    }

    /// Update the robot pose from odometry/localization.
    ///
    /// The graph grows as the robot explores: whenever the nearest node
    /// falls behind by more than the node-spacing, a new node is dropped
    /// at the current position and linked back to it.
    pub fn update_position(&mut self, x: f32, y: f32, orientation: f32) {
        self.pose = Pose2D::new(x, y, orientation);

        let nearest = self.map.find_nearest_node(x, y);
        let too_far = nearest.is_none_or(|(_, dist)| dist > self.control.node_spacing);
        if too_far {
            let id = self.map.add_node(x, y);
            if let Some((nearest_id, _)) = nearest
                && let Err(e) = self.map.connect_nodes(nearest_id, id)
            {
                log::warn!("failed to link exploration node: {e}");
            }
        }
    }

    /// Ingest one ring of raw sensor readings.
    ///
    /// Hard-fails on a reading-count mismatch with no state change.
    /// Otherwise the grid is fused and decayed at the current pose, and
    /// every sensor classified as watching a moving obstacle force-marks
    /// its hit cell occupied at elevated accuracy.
    pub fn update_sensor_data(&mut self, readings: &[SensorReading]) -> Result<()> {
        self.detector.update_readings(readings)?;

        let sensor_data = self.detector.get_sensor_data();
        let position = self.pose.position();
        self.map.update_grid(position, &sensor_data);

        for obstacle in self
            .detector
            .detect_moving_obstacles(self.sensor.motion_variance_threshold)
        {
            let hit = position.point_at(obstacle.angle, obstacle.distance);
            log::debug!(
                "moving obstacle at ({:.2}, {:.2}), variance {:.3}",
                hit.x,
                hit.y,
                obstacle.variance
            );
            self.map
                .grid_mut()
                .update_cell(hit.x, hit.y, true, self.sensor.moving_obstacle_accuracy);
        }

        Ok(())
    }

    /// Plan (or replan) a route to the stored goal.
    ///
    /// Both endpoints resolve to their nearest graph anchors. Returns
    /// whether a path is now held; failure is soft and leaves no path.
    pub fn plan_path(&mut self) -> bool {
        let Some(goal) = self.goal else {
            return false;
        };
        let position = self.pose.position();

        let start_anchor = self.map.find_nearest_node(position.x, position.y);
        let goal_anchor = self.map.find_nearest_node(goal.x, goal.y);
        let (Some((start_id, _)), Some((goal_id, _))) = (start_anchor, goal_anchor) else {
            return false;
        };

        self.path = planning::find_path(&self.map, start_id, goal_id);
        match &self.path {
            Some(path) => {
                log::info!("planned route with {} waypoints", path.len());
                true
            }
            None => {
                log::warn!("no route from node {start_id} to node {goal_id}");
                false
            }
        }
    }

    /// Position of the next steering target: the path's second node.
    ///
    /// `None` when no path is held or it has fewer than two nodes.
    pub fn get_next_waypoint(&self) -> Option<Point2D> {
        let path = self.path.as_ref()?;
        if path.len() <= 1 {
            return None;
        }
        self.map.node(path[1]).map(|node| node.position)
    }

    /// Check the held path against the current grid.
    ///
    /// Samples every consecutive segment at the configured step and fails
    /// the whole path on the first occupied sample. Returns false when no
    /// path is held.
    pub fn check_path_validity(&self) -> bool {
        let Some(path) = &self.path else {
            return false;
        };

        for pair in path.windows(2) {
            let (Some(a), Some(b)) = (self.map.node(pair[0]), self.map.node(pair[1])) else {
                return false;
            };

            let length = a.position.distance(&b.position);
            let steps = (length / self.control.path_check_step) as usize + 1;

            for j in 0..steps {
                let ratio = j as f32 / steps as f32;
                let sample = a.position + (b.position - a.position) * ratio;
                if self.map.grid().is_occupied(sample.x, sample.y) {
                    log::debug!(
                        "path blocked near ({:.2}, {:.2}) between nodes {} and {}",
                        sample.x,
                        sample.y,
                        pair[0],
                        pair[1]
                    );
                    return false;
                }
            }
        }

        true
    }

    /// Whether the robot is within the arrival tolerance of the goal.
    ///
    /// The tolerance is the waypoint threshold with 20% slack.
    pub fn is_goal_reached(&self) -> bool {
        let Some(goal) = self.goal else {
            return false;
        };
        let distance = self.pose.position().distance(&goal);
        distance < self.control.waypoint_threshold * 1.2
    }

    /// Compute the reactive velocity command for this tick.
    ///
    /// Proportional steering toward the next waypoint, slowing with turn
    /// sharpness, overridden by an avoidance turn when any sensor reports
    /// an obstacle inside the forward cone and reaction range.
    pub fn calculate_movement_commands(&self) -> VelocityCommand {
        if self.is_goal_reached() || self.path.is_none() {
            return VelocityCommand::STOP;
        }
        let Some(waypoint) = self.get_next_waypoint() else {
            return VelocityCommand::STOP;
        };

        let position = self.pose.position();
        let target_heading = position.angle_to(&waypoint);
        let heading_error = normalize_angle(target_heading - self.pose.theta);

        let mut angular = self.control.angular_gain * heading_error;
        // Slow down proportionally to turn sharpness to avoid overshooting.
        let mut linear = self.control.linear_gain * (1.0 - heading_error.abs() / PI).max(0.0);

        // Reactive override: first sensor in index order seeing something
        // close inside the forward cone wins.
        for (angle, reading) in self.detector.get_sensor_data() {
            let Some(distance) = reading else {
                continue;
            };

            let relative = normalize_angle(angle - self.pose.theta);
            if relative.abs() < self.control.forward_cone
                && distance < self.control.obstacle_threshold
            {
                linear = 0.0;
                // Turn away from the obstacle's side.
                angular = if relative >= 0.0 {
                    self.control.avoid_turn_rate
                } else {
                    -self.control.avoid_turn_rate
                };
                log::debug!(
                    "obstacle {distance:.2} m ahead at {relative:.2} rad, dodging"
                );
                break;
            }
        }

        VelocityCommand::new(linear, angular)
    }

    /// Run one navigation tick.
    ///
    /// Replans when no path is held or the held one has been invalidated;
    /// a replanning failure is reported and retried on a later tick.
    /// Consumes the leading waypoint once the robot is within the waypoint
    /// threshold, as long as more than two nodes remain.
    pub fn navigate_to_goal(&mut self) -> NavStatus {
        if self.goal.is_none() {
            return NavStatus::NoGoal;
        }

        if (self.path.is_none() || !self.check_path_validity()) && !self.plan_path() {
            return NavStatus::PlanningFailed;
        }

        if self.is_goal_reached() {
            log::info!("goal reached");
            return NavStatus::GoalReached;
        }

        let command = self.calculate_movement_commands();

        if let Some(waypoint) = self.get_next_waypoint() {
            let distance = self.pose.position().distance(&waypoint);
            if distance < self.control.waypoint_threshold
                && let Some(path) = &mut self.path
                && path.len() > 2
            {
                log::debug!("waypoint reached, advancing along path");
                path.remove(0);
            }
        }

        NavStatus::Moving(command)
    }

    /// Current robot pose.
    #[inline]
    pub fn pose(&self) -> Pose2D {
        self.pose
    }

    /// Current navigation target, if any.
    #[inline]
    pub fn goal(&self) -> Option<Point2D> {
        self.goal
    }

    /// The currently held path, if any.
    #[inline]
    pub fn current_path(&self) -> Option<&[NodeId]> {
        self.path.as_deref()
    }

    /// The hybrid map owned by this controller.
    #[inline]
    pub fn map(&self) -> &HybridMap {
        &self.map
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn small_config() -> NavConfig {
        NavConfig::from_toml_str(
            r#"
            [map]
            width = 10.0
            height = 10.0
            "#,
        )
        .unwrap()
    }

    fn controller() -> NavigationController {
        NavigationController::new(small_config())
    }

    #[test]
    fn test_starts_with_origin_node_and_no_goal() {
        let mut nav = controller();
        assert_eq!(nav.map().node_count(), 1);
        assert!(nav.goal().is_none());
        assert_eq!(nav.navigate_to_goal(), NavStatus::NoGoal);
        assert!(!nav.plan_path());
    }

    #[test]
    fn test_set_goal_far_away_spawns_connected_node() {
        let mut nav = controller();
        let goal_id = nav.set_goal(3.0, 0.0);

        assert_eq!(goal_id, 1);
        assert_eq!(nav.map().node_count(), 2);
        // Distance 3.0 exceeds the auto-connect radius, but set_goal links
        // the new anchor explicitly.
        let edges = nav.map().node(goal_id).unwrap().edges();
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].target, 0);
    }

    #[test]
    fn test_set_goal_near_existing_node_reuses_it() {
        let mut nav = controller();
        let goal_id = nav.set_goal(0.5, 0.0);
        assert_eq!(goal_id, 0);
        assert_eq!(nav.map().node_count(), 1);
    }

    #[test]
    fn test_update_position_grows_graph_while_exploring() {
        let mut nav = controller();
        nav.update_position(0.5, 0.0, 0.0);
        assert_eq!(nav.map().node_count(), 1); // still near node 0

        nav.update_position(1.5, 0.0, 0.0);
        assert_eq!(nav.map().node_count(), 2); // spawned and linked

        let new_node = nav.map().node(1).unwrap();
        assert!(new_node.edges().iter().any(|e| e.target == 0));
    }

    #[test]
    fn test_sensor_mismatch_is_rejected() {
        let mut nav = controller();
        let err = nav.update_sensor_data(&[Some(1.0); 3]).unwrap_err();
        assert!(matches!(
            err,
            crate::error::NavError::SensorCountMismatch { expected: 8, .. }
        ));
    }

    #[test]
    fn test_goal_reached_tolerance() {
        let mut nav = controller();
        nav.set_goal(1.0, 0.0);

        nav.update_position(0.765, 0.0, 0.0); // 0.235 away, < 0.2 * 1.2
        assert!(nav.is_goal_reached());

        nav.update_position(0.75, 0.0, 0.0); // 0.25 away, >= 0.24
        assert!(!nav.is_goal_reached());
    }

    #[test]
    fn test_plan_path_without_goal_fails() {
        let mut nav = controller();
        assert!(!nav.plan_path());
        assert!(nav.current_path().is_none());
    }

    #[test]
    fn test_plan_and_follow_direct_goal() {
        let mut nav = controller();
        nav.set_goal(1.5, 0.0);
        assert!(nav.plan_path());

        let path = nav.current_path().unwrap();
        assert_eq!(path, &[0, 1]);

        let waypoint = nav.get_next_waypoint().unwrap();
        assert_relative_eq!(waypoint.x, 1.5, epsilon = 1e-6);
        assert_relative_eq!(waypoint.y, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_next_waypoint_requires_two_nodes() {
        let mut nav = controller();
        nav.set_goal(0.5, 0.0); // anchors to node 0
        nav.plan_path();
        assert_eq!(nav.current_path().unwrap(), &[0]);
        assert!(nav.get_next_waypoint().is_none());
    }

    #[test]
    fn test_movement_steers_toward_waypoint() {
        let mut nav = controller();
        nav.set_goal(1.5, 0.0);
        nav.plan_path();

        // Facing the waypoint: full speed, no turn.
        let cmd = nav.calculate_movement_commands();
        assert_relative_eq!(cmd.linear, 0.3, epsilon = 1e-5);
        assert_relative_eq!(cmd.angular, 0.0, epsilon = 1e-5);

        // Facing 90° off: slower, turning right (negative error).
        nav.update_position(0.0, 0.0, std::f32::consts::FRAC_PI_2);
        let cmd = nav.calculate_movement_commands();
        assert!(cmd.linear < 0.3);
        assert!(cmd.angular < 0.0);
        assert_relative_eq!(
            cmd.angular,
            0.5 * -std::f32::consts::FRAC_PI_2,
            epsilon = 1e-5
        );
    }

    #[test]
    fn test_reactive_override_stops_and_turns() {
        let mut nav = controller();
        nav.set_goal(1.5, 0.0);
        nav.plan_path();

        // Sensor 0 looks straight ahead (angle 0) and sees something at
        // 0.3 m, inside the 0.5 m reaction range and the forward cone.
        let mut readings = vec![None; 8];
        readings[0] = Some(0.3);
        nav.update_sensor_data(&readings).unwrap();

        let cmd = nav.calculate_movement_commands();
        assert_eq!(cmd.linear, 0.0);
        // Relative bearing 0 counts as the left side.
        assert_relative_eq!(cmd.angular, 0.5);
    }

    #[test]
    fn test_obstacle_outside_cone_is_ignored() {
        let mut nav = controller();
        nav.set_goal(1.5, 0.0);
        nav.plan_path();

        // Sensor 2 points at π/2, well outside the ±0.5 rad cone.
        let mut readings = vec![None; 8];
        readings[2] = Some(0.3);
        nav.update_sensor_data(&readings).unwrap();

        let cmd = nav.calculate_movement_commands();
        assert!(cmd.linear > 0.0);
    }

    #[test]
    fn test_navigate_tick_reports_moving_then_reached() {
        let mut nav = controller();
        nav.set_goal(1.5, 0.0);

        match nav.navigate_to_goal() {
            NavStatus::Moving(cmd) => assert!(cmd.linear > 0.0),
            other => panic!("expected Moving, got {other:?}"),
        }

        nav.update_position(1.45, 0.0, 0.0);
        assert_eq!(nav.navigate_to_goal(), NavStatus::GoalReached);
    }

    #[test]
    fn test_waypoint_consumption_advances_path() {
        let mut nav = controller();
        // Explore a three-node chain, then plan along it from the origin.
        nav.update_position(1.5, 0.0, 0.0); // node 1
        nav.update_position(3.0, 0.0, 0.0); // node 2
        nav.set_goal(3.0, 0.0);

        nav.update_position(0.1, 0.0, 0.0); // anchors back to node 0
        assert!(nav.plan_path());
        assert_eq!(nav.current_path().unwrap(), &[0, 1, 2]);

        // Within the waypoint threshold of node 1 with three nodes held:
        // the consumed leading waypoint is dropped.
        nav.update_position(1.45, 0.0, 0.0);
        match nav.navigate_to_goal() {
            NavStatus::Moving(_) => {}
            other => panic!("expected Moving, got {other:?}"),
        }
        assert_eq!(nav.current_path().unwrap(), &[1, 2]);

        // With only two nodes left the path is never shrunk further.
        match nav.navigate_to_goal() {
            NavStatus::Moving(_) => {}
            other => panic!("expected Moving, got {other:?}"),
        }
        assert_eq!(nav.current_path().unwrap(), &[1, 2]);
    }

    #[test]
    fn test_path_invalidated_by_blocking_obstacle() {
        let mut nav = controller();
        nav.set_goal(1.5, 0.0);
        assert!(nav.plan_path());
        assert!(nav.check_path_validity());

        // Hammer the midpoint of the segment until it reads occupied.
        for _ in 0..5 {
            nav.map.grid_mut().update_cell(0.75, 0.0, true, 0.9);
        }
        assert!(!nav.check_path_validity());
    }
}
