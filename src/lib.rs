//! # Disha-Nav: Hybrid Grid-Topological Navigation Core
//!
//! The perception-to-motion core of an indoor mobile robot: noisy range
//! readings are fused into a probabilistic occupancy grid, a sparse
//! topological graph grows over the grid as the robot explores, greedy
//! best-first search finds routes through the graph, and a reactive
//! controller turns the route into velocity commands that also dodge
//! nearby obstacles.
//!
//! ## Quick Start
//!
//! ```rust
//! use disha_nav::{NavConfig, NavigationController, NavStatus};
//!
//! let mut nav = NavigationController::new(NavConfig::default());
//! nav.set_goal(2.0, 1.0);
//!
//! // One control tick: pose in, sensors in, command out.
//! nav.update_position(0.1, 0.0, 0.0);
//! nav.update_sensor_data(&vec![None; 8]).unwrap();
//! match nav.navigate_to_goal() {
//!     NavStatus::Moving(cmd) => println!("v={:.2} w={:.2}", cmd.linear, cmd.angular),
//!     status => println!("{status}"),
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`core`]: geometry primitives (points, poses, angle math)
//! - [`config`]: tuning constants, loadable from TOML
//! - [`grid`]: Bayesian occupancy grid with time decay
//! - [`graph`]: hybrid grid-topological map with monotonic node growth
//! - [`detector`]: sensor ring with variance-based motion classification
//! - [`planning`]: greedy best-first search (heuristic-only, not cost-aware)
//! - [`nav`]: the tick-driven navigation controller
//!
//! The whole pipeline is single-threaded and synchronous: one external
//! scheduler drives `update_position` → `update_sensor_data` →
//! `navigate_to_goal` once per control tick, and time-based map decay
//! advances once per sensing call rather than by wall clock.

pub mod config;
pub mod core;
pub mod detector;
pub mod error;
pub mod graph;
pub mod grid;
pub mod nav;
pub mod planning;

pub use config::{ControlConfig, MapConfig, NavConfig, SensorConfig};
pub use core::{Point2D, Pose2D};
pub use detector::{MovingObstacle, ObstacleDetector, SensorReading};
pub use error::{NavError, Result};
pub use graph::{HybridMap, NodeId, TopoNode};
pub use grid::OccupancyGrid;
pub use nav::{NavStatus, NavigationController, VelocityCommand};
pub use planning::find_path;
