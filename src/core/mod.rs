//! Fundamental geometry types shared by all navigation components.

pub mod math;
mod point;
mod pose;

pub use point::Point2D;
pub use pose::Pose2D;
