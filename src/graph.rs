//! Hybrid grid-topological map.
//!
//! A sparse graph of waypoint nodes layered over the occupancy grid. The
//! graph grows monotonically as the robot explores: nodes are appended and
//! never removed, so a [`NodeId`] stays valid for the lifetime of the map.
//! The grid is consulted only for occupancy queries (path validation); the
//! graph's own structure is purely metric.

use crate::core::Point2D;
use crate::error::{NavError, Result};
use crate::grid::OccupancyGrid;

/// Stable index of a topological node in the map's arena.
pub type NodeId = usize;

/// A symmetric connection between two nodes.
#[derive(Clone, Copy, Debug)]
pub struct Edge {
    /// Neighbor node id
    pub target: NodeId,
    /// Euclidean distance between the endpoints, meters
    pub distance: f32,
}

/// A waypoint node in the topological graph.
#[derive(Clone, Debug)]
pub struct TopoNode {
    /// This node's id
    pub id: NodeId,
    /// World position of the waypoint
    pub position: Point2D,
    edges: Vec<Edge>,
}

impl TopoNode {
    fn new(id: NodeId, position: Point2D) -> Self {
        Self {
            id,
            position,
            edges: Vec::new(),
        }
    }

    /// Connected neighbors in insertion order.
    #[inline]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Add an edge toward `target`. Self-links and duplicate targets are
    /// ignored, keeping the edge list a set.
    fn add_edge(&mut self, target: NodeId, distance: f32) {
        if target == self.id {
            return;
        }
        if self.edges.iter().any(|e| e.target == target) {
            return;
        }
        self.edges.push(Edge { target, distance });
    }
}

/// Occupancy grid plus topological waypoint graph.
#[derive(Clone, Debug)]
pub struct HybridMap {
    grid: OccupancyGrid,
    nodes: Vec<TopoNode>,
    auto_connect_radius: f32,
}

impl HybridMap {
    /// Create a hybrid map over the given grid.
    ///
    /// `auto_connect_radius` is the strict distance bound under which
    /// newly added nodes connect to existing ones.
    pub fn new(grid: OccupancyGrid, auto_connect_radius: f32) -> Self {
        Self {
            grid,
            nodes: Vec::new(),
            auto_connect_radius,
        }
    }

    /// Append a new node at (x, y) and return its id.
    ///
    /// The node is symmetrically connected to every existing node strictly
    /// closer than the auto-connect radius. The scan is linear in node
    /// count, which keeps the structure simple at exploration scales.
    pub fn add_node(&mut self, x: f32, y: f32) -> NodeId {
        let id = self.nodes.len();
        let position = Point2D::new(x, y);
        let mut node = TopoNode::new(id, position);

        for other in &mut self.nodes {
            let dist = position.distance(&other.position);
            if dist < self.auto_connect_radius {
                node.add_edge(other.id, dist);
                other.add_edge(id, dist);
            }
        }

        log::debug!(
            "added node {id} at ({x:.2}, {y:.2}) with {} connections",
            node.edges.len()
        );
        self.nodes.push(node);
        id
    }

    /// Explicitly connect two existing nodes, bypassing the auto-connect
    /// radius. Fails with [`NavError::UnknownNode`] if either id is absent.
    pub fn connect_nodes(&mut self, a: NodeId, b: NodeId) -> Result<()> {
        if a >= self.nodes.len() {
            return Err(NavError::UnknownNode(a));
        }
        if b >= self.nodes.len() {
            return Err(NavError::UnknownNode(b));
        }

        let distance = self.nodes[a].position.distance(&self.nodes[b].position);
        self.nodes[a].add_edge(b, distance);
        self.nodes[b].add_edge(a, distance);
        Ok(())
    }

    /// Find the node closest to (x, y) by linear scan.
    ///
    /// Returns `None` on an empty graph (distance is infinite by
    /// convention).
    pub fn find_nearest_node(&self, x: f32, y: f32) -> Option<(NodeId, f32)> {
        let query = Point2D::new(x, y);
        let mut nearest: Option<(NodeId, f32)> = None;

        for node in &self.nodes {
            let distance = node.position.distance(&query);
            if nearest.is_none_or(|(_, best)| distance < best) {
                nearest = Some((node.id, distance));
            }
        }

        nearest
    }

    /// Fuse a ring of sensor readings into the grid, then apply one step
    /// of time decay. Decay is tied to the sensing cadence, so the two
    /// always run together.
    pub fn update_grid(&mut self, position: Point2D, readings: &[(f32, Option<f32>)]) {
        self.grid.update_from_sensor_data(position, readings);
        self.grid.apply_time_decay();
    }

    /// Look up a node by id.
    #[inline]
    pub fn node(&self, id: NodeId) -> Option<&TopoNode> {
        self.nodes.get(id)
    }

    /// Number of nodes in the graph.
    #[inline]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// The underlying occupancy grid.
    #[inline]
    pub fn grid(&self) -> &OccupancyGrid {
        &self.grid
    }

    /// Mutable access to the occupancy grid.
    #[inline]
    pub fn grid_mut(&mut self) -> &mut OccupancyGrid {
        &mut self.grid
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn empty_map() -> HybridMap {
        HybridMap::new(OccupancyGrid::new(10.0, 10.0, 0.1), 2.0)
    }

    #[test]
    fn test_first_node_gets_id_zero() {
        let mut map = empty_map();
        let id = map.add_node(1.0, 1.0);
        assert_eq!(id, 0);
        assert!(map.node(0).unwrap().edges().is_empty());
    }

    #[test]
    fn test_ids_are_monotonic() {
        let mut map = empty_map();
        assert_eq!(map.add_node(0.0, 0.0), 0);
        assert_eq!(map.add_node(5.0, 5.0), 1);
        assert_eq!(map.add_node(9.0, 9.0), 2);
        assert_eq!(map.node_count(), 3);
    }

    #[test]
    fn test_auto_connect_within_radius() {
        let mut map = empty_map();
        let a = map.add_node(0.0, 0.0);
        let b = map.add_node(1.5, 0.0);

        let edges_a = map.node(a).unwrap().edges();
        assert_eq!(edges_a.len(), 1);
        assert_eq!(edges_a[0].target, b);
        assert_relative_eq!(edges_a[0].distance, 1.5, epsilon = 1e-6);

        // Symmetric
        let edges_b = map.node(b).unwrap().edges();
        assert_eq!(edges_b.len(), 1);
        assert_eq!(edges_b[0].target, a);
    }

    #[test]
    fn test_auto_connect_radius_is_strict() {
        let mut map = empty_map();
        let a = map.add_node(0.0, 0.0);
        let b = map.add_node(2.0, 0.0); // exactly at the radius

        assert!(map.node(a).unwrap().edges().is_empty());
        assert!(map.node(b).unwrap().edges().is_empty());
    }

    #[test]
    fn test_explicit_connect_bypasses_radius() {
        let mut map = empty_map();
        let a = map.add_node(0.0, 0.0);
        let b = map.add_node(8.0, 0.0);

        map.connect_nodes(a, b).unwrap();

        let edges_a = map.node(a).unwrap().edges();
        assert_eq!(edges_a[0].target, b);
        assert_relative_eq!(edges_a[0].distance, 8.0, epsilon = 1e-5);
        assert_eq!(map.node(b).unwrap().edges()[0].target, a);
    }

    #[test]
    fn test_connect_unknown_node_fails() {
        let mut map = empty_map();
        let a = map.add_node(0.0, 0.0);

        let err = map.connect_nodes(a, 7).unwrap_err();
        assert!(matches!(err, NavError::UnknownNode(7)));
        // No half-connection was left behind.
        assert!(map.node(a).unwrap().edges().is_empty());
    }

    #[test]
    fn test_duplicate_connect_is_ignored() {
        let mut map = empty_map();
        let a = map.add_node(0.0, 0.0);
        let b = map.add_node(1.0, 0.0); // auto-connected already

        map.connect_nodes(a, b).unwrap();
        assert_eq!(map.node(a).unwrap().edges().len(), 1);
        assert_eq!(map.node(b).unwrap().edges().len(), 1);
    }

    #[test]
    fn test_find_nearest_on_empty_graph() {
        let map = empty_map();
        assert!(map.find_nearest_node(1.0, 1.0).is_none());
    }

    #[test]
    fn test_find_nearest_picks_closest() {
        let mut map = empty_map();
        map.add_node(0.0, 0.0);
        let b = map.add_node(3.0, 0.0);
        map.add_node(9.0, 9.0);

        let (id, dist) = map.find_nearest_node(3.2, 0.0).unwrap();
        assert_eq!(id, b);
        assert_relative_eq!(dist, 0.2, epsilon = 1e-5);
    }

    #[test]
    fn test_update_grid_fuses_and_decays() {
        let mut map = empty_map();
        let robot = Point2D::new(5.0, 5.0);

        map.update_grid(robot, &[(0.0, Some(1.0))]);

        // Hit fused to 0.9, then one decay step toward 0.5.
        let expected = 0.9 + 0.01 * (0.5 - 0.9);
        assert_relative_eq!(map.grid().probability(6.0, 5.0), expected, epsilon = 1e-5);
    }
}
