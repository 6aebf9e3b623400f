//! Greedy best-first search over the topological graph.
//!
//! The search is guided purely by straight-line distance to the goal node;
//! no accumulated path cost is tracked and visited nodes are never
//! reopened. With a known goal location this reaches it quickly, at the
//! price of sometimes returning a longer-than-optimal route. That
//! trade-off is intentional: the controller replans continuously, so a
//! fast usable route beats a slow optimal one.

use crate::graph::{HybridMap, NodeId};
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};

/// Frontier entry ordered by heuristic value.
#[derive(Clone, Debug)]
struct FrontierNode {
    id: NodeId,
    h: f32,
}

impl PartialEq for FrontierNode {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for FrontierNode {}

impl Ord for FrontierNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap (lower h = higher priority)
        other.h.partial_cmp(&self.h).unwrap_or(Ordering::Equal)
    }
}

impl PartialOrd for FrontierNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Find a route from `start` to `goal` by greedy best-first search.
///
/// Returns the node sequence from start to goal inclusive, or `None` when
/// either id is absent or the frontier empties without reaching the goal.
/// Ties between equal heuristic values break arbitrarily.
pub fn find_path(map: &HybridMap, start: NodeId, goal: NodeId) -> Option<Vec<NodeId>> {
    let start_node = map.node(start)?;
    let goal_pos = map.node(goal)?.position;

    let mut frontier = BinaryHeap::new();
    let mut visited: HashSet<NodeId> = HashSet::new();
    let mut h_score: HashMap<NodeId, f32> = HashMap::new();
    let mut came_from: HashMap<NodeId, NodeId> = HashMap::new();

    let h0 = start_node.position.distance(&goal_pos);
    h_score.insert(start, h0);
    frontier.push(FrontierNode { id: start, h: h0 });

    while let Some(FrontierNode { id: current, .. }) = frontier.pop() {
        if current == goal {
            return Some(reconstruct_path(&came_from, start, goal));
        }

        // Stale heap entries for already-expanded nodes are skipped here
        // instead of being removed eagerly.
        if !visited.insert(current) {
            continue;
        }

        for edge in map.node(current)?.edges() {
            let neighbor = edge.target;
            if visited.contains(&neighbor) {
                continue;
            }

            let h = map.node(neighbor)?.position.distance(&goal_pos);

            match h_score.get(&neighbor) {
                None => {
                    h_score.insert(neighbor, h);
                    came_from.insert(neighbor, current);
                    frontier.push(FrontierNode { id: neighbor, h });
                }
                // Re-record only on a strictly better heuristic. The
                // heuristic depends on the node alone, so this branch is
                // effectively a no-op, but the frontier stays
                // heuristic-only, never cost-aware.
                Some(&prev) if h < prev => {
                    h_score.insert(neighbor, h);
                    came_from.insert(neighbor, current);
                    frontier.push(FrontierNode { id: neighbor, h });
                }
                Some(_) => {}
            }
        }
    }

    log::debug!("no route from node {start} to node {goal}");
    None
}

/// Walk predecessors back from the goal and reverse.
fn reconstruct_path(came_from: &HashMap<NodeId, NodeId>, start: NodeId, goal: NodeId) -> Vec<NodeId> {
    let mut path = Vec::new();
    let mut current = goal;
    while let Some(&prev) = came_from.get(&current) {
        path.push(current);
        current = prev;
    }
    path.push(start);
    path.reverse();
    path
}
