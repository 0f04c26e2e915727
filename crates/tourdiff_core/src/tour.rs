use std::{collections::HashSet, fmt};

use crate::{Error, Result};

/// Smallest node count that forms a cycle with distinct edges.
pub const MIN_CYCLE_NODES: usize = 3;

/// Undirected edge between two distinct nodes, stored with `a < b`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Edge {
    a: usize,
    b: usize,
}

impl Edge {
    pub fn new(u: usize, v: usize) -> Self {
        if u <= v {
            Self { a: u, b: v }
        } else {
            Self { a: v, b: u }
        }
    }

    #[inline]
    pub fn a(self) -> usize {
        self.a
    }

    #[inline]
    pub fn b(self) -> usize {
        self.b
    }
}

impl From<(usize, usize)> for Edge {
    fn from((u, v): (usize, usize)) -> Self {
        Self::new(u, v)
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.a, self.b)
    }
}

/// Edges removed (`dels`) and added (`adds`) when going from one tour to another.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TourDiff {
    pub dels: Vec<Edge>,
    pub adds: Vec<Edge>,
}

impl TourDiff {
    pub fn is_empty(&self) -> bool {
        self.dels.is_empty() && self.adds.is_empty()
    }
}

/// Checks that `tour` visits every node of `0..tour.len()` exactly once.
pub fn validate_tour(tour: &[usize]) -> Result<()> {
    let n = tour.len();
    if n < MIN_CYCLE_NODES {
        return Err(Error::invalid_input(format!(
            "tour has {n} nodes; need at least {MIN_CYCLE_NODES} for a cycle"
        )));
    }
    let mut seen = vec![false; n];
    for &node in tour {
        if node >= n {
            return Err(Error::invalid_input(format!(
                "tour node {node} is out of range for {n} nodes"
            )));
        }
        if std::mem::replace(&mut seen[node], true) {
            return Err(Error::invalid_input(format!(
                "tour visits node {node} more than once"
            )));
        }
    }
    Ok(())
}

/// The `n` edges of a closed tour, in visiting order.
pub fn tour_edges(tour: &[usize]) -> Vec<Edge> {
    let n = tour.len();
    (0..n)
        .map(|i| Edge::new(tour[i], tour[(i + 1) % n]))
        .collect()
}

/// Per-node `[prev, next]` neighbours, indexed by node id.
pub fn adjacency(tour: &[usize]) -> Vec<[usize; 2]> {
    let n = tour.len();
    let mut adj = vec![[0usize; 2]; n];
    for (pos, &node) in tour.iter().enumerate() {
        adj[node] = [tour[(pos + n - 1) % n], tour[(pos + 1) % n]];
    }
    adj
}

/// Symmetric difference of two tours over the same node set.
pub fn tour_difference(old_tour: &[usize], new_tour: &[usize]) -> Result<TourDiff> {
    if old_tour.len() != new_tour.len() {
        return Err(Error::invalid_input(format!(
            "tours differ in size: old={} new={}",
            old_tour.len(),
            new_tour.len()
        )));
    }
    validate_tour(old_tour)?;
    validate_tour(new_tour)?;

    let old_edges: HashSet<Edge> = tour_edges(old_tour).into_iter().collect();
    let new_edges: HashSet<Edge> = tour_edges(new_tour).into_iter().collect();

    let mut dels: Vec<Edge> = old_edges.difference(&new_edges).copied().collect();
    let mut adds: Vec<Edge> = new_edges.difference(&old_edges).copied().collect();
    dels.sort_unstable();
    adds.sort_unstable();

    if dels.len() != adds.len() {
        return Err(Error::consistency(format!(
            "tour difference is unbalanced: dels={} adds={}",
            dels.len(),
            adds.len()
        )));
    }

    Ok(TourDiff { dels, adds })
}

#[cfg(test)]
mod tests {
    use super::{Edge, adjacency, tour_difference, tour_edges, validate_tour};

    #[test]
    fn edge_is_normalized_and_orientation_free() {
        let e = Edge::new(7, 3);
        assert_eq!((e.a(), e.b()), (3, 7));
        assert_eq!(e, Edge::new(3, 7));
        assert_eq!(e, Edge::from((7, 3)));
        assert_eq!(e.to_string(), "(3,7)");
    }

    #[test]
    fn validate_tour_rejects_short_duplicate_and_out_of_range() {
        assert!(validate_tour(&[0, 1]).is_err());
        assert!(validate_tour(&[0, 1, 1]).is_err());
        assert!(validate_tour(&[0, 1, 3]).is_err());
        assert!(validate_tour(&[2, 0, 1]).is_ok());
    }

    #[test]
    fn tour_edges_closes_the_cycle() {
        let edges = tour_edges(&[0, 2, 1]);
        assert_eq!(edges, vec![Edge::new(0, 2), Edge::new(1, 2), Edge::new(0, 1)]);
    }

    #[test]
    fn adjacency_lists_prev_and_next() {
        let adj = adjacency(&[0, 2, 1, 3]);
        assert_eq!(adj[0], [3, 2]);
        assert_eq!(adj[2], [0, 1]);
        assert_eq!(adj[3], [1, 0]);
    }

    #[test]
    fn tour_difference_of_single_swap() {
        let diff = tour_difference(&[0, 1, 2, 3, 4], &[0, 2, 1, 3, 4]).expect("diff");
        assert_eq!(diff.dels, vec![Edge::new(0, 1), Edge::new(2, 3)]);
        assert_eq!(diff.adds, vec![Edge::new(0, 2), Edge::new(1, 3)]);
    }

    #[test]
    fn tour_difference_ignores_rotation_and_direction() {
        let diff = tour_difference(&[0, 1, 2, 3, 4], &[3, 2, 1, 0, 4]).expect("diff");
        assert!(diff.is_empty());
    }

    #[test]
    fn tour_difference_rejects_mismatched_sizes() {
        let err = tour_difference(&[0, 1, 2], &[0, 1, 2, 3]).expect_err("size mismatch");
        assert!(err.to_string().contains("tours differ in size"));
    }
}
