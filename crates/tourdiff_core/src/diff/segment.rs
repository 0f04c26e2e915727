use std::fmt;

use crate::tour::Edge;

/// Ordered record of one alternating walk through the difference graph.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Segment {
    pub start: usize,
    pub end: usize,
    pub dels: Vec<Edge>,
    pub adds: Vec<Edge>,
}

impl Segment {
    pub fn is_cyclic(&self) -> bool {
        self.start == self.end
    }

    pub fn is_balanced(&self) -> bool {
        self.dels.len() == self.adds.len()
    }

    /// Cyclic and balanced: applicable on its own.
    pub fn is_kmove(&self) -> bool {
        self.is_cyclic() && self.is_balanced()
    }

    /// Cyclic but one edge short on one side; needs a partner at the same node.
    pub fn is_trivial(&self) -> bool {
        self.is_cyclic() && !self.is_balanced()
    }

    /// The endpoint that is not `node`.
    pub fn other_end(&self, node: usize) -> usize {
        if self.start == node {
            self.end
        } else {
            self.start
        }
    }

    pub(crate) fn append_edges(&mut self, other: Segment) {
        self.dels.extend(other.dels);
        self.adds.extend(other.adds);
    }

    pub fn into_kmove(self) -> KMove {
        KMove {
            dels: self.dels,
            adds: self.adds,
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}->{} dels={} adds={}",
            self.start,
            self.end,
            self.dels.len(),
            self.adds.len()
        )
    }
}

/// Edges to delete from and add to a tour as one unit.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KMove {
    pub dels: Vec<Edge>,
    pub adds: Vec<Edge>,
}

impl KMove {
    pub fn new(dels: Vec<Edge>, adds: Vec<Edge>) -> Self {
        Self { dels, adds }
    }

    /// Number of edges exchanged; a 2-opt move has `k == 2`.
    pub fn k(&self) -> usize {
        self.dels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dels.is_empty() && self.adds.is_empty()
    }

    pub fn absorb(&mut self, other: KMove) {
        self.dels.extend(other.dels);
        self.adds.extend(other.adds);
    }

    /// Union of several moves into one.
    pub fn combine(moves: impl IntoIterator<Item = KMove>) -> Self {
        let mut combined = Self::default();
        for kmove in moves {
            combined.absorb(kmove);
        }
        combined
    }

    /// Same move with both edge lists sorted, for order-independent comparison.
    pub fn normalized(mut self) -> Self {
        self.dels.sort_unstable();
        self.adds.sort_unstable();
        self
    }
}

impl From<Segment> for KMove {
    fn from(segment: Segment) -> Self {
        segment.into_kmove()
    }
}

impl fmt::Display for KMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-opt dels=[", self.k())?;
        write_edges(f, &self.dels)?;
        f.write_str("] adds=[")?;
        write_edges(f, &self.adds)?;
        f.write_str("]")
    }
}

fn write_edges(f: &mut fmt::Formatter<'_>, edges: &[Edge]) -> fmt::Result {
    for (idx, edge) in edges.iter().enumerate() {
        if idx > 0 {
            f.write_str(" ")?;
        }
        write!(f, "{edge}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{KMove, Segment};
    use crate::tour::Edge;

    fn segment(start: usize, end: usize, dels: usize, adds: usize) -> Segment {
        Segment {
            start,
            end,
            dels: (0..dels).map(|i| Edge::new(i, i + 1)).collect(),
            adds: (0..adds).map(|i| Edge::new(i, i + 2)).collect(),
        }
    }

    #[test]
    fn classification_predicates() {
        assert!(segment(3, 3, 2, 2).is_kmove());
        assert!(segment(3, 3, 1, 2).is_trivial());
        assert!(!segment(3, 4, 2, 2).is_cyclic());
        assert!(!segment(3, 4, 2, 2).is_trivial());
    }

    #[test]
    fn other_end_returns_far_endpoint() {
        let s = segment(2, 7, 1, 1);
        assert_eq!(s.other_end(2), 7);
        assert_eq!(s.other_end(7), 2);
    }

    #[test]
    fn combine_concatenates_edges_in_order() {
        let a = KMove::new(vec![Edge::new(0, 1)], vec![Edge::new(0, 2)]);
        let b = KMove::new(vec![Edge::new(5, 6)], vec![Edge::new(5, 7)]);
        let combined = KMove::combine([a, b]);

        assert_eq!(combined.dels, vec![Edge::new(0, 1), Edge::new(5, 6)]);
        assert_eq!(combined.adds, vec![Edge::new(0, 2), Edge::new(5, 7)]);
        assert_eq!(combined.k(), 2);
        assert!(KMove::combine(Vec::new()).is_empty());
    }

    #[test]
    fn display_lists_edges() {
        let kmove = KMove::new(
            vec![Edge::new(1, 0), Edge::new(2, 3)],
            vec![Edge::new(0, 2), Edge::new(1, 3)],
        );
        assert_eq!(
            kmove.to_string(),
            "2-opt dels=[(0,1) (2,3)] adds=[(0,2) (1,3)]"
        );
    }
}
