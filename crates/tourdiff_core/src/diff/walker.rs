use std::mem;

use crate::{
    Error, Result,
    diff::{edge_bank::EdgeBank, segment::Segment},
    tour::{Edge, TourDiff},
};

/// Drains an [`EdgeBank`] into segments by alternating addition and deletion edges.
///
/// Walks start at junctions while any are left, so junction-free cycles are
/// only picked up once every junction is consumed. A walk stops as soon as it
/// reaches a junction or its own start.
#[derive(Debug)]
pub struct SegmentWalker {
    bank: EdgeBank,
    start: usize,
    end: usize,
    dels: Vec<Edge>,
    adds: Vec<Edge>,
    last_del_end: Option<usize>,
    last_add_end: Option<usize>,
}

impl SegmentWalker {
    pub fn new(bank: EdgeBank) -> Self {
        Self {
            bank,
            start: 0,
            end: 0,
            dels: Vec::new(),
            adds: Vec::new(),
            last_del_end: None,
            last_add_end: None,
        }
    }

    pub fn from_diff(node_count: usize, diff: &TourDiff) -> Result<Self> {
        Ok(Self::new(EdgeBank::new(node_count, &diff.dels, &diff.adds)?))
    }

    pub fn bank(&self) -> &EdgeBank {
        &self.bank
    }

    /// Walks until the bank is empty, returning segments in the order found.
    pub fn segments(mut self) -> Result<Vec<Segment>> {
        let mut segments = Vec::new();
        while let Some(segment) = self.walk()? {
            segments.push(segment);
        }
        Ok(segments)
    }

    /// Extracts one segment, or `None` once every edge has been consumed.
    pub fn walk(&mut self) -> Result<Option<Segment>> {
        let Some(start) = self.choose_start() else {
            return Ok(None);
        };
        self.start = start;
        self.end = start;

        while self.step()? {}

        let segment = Segment {
            start: self.start,
            end: self.end,
            dels: mem::take(&mut self.dels),
            adds: mem::take(&mut self.adds),
        };
        self.last_del_end = None;
        self.last_add_end = None;
        Ok(Some(segment))
    }

    fn choose_start(&mut self) -> Option<usize> {
        while let Some(junction) = self.bank.first_junction() {
            if self.bank.has_node(junction) {
                return Some(junction);
            }
            self.bank.evict_junction(junction);
            log::trace!("walker.junction: evict node={junction}");
        }
        self.bank.random_start()
    }

    /// Takes one edge. Returns whether the walk continues.
    fn step(&mut self) -> Result<bool> {
        let (dels, adds) = (self.dels.len(), self.adds.len());
        if dels.abs_diff(adds) >= 2 {
            return Err(Error::consistency(format!(
                "walk from node {} is unbalanced: dels={dels} adds={adds}",
                self.start
            )));
        }

        if dels < adds {
            self.step_del()?;
        } else if adds < dels {
            self.step_add()?;
        } else {
            let pivot = match self.last_del_end {
                Some(node) if adds > 0 => node,
                _ => self.start,
            };
            if self.bank.has_add(pivot) {
                self.step_add()?;
            } else {
                self.step_del()?;
            }
        }

        Ok(!self.bank.is_junction(self.end) && self.end != self.start)
    }

    fn step_add(&mut self) -> Result<()> {
        let from = self.last_del_end.unwrap_or(self.start);
        let (_, to) = self.bank.pop_add(from)?;
        self.adds.push(Edge::new(from, to));
        self.last_add_end = Some(to);
        self.end = to;
        Ok(())
    }

    fn step_del(&mut self) -> Result<()> {
        let from = self.last_add_end.unwrap_or(self.start);
        let (_, to) = self.bank.pop_del(from)?;
        self.dels.push(Edge::new(from, to));
        self.last_del_end = Some(to);
        self.end = to;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::SegmentWalker;
    use crate::{
        diff::edge_bank::EdgeBank,
        tour::{Edge, tour_difference},
    };

    fn walker(old: &[usize], new: &[usize]) -> SegmentWalker {
        let diff = tour_difference(old, new).expect("diff");
        SegmentWalker::from_diff(old.len(), &diff).expect("walker")
    }

    #[test]
    fn single_swap_walks_one_closed_segment() {
        let segments = walker(&[0, 1, 2, 3, 4], &[0, 2, 1, 3, 4])
            .segments()
            .expect("segments");

        assert_eq!(segments.len(), 1);
        let s = &segments[0];
        assert_eq!((s.start, s.end), (0, 0));
        assert_eq!(s.adds, vec![Edge::new(0, 2), Edge::new(3, 1)]);
        assert_eq!(s.dels, vec![Edge::new(2, 3), Edge::new(1, 0)]);
        assert!(s.is_kmove());
    }

    #[test]
    fn identical_tours_walk_nothing() {
        let mut w = walker(&[0, 1, 2, 3], &[0, 1, 2, 3]);
        assert!(w.walk().expect("walk").is_none());
    }

    #[test]
    fn independent_reversals_walk_two_segments() {
        let segments = walker(
            &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9],
            &[0, 3, 2, 1, 4, 5, 8, 7, 6, 9],
        )
        .segments()
        .expect("segments");

        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].start, 0);
        assert_eq!(segments[1].start, 5);
        assert!(segments.iter().all(|s| s.is_kmove() && s.adds.len() == 2));
    }

    #[test]
    fn walks_start_at_junctions_and_drain_the_bank() {
        // Nodes 1..=6 swap both tour neighbours, so each is a junction.
        let old = [0, 1, 2, 3, 4, 5, 6, 7];
        let new = [0, 2, 4, 6, 1, 3, 5, 7];
        let diff = tour_difference(&old, &new).expect("diff");
        let mut w = SegmentWalker::from_diff(old.len(), &diff).expect("walker");
        assert!(!w.bank().is_junction(0));
        assert!(w.bank().is_junction(1));
        assert_eq!(w.bank().junction_count(), 6);

        let first = w.walk().expect("walk").expect("segment");
        assert_eq!(first.start, 1);

        let mut total_adds = first.adds.len();
        let mut total_dels = first.dels.len();
        while let Some(s) = w.walk().expect("walk") {
            assert!(s.adds.len().abs_diff(s.dels.len()) <= 1);
            total_adds += s.adds.len();
            total_dels += s.dels.len();
        }
        assert_eq!(total_adds, diff.adds.len());
        assert_eq!(total_dels, diff.dels.len());
        assert_eq!(w.bank().remaining_adds(), 0);
        assert_eq!(w.bank().remaining_dels(), 0);
    }

    #[test]
    fn one_sided_bank_fails_to_alternate() {
        let bank = EdgeBank::new(4, &[Edge::new(0, 1), Edge::new(1, 2)], &[]).expect("bank");
        let mut w = SegmentWalker::new(bank);
        let err = w.walk().expect_err("no addition to follow the deletion");
        assert!(err.is_consistency());
        assert!(err.to_string().contains("no addition edge left"));
    }

    #[test]
    fn step_rejects_a_walk_two_edges_out_of_balance() {
        let bank = EdgeBank::new(4, &[Edge::new(2, 3)], &[Edge::new(2, 0)]).expect("bank");
        let mut w = SegmentWalker::new(bank);
        w.start = 0;
        w.end = 2;
        w.dels = vec![Edge::new(0, 1), Edge::new(1, 2)];

        let err = w.step().expect_err("unbalanced walk");
        assert!(err.is_consistency());
        assert!(err.to_string().contains("dels=2 adds=0"));
    }
}
