use std::collections::BTreeMap;

use crate::{
    Error, Result,
    diff::{
        observer::DecomposeObserver,
        segment::{KMove, Segment},
    },
};

/// Raw segments split by shape.
#[derive(Debug, Default)]
pub struct Classified {
    /// Cyclic and balanced.
    pub kmoves: Vec<KMove>,
    /// Cyclic and unbalanced.
    pub trivials: Vec<Segment>,
    /// Not cyclic.
    pub open: Vec<Segment>,
}

pub fn classify(segments: Vec<Segment>) -> Classified {
    let mut classified = Classified::default();
    for segment in segments {
        if segment.is_kmove() {
            classified.kmoves.push(segment.into_kmove());
        } else if segment.is_trivial() {
            classified.trivials.push(segment);
        } else {
            classified.open.push(segment);
        }
    }
    classified
}

/// Pairs trivial segments that close at the same node into k-moves.
///
/// Returns the k-moves and the trivials left without a partner.
pub fn merge_trivial_segments(trivials: Vec<Segment>) -> Result<(Vec<KMove>, Vec<Segment>)> {
    let mut stash: BTreeMap<usize, Segment> = BTreeMap::new();
    let mut kmoves = Vec::new();
    for trivial in trivials {
        if !trivial.is_trivial() {
            return Err(Error::consistency(format!(
                "segment {trivial} is not trivial"
            )));
        }
        match stash.remove(&trivial.start) {
            Some(mut first) => {
                first.append_edges(trivial);
                kmoves.push(first.into_kmove());
            }
            None => {
                stash.insert(trivial.start, trivial);
            }
        }
    }
    Ok((kmoves, stash.into_values().collect()))
}

/// Outcome of folding one trivial segment into the open segments around it.
#[derive(Debug)]
pub(crate) enum Absorbed {
    /// The merge closed into an independent k-move.
    KMove(KMove),
    /// No open segment touches the trivial's node; it needs a trivial partner.
    Unmatched(Segment),
    /// The merge produced a longer open segment, now stored in the map.
    Merged,
}

type SegmentId = usize;

/// Open segments indexed by both endpoints.
#[derive(Debug, Default)]
pub(crate) struct SegmentMap {
    arena: Vec<Option<Segment>>,
    at: BTreeMap<usize, Vec<SegmentId>>,
}

impl SegmentMap {
    pub(crate) fn new(open: Vec<Segment>) -> Result<Self> {
        let mut map = Self::default();
        for segment in open {
            map.insert(segment)?;
        }
        Ok(map)
    }

    fn insert(&mut self, segment: Segment) -> Result<()> {
        if segment.is_cyclic() {
            return Err(Error::consistency(format!(
                "cyclic segment {segment} cannot join the open segment map"
            )));
        }
        let id = self.arena.len();
        self.at.entry(segment.start).or_default().push(id);
        self.at.entry(segment.end).or_default().push(id);
        self.arena.push(Some(segment));
        Ok(())
    }

    /// Removes a segment from the arena and from both of its endpoints.
    fn take(&mut self, id: SegmentId) -> Result<Segment> {
        let segment = self
            .arena
            .get_mut(id)
            .and_then(Option::take)
            .ok_or_else(|| Error::consistency(format!("segment #{id} was already consumed")))?;
        for node in [segment.start, segment.end] {
            if let Some(ids) = self.at.get_mut(&node) {
                ids.retain(|&other| other != id);
                if ids.is_empty() {
                    self.at.remove(&node);
                }
            }
        }
        Ok(segment)
    }

    pub(crate) fn len(&self) -> usize {
        self.arena.iter().flatten().count()
    }

    /// Merges `trivial` with the two open segments meeting at its node,
    /// repeating while the merge closes into another trivial.
    pub(crate) fn remove_trivial(&mut self, mut trivial: Segment) -> Result<Absorbed> {
        // Every round consumes two stored segments.
        let max_rounds = self.arena.len() / 2 + 1;
        for _ in 0..max_rounds {
            let node = trivial.start;
            if trivial.end != node {
                return Err(Error::consistency(format!(
                    "trivial segment {trivial} is not cyclic"
                )));
            }
            let Some(ids) = self.at.get(&node) else {
                return Ok(Absorbed::Unmatched(trivial));
            };
            let &[first_id, second_id] = ids.as_slice() else {
                return Err(Error::consistency(format!(
                    "junction {node} has {} open segments; expected exactly 2",
                    ids.len()
                )));
            };

            let first = self.take(first_id)?;
            let second = self.take(second_id)?;
            let start = first.other_end(node);
            let end = second.other_end(node);

            let mut merged = Segment {
                start,
                end,
                dels: Vec::with_capacity(trivial.dels.len() + first.dels.len() + second.dels.len()),
                adds: Vec::with_capacity(trivial.adds.len() + first.adds.len() + second.adds.len()),
            };
            merged.append_edges(trivial);
            merged.append_edges(first);
            merged.append_edges(second);
            log::trace!("merge.trivial: node={node} merged={merged}");

            if !merged.is_cyclic() {
                self.insert(merged)?;
                return Ok(Absorbed::Merged);
            }
            if merged.is_kmove() {
                return Ok(Absorbed::KMove(merged.into_kmove()));
            }
            trivial = merged;
        }
        Err(Error::consistency(format!(
            "trivial merge did not settle within {max_rounds} rounds"
        )))
    }

    /// Union of every segment still stored.
    pub(crate) fn into_residual(self) -> KMove {
        KMove::combine(self.arena.into_iter().flatten().map(Segment::into_kmove))
    }
}

fn edge_totals(moves: impl Iterator<Item = (usize, usize)>) -> (usize, usize) {
    moves.fold((0, 0), |(dels, adds), (d, a)| (dels + d, adds + a))
}

/// Turns the segments of one tour difference into independent k-moves.
///
/// Trivial segments are paired at shared nodes or folded into the open
/// segments around them; whatever stays open becomes one residual k-move.
/// Every input edge ends up in exactly one output k-move.
pub fn segments_to_kmoves<O>(segments: Vec<Segment>, observer: &mut O) -> Result<Vec<KMove>>
where
    O: DecomposeObserver + ?Sized,
{
    let (total_dels, total_adds) =
        edge_totals(segments.iter().map(|s| (s.dels.len(), s.adds.len())));
    if total_dels != total_adds {
        return Err(Error::consistency(format!(
            "segments are unbalanced: dels={total_dels} adds={total_adds}"
        )));
    }

    let Classified {
        mut kmoves,
        trivials,
        open,
    } = classify(segments);
    observer.on_classified(kmoves.len(), trivials.len(), open.len());

    let (paired, trivials) = merge_trivial_segments(trivials)?;
    kmoves.extend(paired);

    let mut map = SegmentMap::new(open)?;
    let mut unmatched = Vec::new();
    for trivial in trivials {
        match map.remove_trivial(trivial)? {
            Absorbed::KMove(kmove) => kmoves.push(kmove),
            Absorbed::Unmatched(segment) => unmatched.push(segment),
            Absorbed::Merged => {}
        }
    }

    if unmatched.len() % 2 != 0 {
        return Err(Error::consistency(format!(
            "{} unmatched trivial segments cannot pair off",
            unmatched.len()
        )));
    }
    let (paired, leftover) = merge_trivial_segments(unmatched)?;
    if !leftover.is_empty() {
        return Err(Error::consistency(format!(
            "{} trivial segments found no partner",
            leftover.len()
        )));
    }
    kmoves.extend(paired);

    let residual_segments = map.len();
    let residual = map.into_residual();
    if !residual.is_empty() {
        log::debug!(
            "merge.residual: segments={residual_segments} k={}",
            residual.k()
        );
        kmoves.push(residual);
    }

    let (kmove_dels, kmove_adds) = edge_totals(kmoves.iter().map(|k| (k.dels.len(), k.adds.len())));
    if kmove_dels != total_dels || kmove_adds != total_adds {
        return Err(Error::consistency(format!(
            "k-moves do not conserve edges: dels {kmove_dels}/{total_dels} adds {kmove_adds}/{total_adds}"
        )));
    }

    Ok(kmoves)
}

#[cfg(test)]
mod tests {
    use super::{Absorbed, SegmentMap, classify, merge_trivial_segments, segments_to_kmoves};
    use crate::{
        diff::{observer::LogObserver, segment::Segment},
        tour::Edge,
    };

    fn seg(start: usize, end: usize, dels: &[(usize, usize)], adds: &[(usize, usize)]) -> Segment {
        Segment {
            start,
            end,
            dels: dels.iter().copied().map(Edge::from).collect(),
            adds: adds.iter().copied().map(Edge::from).collect(),
        }
    }

    #[test]
    fn classify_splits_by_shape() {
        let classified = classify(vec![
            seg(0, 0, &[(0, 1)], &[(0, 2)]),
            seg(3, 3, &[(3, 4)], &[(3, 5), (3, 6)]),
            seg(7, 8, &[(7, 9)], &[(9, 8)]),
        ]);
        assert_eq!(classified.kmoves.len(), 1);
        assert_eq!(classified.trivials.len(), 1);
        assert_eq!(classified.open.len(), 1);
    }

    #[test]
    fn merge_trivial_segments_pairs_by_node() {
        let (kmoves, left) = merge_trivial_segments(vec![
            seg(4, 4, &[(4, 1)], &[(4, 2), (2, 4)]),
            seg(9, 9, &[(9, 1)], &[(9, 2), (2, 3)]),
            seg(4, 4, &[(4, 5), (5, 6)], &[(6, 7)]),
        ])
        .expect("merge");

        assert_eq!(kmoves.len(), 1);
        assert_eq!(kmoves[0].dels.len(), 3);
        assert_eq!(kmoves[0].adds.len(), 3);
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].start, 9);
    }

    #[test]
    fn merge_trivial_segments_rejects_non_trivial_segments() {
        let err = merge_trivial_segments(vec![seg(1, 2, &[(1, 2)], &[])]).expect_err("open");
        assert!(err.is_consistency());

        let err = merge_trivial_segments(vec![seg(0, 0, &[(0, 1)], &[(0, 2)])])
            .expect_err("balanced");
        assert!(err.to_string().contains("is not trivial"));
    }

    #[test]
    fn remove_trivial_without_open_segments_is_unmatched() {
        let mut map = SegmentMap::new(vec![seg(5, 6, &[(5, 6)], &[])]).expect("map");
        let trivial = seg(1, 1, &[(1, 2)], &[(2, 3), (3, 1)]);
        match map.remove_trivial(trivial.clone()).expect("absorb") {
            Absorbed::Unmatched(s) => assert_eq!(s, trivial),
            other => panic!("expected unmatched, got {other:?}"),
        }
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn remove_trivial_joins_segments_through_the_junction() {
        // 2 --open-- 1 --open-- 3, with a trivial loop at 1.
        let mut map = SegmentMap::new(vec![
            seg(2, 1, &[(2, 8)], &[(8, 1)]),
            seg(1, 3, &[(1, 9)], &[(9, 3)]),
        ])
        .expect("map");
        let trivial = seg(1, 1, &[(1, 4), (5, 6)], &[(4, 5)]);

        assert!(matches!(
            map.remove_trivial(trivial).expect("absorb"),
            Absorbed::Merged
        ));
        assert_eq!(map.len(), 1);
        let residual = map.into_residual();
        assert_eq!(residual.dels.len(), 4);
        assert_eq!(residual.adds.len(), 3);
    }

    #[test]
    fn remove_trivial_closes_into_kmove() {
        // Two open segments between 1 and 2; the trivial at 1 closes them.
        let mut map = SegmentMap::new(vec![
            seg(1, 2, &[(1, 3), (4, 2)], &[(3, 4)]),
            seg(2, 1, &[(2, 7)], &[(7, 1)]),
        ])
        .expect("map");
        let trivial = seg(1, 1, &[(1, 5)], &[(5, 6), (6, 1)]);

        match map.remove_trivial(trivial).expect("absorb") {
            Absorbed::KMove(kmove) => {
                assert_eq!(kmove.dels.len(), 4);
                assert_eq!(kmove.adds.len(), 4);
            }
            other => panic!("expected a closed merge, got {other:?}"),
        }
        assert_eq!(map.len(), 0);
    }

    #[test]
    fn remove_trivial_recurses_on_unbalanced_closure() {
        // Parallel open segments between 1 and 2 close into a trivial at 2,
        // which then absorbs the open segments between 2 and 7/8.
        let mut map = SegmentMap::new(vec![
            seg(1, 2, &[(1, 3)], &[(3, 2)]),
            seg(2, 1, &[(2, 4)], &[(4, 1)]),
            seg(2, 7, &[(2, 10)], &[(10, 7)]),
            seg(8, 2, &[(8, 11)], &[(11, 2)]),
        ])
        .expect("map");
        let trivial = seg(1, 1, &[(1, 5)], &[(5, 6), (6, 1)]);

        assert!(matches!(
            map.remove_trivial(trivial).expect("absorb"),
            Absorbed::Merged
        ));
        assert_eq!(map.len(), 1);
        let residual = map.into_residual();
        assert_eq!(residual.dels.len(), 5);
        assert_eq!(residual.adds.len(), 6);
    }

    #[test]
    fn remove_trivial_rejects_three_way_junctions() {
        let mut map = SegmentMap::new(vec![
            seg(1, 2, &[(1, 2)], &[]),
            seg(1, 3, &[(1, 3)], &[]),
            seg(1, 4, &[(1, 4)], &[]),
        ])
        .expect("map");
        let err = map
            .remove_trivial(seg(1, 1, &[], &[(1, 5), (5, 1)]))
            .expect_err("three segments at one junction");
        assert!(err.is_consistency());
        assert!(err.to_string().contains("expected exactly 2"));
    }

    #[test]
    fn segments_to_kmoves_rejects_odd_unmatched_trivials() {
        let segments = vec![
            seg(0, 0, &[(0, 1)], &[(1, 2), (2, 0)]),
            seg(5, 6, &[(5, 7), (7, 8)], &[(8, 6)]),
        ];
        let err = segments_to_kmoves(segments, &mut LogObserver).expect_err("odd trivials");
        assert!(err.is_consistency());
        assert!(err.to_string().contains("cannot pair off"));
    }

    #[test]
    fn segments_to_kmoves_rejects_unbalanced_input() {
        let segments = vec![seg(0, 0, &[(0, 1)], &[(1, 2), (2, 0)])];
        let err = segments_to_kmoves(segments, &mut LogObserver).expect_err("unbalanced");
        assert!(err.to_string().contains("segments are unbalanced"));
    }

    #[test]
    fn segments_to_kmoves_keeps_closed_segments_and_builds_residual() {
        let segments = vec![
            seg(0, 0, &[(0, 1), (2, 3)], &[(0, 2), (1, 3)]),
            seg(4, 5, &[(4, 6)], &[(6, 5)]),
            seg(5, 4, &[(5, 7)], &[(7, 4)]),
        ];
        let kmoves = segments_to_kmoves(segments, &mut LogObserver).expect("kmoves");

        assert_eq!(kmoves.len(), 2);
        assert_eq!(kmoves[0].k(), 2);
        assert_eq!(kmoves[1].dels.len(), 2);
        assert_eq!(kmoves[1].adds.len(), 2);
    }

    #[test]
    fn segments_to_kmoves_of_nothing_is_empty() {
        let kmoves = segments_to_kmoves(Vec::new(), &mut LogObserver).expect("kmoves");
        assert!(kmoves.is_empty());
    }
}
