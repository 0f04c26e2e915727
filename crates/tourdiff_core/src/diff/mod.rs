//! Tour difference decomposition.
//!
//! Two tours over the same nodes differ by a set of deleted and added edges.
//! [`decompose`] splits that difference into k-moves: groups of edges that
//! alternate between deletions and additions and close into a cycle. Each
//! k-move touches a disjoint part of the tour; [`evaluate`] keeps the ones that
//! shorten the tour and stay a single cycle when applied on their own.

mod edge_bank;
mod feasibility;
mod merge;
mod observer;
mod segment;
mod walker;

pub use edge_bank::EdgeBank;
pub use feasibility::{apply_kmove, evaluate, is_feasible, kmove_gain};
pub use merge::{Classified, classify, merge_trivial_segments, segments_to_kmoves};
pub use observer::{DecomposeObserver, LogObserver, RecordingObserver};
pub use segment::{KMove, Segment};
pub use walker::SegmentWalker;

use crate::{Result, tour::tour_difference};

/// Decomposes the difference from `old_tour` to `new_tour`, logging each stage.
pub fn decompose(old_tour: &[usize], new_tour: &[usize]) -> Result<Vec<KMove>> {
    decompose_with(old_tour, new_tour, &mut LogObserver)
}

/// [`decompose`] reporting each stage to `observer`.
pub fn decompose_with<O>(
    old_tour: &[usize],
    new_tour: &[usize],
    observer: &mut O,
) -> Result<Vec<KMove>>
where
    O: DecomposeObserver + ?Sized,
{
    let diff = tour_difference(old_tour, new_tour)?;
    observer.on_diff(&diff);
    if diff.is_empty() {
        observer.on_kmoves(&[]);
        return Ok(Vec::new());
    }

    let walker = SegmentWalker::from_diff(old_tour.len(), &diff)?;
    observer.on_junctions(walker.bank().junction_count());
    let segments = walker.segments()?;
    for segment in &segments {
        observer.on_segment(segment);
    }

    let kmoves = segments_to_kmoves(segments, observer)?;
    observer.on_kmoves(&kmoves);
    Ok(kmoves)
}
