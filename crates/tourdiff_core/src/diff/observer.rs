use crate::{
    diff::segment::{KMove, Segment},
    tour::TourDiff,
};

/// Hooks into the stages of one decomposition.
///
/// Every method has a no-op default, so implementors only override what they watch.
pub trait DecomposeObserver {
    fn on_diff(&mut self, _diff: &TourDiff) {}

    fn on_junctions(&mut self, _count: usize) {}

    fn on_segment(&mut self, _segment: &Segment) {}

    fn on_classified(&mut self, _kmoves: usize, _trivials: usize, _open: usize) {}

    fn on_kmoves(&mut self, _kmoves: &[KMove]) {}
}

/// Observer that reports through the `log` facade.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogObserver;

impl DecomposeObserver for LogObserver {
    fn on_diff(&mut self, diff: &TourDiff) {
        log::debug!(
            "decompose.diff: dels={} adds={}",
            diff.dels.len(),
            diff.adds.len()
        );
    }

    fn on_junctions(&mut self, count: usize) {
        log::debug!("decompose.junctions: count={count}");
    }

    fn on_segment(&mut self, segment: &Segment) {
        log::trace!("decompose.segment: {segment}");
    }

    fn on_classified(&mut self, kmoves: usize, trivials: usize, open: usize) {
        log::debug!("decompose.classified: kmoves={kmoves} trivials={trivials} open={open}");
    }

    fn on_kmoves(&mut self, kmoves: &[KMove]) {
        log::debug!("decompose.kmoves: count={}", kmoves.len());
        for kmove in kmoves {
            log::trace!("decompose.kmove: {kmove}");
        }
    }
}

/// Observer that records what it sees; useful in tests and tooling.
#[derive(Clone, Debug, Default)]
pub struct RecordingObserver {
    pub junctions: usize,
    pub segments: Vec<Segment>,
    pub classified: Option<(usize, usize, usize)>,
    pub kmove_count: usize,
}

impl DecomposeObserver for RecordingObserver {
    fn on_junctions(&mut self, count: usize) {
        self.junctions = count;
    }

    fn on_segment(&mut self, segment: &Segment) {
        self.segments.push(segment.clone());
    }

    fn on_classified(&mut self, kmoves: usize, trivials: usize, open: usize) {
        self.classified = Some((kmoves, trivials, open));
    }

    fn on_kmoves(&mut self, kmoves: &[KMove]) {
        self.kmove_count = kmoves.len();
    }
}
