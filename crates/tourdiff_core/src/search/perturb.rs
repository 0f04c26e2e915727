use rand::{Rng, seq::index};

/// Tours shorter than this are returned unchanged by [`double_bridge`].
pub const MIN_DOUBLE_BRIDGE_NODES: usize = 8;

/// Cuts `tour` into `A B C D` at three random points and reconnects it as `A C B D`.
///
/// The result differs from `tour` by at most three edges and cannot be undone
/// by a single 2-opt exchange.
pub fn double_bridge<R>(tour: &[usize], rng: &mut R) -> Vec<usize>
where
    R: Rng + ?Sized,
{
    let n = tour.len();
    if n < MIN_DOUBLE_BRIDGE_NODES {
        return tour.to_vec();
    }

    let mut cuts = index::sample(rng, n - 1, 3).into_vec();
    cuts.sort_unstable();
    let [p1, p2, p3] = [cuts[0] + 1, cuts[1] + 1, cuts[2] + 1];
    log::trace!("perturb.double_bridge: n={n} cuts={p1},{p2},{p3}");

    let mut bridged = Vec::with_capacity(n);
    bridged.extend_from_slice(&tour[..p1]);
    bridged.extend_from_slice(&tour[p2..p3]);
    bridged.extend_from_slice(&tour[p1..p2]);
    bridged.extend_from_slice(&tour[p3..]);
    bridged
}
