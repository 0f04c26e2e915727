use rand::{SeedableRng, rngs::SmallRng};
use tourdiff_derive::KvDisplay;

use crate::{
    Error, Result,
    diff::{self, KMove, apply_kmove, kmove_gain},
    geometry::{Point, edge_cost, tour_length},
    search::{perturb::double_bridge, two_opt},
    tour::{Edge, validate_tour},
};

/// Settings for [`perturbed_hill_climb`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClimbConfig {
    pub iterations: usize,
    pub seed: u64,
    /// Apply the best beneficial k-move of a rejected local optimum.
    pub harvest: bool,
    pub epsilon: f64,
}

impl Default for ClimbConfig {
    fn default() -> Self {
        Self {
            iterations: 100,
            seed: 42,
            harvest: true,
            epsilon: 1e-9,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, KvDisplay)]
pub struct ClimbStats {
    pub iterations: usize,
    /// Perturbed local optima that replaced the current tour.
    pub accepted: usize,
    /// Rejected local optima whose best k-move was applied instead.
    pub harvested: usize,
    pub kmoves: usize,
    pub beneficial_kmoves: usize,
    pub initial_length: f64,
    pub best_length: f64,
}

impl ClimbStats {
    pub fn success_rate(&self) -> f64 {
        if self.iterations == 0 {
            0.0
        } else {
            self.accepted as f64 / self.iterations as f64
        }
    }
}

/// Iterated 2-opt with double-bridge kicks.
///
/// Each round perturbs the current tour and re-optimizes it, then decomposes
/// the difference between the two local optima. A shorter optimum replaces
/// the current tour. Otherwise, with harvesting on, the single beneficial
/// k-move with the largest gain is applied to the current tour.
#[tourdiff_derive::timer("hill_climb")]
pub fn perturbed_hill_climb(
    points: &[Point],
    tour: Vec<usize>,
    config: ClimbConfig,
) -> Result<(Vec<usize>, ClimbStats)> {
    validate_tour(&tour)?;
    if tour.len() != points.len() {
        return Err(Error::invalid_input(format!(
            "tour has {} nodes but the problem has {} points",
            tour.len(),
            points.len()
        )));
    }

    let cost = |edge| edge_cost(points, edge);
    let mut rng = SmallRng::seed_from_u64(config.seed);
    let mut stats = ClimbStats {
        initial_length: tour_length(points, &tour),
        ..ClimbStats::default()
    };
    let (mut tour, mut best_length) = two_opt::optimize(points, tour, config.epsilon);
    log::info!(
        "hill_climb.start: n={} initial={:.3} optimized={best_length:.3}",
        tour.len(),
        stats.initial_length
    );

    for round in 0..config.iterations {
        let kicked = double_bridge(&tour, &mut rng);
        let (candidate, candidate_length) = two_opt::optimize(points, kicked, config.epsilon);

        let kmoves = diff::decompose(&tour, &candidate)?;
        stats.kmoves += kmoves.len();
        let beneficial = diff::evaluate(&tour, kmoves, cost)?;
        stats.beneficial_kmoves += beneficial.len();
        stats.iterations += 1;

        if candidate_length < best_length - config.epsilon {
            log::debug!(
                "hill_climb.accept: round={round} length={candidate_length:.3} previous={best_length:.3}"
            );
            tour = candidate;
            best_length = candidate_length;
            stats.accepted += 1;
            continue;
        }

        if !config.harvest {
            continue;
        }
        let Some((kmove, gain)) = best_kmove(&beneficial, cost) else {
            continue;
        };
        let harvested = apply_kmove(&tour, kmove)?;
        let (harvested, harvested_length) = two_opt::optimize(points, harvested, config.epsilon);
        if harvested_length < best_length - config.epsilon {
            log::debug!(
                "hill_climb.harvest: round={round} k={} gain={gain:.3} length={harvested_length:.3}",
                kmove.k()
            );
            tour = harvested;
            best_length = harvested_length;
            stats.harvested += 1;
        }
    }

    stats.best_length = best_length;
    log::info!(
        "hill_climb.complete: best={best_length:.3} success_rate={:.3} harvested={}",
        stats.success_rate(),
        stats.harvested
    );
    Ok((tour, stats))
}

fn best_kmove<C>(kmoves: &[KMove], cost: C) -> Option<(&KMove, f64)>
where
    C: Fn(Edge) -> f64,
{
    kmoves
        .iter()
        .map(|kmove| (kmove, kmove_gain(kmove, &cost)))
        .max_by(|a, b| a.1.total_cmp(&b.1))
}

#[cfg(test)]
mod tests {
    use rand::{Rng, SeedableRng, rngs::SmallRng};

    use super::{ClimbConfig, ClimbStats, best_kmove, perturbed_hill_climb};
    use crate::{
        diff::KMove,
        geometry::{Point, tour_length},
        tour::{Edge, validate_tour},
    };

    fn random_points(n: usize, seed: u64) -> Vec<Point> {
        let mut rng = SmallRng::seed_from_u64(seed);
        (0..n)
            .map(|_| Point::new(rng.random_range(0.0..100.0), rng.random_range(0.0..100.0)))
            .collect()
    }

    #[test]
    fn hill_climb_never_lengthens_the_tour() {
        let points = random_points(40, 1);
        let tour: Vec<usize> = (0..points.len()).collect();
        let start = tour_length(&points, &tour);
        let config = ClimbConfig {
            iterations: 15,
            ..ClimbConfig::default()
        };

        let (best, stats) = perturbed_hill_climb(&points, tour, config).expect("climb");

        validate_tour(&best).expect("permutation");
        assert!(stats.best_length <= start);
        assert!((tour_length(&points, &best) - stats.best_length).abs() < 1e-6);
        assert_eq!(stats.iterations, 15);
        assert!(stats.accepted + stats.harvested <= stats.iterations);
        assert!(stats.beneficial_kmoves <= stats.kmoves);
    }

    #[test]
    fn hill_climb_is_reproducible_for_a_seed() {
        let points = random_points(30, 2);
        let config = ClimbConfig {
            iterations: 10,
            seed: 5,
            ..ClimbConfig::default()
        };
        let (a, _) =
            perturbed_hill_climb(&points, (0..30).collect(), config).expect("first climb");
        let (b, _) =
            perturbed_hill_climb(&points, (0..30).collect(), config).expect("second climb");
        assert_eq!(a, b);
    }

    #[test]
    fn hill_climb_without_harvest_never_harvests() {
        let points = random_points(24, 3);
        let config = ClimbConfig {
            iterations: 10,
            harvest: false,
            ..ClimbConfig::default()
        };
        let (_, stats) = perturbed_hill_climb(&points, (0..24).collect(), config).expect("climb");
        assert_eq!(stats.harvested, 0);
    }

    #[test]
    fn hill_climb_rejects_mismatched_points() {
        let points = random_points(5, 4);
        let err = perturbed_hill_climb(&points, vec![0, 1, 2], ClimbConfig::default())
            .expect_err("size mismatch");
        assert!(err.to_string().contains("problem has 5 points"));
    }

    #[test]
    fn best_kmove_picks_largest_gain() {
        let small = KMove::new(vec![Edge::new(0, 1)], vec![Edge::new(0, 2)]);
        let large = KMove::new(vec![Edge::new(3, 4)], vec![Edge::new(3, 5)]);
        let cost = |e: Edge| match (e.a(), e.b()) {
            (0, 1) => 2.0,
            (3, 4) => 9.0,
            _ => 1.0,
        };
        let moves = [small, large.clone()];
        let (best, gain) = best_kmove(&moves, cost).expect("non-empty");
        assert_eq!(best, &large);
        assert_eq!(gain, 8.0);
        assert!(best_kmove(&[], cost).is_none());
    }

    #[test]
    fn stats_success_rate_handles_zero_iterations() {
        assert_eq!(ClimbStats::default().success_rate(), 0.0);
        let stats = ClimbStats {
            iterations: 4,
            accepted: 1,
            ..ClimbStats::default()
        };
        assert_eq!(stats.success_rate(), 0.25);
        assert!(stats.to_string().contains("accepted"));
    }
}
