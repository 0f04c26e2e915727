use crate::geometry::{Point, tour_length};

/// Smallest tour that has two non-adjacent edges to exchange.
const MIN_TOUR_SIZE_FOR_2OPT: usize = 4;

/// First-improvement 2-opt: applies every improving exchange as soon as it is
/// found and rescans until a full pass finds none.
///
/// An exchange must shorten the tour by more than `epsilon` to count.
#[tourdiff_derive::timer("two_opt.optimize")]
pub fn optimize(points: &[Point], mut tour: Vec<usize>, epsilon: f64) -> (Vec<usize>, f64) {
    let n = tour.len();
    if n < MIN_TOUR_SIZE_FOR_2OPT {
        let length = tour_length(points, &tour);
        return (tour, length);
    }

    let mut passes = 0usize;
    let mut total_swaps = 0usize;
    loop {
        passes += 1;
        let swaps = improve_pass(points, &mut tour, epsilon);
        total_swaps += swaps;
        log::trace!("two_opt.pass: pass={passes} swaps={swaps}");
        if swaps == 0 {
            break;
        }
    }

    let length = tour_length(points, &tour);
    log::debug!("two_opt.complete: n={n} passes={passes} swaps={total_swaps} length={length:.3}");
    (tour, length)
}

fn improve_pass(points: &[Point], tour: &mut [usize], epsilon: f64) -> usize {
    let n = tour.len();
    let mut swaps = 0usize;
    for i in 0..n - 2 {
        for j in (i + 2)..n {
            let a = points[tour[i]];
            let b = points[tour[i + 1]];
            let c = points[tour[j]];
            let d = points[tour[(j + 1) % n]];

            let improvement = a.dist(b) + c.dist(d) - a.dist(c) - b.dist(d);
            if improvement > epsilon {
                tour[(i + 1)..=j].reverse();
                swaps += 1;
            }
        }
    }
    swaps
}

#[cfg(test)]
mod tests {
    use super::optimize;
    use crate::geometry::{Point, tour_length};

    fn square() -> Vec<Point> {
        vec![
            Point::new(0.0, 0.0),
            Point::new(2.0, 2.0),
            Point::new(0.0, 2.0),
            Point::new(2.0, 0.0),
        ]
    }

    #[test]
    fn optimize_uncrosses_square() {
        let points = square();
        let before = tour_length(&points, &[0, 1, 2, 3]);

        let (tour, length) = optimize(&points, vec![0, 1, 2, 3], 1e-9);

        assert!(length < before);
        assert!((length - 8.0).abs() < 1e-9);
        let mut sorted = tour.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, vec![0, 1, 2, 3]);
    }

    #[test]
    fn optimize_keeps_optimal_tour() {
        let points = square();
        let (tour, length) = optimize(&points, vec![0, 2, 1, 3], 1e-9);
        assert_eq!(tour, vec![0, 2, 1, 3]);
        assert!((length - 8.0).abs() < 1e-9);
    }

    #[test]
    fn optimize_leaves_triangles_alone() {
        let points = vec![
            Point::new(0.0, 0.0),
            Point::new(3.0, 0.0),
            Point::new(0.0, 4.0),
        ];
        let (tour, length) = optimize(&points, vec![2, 0, 1], 1e-9);
        assert_eq!(tour, vec![2, 0, 1]);
        assert!((length - 12.0).abs() < 1e-9);
    }

    #[test]
    fn optimize_reaches_a_local_optimum_on_a_circle() {
        let n = 24;
        let points: Vec<Point> = (0..n)
            .map(|i| {
                let angle = i as f64 * std::f64::consts::TAU / n as f64;
                Point::new(angle.cos(), angle.sin())
            })
            .collect();
        let scrambled: Vec<usize> = (0..n).map(|i| (i * 7) % n).collect();

        let (tour, length) = optimize(&points, scrambled, 1e-9);
        let perimeter = tour_length(&points, &(0..n).collect::<Vec<_>>());

        // On convex positions every 2-opt local optimum is the hull.
        assert!((length - perimeter).abs() < 1e-6);
        assert_eq!(tour.len(), n);
    }
}
