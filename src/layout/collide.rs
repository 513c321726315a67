//! One-shot collision relaxation.
//!
//! Every node after the first is checked against the neighbours found in a
//! snapshot R-tree of the starting positions. Each overlapping pair is pushed
//! apart symmetrically along the line joining the two centres until they sit
//! `r1 + r2 + 1` apart. There is a single sweep, not an iteration to
//! equilibrium, so a pair separated early can be nudged together again by a
//! later push.

use crate::spatial::SpatialIndex;

/// Resolve overlaps in place. Returns the number of pairs displaced.
///
/// `xs`, `ys` and `radii` are parallel slices. Candidates are looked up in
/// an index built once from the positions on entry; distances are always
/// measured on the live coordinates.
pub fn resolve_collisions(xs: &mut [f32], ys: &mut [f32], radii: &[f32]) -> usize {
    let n = xs.len().min(ys.len()).min(radii.len());
    if n < 2 {
        return 0;
    }

    let index = SpatialIndex::from_positions(&xs[..n], &ys[..n]);
    let max_radius = radii[..n].iter().copied().fold(0.0f32, f32::max);
    let mut displaced = 0;

    for i in 1..n {
        let reach = radii[i] + 2.0 * max_radius;
        let candidates = index.in_rect(xs[i] - reach, ys[i] - reach, xs[i] + reach, ys[i] + reach);

        for j in candidates {
            if j == i {
                continue;
            }
            let mut dx = xs[i] - xs[j];
            let mut dy = ys[i] - ys[j];
            let distance = (dx * dx + dy * dy).sqrt();
            let min_distance = radii[i] + radii[j] + 1.0;
            if distance >= min_distance {
                continue;
            }

            if distance <= f32::EPSILON {
                // Coincident centres have no direction; split along the structural axis.
                dx = -min_distance * 0.5;
                dy = 0.0;
            } else {
                let k = (distance - min_distance) / distance * 0.5;
                dx *= k;
                dy *= k;
            }
            xs[i] -= dx;
            ys[i] -= dy;
            xs[j] += dx;
            ys[j] += dy;
            displaced += 1;
        }
    }

    displaced
}

#[cfg(test)]
mod tests {
    use super::*;

    fn distance(xs: &[f32], ys: &[f32], a: usize, b: usize) -> f32 {
        ((xs[a] - xs[b]).powi(2) + (ys[a] - ys[b]).powi(2)).sqrt()
    }

    #[test]
    fn test_separated_nodes_untouched() {
        let mut xs = vec![0.0, 100.0, 0.0];
        let mut ys = vec![0.0, 0.0, 100.0];
        let before = (xs.clone(), ys.clone());
        let moved = resolve_collisions(&mut xs, &mut ys, &[16.0, 16.0, 16.0]);
        assert_eq!(moved, 0);
        assert_eq!((xs, ys), before);
    }

    #[test]
    fn test_overlapping_pair_pushed_to_contact() {
        let mut xs = vec![0.0, 10.0];
        let mut ys = vec![0.0, 0.0];
        let moved = resolve_collisions(&mut xs, &mut ys, &[16.0, 16.0]);
        assert_eq!(moved, 1);
        assert!((distance(&xs, &ys, 0, 1) - 33.0).abs() < 1e-3);
        // Symmetric: the midpoint stays put.
        assert!(((xs[0] + xs[1]) / 2.0 - 5.0).abs() < 1e-3);
    }

    #[test]
    fn test_displacement_follows_centre_line() {
        let mut xs = vec![0.0, 3.0];
        let mut ys = vec![0.0, 4.0];
        resolve_collisions(&mut xs, &mut ys, &[5.0, 5.0]);
        let dx = xs[1] - xs[0];
        let dy = ys[1] - ys[0];
        assert!((dy / dx - 4.0 / 3.0).abs() < 1e-3);
        assert!((distance(&xs, &ys, 0, 1) - 11.0).abs() < 1e-3);
    }

    #[test]
    fn test_coincident_nodes_separated() {
        let mut xs = vec![50.0, 50.0];
        let mut ys = vec![20.0, 20.0];
        resolve_collisions(&mut xs, &mut ys, &[16.0, 16.0]);
        assert!((distance(&xs, &ys, 0, 1) - 33.0).abs() < 1e-3);
        assert_eq!(ys, vec![20.0, 20.0]);
    }

    #[test]
    fn test_degenerate_inputs() {
        assert_eq!(resolve_collisions(&mut [], &mut [], &[]), 0);
        let mut xs = [1.0];
        let mut ys = [1.0];
        assert_eq!(resolve_collisions(&mut xs, &mut ys, &[16.0]), 0);
        assert_eq!(xs, [1.0]);
    }
}
