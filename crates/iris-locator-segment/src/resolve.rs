//! Pick one iris estimate among the circle candidates of a region.

use iris_locator_core::{Circle, Rect};

/// Candidate closest to the region center `(width / 2, height / 2)`.
///
/// Only the first `max_candidates` entries are examined; a single candidate is
/// returned as-is and ties keep the earliest candidate.
pub fn resolve_candidates(
    candidates: &[Circle],
    width: u32,
    height: u32,
    max_candidates: usize,
) -> Option<Circle> {
    match candidates {
        [] => None,
        [only] => Some(*only),
        _ => {
            let (cx, cy) = Rect::new(0, 0, width, height).local_center();
            let mut best: Option<(Circle, f32)> = None;
            for c in candidates.iter().take(max_candidates.max(1)) {
                let d = c.distance_to(cx, cy);
                if best.map(|(_, bd)| d < bd).unwrap_or(true) {
                    best = Some((*c, d));
                }
            }
            best.map(|(c, _)| c)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_candidates_is_empty() {
        assert_eq!(resolve_candidates(&[], 100, 100, 25), None);
    }

    #[test]
    fn single_candidate_is_returned_verbatim() {
        let c = Circle::new(3.0, 97.0, 14.0);
        assert_eq!(resolve_candidates(&[c], 100, 100, 25), Some(c));
    }

    #[test]
    fn picks_the_candidate_nearest_the_center() {
        let far = Circle::new(10.0, 10.0, 5.0);
        let near = Circle::new(55.0, 55.0, 5.0);
        assert_eq!(resolve_candidates(&[far, near], 100, 100, 25), Some(near));
    }

    #[test]
    fn equal_distances_keep_the_first() {
        let a = Circle::new(10.0, 10.0, 5.0);
        let b = Circle::new(90.0, 90.0, 5.0);
        assert_eq!(resolve_candidates(&[a, b], 100, 100, 25), Some(a));
        assert_eq!(resolve_candidates(&[b, a], 100, 100, 25), Some(b));
    }

    #[test]
    fn candidates_past_the_cap_are_ignored() {
        let a = Circle::new(0.0, 0.0, 5.0);
        let b = Circle::new(5.0, 5.0, 5.0);
        let centered = Circle::new(50.0, 50.0, 5.0);
        assert_eq!(resolve_candidates(&[a, b, centered], 100, 100, 2), Some(b));
    }

    #[test]
    fn uses_the_region_center_for_non_square_regions() {
        let a = Circle::new(60.0, 20.0, 8.0);
        let b = Circle::new(40.0, 40.0, 8.0);
        assert_eq!(resolve_candidates(&[a, b], 120, 40, 25), Some(a));
    }
}
