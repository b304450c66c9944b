//! Detection values and their deterministic ordering.

use crate::score::Polarity;
use std::cmp::Ordering;

/// A located symbol instance in target coordinates.
///
/// `(x, y)` is the top-left corner of the template-sized match.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Detection {
    /// Left edge in target pixels.
    pub x: usize,
    /// Top edge in target pixels.
    pub y: usize,
    /// Comparison value reported by the scorer.
    pub score: f32,
}

impl Detection {
    /// Creates a detection.
    pub fn new(x: usize, y: usize, score: f32) -> Self {
        Self { x, y, score }
    }
}

/// Orders detections best-first: by score under `polarity`, then by `y`, then
/// by `x`.
pub(crate) fn detection_cmp(a: &Detection, b: &Detection, polarity: Polarity) -> Ordering {
    let by_score = match polarity {
        Polarity::HigherIsBetter => b.score.total_cmp(&a.score),
        Polarity::LowerIsBetter => a.score.total_cmp(&b.score),
    };
    by_score
        .then_with(|| a.y.cmp(&b.y))
        .then_with(|| a.x.cmp(&b.x))
}

/// Sorts detections best-first with deterministic tie-breaking.
pub fn sort_detections(detections: &mut [Detection], polarity: Polarity) {
    detections.sort_by(|a, b| detection_cmp(a, b, polarity));
}

#[cfg(test)]
mod tests {
    use super::{sort_detections, Detection};
    use crate::score::Polarity;

    #[test]
    fn sort_breaks_ties_by_row_then_column() {
        let mut dets = vec![
            Detection::new(5, 1, 0.8),
            Detection::new(2, 1, 0.8),
            Detection::new(9, 0, 0.8),
            Detection::new(0, 9, 0.95),
        ];
        sort_detections(&mut dets, Polarity::HigherIsBetter);
        let order: Vec<_> = dets.iter().map(|d| (d.x, d.y)).collect();
        assert_eq!(order, vec![(0, 9), (9, 0), (2, 1), (5, 1)]);
    }

    #[test]
    fn lower_polarity_puts_smallest_first() {
        let mut dets = vec![Detection::new(0, 0, 0.4), Detection::new(1, 0, 0.1)];
        sort_detections(&mut dets, Polarity::LowerIsBetter);
        assert_eq!(dets[0].score, 0.1);
    }
}
