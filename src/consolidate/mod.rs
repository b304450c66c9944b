//! Merging of spatially close raw detections.
//!
//! A merge pass replaces every detection with the best detection of its
//! closed neighbourhood and drops duplicates. Passes repeat until the set
//! stops shrinking, at which point no two survivors are close.

pub mod detection;

pub use detection::{sort_detections, Detection};

use crate::score::Polarity;
use crate::trace::trace_event;
use detection::detection_cmp;

/// Returns true when `a` and `b` lie within one cluster extent of each other.
///
/// Symmetric; every detection is close to itself.
pub fn is_close(a: &Detection, b: &Detection, cluster_width: usize, cluster_height: usize) -> bool {
    let dx = a.x.abs_diff(b.x) as u128;
    let dy = a.y.abs_diff(b.y) as u128;
    let cw = cluster_width as u128;
    let ch = cluster_height as u128;
    // Squares of usize values fit in u128; only the sums can saturate, and
    // then only when both axis checks already hold.
    dx <= cw && dy <= ch && (dx * dx).saturating_add(dy * dy) <= (cw * cw).saturating_add(ch * ch)
}

/// Detection merger.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Consolidator {
    /// Horizontal cluster extent in pixels.
    pub cluster_width: usize,
    /// Vertical cluster extent in pixels.
    pub cluster_height: usize,
    /// Which scores are better.
    pub polarity: Polarity,
    /// Upper bound on merge passes; `None` runs to the fixed point.
    pub max_passes: Option<usize>,
}

impl Consolidator {
    /// Higher-is-better merger running to the fixed point.
    pub fn new(cluster_width: usize, cluster_height: usize) -> Self {
        Self {
            cluster_width,
            cluster_height,
            polarity: Polarity::HigherIsBetter,
            max_passes: None,
        }
    }

    /// Sets the score polarity.
    pub fn with_polarity(mut self, polarity: Polarity) -> Self {
        self.polarity = polarity;
        self
    }

    /// Caps the number of merge passes.
    pub fn with_max_passes(mut self, max_passes: Option<usize>) -> Self {
        self.max_passes = max_passes;
        self
    }

    /// One merge pass. The result is sorted best-first and holds no
    /// duplicate values.
    pub fn pass(&self, detections: &[Detection]) -> Vec<Detection> {
        let mut merged: Vec<Detection> = detections
            .iter()
            .map(|d| {
                detections
                    .iter()
                    .filter(|e| is_close(d, e, self.cluster_width, self.cluster_height))
                    .min_by(|a, b| detection_cmp(a, b, self.polarity))
                    .copied()
                    .unwrap_or(*d)
            })
            .collect();
        sort_detections(&mut merged, self.polarity);
        merged.dedup();
        merged
    }

    /// Runs merge passes until the set stops shrinking or the pass cap is
    /// reached.
    pub fn run(&self, detections: &[Detection]) -> Vec<Detection> {
        let mut current = detections.to_vec();
        sort_detections(&mut current, self.polarity);
        current.dedup();

        let mut passes = 0usize;
        loop {
            if self.max_passes.is_some_and(|cap| passes >= cap) {
                break;
            }
            let next = self.pass(&current);
            passes += 1;
            let shrunk = next.len() < current.len();
            current = next;
            if !shrunk {
                break;
            }
        }
        trace_event!("consolidated", passes = passes, kept = current.len());
        current
    }
}

/// Merges close higher-is-better detections to the fixed point.
pub fn consolidate(
    detections: &[Detection],
    cluster_width: usize,
    cluster_height: usize,
) -> Vec<Detection> {
    Consolidator::new(cluster_width, cluster_height).run(detections)
}
