//! Brute-force k-nearest-neighbour descriptor matching (k = 2).

use crate::features::brief::{hamming, Descriptor};

/// Best and second-best train neighbours of one query descriptor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KnnMatch {
    /// Index of the query descriptor (region side).
    pub query_idx: usize,
    /// Index of the nearest train descriptor (template side).
    pub train_idx: usize,
    /// Hamming distance to the nearest train descriptor.
    pub distance: u32,
    /// Hamming distance to the second-nearest train descriptor, if any.
    pub second_distance: Option<u32>,
}

impl KnnMatch {
    /// Ratio of the best to the second-best distance.
    ///
    /// A missing second neighbour is perfectly unique (ratio 0); a zero second
    /// distance forces a zero best distance and counts as a full tie (ratio 1).
    pub fn distance_ratio(&self) -> f32 {
        match self.second_distance {
            None => 0.0,
            Some(0) => 1.0,
            Some(second) => self.distance as f32 / second as f32,
        }
    }
}

/// Matches every query descriptor against all train descriptors.
///
/// Ties on distance resolve to the lower train index. Returns an empty list
/// when either side is empty.
pub fn knn_match(query: &[Descriptor], train: &[Descriptor]) -> Vec<KnnMatch> {
    if train.is_empty() {
        return Vec::new();
    }
    query
        .iter()
        .enumerate()
        .map(|(query_idx, q)| {
            let mut best = (u32::MAX, 0usize);
            let mut second: Option<u32> = None;
            for (train_idx, t) in train.iter().enumerate() {
                let d = hamming(q, t);
                if d < best.0 {
                    if best.0 != u32::MAX {
                        second = Some(best.0);
                    }
                    best = (d, train_idx);
                } else if second.map_or(true, |s| d < s) {
                    second = Some(d);
                }
            }
            KnnMatch {
                query_idx,
                train_idx: best.1,
                distance: best.0,
                second_distance: second,
            }
        })
        .collect()
}
