//! Joint histograms over per-pixel bin indices.
//!
//! Every pixel of a scored image is mapped once to its joint bin index; the
//! dense score map then slides a template-sized histogram over the index
//! plane, adding the entering column and removing the leaving one.

use crate::image::{ImageView, OwnedImage};
use crate::score::channels::{ChannelRange, ColorSpace};
use crate::score::compare::{ComparisonMethod, Reference};
use crate::util::{SymbolScanError, SymbolScanResult};

/// Largest joint histogram accepted.
pub const MAX_JOINT_BINS: usize = 1 << 20;

/// Bins used per channel of a multi-channel space when no override is given.
pub const DEFAULT_MULTI_CHANNEL_BINS: usize = 25;

/// Per-channel binning of a color space.
#[derive(Clone, Debug, PartialEq)]
pub struct BinLayout {
    channels: Vec<(ChannelRange, usize)>,
    total: usize,
}

impl BinLayout {
    /// Resolves bin counts for `space`.
    ///
    /// `bins_per_channel` overrides every channel; otherwise single-channel
    /// spaces use their natural bin count and multi-channel spaces use
    /// [`DEFAULT_MULTI_CHANNEL_BINS`].
    pub fn new(space: ColorSpace, bins_per_channel: Option<usize>) -> SymbolScanResult<Self> {
        if bins_per_channel == Some(0) {
            return Err(SymbolScanError::InvalidConfiguration {
                reason: "bins_per_channel must be at least 1",
            });
        }
        let ranges = space.channels();
        let channels: Vec<(ChannelRange, usize)> = ranges
            .iter()
            .map(|&range| {
                let bins = match bins_per_channel {
                    Some(bins) => bins,
                    None if ranges.len() == 1 => range.natural_bins,
                    None => DEFAULT_MULTI_CHANNEL_BINS,
                };
                (range, bins)
            })
            .collect();
        let total = channels
            .iter()
            .try_fold(1usize, |acc, &(_, bins)| acc.checked_mul(bins))
            .filter(|&total| total <= MAX_JOINT_BINS)
            .ok_or(SymbolScanError::InvalidConfiguration {
                reason: "joint histogram exceeds 2^20 bins",
            })?;
        Ok(Self { channels, total })
    }

    /// Returns the number of joint bins.
    pub fn total_bins(&self) -> usize {
        self.total
    }

    /// Returns the bin count of each channel.
    pub fn bins_per_channel(&self) -> Vec<usize> {
        self.channels.iter().map(|&(_, bins)| bins).collect()
    }

    /// Maps every pixel of the channel planes to its joint bin index.
    ///
    /// Channel 0 is the most significant digit of the joint index.
    pub fn index_map(&self, planes: &[OwnedImage]) -> SymbolScanResult<OwnedImage<u32>> {
        let first = planes.first().ok_or(SymbolScanError::InvalidConfiguration {
            reason: "no channel planes to histogram",
        })?;
        if planes.len() != self.channels.len() {
            return Err(SymbolScanError::InvalidConfiguration {
                reason: "channel plane count does not match the color space",
            });
        }
        let (width, height) = (first.width(), first.height());
        if planes
            .iter()
            .any(|p| p.width() != width || p.height() != height)
        {
            return Err(SymbolScanError::InvalidDimensions { width, height });
        }

        let mut out = vec![0u32; width * height];
        for (plane, &(range, bins)) in planes.iter().zip(self.channels.iter()) {
            for (slot, &v) in out.iter_mut().zip(plane.data()) {
                *slot = *slot * bins as u32 + bin_of(v, range, bins);
            }
        }
        OwnedImage::new(out, width, height)
    }
}

fn bin_of(v: u8, range: ChannelRange, bins: usize) -> u32 {
    let span = usize::from(range.hi - range.lo) + 1;
    let offset = usize::from(v.clamp(range.lo, range.hi) - range.lo);
    (offset * bins / span) as u32
}

/// Normalized histogram (unit sum) of a bin index view.
pub(crate) fn normalized_histogram(indices: ImageView<'_, u32>, total: usize) -> Vec<f64> {
    let mut counts = vec![0u32; total];
    for y in 0..indices.height() {
        if let Some(row) = indices.row(y) {
            for &idx in row {
                counts[idx as usize] += 1;
            }
        }
    }
    let n = (indices.width() * indices.height()) as f64;
    counts.into_iter().map(|c| f64::from(c) / n).collect()
}

/// Dense comparison scores for every template placement inside a region.
#[derive(Clone, Debug, PartialEq)]
pub struct ScoreMap {
    data: Vec<f32>,
    width: usize,
    height: usize,
}

impl ScoreMap {
    /// Creates a score map from row-major values.
    pub fn new(data: Vec<f32>, width: usize, height: usize) -> SymbolScanResult<Self> {
        if width == 0 || height == 0 {
            return Err(SymbolScanError::InvalidDimensions { width, height });
        }
        if data.len() != width * height {
            return Err(SymbolScanError::BufferTooSmall {
                needed: width * height,
                got: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Number of placements per row.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of placement rows.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Row-major scores.
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Score of the placement with top-left corner `(x, y)`.
    pub fn get(&self, x: usize, y: usize) -> Option<f32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data.get(y * self.width + x).copied()
    }
}

/// Back-projects `reference` over `region`: one comparison per
/// template-sized placement.
pub(crate) fn back_project(
    region: ImageView<'_, u32>,
    template_width: usize,
    template_height: usize,
    reference: &Reference,
    method: ComparisonMethod,
) -> SymbolScanResult<ScoreMap> {
    if region.width() < template_width || region.height() < template_height {
        return Err(SymbolScanError::RegionTooSmall {
            region_width: region.width(),
            region_height: region.height(),
            template_width,
            template_height,
        });
    }
    let map_w = region.width() - template_width + 1;
    let map_h = region.height() - template_height + 1;
    let total = reference.bins.len();
    let inv_n = 1.0 / (template_width * template_height) as f64;

    let mut counts = vec![0u32; total];
    let mut patch = vec![0.0f64; total];
    let mut data = Vec::with_capacity(map_w * map_h);
    for y in 0..map_h {
        let rows: Vec<&[u32]> = (y..y + template_height)
            .filter_map(|ry| region.row(ry))
            .collect();
        counts.iter_mut().for_each(|c| *c = 0);
        for row in &rows {
            for &idx in &row[..template_width] {
                counts[idx as usize] += 1;
            }
        }
        for x in 0..map_w {
            if x > 0 {
                for row in &rows {
                    counts[row[x - 1] as usize] -= 1;
                    counts[row[x + template_width - 1] as usize] += 1;
                }
            }
            for (p, &c) in patch.iter_mut().zip(counts.iter()) {
                *p = f64::from(c) * inv_n;
            }
            data.push(method.compare(&patch, reference) as f32);
        }
    }
    ScoreMap::new(data, map_w, map_h)
}
