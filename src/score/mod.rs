//! Histogram back-projection scoring of a region against a template.
//!
//! The template's joint color histogram is the reference. Every
//! template-sized placement inside a region is histogrammed and compared with
//! it, and the best placement (by the method's polarity) is the region's
//! match.

pub mod channels;
pub mod compare;
pub mod histogram;

pub use channels::{ChannelRange, ColorSpace};
pub use compare::{ComparisonMethod, Polarity};
pub use histogram::{BinLayout, ScoreMap};

use crate::image::{ColorImage, ImageView, OwnedImage};
use crate::util::{SymbolScanError, SymbolScanResult};
use compare::Reference;

/// Histogram scoring parameters.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScoreConfig {
    /// Channels histogrammed.
    pub color_space: ColorSpace,
    /// Histogram comparison method.
    pub method: ComparisonMethod,
    /// Bin count override applied to every channel.
    pub bins_per_channel: Option<usize>,
}

impl ScoreConfig {
    /// Checks that the bin layout is representable.
    pub fn validate(&self) -> SymbolScanResult<()> {
        BinLayout::new(self.color_space, self.bins_per_channel).map(|_| ())
    }
}

/// Best placement inside a region, in region-local coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RegionMatch {
    /// Left edge of the best placement.
    pub x: usize,
    /// Top edge of the best placement.
    pub y: usize,
    /// Comparison value at that placement.
    pub value: f32,
}

/// Returns the best placement of a score map.
///
/// The global maximum for higher-is-better methods, the global minimum
/// otherwise; ties resolve to the first placement in row-major order.
pub fn best_match(map: &ScoreMap, method: ComparisonMethod) -> RegionMatch {
    let polarity = method.polarity();
    let mut best = RegionMatch {
        x: 0,
        y: 0,
        value: map.data()[0],
    };
    for (i, &value) in map.data().iter().enumerate().skip(1) {
        if polarity.is_better(value, best.value) {
            best = RegionMatch {
                x: i % map.width(),
                y: i / map.width(),
                value,
            };
        }
    }
    best
}

/// Template reference prepared for repeated region scoring.
#[derive(Clone, Debug, PartialEq)]
pub struct TemplateReference {
    reference: Reference,
    width: usize,
    height: usize,
}

impl TemplateReference {
    /// Template width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Template height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Normalized reference histogram.
    pub fn histogram(&self) -> &[f64] {
        &self.reference.bins
    }
}

/// Scores regions against a template reference histogram.
#[derive(Clone, Debug)]
pub struct RegionScorer {
    cfg: ScoreConfig,
    layout: BinLayout,
}

impl RegionScorer {
    /// Creates a scorer after resolving the bin layout.
    pub fn new(cfg: ScoreConfig) -> SymbolScanResult<Self> {
        let layout = BinLayout::new(cfg.color_space, cfg.bins_per_channel)?;
        Ok(Self { cfg, layout })
    }

    /// Returns the scoring parameters.
    pub fn config(&self) -> &ScoreConfig {
        &self.cfg
    }

    /// Returns the resolved bin layout.
    pub fn layout(&self) -> &BinLayout {
        &self.layout
    }

    /// Maps every pixel of `image` to its joint bin index.
    pub fn index_map(&self, image: &ColorImage) -> SymbolScanResult<OwnedImage<u32>> {
        self.layout.index_map(&self.cfg.color_space.extract(image))
    }

    /// Builds the reference histogram of `template`.
    pub fn prepare(&self, template: &ColorImage) -> SymbolScanResult<TemplateReference> {
        let indices = self.index_map(template)?;
        let bins = histogram::normalized_histogram(indices.view(), self.layout.total_bins());
        Ok(TemplateReference {
            reference: Reference::new(bins),
            width: template.width(),
            height: template.height(),
        })
    }

    /// Dense score map of `reference` over a region given as bin indices.
    pub fn score_map(
        &self,
        reference: &TemplateReference,
        region: ImageView<'_, u32>,
    ) -> SymbolScanResult<ScoreMap> {
        if region
            .as_slice()
            .iter()
            .take(region.stride() * (region.height() - 1) + region.width())
            .any(|&idx| idx as usize >= self.layout.total_bins())
        {
            return Err(SymbolScanError::InvalidConfiguration {
                reason: "bin index map was built with a different layout",
            });
        }
        histogram::back_project(
            region,
            reference.width,
            reference.height,
            &reference.reference,
            self.cfg.method,
        )
    }

    /// Best placement of `reference` inside a region given as bin indices.
    pub fn score_region(
        &self,
        reference: &TemplateReference,
        region: ImageView<'_, u32>,
    ) -> SymbolScanResult<RegionMatch> {
        let map = self.score_map(reference, region)?;
        Ok(best_match(&map, self.cfg.method))
    }

    /// One-shot scoring of `template` inside `region`.
    pub fn score(&self, template: &ColorImage, region: &ColorImage) -> SymbolScanResult<RegionMatch> {
        if region.width() < template.width() || region.height() < template.height() {
            return Err(SymbolScanError::RegionTooSmall {
                region_width: region.width(),
                region_height: region.height(),
                template_width: template.width(),
                template_height: template.height(),
            });
        }
        let reference = self.prepare(template)?;
        let indices = self.index_map(region)?;
        self.score_region(&reference, indices.view())
    }
}

#[cfg(test)]
mod tests {
    use super::{best_match, ComparisonMethod, RegionScorer, ScoreConfig, ScoreMap};
    use crate::image::ColorImage;

    #[test]
    fn best_match_respects_polarity_and_ties() {
        let map = ScoreMap::new(vec![0.3, 0.9, 0.1, 0.9, 0.1, 0.5], 3, 2).unwrap();
        let hi = best_match(&map, ComparisonMethod::Correlation);
        assert_eq!((hi.x, hi.y, hi.value), (1, 0, 0.9));
        let lo = best_match(&map, ComparisonMethod::ChiSquare);
        assert_eq!((lo.x, lo.y, lo.value), (2, 0, 0.1));
    }

    #[test]
    fn scorer_finds_embedded_template() {
        let (w, h) = (24usize, 20usize);
        let mut data = vec![0u8; w * h * 3];
        let (tw, th) = (6usize, 5usize);
        let mut tpl = Vec::with_capacity(tw * th * 3);
        for ty in 0..th {
            for tx in 0..tw {
                let v = (40 + (tx * 31 + ty * 17) % 200) as u8;
                tpl.extend_from_slice(&[v, v, v]);
                let idx = ((ty + 9) * w + tx + 11) * 3;
                data[idx..idx + 3].copy_from_slice(&[v, v, v]);
            }
        }
        let template = ColorImage::new(tpl, tw, th).unwrap();
        let region = ColorImage::new(data, w, h).unwrap();
        let scorer = RegionScorer::new(ScoreConfig::default()).unwrap();
        let found = scorer.score(&template, &region).unwrap();
        assert_eq!((found.x, found.y), (11, 9));
        assert!((found.value - 1.0).abs() < 1e-5);
    }

    #[test]
    fn region_smaller_than_template_fails() {
        let template = ColorImage::new(vec![0; 4 * 4 * 3], 4, 4).unwrap();
        let region = ColorImage::new(vec![0; 3 * 8 * 3], 3, 8).unwrap();
        let scorer = RegionScorer::new(ScoreConfig::default()).unwrap();
        assert!(scorer.score(&template, &region).is_err());
    }
}
