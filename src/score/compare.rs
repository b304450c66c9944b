//! Histogram comparison methods and their polarity.

/// Whether larger or smaller comparison values mean a better match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Polarity {
    /// Larger values are better.
    HigherIsBetter,
    /// Smaller values are better.
    LowerIsBetter,
}

impl Polarity {
    /// Returns true when `candidate` is strictly better than `incumbent`.
    pub fn is_better(self, candidate: f32, incumbent: f32) -> bool {
        match self {
            Polarity::HigherIsBetter => candidate > incumbent,
            Polarity::LowerIsBetter => candidate < incumbent,
        }
    }
}

/// Histogram comparison method.
///
/// In every formula `p` is the patch histogram and `r` the reference
/// histogram, both normalized to unit sum.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ComparisonMethod {
    /// Pearson correlation of the bin values; 1 for a perfect match.
    #[default]
    Correlation,
    /// `sum((p - r)^2 / p)` over bins with `p > 0`; 0 for a perfect match.
    ChiSquare,
    /// `sum(min(p, r))`; 1 for a perfect match.
    Intersection,
    /// Hellinger form of the Bhattacharyya distance; 0 for a perfect match.
    Bhattacharyya,
}

impl ComparisonMethod {
    /// Returns the polarity of the method's values.
    pub fn polarity(self) -> Polarity {
        match self {
            ComparisonMethod::Correlation | ComparisonMethod::Intersection => {
                Polarity::HigherIsBetter
            }
            ComparisonMethod::ChiSquare | ComparisonMethod::Bhattacharyya => {
                Polarity::LowerIsBetter
            }
        }
    }

    /// Compares a patch histogram against the reference histogram.
    pub(crate) fn compare(self, patch: &[f64], reference: &Reference) -> f64 {
        let r = &reference.bins;
        match self {
            ComparisonMethod::Correlation => {
                let n = patch.len() as f64;
                let mean_p = patch.iter().sum::<f64>() / n;
                let mut num = 0.0;
                let mut den_p = 0.0;
                for (&p, &q) in patch.iter().zip(r.iter()) {
                    let dp = p - mean_p;
                    num += dp * (q - reference.mean);
                    den_p += dp * dp;
                }
                let den = den_p * reference.centered_sq;
                if den.abs() > f64::EPSILON {
                    num / den.sqrt()
                } else {
                    1.0
                }
            }
            ComparisonMethod::ChiSquare => patch
                .iter()
                .zip(r.iter())
                .filter(|(p, _)| **p > f64::EPSILON)
                .map(|(&p, &q)| (p - q) * (p - q) / p)
                .sum(),
            ComparisonMethod::Intersection => {
                patch.iter().zip(r.iter()).map(|(&p, &q)| p.min(q)).sum()
            }
            ComparisonMethod::Bhattacharyya => {
                let sum_p: f64 = patch.iter().sum();
                let coefficient: f64 = patch
                    .iter()
                    .zip(r.iter())
                    .map(|(&p, &q)| (p * q).sqrt())
                    .sum();
                let norm = sum_p * reference.sum;
                let scale = if norm.abs() > f64::EPSILON {
                    1.0 / norm.sqrt()
                } else {
                    1.0
                };
                (1.0 - coefficient * scale).max(0.0).sqrt()
            }
        }
    }
}

/// Reference histogram with the statistics every comparison reuses.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Reference {
    pub(crate) bins: Vec<f64>,
    mean: f64,
    centered_sq: f64,
    sum: f64,
}

impl Reference {
    pub(crate) fn new(bins: Vec<f64>) -> Self {
        let sum: f64 = bins.iter().sum();
        let mean = sum / bins.len().max(1) as f64;
        let centered_sq = bins.iter().map(|&b| (b - mean) * (b - mean)).sum();
        Self {
            bins,
            mean,
            centered_sq,
            sum,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ComparisonMethod, Polarity, Reference};

    #[test]
    fn identical_histograms_score_perfectly() {
        let h = vec![0.5, 0.25, 0.25, 0.0];
        let r = Reference::new(h.clone());
        assert!((ComparisonMethod::Correlation.compare(&h, &r) - 1.0).abs() < 1e-12);
        assert!(ComparisonMethod::ChiSquare.compare(&h, &r).abs() < 1e-12);
        assert!((ComparisonMethod::Intersection.compare(&h, &r) - 1.0).abs() < 1e-12);
        assert!(ComparisonMethod::Bhattacharyya.compare(&h, &r).abs() < 1e-6);
    }

    #[test]
    fn disjoint_histograms_score_worst() {
        let p = vec![1.0, 0.0];
        let r = Reference::new(vec![0.0, 1.0]);
        assert!((ComparisonMethod::Correlation.compare(&p, &r) + 1.0).abs() < 1e-12);
        assert_eq!(ComparisonMethod::Intersection.compare(&p, &r), 0.0);
        assert!((ComparisonMethod::Bhattacharyya.compare(&p, &r) - 1.0).abs() < 1e-12);
        assert!((ComparisonMethod::ChiSquare.compare(&p, &r) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn flat_histograms_correlate_to_one() {
        let p = vec![0.25; 4];
        let r = Reference::new(vec![0.25; 4]);
        assert_eq!(ComparisonMethod::Correlation.compare(&p, &r), 1.0);
    }

    #[test]
    fn polarity_per_method() {
        assert_eq!(ComparisonMethod::Correlation.polarity(), Polarity::HigherIsBetter);
        assert_eq!(ComparisonMethod::Intersection.polarity(), Polarity::HigherIsBetter);
        assert_eq!(ComparisonMethod::ChiSquare.polarity(), Polarity::LowerIsBetter);
        assert_eq!(ComparisonMethod::Bhattacharyya.polarity(), Polarity::LowerIsBetter);
        assert!(Polarity::LowerIsBetter.is_better(0.1, 0.2));
        assert!(!Polarity::HigherIsBetter.is_better(0.2, 0.2));
    }
}
