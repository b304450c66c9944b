//! Sliding-window symbol scanning.
//!
//! The target is split into half-overlapping windows twice the template size
//! (by default). Each window is aligned against the template and, when
//! alignment succeeds, scored by histogram back-projection; accepted window
//! matches become raw detections, which are finally consolidated.

pub mod window;

pub use window::{ScanGrid, Window};

use crate::align::{AlignConfig, AlignResult, Aligner, FeatureAligner, Homography};
use crate::consolidate::{Consolidator, Detection};
use crate::image::{ColorImage, ImageView};
use crate::score::{Polarity, RegionScorer, ScoreConfig, TemplateReference};
use crate::trace::{trace_event, trace_span, trace_window};
use crate::util::{SymbolScanError, SymbolScanResult};
#[cfg(feature = "rayon")]
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Full scan configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct ScanConfig {
    /// Window size in multiples of the template size.
    pub window_size_factor: usize,
    /// Alignment parameters.
    pub align: AlignConfig,
    /// Scoring parameters.
    pub score: ScoreConfig,
    /// A window match becomes a raw detection only when its value is strictly
    /// better than this threshold.
    pub score_accept_threshold: f32,
    /// Horizontal consolidation extent; defaults to template width - 1.
    pub cluster_width: Option<usize>,
    /// Vertical consolidation extent; defaults to template height - 1.
    pub cluster_height: Option<usize>,
    /// Skip windows whose alignment fails instead of scoring them anyway.
    pub require_alignment: bool,
    /// Process windows on the rayon pool (needs the `rayon` feature).
    pub parallel: bool,
    /// Cap on consolidation passes; `None` runs to the fixed point.
    pub max_consolidation_passes: Option<usize>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            window_size_factor: 2,
            align: AlignConfig::default(),
            score: ScoreConfig::default(),
            score_accept_threshold: 0.7,
            cluster_width: None,
            cluster_height: None,
            require_alignment: true,
            parallel: true,
            max_consolidation_passes: None,
        }
    }
}

impl ScanConfig {
    /// Checks every parameter range.
    pub fn validate(&self) -> SymbolScanResult<()> {
        self.validate_scan()?;
        self.align.validate()?;
        self.score.validate()
    }

    /// Checks the parameters the scanner itself consumes.
    fn validate_scan(&self) -> SymbolScanResult<()> {
        if self.window_size_factor == 0 {
            return Err(SymbolScanError::InvalidConfiguration {
                reason: "window_size_factor must be at least 1",
            });
        }
        if !self.score_accept_threshold.is_finite() {
            return Err(SymbolScanError::InvalidConfiguration {
                reason: "score_accept_threshold must be finite",
            });
        }
        if self.max_consolidation_passes == Some(0) {
            return Err(SymbolScanError::InvalidConfiguration {
                reason: "max_consolidation_passes must be at least 1",
            });
        }
        Ok(())
    }
}

/// Cooperative cancellation flag shared with a running scan.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Creates an unset token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation; windows not yet started are skipped.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Returns true once cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// What happened in one window.
#[derive(Clone, Debug, PartialEq)]
pub struct WindowReport {
    /// The window.
    pub window: Window,
    /// Alignment outcome; `None` when the aligner itself failed.
    pub alignment: Option<AlignResult>,
    /// Best match in target coordinates, if the window was scored.
    pub best: Option<Detection>,
    /// True when `best` cleared the acceptance threshold.
    pub accepted: bool,
}

impl WindowReport {
    /// Template-to-window transform of a successful alignment.
    pub fn transform(&self) -> Option<&Homography> {
        self.alignment.as_ref().and_then(|a| a.transform.as_ref())
    }
}

/// Result of a full scan.
#[derive(Clone, Debug, PartialEq)]
pub struct ScanOutcome {
    /// Consolidated detections, best first.
    pub detections: Vec<Detection>,
    /// Accepted window matches in row-major window order.
    pub raw_detections: Vec<Detection>,
    /// Number of windows visited.
    pub windows_scanned: usize,
    /// Per-window diagnostics in row-major window order.
    pub windows: Vec<WindowReport>,
}

/// Returns true when `value` is strictly better than `threshold`.
pub fn accepts(value: f32, threshold: f32, polarity: Polarity) -> bool {
    polarity.is_better(value, threshold)
}

struct PreparedScan<'a, M> {
    model: M,
    reference: TemplateReference,
    gray: ImageView<'a, u8>,
    indices: ImageView<'a, u32>,
}

/// Reusable scanner bound to a configuration and an aligner.
#[derive(Clone, Debug)]
pub struct SymbolScanner<A: Aligner = FeatureAligner> {
    cfg: ScanConfig,
    aligner: A,
    scorer: RegionScorer,
}

impl SymbolScanner<FeatureAligner> {
    /// Creates a scanner with the feature aligner configured by `cfg.align`.
    pub fn new(cfg: ScanConfig) -> SymbolScanResult<Self> {
        cfg.validate()?;
        let aligner = FeatureAligner::new(cfg.align.clone())?;
        Self::with_aligner(cfg, aligner)
    }
}

impl<A: Aligner> SymbolScanner<A> {
    /// Creates a scanner with a custom aligner; `cfg.align` is ignored.
    pub fn with_aligner(cfg: ScanConfig, aligner: A) -> SymbolScanResult<Self> {
        cfg.validate_scan()?;
        let scorer = RegionScorer::new(cfg.score.clone())?;
        Ok(Self {
            cfg,
            aligner,
            scorer,
        })
    }

    /// Returns the scan configuration.
    pub fn config(&self) -> &ScanConfig {
        &self.cfg
    }

    /// Returns the aligner.
    pub fn aligner(&self) -> &A {
        &self.aligner
    }

    /// Consolidator for a template of the given size.
    pub fn consolidator(&self, template_width: usize, template_height: usize) -> Consolidator {
        Consolidator::new(
            self.cfg
                .cluster_width
                .unwrap_or(template_width.saturating_sub(1)),
            self.cfg
                .cluster_height
                .unwrap_or(template_height.saturating_sub(1)),
        )
        .with_polarity(self.cfg.score.method.polarity())
        .with_max_passes(self.cfg.max_consolidation_passes)
    }

    /// Scans `target` for `template` and consolidates the raw detections.
    pub fn scan(&self, template: &ColorImage, target: &ColorImage) -> SymbolScanResult<ScanOutcome> {
        self.scan_with_cancel(template, target, &CancelToken::new())
    }

    /// Like [`scan`](Self::scan), aborting with `Cancelled` once `cancel`
    /// fires.
    pub fn scan_with_cancel(
        &self,
        template: &ColorImage,
        target: &ColorImage,
        cancel: &CancelToken,
    ) -> SymbolScanResult<ScanOutcome> {
        let (tw, th) = (template.width(), template.height());
        let grid = ScanGrid::new(
            target.width(),
            target.height(),
            tw,
            th,
            self.cfg.window_size_factor,
        )?;
        let _span = trace_span!("scan", windows = grid.len(), template_w = tw, template_h = th)
            .entered();

        let template_gray = template.to_gray();
        let model = self.aligner.prepare(template_gray.view())?;
        let reference = self.scorer.prepare(template)?;
        let target_gray = target.to_gray();
        let target_indices = self.scorer.index_map(target)?;
        let prepared = PreparedScan {
            model,
            reference,
            gray: target_gray.view(),
            indices: target_indices.view(),
        };

        let windows: Vec<Window> = grid.windows().collect();
        let reports = self.scan_windows(&prepared, &windows, cancel)?;

        let raw_detections: Vec<Detection> = reports
            .iter()
            .filter(|r| r.accepted)
            .filter_map(|r| r.best)
            .collect();
        let detections = self.consolidator(tw, th).run(&raw_detections);
        trace_event!(
            "scan_done",
            windows = reports.len(),
            raw = raw_detections.len(),
            kept = detections.len()
        );

        Ok(ScanOutcome {
            detections,
            raw_detections,
            windows_scanned: reports.len(),
            windows: reports,
        })
    }

    fn scan_windows(
        &self,
        prepared: &PreparedScan<'_, A::Model>,
        windows: &[Window],
        cancel: &CancelToken,
    ) -> SymbolScanResult<Vec<WindowReport>> {
        let visit = |window: &Window| -> SymbolScanResult<WindowReport> {
            if cancel.is_cancelled() {
                return Err(SymbolScanError::Cancelled);
            }
            Ok(self.scan_window(prepared, *window))
        };

        #[cfg(feature = "rayon")]
        {
            if self.cfg.parallel {
                return windows.par_iter().map(visit).collect();
            }
        }
        windows.iter().map(visit).collect()
    }

    fn scan_window(&self, prepared: &PreparedScan<'_, A::Model>, window: Window) -> WindowReport {
        let mut report = WindowReport {
            window,
            alignment: None,
            best: None,
            accepted: false,
        };

        let alignment = prepared
            .gray
            .roi(window.x, window.y, window.width, window.height)
            .and_then(|region| self.aligner.align(&prepared.model, region));
        let aligned = match alignment {
            Ok(result) => {
                let success = result.success;
                report.alignment = Some(result);
                success
            }
            Err(err) => {
                trace_window!("window_align_error", window, reason = err.to_string().as_str());
                false
            }
        };
        if !aligned && self.cfg.require_alignment {
            trace_window!("window_skipped", window);
            return report;
        }

        let scored = prepared
            .indices
            .roi(window.x, window.y, window.width, window.height)
            .and_then(|region| self.scorer.score_region(&prepared.reference, region));
        let found = match scored {
            Ok(found) => found,
            Err(err) => {
                trace_window!("window_score_error", window, reason = err.to_string().as_str());
                return report;
            }
        };

        let detection = Detection::new(window.x + found.x, window.y + found.y, found.value);
        report.best = Some(detection);
        report.accepted = accepts(
            found.value,
            self.cfg.score_accept_threshold,
            self.cfg.score.method.polarity(),
        );
        trace_window!(
            "window_scored",
            window,
            score = found.value,
            accepted = report.accepted
        );
        report
    }
}

/// Scans `target` for `template` with the default feature aligner.
pub fn run_scan(
    template: &ColorImage,
    target: &ColorImage,
    cfg: &ScanConfig,
) -> SymbolScanResult<ScanOutcome> {
    SymbolScanner::new(cfg.clone())?.scan(template, target)
}

#[cfg(test)]
mod tests {
    use super::{accepts, CancelToken, ScanConfig};
    use crate::score::Polarity;

    #[test]
    fn acceptance_is_strict_and_polarity_aware() {
        assert!(accepts(0.71, 0.7, Polarity::HigherIsBetter));
        assert!(!accepts(0.7, 0.7, Polarity::HigherIsBetter));
        assert!(accepts(0.2, 0.7, Polarity::LowerIsBetter));
        assert!(!accepts(0.7, 0.7, Polarity::LowerIsBetter));
    }

    #[test]
    fn config_validation() {
        assert!(ScanConfig::default().validate().is_ok());
        let bad = ScanConfig {
            window_size_factor: 0,
            ..ScanConfig::default()
        };
        assert!(bad.validate().is_err());
        let bad = ScanConfig {
            max_consolidation_passes: Some(0),
            ..ScanConfig::default()
        };
        assert!(bad.validate().is_err());
        let bad = ScanConfig {
            score_accept_threshold: f32::NAN,
            ..ScanConfig::default()
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn cancel_token_is_shared() {
        let token = CancelToken::new();
        let clone = token.clone();
        assert!(!token.is_cancelled());
        clone.cancel();
        assert!(token.is_cancelled());
    }
}
