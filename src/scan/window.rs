//! Scan window geometry.

use crate::util::{SymbolScanError, SymbolScanResult};

/// Rectangular candidate region of the target, in target pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Window {
    /// Left edge.
    pub x: usize,
    /// Top edge.
    pub y: usize,
    /// Width in pixels.
    pub width: usize,
    /// Height in pixels.
    pub height: usize,
}

/// Half-overlapping window grid over a target.
///
/// Windows are `factor` templates wide and high and advance by half a window;
/// window `i` starts at `i * window / 2`. Along each axis the grid holds
/// `floor(target / template / factor) * 2 - 1` positions; a non-positive
/// count means no windows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScanGrid {
    window_width: usize,
    window_height: usize,
    steps_x: usize,
    steps_y: usize,
}

impl ScanGrid {
    /// Builds the grid.
    ///
    /// Fails with `InvalidConfiguration` when `factor` is zero or the window
    /// size overflows, and with `InvalidDimensions` for an empty template.
    pub fn new(
        target_width: usize,
        target_height: usize,
        template_width: usize,
        template_height: usize,
        factor: usize,
    ) -> SymbolScanResult<Self> {
        if factor == 0 {
            return Err(SymbolScanError::InvalidConfiguration {
                reason: "window_size_factor must be at least 1",
            });
        }
        if template_width == 0 || template_height == 0 {
            return Err(SymbolScanError::InvalidDimensions {
                width: template_width,
                height: template_height,
            });
        }
        let (window_width, window_height) = template_width
            .checked_mul(factor)
            .zip(template_height.checked_mul(factor))
            .ok_or(SymbolScanError::InvalidConfiguration {
                reason: "window_size_factor overflows the window size",
            })?;
        let steps = |target: usize, template: usize| -> usize {
            (target / template / factor).saturating_mul(2).saturating_sub(1)
        };
        Ok(Self {
            window_width,
            window_height,
            steps_x: steps(target_width, template_width),
            steps_y: steps(target_height, template_height),
        })
    }

    /// Window positions along x.
    pub fn steps_x(&self) -> usize {
        self.steps_x
    }

    /// Window positions along y.
    pub fn steps_y(&self) -> usize {
        self.steps_y
    }

    /// Total number of windows.
    pub fn len(&self) -> usize {
        self.steps_x * self.steps_y
    }

    /// Returns true when the target cannot hold a single window.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Window at grid position `(i, j)`.
    pub fn window(&self, i: usize, j: usize) -> Window {
        Window {
            x: i * self.window_width / 2,
            y: j * self.window_height / 2,
            width: self.window_width,
            height: self.window_height,
        }
    }

    /// All windows in row-major order.
    pub fn windows(&self) -> impl Iterator<Item = Window> + '_ {
        (0..self.steps_y).flat_map(move |j| (0..self.steps_x).map(move |i| self.window(i, j)))
    }
}
