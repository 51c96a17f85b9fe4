//! Proportional score bar
//!
//! A bar is a fixed number of cells. The first `filled` cells represent the
//! score, the cell right after them marks the boundary, the rest are empty:
//!
//! ```text
//! score 10 / max 30, width 55
//! ███████████████████▓░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░░
//! ```
//!
//! Large maxima are divided down before computing the proportion so the
//! bar keeps its width; the caller's score is never touched.

use thiserror::Error;

/// Number of cells in a bar
pub const DEFAULT_WIDTH: usize = 55;

/// Maxima above this are scaled down before rendering
pub const DEFAULT_SCALE_LIMIT: f64 = 55.0;

/// Divisor applied to score and maximum when scaling
pub const DEFAULT_SCALE_DIVISOR: f64 = 4.0;

/// Recommended upper bound for a carbon score
pub const DEFAULT_RISK_THRESHOLD: f64 = 60.0;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum BarError {
    #[error("cannot draw a bar against a maximum of {max}")]
    InvalidScale { max: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Filled,
    Boundary,
    Empty,
}

/// Colour class of the filled cells, decided once per bar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskClass {
    Safe,
    Warning,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarChart {
    pub cells: Vec<Cell>,
    pub class: RiskClass,
    pub filled: usize,
}

impl BarChart {
    pub fn width(&self) -> usize {
        self.cells.len()
    }

    pub fn has_boundary(&self) -> bool {
        self.filled < self.cells.len()
    }
}

/// Bar geometry and colouring rules
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarStyle {
    pub width: usize,
    pub scale_limit: f64,
    pub scale_divisor: f64,
    pub risk_threshold: f64,
}

impl Default for BarStyle {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            scale_limit: DEFAULT_SCALE_LIMIT,
            scale_divisor: DEFAULT_SCALE_DIVISOR,
            risk_threshold: DEFAULT_RISK_THRESHOLD,
        }
    }
}

impl BarStyle {
    /// Render `score` as a proportion of `max_score`
    pub fn render(&self, score: f64, max_score: f64) -> Result<BarChart, BarError> {
        if !max_score.is_finite() || max_score <= 0.0 {
            return Err(BarError::InvalidScale { max: max_score });
        }
        if !self.scale_divisor.is_finite() || self.scale_divisor <= 0.0 {
            return Err(BarError::InvalidScale { max: max_score });
        }

        let (score_scaled, max_scaled) = if max_score > self.scale_limit {
            (score / self.scale_divisor, max_score / self.scale_divisor)
        } else {
            (score, max_score)
        };

        // width * s / m is (width / m) * s without the intermediate rounding
        let raw = (self.width as f64 * score_scaled / max_scaled).ceil();
        let filled = if raw.is_nan() || raw <= 0.0 {
            0
        } else {
            (raw as usize).min(self.width)
        };

        let cells = (0..self.width)
            .map(|i| match i.cmp(&filled) {
                std::cmp::Ordering::Less => Cell::Filled,
                std::cmp::Ordering::Equal => Cell::Boundary,
                std::cmp::Ordering::Greater => Cell::Empty,
            })
            .collect();

        let class = if score > self.risk_threshold {
            RiskClass::Warning
        } else {
            RiskClass::Safe
        };

        Ok(BarChart {
            cells,
            class,
            filled,
        })
    }
}

/// Render a bar with the default scaling rule
pub fn render_bar(
    score: f64,
    max_score: f64,
    width: usize,
    risk_threshold: f64,
) -> Result<BarChart, BarError> {
    BarStyle {
        width,
        risk_threshold,
        ..BarStyle::default()
    }
    .render(score, max_score)
}
