//! Threshold evaluation policy.
//!
//! Pure decision logic: one [`Reading`] against one [`ThresholdSet`] yields
//! at most one [`AlertDecision`]. Critical bands are checked before warning
//! bands so the most severe classification is the one reported; comparisons
//! are inclusive, so a reading exactly on a boundary counts as crossed.

use std::fmt;

/// One frequency sample from the source. Immutable once obtained.
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    /// Grid frequency in Hz.
    pub frequency: f64,
    /// ISO-8601 timestamp reported by the source, kept verbatim.
    pub timestamp: String,
}

/// Alert severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Level {
    /// Inside the critical band but outside the warning band.
    Warning,
    /// Outside the critical band.
    Critical,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Warning => write!(f, "WARNING"),
            Self::Critical => write!(f, "CRITICAL"),
        }
    }
}

/// Which boundary was crossed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// The lower boundary.
    Min,
    /// The upper boundary.
    Max,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Min => write!(f, "MIN"),
            Self::Max => write!(f, "MAX"),
        }
    }
}

/// The four ordered band boundaries.
///
/// Invariant: `critical_min < warning_min < warning_max < critical_max`,
/// validated once at configuration time and assumed true here. The
/// simplified two-band profile (`min_hz`/`max_hz` only) is the same struct
/// with the critical bounds at ±∞, so only the warning checks can ever fire
/// and a single evaluation path serves both profiles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdSet {
    /// Lower critical boundary in Hz.
    pub critical_min: f64,
    /// Lower warning boundary in Hz.
    pub warning_min: f64,
    /// Upper warning boundary in Hz.
    pub warning_max: f64,
    /// Upper critical boundary in Hz.
    pub critical_max: f64,
}

impl ThresholdSet {
    /// Classify a reading against the bands.
    ///
    /// Checked in this exact order, first match wins: critical-min,
    /// critical-max, warning-min, warning-max. Returns `None` when the
    /// frequency sits strictly inside the warning band.
    pub fn evaluate(&self, reading: &Reading) -> Option<AlertDecision> {
        let f = reading.frequency;
        let (level, direction, threshold) = if f <= self.critical_min {
            (Level::Critical, Direction::Min, self.critical_min)
        } else if f >= self.critical_max {
            (Level::Critical, Direction::Max, self.critical_max)
        } else if f <= self.warning_min {
            (Level::Warning, Direction::Min, self.warning_min)
        } else if f >= self.warning_max {
            (Level::Warning, Direction::Max, self.warning_max)
        } else {
            return None;
        };

        Some(AlertDecision {
            level,
            direction,
            threshold,
            frequency: f,
            timestamp: reading.timestamp.clone(),
        })
    }

    /// Whether the critical bounds are active (false for the two-band profile).
    pub fn has_critical_band(&self) -> bool {
        self.critical_min.is_finite() && self.critical_max.is_finite()
    }
}

/// The outcome of evaluating a reading that crossed a band.
///
/// Created fresh per evaluation, never mutated or stored.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertDecision {
    /// Severity of the crossed band.
    pub level: Level,
    /// Which boundary was crossed.
    pub direction: Direction,
    /// The boundary value that was crossed, in Hz.
    pub threshold: f64,
    /// The frequency that triggered the alert, in Hz.
    pub frequency: f64,
    /// Timestamp of the reading, verbatim from the source.
    pub timestamp: String,
}
