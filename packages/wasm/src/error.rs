//! Error types for Constellation.
//!
//! The simulation itself never fails: missing routes and missing hubs degrade
//! to particle retirement. Only configuration coming in from the page can be
//! rejected.

use std::fmt;

/// Errors found while validating a [`ConstellationConfig`](crate::config::ConstellationConfig).
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Grid spacing must be a positive, finite number.
    NonPositiveSpacing(f32),
    /// Link factor must be finite and exceed 1.0 or no two lattice points are linked.
    LinkFactorTooSmall(f32),
    /// Speed range is negative, inverted, empty or unbounded.
    InvalidSpeedRange { min: f32, max: f32 },
    /// A probability field is outside `[0, 1]`.
    ProbabilityOutOfRange { field: &'static str, value: f32 },
    /// A distance field is negative or not finite.
    InvalidRadius { field: &'static str, value: f32 },
    /// A fixed hub target lies outside the unit square.
    TargetOutOfRange { index: usize, x: f32, y: f32 },
    /// Free-roam hop range is inverted or empty.
    InvalidHopRange { min: u32, max: u32 },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::NonPositiveSpacing(spacing) => {
                write!(f, "Grid spacing must be positive, got {}", spacing)
            }
            ConfigError::LinkFactorTooSmall(factor) => {
                write!(f, "Link factor must be finite and greater than 1.0, got {}", factor)
            }
            ConfigError::InvalidSpeedRange { min, max } => {
                write!(f, "Invalid speed range {}..{}: need 0 < min < max < inf", min, max)
            }
            ConfigError::ProbabilityOutOfRange { field, value } => {
                write!(f, "{} must be within [0, 1], got {}", field, value)
            }
            ConfigError::InvalidRadius { field, value } => {
                write!(f, "{} must be finite and non-negative, got {}", field, value)
            }
            ConfigError::TargetOutOfRange { index, x, y } => {
                write!(f, "Hub target {} at ({}, {}) is outside the unit square", index, x, y)
            }
            ConfigError::InvalidHopRange { min, max } => {
                write!(f, "Invalid roam hop range {}..={}: need 1 <= min <= max", min, max)
            }
        }
    }
}

impl std::error::Error for ConfigError {}
