//! Error types for trajectory analysis.
//!
//! Every analysis validates its own preconditions and fails independently.
//! The orchestrator collects these errors per analysis instead of aborting
//! the whole report (see [`crate::analyzer`]).

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Errors produced by the analysis engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    /// The analysis needs a reference point but the trajectory has no waypoints.
    #[error("{analysis}: trajectory has no waypoints")]
    EmptyInput { analysis: &'static str },

    /// A coordinate is NaN or infinite and cannot feed geometry or indexing.
    #[error("waypoint {index} has a non-finite coordinate ({latitude}, {longitude})")]
    InvalidNumeric {
        index: usize,
        latitude: f64,
        longitude: f64,
    },

    /// Fewer waypoints than a segment-based computation requires.
    #[error("trajectory has {point_count} points, at least {minimum_required} required")]
    InsufficientPoints {
        point_count: usize,
        minimum_required: usize,
    },
}

impl AnalysisError {
    pub(crate) fn empty(analysis: &'static str) -> Self {
        AnalysisError::EmptyInput { analysis }
    }
}

/// Extension for turning an absent value into an [`AnalysisError::EmptyInput`].
pub trait OptionExt<T> {
    fn ok_or_empty(self, analysis: &'static str) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_empty(self, analysis: &'static str) -> Result<T> {
        self.ok_or(AnalysisError::EmptyInput { analysis })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AnalysisError::InsufficientPoints {
            point_count: 1,
            minimum_required: 2,
        };
        assert!(err.to_string().contains("1 points"));

        let err = AnalysisError::empty("maxDistanceFromStart");
        assert!(err.to_string().starts_with("maxDistanceFromStart"));
    }

    #[test]
    fn test_option_ext() {
        let none: Option<i32> = None;
        assert_eq!(
            none.ok_or_empty("test"),
            Err(AnalysisError::EmptyInput { analysis: "test" })
        );
        assert_eq!(Some(3).ok_or_empty("test"), Ok(3));
    }
}
