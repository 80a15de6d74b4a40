/// Error types for fixstep-core.
use thiserror::Error;

/// Errors raised while configuring or driving a simulation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    /// The fixed step size must be a positive, finite number of seconds.
    #[error("fixed step must be positive and finite, got {0}")]
    InvalidFixedStep(f64),

    /// The spiral cap must be a positive, finite number of seconds.
    #[error("spiral cap must be positive and finite, got {0}")]
    InvalidSpiralCap(f64),

    /// The initial time scale must be finite; zero and negative are allowed.
    #[error("time scale must be finite, got {0}")]
    InvalidTimeScale(f64),

    /// A NaN or infinite value reached a body or the scheduler clock.
    #[error("non-finite {what}")]
    NonFinite {
        /// Which input was malformed.
        what: &'static str,
    },

    /// A supplied spin axis had (near) zero length and cannot be normalized.
    #[error("spin axis has zero length")]
    DegenerateSpinAxis,

    /// A negative frame delta arrived while reverse time is rejected.
    #[error("negative frame delta {delta} rejected by reverse-time policy")]
    ReverseTime {
        /// The scaled delta that was refused.
        delta: f64,
    },

    /// The text form of a [`StepConfig`](crate::StepConfig) could not be parsed.
    #[error("config line {line}: {message}")]
    Config {
        /// 1-based line number.
        line: usize,
        /// What went wrong on that line.
        message: String,
    },
}

impl SimError {
    pub(crate) fn config(line: usize, message: impl Into<String>) -> Self {
        Self::Config {
            line,
            message: message.into(),
        }
    }
}
