/// Scheduler tuning and its `key = value` text form
use std::fmt;
use std::str::FromStr;

use nom::{
    bytes::complete::take_while1,
    character::complete::{char, space0},
    combinator::{all_consuming, opt, rest},
    number::complete::double,
    sequence::{delimited, pair, preceded, separated_pair, terminated},
    IResult,
};

use crate::blend::RotationBlend;
use crate::error::SimError;

/// 20 Hz.
pub const DEFAULT_FIXED_STEP: f64 = 1.0 / 20.0;
pub const DEFAULT_SPIRAL_CAP: f64 = 0.1;
pub const DEFAULT_TIME_SCALE: f64 = 1.0;

/// What the scheduler does with a frame delta that runs time backward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReversePolicy {
    /// Accept it without applying the spiral cap.
    #[default]
    Uncapped,
    /// Accept it, clamped to `-spiral_cap`.
    Symmetric,
    /// Refuse it with [`SimError::ReverseTime`].
    Reject,
}

impl ReversePolicy {
    pub fn name(self) -> &'static str {
        match self {
            ReversePolicy::Uncapped => "uncapped",
            ReversePolicy::Symmetric => "symmetric",
            ReversePolicy::Reject => "reject",
        }
    }
}

/// Configuration for a [`Scheduler`](crate::Scheduler)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepConfig {
    /// Seconds of simulated time per fixed step.
    pub fixed_step: f64,
    /// Most forward time admitted from a single frame.
    pub spiral_cap: f64,
    /// Initial multiplier on incoming frame deltas.
    pub time_scale: f64,
    pub reverse: ReversePolicy,
    pub rotation_blend: RotationBlend,
}

impl StepConfig {
    pub fn new(fixed_step: f64) -> Self {
        Self {
            fixed_step,
            ..Self::default()
        }
    }

    pub fn with_spiral_cap(mut self, spiral_cap: f64) -> Self {
        self.spiral_cap = spiral_cap;
        self
    }

    pub fn with_reverse(mut self, reverse: ReversePolicy) -> Self {
        self.reverse = reverse;
        self
    }

    pub fn with_rotation_blend(mut self, rotation_blend: RotationBlend) -> Self {
        self.rotation_blend = rotation_blend;
        self
    }

    /// Reject values the scheduler cannot run with.
    pub fn validate(&self) -> Result<(), SimError> {
        if !(self.fixed_step.is_finite() && self.fixed_step > 0.0) {
            return Err(SimError::InvalidFixedStep(self.fixed_step));
        }
        if !(self.spiral_cap.is_finite() && self.spiral_cap > 0.0) {
            return Err(SimError::InvalidSpiralCap(self.spiral_cap));
        }
        if !self.time_scale.is_finite() {
            return Err(SimError::InvalidTimeScale(self.time_scale));
        }
        Ok(())
    }

    /// Most fixed steps a single forward frame can trigger, counting the
    /// leftover from earlier frames.
    pub fn max_steps_per_frame(&self) -> u64 {
        (self.spiral_cap / self.fixed_step).ceil() as u64
    }

    /// Parse the text form, one `key = value` per line with `#` comments.
    ///
    /// Keys not present keep their defaults. The result is validated.
    pub fn parse(text: &str) -> Result<Self, SimError> {
        let mut config = Self::default();
        for (index, raw) in text.lines().enumerate() {
            let line = index + 1;
            let content = raw.trim();
            if content.is_empty() || content.starts_with('#') {
                continue;
            }
            let (_, (key, value)) = all_consuming(entry)(content)
                .map_err(|_| SimError::config(line, format!("expected `key = value`, got `{content}`")))?;
            config
                .apply(key, value)
                .map_err(|message| SimError::config(line, message))?;
        }
        config.validate()?;
        Ok(config)
    }

    fn apply(&mut self, key: &str, value: &str) -> Result<(), String> {
        match key {
            "fixed_step" => self.fixed_step = number(value)?,
            "spiral_cap" => self.spiral_cap = number(value)?,
            "time_scale" => self.time_scale = number(value)?,
            "reverse" => {
                self.reverse = match value {
                    "uncapped" => ReversePolicy::Uncapped,
                    "symmetric" => ReversePolicy::Symmetric,
                    "reject" => ReversePolicy::Reject,
                    other => return Err(format!("unknown reverse policy `{other}`")),
                }
            }
            "rotation_blend" => {
                self.rotation_blend = match value {
                    "linear" => RotationBlend::Linear,
                    "slerp" => RotationBlend::Slerp,
                    other => return Err(format!("unknown rotation blend `{other}`")),
                }
            }
            other => return Err(format!("unknown key `{other}`")),
        }
        Ok(())
    }
}

impl Default for StepConfig {
    fn default() -> Self {
        Self {
            fixed_step: DEFAULT_FIXED_STEP,
            spiral_cap: DEFAULT_SPIRAL_CAP,
            time_scale: DEFAULT_TIME_SCALE,
            reverse: ReversePolicy::default(),
            rotation_blend: RotationBlend::default(),
        }
    }
}

impl FromStr for StepConfig {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for StepConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "fixed_step = {}", self.fixed_step)?;
        writeln!(f, "spiral_cap = {}", self.spiral_cap)?;
        writeln!(f, "time_scale = {}", self.time_scale)?;
        writeln!(f, "reverse = {}", self.reverse.name())?;
        writeln!(f, "rotation_blend = {}", self.rotation_blend.name())
    }
}

fn key(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_ascii_alphanumeric() || c == '_')(input)
}

fn value(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| !c.is_whitespace() && c != '#')(input)
}

/// `key = value`, optionally followed by a trailing comment
fn entry(input: &str) -> IResult<&str, (&str, &str)> {
    terminated(
        separated_pair(key, delimited(space0, char('='), space0), value),
        pair(space0, opt(preceded(char('#'), rest))),
    )(input)
}

fn number(value: &str) -> Result<f64, String> {
    let parsed: IResult<&str, f64> = all_consuming(double)(value);
    parsed
        .map(|(_, n)| n)
        .map_err(|_| format!("`{value}` is not a number"))
}
