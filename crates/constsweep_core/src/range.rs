//! RANGESPEC parsing and expansion.
//!
//! A range declaration goes through two phases: the textual token is parsed into a
//! typed [`RangeDescriptor`], and the descriptor is then expanded into the concrete
//! sequence of integers it denotes.
//!
//! Grammar: `start[-stop[:num[log[base]]]]`
//!
//! - `4` yields `[4]`
//! - `4-8` yields every integer from 4 to 8 inclusive
//! - `0-10:3` yields 3 evenly spaced integers covering `[0, 10]`
//! - `1-1000:4log` / `1-64:7log2` space the points evenly in logarithmic space
//!
//! A colon is tolerated in front of `log` and in front of the base
//! (`1-64:7:log:2`). All computed values are rounded half away from zero.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::RangeError;

/// Base used for logarithmic spacing when the token does not name one.
pub const DEFAULT_LOG_BASE: u32 = 10;

/// Largest number of values a single token may expand to
pub const MAX_RANGE_VALUES: usize = 1 << 20;

static RANGESPEC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<start>\d+)(?:-(?P<stop>\d+)(?::(?P<num>\d+)(?::?(?P<log>log)(?::?(?P<base>\d+))?)?)?)?$",
    )
    .expect("RANGESPEC pattern is valid")
});

/// How points are distributed between start and stop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Scale {
    Linear,
    Log { base: u32 },
}

/// A parsed RANGESPEC token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RangeDescriptor {
    /// A single value
    Single(i64),
    /// Every integer from `start` to `stop`, both included
    Inclusive { start: i64, stop: i64 },
    /// `num` points spread over `[start, stop]`, endpoint included
    Spaced {
        start: i64,
        stop: i64,
        num: usize,
        scale: Scale,
    },
}

impl RangeDescriptor {
    /// Expand the descriptor into its concrete value sequence.
    #[must_use]
    pub fn values(&self) -> Vec<i64> {
        match *self {
            RangeDescriptor::Single(value) => vec![value],
            RangeDescriptor::Inclusive { start, stop } => (start..=stop).collect(),
            RangeDescriptor::Spaced {
                start,
                stop,
                num,
                scale,
            } => space(start, stop, num, scale, true),
        }
    }

    /// Number of values the descriptor expands to
    #[must_use]
    pub fn len(&self) -> usize {
        match *self {
            RangeDescriptor::Single(_) => 1,
            RangeDescriptor::Inclusive { start, stop } if stop >= start => {
                usize::try_from(stop.abs_diff(start)).map_or(usize::MAX, |n| n.saturating_add(1))
            }
            RangeDescriptor::Inclusive { .. } => 0,
            RangeDescriptor::Spaced { num, .. } => num,
        }
    }

    /// True if the descriptor expands to no values
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn bounded(self, token: &str) -> Result<Self, RangeError> {
        let len = self.len();
        if len > MAX_RANGE_VALUES {
            return Err(RangeError::TooLarge {
                token: token.to_string(),
                len,
                max: MAX_RANGE_VALUES,
            });
        }
        Ok(self)
    }
}

impl FromStr for RangeDescriptor {
    type Err = RangeError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let caps = RANGESPEC
            .captures(token)
            .ok_or_else(|| RangeError::Malformed(token.to_string()))?;

        let int = |name: &str| -> Result<Option<i64>, RangeError> {
            caps.name(name)
                .map(|m| {
                    m.as_str()
                        .parse::<i64>()
                        .map_err(|_| RangeError::Overflow(token.to_string()))
                })
                .transpose()
        };

        let start = int("start")?.ok_or_else(|| RangeError::Malformed(token.to_string()))?;
        let Some(stop) = int("stop")? else {
            return Ok(RangeDescriptor::Single(start));
        };

        let Some(num) = int("num")? else {
            if stop < start {
                return Err(RangeError::Descending {
                    token: token.to_string(),
                    start,
                    stop,
                });
            }
            return RangeDescriptor::Inclusive { start, stop }.bounded(token);
        };
        let num = usize::try_from(num).map_err(|_| RangeError::Overflow(token.to_string()))?;
        if num < 2 {
            return Err(RangeError::TooFewPoints {
                token: token.to_string(),
                num,
            });
        }

        let scale = if caps.name("log").is_some() {
            let base = match caps.name("base") {
                Some(m) => m
                    .as_str()
                    .parse::<u32>()
                    .map_err(|_| RangeError::Overflow(token.to_string()))?,
                None => DEFAULT_LOG_BASE,
            };
            if base < 2 {
                return Err(RangeError::InvalidBase {
                    token: token.to_string(),
                    base,
                });
            }
            if start == 0 || stop == 0 {
                return Err(RangeError::LogOfZero(token.to_string()));
            }
            Scale::Log { base }
        } else {
            Scale::Linear
        };

        RangeDescriptor::Spaced {
            start,
            stop,
            num,
            scale,
        }
        .bounded(token)
    }
}

impl fmt::Display for RangeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RangeDescriptor::Single(value) => write!(f, "{value}"),
            RangeDescriptor::Inclusive { start, stop } => write!(f, "{start}-{stop}"),
            RangeDescriptor::Spaced {
                start,
                stop,
                num,
                scale: Scale::Linear,
            } => write!(f, "{start}-{stop}:{num}"),
            RangeDescriptor::Spaced {
                start,
                stop,
                num,
                scale: Scale::Log { base },
            } => write!(f, "{start}-{stop}:{num}log{base}"),
        }
    }
}

/// Parse a RANGESPEC token and expand it in one step.
pub fn parse_values(token: &str) -> Result<Vec<i64>, RangeError> {
    token.parse::<RangeDescriptor>().map(|r| r.values())
}

/// Evenly spaced integers over an interval.
///
/// With [`Scale::Log`] the points are spaced evenly on the logarithm of `start` and
/// `stop`, and mapped back through `base^x`. If `endpoint` is true `stop` is the
/// last value; otherwise the interval is split into `num` equal steps and `stop`
/// is excluded. Every value is rounded half away from zero.
///
/// Logarithmic spacing of non-positive bounds is not meaningful; the parser
/// rejects such tokens before they reach this function.
#[must_use]
pub fn space(start: i64, stop: i64, num: usize, scale: Scale, endpoint: bool) -> Vec<i64> {
    if num == 0 {
        return Vec::new();
    }
    if num == 1 {
        return vec![start];
    }

    let (from, to) = match scale {
        Scale::Linear => (start as f64, stop as f64),
        Scale::Log { base } => {
            let base = f64::from(base);
            ((start as f64).log(base), (stop as f64).log(base))
        }
    };
    let divisions = if endpoint { num - 1 } else { num };
    let step = (to - from) / divisions as f64;

    (0..num)
        .map(|i| {
            let x = from + i as f64 * step;
            let value = match scale {
                Scale::Linear => x,
                Scale::Log { base } => f64::from(base).powf(x),
            };
            value.round() as i64
        })
        .collect()
}
