//! Duration values in the `1h2m3.5s` notation used by flags, env vars and
//! config files.
//!
//! Also usable as a serde `with` module for `Duration` fields of the target
//! struct:
//!
//! ```ignore
//! #[derive(Serialize, Deserialize)]
//! struct Server {
//!     #[serde(with = "flagfig::duration")]
//!     timeout: Duration,
//! }
//! ```
//!
//! Deserialization accepts the string notation or a plain number of seconds.

use std::fmt;
use std::time::Duration;

use serde::de::{self, Visitor};
use serde::{Deserializer, Serializer};
use thiserror::Error;

const NANOS_PER_SEC: u128 = 1_000_000_000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid duration {input:?}: {reason}")]
pub struct DurationError {
    input: String,
    reason: &'static str,
}

/// Parse a duration such as `300ms`, `1.5h` or `2h45m`.
///
/// Valid units are `ns`, `us` (or `µs`), `ms`, `s`, `m` and `h`. A bare `0` is
/// accepted; any other number needs a unit. Negative durations are rejected.
pub fn parse(input: &str) -> Result<Duration, DurationError> {
    let fail = |reason| DurationError {
        input: input.to_string(),
        reason,
    };

    let mut s = input;
    if let Some(rest) = s.strip_prefix('+') {
        s = rest;
    } else if let Some(rest) = s.strip_prefix('-') {
        if rest == "0" {
            return Ok(Duration::ZERO);
        }
        return Err(fail("negative durations are not supported"));
    }
    if s == "0" {
        return Ok(Duration::ZERO);
    }
    if s.is_empty() {
        return Err(fail("empty value"));
    }

    let mut total: u128 = 0;
    while !s.is_empty() {
        let (int_part, rest) = split_digits(s);
        let (frac_part, rest) = match rest.strip_prefix('.') {
            Some(after_dot) => split_digits(after_dot),
            None => ("", rest),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(fail("expected a number"));
        }

        let unit_len = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        let (unit, rest) = rest.split_at(unit_len);
        let scale = unit_scale(unit).ok_or_else(|| {
            if unit.is_empty() {
                fail("missing unit")
            } else {
                fail("unknown unit")
            }
        })?;

        let whole: u128 = if int_part.is_empty() {
            0
        } else {
            int_part.parse().map_err(|_| fail("number out of range"))?
        };
        total = whole
            .checked_mul(scale)
            .and_then(|n| total.checked_add(n))
            .ok_or_else(|| fail("number out of range"))?;

        if !frac_part.is_empty() {
            // Digits past nanosecond precision cannot change the result.
            let digits = &frac_part[..frac_part.len().min(18)];
            let frac: u128 = digits.parse().map_err(|_| fail("number out of range"))?;
            total = total
                .checked_add(frac * scale / 10u128.pow(digits.len() as u32))
                .ok_or_else(|| fail("number out of range"))?;
        }

        s = rest;
    }

    let secs = u64::try_from(total / NANOS_PER_SEC).map_err(|_| fail("number out of range"))?;
    Ok(Duration::new(secs, (total % NANOS_PER_SEC) as u32))
}

/// Format a duration in the notation accepted by [`parse`], e.g. `1h0m30s`,
/// `1.5s` or `250ms`.
pub fn format(d: Duration) -> String {
    let nanos = d.as_nanos();
    if nanos == 0 {
        return "0s".into();
    }
    if nanos < 1_000 {
        return format!("{nanos}ns");
    }
    if nanos < 1_000_000 {
        return format!("{}µs", decimal(nanos, 1_000));
    }
    if nanos < NANOS_PER_SEC {
        return format!("{}ms", decimal(nanos, 1_000_000));
    }

    let secs = d.as_secs();
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = decimal(nanos % (60 * NANOS_PER_SEC), NANOS_PER_SEC);
    if hours > 0 {
        format!("{hours}h{minutes}m{seconds}s")
    } else if minutes > 0 {
        format!("{minutes}m{seconds}s")
    } else {
        format!("{seconds}s")
    }
}

fn split_digits(s: &str) -> (&str, &str) {
    let len = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    s.split_at(len)
}

fn unit_scale(unit: &str) -> Option<u128> {
    match unit {
        "ns" => Some(1),
        "us" | "µs" | "μs" => Some(1_000),
        "ms" => Some(1_000_000),
        "s" => Some(NANOS_PER_SEC),
        "m" => Some(60 * NANOS_PER_SEC),
        "h" => Some(3600 * NANOS_PER_SEC),
        _ => None,
    }
}

/// `value / unit` with the remainder as trimmed decimal digits.
fn decimal(value: u128, unit: u128) -> String {
    let whole = value / unit;
    let rem = value % unit;
    if rem == 0 {
        return whole.to_string();
    }
    let width = unit.to_string().len() - 1;
    let frac = format!("{rem:0width$}");
    format!("{whole}.{}", frac.trim_end_matches('0'))
}

pub fn serialize<S: Serializer>(d: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format(*d))
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
    deserializer.deserialize_any(DurationVisitor)
}

struct DurationVisitor;

impl Visitor<'_> for DurationVisitor {
    type Value = Duration;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a duration string like \"30s\" or a number of seconds")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Duration, E> {
        parse(v).map_err(E::custom)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Duration, E> {
        Ok(Duration::from_secs(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Duration, E> {
        u64::try_from(v)
            .map(Duration::from_secs)
            .map_err(|_| E::custom("negative durations are not supported"))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Duration, E> {
        Duration::try_from_secs_f64(v).map_err(E::custom)
    }
}
