use crate::error::ThresholdError;

/// A capacity bound as written by the user: either a bare integer or a
/// percent string such as `"95%"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Threshold {
    Integer(i64),
    Percent(String),
}

impl Threshold {
    pub fn normalize(&self) -> Result<u8, ThresholdError> {
        match self {
            Threshold::Integer(i) => bounded(*i),
            Threshold::Percent(s) => parse_capacity(s),
        }
    }
}

impl From<i64> for Threshold {
    fn from(value: i64) -> Self {
        Threshold::Integer(value)
    }
}

impl From<&str> for Threshold {
    fn from(value: &str) -> Self {
        Threshold::Percent(value.to_string())
    }
}

/// Parses a `df` style percentage ("42%", "42") into 0-100.
pub fn parse_capacity(raw: &str) -> Result<u8, ThresholdError> {
    let trimmed = raw.trim();
    let digits = trimmed.strip_suffix('%').unwrap_or(trimmed).trim();
    match digits.parse::<i64>() {
        Ok(value) => bounded(value),
        Err(_) => Err(ThresholdError::NotAnInteger(raw.to_string())),
    }
}

fn bounded(value: i64) -> Result<u8, ThresholdError> {
    if (0..=100).contains(&value) {
        Ok(value as u8)
    } else {
        Err(ThresholdError::OutOfRange(value))
    }
}
