//! Sample results and diagnostic records returned to callers.

use serde::{Deserialize, Serialize};

/// Status of a sample, with the numeric codes the host simulation expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SampleStatus {
    /// Inside the dataset's altitude range.
    Ok,
    /// Above the dataset's model top; the value is blended or saturated.
    AboveModelTop,
    /// No dataset or map covers this property for the body.
    NoData,
    /// A non-finite intermediate value was produced.
    Error,
}

impl SampleStatus {
    pub fn code(&self) -> i8 {
        match self {
            SampleStatus::Ok => 0,
            SampleStatus::AboveModelTop => 1,
            SampleStatus::NoData => -1,
            SampleStatus::Error => -2,
        }
    }

    pub fn from_code(code: i8) -> Option<Self> {
        match code {
            0 => Some(SampleStatus::Ok),
            1 => Some(SampleStatus::AboveModelTop),
            -1 => Some(SampleStatus::NoData),
            -2 => Some(SampleStatus::Error),
            _ => None,
        }
    }
}

impl std::fmt::Display for SampleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SampleStatus::Ok => write!(f, "ok"),
            SampleStatus::AboveModelTop => write!(f, "ok_above_top"),
            SampleStatus::NoData => write!(f, "no_data"),
            SampleStatus::Error => write!(f, "error"),
        }
    }
}

/// A sampled property tagged with its status.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Sampled<T> {
    Within(T),
    AboveTop(T),
    NoData,
    Error,
}

impl<T> Sampled<T> {
    pub fn status(&self) -> SampleStatus {
        match self {
            Sampled::Within(_) => SampleStatus::Ok,
            Sampled::AboveTop(_) => SampleStatus::AboveModelTop,
            Sampled::NoData => SampleStatus::NoData,
            Sampled::Error => SampleStatus::Error,
        }
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Sampled::Within(v) | Sampled::AboveTop(v) => Some(v),
            _ => None,
        }
    }

    pub fn into_value(self) -> Option<T> {
        match self {
            Sampled::Within(v) | Sampled::AboveTop(v) => Some(v),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Sampled<U> {
        match self {
            Sampled::Within(v) => Sampled::Within(f(v)),
            Sampled::AboveTop(v) => Sampled::AboveTop(f(v)),
            Sampled::NoData => Sampled::NoData,
            Sampled::Error => Sampled::Error,
        }
    }

    /// The value, or `fallback` when there is none.
    pub fn unwrap_or(self, fallback: T) -> T {
        self.into_value().unwrap_or(fallback)
    }
}

/// Two bracketing indices along one axis and the blend weight between them.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AxisBracket {
    pub low: usize,
    pub high: usize,
    /// Weight of `high`, in `[0, 1]`.
    pub frac: f64,
}

impl AxisBracket {
    pub fn new(low: usize, high: usize, frac: f64) -> Self {
        Self { low, high, frac }
    }
}

/// Indices and weights used by a grid sample. Diagnostic only.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DataInfo {
    pub lon: AxisBracket,
    pub lat: AxisBracket,
    pub alt: AxisBracket,
    pub time: AxisBracket,
}
