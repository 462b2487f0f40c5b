//! One-dimensional parameter intervals.

use nodegeom_math::PLANE_EPSILON;
use serde::{Deserialize, Serialize};

/// A directed 1-D interval.
///
/// `start`/`end` keep the caller's order (and therefore direction);
/// `min`/`max` are the sorted bounds. `span = end − start` is signed,
/// `length = |span|`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Domain {
    /// First bound, in the caller's order.
    pub start: f64,
    /// Second bound, in the caller's order.
    pub end: f64,
    /// Smaller bound.
    pub min: f64,
    /// Larger bound.
    pub max: f64,
    /// Signed extent `end − start`.
    pub span: f64,
    /// Unsigned extent.
    pub length: f64,
    /// Midpoint.
    pub center: f64,
}

impl Domain {
    /// Domain from `start` to `end`.
    ///
    /// Non-finite bounds produce the unit domain.
    pub fn new(start: f64, end: f64) -> Self {
        if !start.is_finite() || !end.is_finite() {
            tracing::debug!(start, end, "non-finite domain, using unit domain");
            return Self::unit();
        }
        Self {
            start,
            end,
            min: start.min(end),
            max: start.max(end),
            span: end - start,
            length: (end - start).abs(),
            center: 0.5 * (start + end),
        }
    }

    /// The unit domain `[0, 1]`.
    pub fn unit() -> Self {
        Self::new(0.0, 1.0)
    }

    /// True when `start > end`.
    pub fn is_decreasing(&self) -> bool {
        self.start > self.end
    }

    /// True when the domain has (numerically) zero length.
    pub fn is_degenerate(&self) -> bool {
        self.length < 1e-12
    }

    /// Parameter at a normalized position (`0 → start`, `1 → end`).
    pub fn parameter_at(&self, normalized: f64) -> f64 {
        self.start + self.span * normalized
    }

    /// Normalized position of `value` (`start → 0`, `end → 1`).
    ///
    /// A degenerate domain maps everything to 0.
    pub fn normalize(&self, value: f64) -> f64 {
        if self.is_degenerate() {
            return 0.0;
        }
        (value - self.start) / self.span
    }

    /// True when `value` lies within `[min, max]`.
    pub fn includes(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// Clamp `value` into `[min, max]`.
    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }

    /// The same interval with start and end swapped.
    pub fn reversed(&self) -> Self {
        Self::new(self.end, self.start)
    }

    /// `count` equal consecutive sub-domains.
    pub fn divide(&self, count: usize) -> Vec<Domain> {
        let count = count.max(1);
        (0..count)
            .map(|i| {
                Domain::new(
                    self.parameter_at(i as f64 / count as f64),
                    self.parameter_at((i + 1) as f64 / count as f64),
                )
            })
            .collect()
    }

    /// `count + 1` evenly spaced parameters from start to end.
    pub fn samples(&self, count: usize) -> Vec<f64> {
        let count = count.max(1);
        (0..=count)
            .map(|i| self.parameter_at(i as f64 / count as f64))
            .collect()
    }

    /// Smallest domain containing both.
    pub fn union(&self, other: &Domain) -> Domain {
        Domain::new(self.min.min(other.min), self.max.max(other.max))
    }
}

impl Default for Domain {
    fn default() -> Self {
        Self::unit()
    }
}

/// The ways a caller can describe a domain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DomainSource {
    /// An existing domain.
    Domain(Domain),
    /// Directed interval.
    Interval {
        /// First bound.
        start: f64,
        /// Second bound.
        end: f64,
    },
    /// Sorted bounds.
    Bounds {
        /// Lower bound.
        min: f64,
        /// Upper bound.
        max: f64,
    },
    /// Start and signed length.
    StartLength {
        /// First bound.
        start: f64,
        /// Signed length.
        length: f64,
    },
    /// Centre and total length.
    CenterLength {
        /// Midpoint.
        center: f64,
        /// Total length.
        length: f64,
    },
    /// A bare number `x`, read as `[0, x]`.
    Scalar(f64),
    /// Input that could not be interpreted.
    Unknown,
}

impl From<Domain> for DomainSource {
    fn from(d: Domain) -> Self {
        DomainSource::Domain(d)
    }
}

impl From<(f64, f64)> for DomainSource {
    fn from((start, end): (f64, f64)) -> Self {
        DomainSource::Interval { start, end }
    }
}

impl From<f64> for DomainSource {
    fn from(x: f64) -> Self {
        DomainSource::Scalar(x)
    }
}

/// Normalize any [`DomainSource`] into a canonical [`Domain`].
///
/// Zero-length, non-finite and unknown input yield the unit domain.
pub fn ensure_domain(source: impl Into<DomainSource>) -> Domain {
    let (start, end) = match source.into() {
        DomainSource::Domain(d) => (d.start, d.end),
        DomainSource::Interval { start, end } => (start, end),
        DomainSource::Bounds { min, max } => (min.min(max), min.max(max)),
        DomainSource::StartLength { start, length } => (start, start + length),
        DomainSource::CenterLength { center, length } => {
            let half = 0.5 * length.abs();
            (center - half, center + half)
        }
        DomainSource::Scalar(x) => (0.0, x),
        DomainSource::Unknown => return Domain::unit(),
    };
    if !start.is_finite() || !end.is_finite() || (end - start).abs() <= PLANE_EPSILON {
        tracing::debug!(start, end, "degenerate domain, using unit domain");
        return Domain::unit();
    }
    Domain::new(start, end)
}
