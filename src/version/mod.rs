// src/version/mod.rs

//! Loose version comparison for scientific-software version strings
//!
//! Scientific packages carry version strings like `10.3.4`, `2017.2.174`,
//! `4.1.1.036` or `2.8.12-GCC-4.6.3` that do not follow semver. This module
//! provides a segment-wise ordering: strings are split into numeric and
//! alphabetic runs, numeric segments compare numerically, alphabetic segments
//! compare lexically, and a numeric segment ranks newer than an alphabetic
//! one in the same position.

use std::cmp::Ordering;
use std::fmt;

/// One run of a version string, either numeric or alphabetic
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Num(u64),
    Alpha(String),
}

impl Segment {
    fn compare(&self, other: &Segment) -> Ordering {
        match (self, other) {
            (Segment::Num(a), Segment::Num(b)) => a.cmp(b),
            (Segment::Alpha(a), Segment::Alpha(b)) => a.cmp(b),
            // A numeric segment is considered newer than an alphabetic one
            (Segment::Num(_), Segment::Alpha(_)) => Ordering::Greater,
            (Segment::Alpha(_), Segment::Num(_)) => Ordering::Less,
        }
    }
}

/// A parsed loose version
///
/// Parsing never fails: any string is a valid loose version. Separators
/// (`.`, `-`, `_`) and digit/letter boundaries both start a new segment.
///
/// Examples:
/// - "10.3.4" → [10, 3, 4]
/// - "4.1.1.036" → [4, 1, 1, 36]
/// - "1.4-GCC-4.6.3" → [1, 4, "GCC", 4, 6, 3]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LooseVersion {
    segments: Vec<Segment>,
    raw: String,
}

impl LooseVersion {
    /// Parse a version string into comparison segments
    pub fn parse(s: &str) -> Self {
        let mut segments = Vec::new();
        let mut digits = String::new();
        let mut alphas = String::new();

        for ch in s.chars() {
            if ch.is_ascii_digit() {
                if !alphas.is_empty() {
                    segments.push(Segment::Alpha(std::mem::take(&mut alphas)));
                }
                digits.push(ch);
            } else if ch.is_ascii_alphabetic() {
                if !digits.is_empty() {
                    segments.push(Segment::Num(take_num(&mut digits)));
                }
                alphas.push(ch);
            } else {
                // separator: flush whichever run is open
                if !digits.is_empty() {
                    segments.push(Segment::Num(take_num(&mut digits)));
                }
                if !alphas.is_empty() {
                    segments.push(Segment::Alpha(std::mem::take(&mut alphas)));
                }
            }
        }
        if !digits.is_empty() {
            segments.push(Segment::Num(take_num(&mut digits)));
        }
        if !alphas.is_empty() {
            segments.push(Segment::Alpha(alphas));
        }

        Self {
            segments,
            raw: s.to_string(),
        }
    }

    /// The original string this version was parsed from
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Compare two loose versions segment-wise
    ///
    /// A version that is a strict prefix of another compares older
    /// ("10.3" < "10.3.4").
    pub fn compare(&self, other: &LooseVersion) -> Ordering {
        let mut a = self.segments.iter();
        let mut b = other.segments.iter();

        loop {
            match (a.next(), b.next()) {
                (Some(x), Some(y)) => match x.compare(y) {
                    Ordering::Equal => {}
                    ord => return ord,
                },
                (Some(_), None) => return Ordering::Greater,
                (None, Some(_)) => return Ordering::Less,
                (None, None) => return Ordering::Equal,
            }
        }
    }

    /// Shorthand for gating on a minimum version
    pub fn at_least(&self, bound: &str) -> bool {
        self.compare(&LooseVersion::parse(bound)) != Ordering::Less
    }

    /// Shorthand for gating on a maximum (exclusive) version
    pub fn older_than(&self, bound: &str) -> bool {
        self.compare(&LooseVersion::parse(bound)) == Ordering::Less
    }
}

fn take_num(digits: &mut String) -> u64 {
    // Leading zeros are fine ("036" → 36); absurdly long runs saturate
    let n = digits.parse::<u64>().unwrap_or(u64::MAX);
    digits.clear();
    n
}

impl fmt::Display for LooseVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

impl Ord for LooseVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare(other)
    }
}

impl PartialOrd for LooseVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl From<&str> for LooseVersion {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}
