use crate::{Error, Result};
use core::ops::RangeInclusive;

/// A validated, inclusive integer range.
///
/// A `Range` can only be obtained through [`Range::new`] or [`Range::parse`],
/// which guarantee `from <= to` and `len() <= max_range`. Every `Range` is
/// therefore safe to pre-allocate a result buffer for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    from: i64,
    to: i64,
}

impl Range {
    /// Validates `from..=to` against `max_range`.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidInput`] if `from > to`.
    /// - [`Error::RangeTooLarge`] if the range holds more than `max_range`
    ///   numbers.
    pub fn new(from: i64, to: i64, max_range: usize) -> Result<Self> {
        if from > to {
            return Err(Error::invalid(format!(
                "`from` ({from}) must not be greater than `to` ({to})"
            )));
        }

        // Widen so that `i64::MIN..=i64::MAX` cannot wrap.
        let size = (i128::from(to) - i128::from(from) + 1) as u128;
        if size > max_range as u128 {
            return Err(Error::RangeTooLarge {
                size,
                max: max_range,
            });
        }

        Ok(Self { from, to })
    }

    /// Parses both bounds from their textual form and validates the result.
    ///
    /// A missing bound (`None`) is rejected the same way as a malformed one.
    pub fn parse(from: Option<&str>, to: Option<&str>, max_range: usize) -> Result<Self> {
        let from = parse_bound("from", from)?;
        let to = parse_bound("to", to)?;
        Self::new(from, to, max_range)
    }

    pub const fn from(&self) -> i64 {
        self.from
    }

    pub const fn to(&self) -> i64 {
        self.to
    }

    /// Number of integers in the range. Always at least 1.
    pub const fn len(&self) -> usize {
        // Bounded by `max_range: usize` at construction.
        self.to.abs_diff(self.from) as usize + 1
    }

    /// Always `false`: a validated range holds at least one number.
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Position of `n` within the result sequence (`n - from`).
    pub const fn offset(&self, n: i64) -> usize {
        n.abs_diff(self.from) as usize
    }

    pub const fn iter(&self) -> RangeInclusive<i64> {
        self.from..=self.to
    }
}

fn parse_bound(name: &str, raw: Option<&str>) -> Result<i64> {
    let raw = raw.ok_or_else(|| Error::invalid(format!("missing `{name}`")))?;
    raw.parse::<i64>()
        .map_err(|e| Error::invalid(format!("`{name}` is not an integer ({raw:?}): {e}")))
}
