use core::fmt;

/// The FizzBuzz classification of a single integer.
///
/// Divisibility is checked on the signed value, so zero and negative numbers
/// classify the same way their absolute values do:
///
/// ```
/// use fizzbuzz::Classification;
///
/// assert_eq!(Classification::of(0), Classification::FizzBuzz);
/// assert_eq!(Classification::of(-9), Classification::Fizz);
/// assert_eq!(Classification::of(-7).to_string(), "-7");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Classification {
    /// Divisible by both 3 and 5.
    FizzBuzz,
    /// Divisible by 3 only.
    Fizz,
    /// Divisible by 5 only.
    Buzz,
    /// Divisible by neither; rendered as its decimal representation.
    Number(i64),
}

impl Classification {
    pub const fn of(n: i64) -> Self {
        match (n % 3 == 0, n % 5 == 0) {
            (true, true) => Self::FizzBuzz,
            (true, false) => Self::Fizz,
            (false, true) => Self::Buzz,
            (false, false) => Self::Number(n),
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FizzBuzz => f.write_str("FizzBuzz"),
            Self::Fizz => f.write_str("Fizz"),
            Self::Buzz => f.write_str("Buzz"),
            Self::Number(n) => write!(f, "{n}"),
        }
    }
}

/// Returns the FizzBuzz string for `n`.
///
/// Pure and total: every `i64` has exactly one rendering.
pub fn classify(n: i64) -> String {
    Classification::of(n).to_string()
}
