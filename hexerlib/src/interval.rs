use std::fmt;

/// Closed range `[min, max]` over a totally ordered type.
///
/// Validity (`min <= max`) is not enforced on construction; callers check it
/// with [`Interval::is_valid`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Interval<T> {
    pub min: T,
    pub max: T,
}

impl<T: Ord + Copy> Interval<T> {
    pub const fn new(min: T, max: T) -> Self {
        Self { min, max }
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.min <= self.max
    }

    /// Check if the value lies within the interval (both ends inclusive)
    #[must_use]
    pub fn contains(&self, value: T) -> bool {
        self.min <= value && value <= self.max
    }

    /// Check if both intervals are valid and `self` lies entirely within `other`
    #[must_use]
    pub fn is_inside(&self, other: &Self) -> bool {
        self.is_valid() && other.is_valid() && other.contains(self.min) && other.contains(self.max)
    }
}

impl<T: fmt::Display> fmt::Display for Interval<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} - {}]", self.min, self.max)
    }
}
