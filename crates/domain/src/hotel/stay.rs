use chrono::NaiveDate;

use crate::DomainError;

/// A half-open range of nights, `[check_in, check_out)`.
///
/// The check-out day itself is not occupied, so a stay ending on the 3rd and
/// another starting on the 3rd do not overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StayRange {
    check_in: NaiveDate,
    check_out: NaiveDate,
}

impl StayRange {
    /// Creates a range, rejecting ranges with no nights in them.
    pub fn new(check_in: NaiveDate, check_out: NaiveDate) -> Result<Self, DomainError> {
        if check_out <= check_in {
            return Err(DomainError::InvalidStayRange {
                check_in,
                check_out,
            });
        }
        Ok(Self {
            check_in,
            check_out,
        })
    }

    pub fn check_in(&self) -> NaiveDate {
        self.check_in
    }

    pub fn check_out(&self) -> NaiveDate {
        self.check_out
    }

    /// Half-open overlap test: `a.in < b.out && b.in < a.out`.
    pub fn overlaps(&self, other: &StayRange) -> bool {
        self.check_in < other.check_out && other.check_in < self.check_out
    }
}

impl std::fmt::Display for StayRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {})", self.check_in, self.check_out)
    }
}
