use chrono::{DateTime, Datelike, Utc};

/// Hard cap on a single gallon request, independent of the remaining allowance.
pub const MAX_PER_REQUEST: i32 = 10;

/// Calendar month+year bucket. The allowance resets at each period boundary,
/// and pickups denormalize their period at creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Period {
    pub month: u32,
    pub year: i32,
}

impl Period {
    pub fn of(at: DateTime<Utc>) -> Self {
        Period {
            month: at.month(),
            year: at.year(),
        }
    }
}

/// Gallons the employee may still request this period, clamped at zero.
/// `used` is the sum of completed pickups in the same period; in-flight
/// requests deliberately do not count (see DESIGN.md).
pub fn remaining_allowance(monthly_allowance: i32, used: i64) -> i32 {
    (monthly_allowance as i64 - used).max(0).min(i32::MAX as i64) as i32
}

/// Why a request was refused at admission time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdmissionError {
    /// Quantity outside 1..=MAX_PER_REQUEST.
    InvalidQuantity,
    /// Quantity exceeds what is left of the monthly allowance.
    ExceedsAllowance { remaining: i32 },
}

impl std::fmt::Display for AdmissionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AdmissionError::InvalidQuantity => write!(
                f,
                "Quantity must be between 1 and {} gallons.",
                MAX_PER_REQUEST
            ),
            AdmissionError::ExceedsAllowance { .. } => {
                write!(f, "Requested quantity exceeds remaining allowance.")
            }
        }
    }
}

/// Admission check for request creation. Re-run against fresh pickup sums at
/// write time so a stale client cannot overdraw the quota.
pub fn check_admission(quantity: i32, remaining: i32) -> Result<(), AdmissionError> {
    if quantity < 1 || quantity > MAX_PER_REQUEST {
        return Err(AdmissionError::InvalidQuantity);
    }
    if quantity > remaining {
        return Err(AdmissionError::ExceedsAllowance { remaining });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn remaining_is_allowance_minus_used() {
        assert_eq!(remaining_allowance(12, 0), 12);
        assert_eq!(remaining_allowance(12, 5), 7);
        assert_eq!(remaining_allowance(12, 12), 0);
    }

    #[test]
    fn remaining_never_goes_negative() {
        assert_eq!(remaining_allowance(12, 15), 0);
        assert_eq!(remaining_allowance(0, 3), 0);
    }

    #[test]
    fn remaining_is_monotone_as_pickups_accrue() {
        let mut last = remaining_allowance(24, 0);
        for used in 1..=30 {
            let current = remaining_allowance(24, used);
            assert!(current <= last);
            last = current;
        }
    }

    #[test]
    fn period_tracks_calendar_month_and_year() {
        let at = Utc.with_ymd_and_hms(2025, 1, 31, 23, 59, 59).unwrap();
        assert_eq!(Period::of(at), Period { month: 1, year: 2025 });

        // Rolling into a new month means a fresh period, hence a full reset:
        // the pickup sum for the new period starts at zero.
        let next = Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap();
        assert_ne!(Period::of(at), Period::of(next));
        assert_eq!(remaining_allowance(12, 0), 12);
    }

    #[test]
    fn admission_accepts_in_range_quantities() {
        assert_eq!(check_admission(1, 12), Ok(()));
        assert_eq!(check_admission(10, 12), Ok(()));
        assert_eq!(check_admission(5, 5), Ok(()));
    }

    #[test]
    fn admission_rejects_out_of_range_quantities() {
        assert_eq!(check_admission(0, 12), Err(AdmissionError::InvalidQuantity));
        assert_eq!(check_admission(-3, 12), Err(AdmissionError::InvalidQuantity));
        assert_eq!(check_admission(11, 12), Err(AdmissionError::InvalidQuantity));
    }

    #[test]
    fn admission_rejects_overdraw_even_by_one() {
        assert_eq!(
            check_admission(8, 7),
            Err(AdmissionError::ExceedsAllowance { remaining: 7 })
        );
        // Exhausted allowance refuses the smallest possible request.
        assert_eq!(
            check_admission(1, 0),
            Err(AdmissionError::ExceedsAllowance { remaining: 0 })
        );
    }
}
