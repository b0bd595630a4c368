use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};
use utoipa::ToSchema;

/// Employee grade tier. The grade alone decides the monthly gallon allowance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, EnumIter, ToSchema)]
pub enum Grade {
    G7,
    G8,
    G9,
    G10,
    G11,
    G12,
    G13,
}

impl Grade {
    /// Monthly gallon allowance for this grade.
    pub fn monthly_allowance(&self) -> i32 {
        match self {
            Grade::G7 => 24,
            Grade::G8 => 24,
            Grade::G9 => 12,
            Grade::G10 => 10,
            Grade::G11 => 7,
            Grade::G12 => 7,
            Grade::G13 => 7,
        }
    }
}

/// Allowance lookup for raw grade strings coming out of the database.
/// Unknown grades fall back to a zero allowance instead of erroring.
pub fn allowance_for(grade: &str) -> i32 {
    grade
        .parse::<Grade>()
        .map(|g| g.monthly_allowance())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn allowance_table_matches_grade_tiers() {
        assert_eq!(Grade::G7.monthly_allowance(), 24);
        assert_eq!(Grade::G8.monthly_allowance(), 24);
        assert_eq!(Grade::G9.monthly_allowance(), 12);
        assert_eq!(Grade::G10.monthly_allowance(), 10);
        assert_eq!(Grade::G11.monthly_allowance(), 7);
        assert_eq!(Grade::G12.monthly_allowance(), 7);
        assert_eq!(Grade::G13.monthly_allowance(), 7);
    }

    #[test]
    fn every_grade_round_trips_through_its_string_form() {
        for grade in Grade::iter() {
            assert_eq!(allowance_for(&grade.to_string()), grade.monthly_allowance());
        }
    }

    #[test]
    fn unknown_grade_maps_to_zero_allowance() {
        assert_eq!(allowance_for("G6"), 0);
        assert_eq!(allowance_for("G14"), 0);
        assert_eq!(allowance_for(""), 0);
        assert_eq!(allowance_for("manager"), 0);
    }
}
