use serde::Deserialize;

/// Create/update body. Level is an ordinal, 1 (very low) to 5 (very high).
#[derive(Debug, Deserialize)]
pub struct EnergyLogRequest {
    pub energy_level: i16,
}

pub fn is_valid_level(level: i16) -> bool {
    (1..=5).contains(&level)
}

#[cfg(test)]
mod level_tests {
    use super::*;

    #[test]
    fn accepts_exactly_one_through_five() {
        for level in 1..=5 {
            assert!(is_valid_level(level), "level {level} should be valid");
        }
    }

    #[test]
    fn rejects_out_of_range_levels() {
        for level in [-1, 0, 6, 42, i16::MAX, i16::MIN] {
            assert!(!is_valid_level(level), "level {level} should be invalid");
        }
    }

    #[test]
    fn request_requires_energy_level() {
        let err = serde_json::from_str::<EnergyLogRequest>("{}").unwrap_err();
        assert!(err.to_string().contains("energy_level"));
    }
}
