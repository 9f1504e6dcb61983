use crate::entities::reading::BpCategory;

/// Population default systolic threshold for stage 2 hypertension
pub const DEFAULT_SYSTOLIC_THRESHOLD: u16 = 140;

/// Population default diastolic threshold for stage 2 hypertension
pub const DEFAULT_DIASTOLIC_THRESHOLD: u16 = 90;

/// Result of classifying one measurement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub category: BpCategory,
    pub is_abnormal: bool,
    pub priority_rank: u8,
}

/// Classify a blood pressure measurement against AHA-style thresholds.
///
/// Evaluation order, first match wins: hypertensive crisis, hypotension,
/// stage 2, stage 1, elevated, normal.
///
/// A member's custom thresholds replace only the 140/90 stage 2 pair, and
/// only when both are set; the crisis, hypotension, stage 1 and elevated
/// boundaries stay fixed. The custom pair requires both limits to be
/// breached, where the population default fires on either.
///
/// Deterministic and total over its inputs. Callers are expected to submit
/// plausible pressures (roughly 40-300 mmHg); range checks belong to request
/// validation, not here.
pub fn classify(
    systolic: u16,
    diastolic: u16,
    custom_systolic: Option<u16>,
    custom_diastolic: Option<u16>,
) -> Classification {
    let stage2 = match (custom_systolic, custom_diastolic) {
        (Some(custom_sys), Some(custom_dia)) => systolic >= custom_sys && diastolic >= custom_dia,
        _ => systolic >= DEFAULT_SYSTOLIC_THRESHOLD || diastolic >= DEFAULT_DIASTOLIC_THRESHOLD,
    };

    let category = if systolic >= 180 || diastolic >= 120 {
        BpCategory::HypertensiveCrisis
    } else if systolic < 90 || diastolic < 60 {
        BpCategory::Hypotension
    } else if stage2 {
        BpCategory::Hypertension2
    } else if systolic >= 130 || diastolic >= 80 {
        BpCategory::Hypertension1
    } else if systolic >= 120 && diastolic < 80 {
        BpCategory::Elevated
    } else {
        BpCategory::Normal
    };

    Classification {
        category,
        is_abnormal: category.is_abnormal(),
        priority_rank: category.priority_rank(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category(systolic: u16, diastolic: u16) -> BpCategory {
        classify(systolic, diastolic, None, None).category
    }

    #[test]
    fn test_category_normal() {
        assert_eq!(category(115, 70), BpCategory::Normal);
        assert!(!classify(115, 70, None, None).is_abnormal);
    }

    #[test]
    fn test_category_elevated() {
        assert_eq!(category(125, 70), BpCategory::Elevated);
        assert!(classify(125, 70, None, None).is_abnormal);
    }

    #[test]
    fn test_category_stage1_boundaries() {
        assert_eq!(category(139, 89), BpCategory::Hypertension1);
        assert_eq!(category(130, 70), BpCategory::Hypertension1);
        assert_eq!(category(125, 80), BpCategory::Hypertension1);
    }

    #[test]
    fn test_category_stage2_boundaries() {
        assert_eq!(category(140, 90), BpCategory::Hypertension2);
        assert_eq!(category(179, 119), BpCategory::Hypertension2);
        assert_eq!(category(145, 70), BpCategory::Hypertension2);
        assert_eq!(category(120, 95), BpCategory::Hypertension2);
    }

    #[test]
    fn test_category_crisis_boundaries() {
        assert_eq!(category(180, 75), BpCategory::HypertensiveCrisis);
        assert_eq!(category(120, 125), BpCategory::HypertensiveCrisis);
    }

    #[test]
    fn test_category_hypotension() {
        assert_eq!(category(89, 60), BpCategory::Hypotension);
        assert_eq!(category(100, 55), BpCategory::Hypotension);
    }

    #[test]
    fn test_crisis_wins_over_hypotension() {
        // A crisis-level systolic with an implausibly low diastolic is still
        // a crisis
        assert_eq!(category(180, 0), BpCategory::HypertensiveCrisis);
    }

    #[test]
    fn test_custom_thresholds_only_replace_stage2() {
        // Custom 120/80: the pair check needs both limits breached, so
        // 125/70 falls through stage 2 and stage 1 down to elevated
        let result = classify(125, 70, Some(120), Some(80));
        assert_eq!(result.category, BpCategory::Elevated);

        // Both custom limits breached
        let result = classify(125, 85, Some(120), Some(80));
        assert_eq!(result.category, BpCategory::Hypertension2);
    }

    #[test]
    fn test_custom_thresholds_require_both_values() {
        // Only one override set: population defaults apply
        let result = classify(125, 70, Some(120), None);
        assert_eq!(result.category, BpCategory::Elevated);

        let result = classify(142, 70, Some(150), None);
        assert_eq!(result.category, BpCategory::Hypertension2);
    }

    #[test]
    fn test_custom_thresholds_do_not_mask_crisis() {
        let result = classify(185, 125, Some(200), Some(130));
        assert_eq!(result.category, BpCategory::HypertensiveCrisis);
    }

    #[test]
    fn test_classification_is_deterministic() {
        let first = classify(152, 96, None, None);
        let second = classify(152, 96, None, None);
        assert_eq!(first, second);
    }
}
