use crate::entities::vitals::RiskLevel;

/// Classify vital signs using fixed clinical thresholds
///
/// Danger signs are checked first so a reading that is dangerous on one
/// vital is At Risk no matter what the other vital says. Readings that
/// fail every branch, including non-finite inputs, fall through to Normal.
pub fn classify_vitals(heart_rate: f64, spo2: f64) -> RiskLevel {
    if spo2 < 90.0 || heart_rate > 120.0 {
        RiskLevel::AtRisk
    } else if (spo2 >= 90.0 && spo2 <= 94.0) || (heart_rate > 100.0 && heart_rate <= 120.0) {
        RiskLevel::SlightlyNormal
    } else {
        RiskLevel::Normal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_normal() {
        let level = classify_vitals(72.0, 98.0);
        assert_eq!(level, RiskLevel::Normal);
    }

    #[test]
    fn test_classify_at_risk_low_spo2() {
        let level = classify_vitals(72.0, 85.0);
        assert_eq!(level, RiskLevel::AtRisk);
    }

    #[test]
    fn test_classify_at_risk_high_heart_rate() {
        let level = classify_vitals(140.0, 98.0);
        assert_eq!(level, RiskLevel::AtRisk);
    }

    #[test]
    fn test_classify_slightly_normal_spo2_band() {
        // SpO2 between 90 and 94 inclusive
        let level = classify_vitals(72.0, 92.0);
        assert_eq!(level, RiskLevel::SlightlyNormal);
    }

    #[test]
    fn test_classify_slightly_normal_heart_rate_band() {
        // Heart rate above 100 up to 120
        let level = classify_vitals(110.0, 98.0);
        assert_eq!(level, RiskLevel::SlightlyNormal);
    }

    #[test]
    fn test_classify_boundaries() {
        // Heart rate 121 is over the danger threshold, 120 is not
        assert_eq!(classify_vitals(121.0, 95.0), RiskLevel::AtRisk);
        assert_eq!(classify_vitals(120.0, 95.0), RiskLevel::SlightlyNormal);

        // SpO2 89 is under the danger threshold, 90 is borderline
        assert_eq!(classify_vitals(80.0, 89.0), RiskLevel::AtRisk);
        assert_eq!(classify_vitals(80.0, 90.0), RiskLevel::SlightlyNormal);

        // Heart rate exactly 100 is still normal, SpO2 95 leaves the borderline band
        assert_eq!(classify_vitals(100.0, 95.0), RiskLevel::Normal);
        assert_eq!(classify_vitals(90.0, 96.0), RiskLevel::Normal);

        // SpO2 94 is the top of the borderline band
        assert_eq!(classify_vitals(72.0, 94.0), RiskLevel::SlightlyNormal);
    }

    #[test]
    fn test_classify_danger_wins_over_borderline() {
        // Borderline SpO2 with a dangerous heart rate is At Risk
        assert_eq!(classify_vitals(130.0, 92.0), RiskLevel::AtRisk);

        // Dangerous SpO2 with a borderline heart rate is At Risk
        assert_eq!(classify_vitals(110.0, 85.0), RiskLevel::AtRisk);
    }

    #[test]
    fn test_classify_is_total_for_non_finite_inputs() {
        // NaN comparisons are all false, so NaN vitals fall through to Normal
        assert_eq!(classify_vitals(f64::NAN, f64::NAN), RiskLevel::Normal);
        assert_eq!(classify_vitals(f64::NAN, 98.0), RiskLevel::Normal);

        // Infinite heart rate trips the danger branch
        assert_eq!(classify_vitals(f64::INFINITY, 98.0), RiskLevel::AtRisk);
    }
}
