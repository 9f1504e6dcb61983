use chrono::{DateTime, Duration, NaiveDate, Utc};
use tracing::{debug, warn};

use crate::entities::communication::Communication;
use crate::entities::reading::Reading;
use crate::entities::subject::{ActivityLevel, SmokingStatus, Subject};
use crate::entities::task::TaskPriority;
use crate::entities::triage::{
    FlagSeverity, FlaggedTrend, Recommendation, TrendFlagKind, TriageDecision,
};
use crate::services::trend::{BpTrendSummary, RiskLevel, TrendDirection, TREND_DELTA_MMHG};

/// Policy constants for trend and triage evaluation.
///
/// These are program policy, not clinical derivations; they are grouped here
/// so deployments can tune them without touching rule code.
#[derive(Debug, Clone)]
pub struct TriageConfig {
    /// Days of reading history considered when computing the BP trend
    pub trend_window_days: i64,
    /// Mean systolic shift between window halves that marks a real trend
    pub trend_delta_mmhg: f64,
    /// Days of communication history considered recent for outreach checks
    pub recent_contact_window_days: i64,
    /// Failed contact attempts within the recent window that count as
    /// unreachable
    pub failed_contact_threshold: usize,
    /// Minimum prior readings for the sustained-elevation rule
    pub sustained_elevation_min_readings: usize,
    /// Mean systolic at or above which prior readings count as elevated
    pub sustained_elevation_avg_systolic: f64,
    /// Systolic standard deviation below which a sequence counts as
    /// low-variability
    pub low_variability_stddev_mmhg: f64,
}

impl Default for TriageConfig {
    fn default() -> Self {
        Self {
            trend_window_days: 30,
            trend_delta_mmhg: TREND_DELTA_MMHG,
            recent_contact_window_days: 14,
            failed_contact_threshold: 2,
            sustained_elevation_min_readings: 3,
            sustained_elevation_avg_systolic: 125.0,
            low_variability_stddev_mmhg: 10.0,
        }
    }
}

/// Rule-based triage of classified readings.
///
/// Rules are evaluated most severe first and the first match wins; scoring is
/// a total function over valid classified input, and missing history or
/// communications degrade to conservative defaults rather than failing.
#[derive(Debug, Clone, Default)]
pub struct TriageScorer {
    config: TriageConfig,
}

impl TriageScorer {
    /// Create a scorer with the given policy configuration
    pub fn new(config: TriageConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TriageConfig {
        &self.config
    }

    /// Score one classified reading and decide what intervention it warrants.
    ///
    /// `prior_readings` is the member's earlier history ordered ascending,
    /// excluding the reading being scored; `communications` is the member's
    /// recent outreach history.
    pub fn triage(
        &self,
        reading: &Reading,
        subject: &Subject,
        trend: &BpTrendSummary,
        communications: &[Communication],
        prior_readings: &[Reading],
        now: DateTime<Utc>,
    ) -> TriageDecision {
        let systolic = reading.systolic();
        let diastolic = reading.diastolic();

        let failed_contacts = communications
            .iter()
            .filter(|c| c.outcome.is_failed_contact())
            .count();
        let unreachable = failed_contacts >= self.config.failed_contact_threshold;
        let worsening = trend.trend == TrendDirection::Worsening;
        let risk_score = risk_factor_score(subject, now.date_naive());
        let sustained = self.is_sustained_elevation(prior_readings);
        let flags = self.build_flags(trend, worsening, unreachable, risk_score, sustained);

        // Rules cascade most severe first; the first match wins.
        if systolic >= 180 || diastolic >= 120 {
            warn!(
                subject_id = %subject.id,
                systolic,
                diastolic,
                "Hypertensive crisis reading; escalating to nurse practitioner"
            );
            return TriageDecision::new(
                Recommendation::NursePractitioner,
                0.98,
                format!(
                    "Reading {systolic}/{diastolic} mmHg is at hypertensive crisis level; \
                     immediate nurse practitioner outreach required."
                ),
                flags,
                TaskPriority::Urgent,
                now + Duration::hours(4),
            );
        }

        let severe = systolic >= 160 || diastolic >= 100;
        if severe && (worsening || unreachable) {
            let compounding = if worsening {
                "pressure trending upward"
            } else {
                "repeated failed contact attempts"
            };
            debug!(subject_id = %subject.id, compounding, "Severe reading with compounding factor");
            return TriageDecision::new(
                Recommendation::NursePractitioner,
                0.90,
                format!(
                    "Reading {systolic}/{diastolic} mmHg is severely elevated with {compounding}; \
                     nurse practitioner follow-up within a day."
                ),
                flags,
                TaskPriority::High,
                now + Duration::hours(24),
            );
        }
        if severe {
            return TriageDecision::new(
                Recommendation::Coach,
                0.85,
                format!(
                    "Reading {systolic}/{diastolic} mmHg is severely elevated; \
                     health coach outreach scheduled."
                ),
                flags,
                TaskPriority::Medium,
                now + Duration::days(3),
            );
        }

        let stage2 = systolic >= 140 || diastolic >= 90;
        if stage2 && (risk_score >= 3 || worsening || unreachable) {
            debug!(
                subject_id = %subject.id,
                risk_score, worsening, unreachable,
                "Stage 2 reading with aggravating factors"
            );
            return TriageDecision::new(
                Recommendation::NursePractitioner,
                0.80,
                format!(
                    "Reading {systolic}/{diastolic} mmHg in stage 2 range for a member with \
                     aggravating factors (risk score {risk_score}); nurse practitioner review."
                ),
                flags,
                TaskPriority::High,
                now + Duration::days(3),
            );
        }
        if stage2 {
            return TriageDecision::new(
                Recommendation::Coach,
                0.85,
                format!(
                    "Reading {systolic}/{diastolic} mmHg in stage 2 range; \
                     routine health coach follow-up."
                ),
                flags,
                TaskPriority::Medium,
                now + Duration::days(5),
            );
        }

        if (120..140).contains(&systolic) && diastolic < 90 && sustained {
            return TriageDecision::new(
                Recommendation::Coach,
                0.75,
                format!(
                    "Reading {systolic}/{diastolic} mmHg with consistently elevated history; \
                     preventive coaching recommended."
                ),
                flags,
                TaskPriority::Low,
                now + Duration::days(7),
            );
        }

        TriageDecision::no_action(
            0.95,
            format!("Reading {systolic}/{diastolic} mmHg requires no intervention."),
            flags,
        )
    }

    /// Whether the member's history shows sustained elevation: enough prior
    /// readings, elevated on average, with little spread
    fn is_sustained_elevation(&self, prior_readings: &[Reading]) -> bool {
        if prior_readings.len() < self.config.sustained_elevation_min_readings {
            return false;
        }
        let systolics: Vec<f64> = prior_readings.iter().map(|r| r.systolic() as f64).collect();
        let mean = systolics.iter().sum::<f64>() / systolics.len() as f64;
        if mean < self.config.sustained_elevation_avg_systolic {
            return false;
        }
        let variance =
            systolics.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / systolics.len() as f64;
        variance.sqrt() < self.config.low_variability_stddev_mmhg
    }

    fn build_flags(
        &self,
        trend: &BpTrendSummary,
        worsening: bool,
        unreachable: bool,
        risk_score: u8,
        sustained: bool,
    ) -> Vec<FlaggedTrend> {
        let mut flags = Vec::new();
        if worsening {
            let severity = if trend.risk_level >= RiskLevel::High {
                FlagSeverity::High
            } else {
                FlagSeverity::Moderate
            };
            flags.push(FlaggedTrend {
                kind: TrendFlagKind::RisingBp,
                severity,
            });
        }
        if unreachable {
            flags.push(FlaggedTrend {
                kind: TrendFlagKind::FailedOutreach,
                severity: FlagSeverity::Moderate,
            });
        }
        if risk_score >= 3 {
            let severity = if risk_score >= 5 {
                FlagSeverity::High
            } else {
                FlagSeverity::Moderate
            };
            flags.push(FlaggedTrend {
                kind: TrendFlagKind::HighRiskProfile,
                severity,
            });
        }
        if sustained {
            flags.push(FlaggedTrend {
                kind: TrendFlagKind::SustainedElevation,
                severity: FlagSeverity::Low,
            });
        }
        flags
    }
}

/// Score a member's demographic, history and lifestyle risk factors.
///
/// Weights: age 65+ adds 2 (45+ adds 1); diabetes 2; heart disease 3;
/// hypertension history 1; current smoking 2; sedentary lifestyle 1; short
/// sleep (under 6h) 1; BMI 30+ adds 2 (25+ adds 1).
pub fn risk_factor_score(subject: &Subject, today: NaiveDate) -> u8 {
    let mut score = 0;

    match subject.age_years(today) {
        Some(age) if age >= 65 => score += 2,
        Some(age) if age >= 45 => score += 1,
        _ => {}
    }

    if subject.medical_history.diabetes {
        score += 2;
    }
    if subject.medical_history.heart_disease {
        score += 3;
    }
    if subject.medical_history.hypertension {
        score += 1;
    }

    if subject.lifestyle.smoking == SmokingStatus::Current {
        score += 2;
    }
    if subject.lifestyle.activity == ActivityLevel::Sedentary {
        score += 1;
    }
    if matches!(subject.lifestyle.average_sleep_hours, Some(hours) if hours < 6.0) {
        score += 1;
    }

    if let Some(bmi) = subject.bmi() {
        if bmi >= 30.0 {
            score += 2;
        } else if bmi >= 25.0 {
            score += 1;
        }
    }

    score
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::communication::{CommChannel, CommOutcome};
    use crate::services::trend::analyze_trend;
    use chrono::TimeZone;
    use uuid::Uuid;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 15, 8, 0, 0).unwrap()
    }

    fn reading_for(subject: &Subject, systolic: u16, diastolic: u16) -> Reading {
        Reading::classified(subject, systolic, diastolic, None, now(), None, now())
    }

    fn stable_trend() -> BpTrendSummary {
        analyze_trend(&[], 30, TREND_DELTA_MMHG, now())
    }

    fn worsening_trend(subject: &Subject) -> BpTrendSummary {
        let readings: Vec<Reading> = [128u16, 130, 145, 155]
            .iter()
            .enumerate()
            .map(|(i, &s)| {
                let at = now() - Duration::days(10 - i as i64);
                Reading::classified(subject, s, 82, None, at, None, at)
            })
            .collect();
        analyze_trend(&readings, 30, TREND_DELTA_MMHG, now())
    }

    fn failed_contact(subject: &Subject, days_ago: i64) -> Communication {
        Communication {
            id: Uuid::new_v4(),
            subject_id: subject.id,
            channel: CommChannel::Phone,
            outcome: CommOutcome::NoAnswer,
            occurred_at: now() - Duration::days(days_ago),
            notes: None,
        }
    }

    #[test]
    fn test_crisis_reading_regardless_of_history() {
        let subject = Subject::sample("Maria", "Lopez");
        let reading = reading_for(&subject, 185, 95);
        let scorer = TriageScorer::default();

        let decision = scorer.triage(&reading, &subject, &stable_trend(), &[], &[], now());

        assert_eq!(decision.recommendation(), Recommendation::NursePractitioner);
        assert_eq!(decision.confidence(), 0.98);
        assert_eq!(decision.priority(), Some(TaskPriority::Urgent));
        assert_eq!(decision.due_date(), Some(now() + Duration::hours(4)));
    }

    #[test]
    fn test_severe_reading_with_worsening_trend() {
        let subject = Subject::sample("Maria", "Lopez");
        let reading = reading_for(&subject, 164, 92);
        let scorer = TriageScorer::default();

        let decision = scorer.triage(
            &reading,
            &subject,
            &worsening_trend(&subject),
            &[],
            &[],
            now(),
        );

        assert_eq!(decision.recommendation(), Recommendation::NursePractitioner);
        assert_eq!(decision.confidence(), 0.90);
        assert_eq!(decision.due_date(), Some(now() + Duration::hours(24)));
        assert!(decision
            .flagged_trends()
            .iter()
            .any(|f| f.kind == TrendFlagKind::RisingBp));
    }

    #[test]
    fn test_severe_reading_without_compounding_goes_to_coach() {
        let subject = Subject::sample("Maria", "Lopez");
        let reading = reading_for(&subject, 164, 92);
        let scorer = TriageScorer::default();

        let decision = scorer.triage(&reading, &subject, &stable_trend(), &[], &[], now());

        assert_eq!(decision.recommendation(), Recommendation::Coach);
        assert_eq!(decision.confidence(), 0.85);
        assert_eq!(decision.due_date(), Some(now() + Duration::days(3)));
    }

    #[test]
    fn test_stage2_with_failed_contacts_escalates_to_np() {
        let subject = Subject::sample("Maria", "Lopez");
        let reading = reading_for(&subject, 150, 95);
        let scorer = TriageScorer::default();
        let contacts = vec![failed_contact(&subject, 3), failed_contact(&subject, 6)];

        let decision = scorer.triage(&reading, &subject, &stable_trend(), &contacts, &[], now());

        assert_eq!(decision.recommendation(), Recommendation::NursePractitioner);
        assert!(decision
            .flagged_trends()
            .iter()
            .any(|f| f.kind == TrendFlagKind::FailedOutreach));
    }

    #[test]
    fn test_stage2_with_high_risk_profile_escalates_to_np() {
        let mut subject = Subject::sample("Maria", "Lopez");
        subject.date_of_birth = NaiveDate::from_ymd_opt(1958, 1, 10);
        subject.medical_history.diabetes = true;
        let reading = reading_for(&subject, 150, 95);
        let scorer = TriageScorer::default();

        let decision = scorer.triage(&reading, &subject, &stable_trend(), &[], &[], now());

        assert_eq!(decision.recommendation(), Recommendation::NursePractitioner);
        assert_eq!(decision.confidence(), 0.80);
        assert_eq!(decision.priority(), Some(TaskPriority::High));
    }

    #[test]
    fn test_stage2_without_aggravating_factors_goes_to_coach() {
        let subject = Subject::sample("Maria", "Lopez");
        let reading = reading_for(&subject, 150, 95);
        let scorer = TriageScorer::default();

        let decision = scorer.triage(&reading, &subject, &stable_trend(), &[], &[], now());

        assert_eq!(decision.recommendation(), Recommendation::Coach);
        assert_eq!(decision.confidence(), 0.85);
        assert_eq!(decision.due_date(), Some(now() + Duration::days(5)));
    }

    #[test]
    fn test_sustained_elevation_triggers_preventive_coaching() {
        let subject = Subject::sample("Maria", "Lopez");
        let reading = reading_for(&subject, 128, 82);
        let scorer = TriageScorer::default();
        let priors: Vec<Reading> = [130u16, 127, 131]
            .iter()
            .enumerate()
            .map(|(i, &s)| {
                let at = now() - Duration::days(12 - i as i64);
                Reading::classified(&subject, s, 80, None, at, None, at)
            })
            .collect();

        let decision = scorer.triage(&reading, &subject, &stable_trend(), &[], &priors, now());

        assert_eq!(decision.recommendation(), Recommendation::Coach);
        assert_eq!(decision.confidence(), 0.75);
        assert_eq!(decision.priority(), Some(TaskPriority::Low));
        assert_eq!(decision.due_date(), Some(now() + Duration::days(7)));
    }

    #[test]
    fn test_sustained_elevation_requires_low_variability() {
        let subject = Subject::sample("Maria", "Lopez");
        let reading = reading_for(&subject, 128, 82);
        let scorer = TriageScorer::default();
        // Same mean, wide spread
        let priors: Vec<Reading> = [100u16, 130, 160]
            .iter()
            .enumerate()
            .map(|(i, &s)| {
                let at = now() - Duration::days(12 - i as i64);
                Reading::classified(&subject, s, 80, None, at, None, at)
            })
            .collect();

        let decision = scorer.triage(&reading, &subject, &stable_trend(), &[], &priors, now());
        assert_eq!(decision.recommendation(), Recommendation::None);
    }

    #[test]
    fn test_normal_reading_needs_no_action() {
        let subject = Subject::sample("Maria", "Lopez");
        let reading = reading_for(&subject, 118, 76);
        let scorer = TriageScorer::default();

        let decision = scorer.triage(&reading, &subject, &stable_trend(), &[], &[], now());

        assert_eq!(decision.recommendation(), Recommendation::None);
        assert_eq!(decision.confidence(), 0.95);
        assert!(!decision.is_actionable());
    }

    #[test]
    fn test_risk_factor_score_weights() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 15).unwrap();

        let mut subject = Subject::sample("Maria", "Lopez");
        subject.date_of_birth = NaiveDate::from_ymd_opt(1955, 1, 1);
        subject.medical_history.diabetes = true;
        subject.medical_history.heart_disease = true;
        subject.medical_history.hypertension = true;
        subject.lifestyle.smoking = SmokingStatus::Current;
        subject.lifestyle.activity = ActivityLevel::Sedentary;
        subject.lifestyle.average_sleep_hours = Some(5.0);
        // 66in, 200lbs -> BMI about 32.3
        subject.height_inches = Some(66.0);
        subject.weight_lbs = Some(200.0);

        // 2 (age 71) + 2 + 3 + 1 + 2 + 1 + 1 + 2 (BMI 30+)
        assert_eq!(risk_factor_score(&subject, today), 14);

        let lean = Subject::sample("Ana", "Reyes");
        // Sample subject: age 40, healthy history, BMI about 24
        assert_eq!(risk_factor_score(&lean, today), 0);
    }

    #[test]
    fn test_risk_factor_score_middle_age_and_overweight() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 15).unwrap();
        let mut subject = Subject::sample("Maria", "Lopez");
        subject.date_of_birth = NaiveDate::from_ymd_opt(1978, 1, 1);
        subject.height_inches = Some(66.0);
        subject.weight_lbs = Some(170.0);

        // 1 (age 48) + 1 (BMI about 27.4)
        assert_eq!(risk_factor_score(&subject, today), 2);
    }
}
