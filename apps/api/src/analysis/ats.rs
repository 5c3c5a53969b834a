//! ATS Scorer: deterministic weighted score over extracted features.
//!
//! | factor     | rule                                   | max |
//! |------------|----------------------------------------|-----|
//! | email      | present                                | 35  |
//! | phone      | present                                | 15  |
//! | skills     | 2 per skill, up to 10 skills           | 20  |
//! | experience | 2 per year, up to 5 years              | 10  |
//! | length     | 1 per full 15 words, up to 300 words   | 20  |
//!
//! Email alone outweighs the gap between the "excellent" band (70) and the
//! maximum (100), so a resume without an email address never rates excellent.
//! Every factor below its maximum produces exactly one recommendation.

use serde::Serialize;

use crate::analysis::features::ResumeFeatures;

pub const EMAIL_POINTS: u32 = 35;
pub const PHONE_POINTS: u32 = 15;
pub const POINTS_PER_SKILL: u32 = 2;
pub const SKILL_TARGET: u32 = 10;
pub const POINTS_PER_YEAR: u32 = 2;
pub const EXPERIENCE_TARGET_YEARS: u32 = 5;
pub const WORDS_PER_POINT: u32 = 15;
pub const WORD_TARGET: u32 = 300;

pub const EXCELLENT_THRESHOLD: u32 = 70;
pub const GOOD_THRESHOLD: u32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AtsRating {
    Excellent,
    Good,
    NeedsImprovement,
}

impl AtsRating {
    pub fn from_score(score: u32) -> Self {
        if score >= EXCELLENT_THRESHOLD {
            AtsRating::Excellent
        } else if score >= GOOD_THRESHOLD {
            AtsRating::Good
        } else {
            AtsRating::NeedsImprovement
        }
    }
}

/// Points earned per factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AtsBreakdown {
    pub email: u32,
    pub phone: u32,
    pub skills: u32,
    pub experience: u32,
    pub length: u32,
}

impl AtsBreakdown {
    pub fn total(&self) -> u32 {
        self.email + self.phone + self.skills + self.experience + self.length
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AtsReport {
    pub score: u32,
    pub rating: AtsRating,
    pub breakdown: AtsBreakdown,
    pub recommendations: Vec<String>,
}

pub fn score(features: &ResumeFeatures) -> AtsReport {
    let skill_count = u32::try_from(features.skills.len()).unwrap_or(u32::MAX);

    let breakdown = AtsBreakdown {
        email: if features.has_email { EMAIL_POINTS } else { 0 },
        phone: if features.has_phone { PHONE_POINTS } else { 0 },
        skills: skill_count.min(SKILL_TARGET) * POINTS_PER_SKILL,
        experience: features.experience_years.min(EXPERIENCE_TARGET_YEARS) * POINTS_PER_YEAR,
        length: features.word_count.min(WORD_TARGET) / WORDS_PER_POINT,
    };

    let score = breakdown.total().min(100);

    AtsReport {
        score,
        rating: AtsRating::from_score(score),
        breakdown,
        recommendations: build_recommendations(features, skill_count),
    }
}

fn build_recommendations(features: &ResumeFeatures, skill_count: u32) -> Vec<String> {
    let mut recs = Vec::new();

    if !features.has_email {
        recs.push("Add an email address so recruiters can contact you.".to_string());
    }
    if !features.has_phone {
        recs.push("Add a phone number to your contact details.".to_string());
    }
    if skill_count < SKILL_TARGET {
        recs.push(format!(
            "List more relevant skills ({skill_count} detected, aim for at least {SKILL_TARGET})."
        ));
    }
    if features.experience_years == 0 {
        recs.push(
            "State your years of experience explicitly, e.g. \"5 years of experience\"."
                .to_string(),
        );
    } else if features.experience_years < EXPERIENCE_TARGET_YEARS {
        recs.push(format!(
            "Highlight the depth of your {} years of experience with concrete outcomes.",
            features.experience_years
        ));
    }
    if features.word_count < WORD_TARGET {
        recs.push(format!(
            "Expand your resume ({} words); aim for at least {WORD_TARGET} words.",
            features.word_count
        ));
    }

    recs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::resume::EducationLevel;

    fn features(
        has_email: bool,
        has_phone: bool,
        skills: usize,
        experience_years: u32,
        word_count: u32,
    ) -> ResumeFeatures {
        ResumeFeatures {
            has_email,
            has_phone,
            skills: (0..skills).map(|i| format!("skill-{i}")).collect(),
            education: EducationLevel::Unspecified,
            experience_years,
            word_count,
            sections: vec![],
        }
    }

    #[test]
    fn test_perfect_resume_scores_100() {
        let report = score(&features(true, true, 12, 8, 600));
        assert_eq!(report.score, 100);
        assert_eq!(report.rating, AtsRating::Excellent);
        assert!(report.recommendations.is_empty());
    }

    #[test]
    fn test_empty_features_score_zero() {
        let report = score(&features(false, false, 0, 0, 0));
        assert_eq!(report.score, 0);
        assert_eq!(report.rating, AtsRating::NeedsImprovement);
        assert_eq!(report.recommendations.len(), 5);
    }

    #[test]
    fn test_missing_email_never_excellent() {
        let report = score(&features(false, true, 50, 30, 5000));
        assert_eq!(report.score, 65);
        assert!(report.score < EXCELLENT_THRESHOLD);
        assert_eq!(report.rating, AtsRating::Good);
    }

    #[test]
    fn test_breakdown_caps() {
        let report = score(&features(true, false, 4, 3, 160));
        assert_eq!(report.breakdown.email, 35);
        assert_eq!(report.breakdown.phone, 0);
        assert_eq!(report.breakdown.skills, 8);
        assert_eq!(report.breakdown.experience, 6);
        assert_eq!(report.breakdown.length, 10);
        assert_eq!(report.score, 59);
        assert_eq!(report.rating, AtsRating::Good);
    }

    #[test]
    fn test_every_lost_point_has_a_recommendation() {
        let report = score(&features(true, false, 4, 3, 160));
        // phone, skills, experience depth, length
        assert_eq!(report.recommendations.len(), 4);
        assert!(report.recommendations.iter().any(|r| r.contains("phone")));
        assert!(report.recommendations.iter().any(|r| r.contains("4 detected")));
        assert!(report.recommendations.iter().any(|r| r.contains("160 words")));
    }

    #[test]
    fn test_score_bounded_and_pure() {
        for email in [false, true] {
            for phone in [false, true] {
                for skills in [0, 3, 10, 40] {
                    for years in [0, 2, 5, 40] {
                        for words in [0, 100, 300, 10_000] {
                            let f = features(email, phone, skills, years, words);
                            let a = score(&f);
                            assert!(a.score <= 100);
                            assert_eq!(a, score(&f));
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_rating_bands() {
        assert_eq!(AtsRating::from_score(70), AtsRating::Excellent);
        assert_eq!(AtsRating::from_score(69), AtsRating::Good);
        assert_eq!(AtsRating::from_score(50), AtsRating::Good);
        assert_eq!(AtsRating::from_score(49), AtsRating::NeedsImprovement);
    }
}
