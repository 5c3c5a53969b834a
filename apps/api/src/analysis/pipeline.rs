use serde::Serialize;
use uuid::Uuid;

use crate::analysis::ats::{self, AtsReport};
use crate::analysis::features::{categorize_skills, extract_features, ResumeFeatures, SkillCategories};
use crate::analysis::vocabulary::Lexicon;
use crate::models::resume::NewResume;

/// Result of running one canonical text through feature extraction and scoring.
#[derive(Debug, Clone)]
pub struct ResumeAnalysis {
    pub features: ResumeFeatures,
    pub ats: AtsReport,
    pub skill_categories: SkillCategories,
}

/// The `analysis` object returned alongside a freshly stored resume.
#[derive(Debug, Serialize)]
pub struct AnalysisSummary {
    pub ats: AtsReport,
    pub sections: Vec<String>,
    pub skill_categories: SkillCategories,
}

pub fn analyze(lexicon: &Lexicon, text: &str) -> ResumeAnalysis {
    let features = extract_features(lexicon, text);
    let ats = ats::score(&features);
    let skill_categories = categorize_skills(lexicon, &features.skills);
    ResumeAnalysis {
        features,
        ats,
        skill_categories,
    }
}

impl ResumeAnalysis {
    /// Splits into the record to persist and the summary returned to the caller.
    pub fn into_parts(
        self,
        id: Uuid,
        owner: Uuid,
        filename: String,
        raw_text: String,
        archive_key: Option<String>,
    ) -> (NewResume, AnalysisSummary) {
        let features = self.features;
        let summary = AnalysisSummary {
            ats: self.ats,
            sections: features.sections,
            skill_categories: self.skill_categories,
        };
        let resume = NewResume {
            id,
            owner,
            filename,
            raw_text,
            skills: features.skills,
            has_email: features.has_email,
            has_phone: features.has_phone,
            education: features.education,
            experience_years: features.experience_years,
            word_count: features.word_count,
            ats_score: summary.ats.score,
            archive_key,
        };
        (resume, summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::vocabulary::embedded_for_tests;
    use crate::models::resume::EducationLevel;

    const SAMPLE: &str = "Jane Doe\njane@example.com | (555) 123-4567\n\n\
        EXPERIENCE\nSenior engineer with 6 years of experience in Rust, Python and PostgreSQL.\n\
        Led a team; strong communication and leadership.\n\n\
        EDUCATION\nBachelor of Science in Computer Science\n\n\
        SKILLS\nDocker, Kubernetes, AWS";

    #[test]
    fn test_summary_and_record_agree() {
        let lexicon = embedded_for_tests();
        let analysis = analyze(&lexicon, SAMPLE);
        let owner = Uuid::new_v4();
        let id = Uuid::new_v4();

        let (record, summary) =
            analysis.into_parts(id, owner, "cv.txt".into(), SAMPLE.to_string(), None);

        assert_eq!(record.id, id);
        assert_eq!(record.owner, owner);
        assert_eq!(record.ats_score, summary.ats.score);
        assert_eq!(record.ats_score, summary.ats.breakdown.total());
        assert!(record.has_email && record.has_phone);
        assert_eq!(record.education, EducationLevel::Bachelor);
        assert_eq!(record.experience_years, 6);
        assert!(record.skills.contains(&"Rust".to_string()));
        assert!(summary.skill_categories.soft.contains(&"Leadership".to_string()));
        assert!(summary.sections.contains(&"experience".to_string()));
        assert!(summary.sections.contains(&"education".to_string()));
    }

    #[test]
    fn test_summary_serializes_expected_keys() {
        let lexicon = embedded_for_tests();
        let (_, summary) = analyze(&lexicon, SAMPLE).into_parts(
            Uuid::new_v4(),
            Uuid::new_v4(),
            "cv.txt".into(),
            SAMPLE.to_string(),
            None,
        );
        let value = serde_json::to_value(&summary).unwrap();
        assert!(value["ats"]["score"].is_u64());
        assert!(value["ats"]["rating"].is_string());
        assert!(value["ats"]["breakdown"]["email"].is_u64());
        assert!(value["ats"]["recommendations"].is_array());
        assert!(value["sections"].is_array());
        assert!(value["skill_categories"]["technical"].is_array());
    }
}
