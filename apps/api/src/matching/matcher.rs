use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::analysis::vocabulary::Lexicon;
use crate::models::job::Job;
use crate::models::resume::Resume;

static YEARS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").expect("valid regex"));

// ────────────────────────────────────────────────────────────────────────────
// Output models
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchOutcome {
    /// 0 – 100
    pub match_score: u32,
    /// Required skills the resume has, in job order.
    pub matching_skills: Vec<String>,
    /// Required skills the resume lacks, in job order.
    pub missing_skills: Vec<String>,
    /// Informational; does not feed `match_score`.
    pub experience_match: bool,
}

/// One entry of the ranked catalog: `{ job, match_score, matching_skills, missing_skills, experience_match }`.
#[derive(Debug, Clone, Serialize)]
pub struct JobMatch {
    pub job: Job,
    #[serde(flatten)]
    pub outcome: MatchOutcome,
}

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

/// Scores one resume against one job. Implementations must be pure: the same
/// inputs always give the same outcome, so catalog rankings are repeatable.
pub trait MatchScorer: Send + Sync {
    fn score(&self, resume: &Resume, job: &Job) -> MatchOutcome;
}

// ────────────────────────────────────────────────────────────────────────────
// SkillOverlapScorer: default implementation
// ────────────────────────────────────────────────────────────────────────────

/// Percentage of the job's required skills present on the resume.
///
/// Skills compare case-insensitively. `match_score = round(100 * matching / required)`
/// with halves rounded up; a job with no required skills scores 100.
pub struct SkillOverlapScorer;

impl MatchScorer for SkillOverlapScorer {
    fn score(&self, resume: &Resume, job: &Job) -> MatchOutcome {
        let held: HashSet<String> = resume.skills.iter().map(|s| skill_key(s)).collect();

        let (matching_skills, missing_skills): (Vec<String>, Vec<String>) = job
            .required_skills
            .iter()
            .cloned()
            .partition(|skill| held.contains(&skill_key(skill)));

        MatchOutcome {
            match_score: percentage(matching_skills.len(), job.required_skills.len()),
            matching_skills,
            missing_skills,
            experience_match: meets_experience(resume.experience_years, job),
        }
    }
}

fn skill_key(skill: &str) -> String {
    skill.trim().to_lowercase()
}

fn percentage(part: usize, whole: usize) -> u32 {
    if whole == 0 {
        return 100;
    }
    let rounded = (100 * part + whole / 2) / whole;
    u32::try_from(rounded).unwrap_or(100).min(100)
}

/// True when the job states no figure, or the resume meets the first number in it.
fn meets_experience(resume_years: u32, job: &Job) -> bool {
    required_years(job.experience_required.as_deref())
        .map_or(true, |required| resume_years >= required)
}

fn required_years(text: Option<&str>) -> Option<u32> {
    YEARS_RE.find(text?)?.as_str().parse().ok()
}

/// Scores every job and orders them by score descending, then job id ascending.
pub fn rank_jobs(scorer: &dyn MatchScorer, resume: &Resume, jobs: Vec<Job>) -> Vec<JobMatch> {
    let mut matches: Vec<JobMatch> = jobs
        .into_iter()
        .map(|job| JobMatch {
            outcome: scorer.score(resume, &job),
            job,
        })
        .collect();

    matches.sort_by(|a, b| {
        b.outcome
            .match_score
            .cmp(&a.outcome.match_score)
            .then_with(|| a.job.id.cmp(&b.job.id))
    });
    matches
}

/// Trims each entry, maps vocabulary surface forms to canonical names and drops
/// case-insensitive duplicates, keeping first-seen order.
pub fn normalize_required_skills(lexicon: &Lexicon, raw: &[String]) -> Result<Vec<String>, String> {
    let mut seen = HashSet::new();
    let mut normalized = Vec::with_capacity(raw.len());

    for entry in raw {
        let trimmed = entry.trim();
        if trimmed.is_empty() {
            return Err("Required skills must not contain blank entries".to_string());
        }
        let canonical = lexicon.canonical_skill(trimmed).unwrap_or(trimmed);
        if seen.insert(skill_key(canonical)) {
            normalized.push(canonical.to_string());
        }
    }
    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    use crate::analysis::vocabulary::embedded_for_tests;
    use crate::models::resume::EducationLevel;

    fn resume(skills: &[&str], experience_years: u32) -> Resume {
        Resume {
            id: Uuid::new_v4(),
            owner: Uuid::new_v4(),
            filename: "cv.txt".to_string(),
            raw_text: String::new(),
            skills: skills.iter().map(|s| s.to_string()).collect(),
            has_email: true,
            has_phone: true,
            education: EducationLevel::Bachelor,
            experience_years,
            word_count: 400,
            ats_score: 80,
            archive_key: None,
            created_at: Utc::now(),
        }
    }

    fn job(id: u128, skills: &[&str], experience: Option<&str>) -> Job {
        Job {
            id: Uuid::from_u128(id),
            title: format!("Job {id}"),
            company: "Acme".to_string(),
            location: None,
            salary_range: None,
            description: "Build things".to_string(),
            requirements: None,
            required_skills: skills.iter().map(|s| s.to_string()).collect(),
            experience_required: experience.map(str::to_string),
            education_required: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_one_of_three_rounds_to_33() {
        let outcome = SkillOverlapScorer.score(
            &resume(&["Python", "Java"], 3),
            &job(1, &["Python", "SQL", "Docker"], None),
        );
        assert_eq!(outcome.matching_skills, vec!["Python"]);
        assert_eq!(outcome.missing_skills, vec!["SQL", "Docker"]);
        assert_eq!(outcome.match_score, 33);
    }

    #[test]
    fn test_empty_requirements_score_100() {
        let outcome = SkillOverlapScorer.score(&resume(&[], 0), &job(1, &[], None));
        assert_eq!(outcome.match_score, 100);
        assert!(outcome.matching_skills.is_empty());
        assert!(outcome.missing_skills.is_empty());
    }

    #[test]
    fn test_rounding_half_up() {
        assert_eq!(percentage(2, 3), 67);
        assert_eq!(percentage(1, 8), 13); // 12.5
        assert_eq!(percentage(3, 3), 100);
        assert_eq!(percentage(0, 5), 0);
    }

    #[test]
    fn test_matching_and_missing_partition_required() {
        let required = ["Rust", "Go", "Kubernetes", "SQL", "AWS"];
        let outcome = SkillOverlapScorer.score(
            &resume(&["rust", "AWS", "Python"], 2),
            &job(1, &required, None),
        );

        let matching: HashSet<_> = outcome.matching_skills.iter().collect();
        let missing: HashSet<_> = outcome.missing_skills.iter().collect();
        assert!(matching.is_disjoint(&missing));

        let union: HashSet<String> = matching.union(&missing).map(|s| s.to_string()).collect();
        let expected: HashSet<String> = required.iter().map(|s| s.to_string()).collect();
        assert_eq!(union, expected);
        assert_eq!(outcome.matching_skills, vec!["Rust", "AWS"]);
    }

    #[test]
    fn test_experience_match() {
        let r = resume(&[], 3);
        assert!(SkillOverlapScorer.score(&r, &job(1, &[], None)).experience_match);
        assert!(SkillOverlapScorer.score(&r, &job(1, &[], Some("3+ years"))).experience_match);
        assert!(!SkillOverlapScorer.score(&r, &job(1, &[], Some("5 years"))).experience_match);
        assert!(SkillOverlapScorer.score(&r, &job(1, &[], Some("Senior"))).experience_match);
    }

    #[test]
    fn test_experience_does_not_affect_score() {
        let junior = SkillOverlapScorer.score(&resume(&["Rust"], 0), &job(1, &["Rust"], Some("10 years")));
        assert_eq!(junior.match_score, 100);
        assert!(!junior.experience_match);
    }

    #[test]
    fn test_ranking_is_deterministic_with_id_tiebreak() {
        let r = resume(&["Python", "SQL"], 2);
        let catalog = vec![
            job(3, &["Python"], None),
            job(1, &["Docker"], None),
            job(2, &["Python", "SQL"], None),
            job(4, &["SQL"], None),
        ];

        let ranked = rank_jobs(&SkillOverlapScorer, &r, catalog.clone());
        let ids: Vec<u128> = ranked.iter().map(|m| m.job.id.as_u128()).collect();
        assert_eq!(ids, vec![2, 3, 4, 1]);

        let again = rank_jobs(&SkillOverlapScorer, &r, catalog.into_iter().rev().collect());
        let again_ids: Vec<u128> = again.iter().map(|m| m.job.id.as_u128()).collect();
        assert_eq!(ids, again_ids);
    }

    #[test]
    fn test_job_match_flattens_outcome() {
        let ranked = rank_jobs(&SkillOverlapScorer, &resume(&["Rust"], 1), vec![job(1, &["Rust"], None)]);
        let value = serde_json::to_value(&ranked[0]).unwrap();
        assert_eq!(value["match_score"], 100);
        assert_eq!(value["matching_skills"][0], "Rust");
        assert!(value["missing_skills"].as_array().unwrap().is_empty());
        assert_eq!(value["experience_match"], true);
        assert_eq!(value["job"]["title"], "Job 1");
    }

    #[test]
    fn test_normalize_required_skills() {
        let lexicon = embedded_for_tests();
        let raw = vec![
            " golang ".to_string(),
            "Python".to_string(),
            "python".to_string(),
            "Fortran".to_string(),
        ];
        let normalized = normalize_required_skills(&lexicon, &raw).unwrap();
        assert_eq!(normalized, vec!["Go", "Python", "Fortran"]);

        let blank = vec!["Rust".to_string(), "  ".to_string()];
        assert!(normalize_required_skills(&lexicon, &blank).is_err());
    }
}
