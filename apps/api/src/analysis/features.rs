//! Feature Extractor: pure, deterministic scan of canonical resume text.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::analysis::vocabulary::{Lexicon, SkillCategory};
use crate::models::resume::EducationLevel;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").expect("valid regex")
});

/// `555-123-4567`, `555.123.4567`, `5551234567`, `(555) 123-4567`, `+1 555 123 4567`.
static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b\d{3}[-.\s]?\d{3}[-.\s]?\d{4}\b|\(\d{3}\)\s*\d{3}[-.\s]?\d{4}|\+\d{1,3}[-.\s]?\d{3}[-.\s]?\d{3}[-.\s]?\d{4}",
    )
    .expect("valid regex")
});

/// Everything derived from one resume text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResumeFeatures {
    pub has_email: bool,
    pub has_phone: bool,
    /// Canonical skill names in vocabulary order.
    pub skills: Vec<String>,
    pub education: EducationLevel,
    pub experience_years: u32,
    pub word_count: u32,
    pub sections: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SkillCategories {
    pub technical: Vec<String>,
    pub soft: Vec<String>,
}

pub fn extract_features(lexicon: &Lexicon, text: &str) -> ResumeFeatures {
    ResumeFeatures {
        has_email: has_email(text),
        has_phone: has_phone(text),
        skills: lexicon.find_skills(text),
        education: lexicon.education_level(text),
        experience_years: lexicon.experience_years(text),
        word_count: word_count(text),
        sections: lexicon.sections(text),
    }
}

pub fn has_email(text: &str) -> bool {
    EMAIL_RE.is_match(text)
}

pub fn has_phone(text: &str) -> bool {
    PHONE_RE.is_match(text)
}

pub fn word_count(text: &str) -> u32 {
    u32::try_from(text.split_whitespace().count()).unwrap_or(u32::MAX)
}

/// Splits skills into technical and soft. Skills unknown to the vocabulary count as technical.
pub fn categorize_skills(lexicon: &Lexicon, skills: &[String]) -> SkillCategories {
    let mut categories = SkillCategories::default();
    for skill in skills {
        match lexicon.category_of(skill) {
            Some(SkillCategory::Soft) => categories.soft.push(skill.clone()),
            _ => categories.technical.push(skill.clone()),
        }
    }
    categories
}
