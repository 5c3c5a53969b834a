//! Reference vocabulary: versioned skill list plus education, experience and
//! section cues, loaded from TOML and compiled into matchers once at startup.
//!
//! The default vocabulary is embedded from `config/vocabulary.toml`; deployments
//! can point `VOCABULARY_PATH` at a replacement without rebuilding.

use std::collections::HashMap;
use std::path::Path;

use regex::{Regex, RegexSet, RegexSetBuilder};
use serde::Deserialize;
use thiserror::Error;

use crate::models::resume::EducationLevel;

const DEFAULT_VOCABULARY: &str = include_str!("../../config/vocabulary.toml");

/// Characters that count as part of a word when checking match boundaries.
/// Anything else (whitespace, punctuation, `+`, `#`) separates words, which lets
/// surface forms like `C++` or `Node.js` match on their own. Kept to ASCII: the
/// Unicode letter classes blow up the compiled skill set past regex size limits.
const WORD_CHAR: &str = "A-Za-z0-9_";

/// Compiled-size ceiling for the skill set. The embedded vocabulary fits the
/// regex default (10 MiB); the extra room is for larger override files.
const SKILL_SET_SIZE_LIMIT: usize = 32 * (1 << 20);

#[derive(Debug, Error)]
pub enum VocabularyError {
    #[error("failed to read vocabulary file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid vocabulary TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid vocabulary: {0}")]
    Invalid(String),

    #[error("failed to compile vocabulary pattern: {0}")]
    Pattern(#[from] regex::Error),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillCategory {
    #[default]
    Technical,
    Soft,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SkillDefinition {
    /// Canonical display name, e.g. "Node.js".
    pub name: String,
    #[serde(default)]
    pub category: SkillCategory,
    /// Whether the canonical name itself is a surface form.
    #[serde(default = "default_true")]
    pub match_name: bool,
    #[serde(default)]
    pub aliases: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EducationCue {
    pub level: EducationLevel,
    /// Matched case-insensitively.
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Matched case-sensitively ("MS" yes, "ms" no).
    #[serde(default)]
    pub acronyms: Vec<String>,
    /// Phrases that contain a cue but do not name a degree ("MS Office",
    /// "Scrum Master"). Matched case-insensitively and ignored.
    #[serde(default)]
    pub exclusions: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExperienceCues {
    pub units: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SectionCue {
    pub name: String,
    pub keywords: Vec<String>,
}

/// Raw vocabulary as written in TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct Vocabulary {
    pub version: String,
    pub skills: Vec<SkillDefinition>,
    #[serde(default)]
    pub education: Vec<EducationCue>,
    pub experience: ExperienceCues,
    #[serde(default)]
    pub sections: Vec<SectionCue>,
}

fn default_true() -> bool {
    true
}

impl Vocabulary {
    pub fn from_toml(source: &str) -> Result<Self, VocabularyError> {
        Ok(toml::from_str(source)?)
    }

    pub fn embedded() -> Result<Self, VocabularyError> {
        Self::from_toml(DEFAULT_VOCABULARY)
    }

    pub fn from_path(path: &Path) -> Result<Self, VocabularyError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml(&source)
    }
}

#[derive(Debug, Clone)]
struct EducationMatcher {
    level: EducationLevel,
    pattern: Regex,
    exclusions: Option<Regex>,
}

impl EducationMatcher {
    fn matches(&self, text: &str) -> bool {
        match &self.exclusions {
            Some(exclusions) => self.pattern.is_match(&exclusions.replace_all(text, " ")),
            None => self.pattern.is_match(text),
        }
    }
}

/// Compiled, immutable view of a [`Vocabulary`]. Shared across requests via `Arc`.
#[derive(Debug, Clone)]
pub struct Lexicon {
    version: String,
    skills: Vec<SkillDefinition>,
    /// One pattern per skill, same index as `skills`.
    skill_set: RegexSet,
    /// lowercase surface form → index into `skills`
    surface_forms: HashMap<String, usize>,
    /// Sorted highest level first.
    education: Vec<EducationMatcher>,
    experience: Regex,
    sections: Vec<SectionCue>,
}

impl Lexicon {
    pub fn compile(vocabulary: Vocabulary) -> Result<Self, VocabularyError> {
        if vocabulary.skills.is_empty() {
            return Err(VocabularyError::Invalid("skill list is empty".to_string()));
        }
        if vocabulary.experience.units.is_empty() {
            return Err(VocabularyError::Invalid(
                "experience units are empty".to_string(),
            ));
        }

        let mut surface_forms = HashMap::new();
        let mut skill_patterns = Vec::with_capacity(vocabulary.skills.len());

        for (idx, skill) in vocabulary.skills.iter().enumerate() {
            let forms = surface_forms_of(skill);
            if forms.is_empty() {
                return Err(VocabularyError::Invalid(format!(
                    "skill '{}' has no surface forms",
                    skill.name
                )));
            }
            for form in &forms {
                if let Some(prev) = surface_forms.insert(form.to_lowercase(), idx) {
                    if prev != idx {
                        return Err(VocabularyError::Invalid(format!(
                            "surface form '{form}' is claimed by both '{}' and '{}'",
                            vocabulary.skills[prev].name, skill.name
                        )));
                    }
                }
            }
            skill_patterns.push(bounded_pattern(&forms, true));
        }

        let mut education = Vec::with_capacity(vocabulary.education.len());
        for cue in &vocabulary.education {
            let mut alternatives = Vec::new();
            if !cue.keywords.is_empty() {
                alternatives.push(bounded_pattern(&cue.keywords, true));
            }
            if !cue.acronyms.is_empty() {
                alternatives.push(bounded_pattern(&cue.acronyms, false));
            }
            if alternatives.is_empty() {
                continue;
            }
            let exclusions = if cue.exclusions.is_empty() {
                None
            } else {
                Some(Regex::new(&phrase_pattern(&cue.exclusions))?)
            };
            education.push(EducationMatcher {
                level: cue.level,
                pattern: Regex::new(&alternatives.join("|"))?,
                exclusions,
            });
        }
        education.sort_by(|a, b| b.level.cmp(&a.level));

        let units = vocabulary
            .experience
            .units
            .iter()
            .map(|u| regex::escape(u))
            .collect::<Vec<_>>()
            .join("|");
        // A fractional part is consumed so "3.5 years" reads as 3, not 5.
        let experience = Regex::new(&format!(
            r"(?i)\b(\d{{1,2}})(?:\.\d+)?\s*\+?\s*(?:{units})\b"
        ))?;

        let sections = vocabulary
            .sections
            .into_iter()
            .map(|s| SectionCue {
                name: s.name,
                keywords: s.keywords.iter().map(|k| k.to_lowercase()).collect(),
            })
            .collect();

        Ok(Lexicon {
            version: vocabulary.version,
            skill_set: RegexSetBuilder::new(&skill_patterns)
                .size_limit(SKILL_SET_SIZE_LIMIT)
                .build()?,
            skills: vocabulary.skills,
            surface_forms,
            education,
            experience,
            sections,
        })
    }

    /// Loads from `path` when given, otherwise the embedded default.
    pub fn load(path: Option<&Path>) -> Result<Self, VocabularyError> {
        let vocabulary = match path {
            Some(p) => Vocabulary::from_path(p)?,
            None => Vocabulary::embedded()?,
        };
        Self::compile(vocabulary)
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn skill_count(&self) -> usize {
        self.skills.len()
    }

    /// Canonical names of every skill mentioned in `text`, in vocabulary order.
    pub fn find_skills(&self, text: &str) -> Vec<String> {
        let mut hits: Vec<usize> = self.skill_set.matches(text).into_iter().collect();
        hits.sort_unstable();
        hits.into_iter()
            .map(|idx| self.skills[idx].name.clone())
            .collect()
    }

    /// Maps any recognized surface form to its canonical skill name.
    pub fn canonical_skill(&self, surface: &str) -> Option<&str> {
        self.surface_forms
            .get(&surface.trim().to_lowercase())
            .map(|&idx| self.skills[idx].name.as_str())
    }

    pub fn category_of(&self, canonical: &str) -> Option<SkillCategory> {
        self.surface_forms
            .get(&canonical.to_lowercase())
            .map(|&idx| self.skills[idx].category)
    }

    /// Highest education level with a cue present in `text`.
    pub fn education_level(&self, text: &str) -> EducationLevel {
        self.education
            .iter()
            .find(|cue| cue.matches(text))
            .map(|cue| cue.level)
            .unwrap_or_default()
    }

    /// Largest "N years" figure in `text`, or 0.
    pub fn experience_years(&self, text: &str) -> u32 {
        self.experience
            .captures_iter(text)
            .filter_map(|caps| caps.get(1)?.as_str().parse::<u32>().ok())
            .max()
            .unwrap_or(0)
    }

    /// Names of sections whose heading keywords appear in `text`.
    pub fn sections(&self, text: &str) -> Vec<String> {
        let text_lower = text.to_lowercase();
        self.sections
            .iter()
            .filter(|s| s.keywords.iter().any(|k| text_lower.contains(k.as_str())))
            .map(|s| s.name.clone())
            .collect()
    }
}

fn surface_forms_of(skill: &SkillDefinition) -> Vec<String> {
    let mut forms = Vec::with_capacity(skill.aliases.len() + 1);
    if skill.match_name {
        forms.push(skill.name.clone());
    }
    forms.extend(
        skill
            .aliases
            .iter()
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty()),
    );
    forms
}

/// Builds `(?:(?:^|[^word])(?:a|b|c)(?:$|[^word]))`. The case flag is scoped to
/// the group so patterns can be joined with `|` without leaking it.
fn bounded_pattern(forms: &[String], case_insensitive: bool) -> String {
    let alternatives = forms
        .iter()
        .map(|f| regex::escape(f))
        .collect::<Vec<_>>()
        .join("|");
    let flags = if case_insensitive { "?i:" } else { "?:" };
    format!("({flags}(?:^|[^{WORD_CHAR}])(?:{alternatives})(?:$|[^{WORD_CHAR}]))")
}

/// Case-insensitive whole-phrase alternation. `\b` does not consume the
/// neighbouring separator, so adjacent phrases are all found.
fn phrase_pattern(phrases: &[String]) -> String {
    let alternatives = phrases
        .iter()
        .map(|p| regex::escape(p.trim()))
        .collect::<Vec<_>>()
        .join("|");
    format!(r"(?i)\b(?:{alternatives})\b")
}

/// Embedded vocabulary compiled once for the whole test binary.
#[cfg(test)]
pub(crate) fn embedded_for_tests() -> &'static Lexicon {
    use std::sync::LazyLock;

    static LEXICON: LazyLock<Lexicon> =
        LazyLock::new(|| Lexicon::load(None).expect("embedded vocabulary compiles"));
    &LEXICON
}
