//! Keyword taxonomy used to score and classify opportunities.
//!
//! Four categories of case-insensitive, word-bounded patterns:
//! - Primary: a hit alone qualifies a record
//! - Booster: raises rank, never qualifies alone
//! - Generic work: inspection/survey-class terms, only used for near-misses
//! - Disqualifier: administrative content that is almost never on-topic
//!
//! Every category is compiled once into a single alternation and the
//! resulting [`TermTaxonomy`] is immutable. Share it with `Arc`.

mod builtin;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::errors::{Result, ScoutError};

pub use builtin::{BOOSTER, DISQUALIFIER, GENERIC_WORK, PRIMARY};

/// Taxonomy category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TermCategory {
    /// Definitive domain signal.
    Primary,
    /// Context signal.
    Booster,
    /// Inspection/survey/maintenance-class work.
    GenericWork,
    /// Explicit non-relevance signal.
    Disqualifier,
}

impl TermCategory {
    /// Stable string form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Booster => "booster",
            Self::GenericWork => "generic_work",
            Self::Disqualifier => "disqualifier",
        }
    }
}

/// One compiled category.
#[derive(Debug, Clone)]
pub struct TermSet {
    category: TermCategory,
    patterns: Vec<String>,
    matcher: Option<Regex>,
}

impl TermSet {
    /// Compiles `patterns` into one case-insensitive alternation.
    ///
    /// Each pattern is checked on its own first so a bad entry is reported
    /// by name. An empty list never matches.
    pub fn compile(category: TermCategory, patterns: Vec<String>) -> Result<Self> {
        for pattern in &patterns {
            Regex::new(pattern).map_err(|source| ScoutError::Pattern {
                pattern: pattern.clone(),
                source,
            })?;
        }

        let matcher = if patterns.is_empty() {
            None
        } else {
            let joined = patterns
                .iter()
                .map(|p| format!("(?:{p})"))
                .collect::<Vec<_>>()
                .join("|");
            let source = format!("(?i){joined}");
            let regex = Regex::new(&source).map_err(|source_err| ScoutError::Pattern {
                pattern: source.clone(),
                source: source_err,
            })?;
            Some(regex)
        };

        Ok(Self {
            category,
            patterns,
            matcher,
        })
    }

    /// The category of this set.
    #[must_use]
    pub fn category(&self) -> TermCategory {
        self.category
    }

    /// The source patterns.
    #[must_use]
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// Non-overlapping matches in `text`. A phrase occurrence counts once.
    #[must_use]
    pub fn count(&self, text: &str) -> u32 {
        self.matcher.as_ref().map_or(0, |re| {
            u32::try_from(re.find_iter(text).count()).unwrap_or(u32::MAX)
        })
    }

    /// Whether any pattern occurs in `text`.
    #[must_use]
    pub fn is_present(&self, text: &str) -> bool {
        self.matcher.as_ref().is_some_and(|re| re.is_match(text))
    }
}

/// Pattern lists before compilation, as read from TOML.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxonomySource {
    /// Primary patterns.
    #[serde(default)]
    pub primary: Vec<String>,
    /// Booster patterns.
    #[serde(default)]
    pub booster: Vec<String>,
    /// Generic-work patterns.
    #[serde(default)]
    pub generic_work: Vec<String>,
    /// Disqualifier patterns.
    #[serde(default)]
    pub disqualifier: Vec<String>,
}

impl TaxonomySource {
    /// The built-in pattern lists.
    #[must_use]
    pub fn builtin() -> Self {
        let owned = |list: &[&str]| list.iter().map(|p| (*p).to_string()).collect();
        Self {
            primary: owned(PRIMARY),
            booster: owned(BOOSTER),
            generic_work: owned(GENERIC_WORK),
            disqualifier: owned(DISQUALIFIER),
        }
    }
}

/// The compiled, immutable taxonomy.
#[derive(Debug, Clone)]
pub struct TermTaxonomy {
    primary: TermSet,
    booster: TermSet,
    generic_work: TermSet,
    disqualifier: TermSet,
}

impl TermTaxonomy {
    /// Compiles the built-in taxonomy.
    pub fn builtin() -> Result<Self> {
        Self::from_source(TaxonomySource::builtin())
    }

    /// Compiles a taxonomy from pattern lists.
    pub fn from_source(source: TaxonomySource) -> Result<Self> {
        if source.primary.is_empty() {
            return Err(ScoutError::config("taxonomy needs at least one primary pattern"));
        }
        Ok(Self {
            primary: TermSet::compile(TermCategory::Primary, source.primary)?,
            booster: TermSet::compile(TermCategory::Booster, source.booster)?,
            generic_work: TermSet::compile(TermCategory::GenericWork, source.generic_work)?,
            disqualifier: TermSet::compile(TermCategory::Disqualifier, source.disqualifier)?,
        })
    }

    /// Parses and compiles a taxonomy from TOML with
    /// `primary`/`booster`/`generic_work`/`disqualifier` arrays.
    pub fn from_toml_str(input: &str) -> Result<Self> {
        let source: TaxonomySource = toml::from_str(input)?;
        Self::from_source(source)
    }

    /// Looks up one category.
    #[must_use]
    pub fn terms(&self, category: TermCategory) -> &TermSet {
        match category {
            TermCategory::Primary => &self.primary,
            TermCategory::Booster => &self.booster,
            TermCategory::GenericWork => &self.generic_work,
            TermCategory::Disqualifier => &self.disqualifier,
        }
    }

    /// Primary terms.
    #[must_use]
    pub fn primary(&self) -> &TermSet {
        &self.primary
    }

    /// Booster terms.
    #[must_use]
    pub fn booster(&self) -> &TermSet {
        &self.booster
    }

    /// Generic-work terms.
    #[must_use]
    pub fn generic_work(&self) -> &TermSet {
        &self.generic_work
    }

    /// Disqualifier terms.
    #[must_use]
    pub fn disqualifier(&self) -> &TermSet {
        &self.disqualifier
    }
}
