//! Fuzzy branch resolution
//!
//! Scores free-text terms against branch names and descriptions. A term either
//! resolves to one branch, is reported as ambiguous with its best candidates,
//! or matches nothing. Ambiguity is never resolved by guessing.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{Branch, DomainError};

pub const EXACT_MATCH: u32 = 100;
pub const PREFIX_MATCH: u32 = 80;
pub const CONTAINS_MATCH: u32 = 60;
pub const REVERSE_CONTAINS_MATCH: u32 = 40;
pub const DESCRIPTION_MATCH: u32 = 20;
pub const WORD_MATCH: u32 = 10;

/// Score that maps to a normalized confidence of 1.0.
const FULL_CONFIDENCE_SCORE: f64 = 100.0;

pub const DEFAULT_THRESHOLD: f64 = 0.7;
pub const DEFAULT_MAX_CANDIDATES: usize = 5;

/// How a term that clears the threshold against several branches is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchPolicy {
    /// Every term picks its own top candidate; ties go to registry order.
    #[default]
    Independent,
    /// A term whose top score is shared by another branch is ambiguous.
    Unique,
}

impl FromStr for MatchPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "independent" => Ok(MatchPolicy::Independent),
            "unique" => Ok(MatchPolicy::Unique),
            other => Err(format!(
                "invalid match policy '{other}' (expected independent or unique)"
            )),
        }
    }
}

impl fmt::Display for MatchPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchPolicy::Independent => f.write_str("independent"),
            MatchPolicy::Unique => f.write_str("unique"),
        }
    }
}

/// A branch with its score for one term.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredBranch {
    pub branch: Branch,
    pub score: u32,
}

/// A term that matched without enough confidence.
#[derive(Debug, Clone, PartialEq)]
pub struct AmbiguousTerm {
    pub term: String,
    pub candidates: Vec<ScoredBranch>,
}

/// Outcome of resolving a list of terms.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FuzzyResolution {
    /// Resolved branches, deduplicated, in first-resolved order
    pub matches: Vec<Branch>,
    pub ambiguous: Vec<AmbiguousTerm>,
    pub unmatched: Vec<String>,
}

impl FuzzyResolution {
    pub fn is_clean(&self) -> bool {
        self.ambiguous.is_empty() && self.unmatched.is_empty()
    }
}

/// Score one term against one branch.
///
/// Name rules are exclusive (only the strongest applies); description and
/// word bonuses add on top.
pub fn score(term: &str, branch: &Branch) -> u32 {
    let term = term.trim().to_lowercase();
    let name = branch.name.to_lowercase();
    if term.is_empty() {
        return 0;
    }

    let mut score = if name == term {
        EXACT_MATCH
    } else if name.starts_with(&term) {
        PREFIX_MATCH
    } else if name.contains(&term) {
        CONTAINS_MATCH
    } else if !name.is_empty() && term.contains(&name) {
        REVERSE_CONTAINS_MATCH
    } else {
        0
    };

    if let Some(description) = &branch.description {
        if description.to_lowercase().contains(&term) {
            score += DESCRIPTION_MATCH;
        }
    }

    let name_words: Vec<&str> = name.split_whitespace().collect();
    for term_word in term.split_whitespace() {
        if name_words
            .iter()
            .any(|w| w.contains(term_word) || term_word.contains(w))
        {
            score += WORD_MATCH;
        }
    }

    score
}

/// Resolver over a fixed candidate list.
#[derive(Debug, Clone, Copy)]
pub struct FuzzyResolver {
    threshold: f64,
    max_candidates: usize,
    policy: MatchPolicy,
}

impl Default for FuzzyResolver {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            max_candidates: DEFAULT_MAX_CANDIDATES,
            policy: MatchPolicy::default(),
        }
    }
}

impl FuzzyResolver {
    pub fn new(threshold: f64) -> Result<Self, DomainError> {
        if !(threshold > 0.0 && threshold <= 1.0) {
            return Err(DomainError::InvalidThreshold(threshold));
        }
        Ok(Self {
            threshold,
            ..Self::default()
        })
    }

    pub fn with_policy(mut self, policy: MatchPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_max_candidates(mut self, max_candidates: usize) -> Self {
        self.max_candidates = max_candidates.max(1);
        self
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn policy(&self) -> MatchPolicy {
        self.policy
    }

    /// All candidates for one term, best first. Ties keep registry order.
    pub fn rank(&self, term: &str, branches: &[Branch]) -> Vec<ScoredBranch> {
        let mut scored: Vec<ScoredBranch> = branches
            .iter()
            .map(|branch| ScoredBranch {
                branch: branch.clone(),
                score: score(term, branch),
            })
            .collect();
        scored.sort_by(|a, b| b.score.cmp(&a.score));
        scored
    }

    /// Resolve every term against `branches`.
    pub fn resolve<S: AsRef<str>>(&self, terms: &[S], branches: &[Branch]) -> FuzzyResolution {
        let mut resolution = FuzzyResolution::default();
        let mut seen = HashSet::new();

        for term in terms {
            let term = term.as_ref();
            let ranked = self.rank(term, branches);
            let top_score = ranked.first().map(|s| s.score).unwrap_or(0);
            let confidence = f64::from(top_score) / FULL_CONFIDENCE_SCORE;

            if top_score == 0 {
                debug!("resolve: term={:?} matched nothing", term);
                resolution.unmatched.push(term.to_string());
                continue;
            }

            let tied_at_top = ranked.iter().filter(|s| s.score == top_score).count() > 1;
            let confident = confidence >= self.threshold
                && !(self.policy == MatchPolicy::Unique && tied_at_top);

            if confident {
                let best = &ranked[0].branch;
                debug!(
                    "resolve: term={:?} -> {} (score={})",
                    term, best.name, top_score
                );
                if seen.insert(best.id.clone()) {
                    resolution.matches.push(best.clone());
                }
            } else {
                debug!(
                    "resolve: term={:?} ambiguous (top score={})",
                    term, top_score
                );
                resolution.ambiguous.push(AmbiguousTerm {
                    term: term.to_string(),
                    candidates: ranked
                        .into_iter()
                        .filter(|s| s.score > 0)
                        .take(self.max_candidates)
                        .collect(),
                });
            }
        }

        resolution
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_exact_name_when_scoring_then_case_is_ignored() {
        let branch = Branch::new("1", "Landing Page");
        assert_eq!(score("landing page", &branch), EXACT_MATCH + 2 * WORD_MATCH);
    }

    #[test]
    fn given_empty_term_when_scoring_then_zero() {
        assert_eq!(score("   ", &Branch::new("1", "Landing Page")), 0);
    }

    #[test]
    fn given_invalid_threshold_when_creating_resolver_then_error() {
        assert!(FuzzyResolver::new(0.0).is_err());
        assert!(FuzzyResolver::new(1.5).is_err());
        assert!(FuzzyResolver::new(f64::NAN).is_err());
        assert!(FuzzyResolver::new(1.0).is_ok());
    }
}
