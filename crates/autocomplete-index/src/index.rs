use std::ops::Range;

use autocomplete_term::{PrefixOrder, Term};
use thiserror::Error;
use tracing::{debug, info};

use crate::Autocompletor;
use crate::search::{first_index_of, last_index_of};
use crate::select::{Selection, top_k, top_one};

/// Caller-input errors raised at the edge of each public operation.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AutocompleteError {
    #[error("{0} is required")]
    NullArgument(&'static str),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// Immutable, lexicographically sorted term store with prefix queries.
///
/// Built once, then only read: the terms live in a boxed slice and no method
/// hands out mutable access, so an `Arc<TermIndex>` can be queried from any
/// number of threads.
#[derive(Debug, Clone)]
pub struct TermIndex {
    terms: Box<[Term]>,
}

impl TermIndex {
    /// Build from parallel `words` / `weights` slices.
    pub fn new<S: AsRef<str>>(words: &[S], weights: &[f64]) -> Result<Self, AutocompleteError> {
        if words.len() != weights.len() {
            return Err(AutocompleteError::InvalidArgument(format!(
                "got {} words but {} weights",
                words.len(),
                weights.len()
            )));
        }
        let terms = words
            .iter()
            .zip(weights)
            .map(|(word, weight)| Term::new(word.as_ref(), *weight))
            .collect();
        Self::from_terms(terms)
    }

    pub fn from_terms(mut terms: Vec<Term>) -> Result<Self, AutocompleteError> {
        if let Some(bad) = terms
            .iter()
            .find(|t| t.weight().is_nan() || t.weight() < 0.0)
        {
            return Err(AutocompleteError::InvalidArgument(format!(
                "weight for {:?} must be a non-negative number, got {}",
                bad.word(),
                bad.weight()
            )));
        }
        terms.sort_unstable();
        info!("indexed {} terms", terms.len());
        Ok(Self {
            terms: terms.into_boxed_slice(),
        })
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// All terms in store order.
    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    /// Index range of the terms whose word starts with `prefix`.
    ///
    /// Empty when nothing matches. The empty prefix matches the whole store.
    pub fn match_range(&self, prefix: &str) -> Range<usize> {
        let key = Term::new(prefix, 0.0);
        let order = PrefixOrder::new(prefix.chars().count());
        let first = first_index_of(&self.terms, &key, &order);
        let last = last_index_of(&self.terms, &key, &order);
        match (first, last) {
            (Some(first), Some(last)) => first..last + 1,
            _ => 0..0,
        }
    }

    pub fn matches(&self, prefix: &str) -> &[Term] {
        &self.terms[self.match_range(prefix)]
    }

    pub fn count_matches(&self, prefix: &str) -> usize {
        self.match_range(prefix).len()
    }

    /// Up to `k` matching terms, heaviest first.
    pub fn top_terms(&self, prefix: &str, k: usize) -> Vec<&Term> {
        self.top_terms_with(prefix, k, Selection::Auto)
    }

    pub fn top_terms_with(&self, prefix: &str, k: usize, selection: Selection) -> Vec<&Term> {
        let matches = self.matches(prefix);
        let strategy = selection.resolve(k, matches.len());
        debug!(prefix, k, matched = matches.len(), ?strategy, "top matches");
        top_k(matches, k, strategy)
    }

    /// Words of [`top_terms_with`](Self::top_terms_with).
    pub fn top_matches_with(&self, prefix: &str, k: usize, selection: Selection) -> Vec<&str> {
        self.top_terms_with(prefix, k, selection)
            .into_iter()
            .map(Term::word)
            .collect()
    }

    pub fn top_matches(&self, prefix: &str, k: usize) -> Vec<&str> {
        self.top_matches_with(prefix, k, Selection::Auto)
    }

    pub fn top_term(&self, prefix: &str) -> Option<&Term> {
        top_one(self.matches(prefix))
    }

    /// Heaviest word starting with `prefix`, or `None` if nothing matches.
    pub fn top_match(&self, prefix: &str) -> Option<&str> {
        self.top_term(prefix).map(Term::word)
    }

    /// Weight of `word`, or `0.0` when it is not stored.
    ///
    /// Candidates are located with the case-sensitive prefix order and then
    /// confirmed with a case-insensitive comparison, so only a stored word of
    /// the same case can ever be found: `weight_of("BOY")` misses `"boy"`.
    pub fn weight_of(&self, word: &str) -> f64 {
        self.matches(word)
            .iter()
            .find(|t| t.word_eq_ignore_case(word))
            .map_or(0.0, Term::weight)
    }
}

impl Autocompletor for TermIndex {
    fn top_matches(&self, prefix: &str, k: usize) -> Vec<&str> {
        TermIndex::top_matches(self, prefix, k)
    }

    fn top_match(&self, prefix: &str) -> Option<&str> {
        TermIndex::top_match(self, prefix)
    }

    fn weight_of(&self, word: &str) -> f64 {
        TermIndex::weight_of(self, word)
    }
}

/// Require a prefix that may be missing from loosely typed input.
pub fn parse_prefix(raw: Option<&str>) -> Result<&str, AutocompleteError> {
    raw.ok_or(AutocompleteError::NullArgument("prefix"))
}

/// Convert a signed result count into a `k`, rejecting negatives.
pub fn parse_limit(raw: i64) -> Result<usize, AutocompleteError> {
    usize::try_from(raw)
        .map_err(|_| AutocompleteError::InvalidArgument(format!("k must be >= 0, got {raw}")))
}
