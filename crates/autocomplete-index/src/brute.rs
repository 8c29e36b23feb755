use autocomplete_term::Term;

use crate::Autocompletor;
use crate::index::AutocompleteError;

/// Linear-scan autocompleter over terms in word order.
///
/// Every query touches all `n` terms. Kept as the reference answer
/// [`TermIndex`](crate::TermIndex) is checked against.
#[derive(Debug, Clone)]
pub struct BruteAutocomplete {
    terms: Vec<Term>,
}

impl BruteAutocomplete {
    pub fn new<S: AsRef<str>>(words: &[S], weights: &[f64]) -> Result<Self, AutocompleteError> {
        if words.len() != weights.len() {
            return Err(AutocompleteError::InvalidArgument(format!(
                "got {} words but {} weights",
                words.len(),
                weights.len()
            )));
        }
        let mut terms: Vec<Term> = words
            .iter()
            .zip(weights)
            .map(|(word, weight)| Term::new(word.as_ref(), *weight))
            .collect();
        terms.sort_unstable();
        Ok(Self { terms })
    }

    fn matching<'a>(&'a self, prefix: &str) -> impl Iterator<Item = &'a Term> {
        self.terms.iter().filter(move |t| t.word().starts_with(prefix))
    }
}

impl Autocompletor for BruteAutocomplete {
    fn top_matches(&self, prefix: &str, k: usize) -> Vec<&str> {
        let mut found: Vec<&Term> = self.matching(prefix).collect();
        found.sort_by(|a, b| b.weight().total_cmp(&a.weight()));
        found.into_iter().take(k).map(Term::word).collect()
    }

    fn top_match(&self, prefix: &str) -> Option<&str> {
        self.matching(prefix)
            .fold(None, |best: Option<&Term>, t| match best {
                Some(b) if b.weight() >= t.weight() => Some(b),
                _ => Some(t),
            })
            .map(Term::word)
    }

    fn weight_of(&self, word: &str) -> f64 {
        self.terms
            .iter()
            .find(|t| t.word() == word)
            .map_or(0.0, Term::weight)
    }
}
