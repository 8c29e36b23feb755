use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;

use autocomplete_term::Term;
use thiserror::Error;
use tracing::{info, warn};

use crate::index::{AutocompleteError, TermIndex};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read terms: {0}")]
    Io(#[from] std::io::Error),
    #[error("line {line}: {reason}")]
    Malformed { line: usize, reason: String },
    #[error(transparent)]
    Build(#[from] AutocompleteError),
}

impl TermIndex {
    /// Load a `weight<TAB>word` terms file and build a shared index from it.
    pub fn build_from_file<P: AsRef<Path>>(path: P) -> Result<Arc<Self>, LoadError> {
        let path_ref = path.as_ref();
        let file = File::open(path_ref)?;
        let terms = parse_terms(BufReader::new(file))?;
        info!("read {} terms from {}", terms.len(), path_ref.display());
        Ok(Arc::new(Self::from_terms(terms)?))
    }
}

/// Parse terms, one `weight<TAB>word` pair per line.
///
/// Blank lines and `#` comments are skipped. A first line holding nothing but
/// an integer is read as a term-count header.
pub fn parse_terms<R: BufRead>(reader: R) -> Result<Vec<Term>, LoadError> {
    let mut terms = Vec::new();
    let mut declared: Option<usize> = None;
    let mut first = true;

    for (idx, line) in reader.lines().enumerate() {
        let raw = line?;
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        if std::mem::take(&mut first)
            && !trimmed.contains('\t')
            && let Ok(count) = trimmed.parse::<usize>()
        {
            declared = Some(count);
            continue;
        }
        terms.push(parse_line(&raw, idx + 1)?);
    }

    if let Some(count) = declared
        && count != terms.len()
    {
        warn!("header declares {count} terms but {} were read", terms.len());
    }
    Ok(terms)
}

fn parse_line(line: &str, line_no: usize) -> Result<Term, LoadError> {
    let malformed = |reason: String| LoadError::Malformed {
        line: line_no,
        reason,
    };
    let (weight, word) = line
        .split_once('\t')
        .ok_or_else(|| malformed("expected `weight<TAB>word`".to_string()))?;
    let weight: f64 = weight
        .trim()
        .parse()
        .map_err(|_| malformed(format!("invalid weight {:?}", weight.trim())))?;
    let word = word.trim();
    if word.is_empty() {
        return Err(malformed("missing word".to_string()));
    }
    Ok(Term::new(word, weight))
}
