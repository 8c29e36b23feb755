//! Prefix autocomplete over a sorted array of weighted terms.
//!
//! [`TermIndex`] sorts its terms once at construction and never changes
//! afterwards. Each query binary-searches for the contiguous run of words
//! sharing the prefix ([`first_index_of`] / [`last_index_of`] under
//! [`PrefixOrder`](autocomplete_term::PrefixOrder)), then ranks that run by
//! weight.
//!
//! ```rust
//! use autocomplete_index::TermIndex;
//!
//! let index = TermIndex::new(&["air", "bat", "bell", "boy"], &[3.0, 2.0, 4.0, 1.0])?;
//! assert_eq!(index.top_matches("b", 2), vec!["bell", "bat"]);
//! assert_eq!(index.top_match("b"), Some("bell"));
//! assert_eq!(index.weight_of("boy"), 1.0);
//! # Ok::<(), autocomplete_index::AutocompleteError>(())
//! ```
//!
//! For a runnable demo, see
//! `cargo run -p autocomplete-index --example lookup -- <terms-file> <prefix> [k]`.

pub mod brute;
pub mod index;
pub mod load;
pub mod search;
pub mod select;

pub use autocomplete_term::{
    LexicalOrder, PrefixOrder, ReverseWeightOrder, Term, TermOrder, WeightOrder,
};
pub use brute::BruteAutocomplete;
pub use index::{AutocompleteError, TermIndex, parse_limit, parse_prefix};
pub use load::{LoadError, parse_terms};
pub use search::{first_index_of, last_index_of};
pub use select::Selection;

/// Weighted prefix completion.
pub trait Autocompletor {
    /// Up to `k` words starting with `prefix`, heaviest first.
    fn top_matches(&self, prefix: &str, k: usize) -> Vec<&str>;

    /// The heaviest word starting with `prefix`.
    fn top_match(&self, prefix: &str) -> Option<&str>;

    /// Weight of `word`, `0.0` if absent.
    fn weight_of(&self, word: &str) -> f64;
}
