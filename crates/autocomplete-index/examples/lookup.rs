use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use autocomplete_index::{TermIndex, parse_limit};

const USAGE: &str =
    "usage: cargo run -p autocomplete-index --example lookup -- <terms-file> <prefix> [k]";

fn main() -> Result<()> {
    let mut args = env::args().skip(1);
    let path = args.next().map(PathBuf::from).context(USAGE)?;
    let prefix = args.next().context(USAGE)?;
    let k = match args.next() {
        Some(raw) => {
            let signed: i64 = raw
                .parse()
                .with_context(|| format!("k must be an integer, got {raw:?}"))?;
            parse_limit(signed)?
        }
        None => 10,
    };
    if args.next().is_some() {
        bail!("too many arguments");
    }

    let index = TermIndex::build_from_file(&path)
        .with_context(|| format!("loading terms from {}", path.display()))?;

    println!("Terms: {} ({} indexed)", path.display(), index.len());
    println!("Prefix {:?}: {} matches", prefix, index.count_matches(&prefix));
    for term in index.top_terms(&prefix, k) {
        println!("  {:>14}  {}", term.weight(), term.word());
    }
    match index.top_match(&prefix) {
        Some(word) => println!("Top match: {word} (weight {})", index.weight_of(word)),
        None => println!("Top match: none"),
    }

    Ok(())
}
