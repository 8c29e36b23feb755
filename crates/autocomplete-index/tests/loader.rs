use std::io::Write;

use autocomplete_index::{LoadError, TermIndex};
use tempfile::NamedTempFile;

fn write_terms(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp file");
    file.write_all(contents.as_bytes()).expect("write terms");
    file
}

#[test]
fn builds_index_from_terms_file() {
    let file = write_terms("4\n3\tair\n2\tbat\n4\tbell\n1\tboy\n");
    let index = TermIndex::build_from_file(file.path()).expect("build index");
    assert_eq!(index.len(), 4);
    assert_eq!(index.top_matches("b", 2), vec!["bell", "bat"]);
    assert_eq!(index.weight_of("air"), 3.0);
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = TermIndex::build_from_file(dir.path().join("absent.txt")).unwrap_err();
    assert!(matches!(err, LoadError::Io(_)));
}

#[test]
fn negative_weight_fails_build() {
    let file = write_terms("1\tok\n-2\tbad\n");
    let err = TermIndex::build_from_file(file.path()).unwrap_err();
    assert!(matches!(err, LoadError::Build(_)));
    assert!(err.to_string().contains("non-negative"));
}

#[test]
fn malformed_line_reports_position() {
    let file = write_terms("# header comment\n1\tok\nno tab here\n");
    let err = TermIndex::build_from_file(file.path()).unwrap_err();
    assert!(matches!(err, LoadError::Malformed { line: 3, .. }));
}
