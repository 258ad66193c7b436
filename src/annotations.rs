//! Annotation extraction from Clarity test contracts.
//!
//! Test functions are tagged with comment lines directly above their
//! declaration:
//!
//! ```text
//! ;; @name Transfers tokens
//! ;; @caller wallet_1
//! ;; @mine-blocks-before 3
//! (define-public (test-transfer)
//!   ...)
//! ```
//!
//! Extraction is a two-pass scan. The first pass pairs every public
//! declaration with the contiguous comment run above it; the second pass
//! tokenizes each line of that run into a key and an optional value. Lines
//! that are not annotations are ignored, so free-text comments may be mixed
//! in with the tags.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Serialize, Serializer};

// =============================================================================
// CORE TYPES
// =============================================================================

/// The value recorded for one annotation key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnnotationValue {
    /// The tag was present without a payload (`;; @no-prepare`).
    Flag,
    /// The tag carried a payload, trimmed (`;; @caller wallet_1`).
    Value(String),
}

impl AnnotationValue {
    /// Returns the payload, if any.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AnnotationValue::Flag => None,
            AnnotationValue::Value(v) => Some(v),
        }
    }
}

impl Serialize for AnnotationValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            AnnotationValue::Flag => serializer.serialize_bool(true),
            AnnotationValue::Value(v) => serializer.serialize_str(v),
        }
    }
}

/// Recognized annotation keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Annotation {
    /// Display label appended to the test name.
    Name,
    /// Identity selector for the test call.
    Caller,
    /// Setup function invoked before the test call.
    Prepare,
    /// Suppresses the module's default prepare function.
    NoPrepare,
    /// Number of blocks to mine before the test block.
    MineBlocksBefore,
    /// Output toggle; only `events` is meaningful.
    Print,
}

impl Annotation {
    pub const ALL: [Annotation; 6] = [
        Annotation::Name,
        Annotation::Caller,
        Annotation::Prepare,
        Annotation::NoPrepare,
        Annotation::MineBlocksBefore,
        Annotation::Print,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Annotation::Name => "name",
            Annotation::Caller => "caller",
            Annotation::Prepare => "prepare",
            Annotation::NoPrepare => "no-prepare",
            Annotation::MineBlocksBefore => "mine-blocks-before",
            Annotation::Print => "print",
        }
    }

    pub fn from_key(key: &str) -> Option<Annotation> {
        Self::ALL.into_iter().find(|a| a.as_str() == key)
    }
}

impl AsRef<str> for Annotation {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl std::fmt::Display for Annotation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Annotations of a single function, keyed by tag name.
///
/// Keys are unique; inserting an existing key replaces its value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AnnotationMap(BTreeMap<String, AnnotationValue>);

/// Annotations scoped to one candidate test function.
pub type FunctionAnnotations = AnnotationMap;

impl AnnotationMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: impl AsRef<str>) -> Option<&AnnotationValue> {
        self.0.get(key.as_ref())
    }

    /// Returns the payload of `key`, or `None` when absent or a bare flag.
    pub fn value(&self, key: impl AsRef<str>) -> Option<&str> {
        self.get(key).and_then(AnnotationValue::as_str)
    }

    pub fn contains(&self, key: impl AsRef<str>) -> bool {
        self.0.contains_key(key.as_ref())
    }

    pub fn insert(&mut self, key: impl Into<String>, value: AnnotationValue) {
        self.0.insert(key.into(), value);
    }

    pub fn remove(&mut self, key: impl AsRef<str>) -> Option<AnnotationValue> {
        self.0.remove(key.as_ref())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AnnotationValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl FromIterator<(String, AnnotationValue)> for AnnotationMap {
    fn from_iter<I: IntoIterator<Item = (String, AnnotationValue)>>(iter: I) -> Self {
        let mut map = AnnotationMap::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

// =============================================================================
// LINE PATTERNS
// =============================================================================

/// A single annotation line: `;; @key` or `;; @key value`.
static ANNOTATION_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[ \t]*;;[ \t]+@([a-z-]+)(?:[ \t]+(.*))?$").expect("annotation pattern is valid")
});

const COMMENT_MARKER: &str = ";;";
const PUBLIC_DECLARATION: &str = "(define-public";

// =============================================================================
// PUBLIC API
// =============================================================================

/// Extracts the annotation block of every public function in `source`.
///
/// Functions without an annotation block have no entry; callers treat a
/// missing entry as an empty [`AnnotationMap`].
pub fn extract_test_annotations(source: &str) -> BTreeMap<String, AnnotationMap> {
    let normalized = source.replace('\r', "");
    let lines: Vec<&str> = normalized.split('\n').collect();

    find_annotated_declarations(&lines)
        .into_iter()
        .map(|(name, run)| (name.to_string(), parse_comment_run(run)))
        .collect()
}

/// Tokenizes one comment line into an annotation key and value.
///
/// A payload that is empty after trimming is recorded as a flag.
pub fn parse_annotation_line(line: &str) -> Option<(String, AnnotationValue)> {
    let captures = ANNOTATION_LINE.captures(line)?;
    let key = captures.get(1)?.as_str().to_string();
    let value = match captures.get(2).map(|m| m.as_str().trim()) {
        Some(v) if !v.is_empty() => AnnotationValue::Value(v.to_string()),
        _ => AnnotationValue::Flag,
    };
    Some((key, value))
}

/// Returns the function name declared on a `(define-public (...` line.
///
/// The name runs from the signature's opening parenthesis to the first
/// whitespace, `|` or `)`.
pub fn declared_function_name(line: &str) -> Option<&str> {
    let rest = line.trim_start().strip_prefix(PUBLIC_DECLARATION)?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    signature_name(rest.trim_start())
}

/// Name at the start of a signature, `(name ...`.
fn signature_name(signature: &str) -> Option<&str> {
    let signature = signature.strip_prefix('(')?;
    let end = signature
        .find(|c: char| c.is_whitespace() || c == '|' || c == ')')
        .unwrap_or(signature.len());
    let name = &signature[..end];
    (!name.is_empty()).then_some(name)
}

// =============================================================================
// INTERNAL - Pass one: declaration / comment-run pairing
// =============================================================================

/// Pairs each public declaration with the annotation run directly above it.
fn find_annotated_declarations<'l, 'a>(lines: &'l [&'a str]) -> Vec<(&'a str, &'l [&'a str])> {
    let mut found = Vec::new();
    for index in 0..lines.len() {
        let Some(name) = declaration_at(lines, index) else {
            continue;
        };
        let Some(start) = annotation_run_start(lines, index) else {
            continue;
        };
        found.push((name, &lines[start..index]));
    }
    found
}

/// Name of the public function declared at `lines[index]`.
///
/// The signature may start on a later line when `(define-public` ends its
/// own line; only blank lines may sit in between.
fn declaration_at<'a>(lines: &[&'a str], index: usize) -> Option<&'a str> {
    let line = lines[index];
    if let Some(name) = declared_function_name(line) {
        return Some(name);
    }
    let rest = line.trim_start().strip_prefix(PUBLIC_DECLARATION)?;
    if !rest.trim().is_empty() {
        return None;
    }
    let signature = lines[index + 1..]
        .iter()
        .copied()
        .find(|l| !l.trim().is_empty())?;
    signature_name(signature.trim_start())
}

/// Walks backward from a declaration over contiguous comment lines and
/// returns the index of the first line that opens an annotation run.
fn annotation_run_start(lines: &[&str], declaration: usize) -> Option<usize> {
    let mut first_comment = declaration;
    while first_comment > 0 && is_comment_line(lines[first_comment - 1]) {
        first_comment -= 1;
    }
    (first_comment..declaration).find(|&i| opens_annotation_run(lines[i]))
}

fn is_comment_line(line: &str) -> bool {
    line.trim_start().starts_with(COMMENT_MARKER)
}

/// The first line of a run must be `;;`, optional whitespace, then `@`.
fn opens_annotation_run(line: &str) -> bool {
    line.trim_start()
        .strip_prefix(COMMENT_MARKER)
        .is_some_and(|rest| rest.trim_start_matches([' ', '\t']).starts_with('@'))
}

// =============================================================================
// INTERNAL - Pass two: line tokenization
// =============================================================================

fn parse_comment_run(run: &[&str]) -> AnnotationMap {
    run.iter().copied().filter_map(parse_annotation_line).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value(v: &str) -> AnnotationValue {
        AnnotationValue::Value(v.to_string())
    }

    #[test]
    fn test_extracts_key_value_and_flag() {
        let source = ";; @name Transfers tokens\n;; @no-prepare\n(define-public (test-transfer)\n  (ok true))";
        let annotations = extract_test_annotations(source);
        let map = &annotations["test-transfer"];
        assert_eq!(map.get("name"), Some(&value("Transfers tokens")));
        assert_eq!(map.get(Annotation::NoPrepare), Some(&AnnotationValue::Flag));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_value_is_trimmed() {
        let parsed = parse_annotation_line(";;   @caller   wallet_1   ");
        assert_eq!(parsed, Some(("caller".to_string(), value("wallet_1"))));
    }

    #[test]
    fn test_whitespace_only_payload_is_flag() {
        let parsed = parse_annotation_line(";; @prepare   ");
        assert_eq!(parsed, Some(("prepare".to_string(), AnnotationValue::Flag)));
    }

    #[test]
    fn test_non_annotation_lines_are_ignored() {
        let source = ";; @name Mint\n;; mints a token for the caller\n;; @print events\n(define-public (test-mint)\n  (ok true))";
        let annotations = extract_test_annotations(source);
        let map = &annotations["test-mint"];
        assert_eq!(map.len(), 2);
        assert_eq!(map.value(Annotation::Print), Some("events"));
    }

    #[test]
    fn test_comment_block_without_tags_has_no_entry() {
        let source = ";; just a description\n(define-public (test-plain)\n  (ok true))";
        assert!(extract_test_annotations(source).is_empty());
    }

    #[test]
    fn test_run_with_only_malformed_tags_yields_empty_map() {
        let source = ";;@Name Upper\n(define-public (test-odd)\n  (ok true))";
        let annotations = extract_test_annotations(source);
        assert!(annotations["test-odd"].is_empty());
    }

    #[test]
    fn test_blank_line_breaks_the_run() {
        let source = ";; @name Detached\n\n(define-public (test-detached)\n  (ok true))";
        assert!(extract_test_annotations(source).is_empty());
    }

    #[test]
    fn test_later_key_overwrites_earlier() {
        let source = ";; @caller wallet_1\n;; @caller wallet_2\n(define-public (test-twice)\n  (ok true))";
        let annotations = extract_test_annotations(source);
        assert_eq!(annotations["test-twice"].value("caller"), Some("wallet_2"));
    }

    #[test]
    fn test_carriage_returns_are_stripped() {
        let source = ";; @name Windows\r\n;; @mine-blocks-before 2\r\n(define-public (test-crlf)\r\n  (ok true))\r\n";
        let annotations = extract_test_annotations(source);
        let map = &annotations["test-crlf"];
        assert_eq!(map.value("name"), Some("Windows"));
        assert_eq!(map.value("mine-blocks-before"), Some("2"));
    }

    #[test]
    fn test_annotations_do_not_leak_between_functions() {
        let source = "\
;; @name First
;; @caller wallet_1
(define-public (test-first)
  (ok true))

;; @name Second
(define-public (test-second)
  (ok true))
";
        let annotations = extract_test_annotations(source);
        assert_eq!(annotations["test-first"].value("caller"), Some("wallet_1"));
        assert!(!annotations["test-second"].contains("caller"));
        assert_eq!(annotations["test-second"].value("name"), Some("Second"));
    }

    #[test]
    fn test_signature_on_following_line_keeps_annotations() {
        let source = ";; @caller wallet_1\n;; @no-prepare\n(define-public\n\n  (test-split)\n  (ok true))\n(define-public (prepare) (ok true))";
        let annotations = extract_test_annotations(source);
        let map = &annotations["test-split"];
        assert_eq!(map.value(Annotation::Caller), Some("wallet_1"));
        assert!(map.contains(Annotation::NoPrepare));
        assert!(!annotations.contains_key("prepare"));
    }

    #[test]
    fn test_declaration_keyword_with_trailing_text_is_not_split() {
        let source = ";; @name Nope\n(define-public ; comment\n  (test-x)\n  (ok true))";
        assert!(extract_test_annotations(source).is_empty());
    }

    #[test]
    fn test_declared_function_name_variants() {
        assert_eq!(declared_function_name("(define-public (test-a)"), Some("test-a"));
        assert_eq!(declared_function_name("  (define-public  (test-b (x uint))"), Some("test-b"));
        assert_eq!(declared_function_name("(define-public\t(test-c|"), Some("test-c"));
        assert_eq!(declared_function_name("(define-read-only (test-d)"), None);
        assert_eq!(declared_function_name("(define-publicity (x)"), None);
    }

    #[test]
    fn test_serializes_flags_as_true() {
        let mut map = AnnotationMap::new();
        map.insert("no-prepare", AnnotationValue::Flag);
        map.insert("name", value("x"));
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"name":"x","no-prepare":true}"#);
    }
}
