//! Enum name extraction.
//!
//! A resilient scan, not a parse: it runs on sources before and after
//! the declaration transform and must not care about anything around the
//! `enum` keyword.

use crate::declaration::blank_non_code;
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

// Optional modifiers in any order (`export declare const enum Foo`), after a
// line start, blank, brace or semicolon.
static RE_ENUM_DECL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)(?:^|[\s{;])(?:(?:export|declare|const)[ \t]+)*enum[ \t]+([A-Za-z_$][\w$]*)")
        .unwrap()
});

/// Collect the names of every enum declared in `source`, at any nesting depth.
/// Comments and string literals are ignored.
///
/// Returns an empty set when nothing matches. Never fails.
pub fn extract_enum_names(source: &str) -> BTreeSet<String> {
    let code = blank_non_code(source);
    RE_ENUM_DECL
        .captures_iter(&code)
        .map(|caps| caps[1].to_string())
        .collect()
}
