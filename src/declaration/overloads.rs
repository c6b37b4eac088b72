//! String-literal overload disambiguation.
//!
//! Office-style declarations overload methods on string-literal parameter
//! types:
//!
//! ```text
//! /** @param type - Shape kind. */
//! addShape(type?: "Line"): Shape;
//! /** @param type - Shape kind. */
//! addShape(type?: "Geometric"): Shape;
//! ```
//!
//! Extractors key parameter docs by name, so both overloads end up sharing
//! one description. Renaming the parameter (and its `@param` tag) to
//! `typeString` gives each overload its own entry.

use crate::declaration::blank_non_code;
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;
use tracing::warn;

/// Suffix appended to disambiguated parameter names.
pub const SUFFIX: &str = "String";

/// `name?: "literal"...:` up to the first colon after the literal type.
static RE_LITERAL_PARAM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\b([A-Za-z_$][\w$]*)\?:[ \t]*"[^"\n]*"[^:\n]*:"#).unwrap()
});

/// Rename every optional string-literal-typed parameter and the nearest
/// preceding `@param` tag documenting it.
///
/// Parameters already ending in [`SUFFIX`] are skipped, which makes the pass
/// idempotent. That includes parameters whose declared name happens to end
/// in `String` (`formatString?: "A"`): they are left as they are.
///
/// A signature with no documenting tag is still renamed; the missing tag is
/// only logged. So is a nearest tag that sits before another member's
/// declaration: it documents that member and is left alone.
pub fn disambiguate_string_literal_overloads(source: &str) -> String {
    let mut insertions: BTreeSet<usize> = BTreeSet::new();

    for caps in RE_LITERAL_PARAM.captures_iter(source) {
        let (Some(signature), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if name.as_str().ends_with(SUFFIX) {
            continue;
        }

        match find_param_tag(&source[..signature.start()], name.as_str()) {
            Some(at) if !insertions.contains(&at) && crosses_member(&source[at..signature.start()]) => {
                warn!(
                    param = name.as_str(),
                    signature = signature.as_str(),
                    "nearest @param tag documents another member; tag left unchanged"
                );
            }
            Some(at) => {
                if !insertions.insert(at) {
                    warn!(
                        param = name.as_str(),
                        signature = signature.as_str(),
                        "@param tag already claimed by an earlier overload; overloads may be documented back-to-back"
                    );
                }
            }
            None => warn!(
                param = name.as_str(),
                signature = signature.as_str(),
                "no @param tag found for string-literal overload"
            ),
        }
        insertions.insert(name.end());
    }

    insert_at(source, &insertions, SUFFIX)
}

/// Byte offset right after the parameter name of the last `@param <name> `
/// tag in `before`.
fn find_param_tag(before: &str, name: &str) -> Option<usize> {
    let tag = format!("@param {} ", name);
    before
        .rfind(&tag)
        .map(|pos| pos + "@param ".len() + name.len())
}

/// Whether the text between a tag and a signature holds another member's
/// declaration. `between` starts inside the comment carrying the tag.
fn crosses_member(between: &str) -> bool {
    let code = match between.find("*/") {
        Some(end) => &between[end + 2..],
        None => between.split_once('\n').map_or("", |(_, rest)| rest),
    };
    blank_non_code(code).contains(|c: char| matches!(c, ';' | '{' | '}'))
}

/// Insert `text` at each offset, threading a cursor through the source.
fn insert_at(source: &str, offsets: &BTreeSet<usize>, text: &str) -> String {
    let (mut out, cursor) = offsets.iter().fold(
        (String::with_capacity(source.len() + offsets.len() * text.len()), 0),
        |(mut out, cursor), &offset| {
            out.push_str(&source[cursor..offset]);
            out.push_str(text);
            (out, offset)
        },
    );
    out.push_str(&source[cursor..]);
    out
}
