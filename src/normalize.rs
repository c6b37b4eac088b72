//! Entity document normalization.
//!
//! Extractor documents are one header comment line (`### YamlMime:TSType`)
//! followed by a YAML body. The header is carried over verbatim; the body is
//! round-tripped through [`serde_yaml::Value`] so key order and fields this
//! crate doesn't model survive untouched, and validated into an
//! [`EntityRecord`] on the way.

use crate::error::ParseError;
use crate::model::{EntityKind, EntityRecord};
use regex::Regex;
use serde_yaml::{Mapping, Value};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::LazyLock;

/// Heading that starts the examples section of `remarks`.
pub const EXAMPLES_HEADING: &str = "#### Examples";

/// Opening sentence of the synthesized type-alias paragraph.
pub const ALIAS_LINKS_INTRO: &str =
    "Learn more about the types in this type alias through the following links.";

/// Member collections that may carry their own `uid` and `remarks`.
const MEMBER_COLLECTIONS: &[&str] = &["fields", "properties", "methods"];

/// Words after `=` that are never linked.
const NON_LINKED_TYPES: &[&str] = &[
    "any", "unknown", "never", "void", "null", "undefined", "string", "number", "boolean",
    "bigint", "symbol", "object", "true", "false", "keyof", "typeof", "readonly", "infer",
    "extends", "in", "is", "Array", "ReadonlyArray", "Promise", "Record", "Partial", "Required",
    "Readonly", "Pick", "Omit", "Exclude", "Extract", "Date", "Object", "Function", "Map", "Set",
];

static RE_STRING_LITERAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""(?:[^"\\]|\\.)*"|'(?:[^'\\]|\\.)*'|`(?:[^`\\]|\\.)*`"#).unwrap()
});

static RE_TYPE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[A-Za-z_$][\w$]*(?:\.[A-Za-z_$][\w$]*)*").unwrap()
});

/// Code samples keyed by entity or member uid.
pub type SnippetStore = BTreeMap<String, Vec<String>>;

/// Settings for [`normalize`].
#[derive(Debug, Clone)]
pub struct NormalizeOptions {
    /// Prefix of synthesized cross-reference links.
    pub link_base: String,
    pub snippets: SnippetStore,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            link_base: "/javascript/api".to_string(),
            snippets: SnippetStore::new(),
        }
    }
}

/// Split a document into its header line, parsed body and validated record.
fn parse_document<'a>(path: &Path, raw: &'a str) -> Result<(&'a str, Value, EntityRecord), ParseError> {
    let (header, body) = raw.split_once('\n').unwrap_or((raw, ""));

    let value: Value = serde_yaml::from_str(body).map_err(|source| ParseError::Yaml {
        path: path.to_path_buf(),
        source,
    })?;
    let record = EntityRecord::from_value(&value).map_err(|message| ParseError::Schema {
        path: path.to_path_buf(),
        message,
    })?;
    Ok((header, value, record))
}

/// Parse an entity document without rewriting it.
pub fn parse_entity(path: &Path, raw: &str) -> Result<EntityRecord, ParseError> {
    parse_document(path, raw).map(|(_, _, record)| record)
}

/// Normalize one entity document. `path` only names the document in errors.
pub fn normalize(path: &Path, raw: &str, options: &NormalizeOptions) -> Result<String, ParseError> {
    let (header, mut value, record) = parse_document(path, raw)?;

    if let Value::Mapping(map) = &mut value {
        inject_snippets(map, &options.snippets);

        if let EntityKind::TypeAlias { syntax } = &record.kind {
            let remarks = map.get("remarks").and_then(Value::as_str).unwrap_or("");
            let links = alias_links(syntax, &record, &options.link_base);
            if let Some(remarks) = insert_alias_links(remarks, &links) {
                tracing::debug!(uid = %record.uid, links = links.len(), "linked type alias");
                map.insert("remarks".into(), Value::String(remarks));
            }
        }
    }

    clean_value(&mut value);

    let body = serde_yaml::to_string(&value).map_err(|source| ParseError::Yaml {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(format!("{}\n{}", header, body))
}

// -- Snippets -----------------------------------------------------------------

fn inject_snippets(map: &mut Mapping, snippets: &SnippetStore) {
    if snippets.is_empty() {
        return;
    }
    inject_into(map, snippets);
    for key in MEMBER_COLLECTIONS {
        if let Some(Value::Sequence(items)) = map.get_mut(*key) {
            for item in items.iter_mut() {
                if let Value::Mapping(member) = item {
                    inject_into(member, snippets);
                }
            }
        }
    }
}

fn inject_into(map: &mut Mapping, snippets: &SnippetStore) {
    let Some(samples) = map
        .get("uid")
        .and_then(Value::as_str)
        .and_then(|uid| snippets.get(uid))
    else {
        return;
    };
    let remarks = map.get("remarks").and_then(Value::as_str).unwrap_or("");
    if let Some(remarks) = append_examples(remarks, samples) {
        map.insert("remarks".into(), Value::String(remarks));
    }
}

/// Append an examples section with one fenced block per sample. `None` when
/// there is nothing to add or `remarks` already has examples.
pub fn append_examples(remarks: &str, samples: &[String]) -> Option<String> {
    if samples.is_empty() || remarks.contains(EXAMPLES_HEADING) {
        return None;
    }
    let mut out = String::new();
    let existing = remarks.trim_end();
    if !existing.is_empty() {
        out.push_str(existing);
        out.push_str("\n\n");
    }
    out.push_str(EXAMPLES_HEADING);
    for sample in samples {
        out.push_str("\n\n```TypeScript\n");
        out.push_str(sample.trim_end());
        out.push_str("\n```");
    }
    Some(out)
}

// -- Type alias links -----------------------------------------------------------

/// Distinct type names on the right-hand side of an alias, in order of
/// appearance.
pub fn alias_type_names(syntax: &str) -> Vec<String> {
    let Some((_, rhs)) = syntax.split_once('=') else {
        return Vec::new();
    };
    let rhs = RE_STRING_LITERAL.replace_all(rhs, " ");

    let mut names: Vec<String> = Vec::new();
    for m in RE_TYPE_NAME.find_iter(&rhs) {
        let token = m.as_str();
        if NON_LINKED_TYPES.contains(&token) || names.iter().any(|n| n == token) {
            continue;
        }
        // Object type keys: `{ kind: string }`, `{ kind?: string }`
        let rest = rhs[m.end()..].trim_start();
        if rest.starts_with(':') || rest.starts_with("?:") {
            continue;
        }
        names.push(token.to_string());
    }
    names
}

/// Markdown links for the alias's constituent types, qualified by the
/// alias's own namespace when unqualified.
fn alias_links(syntax: &str, record: &EntityRecord, link_base: &str) -> Vec<String> {
    let package = record
        .package
        .as_deref()
        .map(|p| p.trim_end_matches('!').to_lowercase())
        .filter(|p| !p.is_empty());
    let base = link_base.trim_end_matches('/');

    alias_type_names(syntax)
        .into_iter()
        .map(|name| {
            let qualified = match record.qualifier() {
                Some(q) if !name.contains('.') => format!("{}.{}", q, name),
                _ => name,
            };
            let target = qualified.to_lowercase();
            match &package {
                Some(pkg) => format!("[{}]({}/{}/{})", qualified, base, pkg, target),
                None => format!("[{}]({}/{})", qualified, base, target),
            }
        })
        .collect()
}

/// Insert the links paragraph before the examples heading, or at the end.
/// `None` when there are no links or the paragraph is already present.
pub fn insert_alias_links(remarks: &str, links: &[String]) -> Option<String> {
    if links.is_empty() || remarks.contains(ALIAS_LINKS_INTRO) {
        return None;
    }
    let paragraph = format!("{}\n\n{}", ALIAS_LINKS_INTRO, links.join(", "));

    let (before, after) = match remarks.find(EXAMPLES_HEADING) {
        Some(i) => remarks.split_at(i),
        None => (remarks, ""),
    };
    let before = before.trim_end();

    let mut out = String::new();
    if !before.is_empty() {
        out.push_str(before);
        out.push_str("\n\n");
    }
    out.push_str(&paragraph);
    if !after.is_empty() {
        out.push_str("\n\n");
        out.push_str(after);
    }
    Some(out)
}

// -- Cleanup --------------------------------------------------------------------

/// Drop empty `example` fields, blank out `\*` description placeholders, and
/// undo the serializer's `\*` escaping everywhere else.
fn clean_value(value: &mut Value) {
    match value {
        Value::Mapping(map) => {
            if map.get("example").is_some_and(is_empty_value) {
                *map = std::mem::take(map)
                    .into_iter()
                    .filter(|(key, _)| key.as_str() != Some("example"))
                    .collect();
            }
            for (key, child) in map.iter_mut() {
                if key.as_str() == Some("description")
                    && child.as_str().is_some_and(|s| s.trim() == "\\*")
                {
                    *child = Value::String(String::new());
                }
                clean_value(child);
            }
        }
        Value::Sequence(items) => items.iter_mut().for_each(clean_value),
        Value::String(s) if s.contains("\\*") => *s = s.replace("\\*", "*"),
        _ => {}
    }
}

fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Sequence(items) => items.is_empty(),
        Value::Mapping(map) => map.is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "### YamlMime:TSType";

    fn run(doc: &str) -> String {
        normalize(Path::new("test.yml"), doc, &NormalizeOptions::default()).unwrap()
    }

    fn body(out: &str) -> Value {
        serde_yaml::from_str(out.split_once('\n').unwrap().1).unwrap()
    }

    #[test]
    fn keeps_header_line() {
        let doc = format!("{}\nname: Excel.Range\nuid: excel!Excel.Range:class\ntype: class\n", HEADER);
        let out = run(&doc);
        assert_eq!(out.lines().next(), Some(HEADER));
    }

    #[test]
    fn type_alias_links() {
        let doc = format!(
            "{}\nname: Excel.Shape\nuid: excel!Excel.Shape:type\npackage: excel!\nremarks: ''\nsyntax: type Shape = Circle | Square\n",
            HEADER
        );
        let remarks = body(&run(&doc))["remarks"].as_str().unwrap().to_string();
        assert!(remarks.starts_with(ALIAS_LINKS_INTRO));
        assert!(remarks.contains("[Excel.Circle](/javascript/api/excel/excel.circle)"));
        assert!(remarks.contains("[Excel.Square](/javascript/api/excel/excel.square)"));
    }

    #[test]
    fn type_alias_links_before_examples() {
        let doc = format!(
            "{}\nname: Excel.Shape\nuid: excel!Excel.Shape:type\npackage: excel!\nremarks: |-\n  Some remarks.\n\n  #### Examples\n\n  ```TypeScript\n  let x = 1;\n  ```\nsyntax: type Shape = Circle | Square\n",
            HEADER
        );
        let remarks = body(&run(&doc))["remarks"].as_str().unwrap().to_string();
        let links = remarks.find(ALIAS_LINKS_INTRO).unwrap();
        let examples = remarks.find(EXAMPLES_HEADING).unwrap();
        assert!(remarks.starts_with("Some remarks.\n\n"));
        assert!(links < examples);
    }

    #[test]
    fn type_alias_linking_is_idempotent() {
        let doc = format!(
            "{}\nname: Excel.Shape\nuid: excel!Excel.Shape:type\npackage: excel!\nsyntax: type Shape = Circle | Square\n",
            HEADER
        );
        let once = run(&doc);
        assert_eq!(run(&once), once);
    }

    #[test]
    fn alias_names_skip_literals_keywords_and_keys() {
        assert_eq!(
            alias_type_names(r#"type A = "Circle" | Excel.Range | string | Array<Shape> | { kind?: Line }"#),
            vec!["Excel.Range", "Shape", "Line"]
        );
        assert_eq!(alias_type_names("type A = B | B | C"), vec!["B", "C"]);
        assert!(alias_type_names("type A").is_empty());
    }

    #[test]
    fn removes_empty_example_and_placeholders() {
        let doc = format!(
            "{}\nname: Excel.Range\nuid: excel!Excel.Range:class\ntype: class\nsummary: Use \\*bold\\* text.\nexample: []\nmethods:\n  - name: getCell(row, column)\n    uid: excel!Excel.Range#getCell:member(1)\n    syntax:\n      parameters:\n        - id: row\n          description: \\*\n      return:\n        type: Excel.Range\n        description: \\*\n",
            HEADER
        );
        let out = run(&doc);
        assert!(!out.contains("example:"));
        assert!(!out.contains("\\*"));
        let value = body(&out);
        assert_eq!(value["summary"].as_str(), Some("Use *bold* text."));
        let syntax = &value["methods"][0]["syntax"];
        assert_eq!(syntax["parameters"][0]["description"].as_str(), Some(""));
        assert_eq!(syntax["return"]["description"].as_str(), Some(""));
    }

    #[test]
    fn keeps_unknown_fields_and_order() {
        let doc = format!(
            "{}\nname: Excel.Range\nuid: excel!Excel.Range:class\nfullName: Excel.Range\ntype: class\nsummary: A range.\n",
            HEADER
        );
        let out = run(&doc);
        let keys: Vec<&str> = out.lines().skip(1).filter_map(|l| l.split(':').next()).collect();
        assert_eq!(keys, vec!["name", "uid", "fullName", "type", "summary"]);
    }

    #[test]
    fn injects_snippets_for_entity_and_members() {
        let mut options = NormalizeOptions::default();
        options.snippets.insert(
            "excel!Excel.Range#getCell:member(1)".to_string(),
            vec!["const cell = range.getCell(0, 0);\n".to_string()],
        );
        let doc = format!(
            "{}\nname: Excel.Range\nuid: excel!Excel.Range:class\ntype: class\nmethods:\n  - name: getCell(row, column)\n    uid: excel!Excel.Range#getCell:member(1)\n    remarks: Zero-based.\n",
            HEADER
        );
        let out = normalize(Path::new("range.yml"), &doc, &options).unwrap();
        let remarks = body(&out)["methods"][0]["remarks"].as_str().unwrap().to_string();
        assert_eq!(
            remarks,
            "Zero-based.\n\n#### Examples\n\n```TypeScript\nconst cell = range.getCell(0, 0);\n```"
        );
    }

    #[test]
    fn malformed_body_names_file() {
        let err = normalize(
            Path::new("broken.yml"),
            &format!("{}\nname: [unclosed\n", HEADER),
            &NormalizeOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ParseError::Yaml { .. }));
        assert!(err.to_string().contains("broken.yml"));
    }

    #[test]
    fn non_entity_body_is_schema_error() {
        let err = normalize(
            Path::new("list.yml"),
            &format!("{}\n- a\n- b\n", HEADER),
            &NormalizeOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ParseError::Schema { .. }));
        assert_eq!(err.path(), Path::new("list.yml"));
    }
}
