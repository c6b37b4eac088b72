//! Line-level rewrites that make an ambient declaration file digestible by
//! the documentation extractor.
//!
//! Three passes, always in this order:
//!
//! 1. **Retarget**: swap external base-context types for the public client one
//! 2. **Export**: prefix `namespace`/`module`/`class`/`interface`/`function` with `export`
//! 3. **Param tags**: normalize `@param name - description` spacing
//!
//! Retargeting runs first because its replacement text may itself need the
//! later passes. Nothing here can fail: patterns that don't match leave the
//! text as it was.

use regex::{Captures, Regex};
use std::sync::LazyLock;

/// Declaration keyword, optionally behind `declare`/`abstract`, followed by a
/// name. Group 1 is the boundary character (or empty at line start).
static RE_DECLARATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(^|[\s{;])((?:(?:declare|abstract)[ \t]+)*(?:namespace|module|class|interface|function)[ \t]+[A-Za-z_$"'])"#,
    )
    .unwrap()
});

/// Text before a declaration that already exports it.
static RE_EXPORTED_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bexport(?:[ \t]+default)?\s*$").unwrap());

/// `@param name` followed by blanks and an optional dash.
static RE_PARAM_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@param[ \t]+([\w.$]+)[ \t]+(?:-[ \t]*)?").unwrap());

/// One base-type substitution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Retarget {
    pub from: String,
    pub to: String,
}

impl Retarget {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

/// Options for [`transform`].
#[derive(Debug, Clone)]
pub struct TransformOptions {
    pub retargets: Vec<Retarget>,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            retargets: vec![Retarget::new(
                "OfficeCore.RequestContext",
                "OfficeExtension.ClientRequestContext",
            )],
        }
    }
}

/// Apply all three rewrite passes to a declaration source.
pub fn transform(source: &str, options: &TransformOptions) -> String {
    let source = retarget_base_types(source, &options.retargets);
    let source = export_declarations(&source);
    normalize_param_tags(&source)
}

/// Replace every reference to a retargeted type. Whole identifiers only, so
/// `OfficeCore.RequestContextFoo` is left alone.
pub fn retarget_base_types(source: &str, retargets: &[Retarget]) -> String {
    let mut out = source.to_string();
    for retarget in retargets {
        if retarget.from.is_empty() {
            continue;
        }
        let pattern = format!(r"{}\b", regex::escape(&retarget.from));
        match Regex::new(&pattern) {
            Ok(re) => {
                out = re
                    .replace_all(&out, regex::NoExpand(&retarget.to))
                    .into_owned();
            }
            Err(e) => tracing::warn!(from = %retarget.from, "skipping retarget: {}", e),
        }
    }
    out
}

/// Prefix declarations with `export`, skipping comments and anything already
/// exported (`export class`, `export default class`).
pub fn export_declarations(source: &str) -> String {
    map_lines(source, |line| {
        if is_comment_line(line) {
            return line.to_string();
        }
        let (code, comment) = line.split_at(trailing_comment_start(line));
        let code = RE_DECLARATION.replace_all(code, |caps: &Captures| {
            let boundary = &caps[1];
            let decl = &caps[2];
            let decl_start = caps.get(2).map_or(0, |m| m.start());
            if RE_EXPORTED_PREFIX.is_match(&code[..decl_start]) {
                format!("{}{}", boundary, decl)
            } else {
                format!("{}export {}", boundary, decl)
            }
        });
        format!("{}{}", code, comment)
    })
}

/// Byte offset of a `//` or `/*` comment after code on the same line, or the
/// line length.
fn trailing_comment_start(line: &str) -> usize {
    ["//", "/*"]
        .iter()
        .filter_map(|marker| line.find(marker))
        .min()
        .unwrap_or(line.len())
}

/// Rewrite `@param name   text` (and `@param name -text`) to
/// `@param name - text`. Tags already in that shape are unchanged.
pub fn normalize_param_tags(source: &str) -> String {
    RE_PARAM_TAG
        .replace_all(source, "@param $1 - ")
        .into_owned()
}

/// Lines inside or opening a comment. `*/` closers count too.
fn is_comment_line(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.starts_with('*') || trimmed.starts_with("/*") || trimmed.starts_with("//")
}

/// Apply `f` to every line, keeping the original line endings.
fn map_lines(source: &str, f: impl Fn(&str) -> String) -> String {
    let mut out = String::with_capacity(source.len() + source.len() / 8);
    for chunk in source.split_inclusive('\n') {
        let (line, ending) = match chunk.strip_suffix("\r\n") {
            Some(line) => (line, "\r\n"),
            None => match chunk.strip_suffix('\n') {
                Some(line) => (line, "\n"),
                None => (chunk, ""),
            },
        };
        out.push_str(&f(line));
        out.push_str(ending);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(source: &str) -> String {
        transform(source, &TransformOptions::default())
    }

    #[test]
    fn exports_single_line_namespace() {
        assert_eq!(
            run("namespace Foo { function bar(x: number): void }"),
            "export namespace Foo { export function bar(x: number): void }"
        );
    }

    #[test]
    fn exports_declare_and_nested_members() {
        let input = "declare namespace Excel {\n    interface Range {\n        address: string;\n    }\n    class Workbook {\n    }\n}\n";
        let expected = "export declare namespace Excel {\n    export interface Range {\n        address: string;\n    }\n    export class Workbook {\n    }\n}\n";
        assert_eq!(run(input), expected);
    }

    #[test]
    fn does_not_double_export() {
        let input = "export declare namespace Excel {\n    export interface Range {}\n}\n";
        assert_eq!(run(input), input);
    }

    #[test]
    fn leaves_comments_alone() {
        let input = "/**\n * The class that owns this interface object.\n */\n";
        assert_eq!(run(input), input);
    }

    #[test]
    fn does_not_export_default_export_twice() {
        let input = "declare module \"m\" {\n    export default class Foo {}\n}\n";
        let out = run(input);
        assert_eq!(out, "export declare module \"m\" {\n    export default class Foo {}\n}\n");
        assert!(!out.contains("export default export"));
    }

    #[test]
    fn leaves_trailing_comments_alone() {
        let input = "    foo(): void; // this function returns nothing\n    bar(): void; /* a class */\n";
        assert_eq!(run(input), input);
        assert_eq!(
            run("class A {} // interface B\n"),
            "export class A {} // interface B\n"
        );
    }

    #[test]
    fn leaves_property_names_alone() {
        let input = "interface A {\n    class?: string;\n    module: number;\n}\n";
        let expected = "export interface A {\n    class?: string;\n    module: number;\n}\n";
        assert_eq!(run(input), expected);
    }

    #[test]
    fn exports_quoted_module() {
        assert_eq!(
            run("declare module \"office\" {\n}\n"),
            "export declare module \"office\" {\n}\n"
        );
    }

    #[test]
    fn retargets_request_context() {
        let input = "class RequestContext extends OfficeCore.RequestContext {\n}\n";
        let expected =
            "export class RequestContext extends OfficeExtension.ClientRequestContext {\n}\n";
        assert_eq!(run(input), expected);
    }

    #[test]
    fn retarget_matches_whole_identifier() {
        let retargets = vec![Retarget::new("A.B", "C.D")];
        assert_eq!(retarget_base_types("A.B A.Bc", &retargets), "C.D A.Bc");
    }

    #[test]
    fn param_tag_spacing() {
        assert_eq!(
            normalize_param_tags(" * @param address   The address."),
            " * @param address - The address."
        );
        assert_eq!(
            normalize_param_tags(" * @param address -The address."),
            " * @param address - The address."
        );
        assert_eq!(
            normalize_param_tags(" * @param options.key  Key name."),
            " * @param options.key - Key name."
        );
    }

    #[test]
    fn param_tag_already_conforming() {
        let input = " * @param address - The address.";
        assert_eq!(normalize_param_tags(input), input);
    }

    #[test]
    fn param_tag_without_description_untouched() {
        let input = " * @param address\n";
        assert_eq!(normalize_param_tags(input), input);
    }

    #[test]
    fn transform_is_idempotent() {
        let input = "declare namespace Excel {\n    /**\n     * Gets a cell.\n     * @param row  The row.\n     * @param column The column.\n     */\n    function getCell(row: number, column: number): Range;\n    class Ctx extends OfficeCore.RequestContext {}\n}\n";
        let once = run(input);
        assert_eq!(run(&once), once);
    }

    #[test]
    fn preserves_crlf() {
        assert_eq!(
            run("namespace A {\r\n}\r\n"),
            "export namespace A {\r\n}\r\n"
        );
    }
}
