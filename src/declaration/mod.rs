//! Declaration source preprocessing: everything that happens to a `.d.ts`
//! file before the extractor sees it.

pub mod enums;
pub mod overloads;
pub mod transform;

pub use enums::extract_enum_names;
pub use transform::{Retarget, TransformOptions};

use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

/// Comments and single-line string literals.
static RE_NON_CODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s:/\*.*?\*/)|//[^\n]*|"(?:[^"\\\n]|\\.)*"|'(?:[^'\\\n]|\\.)*'"#).unwrap()
});

/// Full preprocessing pass: line rewrites, then overload disambiguation.
pub fn preprocess(source: &str, options: &TransformOptions) -> String {
    let transformed = transform::transform(source, options);
    overloads::disambiguate_string_literal_overloads(&transformed)
}

/// Replace comments and string literals with a space, leaving only code.
pub fn blank_non_code(source: &str) -> String {
    RE_NON_CODE.replace_all(source, " ").into_owned()
}

/// Whether a path looks like a TypeScript declaration source.
pub fn is_declaration_file(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some("ts")
}
