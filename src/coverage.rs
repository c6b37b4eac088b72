//! Documentation coverage scoring.
//!
//! Ratings are length/structure heuristics, not a judgement of content:
//!
//! | Rating  | Text                                       |
//! |---------|--------------------------------------------|
//! | Missing | empty                                      |
//! | Poor    | fewer than 10 words                        |
//! | Fine    | 10+ words, one sentence                    |
//! | Good    | 10+ words, two or more sentences           |
//!
//! Methods also rate their return and parameter descriptions; any `Missing`
//! among them makes the whole method `Missing`.

use crate::model::{EntityKind, EntityRecord, Member};
use crate::normalize::EXAMPLES_HEADING;
use std::collections::BTreeMap;
use std::fmt;

const MIN_WORDS: usize = 10;
const MIN_SENTENCES: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DescriptionRating {
    Missing,
    Poor,
    Fine,
    Good,
}

impl DescriptionRating {
    fn score(self) -> usize {
        match self {
            Self::Missing => 0,
            Self::Poor => 1,
            Self::Fine => 2,
            Self::Good => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Missing => "Missing",
            Self::Poor => "Poor",
            Self::Fine => "Fine",
            Self::Good => "Good",
        }
    }
}

impl fmt::Display for DescriptionRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rate a single description string.
pub fn rate_description(text: &str) -> DescriptionRating {
    let text = text.trim();
    if text.is_empty() {
        return DescriptionRating::Missing;
    }
    let words = text.split_whitespace().count();
    let sentences = text.split(". ").count();
    if words < MIN_WORDS {
        DescriptionRating::Poor
    } else if sentences < MIN_SENTENCES {
        DescriptionRating::Fine
    } else {
        DescriptionRating::Good
    }
}

/// Combine ratings: `Missing` if any is missing, otherwise the mean score
/// (exactly 3 → Good, above 2 → Fine, else Poor).
pub fn aggregate(ratings: &[DescriptionRating]) -> DescriptionRating {
    if ratings.is_empty() || ratings.contains(&DescriptionRating::Missing) {
        return DescriptionRating::Missing;
    }
    let total: usize = ratings.iter().map(|r| r.score()).sum();
    let n = ratings.len();
    if total == 3 * n {
        DescriptionRating::Good
    } else if total > 2 * n {
        DescriptionRating::Fine
    } else {
        DescriptionRating::Poor
    }
}

/// Rating of one documented item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemberCoverage {
    pub rating: DescriptionRating,
    pub has_example: bool,
}

/// Summary and remarks joined, with remarks cut at the examples heading.
fn documentation_text(summary: &str, remarks: &str) -> (String, bool) {
    let (remarks, has_example) = match remarks.find(EXAMPLES_HEADING) {
        Some(i) => (&remarks[..i], true),
        None => (remarks, false),
    };
    (format!("{} {}", summary, remarks).trim().to_string(), has_example)
}

/// Rate a summary/remarks pair (classes and properties).
pub fn rate_documented(summary: &str, remarks: &str) -> MemberCoverage {
    let (text, has_example) = documentation_text(summary, remarks);
    MemberCoverage {
        rating: rate_description(&text),
        has_example,
    }
}

/// Enum fields: summary only, never an example.
pub fn rate_field(field: &Member) -> MemberCoverage {
    MemberCoverage {
        rating: rate_description(field.summary()),
        has_example: false,
    }
}

pub fn rate_property(property: &Member) -> MemberCoverage {
    rate_documented(property.summary(), property.remarks())
}

/// Methods: summary/remarks plus the return description (unless the method
/// returns nothing) and every parameter description.
pub fn rate_method(method: &Member) -> MemberCoverage {
    let base = rate_documented(method.summary(), method.remarks());
    let mut ratings = vec![base.rating];

    if let Some(returns) = method.returns().filter(|r| !is_void(r.type_name.as_deref())) {
        ratings.push(rate_description(returns.description.as_deref().unwrap_or("")));
    }
    for param in method.parameters() {
        ratings.push(rate_description(param.description.as_deref().unwrap_or("")));
    }

    MemberCoverage {
        rating: aggregate(&ratings),
        has_example: base.has_example,
    }
}

fn is_void(type_name: Option<&str>) -> bool {
    matches!(
        type_name.map(|t| t.trim().replace(' ', "")).as_deref(),
        Some("void" | "Promise<void>")
    )
}

/// Coverage of one entity and its members.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassCoverage {
    pub name: String,
    pub coverage: MemberCoverage,
    /// Keyed by member name, in first-seen order.
    pub members: Vec<(String, MemberCoverage)>,
}

/// Rate an entity and every field, property and method it carries.
///
/// Every entity kind gets its own row. Namespaces, functions and type aliases
/// carry no members, so theirs is the only one.
pub fn rate_class(entity: &EntityRecord) -> ClassCoverage {
    let mut members: Vec<(String, MemberCoverage)> = Vec::new();

    match &entity.kind {
        EntityKind::Enum { fields } => {
            for field in fields {
                record_member(&mut members, field.name.trim(), rate_field(field));
            }
        }
        EntityKind::Interface {
            properties,
            methods,
        }
        | EntityKind::Class {
            properties,
            methods,
        } => {
            for property in properties {
                record_member(&mut members, property.name.trim(), rate_property(property));
            }
            for method in methods {
                record_member(&mut members, method_key(&method.name), rate_method(method));
            }
        }
        EntityKind::Namespace | EntityKind::Function | EntityKind::TypeAlias { .. } => {}
    }

    ClassCoverage {
        name: entity.name.clone(),
        coverage: rate_documented(entity.summary(), entity.remarks()),
        members,
    }
}

/// Overload-disambiguated method names carry a comma; only the part before
/// it identifies the method.
fn method_key(name: &str) -> &str {
    name.split(',').next().unwrap_or(name).trim()
}

/// Overloads share a key: keep the first position, the lowest rating, and
/// any example.
fn record_member(members: &mut Vec<(String, MemberCoverage)>, key: &str, coverage: MemberCoverage) {
    if let Some((_, existing)) = members.iter_mut().find(|(name, _)| name == key) {
        existing.rating = existing.rating.min(coverage.rating);
        existing.has_example |= coverage.has_example;
        return;
    }
    members.push((key.to_string(), coverage));
}

/// One report row. The class row has an empty `field_name`; member rows have
/// an empty `class_name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverageRow {
    pub class_name: String,
    pub field_name: String,
    pub rating: DescriptionRating,
    pub has_example: bool,
}

impl ClassCoverage {
    /// Class row followed by one row per member.
    pub fn rows(&self) -> Vec<CoverageRow> {
        let mut rows = Vec::with_capacity(self.members.len() + 1);
        rows.push(CoverageRow {
            class_name: self.name.clone(),
            field_name: String::new(),
            rating: self.coverage.rating,
            has_example: self.coverage.has_example,
        });
        rows.extend(self.members.iter().map(|(name, m)| CoverageRow {
            class_name: String::new(),
            field_name: name.clone(),
            rating: m.rating,
            has_example: m.has_example,
        }));
        rows
    }
}

/// Number of rows per rating.
pub fn tally(rows: &[CoverageRow]) -> BTreeMap<DescriptionRating, usize> {
    let mut counts = BTreeMap::new();
    for row in rows {
        *counts.entry(row.rating).or_insert(0) += 1;
    }
    counts
}
