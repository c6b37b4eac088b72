//! Data model for extractor output and navigation documents.

use serde::{Deserialize, Serialize};
use serde_yaml::Value;

/// One documented API entity, validated from an extractor document.
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub struct EntityRecord {
    pub name: String,
    pub uid: String,
    pub package: Option<String>,
    pub summary: Option<String>,
    pub remarks: Option<String>,
    pub is_preview: bool,
    pub is_deprecated: bool,
    pub kind: EntityKind,
}

/// Per-kind payload. Only interfaces and classes carry properties and
/// methods, only enums carry fields, only type aliases carry syntax.
#[derive(Debug, Clone)]
pub enum EntityKind {
    Namespace,
    Interface {
        properties: Vec<Member>,
        methods: Vec<Member>,
    },
    Class {
        properties: Vec<Member>,
        methods: Vec<Member>,
    },
    Enum {
        fields: Vec<Member>,
    },
    Function,
    TypeAlias {
        syntax: String,
    },
}

/// A field, property or method of an entity.
#[derive(Debug, Clone, Default, Deserialize)]
#[allow(dead_code)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub name: String,
    #[serde(default)]
    pub uid: String,
    pub package: Option<String>,
    pub summary: Option<String>,
    pub remarks: Option<String>,
    #[serde(default)]
    pub is_preview: bool,
    #[serde(default)]
    pub is_deprecated: bool,
    pub syntax: Option<MemberSyntax>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[allow(dead_code)]
pub struct MemberSyntax {
    pub content: Option<String>,
    pub parameters: Option<Vec<Parameter>>,
    #[serde(rename = "return")]
    pub returns: Option<ReturnDescriptor>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[allow(dead_code)]
pub struct Parameter {
    pub id: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub type_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReturnDescriptor {
    #[serde(rename = "type")]
    pub type_name: Option<String>,
    pub description: Option<String>,
}

/// Extractor document shape before kind validation.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEntity {
    name: String,
    uid: String,
    package: Option<String>,
    summary: Option<String>,
    remarks: Option<String>,
    #[serde(default)]
    is_preview: bool,
    #[serde(default)]
    is_deprecated: bool,
    #[serde(rename = "type")]
    declared_type: Option<String>,
    fields: Option<Vec<Member>>,
    properties: Option<Vec<Member>>,
    methods: Option<Vec<Member>>,
    syntax: Option<Value>,
}

impl EntityRecord {
    /// Validate a parsed document body into a record.
    pub fn from_value(value: &Value) -> Result<Self, String> {
        let raw: RawEntity = serde_yaml::from_value(value.clone()).map_err(|e| e.to_string())?;
        let kind = resolve_kind(&raw)?;
        Ok(Self {
            name: raw.name,
            uid: raw.uid,
            package: raw.package,
            summary: raw.summary,
            remarks: raw.remarks,
            is_preview: raw.is_preview,
            is_deprecated: raw.is_deprecated,
            kind,
        })
    }

    pub fn summary(&self) -> &str {
        self.summary.as_deref().unwrap_or("")
    }

    pub fn remarks(&self) -> &str {
        self.remarks.as_deref().unwrap_or("")
    }

    /// Namespace qualifier of the display name: "Excel" for "Excel.Shape".
    pub fn qualifier(&self) -> Option<&str> {
        self.name.rsplit_once('.').map(|(q, _)| q)
    }
}

impl Member {
    pub fn summary(&self) -> &str {
        self.summary.as_deref().unwrap_or("")
    }

    pub fn remarks(&self) -> &str {
        self.remarks.as_deref().unwrap_or("")
    }

    pub fn parameters(&self) -> &[Parameter] {
        self.syntax
            .as_ref()
            .and_then(|s| s.parameters.as_deref())
            .unwrap_or(&[])
    }

    pub fn returns(&self) -> Option<&ReturnDescriptor> {
        self.syntax.as_ref().and_then(|s| s.returns.as_ref())
    }
}

/// Kind tag as written in documents, or as implied by the uid suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KindTag {
    Namespace,
    Interface,
    Class,
    Enum,
    Function,
    TypeAlias,
}

fn parse_kind_tag(tag: &str) -> Option<KindTag> {
    match tag {
        "namespace" | "package" | "module" => Some(KindTag::Namespace),
        "interface" => Some(KindTag::Interface),
        "class" => Some(KindTag::Class),
        "enum" => Some(KindTag::Enum),
        "function" => Some(KindTag::Function),
        "typeAlias" | "typealias" | "type" => Some(KindTag::TypeAlias),
        _ => None,
    }
}

/// Uid suffix after the last colon: `excel!Excel.Shape:type` → `type`.
fn uid_suffix(uid: &str) -> Option<&str> {
    uid.rsplit_once(':').map(|(_, s)| s)
}

fn resolve_kind(raw: &RawEntity) -> Result<EntityKind, String> {
    let from_uid = uid_suffix(&raw.uid).and_then(parse_kind_tag);

    let tag = if from_uid == Some(KindTag::TypeAlias) {
        KindTag::TypeAlias
    } else if let Some(declared) = raw.declared_type.as_deref() {
        parse_kind_tag(declared).ok_or_else(|| format!("unknown entity type: {}", declared))?
    } else if let Some(tag) = from_uid {
        tag
    } else if raw.fields.is_some() {
        KindTag::Enum
    } else if raw.properties.is_some() || raw.methods.is_some() {
        KindTag::Interface
    } else {
        KindTag::Namespace
    };

    let has_fields = raw.fields.is_some();
    let has_members = raw.properties.is_some() || raw.methods.is_some();
    match tag {
        KindTag::Interface | KindTag::Class if has_fields => {
            return Err(format!("{} {} has enum fields", tag_name(tag), raw.name))
        }
        KindTag::Enum if has_members => {
            return Err(format!("enum {} has properties or methods", raw.name))
        }
        KindTag::Namespace | KindTag::Function | KindTag::TypeAlias
            if has_fields || has_members =>
        {
            return Err(format!("{} {} has members", tag_name(tag), raw.name))
        }
        _ => {}
    }

    let properties = || raw.properties.clone().unwrap_or_default();
    let methods = || raw.methods.clone().unwrap_or_default();
    Ok(match tag {
        KindTag::Namespace => EntityKind::Namespace,
        KindTag::Interface => EntityKind::Interface {
            properties: properties(),
            methods: methods(),
        },
        KindTag::Class => EntityKind::Class {
            properties: properties(),
            methods: methods(),
        },
        KindTag::Enum => EntityKind::Enum {
            fields: raw.fields.clone().unwrap_or_default(),
        },
        KindTag::Function => EntityKind::Function,
        KindTag::TypeAlias => EntityKind::TypeAlias {
            syntax: alias_syntax(raw.syntax.as_ref())
                .ok_or_else(|| format!("type alias {} has no syntax", raw.name))?,
        },
    })
}

fn tag_name(tag: KindTag) -> &'static str {
    match tag {
        KindTag::Namespace => "namespace",
        KindTag::Interface => "interface",
        KindTag::Class => "class",
        KindTag::Enum => "enum",
        KindTag::Function => "function",
        KindTag::TypeAlias => "type alias",
    }
}

/// Alias syntax is a plain string, or a mapping with a `content` string.
fn alias_syntax(syntax: Option<&Value>) -> Option<String> {
    match syntax? {
        Value::String(s) => Some(s.clone()),
        Value::Mapping(m) => m
            .get("content")
            .and_then(Value::as_str)
            .map(str::to_string),
        _ => None,
    }
}

/// A navigation (table of contents) entry. Groups have `items`, possibly
/// empty; leaves have none.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NavigationNode {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<NavigationNode>>,
}

impl NavigationNode {
    pub fn group(name: impl Into<String>, items: Vec<NavigationNode>) -> Self {
        Self {
            name: name.into(),
            items: Some(items),
            ..Default::default()
        }
    }

    pub fn children(&self) -> &[NavigationNode] {
        self.items.as_deref().unwrap_or(&[])
    }
}

/// A navigation document: a top-level list of nodes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NavigationDocument {
    pub items: Vec<NavigationNode>,
}
