//! Serde model of the grammar schema (tree-sitter `node-types.json`).
//!
//! Order matters everywhere: node definitions generate in declaration order,
//! field maps keep insertion order (`IndexMap`), alternative lists stay as
//! written. That plus first-occurrence-wins dedup downstream is what makes
//! the whole pipeline deterministic.

use indexmap::IndexMap;
use serde::Deserialize;

use crate::error::GenError;
use crate::path_de;

/// One grammar production.
#[derive(Debug, Clone, Deserialize)]
pub struct NodeDef {
    /// The grammar's name for this construct; doubles as the runtime kind tag.
    #[serde(rename = "type")]
    pub kind: String,
    pub named: bool,
    #[serde(default)]
    pub fields: IndexMap<String, FieldSpec>,
    #[serde(default)]
    pub children: Option<FieldSpec>,
    /// Present only on supertype rules; alternatives in grammar order.
    #[serde(default)]
    pub subtypes: Option<Vec<TypeRef>>,
}

/// Shared shape for named fields and the positional children slot.
#[derive(Debug, Clone, Deserialize)]
pub struct FieldSpec {
    pub multiple: bool,
    pub required: bool,
    pub types: Vec<TypeRef>,
}

/// Non-owning reference to another production, resolved during generation.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct TypeRef {
    #[serde(rename = "type")]
    pub kind: String,
    pub named: bool,
}

impl NodeDef {
    pub fn has_fields(&self) -> bool {
        !self.fields.is_empty()
    }

    pub fn has_children(&self) -> bool {
        self.children.is_some()
    }

    /// A leaf rule's only value is its literal text.
    pub fn is_leaf(&self) -> bool {
        !self.has_fields() && !self.has_children() && self.subtypes.is_none()
    }
}

impl TypeRef {
    /// Hidden rules (leading underscore) are never matched by literal tag;
    /// they dispatch through an ordered fallback chain instead.
    pub fn is_hidden(&self) -> bool {
        self.kind.starts_with('_')
    }
}

pub fn load_schema(src: &str) -> Result<Vec<NodeDef>, GenError> {
    path_de::from_str_with_path("grammar schema", src)
}

// ------------------------------- Tests ------------------------------------ //
