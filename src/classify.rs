//! Token/operator classification and type-reference resolution.
//!
//! A single pre-pass over the schema decides, once, how every unnamed rule
//! is represented; everything downstream reads the resulting table.

use indexmap::IndexMap;

use crate::config::GenConfig;
use crate::names::{camel_case, snake_case};
use crate::schema::{NodeDef, TypeRef};

/// How an unnamed rule is carried in generated payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
enum TokenRepr {
    /// Fixed lexeme: `&'static str` plus a `Range`.
    Lexeme,
    /// Distinguished operator: its own record, range embedded there.
    Operator { name: String },
}

/// Generation-time classification of a type reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedType {
    Token,
    Operator { type_name: String, module: String },
    Node { type_name: String },
}

impl ResolvedType {
    pub fn is_operator(&self) -> bool {
        matches!(self, ResolvedType::Operator { .. })
    }
}

pub struct Classifier<'a> {
    config: &'a GenConfig,
    token_map: IndexMap<String, TokenRepr>,
}

impl<'a> Classifier<'a> {
    /// Build the read-only classification table. Unnamed rules become
    /// tokens, except the exception list (bare literal forms that must stay
    /// Records); tokens whose lexeme sits in the operator table become
    /// Operators.
    pub fn new(schema: &[NodeDef], config: &'a GenConfig) -> Self {
        let mut token_map = IndexMap::new();
        for def in schema {
            if def.named || config.token_exceptions.iter().any(|t| t == &def.kind) {
                continue;
            }
            let repr = match config.operators.get(&def.kind) {
                Some(name) => TokenRepr::Operator { name: name.clone() },
                None => TokenRepr::Lexeme,
            };
            token_map.insert(def.kind.clone(), repr);
        }
        Classifier { config, token_map }
    }

    /// Enum-variant identifier for a rule: override table hit, else camel case.
    pub fn variant_name(&self, raw: &str) -> String {
        match self.config.lexeme_names.get(raw) {
            Some(name) => name.clone(),
            None => camel_case(raw),
        }
    }

    /// Struct-level type name: `Node` suffix unless the rule is already a
    /// token or operator kind.
    pub fn type_name(&self, raw: &str) -> String {
        match self.token_map.get(raw) {
            Some(TokenRepr::Lexeme) => "&'static str".to_string(),
            Some(TokenRepr::Operator { name }) => format!("{name}Operator"),
            None => camel_case(raw) + "Node",
        }
    }

    /// Synthesized-enum names (`<NodeType><FieldName>`, `<NodeType>Children`,
    /// and the suffix-free any-union case names).
    pub fn suffixed_type_name(&self, raw: &str, suffix: &str) -> String {
        camel_case(raw) + suffix
    }

    pub fn resolve(&self, type_ref: &TypeRef) -> ResolvedType {
        match self.token_map.get(&type_ref.kind) {
            Some(TokenRepr::Lexeme) => ResolvedType::Token,
            Some(TokenRepr::Operator { name }) => ResolvedType::Operator {
                type_name: format!("{name}Operator"),
                module: operator_module(name),
            },
            None => ResolvedType::Node {
                type_name: self.type_name(&type_ref.kind),
            },
        }
    }

    /// True for rules that get no source unit of their own (tokens and
    /// operators are carried inline by whoever references them).
    pub fn is_token(&self, kind: &str) -> bool {
        self.token_map.contains_key(kind)
    }

    /// Every classified operator, in schema order: (module, type name, lexeme).
    /// Alias lexemes collapse to the first occurrence of the derived name.
    pub fn operators(&self) -> Vec<(String, String, String)> {
        let mut seen = IndexMap::new();
        for (lexeme, repr) in &self.token_map {
            if let TokenRepr::Operator { name } = repr {
                seen.entry(name.clone())
                    .or_insert_with(|| (operator_module(name), format!("{name}Operator"), lexeme.clone()));
            }
        }
        seen.into_values().collect()
    }
}

/// Operator unit module name. `Mod` would collide with the `mod` keyword.
pub fn operator_module(name: &str) -> String {
    let module = snake_case(name);
    if module == "mod" {
        "modulus".to_string()
    } else {
        module
    }
}

// ------------------------------- Tests ------------------------------------ //
