//! Generation config: the lexeme override tables, the token-record
//! exception list, and the kinds that receive the write-once analyzer slot.
//!
//! The built-in defaults describe the PHP grammar this tool was grown on;
//! a `--config` JSON document can replace any table wholesale.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use serde::Deserialize;

use crate::error::GenError;
use crate::path_de;

#[derive(Debug, Clone, Deserialize)]
pub struct GenConfig {
    /// Operator lexeme → derived operator name. Membership here is what
    /// turns an unnamed rule into an Operator instead of a plain token.
    #[serde(default = "default_operators")]
    pub operators: IndexMap<String, String>,

    /// Lexeme → enum-variant identifier. Superset of `operators`; covers
    /// punctuation that is not an operator but still needs a legal name.
    #[serde(default = "default_lexeme_names")]
    pub lexeme_names: IndexMap<String, String>,

    /// Unnamed rules that must still be modeled as Records (bare literal
    /// forms that share a name with a named rule).
    #[serde(default = "default_token_exceptions")]
    pub token_exceptions: Vec<String>,

    /// Node kinds that declare the lazily-initialized, write-once state
    /// slot, mapped to the consumer-crate path of the slot's type.
    #[serde(default = "default_state_types")]
    pub state_types: IndexMap<String, String>,
}

impl Default for GenConfig {
    fn default() -> Self {
        GenConfig {
            operators: default_operators(),
            lexeme_names: default_lexeme_names(),
            token_exceptions: default_token_exceptions(),
            state_types: default_state_types(),
        }
    }
}

impl GenConfig {
    pub fn load(src: &str) -> Result<Self, GenError> {
        path_de::from_str_with_path("generation config", src)
    }
}

fn pairs(raw: &[(&str, &str)]) -> IndexMap<String, String> {
    raw.iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

const OPERATOR_TABLE: &[(&str, &str)] = &[
    // Compound assignments
    ("%=", "ModAssign"),
    ("&=", "AndAssign"),
    ("**=", "PowAssign"),
    ("*=", "MultAssign"),
    ("+=", "AddAssign"),
    ("-=", "SubAssign"),
    (".=", "ConcatAssign"),
    ("/=", "DivAssign"),
    ("<<=", "LeftShiftAssign"),
    (">>=", "RightShiftAssign"),
    ("??=", "NullsafeAssign"),
    ("^=", "XorAssign"),
    ("|=", "OrAssign"),
    // Binary operators
    ("!=", "NotEqual"),
    ("!==", "NotIdentical"),
    ("%", "Mod"),
    ("&", "BinaryAnd"),
    ("&&", "BooleanAnd"),
    ("*", "Mult"),
    ("+", "Add"),
    ("-", "Sub"),
    (".", "Concat"),
    ("/", "Div"),
    ("<", "LessThan"),
    ("<<", "LeftShift"),
    ("<=", "LessThanOrEqual"),
    ("<=>", "Spaceship"),
    ("<>", "NotEqual"),
    ("==", "Equal"),
    ("===", "Identical"),
    (">", "GreaterThan"),
    (">=", "GreaterThanOrEqual"),
    (">>", "RightShift"),
    ("^", "BinaryXor"),
    ("and", "LogicalAnd"),
    ("instanceof", "Instanceof"),
    ("or", "LogicalOr"),
    ("xor", "LogicalXor"),
    ("|", "BinaryOr"),
    ("||", "BooleanOr"),
    ("**", "Exponential"),
    ("++", "Increment"),
    ("--", "Decrement"),
    ("??", "NullCoalesce"),
    // Unary operators
    ("!", "Not"),
    ("@", "Squelch"),
    ("~", "BinaryNot"),
    // Delimiters that still need operator treatment
    ("{", "OpenBrace"),
    ("}", "CloseBrace"),
];

static OPERATORS: Lazy<IndexMap<String, String>> = Lazy::new(|| pairs(OPERATOR_TABLE));

static LEXEME_NAMES: Lazy<IndexMap<String, String>> = Lazy::new(|| {
    let mut map = pairs(OPERATOR_TABLE);
    map.insert(",".into(), "Comma".into());
    map.insert("\"".into(), "DoubleQuote".into());
    map
});

fn default_operators() -> IndexMap<String, String> {
    OPERATORS.clone()
}

fn default_lexeme_names() -> IndexMap<String, String> {
    LEXEME_NAMES.clone()
}

fn default_token_exceptions() -> Vec<String> {
    vec!["null".into(), "string".into(), "float".into()]
}

fn default_state_types() -> IndexMap<String, String> {
    pairs(&[
        (
            "class_declaration",
            "crate::nodeanalysis::class_declaration::ClassDeclarationState",
        ),
        (
            "method_declaration",
            "crate::nodeanalysis::method_declaration::MethodDeclarationState",
        ),
    ])
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lexeme_names_subsume_operators() {
        let cfg = GenConfig::default();
        for (lexeme, name) in &cfg.operators {
            assert_eq!(cfg.lexeme_names.get(lexeme), Some(name));
        }
        assert_eq!(cfg.lexeme_names.get(","), Some(&"Comma".to_string()));
        assert!(cfg.operators.get(",").is_none());
    }

    #[test]
    fn alias_lexemes_share_one_name() {
        let cfg = GenConfig::default();
        assert_eq!(cfg.operators["!="], "NotEqual");
        assert_eq!(cfg.operators["<>"], "NotEqual");
    }

    #[test]
    fn partial_config_falls_back_to_defaults() {
        let cfg = GenConfig::load(r#"{"state_types": {}}"#).unwrap();
        assert!(cfg.state_types.is_empty());
        assert_eq!(cfg.operators["+"], "Add");
        assert_eq!(cfg.token_exceptions, ["null", "string", "float"]);
    }
}
