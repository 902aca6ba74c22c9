//! Identifier derivation: pure string mapping from grammar rule names and
//! lexemes to legal Rust identifiers.
//!
//! Everything here is total and deterministic; the override tables in
//! `config` are consulted by the classifier, not by these primitives.

/// `case_statement` → `CaseStatement`; a leading underscore survives as a
/// literal prefix so hidden rules stay visually distinct (`_ExpressionNode`).
pub fn camel_case(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + 1);
    if raw.starts_with('_') {
        out.push('_');
    }
    let mut upper_next = true;
    for ch in raw.chars() {
        if ch == '_' {
            upper_next = true;
        } else if upper_next {
            out.extend(ch.to_uppercase());
            upper_next = false;
        } else {
            out.push(ch);
        }
    }
    out
}

/// `LeftShiftAssign` → `left_shift_assign`. Used for operator module names.
pub fn snake_case(camel: &str) -> String {
    let mut out = String::with_capacity(camel.len() + 4);
    for ch in camel.chars() {
        if ch.is_ascii_uppercase() {
            if !out.is_empty() {
                out.push('_');
            }
            out.extend(ch.to_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

/// Quote a lexeme as a Rust string literal, switching to a raw literal when
/// plain quoting would need escapes.
pub fn rust_str(value: &str) -> String {
    if value.contains('"') || value.contains('\\') {
        format!("r#\"{value}\"#")
    } else {
        format!("\"{value}\"")
    }
}

const RESERVED: &[&str] = &[
    "as", "else", "enum", "fn", "impl", "match", "mod", "ref", "static", "struct", "trait",
    "type", "use",
];

/// Field names colliding with a reserved identifier get a trailing marker:
/// `type` → `type_`.
pub fn field_ident(name: &str) -> String {
    if RESERVED.contains(&name) {
        format!("{name}_")
    } else {
        name.to_string()
    }
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camel_case_basic() {
        assert_eq!(camel_case("case_statement"), "CaseStatement");
        assert_eq!(camel_case("name"), "Name");
        assert_eq!(camel_case("if"), "If");
    }

    #[test]
    fn camel_case_preserves_hidden_prefix() {
        assert_eq!(camel_case("_expression"), "_Expression");
        assert_eq!(camel_case("_primary_expression"), "_PrimaryExpression");
    }

    #[test]
    fn camel_case_is_injective_over_a_real_rule_set() {
        let rules = [
            "program",
            "class_declaration",
            "method_declaration",
            "_expression",
            "expression_statement",
            "binary_expression",
            "unary_op_expression",
            "case_statement",
            "switch_block",
        ];
        let mut seen = std::collections::HashSet::new();
        for rule in rules {
            assert!(seen.insert(camel_case(rule)), "collision on {rule}");
        }
    }

    #[test]
    fn snake_case_round_trips_operator_names() {
        assert_eq!(snake_case("Add"), "add");
        assert_eq!(snake_case("LeftShiftAssign"), "left_shift_assign");
        assert_eq!(snake_case("NullCoalesce"), "null_coalesce");
    }

    #[test]
    fn rust_str_switches_to_raw_literals() {
        assert_eq!(rust_str("+"), "\"+\"");
        assert_eq!(rust_str("\""), "r#\"\"\"#");
        assert_eq!(rust_str("\\"), "r#\"\\\"#");
    }

    #[test]
    fn reserved_field_names_get_a_marker() {
        assert_eq!(field_ident("type"), "type_");
        assert_eq!(field_ident("static"), "static_");
        assert_eq!(field_ident("value"), "value");
    }
}
