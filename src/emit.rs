//! Generation pipeline: schema in, a deterministic list of source units out.
//!
//! Unit order is fixed by schema order, so two runs over the same inputs
//! produce byte-identical output. Every named rule owns exactly one unit;
//! tokens and operators never do (operators share the `operators/` family
//! units instead).

use crate::classify::Classifier;
use crate::codegen::Codegen;
use crate::config::GenConfig;
use crate::error::GenError;
use crate::operators::{compile_operator_unit, compile_operators_manifest};
use crate::records::compile_record;
use crate::rootnode::compile_root;
use crate::schema::NodeDef;
use crate::variants::compile_variant_set;

/// One generated source file, path relative to the output root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unit {
    pub path: String,
    pub source: String,
}

pub fn generate(schema: &[NodeDef], config: &GenConfig) -> Result<Vec<Unit>, GenError> {
    let cls = Classifier::new(schema, config);
    let mut units: Vec<Unit> = vec![];

    for def in schema {
        if !def.named {
            continue;
        }
        let mut cg = Codegen::new();
        match &def.subtypes {
            Some(subtypes) => {
                compile_variant_set(&mut cg, &cls.type_name(&def.kind), subtypes, &cls)?;
            }
            None => compile_record(&mut cg, def, &cls, config)?,
        }
        units.push(Unit {
            path: format!("autonodes/{}.rs", def.kind),
            source: cg.into_source(),
        });
    }

    let mut cg = Codegen::new();
    compile_root(&mut cg, schema, &cls);
    units.push(Unit {
        path: "autonodes/any.rs".to_string(),
        source: cg.into_source(),
    });

    let mut manifest = String::from("pub mod any;\n");
    for def in schema {
        if def.named {
            manifest.push_str(&format!("pub mod {};\n", def.kind));
        }
    }
    units.push(Unit {
        path: "autonodes/mod.rs".to_string(),
        source: manifest,
    });

    for (module, type_name, lexeme) in cls.operators() {
        let mut cg = Codegen::new();
        compile_operator_unit(&mut cg, &type_name, &lexeme);
        units.push(Unit {
            path: format!("operators/{module}.rs"),
            source: cg.into_source(),
        });
    }
    let mut cg = Codegen::new();
    compile_operators_manifest(&mut cg, &cls);
    units.push(Unit {
        path: "operators/mod.rs".to_string(),
        source: cg.into_source(),
    });

    Ok(units)
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::load_schema;

    const SAMPLE: &str = r#"[
        {"type": "program", "named": true,
         "children": {"multiple": true, "required": false,
                      "types": [{"type": "_statement", "named": true}]}},
        {"type": "_statement", "named": true,
         "subtypes": [{"type": "expression_statement", "named": true}]},
        {"type": "expression_statement", "named": true},
        {"type": "comment", "named": true},
        {"type": "+", "named": false},
        {"type": "!=", "named": false},
        {"type": "<>", "named": false},
        {"type": ";", "named": false}
    ]"#;

    fn units() -> Vec<Unit> {
        let schema = load_schema(SAMPLE).unwrap();
        generate(&schema, &GenConfig::default()).unwrap()
    }

    #[test]
    fn generation_is_byte_identical_across_runs() {
        assert_eq!(units(), units());
    }

    #[test]
    fn every_named_rule_owns_exactly_one_unit() {
        let units = units();
        let paths: Vec<&str> = units.iter().map(|u| u.path.as_str()).collect();
        assert!(paths.contains(&"autonodes/program.rs"));
        assert!(paths.contains(&"autonodes/_statement.rs"));
        assert!(paths.contains(&"autonodes/expression_statement.rs"));
        assert!(paths.contains(&"autonodes/comment.rs"));
        // tokens and operators never get an autonodes unit
        assert!(!paths.iter().any(|p| p.contains("autonodes/+")));
        assert!(!paths.iter().any(|p| p.contains("autonodes/;")));
        let mut sorted = paths.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), paths.len());
    }

    #[test]
    fn manifest_opens_with_the_root_union_then_schema_order() {
        let units = units();
        let manifest = &units.iter().find(|u| u.path == "autonodes/mod.rs").unwrap().source;
        let expected = "pub mod any;\n\
                        pub mod program;\n\
                        pub mod _statement;\n\
                        pub mod expression_statement;\n\
                        pub mod comment;\n";
        assert_eq!(manifest, expected);
    }

    #[test]
    fn supertype_units_are_variant_sets() {
        let units = units();
        let hidden = &units.iter().find(|u| u.path == "autonodes/_statement.rs").unwrap().source;
        assert!(hidden.contains("pub enum _StatementNode {"));
        assert!(hidden.contains("    ExpressionStatement(Box<ExpressionStatementNode>),"));
        assert!(hidden.contains("    Extra(ExtraChild),"));
    }

    #[test]
    fn aliased_operators_share_one_unit() {
        let units = units();
        let ops: Vec<&str> = units
            .iter()
            .map(|u| u.path.as_str())
            .filter(|p| p.starts_with("operators/"))
            .collect();
        assert_eq!(ops, vec!["operators/add.rs", "operators/not_equal.rs", "operators/mod.rs"]);
        let not_equal = &units.iter().find(|u| u.path == "operators/not_equal.rs").unwrap().source;
        // canonical spelling is the first occurrence in schema order
        assert!(not_equal.contains("        \"!=\""));
        assert!(!not_equal.contains("<>"));
    }
}
