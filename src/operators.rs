//! Operator units: each classified operator lexeme becomes a tiny record
//! carrying only its source range, plus a borrowed family union over all of
//! them.
//!
//! Aliased lexemes were already collapsed by the classifier, so every unit
//! here answers with the canonical spelling.

use crate::classify::Classifier;
use crate::codegen::Codegen;
use crate::names::rust_str;

/// One `operators/<module>.rs` unit.
pub fn compile_operator_unit(cg: &mut Codegen, type_name: &str, lexeme: &str) {
    cg.declare(type_name);
    cg.push_use("crate::operators::operator::Operator");
    cg.push_use("crate::parser::Range");

    cg.line("#[derive(Debug, Clone)]");
    cg.line(&format!("pub struct {type_name}(pub Range);"));
    cg.blank();

    cg.line(&format!("impl {type_name} {{"));
    cg.line("    pub fn kind(&self) -> &'static str {");
    cg.line(&format!("        {}", rust_str(lexeme)));
    cg.line("    }");
    cg.line("}");
    cg.blank();

    cg.line(&format!("impl Operator for {type_name} {{"));
    cg.line("    fn brief_desc(&self) -> String {");
    cg.line(&format!("        \"{type_name}\".into()"));
    cg.line("    }");
    cg.blank();
    cg.line("    fn range(&self) -> Range {");
    cg.line("        self.0");
    cg.line("    }");
    cg.blank();
    cg.line("    fn operator(&self) -> &'static str {");
    cg.line(&format!("        {}", rust_str(lexeme)));
    cg.line("    }");
    cg.line("}");
    cg.blank();
}

/// The `operators/mod.rs` manifest: module list plus the borrowed family
/// union with delegating views.
pub fn compile_operators_manifest(cg: &mut Codegen, cls: &Classifier) {
    let operators = cls.operators();

    cg.declare("Operators");
    cg.push_use("crate::autonodes::any::AnyNodeRef");
    cg.push_use("crate::operators::operator::Operator");
    cg.push_use("crate::parser::Range");

    cg.line("pub mod operator;");
    for (module, _, _) in &operators {
        cg.line(&format!("pub mod {module};"));
    }
    cg.blank();

    cg.line("#[derive(Debug, Clone)]");
    cg.line("pub enum Operators<'a> {");
    for (module, type_name, _) in &operators {
        let variant = type_name.trim_end_matches("Operator");
        cg.line(&format!("    {variant}(&'a {module}::{type_name}),"));
    }
    cg.line("}");
    cg.blank();

    cg.line("impl<'a> Operators<'a> {");
    delegate(cg, &operators, "pub fn kind(&self) -> &'static str", "op.kind()");
    cg.blank();
    delegate(cg, &operators, "pub fn operator(&self) -> &'static str", "op.operator()");
    cg.blank();
    delegate(cg, &operators, "pub fn brief_desc(&self) -> String", "op.brief_desc()");
    cg.blank();
    delegate(cg, &operators, "pub fn range(&self) -> Range", "op.range()");
    cg.blank();
    cg.line("    pub fn children_any(&self) -> Vec<AnyNodeRef<'a>> {");
    cg.line("        vec![]");
    cg.line("    }");
    cg.line("}");
    cg.blank();
}

fn delegate(cg: &mut Codegen, operators: &[(String, String, String)], signature: &str, body: &str) {
    cg.line(&format!("    {signature} {{"));
    cg.line("        match self {");
    for (_, type_name, _) in operators {
        let variant = type_name.trim_end_matches("Operator");
        cg.line(&format!("            Operators::{variant}(op) => {body},"));
    }
    cg.line("        }");
    cg.line("    }");
}

// ------------------------------- Tests ------------------------------------ //
