//! Root unions: the by-value `AnyNode` over every named rule and the borrowed
//! `AnyNodeRef` every generic traversal speaks in.
//!
//! `AnyNodeRef` additionally carries the cases that never own a unit of their
//! own: fixed lexemes (`StaticExpr`), operator records, and error nodes.

use crate::classify::Classifier;
use crate::codegen::Codegen;
use crate::schema::NodeDef;

/// The `autonodes/any.rs` unit.
pub fn compile_root(cg: &mut Codegen, schema: &[NodeDef], cls: &Classifier) {
    let named: Vec<&NodeDef> = schema.iter().filter(|d| d.named).collect();

    cg.declare("AnyNode");
    cg.declare("AnyNodeRef");
    cg.push_use("crate::autotree::NodeAccess");
    cg.push_use("crate::autotree::NodeParser");
    cg.push_use("crate::autotree::ParseError");
    cg.push_use("crate::errornode::ErrorNode");
    cg.push_use("crate::operators::Operators");
    cg.push_use("crate::parser::Range");
    cg.push_use("tree_sitter::Node");
    for def in &named {
        cg.push_use(format!(
            "crate::autonodes::{}::{}",
            def.kind,
            cls.type_name(&def.kind)
        ));
    }

    // --- by-value union ------------------------------------------------- //
    cg.line("#[derive(Debug, Clone)]");
    cg.line("pub enum AnyNode {");
    cg.line("    Error(Box<ErrorNode>),");
    for def in &named {
        cg.line(&format!(
            "    {}(Box<{}>),",
            cls.suffixed_type_name(&def.kind, ""),
            cls.type_name(&def.kind)
        ));
    }
    cg.line("}");
    cg.blank();

    cg.line("impl NodeParser for AnyNode {");
    cg.line("    fn parse(node: Node, source: &[u8]) -> Result<Self, ParseError> {");
    cg.line("        Ok(match node.kind() {");
    cg.line("            \"ERROR\" => AnyNode::Error(Box::new(ErrorNode::parse(node, source)?)),");
    for def in &named {
        cg.line(&format!(
            "            \"{}\" => AnyNode::{}(Box::new({}::parse(node, source)?)),",
            def.kind,
            cls.suffixed_type_name(&def.kind, ""),
            cls.type_name(&def.kind)
        ));
    }
    cg.line("            _ => {");
    cg.line("                return Err(ParseError::new(");
    cg.line("                    node.range(),");
    cg.line("                    format!(\"Unknown node kind {}\", node.kind()),");
    cg.line("                ))");
    cg.line("            }");
    cg.line("        })");
    cg.line("    }");
    cg.line("}");
    cg.blank();

    cg.line("impl AnyNode {");
    cg.line("    pub fn kind(&self) -> &'static str {");
    cg.line("        self.as_any().kind()");
    cg.line("    }");
    cg.blank();
    cg.line("    pub fn parse_vec<'a, I>(children: I, source: &[u8]) -> Result<Vec<Box<Self>>, ParseError>");
    cg.line("    where");
    cg.line("        I: Iterator<Item = Node<'a>>,");
    cg.line("    {");
    cg.line("        let mut res: Vec<Box<Self>> = vec![];");
    cg.line("        for child in children {");
    cg.line("            res.push(Box::new(Self::parse(child, source)?));");
    cg.line("        }");
    cg.line("        Ok(res)");
    cg.line("    }");
    cg.line("}");
    cg.blank();

    cg.line("impl NodeAccess for AnyNode {");
    any_node_delegate(cg, &named, cls, "fn brief_desc(&self) -> String", "brief_desc()");
    cg.blank();
    any_node_delegate(cg, &named, cls, "fn as_any(&self) -> AnyNodeRef<'_>", "as_any()");
    cg.blank();
    any_node_delegate(
        cg,
        &named,
        cls,
        "fn children_any(&self) -> Vec<AnyNodeRef<'_>>",
        "children_any()",
    );
    cg.blank();
    any_node_delegate(cg, &named, cls, "fn range(&self) -> Range", "range()");
    cg.line("}");
    cg.blank();

    // --- borrowed union ------------------------------------------------- //
    cg.line("#[derive(Debug, Clone)]");
    cg.line("pub enum AnyNodeRef<'a> {");
    cg.line("    StaticExpr(&'static str, Range),");
    cg.line("    Error(&'a ErrorNode),");
    cg.line("    Operator(Operators<'a>),");
    for def in &named {
        cg.line(&format!(
            "    {}(&'a {}),",
            cls.suffixed_type_name(&def.kind, ""),
            cls.type_name(&def.kind)
        ));
    }
    cg.line("}");
    cg.blank();

    cg.line("impl<'a> AnyNodeRef<'a> {");
    cg.line("    pub fn kind(&self) -> &'static str {");
    cg.line("        match self {");
    cg.line("            AnyNodeRef::StaticExpr(e, _) => e,");
    cg.line("            AnyNodeRef::Error(e) => e.kind(),");
    cg.line("            AnyNodeRef::Operator(op) => op.kind(),");
    for def in &named {
        cg.line(&format!(
            "            AnyNodeRef::{}(n) => n.kind(),",
            cls.suffixed_type_name(&def.kind, "")
        ));
    }
    cg.line("        }");
    cg.line("    }");
    cg.line("}");
    cg.blank();

    cg.line("impl<'a> NodeAccess for AnyNodeRef<'a> {");
    any_ref_delegate(
        cg,
        &named,
        cls,
        "fn brief_desc(&self) -> String",
        ("e, _", "e.to_string()"),
        "brief_desc()",
    );
    cg.blank();
    cg.line("    fn as_any(&self) -> AnyNodeRef<'_> {");
    cg.line("        self.clone()");
    cg.line("    }");
    cg.blank();
    any_ref_delegate(
        cg,
        &named,
        cls,
        "fn children_any(&self) -> Vec<AnyNodeRef<'_>>",
        ("_, _", "vec![]"),
        "children_any()",
    );
    cg.blank();
    any_ref_delegate(cg, &named, cls, "fn range(&self) -> Range", ("_, r", "*r"), "range()");
    cg.line("}");
    cg.blank();
}

fn any_node_delegate(
    cg: &mut Codegen,
    named: &[&NodeDef],
    cls: &Classifier,
    signature: &str,
    call: &str,
) {
    cg.line(&format!("    {signature} {{"));
    cg.line("        match self {");
    cg.line(&format!("            AnyNode::Error(n) => n.{call},"));
    for def in named {
        cg.line(&format!(
            "            AnyNode::{}(n) => n.{call},",
            cls.suffixed_type_name(&def.kind, "")
        ));
    }
    cg.line("        }");
    cg.line("    }");
}

fn any_ref_delegate(
    cg: &mut Codegen,
    named: &[&NodeDef],
    cls: &Classifier,
    signature: &str,
    (static_capture, static_body): (&str, &str),
    call: &str,
) {
    cg.line(&format!("    {signature} {{"));
    cg.line("        match self {");
    cg.line(&format!(
        "            AnyNodeRef::StaticExpr({static_capture}) => {static_body},"
    ));
    cg.line(&format!("            AnyNodeRef::Error(e) => e.{call},"));
    cg.line(&format!("            AnyNodeRef::Operator(op) => op.{call},"));
    for def in named {
        cg.line(&format!(
            "            AnyNodeRef::{}(n) => n.{call},",
            cls.suffixed_type_name(&def.kind, "")
        ));
    }
    cg.line("        }");
    cg.line("    }");
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GenConfig;
    use crate::schema::load_schema;

    fn compile(defs_json: &str) -> String {
        let config = GenConfig::default();
        let schema = load_schema(defs_json).unwrap();
        let cls = Classifier::new(&schema, &config);
        let mut cg = Codegen::new();
        compile_root(&mut cg, &schema, &cls);
        cg.into_source()
    }

    const SAMPLE: &str = r#"[
        {"type": "program", "named": true},
        {"type": "comment", "named": true},
        {"type": "case_statement", "named": true},
        {"type": "+", "named": false}
    ]"#;

    #[test]
    fn unnamed_rules_never_get_a_by_value_case() {
        let src = compile(SAMPLE);
        assert!(src.contains("    Program(Box<ProgramNode>),"));
        assert!(src.contains("    CaseStatement(Box<CaseStatementNode>),"));
        assert!(!src.contains("AnyNode::Add"));
    }

    #[test]
    fn dispatch_covers_error_and_every_named_tag() {
        let src = compile(SAMPLE);
        let error = src.find("\"ERROR\" => AnyNode::Error").unwrap();
        let program = src.find("\"program\" => AnyNode::Program").unwrap();
        assert!(error < program);
        assert!(src.contains("\"comment\" => AnyNode::Comment(Box::new(CommentNode::parse(node, source)?)),"));
        assert!(src.contains("format!(\"Unknown node kind {}\", node.kind()),"));
    }

    #[test]
    fn borrowed_union_carries_the_unitless_cases() {
        let src = compile(SAMPLE);
        assert!(src.contains("    StaticExpr(&'static str, Range),"));
        assert!(src.contains("    Error(&'a ErrorNode),"));
        assert!(src.contains("    Operator(Operators<'a>),"));
        assert!(src.contains("    Program(&'a ProgramNode),"));
    }

    #[test]
    fn borrowed_union_answers_without_reparsing() {
        let src = compile(SAMPLE);
        assert!(src.contains("            AnyNodeRef::StaticExpr(e, _) => e,"));
        assert!(src.contains("            AnyNodeRef::StaticExpr(_, r) => *r,"));
        assert!(src.contains("            AnyNodeRef::StaticExpr(_, _) => vec![],"));
        assert!(src.contains("        self.clone()"));
    }

    #[test]
    fn by_value_union_delegates_child_enumeration() {
        let src = compile(SAMPLE);
        assert!(src.contains("            AnyNode::Program(n) => n.children_any(),"));
        assert!(src.contains("            AnyNode::Error(n) => n.children_any(),"));
        assert!(src.contains("        self.as_any().kind()"));
    }

    #[test]
    fn imports_skip_the_unit_under_construction() {
        let src = compile(SAMPLE);
        assert!(src.contains("use crate::autonodes::case_statement::CaseStatementNode;"));
        assert!(!src.contains("use crate::autonodes::any::"));
    }
}
