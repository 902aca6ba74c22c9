//! Record compiler: one node definition becomes a concrete struct plus its
//! construction routine.
//!
//! Field members claim their concrete children by node id (`skip_nodes`)
//! whenever a children slot also exists, so no child is reachable from both
//! a named field and the slot or extras. The generic child enumeration is
//! rebuilt on every call and sorted by source start offset.

use crate::classify::{Classifier, ResolvedType};
use crate::codegen::Codegen;
use crate::config::GenConfig;
use crate::error::GenError;
use crate::names::{camel_case, field_ident};
use crate::schema::NodeDef;
use crate::variants::compile_variant_set;

pub fn compile_record(
    cg: &mut Codegen,
    def: &NodeDef,
    cls: &Classifier,
    config: &GenConfig,
) -> Result<(), GenError> {
    let node_name = cls.type_name(&def.kind);
    let any_case = cls.suffixed_type_name(&def.kind, "");
    let has_fields = def.has_fields();
    let has_children = def.has_children();
    let child_count = def.fields.len() + usize::from(has_children);

    cg.declare(&node_name);
    cg.push_use("crate::parser::Range");
    cg.push_use("crate::autotree::NodeAccess");
    cg.push_use("crate::autotree::NodeParser");
    cg.push_use("crate::autotree::ParseError");
    cg.push_use("crate::autonodes::any::AnyNodeRef");
    cg.push_use("tree_sitter::Node");
    if has_fields {
        cg.push_use("crate::autotree::ChildNodeParser");
    }
    if child_count > 0 {
        cg.push_use("crate::extra::ExtraChild");
    }

    let mut struct_members: Vec<String> = vec!["    pub range: Range,".into()];
    let mut parse_lets: Vec<String> = vec![];
    let mut init_members: Vec<String> = vec!["            range,".into()];
    let mut child_cast: Vec<String> = vec![];

    // --- named fields -------------------------------------------------- //
    for (field_name, spec) in &def.fields {
        let ident = field_ident(field_name);
        let base = match spec.types.len() {
            0 => {
                return Err(GenError::violation(
                    &def.kind,
                    format!("field `{field_name}` lists no alternatives"),
                ));
            }
            1 => match cls.resolve(&spec.types[0]) {
                ResolvedType::Node { type_name } => {
                    cg.push_use(format!(
                        "crate::autonodes::{}::{}",
                        spec.types[0].kind, type_name
                    ));
                    FieldBase { ty: type_name, enumerable: true }
                }
                _ => {
                    return Err(GenError::violation(
                        &def.kind,
                        format!("field `{field_name}` has a single anonymous alternative"),
                    ));
                }
            },
            _ => {
                let enum_name = cls.suffixed_type_name(&def.kind, &camel_case(field_name));
                let set = compile_variant_set(cg, &enum_name, &spec.types, cls)?;
                FieldBase {
                    ty: format!("Box<{enum_name}>"),
                    // Operator payloads have no generic view; the field stays
                    // out of the child enumeration.
                    enumerable: !set.has_operator,
                }
            }
        };

        let mut ty = base.ty.clone();
        if spec.multiple {
            ty = format!("Vec<{ty}>");
        }
        if !spec.required {
            ty = format!("Option<{ty}>");
        }

        let mark = if has_children {
            ".mark_skipped_node(&mut skip_nodes)"
        } else {
            ""
        };
        parse_lets.push(format!(
            "        let {ident}: {ty} = Result::from(node.parse_child(\"{field_name}\", source){mark}.into())?;"
        ));

        if base.enumerable {
            child_cast.push(match (spec.multiple, spec.required) {
                (true, true) => {
                    format!("        child_vec.extend(self.{ident}.iter().map(|v| v.as_any()));")
                }
                (true, false) => format!(
                    "        if let Some(x) = &self.{ident} {{ child_vec.extend(x.iter().map(|z| z.as_any())); }}"
                ),
                (false, true) => format!("        child_vec.push(self.{ident}.as_any());"),
                (false, false) => {
                    format!("        if let Some(x) = &self.{ident} {{ child_vec.push(x.as_any()); }}")
                }
            });
        }

        struct_members.push(format!("    pub {ident}: {ty},"));
        init_members.push(format!("            {ident},"));
    }

    // --- positional children slot -------------------------------------- //
    if let Some(children) = &def.children {
        let base = match children.types.len() {
            0 => {
                return Err(GenError::violation(
                    &def.kind,
                    "children slot lists no alternatives".to_string(),
                ));
            }
            1 => match cls.resolve(&children.types[0]) {
                ResolvedType::Node { type_name } => {
                    cg.push_use(format!(
                        "crate::autonodes::{}::{}",
                        children.types[0].kind, type_name
                    ));
                    type_name
                }
                _ => {
                    return Err(GenError::violation(
                        &def.kind,
                        "children slot has a single anonymous alternative".to_string(),
                    ));
                }
            },
            _ => {
                let enum_name = cls.suffixed_type_name(&def.kind, "Children");
                compile_variant_set(cg, &enum_name, &children.types, cls)?;
                enum_name
            }
        };

        let skip_filter = if has_fields {
            "\n                    .filter(|node| !skip_nodes.contains(&node.id()))"
        } else {
            ""
        };

        if children.multiple {
            struct_members.push(format!("    pub children: Vec<Box<{base}>>,"));
            init_members.push(format!(
                "            children: {base}::parse_vec(\n                node.named_children(&mut node.walk()){skip_filter}\n                    .filter(|node| node.kind() != \"comment\"),\n                source,\n            )?,"
            ));
            child_cast.push("        child_vec.extend(self.children.iter().map(|n| n.as_any()));".into());
        } else {
            let gather = format!(
                "node.named_children(&mut node.walk()){skip_filter}\n                .filter(|node| node.kind() != \"comment\")\n                .map(|k| {base}::parse(k, source))\n                .collect::<Result<Vec<{base}>, ParseError>>()?\n                .drain(..)\n                .map(|j| Box::new(j))\n                .next()"
            );
            if children.required {
                struct_members.push(format!("    pub child: Box<{base}>,"));
                init_members.push(format!(
                    "            child: {gather}\n                .expect(\"Should be a child\"),"
                ));
                child_cast.push("        child_vec.push(self.child.as_any());".into());
            } else {
                struct_members.push(format!("    pub child: Option<Box<{base}>>,"));
                init_members.push(format!("            child: {gather},"));
                child_cast
                    .push("        if let Some(x) = &self.child { child_vec.push(x.as_any()); }".into());
            }
        }
    }

    // --- extras / leaf raw capture ------------------------------------- //
    if child_count > 0 {
        // Extras never double-report a claimed node: when fields and a
        // children slot coexist, claimed ids are filtered here too.
        let skip_filter = if has_fields && has_children {
            "\n                    .filter(|node| !skip_nodes.contains(&node.id()))"
        } else {
            ""
        };
        struct_members.push("    pub extras: Vec<Box<ExtraChild>>,".into());
        init_members.push(format!(
            "            extras: ExtraChild::parse_vec(\n                node.named_children(&mut node.walk())\n                    .filter(|node| node.kind() == \"comment\"){skip_filter},\n                source,\n            )?,"
        ));
        child_cast.push("        child_vec.extend(self.extras.iter().map(|n| n.as_any()));".into());
    } else {
        cg.push_use("std::ffi::OsStr");
        cg.push_use("std::ffi::OsString");
        cg.push_use("std::os::unix::ffi::OsStrExt");
        struct_members.push("    pub raw: Vec<u8>,".into());
        init_members.push("            raw: source[range.start_byte..range.end_byte].to_vec(),".into());
    }

    let state_type = config.state_types.get(&def.kind);
    if let Some(path) = state_type {
        cg.push_use("std::sync::OnceLock");
        struct_members.push(format!("    pub state: OnceLock<{path}>,"));
        init_members.push("            state: OnceLock::new(),".into());
    }

    // --- struct declaration -------------------------------------------- //
    cg.line("#[derive(Debug, Clone)]");
    cg.line(&format!("pub struct {node_name} {{"));
    for member in &struct_members {
        cg.line(member);
    }
    cg.line("}");
    cg.blank();

    // --- construction --------------------------------------------------- //
    cg.line(&format!("impl NodeParser for {node_name} {{"));
    cg.line("    fn parse(node: Node, source: &[u8]) -> Result<Self, ParseError> {");
    cg.line("        let range: Range = node.range().into();");
    cg.line(&format!("        if node.kind() != \"{}\" {{", def.kind));
    cg.line("            return Err(ParseError::new(");
    cg.line("                range,");
    cg.line(&format!(
        "                format!(\"Node is of the wrong kind [{{}}] vs expected [{}] on pos {{}}:{{}}\", node.kind(), range.start_point.row + 1, range.start_point.column),",
        def.kind
    ));
    cg.line("            ));");
    cg.line("        }");
    if has_fields && has_children {
        cg.line("        let mut skip_nodes: Vec<usize> = vec![];");
    }
    for let_line in &parse_lets {
        cg.line(let_line);
    }
    cg.line("        Ok(Self {");
    for member in &init_members {
        cg.line(member);
    }
    cg.line("        })");
    cg.line("    }");
    cg.line("}");
    cg.blank();

    cg.line(&format!("impl {node_name} {{"));
    cg.line("    pub fn kind(&self) -> &'static str {");
    cg.line(&format!("        \"{}\"", def.kind));
    cg.line("    }");
    if child_count == 0 {
        cg.blank();
        cg.line("    pub fn get_raw(&self) -> OsString {");
        cg.line("        OsStr::from_bytes(&self.raw).to_os_string()");
        cg.line("    }");
    }
    cg.line("}");
    cg.blank();

    // --- generic contract ----------------------------------------------- //
    cg.line(&format!("impl NodeAccess for {node_name} {{"));
    cg.line("    fn brief_desc(&self) -> String {");
    cg.line(&format!("        \"{node_name}\".into()"));
    cg.line("    }");
    cg.blank();
    cg.line("    fn as_any(&self) -> AnyNodeRef<'_> {");
    cg.line(&format!("        AnyNodeRef::{any_case}(self)"));
    cg.line("    }");
    cg.blank();
    cg.line("    fn children_any(&self) -> Vec<AnyNodeRef<'_>> {");
    if child_cast.is_empty() {
        cg.line("        vec![]");
    } else {
        cg.line("        let mut child_vec: Vec<AnyNodeRef<'_>> = vec![];");
        for cast in &child_cast {
            cg.line(cast);
        }
        cg.line("        child_vec.sort_by(|a, b| a.range().start_byte.cmp(&b.range().start_byte));");
        cg.line("        child_vec");
    }
    cg.line("    }");
    cg.blank();
    cg.line("    fn range(&self) -> Range {");
    cg.line("        self.range");
    cg.line("    }");
    cg.line("}");
    cg.blank();

    Ok(())
}

struct FieldBase {
    ty: String,
    enumerable: bool,
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::load_schema;

    fn compile(defs_json: &str, target: &str) -> String {
        let config = GenConfig::default();
        let schema = load_schema(defs_json).unwrap();
        let cls = Classifier::new(&schema, &config);
        let def = schema.iter().find(|d| d.kind == target).unwrap();
        let mut cg = Codegen::new();
        compile_record(&mut cg, def, &cls, &config).unwrap();
        cg.into_source()
    }

    const CASE_STATEMENT: &str = r#"[
        {"type": "case_statement", "named": true,
         "fields": {
            "value": {"multiple": false, "required": true,
                      "types": [{"type": "_expression", "named": true}]}
         },
         "children": {"multiple": true, "required": false,
                      "types": [{"type": "_statement", "named": true}]}}
    ]"#;

    #[test]
    fn fields_claim_children_when_a_slot_exists() {
        let src = compile(CASE_STATEMENT, "case_statement");
        assert!(src.contains("let mut skip_nodes: Vec<usize> = vec![];"));
        assert!(src.contains(
            "let value: _ExpressionNode = Result::from(node.parse_child(\"value\", source).mark_skipped_node(&mut skip_nodes).into())?;"
        ));
        // both the slot and extras exclude claimed ids
        assert_eq!(src.matches(".filter(|node| !skip_nodes.contains(&node.id()))").count(), 2);
    }

    #[test]
    fn children_slot_excludes_comments_and_extras_collect_them() {
        let src = compile(CASE_STATEMENT, "case_statement");
        assert!(src.contains(".filter(|node| node.kind() != \"comment\")"));
        assert!(src.contains(".filter(|node| node.kind() == \"comment\")"));
        assert!(src.contains("pub children: Vec<Box<_StatementNode>>,"));
        assert!(src.contains("pub extras: Vec<Box<ExtraChild>>,"));
    }

    #[test]
    fn generic_children_are_sorted_by_start_offset() {
        let src = compile(CASE_STATEMENT, "case_statement");
        assert!(src.contains("child_vec.push(self.value.as_any());"));
        assert!(src.contains("child_vec.extend(self.children.iter().map(|n| n.as_any()));"));
        assert!(src.contains("child_vec.extend(self.extras.iter().map(|n| n.as_any()));"));
        assert!(src.contains("child_vec.sort_by(|a, b| a.range().start_byte.cmp(&b.range().start_byte));"));
    }

    #[test]
    fn optional_and_multiple_wrappers_compose() {
        let src = compile(
            r#"[
                {"type": "formal_parameters", "named": true,
                 "fields": {
                    "params": {"multiple": true, "required": false,
                               "types": [{"type": "simple_parameter", "named": true}]}
                 }}
            ]"#,
            "formal_parameters",
        );
        assert!(src.contains("pub params: Option<Vec<SimpleParameterNode>>,"));
        assert!(src.contains("if let Some(x) = &self.params { child_vec.extend(x.iter().map(|z| z.as_any())); }"));
        // no children slot, so no claim marking
        assert!(!src.contains("mark_skipped_node"));
    }

    #[test]
    fn heterogeneous_field_routes_through_a_variant_set() {
        let src = compile(
            r#"[
                {"type": "assignment_expression", "named": true,
                 "fields": {
                    "left": {"multiple": false, "required": true,
                             "types": [{"type": "variable_name", "named": true},
                                       {"type": "subscript_expression", "named": true}]}
                 }}
            ]"#,
            "assignment_expression",
        );
        assert!(src.contains("pub enum AssignmentExpressionLeft {"));
        assert!(src.contains("pub left: Box<AssignmentExpressionLeft>,"));
        assert!(src.contains("child_vec.push(self.left.as_any());"));
    }

    #[test]
    fn operator_bearing_field_is_not_enumerated() {
        let src = compile(
            r#"[
                {"type": "+", "named": false},
                {"type": "-", "named": false},
                {"type": "binary_expression", "named": true,
                 "fields": {
                    "operator": {"multiple": false, "required": true,
                                 "types": [{"type": "+", "named": false},
                                           {"type": "-", "named": false}]},
                    "left": {"multiple": false, "required": true,
                             "types": [{"type": "_expression", "named": true}]}
                 }}
            ]"#,
            "binary_expression",
        );
        assert!(src.contains("pub enum BinaryExpressionOperator {"));
        assert!(src.contains("pub operator: Box<BinaryExpressionOperator>,"));
        assert!(!src.contains("self.operator.as_any()"));
        assert!(src.contains("child_vec.push(self.left.as_any());"));
    }

    #[test]
    fn required_singular_slot_is_a_generator_precondition() {
        let src = compile(
            r#"[
                {"type": "parenthesized_expression", "named": true,
                 "children": {"multiple": false, "required": true,
                              "types": [{"type": "_expression", "named": true}]}}
            ]"#,
            "parenthesized_expression",
        );
        assert!(src.contains("pub child: Box<_ExpressionNode>,"));
        assert!(src.contains(".expect(\"Should be a child\")"));
    }

    #[test]
    fn leaf_rules_capture_their_raw_text() {
        let src = compile(r#"[{"type": "variable_name", "named": true}]"#, "variable_name");
        assert!(src.contains("pub raw: Vec<u8>,"));
        assert!(src.contains("raw: source[range.start_byte..range.end_byte].to_vec(),"));
        assert!(src.contains("pub fn get_raw(&self) -> OsString {"));
        assert!(src.contains("vec![]"));
        assert!(!src.contains("pub extras"));
    }

    #[test]
    fn reserved_slot_kinds_get_a_write_once_cell() {
        let src = compile(
            r#"[
                {"type": "class_declaration", "named": true,
                 "fields": {
                    "name": {"multiple": false, "required": true,
                             "types": [{"type": "name", "named": true}]}
                 }}
            ]"#,
            "class_declaration",
        );
        assert!(src.contains("pub state: OnceLock<crate::nodeanalysis::class_declaration::ClassDeclarationState>,"));
        assert!(src.contains("state: OnceLock::new(),"));
        assert!(src.contains("use std::sync::OnceLock;"));
    }

    #[test]
    fn construction_rejects_misrouted_dispatch() {
        let src = compile(r#"[{"type": "variable_name", "named": true}]"#, "variable_name");
        assert!(src.contains("if node.kind() != \"variable_name\" {"));
        assert!(src.contains("Node is of the wrong kind"));
    }

    #[test]
    fn reserved_field_names_are_rewritten() {
        let src = compile(
            r#"[
                {"type": "cast_expression", "named": true,
                 "fields": {
                    "type": {"multiple": false, "required": true,
                             "types": [{"type": "cast_type", "named": true}]}
                 }}
            ]"#,
            "cast_expression",
        );
        assert!(src.contains("pub type_: CastTypeNode,"));
        assert!(src.contains("let type_: CastTypeNode = Result::from(node.parse_child(\"type\", source).into())?;"));
    }
}
