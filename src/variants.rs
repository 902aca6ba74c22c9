//! Variant-set compiler: a set of grammar alternatives becomes a tagged
//! union plus its construction dispatch.
//!
//! Dedup is first-occurrence-wins by derived variant name. Every set carries
//! a non-deduplicated `Extra(ExtraChild)` case for out-of-band children.
//! Hidden alternatives (leading underscore) are never matched by literal tag;
//! they form an ordered fallback chain tried only after every literal match
//! fails, each via its own optional construction.

use indexmap::{IndexMap, IndexSet};

use crate::classify::{Classifier, ResolvedType};
use crate::codegen::Codegen;
use crate::error::GenError;
use crate::names::rust_str;
use crate::schema::TypeRef;

/// What the surrounding record compiler needs to know about a set it
/// synthesized.
#[derive(Debug)]
pub struct CompiledVariantSet {
    /// Operator alternatives suppress the generic accessors and the
    /// `NodeAccess` impl; the owner must not enumerate such a field.
    pub has_operator: bool,
}

struct Case {
    raw: String,
    variant: String,
    resolved: ResolvedType,
    hidden: bool,
}

pub fn compile_variant_set(
    cg: &mut Codegen,
    name: &str,
    alternatives: &[TypeRef],
    cls: &Classifier,
) -> Result<CompiledVariantSet, GenError> {
    let mut cases: IndexMap<String, Case> = IndexMap::new();
    for alt in alternatives {
        let variant = cls.variant_name(&alt.kind);
        if cases.contains_key(&variant) {
            // Aliased lexemes collapse; the second occurrence is dropped.
            continue;
        }
        if !variant
            .chars()
            .next()
            .map(|c| c.is_ascii_alphabetic() || c == '_')
            .unwrap_or(false)
        {
            return Err(GenError::violation(
                name,
                format!("lexeme `{}` has no identifier mapping in the override table", alt.kind),
            ));
        }
        let resolved = cls.resolve(alt);
        let hidden = alt.is_hidden();
        if hidden && !matches!(resolved, ResolvedType::Node { .. }) {
            return Err(GenError::violation(
                name,
                format!("hidden alternative `{}` does not resolve to a node type", alt.kind),
            ));
        }
        cases.insert(
            variant.clone(),
            Case { raw: alt.kind.clone(), variant, resolved, hidden },
        );
    }

    let has_operator = cases.values().any(|c| c.resolved.is_operator());
    let has_token = cases.values().any(|c| matches!(c.resolved, ResolvedType::Token));

    cg.declare(name);
    cg.push_use("crate::autotree::NodeParser");
    cg.push_use("crate::autotree::ParseError");
    cg.push_use("crate::extra::ExtraChild");
    cg.push_use("crate::autonodes::comment::CommentNode");
    cg.push_use("crate::errornode::ErrorNode");
    cg.push_use("crate::parser::Range");
    cg.push_use("tree_sitter::Node");
    for case in cases.values() {
        match &case.resolved {
            ResolvedType::Node { type_name } => {
                cg.push_use(format!("crate::autonodes::{}::{}", case.raw, type_name));
            }
            ResolvedType::Operator { type_name, module } => {
                cg.push_use(format!("crate::operators::{module}::{type_name}"));
            }
            ResolvedType::Token => {}
        }
    }
    if !has_operator {
        cg.push_use("crate::autotree::NodeAccess");
        cg.push_use("crate::autonodes::any::AnyNodeRef");
        cg.push_use("crate::analysis::state::AnalysisState");
        cg.push_use("crate::issue::IssueEmitter");
        cg.push_use("crate::types::union::UnionType");
        cg.push_use("crate::value::ConstValue");
        if has_token {
            cg.push_use("crate::types::union::DiscreteType");
            cg.push_use("std::ffi::OsStr");
        }
    }

    // --- declaration -------------------------------------------------- //
    cg.line("#[derive(Debug, Clone)]");
    cg.line(&format!("pub enum {name} {{"));
    for case in cases.values() {
        let payload = match &case.resolved {
            ResolvedType::Token => "&'static str, Range".to_string(),
            ResolvedType::Operator { type_name, .. } => type_name.clone(),
            ResolvedType::Node { type_name } => format!("Box<{type_name}>"),
        };
        cg.line(&format!("    {}({payload}),", case.variant));
    }
    cg.line("    Extra(ExtraChild),");
    cg.line("}");
    cg.blank();

    // --- construction dispatch ----------------------------------------- //
    // One arm per literal tag: aliased lexemes share an enum case, but every
    // spelling keeps its own dispatch arm and its own text in the payload.
    let mut seen_tags: IndexSet<&str> = IndexSet::new();
    let mut literal_arms: Vec<String> = vec![];
    for alt in alternatives {
        if alt.is_hidden() || !seen_tags.insert(alt.kind.as_str()) {
            continue;
        }
        let variant = cls.variant_name(&alt.kind);
        let construct = match cls.resolve(alt) {
            ResolvedType::Token => {
                format!("{variant}({}, node.range().into())", rust_str(&alt.kind))
            }
            ResolvedType::Operator { type_name, .. } => {
                format!("{variant}({type_name}(node.range().into()))")
            }
            ResolvedType::Node { type_name } => {
                format!("{variant}(Box::new({type_name}::parse(node, source)?))")
            }
        };
        literal_arms.push(format!(
            "            {} => {name}::{construct},",
            rust_str(&alt.kind)
        ));
    }

    // Each hidden alternative is tried through its own optional construction
    // and re-wrapped into this enum on success, in schema order.
    let hidden_attempts: Vec<String> = cases
        .values()
        .filter(|c| c.hidden)
        .map(|case| {
            let ResolvedType::Node { type_name } = &case.resolved else {
                unreachable!("hidden alternatives are rejected above unless node-typed");
            };
            format!(
                "{type_name}::parse_opt(node, source)?.map(|x| Box::new(x)).map(|y| {name}::{}(y))",
                case.variant
            )
        })
        .collect();

    let unexpected = "return Err(ParseError::new(node.range(), \
format!(\"Parse error, unexpected node-type: {}\", node.kind())))";

    let parse_wildcard = if hidden_attempts.is_empty() {
        format!("            _ => {unexpected},")
    } else {
        let chain: String = hidden_attempts
            .iter()
            .map(|attempt| format!("if let Some(x) = {attempt} {{ x }} else "))
            .collect();
        format!("            _ => {chain}{{ {unexpected}; }},")
    };
    let parse_opt_wildcard = if hidden_attempts.is_empty() {
        "            _ => return Ok(None),".to_string()
    } else {
        let chain: String = hidden_attempts
            .iter()
            .map(|attempt| format!("if let Some(x) = {attempt} {{ Some(x) }} else "))
            .collect();
        format!("            _ => return Ok({chain}{{ None }}),")
    };

    let comment_arm = format!(
        "            \"comment\" => {name}::Extra(ExtraChild::Comment(Box::new(CommentNode::parse(node, source)?))),"
    );
    let error_arm = format!(
        "            \"ERROR\" => {name}::Extra(ExtraChild::Error(Box::new(ErrorNode::parse(node, source)?))),"
    );

    cg.line(&format!("impl NodeParser for {name} {{"));
    cg.line("    fn parse(node: Node, source: &[u8]) -> Result<Self, ParseError> {");
    cg.line("        Ok(match node.kind() {");
    cg.line(&comment_arm);
    cg.line(&error_arm);
    for arm in &literal_arms {
        cg.line(arm);
    }
    cg.line(&parse_wildcard);
    cg.line("        })");
    cg.line("    }");
    cg.line("}");
    cg.blank();

    cg.line(&format!("impl {name} {{"));
    cg.line("    pub fn parse_opt(node: Node, source: &[u8]) -> Result<Option<Self>, ParseError> {");
    cg.line("        Ok(Some(match node.kind() {");
    cg.line(&comment_arm);
    cg.line(&error_arm);
    for arm in &literal_arms {
        cg.line(arm);
    }
    cg.line(&parse_opt_wildcard);
    cg.line("        }))");
    cg.line("    }");
    cg.blank();

    cg.line("    pub fn kind(&self) -> &'static str {");
    cg.push(&match_block(name, &cases, "y", "y.kind()", |case| match case.resolved {
        ResolvedType::Token => ("y, _".into(), "y".into()),
        _ => ("y".into(), "y.kind()".into()),
    }));
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

    if !has_operator {
        cg.blank();
        cg.line("    pub fn get_static_type(&self, state: &mut AnalysisState, emitter: &dyn IssueEmitter) -> Option<UnionType> {");
        cg.push(&match_block(
            name,
            &cases,
            "x",
            "x.get_static_type(state, emitter)",
            |case| match case.resolved {
                // Tokens are structurally uniform with records: always string-typed.
                ResolvedType::Token => ("_, _".into(), "Some(DiscreteType::String.into())".into()),
                _ => ("x".into(), "x.get_static_type(state, emitter)".into()),
            },
        ));
        cg.line("    }");
        cg.blank();
        cg.line("    pub fn get_const_value(&self, state: &mut AnalysisState, emitter: &dyn IssueEmitter) -> Option<ConstValue> {");
        cg.push(&match_block(
            name,
            &cases,
            "x",
            "x.get_const_value(state, emitter)",
            |case| match case.resolved {
                ResolvedType::Token => (
                    "a, _".into(),
                    "Some(ConstValue::String(OsStr::new(a).to_os_string()))".into(),
                ),
                _ => ("x".into(), "x.get_const_value(state, emitter)".into()),
            },
        ));
        cg.line("    }");
        cg.blank();
        cg.line("    pub fn read_from(&self, state: &mut AnalysisState, emitter: &dyn IssueEmitter) {");
        cg.push(&match_block(name, &cases, "x", "x.read_from(state, emitter)", |case| {
            match case.resolved {
                ResolvedType::Token => ("_, _".into(), "()".into()),
                _ => ("x".into(), "x.read_from(state, emitter)".into()),
            }
        }));
        cg.line("    }");
    }
    cg.line("}");
    cg.blank();

    if !has_operator {
        cg.line(&format!("impl NodeAccess for {name} {{"));
        cg.line("    fn brief_desc(&self) -> String {");
        cg.push(&match_block(name, &cases, "x", "x.brief_desc()", |case| match case.resolved {
            ResolvedType::Token => ("a, _".into(), "a.to_string()".into()),
            _ => (
                "x".into(),
                format!("format!(\"{name}::{}({{}})\", x.brief_desc())", case.raw),
            ),
        }));
        cg.line("    }");
        cg.blank();
        cg.line("    fn as_any(&self) -> AnyNodeRef<'_> {");
        cg.push(&match_block(name, &cases, "x", "x.as_any()", |case| match case.resolved {
            ResolvedType::Token => ("a, b".into(), "AnyNodeRef::StaticExpr(a, *b)".into()),
            _ => ("x".into(), "x.as_any()".into()),
        }));
        cg.line("    }");
        cg.blank();
        cg.line("    fn children_any(&self) -> Vec<AnyNodeRef<'_>> {");
        cg.push(&match_block(name, &cases, "x", "x.children_any()", |case| match case.resolved {
            ResolvedType::Token => ("_, _".into(), "vec![]".into()),
            _ => ("x".into(), "x.children_any()".into()),
        }));
        cg.line("    }");
        cg.blank();
        cg.line("    fn range(&self) -> Range {");
        cg.push(&match_block(name, &cases, "x", "x.range()", |case| match case.resolved {
            ResolvedType::Token => ("_, r".into(), "*r".into()),
            _ => ("x".into(), "x.range()".into()),
        }));
        cg.line("    }");
        cg.line("}");
        cg.blank();
    }

    Ok(CompiledVariantSet { has_operator })
}

/// One exhaustive `match self` over every case plus the `Extra` arm, which
/// always dispatches first.
fn match_block(
    name: &str,
    cases: &IndexMap<String, Case>,
    extra_capture: &str,
    extra_body: &str,
    arm: impl Fn(&Case) -> (String, String),
) -> String {
    let mut out = String::new();
    out.push_str("        match self {\n");
    out.push_str(&format!(
        "            {name}::Extra({extra_capture}) => {extra_body},\n"
    ));
    for case in cases.values() {
        let (capture, body) = arm(case);
        out.push_str(&format!(
            "            {name}::{}({capture}) => {body},\n",
            case.variant
        ));
    }
    out.push_str("        }\n");
    out
}

// ------------------------------- Tests ------------------------------------ //
