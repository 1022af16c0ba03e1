//! Syntactic symbol resolver for the NUnit assertion surface.
//!
//! Without a compiler we resolve overloads the way a reader would: the receiver
//! must be a known assertion class, and each argument is classified by its
//! syntactic shape (literal kind, cast, declared type of a local) before being
//! checked against the declared parameter types. When more than one overload
//! stays applicable the call is left unresolved.

use super::call_site::{MethodSignature, Parameter, ParameterType, SymbolResolver};
use crate::parser::{
    argument_expression, argument_nodes, callee_is_generic, callee_name, callee_receiver,
    is_named_argument, is_string_kind, node_text,
};
use std::collections::HashMap;
use tree_sitter::{Node, Tree};

const CLASSIC_ASSERT: &str = "NUnit.Framework.Legacy.ClassicAssert";
const ASSERT: &str = "NUnit.Framework.Assert";

/// Receivers treated as classic-model assertion classes by default
pub const DEFAULT_LEGACY_RECEIVERS: &[&str] = &["ClassicAssert", "Assert"];

/// Roots of NUnit constraint expressions (`Is.EqualTo(..)`, `Has.Member(..)`)
const CONSTRAINT_ROOTS: &[&str] = &["Is", "Has", "Does", "Throws", "Contains", "Iz"];

const NUMERIC_TYPES: &[&str] = &[
    "double", "float", "decimal", "int", "long", "short", "byte", "sbyte", "uint", "ulong",
    "ushort", "Double", "Single", "Decimal", "Int16", "Int32", "Int64", "UInt16", "UInt32",
    "UInt64", "Byte", "SByte",
];

const VALUE_TYPES: &[&str] = &[
    "bool", "char", "Boolean", "Char", "Guid", "DateTime", "DateTimeOffset", "TimeSpan",
];

/// Syntactic shape of an argument expression
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExprShape {
    Text,
    Numeric,
    Null,
    Constraint,
    TypeRef,
    /// Array of a reference type, convertible to `object[]`
    Array,
    /// Known to be none of the above (bool, char, lambda, user type)
    Other,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Applicability {
    Yes,
    Maybe,
    No,
}

fn applicability(shape: ExprShape, ty: ParameterType) -> Applicability {
    use Applicability::*;
    use ExprShape as S;
    use ParameterType as P;
    match (ty, shape) {
        (P::Object | P::Params, _) => Yes,
        (_, S::Unknown) => Maybe,
        (P::Numeric, S::Numeric) => Yes,
        (P::Text, S::Text | S::Null) => Yes,
        (P::Type, S::TypeRef | S::Null) => Yes,
        (P::Type, S::Other) => Maybe,
        (P::Collection, S::Null | S::Array) => Yes,
        (P::Collection, S::Other) => Maybe,
        (P::Constraint, S::Constraint) => Yes,
        (P::Constraint, S::Other) => Maybe,
        _ => No,
    }
}

/// A declared overload on an assertion class
struct Overload {
    method: &'static str,
    params: &'static [(&'static str, ParameterType)],
}

impl Overload {
    fn is_variadic(&self) -> bool {
        self.params
            .last()
            .is_some_and(|(_, ty)| *ty == ParameterType::Params)
    }

    fn accepts_arity(&self, arguments: usize) -> bool {
        if self.is_variadic() {
            arguments + 1 >= self.params.len()
        } else {
            arguments == self.params.len()
        }
    }

    fn parameter_type(&self, position: usize) -> ParameterType {
        match self.params.get(position) {
            Some((_, ty)) => *ty,
            None => ParameterType::Params,
        }
    }

    fn signature(&self, declaring_type: &str) -> MethodSignature {
        MethodSignature {
            name: self.method.to_string(),
            declaring_type: declaring_type.to_string(),
            parameters: self
                .params
                .iter()
                .map(|(name, ty)| Parameter::new(name, *ty))
                .collect(),
        }
    }
}

macro_rules! overload {
    ($method:literal, [$(($name:literal, $ty:ident)),* $(,)?]) => {
        Overload {
            method: $method,
            params: &[$(($name, ParameterType::$ty)),*],
        }
    };
}

/// Classic-model surface (NUnit 4 `ClassicAssert`, NUnit 3 `Assert`)
static CLASSIC_OVERLOADS: &[Overload] = &[
    overload!("AreEqual", [("expected", Numeric), ("actual", Numeric), ("delta", Numeric)]),
    overload!("AreEqual", [("expected", Numeric), ("actual", Numeric), ("delta", Numeric), ("message", Text), ("args", Params)]),
    overload!("AreEqual", [("expected", Object), ("actual", Object)]),
    overload!("AreEqual", [("expected", Object), ("actual", Object), ("message", Text), ("args", Params)]),
    overload!("AreNotEqual", [("expected", Object), ("actual", Object)]),
    overload!("AreNotEqual", [("expected", Object), ("actual", Object), ("message", Text), ("args", Params)]),
    overload!("AreSame", [("expected", Object), ("actual", Object)]),
    overload!("AreSame", [("expected", Object), ("actual", Object), ("message", Text), ("args", Params)]),
    overload!("AreNotSame", [("expected", Object), ("actual", Object)]),
    overload!("AreNotSame", [("expected", Object), ("actual", Object), ("message", Text), ("args", Params)]),
    overload!("Greater", [("arg1", Object), ("arg2", Object)]),
    overload!("Greater", [("arg1", Object), ("arg2", Object), ("message", Text), ("args", Params)]),
    overload!("GreaterOrEqual", [("arg1", Object), ("arg2", Object)]),
    overload!("GreaterOrEqual", [("arg1", Object), ("arg2", Object), ("message", Text), ("args", Params)]),
    overload!("Less", [("arg1", Object), ("arg2", Object)]),
    overload!("Less", [("arg1", Object), ("arg2", Object), ("message", Text), ("args", Params)]),
    overload!("LessOrEqual", [("arg1", Object), ("arg2", Object)]),
    overload!("LessOrEqual", [("arg1", Object), ("arg2", Object), ("message", Text), ("args", Params)]),
    overload!("Contains", [("expected", Object), ("actual", Collection)]),
    overload!("Contains", [("expected", Object), ("actual", Collection), ("message", Text), ("args", Params)]),
    overload!("IsInstanceOf", [("expected", Type), ("actual", Object)]),
    overload!("IsInstanceOf", [("expected", Type), ("actual", Object), ("message", Text), ("args", Params)]),
    overload!("IsNotInstanceOf", [("expected", Type), ("actual", Object)]),
    overload!("IsNotInstanceOf", [("expected", Type), ("actual", Object), ("message", Text), ("args", Params)]),
    overload!("IsAssignableFrom", [("expected", Type), ("actual", Object)]),
    overload!("IsAssignableFrom", [("expected", Type), ("actual", Object), ("message", Text), ("args", Params)]),
    overload!("IsTrue", [("condition", Object)]),
    overload!("IsTrue", [("condition", Object), ("message", Text), ("args", Params)]),
    overload!("IsFalse", [("condition", Object)]),
    overload!("IsFalse", [("condition", Object), ("message", Text), ("args", Params)]),
    overload!("IsNull", [("anObject", Object)]),
    overload!("IsNull", [("anObject", Object), ("message", Text), ("args", Params)]),
    overload!("IsNotNull", [("anObject", Object)]),
    overload!("IsNotNull", [("anObject", Object), ("message", Text), ("args", Params)]),
    overload!("IsEmpty", [("collection", Collection)]),
    overload!("IsEmpty", [("collection", Collection), ("message", Text), ("args", Params)]),
];

/// Constraint-model entry point
static CONSTRAINT_OVERLOADS: &[Overload] = &[
    overload!("That", [("condition", Object)]),
    overload!("That", [("condition", Object), ("message", Text), ("args", Params)]),
    overload!("That", [("actual", Object), ("expression", Constraint)]),
    overload!("That", [("actual", Object), ("expression", Constraint), ("message", Text), ("args", Params)]),
];

/// Declared types of locals, fields and parameters, keyed by name.
/// Names declared with conflicting types map to `Unknown`.
#[derive(Debug, Default, Clone)]
pub struct TypeHints {
    names: HashMap<String, ExprShape>,
}

impl TypeHints {
    /// Collect declarations from the whole tree
    pub fn from_tree(tree: &Tree, source: &str) -> Self {
        let mut hints = Self::default();
        hints.visit(tree.root_node(), source);
        hints
    }

    pub fn get(&self, name: &str) -> ExprShape {
        self.names.get(name).copied().unwrap_or(ExprShape::Unknown)
    }

    fn record(&mut self, name: &str, shape: ExprShape) {
        self.names
            .entry(name.to_string())
            .and_modify(|existing| {
                if *existing != shape {
                    *existing = ExprShape::Unknown;
                }
            })
            .or_insert(shape);
    }

    fn visit(&mut self, node: Node, source: &str) {
        match node.kind() {
            "variable_declaration" => self.record_variables(node, source),
            "parameter" => {
                if let (Some(ty), Some(name)) = (
                    node.child_by_field_name("type"),
                    node.child_by_field_name("name"),
                ) {
                    self.record(node_text(name, source), shape_of_type(node_text(ty, source)));
                }
            }
            _ => {}
        }
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            self.visit(child, source);
        }
    }

    fn record_variables(&mut self, declaration: Node, source: &str) {
        let Some(ty) = declaration.child_by_field_name("type") else {
            return;
        };
        let type_text = node_text(ty, source);
        let mut cursor = declaration.walk();
        for declarator in declaration
            .named_children(&mut cursor)
            .filter(|c| c.kind() == "variable_declarator")
        {
            let Some(name) = declarator_name(declarator) else {
                continue;
            };
            let shape = if type_text == "var" {
                declarator_initializer(declarator)
                    .map(|init| classify(init, source, &TypeHints::default()))
                    .unwrap_or(ExprShape::Unknown)
            } else {
                shape_of_type(type_text)
            };
            self.record(node_text(name, source), shape);
        }
    }
}

fn declarator_name(declarator: Node) -> Option<Node> {
    if let Some(name) = declarator.child_by_field_name("name") {
        return Some(name);
    }
    let mut cursor = declarator.walk();
    let first = declarator
        .named_children(&mut cursor)
        .find(|c| c.kind() == "identifier");
    first
}

/// The expression after `=` in a declarator (or inside an `equals_value_clause`)
fn declarator_initializer(declarator: Node) -> Option<Node> {
    let mut cursor = declarator.walk();
    let children: Vec<Node> = declarator.children(&mut cursor).collect();
    for (i, child) in children.iter().enumerate() {
        if child.kind() == "equals_value_clause" {
            return child.named_child(0);
        }
        if child.kind() == "=" {
            return children[i + 1..].iter().find(|c| c.is_named()).copied();
        }
    }
    None
}

/// Shape of a value of the named type
pub fn shape_of_type(type_text: &str) -> ExprShape {
    let compact: String = type_text.chars().filter(|c| !c.is_whitespace()).collect();
    let name = compact.trim_end_matches('?');
    let name = name.strip_prefix("System.").unwrap_or(name);
    if name.ends_with(']') {
        if let Some(open) = name.rfind('[') {
            return shape_of_array(&name[..open]);
        }
    }
    match name {
        "string" | "String" => ExprShape::Text,
        "Type" => ExprShape::TypeRef,
        "var" | "dynamic" | "object" | "Object" => ExprShape::Unknown,
        n if NUMERIC_TYPES.contains(&n) => ExprShape::Numeric,
        n if n.ends_with("Constraint") => ExprShape::Constraint,
        _ => ExprShape::Other,
    }
}

/// Arrays of value types do not convert to `object[]`
fn shape_of_array(element: &str) -> ExprShape {
    let element = element.strip_prefix("System.").unwrap_or(element);
    if element.ends_with('?')
        || NUMERIC_TYPES.contains(&element)
        || VALUE_TYPES.contains(&element)
    {
        ExprShape::Other
    } else {
        ExprShape::Array
    }
}

/// Leftmost identifier of a member/invocation chain: `Is.Not.EqualTo(x)` yields `Is`.
fn chain_root<'a>(mut node: Node, source: &'a str) -> Option<&'a str> {
    loop {
        node = match node.kind() {
            "member_access_expression" => node.child_by_field_name("expression")?,
            "invocation_expression" => node.child_by_field_name("function")?,
            "identifier" => return Some(node_text(node, source)),
            _ => return None,
        };
    }
}

fn operator_text<'a>(node: Node, source: &'a str) -> &'a str {
    node.child_by_field_name("operator")
        .map(|op| node_text(op, source))
        .unwrap_or("")
}

/// Classify an expression by its syntactic shape
pub fn classify(node: Node, source: &str, hints: &TypeHints) -> ExprShape {
    let kind = node.kind();
    if is_string_kind(kind) {
        return ExprShape::Text;
    }
    match kind {
        "integer_literal" | "real_literal" => ExprShape::Numeric,
        "null_literal" => ExprShape::Null,
        "boolean_literal" | "character_literal" | "lambda_expression"
        | "anonymous_object_creation_expression" => ExprShape::Other,
        "typeof_expression" => ExprShape::TypeRef,
        "identifier" => hints.get(node_text(node, source)),
        "parenthesized_expression" => node
            .named_child(0)
            .map(|inner| classify(inner, source, hints))
            .unwrap_or(ExprShape::Unknown),
        "cast_expression" => node
            .child_by_field_name("type")
            .map(|ty| shape_of_type(node_text(ty, source)))
            .unwrap_or(ExprShape::Unknown),
        "array_creation_expression" => node
            .child_by_field_name("type")
            .map(|ty| shape_of_type(node_text(ty, source)))
            .unwrap_or(ExprShape::Unknown),
        "object_creation_expression" => node
            .child_by_field_name("type")
            .map(|ty| match shape_of_type(node_text(ty, source)) {
                ExprShape::Constraint => ExprShape::Constraint,
                ExprShape::Text => ExprShape::Text,
                ExprShape::Numeric => ExprShape::Numeric,
                _ => ExprShape::Other,
            })
            .unwrap_or(ExprShape::Other),
        "prefix_unary_expression" => {
            let operand = node
                .child_by_field_name("operand")
                .or_else(|| node.named_child(0));
            let Some(operand) = operand else {
                return ExprShape::Unknown;
            };
            let inner = classify(operand, source, hints);
            let text = node_text(node, source).trim_start();
            if text.starts_with('!') {
                if inner == ExprShape::Constraint {
                    ExprShape::Constraint
                } else {
                    ExprShape::Other
                }
            } else if inner == ExprShape::Numeric {
                ExprShape::Numeric
            } else {
                ExprShape::Unknown
            }
        }
        "binary_expression" => classify_binary(node, source, hints),
        "conditional_expression" => {
            let consequence = node.child_by_field_name("consequence");
            let alternative = node.child_by_field_name("alternative");
            match (consequence, alternative) {
                (Some(a), Some(b)) => {
                    let a = classify(a, source, hints);
                    if a == classify(b, source, hints) {
                        a
                    } else {
                        ExprShape::Unknown
                    }
                }
                _ => ExprShape::Unknown,
            }
        }
        "member_access_expression" => classify_member_access(node, source),
        "invocation_expression" => classify_invocation(node, source),
        _ => ExprShape::Unknown,
    }
}

fn classify_binary(node: Node, source: &str, hints: &TypeHints) -> ExprShape {
    let (Some(left), Some(right)) = (
        node.child_by_field_name("left"),
        node.child_by_field_name("right"),
    ) else {
        return ExprShape::Unknown;
    };
    let left = classify(left, source, hints);
    let right = classify(right, source, hints);
    match operator_text(node, source) {
        "+" if left == ExprShape::Text || right == ExprShape::Text => ExprShape::Text,
        "+" | "-" | "*" | "/" | "%"
            if left == ExprShape::Numeric && right == ExprShape::Numeric =>
        {
            ExprShape::Numeric
        }
        "|" | "&" if left == ExprShape::Constraint || right == ExprShape::Constraint => {
            ExprShape::Constraint
        }
        "==" | "!=" | "<" | ">" | "<=" | ">=" | "&&" | "||" => ExprShape::Other,
        _ => ExprShape::Unknown,
    }
}

fn classify_member_access(node: Node, source: &str) -> ExprShape {
    let receiver = node
        .child_by_field_name("expression")
        .map(|r| node_text(r, source))
        .unwrap_or("");
    let name = node
        .child_by_field_name("name")
        .map(|n| node_text(n, source))
        .unwrap_or("");
    if NUMERIC_TYPES.contains(&receiver) {
        return ExprShape::Numeric;
    }
    if matches!(receiver, "string" | "String") && name == "Empty" {
        return ExprShape::Text;
    }
    if matches!(name, "Length" | "Count") {
        return ExprShape::Numeric;
    }
    match chain_root(node, source) {
        Some(root) if CONSTRAINT_ROOTS.contains(&root) => ExprShape::Constraint,
        _ => ExprShape::Unknown,
    }
}

fn classify_invocation(node: Node, source: &str) -> ExprShape {
    let Some(function) = node.child_by_field_name("function") else {
        return ExprShape::Unknown;
    };
    let name = callee_name(function, source).unwrap_or("");
    let receiver = callee_receiver(function, source).unwrap_or_default();
    if name == "ToString"
        || (matches!(receiver.as_str(), "string" | "String")
            && matches!(name, "Format" | "Concat" | "Join"))
    {
        return ExprShape::Text;
    }
    if name == "typeof" {
        return ExprShape::TypeRef;
    }
    match chain_root(node, source) {
        Some(root) if CONSTRAINT_ROOTS.contains(&root) => ExprShape::Constraint,
        _ => ExprShape::Unknown,
    }
}

/// Resolver for `ClassicAssert.*` / `Assert.*` calls, built once per syntax tree
pub struct ClassicAssertResolver {
    legacy_receivers: Vec<String>,
    hints: TypeHints,
}

impl ClassicAssertResolver {
    /// Create a resolver with type hints collected from `tree`
    pub fn new(tree: &Tree, source: &str) -> Self {
        Self {
            legacy_receivers: DEFAULT_LEGACY_RECEIVERS
                .iter()
                .map(|r| r.to_string())
                .collect(),
            hints: TypeHints::from_tree(tree, source),
        }
    }

    /// Override which receivers count as classic-model assertion classes
    pub fn with_legacy_receivers(mut self, receivers: &[String]) -> Self {
        self.legacy_receivers = receivers.to_vec();
        self
    }

    pub fn hints(&self) -> &TypeHints {
        &self.hints
    }

    fn declaring_types(&self, receiver: &str) -> Vec<(&'static str, &'static [Overload])> {
        let simple = receiver.rsplit('.').next().unwrap_or(receiver);
        let qualified_ok = |full: &str| receiver == simple || full.ends_with(receiver);
        let is_legacy = self.legacy_receivers.iter().any(|r| r == simple);
        let mut out = Vec::new();
        match simple {
            "ClassicAssert" if is_legacy && qualified_ok(CLASSIC_ASSERT) => {
                out.push((CLASSIC_ASSERT, CLASSIC_OVERLOADS));
            }
            "Assert" if qualified_ok(ASSERT) => {
                out.push((ASSERT, CONSTRAINT_OVERLOADS));
                if is_legacy {
                    out.push((ASSERT, CLASSIC_OVERLOADS));
                }
            }
            _ => {}
        }
        out
    }
}

impl SymbolResolver for ClassicAssertResolver {
    fn resolve(&self, invocation: Node<'_>, source: &str) -> Option<MethodSignature> {
        let function = invocation.child_by_field_name("function")?;
        if callee_is_generic(function) {
            return None;
        }
        let name = callee_name(function, source)?;
        let receiver = callee_receiver(function, source)?;
        let list = invocation.child_by_field_name("arguments")?;
        let arguments = argument_nodes(list);
        if arguments.iter().any(|a| is_named_argument(*a)) {
            return None;
        }
        let shapes: Vec<ExprShape> = arguments
            .iter()
            .map(|a| {
                argument_expression(*a)
                    .map(|e| classify(e, source, &self.hints))
                    .unwrap_or(ExprShape::Unknown)
            })
            .collect();

        let mut applicable: Vec<(&'static str, &Overload, bool)> = Vec::new();
        for (declaring_type, overloads) in self.declaring_types(&receiver) {
            for overload in overloads
                .iter()
                .filter(|o| o.method == name && o.accepts_arity(shapes.len()))
            {
                let verdicts: Vec<Applicability> = shapes
                    .iter()
                    .enumerate()
                    .map(|(i, shape)| applicability(*shape, overload.parameter_type(i)))
                    .collect();
                if verdicts.contains(&Applicability::No) {
                    continue;
                }
                let definite = verdicts.iter().all(|v| *v == Applicability::Yes);
                applicable.push((declaring_type, overload, definite));
            }
        }

        let chosen = match applicable.as_slice() {
            [] => None,
            [(ty, overload, _)] => Some((*ty, *overload)),
            many => {
                let definite: Vec<_> = many.iter().filter(|(_, _, d)| *d).collect();
                match definite.as_slice() {
                    [(ty, overload, _)] => Some((*ty, *overload)),
                    _ => None,
                }
            }
        };
        if chosen.is_none() && !applicable.is_empty() {
            tracing::trace!(method = name, "ambiguous overload; leaving call unresolved");
        }
        chosen.map(|(ty, overload)| overload.signature(ty))
    }

    fn shape_of(&self, expression: Node<'_>, source: &str) -> ExprShape {
        classify(expression, source, &self.hints)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{find_invocations, CSharpParser};

    fn resolve_first(body: &str) -> Option<MethodSignature> {
        let source = format!("class C {{ void M() {{ {} }} }}", body);
        let tree = CSharpParser::new().unwrap().parse(&source).unwrap();
        let resolver = ClassicAssertResolver::new(&tree, &source);
        let call = find_invocations(&tree)[0];
        resolver.resolve(call, &source)
    }

    fn params(sig: &MethodSignature) -> Vec<&str> {
        sig.parameter_names()
    }

    #[test]
    fn resolves_plain_equality() {
        let sig = resolve_first("ClassicAssert.AreEqual(2d, 3d);").unwrap();
        assert_eq!(sig.name, "AreEqual");
        assert_eq!(sig.declaring_type, CLASSIC_ASSERT);
        assert_eq!(params(&sig), vec!["expected", "actual"]);
    }

    #[test]
    fn third_argument_type_selects_tolerance_or_message() {
        let sig = resolve_first("ClassicAssert.AreEqual(2d, 3d, 0.0000001d);").unwrap();
        assert_eq!(params(&sig), vec!["expected", "actual", "delta"]);

        let sig = resolve_first("ClassicAssert.AreEqual(2d, 3d, \"message\");").unwrap();
        assert_eq!(params(&sig), vec!["expected", "actual", "message", "args"]);

        let sig = resolve_first("ClassicAssert.AreEqual(2d, 3d, 0.1d, \"m {0}\", x);").unwrap();
        assert_eq!(
            params(&sig),
            vec!["expected", "actual", "delta", "message", "args"]
        );
    }

    #[test]
    fn declared_locals_disambiguate() {
        let source = r#"
            class C {
                const double Tolerance = 1e-7;
                void M(string note) {
                    var tol = 0.5;
                    ClassicAssert.AreEqual(1d, 2d, Tolerance);
                    ClassicAssert.AreEqual(1d, 2d, note);
                    ClassicAssert.AreEqual(1d, 2d, tol);
                    ClassicAssert.AreEqual(1d, 2d, mystery);
                }
            }
        "#;
        let tree = CSharpParser::new().unwrap().parse(source).unwrap();
        let resolver = ClassicAssertResolver::new(&tree, source);
        let sigs: Vec<Option<MethodSignature>> = find_invocations(&tree)
            .into_iter()
            .map(|c| resolver.resolve(c, source))
            .collect();
        assert_eq!(params(sigs[0].as_ref().unwrap())[2], "delta");
        assert_eq!(params(sigs[1].as_ref().unwrap())[2], "message");
        assert_eq!(params(sigs[2].as_ref().unwrap())[2], "delta");
        assert!(sigs[3].is_none(), "unknown third argument is ambiguous");
    }

    #[test]
    fn constraint_model_resolves_to_that() {
        let sig = resolve_first("Assert.That(x, Is.EqualTo(x));").unwrap();
        assert_eq!(sig.name, "That");
        assert_eq!(params(&sig), vec!["actual", "expression"]);

        let sig = resolve_first("Assert.That(ok, \"should hold\");").unwrap();
        assert_eq!(params(&sig), vec!["condition", "message", "args"]);
    }

    #[test]
    fn nunit3_assert_receiver_is_classic_too() {
        let sig = resolve_first("Assert.AreEqual(1, count);").unwrap();
        assert_eq!(sig.declaring_type, ASSERT);
        assert_eq!(sig.name, "AreEqual");
    }

    #[test]
    fn legacy_receivers_are_configurable() {
        let source = "class C { void M() { Assert.AreEqual(1, count); } }";
        let tree = CSharpParser::new().unwrap().parse(source).unwrap();
        let resolver = ClassicAssertResolver::new(&tree, source)
            .with_legacy_receivers(&["ClassicAssert".to_string()]);
        let call = find_invocations(&tree)[0];
        assert!(resolver.resolve(call, source).is_none());
    }

    #[test]
    fn unknown_receivers_named_and_generic_calls_are_unresolved() {
        assert!(resolve_first("Other.AreEqual(1, 2);").is_none());
        assert!(resolve_first("ClassicAssert.AreEqual(expected: 1, actual: 2);").is_none());
        assert!(resolve_first("ClassicAssert.IsInstanceOf<string>(x);").is_none());
        assert!(resolve_first("ClassicAssert.AreEqual(1);").is_none());
    }

    #[test]
    fn fully_qualified_receiver_resolves() {
        let sig = resolve_first("NUnit.Framework.Legacy.ClassicAssert.AreSame(a, b);").unwrap();
        assert_eq!(sig.name, "AreSame");
    }

    #[test]
    fn array_types_of_reference_elements() {
        assert_eq!(shape_of_type("object[]"), ExprShape::Array);
        assert_eq!(shape_of_type("string []"), ExprShape::Array);
        assert_eq!(shape_of_type("System.Object[]"), ExprShape::Array);
        assert_eq!(shape_of_type("int[][]"), ExprShape::Array);
        assert_eq!(shape_of_type("int[]"), ExprShape::Other);
        assert_eq!(shape_of_type("double?[]"), ExprShape::Other);
    }

    #[test]
    fn declared_and_cast_arrays_are_arrays() {
        let source = r#"class C { void M(string[] names) { object[] parts = { 1 }; F(parts, names, (object[])x, new string[2], counts); } }"#;
        let tree = CSharpParser::new().unwrap().parse(source).unwrap();
        let hints = TypeHints::from_tree(&tree, source);
        let call = find_invocations(&tree)[0];
        let list = call.child_by_field_name("arguments").unwrap();
        let shapes: Vec<ExprShape> = argument_nodes(list)
            .into_iter()
            .map(|a| classify(argument_expression(a).unwrap(), source, &hints))
            .collect();
        assert_eq!(
            shapes,
            vec![
                ExprShape::Array,
                ExprShape::Array,
                ExprShape::Array,
                ExprShape::Array,
                ExprShape::Unknown,
            ]
        );
    }

    #[test]
    fn shapes_of_common_expressions() {
        let source = r#"class C { void M() { F("a" + n, -1.5, (int)x, string.Empty, Is.Not.Null, typeof(C), null, x.ToString()); } }"#;
        let tree = CSharpParser::new().unwrap().parse(source).unwrap();
        let call = find_invocations(&tree)[0];
        let list = call.child_by_field_name("arguments").unwrap();
        let hints = TypeHints::default();
        let shapes: Vec<ExprShape> = argument_nodes(list)
            .into_iter()
            .map(|a| classify(argument_expression(a).unwrap(), source, &hints))
            .collect();
        assert_eq!(
            shapes,
            vec![
                ExprShape::Text,
                ExprShape::Numeric,
                ExprShape::Numeric,
                ExprShape::Text,
                ExprShape::Constraint,
                ExprShape::TypeRef,
                ExprShape::Null,
                ExprShape::Text,
            ]
        );
    }
}
