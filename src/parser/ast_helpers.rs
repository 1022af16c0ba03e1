//! Shared AST traversal helpers for analyzer rules and the fixer.
//!
//! Provides utilities to walk the tree-sitter C# tree without re-implementing
//! traversal in each rule, plus the token-level view used for structural
//! equivalence (comments and whitespace are not tokens).

use crate::Location;
use tree_sitter::{Node, Tree};

/// Node kinds whose text is compared as a single token.
const ATOMIC_KINDS: &[&str] = &[
    "string_literal",
    "verbatim_string_literal",
    "raw_string_literal",
    "interpolated_string_expression",
    "character_literal",
    "integer_literal",
    "real_literal",
];

/// Text of a node, or "" when the byte range is not valid UTF-8.
pub fn node_text<'a>(node: Node, source: &'a str) -> &'a str {
    source.get(node.start_byte()..node.end_byte()).unwrap_or("")
}

/// Convert a tree-sitter Node to Location (1-indexed, with byte span).
pub fn node_to_location(node: Node) -> Location {
    Location::new(
        node.start_position().row + 1,
        node.start_position().column + 1,
    )
    .with_end(node.end_position().row + 1, node.end_position().column + 1)
    .with_bytes(node.start_byte(), node.end_byte())
}

pub fn is_comment(node: Node) -> bool {
    node.kind() == "comment"
}

/// Returns true if the node or any descendant is a comment.
pub fn contains_comment(node: Node) -> bool {
    if is_comment(node) {
        return true;
    }
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).any(contains_comment);
    found
}

/// Returns true if the node is a string literal of any flavour (regular, verbatim,
/// raw or interpolated).
pub fn is_string_kind(kind: &str) -> bool {
    matches!(
        kind,
        "string_literal"
            | "verbatim_string_literal"
            | "raw_string_literal"
            | "interpolated_string_expression"
    )
}

/// Collect every invocation_expression in the tree, outermost first (pre-order).
pub fn find_invocations(tree: &Tree) -> Vec<Node<'_>> {
    let mut out = Vec::new();
    visit_invocations(tree.root_node(), &mut out);
    out
}

fn visit_invocations<'a>(node: Node<'a>, out: &mut Vec<Node<'a>>) {
    if node.kind() == "invocation_expression" {
        out.push(node);
    }
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        visit_invocations(child, out);
    }
}

/// Find the invocation_expression spanning exactly `[start_byte, end_byte)`.
pub fn invocation_at(tree: &Tree, start_byte: usize, end_byte: usize) -> Option<Node<'_>> {
    let node = tree
        .root_node()
        .descendant_for_byte_range(start_byte, end_byte)?;
    let mut current = Some(node);
    while let Some(n) = current {
        if n.start_byte() != start_byte || n.end_byte() != end_byte {
            return None;
        }
        if n.kind() == "invocation_expression" {
            return Some(n);
        }
        current = n.parent();
    }
    None
}

/// Unwrap `argument` wrappers: returns the expression an argument node carries.
pub fn argument_expression(argument: Node) -> Option<Node> {
    if argument.kind() != "argument" {
        return Some(argument);
    }
    let mut cursor = argument.walk();
    let children: Vec<Node> = argument
        .named_children(&mut cursor)
        .filter(|c| !is_comment(*c))
        .collect();
    children.last().copied()
}

/// Returns true if the argument uses `name: value` syntax.
pub fn is_named_argument(argument: Node) -> bool {
    if argument.kind() != "argument" {
        return false;
    }
    if argument.child_by_field_name("name").is_some() {
        return true;
    }
    let mut cursor = argument.walk();
    let named = argument
        .children(&mut cursor)
        .any(|c| c.kind() == ":" || c.kind() == "name_colon");
    named
}

/// The argument nodes of an argument_list, in source order (comments skipped).
pub fn argument_nodes(argument_list: Node) -> Vec<Node> {
    let mut cursor = argument_list.walk();
    argument_list
        .named_children(&mut cursor)
        .filter(|c| c.kind() == "argument")
        .collect()
}

/// Simple method name of an invocation's callee: `Foo.Bar<T>` yields `Bar`.
pub fn callee_name<'a>(function: Node, source: &'a str) -> Option<&'a str> {
    let name_node = match function.kind() {
        "member_access_expression" => function.child_by_field_name("name")?,
        "identifier" | "generic_name" => function,
        _ => return None,
    };
    match name_node.kind() {
        "identifier" => Some(node_text(name_node, source)),
        "generic_name" => {
            let mut cursor = name_node.walk();
            let ident = name_node
                .named_children(&mut cursor)
                .find(|c| c.kind() == "identifier");
            ident.map(|i| node_text(i, source))
        }
        _ => None,
    }
}

/// Receiver text of a member access callee with whitespace removed: `NUnit.Framework.Assert`.
pub fn callee_receiver(function: Node, source: &str) -> Option<String> {
    if function.kind() != "member_access_expression" {
        return None;
    }
    let receiver = function.child_by_field_name("expression")?;
    Some(
        node_text(receiver, source)
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect(),
    )
}

/// Returns true if the callee carries explicit generic type arguments (`Foo.Bar<int>`).
pub fn callee_is_generic(function: Node) -> bool {
    let name_node = if function.kind() == "member_access_expression" {
        function.child_by_field_name("name")
    } else {
        Some(function)
    };
    name_node.is_some_and(|n| n.kind() == "generic_name")
}

/// Token sequence of a node: (kind, text) for each leaf, skipping comments.
/// Literals are treated as a single token so their inner whitespace counts.
pub fn token_sequence<'a>(node: Node, source: &'a str) -> Vec<(&'static str, &'a str)> {
    let mut out = Vec::new();
    collect_tokens(node, source, &mut out);
    out
}

fn collect_tokens<'a>(node: Node, source: &'a str, out: &mut Vec<(&'static str, &'a str)>) {
    if is_comment(node) {
        return;
    }
    if node.child_count() == 0 || ATOMIC_KINDS.contains(&node.kind()) {
        out.push((node.kind(), node_text(node, source)));
        return;
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_tokens(child, source, out);
    }
}

/// Structural equivalence: identical token sequences, ignoring whitespace and comments.
pub fn is_equivalent_to(a: Node, b: Node, source: &str) -> bool {
    token_sequence(a, source) == token_sequence(b, source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::CSharpParser;

    fn parse(source: &str) -> Tree {
        CSharpParser::new().unwrap().parse(source).unwrap()
    }

    #[test]
    fn finds_invocations_in_method_body() {
        let source = "class C { void M() { Foo(); Bar.Baz(Qux()); } }";
        let tree = parse(source);
        let calls = find_invocations(&tree);
        let texts: Vec<&str> = calls.iter().map(|c| node_text(*c, source)).collect();
        assert_eq!(texts, vec!["Foo()", "Bar.Baz(Qux())", "Qux()"]);
    }

    #[test]
    fn callee_name_strips_generic_arguments() {
        let source = "class C { void M() { Svc.Find<Record>(42); } }";
        let tree = parse(source);
        let call = find_invocations(&tree)[0];
        let function = call.child_by_field_name("function").unwrap();
        assert_eq!(callee_name(function, source), Some("Find"));
        assert!(callee_is_generic(function));
        assert_eq!(callee_receiver(function, source).as_deref(), Some("Svc"));
    }

    #[test]
    fn token_sequence_ignores_whitespace_and_comments() {
        let source = "class C { void M() { F(a.B( 1 )); F(a /* c */ .B(1)); F(a.B(2)); } }";
        let tree = parse(source);
        let args: Vec<Node> = find_invocations(&tree)
            .into_iter()
            .filter(|c| node_text(*c, source).starts_with("F("))
            .map(|c| {
                let list = c.child_by_field_name("arguments").unwrap();
                argument_expression(argument_nodes(list)[0]).unwrap()
            })
            .collect();
        assert!(is_equivalent_to(args[0], args[1], source));
        assert!(!is_equivalent_to(args[0], args[2], source));
    }

    #[test]
    fn invocation_at_requires_exact_span() {
        let source = "class C { void M() { Foo(1); } }";
        let tree = parse(source);
        let call = find_invocations(&tree)[0];
        let found = invocation_at(&tree, call.start_byte(), call.end_byte()).unwrap();
        assert_eq!(found.id(), call.id());
        assert!(invocation_at(&tree, call.start_byte() + 1, call.end_byte()).is_none());
    }
}
