//! Structural equivalence between the actual value and the expected values of a
//! constraint-model assertion.

use super::call_site::{CallArgument, CallSite};
use crate::parser::{argument_expression, argument_nodes, callee_name, is_equivalent_to};
use tree_sitter::Node;

/// Constraint constructors whose first argument is an expected value
pub const EXPECTED_METHODS: &[&str] = &[
    "EqualTo",
    "SameAs",
    "GreaterThan",
    "GreaterThanOrEqualTo",
    "LessThan",
    "LessThanOrEqualTo",
    "EquivalentTo",
    "AtLeast",
    "AtMost",
];

/// `(actual, constraint)` of an `Assert.That(actual, constraint, ...)` call site
pub fn actual_and_constraint<'s, 'a>(
    call: &'s CallSite<'a>,
) -> Option<(&'s CallArgument<'a>, &'s CallArgument<'a>)> {
    let names = call.method.parameter_names();
    if call.method.name != "That" || names.get(1) != Some(&"expression") {
        return None;
    }
    match call.arguments.as_slice() {
        [actual, constraint, ..] => Some((actual, constraint)),
        _ => None,
    }
}

/// Expected-value expressions reachable from a constraint expression, in source order.
pub fn expected_candidates<'a>(constraint: Node<'a>, source: &str) -> Vec<Node<'a>> {
    let mut out = Vec::new();
    collect(constraint, source, &mut out);
    out.sort_by_key(|n| n.start_byte());
    out
}

fn collect<'a>(node: Node<'a>, source: &str, out: &mut Vec<Node<'a>>) {
    match node.kind() {
        "invocation_expression" => {
            let Some(function) = node.child_by_field_name("function") else {
                return;
            };
            let is_expected_leaf = callee_name(function, source)
                .is_some_and(|name| EXPECTED_METHODS.contains(&name));
            if is_expected_leaf {
                let first = node
                    .child_by_field_name("arguments")
                    .and_then(|list| argument_nodes(list).into_iter().next())
                    .and_then(argument_expression);
                if let Some(expected) = first {
                    out.push(expected);
                }
            }
            // `.Within(y)`, `.Using(c)` and friends hang off the receiver chain;
            // only the receiver is searched, never the modifier's own arguments
            if function.kind() == "member_access_expression" {
                if let Some(receiver) = function.child_by_field_name("expression") {
                    collect(receiver, source, out);
                }
            }
        }
        "member_access_expression" => {
            if let Some(receiver) = node.child_by_field_name("expression") {
                collect(receiver, source, out);
            }
        }
        "binary_expression" => {
            for field in ["left", "right"] {
                if let Some(side) = node.child_by_field_name(field) {
                    collect(side, source, out);
                }
            }
        }
        "prefix_unary_expression" | "parenthesized_expression" => {
            let mut cursor = node.walk();
            let children: Vec<Node<'a>> = node.named_children(&mut cursor).collect();
            for child in children {
                collect(child, source, out);
            }
        }
        _ => {}
    }
}

/// Expected candidates that are structurally equivalent to the actual argument
pub fn same_as_actual<'a>(call: &CallSite<'a>, source: &str) -> Vec<Node<'a>> {
    let Some((actual, constraint)) = actual_and_constraint(call) else {
        return Vec::new();
    };
    expected_candidates(constraint.expression, source)
        .into_iter()
        .filter(|expected| is_equivalent_to(*expected, actual.expression, source))
        .collect()
}
