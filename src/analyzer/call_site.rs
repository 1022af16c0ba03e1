//! Call sites and the symbol-resolution seam.
//!
//! A `CallSite` is an invocation plus the method it resolves to. Resolution is
//! delegated to a `SymbolResolver`, so the matcher never depends on how the
//! overload was picked.

use super::resolver::ExprShape;
use crate::fixer::trivia::Formatting;
use crate::parser::{argument_expression, argument_nodes, callee_receiver, node_text};
use tree_sitter::Node;

/// Declared type class of a parameter, as far as overload selection needs it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterType {
    /// `object` or an unconstrained generic
    Object,
    /// `double`, `float`, `decimal`, integral types
    Numeric,
    /// `string`
    Text,
    /// `System.Type`
    Type,
    /// `ICollection` / `IEnumerable`
    Collection,
    /// `IResolveConstraint`
    Constraint,
    /// `params object[]`
    Params,
}

/// A declared parameter of a resolved method
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub ty: ParameterType,
}

impl Parameter {
    pub fn new(name: &str, ty: ParameterType) -> Self {
        Self {
            name: name.to_string(),
            ty,
        }
    }
}

/// Identity of the method an invocation denotes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSignature {
    /// Simple method name (`AreEqual`)
    pub name: String,
    /// Fully-qualified declaring type (`NUnit.Framework.Legacy.ClassicAssert`)
    pub declaring_type: String,
    /// Declared parameters in order
    pub parameters: Vec<Parameter>,
}

impl MethodSignature {
    pub fn is_variadic(&self) -> bool {
        self.parameters
            .last()
            .is_some_and(|p| p.ty == ParameterType::Params)
    }

    pub fn parameter_names(&self) -> Vec<&str> {
        self.parameters.iter().map(|p| p.name.as_str()).collect()
    }

    /// `NUnit.Framework.Legacy.ClassicAssert.AreEqual`
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.declaring_type, self.name)
    }
}

/// Capability to identify which method an invocation calls.
///
/// Implementations must be shareable across worker threads; analysis of
/// independent call sites may run concurrently.
pub trait SymbolResolver: Send + Sync {
    fn resolve(&self, invocation: Node<'_>, source: &str) -> Option<MethodSignature>;

    /// What is known about the static type of an argument expression
    fn shape_of(&self, _expression: Node<'_>, _source: &str) -> ExprShape {
        ExprShape::Unknown
    }
}

/// One argument expression of a call, with the formatting that preceded it
#[derive(Debug, Clone)]
pub struct CallArgument<'a> {
    /// The `argument` node as it appears in the argument list
    pub argument: Node<'a>,
    /// The expression the argument carries
    pub expression: Node<'a>,
    /// Whitespace/comments between the preceding comma and this argument
    pub formatting: Formatting,
    pub shape: ExprShape,
}

impl<'a> CallArgument<'a> {
    pub fn text(&self, source: &'a str) -> &'a str {
        node_text(self.expression, source)
    }
}

/// An invocation together with its resolved target method
#[derive(Debug, Clone)]
pub struct CallSite<'a> {
    /// The invocation_expression node
    pub node: Node<'a>,
    /// Receiver as written in source, whitespace removed (`ClassicAssert`)
    pub receiver: String,
    pub method: MethodSignature,
    /// Arguments in source order
    pub arguments: Vec<CallArgument<'a>>,
}

impl<'a> CallSite<'a> {
    /// Build a call site for an invocation. Returns None when the resolver cannot
    /// identify the invoked method.
    pub fn from_invocation(
        node: Node<'a>,
        source: &str,
        resolver: &dyn SymbolResolver,
    ) -> Option<Self> {
        if node.kind() != "invocation_expression" {
            return None;
        }
        let method = resolver.resolve(node, source)?;
        let function = node.child_by_field_name("function")?;
        let receiver = callee_receiver(function, source).unwrap_or_default();
        let list = node.child_by_field_name("arguments")?;
        let mut arguments = Vec::new();
        for argument in argument_nodes(list) {
            let expression = argument_expression(argument)?;
            arguments.push(CallArgument {
                argument,
                expression,
                formatting: Formatting::before(argument, source),
                shape: resolver.shape_of(expression, source),
            });
        }
        Some(Self {
            node,
            receiver,
            method,
            arguments,
        })
    }

    /// Name as written at the call site: `ClassicAssert.AreEqual`
    pub fn display_name(&self) -> String {
        if self.receiver.is_empty() {
            self.method.name.clone()
        } else {
            format!("{}.{}", self.receiver, self.method.name)
        }
    }
}
