//! Parser module for C# test files

pub mod ast_helpers;
pub mod csharp;
pub mod ignore_directives;

pub use ast_helpers::{
    argument_expression, argument_nodes, callee_is_generic, callee_name, callee_receiver,
    contains_comment, find_invocations, invocation_at, is_equivalent_to, is_named_argument,
    is_string_kind, node_text, node_to_location, token_sequence,
};
pub use csharp::CSharpParser;
pub use ignore_directives::IgnoreDirectives;
