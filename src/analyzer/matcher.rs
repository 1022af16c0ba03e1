//! Invocation matcher: bind a resolved call site to a catalog pattern and
//! assign a role to every argument.

use super::call_site::{CallArgument, CallSite};
use super::catalog::{self, PatternDefinition, Role};

/// A call site that matched a catalog pattern, with its arguments grouped by role
#[derive(Debug, Clone)]
pub struct MatchedAssertion<'a> {
    pub call: CallSite<'a>,
    pub pattern: &'static PatternDefinition,
    pub actual: CallArgument<'a>,
    pub expected: CallArgument<'a>,
    pub tolerance: Option<CallArgument<'a>>,
    pub message: Option<CallArgument<'a>>,
    /// Trailing format arguments, in source order
    pub message_args: Vec<CallArgument<'a>>,
}

impl<'a> MatchedAssertion<'a> {
    /// Role assigned to each argument of the call, in source order
    pub fn roles(&self) -> Vec<Role> {
        (0..self.call.arguments.len())
            .filter_map(|i| self.pattern.role_at(i))
            .collect()
    }
}

/// Match a resolved call site against the catalog.
///
/// Returns None when the method is not a known legacy shape, when the number of
/// arguments does not fit the layout, or when the actual or expected argument is
/// missing from the tree (error recovery).
pub fn match_call(call: CallSite<'_>) -> Option<MatchedAssertion<'_>> {
    let pattern = catalog::lookup(&call.method)?;
    if !pattern.accepts_arity(call.arguments.len()) {
        return None;
    }

    let mut actual = None;
    let mut expected = None;
    let mut tolerance = None;
    let mut message = None;
    let mut message_args = Vec::new();
    for (position, argument) in call.arguments.iter().enumerate() {
        let slot = match pattern.role_at(position)? {
            Role::Actual => &mut actual,
            Role::Expected => &mut expected,
            Role::Tolerance => &mut tolerance,
            Role::Message => &mut message,
            Role::MessageArgs => {
                message_args.push(argument.clone());
                continue;
            }
        };
        *slot = Some(argument.clone());
    }

    let actual = actual.filter(is_present)?;
    let expected = expected.filter(is_present)?;
    Some(MatchedAssertion {
        call,
        pattern,
        actual,
        expected,
        tolerance,
        message,
        message_args,
    })
}

fn is_present(argument: &CallArgument<'_>) -> bool {
    let node = argument.expression;
    !node.is_missing() && !node.is_error() && node.start_byte() < node.end_byte()
}
