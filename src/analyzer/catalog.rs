//! Pattern catalog: the classic-model assertion shapes we know how to rewrite.
//!
//! Each entry names a legacy method, the declared parameter layout of one
//! overload family, and the role every argument position plays. The matcher
//! and the synthesizer are driven entirely by this table, so supporting a new
//! legacy shape means adding an entry here.

use super::call_site::MethodSignature;

/// Semantic purpose of one argument position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// The value under test; first argument of `Assert.That`
    Actual,
    /// The value the constraint is built from
    Expected,
    /// Numeric tolerance, rendered as `.Within(...)`
    Tolerance,
    /// Failure message (plain or composite format string)
    Message,
    /// Positional arguments for a composite format message; always the variadic suffix
    MessageArgs,
}

/// Legacy assertion families and the constraint each one maps to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssertFamily {
    AreEqual,
    AreNotEqual,
    AreSame,
    AreNotSame,
    Greater,
    GreaterOrEqual,
    Less,
    LessOrEqual,
    Contains,
    IsInstanceOf,
    IsNotInstanceOf,
    IsAssignableFrom,
}

impl AssertFamily {
    /// Name of the classic-model method
    pub fn method(&self) -> &'static str {
        match self {
            AssertFamily::AreEqual => "AreEqual",
            AssertFamily::AreNotEqual => "AreNotEqual",
            AssertFamily::AreSame => "AreSame",
            AssertFamily::AreNotSame => "AreNotSame",
            AssertFamily::Greater => "Greater",
            AssertFamily::GreaterOrEqual => "GreaterOrEqual",
            AssertFamily::Less => "Less",
            AssertFamily::LessOrEqual => "LessOrEqual",
            AssertFamily::Contains => "Contains",
            AssertFamily::IsInstanceOf => "IsInstanceOf",
            AssertFamily::IsNotInstanceOf => "IsNotInstanceOf",
            AssertFamily::IsAssignableFrom => "IsAssignableFrom",
        }
    }

    /// Constraint constructor the expected value is passed to
    pub fn constraint(&self) -> &'static str {
        match self {
            AssertFamily::AreEqual => "Is.EqualTo",
            AssertFamily::AreNotEqual => "Is.Not.EqualTo",
            AssertFamily::AreSame => "Is.SameAs",
            AssertFamily::AreNotSame => "Is.Not.SameAs",
            AssertFamily::Greater => "Is.GreaterThan",
            AssertFamily::GreaterOrEqual => "Is.GreaterThanOrEqualTo",
            AssertFamily::Less => "Is.LessThan",
            AssertFamily::LessOrEqual => "Is.LessThanOrEqualTo",
            AssertFamily::Contains => "Has.Member",
            AssertFamily::IsInstanceOf => "Is.InstanceOf",
            AssertFamily::IsNotInstanceOf => "Is.Not.InstanceOf",
            AssertFamily::IsAssignableFrom => "Is.AssignableFrom",
        }
    }
}

/// One recognized overload family of a legacy assertion
#[derive(Debug, PartialEq, Eq)]
pub struct PatternDefinition {
    pub family: AssertFamily,
    /// Declared parameter names of the overload, in order
    pub parameters: &'static [&'static str],
    /// Role of each declared parameter (same length as `parameters`)
    pub roles: &'static [Role],
}

impl PatternDefinition {
    /// Whether the last role collects any number of trailing arguments
    pub fn is_variadic(&self) -> bool {
        self.roles.last() == Some(&Role::MessageArgs)
    }

    /// Number of arguments that must be present
    pub fn required_arguments(&self) -> usize {
        if self.is_variadic() {
            self.roles.len() - 1
        } else {
            self.roles.len()
        }
    }

    /// Role of the argument at `position`, or None if the position is past the layout
    pub fn role_at(&self, position: usize) -> Option<Role> {
        match self.roles.get(position) {
            Some(role) => Some(*role),
            None if self.is_variadic() => Some(Role::MessageArgs),
            None => None,
        }
    }

    pub fn accepts_arity(&self, arguments: usize) -> bool {
        if self.is_variadic() {
            arguments >= self.required_arguments()
        } else {
            arguments == self.required_arguments()
        }
    }
}

use Role::*;

const EXPECTED_ACTUAL: &[&str] = &["expected", "actual"];
const EXPECTED_ACTUAL_MESSAGE: &[&str] = &["expected", "actual", "message", "args"];
const ARG1_ARG2: &[&str] = &["arg1", "arg2"];
const ARG1_ARG2_MESSAGE: &[&str] = &["arg1", "arg2", "message", "args"];

const EXPECTED_FIRST: &[Role] = &[Expected, Actual];
const EXPECTED_FIRST_MESSAGE: &[Role] = &[Expected, Actual, Message, MessageArgs];
const ACTUAL_FIRST: &[Role] = &[Actual, Expected];
const ACTUAL_FIRST_MESSAGE: &[Role] = &[Actual, Expected, Message, MessageArgs];

macro_rules! expected_actual_family {
    ($family:expr) => {
        [
            PatternDefinition {
                family: $family,
                parameters: EXPECTED_ACTUAL,
                roles: EXPECTED_FIRST,
            },
            PatternDefinition {
                family: $family,
                parameters: EXPECTED_ACTUAL_MESSAGE,
                roles: EXPECTED_FIRST_MESSAGE,
            },
        ]
    };
}

macro_rules! comparison_family {
    ($family:expr) => {
        [
            PatternDefinition {
                family: $family,
                parameters: ARG1_ARG2,
                roles: ACTUAL_FIRST,
            },
            PatternDefinition {
                family: $family,
                parameters: ARG1_ARG2_MESSAGE,
                roles: ACTUAL_FIRST_MESSAGE,
            },
        ]
    };
}

static EQUALITY: [PatternDefinition; 4] = [
    PatternDefinition {
        family: AssertFamily::AreEqual,
        parameters: EXPECTED_ACTUAL,
        roles: EXPECTED_FIRST,
    },
    PatternDefinition {
        family: AssertFamily::AreEqual,
        parameters: EXPECTED_ACTUAL_MESSAGE,
        roles: EXPECTED_FIRST_MESSAGE,
    },
    PatternDefinition {
        family: AssertFamily::AreEqual,
        parameters: &["expected", "actual", "delta"],
        roles: &[Expected, Actual, Tolerance],
    },
    PatternDefinition {
        family: AssertFamily::AreEqual,
        parameters: &["expected", "actual", "delta", "message", "args"],
        roles: &[Expected, Actual, Tolerance, Message, MessageArgs],
    },
];

static NOT_EQUAL: [PatternDefinition; 2] = expected_actual_family!(AssertFamily::AreNotEqual);
static SAME: [PatternDefinition; 2] = expected_actual_family!(AssertFamily::AreSame);
static NOT_SAME: [PatternDefinition; 2] = expected_actual_family!(AssertFamily::AreNotSame);
static CONTAINS: [PatternDefinition; 2] = expected_actual_family!(AssertFamily::Contains);
static INSTANCE_OF: [PatternDefinition; 2] = expected_actual_family!(AssertFamily::IsInstanceOf);
static NOT_INSTANCE_OF: [PatternDefinition; 2] =
    expected_actual_family!(AssertFamily::IsNotInstanceOf);
static ASSIGNABLE_FROM: [PatternDefinition; 2] =
    expected_actual_family!(AssertFamily::IsAssignableFrom);
static GREATER: [PatternDefinition; 2] = comparison_family!(AssertFamily::Greater);
static GREATER_OR_EQUAL: [PatternDefinition; 2] = comparison_family!(AssertFamily::GreaterOrEqual);
static LESS: [PatternDefinition; 2] = comparison_family!(AssertFamily::Less);
static LESS_OR_EQUAL: [PatternDefinition; 2] = comparison_family!(AssertFamily::LessOrEqual);

static CATALOG: [&[PatternDefinition]; 12] = [
    &EQUALITY,
    &NOT_EQUAL,
    &SAME,
    &NOT_SAME,
    &GREATER,
    &GREATER_OR_EQUAL,
    &LESS,
    &LESS_OR_EQUAL,
    &CONTAINS,
    &INSTANCE_OF,
    &NOT_INSTANCE_OF,
    &ASSIGNABLE_FROM,
];

/// Every pattern in the catalog
pub fn patterns() -> impl Iterator<Item = &'static PatternDefinition> {
    CATALOG.iter().flat_map(|family| family.iter())
}

/// Find the pattern for a resolved method: name and declared parameter names must match.
pub fn lookup(signature: &MethodSignature) -> Option<&'static PatternDefinition> {
    patterns().find(|p| {
        p.family.method() == signature.name
            && p.parameters.len() == signature.parameters.len()
            && p
                .parameters
                .iter()
                .zip(&signature.parameters)
                .all(|(expected, declared)| *expected == declared.name)
    })
}

#[cfg(test)]
mod tests {
    use super::Role::*;
    use super::*;
    use crate::analyzer::call_site::{Parameter, ParameterType};

    fn signature(name: &str, params: &[&str]) -> MethodSignature {
        MethodSignature {
            name: name.to_string(),
            declaring_type: "NUnit.Framework.Legacy.ClassicAssert".to_string(),
            parameters: params
                .iter()
                .map(|p| Parameter::new(p, ParameterType::Object))
                .collect(),
        }
    }

    #[test]
    fn every_layout_is_total_and_unambiguous() {
        for p in patterns() {
            assert_eq!(p.parameters.len(), p.roles.len(), "{:?}", p.family);
            assert_eq!(p.roles.iter().filter(|r| **r == Actual).count(), 1);
            assert_eq!(p.roles.iter().filter(|r| **r == Expected).count(), 1);
            assert!(p.roles.iter().filter(|r| **r == Tolerance).count() <= 1);
            if let Some(i) = p.roles.iter().position(|r| *r == MessageArgs) {
                assert_eq!(i, p.roles.len() - 1, "MessageArgs must be the suffix");
                assert_eq!(p.roles[i - 1], Message);
            }
        }
    }

    #[test]
    fn equality_family_has_all_shapes() {
        let shapes: Vec<_> = patterns()
            .filter(|p| p.family == AssertFamily::AreEqual)
            .collect();
        assert_eq!(shapes.len(), 4);
        // plain, message, message+params share two layouts; tolerance adds two more
        assert!(shapes[1].accepts_arity(3) && shapes[1].accepts_arity(5));
        assert!(shapes[3].accepts_arity(4) && shapes[3].accepts_arity(6));
        assert!(!shapes[2].accepts_arity(4));
    }

    #[test]
    fn lookup_by_declared_parameters() {
        let p = lookup(&signature("AreEqual", &["expected", "actual", "delta"])).unwrap();
        assert_eq!(p.roles, &[Expected, Actual, Tolerance]);

        let p = lookup(&signature("Greater", &["arg1", "arg2"])).unwrap();
        assert_eq!(p.role_at(0), Some(Actual));

        assert!(lookup(&signature("IsTrue", &["condition"])).is_none());
        assert!(lookup(&signature("AreEqual", &["expected"])).is_none());
    }

    #[test]
    fn variadic_roles_extend_past_layout() {
        let p = lookup(&signature("AreSame", &["expected", "actual", "message", "args"])).unwrap();
        assert_eq!(p.role_at(5), Some(MessageArgs));
        let p = lookup(&signature("AreSame", &["expected", "actual"])).unwrap();
        assert_eq!(p.role_at(2), None);
    }
}
