//! Analyzer module - assertion matching and rule engine

pub mod call_site;
pub mod catalog;
pub mod descriptors;
pub mod engine;
pub mod equivalence;
pub mod matcher;
pub mod resolver;
pub mod rules;

pub use call_site::{CallSite, MethodSignature, SymbolResolver};
pub use engine::{AggregateStats, AnalysisEngine};
pub use matcher::{match_call, MatchedAssertion};
pub use resolver::ClassicAssertResolver;
