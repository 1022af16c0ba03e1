//! C# parser using tree-sitter

use anyhow::{Context, Result};
use tree_sitter::{Language, Parser, Tree};

/// Parser for C# files using tree-sitter
pub struct CSharpParser {
    parser: Parser,
}

impl CSharpParser {
    /// Create a new C# parser
    pub fn new() -> Result<Self> {
        let mut parser = Parser::new();
        parser
            .set_language(&Self::language())
            .context("Failed to set C# language")?;
        Ok(Self { parser })
    }

    /// Parse source code into a syntax tree
    pub fn parse(&mut self, source: &str) -> Result<Tree> {
        self.parser
            .parse(source, None)
            .context("Failed to parse C# source")
    }

    /// Get the tree-sitter language for C#
    pub fn language() -> Language {
        tree_sitter_c_sharp::LANGUAGE.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple() {
        let mut parser = CSharpParser::new().unwrap();
        let tree = parser.parse("class C { void M() { var x = 1; } }").unwrap();
        assert!(!tree.root_node().has_error());
    }

    #[test]
    fn test_parse_assertion() {
        let mut parser = CSharpParser::new().unwrap();
        let source = r#"
            public class Tests
            {
                [Test]
                public void Adds()
                {
                    ClassicAssert.AreEqual(2d, 3d, "id: {0}", x);
                    Assert.That(3d, Is.EqualTo(2d).Within(0.1d));
                }
            }
        "#;
        let tree = parser.parse(source).unwrap();
        assert!(!tree.root_node().has_error());
    }
}
