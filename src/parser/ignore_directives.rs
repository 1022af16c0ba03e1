//! Parse constrain-ignore comment directives from source

use crate::Rule;
use std::collections::{HashMap, HashSet};

/// Directive for which rules are ignored on a given line
#[derive(Debug, Clone)]
pub enum LineIgnoreSet {
    /// Ignore all rules on this line
    All,
    /// Ignore only these rules
    Rules(HashSet<Rule>),
}

/// Parsed ignore directives from a file
#[derive(Debug, Default)]
pub struct IgnoreDirectives {
    /// Per-line: which rules to ignore (line is 1-indexed)
    line_rules: HashMap<usize, LineIgnoreSet>,
    /// Ranges (start_line, end_line) where all rules are disabled (1-indexed, inclusive)
    disabled_ranges: Vec<(usize, usize)>,
}

impl IgnoreDirectives {
    /// Check if a diagnostic at the given line and rule should be ignored
    pub fn is_ignored(&self, line: usize, rule: Rule) -> bool {
        if let Some(set) = self.line_rules.get(&line) {
            return match set {
                LineIgnoreSet::All => true,
                LineIgnoreSet::Rules(r) => r.contains(&rule),
            };
        }
        self.disabled_ranges
            .iter()
            .any(|(start, end)| line >= *start && line <= *end)
    }

    /// Parse source code for constrain-ignore comments
    pub fn parse(source: &str) -> Self {
        let mut line_rules: HashMap<usize, LineIgnoreSet> = HashMap::new();
        let mut disabled_ranges: Vec<(usize, usize)> = Vec::new();
        let mut disable_start: Option<usize> = None;

        for (zero_indexed, line) in source.lines().enumerate() {
            let line_no = zero_indexed + 1;
            let line = line.trim();

            // Single-line: // constrain-ignore-next-line [rule-id]
            if let Some(idx) = line.find("constrain-ignore-next-line") {
                let rest = &line[idx + "constrain-ignore-next-line".len()..];
                line_rules.insert(line_no + 1, ignore_set(rest));
            } else if let Some(idx) = line.find("constrain-ignore") {
                // Single-line: ... constrain-ignore [rule-id] ... (anywhere in line)
                let rest = &line[idx + "constrain-ignore".len()..];
                line_rules.insert(line_no, ignore_set(rest));
            }

            // Block: /* constrain-disable */ ... /* constrain-enable */
            if line.contains("constrain-disable") {
                disable_start = Some(line_no);
            }
            if line.contains("constrain-enable") {
                if let Some(start) = disable_start.take() {
                    disabled_ranges.push((start, line_no));
                }
            }
        }

        // If we never saw constrain-enable, ignore from disable to end of file
        if let Some(start) = disable_start {
            let end = source.lines().count().max(1);
            disabled_ranges.push((start, end));
        }

        Self {
            line_rules,
            disabled_ranges,
        }
    }
}

fn ignore_set(rest: &str) -> LineIgnoreSet {
    let rest = rest
        .trim_start()
        .trim_end()
        .trim_end_matches('/')
        .trim_end_matches('*');
    let rules = parse_rule_list(rest);
    if rules.is_empty() {
        LineIgnoreSet::All
    } else {
        LineIgnoreSet::Rules(rules)
    }
}

fn parse_rule_list(s: &str) -> HashSet<Rule> {
    s.split_whitespace()
        .filter_map(|word| Rule::from_id(word.trim_matches(',')))
        .collect()
}
