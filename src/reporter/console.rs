//! Console reporter with colored output

use crate::analyzer::engine::AggregateStats;
use crate::{AnalysisResult, Diagnostic, Fix, Severity};
use colored::Colorize;
use std::path::Path;

/// Reporter for terminal output
pub struct ConsoleReporter {
    /// Whether to use colors
    use_colors: bool,
    /// Whether to show verbose output
    verbose: bool,
}

impl ConsoleReporter {
    /// Create a new console reporter
    pub fn new() -> Self {
        Self {
            use_colors: true,
            verbose: false,
        }
    }

    /// Disable colors
    pub fn without_colors(mut self) -> Self {
        self.use_colors = false;
        self
    }

    /// Enable verbose output
    pub fn verbose(mut self) -> Self {
        self.verbose = true;
        self
    }

    /// Report a single analysis result
    pub fn report(&self, result: &AnalysisResult) {
        self.print_header(result);

        if result.diagnostics.is_empty() {
            println!("   {}", self.paint_ok("No legacy assertions found"));
        } else {
            self.print_diagnostics(result);
        }
        println!();
    }

    /// Report multiple results with summary
    pub fn report_many(&self, results: &[AnalysisResult], stats: &AggregateStats) {
        for result in results {
            // clean files are only listed in verbose mode
            if result.diagnostics.is_empty() && !self.verbose {
                continue;
            }
            self.report(result);
        }

        self.print_summary(stats);
    }

    /// Report in quiet mode: one compiler-style line per diagnostic
    pub fn report_quiet(&self, result: &AnalysisResult) {
        for d in &result.diagnostics {
            println!(
                "{}:{}:{}: {} [{}] {}",
                result.file_path.display(),
                d.location.line,
                d.location.column,
                d.severity,
                d.rule,
                d.message
            );
        }
    }

    /// Print the edits a `--fix --dry-run` would make to one file
    pub fn print_fix_preview(&self, path: &Path, fixes: &[Fix]) {
        if fixes.is_empty() {
            return;
        }
        println!("{}", path.display().to_string().bold());
        for fix in fixes {
            println!(
                "   {} L{}:{} {}",
                "~".cyan(),
                fix.start_line,
                fix.start_column,
                fix.title.dimmed()
            );
            for line in fix.replacement.lines() {
                println!("     {} {}", "+".green(), line);
            }
        }
        println!();
    }

    fn print_header(&self, result: &AnalysisResult) {
        println!();
        println!(
            "{}",
            format!("Assertion scan: {}", result.file_path.display()).bold()
        );
        println!(
            "   Invocations: {} | Classic asserts: {} | Constraint asserts: {} | Fixable: {}",
            result.stats.invocations,
            result.stats.legacy_assertions,
            result.stats.constraint_assertions,
            result.stats.fixable
        );
        if result.stats.has_syntax_errors {
            println!(
                "   {}",
                "Syntax errors present; affected calls were skipped".yellow()
            );
        }
        println!();
    }

    fn print_diagnostics(&self, result: &AnalysisResult) {
        println!("   {}", "Diagnostics:".bold());

        let mut ordered: Vec<&Diagnostic> = result.diagnostics.iter().collect();
        ordered.sort_by(|a, b| {
            b.severity
                .cmp(&a.severity)
                .then_with(|| a.location.start_byte.cmp(&b.location.start_byte))
        });

        let infos = ordered
            .iter()
            .filter(|d| d.severity == Severity::Info)
            .count();
        for d in ordered {
            // Only show info diagnostics in verbose mode or if there are few in total
            if d.severity == Severity::Info && !self.verbose && result.diagnostics.len() > 5 {
                continue;
            }
            self.print_diagnostic(d);
        }
        if infos > 0 && !self.verbose && result.diagnostics.len() > 5 {
            println!(
                "   {} {} info diagnostics hidden (use --verbose to show)",
                "i".blue(),
                infos
            );
        }
    }

    fn print_diagnostic(&self, d: &Diagnostic) {
        let icon = match d.severity {
            Severity::Error => "x".red(),
            Severity::Warning => "!".yellow(),
            Severity::Info => "i".blue(),
        };

        let location = format!("L{}:{}", d.location.line, d.location.column);
        println!(
            "   {} {} [{}] {}",
            icon,
            location.dimmed(),
            d.rule.to_string().dimmed(),
            d.message
        );

        match (&d.fix, &d.suggestion) {
            (Some(fix), _) if self.verbose => {
                println!("       {} {}", "->".dimmed(), fix.title.italic());
                for line in fix.replacement.lines() {
                    println!("          {}", line.green());
                }
            }
            (Some(fix), _) => {
                println!("       {} {} (--fix)", "->".dimmed(), fix.title.italic());
            }
            (None, Some(suggestion)) => {
                println!(
                    "       {} {} {}",
                    "->".dimmed(),
                    suggestion.italic(),
                    "(manual: message cannot be converted)".dimmed()
                );
            }
            (None, None) => {}
        }
    }

    fn print_summary(&self, stats: &AggregateStats) {
        println!();
        println!("{}", "=".repeat(60));
        println!("{}", "Summary".bold());
        println!("{}", "=".repeat(60));
        println!(
            "   Files analyzed:   {}",
            stats.files_analyzed.to_string().bold()
        );
        println!("   Classic asserts:  {}", stats.legacy_assertions);
        println!("   Diagnostics:      {}", stats.total_diagnostics);
        println!("   Auto-fixable:     {}", stats.fixable);
        println!();
    }

    fn paint_ok(&self, text: &str) -> String {
        if self.use_colors {
            text.green().to_string()
        } else {
            text.to_string()
        }
    }
}

impl Default for ConsoleReporter {
    fn default() -> Self {
        Self::new()
    }
}
