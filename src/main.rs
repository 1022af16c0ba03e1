//! Constrain: classic-to-constraint assertion migrator CLI

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use constrain::analyzer::{descriptors, AnalysisEngine};
use constrain::cache::{settings_fingerprint, AnalysisCache};
use constrain::config::{
    build_ignore_set, find_project_root, is_build_output, is_ignored, load_config, Config,
    FailOn, CONFIG_FILENAME,
};
use constrain::fixer::{apply_fixes, FixOutcome};
use constrain::reporter::{ConsoleReporter, JsonReporter, SarifReporter};
use constrain::watcher::SourceWatcher;
use constrain::{AnalysisResult, Fix};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

/// Nested legacy asserts need one pass per nesting level
const MAX_FIX_PASSES: usize = 8;

/// Constrain: move NUnit classic-model asserts to the constraint model
#[derive(Parser, Debug)]
#[command(name = "constrain")]
#[command(author, version, about, long_about = None)]
#[command(args_conflicts_with_subcommands = true, subcommand_negates_reqs = true)]
struct Args {
    #[command(subcommand)]
    command: Option<Commands>,

    /// C# file or directory to analyze (omit when using a subcommand)
    #[arg(required = true)]
    path: Option<PathBuf>,

    /// Output format as JSON
    #[arg(long, short)]
    json: bool,

    /// Output in SARIF format (for GitHub Code Scanning)
    #[arg(long)]
    sarif: bool,

    /// Rewrite legacy assertions in place
    #[arg(long)]
    fix: bool,

    /// With --fix: show the rewrites without touching any file
    #[arg(long, requires = "fix")]
    dry_run: bool,

    /// Lowest severity that makes the run exit with 1 (error, warning, info, never)
    #[arg(long, value_name = "LEVEL")]
    fail_on: Option<FailOn>,

    /// Quiet mode (one line per diagnostic)
    #[arg(long, short)]
    quiet: bool,

    /// Verbose output
    #[arg(long, short)]
    verbose: bool,

    /// Path to config file (default: search .constrainrc.json in current dir and parents)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Watch for file changes and re-analyze
    #[arg(long)]
    watch: bool,

    /// Disable caching (re-analyze all files even if unchanged)
    #[arg(long)]
    no_cache: bool,

    /// Clear the analysis cache before running
    #[arg(long)]
    clear_cache: bool,

    /// Run analysis in parallel (default for directories with many files)
    #[arg(long)]
    parallel: bool,

    /// Number of parallel threads (default: number of CPU cores)
    #[arg(long, value_name = "N")]
    jobs: Option<usize>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create .constrainrc.json with sensible defaults
    Init {
        /// Lowest severity that fails the run (error, warning, info, never)
        #[arg(long, value_name = "LEVEL")]
        fail_on: Option<FailOn>,

        /// Directory in which to create config (default: current)
        #[arg(long)]
        dir: Option<PathBuf>,
    },

    /// List the rules and their default severities
    Rules {
        /// Output format as JSON
        #[arg(long, short)]
        json: bool,
    },
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", "Error".red().bold(), e);
            ExitCode::from(2)
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("CONSTRAIN_LOG")
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn run() -> Result<ExitCode> {
    let args = Args::parse();
    init_tracing(args.verbose);

    if let Some(cmd) = &args.command {
        return match cmd {
            Commands::Init { fail_on, dir } => run_init(*fail_on, dir.as_deref()),
            Commands::Rules { json } => run_rules(*json),
        };
    }

    let Some(path) = args.path.clone() else {
        anyhow::bail!("a path is required when not using a subcommand");
    };

    if args.watch {
        return run_watch(&args, &path);
    }

    let work_dir = work_dir_of(&path);
    let config = load_config(work_dir, args.config.as_deref())?.merge_with_cli(args.fail_on);

    let ignore_set = if config.ignore.is_empty() {
        None
    } else {
        Some(build_ignore_set(&config.ignore)?)
    };

    let file_patterns = config.get_file_patterns();
    let files = collect_source_files(&path, ignore_set.as_ref(), &file_patterns)?;

    if files.is_empty() {
        eprintln!("{}: No C# files found", "Warning".yellow());
        return Ok(ExitCode::from(2));
    }

    // Set up cache
    let project_root = find_project_root(work_dir).unwrap_or_else(|| work_dir.to_path_buf());
    let mut cache = if args.no_cache {
        AnalysisCache::disabled()
    } else {
        AnalysisCache::new(&project_root).with_settings(&settings_fingerprint(&config))
    };

    if args.clear_cache {
        cache.clear();
        if !args.quiet {
            eprintln!("{}: Cache cleared", "Info".blue());
        }
    }

    if let Some(jobs) = args.jobs {
        rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build_global()
            .ok();
    }

    let engine = AnalysisEngine::new();
    let mut had_errors = false;

    // Rewrite first so the report reflects what is left
    if args.fix && !args.dry_run {
        let (applied, files_changed, fix_errors) =
            fix_files(&engine, &files, &config, args.quiet);
        had_errors |= fix_errors;
        if !args.quiet && !args.json && !args.sarif {
            eprintln!(
                "{}: Applied {} fix(es) in {} file(s)",
                "Info".blue(),
                applied,
                files_changed
            );
        }
    }

    let use_parallel = args.parallel || files.len() > 10;

    let (results, analyze_errors) = if use_parallel {
        analyze_files_parallel_cached(&engine, &files, &config, &cache, args.quiet)
    } else {
        analyze_files_sequential_cached(&engine, &files, &config, &mut cache, args.quiet)
    };
    had_errors |= analyze_errors;

    if use_parallel && !args.no_cache {
        for result in &results {
            if let Ok(content) = std::fs::read_to_string(&result.file_path) {
                cache.set(&result.file_path, &content, result.clone());
            }
        }
    }
    if path.is_dir() {
        cache.cleanup(&files);
    }

    if let Err(e) = cache.save() {
        if !args.quiet {
            eprintln!("{}: Failed to save cache: {}", "Warning".yellow(), e);
        }
    }

    if results.is_empty() {
        eprintln!("{}: All files failed to analyze", "Error".red());
        return Ok(ExitCode::from(2));
    }

    let stats = AnalysisEngine::aggregate_stats(&results);

    if args.sarif {
        println!("{}", SarifReporter::new().report(&results, Some(&stats)));
    } else if args.json {
        let reporter = JsonReporter::new().pretty();
        if results.len() == 1 {
            println!("{}", reporter.report(&results[0]));
        } else {
            println!("{}", reporter.report_with_summary(&results, &stats));
        }
    } else if args.dry_run {
        let reporter = ConsoleReporter::new();
        for result in &results {
            let fixes: Vec<Fix> = result.fixable().filter_map(|d| d.fix.clone()).collect();
            reporter.print_fix_preview(&result.file_path, &fixes);
        }
        if !args.quiet {
            eprintln!(
                "{}: {} fix(es) available, no files written (--dry-run)",
                "Info".blue(),
                stats.fixable
            );
        }
    } else if args.quiet {
        let reporter = ConsoleReporter::new();
        for result in &results {
            reporter.report_quiet(result);
        }
    } else {
        let mut reporter = ConsoleReporter::new();
        if args.verbose {
            reporter = reporter.verbose();
        }
        if results.len() == 1 {
            reporter.report(&results[0]);
        } else {
            reporter.report_many(&results, &stats);
        }
    }

    if had_errors {
        return Ok(ExitCode::from(2));
    }

    let fail_on = config.get_fail_on();
    let failing = results
        .iter()
        .flat_map(|r| r.diagnostics.iter())
        .filter(|d| fail_on.is_triggered_by(d.severity))
        .count();
    if failing > 0 {
        if !args.quiet && !args.json && !args.sarif {
            eprintln!(
                "\n{}: {} diagnostic(s) at or above '{}'",
                "Failed".red().bold(),
                failing,
                fail_on_label(fail_on)
            );
        }
        return Ok(ExitCode::from(1));
    }

    Ok(ExitCode::SUCCESS)
}

fn work_dir_of(path: &Path) -> &Path {
    if path.is_file() {
        path.parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."))
    } else {
        path
    }
}

fn fail_on_label(fail_on: FailOn) -> &'static str {
    match fail_on {
        FailOn::Error => "error",
        FailOn::Warning => "warning",
        FailOn::Info => "info",
        FailOn::Never => "never",
    }
}

fn run_init(fail_on: Option<FailOn>, dir: Option<&Path>) -> Result<ExitCode> {
    let cwd = std::env::current_dir().context("Failed to get current directory")?;
    let dir = dir.unwrap_or(&cwd);
    let config_path = dir.join(CONFIG_FILENAME);

    if config_path.exists() {
        eprintln!(
            "{}: {} already exists; use --dir to write elsewhere or remove it first",
            "Warning".yellow(),
            config_path.display()
        );
        return Ok(ExitCode::SUCCESS);
    }

    let fail_on_value = fail_on_label(fail_on.unwrap_or_default());

    let json = format!(
        r#"{{
  "failOn": "{}",
  "rules": {{
    "legacy-assert-usage": "warning",
    "same-actual-expected-value": "warning"
  }},
  "ignore": [
    "**/*.g.cs",
    "**/*.Designer.cs"
  ],
  "filePatterns": [".cs"],
  "legacyReceivers": ["ClassicAssert", "Assert"],
  "overrides": []
}}
"#,
        fail_on_value
    );

    std::fs::write(&config_path, json)
        .with_context(|| format!("Failed to write config to {}", config_path.display()))?;

    println!(
        "{}: Created {} with failOn={}",
        "Done".green().bold(),
        config_path.display(),
        fail_on_value
    );
    Ok(ExitCode::SUCCESS)
}

fn run_rules(json: bool) -> Result<ExitCode> {
    let registry = descriptors::all();
    if json {
        let rules: Vec<serde_json::Value> = registry
            .iter()
            .map(|d| {
                serde_json::json!({
                    "id": d.id,
                    "title": d.title,
                    "category": d.category,
                    "defaultSeverity": d.default_severity.to_string(),
                    "message": d.message_format,
                    "description": d.description,
                })
            })
            .collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&rules).context("Failed to serialize rules")?
        );
        return Ok(ExitCode::SUCCESS);
    }

    for d in registry {
        println!(
            "{}  {}  {}",
            d.id.bold(),
            format!("[{}]", d.default_severity).dimmed(),
            d.title
        );
        println!("    {}", d.description);
    }
    Ok(ExitCode::SUCCESS)
}

fn run_watch(args: &Args, path: &Path) -> Result<ExitCode> {
    let work_dir = work_dir_of(path);
    let config = load_config(work_dir, args.config.as_deref())?.merge_with_cli(args.fail_on);
    let ignore_set = if config.ignore.is_empty() {
        None
    } else {
        Some(build_ignore_set(&config.ignore)?)
    };

    let engine = AnalysisEngine::new();
    let watcher = SourceWatcher::watch(path, &config.get_file_patterns())
        .context("Failed to create file watcher")?;
    eprintln!("{}: Watching for changes... (Ctrl+C to stop)", "Info".blue());

    loop {
        let paths = watcher.next_changes();
        if paths.is_empty() {
            continue;
        }
        let filtered: Vec<PathBuf> = paths
            .into_iter()
            .filter(|p| {
                ignore_set
                    .as_ref()
                    .map(|set| !is_ignored(p, set))
                    .unwrap_or(true)
            })
            .collect();
        for path in filtered {
            if args.fix && !args.dry_run {
                if let Err(e) = fix_until_stable(&engine, &path, &config) {
                    eprintln!("{}: {}: {:#}", "Error".red(), path.display(), e);
                    continue;
                }
            }
            match engine.analyze(&path, Some(&config)) {
                Ok(result) => {
                    if args.quiet {
                        ConsoleReporter::new().report_quiet(&result);
                    } else {
                        ConsoleReporter::new().report(&result);
                    }
                }
                Err(e) => {
                    eprintln!("{}: {}: {:#}", "Error".red(), path.display(), e);
                }
            }
        }
    }
}

/// Collect C# files under a path, honoring file patterns, ignore globs and build output dirs
fn collect_source_files(
    path: &Path,
    ignore_set: Option<&globset::GlobSet>,
    file_patterns: &[&str],
) -> Result<Vec<PathBuf>> {
    if path.is_file() {
        if let Some(set) = ignore_set {
            if is_ignored(path, set) {
                return Ok(vec![]);
            }
        }
        return Ok(vec![path.to_path_buf()]);
    }

    if !path.is_dir() {
        anyhow::bail!("Path does not exist: {}", path.display());
    }

    let mut files = Vec::new();

    for entry in WalkDir::new(path)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let file_path = entry.path();
        if !entry.file_type().is_file() || !is_source_file(file_path, file_patterns) {
            continue;
        }
        if let Some(set) = ignore_set {
            if is_ignored(file_path, set) {
                continue;
            }
        }
        files.push(file_path.to_path_buf());
    }

    files.sort();

    Ok(files)
}

fn is_source_file(path: &Path, file_patterns: &[&str]) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    if is_build_output(path) {
        return false;
    }
    file_patterns.iter().any(|p| name.ends_with(p))
}

/// Apply fixes to one file until no fix is left or none could be applied
fn fix_until_stable(engine: &AnalysisEngine, path: &Path, config: &Config) -> Result<usize> {
    let mut total = 0;
    for pass in 0..MAX_FIX_PASSES {
        let result = engine.analyze(path, Some(config))?;
        let fixes: Vec<Fix> = result.fixable().filter_map(|d| d.fix.clone()).collect();
        if fixes.is_empty() {
            break;
        }
        let FixOutcome {
            applied, skipped, ..
        } = apply_fixes(path, &fixes)
            .with_context(|| format!("Failed to write fixes to {}", path.display()))?;
        tracing::debug!(
            "fix pass {} on {}: {} applied, {} deferred",
            pass + 1,
            path.display(),
            applied,
            skipped
        );
        total += applied;
        if skipped == 0 || applied == 0 {
            break;
        }
    }
    Ok(total)
}

/// Fix every file; returns (fixes applied, files changed, had errors)
fn fix_files(
    engine: &AnalysisEngine,
    files: &[PathBuf],
    config: &Config,
    quiet: bool,
) -> (usize, usize, bool) {
    let mut applied = 0;
    let mut files_changed = 0;
    let mut had_errors = false;

    for file in files {
        match fix_until_stable(engine, file, config) {
            Ok(0) => {}
            Ok(n) => {
                applied += n;
                files_changed += 1;
            }
            Err(e) => {
                if !quiet {
                    eprintln!(
                        "{}: Failed to fix {}: {:#}",
                        "Error".red(),
                        file.display(),
                        e
                    );
                }
                had_errors = true;
            }
        }
    }

    (applied, files_changed, had_errors)
}

/// Analyze files sequentially with caching
fn analyze_files_sequential_cached(
    engine: &AnalysisEngine,
    files: &[PathBuf],
    config: &Config,
    cache: &mut AnalysisCache,
    quiet: bool,
) -> (Vec<AnalysisResult>, bool) {
    let mut results = Vec::new();
    let mut had_errors = false;
    let mut cache_hits = 0;

    for file in files {
        let content = std::fs::read_to_string(file).ok();

        if let Some(ref content) = content {
            if let Some(cached) = cache.get(file, content) {
                results.push(cached);
                cache_hits += 1;
                continue;
            }
        }

        let analyzed = match content {
            Some(ref content) => engine.analyze_source(content, file, Some(config)),
            None => engine.analyze(file, Some(config)),
        };
        match analyzed {
            Ok(result) => {
                if let Some(ref content) = content {
                    cache.set(file, content, result.clone());
                }
                results.push(result);
            }
            Err(e) => {
                if !quiet {
                    eprintln!(
                        "{}: Failed to analyze {}: {:#}",
                        "Error".red(),
                        file.display(),
                        e
                    );
                }
                had_errors = true;
            }
        }
    }

    if !quiet && cache_hits > 0 {
        eprintln!(
            "{}: {} files from cache, {} analyzed",
            "Cache".blue(),
            cache_hits,
            files.len() - cache_hits
        );
    }

    (results, had_errors)
}

/// Analyze files in parallel, reading the cache from every worker
fn analyze_files_parallel_cached(
    engine: &AnalysisEngine,
    files: &[PathBuf],
    config: &Config,
    cache: &AnalysisCache,
    quiet: bool,
) -> (Vec<AnalysisResult>, bool) {
    use rayon::prelude::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    let had_errors = AtomicBool::new(false);
    let cache_hits = AtomicUsize::new(0);

    let results: Vec<_> = files
        .par_iter()
        .filter_map(|file| {
            if let Ok(content) = std::fs::read_to_string(file) {
                if let Some(cached) = cache.get(file, &content) {
                    cache_hits.fetch_add(1, Ordering::Relaxed);
                    return Some(cached);
                }
            }

            match engine.analyze(file, Some(config)) {
                Ok(result) => Some(result),
                Err(e) => {
                    had_errors.store(true, Ordering::Relaxed);
                    if !quiet {
                        eprintln!(
                            "{}: Failed to analyze {}: {:#}",
                            "Error".red(),
                            file.display(),
                            e
                        );
                    }
                    None
                }
            }
        })
        .collect();

    let hits = cache_hits.load(Ordering::Relaxed);
    if !quiet && hits > 0 {
        eprintln!(
            "{}: {} files from cache, {} analyzed",
            "Cache".blue(),
            hits,
            files.len() - hits
        );
    }

    (results, had_errors.load(Ordering::Relaxed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_source_file() {
        let patterns = [".cs"];
        assert!(is_source_file(Path::new("Tests/MathTests.cs"), &patterns));
        assert!(!is_source_file(Path::new("Tests/Tests.csproj"), &patterns));
        assert!(!is_source_file(Path::new("Tests/obj/Debug/Gen.cs"), &patterns));
    }

    #[test]
    fn test_is_source_file_custom_patterns() {
        let patterns = ["Tests.cs", "Specs.cs"];
        assert!(is_source_file(Path::new("MathTests.cs"), &patterns));
        assert!(is_source_file(Path::new("ParserSpecs.cs"), &patterns));
        assert!(!is_source_file(Path::new("Parser.cs"), &patterns));
    }

    #[test]
    fn test_work_dir_of_bare_file_name() {
        let dir = tempfile::TempDir::new().unwrap();
        assert_eq!(work_dir_of(dir.path()), dir.path());
    }
}
