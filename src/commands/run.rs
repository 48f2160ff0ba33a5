// src/commands/run.rs

use anyhow::{Context, Result, bail};
use colored::*;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::signal;
use tokio_util::sync::CancellationToken;

use crate::core::config::{TestSuite, load_test_suite};
use crate::core::models::SuiteReport;
use crate::core::runner::{RunOptions, Runner};
use crate::infra::{fs, t};
use crate::reporting::{generate_html_report, print_report, write_json_report};

/// Options of the `run` subcommand. Command-line values override the suite file.
#[derive(Debug, Clone, Default)]
pub struct RunArgs {
    pub config: PathBuf,
    pub binary: Option<String>,
    pub timeout_secs: Option<u64>,
    pub buffer_capacity: Option<usize>,
    pub html: Option<PathBuf>,
    pub json: Option<PathBuf>,
    /// Language given with `--lang`; otherwise the suite's `language` applies.
    pub language: Option<String>,
}

pub async fn execute(args: RunArgs) -> Result<()> {
    let suite = load_test_suite(&args.config)?;
    let locale = args.language.clone().unwrap_or_else(|| suite.language.clone());
    rust_i18n::set_locale(&locale);

    println!(
        "{}",
        t!("loading_suite", locale = locale, path = args.config.display())
    );

    let base_dir = fs::parent_dir(&args.config);
    let binary = resolve_program(&args, &suite, &base_dir, &locale)?;
    println!(
        "{}",
        t!("program_under_test", locale = locale, path = binary.display().to_string().yellow())
    );

    let cases = suite.to_test_cases(&base_dir)?;
    if cases.is_empty() {
        println!("{}", t!("no_cases_to_run", locale = locale).green());
        return Ok(());
    }

    let cancel = setup_signal_handler(&locale);
    let options = RunOptions {
        buffer_capacity: args.buffer_capacity.unwrap_or(suite.buffer_capacity),
        default_timeout: args
            .timeout_secs
            .map(Duration::from_secs)
            .or_else(|| suite.default_timeout()),
        cancel: Some(cancel),
        ..RunOptions::default()
    };

    println!(
        "{}",
        t!("launching_tests", locale = locale, count = cases.len()).bold()
    );

    // The engine blocks on its readiness loop; keep it off the async workers.
    let runner = Runner::new(binary).with_options(options);
    let report = tokio::task::spawn_blocking(move || runner.run(&cases))
        .await
        .with_context(|| t!("engine_task_failed", locale = locale).to_string())??;

    println!();
    print_report(&report, &locale);
    write_reports(&report, &args, &locale);

    if report.all_passed() {
        println!("\n{}", t!("all_tests_passed", locale = locale).green().bold());
        Ok(())
    } else {
        bail!(t!(
            "suite_failed",
            locale = locale,
            failed = report.failed_count(),
            total = report.total()
        )
        .to_string())
    }
}

fn resolve_program(
    args: &RunArgs,
    suite: &TestSuite,
    base_dir: &Path,
    locale: &str,
) -> Result<PathBuf> {
    match (&args.binary, &suite.binary) {
        // A path given on the command line is relative to the working directory.
        (Some(raw), _) => fs::resolve_binary(raw, Path::new(".")),
        (None, Some(raw)) => fs::resolve_binary(raw, base_dir),
        (None, None) => bail!(t!("no_binary", locale = locale).to_string()),
    }
}

/// Report files are a convenience: failing to write one is reported but does
/// not change the outcome of the run.
fn write_reports(report: &SuiteReport, args: &RunArgs, locale: &str) {
    if let Some(path) = &args.html {
        println!(
            "\n{}",
            t!("writing_html_report", locale = locale, path = path.display())
        );
        if let Err(e) = generate_html_report(report, path, locale) {
            eprintln!("{} {:#}", t!("report_write_failed", locale = locale).red(), e);
        }
    }
    if let Some(path) = &args.json {
        println!(
            "\n{}",
            t!("writing_json_report", locale = locale, path = path.display())
        );
        if let Err(e) = write_json_report(report, path) {
            eprintln!("{} {:#}", t!("report_write_failed", locale = locale).red(), e);
        }
    }
}

fn setup_signal_handler(locale: &str) -> CancellationToken {
    let token = CancellationToken::new();
    let token_clone = token.clone();
    let locale = locale.to_string();

    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            println!("\n{}", t!("shutdown_signal", locale = &locale).yellow());
            token_clone.cancel();
        }
    });

    token
}
