// SPDX-FileCopyrightText: 2026 Packshot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `packshot doctor` command implementation.
//!
//! Asks each adapter for its health and summarizes the studio, without
//! sending a billed generation request.

use std::time::{Duration, Instant};

use colored::Colorize;
use packshot_core::types::HealthStatus;
use packshot_core::{PackshotError, PluginAdapter};
use packshot_gemini::GeminiProvider;

use crate::app::App;

/// Status of a diagnostic check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    Pass,
    Warn,
    Fail,
}

/// Result of a single diagnostic check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub duration: Duration,
}

/// Runs every check and prints the report. Returns the number of failures.
pub async fn run_doctor(app: &App) -> Result<usize, PackshotError> {
    let mut results = vec![check_adapter(app.store().as_ref()).await];

    let provider = GeminiProvider::new(&app.config.provider)?;
    let mut provider_check = check_adapter(&provider).await;
    if provider_check.status == CheckStatus::Warn && !app.config.generation.api_key.trim().is_empty()
    {
        provider_check.status = CheckStatus::Pass;
        provider_check.message = "API key set in [generation]".into();
    }
    results.push(provider_check);
    results.push(check_catalog(app).await);

    print_results(&results);
    Ok(results
        .iter()
        .filter(|r| r.status == CheckStatus::Fail)
        .count())
}

/// Calls `health_check` on one adapter and times it.
pub async fn check_adapter(adapter: &dyn PluginAdapter) -> CheckResult {
    let start = Instant::now();
    let health = adapter.health_check().await;
    let name = format!("{} ({})", adapter.name(), adapter.adapter_type());
    let version = adapter.version();
    let (status, message) = match health {
        Ok(HealthStatus::Healthy) => (CheckStatus::Pass, format!("healthy, v{version}")),
        Ok(HealthStatus::Degraded(reason)) => (CheckStatus::Warn, reason),
        Ok(HealthStatus::Unhealthy(reason)) => (CheckStatus::Fail, reason),
        Err(e) => (CheckStatus::Fail, e.to_string()),
    };
    CheckResult {
        name,
        status,
        message,
        duration: start.elapsed(),
    }
}

async fn check_catalog(app: &App) -> CheckResult {
    let start = Instant::now();
    let (stats, has_logo) = app
        .studio
        .read(|s| (s.stats(), s.active_logo.is_some()))
        .await;
    let logo = if has_logo { "logo active" } else { "no logo" };
    let message = format!(
        "{} items, {} completed, {} failed, {logo}",
        stats.total, stats.completed, stats.failed
    );
    let status = if stats.failed > 0 {
        CheckStatus::Warn
    } else {
        CheckStatus::Pass
    };
    CheckResult {
        name: "catalog".into(),
        status,
        message,
        duration: start.elapsed(),
    }
}

fn print_results(results: &[CheckResult]) {
    let use_color = colored::control::SHOULD_COLORIZE.should_colorize();

    println!();
    println!("  packshot doctor");
    println!("  {}", "-".repeat(50));
    for result in results {
        let duration_ms = result.duration.as_millis();
        let symbol = match (result.status, use_color) {
            (CheckStatus::Pass, true) => "✓".green().to_string(),
            (CheckStatus::Warn, true) => "!".yellow().to_string(),
            (CheckStatus::Fail, true) => "✗".red().to_string(),
            (CheckStatus::Pass, false) => "[OK]  ".to_string(),
            (CheckStatus::Warn, false) => "[WARN]".to_string(),
            (CheckStatus::Fail, false) => "[FAIL]".to_string(),
        };
        println!(
            "    {symbol} {:<24} {} ({duration_ms}ms)",
            result.name, result.message
        );
    }
    println!();

    let issues = results
        .iter()
        .filter(|r| r.status != CheckStatus::Pass)
        .count();
    match issues {
        0 => println!("  All checks passed."),
        1 => println!("  1 issue found."),
        n => println!("  {n} issues found."),
    }
}
