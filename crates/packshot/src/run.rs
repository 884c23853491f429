// SPDX-FileCopyrightText: 2026 Packshot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `packshot run` and `packshot generate` command implementations.

use std::process::ExitCode;
use std::sync::Arc;

use colored::Colorize;
use packshot_core::PackshotError;
use packshot_core::types::ItemStatus;
use packshot_gemini::GeminiProvider;
use packshot_studio::shutdown::{install_signal_handler, stop_on_cancel};
use packshot_studio::{AutomationController, DispatchOutcome, StopReason, StudioEvent};
use tokio::sync::broadcast::error::RecvError;
use tracing::warn;

use crate::app::App;

fn controller(app: &App) -> Result<Arc<AutomationController>, PackshotError> {
    let provider = Arc::new(GeminiProvider::new(&app.config.provider)?);
    Ok(Arc::new(AutomationController::new(app.studio.clone(), provider)))
}

/// Runs automation until it stops on its own or a signal arrives.
pub async fn run_automation(app: &App, select: &[String]) -> Result<StopReason, PackshotError> {
    if !select.is_empty() {
        app.studio
            .update(|s| {
                s.clear_selection();
                s.select(select)
            })
            .await?;
    }

    let controller = controller(app)?;
    let mut events = app.studio.subscribe();
    controller.start().await?;

    let token = install_signal_handler();
    let stopper = stop_on_cancel(controller.clone(), token.clone());

    let run = controller.run();
    tokio::pin!(run);
    let mut printing = true;
    let result = loop {
        tokio::select! {
            result = &mut run => break result,
            event = events.recv(), if printing => match event {
                Ok(event) => print_event(&event),
                Err(RecvError::Lagged(missed)) => warn!(missed, "event printer lagged"),
                Err(RecvError::Closed) => printing = false,
            },
        }
    };
    while let Ok(event) = events.try_recv() {
        print_event(&event);
    }

    token.cancel();
    let _ = stopper.await;

    let reason = result?;
    let stats = app.studio.read(|s| s.stats()).await;
    println!(
        "{} ({}): {} completed, {} pending, {} failed",
        "automation stopped".bold(),
        reason,
        stats.completed,
        stats.pending,
        stats.failed
    );
    match reason {
        StopReason::InvalidKey => eprintln!(
            "{}",
            "the API key was rejected; set generation.api_key or the provider key variable".yellow()
        ),
        StopReason::QuotaExhausted => eprintln!(
            "{}",
            "the provider kept rate limiting; raise generation.delay_ms and retry later".yellow()
        ),
        _ => {}
    }
    Ok(reason)
}

/// Exit status for a finished run.
pub fn exit_code(reason: StopReason) -> ExitCode {
    match reason {
        StopReason::Finished | StopReason::Cancelled => ExitCode::SUCCESS,
        StopReason::InvalidKey | StopReason::QuotaExhausted | StopReason::PausedOnError => {
            ExitCode::from(2)
        }
    }
}

/// Generates one item now. Returns whether it completed.
pub async fn generate_one(app: &App, id: &str) -> Result<bool, PackshotError> {
    let controller = controller(app)?;
    match controller.generate_one(id).await? {
        DispatchOutcome::Completed => {
            println!("{} {id}", "completed".green());
            Ok(true)
        }
        DispatchOutcome::Failed { message, .. } => {
            eprintln!("{} {id}: {message}", "failed".red());
            Ok(false)
        }
    }
}

fn print_event(event: &StudioEvent) {
    match event {
        StudioEvent::ItemUpdated { item } => match item.status {
            ItemStatus::Generating => println!("{} {} {}", "generating".cyan(), item.id, item.name.dimmed()),
            ItemStatus::Completed => println!("{} {}", "completed".green(), item.id),
            ItemStatus::Failed => println!(
                "{} {}: {}",
                "failed".red(),
                item.id,
                item.error.as_deref().unwrap_or("unknown error")
            ),
            _ => {}
        },
        StudioEvent::Notice { message } => eprintln!("{}: {message}", "notice".yellow()),
        StudioEvent::AutomationStarted
        | StudioEvent::AutomationStopped { .. }
        | StudioEvent::NoticeCleared => {}
    }
}
