// SPDX-FileCopyrightText: 2026 Packshot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The automation controller.
//!
//! Drives paced, sequential generation over the eligible items. One cycle
//! dispatches at most one item; a dispatch gate keeps at most one provider
//! call in flight across automation and manual single-item dispatch.
//! Stopping is cooperative: the running flag is checked at the top of every
//! cycle and an in-flight call is allowed to finish and be recorded.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use packshot_core::PackshotError;
use packshot_core::error::GenerationErrorKind;
use packshot_core::traits::ImageProvider;
use packshot_core::types::{
    DataUri, GeneratedImage, GenerationRequest, ItemStatus, LogoEffectConfig,
};
use tokio::sync::{Mutex, Notify};
use tracing::{debug, info, warn};

use crate::events::{StopReason, StudioEvent};
use crate::studio::Studio;

/// Result of processing one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Completed,
    Failed {
        kind: GenerationErrorKind,
        message: String,
    },
}

/// What a single automation cycle did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The running flag was clear; nothing happened.
    NotRunning,
    /// Nothing was eligible; automation stopped.
    Finished,
    /// One item was processed and automation continues.
    Dispatched { id: String, outcome: DispatchOutcome },
    /// One item failed and automation stopped because of it.
    Halted { id: String, reason: StopReason },
}

/// Self-pacing loop over the studio's eligible items.
pub struct AutomationController {
    studio: Arc<Studio>,
    provider: Arc<dyn ImageProvider>,
    running: AtomicBool,
    /// Held for the whole of every dispatch.
    dispatch: Mutex<()>,
    /// Dispatches per item in the current run.
    attempts: Mutex<HashMap<String, u32>>,
    wake: Notify,
}

impl AutomationController {
    pub fn new(studio: Arc<Studio>, provider: Arc<dyn ImageProvider>) -> Self {
        Self {
            studio,
            provider,
            running: AtomicBool::new(false),
            dispatch: Mutex::new(()),
            attempts: Mutex::new(HashMap::new()),
            wake: Notify::new(),
        }
    }

    pub fn studio(&self) -> &Arc<Studio> {
        &self.studio
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Sets the running flag, starting a fresh run.
    ///
    /// Rejected with [`PackshotError::NoEligibleItems`] and a notice when
    /// nothing could be dispatched. Starting while running is a no-op.
    pub async fn start(&self) -> Result<(), PackshotError> {
        if self.is_running() {
            return Ok(());
        }

        let mut attempts = self.attempts.lock().await;
        attempts.clear();
        let eligible = self
            .studio
            .read(|s| s.next_eligible(&attempts).is_some())
            .await;
        drop(attempts);

        if !eligible {
            let err = PackshotError::NoEligibleItems;
            self.studio.emit(StudioEvent::Notice {
                message: err.to_string(),
            });
            return Err(err);
        }

        if !self.running.swap(true, Ordering::SeqCst) {
            info!("automation started");
            self.studio.emit(StudioEvent::NoticeCleared);
            self.studio.emit(StudioEvent::AutomationStarted);
        }
        Ok(())
    }

    /// Clears the running flag. Takes effect at the next cycle boundary.
    pub fn stop(&self) {
        self.halt(StopReason::Cancelled);
        self.wake.notify_waiters();
    }

    fn halt(&self, reason: StopReason) {
        if self.running.swap(false, Ordering::SeqCst) {
            match reason {
                StopReason::Finished | StopReason::Cancelled => {
                    info!(%reason, "automation stopped");
                }
                _ => warn!(%reason, "automation halted"),
            }
            self.studio.emit(StudioEvent::AutomationStopped { reason });
        }
    }

    /// Runs cycles until automation stops, sleeping the configured delay
    /// between them. Returns why it stopped.
    pub async fn run(&self) -> Result<StopReason, PackshotError> {
        loop {
            let outcome = match self.run_cycle().await {
                Ok(outcome) => outcome,
                Err(e) => {
                    if self.running.swap(false, Ordering::SeqCst) {
                        self.studio.emit(StudioEvent::Notice {
                            message: e.to_string(),
                        });
                    }
                    return Err(e);
                }
            };

            match outcome {
                CycleOutcome::NotRunning => return Ok(StopReason::Cancelled),
                CycleOutcome::Finished => return Ok(StopReason::Finished),
                CycleOutcome::Halted { reason, .. } => return Ok(reason),
                CycleOutcome::Dispatched { .. } => {}
            }

            let delay = self.studio.read(|s| s.settings.delay_ms).await;
            if delay == 0 {
                continue;
            }

            let woken = self.wake.notified();
            tokio::pin!(woken);
            woken.as_mut().enable();
            if !self.is_running() {
                continue;
            }
            debug!(delay_ms = delay, "pacing before next cycle");
            tokio::select! {
                _ = tokio::time::sleep(Duration::from_millis(delay)) => {}
                _ = woken => {}
            }
        }
    }

    /// Runs one cycle: pick the first eligible item, process it, and apply
    /// the halting rules.
    pub async fn run_cycle(&self) -> Result<CycleOutcome, PackshotError> {
        let _gate = self.dispatch.lock().await;
        if !self.is_running() {
            return Ok(CycleOutcome::NotRunning);
        }

        let next = {
            let attempts = self.attempts.lock().await;
            self.studio
                .read(|s| s.next_eligible(&attempts).map(str::to_owned))
                .await
        };
        let Some(id) = next else {
            self.halt(StopReason::Finished);
            return Ok(CycleOutcome::Finished);
        };
        *self.attempts.lock().await.entry(id.clone()).or_insert(0) += 1;

        let outcome = self.process(&id).await?;
        let pause_on_error = self.studio.read(|s| s.settings.pause_on_error).await;
        let reason = match &outcome {
            DispatchOutcome::Completed => None,
            DispatchOutcome::Failed { kind, .. } => StopReason::for_failure(*kind, pause_on_error),
        };

        match reason {
            Some(reason) => {
                self.halt(reason);
                Ok(CycleOutcome::Halted { id, reason })
            }
            None => Ok(CycleOutcome::Dispatched { id, outcome }),
        }
    }

    /// Processes one item now, whatever its status or selection.
    ///
    /// Never touches the running flag. Waits for any in-flight dispatch.
    pub async fn generate_one(&self, id: &str) -> Result<DispatchOutcome, PackshotError> {
        let _gate = self.dispatch.lock().await;
        self.process(id).await
    }

    async fn process(&self, id: &str) -> Result<DispatchOutcome, PackshotError> {
        let prepared = self
            .studio
            .write(|s| {
                let request_settings = s.settings.clone();
                let effects = s.effects.clone();
                let logo = s.active_logo.clone();
                let item = s.item_mut(id)?;
                item.mark_generating();
                let request = GenerationRequest::from_settings(item.final_prompt(), &request_settings);
                Some((item.clone(), request, effects, logo))
            })
            .await;
        let Some((item, request, effects, logo)) = prepared else {
            return Err(PackshotError::NotFound {
                kind: "work item",
                id: id.to_string(),
            });
        };
        self.studio.emit(StudioEvent::ItemUpdated {
            item: Box::new(item),
        });
        info!(item_id = id, model = %request.model, with_logo = logo.is_some(), "dispatching generation");

        let result = match self.render(request, logo, effects).await {
            Ok(image) => match self.studio.store().put_blob(id, &image.bytes).await {
                Ok(()) => Ok(image.to_data_uri()),
                Err(e) => Err(e),
            },
            Err(e) => Err(e),
        };

        let outcome = match &result {
            Ok(_) => {
                info!(item_id = id, "generation completed");
                DispatchOutcome::Completed
            }
            Err(e) => {
                warn!(item_id = id, error = %e, "generation failed");
                DispatchOutcome::Failed {
                    kind: e.kind(),
                    message: e.to_string(),
                }
            }
        };

        let updated = self
            .studio
            .write(|s| {
                let item = s.item_mut(id)?;
                match result {
                    Ok(uri) => item.mark_completed(uri),
                    Err(e) => item.mark_failed(e.to_string()),
                }
                Some(item.clone())
            })
            .await;

        let Some(updated) = updated else {
            warn!(item_id = id, "item removed while generating, result dropped");
            return Ok(outcome);
        };
        if updated.status == ItemStatus::Failed {
            if let Err(e) = self.studio.store().delete_blob(id).await {
                warn!(item_id = id, error = %e, "failed to delete stale image");
            }
        }
        if let DispatchOutcome::Failed { message, .. } = &outcome {
            self.studio.emit(StudioEvent::Notice {
                message: format!("{}: {message}", updated.name),
            });
        }
        self.studio.persist_items().await?;
        self.studio.emit(StudioEvent::ItemUpdated {
            item: Box::new(updated),
        });
        Ok(outcome)
    }

    /// Calls the provider, then overlays the active logo if there is one.
    async fn render(
        &self,
        request: GenerationRequest,
        logo: Option<DataUri>,
        effects: LogoEffectConfig,
    ) -> Result<GeneratedImage, PackshotError> {
        let image = self.provider.generate(request).await?;
        let Some(logo) = logo else {
            return Ok(image);
        };

        let logo_bytes = logo.to_bytes()?;
        let bytes = tokio::task::spawn_blocking(move || {
            packshot_compositor::apply_logo(&image.bytes, &logo_bytes, &effects)
        })
        .await
        .map_err(|e| PackshotError::Internal(format!("compositor task failed: {e}")))??;

        Ok(GeneratedImage {
            mime_type: "image/png".to_string(),
            bytes,
        })
    }
}
