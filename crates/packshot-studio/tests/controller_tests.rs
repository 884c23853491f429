// SPDX-FileCopyrightText: 2026 Packshot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the automation controller.

use std::time::Duration;

use packshot_core::PackshotError;
use packshot_core::error::GenerationErrorKind;
use packshot_core::types::{Anchor, FailedItemPolicy, ItemStatus, LogoEffectConfig, WorkItem};
use packshot_studio::{CycleOutcome, DispatchOutcome, StopReason, StudioEvent};
use packshot_test_utils::{MockProvider, TestHarness, png_data_uri};

fn items(ids: &[&str]) -> Vec<WorkItem> {
    ids.iter().map(|id| TestHarness::item(id)).collect()
}

fn invalid_key() -> PackshotError {
    PackshotError::InvalidKey {
        message: "Requested entity was not found.".into(),
    }
}

#[tokio::test]
async fn scenario_item_with_logo_completes_and_persists_blob() {
    let item = WorkItem::new("pizza-001", "pizza", "Pizza box", "Pizza box on wood table")
        .with_logo_prompt("Emboss logo on lid");
    let h = TestHarness::builder()
        .with_items(vec![item])
        .with_logo(png_data_uri(16, 16, [200, 0, 0, 255]))
        .build()
        .await
        .unwrap();

    h.controller.start().await.unwrap();
    assert_eq!(h.controller.run().await.unwrap(), StopReason::Finished);

    let done = h.get("pizza-001").await.unwrap();
    assert_eq!(done.status, ItemStatus::Completed);
    let image = done.result_image.expect("completed item carries its image");
    assert_eq!(image.mime_type(), "image/png");
    assert_eq!(h.memory.blob("pizza-001"), Some(image.to_bytes().unwrap()));
    assert_ne!(
        h.memory.blob("pizza-001"),
        Some(MockProvider::default_image().bytes),
        "logo was composited onto the generated image"
    );

    let requests = h.provider.requests().await;
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].prompt, "Pizza box on wood table. Emboss logo on lid");
    assert!(!h.controller.is_running());
}

#[tokio::test]
async fn invalid_key_halts_within_the_same_cycle() {
    let h = TestHarness::builder()
        .with_items(items(&["a", "b", "c"]))
        .with_settings(|s| s.pause_on_error = false)
        .with_outcomes(vec![Err(invalid_key())])
        .build()
        .await
        .unwrap();

    h.controller.start().await.unwrap();
    let outcome = h.controller.run_cycle().await.unwrap();
    assert_eq!(
        outcome,
        CycleOutcome::Halted {
            id: "a".into(),
            reason: StopReason::InvalidKey
        }
    );
    assert!(!h.controller.is_running());

    let failed = h.get("a").await.unwrap();
    assert_eq!(failed.status, ItemStatus::Failed);
    assert!(failed.error.unwrap().contains("invalid API key"));
    assert_eq!(h.status("b").await, Some(ItemStatus::Pending));
    assert_eq!(h.status("c").await, Some(ItemStatus::Pending));

    assert_eq!(h.controller.run_cycle().await.unwrap(), CycleOutcome::NotRunning);
    assert_eq!(h.provider.call_count().await, 1);
}

#[tokio::test]
async fn quota_exhaustion_stops_automation_regardless_of_pause_setting() {
    let h = TestHarness::builder()
        .with_items(items(&["a", "b"]))
        .with_settings(|s| s.pause_on_error = false)
        .with_outcomes(vec![Err(PackshotError::QuotaExhausted {
            attempts: 4,
            message: "RESOURCE_EXHAUSTED".into(),
        })])
        .build()
        .await
        .unwrap();

    h.controller.start().await.unwrap();
    assert_eq!(h.controller.run().await.unwrap(), StopReason::QuotaExhausted);
    assert_eq!(h.status("a").await, Some(ItemStatus::Failed));
    assert_eq!(h.status("b").await, Some(ItemStatus::Pending));
    assert_eq!(h.provider.call_count().await, 1);
}

#[tokio::test]
async fn selection_is_an_exclusive_filter_in_list_order() {
    let h = TestHarness::builder()
        .with_items(items(&["a", "b", "c", "d"]))
        .build()
        .await
        .unwrap();
    h.studio
        .write(|s| s.select(&["d".to_string(), "b".to_string()]))
        .await
        .unwrap();

    h.controller.start().await.unwrap();
    assert_eq!(h.controller.run().await.unwrap(), StopReason::Finished);

    let prompts: Vec<String> = h
        .provider
        .requests()
        .await
        .into_iter()
        .map(|r| r.prompt)
        .collect();
    assert_eq!(prompts, vec!["Mockup b", "Mockup d"]);
    assert_eq!(h.status("a").await, Some(ItemStatus::Pending));
    assert_eq!(h.status("c").await, Some(ItemStatus::Pending));
}

#[tokio::test]
async fn start_with_nothing_eligible_is_rejected_with_notice() {
    let mut skipped = TestHarness::item("a");
    skipped.status = ItemStatus::Skipped;
    let h = TestHarness::builder()
        .with_items(vec![skipped])
        .build()
        .await
        .unwrap();
    let mut events = h.events();

    assert!(matches!(
        h.controller.start().await,
        Err(PackshotError::NoEligibleItems)
    ));
    assert!(!h.controller.is_running());
    assert!(matches!(events.try_recv(), Ok(StudioEvent::Notice { .. })));
    assert_eq!(h.provider.call_count().await, 0);
}

#[tokio::test]
async fn pause_on_error_stops_after_unknown_failure() {
    let h = TestHarness::builder()
        .with_items(items(&["a", "b"]))
        .with_outcomes(vec![Err(PackshotError::provider("socket closed"))])
        .build()
        .await
        .unwrap();

    h.controller.start().await.unwrap();
    assert_eq!(h.controller.run().await.unwrap(), StopReason::PausedOnError);
    assert_eq!(h.status("a").await, Some(ItemStatus::Failed));
    assert_eq!(h.status("b").await, Some(ItemStatus::Pending));
}

#[tokio::test]
async fn without_pause_on_error_the_queue_continues() {
    let h = TestHarness::builder()
        .with_items(items(&["a", "b"]))
        .with_settings(|s| {
            s.pause_on_error = false;
            s.failed_items = FailedItemPolicy::Manual;
        })
        .with_outcomes(vec![Err(PackshotError::provider("socket closed"))])
        .build()
        .await
        .unwrap();

    h.controller.start().await.unwrap();
    assert_eq!(h.controller.run().await.unwrap(), StopReason::Finished);
    assert_eq!(h.status("a").await, Some(ItemStatus::Failed));
    assert_eq!(h.status("b").await, Some(ItemStatus::Completed));
    assert_eq!(h.provider.call_count().await, 2);
}

#[tokio::test]
async fn failed_items_are_retried_within_attempt_limit() {
    let h = TestHarness::builder()
        .with_items(items(&["a"]))
        .with_settings(|s| {
            s.pause_on_error = false;
            s.max_attempts_per_run = 3;
        })
        .with_outcomes(vec![
            Err(PackshotError::provider("one")),
            Err(PackshotError::provider("two")),
            Err(PackshotError::provider("three")),
        ])
        .build()
        .await
        .unwrap();

    h.controller.start().await.unwrap();
    assert_eq!(h.controller.run().await.unwrap(), StopReason::Finished);
    assert_eq!(h.provider.call_count().await, 3);
    let item = h.get("a").await.unwrap();
    assert_eq!(item.status, ItemStatus::Failed);
    assert!(item.error.unwrap().contains("three"));
}

#[tokio::test]
async fn transient_failure_recovers_on_retry() {
    let h = TestHarness::builder()
        .with_items(items(&["a"]))
        .with_settings(|s| s.pause_on_error = false)
        .with_outcomes(vec![Err(PackshotError::provider("flaky"))])
        .build()
        .await
        .unwrap();

    h.controller.start().await.unwrap();
    h.controller.run().await.unwrap();
    let item = h.get("a").await.unwrap();
    assert_eq!(item.status, ItemStatus::Completed);
    assert!(item.error.is_none());
    assert_eq!(h.provider.call_count().await, 2);
}

#[tokio::test(start_paused = true)]
async fn at_most_one_generation_is_in_flight() {
    let h = TestHarness::builder()
        .with_items(items(&["a", "b", "c", "d"]))
        .with_provider_delay(Duration::from_millis(50))
        .build()
        .await
        .unwrap();

    h.controller.start().await.unwrap();
    let controller = h.controller.clone();
    let run = tokio::spawn(async move { controller.run().await });

    tokio::time::sleep(Duration::from_millis(10)).await;
    let manual = h.controller.generate_one("d").await.unwrap();
    assert_eq!(manual, DispatchOutcome::Completed);

    assert_eq!(run.await.unwrap().unwrap(), StopReason::Finished);
    assert_eq!(h.provider.max_in_flight(), 1);
    assert_eq!(h.provider.call_count().await, 4);
}

#[tokio::test]
async fn manual_dispatch_ignores_eligibility_and_running_flag() {
    let mut skipped = TestHarness::item("a");
    skipped.status = ItemStatus::Skipped;
    let h = TestHarness::builder()
        .with_items(vec![skipped, TestHarness::item("b")])
        .build()
        .await
        .unwrap();
    h.studio
        .write(|s| s.select(&["b".to_string()]))
        .await
        .unwrap();
    let mut events = h.events();

    let outcome = h.controller.generate_one("a").await.unwrap();
    assert_eq!(outcome, DispatchOutcome::Completed);
    assert_eq!(h.status("a").await, Some(ItemStatus::Completed));
    assert!(!h.controller.is_running());

    while let Ok(event) = events.try_recv() {
        assert!(!matches!(
            event,
            StudioEvent::AutomationStarted | StudioEvent::AutomationStopped { .. }
        ));
    }

    assert!(matches!(
        h.controller.generate_one("missing").await,
        Err(PackshotError::NotFound { .. })
    ));
}

#[tokio::test]
async fn manual_dispatch_failure_never_starts_or_stops_automation() {
    let h = TestHarness::builder()
        .with_items(items(&["a"]))
        .with_outcomes(vec![Err(invalid_key())])
        .build()
        .await
        .unwrap();

    let outcome = h.controller.generate_one("a").await.unwrap();
    assert!(matches!(
        outcome,
        DispatchOutcome::Failed {
            kind: GenerationErrorKind::InvalidKey,
            ..
        }
    ));
    assert!(!h.controller.is_running());
}

#[tokio::test(start_paused = true)]
async fn stop_lets_in_flight_item_finish_then_halts() {
    let h = TestHarness::builder()
        .with_items(items(&["a", "b", "c"]))
        .with_provider_delay(Duration::from_millis(100))
        .build()
        .await
        .unwrap();

    h.controller.start().await.unwrap();
    let controller = h.controller.clone();
    let run = tokio::spawn(async move { controller.run().await });

    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(h.status("a").await, Some(ItemStatus::Generating));
    h.controller.stop();

    assert_eq!(run.await.unwrap().unwrap(), StopReason::Cancelled);
    assert_eq!(h.status("a").await, Some(ItemStatus::Completed));
    assert_eq!(h.status("b").await, Some(ItemStatus::Pending));
    assert_eq!(h.provider.call_count().await, 1);
}

#[tokio::test(start_paused = true)]
async fn pacing_delay_separates_dispatches() {
    let h = TestHarness::builder()
        .with_items(items(&["a", "b"]))
        .with_settings(|s| s.delay_ms = 1_000)
        .build()
        .await
        .unwrap();

    let started = tokio::time::Instant::now();
    h.controller.start().await.unwrap();
    h.controller.run().await.unwrap();
    assert!(started.elapsed() >= Duration::from_millis(2_000));
    assert_eq!(h.provider.call_count().await, 2);
}

#[tokio::test(start_paused = true)]
async fn stop_interrupts_pacing_sleep() {
    let h = TestHarness::builder()
        .with_items(items(&["a", "b"]))
        .with_settings(|s| s.delay_ms = 60_000)
        .build()
        .await
        .unwrap();

    let started = tokio::time::Instant::now();
    h.controller.start().await.unwrap();
    let controller = h.controller.clone();
    let run = tokio::spawn(async move { controller.run().await });

    tokio::time::sleep(Duration::from_millis(10)).await;
    h.controller.stop();
    assert_eq!(run.await.unwrap().unwrap(), StopReason::Cancelled);
    assert!(started.elapsed() < Duration::from_secs(60));
    assert_eq!(h.status("b").await, Some(ItemStatus::Pending));
}

#[tokio::test]
async fn events_trace_a_successful_run() {
    let h = TestHarness::builder()
        .with_items(items(&["a"]))
        .build()
        .await
        .unwrap();
    let mut events = h.events();

    h.controller.start().await.unwrap();
    h.controller.run().await.unwrap();

    let mut seen = Vec::new();
    while let Ok(event) = events.try_recv() {
        seen.push(event);
    }
    assert_eq!(seen.len(), 5);
    assert_eq!(seen[0], StudioEvent::NoticeCleared);
    assert_eq!(seen[1], StudioEvent::AutomationStarted);
    assert!(matches!(&seen[2], StudioEvent::ItemUpdated { item } if item.status == ItemStatus::Generating));
    assert!(matches!(&seen[3], StudioEvent::ItemUpdated { item } if item.status == ItemStatus::Completed));
    assert_eq!(
        seen[4],
        StudioEvent::AutomationStopped {
            reason: StopReason::Finished
        }
    );
}

#[tokio::test]
async fn storage_failure_marks_item_failed() {
    let h = TestHarness::builder()
        .with_items(items(&["a"]))
        .build()
        .await
        .unwrap();
    h.memory.fail_blob_writes(true);

    h.controller.start().await.unwrap();
    assert_eq!(h.controller.run().await.unwrap(), StopReason::PausedOnError);
    let item = h.get("a").await.unwrap();
    assert_eq!(item.status, ItemStatus::Failed);
    assert!(item.result_image.is_none());
    assert!(item.error.unwrap().contains("storage error"));
}

#[tokio::test]
async fn undecodable_logo_fails_item_as_decode_error() {
    let h = TestHarness::builder()
        .with_items(items(&["a"]))
        .with_logo(packshot_core::types::DataUri::from_bytes("image/png", b"junk"))
        .build()
        .await
        .unwrap();

    let outcome = h.controller.generate_one("a").await.unwrap();
    assert!(matches!(
        outcome,
        DispatchOutcome::Failed {
            kind: GenerationErrorKind::Decode,
            ..
        }
    ));
    assert_eq!(h.memory.blob_count(), 0);
}

#[tokio::test]
async fn sqlite_backed_run_survives_reload() {
    let h = TestHarness::builder()
        .with_items(items(&["a", "b"]))
        .with_sqlite()
        .build()
        .await
        .unwrap();

    h.controller.start().await.unwrap();
    h.controller.run().await.unwrap();

    let reloaded = packshot_studio::Studio::load(
        h.store.clone(),
        packshot_studio::StudioOptions::default(),
    )
    .await
    .unwrap();
    let state = reloaded.snapshot().await;
    assert!(state.items.iter().all(|i| i.status == ItemStatus::Completed));
    assert!(state.items.iter().all(|i| i.result_image.is_some()));
}

#[tokio::test]
async fn seeded_selection_retries_then_composites_with_configured_effects() {
    let effects = LogoEffectConfig {
        position: Anchor::TopLeft,
        opacity: 50.0,
        ..LogoEffectConfig::default()
    };
    let h = TestHarness::builder()
        .with_seed_catalog()
        .with_effects(effects.clone())
        .with_logo(png_data_uri(16, 16, [0, 120, 0, 255]))
        .with_settings(|s| s.pause_on_error = false)
        .build()
        .await
        .unwrap();
    assert_eq!(h.studio.read(|s| s.items.len()).await, 128);
    assert_eq!(h.studio.read(|s| s.effects.clone()).await, effects);

    h.studio
        .write(|s| s.select(&["pizza-002".to_string(), "burger-001".to_string()]))
        .await
        .unwrap();
    h.provider
        .push_error(PackshotError::provider("upstream hiccup"))
        .await;

    h.controller.start().await.unwrap();
    assert_eq!(h.controller.run().await.unwrap(), StopReason::Finished);

    assert_eq!(h.provider.call_count().await, 3);
    assert_eq!(h.status("pizza-002").await, Some(ItemStatus::Completed));
    assert_eq!(h.status("burger-001").await, Some(ItemStatus::Completed));
    assert_eq!(h.status("pizza-001").await, Some(ItemStatus::Pending));
    assert_eq!(h.memory.blob_count(), 2);
}

#[tokio::test]
async fn failed_regeneration_drops_the_previous_image() {
    let h = TestHarness::builder()
        .with_items(items(&["a"]))
        .build()
        .await
        .unwrap();
    assert_eq!(
        h.controller.generate_one("a").await.unwrap(),
        DispatchOutcome::Completed
    );
    assert_eq!(h.memory.blob_count(), 1);

    h.provider
        .push_error(PackshotError::provider("model overloaded"))
        .await;
    let outcome = h.controller.generate_one("a").await.unwrap();
    assert!(matches!(outcome, DispatchOutcome::Failed { .. }));
    assert_eq!(h.status("a").await, Some(ItemStatus::Failed));
    assert_eq!(h.memory.blob_count(), 0);
}

#[tokio::test]
async fn removing_a_completed_item_deletes_its_image() {
    let h = TestHarness::builder()
        .with_items(items(&["a", "b"]))
        .build()
        .await
        .unwrap();
    h.controller.start().await.unwrap();
    h.controller.run().await.unwrap();
    assert_eq!(h.memory.blob_count(), 2);

    h.studio.update(|s| s.remove_item("a")).await.unwrap();
    assert_eq!(h.memory.blob_count(), 1);
    assert!(h.memory.blob("a").is_none());
}
