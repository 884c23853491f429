// SPDX-FileCopyrightText: 2026 Packshot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! State-change events broadcast by the studio.

use packshot_core::error::GenerationErrorKind;
use packshot_core::types::WorkItem;
use serde::Serialize;
use strum::Display;

/// Capacity of the broadcast channel. Slow subscribers observe `Lagged`.
pub const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Why an automation run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum StopReason {
    /// No eligible items remained.
    Finished,
    /// The running flag was cleared by the user or a signal.
    Cancelled,
    /// The provider rejected the key. User action required.
    InvalidKey,
    /// Rate limiting outlasted the retry cap.
    QuotaExhausted,
    /// An item failed while `pause_on_error` was set.
    PausedOnError,
}

impl StopReason {
    /// Why a failure of `kind` ends an automation run, if it does.
    pub fn for_failure(kind: GenerationErrorKind, pause_on_error: bool) -> Option<Self> {
        if !kind.halts_automation() {
            return pause_on_error.then_some(Self::PausedOnError);
        }
        match kind {
            GenerationErrorKind::InvalidKey => Some(Self::InvalidKey),
            _ => Some(Self::QuotaExhausted),
        }
    }
}

/// A change in studio state.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StudioEvent {
    /// An item's status, result, or error changed.
    ItemUpdated { item: Box<WorkItem> },
    AutomationStarted,
    AutomationStopped { reason: StopReason },
    /// A persistent user-facing message, shown until cleared.
    Notice { message: String },
    NoticeCleared,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn halting_kinds_stop_regardless_of_pause_setting() {
        for pause in [true, false] {
            assert_eq!(
                StopReason::for_failure(GenerationErrorKind::InvalidKey, pause),
                Some(StopReason::InvalidKey)
            );
            assert_eq!(
                StopReason::for_failure(GenerationErrorKind::QuotaExhausted, pause),
                Some(StopReason::QuotaExhausted)
            );
        }
    }

    #[test]
    fn other_failures_follow_pause_on_error() {
        assert_eq!(
            StopReason::for_failure(GenerationErrorKind::Unknown, true),
            Some(StopReason::PausedOnError)
        );
        assert_eq!(StopReason::for_failure(GenerationErrorKind::Decode, false), None);
    }
}
