use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::{AppError, AppState, Metrics};
use backend_domain::ports::BroadcastService;
use backend_domain::{IngestOutcome, LootEntry, LootId, LootSubmission, NEW_LOOT_EVENT};

pub async fn ingest_loot(
    state: &AppState,
    submission: LootSubmission,
) -> Result<IngestOutcome, AppError> {
    state.metrics.record_ingest_request();

    let now = Utc::now();
    let id = LootId::generate(now.timestamp_millis());
    let entry = LootEntry::from_submission(submission, id, now);

    let (timestamp, item_name, character) = entry.dedup_key();
    // Read-then-write: two identical concurrent submissions can both pass.
    let existing = state
        .loot_repo
        .find_duplicate(timestamp, item_name, character)
        .await
        .map_err(|err| {
            state.metrics.record_ingest_error();
            AppError::storage("duplicate lookup failed", err)
        })?;
    if let Some(existing_id) = existing {
        info!(
            id = %existing_id,
            character = %entry.character,
            item = %entry.item_name,
            "duplicate loot submission ignored"
        );
        state.metrics.record_duplicate();
        return Ok(IngestOutcome::Duplicate { id: existing_id });
    }

    state.loot_repo.insert_entry(&entry).await.map_err(|err| {
        state.metrics.record_ingest_error();
        AppError::storage("failed to store loot entry", err)
    })?;
    state.metrics.record_created();
    debug!(id = %entry.id, quality = %entry.quality, "loot entry stored");

    if entry.quality.is_valuable() {
        publish_entry(state, &entry);
    }

    Ok(IngestOutcome::Created { id: entry.id })
}

fn publish_entry(state: &AppState, entry: &LootEntry) {
    let reached = state.stream_hub.publish(entry);
    debug!(id = %entry.id, subscribers = reached, "loot entry pushed to stream");

    if state.broadcaster.is_enabled() {
        spawn_broadcast(
            state.broadcaster.clone(),
            state.metrics.clone(),
            entry.clone(),
        );
    }
}

/// The response never waits on the external pub/sub.
fn spawn_broadcast(
    broadcaster: Arc<dyn BroadcastService>,
    metrics: Arc<Metrics>,
    entry: LootEntry,
) {
    tokio::spawn(async move {
        match broadcaster.publish(NEW_LOOT_EVENT, &entry).await {
            Ok(()) => metrics.record_broadcast(true),
            Err(err) => {
                metrics.record_broadcast(false);
                warn!(id = %entry.id, "loot broadcast failed: {:#}", err);
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{eventually, test_state, FakeRepo, RecordingBroadcaster};
    use backend_domain::Quality;

    fn submission(timestamp: &str, item: &str, quality: &str) -> LootSubmission {
        LootSubmission {
            timestamp: Some(timestamp.to_string()),
            character: Some("Bob".to_string()),
            item_name: Some(item.to_string()),
            quality: Some(quality.to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn ingest_assigns_distinct_ids() {
        let repo = Arc::new(FakeRepo::default());
        let state = test_state(repo.clone(), Arc::new(RecordingBroadcaster::default()));

        let first = ingest_loot(&state, submission("2025-10-15T10:00:00Z", "Shako", "unique"))
            .await
            .expect("first");
        let second = ingest_loot(&state, submission("2025-10-15T10:00:01Z", "Shako", "unique"))
            .await
            .expect("second");

        let (IngestOutcome::Created { id: a }, IngestOutcome::Created { id: b }) = (first, second)
        else {
            panic!("expected two created entries");
        };
        assert!(!a.is_empty());
        assert_ne!(a, b);
        assert_eq!(repo.entries().len(), 2);
    }

    #[tokio::test]
    async fn resubmission_is_reported_as_duplicate() {
        let repo = Arc::new(FakeRepo::default());
        let state = test_state(repo.clone(), Arc::new(RecordingBroadcaster::default()));
        let payload = submission("2025-10-15T10:00:00Z", "Shako", "unique");

        let first = ingest_loot(&state, payload.clone()).await.expect("first");
        let second = ingest_loot(&state, payload).await.expect("second");

        let IngestOutcome::Created { id } = first else {
            panic!("first submission should be stored");
        };
        assert_eq!(second, IngestOutcome::Duplicate { id });
        assert_eq!(repo.entries().len(), 1);
    }

    #[tokio::test]
    async fn only_valuable_quality_is_broadcast() {
        let repo = Arc::new(FakeRepo::default());
        let broadcaster = Arc::new(RecordingBroadcaster::default());
        let state = test_state(repo, broadcaster.clone());

        ingest_loot(&state, submission("t1", "Ber Rune", "rune")).await.expect("rune");
        ingest_loot(&state, submission("t2", "Short Sword", "normal")).await.expect("normal");
        ingest_loot(&state, submission("t3", "Crafted Thing", "crafted")).await.expect("unknown");

        let published = broadcaster.wait_for(1).await;
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].0, NEW_LOOT_EVENT);
        assert_eq!(published[0].1.quality, Quality::Rune);
    }

    #[tokio::test]
    async fn broadcast_failure_does_not_fail_ingest() {
        let repo = Arc::new(FakeRepo::default());
        let broadcaster = Arc::new(RecordingBroadcaster::failing());
        let state = test_state(repo.clone(), broadcaster.clone());

        let outcome = ingest_loot(&state, submission("t1", "Shako", "unique")).await;

        assert!(matches!(outcome, Ok(IngestOutcome::Created { .. })));
        assert_eq!(repo.entries().len(), 1);
        assert_eq!(broadcaster.wait_for(1).await.len(), 1);
        eventually(|| {
            state
                .metrics
                .render_prometheus()
                .contains("lootfeed_broadcast_failures_total 1\n")
        })
        .await;
    }

    #[tokio::test]
    async fn valuable_entry_reaches_stream_subscribers() {
        let state = test_state(
            Arc::new(FakeRepo::default()),
            Arc::new(RecordingBroadcaster::default()),
        );
        let mut rx = state.stream_hub.subscribe();

        ingest_loot(&state, submission("t1", "Tal Rasha's Guardianship", "set"))
            .await
            .expect("ingest");

        let pushed = rx.recv().await.expect("pushed entry");
        assert_eq!(pushed.item_name, "Tal Rasha's Guardianship");
    }

    #[tokio::test]
    async fn normal_entry_is_not_pushed_to_stream() {
        let state = test_state(
            Arc::new(FakeRepo::default()),
            Arc::new(RecordingBroadcaster::default()),
        );
        let mut rx = state.stream_hub.subscribe();

        ingest_loot(&state, submission("t1", "Short Sword", "normal"))
            .await
            .expect("ingest");

        assert!(matches!(
            rx.try_recv(),
            Err(tokio::sync::broadcast::error::TryRecvError::Empty)
        ));
    }

    #[tokio::test]
    async fn slow_broadcaster_does_not_delay_ingest() {
        let repo = Arc::new(FakeRepo::default());
        let state = test_state(repo.clone(), Arc::new(RecordingBroadcaster::hanging()));

        let outcome = tokio::time::timeout(
            std::time::Duration::from_secs(1),
            ingest_loot(&state, submission("t1", "Shako", "unique")),
        )
        .await
        .expect("ingest returned before the broadcast finished");

        assert!(matches!(outcome, Ok(IngestOutcome::Created { .. })));
        assert_eq!(repo.entries().len(), 1);
    }

    #[tokio::test]
    async fn storage_failure_surfaces_as_internal_error() {
        let repo = Arc::new(FakeRepo::failing());
        let broadcaster = Arc::new(RecordingBroadcaster::default());
        let state = test_state(repo, broadcaster.clone());

        let err = ingest_loot(&state, submission("t1", "Shako", "unique"))
            .await
            .expect_err("storage down");

        assert!(matches!(err, AppError::Internal(_)));
        assert!(broadcaster.published().is_empty());
    }
}
