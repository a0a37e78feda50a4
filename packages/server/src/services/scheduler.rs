use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{error, info};

use super::SYSTEM_ACTOR;
use crate::store::{ContentStore, StoreError};

/// Run the scheduled-publish sweep as a background task.
pub async fn run_scheduled_publisher(store: Arc<dyn ContentStore>, every: Duration) {
    info!(
        interval_secs = every.as_secs(),
        "Starting scheduled publisher"
    );

    let mut interval = tokio::time::interval(every);

    loop {
        interval.tick().await;

        if let Err(e) = publish_due_posts(store.as_ref(), Utc::now()).await {
            error!(error = %e, "Scheduled publish sweep failed");
        }
    }
}

/// Flip every due draft to published. Returns how many posts changed.
///
/// The store applies the due check and the write as one conditional update,
/// so a post deleted or edited after it became due is never rewritten from a
/// stale copy, and overlapping sweeps publish each post once. No revisions
/// are written.
pub async fn publish_due_posts(
    store: &dyn ContentStore,
    now: DateTime<Utc>,
) -> Result<usize, StoreError> {
    let published = store.publish_due_scheduled(now, SYSTEM_ACTOR).await?;
    if published > 0 {
        info!(count = published, "Published scheduled posts");
    }
    Ok(usize::try_from(published).unwrap_or(usize::MAX))
}
