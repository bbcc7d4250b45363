use std::sync::Arc;
use tokio::time::{interval, Duration};

use crate::{db::notificationdb::NotificationExt, AppState};

/// Periodic purge of read notifications past the retention horizon. The
/// only background task in the system; safe to run concurrently with
/// itself and with request traffic.
pub async fn start_notification_purge_job(app_state: Arc<AppState>) {
    let mut interval = interval(Duration::from_secs(21600)); // Every 6 hours

    loop {
        interval.tick().await;

        match app_state
            .db_client
            .purge_read_notifications(app_state.env.notification_retention_days)
            .await
        {
            Ok(purged) => {
                tracing::info!("notification purge completed: {} rows removed", purged)
            }
            Err(e) => tracing::error!("notification purge failed: {}", e),
        }
    }
}
