use crate::state::AppState;
use std::sync::Arc;
use std::time::Duration;

/// Spawn a background task that deletes rooms which have sat empty past the
/// grace window, so a quick reconnect can still revive a room while
/// abandoned ones don't accumulate.
pub fn spawn_room_reaper(state: Arc<AppState>) {
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(Duration::from_secs(2)).await;
            state.reap_empty_rooms(chrono::Utc::now()).await;
        }
    });
}
