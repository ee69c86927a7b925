use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use tokio::sync::{mpsc, Notify};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use crate::event::AppEvent;
use crate::procmon::{self, ProcmonClient};
use crate::status::StatusFields;

/// Re-run the status refresh every `interval_secs`, or immediately when
/// `trigger` is notified.
///
/// Only one refresh is in flight at a time: a tick that fires while a slow
/// request is pending is delayed rather than stacked. The task exits once
/// the event receiver is gone.
pub fn start_procmon_poller(
    client: ProcmonClient,
    fields: StatusFields,
    event_tx: mpsc::UnboundedSender<AppEvent>,
    interval_secs: u64,
    trigger: Arc<Notify>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(interval_secs.max(1)));
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = interval.tick() => {}
                _ = trigger.notified() => {
                    interval.reset();
                }
            }

            let event = match procmon::refresh(&client, &fields).await {
                Ok(lines) => {
                    debug!("status refreshed: {}", lines.join(" "));
                    AppEvent::StatusRefreshed(Local::now())
                }
                Err(error) => {
                    warn!(endpoint = client.endpoint(), %error, "status refresh failed");
                    AppEvent::RefreshFailed(error.kind().to_string())
                }
            };

            if event_tx.send(event).is_err() {
                break;
            }
        }
    })
}
