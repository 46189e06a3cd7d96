//! Periodic trigger.
//!
//! Each tick awaits the whole job before the next tick is taken, so two runs
//! never overlap. Ticks missed while a slow run was in flight are delayed,
//! not replayed in a burst. Shutdown is only observed between runs.

use std::future::Future;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};

/// Call `job` every `period` until `shutdown` resolves. Returns how many
/// times `job` ran.
///
/// With `run_on_startup` the first call happens immediately; otherwise the
/// first call waits one full period.
pub async fn watch<F, Fut, S>(period: Duration, run_on_startup: bool, mut job: F, shutdown: S) -> usize
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ()>,
    S: Future<Output = ()>,
{
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    if !run_on_startup {
        // The first tick of an interval completes immediately.
        ticker.tick().await;
    }

    tokio::pin!(shutdown);
    let mut runs = 0;
    loop {
        tokio::select! {
            biased;
            _ = &mut shutdown => {
                info!(runs, "[WATCH] Shutdown requested, stopping");
                break;
            }
            _ = ticker.tick() => {
                debug!(run = runs + 1, "[WATCH] Tick");
                job().await;
                runs += 1;
            }
        }
    }
    runs
}
