// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The settlement scheduler.
//!
//! A single background task ticks every `interval_ms`, releases stale
//! settlement leases, scans for due auctions, and settles each one.
//! The tick body is awaited inline, so overlapping ticks cannot occur;
//! a hard timeout bounds overrun. Per-auction failures are logged and
//! never block the rest of the tick.

use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};

use crate::live::LiveEvent;
use crate::{AppState, current_time_ms};

/// Hard ceiling on one tick's wall time.
const TICK_TIMEOUT: Duration = Duration::from_secs(20);

/// Runs the scheduler loop forever.
///
/// Spawn this on the runtime; it never returns. Dropping the runtime
/// drops the task (background daemon semantics — it never blocks
/// shutdown).
pub async fn run(state: AppState, interval_ms: u64) {
    info!(interval_ms, "Settlement scheduler started");
    let mut ticker = tokio::time::interval(Duration::from_millis(interval_ms.max(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        let now_ms = current_time_ms();
        if tokio::time::timeout(TICK_TIMEOUT, tick(&state, now_ms))
            .await
            .is_err()
        {
            error!("SCHEDULER_TICK_TIMEOUT_20000ms");
        }
    }
}

/// One scheduler tick: sweep stale leases, then settle every due auction.
///
/// Public so tests can drive the scheduler with a controlled clock.
pub async fn tick(state: &AppState, now_ms: i64) {
    let due = {
        let mut persistence = state.persistence.lock().await;
        if let Err(err) = persistence.sweep_stale_leases(now_ms) {
            error!(%err, "Stale lease sweep failed");
        }
        match persistence.list_due_auction_ids(now_ms) {
            Ok(ids) => ids,
            Err(err) => {
                error!(%err, "Due-scan failed");
                return;
            }
        }
    };

    if due.is_empty() {
        return;
    }
    debug!(due = due.len(), "Settling due auctions");

    for auction_id in due {
        let outcome = {
            let mut persistence = state.persistence.lock().await;
            persistence.settle_round(auction_id, now_ms)
        };
        match outcome {
            Ok(Some(settlement)) => {
                state.live_events.broadcast(&LiveEvent::RoundSettled {
                    auction_id,
                    round: settlement.round,
                    winners: settlement.winners.len(),
                    remaining_items: settlement.remaining_items,
                });
                if settlement.auction_ended {
                    state
                        .live_events
                        .broadcast(&LiveEvent::AuctionEnded { auction_id });
                }
            }
            Ok(None) => {
                // Not due anymore or leased elsewhere; nothing to report.
            }
            Err(err) => {
                // One bad auction never blocks the tick for the fleet.
                error!(auction_id, %err, "Settlement failed");
            }
        }
    }
}
