//! The watch loop: probe, decide, notify, persist, sleep.
//!
//! One cycle runs fully to completion before the interval sleep begins;
//! exactly one probe is in flight at a time. Every per-cycle failure
//! (render error, save failure, delivery failure) is isolated here. Only
//! startup errors may terminate the process, and that happens before this
//! loop is ever entered.

use super::clock::Clock;
use super::config::WatchConfig;
use super::state::{PersistedState, StateStore};
use crate::notify::{Notifier, RestockEvent};
use crate::probe::Prober;
use std::sync::atomic::{AtomicBool, Ordering};

/// Run the watch loop until stopped.
///
/// Returns `Ok(())` when the loop exits deliberately: `once` mode,
/// `exit_on_restock` after the first alert, or the `stop` flag (typically
/// wired to SIGINT). On stop, the in-flight cycle is finished, the sleep
/// is skipped, and the function returns.
///
/// The edge-trigger invariant lives in step 3 below: a notification fires
/// if and only if the previously persisted `last_in_stock` was false (or
/// absent) and the current probe says in stock. True→true cycles and any
/// →false transition never notify.
pub fn run_watch_loop<P: Prober, C: Clock>(
    config: &WatchConfig,
    prober: &P,
    notifiers: &[Box<dyn Notifier>],
    store: &StateStore,
    clock: &C,
    stop: &AtomicBool,
) -> anyhow::Result<()> {
    let key = config.target.key();

    if !config.quiet {
        println!(
            "[{}] watching: {key}",
            clock.now().format("%Y-%m-%d %H:%M:%SZ")
        );
        println!(
            "check interval: {}s | transports: {}",
            config.target.poll_interval.as_secs(),
            describe_transports(notifiers),
        );
    }

    loop {
        // 1. Read the persisted state.
        let mut doc = store.load();
        let previous = doc.entry(&key);

        // 2. Probe. Never fails; failures arrive as in_stock=false reasons.
        let result = prober.probe(&config.target);
        let now = clock.now();

        // 3. Edge-trigger decision.
        let became_available = result.in_stock && !previous.last_in_stock;

        // 4. Best-effort notification fan-out.
        if became_available {
            let event = RestockEvent::restock(&config.target, &result, now);
            for notifier in notifiers {
                match notifier.notify(&event) {
                    Ok(()) => {
                        tracing::info!("restock alert delivered via {}", notifier.name());
                    }
                    Err(e) => {
                        // A miss here is accepted: the state below is still
                        // marked in-stock, so this transition won't re-fire.
                        tracing::warn!("delivery failed via {}: {e:#}", notifier.name());
                    }
                }
            }
        }

        // 5. Persist the latest observation (every cycle, not just on
        //    transitions, so the timestamp and reason stay fresh).
        doc.set_entry(
            &key,
            PersistedState {
                last_in_stock: result.in_stock,
                last_checked_at: Some(now),
                last_reason: Some(result.reason.clone()),
            },
        );
        if let Err(e) = store.save(&doc) {
            tracing::warn!("state not persisted ({e}); a duplicate alert is possible next cycle");
        }

        // 6. Status line.
        if !config.quiet {
            println!(
                "[{}] in_stock={} reason={}",
                now.format("%Y-%m-%d %H:%M:%SZ"),
                result.in_stock,
                result.reason,
            );
        }

        if config.once {
            return Ok(());
        }
        if config.exit_on_restock && became_available {
            if !config.quiet {
                println!("restock detected, exiting (--exit-on-restock)");
            }
            return Ok(());
        }
        if stop.load(Ordering::Relaxed) {
            if !config.quiet {
                println!("shutting down");
            }
            return Ok(());
        }

        // 7. Sleep out the interval, then go again.
        clock.sleep(config.target.poll_interval);

        if stop.load(Ordering::Relaxed) {
            if !config.quiet {
                println!("shutting down");
            }
            return Ok(());
        }
    }
}

fn describe_transports(notifiers: &[Box<dyn Notifier>]) -> String {
    if notifiers.is_empty() {
        return "none (status lines only)".to_string();
    }
    notifiers
        .iter()
        .map(|n| n.name())
        .collect::<Vec<_>>()
        .join(", ")
}
