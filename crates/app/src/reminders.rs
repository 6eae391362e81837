//! Periodic reminder sweeps over the ledger.
//!
//! The scheduler wakes on a configurable interval, asks the engine for every
//! debtor with outstanding settlements and hands each group to a [`Notifier`].
//! Delivery failures are logged and skipped; a sweep is recorded as completed
//! regardless, so a flaky transport cannot wedge the schedule.

use std::error::Error;
use std::future::Future;
use std::time::Duration;

use chrono::Utc;
use engine::{Ledger, LedgerError, ReminderGroup};
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Transport for one debtor's reminder.
pub trait Notifier {
    fn deliver(
        &self,
        group: &ReminderGroup,
    ) -> impl Future<Output = Result<(), Box<dyn Error + Send + Sync>>> + Send;
}

/// Notifier that only writes the reminder to the log. Used when no real
/// transport is configured.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    async fn deliver(&self, group: &ReminderGroup) -> Result<(), Box<dyn Error + Send + Sync>> {
        for entry in &group.entries {
            tracing::info!(
                member = %group.member.username,
                payer = %entry.payer_name,
                amount = entry.amount,
                "reminder: {}",
                entry.description
            );
        }
        Ok(())
    }
}

/// Handle to the background sweep task.
pub struct ReminderScheduler {
    interval_tx: watch::Sender<Duration>,
    shutdown_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl ReminderScheduler {
    /// Spawn the sweep loop. The first sweep runs one full interval after
    /// startup.
    pub fn start<N>(ledger: Ledger, notifier: N, interval: Duration) -> Self
    where
        N: Notifier + Send + Sync + 'static,
    {
        let (interval_tx, mut interval_rx) = watch::channel(interval);
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

        let handle = tokio::spawn(async move {
            loop {
                let wait = *interval_rx.borrow_and_update();
                tokio::select! {
                    _ = tokio::time::sleep(wait) => {
                        if let Err(err) = run_sweep(&ledger, &notifier).await {
                            tracing::error!("reminder sweep failed: {err}");
                        }
                    }
                    // A reschedule restarts the wait with the new interval.
                    changed = interval_rx.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                    _ = shutdown_rx.changed() => break,
                }
            }
        });

        Self {
            interval_tx,
            shutdown_tx,
            handle,
        }
    }

    /// Change the sweep interval. The pending wait restarts from now.
    pub fn reschedule(&self, interval: Duration) {
        let _ = self.interval_tx.send(interval);
    }

    /// Stop the loop and wait for the task to finish.
    pub async fn stop(self) {
        let _ = self.shutdown_tx.send(true);
        let _ = self.handle.await;
    }
}

/// One full sweep: group outstanding debts, deliver, record the scan.
pub async fn run_sweep<N: Notifier>(ledger: &Ledger, notifier: &N) -> Result<(), LedgerError> {
    let groups = ledger.reminder_groups().await?;
    let total = groups.len();
    let mut delivered = 0usize;

    for group in groups.values() {
        match notifier.deliver(group).await {
            Ok(()) => delivered += 1,
            Err(err) => {
                tracing::warn!(
                    member = %group.member.username,
                    "reminder delivery failed: {err}"
                );
            }
        }
    }

    ledger.record_reminder_scan(Utc::now()).await?;
    tracing::debug!("reminder sweep done: {delivered}/{total} delivered");
    Ok(())
}
