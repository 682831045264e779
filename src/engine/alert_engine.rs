//! Derivation of the alert set and its notification side effects from
//! repeatedly-recomputed snapshots.

use std::collections::{HashMap, HashSet};

use chrono::Utc;

use crate::{
    config::AlertThresholds,
    models::{Alert, AlertCondition, NotificationEvent, SiteSnapshot, SiteStatus},
};

/// The result of one tick: the full current alert set (a replacement, never
/// an increment) and the side effects the caller should surface.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickOutcome {
    /// Every alert condition currently active, across all sites.
    pub alerts: Vec<Alert>,
    /// Notifications to surface: new-alert events deduplicated per episode,
    /// status changes always.
    pub events: Vec<NotificationEvent>,
}

/// Recomputes the full alert set every tick and diffs it against what has
/// already been surfaced, so a persisting condition notifies exactly once
/// per episode.
///
/// The `notified` and `acknowledged` ledgers and the previous-status map are
/// owned here and mutated only through [`AlertEngine::recompute`] and
/// [`AlertEngine::acknowledge`]. An id that drops out of the live set ends
/// its episode: both ledgers are pruned for it, so a later re-occurrence of
/// the same condition notifies again.
pub struct AlertEngine {
    thresholds: AlertThresholds,
    notified: HashSet<String>,
    acknowledged: HashSet<String>,
    previous_status: HashMap<String, SiteStatus>,
}

impl AlertEngine {
    /// Creates an engine with the given thresholds and empty ledgers.
    pub fn new(thresholds: AlertThresholds) -> Self {
        Self {
            thresholds,
            notified: HashSet::new(),
            acknowledged: HashSet::new(),
            previous_status: HashMap::new(),
        }
    }

    /// Runs one tick over the sites with a known snapshot.
    ///
    /// Status-change events are emitted on every coarse transition,
    /// independent of alert suppression, and the previous-status map is
    /// updated unconditionally.
    pub fn recompute(
        &mut self,
        sites: &[String],
        snapshots: &HashMap<String, SiteSnapshot>,
    ) -> TickOutcome {
        let mut outcome = TickOutcome::default();

        for site_id in sites {
            let Some(snapshot) = snapshots.get(site_id) else { continue };

            let status = snapshot.status();
            if let Some(&previous) = self.previous_status.get(site_id) {
                if previous != status {
                    tracing::info!(site = %site_id, %previous, current = %status, "Site status changed");
                    outcome.events.push(NotificationEvent::StatusChange {
                        site_id: site_id.clone(),
                        previous,
                        current: status,
                    });
                }
            }
            self.previous_status.insert(site_id.clone(), status);

            outcome.alerts.extend(self.evaluate_site(site_id, snapshot));
        }

        for alert in &outcome.alerts {
            if !self.notified.contains(&alert.id) && !self.acknowledged.contains(&alert.id) {
                self.notified.insert(alert.id.clone());
                outcome.events.push(NotificationEvent::NewAlert(alert.clone()));
            }
        }

        // An id absent from this tick's set has ended its episode; pruning
        // the ledgers re-arms notification for a later re-occurrence.
        let live: HashSet<&str> = outcome.alerts.iter().map(|a| a.id.as_str()).collect();
        self.notified.retain(|id| live.contains(id.as_str()));
        self.acknowledged.retain(|id| live.contains(id.as_str()));

        outcome
    }

    /// Marks an alert id as dismissed by the user. Suppresses further
    /// new-alert notifications for it while its condition persists; the
    /// alert stays in the live set until the condition actually clears.
    pub fn acknowledge(&mut self, alert_id: &str) {
        self.acknowledged.insert(alert_id.to_string());
    }

    /// Evaluates the fixed threshold conditions for one site, in order. Each
    /// condition is independent; a site can carry several at once.
    fn evaluate_site(&self, site_id: &str, snapshot: &SiteSnapshot) -> Vec<Alert> {
        let mut alerts = Vec::new();
        let mut raise = |condition: AlertCondition, message: String| {
            alerts.push(Alert {
                id: Alert::id_for(site_id, condition),
                severity: condition.severity(),
                message,
                site_id: site_id.to_string(),
                timestamp: Utc::now(),
            });
        };

        if snapshot.is_reachable == Some(false) {
            raise(AlertCondition::Down, format!("Site {site_id} is unreachable"));
        }
        if let Some(latency) = snapshot.latency {
            if latency > self.thresholds.latency_ms {
                raise(
                    AlertCondition::Latency,
                    format!("High latency on {site_id}: {latency:.0} ms"),
                );
            }
        }
        if let Some(loss) = snapshot.packet_loss {
            if loss > self.thresholds.packet_loss_pct {
                raise(
                    AlertCondition::PacketLoss,
                    format!("Packet loss on {site_id}: {loss:.0}%"),
                );
            }
        }
        if let Some(snmp) = &snapshot.snmp {
            if let Some(cpu) = snmp.cpu_usage {
                if cpu > self.thresholds.cpu_pct {
                    raise(AlertCondition::Cpu, format!("High CPU usage on {site_id}: {cpu:.0}%"));
                }
            }
            if let Some(memory) = snmp.memory_usage {
                if memory > self.thresholds.memory_pct {
                    raise(
                        AlertCondition::Memory,
                        format!("High memory usage on {site_id}: {memory:.0}%"),
                    );
                }
            }
        }

        alerts
    }
}
