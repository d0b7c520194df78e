use std::time::Duration;

use agency_contracts::EscalationHistoryEntry;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

/// Default loop-detection / success-rate lookback window. Not a
/// correctness invariant, a pragmatic default — tests parameterize it.
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(5 * 60);

/// Append-only escalation log. Readers take a snapshot (a clone) so loop
/// detection and success-rate queries are pure functions of that
/// snapshot, never racing a concurrent writer.
pub struct EscalationHistory {
    entries: RwLock<Vec<EscalationHistoryEntry>>,
    window: Duration,
}

impl EscalationHistory {
    pub fn new(window: Duration) -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
            window,
        }
    }

    pub async fn record(&self, entry: EscalationHistoryEntry) {
        self.entries.write().await.push(entry);
    }

    pub async fn snapshot(&self) -> Vec<EscalationHistoryEntry> {
        self.entries.read().await.clone()
    }

    /// True when, within the last `self.window` of `now`, either a direct
    /// reversal (`target -> source`, approved) exists, or `target` is
    /// reachable by walking backwards through recent approved
    /// escalations starting at `source`.
    pub async fn has_escalation_loop(&self, source: &str, target: &str, now: DateTime<Utc>) -> bool {
        let snapshot = self.snapshot().await;
        has_escalation_loop_in(&snapshot, source, target, now, self.window)
    }

    pub async fn success_rate(&self, agent: &str, now: DateTime<Utc>) -> f64 {
        let snapshot = self.snapshot().await;
        success_rate_in(&snapshot, agent, now, self.window)
    }
}

fn within_window(
    entry: &EscalationHistoryEntry,
    now: DateTime<Utc>,
    window: Duration,
) -> bool {
    let age = now.signed_duration_since(entry.timestamp);
    age >= chrono::Duration::zero() && age <= chrono::Duration::from_std(window).unwrap_or_default()
}

/// Pure helper over an explicit snapshot; used directly by property tests
/// that need a deterministic, hand-built history.
pub fn has_escalation_loop_in(
    entries: &[EscalationHistoryEntry],
    source: &str,
    target: &str,
    now: DateTime<Utc>,
    window: Duration,
) -> bool {
    let recent_approved: Vec<&EscalationHistoryEntry> = entries
        .iter()
        .filter(|e| e.decision.approved && within_window(e, now, window))
        .collect();

    let direct_reversal = recent_approved.iter().any(|e| {
        e.request.source == target && e.decision.target.as_deref() == Some(source)
    });
    if direct_reversal {
        return true;
    }

    let mut visited = std::collections::HashSet::new();
    let mut cur = source.to_string();
    visited.insert(cur.clone());
    loop {
        let next_edge = recent_approved
            .iter()
            .filter(|e| e.request.source == cur)
            .max_by_key(|e| e.timestamp);
        let Some(edge) = next_edge else {
            return false;
        };
        let Some(next) = edge.decision.target.clone() else {
            return false;
        };
        if next == target {
            return true;
        }
        if !visited.insert(next.clone()) {
            return false;
        }
        cur = next;
    }
}

pub fn success_rate_in(
    entries: &[EscalationHistoryEntry],
    agent: &str,
    now: DateTime<Utc>,
    window: Duration,
) -> f64 {
    let relevant: Vec<&EscalationHistoryEntry> = entries
        .iter()
        .filter(|e| e.request.source == agent && within_window(e, now, window))
        .collect();
    if relevant.is_empty() {
        return 0.0;
    }
    let approved = relevant.iter().filter(|e| e.decision.approved).count();
    approved as f64 / relevant.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use agency_contracts::{EscalationDecision, EscalationRequest, Permissions};

    fn entry(source: &str, target: &str, approved: bool, timestamp: DateTime<Utc>) -> EscalationHistoryEntry {
        EscalationHistoryEntry {
            request: EscalationRequest {
                source: source.to_string(),
                reason: "test".to_string(),
                suggested_target: Some(target.to_string()),
                original_task: "task".to_string(),
                permissions: Permissions::default(),
                context: Default::default(),
                timestamp,
            },
            decision: if approved {
                EscalationDecision::approve(target, "task", vec![])
            } else {
                EscalationDecision::deny("denied")
            },
            timestamp,
        }
    }

    #[test]
    fn direct_reversal_is_a_loop() {
        let now = Utc::now();
        let history = vec![entry("analyzer", "locator", true, now - chrono::Duration::minutes(1))];
        assert!(has_escalation_loop_in(&history, "locator", "analyzer", now, DEFAULT_WINDOW));
    }

    #[test]
    fn transitive_chain_is_a_loop() {
        let now = Utc::now();
        let history = vec![
            entry("locator", "analyzer", true, now - chrono::Duration::minutes(3)),
            entry("analyzer", "pattern-finder", true, now - chrono::Duration::minutes(1)),
        ];
        // locator escalated eventually reaching pattern-finder via analyzer
        assert!(has_escalation_loop_in(&history, "locator", "pattern-finder", now, DEFAULT_WINDOW));
    }

    #[test]
    fn old_entries_outside_window_are_ignored() {
        let now = Utc::now();
        let history = vec![entry("analyzer", "locator", true, now - chrono::Duration::minutes(10))];
        assert!(!has_escalation_loop_in(&history, "locator", "analyzer", now, DEFAULT_WINDOW));
    }

    #[test]
    fn success_rate_with_no_samples_is_zero() {
        let now = Utc::now();
        assert_eq!(success_rate_in(&[], "locator", now, DEFAULT_WINDOW), 0.0);
    }

    #[test]
    fn success_rate_computed_over_window() {
        let now = Utc::now();
        let history = vec![
            entry("locator", "analyzer", true, now - chrono::Duration::minutes(1)),
            entry("locator", "analyzer", false, now - chrono::Duration::minutes(1)),
        ];
        assert_eq!(success_rate_in(&history, "locator", now, DEFAULT_WINDOW), 0.5);
    }

    #[test]
    fn loop_detection_is_deterministic() {
        let now = Utc::now();
        let history = vec![entry("analyzer", "locator", true, now - chrono::Duration::minutes(1))];
        let r1 = has_escalation_loop_in(&history, "locator", "analyzer", now, DEFAULT_WINDOW);
        let r2 = has_escalation_loop_in(&history, "locator", "analyzer", now, DEFAULT_WINDOW);
        assert_eq!(r1, r2);
    }

    proptest::proptest! {
        #[test]
        fn loop_detection_is_deterministic_over_random_snapshots(
            agents in proptest::collection::vec(0usize..4, 0..8),
            approvals in proptest::collection::vec(proptest::bool::ANY, 0..8),
            age_minutes in proptest::collection::vec(0i64..12, 0..8),
        ) {
            let names = ["locator", "analyzer", "pattern-finder", "orchestrator"];
            let now = Utc::now();
            let len = agents.len().min(approvals.len()).min(age_minutes.len());
            let history: Vec<_> = (0..len)
                .map(|i| {
                    let source = names[agents[i]];
                    let target = names[(agents[i] + 1) % names.len()];
                    entry(source, target, approvals[i], now - chrono::Duration::minutes(age_minutes[i]))
                })
                .collect();

            let r1 = has_escalation_loop_in(&history, "locator", "analyzer", now, DEFAULT_WINDOW);
            let r2 = has_escalation_loop_in(&history, "locator", "analyzer", now, DEFAULT_WINDOW);
            proptest::prop_assert_eq!(r1, r2);
        }
    }
}
