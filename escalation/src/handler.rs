use std::sync::Arc;

use agency_contracts::{EscalationDecision, EscalationHistoryEntry, EscalationRequest};
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::error::EscalationError;
use crate::history::EscalationHistory;
use crate::policy::EscalationPolicy;

/// Accepts an `EscalationRequest`, consults policy and history, and
/// emits a decision with fallbacks. Policy and history are constructor
/// arguments (not process-wide statics) so tests stay isolated.
pub struct EscalationHandler {
    policy: Arc<RwLock<EscalationPolicy>>,
    history: Arc<EscalationHistory>,
}

impl EscalationHandler {
    pub fn new(policy: Arc<RwLock<EscalationPolicy>>, history: Arc<EscalationHistory>) -> Self {
        Self { policy, history }
    }

    pub async fn handle(&self, request: EscalationRequest) -> Result<EscalationDecision, EscalationError> {
        if request.source.is_empty() {
            return Err(EscalationError::Malformed("source is empty".to_string()));
        }
        if request.reason.is_empty() {
            return Err(EscalationError::Malformed("reason is empty".to_string()));
        }

        let policy = self.policy.read().await;

        if let Some(suggested) = &request.suggested_target {
            if !policy.allow_escalation(&request.source, suggested) {
                let decision = EscalationDecision::deny(format!(
                    "target {:?} is not an allowed escalation target for {:?}",
                    suggested, request.source
                ));
                drop(policy);
                warn!(source = %request.source, target = %suggested, "escalation target not allowed");
                self.record(&request, &decision).await;
                return Ok(decision);
            }
        }

        let target = match &request.suggested_target {
            Some(t) => Some(t.clone()),
            None => policy.determine_target(&request.source, &request.reason),
        };

        let Some(target) = target else {
            let decision = EscalationDecision::deny("no suitable escalation target found");
            drop(policy);
            warn!(source = %request.source, "no escalation target found");
            self.record(&request, &decision).await;
            return Ok(decision);
        };

        let now = Utc::now();
        if self.history.has_escalation_loop(&request.source, &target, now).await {
            let decision = EscalationDecision::deny("escalation loop detected");
            drop(policy);
            warn!(source = %request.source, target = %target, "escalation loop detected");
            self.record(&request, &decision).await;
            return Ok(decision);
        }

        let fallbacks = policy.get_fallbacks(&target);
        let decision = EscalationDecision::approve(target.clone(), request.original_task.clone(), fallbacks);
        drop(policy);
        info!(source = %request.source, target = %target, "escalation approved");
        self.record(&request, &decision).await;
        Ok(decision)
    }

    async fn record(&self, request: &EscalationRequest, decision: &EscalationDecision) {
        self.history
            .record(EscalationHistoryEntry {
                request: request.clone(),
                decision: decision.clone(),
                timestamp: Utc::now(),
            })
            .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agency_contracts::Permissions;
    use std::collections::HashMap;
    use std::time::Duration;

    fn request(source: &str, reason: &str, suggested: Option<&str>) -> EscalationRequest {
        EscalationRequest {
            source: source.to_string(),
            reason: reason.to_string(),
            suggested_target: suggested.map(|s| s.to_string()),
            original_task: "investigate".to_string(),
            permissions: Permissions::default(),
            context: HashMap::new(),
            timestamp: Utc::now(),
        }
    }

    fn handler() -> EscalationHandler {
        EscalationHandler::new(
            Arc::new(RwLock::new(EscalationPolicy::default_topology())),
            Arc::new(EscalationHistory::new(Duration::from_secs(300))),
        )
    }

    #[tokio::test]
    async fn rejects_malformed_request() {
        let h = handler();
        let err = h.handle(request("", "reason", None)).await;
        assert!(err.is_err());
    }

    #[tokio::test]
    async fn denies_disallowed_suggested_target() {
        let h = handler();
        let decision = h
            .handle(request("locator", "anything", Some("nonexistent")))
            .await
            .unwrap();
        assert!(!decision.approved);
    }

    #[tokio::test]
    async fn approves_and_determines_target_from_reason() {
        let h = handler();
        let decision = h
            .handle(request("locator", "need to analyze code structure", None))
            .await
            .unwrap();
        assert!(decision.approved);
        assert_eq!(decision.target.as_deref(), Some("analyzer"));
        assert!(!decision.fallbacks.is_empty());
    }

    #[tokio::test]
    async fn denies_on_detected_loop() {
        let h = handler();
        // analyzer -> locator approved first.
        let first = h
            .handle(request("analyzer", "need to locate callers", Some("locator")))
            .await
            .unwrap();
        assert!(first.approved);

        // locator -> analyzer now closes the loop.
        let second = h
            .handle(request("locator", "need to analyze code structure", Some("analyzer")))
            .await
            .unwrap();
        assert!(!second.approved);
        assert!(second.reason.contains("loop"));
    }
}
