use std::collections::HashMap;

/// Keyword -> preferred target agent, checked in this fixed order.
const KEYWORD_RULES: &[(&[&str], &str)] = &[
    (&["pattern", "similar"], "pattern-finder"),
    (&["analyze", "understand"], "analyzer"),
    (&["find", "locate"], "locator"),
];

/// Allowed transitions, fallback chains, and depth limit for the
/// escalation graph. Not thread-safe on its own; the handler guards it
/// behind a reader/writer lock.
#[derive(Debug, Clone)]
pub struct EscalationPolicy {
    allowed: HashMap<String, Vec<String>>,
    fallbacks: HashMap<String, Vec<String>>,
    max_depth: u32,
}

impl EscalationPolicy {
    pub fn new(
        allowed: HashMap<String, Vec<String>>,
        fallbacks: HashMap<String, Vec<String>>,
        max_depth: u32,
    ) -> Self {
        Self {
            allowed,
            fallbacks,
            max_depth: max_depth.max(1),
        }
    }

    /// Illustrative default topology for code-analysis specialists: a
    /// locator may escalate to an analyzer or pattern-finder, an analyzer
    /// may escalate back to a locator or to a pattern-finder, a
    /// pattern-finder may escalate to an analyzer, and an orchestrator
    /// role may reach any specialist.
    pub fn default_topology() -> Self {
        let mut allowed = HashMap::new();
        allowed.insert(
            "locator".to_string(),
            vec!["analyzer".to_string(), "pattern-finder".to_string()],
        );
        allowed.insert(
            "analyzer".to_string(),
            vec!["pattern-finder".to_string(), "locator".to_string()],
        );
        allowed.insert(
            "pattern-finder".to_string(),
            vec!["analyzer".to_string()],
        );
        allowed.insert(
            "orchestrator".to_string(),
            vec![
                "locator".to_string(),
                "analyzer".to_string(),
                "pattern-finder".to_string(),
            ],
        );

        let mut fallbacks = HashMap::new();
        fallbacks.insert("locator".to_string(), vec!["analyzer".to_string()]);
        fallbacks.insert("analyzer".to_string(), vec!["locator".to_string()]);
        fallbacks.insert(
            "pattern-finder".to_string(),
            vec!["analyzer".to_string()],
        );

        Self::new(allowed, fallbacks, 3)
    }

    pub fn allow_escalation(&self, source: &str, target: &str) -> bool {
        if source == target {
            return false;
        }
        self.allowed
            .get(source)
            .map(|targets| targets.iter().any(|t| t == target))
            .unwrap_or(false)
    }

    /// Case-insensitive keyword match on `reason` against the fixed
    /// `KEYWORD_RULES` order. A keyword's preferred target wins if it is
    /// allowed for `source`; otherwise the first allowed target for
    /// `source` is used. Returns `None` if `source` has no allowed
    /// targets at all.
    pub fn determine_target(&self, source: &str, reason: &str) -> Option<String> {
        let allowed = self.allowed.get(source)?;
        if allowed.is_empty() {
            return None;
        }

        let reason_lower = reason.to_lowercase();
        for (keywords, preferred) in KEYWORD_RULES {
            if keywords.iter().any(|kw| reason_lower.contains(kw))
                && allowed.iter().any(|t| t == preferred)
            {
                return Some((*preferred).to_string());
            }
        }

        allowed.first().cloned()
    }

    pub fn get_fallbacks(&self, agent: &str) -> Vec<String> {
        self.fallbacks.get(agent).cloned().unwrap_or_default()
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    /// Non-positive inputs are ignored; `max_depth` is left unchanged.
    pub fn set_max_depth(&mut self, depth: i64) {
        if depth > 0 {
            self.max_depth = depth as u32;
        }
    }
}
