//! Request router: scores a natural-language request against a rule
//! table and picks a primary agent. Pure with respect to its rule set.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// A single routing rule: an ordered keyword set, the agent it routes
/// to, and a tie-breaking priority.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingRule {
    pub keywords: Vec<String>,
    pub agent: String,
    pub priority: i32,
}

impl RoutingRule {
    pub fn new(keywords: &[&str], agent: &str, priority: i32) -> Self {
        Self {
            keywords: keywords.iter().map(|s| s.to_string()).collect(),
            agent: agent.to_string(),
            priority,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    pub default_agent: String,
}

impl Default for RouterConfig {
    fn default() -> Self {
        // The catch-all default the source system uses; kept configurable
        // per the spec's open question on whether this was intentional.
        Self {
            default_agent: "locator".to_string(),
        }
    }
}

/// Lowercases the input text, scores each rule by whole-word keyword
/// matches, breaks ties by higher priority, and returns the winning
/// rule's agent (or the configured default).
#[derive(Debug, Clone)]
pub struct Router {
    rules: Vec<RoutingRule>,
    config: RouterConfig,
}

impl Router {
    pub fn new(config: RouterConfig) -> Self {
        Self {
            rules: Vec::new(),
            config,
        }
    }

    pub fn with_rules(config: RouterConfig, rules: Vec<RoutingRule>) -> Self {
        Self { rules, config }
    }

    pub fn add_rule(&mut self, rule: RoutingRule) {
        self.rules.push(rule);
    }

    pub fn remove_rule(&mut self, agent: &str) {
        self.rules.retain(|r| r.agent != agent);
    }

    pub fn rules(&self) -> &[RoutingRule] {
        &self.rules
    }

    pub fn route(&self, text: &str) -> String {
        let lowered = text.to_lowercase();
        let words: HashSet<&str> = lowered.split_whitespace().collect();

        let mut best: Option<(&RoutingRule, usize)> = None;
        for rule in &self.rules {
            let score = rule
                .keywords
                .iter()
                .filter(|kw| words.contains(kw.as_str()))
                .count();
            if score == 0 {
                continue;
            }
            best = match best {
                None => Some((rule, score)),
                Some((current, current_score)) => {
                    if score > current_score
                        || (score == current_score && rule.priority > current.priority)
                    {
                        Some((rule, score))
                    } else {
                        Some((current, current_score))
                    }
                }
            };
        }

        let agent = best
            .map(|(rule, _)| rule.agent.clone())
            .unwrap_or_else(|| self.config.default_agent.clone());
        debug!(agent = %agent, "routed request");
        agent
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }
}

pub fn default_rules() -> Vec<RoutingRule> {
    vec![
        RoutingRule::new(&["find", "go", "files"], "locator", 1),
        RoutingRule::new(&["locate", "where"], "locator", 1),
        RoutingRule::new(&["analyze", "understand", "explain"], "analyzer", 1),
        RoutingRule::new(&["pattern", "patterns", "similar", "duplicate"], "pattern-finder", 1),
    ]
}
