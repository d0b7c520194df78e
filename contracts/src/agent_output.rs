use serde::{Deserialize, Serialize};

/// The only version tag a conforming `AgentOutput` may carry.
pub const AGENT_OUTPUT_VERSION: &str = "AGENT_OUTPUT_V1";

/// A single `{file, lines}` evidence pair backing one or more claims.
/// `lines` is kept as the wire string ("10" or "10-20") rather than a
/// parsed `LineRange` so a malformed value is a validator finding, not a
/// deserialization panic.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EvidenceEntry {
    pub file: String,
    pub lines: String,
}

impl EvidenceEntry {
    pub fn key(&self) -> String {
        format!("{}:{}", self.file, self.lines)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EntryPoint {
    pub file: String,
    pub lines: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CallGraphEdge {
    pub from: String,
    pub to: String,
    pub file: String,
    pub via_line: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DataFlowItem {
    pub file: String,
    pub lines: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct DataFlow {
    #[serde(default)]
    pub inputs: Vec<DataFlowItem>,
    #[serde(default)]
    pub transformations: Vec<DataFlowItem>,
    #[serde(default)]
    pub outputs: Vec<DataFlowItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StateOperation {
    pub file: String,
    pub lines: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SideEffect {
    pub file: String,
    pub line: i64,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorHandler {
    pub file: String,
    pub lines: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConfigurationInfluence {
    pub file: String,
    pub line: i64,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Pattern {
    pub file: String,
    pub lines: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConcurrencyMechanism {
    pub file: String,
    pub lines: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExternalDependency {
    pub file: String,
    pub line: i64,
    #[serde(default)]
    pub description: String,
}

/// The versioned, evidence-backed structured record an agent returns for
/// one step. See `AGENT_OUTPUT_VERSION` for the required `version` tag.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AgentOutput {
    pub version: String,
    pub component: String,
    #[serde(default)]
    pub scope: String,
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub raw_evidence: Vec<EvidenceEntry>,
    #[serde(default)]
    pub entry_points: Vec<EntryPoint>,
    #[serde(default)]
    pub call_graph: Vec<CallGraphEdge>,
    #[serde(default)]
    pub data_flow: DataFlow,
    #[serde(default)]
    pub state_operations: Vec<StateOperation>,
    #[serde(default)]
    pub side_effects: Vec<SideEffect>,
    #[serde(default)]
    pub error_handlers: Vec<ErrorHandler>,
    #[serde(default)]
    pub configuration_influence: Vec<ConfigurationInfluence>,
    #[serde(default)]
    pub patterns: Vec<Pattern>,
    #[serde(default)]
    pub concurrency_mechanisms: Vec<ConcurrencyMechanism>,
    #[serde(default)]
    pub external_dependencies: Vec<ExternalDependency>,
}

impl AgentOutput {
    pub fn is_versioned_correctly(&self) -> bool {
        self.version == AGENT_OUTPUT_VERSION
    }
}
