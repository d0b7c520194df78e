use std::collections::HashMap;

use agency_contracts::{AgentOutput, LineRange};
use serde::Serialize;
use tracing::warn;

use crate::error::FieldError;
use crate::schema::ValidationMode;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnbackedClaim {
    pub section: String,
    pub index: usize,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvidenceReport {
    pub valid: bool,
    pub coverage: f64,
    pub unbacked: Vec<UnbackedClaim>,
    pub errors: Vec<FieldError>,
}

/// One source-code claim: a single line or an inclusive range, in a file.
struct Claim {
    section: &'static str,
    index: usize,
    file: String,
    range: Option<LineRange>,
}

/// Verifies every claim in an `AgentOutput` references a listed
/// `file:line`; in strict mode also checks file/line reachability.
pub struct EvidenceValidator {
    mode: ValidationMode,
}

impl EvidenceValidator {
    pub fn new(mode: ValidationMode) -> Self {
        Self { mode }
    }

    pub fn validate(&self, output: &AgentOutput) -> EvidenceReport {
        let claims = collect_claims(output);
        let index = build_index(output);

        let mut unbacked = Vec::new();
        for claim in &claims {
            let backed = claim
                .range
                .map(|r| is_backed(&index, &claim.file, r))
                .unwrap_or(false);
            if !backed {
                unbacked.push(UnbackedClaim {
                    section: claim.section.to_string(),
                    index: claim.index,
                    description: format!(
                        "{}[{}] ({}) is not backed by any raw_evidence entry",
                        claim.section, claim.index, claim.file
                    ),
                });
            }
        }

        let coverage = if claims.is_empty() {
            1.0
        } else {
            (claims.len() - unbacked.len()) as f64 / claims.len() as f64
        };

        let mut errors = Vec::new();
        if self.mode == ValidationMode::Strict {
            errors.extend(check_raw_evidence_reachability(output));
        }

        let valid = coverage >= 1.0 && errors.is_empty();
        if !valid {
            warn!(
                component = %output.component,
                coverage,
                unbacked = unbacked.len(),
                "evidence validation found unbacked claims"
            );
        }

        EvidenceReport {
            valid,
            coverage,
            unbacked,
            errors,
        }
    }
}

fn build_index(output: &AgentOutput) -> HashMap<String, Vec<LineRange>> {
    let mut index: HashMap<String, Vec<LineRange>> = HashMap::new();
    for entry in &output.raw_evidence {
        if let Ok(range) = entry.lines.parse::<LineRange>() {
            index.entry(entry.file.clone()).or_default().push(range);
        }
    }
    index
}

fn is_backed(index: &HashMap<String, Vec<LineRange>>, file: &str, claim: LineRange) -> bool {
    let Some(candidates) = index.get(file) else {
        return false;
    };
    let is_single = claim.start == claim.end;
    candidates.iter().any(|candidate| {
        if is_single {
            candidate.contains(claim.start)
        } else {
            candidate.start == claim.start && candidate.end == claim.end
        }
    })
}

fn collect_claims(output: &AgentOutput) -> Vec<Claim> {
    let mut claims = Vec::new();

    for (i, e) in output.entry_points.iter().enumerate() {
        claims.push(Claim {
            section: "entry_points",
            index: i,
            file: e.file.clone(),
            range: e.lines.parse().ok(),
        });
    }

    for (i, e) in output.call_graph.iter().enumerate() {
        claims.push(Claim {
            section: "call_graph",
            index: i,
            file: e.file.clone(),
            range: u32::try_from(e.via_line).ok().map(LineRange::single),
        });
    }

    for (section, items) in [
        ("data_flow.inputs", &output.data_flow.inputs),
        ("data_flow.transformations", &output.data_flow.transformations),
        ("data_flow.outputs", &output.data_flow.outputs),
    ] {
        for (i, it) in items.iter().enumerate() {
            claims.push(Claim {
                section,
                index: i,
                file: it.file.clone(),
                range: it.lines.parse().ok(),
            });
        }
    }

    for (i, it) in output.state_operations.iter().enumerate() {
        claims.push(Claim {
            section: "state_operations",
            index: i,
            file: it.file.clone(),
            range: it.lines.parse().ok(),
        });
    }

    for (i, it) in output.side_effects.iter().enumerate() {
        claims.push(Claim {
            section: "side_effects",
            index: i,
            file: it.file.clone(),
            range: u32::try_from(it.line).ok().map(LineRange::single),
        });
    }

    for (i, it) in output.error_handlers.iter().enumerate() {
        claims.push(Claim {
            section: "error_handlers",
            index: i,
            file: it.file.clone(),
            range: it.lines.parse().ok(),
        });
    }

    for (i, it) in output.configuration_influence.iter().enumerate() {
        claims.push(Claim {
            section: "configuration_influence",
            index: i,
            file: it.file.clone(),
            range: u32::try_from(it.line).ok().map(LineRange::single),
        });
    }

    for (i, it) in output.patterns.iter().enumerate() {
        claims.push(Claim {
            section: "patterns",
            index: i,
            file: it.file.clone(),
            range: it.lines.parse().ok(),
        });
    }

    for (i, it) in output.concurrency_mechanisms.iter().enumerate() {
        claims.push(Claim {
            section: "concurrency_mechanisms",
            index: i,
            file: it.file.clone(),
            range: it.lines.parse().ok(),
        });
    }

    claims
}

fn check_raw_evidence_reachability(output: &AgentOutput) -> Vec<FieldError> {
    let mut errors = Vec::new();
    for (i, entry) in output.raw_evidence.iter().enumerate() {
        if entry.lines.parse::<LineRange>().is_err() {
            errors.push(FieldError::new(
                format!("raw_evidence[{i}].lines"),
                format!("does not parse as N or N-M: {:?}", entry.lines),
            ));
        }
        if !std::path::Path::new(&entry.file).is_file() {
            errors.push(FieldError::new(
                format!("raw_evidence[{i}].file"),
                format!("file does not exist or is not readable: {:?}", entry.file),
            ));
        }
    }
    errors
}
