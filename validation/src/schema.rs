use agency_contracts::agent_output::AGENT_OUTPUT_VERSION;
use agency_contracts::paths::is_absolute_path;
use agency_contracts::AgentOutput;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::FieldError;

/// Strict mode treats missing optional sections and non-absolute paths as
/// hard errors; partial mode downgrades them to warnings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ValidationMode {
    Strict,
    #[default]
    Partial,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaReport {
    pub valid: bool,
    pub errors: Vec<FieldError>,
    pub warnings: Vec<FieldError>,
}

impl SchemaReport {
    fn ok() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }
}

/// Structural validation of an agent's typed output. Never mutates the
/// input. See `AGENT_OUTPUT_VERSION` and the per-section rules in the
/// component's contract.
pub struct SchemaValidator {
    mode: ValidationMode,
}

impl SchemaValidator {
    pub fn new(mode: ValidationMode) -> Self {
        Self { mode }
    }

    pub fn validate(&self, output: &AgentOutput) -> SchemaReport {
        let mut report = SchemaReport::ok();

        if output.version != AGENT_OUTPUT_VERSION {
            report.errors.push(FieldError::new(
                "version",
                format!(
                    "must equal {:?}, got {:?}",
                    AGENT_OUTPUT_VERSION, output.version
                ),
            ));
        }

        if output.component.is_empty() {
            report
                .errors
                .push(FieldError::new("component", "must be non-empty"));
        }

        if output.overview.len() < 20 {
            report.warnings.push(FieldError::new(
                "overview",
                "overview shorter than 20 characters is likely under-specified",
            ));
        }

        if output.raw_evidence.is_empty() {
            report.warnings.push(FieldError::new(
                "raw_evidence",
                "empty raw_evidence means every claim will be flagged unbacked",
            ));
        }

        self.check_file(&mut report, "entry_points", output.entry_points.iter().enumerate().map(|(i, e)| {
            (i, e.file.as_str(), Some(e.lines.as_str()))
        }));
        self.check_lines_only(&mut report, "entry_points", output.entry_points.iter().enumerate().map(|(i, e)| (i, e.lines.as_str())));

        for (i, edge) in output.call_graph.iter().enumerate() {
            if edge.from.is_empty() {
                report.errors.push(FieldError::new(
                    format!("call_graph[{i}].from"),
                    "must be non-empty",
                ));
            }
            if edge.to.is_empty() {
                report.errors.push(FieldError::new(
                    format!("call_graph[{i}].to"),
                    "must be non-empty",
                ));
            }
            if edge.via_line <= 0 {
                report.errors.push(FieldError::new(
                    format!("call_graph[{i}].via_line"),
                    "must be a positive integer",
                ));
            }
            self.check_absolute(&mut report, &format!("call_graph[{i}].file"), &edge.file);
        }

        for (section, items) in [
            ("data_flow.inputs", &output.data_flow.inputs),
            ("data_flow.transformations", &output.data_flow.transformations),
            ("data_flow.outputs", &output.data_flow.outputs),
        ] {
            self.check_file(&mut report, section, items.iter().enumerate().map(|(i, it)| (i, it.file.as_str(), Some(it.lines.as_str()))));
            self.check_lines_only(&mut report, section, items.iter().enumerate().map(|(i, it)| (i, it.lines.as_str())));
        }

        self.check_file(&mut report, "state_operations", output.state_operations.iter().enumerate().map(|(i, it)| (i, it.file.as_str(), Some(it.lines.as_str()))));
        self.check_lines_only(&mut report, "state_operations", output.state_operations.iter().enumerate().map(|(i, it)| (i, it.lines.as_str())));

        for (i, it) in output.side_effects.iter().enumerate() {
            self.check_absolute(&mut report, &format!("side_effects[{i}].file"), &it.file);
            if it.line <= 0 {
                report.errors.push(FieldError::new(
                    format!("side_effects[{i}].line"),
                    "must be a single positive integer",
                ));
            }
        }

        self.check_file(&mut report, "error_handlers", output.error_handlers.iter().enumerate().map(|(i, it)| (i, it.file.as_str(), Some(it.lines.as_str()))));
        self.check_lines_only(&mut report, "error_handlers", output.error_handlers.iter().enumerate().map(|(i, it)| (i, it.lines.as_str())));

        for (i, it) in output.configuration_influence.iter().enumerate() {
            self.check_absolute(&mut report, &format!("configuration_influence[{i}].file"), &it.file);
            if it.line <= 0 {
                report.errors.push(FieldError::new(
                    format!("configuration_influence[{i}].line"),
                    "must be a single positive integer",
                ));
            }
        }

        self.check_file(&mut report, "patterns", output.patterns.iter().enumerate().map(|(i, it)| (i, it.file.as_str(), Some(it.lines.as_str()))));
        self.check_lines_only(&mut report, "patterns", output.patterns.iter().enumerate().map(|(i, it)| (i, it.lines.as_str())));

        self.check_file(&mut report, "concurrency_mechanisms", output.concurrency_mechanisms.iter().enumerate().map(|(i, it)| (i, it.file.as_str(), Some(it.lines.as_str()))));
        self.check_lines_only(&mut report, "concurrency_mechanisms", output.concurrency_mechanisms.iter().enumerate().map(|(i, it)| (i, it.lines.as_str())));

        for (i, it) in output.external_dependencies.iter().enumerate() {
            self.check_absolute(&mut report, &format!("external_dependencies[{i}].file"), &it.file);
            if it.line <= 0 {
                report.errors.push(FieldError::new(
                    format!("external_dependencies[{i}].line"),
                    "must be a single positive integer",
                ));
            }
        }

        if self.mode == ValidationMode::Strict {
            self.check_completeness(&mut report, output);
        }

        report.valid = report.errors.is_empty();
        if !report.valid {
            warn!(
                component = %output.component,
                mode = ?self.mode,
                errors = report.errors.len(),
                "schema validation failed"
            );
        }
        report
    }

    fn check_absolute(&self, report: &mut SchemaReport, field: &str, file: &str) {
        if !is_absolute_path(file) {
            let issue = FieldError::new(field, "file path must be absolute");
            match self.mode {
                ValidationMode::Strict => report.errors.push(issue),
                ValidationMode::Partial => report.warnings.push(issue),
            }
        }
    }

    fn check_file<'a>(
        &self,
        report: &mut SchemaReport,
        section: &str,
        items: impl Iterator<Item = (usize, &'a str, Option<&'a str>)>,
    ) {
        for (i, file, _) in items {
            self.check_absolute(report, &format!("{section}[{i}].file"), file);
        }
    }

    fn check_lines_only<'a>(
        &self,
        report: &mut SchemaReport,
        section: &str,
        items: impl Iterator<Item = (usize, &'a str)>,
    ) {
        for (i, lines) in items {
            if lines.parse::<agency_contracts::LineRange>().is_err() {
                report.errors.push(FieldError::new(
                    format!("{section}[{i}].lines"),
                    format!("must match N or N-M with N <= M, got {lines:?}"),
                ));
            }
        }
    }

    fn check_completeness(&self, report: &mut SchemaReport, output: &AgentOutput) {
        let sections: [(&str, bool); 9] = [
            ("entry_points", output.entry_points.is_empty()),
            ("call_graph", output.call_graph.is_empty()),
            (
                "data_flow",
                output.data_flow.inputs.is_empty()
                    && output.data_flow.transformations.is_empty()
                    && output.data_flow.outputs.is_empty(),
            ),
            ("state_operations", output.state_operations.is_empty()),
            ("side_effects", output.side_effects.is_empty()),
            ("error_handlers", output.error_handlers.is_empty()),
            (
                "configuration_influence",
                output.configuration_influence.is_empty(),
            ),
            ("patterns", output.patterns.is_empty()),
            (
                "concurrency_mechanisms",
                output.concurrency_mechanisms.is_empty(),
            ),
        ];
        for (name, empty) in sections {
            if empty {
                report.errors.push(FieldError::new(
                    name,
                    "section is empty; strict mode requires structural completeness",
                ));
            }
        }
    }
}
