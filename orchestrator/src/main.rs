//! Orchestrator CLI - submit a request for routing and execution, or serve
//! the newline-delimited JSON-RPC transport over stdin/stdout.

use std::path::PathBuf;
use std::sync::Arc;

use agency_contracts::agent_output::AGENT_OUTPUT_VERSION;
use agency_contracts::{
    AgentOutput, AgentRequest, AgentResponse, AgentStatus, EntryPoint, EvidenceEntry, Permissions,
};
use agency_execution::{AgentInvoker, AgentRegistry};
use agency_orchestrator::rpc::{parse_line, serialize_response, RpcResponse, INTERNAL_ERROR, METHOD_NOT_FOUND};
use agency_orchestrator::{AppConfig, Orchestrator};
use async_trait::async_trait;
use chrono::Utc;
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "agency-orchestrator")]
#[command(about = "Code-analysis multi-agent orchestration runtime")]
struct Cli {
    /// Path to a TOML config file; built-in defaults are used when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Route a natural-language request to a demo agent and print the result.
    Demo {
        /// Natural language description of the request to route.
        request: String,

        /// Directory the demo agent is allowed to read.
        #[arg(long)]
        allowed_dir: Option<String>,
    },
    /// Serve newline-delimited JSON-RPC 2.0 requests over stdin/stdout.
    Serve,
}

/// Stands in for the opaque agent executables this runtime orchestrates.
/// Always completes, citing one evidence entry under the request's first
/// allowed directory.
struct DemoAgent;

#[async_trait]
impl AgentInvoker for DemoAgent {
    async fn invoke(&self, request: AgentRequest) -> AgentResponse {
        let dir = request
            .permissions
            .allowed_directories
            .first()
            .cloned()
            .unwrap_or_else(|| ".".to_string());
        let file = format!("{dir}/demo.txt");

        AgentResponse {
            request_id: uuid::Uuid::new_v4().to_string(),
            agent_id: "demo".to_string(),
            status: AgentStatus::Complete,
            output: Some(AgentOutput {
                version: AGENT_OUTPUT_VERSION.to_string(),
                component: "demo".to_string(),
                scope: dir,
                overview: format!("Demo response to: {}", request.context.user_request),
                raw_evidence: vec![EvidenceEntry {
                    file: file.clone(),
                    lines: "1".to_string(),
                }],
                entry_points: vec![EntryPoint {
                    file,
                    lines: "1".to_string(),
                    description: "demo entry point".to_string(),
                }],
                call_graph: vec![],
                data_flow: Default::default(),
                state_operations: vec![],
                side_effects: vec![],
                error_handlers: vec![],
                configuration_influence: vec![],
                patterns: vec![],
                concurrency_mechanisms: vec![],
                external_dependencies: vec![],
            }),
            error: None,
            escalation: None,
            timestamp: Utc::now(),
        }
    }
}

fn demo_registry() -> AgentRegistry {
    let mut registry = AgentRegistry::new();
    for name in ["locator", "analyzer", "pattern-finder", "synthesizer"] {
        registry.register(name, Arc::new(DemoAgent) as Arc<dyn AgentInvoker>);
    }
    registry
}

fn load_config(path: Option<PathBuf>) -> AppConfig {
    match path {
        Some(p) => AppConfig::from_toml_file(&p).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "failed to load config file, using defaults");
            AppConfig::default()
        }),
        None => AppConfig::default(),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config);
    let orchestrator = Orchestrator::new(config, demo_registry());

    match cli.command {
        Commands::Demo { request, allowed_dir } => {
            let permissions = Permissions {
                allowed_directories: allowed_dir.into_iter().collect(),
                read_only: true,
            };
            let response = orchestrator
                .handle_request(&request, permissions, CancellationToken::new())
                .await?;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Commands::Serve => serve_rpc(orchestrator).await?,
    }

    Ok(())
}

async fn serve_rpc(orchestrator: Orchestrator) -> Result<(), Box<dyn std::error::Error>> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    while let Some(line) = lines.next_line().await? {
        let response = match parse_line(&line) {
            Err(error_response) => error_response,
            Ok(request) => match request.method.as_str() {
                "handle_request" => {
                    let id = agency_orchestrator::rpc::RequestId::normalize(request.id.clone());
                    let text = request
                        .params
                        .get("text")
                        .and_then(|v| v.as_str())
                        .unwrap_or_default();
                    let permissions = request
                        .params
                        .get("permissions")
                        .and_then(|v| serde_json::from_value(v.clone()).ok())
                        .unwrap_or_default();

                    match orchestrator
                        .handle_request(text, permissions, CancellationToken::new())
                        .await
                    {
                        Ok(result) => match serde_json::to_value(&result) {
                            Ok(value) => RpcResponse::ok(id, value),
                            Err(e) => RpcResponse::err(id, INTERNAL_ERROR, e.to_string()),
                        },
                        Err(e) => RpcResponse::err(id, INTERNAL_ERROR, e.to_string()),
                    }
                }
                other => {
                    let id = agency_orchestrator::rpc::RequestId::normalize(request.id.clone());
                    RpcResponse::err(id, METHOD_NOT_FOUND, format!("unknown method: {other}"))
                }
            },
        };

        let line = serialize_response(&response);
        stdout.write_all(line.as_bytes()).await?;
        stdout.write_all(b"\n").await?;
        stdout.flush().await?;
    }

    Ok(())
}
