// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{anyhow, bail, Result};
use clap::{Args, Parser, Subcommand};
use serde_json::json;
use std::io::Write;
use std::process::ExitCode;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use crate::config::ClientConfig;
use crate::input::{self, SampleCategory, SAMPLE_QUERIES};
use crate::query::{check_health, Query, SubmissionController, SubmissionState};
use crate::render::{failure_text, render, to_text, HeaderStrategy};

/// MCP orchestrator query client
#[derive(Parser, Debug)]
#[command(name = "mcp-query")]
#[command(version)]
#[command(about = "Ask questions about electric vehicles or state tax data", long_about = None)]
pub struct Cli {
    /// Origin the primary query path is resolved against [default: http://localhost:3000]
    #[arg(long, global = true)]
    pub origin: Option<String>,

    /// Primary query path, relative to the origin [default: /api/query]
    #[arg(long, global = true)]
    pub path: Option<String>,

    /// Direct backend address tried after a proxy or malformed-response failure
    #[arg(long, global = true)]
    pub fallback_url: Option<String>,

    /// Per-attempt timeout in milliseconds (no timeout when unset)
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    /// Build table headers from the union of all rows' keys
    #[arg(long, global = true)]
    pub union_columns: bool,

    /// Output machine-readable JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Submit a single question
    Ask(AskArgs),

    /// Read questions from stdin, one per line
    Repl,

    /// List the sample questions
    Examples,

    /// Check that the backend is reachable
    Health,
}

#[derive(Args, Debug)]
pub struct AskArgs {
    /// Question text
    #[arg(required_unless_present = "example", conflicts_with = "example")]
    pub query: Vec<String>,

    /// Submit sample question N from `examples` instead
    #[arg(long)]
    pub example: Option<usize>,
}

impl Cli {
    /// Environment configuration with command-line overrides applied
    pub fn config(&self) -> ClientConfig {
        let mut config = ClientConfig::from_env();
        if let Some(origin) = &self.origin {
            config.origin = origin.clone();
        }
        if let Some(path) = &self.path {
            config.primary_path = path.clone();
        }
        if let Some(fallback_url) = &self.fallback_url {
            config.fallback_url = fallback_url.clone();
        }
        if self.timeout_ms.is_some() {
            config.request_timeout_ms = self.timeout_ms;
        }
        if self.union_columns {
            config.header_strategy = HeaderStrategy::UnionOfKeys;
        }
        config
    }
}

struct Output {
    json: bool,
    styled: bool,
    header_strategy: HeaderStrategy,
}

impl Output {
    /// Print a terminal state; returns whether it was a success
    fn state(&self, state: &SubmissionState) -> Result<bool> {
        match state {
            SubmissionState::Succeeded(result) => {
                let view = render(result, self.header_strategy);
                if self.json {
                    println!("{}", serde_json::to_string_pretty(&view)?);
                } else {
                    print!("{}", to_text(&view, self.styled));
                }
                Ok(true)
            }
            SubmissionState::Failed(message) => {
                if self.json {
                    let failure = json!({ "kind": "failed", "message": message });
                    println!("{}", serde_json::to_string_pretty(&failure)?);
                } else {
                    eprint!("{}", failure_text(message, self.styled));
                }
                Ok(false)
            }
            SubmissionState::Idle | SubmissionState::Pending => Ok(false),
        }
    }
}

/// Execute CLI command
pub async fn execute(cli: Cli) -> Result<ExitCode> {
    let config = cli.config();
    let output = Output {
        json: cli.json,
        styled: !cli.no_color && console::colors_enabled(),
        header_strategy: config.header_strategy,
    };

    match cli.command {
        Commands::Ask(args) => ask(&config, &output, args).await,
        Commands::Repl => repl(&config, &output).await,
        Commands::Examples => examples(&output),
        Commands::Health => health(&config, &output).await,
    }
}

async fn ask(config: &ClientConfig, output: &Output, args: AskArgs) -> Result<ExitCode> {
    let text = match args.example {
        Some(index) => input::sample(index)
            .map(|sample| sample.text.to_string())
            .ok_or_else(|| anyhow!("No sample question {} (see `examples`)", index))?,
        None => args.query.join(" "),
    };
    let Some(query) = input::capture(&text) else {
        bail!("Query must not be empty");
    };

    let controller = SubmissionController::from_config(config)?;
    let state = controller.submit(query).await;

    Ok(if output.state(&state)? {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

async fn repl(config: &ClientConfig, output: &Output) -> Result<ExitCode> {
    let controller = SubmissionController::from_config(config)?;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        write_prompt(&mut std::io::stdout(), output)?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let trimmed = line.trim();
        if trimmed == "exit" || trimmed == "quit" {
            break;
        }
        let Some(query) = input::capture(trimmed) else {
            continue;
        };

        let state = submit_with_progress(&controller, query, output).await;
        output.state(&state)?;
        println!();
    }

    Ok(ExitCode::SUCCESS)
}

/// Interactive prompt; left out of JSON output so stdout stays parseable
fn write_prompt(out: &mut impl Write, output: &Output) -> std::io::Result<()> {
    if output.json {
        return Ok(());
    }
    write!(out, "query> ")?;
    out.flush()
}

async fn submit_with_progress(
    controller: &SubmissionController,
    query: Query,
    output: &Output,
) -> SubmissionState {
    if !output.json {
        eprintln!("Processing...");
    }
    let state = controller.submit(query).await;
    debug!("Submission finished, pending: {}", controller.is_pending());
    state
}

fn examples(output: &Output) -> Result<ExitCode> {
    if output.json {
        let items: Vec<_> = SAMPLE_QUERIES
            .iter()
            .enumerate()
            .map(|(i, sample)| {
                json!({
                    "index": i + 1,
                    "source": sample.category.source().as_str(),
                    "query": sample.text,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(ExitCode::SUCCESS);
    }

    for category in [SampleCategory::ElectricVehicles, SampleCategory::StateTax] {
        println!("{}", console::style(category.title()).bold().force_styling(output.styled));
        for (i, sample) in SAMPLE_QUERIES.iter().enumerate() {
            if sample.category == category {
                println!("  {}. {}", i + 1, sample.text);
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

async fn health(config: &ClientConfig, output: &Output) -> Result<ExitCode> {
    let mut any_healthy = false;
    let mut report = Vec::new();

    for url in config.health_endpoints()? {
        let (status, detail) = match check_health(&url, config.request_timeout_ms).await {
            Ok(health) => {
                any_healthy |= health.is_healthy();
                let detail = if health.orchestrator_ready {
                    "orchestrator ready"
                } else {
                    "orchestrator not initialized"
                };
                (health.status, detail.to_string())
            }
            Err(e) => ("unreachable".to_string(), e.to_string()),
        };

        if output.json {
            report.push(json!({ "url": url.as_str(), "status": status, "detail": detail }));
        } else {
            println!("{}: {} ({})", url, status, detail);
        }
    }

    if output.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    Ok(if any_healthy {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
