// src/cli/run.rs — Default command: evaluate and refine one essay

use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use super::progress::{format_threshold, terminal_progress};
use super::Cli;
use crate::core::orchestrator::Orchestrator;
use crate::core::types::{EssayReport, EssayRequest};
use crate::infra::config::Config;
use crate::infra::errors::RedraftError;
use crate::provider::ModelProvider;

/// Run the refine loop for the essay named on the command line.
pub async fn run_essay(
    cli: &Cli,
    provider: Arc<dyn ModelProvider>,
    config: &Config,
) -> anyhow::Result<()> {
    let essay = read_essay(cli.essay.as_deref(), cli.stdin)?;
    let request = build_request(cli, essay);

    let cancel = CancellationToken::new();
    spawn_ctrl_c(cancel.clone(), cli.quiet);

    let mut orchestrator = Orchestrator::from_config(provider, config).with_cancel(cancel);
    if !cli.quiet {
        orchestrator = orchestrator.with_progress(terminal_progress());
        eprintln!(
            "[start] plan={} | model: {}",
            request.plan, config.model.model
        );
    }

    let report = orchestrator.run(request).await?;

    if let Some(ref path) = cli.output {
        std::fs::write(path, &report.essay)?;
        if !cli.quiet {
            eprintln!("[saved] {}", path.display());
        }
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", report.essay);
        if !cli.quiet {
            eprintln!("{}", summary(&report));
        }
    }

    Ok(())
}

/// Read the essay from a file or stdin.
pub fn read_essay(path: Option<&Path>, stdin: bool) -> anyhow::Result<String> {
    match (path, stdin) {
        (Some(path), false) => Ok(std::fs::read_to_string(path)?),
        (None, true) => read_from(std::io::stdin().lock()),
        _ => Err(RedraftError::InvalidInput(
            "provide an essay file or pass --stdin".into(),
        )
        .into()),
    }
}

fn read_from(mut reader: impl Read) -> anyhow::Result<String> {
    let mut buf = String::new();
    reader.read_to_string(&mut buf)?;
    Ok(buf)
}

/// Inbound request from parsed flags. Range checks happen when the loop starts.
pub fn build_request(cli: &Cli, essay: String) -> EssayRequest {
    EssayRequest {
        essay,
        plan: cli.plan,
        threshold: cli.threshold,
        max_iterations: cli.max_iterations,
    }
}

fn spawn_ctrl_c(token: CancellationToken, quiet: bool) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            if !quiet {
                eprintln!("[cancel] stopping after the current step");
            }
            token.cancel();
        }
    });
}

/// Trailing stderr summary after the essay is printed.
fn summary(report: &EssayReport) -> String {
    let threshold = report
        .threshold
        .map(format_threshold)
        .unwrap_or_else(|| "none".into());
    let mut out = format!(
        "\n[result] score={:.2} threshold={} revisions={} needs_improvement={}",
        report.avg_score, threshold, report.iteration_count, report.needs_improvement
    );
    if !report.overall_feedback.trim().is_empty() {
        out.push_str("\n[feedback] ");
        out.push_str(report.overall_feedback.trim());
    }
    out
}
