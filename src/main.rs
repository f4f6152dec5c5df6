// src/main.rs — redraft entry point

use clap::Parser;

use redraft::api::{self, ApiState};
use redraft::cli::{Cli, Commands};
use redraft::infra::config::Config;
use redraft::infra::errors::RedraftError;
use redraft::infra::logger;
use redraft::provider;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging (respects REDRAFT_LOG / RUST_LOG)
    logger::init_logging(logger::level_for(cli.verbose, cli.quiet));

    if let Err(e) = run(cli).await {
        eprintln!("{}", error_report(&e));
        std::process::exit(exit_code(&e));
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    // Load config (falls back to defaults if no config.toml)
    let mut config = match cli.config {
        Some(ref path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(ref model) = cli.model {
        config.model.model = model.clone();
    }

    let provider = provider::resolve_provider(&config.model)?;
    tracing::debug!(provider = provider.id(), model = %config.model.model, "Provider ready");

    match cli.command {
        Some(Commands::Serve { port }) => {
            if let Some(port) = port {
                config.api.port = port;
            }
            let api_config = config.api.clone();
            api::start_server(&api_config, ApiState::new(provider, config)).await
        }
        None => redraft::cli::run::run_essay(&cli, provider, &config).await,
    }
}

/// 2 for caller mistakes, 130 for Ctrl-C, 1 for everything else.
fn exit_code(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<RedraftError>() {
        Some(RedraftError::InvalidInput(_)) => 2,
        Some(RedraftError::Cancelled) => 130,
        _ => 1,
    }
}

/// The message printed on failure, with any unparsable model output appended.
fn error_report(err: &anyhow::Error) -> String {
    let mut out = format!("error: {err}");
    if let Some(raw) = err
        .downcast_ref::<RedraftError>()
        .and_then(RedraftError::raw_response)
    {
        out.push_str("\nraw model output:\n");
        out.push_str(raw);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_report_includes_raw_output() {
        let err = anyhow::Error::new(RedraftError::MalformedResponse {
            dimension: "language".into(),
            reason: "no JSON object found".into(),
            raw: "Pretty good, 8ish.".into(),
        });
        let report = error_report(&err);
        assert!(report.starts_with("error: Malformed language response"));
        assert!(report.ends_with("raw model output:\nPretty good, 8ish."));
        assert_eq!(exit_code(&err), 1);
    }

    #[test]
    fn test_error_report_plain_errors() {
        let err = anyhow::Error::new(RedraftError::InvalidInput("essay is empty".into()));
        assert_eq!(error_report(&err), "error: Invalid input: essay is empty");
        assert_eq!(exit_code(&err), 2);

        let err = anyhow::anyhow!("config file missing");
        assert_eq!(error_report(&err), "error: config file missing");
    }
}
