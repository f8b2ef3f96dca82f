use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use regions_contract::{
    cases::{catalog, select},
    config::{Settings, DEFAULT_BASE_URL},
    regions::RegionsClient,
    stub::{self, StubState},
    suite::run_suite,
};

#[derive(Parser)]
#[command(name = "regions-contract", version)]
#[command(about = "Contract checks for the regions lookup API")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the contract catalog against the endpoint (default)
    Check {
        /// Endpoint to check
        #[arg(long, value_name = "URL", env = "REGIONS_BASE_URL", default_value = DEFAULT_BASE_URL)]
        base_url: String,
        /// Run only the named cases
        #[arg(long = "only", value_name = "CASE")]
        only: Vec<String>,
    },
    /// Serve the reference stub of the endpoint
    Stub {
        #[arg(long, value_name = "ADDR", env = "REGIONS_STUB_ADDR", default_value = "127.0.0.1:8000")]
        addr: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // loads .env first so the flags below see it
    let settings = Settings::from_env();
    let cli = Cli::parse();

    let command = cli.command.unwrap_or_else(|| Command::Check {
        base_url: settings.base_url.clone(),
        only: Vec::new(),
    });
    match command {
        Command::Check { base_url, only } => check(settings.with_base_url(base_url), &only).await,
        Command::Stub { addr } => {
            let listener = match tokio::net::TcpListener::bind(&addr).await {
                Ok(l) => l,
                Err(e) => {
                    tracing::error!("cannot bind {}: {}", addr, e);
                    return ExitCode::FAILURE;
                }
            };
            let state = StubState {
                default_page_size: settings.default_page_size,
                ..StubState::default()
            };
            match stub::serve(listener, state).await {
                Ok(()) => ExitCode::SUCCESS,
                Err(e) => {
                    tracing::error!("stub server failed: {}", e);
                    ExitCode::FAILURE
                }
            }
        }
    }
}

async fn check(settings: Settings, only: &[String]) -> ExitCode {
    let cases = select(catalog(&settings), only);
    if cases.is_empty() {
        tracing::error!("no cases match {:?}", only);
        return ExitCode::FAILURE;
    }

    tracing::info!("checking {} cases against {}", cases.len(), settings.base_url);
    let client = match RegionsClient::new(settings) {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let report = run_suite(&client, &cases).await;
    for verdict in &report.verdicts {
        println!("{verdict}");
    }
    println!("{} passed, {} failed", report.passed(), report.failed());

    if report.all_passed() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use pretty_assertions::assert_eq;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn base_url_flag_is_taken_verbatim() {
        let cli = Cli::try_parse_from(["regions-contract", "check", "--base-url", "http://127.0.0.1:9/r", "--only", "kz_region"])
            .unwrap();
        match cli.command {
            Some(Command::Check { base_url, only }) => {
                assert_eq!(base_url, "http://127.0.0.1:9/r");
                assert_eq!(only, vec!["kz_region".to_string()]);
            }
            _ => panic!("expected check"),
        }
    }

    #[test]
    fn stub_addr_flag_is_taken_verbatim() {
        let cli = Cli::try_parse_from(["regions-contract", "stub", "--addr", "0.0.0.0:8080"]).unwrap();
        assert!(matches!(cli.command, Some(Command::Stub { addr }) if addr == "0.0.0.0:8080"));
    }
}
