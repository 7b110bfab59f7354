mod repl;

use std::time::Duration;

use befriend::{ApiError, Client, ClientConfig};
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("health check failed: HTTP {0}")]
    Unhealthy(u16),
    #[error("sign in first")]
    NotSignedIn,
}

impl CliError {
    /// Stable code shown next to the message.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Api(e) => e.error_code(),
            Self::Http(_) => "E_HTTP_CLIENT",
            Self::Io(_) => "E_IO",
            Self::Unhealthy(_) => "E_UNHEALTHY",
            Self::NotSignedIn => "E_NOT_SIGNED_IN",
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "befriend", about = "Interactive client for the befriend identity provider")]
struct Cli {
    #[arg(long, env = "BEFRIEND_API_URL", default_value = befriend::config::DEFAULT_API_BASE_URL)]
    api_url: String,

    #[arg(long, env = "BEFRIEND_REQUEST_TIMEOUT_SECS", default_value_t = befriend::config::DEFAULT_REQUEST_TIMEOUT_SECS)]
    timeout_secs: u64,

    #[arg(long, env = "BEFRIEND_ALLOW_SELF_INVITE", default_value_t = false)]
    allow_self_invite: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check that the provider is reachable.
    Ping,
    /// Read commands from stdin, one per line (the default).
    Shell,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    if let Err(e) = run(Cli::parse()).await {
        eprintln!("[{}] {e}", e.error_code());
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = ClientConfig {
        api_base_url: cli.api_url.trim().trim_end_matches('/').to_owned(),
        request_timeout_secs: cli.timeout_secs,
        allow_self_invite: cli.allow_self_invite,
        ..ClientConfig::from_env()?
    };

    match cli.command.unwrap_or(Command::Shell) {
        Command::Ping => run_ping(&config).await,
        Command::Shell => run_shell(&config).await,
    }
}

async fn run_ping(config: &ClientConfig) -> Result<(), CliError> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .build()?;
    let response = client.get(format!("{}/healthz", config.api_base_url)).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(CliError::Unhealthy(status.as_u16()));
    }
    println!("ok");
    Ok(())
}

async fn run_shell(config: &ClientConfig) -> Result<(), CliError> {
    let client = Client::connect(config)?;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        stdout.write_all(format!("{}> ", client.navigator.location()).as_bytes()).await?;
        stdout.flush().await?;
        let Some(line) = lines.next_line().await? else {
            break;
        };

        let command = match repl::parse_line(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(usage) => {
                println!("{usage}");
                continue;
            }
        };
        if matches!(command, repl::ReplCommand::Quit) {
            break;
        }

        match repl::execute(&client, command).await {
            Ok(output) => println!("{output}"),
            Err(e) => println!("[{}] {e}", e.error_code()),
        }
    }
    Ok(())
}
