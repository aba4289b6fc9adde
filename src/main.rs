use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;

use symptom_chat_lib::client::HttpSymptomApi;
use symptom_chat_lib::config::{self, ClientConfig};
use symptom_chat_lib::controller::ChatController;
use symptom_chat_lib::error::Result;
use symptom_chat_lib::models::{ApiMode, PatientInfo};
use symptom_chat_lib::terminal::{self, TerminalView};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Backend root URL
    #[arg(long, env = "SYMPTOM_CHAT_BASE_URL", default_value = config::DEFAULT_BASE_URL)]
    base_url: String,

    /// Analysis mode sent with every check (mock or deepseek)
    #[arg(long, env = "SYMPTOM_CHAT_API_MODE", default_value = "mock")]
    mode: ApiMode,

    /// Patient age, sent as given
    #[arg(long)]
    age: Option<String>,

    /// Patient gender
    #[arg(long)]
    gender: Option<String>,

    /// Patient name
    #[arg(long)]
    name: Option<String>,

    /// Write the latest results panel HTML to this file
    #[arg(long)]
    html_out: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    symptom_chat_lib::init_tracing();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "symptom-chat failed");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = ClientConfig::new(&cli.base_url, cli.mode);
    tracing::info!(base_url = %config.base_url, mode = %config.api_mode, "Using backend");

    let api = Arc::new(HttpSymptomApi::new(&config)?);
    let view = TerminalView::new(std::io::stdout(), cli.html_out)?;
    let controller = ChatController::new(api, view, &config);
    let patient = PatientInfo::new(
        cli.age.as_deref(),
        cli.gender.as_deref(),
        cli.name.as_deref(),
    );

    let input = tokio::io::BufReader::new(tokio::io::stdin());
    terminal::run(controller, input, patient).await?;
    Ok(())
}
