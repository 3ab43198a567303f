use std::io::BufRead;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};

use crate::analysis::classify::{Summary, Verdict};
use crate::analysis::history::{load_history, HistoryEntry};
use crate::analysis::Analysis;
use crate::auth::{self, LoginOutcome};
use crate::client::EyeSenseClient;
use crate::config::{self, AppConfig, WorkflowConfig};
use crate::models::{Label, SelectedFile};
use crate::report::{export, format_percent};
use crate::session::{FileStore, SessionContext};
use crate::workflow::notice::NoticeBoard;
use crate::workflow::{AnalysisWorkflow, AnalyzeOutcome};

#[derive(Debug, Parser)]
#[command(name = "eyesense", version, about = "Eye Sense eye-image analysis client")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Authenticate against the backend and remember the session.
    Login(LoginArgs),
    /// End the session.
    Logout,
    /// Upload an eye image and show the diagnosis.
    Analyze(AnalyzeArgs),
    /// List past analyses with their dominant condition.
    History(HistoryArgs),
}

#[derive(Debug, Args)]
pub struct LoginArgs {
    #[arg(long)]
    pub email: String,

    #[arg(long, help = "Password (else EYESENSE_PASSWORD, else read from stdin)")]
    pub password: Option<String>,
}

#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    /// Image file to analyze.
    pub file: PathBuf,

    #[arg(long, default_value_t = false, help = "Export a PDF report")]
    pub pdf: bool,

    #[arg(long, default_value_t = false, help = "Export a plain-text report")]
    pub txt: bool,

    #[arg(long, default_value_t = false, help = "Print the result as JSON")]
    pub json: bool,

    #[arg(long, help = "Export directory (default: <data dir>/exports)")]
    pub out: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct HistoryArgs {
    #[arg(long, default_value_t = false, help = "Print the listing as JSON")]
    pub json: bool,
}

pub async fn execute(cli: Cli, config: AppConfig) -> Result<()> {
    let session = SessionContext::new(Box::new(FileStore::new(config::session_file())));
    let client = EyeSenseClient::new(&config).context("Failed to build HTTP client")?;

    match cli.command {
        Commands::Login(args) => {
            let password = match args.password {
                Some(password) => password,
                None => read_password()?,
            };
            match auth::login(&client, &session, &args.email, &password, config.api_port()).await
            {
                Ok(LoginOutcome::LoggedIn { email }) => println!("Sessão iniciada: {email}"),
                Ok(LoginOutcome::Skipped) => bail!("Informe email e senha."),
                Err(e) => bail!(e.user_message()),
            }
        }
        Commands::Logout => {
            auth::logout(&client, &session)
                .await
                .context("Failed to clear session")?;
            println!("Sessão encerrada.");
        }
        Commands::Analyze(args) => {
            require_login(&session)?;
            analyze(client, &session, &config, args).await?;
        }
        Commands::History(args) => {
            require_login(&session)?;
            history(&client, &config, args.json).await?;
        }
    }
    Ok(())
}

fn require_login(session: &SessionContext) -> Result<()> {
    if !session.is_logged_in() {
        bail!("Faça login primeiro: eyesense login --email <email>");
    }
    Ok(())
}

fn read_password() -> Result<String> {
    if let Ok(password) = std::env::var("EYESENSE_PASSWORD") {
        return Ok(password);
    }
    eprint!("Senha: ");
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read password")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

async fn analyze(
    client: EyeSenseClient,
    session: &SessionContext,
    config: &AppConfig,
    args: AnalyzeArgs,
) -> Result<()> {
    let file = SelectedFile::from_path(&args.file)
        .await
        .with_context(|| format!("Cannot read {}", args.file.display()))?;

    let workflow = AnalysisWorkflow::new(client, WorkflowConfig::default(), config.api_port());
    if let Err(e) = workflow.select_file(file) {
        bail!(e.user_message());
    }
    workflow.wait_for_preview().await;

    let analysis = match workflow.analyze().await {
        AnalyzeOutcome::Succeeded(analysis) => analysis,
        AnalyzeOutcome::Failed(e) => bail!(e.user_message()),
        AnalyzeOutcome::Skipped | AnalyzeOutcome::Discarded => bail!("Analysis did not run"),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&workflow.snapshot())?);
    } else {
        print_analysis(&analysis);
    }

    if args.pdf || args.txt {
        let email = session.user_email().unwrap_or_default();
        let request = workflow
            .report_request(&email)
            .context("No successful analysis to report")?;
        let dir = args.out.unwrap_or_else(config::exports_dir);
        if args.pdf {
            let path = export::export_pdf(&request, &dir)?;
            println!("Relatório PDF: {}", path.display());
        }
        if args.txt {
            let path = export::export_text(&request, &dir)?;
            println!("Relatório TXT: {}", path.display());
        }
    }

    workflow.teardown();
    Ok(())
}

fn print_analysis(analysis: &Analysis) {
    match &analysis.verdict {
        Verdict::ThreeWay(dominant) => {
            println!(
                "Resultado: {} ({})",
                dominant.condition.display_name(),
                format_percent(dominant.confidence)
            );
            for label in [Label::Healthy, Label::Cataract, Label::Glaucoma] {
                println!(
                    "  {}: {}",
                    label.display_name(),
                    format_percent(analysis.result.confidence(label))
                );
            }
        }
        Verdict::TwoTier(verdict) => {
            let (winner, confidence) = match verdict.summary {
                Summary::Healthy => (Label::Healthy, verdict.healthy),
                Summary::Sick => (Label::Sick, verdict.sick),
            };
            println!(
                "Avaliação geral: {} ({})",
                winner.display_name(),
                format_percent(confidence)
            );
            if let Some(detail) = verdict.detail {
                println!(
                    "Detalhamento: {} (Catarata {}, Glaucoma {})",
                    detail.condition.display_name(),
                    format_percent(detail.cataract),
                    format_percent(detail.glaucoma)
                );
            }
        }
    }
    println!();
    println!("Recomendação: {}", analysis.recommendation);
}

async fn history(client: &EyeSenseClient, config: &AppConfig, json: bool) -> Result<()> {
    let workflow_config = WorkflowConfig::default();
    let notices = NoticeBoard::new(workflow_config.notice_fade);
    let entries = match load_history(client, &notices, &workflow_config, config.api_port()).await {
        Ok(entries) => entries,
        Err(e) => {
            let message = notices
                .current()
                .map(|n| n.message)
                .unwrap_or_else(|| e.user_message());
            bail!(message);
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }
    if entries.is_empty() {
        println!("Nenhuma análise encontrada.");
    }
    for entry in &entries {
        print_history_entry(entry);
    }
    Ok(())
}

fn print_history_entry(entry: &HistoryEntry) {
    println!(
        "#{:<8} {:<12} {:<10} {:>7}  [{}]",
        entry.record.object_id,
        entry.record.model_version,
        entry.dominant.condition.display_name(),
        format_percent(entry.dominant.percentage),
        entry.dominant.severity
    );
}
