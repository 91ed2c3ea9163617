use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;

use dao_pledge::pledge::{
    ApplicationKind, FixedMetadataSource, OrganizationMetadata, PledgeSession,
};
use dao_pledge::{
    pledge_metrics, Address, BackendClient, JsonRpcBindings, PledgeConfig, PledgeForm,
    StateObserver, SubmissionOutcome, WorkflowState,
};

#[derive(Parser)]
#[command(name = "dao-pledge")]
#[command(about = "Submit a funding pledge to an on-chain organization")]
#[command(long_about = "Approves the organization's deposit token for the pledged amount, \
                       mirrors the application to the backend and waits for the approval \
                       to be mined.")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit a pledge and wait for the approval to be mined
    Pledge {
        /// Organization contract address
        #[arg(long)]
        organization: String,
        /// Wallet account submitting the pledge
        #[arg(long)]
        applicant: String,
        /// Deposit token contract address
        #[arg(long)]
        token: String,
        /// Pledge amount in whole tokens, e.g. 1.5
        #[arg(long)]
        amount: String,
        /// Requested share count
        #[arg(long)]
        shares: String,
        /// Application form used by the organization
        #[arg(long, value_enum, default_value = "standard")]
        kind: KindArg,
    },
    /// Inspect or write configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Write the default configuration to a file
    Init {
        #[arg(long, default_value = "dao-pledge.toml")]
        path: PathBuf,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    Standard,
    Euma,
}

impl From<KindArg> for ApplicationKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Standard => ApplicationKind::Standard,
            KindArg::Euma => ApplicationKind::Euma,
        }
    }
}

/// Prints loading / hash / error changes as they happen
struct ConsoleObserver;

impl StateObserver for ConsoleObserver {
    fn state_changed(&self, state: &WorkflowState) {
        match (&state.hash, state.loading) {
            (None, true) => println!("⏳ Waiting for wallet approval..."),
            (Some(hash), true) => println!("📨 Approval broadcast, waiting to be mined. TX hash: {hash}"),
            _ => {}
        }
        if let Some(message) = &state.error_message {
            eprintln!("❌ {message}");
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = dao_pledge::config()?;
    dao_pledge::init_telemetry(&config.observability)?;
    dao_pledge::init_config()?;

    let result = match cli.command {
        Commands::Pledge {
            organization,
            applicant,
            token,
            amount,
            shares,
            kind,
        } => tokio::runtime::Runtime::new()?.block_on(async {
            pledge_command(config, &organization, &applicant, &token, amount, shares, kind).await
        }),
        Commands::Config { action } => config_command(config, action),
    };

    dao_pledge::shutdown_telemetry();
    result
}

async fn pledge_command(
    config: &PledgeConfig,
    organization: &str,
    applicant: &str,
    token: &str,
    amount: String,
    shares: String,
    kind: KindArg,
) -> Result<()> {
    let organization: Address = organization.parse().context("invalid --organization")?;
    let applicant: Address = applicant.parse().context("invalid --applicant")?;
    let token: Address = token.parse().context("invalid --token")?;

    let metadata = FixedMetadataSource::new(
        organization.clone(),
        OrganizationMetadata {
            deposit_token_address: token,
            application_kind: kind.into(),
        },
    );
    let bindings = JsonRpcBindings::new(config.chain.clone());
    let writer = Arc::new(BackendClient::from_config(&config.backend)?);

    let session = PledgeSession::open(
        organization,
        applicant,
        &metadata,
        &bindings,
        writer,
        config.workflow_settings(),
    )
    .await?;

    let workflow = session.into_workflow().with_observer(Arc::new(ConsoleObserver));
    let outcome = workflow.run(&PledgeForm::new(amount, shares)).await?;
    pledge_metrics().log_stats();

    match outcome {
        SubmissionOutcome::Success { redirect_target } => {
            println!("✅ Pledge approved. Continue at {redirect_target}");
            Ok(())
        }
        SubmissionOutcome::Failure {
            category, hash, ..
        } => {
            if let Some(hash) = hash {
                println!("🔗 Track the transaction with hash {hash}");
            }
            anyhow::bail!("pledge failed ({category})")
        }
    }
}

fn config_command(config: &PledgeConfig, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            print!("{}", toml::to_string_pretty(config)?);
            Ok(())
        }
        ConfigAction::Init { path, force } => {
            if path.exists() && !force {
                anyhow::bail!("{} already exists (use --force to overwrite)", path.display());
            }
            PledgeConfig::default().save_to_file(&path)?;
            println!("📝 Wrote default configuration to {}", path.display());
            Ok(())
        }
    }
}
