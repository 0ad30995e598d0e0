//! # Contractify CLI
//!
//! Command-line front-end over `contract_core`. Every command loads the
//! workspace file, applies one operation, and saves it back whole.
//!
//! ```text
//! contractify init sales.ctf
//! contractify offer new sales.ctf --customer "Acme GmbH" --solution erp
//! contractify offer add-item sales.ctf --offer <ID> --license ERP-USER --quantity 10
//! contractify --role operations convert sales.ctf --offer <ID>
//! contractify rollup sales.ctf --project <ID>
//! ```

mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use contract_core::errors::ContractError;
use contract_core::session::{Role, Session, User};
use contract_core::settings::Settings;
use rust_decimal::Decimal;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "contractify")]
#[command(about = "Price sales offers and roll up project plans")]
struct Cli {
    /// Settings file (JSON)
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Acting user
    #[arg(long, env = "CONTRACTIFY_USER", default_value = "sales@localhost", global = true)]
    user: String,

    /// Role of the acting user
    #[arg(long, env = "CONTRACTIFY_ROLE", value_enum, default_value_t = RoleArg::Sales, global = true)]
    role: RoleArg,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, ValueEnum)]
enum RoleArg {
    Sales,
    Operations,
    Admin,
}

impl From<RoleArg> for Role {
    fn from(role: RoleArg) -> Self {
        match role {
            RoleArg::Sales => Role::Sales,
            RoleArg::Operations => Role::Operations,
            RoleArg::Admin => Role::Admin,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Create a workspace file
    Init {
        workspace: PathBuf,
        /// Do not seed the demo catalogue
        #[arg(long)]
        empty: bool,
    },

    /// Price one license type for a number of users
    Quote {
        workspace: PathBuf,
        #[arg(long)]
        license: String,
        #[arg(long)]
        users: u32,
        #[arg(long)]
        annual: bool,
        #[arg(long, default_value_t = Decimal::ZERO)]
        discount: Decimal,
        /// Margin percentage (defaults to the configured margin)
        #[arg(long)]
        margin: Option<Decimal>,
    },

    /// Create and edit offers
    #[command(subcommand)]
    Offer(OfferCommand),

    /// Convert an approved offer into a project plan
    Convert {
        workspace: PathBuf,
        #[arg(long)]
        offer: Uuid,
    },

    /// Edit project plans
    #[command(subcommand)]
    Plan(PlanCommand),

    /// Compute and store a plan's total days and cost
    Rollup {
        workspace: PathBuf,
        #[arg(long)]
        project: Uuid,
        /// Fail when the rate table cannot be fetched instead of costing at zero
        #[arg(long)]
        strict: bool,
    },
}

#[derive(Subcommand)]
enum OfferCommand {
    /// Start a draft offer
    New {
        workspace: PathBuf,
        #[arg(long)]
        customer: String,
        #[arg(long)]
        solution: String,
        #[arg(long, default_value = "")]
        notes: String,
    },

    /// Add a license row
    AddItem {
        workspace: PathBuf,
        #[arg(long)]
        offer: Uuid,
        /// License type code
        #[arg(long)]
        license: String,
        #[arg(long, default_value_t = 1)]
        quantity: u32,
        /// Override the catalogue monthly price
        #[arg(long)]
        unit_price: Option<Decimal>,
        #[arg(long, default_value_t = Decimal::ZERO)]
        discount: Decimal,
        #[arg(long)]
        annual: bool,
        #[arg(long)]
        monthly: bool,
    },

    /// Remove a license row
    RemoveItem {
        workspace: PathBuf,
        #[arg(long)]
        offer: Uuid,
        #[arg(long)]
        item: u32,
    },

    /// Submit a draft for approval
    Submit {
        workspace: PathBuf,
        #[arg(long)]
        offer: Uuid,
    },

    /// Approve a pending offer
    Approve {
        workspace: PathBuf,
        #[arg(long)]
        offer: Uuid,
    },

    /// Reject a pending offer
    Reject {
        workspace: PathBuf,
        #[arg(long)]
        offer: Uuid,
    },

    /// Move a rejected offer back to draft
    Reopen {
        workspace: PathBuf,
        #[arg(long)]
        offer: Uuid,
    },

    /// Show an offer with its totals
    Show {
        workspace: PathBuf,
        #[arg(long)]
        offer: Uuid,
    },
}

#[derive(Subcommand)]
enum PlanCommand {
    /// Add a task to a phase
    AddTask {
        workspace: PathBuf,
        #[arg(long)]
        project: Uuid,
        #[arg(long)]
        phase: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        days: u32,
    },

    /// Assign a resource to a task
    AddResource {
        workspace: PathBuf,
        #[arg(long)]
        project: Uuid,
        #[arg(long)]
        phase: String,
        #[arg(long)]
        task: String,
        /// Resource type code (e.g., BA)
        #[arg(long)]
        code: String,
        #[arg(long)]
        days: Decimal,
    },

    /// Enter days by hand for the manual-days phase
    SetDays {
        workspace: PathBuf,
        #[arg(long)]
        project: Uuid,
        #[arg(long)]
        phase: String,
        #[arg(long)]
        days: u32,
    },

    /// Show a plan with its phases
    Show {
        workspace: PathBuf,
        #[arg(long)]
        project: Uuid,
    },
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn build_session(cli: &Cli) -> anyhow::Result<Session> {
    let settings = match &cli.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    }
    .apply_env();

    let user = User::new(cli.user.clone(), cli.user.clone(), cli.role.into());
    Ok(Session::new(user).with_settings(settings))
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match build_session(&cli) {
        Ok(session) => commands::run(cli.command, &session, cli.json).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            if let Some(contract_error) = e.downcast_ref::<ContractError>() {
                if let Ok(json) = serde_json::to_string_pretty(contract_error) {
                    eprintln!();
                    eprintln!("Error JSON:");
                    eprintln!("{}", json);
                }
            }
            ExitCode::FAILURE
        }
    }
}
