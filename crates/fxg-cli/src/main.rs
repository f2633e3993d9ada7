mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "fxg")]
#[command(about = "FX trade governance engine CLI", long_about = None)]
struct Cli {
    /// Layered config paths in merge order. Falls back to FXG_CONFIG
    /// (comma-separated) when omitted.
    #[arg(long = "config", global = true)]
    config_paths: Vec<String>,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute layered config hash + print canonical JSON
    ConfigHash {
        /// Paths in merge order (base -> env -> overrides...)
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Report config keys no governance component reads
    ConfigCheck {
        /// REPLAY | PAPER | LIVE (LIVE fails on unused keys)
        #[arg(long, default_value = "REPLAY")]
        mode: String,
    },

    /// Governance state from a trade-history file
    Assess {
        /// History file (.json array or .csv)
        #[arg(long)]
        history: String,

        /// Lifetime trade count; defaults to the filled rows in the file
        #[arg(long)]
        total_trades: Option<u64>,
    },

    /// Evaluate one proposal against one context under a governance state
    Evaluate {
        /// TradeProposal JSON file
        #[arg(long)]
        proposal: String,

        /// GovernanceContext JSON file
        #[arg(long)]
        context: String,

        /// NORMAL | DEFENSIVE | THROTTLED | HALT
        #[arg(long, default_value = "NORMAL")]
        state: String,

        /// Treat the engine as still in its learning phase (no session blocks)
        #[arg(long, default_value_t = false)]
        learning: bool,
    },

    /// Resolve the agent coalition and pick a lead
    Coalition {
        /// AgentStats JSON array
        #[arg(long)]
        agents: String,

        /// Optional history file for the post-learning requirement
        #[arg(long)]
        history: Option<String>,

        /// Lead-selection seed
        #[arg(long, default_value_t = 0)]
        seed: u64,
    },

    /// Run one full governance cycle from files
    Cycle {
        #[arg(long)]
        history: String,

        #[arg(long)]
        total_trades: Option<u64>,

        /// AgentStats JSON array
        #[arg(long)]
        agents: String,

        /// JSON object: pair -> GovernanceContext ("*" is the fallback)
        #[arg(long)]
        contexts: String,

        /// CandidateTrade JSON array
        #[arg(long)]
        candidates: String,

        #[arg(long, default_value_t = 0)]
        seed: u64,

        /// Evaluate without executing, regardless of config
        #[arg(long, default_value_t = false)]
        shadow: bool,

        /// Append hash-chained audit events to this JSONL file
        #[arg(long)]
        audit: Option<String>,
    },

    /// Audit trail utilities
    Audit {
        #[command(subcommand)]
        cmd: AuditCmd,
    },
}

#[derive(Subcommand)]
enum AuditCmd {
    /// Verify the hash chain of an audit JSONL file
    Verify {
        path: String,
    },
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    // Dev-time convenience; missing file is fine.
    let _ = dotenvy::from_filename(".env.local");
    init_tracing();

    let cli = Cli::parse();
    let config_paths = commands::resolve_config_paths(cli.config_paths);

    match cli.cmd {
        Commands::ConfigHash { paths } => commands::config::config_hash(&paths)?,

        Commands::ConfigCheck { mode } => commands::config::config_check(&config_paths, &mode)?,

        Commands::Assess {
            history,
            total_trades,
        } => commands::assess::assess(&config_paths, &history, total_trades)?,

        Commands::Evaluate {
            proposal,
            context,
            state,
            learning,
        } => commands::evaluate::evaluate(&config_paths, &proposal, &context, &state, learning)?,

        Commands::Coalition {
            agents,
            history,
            seed,
        } => commands::coalition::coalition(&config_paths, &agents, history.as_deref(), seed)?,

        Commands::Cycle {
            history,
            total_trades,
            agents,
            contexts,
            candidates,
            seed,
            shadow,
            audit,
        } => commands::cycle::cycle(
            &config_paths,
            commands::cycle::CycleArgs {
                history,
                total_trades,
                agents,
                contexts,
                candidates,
                seed,
                shadow,
                audit,
            },
        )?,

        Commands::Audit { cmd } => match cmd {
            AuditCmd::Verify { path } => commands::audit_verify(&path)?,
        },
    }

    Ok(())
}
