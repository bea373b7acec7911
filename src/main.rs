use anyhow::{Context, Result};
use clap::{ArgAction, Args as ClapArgs, Parser, Subcommand, ValueEnum};
use serde_json::{json, Value};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{Instrument, Level};
use tracing_subscriber::fmt::writer::MakeWriterExt;
use uuid::Uuid;
use vppstate::config::{load_params, Config};
use vppstate::facts::{select_queries, FactCollector, Sorting};
use vppstate::reconcile::{bridge_domain, vhost_user, BridgeDomainSpec, PassOptions, State, VhostUserSpec};
use vppstate::vpp::VppClient;

/// Declarative state for VPP dataplanes
#[derive(Parser, Debug)]
#[command(name = "vppstate", version, about, long_about = None)]
struct Args {
    /// Dataplane API gateway URL
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Bearer token for the gateway
    #[arg(long, global = true)]
    token: Option<String>,

    /// Directory vhost-user sockets live in
    #[arg(long, global = true)]
    socket_dir: Option<PathBuf>,

    /// Report what would change without changing anything
    #[arg(long, global = true)]
    dry_run: bool,

    /// Log level for debugging
    #[arg(long, global = true, value_enum, default_value = "off")]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Gather read-only facts
    Facts(FactsArgs),
    /// Reconcile one bridge domain
    BridgeDomain(BridgeDomainArgs),
    /// Reconcile one vhost-user interface
    VhostUser(VhostUserArgs),
}

#[derive(ClapArgs, Debug)]
struct FactsArgs {
    /// Gather every known query
    #[arg(long)]
    all: bool,

    /// Query or group name; repeatable
    #[arg(long = "filter")]
    filter: Vec<String>,

    #[arg(long, value_enum, default_value = "none")]
    sorting: Sorting,

    /// Fact name prefix
    #[arg(long)]
    namespace: Option<String>,
}

#[derive(ClapArgs, Debug)]
struct BridgeDomainArgs {
    /// Read the desired state from a YAML or JSON file
    #[arg(long, conflicts_with_all = ["state", "bd", "flood", "uu_flood", "learn", "forward", "arp_term", "bd_tag"])]
    params: Option<PathBuf>,

    #[arg(long, value_enum, default_value = "present")]
    state: State,

    /// Bridge domain id
    #[arg(long)]
    bd: Option<u32>,

    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    flood: bool,

    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    uu_flood: bool,

    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    learn: bool,

    #[arg(long)]
    forward: Option<bool>,

    #[arg(long)]
    arp_term: Option<bool>,

    #[arg(long)]
    bd_tag: Option<String>,
}

impl BridgeDomainArgs {
    fn spec(&self) -> Result<BridgeDomainSpec> {
        if let Some(path) = &self.params {
            return load_params(path);
        }
        Ok(BridgeDomainSpec {
            state: self.state,
            bd: self.bd,
            flood: self.flood,
            uu_flood: self.uu_flood,
            learn: self.learn,
            forward: self.forward,
            arp_term: self.arp_term,
            bd_tag: self.bd_tag.clone(),
        })
    }
}

#[derive(ClapArgs, Debug)]
struct VhostUserArgs {
    /// Read the desired state from a YAML or JSON file
    #[arg(long, conflicts_with_all = ["state", "if_idx", "is_server", "sock_filename", "tag"])]
    params: Option<PathBuf>,

    #[arg(long, value_enum, default_value = "present")]
    state: State,

    /// Interface index (sw_if_index)
    #[arg(long)]
    if_idx: Option<u32>,

    #[arg(long)]
    is_server: bool,

    /// Socket file name inside the socket directory
    #[arg(long, required_unless_present = "params")]
    sock_filename: Option<String>,

    #[arg(long)]
    tag: Option<String>,
}

impl VhostUserArgs {
    fn spec(&self) -> Result<VhostUserSpec> {
        if let Some(path) = &self.params {
            return load_params(path);
        }
        Ok(VhostUserSpec {
            state: self.state,
            if_idx: self.if_idx,
            is_server: self.is_server,
            sock_filename: self
                .sock_filename
                .clone()
                .context("--sock-filename is required")?,
            tag: self.tag.clone(),
        })
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

fn setup_logging(level: LogLevel) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let tracing_level = level.to_tracing_level()?;

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Failed to open log file {:?}: {}", log_path, e);
            return None;
        }
    };

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_max_level(tracing_level)
        .with_writer(non_blocking.with_max_level(tracing_level))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("vppstate started with log level: {:?}", level);
    tracing::info!("Log file: {:?}", log_path);

    Some(guard)
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("vppstate").join("vppstate.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".vppstate").join("vppstate.log");
    }
    PathBuf::from("vppstate.log")
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let _log_guard = setup_logging(args.log_level);

    let pass_id = Uuid::new_v4();
    let span = tracing::info_span!("pass", id = %pass_id);

    match run(args).instrument(span).await {
        Ok(document) => {
            println!("{}", document);
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!("Pass {} failed: {:#}", pass_id, err);
            println!("{}", json!({"failed": true, "msg": format!("{:#}", err)}));
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<Value> {
    let config = Config::load();

    // CLI > config file > environment > default
    let endpoint = args
        .endpoint
        .clone()
        .unwrap_or_else(|| config.effective_endpoint());
    let token = args.token.clone().or_else(|| config.effective_token());
    let options = PassOptions {
        dry_run: args.dry_run,
        socket_dir: args
            .socket_dir
            .clone()
            .unwrap_or_else(|| config.effective_socket_dir()),
    };

    let client = VppClient::new(&endpoint, token, config.timeout())
        .with_context(|| format!("Could not set up dataplane client for {}", endpoint))?;
    tracing::info!("Using dataplane gateway {}", client.endpoint);

    let document = match args.command {
        Command::Facts(facts) => {
            let queries = select_queries(facts.all, &facts.filter);
            let namespace = facts
                .namespace
                .unwrap_or_else(|| config.effective_namespace());
            let report = FactCollector::new(&client)
                .with_namespace(namespace)
                .with_sorting(facts.sorting)
                .report(&queries)
                .await?;
            serde_json::to_value(report)?
        }
        Command::BridgeDomain(bd) => {
            let spec = bd.spec()?;
            tracing::info!("Reconciling bridge domain {:?}", spec);
            serde_json::to_value(bridge_domain::reconcile(&client, &spec, &options).await?)?
        }
        Command::VhostUser(vhost) => {
            let spec = vhost.spec()?;
            tracing::info!("Reconciling vhost-user interface {:?}", spec);
            serde_json::to_value(vhost_user::reconcile(&client, &spec, &options).await?)?
        }
    };

    Ok(document)
}
