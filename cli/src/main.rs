//! chainload CLI — saturate a blockchain node's query endpoint.
//!
//! Usage:
//! ```bash
//! # Fire batches of 1000 queries until one fails
//! chainload run --url https://node.example.com/ --query game_config.get_all
//!
//! # POST transport, at most 20 open requests
//! chainload run --url https://node.example.com/ --transport post --concurrency 20
//!
//! # Only resolve the BRID and print the query URL
//! chainload resolve --url https://node.example.com/
//! ```

mod logging;

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use chainload_core::config::{DEFAULT_BATCH_SIZE, DEFAULT_QUERY, DEFAULT_TIMEOUT_SECS};
use chainload_core::{
    BatchRunner, HaltReason, LoadConfig, LoadSession, QueryRequest, RunReport, TransportKind,
};
use chainload_http::{build_http_client, resolve_endpoint, HttpClientConfig};

use logging::{init_tracing, LogConfig};

#[derive(Parser)]
#[command(
    name = "chainload",
    about = "Fire batches of concurrent queries at a blockchain node until one fails",
    version
)]
struct Cli {
    /// Log level or filter directive
    #[arg(long, env = "CHAINLOAD_LOG", default_value = "info", global = true)]
    log_level: String,

    /// Emit JSON logs
    #[arg(long, env = "CHAINLOAD_JSON_LOGS", global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run batches until a query fails (Ctrl-C stops early)
    Run(RunArgs),

    /// Resolve the BRID and print the derived query URL
    Resolve {
        /// Node base URL
        #[arg(long, env = "CHAINLOAD_URL")]
        url: String,
    },
}

#[derive(Args)]
struct RunArgs {
    /// Node base URL, e.g. https://node.example.com/
    #[arg(long, env = "CHAINLOAD_URL")]
    url: String,

    /// Query name sent as `type`
    #[arg(long, env = "CHAINLOAD_QUERY", default_value = DEFAULT_QUERY)]
    query: String,

    /// Queries launched together per batch
    #[arg(long, env = "CHAINLOAD_BATCH_SIZE", default_value_t = DEFAULT_BATCH_SIZE)]
    batch_size: usize,

    /// Cap on simultaneously open requests (uncapped when omitted)
    #[arg(long, env = "CHAINLOAD_CONCURRENCY")]
    concurrency: Option<usize>,

    /// Query transport: get (query string) or post (JSON body)
    #[arg(long, env = "CHAINLOAD_TRANSPORT", default_value_t = TransportKind::Get)]
    transport: TransportKind,

    /// Per-request timeout in seconds (0 = no timeout)
    #[arg(long, env = "CHAINLOAD_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout_secs: u64,
}

impl From<RunArgs> for LoadConfig {
    fn from(args: RunArgs) -> Self {
        Self {
            base_url: args.url,
            query: args.query,
            batch_size: args.batch_size,
            concurrency: args.concurrency,
            transport: args.transport,
            request_timeout_secs: args.timeout_secs,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&LogConfig {
        level: cli.log_level,
        json: cli.json_logs,
    });

    let result = match cli.command {
        Commands::Run(args) => cmd_run(args.into()).await,
        Commands::Resolve { url } => cmd_resolve(&url).await.map(|()| ExitCode::SUCCESS),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn cmd_run(config: LoadConfig) -> Result<ExitCode> {
    let target = chainload_http::prepare(&config)
        .await
        .context("startup failed, no load generated")?;

    println!("Endpoint:    {}", target.endpoint.query_url());
    println!("Query:       {}", config.query);
    println!("Transport:   {}", config.transport);
    println!("Batch size:  {}", config.batch_size);
    match config.concurrency {
        Some(cap) => println!("Concurrency: {cap}"),
        None => println!("Concurrency: uncapped"),
    }
    println!();

    let runner = BatchRunner::new(target.transport, config.batch_size)?;
    let session = LoadSession::start(runner, QueryRequest::new(&config.query));
    let cancel = session.cancel_token();

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt received, stopping load run");
            cancel.cancel();
        }
    });

    let report = session.join().await?;
    print_summary(&report);

    Ok(match report.halt {
        HaltReason::Cancelled => ExitCode::SUCCESS,
        HaltReason::Failed => ExitCode::FAILURE,
    })
}

async fn cmd_resolve(url: &str) -> Result<()> {
    let http = build_http_client(&HttpClientConfig::default())?;
    let endpoint = resolve_endpoint(&http, url).await?;

    println!("BRID:      {}", endpoint.brid());
    println!("Query URL: {}", endpoint.query_url());
    Ok(())
}

fn print_summary(report: &RunReport) {
    println!();
    println!("Load Summary");
    println!("============");
    println!("Halted:            {}", report.halt);
    println!("Batches completed: {}", report.batches_completed);
    println!("Total requests:    {}", report.total_requests);
    println!("Failed requests:   {}", report.failed_requests);
    println!("Duration:          {:.2}s", report.elapsed.as_secs_f64());
    println!("Throughput:        {:.2} req/s", report.requests_per_sec());
}
