use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use reqwest::Client;
use serde_json::{json, Value};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use vigil_codec::{build_instruction, DiscriminatorTable};
use vigil_gateway::{ChainGateway, Keypair, RpcConfig, RpcGateway};
use vigil_types::params::{DcaParams, PriceTradeParams, ProtectionParams};
use vigil_types::{AccountKind, InstructionData, Pubkey};

#[derive(Parser)]
#[command(author, version, about = "Vigil CLI: set up automations and drive a running keeper")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    #[arg(long, default_value = "http://127.0.0.1:8899")]
    rpc_url: String,
    #[arg(short, long, default_value = "authority.json")]
    keypair: PathBuf,
    /// Automation program id. Required for commands that send instructions.
    #[arg(short, long)]
    program_id: Option<Pubkey>,
    /// JSON file overriding instruction discriminators.
    #[arg(long)]
    discriminators: Option<PathBuf>,
    #[arg(short, long, default_value = "http://127.0.0.1:3000")]
    node_url: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a new authority keypair
    Keygen {
        #[arg(long)]
        force: bool,
    },
    /// Show the authority address
    Show,
    /// Create an automation account
    Initialize { account: Pubkey },
    /// Configure health factor protection
    SetAutomation {
        account: Pubkey,
        #[arg(long)]
        trigger: u64,
        #[arg(long)]
        target: u64,
    },
    /// Borrow against the position
    Borrow {
        account: Pubkey,
        #[arg(long)]
        amount: u64,
    },
    /// Repay part of the debt
    Repay {
        account: Pubkey,
        #[arg(long)]
        amount: u64,
    },
    /// Configure dollar-cost averaging
    SetDca {
        account: Pubkey,
        #[arg(long)]
        interval: u64,
        #[arg(long)]
        token: Pubkey,
        #[arg(long)]
        amount: u64,
    },
    /// Configure a buy-the-dip order
    SetPriceTrading {
        account: Pubkey,
        #[arg(long)]
        price: u64,
        #[arg(long)]
        token: Pubkey,
        #[arg(long)]
        amount: u64,
    },
    /// Decode an automation account as the given kind
    Inspect {
        account: Pubkey,
        #[arg(long)]
        kind: AccountKind,
    },
    /// Control a running node
    Monitor {
        #[command(subcommand)]
        command: MonitorCommands,
    },
}

#[derive(Subcommand)]
enum MonitorCommands {
    /// Start watching an account
    Add { kind: AccountKind, address: Pubkey },
    /// Stop watching an account
    Remove { kind: AccountKind, address: Pubkey },
    /// List watched accounts
    List { kind: AccountKind },
    /// Run a check cycle now
    Check { kind: AccountKind },
    /// Show the last snapshot of an account
    Status { kind: AccountKind, address: Pubkey },
    /// Whether the controller is running
    Running { kind: AccountKind },
}

/// The instruction a setup command sends, with its parameters validated.
fn setup_instruction(command: &Commands) -> Result<Option<(Pubkey, InstructionData)>> {
    let planned = match command {
        Commands::Initialize { account } => (*account, InstructionData::Initialize),
        Commands::SetAutomation { account, trigger, target } => {
            (*account, ProtectionParams::new(*trigger, *target)?.instruction())
        }
        Commands::Borrow { account, amount } | Commands::Repay { account, amount } => {
            if *amount == 0 {
                bail!("amount must be greater than zero");
            }
            let ix = match command {
                Commands::Borrow { .. } => InstructionData::Borrow { amount: *amount },
                _ => InstructionData::Repay { amount: *amount },
            };
            (*account, ix)
        }
        Commands::SetDca { account, interval, token, amount } => {
            (*account, DcaParams::new(*interval, *token, *amount)?.instruction())
        }
        Commands::SetPriceTrading { account, price, token, amount } => {
            (*account, PriceTradeParams::new(*price, *token, *amount)?.instruction())
        }
        _ => return Ok(None),
    };
    Ok(Some(planned))
}

fn load_discriminators(path: Option<&PathBuf>) -> Result<DiscriminatorTable> {
    match path {
        Some(path) => {
            let raw = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
            Ok(serde_json::from_str(&raw)?)
        }
        None => Ok(DiscriminatorTable::default()),
    }
}

fn load_keypair(path: &PathBuf) -> Result<Keypair> {
    Keypair::read_from_file(path).with_context(|| format!("Failed to load keypair {}", path.display()))
}

async fn node_request(req: reqwest::RequestBuilder) -> Result<Value> {
    let resp = req.send().await.context("Node unreachable")?;
    let status = resp.status();
    let body: Value = resp.json().await?;
    if !status.is_success() {
        let message = body["error"].as_str().unwrap_or("unknown error");
        bail!("Node returned {}: {}", status, message);
    }
    Ok(body)
}

async fn run_monitor(client: &Client, node_url: &str, command: &MonitorCommands) -> Result<Value> {
    match command {
        MonitorCommands::Add { kind, address } => {
            node_request(
                client
                    .post(format!("{node_url}/accounts/{kind}"))
                    .json(&json!({ "address": address.to_string() })),
            )
            .await
        }
        MonitorCommands::Remove { kind, address } => {
            node_request(client.delete(format!("{node_url}/accounts/{kind}/{address}"))).await
        }
        MonitorCommands::List { kind } => node_request(client.get(format!("{node_url}/accounts/{kind}"))).await,
        MonitorCommands::Check { kind } => node_request(client.post(format!("{node_url}/check/{kind}"))).await,
        MonitorCommands::Status { kind, address } => {
            node_request(client.get(format!("{node_url}/accounts/{kind}/{address}"))).await
        }
        MonitorCommands::Running { kind } => node_request(client.get(format!("{node_url}/monitoring/{kind}"))).await,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Commands::Keygen { force } => {
            if cli.keypair.exists() && !force {
                bail!("{} already exists; pass --force to overwrite", cli.keypair.display());
            }
            let keypair = Keypair::generate();
            keypair.write_to_file(&cli.keypair)?;
            println!("Keypair written to {:?}", cli.keypair);
            println!("Authority: {}", keypair.pubkey());
        }
        Commands::Show => {
            let keypair = load_keypair(&cli.keypair)?;
            println!("Keypair: {:?}", cli.keypair);
            println!("Authority: {}", keypair.pubkey());
        }
        Commands::Inspect { account, kind } => {
            let gateway = RpcGateway::new(RpcConfig::new(cli.rpc_url.clone()), None)?;
            let bytes = gateway.get_account_bytes(account).await?;
            let state = vigil_codec::decode(*kind, &bytes)?;
            println!("{}", serde_json::to_string_pretty(&state)?);
        }
        Commands::Monitor { command } => {
            let client = Client::new();
            let body = run_monitor(&client, cli.node_url.trim_end_matches('/'), command).await?;
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
        command => {
            let Some((account, ix)) = setup_instruction(command)? else {
                bail!("Unsupported command");
            };
            let program_id = cli.program_id.context("--program-id is required to send instructions")?;
            let table = load_discriminators(cli.discriminators.as_ref())?;
            let keypair = Arc::new(load_keypair(&cli.keypair)?);
            let authority = keypair.pubkey();

            let instruction = build_instruction(&table, program_id, account, authority, &ix);
            let gateway = RpcGateway::new(RpcConfig::new(cli.rpc_url.clone()), Some(keypair))?;
            println!("Sending {} for {}...", ix.name(), account);
            let signature = gateway.submit_instruction(&instruction).await?;
            println!("Confirmed: {}", signature);
        }
    }

    Ok(())
}
