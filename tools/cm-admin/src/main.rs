//! CM-Admin: CampMinder integration operator tool
//!
//! Signs and verifies objects with the shared secret, renders request
//! payloads, and runs a live EstablishConnection against the configured
//! endpoint.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use cm_telemetry::{init_telemetry, TelemetryConfig};

/// CM-Admin: CampMinder integration operator tool
#[derive(Parser, Debug)]
#[command(name = "cm-admin")]
#[command(about = "Sign, verify and test CampMinder partner requests")]
struct Args {
    /// Print Prometheus metrics after the command finishes
    #[arg(long, global = true)]
    metrics: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args, Debug)]
struct SecretArg {
    /// Shared secret agreed with CampMinder
    #[arg(long, env = "CAMPMINDER_SECRET_CODE", hide_env_values = true)]
    secret: String,
}

#[derive(clap::Args, Debug)]
struct RequestArgs {
    #[arg(long)]
    client_id: String,
    #[arg(long)]
    person_id: String,
    #[arg(long)]
    token: String,
    #[arg(long)]
    partner_client_id: String,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign a payload and print the signed object
    Sign {
        #[command(flatten)]
        secret: SecretArg,
        payload: String,
    },
    /// Verify a signed object and print its payload
    Verify {
        #[command(flatten)]
        secret: SecretArg,
        token: String,
        /// Also apply the link freshness window (CAMPMINDER_LINK_MAX_*)
        #[arg(long)]
        timestamp: bool,
    },
    /// Issue a time-bound token expiring OFFSET seconds from now
    TimestampToken {
        #[command(flatten)]
        secret: SecretArg,
        #[arg(long, default_value = "60", allow_hyphen_values = true)]
        offset: i64,
    },
    /// Render the EstablishConnection XML payload
    Payload {
        #[command(flatten)]
        request: RequestArgs,
        /// Prefix the XML declaration
        #[arg(long)]
        declaration: bool,
    },
    /// Send EstablishConnection using CAMPMINDER_* settings
    Connect {
        #[command(flatten)]
        request: RequestArgs,
    },
    /// Print a ServerTimeGet response body
    ServerTime,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let _telemetry = init_telemetry(TelemetryConfig::for_service("cm-admin"))?;

    match args.command {
        Command::Sign { secret, payload } => commands::sign(&secret.secret, &payload)?,
        Command::Verify {
            secret,
            token,
            timestamp,
        } => commands::verify(&secret.secret, &token, timestamp)?,
        Command::TimestampToken { secret, offset } => {
            commands::timestamp_token(&secret.secret, offset)?
        }
        Command::Payload {
            request,
            declaration,
        } => commands::payload(&commands::RequestFields::from(request), declaration)?,
        Command::Connect { request } => commands::connect(&commands::RequestFields::from(request)).await?,
        Command::ServerTime => commands::server_time(),
    }

    if args.metrics {
        print!("{}", cm_telemetry::encode_metrics()?);
    }

    Ok(())
}

impl From<RequestArgs> for commands::RequestFields {
    fn from(args: RequestArgs) -> Self {
        Self {
            client_id: args.client_id,
            person_id: args.person_id,
            token: args.token,
            partner_client_id: args.partner_client_id,
        }
    }
}
