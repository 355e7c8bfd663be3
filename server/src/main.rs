use anyhow::{bail, Context, Result};
use clap::Parser;
use rand::rngs::OsRng;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use vcasino_execution::{HashChain, LedgerConfig, COMMIT_REVEAL_LEN};
use vcasino_server::{
    Api, Persistence, Server, ServerConfig, DEFAULT_HTTP_BODY_LIMIT_BYTES,
    DEFAULT_HTTP_RATE_LIMIT_BURST, DEFAULT_HTTP_RATE_LIMIT_PER_SECOND, DEFAULT_SESSION_TTL_MS,
};
use vcasino_types::casino::{DAILY_BONUS, DEFAULT_BALANCE};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Host interface to bind (default: localhost).
    #[arg(long, default_value = "127.0.0.1")]
    host: IpAddr,

    #[arg(short, long, default_value_t = 8080)]
    port: u16,

    /// Path to SQLite database for player persistence (disabled when omitted).
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Starting balance for newly registered players.
    #[arg(long, default_value_t = DEFAULT_BALANCE)]
    default_balance: u64,

    /// Amount credited by a daily bonus claim.
    #[arg(long, default_value_t = DAILY_BONUS)]
    daily_bonus: u64,

    /// Hex-encoded 32-byte master secret for round seeds (random when omitted).
    #[arg(long, env = "MASTER_SECRET")]
    master_secret: Option<String>,

    /// Requests per second allowed per client IP (0 disables rate limiting).
    #[arg(long, default_value_t = DEFAULT_HTTP_RATE_LIMIT_PER_SECOND)]
    rate_limit_per_second: u64,

    #[arg(long, default_value_t = DEFAULT_HTTP_RATE_LIMIT_BURST)]
    rate_limit_burst: u32,

    /// Maximum request body size in bytes (0 disables the limit).
    #[arg(long, default_value_t = DEFAULT_HTTP_BODY_LIMIT_BYTES)]
    body_limit_bytes: usize,

    /// Serve POST /play-slots, which settles slot spins drawn by the client (trusted input).
    #[arg(long, default_value_t = false)]
    legacy_slot_endpoint: bool,
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();
}

fn build_config(args: &Args) -> Result<ServerConfig> {
    if args.default_balance == 0 {
        bail!("default_balance must be > 0");
    }
    let session_ttl_ms = match std::env::var("SESSION_TTL_MS") {
        Ok(value) => match value.trim().parse::<u64>() {
            Ok(ttl) if ttl > 0 => ttl,
            _ => {
                tracing::warn!(value, "invalid SESSION_TTL_MS; using default");
                DEFAULT_SESSION_TTL_MS
            }
        },
        Err(_) => DEFAULT_SESSION_TTL_MS,
    };
    Ok(ServerConfig {
        ledger: LedgerConfig {
            default_balance: args.default_balance,
            daily_bonus: args.daily_bonus,
        },
        session_ttl_ms,
        http_rate_limit_per_second: Some(args.rate_limit_per_second),
        http_rate_limit_burst: Some(args.rate_limit_burst),
        http_body_limit_bytes: Some(args.body_limit_bytes),
        legacy_slot_endpoint: args.legacy_slot_endpoint,
    })
}

fn parse_master_secret(value: &str) -> Result<[u8; COMMIT_REVEAL_LEN]> {
    let bytes = commonware_utils::from_hex(value.trim()).context("invalid master secret hex")?;
    bytes
        .try_into()
        .map_err(|bytes: Vec<u8>| {
            anyhow::anyhow!(
                "master secret must be {COMMIT_REVEAL_LEN} bytes, got {}",
                bytes.len()
            )
        })
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse args
    let args = Args::parse();

    // Create logger
    init_tracing();

    let config = build_config(&args)?;

    let chain = match &args.master_secret {
        Some(secret) => HashChain::from_secret(parse_master_secret(secret)?),
        None => {
            tracing::warn!("no master secret configured; rounds will not verify across restarts");
            HashChain::random(&mut OsRng)
        }
    };

    let (persistence, stored) = match &args.db_path {
        Some(path) => {
            let (persistence, stored) =
                Persistence::open(path).context("open player persistence")?;
            (Some(persistence), Some(stored))
        }
        None => (None, None),
    };

    let server = Arc::new(Server::new(config, chain, persistence));
    if let Some(stored) = stored {
        let restored = server
            .restore(stored)
            .await
            .context("restore stored players")?;
        info!(restored, "restored players from storage");
    }

    let api = Api::new(server);
    let app = api.router();

    // Start server
    let addr = SocketAddr::new(args.host, args.port);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Listening on {}", addr);
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .context("axum server error")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_ledger_config_fields() {
        let args = Args::parse_from([
            "vcasino-server",
            "--default-balance",
            "500",
            "--daily-bonus",
            "25",
            "--rate-limit-per-second",
            "0",
        ]);
        let config = build_config(&args).expect("config should parse");
        assert_eq!(config.ledger.default_balance, 500);
        assert_eq!(config.ledger.daily_bonus, 25);
        assert_eq!(config.http_rate_limit_per_second, Some(0));
        assert_eq!(config.http_body_limit_bytes, Some(DEFAULT_HTTP_BODY_LIMIT_BYTES));
        assert!(!config.legacy_slot_endpoint);
    }

    #[test]
    fn legacy_slot_endpoint_is_opt_in() {
        let args = Args::parse_from(["vcasino-server", "--legacy-slot-endpoint"]);
        let config = build_config(&args).expect("config should parse");
        assert!(config.legacy_slot_endpoint);
    }

    #[test]
    fn rejects_zero_default_balance() {
        let args = Args::parse_from(["vcasino-server", "--default-balance", "0"]);
        let err = build_config(&args).unwrap_err();
        assert!(
            err.to_string().contains("default_balance"),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn master_secret_must_be_32_bytes() {
        let secret = parse_master_secret(&"ab".repeat(32)).expect("valid secret");
        assert_eq!(secret, [0xab; COMMIT_REVEAL_LEN]);
        assert!(parse_master_secret("abcd").is_err());
        assert!(parse_master_secret("not hex").is_err());
    }
}
