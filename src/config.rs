use clap::Parser;

/// Operational settings for the query core.
#[derive(Parser, Debug, Clone)]
#[command(name = "chainscan", about = "Blockchain explorer read/query core")]
pub struct Settings {
    /// RPC endpoint URL of the authoritative chain node
    #[arg(long, env = "RPC_URL", default_value = "http://localhost:8545")]
    pub rpc_url: String,

    /// Cap applied to displayed record totals so reported page counts stay
    /// bounded regardless of collection size
    #[arg(long, env = "LIMITED_RECORDS", default_value = "500000")]
    pub limited_records: u64,
}
