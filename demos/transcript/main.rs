use std::time::Duration;

use alloy::{
    network::Ethereum,
    primitives::{Address, U256},
    providers::ProviderBuilder,
};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use transcript_scanner::{
    ChatSessionId, DEFAULT_GATEWAY, DEFAULT_LOOKBACK_BLOCKS, DEFAULT_MAX_BLOCK_RANGE, HttpFetcher,
    TranscriptScannerBuilder, robust_provider::RobustProviderBuilder,
};

/// Prints the transcript of one chat session.
#[derive(Debug, Parser)]
struct Args {
    /// JSON-RPC endpoint of the chain the chat contract lives on.
    #[arg(long, env = "TRANSCRIPT_RPC_URL")]
    rpc_url: String,

    /// Optional backup endpoint used when the primary one fails.
    #[arg(long, env = "TRANSCRIPT_FALLBACK_RPC_URL")]
    fallback_rpc_url: Option<String>,

    /// Address of the chat contract emitting `MessageSent`.
    #[arg(long, env = "TRANSCRIPT_CONTRACT")]
    contract: Address,

    /// Chat session to reconstruct.
    #[arg(long, env = "TRANSCRIPT_CHAT_ID")]
    chat_id: U256,

    #[arg(long, env = "TRANSCRIPT_GATEWAY", default_value = DEFAULT_GATEWAY)]
    gateway: String,

    #[arg(long, default_value_t = DEFAULT_LOOKBACK_BLOCKS)]
    lookback: u64,

    #[arg(long, default_value_t = DEFAULT_MAX_BLOCK_RANGE)]
    max_block_range: u64,

    /// Content fetches in flight at once.
    #[arg(long, default_value_t = 4)]
    concurrency: usize,

    /// Print the transcript as JSON instead of text.
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).try_init();
    let args = Args::parse();

    let provider = ProviderBuilder::new().connect(&args.rpc_url).await?;
    let mut robust_provider = RobustProviderBuilder::<Ethereum, _>::new(provider)
        .call_timeout(Duration::from_secs(30))
        .max_retries(5)
        .min_delay(Duration::from_millis(500));
    if let Some(fallback) = args.fallback_rpc_url {
        robust_provider = robust_provider.fallback(ProviderBuilder::new().connect(&fallback).await?);
    }
    let robust_provider = robust_provider.build().await?;

    let scanner = TranscriptScannerBuilder::new(args.contract)
        .lookback(args.lookback)
        .max_block_range(args.max_block_range)
        .gateway(args.gateway)
        .max_concurrent_fetches(args.concurrency)
        .build_with(robust_provider, HttpFetcher::new(Duration::from_secs(15))?)?;

    let chat_id = ChatSessionId::from(args.chat_id);
    let messages = scanner.fetch_transcript(chat_id).await?;
    info!("Reconstructed {} messages of chat {chat_id}", messages.len());

    if args.json {
        println!("{}", serde_json::to_string_pretty(&messages)?);
        return Ok(());
    }

    for message in &messages {
        if message.payload.is_none() {
            warn!("Content of {} could not be fetched", message.id);
        }
        println!("[{}] {}: {}", message.created_at, message.sender_hex(), message.display_text());
    }

    Ok(())
}
