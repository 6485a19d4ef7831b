//! Retrying, failover-capable ledger client built on Alloy providers.
//!
//! [`RobustProvider`] wraps an Alloy [`RootProvider`](alloy::providers::RootProvider) and adds:
//! * a bounded total timeout per call
//! * exponential backoff retries
//! * ordered failover between a primary and any number of fallback providers
//!
//! It implements [`LedgerClient`](crate::LedgerClient), so it can be handed straight to the
//! [`RangeScanner`](crate::RangeScanner) or a [`TranscriptScanner`](crate::TranscriptScanner).
//!
//! # Examples
//!
//! ```rust,no_run
//! use alloy::providers::ProviderBuilder;
//! use std::time::Duration;
//! use transcript_scanner::robust_provider::RobustProviderBuilder;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let primary = ProviderBuilder::new().connect("https://rpc.example.org").await?;
//! let fallback = ProviderBuilder::new().connect("https://backup.example.org").await?;
//!
//! let robust = RobustProviderBuilder::new(primary)
//!     .fallback(fallback)
//!     .call_timeout(Duration::from_secs(20))
//!     .build()
//!     .await?;
//!
//! let head = robust.get_block_number().await?;
//! println!("Current block: {head}");
//! # Ok(()) }
//! ```

pub mod builder;
pub mod error;
pub mod provider;
pub mod provider_conversion;

pub use builder::*;
pub use error::Error;
pub use provider::RobustProvider;
pub use provider_conversion::IntoRootProvider;
