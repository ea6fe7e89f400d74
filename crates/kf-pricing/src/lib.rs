//! kf-pricing
//!
//! Turns a spec into an itemized [`kf_schemas::Quote`].
//!
//! [`estimate_local`] is the pure price-table heuristic. Remote backends
//! ([`RemoteOracle`], [`SkuPricingOracle`]) sit behind the [`PriceOracle`]
//! trait and are composed with the local table by [`FallbackOracle`], so a
//! remote failure only costs the vendor price, never the quote.

mod local;
mod oracle;
mod remote;
mod sku;

pub use local::estimate_local;
pub use oracle::{FallbackOracle, LocalHeuristicOracle, OracleError, PriceOracle};
pub use remote::{RemoteOracle, DEFAULT_TIMEOUT_MS};
pub use sku::{SkuMap, SkuPricingOracle, SkuSelection};
