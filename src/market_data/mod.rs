pub mod coingecko;
mod rate_limit;
mod snapshot;
mod source;

pub use coingecko::CoinGeckoClient;
pub use rate_limit::{KeyRing, RequestGate};
pub use snapshot::{display_name, display_symbol, AssetSnapshot};
pub use source::{AssetDataSource, UpstreamError};
