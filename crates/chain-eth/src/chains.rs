/// Public mainnet endpoint used when the caller connects without a URL.
pub const DEFAULT_RPC_URL: &str = "https://eth.llamarpc.com";

/// Decimal places of the native currency (wei per ETH = 10^18).
pub const NATIVE_DECIMALS: u8 = 18;
