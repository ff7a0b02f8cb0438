use bip32::{DerivationPath, XPrv};
use k256::ecdsa::SigningKey;

use crate::error::{Result, WalletError};

/// BIP-44 path of the first Ethereum account: m/purpose'/coin_type'/account'/change/index.
pub const DEFAULT_ETH_PATH: &str = "m/44'/60'/0'/0/0";

pub fn parse_derivation_path(path: &str) -> Result<DerivationPath> {
    path.parse()
        .map_err(|e: bip32::Error| {
            WalletError::InvalidConfig(format!("derivation path {path:?}: {e}"))
        })
}

/// Derives the secp256k1 signing key at `path` from a BIP-39 seed.
pub fn derive_signing_key(seed: &[u8], path: &DerivationPath) -> Result<SigningKey> {
    let xprv = XPrv::derive_from_path(seed, path)
        .map_err(|e| WalletError::InvalidMnemonic(format!("key derivation failed: {e}")))?;

    Ok(xprv.private_key().clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mnemonic::mnemonic_to_seed;
    use chain_eth::address::{address_from_verifying_key, checksum_address};

    const TEST_MNEMONIC: &str =
        "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

    fn derive_at(path: &str) -> SigningKey {
        let seed = mnemonic_to_seed(TEST_MNEMONIC, "").unwrap();
        derive_signing_key(&seed[..], &parse_derivation_path(path).unwrap()).unwrap()
    }

    #[test]
    fn default_path_known_vector() {
        let key = derive_at(DEFAULT_ETH_PATH);

        assert_eq!(
            hex::encode(key.to_bytes()),
            "1ab42cc412b618bdea3a599e3c9bae199ebf030895b039e9db1e30dafb12b727"
        );
        assert_eq!(
            checksum_address(&address_from_verifying_key(key.verifying_key())),
            "0x9858EfFD232B4033E47d90003D41EC34EcaEda94"
        );
    }

    #[test]
    fn derivation_is_deterministic() {
        assert_eq!(
            derive_at(DEFAULT_ETH_PATH).to_bytes(),
            derive_at(DEFAULT_ETH_PATH).to_bytes()
        );
    }

    #[test]
    fn different_indices_different_keys() {
        assert_ne!(
            derive_at("m/44'/60'/0'/0/0").to_bytes(),
            derive_at("m/44'/60'/0'/0/1").to_bytes()
        );
        assert_ne!(
            derive_at("m/44'/60'/0'/0/0").to_bytes(),
            derive_at("m/44'/60'/1'/0/0").to_bytes()
        );
    }

    #[test]
    fn parse_rejects_malformed_paths() {
        assert!(parse_derivation_path("44'/60'/0'/0/0").is_err());
        assert!(parse_derivation_path("m/44'/x/0").is_err());
    }
}
