//! Web3 Secret Storage (keystore v3) documents.
//!
//! Export always writes scrypt + AES-128-CTR. Import also accepts
//! PBKDF2-HMAC-SHA256 documents and the `Crypto` key spelling that some
//! older clients emit.

use chain_eth::address::address_from_verifying_key;
use chain_eth::Address;
use crypto_utils::encryption::{self, IV_SIZE, KEY_SIZE};
use crypto_utils::kdf::{self, DEFAULT_SCRYPT_P, DEFAULT_SCRYPT_R, KEYSTORE_DKLEN};
use k256::ecdsa::SigningKey;
use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};
use uuid::Uuid;
use zeroize::Zeroizing;

use crate::error::{Result, WalletError};

const CIPHER: &str = "aes-128-ctr";
const PBKDF2_PRF: &str = "hmac-sha256";

// Upper bounds on KDF parameters read from a document. Anything outside
// them is refused before any memory is allocated for the derivation.
const MIN_DKLEN: usize = 32;
const MAX_DKLEN: usize = 64;
const MAX_SCRYPT_LOG_N: u8 = 20;
const MAX_SCRYPT_RP: u64 = 256;
/// scrypt needs `128 * r * n` bytes of working memory.
const MAX_SCRYPT_MEMORY: u64 = 1 << 30;
const MAX_PBKDF2_ROUNDS: u32 = 10_000_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeystoreV3 {
    pub version: u32,
    pub id: String,
    /// Lowercase hex without `0x`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(alias = "Crypto")]
    pub crypto: CryptoSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CryptoSection {
    pub cipher: String,
    pub cipherparams: CipherParams,
    pub ciphertext: String,
    pub kdf: String,
    pub kdfparams: KdfParams,
    pub mac: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CipherParams {
    pub iv: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KdfParams {
    Scrypt {
        dklen: usize,
        n: u64,
        p: u32,
        r: u32,
        salt: String,
    },
    Pbkdf2 {
        c: u32,
        dklen: usize,
        prf: String,
        salt: String,
    },
}

/// Encrypts `key` into a keystore JSON document under `password`.
///
/// Cost is `n = 2^log_n`; wallets conventionally use 17.
pub fn encrypt_keystore(
    key: &SigningKey,
    address: Address,
    password: &str,
    log_n: u8,
) -> Result<String> {
    let salt = kdf::generate_salt();
    let iv = encryption::generate_iv();

    let derived = Zeroizing::new(kdf::scrypt_derive(
        password.as_bytes(),
        &salt,
        log_n,
        DEFAULT_SCRYPT_R,
        DEFAULT_SCRYPT_P,
        KEYSTORE_DKLEN,
    )?);

    let secret = Zeroizing::new(key.to_bytes().to_vec());
    let ciphertext = encryption::encrypt(&secret, &derived[..KEY_SIZE], &iv)?;
    let mac = keystore_mac(&derived[KEY_SIZE..KEY_SIZE * 2], &ciphertext);

    let document = KeystoreV3 {
        version: 3,
        id: Uuid::new_v4().to_string(),
        address: Some(hex::encode(address.as_slice())),
        crypto: CryptoSection {
            cipher: CIPHER.to_string(),
            cipherparams: CipherParams {
                iv: hex::encode(iv),
            },
            ciphertext: hex::encode(&ciphertext),
            kdf: "scrypt".to_string(),
            kdfparams: KdfParams::Scrypt {
                dklen: KEYSTORE_DKLEN,
                n: 1u64 << log_n,
                p: DEFAULT_SCRYPT_P,
                r: DEFAULT_SCRYPT_R,
                salt: hex::encode(salt),
            },
            mac: hex::encode(mac),
        },
    };

    serde_json::to_string(&document).map_err(|e| WalletError::EncryptionFailed(e.to_string()))
}

/// Decrypts a keystore document and returns the signing key it holds.
///
/// Every failure (malformed JSON, unsupported parameters, wrong password,
/// address mismatch) is reported as `DecryptionFailed`.
pub fn decrypt_keystore(json: &str, password: &str) -> Result<SigningKey> {
    let document: KeystoreV3 = serde_json::from_str(json).map_err(failed)?;

    if document.version != 3 {
        return Err(failed(format!(
            "unsupported keystore version {}",
            document.version
        )));
    }

    let crypto = &document.crypto;
    if !crypto.cipher.eq_ignore_ascii_case(CIPHER) {
        return Err(failed(format!("unsupported cipher {}", crypto.cipher)));
    }

    let derived = Zeroizing::new(derive_key(crypto, password)?);

    let ciphertext = decode_hex("ciphertext", &crypto.ciphertext)?;
    let expected_mac = decode_hex("mac", &crypto.mac)?;
    let mac = keystore_mac(&derived[KEY_SIZE..KEY_SIZE * 2], &ciphertext);
    if mac.as_slice() != expected_mac.as_slice() {
        return Err(failed("invalid password"));
    }

    let iv: [u8; IV_SIZE] = decode_hex("iv", &crypto.cipherparams.iv)?
        .try_into()
        .map_err(|_| failed(format!("iv must be {IV_SIZE} bytes")))?;

    let secret = Zeroizing::new(
        encryption::decrypt(&ciphertext, &derived[..KEY_SIZE], &iv).map_err(failed)?,
    );
    let key = SigningKey::from_slice(&secret).map_err(|e| failed(format!("bad key: {e}")))?;

    if let Some(stored) = &document.address {
        let stored = stored.trim_start_matches("0x").to_ascii_lowercase();
        let actual = hex::encode(address_from_verifying_key(key.verifying_key()).as_slice());
        if stored != actual {
            return Err(failed("address does not match decrypted key"));
        }
    }

    Ok(key)
}

fn derive_key(crypto: &CryptoSection, password: &str) -> Result<Vec<u8>> {
    match (&crypto.kdfparams, crypto.kdf.as_str()) {
        (KdfParams::Scrypt { dklen, n, p, r, salt }, "scrypt") => {
            check_dklen(*dklen)?;
            let log_n = kdf::scrypt_log_n(*n).map_err(failed)?;
            check_scrypt_cost(log_n, *r, *p)?;
            let salt = decode_hex("salt", salt)?;
            kdf::scrypt_derive(password.as_bytes(), &salt, log_n, *r, *p, *dklen).map_err(failed)
        }
        (KdfParams::Pbkdf2 { c, dklen, prf, salt }, "pbkdf2") => {
            if prf != PBKDF2_PRF {
                return Err(failed(format!("unsupported pbkdf2 prf {prf}")));
            }
            check_dklen(*dklen)?;
            if *c > MAX_PBKDF2_ROUNDS {
                return Err(failed(format!(
                    "pbkdf2 iteration count {c} exceeds {MAX_PBKDF2_ROUNDS}"
                )));
            }
            let salt = decode_hex("salt", salt)?;
            kdf::pbkdf2_sha256_derive(password.as_bytes(), &salt, *c, *dklen).map_err(failed)
        }
        (_, other) => Err(failed(format!("unsupported or mismatched kdf {other}"))),
    }
}

fn check_dklen(dklen: usize) -> Result<()> {
    if !(MIN_DKLEN..=MAX_DKLEN).contains(&dklen) {
        return Err(failed(format!(
            "dklen {dklen} outside {MIN_DKLEN}..={MAX_DKLEN}"
        )));
    }
    Ok(())
}

fn check_scrypt_cost(log_n: u8, r: u32, p: u32) -> Result<()> {
    if log_n > MAX_SCRYPT_LOG_N {
        return Err(failed(format!(
            "scrypt n = 2^{log_n} exceeds 2^{MAX_SCRYPT_LOG_N}"
        )));
    }
    let (r, p) = (u64::from(r), u64::from(p));
    if r == 0 || p == 0 || r * p > MAX_SCRYPT_RP {
        return Err(failed(format!("scrypt r = {r}, p = {p} out of range")));
    }
    if 128 * r * (1u64 << log_n) > MAX_SCRYPT_MEMORY {
        return Err(failed(format!(
            "scrypt r = {r} with n = 2^{log_n} needs more than {MAX_SCRYPT_MEMORY} bytes"
        )));
    }
    Ok(())
}

fn keystore_mac(mac_key: &[u8], ciphertext: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(mac_key);
    hasher.update(ciphertext);
    hasher.finalize().into()
}

fn decode_hex(field: &str, value: &str) -> Result<Vec<u8>> {
    hex::decode(value.trim_start_matches("0x"))
        .map_err(|e| failed(format!("{field} is not hex: {e}")))
}

fn failed(reason: impl ToString) -> WalletError {
    WalletError::DecryptionFailed(reason.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    // Cheap scrypt cost for tests.
    const TEST_LOG_N: u8 = 4;

    fn test_key() -> SigningKey {
        let mut bytes = [0u8; 32];
        bytes[31] = 1;
        SigningKey::from_slice(&bytes).unwrap()
    }

    fn export(password: &str) -> String {
        let key = test_key();
        let address = address_from_verifying_key(key.verifying_key());
        encrypt_keystore(&key, address, password, TEST_LOG_N).unwrap()
    }

    #[test]
    fn export_document_shape() {
        let json = export("pw");
        let doc: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(doc["version"], 3);
        assert_eq!(doc["address"], "7e5f4552091a69125d5dfcb7b8c2659029395bdf");
        assert_eq!(doc["crypto"]["cipher"], "aes-128-ctr");
        assert_eq!(doc["crypto"]["kdf"], "scrypt");
        assert_eq!(doc["crypto"]["kdfparams"]["n"], 16);
        assert_eq!(doc["crypto"]["kdfparams"]["r"], 8);
        assert_eq!(doc["crypto"]["kdfparams"]["p"], 1);
        assert_eq!(doc["crypto"]["kdfparams"]["dklen"], 32);
        assert_eq!(doc["crypto"]["cipherparams"]["iv"].as_str().unwrap().len(), 32);
        assert_eq!(doc["crypto"]["ciphertext"].as_str().unwrap().len(), 64);
        assert!(Uuid::parse_str(doc["id"].as_str().unwrap()).is_ok());
    }

    #[test]
    fn roundtrip_recovers_key() {
        let json = export("correct horse");
        let key = decrypt_keystore(&json, "correct horse").unwrap();
        assert_eq!(key.to_bytes(), test_key().to_bytes());
    }

    #[test]
    fn wrong_password_fails() {
        let json = export("correct horse");
        let err = decrypt_keystore(&json, "battery staple").unwrap_err();
        assert!(matches!(err, WalletError::DecryptionFailed(_)));
    }

    #[test]
    fn salts_and_ivs_are_fresh() {
        assert_ne!(export("pw"), export("pw"));
    }

    #[test]
    fn accepts_capitalized_crypto_key() {
        let json = export("pw").replace("\"crypto\"", "\"Crypto\"");
        assert!(decrypt_keystore(&json, "pw").is_ok());
    }

    #[test]
    fn tampered_ciphertext_fails_mac() {
        let mut doc: KeystoreV3 = serde_json::from_str(&export("pw")).unwrap();
        let mut ct = hex::decode(&doc.crypto.ciphertext).unwrap();
        ct[0] ^= 0xff;
        doc.crypto.ciphertext = hex::encode(ct);

        let json = serde_json::to_string(&doc).unwrap();
        assert!(matches!(
            decrypt_keystore(&json, "pw"),
            Err(WalletError::DecryptionFailed(_))
        ));
    }

    #[test]
    fn address_mismatch_fails() {
        let mut doc: KeystoreV3 = serde_json::from_str(&export("pw")).unwrap();
        doc.address = Some("000000000000000000000000000000000000dead".into());

        let json = serde_json::to_string(&doc).unwrap();
        let err = decrypt_keystore(&json, "pw").unwrap_err();
        assert!(err.to_string().contains("address"));
    }

    #[test]
    fn rejects_malformed_documents() {
        assert!(decrypt_keystore("not json", "pw").is_err());
        assert!(decrypt_keystore("{}", "pw").is_err());

        let v2 = export("pw").replace("\"version\":3", "\"version\":2");
        assert!(decrypt_keystore(&v2, "pw").is_err());

        let cbc = export("pw").replace("aes-128-ctr", "aes-128-cbc");
        assert!(decrypt_keystore(&cbc, "pw").is_err());
    }

    #[test]
    fn imports_pbkdf2_documents() {
        // Build a pbkdf2 document with the same primitives the importer uses.
        let key = test_key();
        let salt = [7u8; 32];
        let iv = [9u8; IV_SIZE];
        let derived = kdf::pbkdf2_sha256_derive(b"pw", &salt, 1_000, 32).unwrap();
        let ciphertext = encryption::encrypt(&key.to_bytes(), &derived[..16], &iv).unwrap();
        let mac = keystore_mac(&derived[16..32], &ciphertext);

        let doc = KeystoreV3 {
            version: 3,
            id: Uuid::new_v4().to_string(),
            address: None,
            crypto: CryptoSection {
                cipher: CIPHER.into(),
                cipherparams: CipherParams { iv: hex::encode(iv) },
                ciphertext: hex::encode(&ciphertext),
                kdf: "pbkdf2".into(),
                kdfparams: KdfParams::Pbkdf2 {
                    c: 1_000,
                    dklen: 32,
                    prf: "hmac-sha256".into(),
                    salt: hex::encode(salt),
                },
                mac: hex::encode(mac),
            },
        };

        let json = serde_json::to_string(&doc).unwrap();
        let restored = decrypt_keystore(&json, "pw").unwrap();
        assert_eq!(restored.to_bytes(), key.to_bytes());
    }

    /// Re-encodes an exported document after editing its `kdfparams`.
    fn with_kdfparams(edit: impl FnOnce(&mut serde_json::Value)) -> String {
        let mut doc: serde_json::Value = serde_json::from_str(&export("pw")).unwrap();
        edit(&mut doc["crypto"]["kdfparams"]);
        doc.to_string()
    }

    fn assert_refused(json: &str) {
        let err = decrypt_keystore(json, "pw").unwrap_err();
        assert!(matches!(err, WalletError::DecryptionFailed(_)), "{err}");
    }

    #[test]
    fn rejects_out_of_range_dklen() {
        for dklen in [0u64, 16, 31, 65, u32::MAX as u64, u64::MAX] {
            assert_refused(&with_kdfparams(|p| p["dklen"] = dklen.into()));
        }
        // A longer dklen only appends bytes; the key and MAC halves are unchanged.
        assert!(decrypt_keystore(&with_kdfparams(|p| p["dklen"] = 64.into()), "pw").is_ok());
    }

    #[test]
    fn rejects_excessive_scrypt_n() {
        for n in [1u64 << 21, 1 << 40, 1 << 63] {
            assert_refused(&with_kdfparams(|p| p["n"] = n.into()));
        }
    }

    #[test]
    fn rejects_excessive_scrypt_r_and_p() {
        assert_refused(&with_kdfparams(|p| p["r"] = 0.into()));
        assert_refused(&with_kdfparams(|p| p["p"] = 0.into()));
        assert_refused(&with_kdfparams(|p| p["p"] = u32::MAX.into()));
        assert_refused(&with_kdfparams(|p| {
            p["r"] = 16.into();
            p["p"] = 17.into();
        }));
        // 128 * 64 * 2^18 is 2 GiB of working memory.
        assert_refused(&with_kdfparams(|p| {
            p["n"] = (1u64 << 18).into();
            p["r"] = 64.into();
        }));
    }

    #[test]
    fn rejects_excessive_pbkdf2_rounds() {
        let doc = KeystoreV3 {
            version: 3,
            id: Uuid::new_v4().to_string(),
            address: None,
            crypto: CryptoSection {
                cipher: CIPHER.into(),
                cipherparams: CipherParams { iv: hex::encode([0u8; IV_SIZE]) },
                ciphertext: hex::encode([0u8; 32]),
                kdf: "pbkdf2".into(),
                kdfparams: KdfParams::Pbkdf2 {
                    c: MAX_PBKDF2_ROUNDS + 1,
                    dklen: 32,
                    prf: "hmac-sha256".into(),
                    salt: hex::encode([1u8; 32]),
                },
                mac: hex::encode([0u8; 32]),
            },
        };
        assert_refused(&serde_json::to_string(&doc).unwrap());

        let mut json: serde_json::Value = serde_json::to_value(&doc).unwrap();
        json["crypto"]["kdfparams"]["c"] = 1000.into();
        json["crypto"]["kdfparams"]["dklen"] = u64::MAX.into();
        assert_refused(&json.to_string());
    }

    #[test]
    fn kdf_name_must_match_params() {
        let json = export("pw").replace("\"kdf\":\"scrypt\"", "\"kdf\":\"pbkdf2\"");
        assert!(decrypt_keystore(&json, "pw").is_err());
    }
}
