use alloy_primitives::{Address, B256, U256};
use alloy_rlp::{Encodable, RlpEncodable};
use k256::ecdsa::SigningKey;
use sha3::{Digest, Keccak256};

use crate::error::EthError;

/// EIP-2718 type byte of a dynamic-fee transaction.
pub const EIP1559_TX_TYPE: u8 = 0x02;

/// An unsigned EIP-1559 (type 2) Ethereum transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EthTransaction {
    pub chain_id: u64,
    pub nonce: u64,
    pub max_priority_fee_per_gas: u128,
    pub max_fee_per_gas: u128,
    pub gas_limit: u64,
    pub to: Address,
    /// Transfer value in wei.
    pub value: U256,
    /// Calldata (empty for plain ETH transfers).
    pub data: Vec<u8>,
}

/// A signed EIP-1559 transaction ready for `eth_sendRawTransaction`.
#[derive(Debug, Clone)]
pub struct SignedEthTransaction {
    /// `0x02 || rlp(signed fields)`.
    pub raw_tx: Vec<u8>,
    /// Keccak-256 of `raw_tx`.
    pub tx_hash: B256,
}

impl SignedEthTransaction {
    /// Raw transaction as 0x-prefixed hex.
    pub fn raw_tx_hex(&self) -> String {
        format!("0x{}", hex::encode(&self.raw_tx))
    }
}

/// Encodes the unsigned transaction as `0x02 || rlp(fields)`.
///
/// The RLP list is
/// `[chain_id, nonce, max_priority_fee_per_gas, max_fee_per_gas, gas_limit, to,
///   value, data, access_list]`.
pub fn encode_unsigned_tx(tx: &EthTransaction) -> Vec<u8> {
    let fields = UnsignedTxFields {
        chain_id: tx.chain_id,
        nonce: tx.nonce,
        max_priority_fee_per_gas: tx.max_priority_fee_per_gas,
        max_fee_per_gas: tx.max_fee_per_gas,
        gas_limit: tx.gas_limit,
        to: RlpAddress(tx.to),
        value: RlpU256(tx.value),
        data: RlpBytes(tx.data.clone()),
        access_list: Vec::new(),
    };

    typed_envelope(&fields)
}

/// Hash that the sender signs: `keccak256(0x02 || rlp(unsigned fields))`.
pub fn signing_hash(tx: &EthTransaction) -> B256 {
    B256::from_slice(&Keccak256::digest(encode_unsigned_tx(tx)))
}

/// Signs an EIP-1559 transaction.
///
/// The signature is low-s and carries the y-parity of the recovery id.
pub fn sign_transaction(
    tx: &EthTransaction,
    signing_key: &SigningKey,
) -> Result<SignedEthTransaction, EthError> {
    let hash = signing_hash(tx);

    let (signature, recovery_id) = signing_key
        .sign_prehash_recoverable(hash.as_slice())
        .map_err(|e| EthError::SigningError(e.to_string()))?;

    let fields = SignedTxFields {
        chain_id: tx.chain_id,
        nonce: tx.nonce,
        max_priority_fee_per_gas: tx.max_priority_fee_per_gas,
        max_fee_per_gas: tx.max_fee_per_gas,
        gas_limit: tx.gas_limit,
        to: RlpAddress(tx.to),
        value: RlpU256(tx.value),
        data: RlpBytes(tx.data.clone()),
        access_list: Vec::new(),
        signature_y_parity: recovery_id.is_y_odd() as u8,
        signature_r: RlpU256(U256::from_be_slice(&signature.r().to_bytes())),
        signature_s: RlpU256(U256::from_be_slice(&signature.s().to_bytes())),
    };

    let raw_tx = typed_envelope(&fields);
    let tx_hash = B256::from_slice(&Keccak256::digest(&raw_tx));

    Ok(SignedEthTransaction { raw_tx, tx_hash })
}

fn typed_envelope<T: Encodable>(fields: &T) -> Vec<u8> {
    let mut out = Vec::with_capacity(1 + fields.length());
    out.push(EIP1559_TX_TYPE);
    fields.encode(&mut out);
    out
}

// ---------------------------------------------------------------------------
// RLP-encodable structures
// ---------------------------------------------------------------------------

#[derive(RlpEncodable)]
struct UnsignedTxFields {
    chain_id: u64,
    nonce: u64,
    max_priority_fee_per_gas: u128,
    max_fee_per_gas: u128,
    gas_limit: u64,
    to: RlpAddress,
    value: RlpU256,
    data: RlpBytes,
    access_list: Vec<AccessListItem>,
}

#[derive(RlpEncodable)]
struct SignedTxFields {
    chain_id: u64,
    nonce: u64,
    max_priority_fee_per_gas: u128,
    max_fee_per_gas: u128,
    gas_limit: u64,
    to: RlpAddress,
    value: RlpU256,
    data: RlpBytes,
    access_list: Vec<AccessListItem>,
    signature_y_parity: u8,
    signature_r: RlpU256,
    signature_s: RlpU256,
}

/// EIP-2930 access list entry. The wallet always sends an empty list.
#[derive(RlpEncodable)]
struct AccessListItem {
    address: RlpAddress,
    storage_keys: Vec<RlpBytes>,
}

/// 20-byte address encoded as an RLP string.
struct RlpAddress(Address);

impl Encodable for RlpAddress {
    fn encode(&self, out: &mut dyn alloy_rlp::BufMut) {
        self.0.as_slice().encode(out);
    }

    fn length(&self) -> usize {
        self.0.as_slice().length()
    }
}

/// Integer encoded as minimal big-endian bytes (zero is the empty string).
struct RlpU256(U256);

impl RlpU256 {
    fn trimmed(&self) -> Vec<u8> {
        let bytes = self.0.to_be_bytes::<32>();
        let start = bytes.iter().position(|&b| b != 0).unwrap_or(32);
        bytes[start..].to_vec()
    }
}

impl Encodable for RlpU256 {
    fn encode(&self, out: &mut dyn alloy_rlp::BufMut) {
        self.trimmed().as_slice().encode(out);
    }

    fn length(&self) -> usize {
        self.trimmed().as_slice().length()
    }
}

/// Byte string. A bare `Vec<u8>` would be encoded as a list of integers.
struct RlpBytes(Vec<u8>);

impl Encodable for RlpBytes {
    fn encode(&self, out: &mut dyn alloy_rlp::BufMut) {
        self.0.as_slice().encode(out);
    }

    fn length(&self) -> usize {
        self.0.as_slice().length()
    }
}
