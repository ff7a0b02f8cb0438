//! Minimal ABI encoding and decoding for EVM function calls.
//!
//! Just enough of the contract ABI to build ERC-20 calldata and read back
//! the static return values of its view functions, without pulling in a
//! full ABI parser.

use alloy_primitives::{Address, U256};

use crate::error::EthError;

/// Size of one ABI word.
pub const WORD: usize = 32;

/// A single static ABI parameter.
#[derive(Debug, Clone)]
pub enum AbiParam {
    /// A 20-byte Ethereum address, left-padded to 32 bytes.
    Address(Address),
    /// A 256-bit unsigned integer, big-endian.
    Uint256(U256),
}

/// Encodes a function call as `selector || word(params[0]) || word(params[1]) || ...`.
pub fn encode_function_call(selector: [u8; 4], params: &[AbiParam]) -> Vec<u8> {
    let mut data = Vec::with_capacity(4 + params.len() * WORD);
    data.extend_from_slice(&selector);

    for param in params {
        data.extend_from_slice(&encode_param(param));
    }

    data
}

fn encode_param(param: &AbiParam) -> [u8; WORD] {
    match param {
        AbiParam::Address(addr) => {
            let mut word = [0u8; WORD];
            word[12..].copy_from_slice(addr.as_slice());
            word
        }
        AbiParam::Uint256(value) => value.to_be_bytes::<WORD>(),
    }
}

/// Decodes a `uint256` return value. Trailing words are ignored.
pub fn decode_uint256(data: &[u8]) -> Result<U256, EthError> {
    let word = word_at(data, 0)?;
    Ok(U256::from_be_slice(word))
}

/// Decodes a `uint8` return value, rejecting words that do not fit.
pub fn decode_uint8(data: &[u8]) -> Result<u8, EthError> {
    let value = decode_uint256(data)?;
    u8::try_from(value)
        .map_err(|_| EthError::EncodingError(format!("value {value} does not fit in uint8")))
}

/// Decodes a dynamic `string` return value (offset, length, UTF-8 bytes).
pub fn decode_string(data: &[u8]) -> Result<String, EthError> {
    let offset = word_as_usize(word_at(data, 0)?)?;
    let start = offset
        .checked_add(WORD)
        .ok_or_else(|| EthError::EncodingError("string offset out of bounds".into()))?;
    let len_word = data
        .get(offset..start)
        .ok_or_else(|| EthError::EncodingError("string offset out of bounds".into()))?;
    let len = word_as_usize(len_word)?;

    let bytes = start
        .checked_add(len)
        .and_then(|end| data.get(start..end))
        .ok_or_else(|| EthError::EncodingError("string length out of bounds".into()))?;

    String::from_utf8(bytes.to_vec())
        .map_err(|e| EthError::EncodingError(format!("string is not utf-8: {e}")))
}

fn word_at(data: &[u8], index: usize) -> Result<&[u8], EthError> {
    data.get(index * WORD..(index + 1) * WORD).ok_or_else(|| {
        EthError::EncodingError(format!(
            "expected at least {} bytes of return data, got {}",
            (index + 1) * WORD,
            data.len()
        ))
    })
}

fn word_as_usize(word: &[u8]) -> Result<usize, EthError> {
    let value = U256::from_be_slice(word);
    usize::try_from(value)
        .map_err(|_| EthError::EncodingError(format!("offset {value} is too large")))
}
