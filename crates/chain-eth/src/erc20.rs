use alloy_primitives::{Address, U256};

use crate::abi::{encode_function_call, AbiParam};

/// Tether USD (USDT) contract on Ethereum mainnet.
pub const USDT_CONTRACT_ADDRESS: &str = "0xdAC17F958D2ee523a2206206994597C13D831ec7";

/// Function selector for `balanceOf(address)`: `0x70a08231`.
pub const BALANCE_OF_SELECTOR: [u8; 4] = [0x70, 0xa0, 0x82, 0x31];

/// Function selector for `decimals()`: `0x313ce567`.
pub const DECIMALS_SELECTOR: [u8; 4] = [0x31, 0x3c, 0xe5, 0x67];

/// Function selector for `symbol()`: `0x95d89b41`.
pub const SYMBOL_SELECTOR: [u8; 4] = [0x95, 0xd8, 0x9b, 0x41];

/// Function selector for `transfer(address,uint256)`: `0xa9059cbb`.
pub const TRANSFER_SELECTOR: [u8; 4] = [0xa9, 0x05, 0x9c, 0xbb];

/// Function selector for `allowance(address,address)`: `0xdd62ed3e`.
pub const ALLOWANCE_SELECTOR: [u8; 4] = [0xdd, 0x62, 0xed, 0x3e];

/// Function selector for `approve(address,uint256)`: `0x095ea7b3`.
pub const APPROVE_SELECTOR: [u8; 4] = [0x09, 0x5e, 0xa7, 0xb3];

/// Encodes `balanceOf(owner)`.
pub fn encode_balance_of(owner: Address) -> Vec<u8> {
    encode_function_call(BALANCE_OF_SELECTOR, &[AbiParam::Address(owner)])
}

/// Encodes `decimals()`.
pub fn encode_decimals() -> Vec<u8> {
    encode_function_call(DECIMALS_SELECTOR, &[])
}

/// Encodes `symbol()`.
pub fn encode_symbol() -> Vec<u8> {
    encode_function_call(SYMBOL_SELECTOR, &[])
}

/// Encodes `transfer(to, amount)` where `amount` is in the token's smallest unit.
pub fn encode_transfer(to: Address, amount: U256) -> Vec<u8> {
    encode_function_call(
        TRANSFER_SELECTOR,
        &[AbiParam::Address(to), AbiParam::Uint256(amount)],
    )
}

/// Encodes `allowance(owner, spender)`.
pub fn encode_allowance(owner: Address, spender: Address) -> Vec<u8> {
    encode_function_call(
        ALLOWANCE_SELECTOR,
        &[AbiParam::Address(owner), AbiParam::Address(spender)],
    )
}

/// Encodes `approve(spender, amount)`.
pub fn encode_approve(spender: Address, amount: U256) -> Vec<u8> {
    encode_function_call(
        APPROVE_SELECTOR,
        &[AbiParam::Address(spender), AbiParam::Uint256(amount)],
    )
}
