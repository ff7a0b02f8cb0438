use rand::RngCore;
use rand_core::OsRng;
use zeroize::Zeroizing;

/// Generates `len` cryptographically secure random bytes.
///
/// The buffer is wiped on drop; use it for entropy that becomes key material.
pub fn random_bytes(len: usize) -> Zeroizing<Vec<u8>> {
    let mut buf = Zeroizing::new(vec![0u8; len]);
    OsRng.fill_bytes(&mut buf);
    buf
}

/// Generates a fixed-size array of cryptographically secure random bytes.
pub fn random_bytes_fixed<const N: usize>() -> [u8; N] {
    let mut buf = [0u8; N];
    OsRng.fill_bytes(&mut buf);
    buf
}
