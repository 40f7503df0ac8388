//! Tap-code verification for dynamically generated tag messages.
//!
//! Each tap yields `(uid, counter, mac)` where the MAC is computed by the tag
//! under a session key derived from its AES-128 master key, the 7-byte UID
//! and the 24-bit tap counter. Verification re-derives the session key and
//! recomputes the truncated MAC.
//!
//! Structural validation runs to completion before any cipher work: malformed
//! input is an error, a wrong MAC is an ordinary `Ok(false)`. Callers must be
//! able to tell "bad request" from "authentication failed".

use thiserror::Error;

use crate::cmac::aes_cmac;

/// Upper bound of the 24-bit tap counter.
pub const COUNTER_MAX: u32 = 0xFF_FFFF;

/// Session-vector prefix for MAC session-key derivation.
const SV2_PREFIX: [u8; 6] = [0x3C, 0xC3, 0x00, 0x01, 0x00, 0x80];

/// Malformed verification input, rejected before any cryptographic work.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StructuralError {
    #[error("tag uid must be exactly 14 hex characters")]
    UidMalformed,

    #[error("mac must be exactly 16 hex characters")]
    MacMalformed,

    #[error("key must be exactly 32 hex characters")]
    KeyMalformed,

    #[error("counter {0} exceeds the 24-bit tap counter range")]
    CounterOutOfRange(u32),
}

fn decode_fixed<const N: usize>(
    field: &str,
    err: StructuralError,
) -> Result<[u8; N], StructuralError> {
    let bytes = hex::decode(field).map_err(|_| err.clone())?;
    bytes.try_into().map_err(|_| err)
}

/// Verify a presented tap code against a tag master key.
///
/// Returns `Ok(true)` iff the recomputed truncated MAC matches `mac_hex`
/// byte for byte. The comparison is plain equality; the truncated-MAC scheme
/// is not constant-time.
pub fn verify(
    uid_hex: &str,
    counter: u32,
    mac_hex: &str,
    key_hex: &str,
) -> Result<bool, StructuralError> {
    let uid: [u8; 7] = decode_fixed(uid_hex, StructuralError::UidMalformed)?;
    let mac: [u8; 8] = decode_fixed(mac_hex, StructuralError::MacMalformed)?;
    let key: [u8; 16] = decode_fixed(key_hex, StructuralError::KeyMalformed)?;

    if counter > COUNTER_MAX {
        return Err(StructuralError::CounterOutOfRange(counter));
    }

    let session_key = derive_session_key(&key, &uid, counter);

    // The tag MACs the ASCII rendering it emits: uppercase UID hex followed
    // by the zero-padded big-endian counter hex.
    let mut mac_input = uid_hex.to_ascii_uppercase().into_bytes();
    mac_input.extend_from_slice(format!("{counter:06X}").as_bytes());

    let full_mac = aes_cmac(&session_key, &mac_input);

    Ok(truncate_mac(full_mac) == mac)
}

/// Derive the per-tap session key: `AES-CMAC(master, SV2)` with
/// `SV2 = prefix || uid || counter_le`.
fn derive_session_key(master_key: &[u8; 16], uid: &[u8; 7], counter: u32) -> [u8; 16] {
    let be = counter.to_be_bytes();
    let counter_le = [be[3], be[2], be[1]];

    let mut sv2 = [0u8; 16];
    sv2[..6].copy_from_slice(&SV2_PREFIX);
    sv2[6..13].copy_from_slice(uid);
    sv2[13..].copy_from_slice(&counter_le);

    aes_cmac(master_key, &sv2)
}

/// Keep the bytes at odd indices of the full 16-byte MAC.
fn truncate_mac(full: [u8; 16]) -> [u8; 8] {
    let mut out = [0u8; 8];
    for (i, slot) in out.iter_mut().enumerate() {
        *slot = full[2 * i + 1];
    }
    out
}
