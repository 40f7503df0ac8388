//! Registered tag credentials.
//!
//! Credentials are created and rotated by the admin surface; this crate only
//! reads them. A credential binds one physical tag (by UID) to exactly one
//! company.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use workpass_core::{CompanyId, DomainError, TagId};

use crate::authenticator::{self, StructuralError};

/// Canonical 7-byte tag UID, held as its uppercase 14-hex-char rendering.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagUid(String);

impl TagUid {
    /// Parse and canonicalize a UID. Accepts either case, stores uppercase.
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let canonical = raw.trim().to_ascii_uppercase();
        if canonical.len() != 14 || !canonical.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(DomainError::validation(
                "tag uid must be exactly 14 hex characters",
            ));
        }
        Ok(Self(canonical))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for TagUid {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A registered tag: UID + AES-128 master key, bound to one company.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagCredential {
    pub id: TagId,
    pub uid: TagUid,
    pub aes_key: [u8; 16],
    pub company_id: CompanyId,
    pub display_name: String,
}

impl TagCredential {
    /// Build a credential from the hex key the provisioning tool exports.
    pub fn from_hex_key(
        uid: TagUid,
        key_hex: &str,
        company_id: CompanyId,
        display_name: impl Into<String>,
    ) -> Result<Self, DomainError> {
        let bytes = hex::decode(key_hex)
            .map_err(|_| DomainError::validation("tag key must be hex"))?;
        let aes_key: [u8; 16] = bytes
            .try_into()
            .map_err(|_| DomainError::validation("tag key must be exactly 16 bytes"))?;

        Ok(Self {
            id: TagId::new(),
            uid,
            aes_key,
            company_id,
            display_name: display_name.into(),
        })
    }

    fn key_hex(&self) -> String {
        hex::encode(self.aes_key)
    }
}

/// Why a presented tap was rejected against a credential.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TapRejection {
    #[error(transparent)]
    Structural(#[from] StructuralError),

    /// The presented UID is not the credential's UID.
    #[error("uid does not match the registered tag")]
    UidMismatch,

    /// Counter did not advance past the last accepted tap (replay).
    #[error("counter {presented} does not advance past last seen {last_seen}")]
    Replay { presented: u32, last_seen: u32 },

    /// MAC did not verify.
    #[error("tap code did not authenticate")]
    BadMac,
}

/// Check a presented tap against a stored credential.
///
/// `last_seen` is the highest counter previously accepted for this tag; a
/// presented counter must strictly exceed it (monotonic replay protection).
/// Pass `None` for a tag with no accepted taps yet.
pub fn verify_tap(
    credential: &TagCredential,
    uid_hex: &str,
    counter: u32,
    mac_hex: &str,
    last_seen: Option<u32>,
) -> Result<(), TapRejection> {
    let presented = TagUid::parse(uid_hex)
        .map_err(|_| TapRejection::Structural(StructuralError::UidMalformed))?;
    if presented != credential.uid {
        return Err(TapRejection::UidMismatch);
    }

    if let Some(last_seen) = last_seen {
        if counter <= last_seen {
            return Err(TapRejection::Replay {
                presented: counter,
                last_seen,
            });
        }
    }

    let authentic =
        authenticator::verify(presented.as_str(), counter, mac_hex, &credential.key_hex())?;
    if !authentic {
        return Err(TapRejection::BadMac);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const UID: &str = "042C6632A91190";
    const KEY: &str = "169b35e5fd663d4042224323bc8ebc71";
    const MAC: &str = "6B8B1F06C2B3B7C1";

    fn credential() -> TagCredential {
        TagCredential::from_hex_key(
            TagUid::parse(UID).unwrap(),
            KEY,
            CompanyId::new(1),
            "front door",
        )
        .unwrap()
    }

    #[test]
    fn uid_canonicalizes_to_uppercase() {
        let uid = TagUid::parse("042c6632a91190").unwrap();
        assert_eq!(uid.as_str(), UID);
    }

    #[test]
    fn uid_rejects_wrong_length_and_alphabet() {
        assert!(TagUid::parse("042C66").is_err());
        assert!(TagUid::parse("042C6632A9119G").is_err());
    }

    #[test]
    fn credential_rejects_short_key() {
        let err = TagCredential::from_hex_key(
            TagUid::parse(UID).unwrap(),
            "169b35e5",
            CompanyId::new(1),
            "door",
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn fresh_tap_verifies() {
        assert_eq!(verify_tap(&credential(), UID, 54, MAC, None), Ok(()));
    }

    #[test]
    fn advancing_counter_passes_replay_gate() {
        assert_eq!(verify_tap(&credential(), UID, 54, MAC, Some(53)), Ok(()));
    }

    #[test]
    fn stale_counter_is_replay() {
        assert_eq!(
            verify_tap(&credential(), UID, 54, MAC, Some(54)),
            Err(TapRejection::Replay {
                presented: 54,
                last_seen: 54
            })
        );
    }

    #[test]
    fn foreign_uid_is_mismatch() {
        assert_eq!(
            verify_tap(&credential(), "04000000000000", 54, MAC, None),
            Err(TapRejection::UidMismatch)
        );
    }

    #[test]
    fn bad_mac_is_rejected_after_replay_gate() {
        assert_eq!(
            verify_tap(&credential(), UID, 54, "FFFFFFFFFFFFFFFF", None),
            Err(TapRejection::BadMac)
        );
    }
}
