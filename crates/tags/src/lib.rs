//! `workpass-tags` — NFC tag credentials and tap-code authentication.
//!
//! A registered tag carries an AES-128 master key. Every tap emits a
//! dynamically generated message (UID + monotonic counter + truncated
//! AES-CMAC); this crate verifies those messages. Pure computation, no I/O.

pub mod authenticator;
pub mod cmac;
pub mod credential;

pub use authenticator::{verify, StructuralError, COUNTER_MAX};
pub use cmac::aes_cmac;
pub use credential::{verify_tap, TagCredential, TagUid, TapRejection};
