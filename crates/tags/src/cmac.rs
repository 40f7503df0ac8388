//! AES-CMAC (NIST SP 800-38B) over AES-128.
//!
//! The block helpers are pure functions over fixed-size `[u8; 16]` arrays so
//! block-size mistakes fail at the type level instead of at runtime.

use aes::cipher::{generic_array::GenericArray, BlockEncrypt, KeyInit};
use aes::Aes128;

const BLOCK: usize = 16;

/// Rb constant folded into the last subkey byte when the shifted-out bit is set.
const RB: u8 = 0x87;

fn encrypt_block(key: &[u8; 16], block: [u8; 16]) -> [u8; 16] {
    let cipher = Aes128::new(GenericArray::from_slice(key));
    let mut out = GenericArray::from(block);
    cipher.encrypt_block(&mut out);
    out.into()
}

fn xor_block(a: [u8; 16], b: [u8; 16]) -> [u8; 16] {
    let mut out = [0u8; 16];
    for (i, slot) in out.iter_mut().enumerate() {
        *slot = a[i] ^ b[i];
    }
    out
}

/// GF(2^128) doubling: left shift by one bit, fold Rb in when the high bit
/// shifts out.
fn dbl(block: [u8; 16]) -> [u8; 16] {
    let msb_set = block[0] & 0x80 != 0;

    let mut out = [0u8; 16];
    let mut carry = 0u8;
    for i in (0..BLOCK).rev() {
        out[i] = (block[i] << 1) | carry;
        carry = block[i] >> 7;
    }

    if msb_set {
        out[BLOCK - 1] ^= RB;
    }
    out
}

/// Subkeys K1/K2 derived from the encryption of the all-zero block.
fn subkeys(key: &[u8; 16]) -> ([u8; 16], [u8; 16]) {
    let l = encrypt_block(key, [0u8; 16]);
    let k1 = dbl(l);
    let k2 = dbl(k1);
    (k1, k2)
}

/// Compute AES-CMAC over `message` with an AES-128 key.
///
/// A non-empty message whose length is an exact block multiple gets K1 folded
/// into its final block; anything else (including the empty message) is
/// padded with `0x80` + zeros and gets K2.
pub fn aes_cmac(key: &[u8; 16], message: &[u8]) -> [u8; 16] {
    let (k1, k2) = subkeys(key);

    let (full_blocks, last) = if !message.is_empty() && message.len() % BLOCK == 0 {
        let split = message.len() - BLOCK;
        let mut last = [0u8; 16];
        last.copy_from_slice(&message[split..]);
        (&message[..split], xor_block(last, k1))
    } else {
        let split = message.len() - message.len() % BLOCK;
        let mut last = [0u8; 16];
        last[..message.len() - split].copy_from_slice(&message[split..]);
        last[message.len() - split] = 0x80;
        (&message[..split], xor_block(last, k2))
    };

    let mut acc = [0u8; 16];
    for chunk in full_blocks.chunks_exact(BLOCK) {
        let mut block = [0u8; 16];
        block.copy_from_slice(chunk);
        acc = encrypt_block(key, xor_block(acc, block));
    }

    encrypt_block(key, xor_block(acc, last))
}

#[cfg(test)]
mod tests {
    use super::*;

    // RFC 4493 test vectors (AES-128 key 2b7e1516..., message prefixes of the
    // classic NIST plaintext).

    fn rfc_key() -> [u8; 16] {
        hex::decode("2b7e151628aed2a6abf7158809cf4f3c")
            .unwrap()
            .try_into()
            .unwrap()
    }

    #[test]
    fn rfc4493_empty_message() {
        let mac = aes_cmac(&rfc_key(), b"");
        assert_eq!(hex::encode(mac), "bb1d6929e95937287fa37d129b756746");
    }

    #[test]
    fn rfc4493_single_block() {
        let msg = hex::decode("6bc1bee22e409f96e93d7e117393172a").unwrap();
        let mac = aes_cmac(&rfc_key(), &msg);
        assert_eq!(hex::encode(mac), "070a16b46b4d4144f79bdd9dd04a287c");
    }

    #[test]
    fn rfc4493_40_byte_message() {
        let msg = hex::decode(
            "6bc1bee22e409f96e93d7e117393172a\
             ae2d8a571e03ac9c9eb76fac45af8e51\
             30c81c46a35ce411",
        )
        .unwrap();
        let mac = aes_cmac(&rfc_key(), &msg);
        assert_eq!(hex::encode(mac), "dfa66747de9ae63030ca32611497c827");
    }

    #[test]
    fn rfc4493_four_blocks() {
        let msg = hex::decode(
            "6bc1bee22e409f96e93d7e117393172a\
             ae2d8a571e03ac9c9eb76fac45af8e51\
             30c81c46a35ce411e5fbc1191a0a52ef\
             f69f2445df4f9b17ad2b417be66c3710",
        )
        .unwrap();
        let mac = aes_cmac(&rfc_key(), &msg);
        assert_eq!(hex::encode(mac), "51f0bebf7e3b9d92fc49741779363cfe");
    }

    #[test]
    fn dbl_folds_rb_when_high_bit_set() {
        let mut block = [0u8; 16];
        block[0] = 0x80;
        let doubled = dbl(block);
        assert_eq!(doubled[15], RB);
        assert_eq!(doubled[0], 0x00);
    }
}
