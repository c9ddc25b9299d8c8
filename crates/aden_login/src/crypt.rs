//! Cryptography for the control channel: the RSA-512 keypair whose
//! modulus travels scrambled inside `Init`, and the Blowfish cipher the
//! rest of the traffic runs under.

use anyhow::{ensure, Context};
use blowfish::cipher::generic_array::GenericArray;
use blowfish::cipher::{BlockDecrypt, BlockEncrypt, KeyInit};
use blowfish::Blowfish;
use num_bigint::BigUint;
use rand::rngs::OsRng;
use rsa::traits::{PrivateKeyParts, PublicKeyParts};
use rsa::RsaPrivateKey;

/// Size of the RSA modulus on the wire.
pub const MODULUS_LEN: usize = 64;

/// Blowfish operates on 8-byte blocks; control bodies are padded to this.
pub const BLOCK_LEN: usize = 8;

/// Key protecting the control connection until `BlowFishKey` installs the
/// session key. Well known by both sides.
pub const STATIC_CONTROL_KEY: &[u8] = b"_;v.]05-31!|+-%xT!^[$\x00";

/// Length of the random per-link Blowfish key minted by the game server.
pub const SESSION_CONTROL_KEY_LEN: usize = 16;

/// Scrambles an RSA modulus in place with the fixed 4-step permute/XOR
/// transform applied before it is sent in `Init`.
pub fn scramble_modulus(n: &mut [u8; MODULUS_LEN]) {
    for i in 0..4 {
        n.swap(i, 0x26 + i);
    }

    for i in 0..0x20 {
        n[i] ^= n[0x20 + i];
    }

    for i in 0..4 {
        n[0x06 + i] ^= n[0x1a + i];
    }

    for i in 0..0x20 {
        n[0x20 + i] ^= n[i];
    }
}

/// Exact inverse of [`scramble_modulus`].
pub fn unscramble_modulus(n: &mut [u8; MODULUS_LEN]) {
    for i in 0..0x20 {
        n[0x20 + i] ^= n[i];
    }

    for i in 0..4 {
        n[0x06 + i] ^= n[0x1a + i];
    }

    for i in 0..0x20 {
        n[i] ^= n[0x20 + i];
    }

    for i in 0..4 {
        n.swap(i, 0x26 + i);
    }
}

/// The login server's RSA-512 keypair, kept as raw big-endian integers so
/// the key transport can run the textbook modular exponentiation the
/// protocol expects (no padding scheme).
pub struct LoginKeyPair {
    n: BigUint,
    e: BigUint,
    d: BigUint,
}

impl LoginKeyPair {
    /// Generates a fresh keypair at server startup.
    pub fn generate() -> anyhow::Result<Self> {
        let key = RsaPrivateKey::new(&mut OsRng, 512).context("generating RSA-512 keypair")?;

        Ok(Self {
            n: BigUint::from_bytes_be(&key.n().to_bytes_be()),
            e: BigUint::from_bytes_be(&key.e().to_bytes_be()),
            d: BigUint::from_bytes_be(&key.d().to_bytes_be()),
        })
    }

    /// The public modulus, zero-padded to [`MODULUS_LEN`].
    pub fn modulus_bytes(&self) -> [u8; MODULUS_LEN] {
        to_fixed(&self.n)
    }

    /// Raw RSA decryption of a [`MODULUS_LEN`]-byte block.
    pub fn decrypt_raw(&self, block: &[u8]) -> anyhow::Result<[u8; MODULUS_LEN]> {
        ensure!(
            block.len() == MODULUS_LEN,
            "RSA block must be {MODULUS_LEN} bytes, got {}",
            block.len()
        );

        let c = BigUint::from_bytes_be(block);
        ensure!(c < self.n, "RSA block out of range");

        Ok(to_fixed(&c.modpow(&self.d, &self.n)))
    }
}

/// Raw RSA encryption against a peer's modulus (public exponent 65537).
/// The plaintext is right-aligned in a zero-padded block.
pub fn encrypt_raw(modulus: &[u8; MODULUS_LEN], plain: &[u8]) -> anyhow::Result<[u8; MODULUS_LEN]> {
    ensure!(
        plain.len() <= MODULUS_LEN - 1,
        "plaintext too long for the modulus"
    );

    let n = BigUint::from_bytes_be(modulus);
    let e = BigUint::from(65_537u32);

    let mut block = [0u8; MODULUS_LEN];
    block[MODULUS_LEN - plain.len()..].copy_from_slice(plain);

    let m = BigUint::from_bytes_be(&block);
    ensure!(m < n, "plaintext block out of range");

    Ok(to_fixed(&m.modpow(&e, &n)))
}

fn to_fixed(value: &BigUint) -> [u8; MODULUS_LEN] {
    let bytes = value.to_bytes_be();
    let mut out = [0u8; MODULUS_LEN];
    out[MODULUS_LEN - bytes.len()..].copy_from_slice(&bytes);
    out
}

/// Blowfish in per-block mode over control bodies.
pub struct ControlCipher {
    bf: Blowfish,
}

impl ControlCipher {
    /// The cipher every control connection starts with.
    pub fn static_key() -> Self {
        Self::new(STATIC_CONTROL_KEY).expect("static key is valid")
    }

    pub fn new(key: &[u8]) -> anyhow::Result<Self> {
        ensure!(
            (4..=56).contains(&key.len()),
            "Blowfish key must be 4..=56 bytes"
        );

        Ok(Self {
            bf: Blowfish::new_from_slice(key).expect("length checked above"),
        })
    }

    /// Encrypts a body in place. Length must be block-aligned.
    pub fn encrypt(&self, data: &mut [u8]) {
        debug_assert_eq!(data.len() % BLOCK_LEN, 0);

        for chunk in data.chunks_exact_mut(BLOCK_LEN) {
            self.bf
                .encrypt_block(GenericArray::from_mut_slice(chunk));
        }
    }

    /// Decrypts a body in place. Length must be block-aligned.
    pub fn decrypt(&self, data: &mut [u8]) {
        debug_assert_eq!(data.len() % BLOCK_LEN, 0);

        for chunk in data.chunks_exact_mut(BLOCK_LEN) {
            self.bf
                .decrypt_block(GenericArray::from_mut_slice(chunk));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scramble_round_trips() {
        let mut n = [0u8; MODULUS_LEN];
        for (i, b) in n.iter_mut().enumerate() {
            *b = (i as u8).wrapping_mul(37).wrapping_add(11);
        }
        let original = n;

        scramble_modulus(&mut n);
        assert_ne!(n, original, "scramble must actually transform");

        unscramble_modulus(&mut n);
        assert_eq!(n, original);
    }

    #[test]
    fn raw_rsa_round_trips() {
        let pair = LoginKeyPair::generate().unwrap();
        let modulus = pair.modulus_bytes();

        let secret = b"sixteen byte key";
        let cipher = encrypt_raw(&modulus, secret).unwrap();
        let plain = pair.decrypt_raw(&cipher).unwrap();

        assert_eq!(&plain[MODULUS_LEN - secret.len()..], secret);
        assert!(plain[..MODULUS_LEN - secret.len()].iter().all(|&b| b == 0));
    }

    #[test]
    fn blowfish_round_trips() {
        let cipher = ControlCipher::new(b"some-session-key").unwrap();

        let mut data = *b"0123456789abcdef";
        cipher.encrypt(&mut data);
        assert_ne!(&data, b"0123456789abcdef");

        cipher.decrypt(&mut data);
        assert_eq!(&data, b"0123456789abcdef");
    }

    #[test]
    fn static_cipher_is_shared_knowledge() {
        let a = ControlCipher::static_key();
        let b = ControlCipher::static_key();

        let mut data = [7u8; 16];
        a.encrypt(&mut data);
        b.decrypt(&mut data);

        assert_eq!(data, [7u8; 16]);
    }
}
