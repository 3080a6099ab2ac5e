//! Detection and password verification for the PDF Standard Security Handler
//! (ISO 32000-1 §7.6). This crate never needs to produce encrypted output,
//! but an input PDF protected by a user/owner password must be recognised
//! before the rest of the pipeline tries (and fails confusingly) to read it.

use super::objects::{PdfDictionary, PdfObject};
use super::ParseResult;
use md5::{Digest, Md5};
use sha2::Sha256;

/// The 32-byte padding string used to pad/truncate passwords (Algorithm 2).
const PAD_BYTES: [u8; 32] = [
    0x28, 0xBF, 0x4E, 0x5E, 0x4E, 0x75, 0x8A, 0x41, 0x64, 0x00, 0x4E, 0x56, 0xFF, 0xFA, 0x01, 0x08,
    0x2E, 0x2E, 0x00, 0xB6, 0xD0, 0x68, 0x3E, 0x80, 0x2F, 0x0C, 0xA9, 0xFE, 0x64, 0x53, 0x69, 0x7A,
];

fn pad_password(password: &[u8]) -> [u8; 32] {
    let mut padded = [0u8; 32];
    let n = password.len().min(32);
    padded[..n].copy_from_slice(&password[..n]);
    padded[n..].copy_from_slice(&PAD_BYTES[..32 - n]);
    padded
}

/// Minimal RC4 stream cipher, needed only to verify R2-R4 passwords.
fn rc4(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut s: [u8; 256] = std::array::from_fn(|i| i as u8);
    let mut j: u8 = 0;
    for i in 0..256 {
        j = j.wrapping_add(s[i]).wrapping_add(key[i % key.len()]);
        s.swap(i, j as usize);
    }
    let mut out = Vec::with_capacity(data.len());
    let (mut i, mut j) = (0u8, 0u8);
    for &byte in data {
        i = i.wrapping_add(1);
        j = j.wrapping_add(s[i as usize]);
        s.swap(i as usize, j as usize);
        let k = s[(s[i as usize].wrapping_add(s[j as usize])) as usize];
        out.push(byte ^ k);
    }
    out
}

/// Fields read from the `/Encrypt` dictionary.
#[derive(Debug, Clone)]
pub struct EncryptionInfo {
    pub v: i64,
    pub r: i64,
    pub length_bits: i64,
    pub o: Vec<u8>,
    pub u: Vec<u8>,
    pub p: i64,
    pub encrypt_metadata: bool,
}

/// Whether the PDF declares an `/Encrypt` entry in its trailer.
pub fn detect_encryption(trailer_dict: &PdfDictionary) -> bool {
    trailer_dict.get("Encrypt").is_some()
}

impl EncryptionHandler {
    /// True if `trailer_dict` names an `/Encrypt` dictionary.
    pub fn detect_encryption(trailer_dict: &PdfDictionary) -> bool {
        detect_encryption(trailer_dict)
    }
}

fn get_bytes(dict: &PdfDictionary, key: &str) -> Option<Vec<u8>> {
    match dict.get(key) {
        Some(PdfObject::String(s)) => Some(s.as_bytes().to_vec()),
        _ => None,
    }
}

/// Verifies user/owner passwords against a PDF's `/Encrypt` dictionary.
/// Only R2-R4 (RC4/MD5) and R5-R6 (AES-256/SHA-256) password checks are
/// implemented; this crate never decrypts stream or string content.
pub struct EncryptionHandler {
    info: EncryptionInfo,
    file_id: Vec<u8>,
    unlocked: bool,
}

impl EncryptionHandler {
    pub fn new(encrypt_dict: &PdfDictionary, file_id: Option<Vec<u8>>) -> ParseResult<Self> {
        let v = encrypt_dict.get("V").and_then(|o| o.as_integer()).unwrap_or(1);
        let r = encrypt_dict.get("R").and_then(|o| o.as_integer()).unwrap_or(2);
        let length_bits = encrypt_dict
            .get("Length")
            .and_then(|o| o.as_integer())
            .unwrap_or(40);
        let o = get_bytes(encrypt_dict, "O").unwrap_or_default();
        let u = get_bytes(encrypt_dict, "U").unwrap_or_default();
        let p = encrypt_dict.get("P").and_then(|o| o.as_integer()).unwrap_or(0);
        let encrypt_metadata = encrypt_dict
            .get("EncryptMetadata")
            .and_then(|o| o.as_bool())
            .unwrap_or(true);

        Ok(EncryptionHandler {
            info: EncryptionInfo {
                v,
                r,
                length_bits,
                o,
                u,
                p,
                encrypt_metadata,
            },
            file_id: file_id.unwrap_or_default(),
            unlocked: false,
        })
    }

    pub fn info(&self) -> &EncryptionInfo {
        &self.info
    }

    pub fn is_unlocked(&self) -> bool {
        self.unlocked
    }

    fn compute_key_r2_r4(&self, password: &[u8]) -> Vec<u8> {
        let padded = pad_password(password);
        let key_len = (self.info.length_bits / 8).clamp(5, 16) as usize;

        let mut hasher = Md5::new();
        hasher.update(padded);
        hasher.update(&self.info.o[..self.info.o.len().min(32)]);
        hasher.update((self.info.p as i32).to_le_bytes());
        hasher.update(&self.file_id);
        if self.info.r >= 4 && !self.info.encrypt_metadata {
            hasher.update([0xFF, 0xFF, 0xFF, 0xFF]);
        }
        let mut digest = hasher.finalize().to_vec();

        if self.info.r >= 3 {
            for _ in 0..50 {
                let mut h = Md5::new();
                h.update(&digest[..key_len]);
                digest = h.finalize().to_vec();
            }
        }

        digest[..key_len].to_vec()
    }

    fn user_password_matches_r2_r4(&self, password: &[u8]) -> bool {
        let key = self.compute_key_r2_r4(password);
        if self.info.r == 2 {
            rc4(&key, &PAD_BYTES) == self.info.u
        } else {
            let mut hasher = Md5::new();
            hasher.update(PAD_BYTES);
            hasher.update(&self.file_id);
            let mut digest = hasher.finalize().to_vec();
            digest = rc4(&key, &digest);
            for i in 1u8..=19 {
                let round_key: Vec<u8> = key.iter().map(|b| b ^ i).collect();
                digest = rc4(&round_key, &digest);
            }
            self.info.u.len() >= 16 && digest[..16] == self.info.u[..16]
        }
    }

    fn password_matches_r5_r6(&self, password: &[u8]) -> bool {
        if self.info.u.len() < 48 {
            return false;
        }
        let validation_salt = &self.info.u[32..40];
        let mut hasher = Sha256::new();
        hasher.update(password);
        hasher.update(validation_salt);
        let hash = hasher.finalize();
        hash.as_slice() == &self.info.u[0..32]
    }

    /// Attempt the user password. Returns `Ok(true)` and marks the handler
    /// unlocked on success.
    pub fn unlock_with_user_password(&mut self, password: &str) -> ParseResult<bool> {
        let matched = if self.info.r >= 5 {
            self.password_matches_r5_r6(password.as_bytes())
        } else {
            self.user_password_matches_r2_r4(password.as_bytes())
        };
        if matched {
            self.unlocked = true;
        }
        Ok(matched)
    }

    /// The owner password check only re-derives the user password via `/O`
    /// for R2-R4; for R5/R6 it validates against the owner hash directly.
    pub fn unlock_with_owner_password(&mut self, password: &str) -> ParseResult<bool> {
        if self.info.r >= 5 {
            if self.info.o.len() < 48 {
                return Ok(false);
            }
            let validation_salt = &self.info.o[32..40];
            let mut hasher = Sha256::new();
            hasher.update(password.as_bytes());
            hasher.update(validation_salt);
            hasher.update(&self.info.u);
            let matched = hasher.finalize().as_slice() == &self.info.o[0..32];
            if matched {
                self.unlocked = true;
            }
            return Ok(matched);
        }

        let padded = pad_password(password.as_bytes());
        let mut digest = Md5::digest(padded).to_vec();
        if self.info.r >= 3 {
            for _ in 0..50 {
                digest = Md5::digest(&digest).to_vec();
            }
        }
        let key_len = (self.info.length_bits / 8).clamp(5, 16) as usize;
        let rc4_key = &digest[..key_len];

        let mut user_password = if self.info.r == 2 {
            rc4(rc4_key, &self.info.o)
        } else {
            let mut data = self.info.o.clone();
            for i in (0u8..=19).rev() {
                let round_key: Vec<u8> = rc4_key.iter().map(|b| b ^ i).collect();
                data = rc4(&round_key, &data);
            }
            data
        };
        user_password.truncate(32);

        let matched = self.user_password_matches_r2_r4(&user_password);
        if matched {
            self.unlocked = true;
        }
        Ok(matched)
    }

    pub fn try_empty_password(&mut self) -> ParseResult<bool> {
        self.unlock_with_user_password("")
    }
}

/// Outcome of an interactive unlock attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordResult {
    Unlocked,
    Rejected,
    NoPasswordAvailable,
}

/// Supplies candidate passwords to [`InteractiveDecryption`].
pub trait PasswordProvider {
    fn next_password(&mut self) -> Option<String>;
}

/// Reads candidate passwords from stdin, one attempt at a time.
pub struct ConsolePasswordProvider {
    prompted: bool,
}

impl Default for ConsolePasswordProvider {
    fn default() -> Self {
        ConsolePasswordProvider { prompted: false }
    }
}

impl PasswordProvider for ConsolePasswordProvider {
    fn next_password(&mut self) -> Option<String> {
        if self.prompted {
            return None;
        }
        self.prompted = true;
        use std::io::Write;
        print!("Password: ");
        std::io::stdout().flush().ok()?;
        let mut line = String::new();
        std::io::stdin().read_line(&mut line).ok()?;
        Some(line.trim_end().to_string())
    }
}

/// Drives [`EncryptionHandler`] through a sequence of passwords from a
/// [`PasswordProvider`] until one unlocks the document or the provider is
/// exhausted.
pub struct InteractiveDecryption<'a, P: PasswordProvider> {
    handler: &'a mut EncryptionHandler,
    provider: P,
}

impl<'a, P: PasswordProvider> InteractiveDecryption<'a, P> {
    pub fn new(handler: &'a mut EncryptionHandler, provider: P) -> Self {
        InteractiveDecryption { handler, provider }
    }

    pub fn run(&mut self) -> ParseResult<PasswordResult> {
        if self.handler.try_empty_password()? {
            return Ok(PasswordResult::Unlocked);
        }
        while let Some(password) = self.provider.next_password() {
            if self.handler.unlock_with_user_password(&password)? {
                return Ok(PasswordResult::Unlocked);
            }
            if self.handler.unlock_with_owner_password(&password)? {
                return Ok(PasswordResult::Unlocked);
            }
        }
        if self.handler.is_unlocked() {
            Ok(PasswordResult::Unlocked)
        } else {
            Ok(PasswordResult::Rejected)
        }
    }
}
