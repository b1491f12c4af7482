// Signed hidden fields for the management page.
//
// A located user is carried between requests in hidden form fields. Those
// fields are accepted back only with a matching HMAC-SHA256 seal, so a post
// can never name a user that no search returned.

use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha256;
use thiserror::Error;

use crate::models::ManagedUser;

type HmacSha256 = Hmac<Sha256>;

pub const SEAL_KEY_LEN: usize = 32;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SealError {
    #[error("seal key must be 32 hex-encoded bytes")]
    InvalidKey,
}

#[derive(Clone)]
pub struct UserSeal {
    mac: HmacSha256,
}

impl std::fmt::Debug for UserSeal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("UserSeal(..)")
    }
}

impl UserSeal {
    pub fn new(key: &[u8]) -> Result<Self, SealError> {
        if key.len() != SEAL_KEY_LEN {
            return Err(SealError::InvalidKey);
        }
        let mac = HmacSha256::new_from_slice(key).map_err(|_| SealError::InvalidKey)?;
        Ok(Self { mac })
    }

    /// Key from `ADMIN_SEAL_KEY`.
    pub fn from_hex(key: &str) -> Result<Self, SealError> {
        let bytes = hex::decode(key.trim()).map_err(|_| SealError::InvalidKey)?;
        Self::new(&bytes)
    }

    /// Per-process key. Seals stop verifying after a restart.
    pub fn random() -> Result<Self, SealError> {
        let mut key = [0u8; SEAL_KEY_LEN];
        rand::thread_rng().fill_bytes(&mut key);
        Self::new(&key)
    }

    fn mac_for(&self, user: &ManagedUser) -> HmacSha256 {
        let mut mac = self.mac.clone();
        for field in [&user.user_id, &user.nickname, &user.phone_number] {
            mac.update(&(field.len() as u64).to_be_bytes());
            mac.update(field.as_bytes());
        }
        mac
    }

    pub fn sign(&self, user: &ManagedUser) -> String {
        hex::encode(self.mac_for(user).finalize().into_bytes())
    }

    pub fn verify(&self, user: &ManagedUser, seal: &str) -> bool {
        let Ok(tag) = hex::decode(seal) else {
            return false;
        };
        self.mac_for(user).verify_slice(&tag).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> ManagedUser {
        ManagedUser {
            user_id: "AB12".into(),
            nickname: "철수".into(),
            phone_number: "010-1234-5678".into(),
        }
    }

    #[test]
    fn test_signed_user_verifies() {
        let seal = UserSeal::new(&[7; SEAL_KEY_LEN]).unwrap();
        let tag = seal.sign(&user());
        assert_eq!(tag.len(), 64);
        assert!(seal.verify(&user(), &tag));
    }

    #[test]
    fn test_changed_field_fails() {
        let seal = UserSeal::new(&[7; SEAL_KEY_LEN]).unwrap();
        let tag = seal.sign(&user());
        let mut other = user();
        other.user_id = "ZZZZ".into();
        assert!(!seal.verify(&other, &tag));
    }

    #[test]
    fn test_field_boundaries_are_bound() {
        let seal = UserSeal::new(&[7; SEAL_KEY_LEN]).unwrap();
        let a = ManagedUser {
            user_id: "AB".into(),
            nickname: "12철수".into(),
            phone_number: String::new(),
        };
        let b = ManagedUser {
            user_id: "AB12".into(),
            nickname: "철수".into(),
            phone_number: String::new(),
        };
        assert_ne!(seal.sign(&a), seal.sign(&b));
    }

    #[test]
    fn test_other_key_or_garbage_fails() {
        let seal = UserSeal::new(&[7; SEAL_KEY_LEN]).unwrap();
        let other = UserSeal::new(&[8; SEAL_KEY_LEN]).unwrap();
        assert!(!other.verify(&user(), &seal.sign(&user())));
        assert!(!seal.verify(&user(), ""));
        assert!(!seal.verify(&user(), "not-hex"));
    }

    #[test]
    fn test_key_parsing() {
        assert!(UserSeal::from_hex(&"ab".repeat(SEAL_KEY_LEN)).is_ok());
        assert_eq!(
            UserSeal::from_hex("abcd").unwrap_err(),
            SealError::InvalidKey
        );
        assert_eq!(UserSeal::from_hex("zz").unwrap_err(), SealError::InvalidKey);
        assert!(UserSeal::random().is_ok());
    }
}
