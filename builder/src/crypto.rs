// Licensed under the Apache-2.0 license

use std::path::Path;

use anyhow::{bail, Result};
use sha2::{Digest, Sha256, Sha512};

use crate::error::BuildError;

/// Digest widths the boot ROM accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashWidth {
    Sha256,
    Sha512,
}

impl HashWidth {
    pub fn from_bits(bits: u16) -> Result<Self, BuildError> {
        match bits {
            256 => Ok(Self::Sha256),
            512 => Ok(Self::Sha512),
            other => Err(BuildError::DigestWidth(other)),
        }
    }

    pub fn digest_len(self) -> usize {
        match self {
            Self::Sha256 => 32,
            Self::Sha512 => 64,
        }
    }
}

/// Digest and signature operations the build pipeline delegates.
pub trait ImageCrypto {
    fn digest(&self, data: &[u8], width: HashWidth) -> Vec<u8>;

    /// Signs `data` with the key named by `key`. The signature may be
    /// shorter than the 512-byte header slot; the caller zero-pads.
    fn sign(&self, data: &[u8], key: &Path) -> Result<Vec<u8>>;
}

/// SHA-2 provider. It carries no signing backend, so builds that enable
/// signing must bring their own [`ImageCrypto`].
#[derive(Debug, Default)]
pub struct Sha2Crypto;

impl ImageCrypto for Sha2Crypto {
    fn digest(&self, data: &[u8], width: HashWidth) -> Vec<u8> {
        match width {
            HashWidth::Sha256 => Sha256::digest(data).to_vec(),
            HashWidth::Sha512 => Sha512::digest(data).to_vec(),
        }
    }

    fn sign(&self, _data: &[u8], key: &Path) -> Result<Vec<u8>> {
        bail!(BuildError::KeyReference(key.display().to_string()))
    }
}
