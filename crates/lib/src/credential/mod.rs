//! SSH credential loading.
//!
//! The private key used to reach cluster nodes is read and validated once,
//! before any connection is attempted. Key material never leaves this module:
//! `Debug` output and logs only carry the algorithm and the public key
//! fingerprint.

use std::fmt;
use std::path::{Path, PathBuf};

use ssh_key::{HashAlg, PrivateKey};
use thiserror::Error;
use tracing::info;

/// Errors that can occur while loading a credential.
#[derive(Debug, Error)]
pub enum CredentialError {
  /// The key file is missing or unreadable.
  #[error("failed to read private key {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  /// The file is not a valid OpenSSH private key.
  #[error("malformed private key {path}: {source}")]
  Malformed {
    path: PathBuf,
    #[source]
    source: ssh_key::Error,
  },

  /// The key is protected by a passphrase and cannot be used unattended.
  #[error("private key {0} is passphrase-protected")]
  Encrypted(PathBuf),
}

/// A validated SSH private key together with the file it came from.
pub struct Credential {
  path: PathBuf,
  key: PrivateKey,
}

impl Credential {
  /// Load and validate an OpenSSH private key file.
  pub fn load(path: &Path) -> Result<Self, CredentialError> {
    let content = std::fs::read_to_string(path).map_err(|source| CredentialError::Read {
      path: path.to_path_buf(),
      source,
    })?;

    let key = PrivateKey::from_openssh(content.as_bytes()).map_err(|source| CredentialError::Malformed {
      path: path.to_path_buf(),
      source,
    })?;

    if key.is_encrypted() {
      return Err(CredentialError::Encrypted(path.to_path_buf()));
    }

    let credential = Self {
      path: path.to_path_buf(),
      key,
    };

    info!(
      path = %credential.path.display(),
      algorithm = %credential.algorithm(),
      fingerprint = %credential.fingerprint(),
      "loaded private key"
    );

    Ok(credential)
  }

  /// Path of the key file, handed to the SSH client as its identity.
  pub fn path(&self) -> &Path {
    &self.path
  }

  pub fn algorithm(&self) -> String {
    self.key.algorithm().to_string()
  }

  /// SHA-256 fingerprint of the public half.
  pub fn fingerprint(&self) -> String {
    self.key.public_key().fingerprint(HashAlg::Sha256).to_string()
  }
}

impl fmt::Debug for Credential {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Credential")
      .field("path", &self.path)
      .field("algorithm", &self.algorithm())
      .field("fingerprint", &self.fingerprint())
      .finish_non_exhaustive()
  }
}
