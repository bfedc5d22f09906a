use chacha20poly1305::{
    ChaCha20Poly1305, Key, KeyInit, Nonce,
    aead::{Aead, OsRng, rand_core::RngCore},
};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use zeroize::Zeroizing;

const KEY_FILE: &str = "secret.key";
const SEALED_PREFIX: &str = "sealed:";
const KEY_LEN: usize = 32;
const NONCE_LEN: usize = 12;

#[derive(Debug, Error)]
pub enum SecretError {
    #[error("key file {}: {source}", path.display())]
    KeyIo {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("key file {} is corrupt", .0.display())]
    CorruptKey(PathBuf),

    #[error("sealed value is malformed")]
    Malformed,

    #[error("sealed value could not be opened with this key")]
    WrongKey,
}

/// Seals connection strings and other credentials written into the install
/// manifest. The 256-bit key lives next to the manifest, owner-readable only,
/// and is created on first use.
pub struct SecretStore {
    key_path: PathBuf,
    key: Zeroizing<[u8; KEY_LEN]>,
}

impl SecretStore {
    pub fn open_or_create(dir: &Path) -> Result<Self, SecretError> {
        let key_path = dir.join(KEY_FILE);
        let key = match read_key(&key_path) {
            Ok(key) => key,
            Err(SecretError::KeyIo { source, .. })
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                create_key(&key_path)?
            }
            Err(e) => return Err(e),
        };
        Ok(Self { key_path, key })
    }

    pub fn key_path(&self) -> &Path {
        &self.key_path
    }

    pub fn is_sealed(value: &str) -> bool {
        value.starts_with(SEALED_PREFIX)
    }

    /// `sealed:<hex(nonce || ciphertext)>`. Empty and already sealed values
    /// pass through unchanged.
    pub fn seal(&self, plaintext: &str) -> Result<String, SecretError> {
        if plaintext.is_empty() || Self::is_sealed(plaintext) {
            return Ok(plaintext.to_string());
        }
        let mut nonce = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce);
        let sealed = self
            .cipher()
            .encrypt(Nonce::from_slice(&nonce), plaintext.as_bytes())
            .map_err(|_| SecretError::Malformed)?;

        let mut combined = nonce.to_vec();
        combined.extend_from_slice(&sealed);
        Ok(format!("{SEALED_PREFIX}{}", hex::encode(combined)))
    }

    /// Reverse of [`seal`](Self::seal); unsealed input is returned as is.
    pub fn open(&self, value: &str) -> Result<String, SecretError> {
        let Some(encoded) = value.strip_prefix(SEALED_PREFIX) else {
            return Ok(value.to_string());
        };
        let combined = hex::decode(encoded).map_err(|_| SecretError::Malformed)?;
        if combined.len() <= NONCE_LEN {
            return Err(SecretError::Malformed);
        }
        let (nonce, ciphertext) = combined.split_at(NONCE_LEN);
        let plaintext = self
            .cipher()
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| SecretError::WrongKey)?;
        String::from_utf8(plaintext).map_err(|_| SecretError::Malformed)
    }

    fn cipher(&self) -> ChaCha20Poly1305 {
        ChaCha20Poly1305::new(Key::from_slice(&self.key[..]))
    }
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> SecretError + '_ {
    move |source| SecretError::KeyIo {
        path: path.to_path_buf(),
        source,
    }
}

fn read_key(path: &Path) -> Result<Zeroizing<[u8; KEY_LEN]>, SecretError> {
    let encoded = Zeroizing::new(fs::read_to_string(path).map_err(io_error(path))?);
    let bytes = Zeroizing::new(
        hex::decode(encoded.trim()).map_err(|_| SecretError::CorruptKey(path.to_path_buf()))?,
    );
    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    if bytes.len() != KEY_LEN {
        return Err(SecretError::CorruptKey(path.to_path_buf()));
    }
    key.copy_from_slice(&bytes);
    Ok(key)
}

fn create_key(path: &Path) -> Result<Zeroizing<[u8; KEY_LEN]>, SecretError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_error(path))?;
    }
    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    OsRng.fill_bytes(&mut key[..]);

    let mut options = fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    match options.open(path) {
        Ok(mut file) => {
            file.write_all(hex::encode(&key[..]).as_bytes())
                .and_then(|()| file.sync_all())
                .map_err(io_error(path))?;
            Ok(key)
        }
        // Lost a race with another writer; use theirs.
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => read_key(path),
        Err(e) => Err(io_error(path)(e)),
    }
}
