use super::Config;
use crate::security::SecretStore;
use anyhow::{Context, Result};

impl Config {
    fn secret_fields_mut(&mut self) -> [&mut Option<String>; 5] {
        [
            &mut self.security.jwt_secret,
            &mut self.security.nextauth_secret,
            &mut self.smtp.password,
            &mut self.setup.token,
            &mut self.client.admin_token,
        ]
    }

    fn secret_store(&self) -> Result<SecretStore> {
        SecretStore::open_or_create(&self.config_dir).context("Failed to open config secret key")
    }

    /// Open sealed secrets after loading. Returns `true` when a plaintext
    /// secret was found that should be sealed on the next save.
    pub(super) fn open_secrets_in_place(&mut self) -> Result<bool> {
        let encrypt = self.security.encrypt_secrets;
        let has_sealed = self
            .secret_fields_mut()
            .iter()
            .any(|v| v.as_deref().is_some_and(SecretStore::is_sealed));
        if !has_sealed {
            return Ok(encrypt && self.has_plain_secret());
        }

        let store = self.secret_store()?;
        let mut needs_seal = false;
        for value in self.secret_fields_mut() {
            let Some(current) = value.as_deref().map(str::trim) else {
                continue;
            };
            if current.is_empty() {
                *value = None;
                continue;
            }
            needs_seal |= encrypt && !SecretStore::is_sealed(current);
            let opened = store
                .open(current)
                .context("Failed to open a sealed config secret")?;
            *value = Some(opened);
        }
        Ok(needs_seal)
    }

    fn has_plain_secret(&mut self) -> bool {
        self.secret_fields_mut().iter().any(|v| {
            v.as_deref()
                .is_some_and(|s| !s.trim().is_empty() && !SecretStore::is_sealed(s))
        })
    }

    /// Copy of `self` with every secret sealed, for writing to disk.
    pub(super) fn config_for_persistence(&self) -> Result<Self> {
        let mut persisted = self.clone();
        if !self.security.encrypt_secrets {
            return Ok(persisted);
        }
        if !persisted.has_plain_secret() {
            return Ok(persisted);
        }
        let store = self.secret_store()?;
        for value in persisted.secret_fields_mut() {
            if let Some(current) = value.as_deref().map(str::trim)
                && !current.is_empty()
            {
                let sealed = store.seal(current).context("Failed to seal config secret")?;
                *value = Some(sealed);
            }
        }
        Ok(persisted)
    }
}
