use keyring::Entry;

use super::StoreError;

/// Access to secrets held outside the profile file.
///
/// Implementations may block (an OS keychain can prompt the user), so callers
/// must only reach this when prompting is allowed.
pub trait KeychainAccess: Send + Sync {
    /// Whether a non-empty secret exists for `service`/`account`.
    fn has_secret(
        &self,
        profile_id: &str,
        service: &str,
        account: &str,
    ) -> Result<bool, StoreError>;
}

/// The platform keychain, via `keyring`.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsKeychain;

impl KeychainAccess for OsKeychain {
    fn has_secret(
        &self,
        profile_id: &str,
        service: &str,
        account: &str,
    ) -> Result<bool, StoreError> {
        let to_store_error = |e: keyring::Error| StoreError::Keychain {
            id: profile_id.to_string(),
            message: e.to_string(),
        };

        let entry = Entry::new(service, account).map_err(to_store_error)?;
        match entry.get_password() {
            Ok(secret) => Ok(!secret.trim().is_empty()),
            Err(keyring::Error::NoEntry) => Ok(false),
            Err(e) => Err(to_store_error(e)),
        }
    }
}
