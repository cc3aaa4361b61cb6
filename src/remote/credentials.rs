//! Session credentials and the plain-text credentials file.

use super::RemoteError;

/// Default session name when none is configured.
pub const DEFAULT_SESSION_NAME: &str = "telegram_music";

/// Opaque session credentials handed to a [`Connector`](super::Connector).
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub api_id: String,
    pub api_hash: String,
    pub session_name: String,
    pub phone_number: Option<String>,
}

impl Default for Credentials {
    fn default() -> Self {
        Self {
            api_id: String::new(),
            api_hash: String::new(),
            session_name: DEFAULT_SESSION_NAME.to_string(),
            phone_number: None,
        }
    }
}

// api_hash must never reach the logs.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_id", &self.api_id)
            .field("api_hash", &"<redacted>")
            .field("session_name", &self.session_name)
            .field("phone_number", &self.phone_number)
            .finish()
    }
}

impl Credentials {
    /// Overrides fields with non-empty values from a credentials file.
    #[must_use]
    pub fn merged_with(mut self, file: &AuthFileValues) -> Self {
        if let Some(api_id) = non_empty(file.api_id.as_deref()) {
            self.api_id = api_id.to_string();
        }
        if let Some(api_hash) = non_empty(file.api_hash.as_deref()) {
            self.api_hash = api_hash.to_string();
        }
        if let Some(phone) = non_empty(file.phone_number.as_deref()) {
            self.phone_number = Some(phone.to_string());
        }
        self
    }

    /// Checks that the credentials are usable for a remote login.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::Auth`] if `api_id` is not numeric or
    /// `api_hash`/`session_name` is empty.
    pub fn validate(&self) -> Result<(), RemoteError> {
        if self.api_id.trim().parse::<i64>().is_err() {
            return Err(RemoteError::auth("API ID must be a number"));
        }
        if self.api_hash.trim().is_empty() {
            return Err(RemoteError::auth("API hash is empty"));
        }
        if self.session_name.trim().is_empty() {
            return Err(RemoteError::auth("session name is empty"));
        }
        Ok(())
    }
}

/// Values read from a credentials file. Absent keys stay `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthFileValues {
    pub api_id: Option<String>,
    pub api_hash: Option<String>,
    pub phone_number: Option<String>,
}

/// Parses a credentials file.
///
/// Accepts `key=value` and `key: value` lines; blank lines and `#` comments
/// are ignored. Keys are case-insensitive and accept a few spellings
/// (`api_id`, `api id`, `id`, `api_hash`, `apihash`, `hash`, `phone`,
/// `phone_number`, `phone number`, `phone-number`). Unknown keys are skipped.
#[must_use]
pub fn parse_auth_file(raw: &str) -> AuthFileValues {
    let mut values = AuthFileValues::default();
    for line in raw.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=').or_else(|| line.split_once(':')) else {
            continue;
        };
        let value = value.trim().to_string();
        match key.trim().to_lowercase().as_str() {
            "api_id" | "api id" | "id" => values.api_id = Some(value),
            "api_hash" | "apihash" | "hash" => values.api_hash = Some(value),
            "phone" | "phone_number" | "phone number" | "phone-number" => {
                values.phone_number = Some(value);
            }
            _ => {}
        }
    }
    values
}

/// Template written for users who have no credentials file yet.
pub const AUTH_FILE_TEMPLATE: &str = "# Fill in the values and save the file\nAPI_ID=\nAPI_HASH=\nPHONE_NUMBER=\n";

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
