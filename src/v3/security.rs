//! USM credentials.
//!
//! [`SecurityParameters`] holds one user's credentials. Passwords are turned
//! into master keys at construction and never stored; [`SecurityParameters::localize`]
//! binds them to a remote engine.

use bytes::Bytes;

use super::auth::{LocalizedKey, MasterKey};
use super::privacy::{PrivKey, SaltCounter};
use super::{AuthProtocol, PrivProtocol};
use crate::error::{Error, Result};

/// Maximum USM user name length (SnmpAdminString (SIZE(1..32))).
pub const MAX_USER_NAME_LEN: usize = 32;
/// Maximum authentication password length.
pub const MAX_AUTH_PASSWORD_LEN: usize = 40;
/// Maximum privacy password length.
pub const MAX_PRIV_PASSWORD_LEN: usize = 32;

/// Security model identifiers (RFC 3411).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SecurityModel {
    /// User-based Security Model.
    #[default]
    Usm,
}

impl SecurityModel {
    pub fn as_i32(self) -> i32 {
        match self {
            Self::Usm => 3,
        }
    }

    pub fn from_i32(value: i32) -> Option<Self> {
        match value {
            3 => Some(Self::Usm),
            _ => None,
        }
    }
}

impl std::fmt::Display for SecurityModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Usm => f.write_str("usm"),
        }
    }
}

impl std::str::FromStr for SecurityModel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.eq_ignore_ascii_case("usm") {
            Ok(Self::Usm)
        } else {
            Err(Error::config(format!("unsupported security model '{}'", s)))
        }
    }
}

/// Security level, ordered from weakest to strongest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SecurityLevel {
    NoAuthNoPriv,
    AuthNoPriv,
    AuthPriv,
}

impl SecurityLevel {
    pub fn requires_auth(self) -> bool {
        self >= Self::AuthNoPriv
    }

    pub fn requires_priv(self) -> bool {
        self == Self::AuthPriv
    }
}

impl std::fmt::Display for SecurityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoAuthNoPriv => f.write_str("noAuthNoPriv"),
            Self::AuthNoPriv => f.write_str("authNoPriv"),
            Self::AuthPriv => f.write_str("authPriv"),
        }
    }
}

/// Credentials of one USM user.
#[derive(Debug)]
pub struct SecurityParameters {
    model: SecurityModel,
    user_name: Bytes,
    auth: Option<MasterKey>,
    privacy: Option<(PrivProtocol, MasterKey)>,
    salt: SaltCounter,
}

impl SecurityParameters {
    /// A user without authentication or privacy.
    ///
    /// Fails with `FieldTooLarge` for a name over 32 bytes.
    pub fn new(user_name: impl Into<Bytes>) -> Result<Self> {
        let user_name = user_name.into();
        if user_name.len() > MAX_USER_NAME_LEN {
            return Err(Error::field_too_large(
                "user name",
                user_name.len(),
                MAX_USER_NAME_LEN,
            ));
        }
        Ok(Self {
            model: SecurityModel::Usm,
            user_name,
            auth: None,
            privacy: None,
            salt: SaltCounter::new()?,
        })
    }

    /// Empty user, as used by the engine discovery request.
    pub fn discovery() -> Result<Self> {
        Self::new(Bytes::new())
    }

    /// Add authentication, deriving the master key from `password`.
    pub fn with_auth(mut self, protocol: AuthProtocol, password: &[u8]) -> Result<Self> {
        check_password("auth", password, MAX_AUTH_PASSWORD_LEN)?;
        self.auth = Some(MasterKey::from_password(protocol, password));
        // the privacy master key depends on the auth digest
        self.privacy = None;
        Ok(self)
    }

    /// Add privacy. Authentication must be configured first.
    pub fn with_privacy(mut self, protocol: PrivProtocol, password: &[u8]) -> Result<Self> {
        let Some(auth) = &self.auth else {
            return Err(Error::config("privacy requires authentication"));
        };
        check_password("priv", password, MAX_PRIV_PASSWORD_LEN)?;
        let master = MasterKey::from_password(auth.protocol(), password);
        self.privacy = Some((protocol, master));
        Ok(self)
    }

    /// Start the salt counter at a fixed value, for reproducible ciphertext.
    #[cfg(any(test, feature = "testing"))]
    pub fn with_salt(mut self, value: u64) -> Self {
        self.salt = SaltCounter::from_value(value);
        self
    }

    pub fn model(&self) -> SecurityModel {
        self.model
    }

    pub fn user_name(&self) -> &Bytes {
        &self.user_name
    }

    pub fn auth_protocol(&self) -> Option<AuthProtocol> {
        self.auth.as_ref().map(MasterKey::protocol)
    }

    pub fn priv_protocol(&self) -> Option<PrivProtocol> {
        self.privacy.as_ref().map(|(protocol, _)| *protocol)
    }

    pub fn level(&self) -> SecurityLevel {
        match (&self.auth, &self.privacy) {
            (Some(_), Some(_)) => SecurityLevel::AuthPriv,
            (Some(_), None) => SecurityLevel::AuthNoPriv,
            _ => SecurityLevel::NoAuthNoPriv,
        }
    }

    /// Next privacy salt; unique per credential.
    pub fn next_salt(&self) -> u64 {
        self.salt.next()
    }

    /// Bind the master keys to `engine_id`.
    pub fn localize(&self, engine_id: &[u8]) -> LocalizedKeys {
        let auth = self.auth.as_ref().map(|master| master.localize(engine_id));
        let privacy = self.privacy.as_ref().map(|(protocol, master)| {
            PrivKey::from_localized(&master.localize(engine_id), *protocol)
        });
        LocalizedKeys { auth, privacy }
    }
}

impl std::fmt::Display for SecurityParameters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "securityModel='{}' and secname='{}' and auth='",
            self.model,
            String::from_utf8_lossy(&self.user_name)
        )?;
        match self.auth_protocol() {
            Some(p) => write!(f, "{}", p)?,
            None => f.write_str("none")?,
        }
        f.write_str("' and priv='")?;
        match self.priv_protocol() {
            Some(p) => write!(f, "{}", p)?,
            None => f.write_str("none")?,
        }
        f.write_str("'")
    }
}

fn check_password(what: &'static str, password: &[u8], max: usize) -> Result<()> {
    if password.is_empty() {
        return Err(Error::config(format!("{} password is empty", what)));
    }
    if password.len() > max {
        let field = if what == "auth" { "auth key" } else { "priv key" };
        return Err(Error::field_too_large(field, password.len(), max));
    }
    Ok(())
}

/// Keys localized to one engine.
#[derive(Debug, Default)]
pub struct LocalizedKeys {
    pub auth: Option<LocalizedKey>,
    pub privacy: Option<PrivKey>,
}
