//! Password checks and session cookies.
//!
//! Guests and the admin each prove knowledge of a shared password stored on
//! the event row. Passwords are compared as plaintext (in constant time).
//! A successful login yields a session cookie whose value is
//! `"{expires_unix}.{hex hmac}"`, an HMAC-SHA256 over `"{role}:{expires_unix}"`
//! keyed with a server secret. Nothing is stored server-side.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use rsvp_storage::EventStore;
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Session lifetime, matching the cookie's `Max-Age`.
pub const SESSION_TTL_SECS: i64 = 86_400;

/// Who a session or password belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Guest,
    Admin,
}

impl Role {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Guest => "guest",
            Self::Admin => "admin",
        }
    }

    /// Cookie carrying this role's session.
    #[must_use]
    pub const fn cookie_name(&self) -> &'static str {
        match self {
            Self::Guest => "guest_session",
            Self::Admin => "admin_session",
        }
    }

    /// Whether a holder of `self` may pass a gate requiring `required`.
    /// An admin passes guest gates.
    #[must_use]
    pub fn satisfies(self, required: Self) -> bool {
        self == required || self == Self::Admin
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Passwords ────────────────────────────────────────────────────────

/// Check `password` against the event's stored password for `role`.
///
/// A missing event or a storage failure counts as a mismatch, and so does
/// an empty password on either side.
pub async fn verify_password(store: &dyn EventStore, role: Role, password: &str) -> bool {
    if password.is_empty() {
        return false;
    }

    let event = match store.get_event().await {
        Ok(Some(event)) => event,
        Ok(None) => return false,
        Err(e) => {
            tracing::warn!(error = %e, %role, "password check could not load event");
            return false;
        }
    };

    let stored = match role {
        Role::Guest => &event.guest_password_hash,
        Role::Admin => &event.admin_password_hash,
    };

    if stored.is_empty() {
        tracing::warn!(%role, "event has no password set; refusing login");
        return false;
    }

    stored.as_bytes().ct_eq(password.as_bytes()).into()
}

// ── Session tokens ───────────────────────────────────────────────────

/// Issues and verifies signed session values.
#[derive(Clone)]
pub struct SessionSigner {
    key: Vec<u8>,
}

impl std::fmt::Debug for SessionSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionSigner").finish_non_exhaustive()
    }
}

impl SessionSigner {
    /// Create a signer from a configured secret.
    #[must_use]
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self { key: secret.into() }
    }

    /// Create a signer with a fresh random key. Sessions do not survive a
    /// restart.
    #[must_use]
    pub fn random() -> Self {
        // Two UUID v4s = 32 bytes of OS CSPRNG randomness.
        let mut key = Vec::with_capacity(32);
        key.extend_from_slice(uuid::Uuid::new_v4().as_bytes());
        key.extend_from_slice(uuid::Uuid::new_v4().as_bytes());
        Self { key }
    }

    fn mac(&self, role: Role, expires: i64) -> Option<HmacSha256> {
        let mut mac = HmacSha256::new_from_slice(&self.key).ok()?;
        mac.update(role.as_str().as_bytes());
        mac.update(b":");
        mac.update(expires.to_string().as_bytes());
        Some(mac)
    }

    /// Issue a session value for `role`, valid for [`SESSION_TTL_SECS`].
    #[must_use]
    pub fn issue(&self, role: Role, now: DateTime<Utc>) -> String {
        let expires = now.timestamp().saturating_add(SESSION_TTL_SECS);
        let tag = self
            .mac(role, expires)
            .map(|m| hex::encode(m.finalize().into_bytes()))
            .unwrap_or_default();
        format!("{expires}.{tag}")
    }

    /// Check a session value for `role` at time `now`.
    #[must_use]
    pub fn verify(&self, role: Role, value: &str, now: DateTime<Utc>) -> bool {
        let Some((expires, tag)) = value.split_once('.') else {
            return false;
        };
        let Ok(expires) = expires.parse::<i64>() else {
            return false;
        };
        if expires <= now.timestamp() {
            return false;
        }
        let Ok(tag) = hex::decode(tag) else {
            return false;
        };
        self.mac(role, expires)
            .is_some_and(|mac| mac.verify_slice(&tag).is_ok())
    }

    /// The strongest role proven by the cookies in a `Cookie` header.
    #[must_use]
    pub fn authenticated_role(&self, cookie_header: &str, now: DateTime<Utc>) -> Option<Role> {
        [Role::Admin, Role::Guest].into_iter().find(|role| {
            session_from_cookies(cookie_header, *role)
                .is_some_and(|value| self.verify(*role, value, now))
        })
    }
}

// ── Cookies ──────────────────────────────────────────────────────────

/// `Set-Cookie` value establishing a session.
#[must_use]
pub fn session_cookie(role: Role, value: &str) -> String {
    format!(
        "{}={value}; Path=/; HttpOnly; SameSite=Strict; Max-Age={SESSION_TTL_SECS}",
        role.cookie_name()
    )
}

/// `Set-Cookie` value removing a session.
#[must_use]
pub fn clear_session_cookie(role: Role) -> String {
    format!(
        "{}=; Path=/; HttpOnly; SameSite=Strict; Max-Age=0",
        role.cookie_name()
    )
}

/// Extract the session value for `role` from a `Cookie` header.
#[must_use]
pub fn session_from_cookies(cookie_header: &str, role: Role) -> Option<&str> {
    cookie_header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == role.cookie_name())
        .map(|(_, value)| value)
        .filter(|value| !value.is_empty())
}
