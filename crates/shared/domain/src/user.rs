//! User domain entity and related types.

use chrono::{DateTime, Duration, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

/// Store-assigned user identifier.
pub type UserId = i32;

/// User domain entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    /// Output of the credential hasher, never the plaintext
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Timestamp to store on the next successful update.
    ///
    /// Always strictly after the current `updated_at`, even when the clock
    /// has not moved since the last write. Microsecond precision, matching
    /// what the store keeps.
    pub fn next_updated_at(&self) -> DateTime<Utc> {
        let now = Utc::now().trunc_subsecs(6);
        if now > self.updated_at {
            now
        } else {
            self.updated_at + Duration::microseconds(1)
        }
    }
}

/// User creation data transfer object
///
/// Carries the plaintext credential; the repository hashes it before
/// anything reaches the store.
#[derive(Clone, Deserialize)]
pub struct CreateUser {
    /// User email address
    pub email: String,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Plaintext password
    pub password: String,
    /// Whether the account starts active
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

// Don't expose the plaintext in debug output
impl std::fmt::Debug for CreateUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreateUser")
            .field("email", &self.email)
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("password", &"[REDACTED]")
            .field("active", &self.active)
            .finish()
    }
}

/// User response (safe to return to client)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: UserId,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            active: user.active,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            active: user.active,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        let now = Utc::now();
        User {
            id: 7,
            email: "a@x.com".to_string(),
            first_name: "A".to_string(),
            last_name: "Zed".to_string(),
            password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".to_string(),
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_password_hash_never_serialized() {
        let json = serde_json::to_value(sample_user()).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["last_name"], "Zed");
    }

    #[test]
    fn test_next_updated_at_is_strictly_later() {
        let mut user = sample_user();
        // Pretend the previous write happened in the future relative to our clock
        user.updated_at = Utc::now() + Duration::seconds(60);

        let next = user.next_updated_at();
        assert!(next > user.updated_at);
        assert_eq!(next, user.updated_at + Duration::microseconds(1));
    }

    #[test]
    fn test_next_updated_at_uses_clock_when_it_advanced() {
        let mut user = sample_user();
        user.updated_at = Utc::now() - Duration::seconds(60);

        assert!(user.next_updated_at() > user.updated_at);
    }

    #[test]
    fn test_create_user_debug_redacts_password() {
        let candidate = CreateUser {
            email: "a@x.com".to_string(),
            first_name: "A".to_string(),
            last_name: "Zed".to_string(),
            password: "secret123".to_string(),
            active: true,
        };

        let debug = format!("{:?}", candidate);
        assert!(!debug.contains("secret123"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn test_create_user_active_defaults_to_true() {
        let candidate: CreateUser = serde_json::from_str(
            r#"{"email":"a@x.com","first_name":"A","last_name":"Zed","password":"secret123"}"#,
        )
        .unwrap();
        assert!(candidate.active);
    }

    #[test]
    fn test_user_response_drops_credential() {
        let user = sample_user();
        let response = UserResponse::from(&user);
        assert_eq!(response.id, user.id);
        assert_eq!(response.email, user.email);
    }
}
