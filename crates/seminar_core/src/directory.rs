//! crates/seminar_core/src/directory.rs
//!
//! Lecturer accounts and login sessions.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::{AuthSession, Lecturer, NewLecturer, SessionUser};
use crate::error::{ServiceError, ServiceResult};
use crate::keys;
use crate::ports::{find_json, set_json, CredentialHasher, KeyValueStore};

const SESSION_DAYS: i64 = 30;
const INVALID_CREDENTIALS: &str = "Invalid email or password.";

fn invalid_credentials() -> ServiceError {
    ServiceError::Unauthorized(INVALID_CREDENTIALS.to_string())
}

#[derive(Clone)]
pub struct AccountDirectory {
    store: Arc<dyn KeyValueStore>,
    hasher: Arc<dyn CredentialHasher>,
}

impl AccountDirectory {
    pub fn new(store: Arc<dyn KeyValueStore>, hasher: Arc<dyn CredentialHasher>) -> Self {
        Self { store, hasher }
    }

    /// Creates a lecturer account and opens a session for it.
    pub async fn signup(&self, new: NewLecturer) -> ServiceResult<AuthSession> {
        let email = keys::normalize_email(&new.email);
        let name = new.name.trim().to_string();
        if email.is_empty() || name.is_empty() || new.password.is_empty() {
            return Err(ServiceError::Validation(
                "Email, name and password are required".to_string(),
            ));
        }

        let key = keys::lecturer(&email);
        if find_json::<Lecturer>(self.store.as_ref(), &key).await?.is_some() {
            return Err(ServiceError::Conflict(
                "An account with this email already exists. Please login.".to_string(),
            ));
        }

        let lecturer = Lecturer {
            email: email.clone(),
            name: name.clone(),
            designation: new.designation.trim().to_string(),
            department: new.department.trim().to_string(),
            password: self.hasher.hash(&new.password)?,
            created_at: Utc::now(),
        };
        set_json(self.store.as_ref(), &key, &lecturer).await?;
        info!("Created lecturer account {}", email);

        self.open_session(SessionUser { email, name }).await
    }

    /// Missing accounts and wrong passwords are indistinguishable to the caller.
    pub async fn login(&self, email: &str, password: &str) -> ServiceResult<AuthSession> {
        let email = keys::normalize_email(email);
        let key = keys::lecturer(&email);
        let lecturer = match find_json::<Lecturer>(self.store.as_ref(), &key).await {
            Ok(Some(lecturer)) => lecturer,
            Ok(None) => return Err(invalid_credentials()),
            Err(e) => {
                warn!("Failed to read lecturer {}: {}", email, e);
                return Err(invalid_credentials());
            }
        };

        let valid = self.hasher.verify(password, &lecturer.password).map_err(|e| {
            warn!("Unreadable credential for {}: {}", email, e);
            invalid_credentials()
        })?;
        if !valid {
            return Err(invalid_credentials());
        }

        self.open_session(SessionUser {
            email,
            name: lecturer.name,
        })
        .await
    }

    /// Removes the session record only. Logging out twice is not an error.
    pub async fn logout(&self, token: &str) -> ServiceResult<()> {
        self.store.delete(&keys::session(token)).await?;
        Ok(())
    }

    pub async fn resolve_session(&self, token: &str) -> ServiceResult<SessionUser> {
        let session = find_json::<AuthSession>(self.store.as_ref(), &keys::session(token))
            .await?
            .ok_or_else(|| ServiceError::Unauthorized("No active session".to_string()))?;

        if session.expires_at <= Utc::now() {
            if let Err(e) = self.store.delete(&keys::session(token)).await {
                warn!("Failed to drop expired session: {}", e);
            }
            return Err(ServiceError::Unauthorized("Session expired".to_string()));
        }
        Ok(session.user)
    }

    pub async fn profile(&self, email: &str) -> ServiceResult<Lecturer> {
        find_json(self.store.as_ref(), &keys::lecturer(&keys::normalize_email(email)))
            .await?
            .ok_or_else(|| ServiceError::NotFound("Lecturer not found".to_string()))
    }

    async fn open_session(&self, user: SessionUser) -> ServiceResult<AuthSession> {
        let session = AuthSession {
            token: Uuid::new_v4().to_string(),
            user,
            expires_at: Utc::now() + Duration::days(SESSION_DAYS),
        };
        set_json(self.store.as_ref(), &keys::session(&session.token), &session).await?;
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use crate::ports::{PortError, PortResult};

    /// Reversible stand-in so tests do not pay for a real KDF.
    struct PlainHasher;

    impl CredentialHasher for PlainHasher {
        fn hash(&self, password: &str) -> PortResult<String> {
            Ok(format!("plain${}", password))
        }

        fn verify(&self, password: &str, stored_hash: &str) -> PortResult<bool> {
            let stored = stored_hash
                .strip_prefix("plain$")
                .ok_or_else(|| PortError::Unexpected("not a plain hash".to_string()))?;
            Ok(stored == password)
        }
    }

    fn directory() -> (AccountDirectory, MemoryStore) {
        let store = MemoryStore::new();
        let dir = AccountDirectory::new(Arc::new(store.clone()), Arc::new(PlainHasher));
        (dir, store)
    }

    fn ada() -> NewLecturer {
        NewLecturer {
            email: " Ada@Uni.edu ".to_string(),
            name: "Ada".to_string(),
            designation: "Professor".to_string(),
            department: "CSE".to_string(),
            password: "secret".to_string(),
        }
    }

    #[tokio::test]
    async fn test_signup_stores_hashed_record_and_session() {
        let (dir, store) = directory();
        let session = dir.signup(ada()).await.unwrap();
        assert_eq!(session.user.email, "ada@uni.edu");

        let stored = store.get("lecturer:ada@uni.edu").await.unwrap();
        assert!(!stored.value.contains("\"password\":\"secret\""));

        let user = dir.resolve_session(&session.token).await.unwrap();
        assert_eq!(user.name, "Ada");
    }

    #[tokio::test]
    async fn test_signup_rejects_duplicate_email() {
        let (dir, _) = directory();
        dir.signup(ada()).await.unwrap();
        let err = dir.signup(ada()).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_login_errors_are_indistinguishable() {
        let (dir, _) = directory();
        dir.signup(ada()).await.unwrap();

        let wrong_password = dir.login("ada@uni.edu", "nope").await.unwrap_err();
        let unknown = dir.login("bob@uni.edu", "secret").await.unwrap_err();
        assert_eq!(wrong_password.to_string(), INVALID_CREDENTIALS);
        assert_eq!(unknown.to_string(), INVALID_CREDENTIALS);

        let session = dir.login("ADA@uni.edu", "secret").await.unwrap();
        assert_eq!(session.user.name, "Ada");
    }

    #[tokio::test]
    async fn test_logout_removes_session_only() {
        let (dir, store) = directory();
        let session = dir.signup(ada()).await.unwrap();

        dir.logout(&session.token).await.unwrap();
        dir.logout(&session.token).await.unwrap();

        assert!(dir.resolve_session(&session.token).await.is_err());
        assert!(store.get("lecturer:ada@uni.edu").await.is_ok());
    }

    #[tokio::test]
    async fn test_expired_session_is_rejected() {
        let (dir, store) = directory();
        let expired = AuthSession {
            token: "old".to_string(),
            user: SessionUser {
                email: "ada@uni.edu".to_string(),
                name: "Ada".to_string(),
            },
            expires_at: Utc::now() - Duration::minutes(1),
        };
        set_json(&store, &keys::session("old"), &expired).await.unwrap();

        let err = dir.resolve_session("old").await.unwrap_err();
        assert!(matches!(err, ServiceError::Unauthorized(_)));
        assert!(store.get("session:old").await.is_err());
    }
}
