use std::sync::Arc;

use auth::Claims;
use auth::PasswordHasher;
use auth::TokenCodec;
use chrono::Duration;

use crate::domain::auth::errors::AuthError;
use crate::domain::user::models::User;
use crate::domain::user::models::Username;
use crate::user::errors::UserError;
use crate::user::ports::UserRepository;

/// Authentication coordinator over the user store.
///
/// Combines credential verification (Argon2) with bearer-token issuance and
/// validation (JWT). Stateless apart from the signing secret and the
/// repository handle; safe to share across concurrent requests.
pub struct AuthService<UR>
where
    UR: UserRepository,
{
    repository: Arc<UR>,
    token_codec: TokenCodec,
    token_ttl: Duration,
}

/// Result of a successful login.
#[derive(Debug)]
pub struct AuthSession {
    pub user: User,
    pub access_token: String,
}

impl<UR> AuthService<UR>
where
    UR: UserRepository,
{
    /// Create a new authentication service.
    ///
    /// # Arguments
    /// * `repository` - User persistence implementation
    /// * `secret` - Symmetric secret for token signing
    /// * `token_ttl_minutes` - Lifetime of issued tokens
    pub fn new(repository: Arc<UR>, secret: &[u8], token_ttl_minutes: i64) -> Self {
        Self {
            repository,
            token_codec: TokenCodec::new(secret),
            token_ttl: Duration::minutes(token_ttl_minutes),
        }
    }

    /// Verify a username/password pair against the user store.
    ///
    /// Every failure mode collapses into `InvalidCredentials`: an unknown
    /// username, a wrong password, and a username that would never validate
    /// are indistinguishable to the caller.
    ///
    /// # Errors
    /// * `InvalidCredentials` - The pair does not identify a user
    /// * `Database` - User store lookup failed
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<User, AuthError> {
        let Ok(username) = Username::new(username.to_string()) else {
            return Err(AuthError::InvalidCredentials);
        };

        let user = match self.repository.find_by_username(&username).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                tracing::warn!(username = %username, "Login failed");
                return Err(AuthError::InvalidCredentials);
            }
            Err(UserError::DatabaseError(e)) => return Err(AuthError::Database(e)),
            Err(e) => return Err(AuthError::Unknown(e.to_string())),
        };

        let password = password.to_string();
        let stored_hash = user.password_hash.clone();
        // Argon2 verification is CPU-bound; keep it off the async executor
        let is_valid =
            tokio::task::spawn_blocking(move || {
                PasswordHasher::new().verify(&password, &stored_hash)
            })
            .await
            .map_err(|e| AuthError::Unknown(format!("Verification task failed: {}", e)))?;

        if !is_valid {
            tracing::warn!(username = %username, "Login failed");
            return Err(AuthError::InvalidCredentials);
        }

        Ok(user)
    }

    /// Mint a bearer token for an already-verified user.
    ///
    /// # Errors
    /// * `TokenIssuance` - Token encoding failed
    pub fn issue_token(&self, user: &User) -> Result<String, AuthError> {
        let claims = Claims::with_ttl(user.username.as_str(), self.token_ttl);

        self.token_codec
            .encode(&claims)
            .map_err(|e| AuthError::TokenIssuance(e.to_string()))
    }

    /// Verify credentials and mint a token in one step.
    ///
    /// # Errors
    /// * `InvalidCredentials` - The pair does not identify a user
    /// * `TokenIssuance` - Token encoding failed
    /// * `Database` - User store lookup failed
    pub async fn login(&self, username: &str, password: &str) -> Result<AuthSession, AuthError> {
        let user = self.authenticate(username, password).await?;
        let access_token = self.issue_token(&user)?;

        tracing::info!(user_id = %user.id, username = %user.username, "User logged in");

        Ok(AuthSession { user, access_token })
    }

    /// Resolve the user a bearer token asserts.
    ///
    /// Any token defect (bad signature, expired, malformed), an unknown
    /// subject, or a deactivated account all yield `Unauthenticated`.
    ///
    /// # Errors
    /// * `Unauthenticated` - Token or subject is not acceptable
    /// * `Database` - User store lookup failed
    pub async fn current_user(&self, token: &str) -> Result<User, AuthError> {
        let claims = self.token_codec.decode(token).map_err(|e| {
            tracing::warn!("Token validation failed: {}", e);
            AuthError::Unauthenticated
        })?;

        let Ok(username) = Username::new(claims.sub) else {
            return Err(AuthError::Unauthenticated);
        };

        let user = match self.repository.find_by_username(&username).await {
            Ok(Some(user)) => user,
            Ok(None) => return Err(AuthError::Unauthenticated),
            Err(UserError::DatabaseError(e)) => return Err(AuthError::Database(e)),
            Err(e) => return Err(AuthError::Unknown(e.to_string())),
        };

        if !user.is_active {
            tracing::warn!(username = %user.username, "Token presented for inactive user");
            return Err(AuthError::Unauthenticated);
        }

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use chrono::Utc;
    use mockall::mock;

    use super::*;
    use crate::domain::user::models::EmailAddress;
    use crate::domain::user::models::UserId;

    const SECRET: &[u8] = b"test-secret-key-for-jwt-signing-at-least-32-bytes";

    mock! {
        pub TestUserRepository {}

        #[async_trait]
        impl UserRepository for TestUserRepository {
            async fn create(&self, user: User) -> Result<User, UserError>;
            async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError>;
            async fn find_by_username(&self, username: &Username) -> Result<Option<User>, UserError>;
            async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError>;
            async fn list(&self, skip: i64, limit: i64) -> Result<Vec<User>, UserError>;
            async fn update(&self, user: User) -> Result<User, UserError>;
            async fn delete(&self, id: &UserId) -> Result<(), UserError>;
        }
    }

    fn stored_user(username: &str, password: &str, is_active: bool) -> User {
        let now = Utc::now();
        User {
            id: UserId::new(),
            username: Username::new(username.to_string()).unwrap(),
            email: EmailAddress::new(format!("{}@example.com", username)).unwrap(),
            password_hash: PasswordHasher::new().hash(password).unwrap(),
            is_active,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_authenticate_success() {
        let mut repository = MockTestUserRepository::new();

        let user = stored_user("alice", "correct-pw", true);
        repository
            .expect_find_by_username()
            .withf(|u| u.as_str() == "alice")
            .times(1)
            .returning(move |_| Ok(Some(user.clone())));

        let service = AuthService::new(Arc::new(repository), SECRET, 30);

        let user = service.authenticate("alice", "correct-pw").await.unwrap();
        assert_eq!(user.username.as_str(), "alice");
    }

    #[tokio::test]
    async fn test_authenticate_wrong_password() {
        let mut repository = MockTestUserRepository::new();

        let user = stored_user("alice", "correct-pw", true);
        repository
            .expect_find_by_username()
            .times(1)
            .returning(move |_| Ok(Some(user.clone())));

        let service = AuthService::new(Arc::new(repository), SECRET, 30);

        let result = service.authenticate("alice", "wrong-pw").await;
        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_authenticate_unknown_user() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_find_by_username()
            .times(1)
            .returning(|_| Ok(None));

        let service = AuthService::new(Arc::new(repository), SECRET, 30);

        // Same outcome as a wrong password: no enumeration signal
        let result = service.authenticate("ghost", "anything").await;
        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_authenticate_malformed_username() {
        let repository = MockTestUserRepository::new();

        let service = AuthService::new(Arc::new(repository), SECRET, 30);

        // Never reaches the repository, still indistinguishable from a miss
        let result = service.authenticate("a", "anything").await;
        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_login_and_current_user_round_trip() {
        let mut repository = MockTestUserRepository::new();

        let user = stored_user("alice", "correct-pw", true);
        repository
            .expect_find_by_username()
            .times(2)
            .returning(move |_| Ok(Some(user.clone())));

        let service = AuthService::new(Arc::new(repository), SECRET, 30);

        let session = service.login("alice", "correct-pw").await.unwrap();
        assert!(!session.access_token.is_empty());

        let user = service.current_user(&session.access_token).await.unwrap();
        assert_eq!(user.username.as_str(), "alice");
    }

    #[tokio::test]
    async fn test_current_user_zero_ttl_token() {
        let mut repository = MockTestUserRepository::new();

        let user = stored_user("alice", "correct-pw", true);
        repository
            .expect_find_by_username()
            .times(1)
            .returning(move |_| Ok(Some(user.clone())));

        // A zero-lifetime token expires at issuance
        let service = AuthService::new(Arc::new(repository), SECRET, 0);

        let session = service.login("alice", "correct-pw").await.unwrap();
        let result = service.current_user(&session.access_token).await;
        assert!(matches!(result, Err(AuthError::Unauthenticated)));
    }

    #[tokio::test]
    async fn test_current_user_wrong_secret() {
        let repository = MockTestUserRepository::new();

        let service = AuthService::new(Arc::new(repository), SECRET, 30);

        let other_codec = TokenCodec::new(b"other-secret-key-at-least-32-bytes-long!!");
        let token = other_codec
            .encode(&Claims::with_ttl("alice", Duration::minutes(30)))
            .unwrap();

        let result = service.current_user(&token).await;
        assert!(matches!(result, Err(AuthError::Unauthenticated)));
    }

    #[tokio::test]
    async fn test_current_user_garbage_token() {
        let repository = MockTestUserRepository::new();

        let service = AuthService::new(Arc::new(repository), SECRET, 30);

        let result = service.current_user("not.a.token").await;
        assert!(matches!(result, Err(AuthError::Unauthenticated)));
    }

    #[tokio::test]
    async fn test_current_user_unknown_subject() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_find_by_username()
            .times(1)
            .returning(|_| Ok(None));

        let service = AuthService::new(Arc::new(repository), SECRET, 30);

        let codec = TokenCodec::new(SECRET);
        let token = codec
            .encode(&Claims::with_ttl("deleted_user", Duration::minutes(30)))
            .unwrap();

        let result = service.current_user(&token).await;
        assert!(matches!(result, Err(AuthError::Unauthenticated)));
    }

    #[tokio::test]
    async fn test_current_user_inactive() {
        let mut repository = MockTestUserRepository::new();

        let user = stored_user("alice", "correct-pw", false);
        repository
            .expect_find_by_username()
            .times(1)
            .returning(move |_| Ok(Some(user.clone())));

        let service = AuthService::new(Arc::new(repository), SECRET, 30);

        let codec = TokenCodec::new(SECRET);
        let token = codec
            .encode(&Claims::with_ttl("alice", Duration::minutes(30)))
            .unwrap();

        let result = service.current_user(&token).await;
        assert!(matches!(result, Err(AuthError::Unauthenticated)));
    }
}
