//! Account registration, login and admin seeding.

use jobboard_models::{Role, User};
use jobboard_store::{DocumentStore, StoreError, UserRepository};
use serde::Deserialize;
use tracing::{info, warn};

use crate::auth::{hash_password, verify_password};
use crate::error::{ApiError, ApiResult};
use crate::metrics;
use crate::security::{is_valid_email, normalize_email, sanitize_name, MAX_PASSWORD_LENGTH};

const DUPLICATE_EMAIL: &str = "Email already existed";

/// Register and login payload. A `role` field, if sent, is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl Credentials {
    /// Normalized email and raw password, if both are non-empty.
    fn required(&self) -> Option<(String, &str)> {
        let email = normalize_email(self.email.as_deref()?);
        let password = self.password.as_deref().filter(|p| !p.is_empty())?;
        (!email.is_empty()).then_some((email, password))
    }
}

/// Result of [`UserService::seed_admin`].
#[derive(Debug)]
pub enum SeedOutcome {
    Created(User),
    AlreadyExists(User),
}

#[derive(Debug, Clone)]
pub struct UserService {
    users: UserRepository,
}

impl UserService {
    pub fn new(store: DocumentStore) -> Self {
        Self {
            users: UserRepository::new(store),
        }
    }

    /// Create a `user`-role account.
    pub async fn register(&self, credentials: Credentials) -> ApiResult<User> {
        let result = self.register_inner(credentials).await;
        metrics::record_auth_event("register", if result.is_ok() { "success" } else { "rejected" });
        result
    }

    async fn register_inner(&self, credentials: Credentials) -> ApiResult<User> {
        let (email, password) = credentials
            .required()
            .ok_or_else(|| ApiError::bad_request("Email or Password is required"))?;
        if !is_valid_email(&email) {
            return Err(ApiError::bad_request("Invalid email address"));
        }
        if password.len() > MAX_PASSWORD_LENGTH {
            return Err(ApiError::bad_request("Password is too long"));
        }

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(ApiError::bad_request(DUPLICATE_EMAIL));
        }

        let name = credentials.name.as_deref().and_then(sanitize_name);
        let hash = hash_password(password.to_string()).await?;
        let user = User::new(name, email, hash, Role::User);
        self.create(&user).await?;

        info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    /// Check credentials and return the matching account.
    pub async fn login(&self, credentials: Credentials) -> ApiResult<User> {
        let result = self.login_inner(credentials).await;
        metrics::record_auth_event("login", if result.is_ok() { "success" } else { "failure" });
        result
    }

    async fn login_inner(&self, credentials: Credentials) -> ApiResult<User> {
        let (email, password) = credentials
            .required()
            .ok_or_else(|| ApiError::bad_request("email or password is required"))?;

        let user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or_else(|| ApiError::bad_request("User not found"))?;

        if !verify_password(password.to_string(), user.password.clone()).await? {
            warn!(user_id = %user.id, "Login rejected: wrong password");
            return Err(ApiError::bad_request("password is wrong"));
        }

        info!(user_id = %user.id, role = %user.role, "User authenticated");
        Ok(user)
    }

    /// Create an admin account unless the email is already taken.
    pub async fn seed_admin(&self, name: &str, email: &str, password: &str) -> ApiResult<SeedOutcome> {
        let email = normalize_email(email);
        if !is_valid_email(&email) {
            return Err(ApiError::bad_request("Invalid email address"));
        }
        if password.is_empty() {
            return Err(ApiError::bad_request("Email or Password is required"));
        }

        if let Some(existing) = self.users.find_by_email(&email).await? {
            return Ok(SeedOutcome::AlreadyExists(existing));
        }

        let hash = hash_password(password.to_string()).await?;
        let admin = User::new(sanitize_name(name), email, hash, Role::Admin);
        match self.users.create(&admin).await {
            Ok(()) => {}
            Err(StoreError::AlreadyExists(_)) => {
                let existing = self
                    .users
                    .find_by_email(&admin.email)
                    .await?
                    .ok_or_else(|| ApiError::internal("Admin email taken but not readable"))?;
                return Ok(SeedOutcome::AlreadyExists(existing));
            }
            Err(e) => return Err(e.into()),
        }

        info!(user_id = %admin.id, email = %admin.email, "Admin user created");
        Ok(SeedOutcome::Created(admin))
    }

    async fn create(&self, user: &User) -> ApiResult<()> {
        match self.users.create(user).await {
            Ok(()) => Ok(()),
            // Another registration inserted the same email first.
            Err(StoreError::AlreadyExists(_)) => Err(ApiError::bad_request(DUPLICATE_EMAIL)),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials(email: &str, password: &str) -> Credentials {
        Credentials {
            name: Some("Jane".into()),
            email: Some(email.into()),
            password: Some(password.into()),
        }
    }

    fn message(err: ApiError) -> String {
        err.to_string()
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let service = UserService::new(DocumentStore::memory());
        let user = service
            .register(credentials(" Jane@Example.com ", "secret"))
            .await
            .unwrap();
        assert_eq!(user.email, "jane@example.com");
        assert_eq!(user.role, Role::User);
        assert_ne!(user.password, "secret");

        let logged_in = service
            .login(credentials("JANE@example.com", "secret"))
            .await
            .unwrap();
        assert_eq!(logged_in.id, user.id);
    }

    #[tokio::test]
    async fn test_register_rejections() {
        let service = UserService::new(DocumentStore::memory());
        let err = service.register(credentials("jane@example.com", "")).await.unwrap_err();
        assert_eq!(message(err), "Email or Password is required");

        let err = service.register(Credentials::default()).await.unwrap_err();
        assert_eq!(message(err), "Email or Password is required");

        let err = service.register(credentials("not-an-email", "pw")).await.unwrap_err();
        assert_eq!(message(err), "Invalid email address");

        service.register(credentials("jane@example.com", "pw")).await.unwrap();
        let err = service.register(credentials("JANE@example.com", "pw")).await.unwrap_err();
        assert_eq!(message(err), "Email already existed");
    }

    #[tokio::test]
    async fn test_login_rejections() {
        let service = UserService::new(DocumentStore::memory());
        service.register(credentials("jane@example.com", "pw")).await.unwrap();

        let err = service.login(credentials("jane@example.com", "")).await.unwrap_err();
        assert_eq!(message(err), "email or password is required");

        let err = service.login(credentials("nobody@example.com", "pw")).await.unwrap_err();
        assert_eq!(message(err), "User not found");

        let err = service.login(credentials("jane@example.com", "nope")).await.unwrap_err();
        assert_eq!(message(err), "password is wrong");
    }

    #[tokio::test]
    async fn test_seed_admin_is_idempotent() {
        let service = UserService::new(DocumentStore::memory());
        let first = service
            .seed_admin("Admin User", "admin@test.com", "admin123")
            .await
            .unwrap();
        let SeedOutcome::Created(admin) = first else {
            panic!("expected a new admin");
        };
        assert_eq!(admin.role, Role::Admin);
        assert_eq!(admin.name.as_deref(), Some("Admin User"));

        let second = service
            .seed_admin("Someone Else", "admin@test.com", "other")
            .await
            .unwrap();
        assert!(matches!(second, SeedOutcome::AlreadyExists(existing) if existing.id == admin.id));

        let user = service.login(credentials("admin@test.com", "admin123")).await.unwrap();
        assert!(user.role.is_admin());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_register_creates_one_account() {
        let service = UserService::new(DocumentStore::memory());
        let (a, b) = tokio::join!(
            service.register(credentials("dup@example.com", "pw")),
            service.register(credentials("DUP@example.com", "pw")),
        );

        assert_eq!(a.is_ok() as u8 + b.is_ok() as u8, 1);
        let err = a.err().or(b.err()).unwrap();
        assert_eq!(message(err), "Email already existed");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_seed_admin_reports_existing() {
        let service = UserService::new(DocumentStore::memory());
        let (a, b) = tokio::join!(
            service.seed_admin("Admin User", "admin@test.com", "admin123"),
            service.seed_admin("Admin User", "admin@test.com", "admin123"),
        );

        let outcomes = [a.unwrap(), b.unwrap()];
        let created: Vec<_> = outcomes
            .iter()
            .filter_map(|o| match o {
                SeedOutcome::Created(user) => Some(user.id.clone()),
                SeedOutcome::AlreadyExists(_) => None,
            })
            .collect();
        assert_eq!(created.len(), 1);
        for outcome in &outcomes {
            if let SeedOutcome::AlreadyExists(existing) = outcome {
                assert_eq!(existing.id, created[0]);
            }
        }
    }
}
