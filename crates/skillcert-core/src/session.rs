//! Session persistence and auth operations.
//!
//! Stores the bearer token and the display-language preference in
//! `<base>/session.json` with restricted permissions (0600).
//! Tokens are never logged or displayed in full.

use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::api::{
    ApiClient, ApiError, ApiErrorKind, AuthResponse, GoogleLoginRequest, Language, LoginRequest,
    SignupRequest, User,
};
use crate::config::paths;

/// Minimum accepted password length at signup.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Profession assigned when a Google sign-in does not name one.
pub const DEFAULT_ROLE: &str = "Cleaner";

/// An authenticated user for the lifetime of the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub user: User,
}

impl Session {
    pub fn is_admin(&self) -> bool {
        self.user.is_admin
    }
}

/// On-disk shape of `session.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSession {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default)]
    pub language: Language,
}

/// Local form checks that run before any network call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormError {
    MissingFields,
    PasswordTooShort,
    PasswordMismatch,
    MissingCredentials,
    MissingGoogleIdentity,
}

impl fmt::Display for FormError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            FormError::MissingFields => "All fields are required",
            FormError::PasswordTooShort => "Password must be at least 6 characters",
            FormError::PasswordMismatch => "Passwords do not match",
            FormError::MissingCredentials => "Email and password are required",
            FormError::MissingGoogleIdentity => "Email and name are required",
        };
        f.write_str(message)
    }
}

impl std::error::Error for FormError {}

#[derive(Debug, Clone, Default)]
pub struct SignupForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub role: String,
}

impl SignupForm {
    /// Validates the form and builds the request body.
    ///
    /// # Errors
    /// Returns the first failing [`FormError`].
    pub fn validate(&self) -> Result<SignupRequest, FormError> {
        if [&self.name, &self.email, &self.password, &self.role]
            .iter()
            .any(|field| field.trim().is_empty())
        {
            return Err(FormError::MissingFields);
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(FormError::PasswordTooShort);
        }
        if self.password != self.confirm_password {
            return Err(FormError::PasswordMismatch);
        }
        Ok(SignupRequest {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            password: self.password.clone(),
            role: self.role.trim().to_string(),
        })
    }
}

/// Validates login input and builds the request body.
///
/// # Errors
/// Returns [`FormError::MissingCredentials`] when either field is blank.
pub fn login_request(email: &str, password: &str) -> Result<LoginRequest, FormError> {
    if email.trim().is_empty() || password.is_empty() {
        return Err(FormError::MissingCredentials);
    }
    Ok(LoginRequest {
        email: email.trim().to_string(),
        password: password.to_string(),
    })
}

/// Validates simulated Google sign-in input and builds the request body.
///
/// # Errors
/// Returns [`FormError::MissingGoogleIdentity`] when email or name is blank.
pub fn google_login_request(
    email: &str,
    name: &str,
    role: Option<&str>,
) -> Result<GoogleLoginRequest, FormError> {
    if email.trim().is_empty() || name.trim().is_empty() {
        return Err(FormError::MissingGoogleIdentity);
    }
    let role = role
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .unwrap_or(DEFAULT_ROLE);
    Ok(GoogleLoginRequest {
        email: email.trim().to_string(),
        name: name.trim().to_string(),
        role: role.to_string(),
    })
}

/// Masks a token for display (first 6 characters only).
pub fn mask_token(token: &str) -> String {
    let prefix: String = token.chars().take(6).collect();
    format!("{prefix}…")
}

/// Persistent session state plus the auth operations that change it.
#[derive(Debug)]
pub struct SessionStore {
    path: PathBuf,
    stored: StoredSession,
}

impl SessionStore {
    /// Opens the store at the default location.
    ///
    /// # Errors
    /// Returns an error if an existing session file cannot be read or parsed.
    pub fn open() -> Result<Self> {
        Self::open_at(paths::session_path())
    }

    /// Opens the store at a specific path.
    /// A missing file yields an empty session.
    ///
    /// # Errors
    /// Returns an error if an existing session file cannot be read or parsed.
    pub fn open_at(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let stored = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read session from {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse session from {}", path.display()))?
        } else {
            StoredSession::default()
        };
        Ok(Self { path, stored })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn token(&self) -> Option<&str> {
        self.stored.token.as_deref()
    }

    pub fn language(&self) -> Language {
        self.stored.language
    }

    /// Persists the display-language preference.
    ///
    /// # Errors
    /// Returns an error if the session file cannot be written.
    pub fn set_language(&mut self, language: Language) -> Result<()> {
        self.stored.language = language;
        self.save()
    }

    /// Restores the session from the stored token.
    ///
    /// Returns `Ok(None)` when there is no token, or when the server rejects
    /// it (the token is then dropped from storage). Transport failures are
    /// returned as errors and leave the token in place.
    ///
    /// # Errors
    /// Returns an error on non-auth API failures or storage failures.
    pub async fn rehydrate(&mut self, api: &mut ApiClient) -> Result<Option<Session>> {
        let Some(token) = self.stored.token.clone() else {
            api.set_token(None);
            return Ok(None);
        };

        api.set_token(Some(token.clone()));
        match api.me().await {
            Ok(user) => {
                tracing::debug!(user_id = user.id, "session restored");
                Ok(Some(Session { token, user }))
            }
            Err(err) if rejects_token(&err) => {
                tracing::warn!(kind = %err.kind, "stored token rejected; signing out");
                api.set_token(None);
                self.clear_token()?;
                Ok(None)
            }
            Err(err) => Err(err).context("restore session"),
        }
    }

    /// Registers a new account and persists its token.
    ///
    /// # Errors
    /// Returns a [`FormError`] (no request made), an [`ApiError`], or a storage error.
    pub async fn signup(&mut self, api: &mut ApiClient, form: &SignupForm) -> Result<Session> {
        let request = form.validate()?;
        let response = api.signup(&request).await?;
        self.establish(api, response)
    }

    /// Signs in with email and password and persists the token.
    ///
    /// # Errors
    /// Returns a [`FormError`] (no request made), an [`ApiError`], or a storage error.
    pub async fn login(
        &mut self,
        api: &mut ApiClient,
        email: &str,
        password: &str,
    ) -> Result<Session> {
        let request = login_request(email, password)?;
        let response = api.login(&request).await?;
        self.establish(api, response)
    }

    /// Simulated Google sign-in: the portal finds or creates the account by email.
    ///
    /// # Errors
    /// Returns a [`FormError`] (no request made), an [`ApiError`], or a storage error.
    pub async fn google_login(
        &mut self,
        api: &mut ApiClient,
        email: &str,
        name: &str,
        role: Option<&str>,
    ) -> Result<Session> {
        let request = google_login_request(email, name, role)?;
        let response = api.google_login(&request).await?;
        self.establish(api, response)
    }

    /// Drops the token locally. Returns whether a token was stored.
    ///
    /// # Errors
    /// Returns an error if the session file cannot be written.
    pub fn logout(&mut self, api: &mut ApiClient) -> Result<bool> {
        api.set_token(None);
        self.clear_token()
    }

    fn establish(&mut self, api: &mut ApiClient, response: AuthResponse) -> Result<Session> {
        let AuthResponse { user, access_token } = response;
        api.set_token(Some(access_token.clone()));
        self.stored.token = Some(access_token.clone());
        self.save()?;
        tracing::info!(user_id = user.id, "signed in");
        Ok(Session {
            token: access_token,
            user,
        })
    }

    fn clear_token(&mut self) -> Result<bool> {
        let had_token = self.stored.token.take().is_some();
        if had_token {
            self.save()?;
        }
        Ok(had_token)
    }

    /// Saves the session file with restricted permissions (0600).
    fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let contents =
            serde_json::to_string_pretty(&self.stored).context("Failed to serialize session")?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .mode(0o600)
                .open(&self.path)
                .with_context(|| format!("Failed to open {} for writing", self.path.display()))?;
            file.write_all(contents.as_bytes())
                .with_context(|| format!("Failed to write to {}", self.path.display()))?;
        }

        #[cfg(not(unix))]
        {
            fs::write(&self.path, contents)
                .with_context(|| format!("Failed to write to {}", self.path.display()))?;
        }

        Ok(())
    }
}

/// Flask-JWT answers 401 for expired/missing tokens and 422 for malformed
/// ones; a 404 from `/auth/me` means the account no longer exists.
fn rejects_token(err: &ApiError) -> bool {
    err.is_auth_failure()
        || (err.kind == ApiErrorKind::Rejected && matches!(err.status, Some(404 | 422)))
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn user_json() -> serde_json::Value {
        serde_json::json!({
            "id": 7, "name": "Amina", "email": "amina@example.com",
            "role": "Electrician", "is_admin": false
        })
    }

    fn valid_form() -> SignupForm {
        SignupForm {
            name: "Amina".to_string(),
            email: "amina@example.com".to_string(),
            password: "secret1".to_string(),
            confirm_password: "secret1".to_string(),
            role: "Electrician".to_string(),
        }
    }

    #[test]
    fn test_signup_form_checks_in_order() {
        let mut form = valid_form();
        form.role = "  ".to_string();
        assert_eq!(form.validate().unwrap_err(), FormError::MissingFields);

        let mut form = valid_form();
        form.password = "abc".to_string();
        form.confirm_password = "abc".to_string();
        assert_eq!(form.validate().unwrap_err(), FormError::PasswordTooShort);

        let mut form = valid_form();
        form.confirm_password = "secret2".to_string();
        assert_eq!(form.validate().unwrap_err(), FormError::PasswordMismatch);

        assert_eq!(valid_form().validate().unwrap().role, "Electrician");
    }

    #[test]
    fn test_login_and_google_requests() {
        assert_eq!(
            login_request("", "pw").unwrap_err(),
            FormError::MissingCredentials
        );
        assert_eq!(
            google_login_request("a@b.c", " ", None).unwrap_err(),
            FormError::MissingGoogleIdentity
        );
        assert_eq!(
            google_login_request("a@b.c", "A", None).unwrap().role,
            DEFAULT_ROLE
        );
    }

    #[test]
    fn test_mask_token() {
        assert_eq!(mask_token("eyJhbGciOiJIUzI1NiJ9.payload"), "eyJhbG…");
    }

    #[test]
    fn test_open_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let store = SessionStore::open_at(dir.path().join("session.json")).unwrap();
        assert!(store.token().is_none());
        assert_eq!(store.language(), Language::En);
    }

    #[cfg(unix)]
    #[test]
    fn test_language_persists_with_restricted_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");
        let mut store = SessionStore::open_at(&path).unwrap();
        store.set_language(Language::Ur).unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);

        let reopened = SessionStore::open_at(&path).unwrap();
        assert_eq!(reopened.language(), Language::Ur);
    }

    #[tokio::test]
    async fn test_signup_validation_failure_makes_no_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/signup"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&server)
            .await;

        let dir = tempdir().unwrap();
        let mut store = SessionStore::open_at(dir.path().join("session.json")).unwrap();
        let mut api = ApiClient::new(format!("{}/api", server.uri()));
        let mut form = valid_form();
        form.confirm_password = "different".to_string();

        let err = store.signup(&mut api, &form).await.unwrap_err();
        assert_eq!(
            err.downcast_ref::<FormError>(),
            Some(&FormError::PasswordMismatch)
        );
        assert!(store.token().is_none());
    }

    #[tokio::test]
    async fn test_login_persists_token_and_logout_keeps_language() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "message": "Login successful", "user": user_json(), "access_token": "tok-abc"
            })))
            .mount(&server)
            .await;

        let dir = tempdir().unwrap();
        let session_path = dir.path().join("session.json");
        let mut store = SessionStore::open_at(&session_path).unwrap();
        store.set_language(Language::Ur).unwrap();
        let mut api = ApiClient::new(format!("{}/api", server.uri()));

        let session = store
            .login(&mut api, "amina@example.com", "secret1")
            .await
            .unwrap();
        assert_eq!(session.user.id, 7);
        assert_eq!(api.token(), Some("tok-abc"));
        assert_eq!(
            SessionStore::open_at(&session_path).unwrap().token(),
            Some("tok-abc")
        );

        assert!(store.logout(&mut api).unwrap());
        assert!(api.token().is_none());
        let reopened = SessionStore::open_at(&session_path).unwrap();
        assert!(reopened.token().is_none());
        assert_eq!(reopened.language(), Language::Ur);
    }

    #[tokio::test]
    async fn test_login_bad_credentials_surfaces_server_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_json(serde_json::json!({"error": "Invalid email or password"})),
            )
            .mount(&server)
            .await;

        let dir = tempdir().unwrap();
        let mut store = SessionStore::open_at(dir.path().join("session.json")).unwrap();
        let mut api = ApiClient::new(format!("{}/api", server.uri()));

        let err = store.login(&mut api, "a@b.c", "nope").await.unwrap_err();
        let api_err = err.downcast_ref::<ApiError>().unwrap();
        assert!(api_err.is_auth_failure());
        assert_eq!(api_err.message, "Invalid email or password");
        assert!(store.token().is_none());
    }

    #[tokio::test]
    async fn test_rehydrate_restores_user() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/auth/me"))
            .and(header("authorization", "Bearer tok-abc"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"user": user_json()})),
            )
            .mount(&server)
            .await;

        let dir = tempdir().unwrap();
        let session_path = dir.path().join("session.json");
        fs::write(&session_path, r#"{"token": "tok-abc", "language": "en"}"#).unwrap();

        let mut store = SessionStore::open_at(&session_path).unwrap();
        let mut api = ApiClient::new(format!("{}/api", server.uri()));
        let session = store.rehydrate(&mut api).await.unwrap().unwrap();
        assert_eq!(session.user.email, "amina@example.com");
        assert!(!session.is_admin());
    }

    #[tokio::test]
    async fn test_rehydrate_drops_rejected_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/auth/me"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_json(serde_json::json!({"msg": "Token has expired"})),
            )
            .mount(&server)
            .await;

        let dir = tempdir().unwrap();
        let session_path = dir.path().join("session.json");
        fs::write(&session_path, r#"{"token": "stale", "language": "ur"}"#).unwrap();

        let mut store = SessionStore::open_at(&session_path).unwrap();
        let mut api = ApiClient::new(format!("{}/api", server.uri()));
        assert!(store.rehydrate(&mut api).await.unwrap().is_none());
        assert!(api.token().is_none());

        let reopened = SessionStore::open_at(&session_path).unwrap();
        assert!(reopened.token().is_none());
        assert_eq!(reopened.language(), Language::Ur);
    }

    #[tokio::test]
    async fn test_rehydrate_keeps_token_when_server_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/auth/me"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let dir = tempdir().unwrap();
        let session_path = dir.path().join("session.json");
        fs::write(&session_path, r#"{"token": "tok-abc"}"#).unwrap();

        let mut store = SessionStore::open_at(&session_path).unwrap();
        let mut api = ApiClient::new(format!("{}/api", server.uri()));
        assert!(store.rehydrate(&mut api).await.is_err());
        assert_eq!(store.token(), Some("tok-abc"));
    }
}
