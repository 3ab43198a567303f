//! Login and logout over an `AuthBackend`, recorded in the `SessionContext`.

use thiserror::Error;

use crate::client::AuthBackend;
use crate::error::WorkflowError;
use crate::session::{SessionContext, SessionError};

#[derive(Error, Debug)]
pub enum LoginError {
    #[error(transparent)]
    Rejected(#[from] WorkflowError),

    #[error("Login succeeded but the session could not be saved: {0}")]
    Session(#[from] SessionError),
}

impl LoginError {
    pub fn user_message(&self) -> String {
        match self {
            Self::Rejected(err) => err.user_message(),
            Self::Session(err) => format!("Não foi possível salvar a sessão: {err}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// Email or password was empty; nothing was sent.
    Skipped,
    LoggedIn { email: String },
}

/// Check credentials and start the session.
///
/// On any failure the session is left logged out.
pub async fn login<B: AuthBackend>(
    backend: &B,
    session: &SessionContext,
    email: &str,
    password: &str,
    api_port: Option<u16>,
) -> Result<LoginOutcome, LoginError> {
    let email = email.trim();
    if email.is_empty() || password.is_empty() {
        return Ok(LoginOutcome::Skipped);
    }

    tracing::debug!(email, "Logging in");
    let response = match backend.login(email, password).await {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!(error = %e, "Login failed");
            if let Err(e) = session.end() {
                tracing::warn!(error = %e, "Could not clear session after failed login");
            }
            return Err(WorkflowError::from_client(&e, api_port).into());
        }
    };

    let user_email = response
        .email
        .filter(|e| !e.is_empty())
        .unwrap_or_else(|| email.to_string());
    session.begin(&user_email)?;
    tracing::info!("Logged in");
    Ok(LoginOutcome::LoggedIn { email: user_email })
}

/// End the session. Remote failures are logged and never block the local
/// teardown.
pub async fn logout<B: AuthBackend>(
    backend: &B,
    session: &SessionContext,
) -> Result<(), SessionError> {
    if let Err(e) = backend.logout().await {
        tracing::warn!(error = %e, "Server logout failed, continuing with local logout");
    }
    session.end()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{ClientError, LoginResponse};
    use std::sync::atomic::{AtomicUsize, Ordering};

    enum Reply {
        Accept(Option<&'static str>),
        Unauthorized,
        ServerError(&'static str),
        Unreachable,
    }

    struct MockAuth {
        reply: Reply,
        calls: AtomicUsize,
        logout_fails: bool,
    }

    impl MockAuth {
        fn new(reply: Reply) -> Self {
            Self {
                reply,
                calls: AtomicUsize::new(0),
                logout_fails: false,
            }
        }
    }

    impl AuthBackend for MockAuth {
        async fn login(&self, _email: &str, _password: &str) -> Result<LoginResponse, ClientError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.reply {
                Reply::Accept(email) => Ok(LoginResponse {
                    success: true,
                    email: email.map(str::to_string),
                    error: None,
                }),
                Reply::Unauthorized => Err(ClientError::Unauthorized),
                Reply::ServerError(detail) => Err(ClientError::Server {
                    status: 500,
                    detail: Some(detail.to_string()),
                }),
                Reply::Unreachable => Err(ClientError::Connection("localhost:8090".into())),
            }
        }

        async fn logout(&self) -> Result<(), ClientError> {
            if self.logout_fails {
                Err(ClientError::Connection("localhost:8090".into()))
            } else {
                Ok(())
            }
        }
    }

    #[tokio::test]
    async fn success_uses_returned_email() {
        let backend = MockAuth::new(Reply::Accept(Some("Ana@Example.org")));
        let session = SessionContext::in_memory();
        let outcome = login(&backend, &session, "ana@example.org", "secret", None)
            .await
            .unwrap();
        assert_eq!(
            outcome,
            LoginOutcome::LoggedIn {
                email: "Ana@Example.org".into()
            }
        );
        assert!(session.is_logged_in());
        assert_eq!(session.user_email().as_deref(), Some("Ana@Example.org"));
    }

    #[tokio::test]
    async fn success_without_email_falls_back_to_typed() {
        let backend = MockAuth::new(Reply::Accept(None));
        let session = SessionContext::in_memory();
        login(&backend, &session, " ana@example.org ", "secret", None)
            .await
            .unwrap();
        assert_eq!(session.user_email().as_deref(), Some("ana@example.org"));
    }

    #[tokio::test]
    async fn empty_credentials_are_a_no_op() {
        let backend = MockAuth::new(Reply::Accept(None));
        let session = SessionContext::in_memory();
        assert_eq!(
            login(&backend, &session, "", "secret", None).await.unwrap(),
            LoginOutcome::Skipped
        );
        assert_eq!(
            login(&backend, &session, "ana@example.org", "", None).await.unwrap(),
            LoginOutcome::Skipped
        );
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
        assert!(!session.is_logged_in());
    }

    #[tokio::test]
    async fn unauthorized_leaves_session_logged_out() {
        let backend = MockAuth::new(Reply::Unauthorized);
        let session = SessionContext::in_memory();
        session.begin("old@example.org").unwrap();

        let err = login(&backend, &session, "ana@example.org", "wrong", None)
            .await
            .unwrap_err();
        assert!(matches!(err, LoginError::Rejected(WorkflowError::Auth)));
        assert_eq!(err.user_message(), "Email ou senha incorretos.");
        assert!(!session.is_logged_in());
    }

    #[tokio::test]
    async fn server_error_carries_detail() {
        let backend = MockAuth::new(Reply::ServerError("database offline"));
        let session = SessionContext::in_memory();
        let err = login(&backend, &session, "ana@example.org", "secret", None)
            .await
            .unwrap_err();
        assert_eq!(err.user_message(), "Erro no servidor: database offline");
    }

    #[tokio::test]
    async fn unreachable_backend_mentions_port() {
        let backend = MockAuth::new(Reply::Unreachable);
        let session = SessionContext::in_memory();
        let err = login(&backend, &session, "ana@example.org", "secret", Some(8090))
            .await
            .unwrap_err();
        assert!(err.user_message().contains("8090"));
    }

    #[tokio::test]
    async fn logout_clears_even_when_server_fails() {
        let mut backend = MockAuth::new(Reply::Accept(None));
        backend.logout_fails = true;
        let session = SessionContext::in_memory();
        session.begin("ana@example.org").unwrap();

        logout(&backend, &session).await.unwrap();
        assert!(!session.is_logged_in());
        assert_eq!(session.user_email(), None);
    }
}
