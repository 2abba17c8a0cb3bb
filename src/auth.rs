//! Login and sign-up forms

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Error, Result, ValidationError, GENERIC_FAILURE_MESSAGE};
use crate::session::AuthToken;
use crate::traits::{Authenticator, SessionStore};

static LOGIN_EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap()
});
static SIGNUP_EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,6}$").unwrap()
});

pub const LOGIN_FAILURE_MESSAGE: &str = "Une erreur est survenue lors de la connexion.";
pub const SIGNUP_FAILURE_MESSAGE: &str = "Une erreur est survenue lors de la création du compte";
pub const USER_EXISTS_MESSAGE: &str = "Cet utilisateur existe déjà";

/// At least 8 ASCII letters or digits, with a lowercase, an uppercase and a digit
pub fn is_strong_password(password: &str) -> bool {
    password.len() >= 8
        && password.chars().all(|c| c.is_ascii_alphanumeric())
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_digit())
}

/// Replace some server messages with friendlier ones
fn login_message(err: &Error) -> String {
    match err {
        Error::Server { message, .. } if message == "Email invalide" => "L'email fourni n'est pas valide.".to_string(),
        Error::Server { message, .. } if message == GENERIC_FAILURE_MESSAGE => LOGIN_FAILURE_MESSAGE.to_string(),
        other => other.to_string(),
    }
}


#[derive(Clone, Debug, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    error: Option<String>,
}

impl LoginForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// The message displayed under the form
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        if self.email.trim().is_empty() || self.password.is_empty() {
            return Err(ValidationError::MissingFields);
        }
        if LOGIN_EMAIL.is_match(self.email.trim()) == false {
            return Err(ValidationError::InvalidEmail);
        }
        Ok(())
    }

    /// Log in, and store the token into `session` on success
    pub async fn submit<A, T>(&mut self, server: &A, session: &mut T) -> Result<AuthToken>
    where
        A: Authenticator + ?Sized,
        T: SessionStore + ?Sized,
    {
        self.error = None;
        if let Err(err) = self.validate() {
            self.error = Some(err.to_string());
            return Err(err.into());
        }

        let email = self.email.trim();
        let token = match server.login(email, &self.password).await {
            Ok(token) => token,
            Err(err) => {
                log::error!("Unable to log in as {}: {}", email, err);
                self.error = Some(login_message(&err));
                return Err(err);
            }
        };
        session.store_token(token.clone())?;
        log::info!("Logged in as {}", email);
        Ok(token)
    }
}


#[derive(Clone, Debug, Default)]
pub struct SignupForm {
    pub email: String,
    pub email_confirmation: String,
    pub password: String,
    pub password_confirmation: String,
    submit_attempted: bool,
    error: Option<String>,
}

impl SignupForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// The message displayed under the form. Nothing is shown before the first submission
    pub fn error(&self) -> Option<&str> {
        if self.submit_attempted {
            self.error.as_deref()
        } else {
            None
        }
    }

    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        let fields = [&self.email, &self.email_confirmation, &self.password, &self.password_confirmation];
        if fields.iter().any(|f| f.trim().is_empty()) {
            return Err(ValidationError::MissingFields);
        }
        if SIGNUP_EMAIL.is_match(self.email.trim()) == false {
            return Err(ValidationError::InvalidEmail);
        }
        if self.email.trim() != self.email_confirmation.trim() {
            return Err(ValidationError::EmailMismatch);
        }
        if is_strong_password(&self.password) == false {
            return Err(ValidationError::WeakPassword);
        }
        if self.password != self.password_confirmation {
            return Err(ValidationError::PasswordMismatch);
        }
        Ok(())
    }

    /// Create the account. The user still has to log in afterwards
    pub async fn submit<A>(&mut self, server: &A) -> Result<()>
    where
        A: Authenticator + ?Sized,
    {
        self.submit_attempted = true;
        self.error = None;
        if let Err(err) = self.validate() {
            self.error = Some(err.to_string());
            return Err(err.into());
        }

        let email = self.email.trim();
        match server.email_exists(email).await {
            Ok(true) => {
                self.error = Some(USER_EXISTS_MESSAGE.to_string());
                return Err(Error::server(409, Some(USER_EXISTS_MESSAGE.to_string())));
            },
            Ok(false) => {},
            Err(err @ Error::Network(_)) => {
                self.error = Some(err.to_string());
                return Err(err);
            },
            // The sign-up request will tell whether the account exists
            Err(err) => log::warn!("Unable to check whether {} exists: {}", email, err),
        }

        if let Err(err) = server.signup(email, &self.password).await {
            log::error!("Unable to create account {}: {}", email, err);
            self.error = Some(match &err {
                Error::Server { message, .. } if message != GENERIC_FAILURE_MESSAGE => message.clone(),
                Error::Network(_) => err.to_string(),
                _ => SIGNUP_FAILURE_MESSAGE.to_string(),
            });
            return Err(err);
        }
        log::info!("Account {} created", email);
        Ok(())
    }
}
