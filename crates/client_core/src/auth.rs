//! Sign-in and sign-up forms: local validation, password strength, and backend delegation.

use shared::protocol::{SignInRequest, SignUpRequest, SignUpResponse};
use tracing::{info, warn};

use crate::{
    backend::StudioBackend,
    error::{AuthError, BackendError, CONNECTIVITY_MESSAGE},
    session::Session,
};

pub const MIN_PASSWORD_LEN: usize = 6;
const STRONG_PASSWORD_LEN: usize = 10;

pub const PASSWORD_TOO_SHORT: &str = "Password must be at least 6 characters";
pub const PASSWORDS_DO_NOT_MATCH: &str = "Passwords do not match";
pub const EMAIL_REQUIRED: &str = "Email is required";
pub const PASSWORD_REQUIRED: &str = "Password is required";
pub const NAME_REQUIRED: &str = "First and last name are required";
pub const SIGN_IN_FAILED: &str = "Sign in failed";
pub const SIGN_UP_FAILED: &str = "Sign up failed";
pub const ACCOUNT_EXISTS: &str = "Account already exists";
pub const SIGN_UP_SUCCESS_NOTICE: &str = "Account created successfully! Please sign in.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrengthTone {
    None,
    Poor,
    Moderate,
    Good,
    Excellent,
}

/// 0–5 score used for feedback only; it never gates submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct PasswordStrength(u8);

impl PasswordStrength {
    pub fn of(password: &str) -> Self {
        let len = password.chars().count();
        let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
        let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
        let checks = [
            len >= MIN_PASSWORD_LEN,
            len >= STRONG_PASSWORD_LEN,
            has_lower && has_upper,
            password.chars().any(|c| c.is_ascii_digit()),
            password.chars().any(|c| !c.is_ascii_alphanumeric()),
        ];
        Self(checks.into_iter().filter(|passed| *passed).count() as u8)
    }

    pub fn score(self) -> u8 {
        self.0
    }

    pub fn label(self) -> &'static str {
        match self.0 {
            0 => "Too weak",
            1 => "Weak",
            2 => "Fair",
            3 => "Good",
            4 => "Strong",
            _ => "Very Strong",
        }
    }

    /// Width of the strength meter, in `0.0..=1.0`.
    pub fn fraction(self) -> f32 {
        f32::from(self.0) / 5.0
    }

    pub fn tone(self) -> StrengthTone {
        match self.0 {
            0 => StrengthTone::None,
            1 | 2 => StrengthTone::Poor,
            3 => StrengthTone::Moderate,
            4 => StrengthTone::Good,
            _ => StrengthTone::Excellent,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SignInForm {
    pub email: String,
    pub password: String,
}

impl SignInForm {
    pub fn validate(&self) -> Result<SignInRequest, AuthError> {
        let email = self.email.trim();
        if email.is_empty() {
            return Err(AuthError::Validation(EMAIL_REQUIRED.to_string()));
        }
        if self.password.is_empty() {
            return Err(AuthError::Validation(PASSWORD_REQUIRED.to_string()));
        }
        Ok(SignInRequest {
            email: email.to_string(),
            password: self.password.clone(),
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct SignUpForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl SignUpForm {
    pub fn strength(&self) -> PasswordStrength {
        PasswordStrength::of(&self.password)
    }

    pub fn validate(&self) -> Result<SignUpRequest, AuthError> {
        let first_name = self.first_name.trim();
        let last_name = self.last_name.trim();
        let email = self.email.trim();
        if first_name.is_empty() || last_name.is_empty() {
            return Err(AuthError::Validation(NAME_REQUIRED.to_string()));
        }
        if email.is_empty() {
            return Err(AuthError::Validation(EMAIL_REQUIRED.to_string()));
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::Validation(PASSWORD_TOO_SHORT.to_string()));
        }
        if self.password != self.confirm_password {
            return Err(AuthError::Validation(PASSWORDS_DO_NOT_MATCH.to_string()));
        }
        Ok(SignUpRequest {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            email: email.to_string(),
            password: self.password.clone(),
        })
    }
}

fn unavailable(err: &BackendError) -> AuthError {
    warn!(error = %err, "auth request did not reach the backend");
    AuthError::Unavailable(CONNECTIVITY_MESSAGE.to_string())
}

pub async fn sign_in(backend: &dyn StudioBackend, form: &SignInForm) -> Result<Session, AuthError> {
    let request = form.validate()?;
    match backend.sign_in(&request).await {
        Ok(body) => {
            let session = Session::from(body);
            info!(user_id = session.user_id.0, "session started");
            Ok(session)
        }
        Err(err @ BackendError::Status { .. }) => {
            info!(status = ?err.status(), "sign in rejected");
            Err(AuthError::Rejected(err.user_message(SIGN_IN_FAILED)))
        }
        Err(err) => Err(unavailable(&err)),
    }
}

pub async fn sign_up(
    backend: &dyn StudioBackend,
    form: &SignUpForm,
) -> Result<SignUpResponse, AuthError> {
    let request = form.validate()?;
    match backend.sign_up(&request).await {
        Ok(body) => Ok(body),
        Err(err) if err.status() == Some(409) => {
            Err(AuthError::AccountExists(err.user_message(ACCOUNT_EXISTS)))
        }
        Err(err @ BackendError::Status { .. }) => {
            info!(status = ?err.status(), "sign up rejected");
            Err(AuthError::Rejected(err.user_message(SIGN_UP_FAILED)))
        }
        Err(err) => Err(unavailable(&err)),
    }
}

#[cfg(test)]
#[path = "tests/auth_tests.rs"]
mod tests;
