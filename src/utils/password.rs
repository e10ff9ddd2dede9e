// Password hashing, verification and strength checks using bcrypt

use thiserror::Error;

/// Errors that can occur during password operations
#[derive(Error, Debug)]
pub enum PasswordError {
    #[error("Failed to hash password: {0}")]
    HashingError(String),

    #[error("Failed to verify password: {0}")]
    VerificationError(String),

    #[error("Password must be at least {0} characters long")]
    TooShort(usize),

    #[error("Password must contain an uppercase letter, a lowercase letter, a digit and a special character")]
    TooWeak,
}

pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Hash a password with the given bcrypt cost
///
/// Cost comes from `SecurityConfig::bcrypt_cost`; tests pass a low value.
pub fn hash_password(password: &str, cost: u32) -> Result<String, PasswordError> {
    bcrypt::hash(password, cost).map_err(|e| PasswordError::HashingError(e.to_string()))
}

/// Verify a password against a stored bcrypt hash
///
/// Returns `Ok(false)` on mismatch; `Err` only when the stored hash is unusable.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    bcrypt::verify(password, hash).map_err(|e| PasswordError::VerificationError(e.to_string()))
}

/// Enforce length and character-class rules
pub fn check_password_strength(password: &str) -> Result<(), PasswordError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(PasswordError::TooShort(MIN_PASSWORD_LENGTH));
    }

    let has_uppercase = password.chars().any(|c| c.is_uppercase());
    let has_lowercase = password.chars().any(|c| c.is_lowercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_special = password.chars().any(|c| !c.is_alphanumeric());

    if !has_uppercase || !has_lowercase || !has_digit || !has_special {
        return Err(PasswordError::TooWeak);
    }

    Ok(())
}

/// `validator` hook for request structs
pub fn validate_password(password: &str) -> Result<(), validator::ValidationError> {
    check_password_strength(password).map_err(|e| {
        let code = match e {
            PasswordError::TooShort(_) => "password_too_short",
            _ => "password_complexity",
        };
        let mut err = validator::ValidationError::new(code);
        err.message = Some(e.to_string().into());
        err
    })
}
