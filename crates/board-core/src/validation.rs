//! Local form validation. Runs before any request leaves the client.

use crate::error::ValidationError;

/// Symbols accepted (and one of which is required) by the password policy.
pub const PASSWORD_SYMBOLS: &str = "@$!%*?&";

pub const PASSWORD_MIN_LEN: usize = 6;

/// Fails with `EmptyField(field)` when `value` is blank after trimming.
pub fn require(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::EmptyField(field))
    } else {
        Ok(())
    }
}

/// Password policy: at least six characters drawn from ASCII letters,
/// digits and `@$!%*?&`, with at least one lowercase letter, one digit and
/// one symbol. Uppercase letters are allowed but not required.
pub fn check_password_policy(password: &str) -> Result<(), ValidationError> {
    if let Some(bad) = password
        .chars()
        .find(|c| !c.is_ascii_alphanumeric() && !PASSWORD_SYMBOLS.contains(*c))
    {
        return Err(ValidationError::PasswordInvalidCharacter(bad));
    }
    if password.chars().count() < PASSWORD_MIN_LEN {
        return Err(ValidationError::PasswordTooShort {
            min: PASSWORD_MIN_LEN,
        });
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return Err(ValidationError::PasswordMissingLowercase);
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(ValidationError::PasswordMissingDigit);
    }
    if !password.chars().any(|c| PASSWORD_SYMBOLS.contains(c)) {
        return Err(ValidationError::PasswordMissingSymbol);
    }
    Ok(())
}

/// Password change form.
#[derive(Clone)]
pub struct ChangePassword {
    pub current: String,
    pub new: String,
    pub confirm: String,
}

impl std::fmt::Debug for ChangePassword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ChangePassword { .. }")
    }
}

impl ChangePassword {
    pub fn new(
        current: impl Into<String>,
        new: impl Into<String>,
        confirm: impl Into<String>,
    ) -> Self {
        Self {
            current: current.into(),
            new: new.into(),
            confirm: confirm.into(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require("current password", &self.current)?;
        require("new password", &self.new)?;
        require("password confirmation", &self.confirm)?;
        if self.new != self.confirm {
            return Err(ValidationError::PasswordMismatch);
        }
        if self.new == self.current {
            return Err(ValidationError::PasswordUnchanged);
        }
        check_password_policy(&self.new)
    }
}
