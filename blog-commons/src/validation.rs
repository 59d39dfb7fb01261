use validator::ValidationError;

const USERNAME_MAX: usize = 150;
const PASSWORD_MIN: usize = 8;

pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username.chars().count() > USERNAME_MAX {
        return Err(ValidationError::new("username_length")
            .with_message("Username must be at most 150 characters long.".into()));
    }
    if !username
        .chars()
        .all(|c| c.is_alphanumeric() || "@.+-_".contains(c))
    {
        Err(ValidationError::new("username_chars").with_message(
            "Username may contain only letters, numbers, and @/./+/-/_ characters.".into(),
        ))
    } else {
        Ok(())
    }
}

/// Checked in order: length, digit, letter. Only the first failure is reported.
/// Digits are 0-9; fractions and numeral letters such as `½` or `Ⅷ` do not count.
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.chars().count() < PASSWORD_MIN {
        Err(ValidationError::new("password_length")
            .with_message("Password must be at least 8 characters long.".into()))
    } else if !password.chars().any(|c| c.is_ascii_digit()) {
        Err(ValidationError::new("password_digit")
            .with_message("Password must contain at least one number.".into()))
    } else if !password.chars().any(char::is_alphabetic) {
        Err(ValidationError::new("password_letter")
            .with_message("Password must contain at least one letter.".into()))
    } else {
        Ok(())
    }
}
