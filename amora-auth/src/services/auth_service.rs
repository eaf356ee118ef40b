use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::NaiveDate;

use amora_shared::errors::{AppError, ErrorCode};

pub const MIN_AGE: i32 = 18;
pub const MAX_AGE: i32 = 99;

pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::internal(format!("password hashing failed: {e}")))
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| AppError::internal(format!("invalid password hash: {e}")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

pub fn validate_password(password: &str) -> Result<(), AppError> {
    if password.len() < 8 {
        return Err(AppError::new(ErrorCode::PasswordTooWeak, "password must be at least 8 characters"));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(AppError::new(ErrorCode::PasswordTooWeak, "password must contain at least one number"));
    }
    if !password.chars().any(|c| c.is_ascii_alphabetic()) {
        return Err(AppError::new(ErrorCode::PasswordTooWeak, "password must contain at least one letter"));
    }
    Ok(())
}

pub fn validate_username(username: &str) -> Result<(), AppError> {
    if username.len() < 3 || username.len() > 20 {
        return Err(AppError::new(
            ErrorCode::InvalidUsername,
            "username must be between 3 and 20 characters",
        ));
    }
    if !username.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(AppError::new(
            ErrorCode::InvalidUsername,
            "username can only contain letters, numbers, and underscores",
        ));
    }
    Ok(())
}

pub fn age_on(birth_date: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.years_since(birth_date).unwrap_or(0) as i32;
    if birth_date > today {
        age = -1;
    }
    age
}

pub fn validate_age(birth_date: NaiveDate, today: NaiveDate) -> Result<(), AppError> {
    let age = age_on(birth_date, today);
    if age < MIN_AGE {
        return Err(AppError::new(ErrorCode::UnderageUser, "you must be at least 18 years old"));
    }
    if age > MAX_AGE {
        return Err(AppError::new(ErrorCode::ValidationError, "invalid birth date"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn password_round_trip() {
        let hash = hash_password("secret123").unwrap();
        assert!(verify_password("secret123", &hash).unwrap());
        assert!(!verify_password("wrong-pass1", &hash).unwrap());
    }

    #[test]
    fn weak_passwords_are_rejected() {
        assert!(validate_password("short1").is_err());
        assert!(validate_password("lettersonly").is_err());
        assert!(validate_password("12345678").is_err());
        assert!(validate_password("secret123").is_ok());
    }

    #[test]
    fn username_rules() {
        assert!(validate_username("ab").is_err());
        assert!(validate_username("valid_name_99").is_ok());
        assert!(validate_username("bad name").is_err());
        assert!(validate_username(&"x".repeat(21)).is_err());
    }

    #[test]
    fn age_boundaries() {
        let today = date(2026, 8, 5);
        assert!(validate_age(date(2008, 8, 5), today).is_ok()); // 18 today
        assert!(validate_age(date(2008, 8, 6), today).is_err()); // 18 tomorrow
        assert!(validate_age(date(1920, 1, 1), today).is_err()); // over 99
        assert!(validate_age(date(2030, 1, 1), today).is_err()); // not born yet
    }
}
