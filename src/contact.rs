use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

pub const SUCCESS_MESSAGE: &str = "Thank you for your message! I will get back to you soon.";

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles")
});
static MOBILE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\d\s\-\+\(\)]+$").expect("mobile pattern compiles"));

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub mobile: String,
    pub subject: String,
    pub message: String,
}

/// Validation failures; `Display` is the text shown to the visitor.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum ContactFormError {
    #[error("Please fill in all fields")]
    MissingField,
    #[error("Please enter a valid email address")]
    InvalidEmail,
    #[error("Please enter a valid mobile number")]
    InvalidMobile,
}

impl ContactForm {
    pub fn validate(&self) -> Result<(), ContactFormError> {
        let fields = [
            &self.name,
            &self.email,
            &self.mobile,
            &self.subject,
            &self.message,
        ];
        if fields.iter().any(|value| value.trim().is_empty()) {
            return Err(ContactFormError::MissingField);
        }

        if !EMAIL_PATTERN.is_match(self.email.trim()) {
            return Err(ContactFormError::InvalidEmail);
        }

        if !MOBILE_PATTERN.is_match(self.mobile.trim()) {
            return Err(ContactFormError::InvalidMobile);
        }

        Ok(())
    }

    /// Message to surface for a submission; the form is never sent anywhere.
    pub fn submission_message(&self) -> Result<&'static str, ContactFormError> {
        self.validate().map(|()| SUCCESS_MESSAGE)
    }
}
