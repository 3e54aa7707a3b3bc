use serde::{Deserialize, Deserializer, Serialize};

pub const DEFAULT_EMAIL: &str = "contact@business.com";
pub const DEFAULT_CONTACT_PERSON: &str = "Business Contact";

/// One company to reach out to, and what to put in its contact form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    pub url: String,
    #[serde(default)]
    pub company_name: String,
    pub message: String,
    #[serde(default = "default_email", deserialize_with = "email_or_default")]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(
        default = "default_contact_person",
        deserialize_with = "contact_person_or_default"
    )]
    pub contact_person: String,
}

fn default_email() -> String {
    DEFAULT_EMAIL.to_string()
}

fn default_contact_person() -> String {
    DEFAULT_CONTACT_PERSON.to_string()
}

/// Empty strings and `null` count as absent.
fn non_empty_or<'de, D>(deserializer: D, fallback: fn() -> String) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|v| !v.is_empty()).unwrap_or_else(fallback))
}

fn email_or_default<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    non_empty_or(deserializer, default_email)
}

fn contact_person_or_default<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<String, D::Error> {
    non_empty_or(deserializer, default_contact_person)
}

impl Target {
    /// Build a target with the placeholder sender details filled in.
    pub fn new(
        url: impl Into<String>,
        company_name: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            company_name: company_name.into(),
            message: message.into(),
            email: default_email(),
            phone: String::new(),
            contact_person: default_contact_person(),
        }
    }

    /// Override the sender email. Empty input keeps the default.
    pub fn email(mut self, email: impl Into<String>) -> Self {
        let email = email.into();
        if !email.is_empty() {
            self.email = email;
        }
        self
    }

    pub fn phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = phone.into();
        self
    }

    /// Override the sender name. Empty input keeps the default.
    pub fn contact_person(mut self, person: impl Into<String>) -> Self {
        let person = person.into();
        if !person.is_empty() {
            self.contact_person = person;
        }
        self
    }
}
