use std::fmt;

use serde::{Serialize, Serializer};

/// Which exit path of the strategy ladder produced an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    FormSubmitted,
    IncompleteForm,
    NoSubmitButton,
    SubmissionError,
    FormWithCaptcha,
    EmailFound,
    ContactPageOnly,
    FormInIframe,
    NoContactFound,
    Error,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::FormSubmitted => "form_submitted",
            Method::IncompleteForm => "incomplete_form",
            Method::NoSubmitButton => "no_submit_button",
            Method::SubmissionError => "submission_error",
            Method::FormWithCaptcha => "form_with_captcha",
            Method::EmailFound => "email_found",
            Method::ContactPageOnly => "contact_page_only",
            Method::FormInIframe => "form_in_iframe",
            Method::NoContactFound => "no_contact_found",
            Method::Error => "error",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The single result of one run against one target.
///
/// Serializes to the flat JSON object callers parse from stdout:
/// `success`, `method`, and whichever of `error`, `fields_filled`,
/// `screenshot_url`, `contact_info` the variant carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FillOutcome {
    /// All required fields were written and the submit control was found.
    /// With dry runs enabled the control is never clicked.
    FormSubmitted {
        fields_filled: usize,
        screenshot_url: String,
    },
    IncompleteForm { fields_filled: usize },
    NoSubmitButton { fields_filled: usize },
    SubmissionError { error: String },
    FormWithCaptcha,
    EmailFound { emails: Vec<String> },
    ContactPageOnly,
    FormInIframe,
    NoContactFound,
    Error { error: String },
}

impl FillOutcome {
    pub fn method(&self) -> Method {
        match self {
            FillOutcome::FormSubmitted { .. } => Method::FormSubmitted,
            FillOutcome::IncompleteForm { .. } => Method::IncompleteForm,
            FillOutcome::NoSubmitButton { .. } => Method::NoSubmitButton,
            FillOutcome::SubmissionError { .. } => Method::SubmissionError,
            FillOutcome::FormWithCaptcha => Method::FormWithCaptcha,
            FillOutcome::EmailFound { .. } => Method::EmailFound,
            FillOutcome::ContactPageOnly => Method::ContactPageOnly,
            FillOutcome::FormInIframe => Method::FormInIframe,
            FillOutcome::NoContactFound => Method::NoContactFound,
            FillOutcome::Error { .. } => Method::Error,
        }
    }

    pub fn success(&self) -> bool {
        matches!(
            self,
            FillOutcome::FormSubmitted { .. } | FillOutcome::EmailFound { .. }
        )
    }

    /// Human-readable reason for a failed outcome.
    pub fn error(&self) -> Option<&str> {
        match self {
            FillOutcome::FormSubmitted { .. } | FillOutcome::EmailFound { .. } => None,
            FillOutcome::IncompleteForm { .. } => Some("Could not fill required fields"),
            FillOutcome::NoSubmitButton { .. } => Some("No submit button found"),
            FillOutcome::SubmissionError { error } | FillOutcome::Error { error } => {
                Some(error.as_str())
            }
            FillOutcome::FormWithCaptcha => Some("Form has CAPTCHA - cannot auto-submit"),
            FillOutcome::ContactPageOnly => Some("Contact page found but no form or email"),
            FillOutcome::FormInIframe => Some("Form in iframe - may require manual review"),
            FillOutcome::NoContactFound => Some("No contact form or page found"),
        }
    }

    pub fn fields_filled(&self) -> Option<usize> {
        match self {
            FillOutcome::FormSubmitted { fields_filled, .. }
            | FillOutcome::IncompleteForm { fields_filled }
            | FillOutcome::NoSubmitButton { fields_filled } => Some(*fields_filled),
            _ => None,
        }
    }

    pub fn screenshot_url(&self) -> Option<&str> {
        match self {
            FillOutcome::FormSubmitted { screenshot_url, .. } => Some(screenshot_url.as_str()),
            _ => None,
        }
    }

    pub fn emails(&self) -> Option<&[String]> {
        match self {
            FillOutcome::EmailFound { emails } => Some(emails.as_slice()),
            _ => None,
        }
    }
}

#[derive(Serialize)]
struct ContactInfo<'a> {
    emails: &'a [String],
}

#[derive(Serialize)]
struct Wire<'a> {
    success: bool,
    method: Method,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields_filled: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    screenshot_url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    contact_info: Option<ContactInfo<'a>>,
}

impl Serialize for FillOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        Wire {
            success: self.success(),
            method: self.method(),
            error: self.error(),
            fields_filled: self.fields_filled(),
            screenshot_url: self.screenshot_url(),
            contact_info: self.emails().map(|emails| ContactInfo { emails }),
        }
        .serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_form_submitted_wire_shape() {
        let outcome = FillOutcome::FormSubmitted {
            fields_filled: 2,
            screenshot_url: "screenshots/before-submit-1.png".into(),
        };
        assert_eq!(
            serde_json::to_value(&outcome).unwrap(),
            json!({
                "success": true,
                "method": "form_submitted",
                "fields_filled": 2,
                "screenshot_url": "screenshots/before-submit-1.png"
            })
        );
    }

    #[test]
    fn test_email_found_wire_shape() {
        let outcome = FillOutcome::EmailFound {
            emails: vec!["info@x.com".into()],
        };
        assert_eq!(
            serde_json::to_value(&outcome).unwrap(),
            json!({
                "success": true,
                "method": "email_found",
                "contact_info": { "emails": ["info@x.com"] }
            })
        );
    }

    #[test]
    fn test_failures_carry_error_text() {
        let v = serde_json::to_value(FillOutcome::IncompleteForm { fields_filled: 1 }).unwrap();
        assert_eq!(v["success"], json!(false));
        assert_eq!(v["method"], json!("incomplete_form"));
        assert_eq!(v["fields_filled"], json!(1));
        assert!(v["error"].is_string());
        assert!(v.get("screenshot_url").is_none());

        let v = serde_json::to_value(FillOutcome::Error {
            error: "Navigation failed: timeout".into(),
        })
        .unwrap();
        assert_eq!(v["error"], json!("Navigation failed: timeout"));
        assert!(v.get("fields_filled").is_none());
    }

    #[test]
    fn test_method_names_match_serde() {
        for m in [
            Method::FormSubmitted,
            Method::IncompleteForm,
            Method::NoSubmitButton,
            Method::SubmissionError,
            Method::FormWithCaptcha,
            Method::EmailFound,
            Method::ContactPageOnly,
            Method::FormInIframe,
            Method::NoContactFound,
            Method::Error,
        ] {
            assert_eq!(serde_json::to_value(m).unwrap(), json!(m.as_str()));
        }
    }
}
