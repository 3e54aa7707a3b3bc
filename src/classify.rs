//! Heuristic classification of contact-form inputs.
//!
//! Every rule is a substring test on attribute text, checked in a fixed
//! priority order. Nothing here touches the browser.

use serde::{Deserialize, Serialize};

/// Literal written into subject/topic inputs.
pub const SUBJECT_LINE: &str = "Partnership Inquiry";

const SKIPPED_TYPES: &[&str] = &["hidden", "submit", "button"];

/// Attributes of a form input as read from the DOM.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub tag: String,
    #[serde(default)]
    pub r#type: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
}

impl FieldDescriptor {
    /// Lower-cased `type` attribute, `"text"` when absent.
    pub fn input_type(&self) -> String {
        self.r#type
            .as_deref()
            .map(str::to_lowercase)
            .unwrap_or_else(|| "text".to_string())
    }

    /// Lower-cased `name placeholder id`.
    pub fn fingerprint(&self) -> String {
        [&self.name, &self.placeholder, &self.id]
            .iter()
            .map(|attr| attr.as_deref().unwrap_or(""))
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase()
    }

    pub fn is_textarea(&self) -> bool {
        self.tag.eq_ignore_ascii_case("textarea")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldRole {
    Name,
    Email,
    Phone,
    Subject,
    Message,
    Skip,
}

impl FieldRole {
    pub fn label(self) -> &'static str {
        match self {
            FieldRole::Name => "Name",
            FieldRole::Email => "Email",
            FieldRole::Phone => "Phone",
            FieldRole::Subject => "Subject",
            FieldRole::Message => "Message",
            FieldRole::Skip => "Skip",
        }
    }
}

/// Running state of one form's fill loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FillState {
    pub email_filled: bool,
    pub message_filled: bool,
    pub fields_filled: usize,
}

impl FillState {
    /// Record a successful fill of a field with the given role.
    pub fn record(mut self, role: FieldRole) -> Self {
        if role == FieldRole::Skip {
            return self;
        }
        match role {
            FieldRole::Email => self.email_filled = true,
            FieldRole::Message => self.message_filled = true,
            _ => {}
        }
        self.fields_filled += 1;
        self
    }

    /// Both an email and a message were written.
    pub fn is_complete(&self) -> bool {
        self.email_filled && self.message_filled
    }
}

/// Decide what a field should receive, given what has been filled so far.
pub fn classify(field: &FieldDescriptor, state: &FillState, has_phone: bool) -> FieldRole {
    let input_type = field.input_type();
    if SKIPPED_TYPES.contains(&input_type.as_str()) {
        return FieldRole::Skip;
    }

    let print = field.fingerprint();
    let has = |needle: &str| print.contains(needle);

    if !state.email_filled && has("name") {
        return FieldRole::Name;
    }
    if !state.email_filled && (input_type == "email" || has("email") || has("e-mail")) {
        return FieldRole::Email;
    }
    if has_phone && (input_type == "tel" || has("phone") || has("tel")) {
        return FieldRole::Phone;
    }
    if has("subject") || has("topic") {
        return FieldRole::Subject;
    }
    if field.is_textarea()
        && !state.message_filled
        && (has("message") || has("comment") || has("inquiry"))
    {
        return FieldRole::Message;
    }
    FieldRole::Skip
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(r#type: Option<&str>, name: &str) -> FieldDescriptor {
        FieldDescriptor {
            tag: "input".into(),
            r#type: r#type.map(String::from),
            name: Some(name.into()),
            placeholder: None,
            id: None,
        }
    }

    fn textarea(name: &str) -> FieldDescriptor {
        FieldDescriptor {
            tag: "textarea".into(),
            name: Some(name.into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_fingerprint_lowercases_and_joins() {
        let f = FieldDescriptor {
            tag: "input".into(),
            r#type: None,
            name: Some("Your_Name".into()),
            placeholder: Some("Full NAME".into()),
            id: None,
        };
        assert_eq!(f.fingerprint(), "your_name full name ");
        assert_eq!(f.input_type(), "text");
    }

    #[test]
    fn test_skip_types() {
        let state = FillState::default();
        for t in ["hidden", "submit", "button", "HIDDEN"] {
            assert_eq!(classify(&input(Some(t), "email"), &state, true), FieldRole::Skip);
        }
    }

    #[test]
    fn test_name_rule_wins_over_email_before_email_filled() {
        let state = FillState::default();
        let f = input(Some("text"), "full_name_email_contact");
        assert_eq!(classify(&f, &state, false), FieldRole::Name);
    }

    #[test]
    fn test_name_rule_disabled_after_email() {
        let state = FillState::default().record(FieldRole::Email);
        assert_eq!(classify(&input(None, "last_name"), &state, false), FieldRole::Skip);
    }

    #[test]
    fn test_email_by_type_or_fingerprint() {
        let state = FillState::default();
        assert_eq!(classify(&input(Some("email"), "addr"), &state, false), FieldRole::Email);
        assert_eq!(classify(&input(None, "your-e-mail"), &state, false), FieldRole::Email);
    }

    #[test]
    fn test_second_email_field_not_refilled() {
        let state = FillState::default().record(FieldRole::Email);
        assert_eq!(classify(&input(Some("email"), "confirm"), &state, false), FieldRole::Skip);
    }

    #[test]
    fn test_phone_requires_phone_value() {
        let state = FillState::default();
        let f = input(Some("tel"), "mobile");
        assert_eq!(classify(&f, &state, true), FieldRole::Phone);
        assert_eq!(classify(&f, &state, false), FieldRole::Skip);
    }

    #[test]
    fn test_subject_and_topic() {
        let state = FillState::default();
        assert_eq!(classify(&input(None, "subject"), &state, false), FieldRole::Subject);
        assert_eq!(classify(&input(None, "topic"), &state, false), FieldRole::Subject);
    }

    #[test]
    fn test_message_only_for_textarea() {
        let state = FillState::default();
        assert_eq!(classify(&textarea("message"), &state, false), FieldRole::Message);
        assert_eq!(classify(&textarea("your-inquiry"), &state, false), FieldRole::Message);
        assert_eq!(classify(&input(None, "message"), &state, false), FieldRole::Skip);
        assert_eq!(classify(&textarea("notes"), &state, false), FieldRole::Skip);
    }

    #[test]
    fn test_message_filled_once() {
        let state = FillState::default().record(FieldRole::Message);
        assert_eq!(classify(&textarea("comments"), &state, false), FieldRole::Skip);
    }

    #[test]
    fn test_fill_state_completion() {
        let state = FillState::default()
            .record(FieldRole::Name)
            .record(FieldRole::Skip)
            .record(FieldRole::Email);
        assert_eq!(state.fields_filled, 2);
        assert!(!state.is_complete());
        assert!(state.record(FieldRole::Message).is_complete());
    }
}
