/// Submitted form payloads (application/x-www-form-urlencoded)
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationErrors};

use super::views::FieldErrors;

pub const REQUIRED_MESSAGE: &str = "This field is required.";
pub const INVALID_CHOICE_MESSAGE: &str =
    "Select a valid choice. That choice is not one of the available choices.";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate, ToSchema)]
pub struct PostForm {
    #[serde(default)]
    #[validate(length(min = 1, code = "required"))]
    pub text: String,
    /// Group id, or empty for "no group"
    #[serde(default)]
    pub group: Option<String>,
    /// Stored image reference, e.g. `posts/cat.png`
    #[serde(default)]
    #[validate(length(max = 100, message = "Ensure this value has at most 100 characters."))]
    pub image: Option<String>,
}

/// A post form that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanPost {
    pub text: String,
    pub group_id: Option<i64>,
    pub image: Option<String>,
}

impl PostForm {
    /// Trim, validate and parse the submitted fields.
    ///
    /// Whether the group id refers to an existing group is checked by the caller.
    pub fn clean(&self) -> Result<CleanPost, FieldErrors> {
        let trimmed = PostForm {
            text: self.text.trim().to_string(),
            group: self
                .group
                .as_deref()
                .map(str::trim)
                .filter(|g| !g.is_empty())
                .map(str::to_string),
            image: self
                .image
                .as_deref()
                .map(str::trim)
                .filter(|i| !i.is_empty())
                .map(str::to_string),
        };

        let mut errors = match trimmed.validate() {
            Ok(()) => FieldErrors::new(),
            Err(e) => collect_field_errors(&e),
        };

        let group_id = match trimmed.group.as_deref() {
            None => None,
            Some(raw) => match raw.parse::<i64>() {
                Ok(id) => Some(id),
                Err(_) => {
                    add_error(&mut errors, "group", INVALID_CHOICE_MESSAGE);
                    None
                }
            },
        };

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(CleanPost {
            text: trimmed.text,
            group_id,
            image: trimmed.image,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate, ToSchema)]
pub struct CommentForm {
    #[serde(default)]
    #[validate(length(min = 1, code = "required"))]
    pub text: String,
}

impl CommentForm {
    pub fn clean(&self) -> Result<String, FieldErrors> {
        let trimmed = CommentForm {
            text: self.text.trim().to_string(),
        };
        match trimmed.validate() {
            Ok(()) => Ok(trimmed.text),
            Err(e) => Err(collect_field_errors(&e)),
        }
    }
}

pub fn add_error(errors: &mut FieldErrors, field: &str, message: &str) {
    errors
        .entry(field.to_string())
        .or_default()
        .push(message.to_string());
}

fn collect_field_errors(errors: &ValidationErrors) -> FieldErrors {
    let mut out = FieldErrors::new();
    for (field, field_errors) in errors.field_errors() {
        for error in field_errors.iter() {
            let message = match (&error.message, &*error.code) {
                (Some(message), _) => message.to_string(),
                (None, "required") => REQUIRED_MESSAGE.to_string(),
                (None, code) => code.to_string(),
            };
            add_error(&mut out, &field.to_string(), &message);
        }
    }
    out
}
