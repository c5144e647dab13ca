//! Submitted form data and its validation.
//!
//! Forms arrive as loosely-typed fields (everything optional, everything a
//! string) and are cleaned into the typed inputs the store accepts. Failures
//! are collected per field so the page can be re-rendered with messages.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::GroupId;

pub const REQUIRED: &str = "This field is required.";
pub const INVALID_CHOICE: &str = "Select a valid choice. That choice is not one of the available choices.";

/// Validation messages keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FormErrors(BTreeMap<&'static str, Vec<String>>);

impl FormErrors {
  pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
    self.0.entry(field).or_default().push(message.into());
  }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }

  pub fn field(&self, field: &str) -> &[String] {
    self.0.get(field).map(Vec::as_slice).unwrap_or_default()
  }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
  value.map(str::trim).filter(|v| !v.is_empty())
}

// ─── Post form ───────────────────────────────────────────────────────────────

/// Raw fields of the create/edit post form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostForm {
  #[serde(default)]
  pub text:  Option<String>,
  /// Group id as submitted; an empty string means "no group".
  #[serde(default)]
  pub group: Option<String>,
  /// Opaque image reference; uploads are handled elsewhere.
  #[serde(default)]
  pub image: Option<String>,
}

/// A post form that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanPost {
  pub text:     String,
  pub group_id: Option<GroupId>,
  pub image:    Option<String>,
}

impl PostForm {
  /// Validate against the set of existing groups.
  pub fn clean(&self, group_exists: impl Fn(GroupId) -> bool) -> Result<CleanPost, FormErrors> {
    let mut errors = FormErrors::default();

    let text = non_blank(self.text.as_deref());
    if text.is_none() {
      errors.add("text", REQUIRED);
    }

    let group_id = match non_blank(self.group.as_deref()) {
      None => None,
      Some(raw) => match raw.parse::<GroupId>() {
        Ok(id) if group_exists(id) => Some(id),
        _ => {
          errors.add("group", INVALID_CHOICE);
          None
        }
      },
    };

    match text {
      Some(text) if errors.is_empty() => Ok(CleanPost {
        text: text.to_owned(),
        group_id,
        image: non_blank(self.image.as_deref()).map(str::to_owned),
      }),
      _ => Err(errors),
    }
  }
}

// ─── Comment form ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommentForm {
  #[serde(default)]
  pub text: Option<String>,
}

impl CommentForm {
  /// Returns the comment text.
  pub fn clean(&self) -> Result<String, FormErrors> {
    match non_blank(self.text.as_deref()) {
      Some(text) => Ok(text.to_owned()),
      None => {
        let mut errors = FormErrors::default();
        errors.add("text", REQUIRED);
        Err(errors)
      }
    }
  }
}
