//! Account registration.

use axum::{Form, extract::State, response::Response};
use scribe_core::{
  form::{FormErrors, REQUIRED},
  model::NewUser,
  store::{BlogStore, StoreError},
};
use serde::Deserialize;

use crate::{
  AppState,
  auth::hash_password,
  error::Error,
  handlers::found,
  pages::{SignupPage, render},
};

const MAX_USERNAME: usize = 150;
const INVALID_USERNAME: &str =
  "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.";
const USERNAME_TAKEN: &str = "A user with that username already exists.";

#[derive(Debug, Default, Deserialize)]
pub struct SignupForm {
  #[serde(default)]
  pub username: Option<String>,
  #[serde(default)]
  pub password: Option<String>,
}

fn valid_username(name: &str) -> bool {
  name.chars().count() <= MAX_USERNAME
    && name
      .chars()
      .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
}

impl SignupForm {
  fn clean(&self) -> Result<(String, String), FormErrors> {
    let mut errors = FormErrors::default();

    let username = self.username.as_deref().map(str::trim).unwrap_or_default();
    if username.is_empty() {
      errors.add("username", REQUIRED);
    } else if !valid_username(username) {
      errors.add("username", INVALID_USERNAME);
    }

    let password = self.password.as_deref().unwrap_or_default();
    if password.is_empty() {
      errors.add("password", REQUIRED);
    }

    if errors.is_empty() {
      Ok((username.to_owned(), password.to_owned()))
    } else {
      Err(errors)
    }
  }
}

fn rerender(form: &SignupForm, form_errors: FormErrors) -> Response {
  render(SignupPage {
    username: form.username.clone().unwrap_or_default(),
    form_errors,
  })
}

/// `POST /auth/signup/`
pub async fn signup<S>(
  State(state): State<AppState<S>>,
  Form(form): Form<SignupForm>,
) -> Result<Response, Error>
where
  S: BlogStore + Clone + Send + Sync + 'static,
{
  let (username, password) = match form.clean() {
    Ok(clean) => clean,
    Err(errors) => return Ok(rerender(&form, errors)),
  };

  let password_hash = hash_password(&password)?;
  match state
    .store
    .create_user(NewUser { username, password_hash })
    .await
  {
    Ok(user) => {
      tracing::info!(user_id = user.id, username = %user.username, "user signed up");
      Ok(found("/"))
    }
    Err(e) if e.is_constraint_violation() => {
      let mut errors = FormErrors::default();
      errors.add("username", USERNAME_TAKEN);
      Ok(rerender(&form, errors))
    }
    Err(e) => Err(Error::store(e)),
  }
}
