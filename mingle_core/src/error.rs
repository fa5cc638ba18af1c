use axum::http::header::WWW_AUTHENTICATE;
use axum::http::StatusCode;
use axum::http::{HeaderMap, HeaderValue};
use axum::response::{IntoResponse, Response};
use axum::Json;
use std::borrow::Cow;
use std::collections::HashMap;

pub type AppResult<T, E = AppError> = std::result::Result<T, E>;

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("authentication required")]
    Unauthorized,

    #[error("forbidden")]
    Forbidden,

    #[error("account does not exist")]
    CurrentUserDoesNotExist,

    #[error("account has no profile")]
    CurrentProfileDoesNotExist,

    #[error("email does not exist")]
    EmailDoesNotExist,

    #[error("email is taken")]
    EmailTaken,

    #[error("username is taken")]
    UsernameTaken,

    #[error("profile not found")]
    ProfileNotFound,

    #[error("account already has a profile")]
    ProfileAlreadyExists,

    #[error("error in the request body")]
    UnprocessableEntity {
        errors: HashMap<Cow<'static, str>, Vec<Cow<'static, str>>>,
    },

    #[error("an error occurred with the database")]
    Sqlx(#[from] sqlx::Error),

    #[error("an internal server error occurred")]
    Anyhow(#[from] anyhow::Error),
}

impl AppError {
    /// Convenient constructor for `AppError::UnprocessableEntity`.
    ///
    /// Multiple entries for the same key are collected into a list for that key.
    pub fn unprocessable_entity<K, V>(errors: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<Cow<'static, str>>,
        V: Into<Cow<'static, str>>,
    {
        let mut error_map = HashMap::new();

        for (key, val) in errors {
            error_map
                .entry(key.into())
                .or_insert_with(Vec::new)
                .push(val.into());
        }

        Self::UnprocessableEntity { errors: error_map }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::CurrentUserDoesNotExist => StatusCode::NOT_FOUND,
            Self::CurrentProfileDoesNotExist => StatusCode::NOT_FOUND,
            Self::EmailDoesNotExist => StatusCode::UNPROCESSABLE_ENTITY,
            Self::EmailTaken => StatusCode::UNPROCESSABLE_ENTITY,
            Self::UsernameTaken => StatusCode::UNPROCESSABLE_ENTITY,
            Self::ProfileNotFound => StatusCode::NOT_FOUND,
            Self::ProfileAlreadyExists => StatusCode::UNPROCESSABLE_ENTITY,
            Self::UnprocessableEntity { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Sqlx(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Anyhow(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            Self::Unauthorized => (
                self.status_code(),
                [(WWW_AUTHENTICATE, HeaderValue::from_static("Token"))]
                    .into_iter()
                    .collect::<HeaderMap>(),
                self.to_string(),
            )
                .into_response(),
            Self::EmailDoesNotExist => {
                unprocessable_entity_with_errors([("email".into(), vec!["does not exist".into()])])
            }
            Self::EmailTaken => {
                unprocessable_entity_with_errors([("email".into(), vec!["email is taken".into()])])
            }
            Self::UsernameTaken => unprocessable_entity_with_errors([(
                "username".into(),
                vec!["username is taken".into()],
            )]),
            Self::ProfileAlreadyExists => unprocessable_entity_with_errors([(
                "profile".into(),
                vec!["account already has a profile".into()],
            )]),
            Self::UnprocessableEntity { errors } => {
                (StatusCode::UNPROCESSABLE_ENTITY, Json(JsonErrors { errors })).into_response()
            }
            Self::Sqlx(ref e) => {
                tracing::error!("Database error: {:?}", e);
                (self.status_code(), self.to_string()).into_response()
            }
            Self::Anyhow(ref e) => {
                tracing::error!("Generic error: {:?}", e);
                (self.status_code(), self.to_string()).into_response()
            }
            other => (other.status_code(), ()).into_response(),
        }
    }
}

#[derive(serde::Serialize)]
struct JsonErrors {
    errors: HashMap<Cow<'static, str>, Vec<Cow<'static, str>>>,
}

fn unprocessable_entity_with_errors(
    errors: impl Into<HashMap<Cow<'static, str>, Vec<Cow<'static, str>>>>,
) -> Response {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(JsonErrors {
            errors: errors.into(),
        }),
    )
        .into_response()
}
