use async_graphql::ErrorExtensions;
use thiserror::Error;
use validator::ValidationErrors;

/// Message returned to clients for failures whose cause stays server-side
const INTERNAL_ERROR_MESSAGE: &str = "An unexpected error occurred";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {message}")]
    Validation {
        message: String,
        field: Option<String>,
    },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation {
            message: message.into(),
            field: None,
        }
    }

    pub fn invalid_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Validation {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Error category reported in `extensions.classification`
    pub fn classification(&self) -> &'static str {
        match self {
            AppError::Validation { .. } | AppError::Conflict(_) => "BAD_REQUEST",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Database(_) | AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Client-facing message, without the kind prefix used by `Display`
    pub fn client_message(&self) -> String {
        match self {
            AppError::Validation { message, .. } => message.clone(),
            AppError::NotFound(msg) | AppError::Conflict(msg) => msg.clone(),
            AppError::Database(_) | AppError::Internal(_) => INTERNAL_ERROR_MESSAGE.to_string(),
        }
    }
}

impl ErrorExtensions for AppError {
    fn extend(&self) -> async_graphql::Error {
        match self {
            AppError::Database(e) => tracing::error!("Database error: {:?}", e),
            AppError::Internal(msg) => tracing::error!("Internal error: {}", msg),
            _ => tracing::warn!("Request rejected: {}", self),
        }

        async_graphql::Error::new(self.client_message()).extend_with(|_, ext| {
            ext.set("classification", self.classification().to_string());
            if let AppError::Validation {
                field: Some(field), ..
            } = self
            {
                ext.set("field", field.clone());
            }
        })
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        let mut fields: Vec<(String, String)> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                let field = field.to_string();
                errs.iter().map(move |err| {
                    let message = err
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("{} is invalid", field));
                    (field.clone(), message)
                })
            })
            .collect();
        fields.sort_by(|a, b| {
            report_rank(&a.0)
                .cmp(&report_rank(&b.0))
                .then_with(|| a.cmp(b))
        });

        match fields.into_iter().next() {
            // Struct-level checks are reported without a single field
            Some((field, message)) if field == "__all__" => AppError::validation(message),
            Some((field, message)) => AppError::invalid_field(to_camel_case(&field), message),
            None => AppError::validation(errors.to_string()),
        }
    }
}

/// Order in which failing fields are reported: the name first, struct-level
/// checks last.
fn report_rank(field: &str) -> u8 {
    match field {
        "name" => 0,
        "__all__" => 2,
        _ => 1,
    }
}

fn to_camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

pub type Result<T> = std::result::Result<T, AppError>;
