use crate::identity::AuthError;
use crate::session::CredentialsError;
use axum::http::StatusCode;

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn unauthorized() -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: "Você precisa estar logado.".to_string(),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        let status = match err {
            AuthError::UserNotFound | AuthError::WrongPassword => StatusCode::UNAUTHORIZED,
            AuthError::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,
            AuthError::EmailAlreadyInUse => StatusCode::CONFLICT,
            AuthError::InvalidEmail | AuthError::WeakPassword => StatusCode::BAD_REQUEST,
            AuthError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AuthError::Storage(_) | AuthError::Hashing(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl From<CredentialsError> for AppError {
    fn from(err: CredentialsError) -> Self {
        match err {
            CredentialsError::Validation(err) => Self::bad_request(err.description()),
            CredentialsError::Provider(err) => err.into(),
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::ValidationError;

    #[test]
    fn auth_errors_map_to_statuses() {
        assert_eq!(AppError::from(AuthError::WrongPassword).status, StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::from(AuthError::EmailAlreadyInUse).status, StatusCode::CONFLICT);
        assert_eq!(
            AppError::from(AuthError::TooManyRequests).status,
            StatusCode::TOO_MANY_REQUESTS
        );
    }

    #[test]
    fn validation_errors_carry_localized_message() {
        let err = AppError::from(CredentialsError::Validation(ValidationError::ShortPassword));
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "A senha deve ter pelo menos 6 caracteres.");
    }
}
