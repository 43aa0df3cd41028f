//! HTTP status categories and their short explanations

/// Failure categories with a dedicated explanation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusCategory {
    NotFound,
    ServerError,
    Forbidden,
    BadRequest,
    Unavailable,
    Other(u16),
}

impl StatusCategory {
    pub fn from_code(code: u16) -> Self {
        match code {
            404 => Self::NotFound,
            500 => Self::ServerError,
            403 => Self::Forbidden,
            400 => Self::BadRequest,
            503 => Self::Unavailable,
            other => Self::Other(other),
        }
    }
}

/// Returns a short human explanation for a status category
pub fn explain(category: StatusCategory) -> &'static str {
    match category {
        StatusCategory::NotFound => "(unreachable)",
        StatusCategory::ServerError => "(server error)",
        StatusCategory::Forbidden => "(protected)",
        StatusCategory::BadRequest => "(bad request)",
        StatusCategory::Unavailable => "(service unavailable)",
        StatusCategory::Other(_) => "(unknown error)",
    }
}
