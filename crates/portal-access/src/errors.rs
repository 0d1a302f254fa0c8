use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AccessError {
    #[error("unknown navigation rule: {0}")]
    UnknownRule(String),
    #[error("unknown portal area: {0}")]
    UnknownArea(String),
    #[error("invalid navigation: {0}")]
    InvalidNavigation(String),
}

pub type AccessResult<T> = Result<T, AccessError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_variants() {
        let errors = vec![
            AccessError::UnknownRule("bad".to_string()),
            AccessError::UnknownArea("bad".to_string()),
            AccessError::InvalidNavigation("empty group".to_string()),
        ];

        for error in errors {
            let rendered = error.to_string();
            assert!(!rendered.is_empty());
        }
    }

    #[test]
    fn unknown_rule_names_the_key() {
        let err = AccessError::UnknownRule("manage_everything".to_string());
        assert_eq!(err.to_string(), "unknown navigation rule: manage_everything");
    }
}
