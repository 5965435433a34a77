use thiserror::Error;

/// Crate-wide result type alias.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Rejected configuration, caught before anything is constructed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Propagated terminal I/O errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_config_displays_message() {
        let err = Error::InvalidConfig("texts must not be empty".into());
        assert_eq!(
            err.to_string(),
            "invalid configuration: texts must not be empty"
        );
    }

    #[test]
    fn io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "boom");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
