// Error types for the LPM router

use thiserror::Error;

/// Main error type for the application
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid IPv4 address: {0}")]
    InvalidAddress(String),

    #[error("Invalid subnet: {0}")]
    InvalidSubnet(String),

    #[error("Prefix length {0} is outside 0..=32")]
    InvalidPrefixLength(u32),

    #[error("Invalid interface: {0}")]
    InvalidInterface(String),

    #[error("Invalid count on line {line}: {value}")]
    InvalidCount { line: usize, value: String },

    #[error("Line {line}: {error}")]
    AtLine { line: usize, error: Box<AppError> },

    #[error("Unexpected end of input while reading {0}")]
    UnexpectedEof(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Attach the 1-based input line number to an error
    pub fn at_line(self, line: usize) -> Self {
        AppError::AtLine {
            line,
            error: Box::new(self),
        }
    }

    /// Convert error to user-friendly message
    pub fn user_message(&self) -> String {
        match self {
            AppError::InvalidAddress(_) => {
                "Addresses must be dotted quads such as 192.168.1.1.".to_string()
            }
            AppError::InvalidSubnet(_) => {
                "Subnets must be written as a.b.c.d/m, for example 10.0.0.0/8.".to_string()
            }
            AppError::InvalidPrefixLength(_) => {
                "The mask length after '/' must be between 0 and 32.".to_string()
            }
            AppError::InvalidInterface(_) => {
                "Interfaces must be integers between 0 and 255.".to_string()
            }
            AppError::InvalidCount { .. } => {
                "Expected a non-negative count of the lines that follow.".to_string()
            }
            AppError::AtLine { error, .. } => error.user_message(),
            AppError::UnexpectedEof(what) => {
                format!("Input ended early. The file is missing {}.", what)
            }
            AppError::Io(_) => "Failed to read input or write output.".to_string(),
            AppError::Toml(_) => {
                "Configuration error. Check your config file or command-line arguments.".to_string()
            }
            AppError::Serialization(_) => {
                "Data format error. This might be a bug, please report it.".to_string()
            }
        }
    }

    /// True for errors caused by the contents of the input rather than the environment
    pub fn is_input_error(&self) -> bool {
        match self {
            AppError::AtLine { error, .. } => error.is_input_error(),
            AppError::Io(_)
            | AppError::Toml(_)
            | AppError::Serialization(_) => false,
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_at_line_message() {
        let err = AppError::InvalidAddress("1.2.3".to_string()).at_line(7);
        assert_eq!(err.to_string(), "Line 7: Invalid IPv4 address: 1.2.3");
        assert!(err.user_message().contains("dotted quads"));
    }

    #[test]
    fn test_input_error_classification() {
        assert!(AppError::InvalidPrefixLength(33).is_input_error());
        assert!(AppError::UnexpectedEof("queries".to_string()).is_input_error());
        let toml_err = toml::from_str::<toml::Table>("= nope").unwrap_err();
        assert!(!AppError::from(toml_err).is_input_error());
        let io = std::io::Error::new(std::io::ErrorKind::Other, "boom");
        assert!(!AppError::from(io).at_line(1).is_input_error());
    }
}
