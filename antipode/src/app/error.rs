//! Application error types.

use std::fmt;

use crate::coord::CoordError;

/// Errors that can occur while starting the application.
#[derive(Debug)]
pub enum AppError {
    /// The initial coordinate is out of range.
    InvalidInitialCoordinate(CoordError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::InvalidInitialCoordinate(e) => {
                write!(f, "Invalid initial coordinate: {}", e)
            }
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::InvalidInitialCoordinate(e) => Some(e),
        }
    }
}

impl From<CoordError> for AppError {
    fn from(e: CoordError) -> Self {
        AppError::InvalidInitialCoordinate(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::InvalidInitialCoordinate(CoordError::InvalidCoordinate {
            lat: 91.0,
            lon: 0.0,
        });
        assert!(err.to_string().starts_with("Invalid initial coordinate"));
    }

    #[test]
    fn test_app_error_from_coord_error() {
        let coord_err = CoordError::InvalidCoordinate { lat: 91.0, lon: 0.0 };
        let app_err: AppError = coord_err.into();
        assert!(matches!(app_err, AppError::InvalidInitialCoordinate(_)));
        assert!(std::error::Error::source(&app_err).is_some());
    }
}
