// SPDX-License-Identifier: MPL-2.0
use thiserror::Error;

use crate::application::port::PredictError;
use crate::evaluation::EvaluationError;
use crate::media::colorize::ColorizeError;
use crate::media::model::LoadError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O Error: {0}")]
    Io(String),
    #[error("Config Error: {0}")]
    Config(String),
    #[error("Image Error: {0}")]
    Image(String),
    #[error("Model Error: {0}")]
    Load(#[from] LoadError),
    #[error("Colorization Error: {0}")]
    Colorize(#[from] ColorizeError),
    #[error("Evaluation Error: {0}")]
    Evaluation(#[from] EvaluationError),
    #[error("Server Error: {0}")]
    Server(String),
}

impl From<PredictError> for Error {
    fn from(err: PredictError) -> Self {
        Error::Colorize(ColorizeError::Predict(err))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

impl From<image_rs::ImageError> for Error {
    fn from(err: image_rs::ImageError) -> Self {
        Error::Image(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Error::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_formats_io_error() {
        let err = Error::Io("disk failure".to_string());
        assert_eq!(format!("{}", err), "I/O Error: disk failure");
    }

    #[test]
    fn from_io_error_produces_io_variant() {
        let io_error = std::io::Error::other("boom");
        let err: Error = io_error.into();
        match err {
            Error::Io(message) => assert!(message.contains("boom")),
            _ => panic!("expected Io variant"),
        }
    }

    #[test]
    fn config_error_formats_properly() {
        let err = Error::Config("bad field".into());
        assert_eq!(format!("{}", err), "Config Error: bad field");
    }

    #[test]
    fn count_mismatch_surfaces_through_evaluation_variant() {
        let err: Error = EvaluationError::CountMismatch {
            reference: 10,
            candidate: 11,
        }
        .into();
        let display = format!("{err}");
        assert!(display.starts_with("Evaluation Error:"));
        assert!(display.contains("10"));
        assert!(display.contains("11"));
    }

    #[test]
    fn predict_error_is_wrapped_as_colorize() {
        let err: Error = PredictError::InferenceFailed("oom".to_string()).into();
        assert!(matches!(err, Error::Colorize(ColorizeError::Predict(_))));
    }
}
