use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors returned while generating a QR code image.
#[derive(Error, Debug)]
pub enum QrError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Failed to encode {stage} image")]
    Encoding {
        stage: &'static str,
        #[source]
        source: BoxError,
    },

    #[error("Failed to load logo from {location}")]
    ImageLoad {
        location: String,
        #[source]
        source: BoxError,
    },
}

impl QrError {
    pub(crate) fn encoding(stage: &'static str, source: impl Into<BoxError>) -> Self {
        QrError::Encoding {
            stage,
            source: source.into(),
        }
    }

    pub(crate) fn image_load(location: impl Into<String>, source: impl Into<BoxError>) -> Self {
        QrError::ImageLoad {
            location: location.into(),
            source: source.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, QrError>;

/// Errors returned by a [`crate::download::Downloader`].
#[derive(Error, Debug)]
pub enum DownloadError {
    #[error("Downloads are not supported in this environment")]
    Unsupported,

    #[error("Download environment unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid download data: {0}")]
    InvalidData(#[from] QrError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
