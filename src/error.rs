use thiserror::Error;

/// Errors raised by setup-time calls. Per-frame counting never fails.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// The counting line cannot define a side test.
    #[error("invalid line geometry: {reason}")]
    InvalidGeometry { reason: String },
    /// A frame size of zero width or height.
    #[error("invalid frame size {width}x{height}")]
    InvalidFrameSize { width: u32, height: u32 },
    /// Quantization cell must be finite and positive.
    #[error("invalid cell size {0}")]
    InvalidCellSize(f64),
    #[error("unknown direction {0:?}, expected one of up, down, both")]
    UnknownDirection(String),
    #[error("font data could not be parsed")]
    InvalidFont,
}

impl Error {
    pub(crate) fn geometry(reason: impl Into<String>) -> Self {
        Error::InvalidGeometry {
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
