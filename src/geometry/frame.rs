use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Frame dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}

impl FrameSize {
    #[inline]
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Fail with `InvalidFrameSize` when either dimension is zero.
    pub fn validate(self) -> Result<Self> {
        if self.is_empty() {
            return Err(Error::InvalidFrameSize {
                width: self.width,
                height: self.height,
            });
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_frame_rejected() {
        assert!(FrameSize::new(0, 480).validate().is_err());
        assert!(FrameSize::new(640, 0).is_empty());
        assert_eq!(
            FrameSize::new(640, 480).validate(),
            Ok(FrameSize::new(640, 480))
        );
    }
}
