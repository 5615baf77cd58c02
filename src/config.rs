use std::env;

/// Environment variable overriding the JPEG quality.
pub const JPEG_QUALITY_VAR: &str = "PDF_PAGE_RENDER_JPEG_QUALITY";

/// Encoder settings shared by every render call of a [`PageRenderer`].
///
/// [`PageRenderer`]: crate::PageRenderer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderConfig {
    /// JPEG quality in `1..=100`.
    pub jpeg_quality: u8,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self { jpeg_quality: 100 }
    }
}

impl RenderConfig {
    /// Defaults, overridden by `PDF_PAGE_RENDER_JPEG_QUALITY` when it holds a
    /// number.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(value) = env::var(JPEG_QUALITY_VAR) {
            match value.trim().parse::<u8>() {
                Ok(quality) => config = config.with_jpeg_quality(quality),
                Err(e) => log::warn!(
                    "ignoring {}={:?}: {}",
                    JPEG_QUALITY_VAR,
                    value,
                    e
                ),
            }
        }

        config
    }

    /// Set the JPEG quality, clamped to `1..=100`.
    pub fn with_jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = quality.clamp(1, 100);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_is_clamped() {
        assert_eq!(RenderConfig::default().jpeg_quality, 100);
        assert_eq!(RenderConfig::default().with_jpeg_quality(0).jpeg_quality, 1);
        assert_eq!(RenderConfig::default().with_jpeg_quality(255).jpeg_quality, 100);
        assert_eq!(RenderConfig::default().with_jpeg_quality(80).jpeg_quality, 80);
    }
}
