use std::fmt;

use serde::{Deserialize, Serialize};

use crate::color::BackgroundColor;
use crate::error::{Error, Result};

/// Output image format, carried across the host boundary as an integer code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum CompressFormat {
    /// Code `0`. Always opaque.
    #[default]
    Jpeg,
    /// Code `1`. Lossless.
    Png,
}

impl CompressFormat {
    /// The file extension conventionally used for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            CompressFormat::Jpeg => "jpg",
            CompressFormat::Png => "png",
        }
    }
}

impl TryFrom<u8> for CompressFormat {
    type Error = Error;

    fn try_from(code: u8) -> Result<Self> {
        match code {
            0 => Ok(CompressFormat::Jpeg),
            1 => Ok(CompressFormat::Png),
            other => Err(Error::InvalidRequest(format!(
                "unknown compress format code {other}"
            ))),
        }
    }
}

impl From<CompressFormat> for u8 {
    fn from(format: CompressFormat) -> Self {
        match format {
            CompressFormat::Jpeg => 0,
            CompressFormat::Png => 1,
        }
    }
}

impl fmt::Display for CompressFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompressFormat::Jpeg => f.write_str("JPEG"),
            CompressFormat::Png => f.write_str("PNG"),
        }
    }
}

/// A rectangle in output pixel space, origin top-left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropRect {
    /// Left edge.
    pub x: u32,
    /// Top edge.
    pub y: u32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl CropRect {
    /// Create a new crop rectangle.
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Whether the rectangle is non-empty and lies entirely inside a
    /// `width`x`height` canvas.
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        if self.width == 0 || self.height == 0 {
            return false;
        }

        let right = self.x.checked_add(self.width);
        let bottom = self.y.checked_add(self.height);
        matches!((right, bottom), (Some(r), Some(b)) if r <= width && b <= height)
    }
}

impl fmt::Display for CropRect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}x{}+{}+{}",
            self.width, self.height, self.x, self.y
        )
    }
}

/// How the page is positioned on, or cut out of, the canvas. Offsetting and
/// cropping are mutually exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Adjustment {
    /// Draw the page with its top-left corner at the canvas origin.
    #[default]
    None,
    /// Move page point `(x, y)` (in unscaled page units, measured from the
    /// top-left) to the canvas origin before rasterizing.
    Offset {
        /// Horizontal offset.
        x: f64,
        /// Vertical offset.
        y: f64,
    },
    /// Cut this rectangle out of the finished canvas.
    Crop(CropRect),
}

/// A single render call's parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderRequest {
    /// Canvas width before scaling.
    pub width: f64,
    /// Canvas height before scaling.
    pub height: f64,
    /// Multiplier applied to the canvas and the page contents.
    pub scale: f64,
    /// Offset or crop.
    pub adjustment: Adjustment,
    /// Output format.
    pub format: CompressFormat,
    /// Color painted behind the page.
    pub background: BackgroundColor,
}

impl RenderRequest {
    /// A request for a `width`x`height` JPEG at scale 1 on white.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            scale: 1.0,
            adjustment: Adjustment::None,
            format: CompressFormat::default(),
            background: BackgroundColor::default(),
        }
    }

    /// Set the scale factor.
    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    /// Offset the page before rasterizing. Replaces any crop.
    pub fn with_offset(mut self, x: f64, y: f64) -> Self {
        self.adjustment = Adjustment::Offset { x, y };
        self
    }

    /// Crop the finished canvas. Replaces any offset.
    pub fn with_crop(mut self, crop: CropRect) -> Self {
        self.adjustment = Adjustment::Crop(crop);
        self
    }

    /// Set the output format.
    pub fn with_format(mut self, format: CompressFormat) -> Self {
        self.format = format;
        self
    }

    /// Set the background color.
    pub fn with_background(mut self, background: BackgroundColor) -> Self {
        self.background = background;
        self
    }

    /// The pixel size of the canvas, `round(width * scale)` by
    /// `round(height * scale)`.
    pub fn canvas_size(&self) -> Result<(u32, u32)> {
        for (name, value) in [
            ("width", self.width),
            ("height", self.height),
            ("scale", self.scale),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(Error::InvalidRequest(format!(
                    "{name} must be a positive number, got {value}"
                )));
            }
        }

        let width = (self.width * self.scale).round();
        let height = (self.height * self.scale).round();
        if width < 1.0 || height < 1.0 || width > u32::MAX as f64 || height > u32::MAX as f64 {
            return Err(Error::InvalidRequest(format!(
                "canvas of {width}x{height} pixels is not representable"
            )));
        }

        Ok((width as u32, height as u32))
    }
}

/// The flat parameter record a host layer sends for a render call.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderParams {
    /// Canvas width before scaling.
    pub width: f64,
    /// Canvas height before scaling.
    pub height: f64,
    /// Scale factor, 1 when absent.
    #[serde(default)]
    pub scale: Option<f64>,
    /// Horizontal offset.
    #[serde(default)]
    pub x: Option<f64>,
    /// Vertical offset.
    #[serde(default)]
    pub y: Option<f64>,
    /// Post-render crop.
    #[serde(default)]
    pub crop: Option<CropRect>,
    /// Output format code, `0` (JPEG) when absent.
    #[serde(default)]
    pub format: CompressFormat,
    /// Background color string, white when absent.
    #[serde(default)]
    pub background_color: Option<BackgroundColor>,
}

impl TryFrom<RenderParams> for RenderRequest {
    type Error = Error;

    fn try_from(params: RenderParams) -> Result<Self> {
        let adjustment = match (params.x, params.y, params.crop) {
            (None, None, None) => Adjustment::None,
            (None, None, Some(crop)) => Adjustment::Crop(crop),
            (x, y, None) => Adjustment::Offset {
                x: x.unwrap_or(0.0),
                y: y.unwrap_or(0.0),
            },
            (_, _, Some(_)) => {
                return Err(Error::InvalidRequest(
                    "an offset and a crop cannot be combined".to_string(),
                ))
            }
        };

        let request = RenderRequest {
            width: params.width,
            height: params.height,
            scale: params.scale.unwrap_or(1.0),
            adjustment,
            format: params.format,
            background: params.background_color.unwrap_or_default(),
        };
        request.canvas_size()?;

        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canvas_size_applies_scale() {
        let request = RenderRequest::new(100.0, 200.0).with_scale(2.0);
        assert_eq!(request.canvas_size().unwrap(), (200, 400));

        let request = RenderRequest::new(10.4, 10.6);
        assert_eq!(request.canvas_size().unwrap(), (10, 11));
    }

    #[test]
    fn canvas_size_rejects_degenerate_input() {
        for request in [
            RenderRequest::new(0.0, 10.0),
            RenderRequest::new(10.0, -1.0),
            RenderRequest::new(f64::NAN, 10.0),
            RenderRequest::new(10.0, 10.0).with_scale(0.0),
            RenderRequest::new(10.0, 10.0).with_scale(f64::INFINITY),
            RenderRequest::new(0.2, 10.0),
        ] {
            assert!(matches!(
                request.canvas_size(),
                Err(Error::InvalidRequest(_))
            ));
        }
    }

    #[test]
    fn crop_containment() {
        assert!(CropRect::new(0, 0, 100, 50).fits_within(100, 50));
        assert!(CropRect::new(10, 10, 20, 20).fits_within(100, 50));
        assert!(!CropRect::new(90, 0, 20, 10).fits_within(100, 50));
        assert!(!CropRect::new(0, 45, 10, 10).fits_within(100, 50));
        assert!(!CropRect::new(200, 200, 1, 1).fits_within(100, 50));
        assert!(!CropRect::new(0, 0, 0, 10).fits_within(100, 50));
        assert!(!CropRect::new(u32::MAX, 0, 2, 1).fits_within(u32::MAX, 1));
    }

    #[test]
    fn builder_keeps_adjustments_exclusive() {
        let request = RenderRequest::new(10.0, 10.0)
            .with_offset(1.0, 2.0)
            .with_crop(CropRect::new(0, 0, 5, 5));
        assert_eq!(request.adjustment, Adjustment::Crop(CropRect::new(0, 0, 5, 5)));

        let request = request.with_offset(3.0, 4.0);
        assert_eq!(request.adjustment, Adjustment::Offset { x: 3.0, y: 4.0 });
    }

    #[test]
    fn format_codes() {
        assert_eq!(CompressFormat::try_from(0).unwrap(), CompressFormat::Jpeg);
        assert_eq!(CompressFormat::try_from(1).unwrap(), CompressFormat::Png);
        assert!(CompressFormat::try_from(2).is_err());
        assert_eq!(u8::from(CompressFormat::Png), 1);
    }

    #[test]
    fn params_pick_the_adjustment() {
        let params = RenderParams {
            width: 10.0,
            height: 10.0,
            y: Some(5.0),
            ..Default::default()
        };
        let request = RenderRequest::try_from(params).unwrap();
        assert_eq!(request.adjustment, Adjustment::Offset { x: 0.0, y: 5.0 });
        assert_eq!(request.scale, 1.0);

        let params = RenderParams {
            width: 10.0,
            height: 10.0,
            x: Some(1.0),
            crop: Some(CropRect::new(0, 0, 1, 1)),
            ..Default::default()
        };
        assert!(matches!(
            RenderRequest::try_from(params),
            Err(Error::InvalidRequest(_))
        ));
    }
}
