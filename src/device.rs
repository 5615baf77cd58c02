//! A tiny-skia backend for the hayro interpreter.
//!
//! The interpreter hands over paths, glyphs and images already placed in
//! device space by the transform the caller started it with, so the device
//! only ever touches the pixels of the canvas it was created with.

use std::collections::HashMap;

use hayro_interpret::color::AlphaColor;
use hayro_interpret::font::Glyph;
use hayro_interpret::hayro_syntax::object::ObjectIdentifier;
use hayro_interpret::pattern::{Pattern as PdfPattern, ShadingPattern, TilingPattern};
use hayro_interpret::{
    ClipPath, Device, FillRule, GlyphDrawMode, Image, LumaData, MaskType, Paint, PathDrawMode,
    RgbData, SoftMask, StrokeProps,
};
use image::imageops::{self, FilterType};
use image::{GrayImage, RgbaImage};
use kurbo::{Affine, BezPath, Cap, Join, PathEl, Point, Rect, Shape};
use tiny_skia::{
    FilterQuality, IntSize, LineCap, LineJoin, Mask, Path, PathBuilder, Pattern, Pixmap,
    PixmapPaint, PremultipliedColorU8, SpreadMode, Stroke, StrokeDash, Transform,
};

/// Tiles of a tiling pattern are never rendered larger than this per side.
const MAX_TILE_SIZE: f32 = 3000.0;

/// What a path gets filled with, resolved to something tiny-skia can shade.
enum Brush {
    Solid(tiny_skia::Color),
    Image {
        pixmap: Pixmap,
        transform: Transform,
        spread_mode: SpreadMode,
        quality: FilterQuality,
    },
}

impl Brush {
    fn paint(&self) -> tiny_skia::Paint<'_> {
        let mut paint = tiny_skia::Paint::default();
        paint.anti_alias = true;
        match self {
            Brush::Solid(color) => paint.set_color(*color),
            Brush::Image {
                pixmap,
                transform,
                spread_mode,
                quality,
            } => {
                paint.shader = Pattern::new(pixmap.as_ref(), *spread_mode, *quality, 1.0, *transform)
            }
        }
        paint
    }
}

/// An open transparency group.
struct Group {
    pixmap: Pixmap,
    opacity: f32,
    mask: Option<Mask>,
}

/// Draws interpreter output onto a fixed-size pixmap.
pub(crate) struct CanvasDevice {
    canvas: Pixmap,
    groups: Vec<Group>,
    blank: Mask,
    clips: Vec<Mask>,
    soft_mask: Option<Mask>,
    /// The clip and the soft mask combined; what every draw is masked by.
    draw_mask: Option<Mask>,
    soft_masks: HashMap<ObjectIdentifier, Mask>,
    inside_pattern: bool,
}

impl CanvasDevice {
    /// Draw on top of `canvas`.
    pub(crate) fn new(canvas: Pixmap) -> Self {
        let mut blank = Mask::from_pixmap(canvas.as_ref(), tiny_skia::MaskType::Alpha);
        blank.clear();

        Self {
            canvas,
            groups: Vec::new(),
            blank,
            clips: Vec::new(),
            soft_mask: None,
            draw_mask: None,
            soft_masks: HashMap::new(),
            inside_pattern: false,
        }
    }

    fn with_size(width: u32, height: u32) -> Option<Self> {
        Pixmap::new(width, height).map(Self::new)
    }

    /// Fill `path` (device space) with opaque white under the current clip.
    pub(crate) fn fill_paper(&mut self, path: &BezPath) {
        if let Some(path) = to_skia_path(path) {
            self.fill_skia_path(
                &path,
                &Brush::Solid(tiny_skia::Color::WHITE),
                tiny_skia::FillRule::Winding,
                Transform::identity(),
                None,
            );
        }
    }

    /// Flatten any groups left open and hand back the canvas.
    pub(crate) fn finish(mut self) -> Pixmap {
        while !self.groups.is_empty() {
            self.pop_group();
        }
        self.canvas
    }

    /// The pixmap draws currently go to, and the mask they go through.
    fn surface(&mut self) -> (&mut Pixmap, Option<&Mask>) {
        let pixmap = match self.groups.last_mut() {
            Some(group) => &mut group.pixmap,
            None => &mut self.canvas,
        };
        (pixmap, self.draw_mask.as_ref())
    }

    fn transparent_copy(&self) -> Pixmap {
        let mut pixmap = self.canvas.clone();
        pixmap.fill(tiny_skia::Color::TRANSPARENT);
        pixmap
    }

    fn width(&self) -> u32 {
        self.blank.width()
    }

    fn height(&self) -> u32 {
        self.blank.height()
    }

    fn update_draw_mask(&mut self) {
        self.draw_mask = match (self.clips.last(), &self.soft_mask) {
            (None, None) => None,
            (Some(clip), None) => Some(clip.clone()),
            (None, Some(soft)) => Some(soft.clone()),
            (Some(clip), Some(soft)) => {
                let mut mask = clip.clone();
                multiply_mask(&mut mask, soft);
                Some(mask)
            }
        };
    }

    fn fill_skia_path(
        &mut self,
        path: &Path,
        brush: &Brush,
        fill_rule: tiny_skia::FillRule,
        transform: Transform,
        mask: Option<&Mask>,
    ) {
        let paint = brush.paint();
        let (pixmap, draw_mask) = self.surface();
        pixmap.fill_path(path, &paint, fill_rule, transform, mask.or(draw_mask));
    }

    fn fill_path(&mut self, path: &BezPath, transform: Affine, paint: &Paint<'_>, rule: FillRule) {
        let Some(skia_path) = to_skia_path(path) else {
            return;
        };
        let bounds = transform.transform_rect_bbox(path.bounding_box());
        let Some(brush) = self.brush(paint, bounds, false) else {
            return;
        };

        self.fill_skia_path(
            &skia_path,
            &brush,
            to_skia_fill_rule(rule),
            to_skia_transform(transform),
            None,
        );
    }

    fn stroke_path(
        &mut self,
        path: &BezPath,
        transform: Affine,
        paint: &Paint<'_>,
        props: &StrokeProps,
    ) {
        let Some(skia_path) = to_skia_path(path) else {
            return;
        };

        // At least one device pixel wide, except inside pattern tiles.
        let mut width = props.line_width.max(0.01);
        let (min_scale, max_scale) = axis_scales(&transform);
        if !self.inside_pattern && min_scale > 0.0 && width * min_scale < 1.0 {
            width = 1.0 / min_scale;
        }

        let pad = (width * max_scale) as f64;
        let bounds = transform
            .transform_rect_bbox(path.bounding_box())
            .inflate(pad, pad);
        let Some(brush) = self.brush(paint, bounds, true) else {
            return;
        };

        let stroke = Stroke {
            width,
            miter_limit: props.miter_limit,
            line_cap: to_skia_line_cap(props.line_cap),
            line_join: to_skia_line_join(props.line_join),
            dash: to_skia_dash(props),
        };

        let skia_paint = brush.paint();
        let (pixmap, mask) = self.surface();
        pixmap.stroke_path(
            &skia_path,
            &skia_paint,
            &stroke,
            to_skia_transform(transform),
            mask,
        );
    }

    /// Resolve `paint` for a draw covering `bounds` (device space).
    fn brush(&self, paint: &Paint<'_>, bounds: Rect, is_stroke: bool) -> Option<Brush> {
        match paint {
            Paint::Color(color) => Some(Brush::Solid(to_skia_color(color.to_rgba()))),
            Paint::Pattern(pattern) => match pattern.as_ref() {
                PdfPattern::Shading(shading) => self.shading_brush(shading, bounds),
                PdfPattern::Tiling(tiling) => tiling_brush(tiling, is_stroke),
            },
        }
    }

    /// Sample the shading once per device pixel inside `bounds`.
    fn shading_brush(&self, shading: &ShadingPattern, bounds: Rect) -> Option<Brush> {
        let canvas = Rect::new(0.0, 0.0, self.width() as f64, self.height() as f64);
        let area = bounds.intersect(canvas).expand();
        if area.width() < 1.0 || area.height() < 1.0 {
            return None;
        }

        let (x0, y0) = (area.x0 as u32, area.y0 as u32);
        let (width, height) = (area.width() as u32, area.height() as u32);
        let mut pixmap = Pixmap::new(width, height)?;

        let encoded = shading.encode();
        for (i, pixel) in pixmap.pixels_mut().iter_mut().enumerate() {
            let x = x0 as f64 + (i as u32 % width) as f64 + 0.5;
            let y = y0 as f64 + (i as u32 / width) as f64 + 0.5;
            let [r, g, b, a] = encoded.sample(encoded.base_transform * Point::new(x, y));
            *pixel = premultiplied(r, g, b, a);
        }

        Some(Brush::Image {
            pixmap,
            transform: Transform::from_translate(x0 as f32, y0 as f32),
            spread_mode: SpreadMode::Pad,
            quality: FilterQuality::Nearest,
        })
    }

    fn draw_raster(&mut self, rgb: RgbData, alpha: Option<LumaData>, transform: Affine) {
        let Some((pixmap, transform, quality)) = image_pixmap(rgb, alpha, transform) else {
            return;
        };

        let paint = PixmapPaint {
            quality,
            ..PixmapPaint::default()
        };
        let (target, mask) = self.surface();
        target.draw_pixmap(
            0,
            0,
            pixmap.as_ref(),
            &paint,
            to_skia_transform(transform),
            mask,
        );
    }

    /// Fill the image rectangle with `paint` wherever the stencil is set.
    fn draw_stencil(&mut self, stencil: LumaData, paint: &Paint<'_>, transform: Affine) {
        let image_rect = Rect::new(0.0, 0.0, stencil.width as f64, stencil.height as f64);
        let Some(coverage) = stencil_pixmap(&stencil) else {
            return;
        };

        let mut placed = self.transparent_copy();
        placed.draw_pixmap(
            0,
            0,
            coverage.as_ref(),
            &PixmapPaint::default(),
            to_skia_transform(transform),
            None,
        );
        let mut mask = Mask::from_pixmap(placed.as_ref(), tiny_skia::MaskType::Alpha);
        if let Some(draw_mask) = &self.draw_mask {
            multiply_mask(&mut mask, draw_mask);
        }

        let bounds = transform.transform_rect_bbox(image_rect);
        let Some(brush) = self.brush(paint, bounds, false) else {
            return;
        };
        let Some(rect) = to_skia_path(&(transform * image_rect.to_path(0.1))) else {
            return;
        };
        self.fill_skia_path(
            &rect,
            &brush,
            tiny_skia::FillRule::Winding,
            Transform::identity(),
            Some(&mask),
        );
    }

    /// Render a soft mask at canvas size. Results are reused per mask object.
    fn render_soft_mask(&mut self, mask: &SoftMask<'_>) -> Option<Mask> {
        if let Some(rendered) = self.soft_masks.get(&mask.id()) {
            return Some(rendered.clone());
        }

        let mut device = CanvasDevice::with_size(self.width(), self.height())?;
        let background = mask.background_color().to_rgba();
        if background.to_rgba8() != AlphaColor::BLACK.to_rgba8() {
            device.canvas.fill(to_skia_color(background));
        }
        mask.interpret(&mut device);
        let pixmap = device.finish();

        let mask_type = match mask.mask_type() {
            MaskType::Luminosity => tiny_skia::MaskType::Luminance,
            MaskType::Alpha => tiny_skia::MaskType::Alpha,
        };
        let mut rendered = Mask::from_pixmap(pixmap.as_ref(), mask_type);
        if let Some(transfer) = mask.transfer_function() {
            for value in rendered.data_mut() {
                let mapped = transfer.apply(*value as f32 / 255.0).clamp(0.0, 1.0);
                *value = (mapped * 255.0).round() as u8;
            }
        }

        self.soft_masks.insert(mask.id(), rendered.clone());
        Some(rendered)
    }

    fn pop_group(&mut self) {
        let Some(group) = self.groups.pop() else {
            return;
        };

        let paint = PixmapPaint {
            opacity: group.opacity,
            ..PixmapPaint::default()
        };
        let parent = match self.groups.last_mut() {
            Some(parent) => &mut parent.pixmap,
            None => &mut self.canvas,
        };
        parent.draw_pixmap(
            0,
            0,
            group.pixmap.as_ref(),
            &paint,
            Transform::identity(),
            group.mask.as_ref(),
        );
    }
}

impl<'a> Device<'a> for CanvasDevice {
    fn set_soft_mask(&mut self, mask: Option<SoftMask<'a>>) {
        let rendered = mask.and_then(|mask| self.render_soft_mask(&mask));
        self.soft_mask = rendered;
        self.update_draw_mask();
    }

    fn draw_path(
        &mut self,
        path: &BezPath,
        transform: Affine,
        paint: &Paint<'a>,
        draw_mode: &PathDrawMode,
    ) {
        match draw_mode {
            PathDrawMode::Fill(rule) => self.fill_path(path, transform, paint, *rule),
            PathDrawMode::Stroke(props) => self.stroke_path(path, transform, paint, props),
        }
    }

    fn push_clip_path(&mut self, clip_path: &ClipPath) {
        let path = to_skia_path(&clip_path.path);
        let rule = to_skia_fill_rule(clip_path.fill);

        let mask = match (self.clips.last(), path) {
            (None, Some(path)) => {
                let mut mask = self.blank.clone();
                mask.fill_path(&path, rule, true, Transform::identity());
                mask
            }
            (Some(current), Some(path)) => {
                let mut mask = current.clone();
                mask.intersect_path(&path, rule, true, Transform::identity());
                mask
            }
            // An empty clip path hides everything.
            (_, None) => self.blank.clone(),
        };

        self.clips.push(mask);
        self.update_draw_mask();
    }

    fn push_transparency_group(&mut self, opacity: f32, mask: Option<SoftMask<'a>>) {
        let mask = mask.and_then(|mask| self.render_soft_mask(&mask));
        let pixmap = self.transparent_copy();

        self.groups.push(Group {
            pixmap,
            opacity,
            mask,
        });
    }

    fn draw_glyph(
        &mut self,
        glyph: &Glyph<'a>,
        transform: Affine,
        glyph_transform: Affine,
        paint: &Paint<'a>,
        draw_mode: &GlyphDrawMode,
    ) {
        match glyph {
            Glyph::Outline(outline) => match draw_mode {
                GlyphDrawMode::Fill => self.fill_path(
                    &outline.outline(),
                    transform * glyph_transform,
                    paint,
                    FillRule::NonZero,
                ),
                GlyphDrawMode::Stroke(props) => self.stroke_path(
                    &(glyph_transform * outline.outline()),
                    transform,
                    paint,
                    props,
                ),
            },
            Glyph::Type3(shape) => shape.interpret(self, transform, glyph_transform, paint),
        }
    }

    fn draw_image(&mut self, image: Image<'a, '_>, transform: Affine) {
        match image {
            Image::Stencil(stencil) => {
                stencil.with_stencil(|luma, paint| self.draw_stencil(luma, paint, transform))
            }
            Image::Raster(raster) => {
                raster.with_rgba(|rgb, alpha| self.draw_raster(rgb, alpha, transform))
            }
        }
    }

    fn pop_clip_path(&mut self) {
        self.clips.pop();
        self.update_draw_mask();
    }

    fn pop_transparency_group(&mut self) {
        self.pop_group();
    }
}

/// Render one tile of the pattern and repeat it across the fill.
fn tiling_brush(tiling: &TilingPattern<'_>, is_stroke: bool) -> Option<Brush> {
    let bbox = tiling.bbox;
    if bbox.width() <= 0.0 || bbox.height() <= 0.0 {
        return None;
    }

    let (x_scale, y_scale) = {
        let c = tiling.matrix.as_coeffs();
        let x = (c[0] * c[0] + c[1] * c[1]).sqrt() as f32;
        let y = (c[2] * c[2] + c[3] * c[3]).sqrt() as f32;
        (
            x.max(1.0 / bbox.width() as f32)
                .min(MAX_TILE_SIZE / bbox.width() as f32),
            y.max(1.0 / bbox.height() as f32)
                .min(MAX_TILE_SIZE / bbox.height() as f32),
        )
    };

    let x_step = x_scale * tiling.x_step;
    let y_step = y_scale * tiling.y_step;
    let tile_width = x_step.abs().round() as u32;
    let tile_height = y_step.abs().round() as u32;

    let mut device = CanvasDevice::with_size(tile_width, tile_height)?;
    device.inside_pattern = true;

    let mut initial_transform = Affine::scale_non_uniform(x_scale as f64, y_scale as f64)
        * Affine::translate((-bbox.x0, -bbox.y0));
    tiling.interpret(&mut device, initial_transform, is_stroke)?;
    let tile = device.finish();

    if x_step < 0.0 {
        initial_transform *= Affine::new([-1.0, 0.0, 0.0, 1.0, bbox.width() * x_scale as f64, 0.0]);
    }
    if y_step < 0.0 {
        initial_transform *=
            Affine::new([1.0, 0.0, 0.0, -1.0, 0.0, bbox.height() * y_scale as f64]);
    }

    Some(Brush::Image {
        pixmap: tile,
        transform: to_skia_transform(tiling.matrix * initial_transform.inverse()),
        spread_mode: SpreadMode::Repeat,
        quality: FilterQuality::Bilinear,
    })
}

/// Build a premultiplied pixmap from decoded image data. Images drawn smaller
/// than their pixel size are resampled first; the returned transform accounts
/// for that.
fn image_pixmap(
    rgb: RgbData,
    alpha: Option<LumaData>,
    transform: Affine,
) -> Option<(Pixmap, Affine, FilterQuality)> {
    let (width, height) = (rgb.width, rgb.height);
    if width == 0 || height == 0 {
        return None;
    }
    let quality = if rgb.interpolate {
        FilterQuality::Bicubic
    } else {
        FilterQuality::Nearest
    };

    let alpha = match alpha {
        Some(alpha) if alpha.width == width && alpha.height == height => alpha.data,
        Some(alpha) => {
            let mask = GrayImage::from_raw(alpha.width, alpha.height, alpha.data)?;
            imageops::resize(&mask, width, height, FilterType::CatmullRom).into_raw()
        }
        None => vec![255; width as usize * height as usize],
    };

    let rgba: Vec<u8> = rgb
        .data
        .chunks_exact(3)
        .zip(alpha)
        .flat_map(|(c, a)| [c[0], c[1], c[2], a])
        .collect();
    let mut image = RgbaImage::from_raw(width, height, rgba)?;

    let (x_scale, y_scale) = axis_scales(&transform);
    let mut transform = transform;
    if x_scale < 1.0 || y_scale < 1.0 {
        let new_width = (width as f32 * x_scale.min(1.0)).ceil().max(1.0) as u32;
        let new_height = (height as f32 * y_scale.min(1.0)).ceil().max(1.0) as u32;
        image = imageops::resize(&image, new_width, new_height, FilterType::CatmullRom);
        transform *= Affine::scale_non_uniform(
            width as f64 / new_width as f64,
            height as f64 / new_height as f64,
        );
    }

    let size = IntSize::from_wh(image.width(), image.height())?;
    let mut data = image.into_raw();
    for pixel in data.chunks_exact_mut(4) {
        let a = pixel[3] as u16;
        for c in &mut pixel[..3] {
            *c = ((*c as u16 * a + 127) / 255) as u8;
        }
    }

    Some((Pixmap::from_vec(data, size)?, transform, quality))
}

/// The stencil as an alpha-only pixmap.
fn stencil_pixmap(stencil: &LumaData) -> Option<Pixmap> {
    let mut pixmap = Pixmap::new(stencil.width, stencil.height)?;
    for (pixel, coverage) in pixmap.pixels_mut().iter_mut().zip(&stencil.data) {
        *pixel = PremultipliedColorU8::from_rgba(0, 0, 0, *coverage)
            .unwrap_or(PremultipliedColorU8::TRANSPARENT);
    }
    Some(pixmap)
}

fn multiply_mask(mask: &mut Mask, other: &Mask) {
    for (a, b) in mask.data_mut().iter_mut().zip(other.data()) {
        *a = ((*a as u16 * *b as u16 + 127) / 255) as u8;
    }
}

fn premultiplied(r: f32, g: f32, b: f32, a: f32) -> PremultipliedColorU8 {
    let a = a.clamp(0.0, 1.0);
    let channel = |c: f32| (c.clamp(0.0, 1.0) * a * 255.0).round() as u8;
    PremultipliedColorU8::from_rgba(channel(r), channel(g), channel(b), (a * 255.0).round() as u8)
        .unwrap_or(PremultipliedColorU8::TRANSPARENT)
}

/// Lengths of the unit x and y vectors under `transform`, as (min, max).
fn axis_scales(transform: &Affine) -> (f32, f32) {
    let c = transform.as_coeffs();
    let x = (c[0] * c[0] + c[1] * c[1]).sqrt() as f32;
    let y = (c[2] * c[2] + c[3] * c[3]).sqrt() as f32;
    (x.min(y), x.max(y))
}

fn to_skia_path(path: &BezPath) -> Option<Path> {
    let mut builder = PathBuilder::new();
    for element in path.elements() {
        match *element {
            PathEl::MoveTo(p) => builder.move_to(p.x as f32, p.y as f32),
            PathEl::LineTo(p) => builder.line_to(p.x as f32, p.y as f32),
            PathEl::QuadTo(p1, p) => {
                builder.quad_to(p1.x as f32, p1.y as f32, p.x as f32, p.y as f32)
            }
            PathEl::CurveTo(p1, p2, p) => builder.cubic_to(
                p1.x as f32,
                p1.y as f32,
                p2.x as f32,
                p2.y as f32,
                p.x as f32,
                p.y as f32,
            ),
            PathEl::ClosePath => builder.close(),
        }
    }
    builder.finish()
}

pub(crate) fn to_skia_transform(transform: Affine) -> Transform {
    let [a, b, c, d, e, f] = transform.as_coeffs();
    Transform::from_row(a as f32, b as f32, c as f32, d as f32, e as f32, f as f32)
}

fn to_skia_color(color: AlphaColor) -> tiny_skia::Color {
    let [r, g, b, a] = color.components().map(|c| c.clamp(0.0, 1.0));
    tiny_skia::Color::from_rgba(r, g, b, a).unwrap_or(tiny_skia::Color::TRANSPARENT)
}

fn to_skia_fill_rule(rule: FillRule) -> tiny_skia::FillRule {
    match rule {
        FillRule::NonZero => tiny_skia::FillRule::Winding,
        FillRule::EvenOdd => tiny_skia::FillRule::EvenOdd,
    }
}

fn to_skia_line_cap(cap: Cap) -> LineCap {
    match cap {
        Cap::Butt => LineCap::Butt,
        Cap::Round => LineCap::Round,
        Cap::Square => LineCap::Square,
    }
}

fn to_skia_line_join(join: Join) -> LineJoin {
    match join {
        Join::Miter => LineJoin::Miter,
        Join::Round => LineJoin::Round,
        Join::Bevel => LineJoin::Bevel,
    }
}

fn to_skia_dash(props: &StrokeProps) -> Option<StrokeDash> {
    if props.dash_array.is_empty() {
        return None;
    }
    let mut array = props.dash_array.to_vec();
    // An odd-length pattern repeats to pair every dash with a gap.
    if array.len() % 2 == 1 {
        array.extend_from_within(..);
    }
    StrokeDash::new(array, props.dash_offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device(width: u32, height: u32) -> CanvasDevice {
        let mut canvas = Pixmap::new(width, height).unwrap();
        canvas.fill(tiny_skia::Color::WHITE);
        CanvasDevice::new(canvas)
    }

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> BezPath {
        Rect::new(x0, y0, x1, y1).to_path(0.1)
    }

    fn pixel(pixmap: &Pixmap, x: u32, y: u32) -> [u8; 4] {
        let p = pixmap.pixel(x, y).unwrap();
        [p.red(), p.green(), p.blue(), p.alpha()]
    }

    #[test]
    fn clip_limits_paper() {
        let mut device = device(20, 10);
        device.canvas.fill(tiny_skia::Color::BLACK);
        device.push_clip_path(&ClipPath {
            path: rect(0.0, 0.0, 10.0, 10.0),
            fill: FillRule::NonZero,
        });
        device.fill_paper(&rect(0.0, 0.0, 20.0, 10.0));
        device.pop_clip_path();

        let canvas = device.finish();
        assert_eq!(pixel(&canvas, 5, 5), [255, 255, 255, 255]);
        assert_eq!(pixel(&canvas, 15, 5), [0, 0, 0, 255]);
    }

    #[test]
    fn nested_clips_intersect() {
        let mut device = device(30, 10);
        device.push_clip_path(&ClipPath {
            path: rect(0.0, 0.0, 20.0, 10.0),
            fill: FillRule::NonZero,
        });
        device.push_clip_path(&ClipPath {
            path: rect(10.0, 0.0, 30.0, 10.0),
            fill: FillRule::NonZero,
        });
        let black = Brush::Solid(tiny_skia::Color::BLACK);
        let everything = to_skia_path(&rect(0.0, 0.0, 30.0, 10.0)).unwrap();
        device.fill_skia_path(
            &everything,
            &black,
            tiny_skia::FillRule::Winding,
            Transform::identity(),
            None,
        );

        let canvas = device.finish();
        assert_eq!(pixel(&canvas, 5, 5), [255, 255, 255, 255]);
        assert_eq!(pixel(&canvas, 15, 5), [0, 0, 0, 255]);
        assert_eq!(pixel(&canvas, 25, 5), [255, 255, 255, 255]);
    }

    #[test]
    fn transparency_group_is_composited_with_opacity() {
        let mut device = device(10, 10);
        Device::push_transparency_group(&mut device, 0.5, None);
        let black = Brush::Solid(tiny_skia::Color::BLACK);
        let everything = to_skia_path(&rect(0.0, 0.0, 10.0, 10.0)).unwrap();
        device.fill_skia_path(
            &everything,
            &black,
            tiny_skia::FillRule::Winding,
            Transform::identity(),
            None,
        );
        Device::pop_transparency_group(&mut device);

        let canvas = device.finish();
        let [r, g, b, a] = pixel(&canvas, 5, 5);
        assert_eq!(a, 255);
        assert!((120..=135).contains(&r), "{r}");
        assert_eq!((r, g), (g, b));
    }

    #[test]
    fn image_pixmap_premultiplies_and_resizes_alpha() {
        let rgb = RgbData {
            data: vec![255, 0, 0, 0, 255, 0],
            width: 2,
            height: 1,
            interpolate: false,
        };
        let alpha = LumaData {
            data: vec![128],
            width: 1,
            height: 1,
            interpolate: false,
        };

        let (pixmap, transform, quality) =
            image_pixmap(rgb, Some(alpha), Affine::scale(10.0)).unwrap();
        assert_eq!((pixmap.width(), pixmap.height()), (2, 1));
        assert_eq!(transform, Affine::scale(10.0));
        assert_eq!(quality, FilterQuality::Nearest);
        assert_eq!(pixel(&pixmap, 0, 0), [128, 0, 0, 128]);
    }

    #[test]
    fn shrunken_images_are_resampled() {
        let rgb = RgbData {
            data: vec![0; 100 * 100 * 3],
            width: 100,
            height: 100,
            interpolate: true,
        };

        let (pixmap, transform, _) = image_pixmap(rgb, None, Affine::scale(0.1)).unwrap();
        assert_eq!((pixmap.width(), pixmap.height()), (10, 10));
        let mapped = transform * Point::new(10.0, 10.0);
        assert!((mapped.x - 10.0).abs() < 1e-9 && (mapped.y - 10.0).abs() < 1e-9);
    }

    #[test]
    fn odd_dash_arrays_are_doubled() {
        let props = StrokeProps {
            dash_array: [3.0].into_iter().collect(),
            ..StrokeProps::default()
        };
        assert!(to_skia_dash(&props).is_some());
    }

    #[test]
    fn masks_multiply() {
        let mut a = Mask::new(1, 1).unwrap();
        a.data_mut()[0] = 255;
        let mut b = Mask::new(1, 1).unwrap();
        b.data_mut()[0] = 128;
        multiply_mask(&mut a, &b);
        assert_eq!(a.data()[0], 128);
    }
}
