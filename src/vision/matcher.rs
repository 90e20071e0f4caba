//! Template matching
//!
//! Scores a named template against a screen with zero-mean normalized
//! cross-correlation over the three color channels and reports the best
//! location. Window and template means are removed per channel, so a bright
//! screen does not match every bright template, and templates that differ
//! only in hue score apart.

use std::path::Path;

use image::{GrayImage, ImageBuffer, Luma, RgbImage};
use imageproc::integral_image::{integral_image, integral_squared_image, sum_image_pixels};
use imageproc::template_matching::{find_extremes, match_template, MatchTemplateMethod};

use super::templates::rescale;
use super::{MatchResult, TemplateCatalog, TemplateRole, VisionError};
use crate::android::Rect;

/// Summed squared deviation below which a window or template counts as flat
const FLAT_VARIANCE: f64 = 1.0;

/// Score of every template position on a screen
pub type ScoreMap = ImageBuffer<Luma<f32>, Vec<f32>>;

/// Scores templates against a captured screen
pub trait ScreenMatcher {
    /// Prepare a freshly captured screen for matching (e.g. rescale it)
    fn prepare(&self, screen: RgbImage) -> RgbImage {
        screen
    }

    /// Best match of template `name` against a prepared screen
    fn match_template(&self, screen: &RgbImage, name: &str) -> Result<MatchResult, VisionError>;

    /// Add a template from an image file under a logical name
    fn register(&mut self, name: &str, path: &Path, role: TemplateRole) -> Result<(), VisionError>;

    /// Whether a template with this name is known
    fn contains(&self, name: &str) -> bool;
}

fn split_channels(image: &RgbImage) -> [GrayImage; 3] {
    let (w, h) = image.dimensions();
    [0usize, 1, 2].map(|c| GrayImage::from_fn(w, h, |x, y| Luma([image.get_pixel(x, y)[c]])))
}

/// Zero-mean normalized cross-correlation of `template` at every position
/// of `screen`, summed over the color channels and clamped to [0, 1].
///
/// Flat windows and flat templates score 0. `template` must fit inside
/// `screen`.
pub fn correlation_map(screen: &RgbImage, template: &RgbImage) -> ScoreMap {
    let (tw, th) = template.dimensions();
    let n = f64::from(tw) * f64::from(th);

    let template_channels = split_channels(template);
    let mut template_sums = [0f64; 3];
    let mut template_variance = 0f64;
    for (c, channel) in template_channels.iter().enumerate() {
        let (sum, sum_sq) = channel.pixels().fold((0f64, 0f64), |(sum, sum_sq), p| {
            let v = f64::from(p[0]);
            (sum + v, sum_sq + v * v)
        });
        template_sums[c] = sum;
        template_variance += sum_sq - sum * sum / n;
    }

    // sum(screen * template) per channel; the template mean is removed below
    let cross: Vec<ScoreMap> = split_channels(screen)
        .iter()
        .zip(&template_channels)
        .map(|(s, t)| match_template(s, t, MatchTemplateMethod::CrossCorrelation))
        .collect();
    let sums = integral_image::<_, u64>(screen);
    let squares = integral_squared_image::<_, u64>(screen);

    let (w, h) = cross[0].dimensions();
    ImageBuffer::from_fn(w, h, |x, y| {
        if template_variance < FLAT_VARIANCE {
            return Luma([0.0]);
        }
        let (right, bottom) = (x + tw - 1, y + th - 1);
        let window = sum_image_pixels(&sums, x, y, right, bottom);
        let window_sq = sum_image_pixels(&squares, x, y, right, bottom);

        let mut numerator = 0f64;
        let mut window_variance = 0f64;
        for c in 0..3 {
            let sum = window[c] as f64;
            numerator += f64::from(cross[c].get_pixel(x, y)[0]) - sum * template_sums[c] / n;
            window_variance += window_sq[c] as f64 - sum * sum / n;
        }
        if window_variance < FLAT_VARIANCE {
            return Luma([0.0]);
        }

        let score = numerator / (window_variance * template_variance).sqrt();
        Luma([score.clamp(0.0, 1.0) as f32])
    })
}

/// Catalog-backed matcher using zero-mean normalized cross-correlation
pub struct TemplateMatcher {
    catalog: TemplateCatalog,
}

impl TemplateMatcher {
    pub fn new(catalog: TemplateCatalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &TemplateCatalog {
        &self.catalog
    }

    pub fn catalog_mut(&mut self) -> &mut TemplateCatalog {
        &mut self.catalog
    }
}

impl ScreenMatcher for TemplateMatcher {
    fn prepare(&self, screen: RgbImage) -> RgbImage {
        rescale(screen, self.catalog.scale())
    }

    fn match_template(&self, screen: &RgbImage, name: &str) -> Result<MatchResult, VisionError> {
        let template = self
            .catalog
            .get(name)
            .ok_or_else(|| VisionError::UnknownTemplate(name.to_string()))?;

        let (sw, sh) = screen.dimensions();
        let (tw, th) = template.image().dimensions();
        if tw > sw || th > sh {
            return Err(VisionError::TemplateTooLarge {
                name: name.to_string(),
                template_w: tw,
                template_h: th,
                screen_w: sw,
                screen_h: sh,
            });
        }

        let scores = correlation_map(screen, template.image());
        let extremes = find_extremes(&scores);
        let confidence = extremes.max_value;

        let scale = self.catalog.scale();
        let (x, y) = extremes.max_value_location;
        let rect = Rect::new(
            (x as f32 / scale).round() as i32,
            (y as f32 / scale).round() as i32,
            (tw as f32 / scale).round() as i32,
            (th as f32 / scale).round() as i32,
        );

        log::debug!(
            "Matched {}: confidence {:.3} at ({}, {})",
            name,
            confidence,
            rect.x,
            rect.y
        );
        Ok(MatchResult { confidence, rect })
    }

    fn register(&mut self, name: &str, path: &Path, role: TemplateRole) -> Result<(), VisionError> {
        self.catalog.load_image(path, name, role)
    }

    fn contains(&self, name: &str) -> bool {
        self.catalog.contains(name)
    }
}
