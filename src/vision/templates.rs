//! Template catalog
//!
//! Named RGB templates, loaded once from a directory of PNG files
//! (name = file stem) and extended at run time with caller-supplied images
//! such as the quest thumbnail, acceptable supports and preferred cards.

use std::collections::HashMap;
use std::path::Path;

use image::imageops::FilterType;
use image::RgbImage;
use serde::{Deserialize, Serialize};

use super::VisionError;

/// What a template is used for on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateRole {
    /// Shipped UI marker or button
    Builtin,
    /// Target quest thumbnail
    Quest,
    /// Acceptable support servant
    Support,
    /// Preferred command card
    PreferredCard,
}

/// A template image and its role
#[derive(Debug, Clone)]
pub struct Template {
    image: RgbImage,
    role: TemplateRole,
}

impl Template {
    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    pub fn role(&self) -> TemplateRole {
        self.role
    }
}

/// Name to template mapping
#[derive(Debug, Clone)]
pub struct TemplateCatalog {
    templates: HashMap<String, Template>,
    /// Factor every template (and screen) is resized by before matching
    scale: f32,
}

impl TemplateCatalog {
    /// Create an empty catalog. `scale` must be in (0, 1]; anything else is treated as 1.
    pub fn new(scale: f32) -> Self {
        let scale = if scale > 0.0 && scale <= 1.0 { scale } else { 1.0 };
        Self {
            templates: HashMap::new(),
            scale,
        }
    }

    /// Load every `*.png` in `dir` as a built-in template
    pub fn load_dir(dir: &Path, scale: f32) -> Result<Self, VisionError> {
        let mut catalog = Self::new(scale);

        let entries = std::fs::read_dir(dir).map_err(|source| VisionError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        for entry in entries {
            let path = entry
                .map_err(|source| VisionError::Io {
                    path: dir.to_path_buf(),
                    source,
                })?
                .path();
            if !is_png(&path) {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let name = name.to_string();
            catalog.load_image(&path, &name, TemplateRole::Builtin)?;
        }

        log::info!(
            "Loaded {} templates from {}",
            catalog.len(),
            dir.display()
        );
        Ok(catalog)
    }

    /// Load a PNG file under `name`, replacing any template of the same name
    pub fn load_image(
        &mut self,
        path: &Path,
        name: &str,
        role: TemplateRole,
    ) -> Result<(), VisionError> {
        if !path.is_file() {
            return Err(VisionError::NotFound(path.to_path_buf()));
        }
        if !is_png(path) {
            return Err(VisionError::NotPng(path.to_path_buf()));
        }

        let image = image::open(path)?.to_rgb8();
        self.insert(name, image, role);
        log::debug!("Loaded template {} ({:?}) from {}", name, role, path.display());
        Ok(())
    }

    /// Add an already-decoded template
    pub fn insert(&mut self, name: &str, image: RgbImage, role: TemplateRole) {
        let image = rescale(image, self.scale);
        self.templates
            .insert(name.to_string(), Template { image, role });
    }

    pub fn get(&self, name: &str) -> Option<&Template> {
        self.templates.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Names of all templates with the given role, sorted
    pub fn names_with_role(&self, role: TemplateRole) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .templates
            .iter()
            .filter(|(_, t)| t.role == role)
            .map(|(name, _)| name.as_str())
            .collect();
        names.sort_unstable();
        names
    }
}

fn is_png(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("png"))
}

/// Resize by `scale`; identity when the scale is 1
pub(crate) fn rescale(image: RgbImage, scale: f32) -> RgbImage {
    if (scale - 1.0).abs() < f32::EPSILON {
        return image;
    }
    let (w, h) = image.dimensions();
    let sw = ((w as f32 * scale).round() as u32).max(1);
    let sh = ((h as f32 * scale).round() as u32).max(1);
    image::imageops::resize(&image, sw, sh, FilterType::Triangle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb};

    fn write_png(dir: &Path, name: &str, w: u32, h: u32) {
        let img: RgbImage =
            ImageBuffer::from_fn(w, h, |x, y| Rgb([(x + y) as u8, x as u8, y as u8]));
        img.save(dir.join(name)).unwrap();
    }

    #[test]
    fn test_load_dir_uses_file_stems() {
        let dir = tempfile::tempdir().unwrap();
        write_png(dir.path(), "attack.png", 8, 8);
        write_png(dir.path(), "1_3.png", 4, 4);
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let catalog = TemplateCatalog::load_dir(dir.path(), 1.0).unwrap();
        assert_eq!(catalog.len(), 2);
        assert!(catalog.contains("attack"));
        assert!(catalog.contains("1_3"));
        assert_eq!(catalog.get("attack").unwrap().role(), TemplateRole::Builtin);
    }

    #[test]
    fn test_load_image_rejects_missing_and_non_png() {
        let dir = tempfile::tempdir().unwrap();
        let text = dir.path().join("quest.jpg");
        std::fs::write(&text, "x").unwrap();

        let mut catalog = TemplateCatalog::new(1.0);
        assert!(matches!(
            catalog.load_image(&dir.path().join("missing.png"), "quest", TemplateRole::Quest),
            Err(VisionError::NotFound(_))
        ));
        assert!(matches!(
            catalog.load_image(&text, "quest", TemplateRole::Quest),
            Err(VisionError::NotPng(_))
        ));
    }

    #[test]
    fn test_roles_and_override() {
        let mut catalog = TemplateCatalog::new(1.0);
        catalog.insert("support_0", RgbImage::new(2, 2), TemplateRole::Support);
        catalog.insert("support_1", RgbImage::new(2, 2), TemplateRole::Support);
        catalog.insert("quest", RgbImage::new(2, 2), TemplateRole::Quest);
        assert_eq!(
            catalog.names_with_role(TemplateRole::Support),
            vec!["support_0", "support_1"]
        );

        catalog.insert("quest", RgbImage::new(3, 3), TemplateRole::Quest);
        assert_eq!(catalog.get("quest").unwrap().image().dimensions(), (3, 3));
    }

    #[test]
    fn test_scaled_catalog() {
        let mut catalog = TemplateCatalog::new(0.5);
        catalog.insert("attack", RgbImage::new(40, 20), TemplateRole::Builtin);
        assert_eq!(catalog.get("attack").unwrap().image().dimensions(), (20, 10));

        assert_eq!(TemplateCatalog::new(3.0).scale(), 1.0);
    }
}
