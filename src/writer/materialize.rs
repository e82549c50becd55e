use anyhow::{Context, Result};
use serde_json::Value;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Per-entity JSON document name
pub const DATA_FILE: &str = "data.json";

/// Root segment of listfile paths that the rendered asset tree does not carry
const ASSET_ROOT_PREFIX: &str = "interface/";
const BINARY_IMAGE_EXT: &str = ".blp";
const RENDERED_IMAGE_EXT: &str = ".png";

/// What to do when an output file already exists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WritePolicy {
    /// Existing files are left alone, so stale output survives source changes
    #[default]
    WriteOnce,
    Overwrite,
}

/// An image to copy next to the entity document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    /// Raw listfile path, e.g. `interface/icons/spell_nature_rejuvenation.blp`
    pub asset: String,
    /// Destination name inside the entity directory
    pub file_name: &'static str,
}

impl ImageRef {
    pub fn icon(asset: impl Into<String>) -> Self {
        Self {
            asset: asset.into(),
            file_name: "icon.png",
        }
    }

    pub fn background(asset: impl Into<String>) -> Self {
        Self {
            asset: asset.into(),
            file_name: "background.png",
        }
    }
}

/// Where a document's image comes from
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ImageSource {
    /// The entity has no image reference
    #[default]
    None,
    /// A reference was set but the listfile does not know it
    Unresolved,
    Asset(ImageRef),
}

/// One entity ready to be written to `<category>/<id>/`
#[derive(Debug, Clone)]
pub struct Document {
    pub category: &'static str,
    pub id: String,
    pub data: Value,
    pub image: ImageSource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Written,
    Kept,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageOutcome {
    Copied,
    Kept,
    /// Unresolved in the listfile, or the rendered asset is not on disk
    Missing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaterializeOutcome {
    pub document: WriteOutcome,
    pub image: Option<ImageOutcome>,
}

/// Map a listfile path onto the rendered asset tree
pub fn asset_path(interface_root: &Path, asset: &str) -> PathBuf {
    let relative = asset.strip_prefix(ASSET_ROOT_PREFIX).unwrap_or(asset);
    let relative = match relative.strip_suffix(BINARY_IMAGE_EXT) {
        Some(stem) => format!("{}{}", stem, RENDERED_IMAGE_EXT),
        None => relative.to_string(),
    };
    interface_root.join(relative)
}

/// Writes entity directories under an output root.
///
/// The output tree doubles as the record of finished work: with
/// [`WritePolicy::WriteOnce`] a rerun only fills in what is absent.
#[derive(Debug, Clone)]
pub struct Materializer {
    output_root: PathBuf,
    interface_root: PathBuf,
    policy: WritePolicy,
}

impl Materializer {
    pub fn new(
        output_root: impl Into<PathBuf>,
        interface_root: impl Into<PathBuf>,
        policy: WritePolicy,
    ) -> Self {
        Self {
            output_root: output_root.into(),
            interface_root: interface_root.into(),
            policy,
        }
    }

    pub fn category_dir(&self, category: &str) -> PathBuf {
        self.output_root.join(category)
    }

    /// Create a category directory, tolerating concurrent creation
    pub fn ensure_category(&self, category: &str) -> Result<()> {
        let dir = self.category_dir(category);
        fs::create_dir_all(&dir).with_context(|| format!("Failed to create directory: {:?}", dir))
    }

    pub fn materialize(&self, doc: &Document) -> Result<MaterializeOutcome> {
        let entity_dir = self.category_dir(doc.category).join(&doc.id);
        fs::create_dir_all(&entity_dir)
            .with_context(|| format!("Failed to create directory: {:?}", entity_dir))?;

        let document = self.write_json(&entity_dir.join(DATA_FILE), &doc.data)?;

        let image = match &doc.image {
            ImageSource::None => None,
            ImageSource::Unresolved => Some(ImageOutcome::Missing),
            ImageSource::Asset(image) => Some(self.copy_image(&entity_dir, image)?),
        };

        Ok(MaterializeOutcome { document, image })
    }

    fn should_write(&self, dest: &Path) -> bool {
        self.policy == WritePolicy::Overwrite || !dest.exists()
    }

    fn write_json(&self, dest: &Path, data: &Value) -> Result<WriteOutcome> {
        if !self.should_write(dest) {
            return Ok(WriteOutcome::Kept);
        }

        let file = File::create(dest).with_context(|| format!("Failed to create: {:?}", dest))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, data)
            .with_context(|| format!("Failed to write: {:?}", dest))?;
        writer
            .flush()
            .with_context(|| format!("Failed to write: {:?}", dest))?;

        Ok(WriteOutcome::Written)
    }

    fn copy_image(&self, entity_dir: &Path, image: &ImageRef) -> Result<ImageOutcome> {
        let dest = entity_dir.join(image.file_name);
        if !self.should_write(&dest) {
            return Ok(ImageOutcome::Kept);
        }

        let src = asset_path(&self.interface_root, &image.asset);
        if !src.is_file() {
            return Ok(ImageOutcome::Missing);
        }

        fs::copy(&src, &dest).with_context(|| format!("Failed to copy {:?} to {:?}", src, dest))?;
        Ok(ImageOutcome::Copied)
    }
}
