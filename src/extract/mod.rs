//! Parameterized entity extraction
//!
//! Every entity kind follows the same shape: read the primary table into
//! seed records keyed by source id, optionally merge a secondary table into
//! those seeds by a shared key, then materialize one directory per entity.
//! The per-kind pieces live behind [`EntityExtractor`].

mod classes;
mod difficulty;
mod instances;
mod items;
mod spells;

pub use classes::{Class, ClassExtractor, Spec};
pub use difficulty::{Difficulty, DifficultyExtractor};
pub use instances::{resolve_loading_screen, Instance, InstanceExtractor, INSTANCE_TYPES};
pub use items::{Item, ItemExtractor};
pub use spells::{Spell, SpellExtractor};

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use std::collections::HashMap;
use std::path::Path;
use tracing::{info, warn};

use crate::error::{RowError, RowResult};
use crate::parser::{read_table, Listfile, Row};
use crate::progress::Progress;
use crate::schema::{EntityKind, SourceTable};
use crate::writer::{
    Document, ImageOutcome, ImageRef, ImageSource, MaterializeOutcome, Materializer, WriteOutcome,
};

/// Seed records keyed by source id, in source order
pub type Records<R> = IndexMap<String, R>;

/// Shared, read-only inputs for one extraction run
pub struct ExtractContext<'a> {
    pub data_dir: &'a Path,
    pub listfile: &'a Listfile,
    pub materializer: &'a Materializer,
    pub progress: &'a Progress,
}

pub trait EntityExtractor: Sync {
    type Record: Send;

    fn kind(&self) -> EntityKind;

    fn primary(&self) -> &'static SourceTable;

    fn secondary(&self) -> Option<&'static SourceTable> {
        None
    }

    /// Build the seed record for a primary row; `Ok(None)` filters the row out
    fn seed(&self, row: &Row, listfile: &Listfile) -> RowResult<Option<(String, Self::Record)>>;

    /// Value on a seed record that secondary rows join against
    fn join_key<'r>(&self, id: &'r str, _record: &'r Self::Record) -> Option<&'r str> {
        Some(id)
    }

    fn secondary_key(&self, row: &Row) -> RowResult<String> {
        row.id("ID")
    }

    fn merge(&self, _record: &mut Self::Record, _row: &Row, _listfile: &Listfile) -> RowResult<()> {
        Ok(())
    }

    fn documents(&self, records: Records<Self::Record>) -> Result<Vec<Document>>;
}

/// Counts for one extractor run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractSummary {
    pub kind: EntityKind,
    pub records: usize,
    pub skipped_rows: usize,
    pub documents_written: usize,
    pub documents_kept: usize,
    pub images_copied: usize,
    pub images_kept: usize,
    pub images_missing: usize,
}

impl ExtractSummary {
    pub fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            records: 0,
            skipped_rows: 0,
            documents_written: 0,
            documents_kept: 0,
            images_copied: 0,
            images_kept: 0,
            images_missing: 0,
        }
    }

    fn skip(&mut self, table: &SourceTable, row: &Row, error: &RowError) {
        warn!(table = table.name, line = row.line, error = %error, "skipping row");
        self.skipped_rows += 1;
    }

    fn record(&mut self, outcome: MaterializeOutcome) {
        match outcome.document {
            WriteOutcome::Written => self.documents_written += 1,
            WriteOutcome::Kept => self.documents_kept += 1,
        }
        match outcome.image {
            Some(ImageOutcome::Copied) => self.images_copied += 1,
            Some(ImageOutcome::Kept) => self.images_kept += 1,
            Some(ImageOutcome::Missing) => self.images_missing += 1,
            None => {}
        }
    }
}

/// Build a document from a serializable record
pub fn document<R: Serialize>(
    category: &'static str,
    id: String,
    record: &R,
    image: ImageSource,
) -> Result<Document> {
    let data = serde_json::to_value(record)
        .with_context(|| format!("Failed to serialize {} {}", category, id))?;
    Ok(Document {
        category,
        id,
        data,
        image,
    })
}

/// Listfile lookup of an image column.
///
/// Serializes as the asset path when found and as `null` otherwise; record
/// fields skip it with [`AssetLookup::is_absent`] when the key should be omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AssetLookup {
    /// Empty or `0`: the row has no image
    #[default]
    Unset,
    /// Set, but the listfile has no interface asset for it
    Unresolved,
    Found(String),
}

impl AssetLookup {
    pub fn resolve(listfile: &Listfile, file_data_id: &str) -> Self {
        let file_data_id = file_data_id.trim();
        if file_data_id.is_empty() || file_data_id == "0" {
            return AssetLookup::Unset;
        }
        match listfile.resolve(file_data_id) {
            Some(asset) => AssetLookup::Found(asset.to_string()),
            None => AssetLookup::Unresolved,
        }
    }

    pub fn asset(&self) -> Option<&str> {
        match self {
            AssetLookup::Found(asset) => Some(asset),
            _ => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        self.asset().is_none()
    }

    /// Image to materialize, built with `ImageRef::icon` or `ImageRef::background`
    pub fn image(&self, make: fn(String) -> ImageRef) -> ImageSource {
        match self {
            AssetLookup::Unset => ImageSource::None,
            AssetLookup::Unresolved => ImageSource::Unresolved,
            AssetLookup::Found(asset) => ImageSource::Asset(make(asset.clone())),
        }
    }
}

impl Serialize for AssetLookup {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.asset() {
            Some(asset) => serializer.serialize_str(asset),
            None => serializer.serialize_none(),
        }
    }
}

pub fn run_extractor<E: EntityExtractor>(
    extractor: &E,
    ctx: &ExtractContext,
) -> Result<ExtractSummary> {
    let kind = extractor.kind();
    let mut summary = ExtractSummary::new(kind);
    let pb = ctx.progress.bar(kind.name());

    for category in kind.categories() {
        ctx.materializer.ensure_category(category)?;
    }

    let primary = extractor.primary();
    let rows = read_table(ctx.data_dir, primary)?;
    let mut records: Records<E::Record> = IndexMap::with_capacity(rows.len());
    for row in &rows {
        match extractor.seed(row, ctx.listfile) {
            Ok(Some((id, record))) => {
                records.insert(id, record);
            }
            Ok(None) => {}
            Err(e) => summary.skip(primary, row, &e),
        }
    }

    if let Some(secondary) = extractor.secondary() {
        let rows = read_table(ctx.data_dir, secondary)?;

        let mut index: HashMap<String, Vec<usize>> = HashMap::new();
        for (pos, (id, record)) in records.iter().enumerate() {
            if let Some(key) = extractor.join_key(id, record) {
                index.entry(key.to_string()).or_default().push(pos);
            }
        }

        for row in &rows {
            let key = match extractor.secondary_key(row) {
                Ok(key) => key,
                Err(e) => {
                    summary.skip(secondary, row, &e);
                    continue;
                }
            };

            // Rows with no seed to merge into are dropped
            let Some(targets) = index.get(&key) else {
                continue;
            };

            for &pos in targets {
                if let Some((_, record)) = records.get_index_mut(pos) {
                    if let Err(e) = extractor.merge(record, row, ctx.listfile) {
                        summary.skip(secondary, row, &e);
                        break;
                    }
                }
            }
        }
    }

    summary.records = records.len();
    let documents = extractor.documents(records)?;
    pb.set_length(documents.len() as u64);

    for doc in &documents {
        let outcome = ctx.materializer.materialize(doc)?;
        summary.record(outcome);
        pb.inc(1);
    }

    pb.finish_with_message(format!("{}: {} records", kind, summary.records));
    info!(
        kind = kind.name(),
        records = summary.records,
        skipped = summary.skipped_rows,
        written = summary.documents_written,
        kept = summary.documents_kept,
        images = summary.images_copied,
        "extracted"
    );

    Ok(summary)
}


#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    /// A throwaway data directory, asset tree and output root
    pub struct Fixture {
        pub data: TempDir,
        pub assets: TempDir,
        pub output: TempDir,
    }

    impl Fixture {
        pub fn new() -> Self {
            Self {
                data: TempDir::new().unwrap(),
                assets: TempDir::new().unwrap(),
                output: TempDir::new().unwrap(),
            }
        }

        pub fn table(&self, file: &str, contents: &str) -> &Self {
            self.table_bytes(file, contents.as_bytes())
        }

        pub fn table_bytes(&self, file: &str, contents: &[u8]) -> &Self {
            fs::write(self.data.path().join(file), contents).unwrap();
            self
        }

        pub fn asset(&self, relative: &str) -> &Self {
            let path = self.assets.path().join(relative);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, relative.as_bytes()).unwrap();
            self
        }

        pub fn run<E: EntityExtractor>(&self, extractor: &E, listfile: &Listfile) -> ExtractSummary {
            let materializer = Materializer::new(
                self.output.path(),
                self.assets.path(),
                crate::writer::WritePolicy::WriteOnce,
            );
            let progress = Progress::hidden();
            let ctx = ExtractContext {
                data_dir: self.data.path(),
                listfile,
                materializer: &materializer,
                progress: &progress,
            };
            run_extractor(extractor, &ctx).unwrap()
        }

        pub fn json(&self, relative: &str) -> serde_json::Value {
            let text = fs::read_to_string(self.output.path().join(relative)).unwrap();
            serde_json::from_str(&text).unwrap()
        }

        pub fn exists(&self, relative: &str) -> bool {
            self.output.path().join(relative).exists()
        }
    }
}
