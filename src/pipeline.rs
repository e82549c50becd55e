use anyhow::{Context, Result};
use rayon::prelude::*;
use std::fs;
use std::path::PathBuf;
use tracing::info;

use crate::extract::{
    run_extractor, ClassExtractor, DifficultyExtractor, ExtractContext, ExtractSummary,
    InstanceExtractor, ItemExtractor, SpellExtractor,
};
use crate::parser::Listfile;
use crate::progress::Progress;
use crate::schema::{EntityKind, LISTFILE};
use crate::writer::{Materializer, WritePolicy};

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Directory holding the client CSV exports and `listfile.csv`
    pub data_dir: PathBuf,
    /// Rendered client interface assets
    pub interface_dir: PathBuf,
    pub output_dir: PathBuf,
    pub policy: WritePolicy,
    /// Run extractors concurrently; each writes its own subtree
    pub parallel: bool,
}

#[derive(Debug, Clone)]
pub struct PipelineSummary {
    pub listfile_entries: usize,
    pub extractors: Vec<ExtractSummary>,
}

impl PipelineSummary {
    pub fn total_records(&self) -> usize {
        self.extractors.iter().map(|s| s.records).sum()
    }

    pub fn total_skipped(&self) -> usize {
        self.extractors.iter().map(|s| s.skipped_rows).sum()
    }

    pub fn documents_written(&self) -> usize {
        self.extractors.iter().map(|s| s.documents_written).sum()
    }

    pub fn get(&self, kind: EntityKind) -> Option<&ExtractSummary> {
        self.extractors.iter().find(|s| s.kind == kind)
    }
}

/// Run one entity kind against an already loaded listfile
pub fn run_kind(kind: EntityKind, ctx: &ExtractContext) -> Result<ExtractSummary> {
    let summary = match kind {
        EntityKind::Difficulty => run_extractor(&DifficultyExtractor, ctx),
        EntityKind::Classes => run_extractor(&ClassExtractor, ctx),
        EntityKind::Instances => run_extractor(&InstanceExtractor, ctx),
        EntityKind::Spells => run_extractor(&SpellExtractor, ctx),
        EntityKind::Items => run_extractor(&ItemExtractor, ctx),
    };
    summary.with_context(|| format!("Failed to extract {}", kind))
}

/// Load the listfile once, then run the selected extractors in pipeline order
pub fn run_pipeline(
    config: &PipelineConfig,
    kinds: &[EntityKind],
    progress: &Progress,
) -> Result<PipelineSummary> {
    fs::create_dir_all(&config.output_dir)
        .with_context(|| format!("Failed to create output directory: {:?}", config.output_dir))?;

    let listfile = Listfile::load(&config.data_dir.join(LISTFILE))?;
    info!(entries = listfile.len(), "loaded listfile");

    let materializer = Materializer::new(&config.output_dir, &config.interface_dir, config.policy);
    let ctx = ExtractContext {
        data_dir: &config.data_dir,
        listfile: &listfile,
        materializer: &materializer,
        progress,
    };

    let mut ordered = kinds.to_vec();
    ordered.sort();
    ordered.dedup();

    let extractors = if config.parallel {
        ordered
            .par_iter()
            .map(|kind| run_kind(*kind, &ctx))
            .collect::<Result<Vec<_>>>()?
    } else {
        ordered
            .iter()
            .map(|kind| run_kind(*kind, &ctx))
            .collect::<Result<Vec<_>>>()?
    };

    Ok(PipelineSummary {
        listfile_entries: listfile.len(),
        extractors,
    })
}
