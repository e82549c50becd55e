use anyhow::{bail, Context, Result};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Only client interface assets are kept from the listfile
pub const INTERFACE_PREFIX: &str = "interface";

/// File data id to client asset path, restricted to interface assets.
///
/// Lookups that miss mean "no image available", never an error.
#[derive(Debug, Clone, Default)]
pub struct Listfile {
    entries: HashMap<String, String>,
}

impl Listfile {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            bail!("Missing listfile: {:?}", path);
        }

        let file = File::open(path).with_context(|| format!("Failed to open: {:?}", path))?;
        let reader = BufReader::new(file);

        let mut entries = HashMap::new();
        for line in reader.lines() {
            let line = line.with_context(|| format!("Failed to read line in {:?}", path))?;
            if let Some((id, asset)) = parse_line(&line) {
                entries.insert(id.to_string(), asset.to_string());
            }
        }

        Ok(Self { entries })
    }

    pub fn from_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn resolve(&self, file_data_id: &str) -> Option<&str> {
        self.entries.get(file_data_id).map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// `id;path[;...]`, keeping only interface paths
fn parse_line(line: &str) -> Option<(&str, &str)> {
    let mut parts = line.split(';');
    let id = parts.next()?;
    let asset = parts.next()?;
    if !asset.starts_with(INTERFACE_PREFIX) {
        return None;
    }
    Some((id, asset.trim()))
}
