use std::fmt;
use std::str::FromStr;

/// A client table export read from the data directory
#[derive(Debug, Clone)]
pub struct SourceTable {
    pub name: &'static str,
    pub source_file: &'static str,
    /// Header columns that must be present; anything else in the file is ignored
    pub columns: &'static [&'static str],
}

impl SourceTable {
    pub const fn new(
        name: &'static str,
        source_file: &'static str,
        columns: &'static [&'static str],
    ) -> Self {
        Self {
            name,
            source_file,
            columns,
        }
    }
}

/// Entity kinds produced by the extraction pipeline, in pipeline order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    Difficulty,
    Classes,
    Instances,
    Spells,
    Items,
}

impl EntityKind {
    pub const ALL: [EntityKind; 5] = [
        EntityKind::Difficulty,
        EntityKind::Classes,
        EntityKind::Instances,
        EntityKind::Spells,
        EntityKind::Items,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            EntityKind::Difficulty => "difficulty",
            EntityKind::Classes => "classes",
            EntityKind::Instances => "instances",
            EntityKind::Spells => "spells",
            EntityKind::Items => "items",
        }
    }

    /// Output subdirectories written by this kind
    pub fn categories(&self) -> &'static [&'static str] {
        match self {
            EntityKind::Difficulty => &["difficulty"],
            EntityKind::Classes => &["class", "specs"],
            EntityKind::Instances => &["instances"],
            EntityKind::Spells => &["spells"],
            EntityKind::Items => &["items"],
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntityKind::ALL
            .iter()
            .find(|k| k.name() == s)
            .copied()
            .ok_or_else(|| format!("Unknown entity kind: {}", s))
    }
}
