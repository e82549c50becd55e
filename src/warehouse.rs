//! Warehouse-side content lists: arenas, dungeons, raids and raid encounters
//!
//! Unlike the per-entity tree these are whole-list JSON files, rebuilt on
//! every run. Dungeons and raids are limited to an allow-list of expansions.

use anyhow::{bail, Context, Result};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::{info, warn};

use crate::error::{RowError, RowResult};
use crate::parser::{read_table, Row};
use crate::schema::{SourceTable, DUNGEON_ENCOUNTER, WAREHOUSE_MAP};

const DUNGEON: i64 = 1;
const RAID: i64 = 2;
const ARENA: i64 = 4;

/// Expansion id to display label
pub type Expansions = BTreeMap<i64, String>;

pub fn default_expansions() -> Expansions {
    BTreeMap::from([(8, "Shadowlands".to_string())])
}

/// Parse `ID=LABEL`, as given on the command line
pub fn parse_expansion(s: &str) -> Result<(i64, String), String> {
    let (id, label) = s
        .split_once('=')
        .ok_or_else(|| format!("Expected ID=LABEL, got {:?}", s))?;
    let id = id
        .trim()
        .parse::<i64>()
        .map_err(|_| format!("Invalid expansion id: {:?}", id))?;
    let label = label.trim();
    if label.is_empty() {
        return Err(format!("Empty label for expansion {}", id));
    }
    Ok((id, label.to_string()))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentRecord {
    pub id: i64,
    pub name: String,
    pub expansion: String,
    pub parent: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WarehouseContent {
    pub arenas: Vec<ContentRecord>,
    pub dungeons: Vec<ContentRecord>,
    pub raids: Vec<ContentRecord>,
    pub encounters: Vec<ContentRecord>,
    pub skipped_rows: usize,
}

fn skip(table: &SourceTable, row: &Row, error: &RowError, skipped: &mut usize) {
    warn!(table = table.name, line = row.line, error = %error, "skipping row");
    *skipped += 1;
}

fn map_record(row: &Row, expansions: &Expansions) -> RowResult<Option<(i64, ContentRecord)>> {
    let instance_type = row.int("InstanceType")?;
    let expansion = match instance_type {
        ARENA => String::new(),
        DUNGEON | RAID => match expansions.get(&row.int("ExpansionID")?) {
            Some(label) => label.clone(),
            None => return Ok(None),
        },
        _ => return Ok(None),
    };

    let record = ContentRecord {
        id: row.int("ID")?,
        name: row.get("MapName_lang")?.to_string(),
        expansion,
        parent: None,
    };
    Ok(Some((instance_type, record)))
}

fn encounter_record(row: &Row, raids: &HashMap<i64, String>) -> RowResult<Option<ContentRecord>> {
    let map_id = row.int("MapID")?;
    let Some(expansion) = raids.get(&map_id) else {
        return Ok(None);
    };

    Ok(Some(ContentRecord {
        id: row.int("ID")?,
        name: row.get("Name_lang")?.to_string(),
        expansion: expansion.clone(),
        parent: Some(map_id),
    }))
}

/// Build all four lists from the data directory
pub fn collect_content(data_dir: &Path, expansions: &Expansions) -> Result<WarehouseContent> {
    let mut content = WarehouseContent::default();

    for row in read_table(data_dir, &WAREHOUSE_MAP)? {
        match map_record(&row, expansions) {
            Ok(Some((ARENA, record))) => content.arenas.push(record),
            Ok(Some((DUNGEON, record))) => content.dungeons.push(record),
            Ok(Some((_, record))) => content.raids.push(record),
            Ok(None) => {}
            Err(e) => skip(&WAREHOUSE_MAP, &row, &e, &mut content.skipped_rows),
        }
    }

    // Encounters inherit the expansion already resolved for their raid
    let raids: HashMap<i64, String> = content
        .raids
        .iter()
        .map(|r| (r.id, r.expansion.clone()))
        .collect();

    for row in read_table(data_dir, &DUNGEON_ENCOUNTER)? {
        match encounter_record(&row, &raids) {
            Ok(Some(record)) => content.encounters.push(record),
            Ok(None) => {}
            Err(e) => skip(&DUNGEON_ENCOUNTER, &row, &e, &mut content.skipped_rows),
        }
    }

    Ok(content)
}

fn write_list(path: &Path, records: &[ContentRecord]) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Failed to create: {:?}", path))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, records)
        .with_context(|| format!("Failed to write: {:?}", path))?;
    writer
        .flush()
        .with_context(|| format!("Failed to write: {:?}", path))?;
    Ok(())
}

/// Write `arenas.json`, `dungeons.json`, `raids.json` and `encounters.json`
pub fn extract_warehouse(
    data_dir: &Path,
    output_dir: &Path,
    expansions: &Expansions,
) -> Result<WarehouseContent> {
    if expansions.is_empty() {
        bail!("At least one expansion is required");
    }

    let content = collect_content(data_dir, expansions)?;

    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output directory: {:?}", output_dir))?;
    write_list(&output_dir.join("arenas.json"), &content.arenas)?;
    write_list(&output_dir.join("dungeons.json"), &content.dungeons)?;
    write_list(&output_dir.join("raids.json"), &content.raids)?;
    write_list(&output_dir.join("encounters.json"), &content.encounters)?;

    info!(
        arenas = content.arenas.len(),
        dungeons = content.dungeons.len(),
        raids = content.raids.len(),
        encounters = content.encounters.len(),
        skipped = content.skipped_rows,
        "wrote warehouse lists"
    );

    Ok(content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use tempfile::TempDir;

    const MAP_CSV: &str = "ID,MapName_lang,InstanceType,ExpansionID\n\
        572,Ruins of Lordaeron,4,2\n\
        2284,Sanguine Depths,1,8\n\
        1754,Freehold,1,7\n\
        2296,Castle Nathria,2,8\n\
        2217,Ny'alotha,2,7\n\
        2222,Revendreth,0,8\n\
        99,Broken,1,eight\n";

    const ENCOUNTER_CSV: &str = "ID,Name_lang,MapID,DifficultyMask\n\
        2398,Shriekwing,2296,-1\n\
        2344,N'Zoth the Corruptor,2217,-1\n\
        2388,Kryxis the Voracious,2284,-1\n";

    fn fixture() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("map.csv"), MAP_CSV).unwrap();
        fs::write(dir.path().join("dungeonencounter.csv"), ENCOUNTER_CSV).unwrap();
        dir
    }

    #[test]
    fn test_parse_expansion() {
        assert_eq!(parse_expansion("8=Shadowlands"), Ok((8, "Shadowlands".into())));
        assert!(parse_expansion("Shadowlands").is_err());
        assert!(parse_expansion("x=Shadowlands").is_err());
        assert!(parse_expansion("8=").is_err());
    }

    #[test]
    fn test_collect_content() {
        let data = fixture();
        let content = collect_content(data.path(), &default_expansions()).unwrap();

        assert_eq!(
            content.arenas,
            vec![ContentRecord {
                id: 572,
                name: "Ruins of Lordaeron".into(),
                expansion: String::new(),
                parent: None,
            }]
        );
        assert_eq!(content.dungeons.len(), 1);
        assert_eq!(content.dungeons[0].id, 2284);
        assert_eq!(content.raids.len(), 1);
        assert_eq!(content.raids[0].name, "Castle Nathria");
        assert_eq!(
            content.encounters,
            vec![ContentRecord {
                id: 2398,
                name: "Shriekwing".into(),
                expansion: "Shadowlands".into(),
                parent: Some(2296),
            }]
        );
        assert_eq!(content.skipped_rows, 1);
    }

    #[test]
    fn test_writes_lists() {
        let data = fixture();
        let out = TempDir::new().unwrap();
        let mut expansions = default_expansions();
        expansions.insert(7, "Battle for Azeroth".into());

        extract_warehouse(data.path(), out.path(), &expansions).unwrap();

        let raids: Value =
            serde_json::from_str(&fs::read_to_string(out.path().join("raids.json")).unwrap()).unwrap();
        assert_eq!(
            raids,
            json!([
                {"id": 2296, "name": "Castle Nathria", "expansion": "Shadowlands", "parent": null},
                {"id": 2217, "name": "Ny'alotha", "expansion": "Battle for Azeroth", "parent": null}
            ])
        );

        let encounters: Value =
            serde_json::from_str(&fs::read_to_string(out.path().join("encounters.json")).unwrap())
                .unwrap();
        assert_eq!(encounters.as_array().unwrap().len(), 2);
        assert_eq!(encounters[1]["parent"], json!(2217));
        assert_eq!(encounters[1]["expansion"], json!("Battle for Azeroth"));
        assert!(out.path().join("arenas.json").exists());
        assert!(out.path().join("dungeons.json").exists());
    }
}
