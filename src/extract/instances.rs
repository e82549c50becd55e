use anyhow::Result;
use serde::Serialize;

use super::{document, AssetLookup, EntityExtractor, Records};
use crate::error::RowResult;
use crate::parser::{Listfile, Row};
use crate::schema::{EntityKind, SourceTable, LOADING_SCREENS, MAP};
use crate::writer::{Document, ImageRef};

/// Map instance types kept: dungeon, raid, arena
pub const INSTANCE_TYPES: [i64; 3] = [1, 2, 4];

/// Loading screen image columns, most preferred first
const LOADING_SCREEN_COLUMNS: [&str; 4] = [
    "MainImageFileDataID",
    "WideScreen169FileDataID",
    "WideScreenFileDataID",
    "NarrowScreenFileDataID",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Instance {
    pub id: String,
    pub name: String,
    pub expansion: String,
    pub loading_screen_id: String,
    #[serde(skip_serializing_if = "AssetLookup::is_absent")]
    pub background: AssetLookup,
}

/// First loading screen image that is set and known to the listfile.
///
/// Unresolved when some column is set but none resolves.
pub fn resolve_loading_screen(row: &Row, listfile: &Listfile) -> RowResult<AssetLookup> {
    let mut result = AssetLookup::Unset;
    for column in LOADING_SCREEN_COLUMNS {
        match AssetLookup::resolve(listfile, row.get(column)?) {
            found @ AssetLookup::Found(_) => return Ok(found),
            AssetLookup::Unresolved => result = AssetLookup::Unresolved,
            AssetLookup::Unset => {}
        }
    }
    Ok(result)
}

/// Dungeons, raids and arenas from `map.csv`, with a loading screen background
pub struct InstanceExtractor;

impl EntityExtractor for InstanceExtractor {
    type Record = Instance;

    fn kind(&self) -> EntityKind {
        EntityKind::Instances
    }

    fn primary(&self) -> &'static SourceTable {
        &MAP
    }

    fn secondary(&self) -> Option<&'static SourceTable> {
        Some(&LOADING_SCREENS)
    }

    fn seed(&self, row: &Row, _listfile: &Listfile) -> RowResult<Option<(String, Instance)>> {
        if !INSTANCE_TYPES.contains(&row.int("InstanceType")?) {
            return Ok(None);
        }

        let id = row.id("ID")?;
        let instance = Instance {
            id: id.clone(),
            name: row.get("MapName_lang")?.to_string(),
            expansion: row.id("ExpansionID")?,
            loading_screen_id: row.id("LoadingScreenID")?,
            background: AssetLookup::Unset,
        };
        Ok(Some((id, instance)))
    }

    fn join_key<'r>(&self, _id: &'r str, instance: &'r Instance) -> Option<&'r str> {
        Some(instance.loading_screen_id.as_str()).filter(|id| *id != "0")
    }

    fn merge(&self, instance: &mut Instance, row: &Row, listfile: &Listfile) -> RowResult<()> {
        instance.background = resolve_loading_screen(row, listfile)?;
        Ok(())
    }

    fn documents(&self, records: Records<Instance>) -> Result<Vec<Document>> {
        records
            .into_iter()
            .map(|(id, instance)| {
                let background = instance.background.image(ImageRef::background);
                document("instances", id, &instance, background)
            })
            .collect()
    }
}
