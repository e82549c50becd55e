use anyhow::Result;
use serde::Serialize;

use super::{document, AssetLookup, EntityExtractor, Records};
use crate::error::RowResult;
use crate::parser::{Listfile, Row};
use crate::schema::{EntityKind, SourceTable, SPELL_MISC, SPELL_NAME};
use crate::writer::{Document, ImageRef, ImageSource};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Spell {
    pub id: String,
    pub name: String,
    /// Absent without a misc row, `null` when the misc row's icon does not resolve
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<AssetLookup>,
}

pub struct SpellExtractor;

impl EntityExtractor for SpellExtractor {
    type Record = Spell;

    fn kind(&self) -> EntityKind {
        EntityKind::Spells
    }

    fn primary(&self) -> &'static SourceTable {
        &SPELL_NAME
    }

    fn secondary(&self) -> Option<&'static SourceTable> {
        Some(&SPELL_MISC)
    }

    fn seed(&self, row: &Row, _listfile: &Listfile) -> RowResult<Option<(String, Spell)>> {
        let id = row.id("ID")?;
        let spell = Spell {
            id: id.clone(),
            name: row.get("Name_lang")?.to_string(),
            icon: None,
        };
        Ok(Some((id, spell)))
    }

    fn secondary_key(&self, row: &Row) -> RowResult<String> {
        row.id("SpellID")
    }

    fn merge(&self, spell: &mut Spell, row: &Row, listfile: &Listfile) -> RowResult<()> {
        spell.icon = Some(AssetLookup::resolve(listfile, row.get("SpellIconFileDataID")?));
        Ok(())
    }

    fn documents(&self, records: Records<Spell>) -> Result<Vec<Document>> {
        records
            .into_iter()
            .map(|(id, spell)| {
                let icon = match &spell.icon {
                    Some(lookup) => lookup.image(ImageRef::icon),
                    None => ImageSource::None,
                };
                document("spells", id, &spell, icon)
            })
            .collect()
    }
}
