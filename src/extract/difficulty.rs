use anyhow::Result;
use serde::Serialize;

use super::{document, EntityExtractor, Records};
use crate::error::RowResult;
use crate::parser::{Listfile, Row};
use crate::schema::{EntityKind, SourceTable, DIFFICULTY};
use crate::writer::{Document, ImageSource};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Difficulty {
    pub id: String,
    pub name: String,
}

pub struct DifficultyExtractor;

impl EntityExtractor for DifficultyExtractor {
    type Record = Difficulty;

    fn kind(&self) -> EntityKind {
        EntityKind::Difficulty
    }

    fn primary(&self) -> &'static SourceTable {
        &DIFFICULTY
    }

    fn seed(&self, row: &Row, _listfile: &Listfile) -> RowResult<Option<(String, Difficulty)>> {
        let id = row.id("ID")?;
        let name = row.get("Name_lang")?.to_string();
        Ok(Some((id.clone(), Difficulty { id, name })))
    }

    fn documents(&self, records: Records<Difficulty>) -> Result<Vec<Document>> {
        records
            .into_iter()
            .map(|(id, record)| document("difficulty", id, &record, ImageSource::None))
            .collect()
    }
}
