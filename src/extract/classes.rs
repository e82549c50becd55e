use anyhow::Result;
use serde::Serialize;

use super::{document, AssetLookup, EntityExtractor, Records};
use crate::error::RowResult;
use crate::parser::{Listfile, Row};
use crate::schema::{EntityKind, SourceTable, CHR_CLASSES, CHR_SPECIALIZATION};
use crate::writer::{Document, ImageRef};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Class {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "AssetLookup::is_absent")]
    pub icon: AssetLookup,
    /// Spec ids in source order
    pub specs: Vec<String>,
    #[serde(skip)]
    spec_records: Vec<Spec>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Spec {
    pub id: String,
    pub name: String,
    pub class: String,
    #[serde(skip_serializing_if = "AssetLookup::is_absent")]
    pub icon: AssetLookup,
}

/// Classes from `chrclasses.csv`, with their specializations joined on `ClassID`
pub struct ClassExtractor;

impl EntityExtractor for ClassExtractor {
    type Record = Class;

    fn kind(&self) -> EntityKind {
        EntityKind::Classes
    }

    fn primary(&self) -> &'static SourceTable {
        &CHR_CLASSES
    }

    fn secondary(&self) -> Option<&'static SourceTable> {
        Some(&CHR_SPECIALIZATION)
    }

    fn seed(&self, row: &Row, listfile: &Listfile) -> RowResult<Option<(String, Class)>> {
        let id = row.id("ID")?;
        let class = Class {
            id: id.clone(),
            name: row.get("Name_lang")?.to_string(),
            icon: AssetLookup::resolve(listfile, row.get("IconFileDataID")?),
            specs: Vec::new(),
            spec_records: Vec::new(),
        };
        Ok(Some((id, class)))
    }

    fn secondary_key(&self, row: &Row) -> RowResult<String> {
        row.id("ClassID")
    }

    fn merge(&self, class: &mut Class, row: &Row, listfile: &Listfile) -> RowResult<()> {
        let spec = Spec {
            id: row.id("ID")?,
            name: row.get("Name_lang")?.to_string(),
            class: class.id.clone(),
            icon: AssetLookup::resolve(listfile, row.get("SpellIconFileID")?),
        };
        class.specs.push(spec.id.clone());
        class.spec_records.push(spec);
        Ok(())
    }

    fn documents(&self, records: Records<Class>) -> Result<Vec<Document>> {
        let mut docs = Vec::with_capacity(records.len());
        for (id, mut class) in records {
            let specs = std::mem::take(&mut class.spec_records);
            let icon = class.icon.image(ImageRef::icon);
            docs.push(document("class", id, &class, icon)?);

            for spec in specs {
                let icon = spec.icon.image(ImageRef::icon);
                docs.push(document("specs", spec.id.clone(), &spec, icon)?);
            }
        }
        Ok(docs)
    }
}
