use anyhow::Result;
use serde::Serialize;

use super::{document, AssetLookup, EntityExtractor, Records};
use crate::error::RowResult;
use crate::parser::{Listfile, Row};
use crate::schema::{EntityKind, SourceTable, ITEM, ITEM_SPARSE};
use crate::writer::{Document, ImageRef};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Item {
    pub id: i64,
    pub name: String,
    pub quality: i64,
    #[serde(rename = "inventorySlot", skip_serializing_if = "Option::is_none")]
    pub inventory_slot: Option<i64>,
    #[serde(skip_serializing_if = "AssetLookup::is_absent")]
    pub icon: AssetLookup,
}

/// Items from `itemsparse.csv`, left-enriched with slot and icon from `item.csv`
pub struct ItemExtractor;

impl EntityExtractor for ItemExtractor {
    type Record = Item;

    fn kind(&self) -> EntityKind {
        EntityKind::Items
    }

    fn primary(&self) -> &'static SourceTable {
        &ITEM_SPARSE
    }

    fn secondary(&self) -> Option<&'static SourceTable> {
        Some(&ITEM)
    }

    fn seed(&self, row: &Row, _listfile: &Listfile) -> RowResult<Option<(String, Item)>> {
        let key = row.id("ID")?;
        let item = Item {
            id: row.int("ID")?,
            name: row.get("Display_lang")?.to_string(),
            quality: row.int("OverallQualityID")?,
            inventory_slot: None,
            icon: AssetLookup::Unset,
        };
        Ok(Some((key, item)))
    }

    fn merge(&self, item: &mut Item, row: &Row, listfile: &Listfile) -> RowResult<()> {
        let icon = AssetLookup::resolve(listfile, row.get("IconFileDataID")?);
        if icon == AssetLookup::Unset {
            return Ok(());
        }

        let slot = row.int("InventoryType")?;
        item.inventory_slot = Some(slot);
        item.icon = icon;
        Ok(())
    }

    fn documents(&self, records: Records<Item>) -> Result<Vec<Document>> {
        records
            .into_iter()
            .map(|(id, item)| {
                let icon = item.icon.image(ImageRef::icon);
                document("items", id, &item, icon)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::test_support::Fixture;
    use serde_json::json;

    #[test]
    fn test_left_join_enrichment() {
        let fx = Fixture::new();
        let listfile = Listfile::from_entries([("135274", "interface/icons/inv_sword_04.blp")]);
        fx.table(
            "itemsparse.csv",
            "ID,Display_lang,OverallQualityID\n25,Worn Shortsword,1\n35,Bent Staff,1\n36,Worn Mace,x\n39,Recruit's Pants,1\n",
        )
        .table(
            "item.csv",
            "ID,ClassID,InventoryType,IconFileDataID\n25,2,13,135274\n39,4,7,0\n40,4,7,135274\n",
        )
        .asset("icons/inv_sword_04.png");

        let summary = fx.run(&ItemExtractor, &listfile);
        assert_eq!(summary.records, 3);
        assert_eq!(summary.skipped_rows, 1);
        assert_eq!(summary.images_copied, 1);

        assert_eq!(
            fx.json("items/25/data.json"),
            json!({
                "id": 25,
                "name": "Worn Shortsword",
                "quality": 1,
                "inventorySlot": 13,
                "icon": "interface/icons/inv_sword_04.blp"
            })
        );
        assert_eq!(
            fx.json("items/35/data.json"),
            json!({"id": 35, "name": "Bent Staff", "quality": 1})
        );
        assert_eq!(
            fx.json("items/39/data.json"),
            json!({"id": 39, "name": "Recruit's Pants", "quality": 1})
        );
        assert!(fx.exists("items/25/icon.png"));
        assert!(!fx.exists("items/36"));
        assert!(!fx.exists("items/40"));
    }

    #[test]
    fn test_bad_slot_leaves_seed_untouched() {
        let mut item = Item {
            id: 25,
            name: "Worn Shortsword".into(),
            quality: 1,
            inventory_slot: None,
            icon: AssetLookup::Unset,
        };
        let row = Row::from_pairs(2, &[("ID", "25"), ("InventoryType", "?"), ("IconFileDataID", "135274")]);
        let listfile = Listfile::from_entries([("135274", "interface/icons/inv_sword_04.blp")]);

        assert!(ItemExtractor.merge(&mut item, &row, &listfile).is_err());
        assert_eq!(item.inventory_slot, None);
        assert_eq!(item.icon, AssetLookup::Unset);
    }

    #[test]
    fn test_empty_icon_is_not_enrichment() {
        let fx = Fixture::new();
        fx.table("itemsparse.csv", "ID,Display_lang,OverallQualityID
6948,Hearthstone,1
")
            .table("item.csv", "ID,InventoryType,IconFileDataID
6948,0,
");

        let summary = fx.run(&ItemExtractor, &Listfile::default());
        assert_eq!(summary.images_missing, 0);
        assert_eq!(
            fx.json("items/6948/data.json"),
            json!({"id": 6948, "name": "Hearthstone", "quality": 1})
        );
    }

    #[test]
    fn test_missing_images_counts_listfile_and_disk_misses() {
        let fx = Fixture::new();
        let listfile = Listfile::from_entries([
            ("135274", "interface/icons/inv_sword_04.blp"),
            ("135641", "interface/icons/inv_sword_27.blp"),
        ]);
        fx.table(
            "itemsparse.csv",
            "ID,Display_lang,OverallQualityID
25,Worn Shortsword,1
2131,Shortsword,2
2132,Claymore,2
",
        )
        .table(
            "item.csv",
            "ID,InventoryType,IconFileDataID
25,13,404
2131,13,135641
2132,17,135274
",
        )
        .asset("icons/inv_sword_04.png");

        let summary = fx.run(&ItemExtractor, &listfile);
        assert_eq!(summary.images_copied, 1);
        // 25 misses the listfile, 2131 resolves but has no rendered asset
        assert_eq!(summary.images_missing, 2);

        assert_eq!(
            fx.json("items/25/data.json"),
            json!({"id": 25, "name": "Worn Shortsword", "quality": 1, "inventorySlot": 13})
        );
        assert!(!fx.exists("items/25/icon.png"));
        assert!(!fx.exists("items/2131/icon.png"));
        assert!(fx.exists("items/2132/icon.png"));
    }
}
