//! Source table definitions for the client CSV exports

use super::types::SourceTable;

// =============================================================================
// Shared
// =============================================================================

/// Semicolon separated `id;path` lookup, read by the listfile resolver
pub const LISTFILE: &str = "listfile.csv";

pub static MAP: SourceTable = SourceTable::new(
    "map",
    "map.csv",
    &["ID", "MapName_lang", "InstanceType", "ExpansionID", "LoadingScreenID"],
);

// =============================================================================
// Entity Extractors
// =============================================================================

pub static DIFFICULTY: SourceTable =
    SourceTable::new("difficulty", "difficulty.csv", &["ID", "Name_lang"]);

pub static CHR_CLASSES: SourceTable = SourceTable::new(
    "chr_classes",
    "chrclasses.csv",
    &["ID", "Name_lang", "IconFileDataID"],
);

pub static CHR_SPECIALIZATION: SourceTable = SourceTable::new(
    "chr_specialization",
    "chrspecialization.csv",
    &["ID", "Name_lang", "ClassID", "SpellIconFileID"],
);

pub static LOADING_SCREENS: SourceTable = SourceTable::new(
    "loading_screens",
    "loadingscreens.csv",
    &[
        "ID",
        "MainImageFileDataID",
        "WideScreen169FileDataID",
        "WideScreenFileDataID",
        "NarrowScreenFileDataID",
    ],
);

pub static SPELL_NAME: SourceTable =
    SourceTable::new("spell_name", "spellname.csv", &["ID", "Name_lang"]);

pub static SPELL_MISC: SourceTable = SourceTable::new(
    "spell_misc",
    "spellmisc.csv",
    &["SpellID", "SpellIconFileDataID"],
);

pub static ITEM_SPARSE: SourceTable = SourceTable::new(
    "item_sparse",
    "itemsparse.csv",
    &["ID", "Display_lang", "OverallQualityID"],
);

pub static ITEM: SourceTable = SourceTable::new(
    "item",
    "item.csv",
    &["ID", "IconFileDataID", "InventoryType"],
);

// =============================================================================
// Warehouse Lists
// =============================================================================

/// The warehouse lists only need the map columns that drive filtering
pub static WAREHOUSE_MAP: SourceTable = SourceTable::new(
    "map",
    "map.csv",
    &["ID", "MapName_lang", "InstanceType", "ExpansionID"],
);

pub static DUNGEON_ENCOUNTER: SourceTable = SourceTable::new(
    "dungeon_encounter",
    "dungeonencounter.csv",
    &["ID", "Name_lang", "MapID"],
);

// =============================================================================
// Registry
// =============================================================================

/// Every table the extractors read
pub static ALL_TABLES: &[&SourceTable] = &[
    &DIFFICULTY,
    &CHR_CLASSES,
    &CHR_SPECIALIZATION,
    &MAP,
    &LOADING_SCREENS,
    &SPELL_NAME,
    &SPELL_MISC,
    &ITEM_SPARSE,
    &ITEM,
    &DUNGEON_ENCOUNTER,
];
