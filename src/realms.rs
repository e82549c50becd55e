//! Connected realm topology sync
//!
//! Reads one JSON document per connected realm from `<root>/<region>/*.json`
//! and upserts realms and their members into SQLite.

use anyhow::{Context, Result};
use rusqlite::{params, Connection};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::info;

pub const REGIONS: &[&str] = &["us", "eu", "kr", "tw"];

const CREATE_TABLES: &str = "
    CREATE TABLE IF NOT EXISTS wow_connected_realms (
        id INTEGER PRIMARY KEY,
        region TEXT NOT NULL
    );
    CREATE TABLE IF NOT EXISTS wow_connected_realm_members (
        connected_realm_id INTEGER NOT NULL,
        realm_id INTEGER NOT NULL,
        PRIMARY KEY (connected_realm_id, realm_id)
    );";

const UPSERT_REALM: &str = "
    INSERT INTO wow_connected_realms (id, region) VALUES (?1, ?2)
    ON CONFLICT(id) DO UPDATE SET region = excluded.region";

const UPSERT_MEMBER: &str = "
    INSERT INTO wow_connected_realm_members (connected_realm_id, realm_id) VALUES (?1, ?2)
    ON CONFLICT(connected_realm_id, realm_id) DO NOTHING";

#[derive(Debug, Deserialize)]
struct ConnectedRealmFile {
    id: i64,
    realms: Vec<RealmRef>,
}

#[derive(Debug, Deserialize)]
struct RealmRef {
    id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectedRealm {
    pub id: i64,
    pub region: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RealmMember {
    pub connected_realm_id: i64,
    pub realm_id: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RealmSnapshot {
    pub realms: Vec<ConnectedRealm>,
    pub members: Vec<RealmMember>,
}

/// Load every region directory that exists under `root`
pub fn load_realms(root: &Path) -> Result<RealmSnapshot> {
    let mut snapshot = RealmSnapshot::default();

    for region in REGIONS {
        let dir = root.join(region);
        if !dir.is_dir() {
            continue;
        }

        let mut files = Vec::new();
        for entry in fs::read_dir(&dir).with_context(|| format!("Failed to read: {:?}", dir))? {
            let path = entry
                .with_context(|| format!("Failed to read entry in: {:?}", dir))?
                .path();
            if path.extension().and_then(|e| e.to_str()) == Some("json") {
                files.push(path);
            }
        }
        files.sort();

        for path in files {
            let text =
                fs::read_to_string(&path).with_context(|| format!("Failed to read: {:?}", path))?;
            let file: ConnectedRealmFile = serde_json::from_str(&text)
                .with_context(|| format!("Failed to parse connected realm: {:?}", path))?;

            snapshot.realms.push(ConnectedRealm {
                id: file.id,
                region: region.to_string(),
            });
            snapshot
                .members
                .extend(file.realms.iter().map(|r| RealmMember {
                    connected_realm_id: file.id,
                    realm_id: r.id,
                }));
        }
    }

    Ok(snapshot)
}

pub struct RealmStore {
    conn: Connection,
}

impl RealmStore {
    pub fn open(db_path: &Path) -> Result<Self> {
        let conn = Connection::open(db_path)
            .with_context(|| format!("Failed to open database: {:?}", db_path))?;
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(CREATE_TABLES)
            .context("Failed to create realm tables")?;
        Ok(Self { conn })
    }

    /// Upsert a snapshot in one transaction; replaying it is a no-op
    pub fn upsert(&mut self, snapshot: &RealmSnapshot) -> Result<()> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare_cached(UPSERT_REALM)?;
            for realm in &snapshot.realms {
                stmt.execute(params![realm.id, realm.region])?;
            }

            let mut stmt = tx.prepare_cached(UPSERT_MEMBER)?;
            for member in &snapshot.members {
                stmt.execute(params![member.connected_realm_id, member.realm_id])?;
            }
        }
        tx.commit()?;

        info!(
            realms = snapshot.realms.len(),
            members = snapshot.members.len(),
            "upserted connected realms"
        );
        Ok(())
    }

    pub fn realms(&self) -> Result<Vec<ConnectedRealm>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, region FROM wow_connected_realms ORDER BY id")?;
        let rows = stmt.query_map([], |row| {
            Ok(ConnectedRealm {
                id: row.get(0)?,
                region: row.get(1)?,
            })
        })?;
        let realms = rows.collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(realms)
    }

    pub fn members(&self) -> Result<Vec<RealmMember>> {
        let mut stmt = self.conn.prepare(
            "SELECT connected_realm_id, realm_id FROM wow_connected_realm_members
             ORDER BY connected_realm_id, realm_id",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(RealmMember {
                connected_realm_id: row.get(0)?,
                realm_id: row.get(1)?,
            })
        })?;
        let members = rows.collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(members)
    }
}

/// Load realm files and upsert them into the database at `db_path`
pub fn sync_realms(realms_dir: &Path, db_path: &Path) -> Result<RealmSnapshot> {
    let snapshot = load_realms(realms_dir)?;
    let mut store = RealmStore::open(db_path)?;
    store.upsert(&snapshot)?;
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_realm(root: &Path, region: &str, id: i64, members: &[i64]) {
        let dir = root.join(region);
        fs::create_dir_all(&dir).unwrap();
        let realms: Vec<_> = members
            .iter()
            .map(|m| serde_json::json!({"id": m, "name": format!("realm-{}", m)}))
            .collect();
        let doc = serde_json::json!({"id": id, "has_queue": false, "realms": realms});
        fs::write(dir.join(format!("{}.json", id)), doc.to_string()).unwrap();
    }

    #[test]
    fn test_load_realms() {
        let root = TempDir::new().unwrap();
        write_realm(root.path(), "us", 11, &[11, 12]);
        write_realm(root.path(), "eu", 1084, &[1084]);
        fs::write(root.path().join("us/notes.txt"), "ignored").unwrap();

        let snapshot = load_realms(root.path()).unwrap();
        assert_eq!(
            snapshot.realms,
            vec![
                ConnectedRealm { id: 11, region: "us".into() },
                ConnectedRealm { id: 1084, region: "eu".into() },
            ]
        );
        assert_eq!(snapshot.members.len(), 3);
    }

    #[test]
    fn test_malformed_file_is_fatal() {
        let root = TempDir::new().unwrap();
        fs::create_dir_all(root.path().join("kr")).unwrap();
        fs::write(root.path().join("kr/205.json"), "{\"id\": 205").unwrap();

        let err = load_realms(root.path()).unwrap_err();
        assert!(format!("{:#}", err).contains("205.json"));
    }

    #[test]
    fn test_upsert_is_idempotent_and_updates_region() {
        let mut store = RealmStore::open_in_memory().unwrap();
        let snapshot = RealmSnapshot {
            realms: vec![ConnectedRealm { id: 11, region: "us".into() }],
            members: vec![
                RealmMember { connected_realm_id: 11, realm_id: 11 },
                RealmMember { connected_realm_id: 11, realm_id: 12 },
            ],
        };

        store.upsert(&snapshot).unwrap();
        store.upsert(&snapshot).unwrap();
        assert_eq!(store.realms().unwrap(), snapshot.realms);
        assert_eq!(store.members().unwrap(), snapshot.members);

        let moved = RealmSnapshot {
            realms: vec![ConnectedRealm { id: 11, region: "eu".into() }],
            members: vec![],
        };
        store.upsert(&moved).unwrap();
        assert_eq!(store.realms().unwrap()[0].region, "eu");
        assert_eq!(store.members().unwrap().len(), 2);
    }

    #[test]
    fn test_sync_realms_to_file() {
        let root = TempDir::new().unwrap();
        write_realm(root.path(), "tw", 963, &[963, 966]);
        let db = root.path().join("realms.sqlite");

        sync_realms(root.path(), &db).unwrap();
        sync_realms(root.path(), &db).unwrap();

        let store = RealmStore::open(&db).unwrap();
        assert_eq!(store.realms().unwrap().len(), 1);
        assert_eq!(store.members().unwrap().len(), 2);
    }
}
