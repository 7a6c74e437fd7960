//! Card metadata boundary.
//!
//! The engine never ships card data itself; it consults a [`CardDatabase`]
//! keyed by the textual card id the client logs (`CS2_029`). A miss is
//! never fatal: the fact that needed it is dropped with a diagnostic.

use std::fs;
use std::path::{Path, PathBuf};

use hashbrown::HashMap;
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardInfo {
    pub id: u32,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecretKind {
    Secret { class: String },
    Quest { requirement: u32 },
}

pub trait CardDatabase: Send + Sync {
    fn card(&self, card_code: &str) -> Option<CardInfo>;

    /// Secret/quest metadata for cards that can occupy the secret zone.
    fn secret(&self, card_code: &str) -> Option<SecretKind>;
}

#[derive(Debug, thiserror::Error)]
pub enum CardTableError {
    #[error("failed to read card table {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse card table {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// One row of the JSON card table.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CardRecord {
    card_id: String,
    dbf_id: u32,
    name: String,
    #[serde(default)]
    secret: Option<SecretRecord>,
    #[serde(default)]
    quest: Option<QuestRecord>,
}

#[derive(Debug, Clone, Deserialize)]
struct SecretRecord {
    class: String,
}

#[derive(Debug, Clone, Deserialize)]
struct QuestRecord {
    requirement: u32,
}

#[derive(Debug, Clone)]
struct TableEntry {
    info: CardInfo,
    secret: Option<SecretKind>,
}

/// In-memory card table.
#[derive(Debug, Clone, Default)]
pub struct CardTable {
    entries: HashMap<String, TableEntry>,
}

impl CardTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a JSON array of `{ cardId, dbfId, name, secret?, quest? }` rows.
    pub fn load(path: &Path) -> Result<Self, CardTableError> {
        let raw = fs::read_to_string(path).map_err(|e| CardTableError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let table = Self::from_json(&raw).map_err(|e| CardTableError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;
        tracing::info!(cards = table.len(), path = %path.display(), "Loaded card table");
        Ok(table)
    }

    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        let records: Vec<CardRecord> = serde_json::from_str(raw)?;
        let mut table = Self::new();
        for record in records {
            let secret = match (record.quest, record.secret) {
                (Some(q), _) => Some(SecretKind::Quest {
                    requirement: q.requirement,
                }),
                (None, Some(s)) => Some(SecretKind::Secret { class: s.class }),
                (None, None) => None,
            };
            table.entries.insert(
                record.card_id,
                TableEntry {
                    info: CardInfo {
                        id: record.dbf_id,
                        name: record.name,
                    },
                    secret,
                },
            );
        }
        Ok(table)
    }

    pub fn insert(&mut self, card_code: &str, id: u32, name: &str) -> &mut Self {
        self.entries.insert(
            card_code.to_string(),
            TableEntry {
                info: CardInfo {
                    id,
                    name: name.to_string(),
                },
                secret: None,
            },
        );
        self
    }

    pub fn insert_secret(&mut self, card_code: &str, id: u32, name: &str, class: &str) -> &mut Self {
        self.insert(card_code, id, name);
        if let Some(entry) = self.entries.get_mut(card_code) {
            entry.secret = Some(SecretKind::Secret {
                class: class.to_string(),
            });
        }
        self
    }

    pub fn insert_quest(&mut self, card_code: &str, id: u32, name: &str, requirement: u32) -> &mut Self {
        self.insert(card_code, id, name);
        if let Some(entry) = self.entries.get_mut(card_code) {
            entry.secret = Some(SecretKind::Quest { requirement });
        }
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl CardDatabase for CardTable {
    fn card(&self, card_code: &str) -> Option<CardInfo> {
        if card_code.is_empty() {
            return None;
        }
        self.entries.get(card_code).map(|e| e.info.clone())
    }

    fn secret(&self, card_code: &str) -> Option<SecretKind> {
        self.entries.get(card_code).and_then(|e| e.secret.clone())
    }
}
