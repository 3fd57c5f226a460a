//! Render Requests
//!
//! `RenderRequest` is what the composer consumes. `Initiative` mirrors the
//! upstream feed record so JSON can be handed over as-is.

use serde::{Deserialize, Serialize};

/// Entity id that selects the home banner instead of a card.
pub const HOME_ENTITY_ID: i64 = 0;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderRequest {
    pub entity_id: i64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

impl RenderRequest {
    pub fn new(entity_id: i64, title: impl Into<String>) -> Self {
        Self {
            entity_id,
            title: Some(title.into()),
            ..Default::default()
        }
    }

    /// The home banner request.
    pub fn home() -> Self {
        Self {
            entity_id: HOME_ENTITY_ID,
            ..Default::default()
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn is_home(&self) -> bool {
        self.entity_id == HOME_ENTITY_ID
    }

    /// Per-entity output file name used by batch generation.
    pub fn file_name(&self) -> String {
        format!("og-{}.png", self.entity_id)
    }
}

pub const DEFAULT_FILE_NAME: &str = "og-default.png";
pub const NUMBERS_FILE_NAME: &str = "og-numeri.png";

/// Lookup entry of the feed (category or status).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedRef {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub nome: Option<String>,
}

/// Initiative record as published by the data feed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Initiative {
    pub id: i64,
    #[serde(default)]
    pub titolo: Option<String>,
    #[serde(default)]
    pub data_apertura: Option<String>,
    #[serde(default)]
    pub id_dec_cat_iniziativa: Option<NamedRef>,
    #[serde(default)]
    pub id_dec_stato_iniziativa: Option<NamedRef>,
}

impl From<&Initiative> for RenderRequest {
    fn from(initiative: &Initiative) -> Self {
        Self {
            entity_id: initiative.id,
            title: initiative.titolo.clone(),
            category: initiative
                .id_dec_cat_iniziativa
                .as_ref()
                .and_then(|c| c.nome.clone()),
            status: initiative
                .id_dec_stato_iniziativa
                .as_ref()
                .and_then(|s| s.nome.clone()),
        }
    }
}

impl From<Initiative> for RenderRequest {
    fn from(initiative: Initiative) -> Self {
        Self::from(&initiative)
    }
}
