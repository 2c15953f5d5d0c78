use serde::Deserialize;
use serde_json::{Map, Value};
use std::sync::Arc;

use crate::config::Config;
use crate::error::Result;
use crate::models::{CandidateMatch, EntityType};
use crate::scoring::{is_exact_match, rank, score};
use crate::upstream::discogs_headers;
use crate::worker::RateGate;

// Discogs search response, only the part we read
#[derive(Deserialize)]
struct SearchPage {
    #[serde(default)]
    results: Vec<Map<String, Value>>,
}

/// Turns free text into scored Discogs candidates.
#[derive(Clone)]
pub struct SearchAdapter {
    gate: RateGate,
    config: Arc<Config>,
}

impl SearchAdapter {
    pub fn new(gate: RateGate, config: Arc<Config>) -> Self {
        Self { gate, config }
    }

    /// Never fails: upstream trouble is logged and yields no candidates.
    pub async fn search(&self, query: &str, kind: EntityType, limit: usize) -> Vec<CandidateMatch> {
        match self.fetch(query, kind).await {
            Ok(items) => {
                let candidates = items
                    .iter()
                    .filter_map(|item| self.candidate(query, kind, item))
                    .collect();
                rank(candidates, limit)
            }
            Err(e) => {
                tracing::warn!(query, kind = kind.id(), "Discogs search failed: {e}");
                Vec::new()
            }
        }
    }

    async fn fetch(&self, query: &str, kind: EntityType) -> Result<Vec<Map<String, Value>>> {
        let url = search_url(&self.config.api_base, query, kind, &self.config.token);
        tracing::debug!(
            "Discogs API url is {}",
            search_url(&self.config.api_base, query, kind, "<redacted>")
        );

        let response = self
            .gate
            .execute(url, discogs_headers(&self.config.token))
            .await?;
        let page: SearchPage = response.json()?;
        tracing::debug!(query, hits = page.results.len(), "Discogs search answered");
        Ok(page.results)
    }

    fn candidate(&self, query: &str, kind: EntityType, item: &Map<String, Value>) -> Option<CandidateMatch> {
        let Some(discogs_id) = item.get("id").and_then(id_segment) else {
            tracing::debug!(query, "Skipping search result without an id");
            return None;
        };
        let name = kind
            .name_fields()
            .iter()
            .find_map(|field| item.get(*field).and_then(Value::as_str))
            .filter(|name| !name.is_empty());
        let catalog_number = item
            .get("catno")
            .and_then(Value::as_str)
            .unwrap_or("N/A")
            .to_string();

        Some(CandidateMatch {
            id: entity_uri(&self.config.public_base, kind, &discogs_id),
            name: name.unwrap_or("Unknown").to_string(),
            score: score(query, name),
            is_exact_match: is_exact_match(query, name),
            types: vec![kind.descriptor()],
            catalog_number,
        })
    }
}

pub fn search_url(api_base: &str, query: &str, kind: EntityType, token: &str) -> String {
    format!(
        "{api_base}/database/search?q={}&type={}&token={}",
        urlencoding::encode(query),
        kind.slug(),
        urlencoding::encode(token)
    )
}

pub fn entity_uri(public_base: &str, kind: EntityType, discogs_id: &str) -> String {
    format!("{public_base}/{}/{discogs_id}", kind.slug())
}

// Discogs ids are numbers, tolerate them arriving as strings
fn id_segment(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}
