use axum::extract::rejection::{FormRejection, QueryRejection};
use axum::extract::{Form, Query, State};
use axum::http::StatusCode;
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Instant;

use crate::metrics::{RECONCILE_QUERIES, REQUEST_LATENCY};
use crate::models::{CandidateMatch, EntityType, service_metadata};
use crate::scoring::MAX_RESULTS;
use crate::state::AppState;

// Parameters accepted from the query string or a urlencoded body
#[derive(Debug, Default, Deserialize)]
pub struct ReconcileParams {
    pub queries: Option<String>,
    pub query: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub limit: Option<String>,
    pub callback: Option<String>,
}

impl ReconcileParams {
    // Fill gaps from another source, own values win
    fn or(self, other: Self) -> Self {
        Self {
            queries: self.queries.or(other.queries),
            query: self.query.or(other.query),
            kind: self.kind.or(other.kind),
            limit: self.limit.or(other.limit),
            callback: self.callback.or(other.callback),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct QueryResult {
    pub result: Vec<CandidateMatch>,
}

// GET|POST /reconcile
pub async fn reconcile_handler(
    State(state): State<AppState>,
    query: Result<Query<ReconcileParams>, QueryRejection>,
    form: Result<Form<ReconcileParams>, FormRejection>,
) -> Response {
    let start_time = Instant::now();
    let from_query = query.map(|Query(params)| params).unwrap_or_default();
    let params = form
        .map(|Form(params)| params)
        .unwrap_or_default()
        .or(from_query);
    let callback = params.callback.as_deref().filter(|cb| {
        let valid = is_callback_name(cb);
        if !valid && !cb.is_empty() {
            tracing::warn!(callback = cb, "Ignoring invalid JSONP callback name");
        }
        valid
    });

    let response = if let Some(raw) = non_blank(params.queries.as_deref()) {
        let results = reconcile_batch(&state, raw).await;
        respond(&results, callback)
    } else if let Some(raw) = non_blank(params.query.as_deref()) {
        let result = reconcile_single(&state, raw, params.kind.as_deref(), params.limit.as_deref()).await;
        respond(&QueryResult { result }, callback)
    } else {
        respond(&service_metadata(), callback)
    };

    REQUEST_LATENCY.observe(start_time.elapsed().as_secs_f64());
    response
}

// {"q0": {"query": "...", "type": "..."}, ...} -> {"q0": {"result": [...]}, ...}
async fn reconcile_batch(state: &AppState, raw: &str) -> BTreeMap<String, QueryResult> {
    let mut results = BTreeMap::new();
    let queries = match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(queries)) => queries,
        Ok(_) => {
            tracing::warn!("Ignoring queries batch that is not a JSON object");
            return results;
        }
        Err(e) => {
            tracing::warn!("Ignoring malformed queries batch: {e}");
            return results;
        }
    };

    tracing::debug!(keys = queries.len(), "Reconciling batch");
    for (key, entry) in queries {
        let result = run_query(state, &entry, None).await;
        results.insert(key, QueryResult { result });
    }
    results
}

// `query` is either plain text or a JSON object shaped like one batch entry
async fn reconcile_single(
    state: &AppState,
    raw: &str,
    kind: Option<&str>,
    limit: Option<&str>,
) -> Vec<CandidateMatch> {
    let mut entry = match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(object)) => object,
        parsed => {
            // a JSON string literal is searched without its quotes
            let text = match parsed {
                Ok(Value::String(text)) => text,
                _ => raw.to_string(),
            };
            let mut object = serde_json::Map::new();
            object.insert("query".to_string(), Value::String(text));
            object
        }
    };
    if let Some(kind) = kind {
        entry.entry("type").or_insert_with(|| Value::String(kind.to_string()));
    }
    if let Some(limit) = limit {
        entry.entry("limit").or_insert_with(|| Value::String(limit.to_string()));
    }

    run_query(state, &Value::Object(entry), Some(EntityType::Artist)).await
}

async fn run_query(state: &AppState, entry: &Value, default_kind: Option<EntityType>) -> Vec<CandidateMatch> {
    let Some(text) = entry.get("query").and_then(Value::as_str) else {
        return Vec::new();
    };

    let kind = match entry.get("type") {
        Some(Value::String(id)) => EntityType::from_id(id),
        None | Some(Value::Null) => default_kind,
        Some(_) => None,
    };
    let Some(kind) = kind else {
        tracing::debug!(query = text, "No supported type given, skipping search");
        return Vec::new();
    };

    RECONCILE_QUERIES.inc();
    state.search.search(text, kind, query_limit(entry)).await
}

fn query_limit(entry: &Value) -> usize {
    let limit = match entry.get("limit") {
        Some(Value::Number(n)) => n.as_u64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    };
    limit
        .and_then(|n| usize::try_from(n).ok())
        .unwrap_or(MAX_RESULTS)
}

// JSONP callbacks are plain (dotted) identifiers, nothing else gets echoed as script
fn is_callback_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '$' | '.'))
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

// JSON, or a JSONP call when the client asked for one
fn respond<T: Serialize>(body: &T, callback: Option<&str>) -> Response {
    let json = match serde_json::to_string(body) {
        Ok(json) => json,
        Err(e) => return (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    };

    match callback {
        Some(callback) => (
            [(CONTENT_TYPE, "text/javascript")],
            format!("{callback}({json})"),
        )
            .into_response(),
        None => ([(CONTENT_TYPE, "application/json")], json).into_response(),
    }
}
