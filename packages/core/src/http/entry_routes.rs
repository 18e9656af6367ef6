//! Entry, navigation and redirect endpoints
//!
//! # Endpoints
//!
//! - `GET /api/health` - status, crate version and current structure version
//! - `GET /api/entry?url=|uid=|sid=[&version=]` - assembled entry
//! - `GET /api/toc?url=|uid=|sid=[&version=]` - nested table of contents
//! - `GET /api/menu?path=` - menus for a request path
//! - `GET /api/redirects` - `sid -> url` map

use axum::{
    extract::{Query, State},
    response::Json,
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::http_error::{HttpError, DOCUMENT_NOT_FOUND, INVALID_INPUT};
use super::AppState;
use crate::models::{DocumentMatch, Entry, Menus, TocMenu, VersionId};
use crate::navigation::normalize_url;

/// Document selector; `uid` wins over `sid`, `sid` over `url`
#[derive(Debug, Default, Deserialize)]
pub struct EntryQuery {
    pub url: Option<String>,
    pub uid: Option<String>,
    pub sid: Option<String>,
    pub version: Option<VersionId>,
}

impl EntryQuery {
    pub fn document_match(&self) -> Option<DocumentMatch> {
        let present = |v: &Option<String>| v.clone().filter(|s| !s.trim().is_empty());

        if let Some(uid) = present(&self.uid) {
            return Some(DocumentMatch::Uid(uid));
        }
        if let Some(sid) = present(&self.sid) {
            return Some(DocumentMatch::Sid(sid));
        }
        // The site root is a valid url
        self.url
            .as_deref()
            .map(|url| DocumentMatch::Url(normalize_url(url)))
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct MenuQuery {
    pub path: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
    pub structure_version: Option<VersionId>,
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/entry", get(get_entry))
        .route("/api/toc", get(get_toc))
        .route("/api/menu", get(get_menu))
        .route("/api/redirects", get(get_redirects))
        .with_state(state)
}

async fn health_check(State(state): State<AppState>) -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        structure_version: state.service.current_version().await,
    })
}

async fn load_entry(state: &AppState, query: &EntryQuery) -> Result<Entry, HttpError> {
    let key = query
        .document_match()
        .ok_or_else(|| HttpError::new("One of url, uid or sid is required", INVALID_INPUT))?;

    let entry = state.service.get_entry(&key, query.version).await?;
    if !entry.found {
        return Err(HttpError::new(
            format!("Document not found: {}={}", key.column(), key.value()),
            DOCUMENT_NOT_FOUND,
        ));
    }
    Ok(entry)
}

async fn get_entry(
    State(state): State<AppState>,
    Query(query): Query<EntryQuery>,
) -> Result<Json<Entry>, HttpError> {
    Ok(Json(load_entry(&state, &query).await?))
}

async fn get_toc(
    State(state): State<AppState>,
    Query(query): Query<EntryQuery>,
) -> Result<Json<TocMenu>, HttpError> {
    let entry = load_entry(&state, &query).await?;
    Ok(Json(state.service.toc(&entry)))
}

async fn get_menu(
    State(state): State<AppState>,
    Query(query): Query<MenuQuery>,
) -> Result<Json<Menus>, HttpError> {
    let path = query.path.unwrap_or_default();
    Ok(Json(state.service.menus(&path).await?))
}

async fn get_redirects(
    State(state): State<AppState>,
) -> Result<Json<BTreeMap<String, String>>, HttpError> {
    Ok(Json(state.service.redirects().await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::create_router;
    use crate::models::{ItemContent, ItemRecord};
    use crate::services::test_support::{document, Fixture};
    use crate::services::StructureService;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::Value;
    use std::sync::Arc;
    use tower::ServiceExt;

    async fn app() -> (Router, Fixture) {
        let fx = Fixture::new().await;
        for url in ["guide", "guide/intro"] {
            let doc = document(url, 1);
            fx.add(&doc).await;
            fx.writer
                .insert_item(&ItemRecord::new(
                    &doc.sid,
                    1,
                    0,
                    ItemContent::Heading { level: 1, text: format!("About {}", url) },
                ))
                .await
                .unwrap();
        }
        let service = StructureService::open(&fx.config()).await.unwrap();
        (create_router(AppState::new(Arc::new(service))), fx)
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[test]
    fn test_document_match_precedence() {
        let query = EntryQuery {
            url: Some("/a/".into()),
            sid: Some("s".into()),
            ..EntryQuery::default()
        };
        assert_eq!(query.document_match(), Some(DocumentMatch::Sid("s".into())));

        let query = EntryQuery {
            url: Some("/a/".into()),
            uid: Some(" ".into()),
            ..EntryQuery::default()
        };
        assert_eq!(query.document_match(), Some(DocumentMatch::Url("a".into())));

        assert_eq!(EntryQuery::default().document_match(), None);
    }

    #[tokio::test]
    async fn test_entry_endpoint() {
        let (app, _fx) = app().await;

        let (status, json) = get_json(app.clone(), "/api/entry?url=/guide/intro").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["found"], true);
        assert_eq!(json["headings"][0]["slug"], "about-guideintro");
        assert_eq!(json["items"][0]["type"], "heading");
        assert_eq!(json["items"][0]["position"]["start"]["line"], 1);

        let (status, json) = get_json(app.clone(), "/api/entry?uid=missing").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["code"], DOCUMENT_NOT_FOUND);

        let (status, _) = get_json(app, "/api/entry").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_menu_toc_and_redirects() {
        let (app, _fx) = app().await;

        let (status, menus) = get_json(app.clone(), "/api/menu?path=/guide/intro").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(menus["section"], "guide");
        assert_eq!(menus["section_tree"][0]["expanded"], true);
        assert_eq!(menus["section_tree"][0]["items"][0]["active"], true);

        let (_, toc) = get_json(app.clone(), "/api/toc?sid=sid-guide").await;
        assert_eq!(toc["visible"], true);
        assert_eq!(toc["items"][0]["link"], "#about-guide");

        let (_, redirects) = get_json(app, "/api/redirects").await;
        assert_eq!(redirects["sid-guide.intro"], "guide/intro");
    }
}
