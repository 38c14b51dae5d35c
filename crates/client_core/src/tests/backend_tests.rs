use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::Mutex};

use super::*;

#[derive(Clone, Default)]
struct ServerState {
    bodies: Arc<Mutex<Vec<Value>>>,
}

fn ayat_al_kursi() -> Value {
    json!({
        "verse_key": "2:255",
        "arabic": "ٱللَّهُ لَآ إِلَـٰهَ إِلَّا هُوَ",
        "eng_translation": "Allah - there is no deity except Him<sup foot_note=1>1</sup>",
        "urdu_translation": "خدا (وہ معبود برحق ہے)",
    })
}

async fn handle_search(State(state): State<ServerState>, Json(body): Json<Value>) -> Response {
    state.bodies.lock().await.push(body);
    Json(json!([
        ayat_al_kursi(),
        {
            "verse_key": "2:153",
            "arabic": "يَـٰٓأَيُّهَا",
            "eng_translation": "seek help through patience"
        },
    ]))
    .into_response()
}

async fn handle_verse(Path(reference): Path<String>) -> Response {
    if reference == "2:255" {
        return Json(ayat_al_kursi()).into_response();
    }
    (StatusCode::NOT_FOUND, Json(json!({"error": "Verse not found"}))).into_response()
}

async fn handle_suggest(State(state): State<ServerState>, Json(body): Json<Value>) -> Response {
    state.bodies.lock().await.push(body);
    let mut record = ayat_al_kursi();
    record["eng_tafseer"] = json!("This verse affirms the sovereignty of Allah.");
    record["urdu_tafseer"] = json!("یہ آیت اللہ کی حاکمیت کو بیان کرتی ہے۔");
    Json(record).into_response()
}

async fn handle_tafseer(State(state): State<ServerState>, Json(body): Json<Value>) -> Response {
    state.bodies.lock().await.push(body.clone());
    if body["language"] == "urdu" {
        return (StatusCode::BAD_GATEWAY, "upstream model unavailable").into_response();
    }
    let key = body["verseKey"].as_str().unwrap_or_default();
    Json(json!({ "tafseer": format!("<p>Tafseer of {key}</p>") })).into_response()
}

async fn spawn_verse_server() -> anyhow::Result<(String, ServerState)> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let state = ServerState::default();
    let app = Router::new()
        .route("/api/search", post(handle_search))
        .route("/api/verse/:reference", get(handle_verse))
        .route("/api/suggest", post(handle_suggest))
        .route("/api/tafseer", post(handle_tafseer))
        .with_state(state.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok((format!("http://{addr}/api"), state))
}

fn settings(api_base_url: String, api_key: Option<&str>) -> ClientSettings {
    ClientSettings {
        api_base_url,
        api_key: api_key.map(str::to_owned),
        ..ClientSettings::default()
    }
}

#[tokio::test]
async fn search_posts_query_and_limit() {
    let (base_url, state) = spawn_verse_server().await.expect("spawn server");
    let backend = HttpBackend::new(&settings(base_url, None)).expect("backend");

    let verses = backend.search("patience", 2).await.expect("search");

    assert_eq!(verses.len(), 2);
    assert_eq!(verses[0].key.as_str(), "2:255");
    assert_eq!(
        verses[0].primary_translation,
        "Allah - there is no deity except Him<sup foot_note=1>1</sup>"
    );
    assert!(verses[0].commentary.is_none());
    assert_eq!(verses[1].secondary_translation, "");
    assert_eq!(
        state.bodies.lock().await.clone(),
        vec![json!({"query": "patience", "numResults": 2})]
    );
}

#[tokio::test]
async fn lookup_fetches_reference_path() {
    let (base_url, _state) = spawn_verse_server().await.expect("spawn server");
    let backend = HttpBackend::new(&settings(format!("{base_url}/"), None)).expect("backend");

    let verse = backend.lookup("2:255").await.expect("lookup");

    assert_eq!(verse.key.as_str(), "2:255");
    assert_eq!(verse.arabic_text, "ٱللَّهُ لَآ إِلَـٰهَ إِلَّا هُوَ");
}

#[tokio::test]
async fn lookup_failure_carries_backend_message() {
    let (base_url, _state) = spawn_verse_server().await.expect("spawn server");
    let backend = HttpBackend::new(&settings(base_url, None)).expect("backend");

    let err = backend.lookup("200:1").await.expect_err("missing verse");

    match err {
        ClientError::Backend { status, message } => {
            assert_eq!(status, 404);
            assert_eq!(message, "Verse not found");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn suggestion_sends_key_and_returns_prefilled_commentary() {
    let (base_url, state) = spawn_verse_server().await.expect("spawn server");
    let backend = HttpBackend::new(&settings(base_url, Some("test-key"))).expect("backend");

    let verse = backend.suggest("feeling anxious").await.expect("suggest");

    let commentary = verse.commentary.expect("prefilled commentary");
    assert_eq!(commentary.primary, "This verse affirms the sovereignty of Allah.");
    assert_eq!(
        state.bodies.lock().await.clone(),
        vec![json!({"problem": "feeling anxious", "apiKey": "test-key"})]
    );
}

#[tokio::test]
async fn ai_requests_need_a_configured_key() {
    let (base_url, state) = spawn_verse_server().await.expect("spawn server");
    let backend = HttpBackend::new(&settings(base_url, Some("  "))).expect("backend");

    let err = backend.suggest("feeling anxious").await.expect_err("no key");
    assert!(matches!(err, ClientError::MissingApiKey("suggestion")));

    let err = backend
        .generate_commentary(&VerseKey::new("2:255"), "text", Language::Primary)
        .await
        .expect_err("no key");
    assert!(matches!(err, ClientError::MissingApiKey("commentary")));

    assert!(state.bodies.lock().await.is_empty());
}

#[tokio::test]
async fn commentary_request_carries_source_text_and_language() {
    let (base_url, state) = spawn_verse_server().await.expect("spawn server");
    let backend = HttpBackend::new(&settings(base_url, Some("test-key"))).expect("backend");

    let text = backend
        .generate_commentary(
            &VerseKey::new("2:255"),
            "Allah - there is no deity except Him",
            Language::Primary,
        )
        .await
        .expect("commentary");

    assert_eq!(text, "<p>Tafseer of 2:255</p>");
    assert_eq!(
        state.bodies.lock().await.clone(),
        vec![json!({
            "verseKey": "2:255",
            "translation": "Allah - there is no deity except Him",
            "language": "english",
            "apiKey": "test-key",
        })]
    );
}

#[tokio::test]
async fn unparseable_error_body_falls_back_to_status() {
    let (base_url, _state) = spawn_verse_server().await.expect("spawn server");
    let backend = HttpBackend::new(&settings(base_url, Some("test-key"))).expect("backend");

    let err = backend
        .generate_commentary(&VerseKey::new("2:255"), "خدا", Language::Secondary)
        .await
        .expect_err("upstream failure");

    match err {
        ClientError::Backend { status, message } => {
            assert_eq!(status, 502);
            assert_eq!(message, "Bad Gateway");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn rejects_unusable_base_urls() {
    for raw in ["not a url", "mailto:someone@example.com"] {
        let err = HttpBackend::new(&settings(raw.to_string(), None))
            .err()
            .expect("invalid base url");
        assert!(matches!(err, ClientError::InvalidBaseUrl(_)));
    }
}
