// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Web UI: list editors, file upload and suggestion review

use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Json, Response},
    routing::{delete, get, post, put},
    Router,
};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use uuid::Uuid;

use crate::categorize::{AllowLists, Categorizer};
use crate::config::AppConfig;
use crate::session::{PendingCategorization, Session, SessionSnapshot};
use crate::upload::{PreviewStore, UploadedFile};
use crate::SorterError;

/// Uploads larger than this are rejected by the body limit layer
const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Shared application state
pub struct AppState {
    pub session: Mutex<Session>,
    pub categorizer: Categorizer,
    pub previews: PreviewStore,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(config: AppConfig, categorizer: Categorizer) -> Self {
        let lists = AllowLists::new(config.lists.projects.clone(), config.lists.tags.clone());
        Self {
            session: Mutex::new(Session::new(lists)),
            categorizer,
            previews: PreviewStore::new(),
            config,
        }
    }
}

impl IntoResponse for SorterError {
    fn into_response(self) -> Response {
        let status = match &self {
            SorterError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            SorterError::InvalidEdit(_) | SorterError::EmptyAllowList => StatusCode::BAD_REQUEST,
            SorterError::Categorization | SorterError::Upstream(_) | SorterError::Api(_) => {
                StatusCode::BAD_GATEWAY
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

type ApiResult = std::result::Result<Json<SessionSnapshot>, SorterError>;

/// Create the web application router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Pages
        .route("/", get(index_page))
        .route("/preview/:id", get(preview))
        // API endpoints
        .route("/api/state", get(api_state))
        .route("/api/projects", post(api_add_project))
        .route("/api/projects/:name", delete(api_remove_project))
        .route("/api/tags", post(api_add_tag))
        .route("/api/tags/:name", delete(api_remove_tag))
        .route("/api/file", post(api_upload_file).delete(api_clear_file))
        .route("/api/result/project", put(api_set_project))
        .route("/api/result/tags", post(api_add_result_tag))
        .route("/api/result/tags/:name", delete(api_remove_result_tag))
        .route("/api/confirm", post(api_confirm))
        .route("/api/reject", post(api_reject))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// === Page Handlers ===

async fn index_page(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(render_index(&state.config))
}

async fn preview(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> std::result::Result<Response, StatusCode> {
    let preview = state.previews.get(&id).ok_or(StatusCode::NOT_FOUND)?;
    Ok((
        [(header::CONTENT_TYPE, preview.media_type)],
        preview.bytes.as_ref().clone(),
    )
        .into_response())
}

// === API Handlers ===

#[derive(Deserialize)]
struct NameBody {
    name: String,
}

#[derive(Deserialize)]
struct ProjectBody {
    project: String,
}

async fn api_state(State(state): State<Arc<AppState>>) -> Json<SessionSnapshot> {
    Json(state.session.lock().await.snapshot())
}

async fn api_add_project(State(state): State<Arc<AppState>>, Json(body): Json<NameBody>) -> Json<SessionSnapshot> {
    let mut session = state.session.lock().await;
    session.add_project(&body.name);
    Json(session.snapshot())
}

async fn api_remove_project(State(state): State<Arc<AppState>>, Path(name): Path<String>) -> Json<SessionSnapshot> {
    let mut session = state.session.lock().await;
    session.remove_project(&name);
    Json(session.snapshot())
}

async fn api_add_tag(State(state): State<Arc<AppState>>, Json(body): Json<NameBody>) -> Json<SessionSnapshot> {
    let mut session = state.session.lock().await;
    session.add_tag(&body.name);
    Json(session.snapshot())
}

async fn api_remove_tag(State(state): State<Arc<AppState>>, Path(name): Path<String>) -> Json<SessionSnapshot> {
    let mut session = state.session.lock().await;
    session.remove_tag(&name);
    Json(session.snapshot())
}

async fn api_upload_file(State(state): State<Arc<AppState>>, mut multipart: Multipart) -> ApiResult {
    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| SorterError::InvalidEdit(format!("bad upload: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let name = field.file_name().unwrap_or("unnamed").to_string();
        let media_type = field.content_type().unwrap_or("application/octet-stream").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| SorterError::InvalidEdit(format!("bad upload: {}", e)))?;
        upload = Some((name, media_type, bytes));
        break;
    }

    let (name, media_type, bytes) =
        upload.ok_or_else(|| SorterError::InvalidEdit("missing file field".to_string()))?;

    // Rejected here, the current file stays as it is
    let file = UploadedFile::from_bytes(name, media_type, &bytes, Some(&state.previews))?;

    let mut session = state.session.lock().await;
    if let Some(pending) = session.select_file(file) {
        tokio::spawn(run_categorization(state.clone(), pending));
    }
    Ok(Json(session.snapshot()))
}

/// Ask the model, then hand the outcome back to the session
async fn run_categorization(state: Arc<AppState>, pending: PendingCategorization) {
    let outcome = state.categorizer.execute(&pending.request, &pending.lists).await;
    let applied = state.session.lock().await.complete(pending.ticket, outcome);
    if !applied {
        info!("File changed while categorizing, result dropped");
    }
}

async fn api_clear_file(State(state): State<Arc<AppState>>) -> Json<SessionSnapshot> {
    let mut session = state.session.lock().await;
    session.clear_file();
    Json(session.snapshot())
}

async fn api_set_project(State(state): State<Arc<AppState>>, Json(body): Json<ProjectBody>) -> ApiResult {
    let mut session = state.session.lock().await;
    session.set_project(&body.project)?;
    Ok(Json(session.snapshot()))
}

async fn api_add_result_tag(State(state): State<Arc<AppState>>, Json(body): Json<NameBody>) -> ApiResult {
    let mut session = state.session.lock().await;
    session.add_result_tag(&body.name)?;
    Ok(Json(session.snapshot()))
}

async fn api_remove_result_tag(State(state): State<Arc<AppState>>, Path(name): Path<String>) -> ApiResult {
    let mut session = state.session.lock().await;
    session.remove_result_tag(&name)?;
    Ok(Json(session.snapshot()))
}

async fn api_confirm(State(state): State<Arc<AppState>>) -> ApiResult {
    let mut session = state.session.lock().await;
    let (ticket, _) = session.confirm()?;

    let delay = Duration::from_millis(state.config.web.confirm_reset_ms);
    let state_for_reset = state.clone();
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        if !state_for_reset.session.lock().await.reset_after_confirm(ticket) {
            warn!("Form changed before reset, leaving it as is");
        }
    });

    Ok(Json(session.snapshot()))
}

async fn api_reject(State(state): State<Arc<AppState>>) -> Json<SessionSnapshot> {
    let mut session = state.session.lock().await;
    session.reject();
    Json(session.snapshot())
}

// === Template Rendering ===

fn base_template(title: &str, content: &str) -> String {
    format!(r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{} - AI Knowledge Base Sorter</title>
    <style>
        :root {{
            --bg-primary: #111827;
            --bg-secondary: #1f2937;
            --bg-card: #374151;
            --text-primary: #f3f4f6;
            --text-secondary: #9ca3af;
            --accent: #3b82f6;
            --danger: #dc2626;
            --success: #16a34a;
            --border: #4b5563;
        }}
        * {{ box-sizing: border-box; margin: 0; padding: 0; }}
        body {{
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            background: var(--bg-primary);
            color: var(--text-primary);
            line-height: 1.6;
        }}
        .container {{ max-width: 1200px; margin: 0 auto; padding: 20px; }}
        header {{ text-align: center; margin-bottom: 30px; }}
        header h1 {{ color: var(--accent); }}
        header p {{ color: var(--text-secondary); }}
        .grid {{ display: grid; grid-template-columns: 1fr 1fr; gap: 20px; }}
        .card {{
            background: var(--bg-secondary);
            border-radius: 12px;
            padding: 20px;
            margin-bottom: 20px;
        }}
        .card h2 {{ margin-bottom: 15px; }}
        .row {{ display: flex; gap: 8px; margin-bottom: 10px; }}
        .row input, select {{
            flex: 1;
            width: 100%;
            background: var(--bg-primary);
            color: var(--text-primary);
            border: 1px solid var(--border);
            border-radius: 6px;
            padding: 6px 10px;
        }}
        button {{
            background: var(--accent);
            color: white;
            border: none;
            border-radius: 6px;
            padding: 6px 12px;
            cursor: pointer;
        }}
        button.secondary {{ background: var(--bg-card); }}
        button.danger {{ background: var(--danger); }}
        button.confirm {{ background: var(--success); }}
        ul.items {{ list-style: none; }}
        ul.items li {{
            display: flex;
            justify-content: space-between;
            background: var(--bg-primary);
            padding: 6px 10px;
            border-radius: 6px;
            margin-bottom: 4px;
        }}
        .tag {{
            display: inline-block;
            background: var(--accent);
            color: white;
            padding: 2px 8px;
            border-radius: 12px;
            font-size: 0.85em;
            margin: 2px;
            cursor: pointer;
        }}
        .drop {{
            border: 2px dashed var(--border);
            border-radius: 12px;
            padding: 40px;
            text-align: center;
        }}
        .drop.dragging {{ border-color: var(--accent); background: var(--bg-card); }}
        .error {{
            background: #7f1d1d;
            border: 1px solid #b91c1c;
            padding: 12px;
            border-radius: 8px;
            margin-bottom: 20px;
        }}
        pre {{ white-space: pre-wrap; max-height: 240px; overflow-y: auto; text-align: left; }}
        img {{ max-height: 240px; max-width: 100%; border-radius: 6px; }}
        .muted {{ color: var(--text-secondary); }}
    </style>
</head>
<body>
    <main class="container">
        {}
    </main>
</body>
</html>"#, title, content)
}

fn render_index(config: &AppConfig) -> String {
    let content = format!(r#"
        <header>
            <h1>AI Knowledge Base Sorter</h1>
            <p>Get AI-powered suggestions to categorize your files, then confirm or edit them yourself.</p>
            <p class="muted">Model: {}</p>
        </header>
        <div class="grid">
            <div>
                <div class="card">
                    <h2>Projects</h2>
                    <form class="row" data-list="projects">
                        <input name="name" placeholder="e.g., Household Finances">
                        <button type="submit">Add</button>
                    </form>
                    <ul class="items" id="projects"></ul>
                </div>
                <div class="card">
                    <h2>Tags</h2>
                    <form class="row" data-list="tags">
                        <input name="name" placeholder="e.g., tax-document">
                        <button type="submit">Add</button>
                    </form>
                    <ul class="items" id="tags"></ul>
                </div>
            </div>
            <div>
                <div class="card">
                    <h2>1. Upload File</h2>
                    <div id="file"></div>
                </div>
                <div id="error"></div>
                <div class="card">
                    <h2>2. Review Suggestion</h2>
                    <div id="result"></div>
                </div>
            </div>
        </div>
        <script>{}</script>
    "#, config.gemini.model, INDEX_SCRIPT);

    base_template("Sorter", &content)
}

const INDEX_SCRIPT: &str = r#"
const $ = (id) => document.getElementById(id);
const el = (tag, props = {}, children = []) => {
  const node = Object.assign(document.createElement(tag), props);
  children.forEach((c) => node.append(c));
  return node;
};
const enc = encodeURIComponent;
let polling = null;

async function call(method, url, body) {
  const opts = { method };
  if (body instanceof FormData) opts.body = body;
  else if (body !== undefined) {
    opts.headers = { 'content-type': 'application/json' };
    opts.body = JSON.stringify(body);
  }
  const res = await fetch(url, opts);
  const data = await res.json();
  if (!res.ok) { alert(data.error); return; }
  render(data);
}

function renderList(id, items, kind) {
  $(id).replaceChildren(...items.map((item) =>
    el('li', {}, [el('span', { textContent: item }),
      el('button', { className: 'danger', textContent: 'Remove',
        onclick: () => call('DELETE', `/api/${kind}/${enc(item)}`) })])));
}

function renderFile(s) {
  const box = $('file');
  if (!s.file) {
    const input = el('input', { type: 'file', accept: 'image/*,text/plain,text/markdown' });
    input.onchange = () => input.files[0] && upload(input.files[0]);
    const drop = el('div', { className: 'drop' }, [el('p', { textContent: 'Drag & Drop or Browse' }),
      el('p', { className: 'muted', textContent: 'Supports images and text files' }), input]);
    drop.ondragover = (e) => { e.preventDefault(); drop.classList.add('dragging'); };
    drop.ondragleave = () => drop.classList.remove('dragging');
    drop.ondrop = (e) => { e.preventDefault(); drop.classList.remove('dragging');
      if (e.dataTransfer.files.length) upload(e.dataTransfer.files[0]); };
    box.replaceChildren(drop);
    return;
  }
  const view = s.file.preview ? el('img', { src: s.file.preview, alt: 'Preview' })
    : el('pre', { textContent: s.file.text || '' });
  box.replaceChildren(view, el('p', { textContent: s.file.name }),
    el('p', { className: 'muted', textContent: `${s.file.size_kb} KB` }),
    el('button', { className: 'danger', textContent: 'Clear File', onclick: () => call('DELETE', '/api/file') }));
}

function renderResult(s) {
  const box = $('result');
  if (s.phase === 'analyzing') { box.replaceChildren(el('p', { textContent: 'AI is analyzing your file...' })); return; }
  if (s.phase === 'categorized') { box.replaceChildren(el('h2', { textContent: 'Categorized!' }),
    el('p', { className: 'muted', textContent: 'Ready for the next file.' })); return; }
  if (!s.edited) { box.replaceChildren(el('p', { className: 'muted',
    textContent: 'Suggestions will appear here once a file is processed.' })); return; }

  const project = el('select', {}, s.projects.map((p) => el('option', { value: p, textContent: p })));
  project.value = s.edited.project;
  project.onchange = () => call('PUT', '/api/result/project', { project: project.value });

  const tags = s.edited.tags.length ? s.edited.tags.map((t) => el('span', { className: 'tag',
    textContent: `${t} x`, onclick: () => call('DELETE', `/api/result/tags/${enc(t)}`) }))
    : [el('p', { className: 'muted', textContent: 'No tags suggested. Add one below.' })];

  const parts = [el('h3', { textContent: 'Project' }), project, el('h3', { textContent: 'Tags' }), el('div', {}, tags)];
  if (s.unselected_tags.length) {
    const add = el('select', {}, [el('option', { value: '', textContent: 'Add a tag...', disabled: true, selected: true }),
      ...s.unselected_tags.map((t) => el('option', { value: t, textContent: t }))]);
    add.onchange = () => add.value && call('POST', '/api/result/tags', { name: add.value });
    parts.push(add);
  }
  parts.push(el('div', { className: 'row' }, [
    el('button', { className: 'secondary', textContent: 'Reject', onclick: () => call('POST', '/api/reject') }),
    el('button', { className: 'confirm', textContent: 'Confirm', onclick: () => call('POST', '/api/confirm') })]));
  box.replaceChildren(...parts);
}

function render(s) {
  renderList('projects', s.projects, 'projects');
  renderList('tags', s.tags, 'tags');
  renderFile(s);
  renderResult(s);
  $('error').replaceChildren(...(s.error ? [el('div', { className: 'error' },
    [el('strong', { textContent: 'Error' }), el('p', { textContent: s.error })])] : []));
  const waiting = s.phase === 'analyzing' || s.phase === 'categorized';
  if (waiting && !polling) polling = setInterval(() => call('GET', '/api/state'), 500);
  if (!waiting && polling) { clearInterval(polling); polling = null; }
}

function upload(file) {
  const form = new FormData();
  form.append('file', file);
  call('POST', '/api/file', form);
}

document.querySelectorAll('form[data-list]').forEach((form) => {
  form.onsubmit = (e) => {
    e.preventDefault();
    call('POST', `/api/${form.dataset.list}`, { name: form.elements.namedItem('name').value });
    form.reset();
  };
});

call('GET', '/api/state');
"#;

/// Start the web server
pub async fn start_server(state: Arc<AppState>) -> crate::Result<()> {
    let addr = format!("{}:{}", state.config.web.host, state.config.web.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("Web UI available at http://{}", addr);

    let router = create_router(state);
    axum::serve(listener, router).await
        .map_err(|e| SorterError::Config(format!("Server error: {}", e)))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gemini::{ContentGenerator, GenerateRequest};
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use serde_json::Value;
    use tower::ServiceExt;

    struct FixedReply(&'static str);

    #[async_trait]
    impl ContentGenerator for FixedReply {
        async fn generate(&self, _request: &GenerateRequest) -> crate::Result<String> {
            Ok(self.0.to_string())
        }
    }

    fn state(reply: &'static str) -> Arc<AppState> {
        let mut config = AppConfig::default();
        config.lists.projects = vec!["Work".into(), "Personal".into()];
        config.lists.tags = vec!["Urgent".into(), "Invoice".into(), "Receipt".into()];
        config.web.confirm_reset_ms = 10;
        Arc::new(AppState::new(config, Categorizer::new(Arc::new(FixedReply(reply)))))
    }

    async fn send(state: &Arc<AppState>, request: Request<Body>) -> (StatusCode, Value) {
        let response = create_router(state.clone()).oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn upload_request(name: &str, media_type: &str, content: &[u8]) -> Request<Body> {
        let boundary = "XBOUNDARYX";
        let mut body = format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{n}\"\r\nContent-Type: {t}\r\n\r\n",
            b = boundary, n = name, t = media_type
        )
        .into_bytes();
        body.extend_from_slice(content);
        body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());

        Request::builder()
            .method("POST")
            .uri("/api/file")
            .header("content-type", format!("multipart/form-data; boundary={}", boundary))
            .body(Body::from(body))
            .unwrap()
    }

    async fn wait_for_phase(state: &Arc<AppState>, phase: &str) -> Value {
        for _ in 0..100 {
            let (_, snapshot) = send(state, Request::get("/api/state").body(Body::empty()).unwrap()).await;
            if snapshot["phase"] == phase {
                return snapshot;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("session never reached phase {}", phase);
    }

    #[tokio::test]
    async fn index_page_renders() {
        let state = state("{}");
        let response = create_router(state)
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let html = String::from_utf8_lossy(&body);
        assert!(html.contains("AI Knowledge Base Sorter"));
        assert!(html.contains("gemini-2.5-flash"));
    }

    #[tokio::test]
    async fn list_editing_round_trip() {
        let state = state("{}");
        let (status, snapshot) = send(&state, json_request("POST", "/api/tags", serde_json::json!({"name": " Idea "}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(snapshot["tags"], serde_json::json!(["Urgent", "Invoice", "Receipt", "Idea"]));

        let (_, snapshot) = send(
            &state,
            Request::delete("/api/projects/Personal").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(snapshot["projects"], serde_json::json!(["Work"]));
    }

    #[tokio::test]
    async fn upload_is_categorized_and_sanitized() {
        let state = state(r#"{"project": "NotInList", "tags": ["Urgent", "Bogus", "Invoice"]}"#);
        let (status, snapshot) = send(&state, upload_request("note.txt", "text/plain", b"hello")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(snapshot["file"]["text"], "hello");

        let snapshot = wait_for_phase(&state, "review").await;
        assert_eq!(snapshot["edited"]["project"], "Uncategorized");
        assert_eq!(snapshot["edited"]["tags"], serde_json::json!(["Urgent", "Invoice"]));
        assert_eq!(snapshot["unselected_tags"], serde_json::json!(["Receipt"]));
    }

    #[tokio::test]
    async fn unsupported_upload_is_rejected() {
        let state = state("{}");
        let (status, body) = send(&state, upload_request("doc.pdf", "application/pdf", b"%PDF")).await;
        assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert!(body["error"].as_str().unwrap().contains("application/pdf"));
    }

    #[tokio::test]
    async fn image_preview_is_served_until_cleared() {
        let state = state(r#"{"project": "Work", "tags": []}"#);
        let (_, snapshot) = send(&state, upload_request("a.png", "image/png", b"\x89PNG")).await;
        let preview = snapshot["file"]["preview"].as_str().unwrap().to_string();

        let response = create_router(state.clone())
            .oneshot(Request::get(preview.as_str()).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");

        send(&state, Request::delete("/api/file").body(Body::empty()).unwrap()).await;
        assert!(state.previews.is_empty());
        let response = create_router(state.clone())
            .oneshot(Request::get(preview.as_str()).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn edit_confirm_and_reset() {
        let state = state(r#"{"project": "Work", "tags": ["Urgent"]}"#);
        send(&state, upload_request("note.txt", "text/plain", b"invoice 42")).await;
        wait_for_phase(&state, "review").await;

        let (status, _) = send(&state, json_request("PUT", "/api/result/project", serde_json::json!({"project": "Nope"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        send(&state, json_request("PUT", "/api/result/project", serde_json::json!({"project": "Personal"}))).await;
        send(&state, json_request("POST", "/api/result/tags", serde_json::json!({"name": "Invoice"}))).await;
        let (_, snapshot) = send(&state, Request::delete("/api/result/tags/Urgent").body(Body::empty()).unwrap()).await;
        assert_eq!(snapshot["edited"], serde_json::json!({"project": "Personal", "tags": ["Invoice"]}));

        let (status, snapshot) = send(&state, Request::post("/api/confirm").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(snapshot["phase"], "categorized");

        wait_for_phase(&state, "idle").await;
    }

    #[tokio::test]
    async fn empty_lists_show_guidance() {
        let state = state("{}");
        for tag in ["Urgent", "Invoice", "Receipt"] {
            send(&state, Request::delete(format!("/api/tags/{}", tag)).body(Body::empty()).unwrap()).await;
        }
        let (_, snapshot) = send(&state, upload_request("note.txt", "text/plain", b"x")).await;
        assert_eq!(snapshot["phase"], "failed");
        assert_eq!(snapshot["error"], crate::error::EMPTY_LISTS_GUIDANCE);
    }
}
