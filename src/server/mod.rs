//! HTTP server: JSON content API, live reload channel and static fallback
//!
//! The fallback serves the editor front-end build found in `public_dir`. In
//! watch mode every HTML page it serves carries a small client that listens
//! on `/__livereload` and reloads the page when content changes.

mod api;

use anyhow::Result;
use axum::{
    body::Body,
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    http::{Request, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Router,
};
use notify_debouncer_mini::{new_debouncer, notify::RecursiveMode};
use std::net::SocketAddr;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::content::path::decode_component;
use crate::content::MarkdownRenderer;
use crate::Board;

pub use api::ApiError;

/// Reload client appended to HTML pages in watch mode
const LIVE_RELOAD_CLIENT: &str = r#"<script>
(function() {
    var socket = new WebSocket('ws://' + location.host + '/__livereload');
    socket.onmessage = function(msg) {
        if (msg.data === 'reload') {
            location.reload();
        }
    };
    socket.onclose = function() {
        setTimeout(function() { location.reload(); }, 1000);
    };
})();
</script>
"#;

/// Server state shared by all handlers
pub struct ServerState {
    board: Board,
    renderer: MarkdownRenderer,
    reload_tx: broadcast::Sender<()>,
    live_reload: bool,
}

impl ServerState {
    pub fn new(board: Board) -> Result<Self> {
        let renderer = MarkdownRenderer::with_theme(&board.config.highlight_theme)?;
        let (reload_tx, _) = broadcast::channel::<()>(16);
        Ok(Self {
            board,
            renderer,
            reload_tx,
            live_reload: false,
        })
    }

    /// Inject the reload client into served HTML pages
    pub fn with_live_reload(mut self, enabled: bool) -> Self {
        self.live_reload = enabled;
        self
    }
}

/// Build the application router
pub fn router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/api/site", get(api::site_info))
        .route("/api/posts", get(api::list_posts))
        .route("/api/posts/recent", get(api::recent_posts))
        .route("/api/categories", get(api::list_categories))
        .route("/api/blog/*path", get(api::blog_page))
        .route("/api/tags", get(api::list_tags))
        .route("/api/tags/:tag", get(api::tag_posts))
        .route("/api/create-post", post(api::create_post))
        .route("/api/update-post", post(api::update_post))
        .route("/api/delete-post", post(api::delete_post))
        .route("/__livereload", get(livereload_handler))
        .fallback(static_page)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the server
pub async fn start(board: &Board, ip: &str, port: u16, watch: bool) -> Result<()> {
    let state = Arc::new(ServerState::new(board.clone())?.with_live_reload(watch));
    let app = router(Arc::clone(&state));

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    println!("Server running at http://{}:{}", ip, port);
    println!("Serving posts from {:?}", board.content_dir);

    if watch {
        println!("Live reload enabled. Watching for changes...");
        let watched = vec![board.content_dir.clone(), board.base_dir.join(crate::CONFIG_FILE)];
        let reload_tx = state.reload_tx.clone();
        tokio::task::spawn_blocking(move || {
            if let Err(e) = watch_and_notify(watched, reload_tx) {
                tracing::error!("File watcher error: {}", e);
            }
        });
    }
    println!("Press Ctrl+C to stop.");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Watch content and config for changes and notify live reload clients
fn watch_and_notify(paths: Vec<PathBuf>, reload_tx: broadcast::Sender<()>) -> Result<()> {
    let (tx, rx) = std::sync::mpsc::channel();

    // Create debouncer to coalesce editor save bursts
    let mut debouncer = new_debouncer(Duration::from_millis(500), tx)?;

    for path in &paths {
        if !path.exists() {
            continue;
        }
        let mode = if path.is_dir() {
            RecursiveMode::Recursive
        } else {
            RecursiveMode::NonRecursive
        };
        debouncer.watcher().watch(path, mode)?;
        tracing::debug!("Watching: {:?}", path);
    }

    loop {
        match rx.recv() {
            Ok(Ok(events)) => {
                let changed: Vec<_> = events
                    .iter()
                    .filter(|e| {
                        let path_str = e.path.to_string_lossy();
                        !path_str.contains(".git")
                            && !path_str.contains(".DS_Store")
                            && !path_str.ends_with('~')
                    })
                    .collect();

                if changed.is_empty() {
                    continue;
                }

                for event in &changed {
                    tracing::info!("Content changed: {}", event.path.display());
                }
                // No receivers just means no browser is connected
                let _ = reload_tx.send(());
            }
            Ok(Err(e)) => {
                tracing::error!("Watch error: {:?}", e);
            }
            Err(e) => {
                tracing::error!("Channel error: {:?}", e);
                break;
            }
        }
    }

    Ok(())
}

/// WebSocket handler for live reload
async fn livereload_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<ServerState>>,
) -> impl IntoResponse {
    let reload_rx = state.reload_tx.subscribe();
    ws.on_upgrade(move |socket| handle_livereload_socket(socket, reload_rx))
}

async fn handle_livereload_socket(mut socket: WebSocket, mut reload_rx: broadcast::Receiver<()>) {
    tracing::debug!("Live reload client connected");

    loop {
        tokio::select! {
            result = reload_rx.recv() => {
                match result {
                    Ok(_) => {
                        if socket.send(Message::Text("reload".to_string())).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                }
            }
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    _ => {}
                }
            }
        }
    }

    tracing::debug!("Live reload client disconnected");
}

/// Fallback handler serving `public_dir`, with the reload client injected in watch mode
async fn static_page(State(state): State<Arc<ServerState>>, request: Request<Body>) -> Response {
    let public_dir = &state.board.public_dir;

    if state.live_reload {
        if let Some(page) = html_page(public_dir, request.uri().path()) {
            match tokio::fs::read_to_string(&page).await {
                Ok(html) => return Html(inject_live_reload(&html)).into_response(),
                Err(e) => tracing::debug!("Failed to read {:?}: {}", page, e),
            }
        }
    }

    let mut service = ServeDir::new(public_dir).append_index_html_on_directories(true);
    match service.try_call(request).await {
        Ok(response) => response.into_response(),
        Err(e) => {
            tracing::error!("Static file error: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response()
        }
    }
}

/// The HTML file below `public_dir` that a request path points at
fn html_page(public_dir: &Path, uri_path: &str) -> Option<PathBuf> {
    let decoded = decode_component(uri_path);
    let relative = Path::new(decoded.trim_start_matches('/'));
    if relative
        .components()
        .any(|c| !matches!(c, Component::Normal(_)))
    {
        return None;
    }

    let candidate = public_dir.join(relative);
    let file = if candidate.is_dir() {
        candidate.join("index.html")
    } else if candidate.is_file() {
        candidate
    } else {
        public_dir.join(format!("{}.html", relative.display()))
    };

    let is_html = file
        .extension()
        .is_some_and(|ext| ext == "html" || ext == "htm");
    (is_html && file.is_file()).then_some(file)
}

/// Put the reload client just before `</body>`, or at the end when there is none
fn inject_live_reload(html: &str) -> String {
    match html.rfind("</body>") {
        Some(pos) => format!("{}{}{}", &html[..pos], LIVE_RELOAD_CLIENT, &html[pos..]),
        None => format!("{}{}", html, LIVE_RELOAD_CLIENT),
    }
}
