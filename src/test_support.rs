// In-process HTTP servers for tests. Every server binds 127.0.0.1:0 and lives
// until the test's runtime shuts down.

use std::net::SocketAddr;
use std::sync::OnceLock;
use std::time::Duration;

use axum::http::header::HeaderName;
use axum::http::{HeaderMap, Uri};
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::{Mutex, MutexGuard};

/// Serve `router` on an ephemeral local port and return its base URL.
pub async fn serve(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    format!("http://{addr}")
}

/// Origin server: `/page/N` answers with a small HTML page naming N, `/empty`
/// with an empty 200, `/missing` with an HTML 404, `/slow` after a long nap,
/// `/tagless` with markup and no words, `/ua` and `/conn` echo the User-Agent
/// and Connection headers.
pub async fn origin() -> String {
    let router = Router::new().fallback(|uri: Uri, headers: HeaderMap| async move {
        use axum::http::StatusCode;
        use axum::response::{Html, IntoResponse};

        let path = uri.path().to_string();
        if let Some(n) = path.strip_prefix("/page/") {
            return Html(format!("<html><body><h1>Page</h1><p>content number {n} end</p></body></html>"))
                .into_response();
        }
        match path.as_str() {
            "/empty" => (StatusCode::OK, "").into_response(),
            "/missing" => (
                StatusCode::NOT_FOUND,
                Html("<html><body><p>nothing here</p></body></html>"),
            )
                .into_response(),
            "/slow" => {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Html("<p>too late</p>").into_response()
            }
            "/tagless" => Html("<html><body><div>  </div></body></html>").into_response(),
            "/ua" => echo(&headers, axum::http::header::USER_AGENT).into_response(),
            "/conn" => echo(&headers, axum::http::header::CONNECTION).into_response(),
            _ => (StatusCode::NOT_FOUND, "").into_response(),
        }
    });
    serve(router).await
}

fn echo(headers: &HeaderMap, name: HeaderName) -> String {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("none")
        .to_string()
}

/// Fake forward proxy: whatever absolute URL it is asked for, it answers with
/// the same page.
pub async fn proxy() -> String {
    let router = Router::new().fallback(|| async {
        axum::response::Html("<html><body><p>served by the proxy</p></body></html>")
    });
    serve(router).await
}

/// Serializes tests that set process environment variables, and tests that
/// run batches through the router and so read them.
pub async fn env_lock() -> MutexGuard<'static, ()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(())).lock().await
}

/// A local URL nothing is listening on.
pub async fn dead_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/gone")
}
