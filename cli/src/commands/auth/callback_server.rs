//! Local listener that receives the provider's redirect
//!
//! Providers using the implicit flow put the response in the URL fragment,
//! which browsers never send to a server. A request without a query gets a
//! small relay page that re-requests the same path with the fragment moved
//! into the query.

use axum::Router;
use axum::extract::State;
use axum::http::Uri;
use axum::response::Html;
use axum::routing::get;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::{mpsc, oneshot};
use tracing::debug;

const RELAY_PAGE: &str = r#"<!doctype html>
<html>
<head><meta charset="utf-8"><title>oktaplus</title></head>
<body>
<p id="status">Completing sign-in...</p>
<script>
  if (window.location.hash.length > 1) {
    window.location.replace(window.location.pathname + "?" + window.location.hash.substring(1));
  } else {
    document.getElementById("status").textContent = "No authorization response found in this URL.";
  }
</script>
</body>
</html>
"#;

const DONE_PAGE: &str = r#"<!doctype html>
<html>
<head><meta charset="utf-8"><title>oktaplus</title></head>
<body>
<p>Authorization response received. You can close this window and return to the terminal.</p>
</body>
</html>
"#;

/// How long to wait for in-flight responses after the callback arrived
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

pub struct CallbackListener {
    listener: TcpListener,
    path: Option<String>,
}

impl CallbackListener {
    /// Bind on loopback; `path` is the callback route, `None` accepts any path
    pub async fn bind(port: u16, path: Option<&str>) -> Result<Self, String> {
        let listener = TcpListener::bind(("127.0.0.1", port))
            .await
            .map_err(|e| format!("Failed to bind callback listener on port {}: {}", port, e))?;

        let path = match path {
            Some(p) if !p.starts_with('/') => {
                return Err(format!("Callback route must start with '/': {}", p));
            }
            other => other.map(str::to_string),
        };

        Ok(Self { listener, path })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, String> {
        self.listener
            .local_addr()
            .map_err(|e| format!("Failed to read listener address: {}", e))
    }

    /// Serve until a callback carrying a query arrives; returns its path and query
    pub async fn wait(self, timeout: Duration) -> Result<String, String> {
        let (tx, mut rx) = mpsc::channel::<String>(1);
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let app = match self.path.as_deref() {
            Some(path) => Router::new().route(path, get(receive)),
            None => Router::new().fallback(receive),
        }
        .with_state(tx);

        let server = tokio::spawn(async move {
            axum::serve(self.listener, app)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
        });

        let received = tokio::time::timeout(timeout, rx.recv()).await;

        let _ = shutdown_tx.send(());
        if tokio::time::timeout(SHUTDOWN_GRACE, server).await.is_err() {
            debug!("callback listener did not shut down in time");
        }

        match received {
            Ok(Some(uri)) => Ok(uri),
            Ok(None) => Err("Callback listener stopped unexpectedly".to_string()),
            Err(_) => Err(format!(
                "Timed out after {}s waiting for the provider to redirect back",
                timeout.as_secs()
            )),
        }
    }
}

async fn receive(State(tx): State<mpsc::Sender<String>>, uri: Uri) -> Html<&'static str> {
    match uri.query() {
        Some(query) if !query.is_empty() => {
            debug!(path = uri.path(), "callback received");
            // a second callback while the first is processed is dropped
            let _ = tx.try_send(uri.to_string());
            Html(DONE_PAGE)
        }
        _ => Html(RELAY_PAGE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    async fn get_raw(addr: SocketAddr, target: &str) -> String {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        let request = format!(
            "GET {} HTTP/1.1\r\nHost: {}\r\nConnection: close\r\n\r\n",
            target, addr
        );
        stream.write_all(request.as_bytes()).await.unwrap();

        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();
        response
    }

    #[tokio::test]
    async fn test_relay_page_then_callback() {
        let listener = CallbackListener::bind(0, Some("/callback")).await.unwrap();
        let addr = listener.local_addr().unwrap();
        let waiting = tokio::spawn(listener.wait(Duration::from_secs(10)));

        let relay = get_raw(addr, "/callback").await;
        assert!(relay.contains("window.location.hash"));

        let done = get_raw(addr, "/callback?code=c1&state=S1").await;
        assert!(done.contains("You can close this window"));

        let uri = waiting.await.unwrap().unwrap();
        assert_eq!(uri, "/callback?code=c1&state=S1");
    }

    #[tokio::test]
    async fn test_other_paths_are_not_callbacks() {
        let listener = CallbackListener::bind(0, Some("/callback")).await.unwrap();
        let addr = listener.local_addr().unwrap();
        let waiting = tokio::spawn(listener.wait(Duration::from_secs(10)));

        let response = get_raw(addr, "/favicon.ico?x=1").await;
        assert!(response.starts_with("HTTP/1.1 404"));

        get_raw(addr, "/callback?access_token=t").await;
        assert_eq!(
            waiting.await.unwrap().unwrap(),
            "/callback?access_token=t"
        );
    }

    #[tokio::test]
    async fn test_any_path_without_callback_route() {
        let listener = CallbackListener::bind(0, None).await.unwrap();
        let addr = listener.local_addr().unwrap();
        let waiting = tokio::spawn(listener.wait(Duration::from_secs(10)));

        get_raw(addr, "/anywhere?code=c2").await;
        assert_eq!(waiting.await.unwrap().unwrap(), "/anywhere?code=c2");
    }

    #[tokio::test]
    async fn test_timeout() {
        let listener = CallbackListener::bind(0, Some("/callback")).await.unwrap();
        let result = listener.wait(Duration::from_millis(50)).await;
        assert!(result.unwrap_err().contains("Timed out"));
    }
}
