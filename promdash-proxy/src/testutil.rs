use axum::Router;
use reqwest::Url;

/// Serves `app` on an ephemeral local port and returns its base URL.
pub async fn spawn_upstream(app: Router) -> Url {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");
    let server = axum::Server::from_tcp(listener)
        .expect("server")
        .serve(app.into_make_service());
    tokio::spawn(server);
    Url::parse(&format!("http://127.0.0.1:{}/", addr.port())).expect("url")
}

/// A URL nothing listens on.
pub fn unreachable_url(path: &str) -> Url {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().expect("addr").port();
    drop(listener);
    Url::parse(&format!("http://127.0.0.1:{}{}", port, path)).expect("url")
}
