// Per-test server bootstrapping so every test owns an empty waiting queue.
use pairing_server::{Settings, StoreBackend};

// Start a server backed by the in-memory store and return its base URL.
pub async fn start_server() -> String {
    start_server_with(Settings {
        store: StoreBackend::Memory,
        ..Settings::default()
    })
    .await
}

pub async fn start_server_with(settings: Settings) -> String {
    // Bind before spawning so the socket already accepts connections on return.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral test port");
    let addr = listener.local_addr().expect("get local addr");

    // The server task lives as long as the test runtime.
    tokio::spawn(async move {
        pairing_server::serve(listener, settings)
            .await
            .expect("server failed");
    });

    format!("http://{addr}")
}

pub async fn post_match(
    client: &reqwest::Client,
    base_url: &str,
    path: &str,
    body: serde_json::Value,
) -> (reqwest::StatusCode, serde_json::Value) {
    let res = client
        .post(format!("{base_url}{path}"))
        .json(&body)
        .send()
        .await
        .expect("request should succeed");
    let status = res.status();
    let payload = res.json().await.expect("expected json body");
    (status, payload)
}
