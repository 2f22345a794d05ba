use std::{net::SocketAddr, sync::Once, time::Duration};

use config::Config;
use reqwest::header::{COOKIE, USER_AGENT};
use server::{ServeConfig, logger::LogStyle};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

pub const FIREFOX_1: &str = "Mozilla/5.0 (Windows; U; Windows NT 5.1; en-US; rv:1.7.5) Gecko/20041107 Firefox/1.0";
pub const FIREFOX_115: &str = "Mozilla/5.0 (X11; Linux x86_64; rv:109.0) Gecko/20100101 Firefox/115.0";
pub const IE_6: &str = "Mozilla/4.0 (compatible; MSIE 6.0; Windows NT 5.1; SV1)";
pub const IE_8: &str = "Mozilla/4.0 (compatible; MSIE 8.0; Windows NT 6.1; Trident/4.0)";

static INIT: Once = Once::new();

fn init() {
    INIT.call_once(|| {
        server::logger::init("server=debug,browser_rules=debug,config=debug", LogStyle::Text);

        rustls::crypto::aws_lc_rs::default_provider()
            .install_default()
            .expect("Failed to install default crypto provider");
    });
}

/// Test client for making HTTP requests to the test server. Redirects are not followed.
#[derive(Clone)]
pub struct TestClient {
    base_url: String,
    client: reqwest::Client,
}

impl TestClient {
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .expect("Failed to create client");

        Self { base_url, client }
    }

    /// Create a new test client that accepts invalid TLS certificates
    pub fn new_with_tls(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .danger_accept_invalid_certs(true)
            .build()
            .expect("Failed to create client with invalid cert acceptance");

        Self { base_url, client }
    }

    /// Start a GET request to the given path, without a user agent.
    pub fn get(&self, path: &str) -> TestRequest {
        TestRequest {
            builder: self.client.get(format!("{}{}", self.base_url, path)),
        }
    }

    /// Send a GET request to the given path, returning Result instead of panicking
    pub async fn try_get(&self, path: &str) -> reqwest::Result<reqwest::Response> {
        self.client.get(format!("{}{}", self.base_url, path)).send().await
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

pub struct TestRequest {
    builder: reqwest::RequestBuilder,
}

impl TestRequest {
    pub fn user_agent(self, user_agent: &str) -> Self {
        Self {
            builder: self.builder.header(USER_AGENT, user_agent),
        }
    }

    pub fn cookie(self, cookie: &str) -> Self {
        Self {
            builder: self.builder.header(COOKIE, cookie),
        }
    }

    pub fn header(self, name: &str, value: &str) -> Self {
        Self {
            builder: self.builder.header(name, value),
        }
    }

    pub async fn send(self) -> reqwest::Response {
        self.builder.send().await.unwrap()
    }
}

pub struct TestServer {
    pub client: TestClient,
    pub address: SocketAddr,
    pub config: Config,
    _task_handle: tokio::task::JoinHandle<()>,
    shutdown_signal: CancellationToken,
}

impl TestServer {
    /// Start a new test server with the given TOML configuration
    pub async fn start(config_toml: &str) -> Self {
        init();

        // Going through the loader keeps validation in the loop
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("badbrowser.toml");
        std::fs::write(&config_path, config_toml).unwrap();

        let config = Config::load(&config_path).unwrap();

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        let has_tls = config.server.tls.is_some();

        let shutdown_signal = CancellationToken::new();

        let serve_config = ServeConfig {
            listen_address: address,
            config: config.clone(),
            shutdown_signal: shutdown_signal.clone(),
        };

        let (tx, mut rx) = tokio::sync::oneshot::channel();

        let task_handle = tokio::spawn(async move {
            // Free the port for the server
            drop(listener);

            let _ = tx.send(server::serve(serve_config).await);
        });

        let protocol = if has_tls { "https" } else { "http" };
        let base_url = format!("{protocol}://{address}");

        let client = if has_tls {
            TestClient::new_with_tls(base_url)
        } else {
            TestClient::new(base_url)
        };

        let mut last_error = None;

        for _ in 0..30 {
            #[allow(clippy::panic)]
            if let Ok(Err(e)) = rx.try_recv() {
                panic!("Server failed to start: {e}");
            }

            match client.try_get("/").await {
                Ok(_) => {
                    last_error = None;
                    break;
                }
                Err(e) => last_error = Some(e),
            }

            tokio::time::sleep(Duration::from_millis(100)).await;
        }

        #[allow(clippy::panic)]
        if let Some(e) = last_error {
            panic!("Server failed to become ready after 30 retries. Last error: {e}");
        }

        TestServer {
            client,
            address,
            config,
            _task_handle: task_handle,
            shutdown_signal,
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown_signal.cancel();
    }
}
