//! Test server management.
//!
//! Runs the real Gateway inside the test runtime on an ephemeral port, with
//! received files going to a temporary directory.

use courierd::config::{self, Config};
use courierd::network::Gateway;
use courierd::state::Hub;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

/// A test server instance. Shuts down when dropped.
pub struct TestServer {
    addr: SocketAddr,
    hub: Arc<Hub>,
    token: CancellationToken,
    storage: TempDir,
}

impl TestServer {
    /// Spawn a server with the default config (accounts user1..user3).
    pub async fn spawn() -> anyhow::Result<Self> {
        Self::spawn_with(|_| {}).await
    }

    /// Spawn a server after letting the caller adjust the config.
    pub async fn spawn_with(configure: impl FnOnce(&mut Config)) -> anyhow::Result<Self> {
        let storage = TempDir::new()?;

        let mut config = Config::default();
        config.listen.address = "127.0.0.1:0".parse()?;
        config.storage.root = storage.path().to_path_buf();
        configure(&mut config);

        if let Err(errors) = config::validate(&config) {
            anyhow::bail!("invalid test config: {errors:?}");
        }

        let hub = Arc::new(Hub::from_config(&config));
        let token = CancellationToken::new();
        let gateway = Gateway::bind(config.listen.address, Arc::clone(&hub), token.clone()).await?;
        let addr = gateway.local_addr()?;

        tokio::spawn(async move {
            if let Err(e) = gateway.run().await {
                eprintln!("gateway stopped: {e}");
            }
        });

        Ok(Self {
            addr,
            hub,
            token,
            storage,
        })
    }

    /// Address clients should connect to.
    pub fn address(&self) -> String {
        self.addr.to_string()
    }

    /// Shared server state, for asserting on the Session Directory.
    #[allow(dead_code)]
    pub fn hub(&self) -> &Arc<Hub> {
        &self.hub
    }

    /// Root of the received-files tree.
    #[allow(dead_code)]
    pub fn storage_root(&self) -> &Path {
        self.storage.path()
    }

    /// Where a file uploaded by `user` as `name` ends up.
    #[allow(dead_code)]
    pub fn received_file(&self, user: &str, name: &str) -> PathBuf {
        self.storage.path().join(user).join(name)
    }

    /// Poll `condition` until it holds or two seconds pass.
    #[allow(dead_code)]
    pub async fn wait_until(&self, condition: impl Fn(&Hub) -> bool) -> bool {
        for _ in 0..200 {
            if condition(&self.hub) {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        condition(&self.hub)
    }

    /// Cancel the root token: stop accepting and close every connection.
    #[allow(dead_code)]
    pub fn shutdown(&self) {
        self.token.cancel();
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
