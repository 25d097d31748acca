//! Common test utilities and fixtures for integration tests
//!
//! Builds an `Authenticator` wired to the demo-account mock and a file-backed
//! session store in a temporary directory, mirroring the production wiring.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use gymdesk_auth::{Authenticator, FileStore, SessionStore};
use gymdesk_gateway::mock::MockAuthService;
use tempfile::TempDir;

/// Test application: one authenticator over a mock user service
#[allow(dead_code)]
pub struct TestApp {
    pub auth: Arc<Authenticator>,
    pub service: Arc<MockAuthService>,
    pub session_path: PathBuf,
    dir: TempDir,
}

#[allow(dead_code)]
impl TestApp {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let session_path = dir.path().join("session.json");
        let service = Arc::new(MockAuthService::new());
        let auth = Arc::new(build(service.clone(), &session_path));

        Self {
            auth,
            service,
            session_path,
            dir,
        }
    }

    /// A second authenticator over the same session file, as after an app reload
    pub fn reload(&self) -> Authenticator {
        build(self.service.clone(), &self.session_path)
    }
}

fn build(service: Arc<MockAuthService>, path: &Path) -> Authenticator {
    let session = SessionStore::new(Arc::new(FileStore::new(path)));
    Authenticator::new(service, session)
}

/// Demo credentials, one pair per role
#[allow(dead_code)]
pub mod accounts {
    pub const ADMIN: (&str, &str) = ("admin@gym.com", "admin123");
    pub const STAFF: (&str, &str) = ("staff@gym.com", "staff123");
    pub const COACH: (&str, &str) = ("coach@gym.com", "coach123");
    pub const USER: (&str, &str) = ("user@gym.com", "user123");
}
