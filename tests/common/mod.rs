use async_trait::async_trait;
use axum_test::TestServer;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use tasklink_server::core::{AppState, encode_session_token};
use tasklink_server::email::{EmailError, InviteNotification, NotificationDispatcher};
use tasklink_server::repositories::memory::{
    MemoryInvitationStore, MemoryMembershipStore, MemoryProjectStore, MemoryStepStore,
    MemoryUserStore,
};

pub const TEST_JWT_SECRET: &str = "integration-test-secret";

/// Dispatcher double shared by the API tests: records every notification
/// and can be flipped into a failing mode.
#[derive(Default)]
pub struct RecordingDispatcher {
    pub sent: Mutex<Vec<InviteNotification>>,
    pub fail: AtomicBool,
}

impl RecordingDispatcher {
    pub fn sent(&self) -> Vec<InviteNotification> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationDispatcher for RecordingDispatcher {
    async fn send(&self, invite: &InviteNotification) -> Result<(), EmailError> {
        if self.fail.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(EmailError::SendFailed("smtp connection refused".to_string()));
        }
        self.sent.lock().unwrap().push(invite.clone());
        Ok(())
    }
}

/// AppState over the in-memory backend, plus the dispatcher double for
/// inspection.
pub fn create_test_state() -> (Arc<AppState>, Arc<RecordingDispatcher>) {
    let dispatcher = Arc::new(RecordingDispatcher::default());
    let state = Arc::new(AppState::with_stores(
        Arc::new(MemoryUserStore::new()),
        Arc::new(MemoryProjectStore::new()),
        Arc::new(MemoryStepStore::new()),
        Arc::new(MemoryMembershipStore::new()),
        Arc::new(MemoryInvitationStore::new()),
        dispatcher.clone(),
        TEST_JWT_SECRET.to_string(),
    ));
    (state, dispatcher)
}

/// TestServer over the application router.
pub fn create_test_server(state: Arc<AppState>) -> TestServer {
    let app = tasklink_server::create_router(state);
    TestServer::new(app).expect("Failed to create test server")
}

/// Session token as the external auth layer would mint it.
pub fn session_token(sub: &str, email: &str, name: Option<&str>) -> String {
    encode_session_token(sub, email, name, TEST_JWT_SECRET).expect("Failed to create session token")
}
