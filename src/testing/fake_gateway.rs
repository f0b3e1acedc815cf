use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::domain::AppError;
use crate::ports::{CompletionGateway, CompletionRequest};

#[derive(Debug, Clone)]
enum Scripted {
    Text(String),
    Timeout,
    Unavailable(u16),
}

/// Recording gateway with scripted replies.
///
/// Once the script runs out it answers `tutor reply N`.
#[derive(Clone, Default)]
pub struct FakeGateway {
    script: Arc<Mutex<VecDeque<Scripted>>>,
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl FakeGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scripted<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let gateway = Self::default();
        gateway
            .script
            .lock()
            .unwrap()
            .extend(replies.into_iter().map(|reply| Scripted::Text(reply.into())));
        gateway
    }

    /// Make the next call fail with `GatewayTimeout`.
    pub fn fail_next_with_timeout(&self) {
        self.script.lock().unwrap().push_front(Scripted::Timeout);
    }

    /// Make the next call fail with `GatewayUnavailable`.
    pub fn fail_next_with_status(&self, status: u16) {
        self.script.lock().unwrap().push_front(Scripted::Unavailable(status));
    }

    /// Queue a reply after everything already scripted.
    pub fn then_reply(&self, reply: impl Into<String>) {
        self.script.lock().unwrap().push_back(Scripted::Text(reply.into()));
    }

    /// Queue a `GatewayTimeout` after everything already scripted.
    pub fn then_timeout(&self) {
        self.script.lock().unwrap().push_back(Scripted::Timeout);
    }

    /// Every request received, including failed ones.
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> Option<CompletionRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

impl CompletionGateway for FakeGateway {
    fn generate(&self, request: &CompletionRequest) -> Result<String, AppError> {
        let count = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(request.clone());
            requests.len()
        };
        match self.script.lock().unwrap().pop_front() {
            Some(Scripted::Text(text)) => Ok(text),
            Some(Scripted::Timeout) => Err(AppError::GatewayTimeout { timeout_secs: 1 }),
            Some(Scripted::Unavailable(status)) => Err(AppError::GatewayUnavailable {
                message: format!("scripted failure ({})", status),
                status: Some(status),
            }),
            None => Ok(format!("tutor reply {}", count)),
        }
    }
}
