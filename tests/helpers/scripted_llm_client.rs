use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use akashchat::application::ports::{ChatTurn, LlmClient, LlmClientError, ModerationVerdict};

/// Completion client whose answers are queued up front by the test.
///
/// With an empty queue it answers `"Reply N"`, counting completions from 1.
pub struct ScriptedLlmClient {
    replies: Mutex<VecDeque<Result<String, LlmClientError>>>,
    flagged_terms: Mutex<Vec<String>>,
    moderation_unavailable: Mutex<bool>,
    requests: Mutex<Vec<Vec<ChatTurn>>>,
    completions: AtomicUsize,
    moderations: AtomicUsize,
}

impl ScriptedLlmClient {
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            flagged_terms: Mutex::new(Vec::new()),
            moderation_unavailable: Mutex::new(false),
            requests: Mutex::new(Vec::new()),
            completions: AtomicUsize::new(0),
            moderations: AtomicUsize::new(0),
        }
    }

    pub fn push_reply(&self, reply: &str) {
        self.replies
            .lock()
            .unwrap()
            .push_back(Ok(reply.to_string()));
    }

    pub fn push_failure(&self, error: LlmClientError) {
        self.replies.lock().unwrap().push_back(Err(error));
    }

    /// Any text containing `term` is flagged as `harassment`.
    pub fn flag(&self, term: &str) {
        self.flagged_terms.lock().unwrap().push(term.to_string());
    }

    pub fn make_moderation_unavailable(&self) {
        *self.moderation_unavailable.lock().unwrap() = true;
    }

    pub fn requests(&self) -> Vec<Vec<ChatTurn>> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> Vec<ChatTurn> {
        self.requests().pop().unwrap_or_default()
    }

    pub fn completion_count(&self) -> usize {
        self.completions.load(Ordering::SeqCst)
    }

    pub fn moderation_count(&self) -> usize {
        self.moderations.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl LlmClient for ScriptedLlmClient {
    async fn complete(&self, _model: &str, turns: &[ChatTurn]) -> Result<String, LlmClientError> {
        let count = self.completions.fetch_add(1, Ordering::SeqCst) + 1;
        self.requests.lock().unwrap().push(turns.to_vec());

        match self.replies.lock().unwrap().pop_front() {
            Some(reply) => reply,
            None => Ok(format!("Reply {}", count)),
        }
    }

    async fn moderate(&self, text: &str) -> Result<ModerationVerdict, LlmClientError> {
        self.moderations.fetch_add(1, Ordering::SeqCst);

        if *self.moderation_unavailable.lock().unwrap() {
            return Err(LlmClientError::ApiRequestFailed(
                "moderation endpoint down".to_string(),
            ));
        }

        let flagged = self
            .flagged_terms
            .lock()
            .unwrap()
            .iter()
            .any(|term| text.contains(term.as_str()));

        if !flagged {
            return Ok(ModerationVerdict::allowed());
        }

        Ok(ModerationVerdict {
            flagged: true,
            categories: [("harassment".to_string(), true), ("violence".to_string(), false)]
                .into_iter()
                .collect(),
        })
    }
}
