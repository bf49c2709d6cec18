/*!
 * Mock generation client for testing.
 *
 * Simulates the ways a model response can go wrong:
 * - `MockClient::working()` - Well-formed JSON for every character
 * - `MockClient::truncated()` - JSON cut off inside the last record
 * - `MockClient::failing()` - Always errors
 * - `MockClient::intermittent(n)` - Every nth request errors
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::errors::ProviderError;
use crate::providers::{CastingRequest, GenerationClient};

/// Behavior mode for the mock client
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Always returns a complete, well-formed response
    Working,
    /// Returns a response truncated inside the last record
    Truncated,
    /// Returns prose with no JSON in it
    Garbage,
    /// Fails intermittently (every Nth request)
    Intermittent { fail_every: usize },
    /// Fails only for the given batch
    FailBatch { batch_index: usize },
    /// Always fails with an error
    Failing,
    /// Returns an empty response
    Empty,
    /// Waits before responding
    Slow { delay_ms: u64 },
}

/// Scriptable generation client
#[derive(Debug)]
pub struct MockClient {
    /// Behavior mode
    behavior: MockBehavior,
    /// Request counter for intermittent failures
    request_count: Arc<AtomicUsize>,
    /// Every request received, in arrival order
    requests: Arc<Mutex<Vec<CastingRequest>>>,
    /// Custom response generator (optional)
    custom_response: Option<fn(&CastingRequest) -> String>,
}

impl MockClient {
    /// Create a new mock client with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
            requests: Arc::new(Mutex::new(Vec::new())),
            custom_response: None,
        }
    }

    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    pub fn truncated() -> Self {
        Self::new(MockBehavior::Truncated)
    }

    pub fn garbage() -> Self {
        Self::new(MockBehavior::Garbage)
    }

    pub fn intermittent(fail_every: usize) -> Self {
        Self::new(MockBehavior::Intermittent { fail_every })
    }

    pub fn fail_batch(batch_index: usize) -> Self {
        Self::new(MockBehavior::FailBatch { batch_index })
    }

    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    pub fn empty() -> Self {
        Self::new(MockBehavior::Empty)
    }

    pub fn slow(delay_ms: u64) -> Self {
        Self::new(MockBehavior::Slow { delay_ms })
    }

    /// Set a custom response generator used by the working behavior
    pub fn with_custom_response(mut self, generator: fn(&CastingRequest) -> String) -> Self {
        self.custom_response = Some(generator);
        self
    }

    /// Number of requests received so far
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Copy of every request received so far
    pub fn requests(&self) -> Vec<CastingRequest> {
        self.requests.lock().clone()
    }

    /// Well-formed response with one record per requested character
    pub fn generate_response(request: &CastingRequest) -> String {
        let cast: Vec<serde_json::Value> = request
            .characters
            .iter()
            .map(|identity| {
                let mut record = serde_json::Map::new();
                record.insert(request.identifying_field.clone(), json!(identity.name));
                record.insert("archetype".to_string(), json!(format!("{} archetype", identity.importance)));
                record.insert("requirements".to_string(), json!([format!("{} lines", identity.line_count)]));
                record.insert("notes".to_string(), json!(format!("Notes for {}", identity.name)));
                serde_json::Value::Object(record)
            })
            .collect();

        serde_json::to_string_pretty(&json!({ "cast": cast })).unwrap_or_default()
    }

    /// Response cut off partway through the last record's notes
    pub fn generate_truncated_response(request: &CastingRequest) -> String {
        let full = Self::generate_response(request);
        match full.rfind("\"notes\"") {
            Some(index) => {
                let cut = (index + "\"notes\": \"No".len()).min(full.len());
                full[..cut].to_string()
            }
            None => full,
        }
    }
}

impl Clone for MockClient {
    fn clone(&self) -> Self {
        Self {
            behavior: self.behavior,
            request_count: Arc::clone(&self.request_count),
            requests: Arc::clone(&self.requests),
            custom_response: self.custom_response,
        }
    }
}

#[async_trait]
impl GenerationClient for MockClient {
    async fn generate(&self, request: CastingRequest) -> Result<String, ProviderError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().push(request.clone());

        match self.behavior {
            MockBehavior::Working => Ok(match self.custom_response {
                Some(generator) => generator(&request),
                None => Self::generate_response(&request),
            }),

            MockBehavior::Truncated => Ok(Self::generate_truncated_response(&request)),

            MockBehavior::Garbage => {
                Ok("I'm sorry, I can't produce casting notes for these characters.".to_string())
            }

            MockBehavior::Intermittent { fail_every } => {
                if fail_every > 0 && count % fail_every == fail_every - 1 {
                    Err(ProviderError::ApiError {
                        message: format!("Simulated intermittent failure (request #{})", count + 1),
                        status_code: 503,
                    })
                } else {
                    Ok(Self::generate_response(&request))
                }
            }

            MockBehavior::FailBatch { batch_index } => {
                if request.batch_index == batch_index {
                    Err(ProviderError::RequestFailed(format!(
                        "Simulated failure for batch {}",
                        batch_index
                    )))
                } else {
                    Ok(Self::generate_response(&request))
                }
            }

            MockBehavior::Failing => Err(ProviderError::ApiError {
                message: "Simulated provider failure".to_string(),
                status_code: 500,
            }),

            MockBehavior::Empty => Ok(String::new()),

            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(tokio::time::Duration::from_millis(delay_ms)).await;
                Ok(Self::generate_response(&request))
            }
        }
    }
}
