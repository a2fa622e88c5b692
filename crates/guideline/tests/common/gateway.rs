//! Scripted language-model gateway.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;

use guideline::gateway::{CompletionRequest, GatewayError, LlmGateway, Stage};

/// Replies are consumed in order, per stage. An exhausted script answers
/// with `GatewayError::Unavailable`.
#[derive(Default)]
pub struct ScriptedGateway {
    summaries: Mutex<VecDeque<Result<String, GatewayError>>>,
    checklists: Mutex<VecDeque<Result<String, GatewayError>>>,
    calls: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_summary(&self, reply: Result<&str, GatewayError>) -> &Self {
        self.summaries
            .lock()
            .unwrap()
            .push_back(reply.map(str::to_string));
        self
    }

    pub fn push_checklist(&self, reply: Result<&str, GatewayError>) -> &Self {
        self.checklists
            .lock()
            .unwrap()
            .push_back(reply.map(str::to_string));
        self
    }

    /// All requests seen so far, in order.
    pub fn calls(&self) -> Vec<CompletionRequest> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls_for(&self, stage: Stage) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.stage == stage)
            .count()
    }
}

impl LlmGateway for ScriptedGateway {
    fn complete(&self, request: &CompletionRequest) -> Result<String, GatewayError> {
        self.calls.lock().unwrap().push(request.clone());

        let script = match request.stage {
            Stage::Summary => &self.summaries,
            Stage::Checklist => &self.checklists,
        };
        script.lock().unwrap().pop_front().unwrap_or_else(|| {
            Err(GatewayError::Unavailable(format!(
                "no scripted reply for {:?}",
                request.stage
            )))
        })
    }
}
