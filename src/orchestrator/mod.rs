//! Conversation orchestration
//!
//! Free-form requests that the pattern parser did not claim are handled here:
//! the orchestrator keeps a bounded conversation history, advertises the
//! function registry as tools, executes whatever tool calls the model makes,
//! and asks for one final completion without tools so the user always gets a
//! spoken summary rather than a raw tool result.

use std::collections::VecDeque;
use std::sync::Arc;

use serde_json::Value;

use crate::llm::{ChatGateway, ChatMessage};
use crate::registry::FunctionRegistry;
use crate::Result;

/// Conversation entries retained across turns (user and assistant messages)
pub const HISTORY_LIMIT: usize = 20;

/// How talkative the assistant's replies should be
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Concise,
    Balanced,
    Detailed,
}

impl Verbosity {
    /// Parse from a config string, defaulting to `Balanced` on unknown input
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "concise" => Self::Concise,
            "detailed" => Self::Detailed,
            _ => Self::Balanced,
        }
    }

    fn instruction(self) -> &'static str {
        match self {
            Self::Concise => "Reply in a single short sentence.",
            Self::Balanced => "Keep replies brief, one or two sentences.",
            Self::Detailed => {
                "Explain what you did and mention any relevant detail the user might want."
            }
        }
    }
}

impl std::fmt::Display for Verbosity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Concise => "concise",
            Self::Balanced => "balanced",
            Self::Detailed => "detailed",
        };
        write!(f, "{s}")
    }
}

/// Record of one tool call the model made during a turn
#[derive(Debug, Clone)]
pub struct ToolInvocation {
    pub function: String,
    pub arguments: Value,
    pub result: Value,
}

/// The assistant's reply plus everything it did to produce it
#[derive(Debug, Clone)]
pub struct ConversationReply {
    /// Spoken reply text
    pub text: String,
    /// Tool calls executed this turn, in order
    pub invocations: Vec<ToolInvocation>,
}

/// Orchestrator conversation state
///
/// A turn whose reply ends in a question leaves the orchestrator
/// `WaitingForClarification`; the next turn resolves it either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversationState {
    Idle,
    WaitingForClarification,
}

/// Drives tool-calling conversations with the model
pub struct ConversationOrchestrator {
    gateway: Arc<dyn ChatGateway>,
    registry: Arc<FunctionRegistry>,
    model: String,
    verbosity: Verbosity,
    history: VecDeque<ChatMessage>,
    state: ConversationState,
}

impl ConversationOrchestrator {
    #[must_use]
    pub fn new(
        gateway: Arc<dyn ChatGateway>,
        registry: Arc<FunctionRegistry>,
        model: String,
        verbosity: Verbosity,
    ) -> Self {
        Self {
            gateway,
            registry,
            model,
            verbosity,
            history: VecDeque::new(),
            state: ConversationState::Idle,
        }
    }

    /// Current conversation state
    #[must_use]
    pub const fn state(&self) -> ConversationState {
        self.state
    }

    /// Retained conversation entries
    #[must_use]
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Forget the conversation so far
    pub fn clear_history(&mut self) {
        self.history.clear();
        self.state = ConversationState::Idle;
    }

    /// Handle one user request, returning the reply and any tool calls made
    ///
    /// # Errors
    ///
    /// Returns error if a completion request fails
    pub async fn handle(&mut self, user_text: &str) -> Result<ConversationReply> {
        let mut messages = Vec::with_capacity(self.history.len() + 2);
        messages.push(ChatMessage::system(self.system_prompt()));
        messages.extend(self.history.iter().cloned());
        messages.push(ChatMessage::user(user_text));

        let reply = self
            .gateway
            .complete(&self.model, &messages, Some(self.registry.schemas()))
            .await?;

        let mut invocations = Vec::new();
        let final_text = match &reply.tool_calls {
            Some(calls) if !calls.is_empty() => {
                tracing::info!(count = calls.len(), "executing tool calls");

                messages.push(reply.clone());
                for call in calls {
                    let args: Value = serde_json::from_str(&call.function.arguments)
                        .unwrap_or_else(|e| {
                            tracing::warn!(
                                function = %call.function.name,
                                error = %e,
                                "malformed tool call arguments"
                            );
                            Value::Null
                        });
                    let result = self.registry.execute(&call.function.name, &args);
                    messages.push(ChatMessage::tool_result(&call.id, result.to_string()));
                    invocations.push(ToolInvocation {
                        function: call.function.name.clone(),
                        arguments: args,
                        result,
                    });
                }

                // second pass without tools so the reply is always plain text
                let summary = self.gateway.complete(&self.model, &messages, None).await?;
                summary.content.unwrap_or_default()
            }
            _ => reply.content.unwrap_or_default(),
        };

        self.remember(ChatMessage::user(user_text));
        self.remember(ChatMessage::assistant(final_text.clone()));
        self.update_state(&final_text);

        Ok(ConversationReply {
            text: final_text,
            invocations,
        })
    }

    /// Answer a question without offering any tools
    ///
    /// # Errors
    ///
    /// Returns error if the completion request fails
    pub async fn handle_question(&mut self, user_text: &str) -> Result<String> {
        let mut messages = Vec::with_capacity(self.history.len() + 2);
        messages.push(ChatMessage::system(self.system_prompt()));
        messages.extend(self.history.iter().cloned());
        messages.push(ChatMessage::user(user_text));

        let reply = self.gateway.complete(&self.model, &messages, None).await?;
        let text = reply.content.unwrap_or_default();

        self.remember(ChatMessage::user(user_text));
        self.remember(ChatMessage::assistant(text.clone()));
        self.update_state(&text);

        Ok(text)
    }

    fn update_state(&mut self, reply: &str) {
        self.state = if reply.trim_end().ends_with('?') {
            ConversationState::WaitingForClarification
        } else {
            ConversationState::Idle
        };
    }

    fn remember(&mut self, message: ChatMessage) {
        self.history.push_back(message);
        while self.history.len() > HISTORY_LIMIT {
            self.history.pop_front();
        }
    }

    fn system_prompt(&self) -> String {
        format!(
            "You are a desktop voice assistant. You control windows, \
             applications, audio, input, files, and the clipboard through the \
             provided tools. Use a tool whenever the user asks you to act on \
             the desktop; answer directly otherwise. Replies are spoken aloud, \
             so avoid formatting and lists. {}",
            self.verbosity.instruction()
        )
    }
}
