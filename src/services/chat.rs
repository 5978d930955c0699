use crate::models::{ChatMessage, Role, ServiceRecord};
use crate::services::llm::{ChatTransport, LlmError};
use crate::services::storage::{KeyValueStore, MESSAGE_COUNT_KEY};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

/// Records summarized into the assistant's context
pub const DEFAULT_EXCERPT_SIZE: usize = 50;

/// Replies a session may request before it is cut off
pub const FREE_MESSAGE_LIMIT: u32 = 5;

/// Longest accepted user input, in characters
pub const MAX_INPUT_CHARS: usize = 50;

/// Appended to the transcript when the completion call fails
pub const FALLBACK_REPLY: &str =
    "I apologize, but I'm having trouble connecting right now. Please try again in a moment.";

/// Canned questions offered before the user types anything
pub const PRESET_PROMPTS: &[PresetPrompt] = &[
    PresetPrompt { id: "food", text: "I need food assistance" },
    PresetPrompt { id: "shelter", text: "I need shelter" },
    PresetPrompt { id: "health", text: "I need healthcare" },
    PresetPrompt { id: "mental", text: "I need mental health support" },
    PresetPrompt { id: "crisis", text: "I'm in crisis" },
    PresetPrompt { id: "substance", text: "I need substance abuse help" },
];

const GUIDELINES: &str = r#"Guidelines:
1. ONLY recommend resources from the provided list above
2. Ask specific questions to understand the user's needs:
   - What type of assistance they need (shelter, food, healthcare, etc.)
   - Their location/region
   - Any specific requirements (household type, sub-population needs)
   - Any special needs (pets, accessibility, etc.)
   - Urgency of their need

3. When recommending resources:
   - Start with the most relevant to their needs
   - Include the program name and type
   - Mention available services
   - Note any restrictions or requirements
   - Include the region/location

4. Important rules:
   - If someone needs immediate emergency assistance (medical, safety), always recommend calling 911
   - For domestic violence situations, provide the National Domestic Violence Hotline: 1-800-799-SAFE
   - Keep responses concise but informative
   - Be empathetic and supportive
   - If unsure about specific details, recommend calling the resource directly
   - NEVER recommend resources that aren't in the provided list

5. Format responses clearly:
   - Use bullet points for lists
   - Bold important information
   - Separate different resources with clear breaks
   - Include available services and requirements"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresetPrompt {
    pub id: &'static str,
    pub text: &'static str,
}

/// Who the session is talking to; only changes the greeting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserType {
    Seeker,
    Volunteer,
}

impl UserType {
    pub fn greeting(&self) -> String {
        let audience = match self {
            UserType::Seeker => "you",
            UserType::Volunteer => "connect people",
        };
        format!(
            "Hi! I'm here to help {} with local resources. Select a topic below or type your question.",
            audience
        )
    }
}

/// Session limits, normally taken from configuration
#[derive(Debug, Clone, Copy)]
pub struct ChatLimits {
    pub free_message_limit: u32,
    pub max_input_chars: usize,
}

impl Default for ChatLimits {
    fn default() -> Self {
        Self {
            free_message_limit: FREE_MESSAGE_LIMIT,
            max_input_chars: MAX_INPUT_CHARS,
        }
    }
}

/// Errors returned to the chat caller
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("Message is empty")]
    EmptyMessage,

    #[error("Message exceeds {max} characters")]
    MessageTooLong { max: usize },

    #[error("You've reached the free message limit. Please use the keyword search or contact support for unlimited access.")]
    LimitReached,

    #[error("Unknown preset prompt: {0}")]
    UnknownPreset(String),

    #[error("An error occurred while connecting to the chat service.")]
    Upstream(#[source] LlmError),
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ResourceSummary<'a> {
    name: Option<&'a str>,
    #[serde(rename = "type")]
    program_type: Option<&'a str>,
    region: Option<&'a str>,
    services: ServiceFlags<'a>,
    requirements: Requirements<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ServiceFlags<'a> {
    case_management: Option<&'a str>,
    housing_navigation: Option<&'a str>,
    substance_use_treatment: Option<&'a str>,
    behavioral_health: Option<&'a str>,
    health_care: Option<&'a str>,
    food_meals: Option<&'a str>,
    hygiene: Option<&'a str>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Requirements<'a> {
    household_type: Option<&'a str>,
    sub_population: Option<&'a str>,
    pets_allowed: Option<&'a str>,
    length_of_stay: Option<&'a str>,
}

impl<'a> From<&'a ServiceRecord> for ResourceSummary<'a> {
    fn from(r: &'a ServiceRecord) -> Self {
        Self {
            name: r.program_name.as_deref(),
            program_type: r.program_type.as_deref(),
            region: r.sub_region.as_deref(),
            services: ServiceFlags {
                case_management: r.case_management.as_deref(),
                housing_navigation: r.housing_navigation.as_deref(),
                substance_use_treatment: r.substance_use_treatment.as_deref(),
                behavioral_health: r.behavioral_health.as_deref(),
                health_care: r.health_care.as_deref(),
                food_meals: r.food_meals.as_deref(),
                hygiene: r.hygiene.as_deref(),
            },
            requirements: Requirements {
                household_type: r.household_type.as_deref(),
                sub_population: r.sub_population.as_deref(),
                pets_allowed: r.pets_allowed.as_deref(),
                length_of_stay: r.length_of_stay.as_deref(),
            },
        }
    }
}

/// System instruction grounding the assistant in a catalog excerpt
pub fn build_system_prompt(excerpt: &[ServiceRecord]) -> String {
    let summaries: Vec<ResourceSummary<'_>> = excerpt.iter().map(ResourceSummary::from).collect();
    // Serializing borrowed strings cannot fail
    let resources = serde_json::to_string(&summaries).unwrap_or_else(|_| "[]".to_string());

    format!(
        "You are a helpful assistant for a community resources application. \
         Your role is to help users find appropriate resources based on their needs.\n\n\
         Available resources: {}\n\n{}",
        resources, GUIDELINES
    )
}

/// One user's conversation with the resource assistant
///
/// Holds the visible transcript and the free-tier counter. `complete` takes
/// `&mut self`, so a session never has two calls in flight.
pub struct ChatSession<T: ChatTransport> {
    transport: T,
    store: Arc<dyn KeyValueStore>,
    system_prompt: String,
    transcript: Vec<ChatMessage>,
    message_count: u32,
    limits: ChatLimits,
}

impl<T: ChatTransport> ChatSession<T> {
    pub fn new(
        transport: T,
        store: Arc<dyn KeyValueStore>,
        excerpt: &[ServiceRecord],
        user_type: UserType,
        limits: ChatLimits,
    ) -> Self {
        let message_count = read_count(store.as_ref());

        Self {
            transport,
            store,
            system_prompt: build_system_prompt(excerpt),
            transcript: vec![ChatMessage::assistant(user_type.greeting())],
            message_count,
            limits,
        }
    }

    /// Messages shown to the user, oldest first
    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    pub fn message_count(&self) -> u32 {
        self.message_count
    }

    pub fn remaining_messages(&self) -> u32 {
        self.limits.free_message_limit.saturating_sub(self.message_count)
    }

    pub fn is_limit_reached(&self) -> bool {
        self.message_count >= self.limits.free_message_limit
    }

    /// Send one of the `PRESET_PROMPTS` by id
    pub async fn send_preset(&mut self, id: &str) -> Result<ChatMessage, ChatError> {
        let prompt = PRESET_PROMPTS
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| ChatError::UnknownPreset(id.to_string()))?;
        self.complete(prompt.text).await
    }

    /// Send a user message and return the assistant's reply
    ///
    /// Validation and quota failures never reach the transport and leave the
    /// transcript untouched. Transport failures keep the user message and
    /// append `FALLBACK_REPLY`.
    pub async fn complete(&mut self, input: &str) -> Result<ChatMessage, ChatError> {
        let text = input.trim();
        if text.is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        if text.chars().count() > self.limits.max_input_chars {
            return Err(ChatError::MessageTooLong {
                max: self.limits.max_input_chars,
            });
        }
        if self.is_limit_reached() {
            tracing::info!("Chat free message limit reached ({})", self.message_count);
            return Err(ChatError::LimitReached);
        }

        self.transcript.push(ChatMessage::user(text));

        let mut request = Vec::with_capacity(self.transcript.len() + 1);
        request.push(ChatMessage::system(self.system_prompt.clone()));
        request.extend(self.transcript.iter().filter(|m| m.role != Role::System).cloned());

        match self.transport.send(&request).await {
            Ok(reply) => {
                self.transcript.push(reply.clone());
                self.message_count += 1;
                self.persist_count();
                Ok(reply)
            }
            Err(e) => {
                tracing::error!("Chat completion failed: {}", e);
                self.transcript.push(ChatMessage::assistant(FALLBACK_REPLY));
                Err(ChatError::Upstream(e))
            }
        }
    }

    fn persist_count(&self) {
        if let Err(e) = self.store.set(MESSAGE_COUNT_KEY, &self.message_count.to_string()) {
            tracing::warn!("Failed to persist chat message count: {}", e);
        }
    }
}

fn read_count(store: &dyn KeyValueStore) -> u32 {
    match store.get(MESSAGE_COUNT_KEY) {
        Ok(Some(raw)) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("Ignoring corrupt chat message count: {:?}", raw);
            0
        }),
        Ok(None) => 0,
        Err(e) => {
            tracing::warn!("Chat message count unavailable: {}", e);
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::storage::MemoryStore;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Scripted transport that records what it was sent
    struct ScriptedTransport {
        fail: bool,
        calls: AtomicUsize,
        last_request: Mutex<Vec<ChatMessage>>,
    }

    impl ScriptedTransport {
        fn replying() -> Self {
            Self { fail: false, calls: AtomicUsize::new(0), last_request: Mutex::new(vec![]) }
        }

        fn failing() -> Self {
            Self { fail: true, ..Self::replying() }
        }
    }

    #[async_trait]
    impl ChatTransport for ScriptedTransport {
        async fn send(&self, messages: &[ChatMessage]) -> Result<ChatMessage, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_request.lock().unwrap() = messages.to_vec();
            if self.fail {
                Err(LlmError::RateLimited)
            } else {
                Ok(ChatMessage::assistant("Here is a food bank."))
            }
        }
    }

    fn excerpt() -> Vec<ServiceRecord> {
        vec![ServiceRecord {
            program_name: Some("Pantry".to_string()),
            program_type: Some("Food".to_string()),
            ..Default::default()
        }]
    }

    fn session(transport: ScriptedTransport, store: Arc<dyn KeyValueStore>) -> ChatSession<ScriptedTransport> {
        ChatSession::new(transport, store, &excerpt(), UserType::Seeker, ChatLimits::default())
    }

    #[test]
    fn test_system_prompt_lists_excerpt() {
        let prompt = build_system_prompt(&excerpt());
        assert!(prompt.contains(r#""name":"Pantry""#));
        assert!(prompt.contains(r#""type":"Food""#));
        assert!(prompt.contains("1-800-799-SAFE"));
    }

    #[tokio::test]
    async fn test_successful_reply_updates_transcript_and_count() {
        let store = Arc::new(MemoryStore::new());
        let mut chat = session(ScriptedTransport::replying(), store.clone());

        let reply = chat.complete("  I need food  ").await.unwrap();

        assert_eq!(reply.content, "Here is a food bank.");
        assert_eq!(chat.transcript().len(), 3);
        assert_eq!(chat.transcript()[1], ChatMessage::user("I need food"));
        assert_eq!(chat.message_count(), 1);
        assert_eq!(store.get(MESSAGE_COUNT_KEY).unwrap().as_deref(), Some("1"));

        let sent = chat.transport.last_request.lock().unwrap().clone();
        assert_eq!(sent[0].role, Role::System);
        assert_eq!(sent.last().unwrap(), &ChatMessage::user("I need food"));
    }

    #[tokio::test]
    async fn test_empty_message_rejected_locally() {
        let mut chat = session(ScriptedTransport::replying(), Arc::new(MemoryStore::new()));

        assert!(matches!(chat.complete("   ").await, Err(ChatError::EmptyMessage)));
        assert_eq!(chat.transport.calls.load(Ordering::SeqCst), 0);
        assert_eq!(chat.transcript().len(), 1);
    }

    #[tokio::test]
    async fn test_long_message_rejected_locally() {
        let mut chat = session(ScriptedTransport::replying(), Arc::new(MemoryStore::new()));
        let long = "x".repeat(MAX_INPUT_CHARS + 1);

        assert!(matches!(
            chat.complete(&long).await,
            Err(ChatError::MessageTooLong { max: MAX_INPUT_CHARS })
        ));
        assert_eq!(chat.transport.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_limit_refuses_without_network() {
        let store = MemoryStore::new().with_entry(MESSAGE_COUNT_KEY, "5");
        let mut chat = session(ScriptedTransport::replying(), Arc::new(store));

        assert!(chat.is_limit_reached());
        assert_eq!(chat.remaining_messages(), 0);
        assert!(matches!(chat.complete("hello").await, Err(ChatError::LimitReached)));
        assert_eq!(chat.transport.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_upstream_failure_appends_fallback() {
        let mut chat = session(ScriptedTransport::failing(), Arc::new(MemoryStore::new()));

        let err = chat.complete("I need shelter").await.unwrap_err();

        assert!(matches!(err, ChatError::Upstream(LlmError::RateLimited)));
        let transcript = chat.transcript();
        assert_eq!(transcript[1], ChatMessage::user("I need shelter"));
        assert_eq!(transcript[2], ChatMessage::assistant(FALLBACK_REPLY));
        assert_eq!(chat.message_count(), 0);
    }

    #[tokio::test]
    async fn test_preset_prompts() {
        let mut chat = session(ScriptedTransport::replying(), Arc::new(MemoryStore::new()));

        chat.send_preset("shelter").await.unwrap();
        assert_eq!(chat.transcript()[1], ChatMessage::user("I need shelter"));
        assert!(matches!(
            chat.send_preset("weather").await,
            Err(ChatError::UnknownPreset(_))
        ));
    }

    #[test]
    fn test_corrupt_count_reads_as_zero() {
        let store = MemoryStore::new().with_entry(MESSAGE_COUNT_KEY, "lots");
        let chat = session(ScriptedTransport::replying(), Arc::new(store));
        assert_eq!(chat.message_count(), 0);
        assert_eq!(chat.remaining_messages(), FREE_MESSAGE_LIMIT);
    }
}
