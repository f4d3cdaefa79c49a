use super::prompts::{system_prompt, user_message};
use super::{ingest, TrackRecord};
use crate::error::Result;
use crate::llm::{create_llm, ChatMessage, LLMConfig, LLMProvider, LLM};
use tracing::{debug, info, warn};

/// Generates playlist plans through an LLM provider
pub struct PlaylistGenerator {
    llm: Box<dyn LLM>,
}

impl PlaylistGenerator {
    pub fn new(llm: Box<dyn LLM>) -> Self {
        Self { llm }
    }

    /// Build a generator from configuration; fails before any request when the key is missing
    pub fn from_config(config: &LLMConfig) -> Result<Self> {
        let llm = create_llm(config)?;
        info!("✅ Playlist generator initialized with {:?} provider", config.provider);
        Ok(Self::new(llm))
    }

    pub fn provider_type(&self) -> LLMProvider {
        self.llm.provider_type()
    }

    /// System and user messages for one topic
    pub fn messages(topic: &str) -> Vec<ChatMessage> {
        vec![
            ChatMessage::system(system_prompt()),
            ChatMessage::user(user_message(topic)),
        ]
    }

    /// Request a plan and return the raw completion text
    ///
    /// The provider runs in JSON mode, but the output is not validated here.
    pub async fn generate(&self, topic: &str) -> Result<String> {
        if topic.trim().is_empty() {
            warn!("Generating a playlist without a topic");
        }

        let response = self.llm.chat(Self::messages(topic)).await?;

        debug!(
            "LLM response received ({} chars, {:?} tokens)",
            response.content.len(),
            response.tokens_used
        );

        Ok(response.content)
    }

    /// Request a plan and ingest it into tracks
    pub async fn generate_playlist(&self, topic: &str) -> Result<Vec<TrackRecord>> {
        let raw = self.generate(topic).await?;
        ingest(raw.as_str())
    }
}
