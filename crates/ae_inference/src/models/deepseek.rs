use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use ae_core::{Article, Error, Result, SimilarTo, SimilarityModel};

use super::{parse_judgment, similarity_prompt};
use crate::Config;

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Deserialize)]
struct Message {
    content: String,
}

pub struct DeepSeekModel {
    client: Arc<Client>,
    api_key: String,
    model: String,
    base_url: String,
}

impl DeepSeekModel {
    pub fn new(config: Config) -> Result<Self> {
        Ok(Self {
            client: Arc::new(Client::new()),
            api_key: config.api_key.unwrap_or_default(),
            model: config
                .model_name
                .unwrap_or_else(|| "deepseek-chat".to_string()),
            base_url: config
                .model_url
                .unwrap_or_else(|| "https://api.deepseek.com/v1".to_string()),
        })
    }
}

impl fmt::Debug for DeepSeekModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeepSeekModel")
            .field("client", &"<reqwest::Client>")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[async_trait]
impl SimilarityModel for DeepSeekModel {
    fn name(&self) -> &str {
        "DeepSeek"
    }

    async fn find_similar(&self, article: &Article, corpus: &[Article]) -> Result<SimilarTo> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: similarity_prompt(article, corpus)?,
            }],
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await?
            .json::<ChatResponse>()
            .await?;

        let content = response
            .choices
            .first()
            .map(|choice| choice.message.content.as_str())
            .ok_or_else(|| Error::Inference("no content returned".to_string()))?;

        parse_judgment(content)
    }
}
