use std::sync::Arc;

use serde::Deserialize;

use ae_core::{Article, Error, Result, SimilarTo, SimilarityModel};

use crate::Config;

pub mod deepseek;
pub mod dummy;

pub use deepseek::DeepSeekModel;
pub use dummy::DummyModel;

pub async fn create_model(name: &str, config: Option<Config>) -> Result<Arc<dyn SimilarityModel>> {
    match name {
        "dummy" => Ok(Arc::new(DummyModel::new())),
        "deepseek" => Ok(Arc::new(DeepSeekModel::new(config.unwrap_or_default())?)),
        other => Err(Error::Inference(format!(
            "unknown similarity model: {}",
            other
        ))),
    }
}

pub(crate) fn similarity_prompt(article: &Article, corpus: &[Article]) -> Result<String> {
    Ok(format!(
        "You judge semantic similarity between news articles.\n\n\
         Candidate article:\n{}\n\n\
         Prior corpus, in order:\n{}\n\n\
         Pick the single most similar prior article, or decide none is \
         sufficiently similar. Respond with exactly one JSON object of the \
         shape {{\"title\": string or null, \"reason\": string}} and nothing \
         else. Use null for title when there is no sufficiently similar \
         article.",
        serde_json::to_string_pretty(article)?,
        serde_json::to_string_pretty(corpus)?,
    ))
}

#[derive(Deserialize)]
struct Judgment {
    title: Option<String>,
    reason: String,
}

/// Parse a model response body into the similarity annotation. Anything that
/// is not the expected `{title, reason}` shape is an inference error.
pub(crate) fn parse_judgment(content: &str) -> Result<SimilarTo> {
    let trimmed = content
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();
    let judgment: Judgment = serde_json::from_str(trimmed).map_err(|e| {
        Error::Inference(format!("response was not a {{title, reason}} object: {}", e))
    })?;
    let similar = SimilarTo {
        title: judgment.title,
        reason: judgment.reason,
    };
    similar
        .check()
        .map_err(|e| Error::Inference(e.to_string()))?;
    Ok(similar)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(title: &str, category: &str) -> Article {
        Article {
            title: title.to_string(),
            summary: "s".to_string(),
            category: category.to_string(),
            takeaways: vec![],
        }
    }

    #[test]
    fn prompt_carries_candidate_and_corpus() {
        let prompt = similarity_prompt(
            &article("Fresh take", "energy"),
            &[article("Old take", "energy")],
        )
        .unwrap();
        assert!(prompt.contains("Fresh take"));
        assert!(prompt.contains("Old take"));
    }

    #[test]
    fn parses_a_plain_judgment() {
        let similar =
            parse_judgment(r#"{"title": "Old take", "reason": "same grid topic"}"#).unwrap();
        assert_eq!(similar.title.as_deref(), Some("Old take"));
        assert_eq!(similar.reason, "same grid topic");
    }

    #[test]
    fn parses_a_fenced_judgment() {
        let similar =
            parse_judgment("```json\n{\"title\": null, \"reason\": \"no match\"}\n```").unwrap();
        assert!(similar.title.is_none());
    }

    #[test]
    fn rejects_the_wrong_shape() {
        assert!(matches!(
            parse_judgment(r#"{"verdict": "similar"}"#),
            Err(Error::Inference(_))
        ));
        assert!(matches!(parse_judgment("not json"), Err(Error::Inference(_))));
    }

    #[test]
    fn rejects_a_match_without_a_reason() {
        assert!(matches!(
            parse_judgment(r#"{"title": "Old take", "reason": "  "}"#),
            Err(Error::Inference(_))
        ));
    }

    #[tokio::test]
    async fn factory_knows_its_models() {
        assert!(create_model("dummy", None).await.is_ok());
        assert!(create_model("deepseek", None).await.is_ok());
        assert!(create_model("oracle", None).await.is_err());
    }
}
