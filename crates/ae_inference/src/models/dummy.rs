use std::fmt;

use ae_core::{Article, Result, SimilarTo, SimilarityModel};

/// Offline heuristic model: the first prior article sharing the candidate's
/// category counts as the match. Used by tests and `--model dummy` runs.
pub struct DummyModel;

impl fmt::Debug for DummyModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DummyModel").finish()
    }
}

impl DummyModel {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DummyModel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl SimilarityModel for DummyModel {
    fn name(&self) -> &str {
        "Dummy"
    }

    async fn find_similar(&self, article: &Article, corpus: &[Article]) -> Result<SimilarTo> {
        match corpus.iter().find(|prior| prior.category == article.category) {
            Some(prior) => SimilarTo::matched(
                prior.title.clone(),
                format!("shares the {} category", prior.category),
            ),
            None => Ok(SimilarTo::no_match("no match")),
        }
    }
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

    #[tokio::test]
    async fn empty_corpus_yields_no_match() {
        let model = DummyModel::new();
        let similar = model
            .find_similar(&article("Fresh", "energy"), &[])
            .await
            .unwrap();
        assert!(similar.title.is_none());
        assert_eq!(similar.reason, "no match");
    }

    #[tokio::test]
    async fn first_category_match_wins() {
        let model = DummyModel::new();
        let corpus = vec![
            article("Other beat", "water"),
            article("Old energy take", "energy"),
            article("Newer energy take", "energy"),
        ];
        let similar = model
            .find_similar(&article("Fresh", "energy"), &corpus)
            .await
            .unwrap();
        assert_eq!(similar.title.as_deref(), Some("Old energy take"));
        assert!(!similar.reason.is_empty());
    }
}
