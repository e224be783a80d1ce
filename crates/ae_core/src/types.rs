use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub summary: String,
    pub category: String,
    pub takeaways: Vec<String>,
}

/// Similarity annotation attached to an article. `title == None` means no
/// sufficiently similar prior article was found; a matched title always
/// comes with a non-empty reason.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarTo {
    pub title: Option<String>,
    pub reason: String,
}

impl SimilarTo {
    pub fn matched(title: impl Into<String>, reason: impl Into<String>) -> crate::Result<Self> {
        let annotation = Self {
            title: Some(title.into()),
            reason: reason.into(),
        };
        annotation.check()?;
        Ok(annotation)
    }

    pub fn no_match(reason: impl Into<String>) -> Self {
        Self {
            title: None,
            reason: reason.into(),
        }
    }

    pub fn check(&self) -> crate::Result<()> {
        if self.title.is_some() && self.reason.trim().is_empty() {
            return Err(crate::Error::Validation(
                "similarity match carries an empty reason".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedArticle {
    pub title: String,
    pub summary: String,
    pub category: String,
    pub takeaways: Vec<String>,
    #[serde(rename = "similarTo")]
    pub similar_to: SimilarTo,
}

impl EnrichedArticle {
    pub fn new(article: Article, similar_to: SimilarTo) -> Self {
        Self {
            title: article.title,
            summary: article.summary,
            category: article.category,
            takeaways: article.takeaways,
            similar_to,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matched_annotation_requires_a_reason() {
        assert!(SimilarTo::matched("Prior piece", "same subject").is_ok());
        assert!(SimilarTo::matched("Prior piece", "  ").is_err());
    }

    #[test]
    fn no_match_allows_any_reason() {
        let annotation = SimilarTo::no_match("no match");
        assert!(annotation.title.is_none());
        assert!(annotation.check().is_ok());
    }

    #[test]
    fn enriched_article_keeps_article_fields() {
        let article = Article {
            title: "A".to_string(),
            summary: "S".to_string(),
            category: "C".to_string(),
            takeaways: vec!["t1".to_string()],
        };
        let enriched = EnrichedArticle::new(article.clone(), SimilarTo::no_match("no match"));
        assert_eq!(enriched.title, article.title);
        assert_eq!(enriched.takeaways, article.takeaways);
    }
}
