use async_trait::async_trait;

use crate::types::{Article, SimilarTo};
use crate::Result;

#[async_trait]
pub trait SimilarityModel: Send + Sync {
    fn name(&self) -> &str;

    /// Judge which article in `corpus` (ordered, possibly empty) is most
    /// similar to `article`. No retry is built in; callers wrap this the
    /// same way they wrap channel operations.
    async fn find_similar(&self, article: &Article, corpus: &[Article]) -> Result<SimilarTo>;
}
