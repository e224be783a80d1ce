pub mod channel;
pub mod codec;
pub mod diff;
pub mod error;
pub mod model;
pub mod types;

pub use channel::DocumentChannel;
pub use diff::Diff;
pub use error::Error;
pub use model::SimilarityModel;
pub use types::{Article, EnrichedArticle, SimilarTo};

pub type Result<T> = std::result::Result<T, Error>;
