pub mod models;

pub use models::create_model;

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub api_key: Option<String>,
    pub model_name: Option<String>,
    pub model_url: Option<String>,
}

pub mod prelude {
    pub use super::models::create_model;
    pub use super::Config;
    pub use ae_core::{Article, Error, Result, SimilarTo, SimilarityModel};
}
