use lamina_graph::GraphError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Graph(#[from] GraphError),
    #[error("invalid crossing minimization options: {0}")]
    InvalidOptions(String),
    #[error("failed to parse crossing minimization options: {0}")]
    OptionsJson(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
