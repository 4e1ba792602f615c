#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("No account selected")]
    NoAccount,

    #[error(transparent)]
    IO(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::error::Error),

    #[error(transparent)]
    Config(#[from] ql_config::error::Error),

    #[error(transparent)]
    Process(#[from] ql_io::error::Error),
}
