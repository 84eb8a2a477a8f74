use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum CatalogError {
    #[error("invalid record {id}: {reason}")]
    InvalidRecord { id: u32, reason: String },

    #[error("catalog contains no records")]
    EmptyCatalog,

    #[error("failed to fetch catalog: {0}")]
    Fetch(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProjectionError {
    #[error("projection produced a non-finite coordinate")]
    Degenerate,
}
