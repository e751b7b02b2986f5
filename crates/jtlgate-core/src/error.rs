use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum GateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("No results found: {0}")]
    EmptyResults(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl Serialize for GateError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
