#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum DatasetError {
    #[error("duplicate key {key} in table '{table}'")]
    DuplicateKey { table: &'static str, key: String },
}
