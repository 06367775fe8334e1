#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("canvas dimensions must be finite and positive (got {width}x{height})")]
    InvalidCanvas { width: f64, height: f64 },

    #[error("invalid layout option `{name}`: {value}")]
    InvalidOption { name: &'static str, value: String },

    #[error("invalid layout options JSON: {0}")]
    OptionsJson(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
