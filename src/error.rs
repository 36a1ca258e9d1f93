use crate::conf::parse::ParseError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("cannot read config {name}: {source}")]
    Read {
        name: String,
        source: std::io::Error,
    },

    #[error("cannot list configs: {0}")]
    List(std::io::Error),

    #[error("bad pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("wg cmd fail: {0:?}")]
    WgCommandFail(Option<i32>),

    #[error("cannot parse wg output: {0}")]
    WgOutput(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
