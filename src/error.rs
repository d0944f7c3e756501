use thiserror::Error;

#[derive(Error, Debug)]
pub enum J2covError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML parse error at position {position}: {source}")]
    Xml {
        source: quick_xml::Error,
        position: usize,
    },

    #[error("malformed JaCoCo report: {0}")]
    Malformed(String),

    #[error("writing Cobertura XML: {0}")]
    Write(#[from] quick_xml::Error),
}

pub type Result<T> = std::result::Result<T, J2covError>;
