use thiserror::Error;

use crate::dom::tree::TreeError;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Tree error: {0}")]
    Tree(#[from] TreeError),
    #[error("Config error: {0}")]
    Config(String),
    // raised by processor implementations, passed through the loop untouched
    #[error("Processor error in {processor}: {message}")]
    Processor { processor: String, message: String },
    #[error("Resolution error: {0}")]
    Resolution(String),
    #[error("Precondition violated: {0}")]
    Precondition(String),
    #[error("Template not found: {0}")]
    TemplateNotFound(String),
}

pub type EngineResult<T> = Result<T, Error>;

impl Error {
    pub fn precondition<S: Into<String>>(message: S) -> Self {
        Error::Precondition(message.into())
    }

    pub fn processor<P: Into<String>, S: Into<String>>(processor: P, message: S) -> Self {
        Error::Processor {
            processor: processor.into(),
            message: message.into(),
        }
    }

    pub fn resolution<S: Into<String>>(message: S) -> Self {
        Error::Resolution(message.into())
    }
}
