use thiserror::Error;

use crate::client::ClientError;
use crate::models::ModelError;
use crate::render::RenderError;

/// Top-level error for the terminal front end.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
