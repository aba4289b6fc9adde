pub mod html;
pub mod severity;
pub mod view;

pub use html::HtmlRenderer;
pub use severity::classify_triage;
pub use view::{AnalysisView, ConditionRow, ListSection};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),
}
