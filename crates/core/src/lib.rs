pub mod config;
pub mod error;
pub mod note;
pub mod sentinel;
pub mod style;

pub use config::Config;
pub use error::*;
pub use note::*;
pub use sentinel::{has_usable_content, is_sentinel};
pub use style::LearningStyle;
