pub mod convert;
pub mod environment;
pub mod error;
pub mod group;
pub mod instantiate;
pub mod parse;
pub mod project;
pub mod template;
pub mod url;

pub use convert::{ConvertOptions, Converter};
pub use error::{ConvertError, DocumentError, ResolveError};
pub use project::Project;
