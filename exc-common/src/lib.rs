pub mod archive;
pub mod error;
pub mod manifest;

pub use error::CommonError;
pub use manifest::Manifest;
