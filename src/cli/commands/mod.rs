//! CLI command implementations

pub mod download;
pub mod info;
pub mod upload;

pub use download::execute as download;
pub use info::execute as info;
pub use upload::execute as upload;
