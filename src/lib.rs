pub mod archive;
pub mod ci;
pub mod commands;
pub mod config;
pub mod error;
pub mod manifest;
pub mod package;
pub mod runtime;
pub mod userdata;
pub mod version;

pub use error::PackError;
pub use package::{PackageOptions, PackageReport, PackageTool};
pub use userdata::{LinkOutcome, UnlinkOutcome, link_user_data, unlink_user_data};
