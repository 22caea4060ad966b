mod build;
mod detect;
mod status;

pub use build::cmd_build;
pub use detect::cmd_detect;
pub use status::cmd_status;
