pub mod check;
pub mod context;
pub mod feature;
pub mod init;
pub mod package;
pub mod plan;
pub mod version;
