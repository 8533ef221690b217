pub mod agent;
pub mod archive;
pub mod bundle;
pub mod check;
pub mod config;
pub mod context;
pub mod error;
pub mod feature;
pub mod git;
pub mod io;
pub mod paths;
pub mod release;
pub mod script;
pub mod templates;

pub use error::{Result, SpecifyError};
