//! Output formatters for duplicate search results.
//!
//! - [`text`]: grep-friendly listing, the default
//! - [`json`]: machine-readable document for scripting
//!
//! # Example
//!
//! ```no_run
//! use dupfinder::duplicates::DuplicateFinder;
//! use dupfinder::error::ExitCode;
//! use dupfinder::output::{JsonOutput, TextOutput};
//! use std::path::PathBuf;
//!
//! let finder = DuplicateFinder::with_defaults();
//! let (result, summary) = finder.find_duplicates_in_paths(&[PathBuf::from(".")]).unwrap();
//!
//! print!("{}", TextOutput::new(&result).render());
//! let json = JsonOutput::new(&result, &summary, ExitCode::Success);
//! println!("{}", json.to_json_pretty().unwrap());
//! ```

pub mod json;
pub mod text;

pub use json::JsonOutput;
pub use text::TextOutput;
