//! Utility Functions
//!
//! User-friendly error formatting for the command-line front end.
//!
//! ```rust
//! use input_humanizer::utils::format_user_error;
//!
//! let error = anyhow::anyhow!("Failed to parse config");
//! eprintln!("{}", format_user_error(&error));
//! ```
//!
//! Typed lock and input errors get specific help (who holds the device,
//! accepted key names); configuration problems list the validation rules.

pub mod errors;

pub use errors::format_user_error;
