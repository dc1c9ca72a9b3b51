//! Core types shared by every kilntwo component
//!
//! - [`KilnError`] and [`ErrorContext`]: the error taxonomy and its
//!   user-facing rendering
//! - [`AssetCategory`]: the five categories of the asset bundle

mod category;
pub mod error;

pub use category::AssetCategory;
pub use error::{ErrorContext, KilnError, user_friendly_error};
