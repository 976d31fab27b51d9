#![deny(clippy::all)]

/**
 * Azure Functions binding compiler - output model
 *
 * Source locations and the synthetic statement model emitted around
 * serverless function entry points.
 */

pub mod output;
pub mod parse_util;

pub use parse_util::{ParseLocation, ParseSourceSpan};
