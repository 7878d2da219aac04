//! # carident_detect
//!
//! Detection-side analysis for carident: severity classification of a
//! normalized prediction, lesion bounding-box extraction from a probability
//! mask, and the preprocessing contract at the model boundary.
//!
//! Classification and extraction never fail for malformed-but-decodable
//! input: unrecognized shapes degrade to an `Unknown` verdict and masks
//! without qualifying regions yield an empty box list.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

mod classifier;
mod extractor;
mod preprocess;

pub use classifier::{classify, LESION_PROBABILITY_THRESHOLD};
pub use extractor::{extract, ExtractionConfig};
pub use preprocess::{preprocess_for_model, preprocess_image};
