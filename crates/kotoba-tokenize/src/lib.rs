//! Japanese text segmentation and the Juman++ tokenizer adapter.
//!
//! [`segment::split_sentences`] carves raw text into sentences;
//! [`JumanppTokenizer`] hands each sentence to the Juman++ morphological
//! analyzer and extracts dictionary-form tokens from its lattice output.

mod jumanpp;
pub mod parse;
pub mod segment;

pub use jumanpp::JumanppTokenizer;
