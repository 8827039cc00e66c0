//! Text corpora and their vector representation
//!
//! A [`Corpus`] is read from `class<TAB>words` lines; a [`TfIdfVectorizer`]
//! fitted on the training corpus turns documents of any corpus into dense,
//! normalised vectors.

pub mod corpus;
pub mod tfidf;

pub use self::corpus::*;
pub use self::tfidf::*;

use crate::core::{Result, TrainingSet};

/// One-vs-rest training set for `class` from pre-computed corpus vectors
pub fn one_vs_rest(values: &[Vec<f64>], corpus: &Corpus, class: &str) -> Result<TrainingSet> {
    TrainingSet::new(values.to_vec(), corpus.labels_for(class))
}
