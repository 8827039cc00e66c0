//! Dense tf-idf vectors
//!
//! tf is the raw word count of a document, idf is computed over the training
//! corpus as `log10(N / (1 + df))`. Every vector is scaled to unit L2 norm.

use crate::data::corpus::{Corpus, Document};
use std::collections::{BTreeSet, HashMap};

/// Sorted distinct words of a corpus, each mapped to its vector index
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Vocabulary {
    words: Vec<String>,
    index: HashMap<String, usize>,
}

impl Vocabulary {
    pub fn from_corpus(corpus: &Corpus) -> Self {
        let sorted: BTreeSet<&str> = corpus
            .documents()
            .flat_map(|doc| doc.keys().map(String::as_str))
            .collect();

        let words: Vec<String> = sorted.into_iter().map(str::to_string).collect();
        let index = words
            .iter()
            .enumerate()
            .map(|(i, word)| (word.clone(), i))
            .collect();

        Self { words, index }
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn index_of(&self, word: &str) -> Option<usize> {
        self.index.get(word).copied()
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }
}

/// Vectorizer fitted on a training corpus
#[derive(Debug, Clone)]
pub struct TfIdfVectorizer {
    vocabulary: Vocabulary,
    idf: Vec<f64>,
}

impl TfIdfVectorizer {
    /// Build the vocabulary and idf weights from `corpus`
    pub fn fit(corpus: &Corpus) -> Self {
        let vocabulary = Vocabulary::from_corpus(corpus);

        let mut document_frequency = vec![0usize; vocabulary.len()];
        for doc in corpus.documents() {
            for word in doc.keys() {
                if let Some(i) = vocabulary.index_of(word) {
                    document_frequency[i] += 1;
                }
            }
        }

        let n_docs = corpus.len() as f64;
        let idf = document_frequency
            .iter()
            .map(|&df| (n_docs / (1.0 + df as f64)).log10())
            .collect();

        Self { vocabulary, idf }
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// idf weight per vocabulary index
    pub fn idf(&self) -> &[f64] {
        &self.idf
    }

    /// Vector length
    pub fn dim(&self) -> usize {
        self.vocabulary.len()
    }

    /// Normalised tf-idf vector of one document; unknown words are ignored
    pub fn transform(&self, document: &Document) -> Vec<f64> {
        let mut vector = vec![0.0; self.dim()];
        for (word, &count) in document {
            if let Some(i) = self.vocabulary.index_of(word) {
                vector[i] = count as f64 * self.idf[i];
            }
        }

        let norm = vector.iter().map(|v| v * v).sum::<f64>().sqrt();
        // All-zero vectors stay zero
        if norm > 0.0 {
            for v in &mut vector {
                *v /= norm;
            }
        }
        vector
    }

    /// Vectors of every document of `corpus`, in [`Corpus::documents`] order
    pub fn vectorize(&self, corpus: &Corpus) -> Vec<Vec<f64>> {
        corpus.documents().map(|doc| self.transform(doc)).collect()
    }
}
