//! Labelled text corpus
//!
//! One document per line:
//! class<TAB>word word word ...
//!
//! Example:
//! earn	profit rose quarter
//! grain	wheat export rose

use crate::core::{Result, SVMError};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Word counts of one document
pub type Document = HashMap<String, usize>;

/// Documents grouped by class, classes in order of first appearance
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Corpus {
    classes: Vec<(String, Vec<Document>)>,
}

impl Corpus {
    /// Load a corpus from a file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path).map_err(SVMError::IoError)?;
        Self::from_reader(BufReader::new(file))
    }

    /// Load a corpus from a reader
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut corpus = Corpus::default();
        let mut positions: HashMap<String, usize> = HashMap::new();

        for (line_num, line) in reader.lines().enumerate() {
            let line = line.map_err(SVMError::IoError)?;
            if line.trim().is_empty() {
                continue;
            }

            let (class, document) = Self::parse_line(&line).map_err(|e| {
                SVMError::ParseError(format!("Error parsing line {}: {}", line_num + 1, e))
            })?;

            let position = *positions.entry(class.to_string()).or_insert_with(|| {
                corpus.classes.push((class.to_string(), Vec::new()));
                corpus.classes.len() - 1
            });
            corpus.classes[position].1.push(document);
        }

        if corpus.is_empty() {
            return Err(SVMError::EmptyDataset);
        }

        Ok(corpus)
    }

    fn parse_line(line: &str) -> std::result::Result<(&str, Document), String> {
        let (class, words) = line
            .split_once('\t')
            .ok_or_else(|| "expected <class>\\t<words>".to_string())?;

        let class = class.trim();
        if class.is_empty() {
            return Err("missing class".to_string());
        }

        let mut document = Document::new();
        for word in words.split_whitespace() {
            *document.entry(word.to_string()).or_insert(0) += 1;
        }
        if document.is_empty() {
            return Err(format!("document of class {class} has no words"));
        }

        Ok((class, document))
    }

    /// Class names in order of first appearance
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.classes.iter().map(|(class, _)| class.as_str())
    }

    /// Documents of `class`, or an empty slice for an unknown class
    pub fn documents_of(&self, class: &str) -> &[Document] {
        self.classes
            .iter()
            .find(|(name, _)| name == class)
            .map(|(_, docs)| docs.as_slice())
            .unwrap_or(&[])
    }

    /// All documents, grouped by class
    pub fn documents(&self) -> impl Iterator<Item = &Document> {
        self.classes.iter().flat_map(|(_, docs)| docs.iter())
    }

    /// Total number of documents
    pub fn len(&self) -> usize {
        self.classes.iter().map(|(_, docs)| docs.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// One-vs-rest labels: +1 for documents of `class`, -1 otherwise, in
    /// [`Corpus::documents`] order
    pub fn labels_for(&self, class: &str) -> Vec<f64> {
        self.classes
            .iter()
            .flat_map(|(name, docs)| {
                let label = if name == class { 1.0 } else { -1.0 };
                std::iter::repeat(label).take(docs.len())
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_grouped_in_first_appearance_order() {
        let data = "grain\twheat rose\nearn\tprofit rose rose\ngrain\tcorn\n";
        let corpus = Corpus::from_reader(Cursor::new(data)).unwrap();

        assert_eq!(corpus.classes().collect::<Vec<_>>(), vec!["grain", "earn"]);
        assert_eq!(corpus.len(), 3);
        assert_eq!(corpus.documents_of("grain").len(), 2);
        assert_eq!(corpus.documents_of("earn")[0]["rose"], 2);
        assert!(corpus.documents_of("crude").is_empty());

        // grain documents come first even though earn appeared on line 2
        let order: Vec<bool> = corpus.documents().map(|d| d.contains_key("profit")).collect();
        assert_eq!(order, vec![false, false, true]);
    }

    #[test]
    fn test_labels_for() {
        let data = "a\tx\nb\ty\na\tz\n";
        let corpus = Corpus::from_reader(Cursor::new(data)).unwrap();
        assert_eq!(corpus.labels_for("a"), vec![1.0, 1.0, -1.0]);
        assert_eq!(corpus.labels_for("b"), vec![-1.0, -1.0, 1.0]);
        assert_eq!(corpus.labels_for("zzz"), vec![-1.0; 3]);
    }

    #[test]
    fn test_blank_lines_are_skipped() {
        let corpus = Corpus::from_reader(Cursor::new("\na\tx  y\n\n")).unwrap();
        assert_eq!(corpus.len(), 1);
        assert_eq!(corpus.documents_of("a")[0].len(), 2);
    }

    #[test]
    fn test_parse_errors_carry_line_numbers() {
        let missing_tab = Corpus::from_reader(Cursor::new("a\tx\nb y\n"));
        match missing_tab {
            Err(SVMError::ParseError(msg)) => assert!(msg.contains("line 2"), "{msg}"),
            other => panic!("expected parse error, got {other:?}"),
        }

        assert!(matches!(
            Corpus::from_reader(Cursor::new("a\t \n")),
            Err(SVMError::ParseError(_))
        ));
        assert!(matches!(
            Corpus::from_reader(Cursor::new("")),
            Err(SVMError::EmptyDataset)
        ));
    }
}
