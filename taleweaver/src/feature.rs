use std::collections::{BTreeMap, BTreeSet};

use bincode::{Decode, Encode};
use hashbrown::HashMap;
use unicode_segmentation::UnicodeSegmentation;

use crate::errors::{Result, TaleweaverError};

/// Term weighting scheme.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Decode, Encode)]
pub enum Weighting {
    /// Raw term counts.
    Count,

    /// Term counts scaled by the smoothed inverse document frequency, then L2-normalized.
    TfIdf,
}

/// Configuration of [`TfidfVectorizer`].
#[derive(Clone, Debug, PartialEq, Eq, Decode, Encode)]
pub struct VectorizerConfig {
    pub(crate) min_n: u8,
    pub(crate) max_n: u8,
    pub(crate) max_features: Option<u32>,
    pub(crate) weighting: Weighting,
}

impl Default for VectorizerConfig {
    fn default() -> Self {
        Self {
            min_n: 1,
            max_n: 2,
            max_features: Some(5000),
            weighting: Weighting::TfIdf,
        }
    }
}

impl VectorizerConfig {
    /// Sets the range of word n-gram lengths.
    ///
    /// # Errors
    ///
    /// [`TaleweaverError::InvalidArgument`] will be returned if `min_n` is zero or greater than
    /// `max_n`.
    pub fn ngram_range(mut self, min_n: u8, max_n: u8) -> Result<Self> {
        if min_n == 0 || min_n > max_n {
            return Err(TaleweaverError::invalid_argument(
                "ngram_range",
                format!("invalid range: ({min_n}, {max_n})"),
            ));
        }
        self.min_n = min_n;
        self.max_n = max_n;
        Ok(self)
    }

    /// Keeps only the most frequent terms of the corpus. `None` disables the cap.
    pub fn max_features(mut self, max_features: Option<u32>) -> Self {
        self.max_features = max_features;
        self
    }

    /// Sets the weighting scheme.
    pub fn weighting(mut self, weighting: Weighting) -> Self {
        self.weighting = weighting;
        self
    }
}

/// Fixed-length feature vector stored as sorted `(index, weight)` pairs.
#[derive(Clone, Debug, PartialEq)]
pub struct FeatureVector {
    dim: usize,
    entries: Vec<(u32, f64)>,
}

impl FeatureVector {
    /// Creates a vector from `(index, weight)` pairs.
    ///
    /// # Errors
    ///
    /// [`TaleweaverError::InvalidArgument`] will be returned if an index is out of range, the
    /// indices are not strictly increasing, or a weight is negative or not finite.
    pub fn new(dim: usize, entries: Vec<(u32, f64)>) -> Result<Self> {
        let mut prev = None;
        for &(idx, w) in &entries {
            if idx as usize >= dim || prev.map_or(false, |p| p >= idx) {
                return Err(TaleweaverError::invalid_argument(
                    "entries",
                    "indices must be strictly increasing and less than dim",
                ));
            }
            if !(w.is_finite() && w >= 0.0) {
                return Err(TaleweaverError::invalid_argument(
                    "entries",
                    format!("weight of index {idx} must be finite and non-negative, got {w}"),
                ));
            }
            prev = Some(idx);
        }
        Ok(Self { dim, entries })
    }

    /// Number of dimensions, i.e., the vocabulary size.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Non-zero entries in index order.
    pub fn entries(&self) -> &[(u32, f64)] {
        &self.entries
    }

    /// Returns `true` if every component is zero.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Expands the vector into a dense representation.
    pub fn to_dense(&self) -> Vec<f64> {
        let mut dense = vec![0.0; self.dim];
        for &(idx, w) in &self.entries {
            dense[idx as usize] = w;
        }
        dense
    }
}

/// Splits text into lowercase word tokens of two or more characters.
pub(crate) fn tokenize(text: &str) -> Vec<String> {
    let mut tokens = vec![];
    for word in text.unicode_words() {
        for piece in word.split(|c: char| !c.is_alphanumeric() && c != '_') {
            if piece.chars().nth(1).is_some() {
                tokens.push(piece.to_lowercase());
            }
        }
    }
    tokens
}

/// Vectorizer state that is written to the model artifact.
#[derive(Decode, Encode)]
pub(crate) struct VectorizerData {
    pub(crate) config: VectorizerConfig,
    pub(crate) terms: Vec<String>,
    pub(crate) idf: Vec<f64>,
}

struct Vocabulary {
    ids: HashMap<String, u32>,
    terms: Vec<String>,
    idf: Vec<f64>,
}

impl Vocabulary {
    fn new(terms: Vec<String>, idf: Vec<f64>) -> Self {
        let ids = terms
            .iter()
            .enumerate()
            .map(|(i, t)| (t.clone(), i as u32))
            .collect();
        Self { ids, terms, idf }
    }
}

/// Word n-gram feature extractor.
///
/// # Examples
///
/// ```
/// use taleweaver::{TfidfVectorizer, VectorizerConfig};
///
/// let mut vectorizer = TfidfVectorizer::new(VectorizerConfig::default());
/// vectorizer.fit(&["Count the stars", "Sing me a rhyme"]).unwrap();
///
/// let v = vectorizer.transform("count the sheep").unwrap();
/// assert_eq!(vectorizer.n_features(), Some(v.dim()));
/// assert_eq!(3, v.entries().len());
/// ```
pub struct TfidfVectorizer {
    config: VectorizerConfig,
    vocab: Option<Vocabulary>,
}

impl TfidfVectorizer {
    /// Creates an unfitted vectorizer.
    pub fn new(config: VectorizerConfig) -> Self {
        Self {
            config,
            vocab: None,
        }
    }

    pub fn config(&self) -> &VectorizerConfig {
        &self.config
    }

    /// Gets the vocabulary size, or `None` if the vectorizer has not been fitted.
    pub fn n_features(&self) -> Option<usize> {
        self.vocab.as_ref().map(|v| v.terms.len())
    }

    /// Gets the term assigned to each feature index.
    pub fn terms(&self) -> Option<&[String]> {
        self.vocab.as_ref().map(|v| v.terms.as_slice())
    }

    fn analyze(&self, text: &str) -> Vec<String> {
        let tokens = tokenize(text);
        let mut terms = vec![];
        for n in usize::from(self.config.min_n)..=usize::from(self.config.max_n) {
            for window in tokens.windows(n) {
                terms.push(window.join(" "));
            }
        }
        terms
    }

    /// Learns the vocabulary and document frequencies from a corpus.
    ///
    /// Any previously learned state is discarded.
    ///
    /// # Errors
    ///
    /// [`TaleweaverError::InsufficientData`] will be returned if `texts` is empty or no term
    /// survives tokenization and the `max_features` cap.
    pub fn fit<S>(&mut self, texts: &[S]) -> Result<()>
    where
        S: AsRef<str>,
    {
        if texts.is_empty() {
            return Err(TaleweaverError::insufficient_data("training corpus is empty"));
        }

        // term -> (corpus frequency, document frequency)
        let mut stats: BTreeMap<String, (u64, u32)> = BTreeMap::new();
        for text in texts {
            let terms = self.analyze(text.as_ref());
            let mut seen = BTreeSet::new();
            for term in terms {
                let entry = stats.entry(term.clone()).or_insert((0, 0));
                entry.0 += 1;
                if seen.insert(term) {
                    entry.1 += 1;
                }
            }
        }
        if stats.is_empty() {
            return Err(TaleweaverError::insufficient_data(
                "vocabulary is empty after tokenization",
            ));
        }

        let mut entries: Vec<_> = stats.into_iter().collect();
        if let Some(max_features) = self.config.max_features {
            let max_features = max_features as usize;
            if entries.len() > max_features {
                // Stable sort keeps the term order among equally frequent terms.
                entries.sort_by(|a, b| b.1 .0.cmp(&a.1 .0));
                entries.truncate(max_features);
                entries.sort_by(|a, b| a.0.cmp(&b.0));
            }
        }
        if entries.is_empty() {
            return Err(TaleweaverError::insufficient_data(
                "vocabulary is empty after applying max_features",
            ));
        }

        let n_docs = texts.len() as f64;
        let mut terms = Vec::with_capacity(entries.len());
        let mut idf = Vec::with_capacity(entries.len());
        for (term, (_, df)) in entries {
            terms.push(term);
            idf.push(match self.config.weighting {
                Weighting::Count => 1.0,
                Weighting::TfIdf => ((1.0 + n_docs) / (1.0 + f64::from(df))).ln() + 1.0,
            });
        }
        log::debug!("fitted vocabulary with {} terms", terms.len());
        self.vocab = Some(Vocabulary::new(terms, idf));
        Ok(())
    }

    /// Converts a text into a feature vector. Terms outside the vocabulary are ignored.
    ///
    /// # Errors
    ///
    /// [`TaleweaverError::NotFitted`] will be returned if the vectorizer has not been fitted.
    pub fn transform(&self, text: &str) -> Result<FeatureVector> {
        let vocab = self
            .vocab
            .as_ref()
            .ok_or_else(|| TaleweaverError::not_fitted("TfidfVectorizer"))?;
        let mut counts: BTreeMap<u32, f64> = BTreeMap::new();
        for term in self.analyze(text) {
            if let Some(&id) = vocab.ids.get(term.as_str()) {
                *counts.entry(id).or_insert(0.0) += 1.0;
            }
        }
        let mut entries: Vec<(u32, f64)> = counts
            .into_iter()
            .map(|(id, tf)| (id, tf * vocab.idf[id as usize]))
            .collect();
        if self.config.weighting == Weighting::TfIdf {
            let norm = entries.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
            if norm > 0.0 {
                for (_, w) in &mut entries {
                    *w /= norm;
                }
            }
        }
        Ok(FeatureVector {
            dim: vocab.terms.len(),
            entries,
        })
    }

    /// Fits the vectorizer and transforms every text of the corpus.
    pub fn fit_transform<S>(&mut self, texts: &[S]) -> Result<Vec<FeatureVector>>
    where
        S: AsRef<str>,
    {
        self.fit(texts)?;
        texts.iter().map(|t| self.transform(t.as_ref())).collect()
    }

    pub(crate) fn to_data(&self) -> Result<VectorizerData> {
        let vocab = self
            .vocab
            .as_ref()
            .ok_or_else(|| TaleweaverError::not_fitted("TfidfVectorizer"))?;
        Ok(VectorizerData {
            config: self.config.clone(),
            terms: vocab.terms.clone(),
            idf: vocab.idf.clone(),
        })
    }

    pub(crate) fn from_data(data: VectorizerData) -> Result<Self> {
        let VectorizerData { config, terms, idf } = data;
        if config.min_n == 0 || config.min_n > config.max_n {
            return Err(TaleweaverError::corrupt_artifact("invalid n-gram range"));
        }
        if terms.is_empty() || terms.len() != idf.len() {
            return Err(TaleweaverError::corrupt_artifact(
                "vocabulary and idf table do not match",
            ));
        }
        if u32::try_from(terms.len()).is_err() {
            return Err(TaleweaverError::corrupt_artifact("vocabulary is too large"));
        }
        if terms.windows(2).any(|w| w[0] >= w[1]) {
            return Err(TaleweaverError::corrupt_artifact(
                "vocabulary must be sorted and unique",
            ));
        }
        if idf.iter().any(|w| !w.is_finite() || *w <= 0.0) {
            return Err(TaleweaverError::corrupt_artifact("idf weights must be positive"));
        }
        Ok(Self {
            config,
            vocab: Some(Vocabulary::new(terms, idf)),
        })
    }
}
