use bincode::{Decode, Encode};

use crate::category::Category;
use crate::errors::{Result, TaleweaverError};
use crate::feature::FeatureVector;

/// Learned parameters of [`MultinomialNb`].
///
/// Rows of `feature_log_prob` are ordered as `classes`, which is sorted by category priority.
#[derive(Clone, Debug, PartialEq, Decode, Encode)]
pub(crate) struct NbParams {
    pub(crate) alpha: f64,
    pub(crate) classes: Vec<Category>,
    pub(crate) class_log_prior: Vec<f64>,
    pub(crate) feature_log_prob: Vec<Vec<f64>>,
}

impl NbParams {
    fn n_features(&self) -> usize {
        self.feature_log_prob.first().map_or(0, Vec::len)
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if !(self.alpha.is_finite() && self.alpha > 0.0) {
            return Err(TaleweaverError::corrupt_artifact("alpha must be positive"));
        }
        if self.classes.is_empty() {
            return Err(TaleweaverError::corrupt_artifact("model has no classes"));
        }
        if self.classes.windows(2).any(|w| w[0] >= w[1]) {
            return Err(TaleweaverError::corrupt_artifact(
                "classes must be unique and in priority order",
            ));
        }
        if self.class_log_prior.len() != self.classes.len()
            || self.feature_log_prob.len() != self.classes.len()
        {
            return Err(TaleweaverError::corrupt_artifact(
                "number of classes does not match parameter tables",
            ));
        }
        let n_features = self.n_features();
        if self
            .feature_log_prob
            .iter()
            .any(|row| row.len() != n_features)
        {
            return Err(TaleweaverError::corrupt_artifact(
                "likelihood rows have different lengths",
            ));
        }
        let all_finite = self
            .class_log_prior
            .iter()
            .chain(self.feature_log_prob.iter().flatten())
            .all(|w| w.is_finite());
        if !all_finite {
            return Err(TaleweaverError::corrupt_artifact(
                "model parameters must be finite",
            ));
        }
        Ok(())
    }
}

/// Multinomial naive Bayes classifier with additive smoothing.
///
/// Classes that never appear in the training data are never predicted. When several classes
/// reach exactly the same score, the one declared first in [`Category`] is returned.
pub struct MultinomialNb {
    alpha: f64,
    params: Option<NbParams>,
}

impl Default for MultinomialNb {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            params: None,
        }
    }
}

impl MultinomialNb {
    /// Creates an unfitted model.
    ///
    /// # Arguments
    ///
    /// * `alpha` - Additive smoothing parameter.
    ///
    /// # Errors
    ///
    /// [`TaleweaverError::InvalidArgument`] will be returned if `alpha` is not positive.
    pub fn new(alpha: f64) -> Result<Self> {
        if !(alpha.is_finite() && alpha > 0.0) {
            return Err(TaleweaverError::invalid_argument(
                "alpha",
                "must be a positive finite number",
            ));
        }
        Ok(Self {
            alpha,
            params: None,
        })
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Gets the classes seen during training in priority order.
    pub fn classes(&self) -> Option<&[Category]> {
        self.params.as_ref().map(|p| p.classes.as_slice())
    }

    /// Estimates class priors and term likelihoods. Any previously learned state is discarded.
    ///
    /// # Errors
    ///
    /// - [`TaleweaverError::InsufficientData`] if `xs` is empty.
    /// - [`TaleweaverError::InvalidArgument`] if `xs` and `ys` differ in length, the vectors
    ///   differ in dimension, or the weights are too large to yield finite parameters.
    pub fn fit(&mut self, xs: &[FeatureVector], ys: &[Category]) -> Result<()> {
        if xs.len() != ys.len() {
            return Err(TaleweaverError::invalid_argument(
                "ys",
                format!("expected {} labels, got {}", xs.len(), ys.len()),
            ));
        }
        let n_features = xs
            .first()
            .ok_or_else(|| TaleweaverError::insufficient_data("no training examples"))?
            .dim();
        if xs.iter().any(|x| x.dim() != n_features) {
            return Err(TaleweaverError::invalid_argument(
                "xs",
                "all vectors must have the same dimension",
            ));
        }

        let mut class_counts = [0usize; Category::ALL.len()];
        let mut feature_counts = vec![vec![0.0; n_features]; Category::ALL.len()];
        for (x, &y) in xs.iter().zip(ys) {
            let row = &mut feature_counts[y.priority()];
            for &(idx, w) in x.entries() {
                row[idx as usize] += w;
            }
            class_counts[y.priority()] += 1;
        }

        let n_examples = xs.len() as f64;
        let mut params = NbParams {
            alpha: self.alpha,
            classes: vec![],
            class_log_prior: vec![],
            feature_log_prob: vec![],
        };
        for (c, row) in Category::ALL.into_iter().zip(feature_counts) {
            let count = class_counts[c.priority()];
            if count == 0 {
                continue;
            }
            let denom = row.iter().sum::<f64>() + self.alpha * n_features as f64;
            params.classes.push(c);
            params.class_log_prior.push((count as f64 / n_examples).ln());
            params.feature_log_prob.push(
                row.into_iter()
                    .map(|fc| ((fc + self.alpha) / denom).ln())
                    .collect(),
            );
        }
        if params
            .feature_log_prob
            .iter()
            .flatten()
            .any(|w| !w.is_finite())
        {
            return Err(TaleweaverError::invalid_argument(
                "xs",
                "feature weights yield non-finite likelihoods",
            ));
        }
        log::debug!(
            "fitted naive Bayes on {} examples, {} classes, {} features",
            xs.len(),
            params.classes.len(),
            n_features
        );
        self.params = Some(params);
        Ok(())
    }

    fn fitted_params(&self) -> Result<&NbParams> {
        self.params
            .as_ref()
            .ok_or_else(|| TaleweaverError::not_fitted("MultinomialNb"))
    }

    /// Computes the joint log likelihood of each trained class in priority order.
    ///
    /// # Errors
    ///
    /// - [`TaleweaverError::NotFitted`] if the model has not been fitted or loaded.
    /// - [`TaleweaverError::InvalidArgument`] if the vector dimension does not match.
    pub fn scores(&self, x: &FeatureVector) -> Result<Vec<(Category, f64)>> {
        let params = self.fitted_params()?;
        if x.dim() != params.n_features() {
            return Err(TaleweaverError::invalid_argument(
                "x",
                format!(
                    "expected dimension {}, got {}",
                    params.n_features(),
                    x.dim()
                ),
            ));
        }
        Ok(params
            .classes
            .iter()
            .zip(&params.class_log_prior)
            .zip(&params.feature_log_prob)
            .map(|((&c, &prior), row)| {
                let score = x
                    .entries()
                    .iter()
                    .fold(prior, |acc, &(idx, w)| acc + w * row[idx as usize]);
                (c, score)
            })
            .collect())
    }

    /// Predicts the most likely category.
    ///
    /// # Errors
    ///
    /// Same as [`MultinomialNb::scores`].
    pub fn predict(&self, x: &FeatureVector) -> Result<Category> {
        argmax(&self.scores(x)?).ok_or_else(|| TaleweaverError::not_fitted("MultinomialNb"))
    }

    pub(crate) fn to_params(&self) -> Result<NbParams> {
        self.fitted_params().cloned()
    }

    pub(crate) fn from_params(params: NbParams) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            alpha: params.alpha,
            params: Some(params),
        })
    }
}

/// Picks the best-scoring class from scores in priority order.
pub(crate) fn argmax(scores: &[(Category, f64)]) -> Option<Category> {
    let mut best: Option<(Category, f64)> = None;
    for &(c, score) in scores {
        // Strict comparison keeps the earlier, higher-priority class on ties.
        if best.map_or(true, |(_, s)| score > s) {
            best = Some((c, score));
        }
    }
    best.map(|(c, _)| c)
}
