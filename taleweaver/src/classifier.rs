use once_cell::sync::OnceCell;

use crate::category::{Arc, Category};
use crate::corpus::Example;
use crate::errors::{Result, TaleweaverError};
use crate::feature::{TfidfVectorizer, VectorizerConfig};
use crate::model::Model;
use crate::naive_bayes::{argmax, MultinomialNb};
use crate::store::ModelStore;

/// Story category classifier.
///
/// # Examples
///
/// ```
/// use taleweaver::{Arc, Category, Classifier, Example};
///
/// let corpus = [
///     Example::new("Count the stars before sleep", Category::NumberJourney),
///     Example::new("Sing me a gentle rhyme about moonlight", Category::LullabyRhyme),
/// ];
/// let classifier = Classifier::train(&corpus).unwrap();
///
/// let (category, arc) = classifier.classify_with_arc("Count the sheep before sleep").unwrap();
/// assert_eq!(Category::NumberJourney, category);
/// assert_eq!(Arc::Cumulative, arc);
/// ```
pub struct Classifier {
    model: Model,
}

impl Classifier {
    /// Creates a classifier from fitted components.
    pub fn new(vectorizer: TfidfVectorizer, classifier: MultinomialNb) -> Result<Self> {
        Ok(Self {
            model: Model::new(vectorizer, classifier)?,
        })
    }

    /// Trains a classifier with the default configuration.
    ///
    /// # Errors
    ///
    /// [`TaleweaverError::InsufficientData`] will be returned if `examples` is empty or yields
    /// no vocabulary.
    pub fn train(examples: &[Example]) -> Result<Self> {
        Self::train_with(examples, VectorizerConfig::default(), MultinomialNb::default())
    }

    /// Trains a classifier with the given vectorizer configuration and unfitted model.
    pub fn train_with(
        examples: &[Example],
        config: VectorizerConfig,
        mut classifier: MultinomialNb,
    ) -> Result<Self> {
        if examples.is_empty() {
            return Err(TaleweaverError::insufficient_data("training corpus is empty"));
        }
        let texts: Vec<&str> = examples.iter().map(|e| e.text.as_str()).collect();
        let labels: Vec<Category> = examples.iter().map(|e| e.label).collect();

        let mut vectorizer = TfidfVectorizer::new(config);
        let xs = vectorizer.fit_transform(&texts)?;
        classifier.fit(&xs, &labels)?;
        log::info!(
            "trained classifier on {} examples with {} features",
            examples.len(),
            vectorizer.n_features().unwrap_or_default()
        );
        Self::new(vectorizer, classifier)
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    /// Predicts the category of a story request.
    pub fn classify(&self, text: &str) -> Result<Category> {
        let x = self.model.vectorizer.transform(text)?;
        self.model.classifier.predict(&x)
    }

    /// Predicts the category and selects its arc.
    pub fn classify_with_arc(&self, text: &str) -> Result<(Category, Arc)> {
        let category = self.classify(text)?;
        Ok((category, category.arc()))
    }

    /// Gets the joint log likelihood of each trained category.
    pub fn scores(&self, text: &str) -> Result<Vec<(Category, f64)>> {
        let x = self.model.vectorizer.transform(text)?;
        self.model.classifier.scores(&x)
    }

    /// Predicts the category along with the scores it was chosen from.
    pub fn classify_with_scores(&self, text: &str) -> Result<(Category, Vec<(Category, f64)>)> {
        let scores = self.scores(text)?;
        let category =
            argmax(&scores).ok_or_else(|| TaleweaverError::not_fitted("MultinomialNb"))?;
        Ok((category, scores))
    }

    /// Writes the classifier to a store.
    pub fn save(&self, store: &ModelStore) -> Result<()> {
        store.save_model(&self.model)
    }

    /// Reads a classifier from a store.
    ///
    /// # Errors
    ///
    /// [`TaleweaverError::ModelNotFound`] or [`TaleweaverError::CorruptArtifact`] propagated
    /// from the store.
    pub fn load(store: &ModelStore) -> Result<Self> {
        Ok(Self {
            model: store.load_model()?,
        })
    }
}

/// Classification service that loads its model lazily.
///
/// The artifact is read on the first call to [`ClassificationService::classify`] and cached
/// for the lifetime of the service. Concurrent first callers wait for a single load. If the
/// load fails, the cache stays empty and the next call tries again.
pub struct ClassificationService {
    store: ModelStore,
    classifier: OnceCell<Classifier>,
}

impl ClassificationService {
    pub fn new(store: ModelStore) -> Self {
        Self {
            store,
            classifier: OnceCell::new(),
        }
    }

    /// Creates a service around an already trained classifier.
    pub fn with_classifier(store: ModelStore, classifier: Classifier) -> Self {
        Self {
            store,
            classifier: OnceCell::with_value(classifier),
        }
    }

    pub fn store(&self) -> &ModelStore {
        &self.store
    }

    /// Returns `true` once the model has been loaded.
    pub fn is_loaded(&self) -> bool {
        self.classifier.get().is_some()
    }

    /// Gets the cached classifier, loading it on first use.
    pub fn classifier(&self) -> Result<&Classifier> {
        self.classifier.get_or_try_init(|| {
            log::debug!("loading classifier from {}", self.store.path().display());
            Classifier::load(&self.store)
        })
    }

    /// Predicts the category of a story request.
    ///
    /// # Errors
    ///
    /// [`TaleweaverError::ModelNotFound`] if the artifact does not exist, or
    /// [`TaleweaverError::CorruptArtifact`] if it cannot be read.
    pub fn classify(&self, text: &str) -> Result<Category> {
        self.classifier()?.classify(text)
    }

    /// Predicts the category and selects its arc.
    pub fn classify_with_arc(&self, text: &str) -> Result<(Category, Arc)> {
        self.classifier()?.classify_with_arc(text)
    }

    /// Consumes the service. Dropping it releases the cached model.
    pub fn close(self) {
        log::debug!("closing classification service");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc as StdArc;
    use std::thread;

    use crate::category::select_arc;
    use crate::corpus::default_corpus;

    use Category::*;

    fn small_corpus() -> Vec<Example> {
        vec![
            Example::new("Count the stars before sleep", NumberJourney),
            Example::new("Sing me a gentle rhyme about moonlight", LullabyRhyme),
        ]
    }

    #[test]
    fn test_count_the_sheep() {
        let classifier = Classifier::train(&small_corpus()).unwrap();
        let category = classifier.classify("Count the sheep before sleep").unwrap();
        assert_eq!(NumberJourney, category);
        assert_eq!(Arc::Cumulative, select_arc(category.as_str()));
    }

    #[test]
    fn test_unknown_vocabulary() {
        let classifier = Classifier::train(&small_corpus()).unwrap();
        // Only the priors remain and they are equal, so the higher priority category wins.
        assert_eq!(NumberJourney, classifier.classify("xyzzy plugh quux").unwrap());
        assert_eq!(NumberJourney, classifier.classify("").unwrap());
    }

    #[test]
    fn test_unknown_vocabulary_prior_dominated() {
        let corpus = [
            Example::new("brave knights", FantasyAdventure),
            Example::new("gentle moon rhyme", LullabyRhyme),
            Example::new("sleepy owl rhyme", LullabyRhyme),
        ];
        let classifier = Classifier::train(&corpus).unwrap();
        assert_eq!(LullabyRhyme, classifier.classify("xyzzy plugh quux").unwrap());
    }

    #[test]
    fn test_tie_break() {
        let corpus = [
            Example::new("alpha beta", LullabyRhyme),
            Example::new("alpha beta", MoralQuest),
        ];
        let classifier = Classifier::train(&corpus).unwrap();
        let scores = classifier.scores("alpha").unwrap();
        assert_eq!(vec![MoralQuest, LullabyRhyme], vec![scores[0].0, scores[1].0]);
        assert_eq!(scores[0].1, scores[1].1);
        assert_eq!(MoralQuest, classifier.classify("alpha").unwrap());
    }

    #[test]
    fn test_train_empty() {
        let e = Classifier::train(&[]).err().unwrap();
        assert!(matches!(e, TaleweaverError::InsufficientData(_)));
    }

    #[test]
    fn test_classify_with_scores() {
        let classifier = Classifier::train(&small_corpus()).unwrap();
        let (category, scores) = classifier
            .classify_with_scores("Count the sheep before sleep")
            .unwrap();
        assert_eq!(NumberJourney, category);
        assert_eq!(classifier.scores("Count the sheep before sleep").unwrap(), scores);

        let (category, scores) = classifier.classify_with_scores("xyzzy").unwrap();
        assert_eq!(scores[0].1, scores[1].1);
        assert_eq!(NumberJourney, category);
    }

    #[test]
    fn test_train_zero_max_features() {
        let config = VectorizerConfig::default().max_features(Some(0));
        let e = Classifier::train_with(&default_corpus(), config, MultinomialNb::default())
            .err()
            .unwrap();
        assert!(matches!(e, TaleweaverError::InsufficientData(_)));
    }

    #[test]
    fn test_train_degenerate() {
        let corpus = [Example::new("a b c", MoralQuest)];
        let e = Classifier::train(&corpus).err().unwrap();
        assert!(matches!(e, TaleweaverError::InsufficientData(_)));
    }

    #[test]
    fn test_default_corpus() {
        let classifier = Classifier::train(&default_corpus()).unwrap();
        assert_eq!(
            FantasyAdventure,
            classifier.classify("A brave knight and a dragon in a castle").unwrap()
        );
        assert_eq!(
            MoralQuest,
            classifier.classify("Why honesty matters").unwrap()
        );
        assert_eq!(
            NumberJourney,
            classifier.classify("Count the ducks one by one").unwrap()
        );
        assert_eq!(
            LullabyRhyme,
            classifier.classify("A gentle bedtime lullaby").unwrap()
        );
    }

    #[test]
    fn test_classify_always_in_enumeration() {
        let classifier = Classifier::train(&default_corpus()).unwrap();
        let texts = ["", "!!!", "xyzzy", "count", "Rustで良いプログラミング体験を！"];
        for text in texts {
            let category = classifier.classify(text).unwrap();
            assert!(Category::ALL.contains(&category));
        }
    }

    #[test]
    fn test_save_load_identical_predictions() {
        let dir = tempfile::tempdir().unwrap();
        let store = ModelStore::new(dir.path().join("classifier.model"));
        let classifier = Classifier::train(&default_corpus()).unwrap();
        classifier.save(&store).unwrap();
        let loaded = Classifier::load(&store).unwrap();

        let battery = [
            "Tell me about a dragon",
            "A story about sharing",
            "Count to ten",
            "A soft rhyme for sleeping",
            "xyzzy plugh quux",
            "",
        ];
        for text in battery {
            assert_eq!(classifier.classify(text).unwrap(), loaded.classify(text).unwrap());
            let before: Vec<u64> = classifier
                .scores(text)
                .unwrap()
                .iter()
                .map(|(_, s)| s.to_bits())
                .collect();
            let after: Vec<u64> = loaded
                .scores(text)
                .unwrap()
                .iter()
                .map(|(_, s)| s.to_bits())
                .collect();
            assert_eq!(before, after);
        }
    }

    #[test]
    fn test_service_missing_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let service = ClassificationService::new(ModelStore::new(dir.path().join("none.model")));
        let e = service.classify("Count the sheep").unwrap_err();
        assert!(matches!(e, TaleweaverError::ModelNotFound(_)));
        assert!(!service.is_loaded());
    }

    #[test]
    fn test_service_loads_once() {
        let dir = tempfile::tempdir().unwrap();
        let store = ModelStore::new(dir.path().join("classifier.model"));
        Classifier::train(&small_corpus())
            .unwrap()
            .save(&store)
            .unwrap();

        let service = ClassificationService::new(store.clone());
        assert!(!service.is_loaded());
        let first = service.classify("Count the sheep before sleep").unwrap();
        assert!(service.is_loaded());

        // The cached model keeps serving after the artifact disappears.
        std::fs::remove_file(store.path()).unwrap();
        let second = service.classify("Count the sheep before sleep").unwrap();
        assert_eq!(first, second);
        assert_eq!(NumberJourney, second);
    }

    #[test]
    fn test_service_retries_after_failed_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = ModelStore::new(dir.path().join("classifier.model"));
        let service = ClassificationService::new(store.clone());
        assert!(service.classify("moonlight").is_err());

        Classifier::train(&small_corpus())
            .unwrap()
            .save(&store)
            .unwrap();
        assert_eq!(LullabyRhyme, service.classify("moonlight").unwrap());
    }

    #[test]
    fn test_service_concurrent_first_use() {
        let dir = tempfile::tempdir().unwrap();
        let store = ModelStore::new(dir.path().join("classifier.model"));
        Classifier::train(&default_corpus())
            .unwrap()
            .save(&store)
            .unwrap();

        let service = StdArc::new(ClassificationService::new(store));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let service = StdArc::clone(&service);
                thread::spawn(move || {
                    let classifier = service.classifier().unwrap() as *const Classifier as usize;
                    let category = service.classify("Count the frogs").unwrap();
                    (classifier, category)
                })
            })
            .collect();
        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(results.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(NumberJourney, results[0].1);
    }

    #[test]
    fn test_service_with_classifier() {
        let classifier = Classifier::train(&small_corpus()).unwrap();
        let service = ClassificationService::with_classifier(ModelStore::default(), classifier);
        assert!(service.is_loaded());
        assert_eq!(
            (LullabyRhyme, Arc::RhymeScheme),
            service.classify_with_arc("a gentle rhyme").unwrap()
        );
        service.close();
    }

    #[test]
    fn test_service_close_then_reload() {
        let dir = tempfile::tempdir().unwrap();
        let store = ModelStore::new(dir.path().join("classifier.model"));
        Classifier::train(&small_corpus()).unwrap().save(&store).unwrap();

        let service = ClassificationService::new(store.clone());
        assert_eq!(NumberJourney, service.classify("count the stars").unwrap());
        service.close();

        let retrained = [
            Example::new("count the stars", MoralQuest),
            Example::new("sing a rhyme", LullabyRhyme),
        ];
        Classifier::train(&retrained).unwrap().save(&store).unwrap();

        let service = ClassificationService::new(store);
        assert!(!service.is_loaded());
        assert_eq!(MoralQuest, service.classify("count the stars").unwrap());
    }
}
