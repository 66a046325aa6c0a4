//! # Taleweaver
//!
//! Taleweaver routes a free-text story request to one of a fixed set of story categories and
//! picks a narrative arc for it. The classifier is a multinomial naive Bayes model over TF-IDF
//! weighted word unigrams and bigrams.
//!
//! ## Examples
//!
//! ```no_run
//! use std::io::{prelude::*, stdin};
//!
//! use taleweaver::{ClassificationService, ModelStore};
//!
//! let service = ClassificationService::new(ModelStore::new("classifier.model"));
//!
//! for line in stdin().lock().lines() {
//!     let (category, arc) = service.classify_with_arc(&line.unwrap()).unwrap();
//!     println!("{category}\t{arc}");
//! }
//! ```
//!
//! Models are produced offline with [`Classifier::train`] and written with
//! [`Classifier::save`].

mod category;
mod classifier;
mod corpus;
mod feature;
mod model;
mod naive_bayes;
mod store;

pub mod errors;

pub use category::{select_arc, Arc, Category};
pub use classifier::{ClassificationService, Classifier};
pub use corpus::{default_corpus, Example};
pub use feature::{FeatureVector, TfidfVectorizer, VectorizerConfig, Weighting};
pub use model::Model;
pub use naive_bayes::MultinomialNb;
pub use store::{ModelStore, DEFAULT_MODEL_PATH};
