use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::errors::{Result, TaleweaverError};
use crate::feature::TfidfVectorizer;
use crate::model::Model;
use crate::naive_bayes::MultinomialNb;

/// Default location of the model artifact.
pub const DEFAULT_MODEL_PATH: &str = "classifier.model";

/// File-backed storage of a [`Model`].
///
/// Saving writes a temporary file next to the target and renames it into place, so readers
/// see either the old or the new artifact, never a partially written one.
#[derive(Clone, Debug)]
pub struct ModelStore {
    path: PathBuf,
}

impl Default for ModelStore {
    fn default() -> Self {
        Self::new(DEFAULT_MODEL_PATH)
    }
}

impl ModelStore {
    pub fn new<P>(path: P) -> Self
    where
        P: Into<PathBuf>,
    {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns `true` if an artifact exists at the path.
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Writes the model, replacing any existing artifact.
    ///
    /// # Errors
    ///
    /// [`TaleweaverError::IOError`] will be returned if the directory is not writable.
    pub fn save_model(&self, model: &Model) -> Result<()> {
        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        let tmp = NamedTempFile::new_in(dir)?;
        let mut wtr = BufWriter::new(tmp);
        model.write(&mut wtr)?;
        let tmp = wtr.into_inner().map_err(io::IntoInnerError::into_error)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;
        log::info!("saved model to {}", self.path.display());
        Ok(())
    }

    /// Writes a fitted vectorizer and classifier as one artifact.
    pub fn save(&self, vectorizer: TfidfVectorizer, classifier: MultinomialNb) -> Result<Model> {
        let model = Model::new(vectorizer, classifier)?;
        self.save_model(&model)?;
        Ok(model)
    }

    /// Reads the model.
    ///
    /// # Errors
    ///
    /// - [`TaleweaverError::ModelNotFound`] if no artifact exists at the path.
    /// - [`TaleweaverError::CorruptArtifact`] if the artifact cannot be decoded.
    pub fn load_model(&self) -> Result<Model> {
        let f = match File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(TaleweaverError::model_not_found(&self.path));
            }
            Err(e) => return Err(e.into()),
        };
        let model = Model::read(BufReader::new(f))?;
        log::info!("loaded model from {}", self.path.display());
        Ok(model)
    }

    /// Reads the vectorizer and classifier.
    pub fn load(&self) -> Result<(TfidfVectorizer, MultinomialNb)> {
        Ok(self.load_model()?.into_parts())
    }
}
