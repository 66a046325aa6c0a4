use std::io::{Read, Write};

use bincode::{Decode, Encode};

use crate::errors::{Result, TaleweaverError};
use crate::feature::{TfidfVectorizer, VectorizerData};
use crate::naive_bayes::{MultinomialNb, NbParams};

const MAGIC: &[u8; 8] = b"TWSTORY\0";
const FORMAT_VERSION: u32 = 1;
const ZSTD_LEVEL: i32 = 19;

// Upper bound of the decoded payload, so a corrupted length prefix cannot trigger a huge
// allocation.
const DECODE_LIMIT: usize = 256 * 1024 * 1024;

fn bincode_config() -> impl bincode::config::Config {
    bincode::config::standard().with_limit::<DECODE_LIMIT>()
}

#[derive(Decode, Encode)]
struct ModelData {
    vectorizer: VectorizerData,
    classifier: NbParams,
}

/// Model data: a fitted vectorizer paired with a fitted classifier.
///
/// The serialized form starts with a magic number and a format version, followed by a
/// zstd-compressed bincode payload.
pub struct Model {
    pub(crate) vectorizer: TfidfVectorizer,
    pub(crate) classifier: MultinomialNb,
}

impl Model {
    /// Pairs a vectorizer with a classifier.
    ///
    /// # Errors
    ///
    /// - [`TaleweaverError::NotFitted`] if either component has not been fitted.
    /// - [`TaleweaverError::InvalidArgument`] if their dimensions disagree.
    pub fn new(vectorizer: TfidfVectorizer, classifier: MultinomialNb) -> Result<Self> {
        let n_features = vectorizer
            .n_features()
            .ok_or_else(|| TaleweaverError::not_fitted("TfidfVectorizer"))?;
        let params = classifier.to_params()?;
        if params.feature_log_prob.iter().any(|row| row.len() != n_features) {
            return Err(TaleweaverError::invalid_argument(
                "classifier",
                "classifier was trained on a different vocabulary",
            ));
        }
        Ok(Self {
            vectorizer,
            classifier,
        })
    }

    /// Splits the model into its components.
    pub fn into_parts(self) -> (TfidfVectorizer, MultinomialNb) {
        (self.vectorizer, self.classifier)
    }

    /// Exports the model data.
    ///
    /// # Arguments
    ///
    /// * `wtr` - Byte-oriented sink object.
    ///
    /// # Errors
    ///
    /// When `wtr` generates an error, it will be returned as is.
    pub fn write<W>(&self, mut wtr: W) -> Result<()>
    where
        W: Write,
    {
        let data = ModelData {
            vectorizer: self.vectorizer.to_data()?,
            classifier: self.classifier.to_params()?,
        };
        wtr.write_all(MAGIC)?;
        wtr.write_all(&FORMAT_VERSION.to_le_bytes())?;
        let mut enc = zstd::Encoder::new(wtr, ZSTD_LEVEL)?;
        bincode::encode_into_std_write(data, &mut enc, bincode_config())?;
        enc.finish()?;
        Ok(())
    }

    /// Creates a model from a reader.
    ///
    /// # Arguments
    ///
    /// * `rdr` - A data source.
    ///
    /// # Returns
    ///
    /// A model data read from `rdr`.
    ///
    /// # Errors
    ///
    /// [`TaleweaverError::CorruptArtifact`] will be returned if the data is not a model, was
    /// written by an unsupported version, cannot be decoded, or is internally inconsistent.
    pub fn read<R>(mut rdr: R) -> Result<Self>
    where
        R: Read,
    {
        let mut header = [0; 12];
        rdr.read_exact(&mut header)
            .map_err(|_| TaleweaverError::corrupt_artifact("truncated header"))?;
        if &header[..8] != MAGIC {
            return Err(TaleweaverError::corrupt_artifact("not a taleweaver model"));
        }
        let version = u32::from_le_bytes([header[8], header[9], header[10], header[11]]);
        if version != FORMAT_VERSION {
            return Err(TaleweaverError::corrupt_artifact(format!(
                "unsupported format version: {version}"
            )));
        }

        let mut dec = zstd::Decoder::new(rdr)
            .map_err(|e| TaleweaverError::corrupt_artifact(e.to_string()))?;
        let data: ModelData = bincode::decode_from_std_read(&mut dec, bincode_config())?;
        let mut rest = [0; 1];
        match dec.read(&mut rest) {
            Ok(0) => {}
            Ok(_) => return Err(TaleweaverError::corrupt_artifact("trailing data")),
            Err(e) => return Err(TaleweaverError::corrupt_artifact(e.to_string())),
        }

        let vectorizer = TfidfVectorizer::from_data(data.vectorizer)?;
        let classifier = MultinomialNb::from_params(data.classifier)?;
        Self::new(vectorizer, classifier).map_err(|e| match e {
            TaleweaverError::InvalidArgument(e) => TaleweaverError::corrupt_artifact(e.msg),
            e => e,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::category::Category;
    use crate::feature::VectorizerConfig;

    fn small_model() -> Model {
        let texts = ["Count the stars before sleep", "Sing me a gentle rhyme"];
        let mut vectorizer = TfidfVectorizer::new(VectorizerConfig::default());
        let xs = vectorizer.fit_transform(&texts).unwrap();
        let mut classifier = MultinomialNb::default();
        classifier
            .fit(&xs, &[Category::NumberJourney, Category::LullabyRhyme])
            .unwrap();
        Model::new(vectorizer, classifier).unwrap()
    }

    #[test]
    fn test_new_not_fitted() {
        let vectorizer = TfidfVectorizer::new(VectorizerConfig::default());
        let e = Model::new(vectorizer, MultinomialNb::default()).err().unwrap();
        assert!(matches!(e, TaleweaverError::NotFitted(_)));
    }

    #[test]
    fn test_new_dimension_mismatch() {
        let (_, classifier) = small_model().into_parts();
        let mut vectorizer = TfidfVectorizer::new(VectorizerConfig::default());
        vectorizer.fit(&["moon"]).unwrap();
        let e = Model::new(vectorizer, classifier).err().unwrap();
        assert!(matches!(e, TaleweaverError::InvalidArgument(_)));
    }

    #[test]
    fn test_write_read() {
        let model = small_model();
        let mut buf = vec![];
        model.write(&mut buf).unwrap();
        assert_eq!(MAGIC, &buf[..8]);

        let loaded = Model::read(buf.as_slice()).unwrap();
        assert_eq!(
            model.vectorizer.terms().unwrap(),
            loaded.vectorizer.terms().unwrap()
        );
        assert_eq!(
            model.classifier.to_params().unwrap(),
            loaded.classifier.to_params().unwrap()
        );
    }

    #[test]
    fn test_read_bad_magic() {
        let e = Model::read(&b"NOTAMODEL\x01\x00\x00\x00"[..]).err().unwrap();
        assert_eq!(
            "CorruptArtifactError: not a taleweaver model",
            e.to_string()
        );
    }

    #[test]
    fn test_read_truncated_header() {
        let e = Model::read(&b"TWS"[..]).err().unwrap();
        assert!(matches!(e, TaleweaverError::CorruptArtifact(_)));
    }

    #[test]
    fn test_read_unsupported_version() {
        let mut buf = vec![];
        small_model().write(&mut buf).unwrap();
        buf[8] = 2;
        let e = Model::read(buf.as_slice()).err().unwrap();
        assert_eq!(
            "CorruptArtifactError: unsupported format version: 2",
            e.to_string()
        );
    }

    #[test]
    fn test_read_truncated_payload() {
        let mut buf = vec![];
        small_model().write(&mut buf).unwrap();
        buf.truncate(buf.len() - 8);
        let e = Model::read(buf.as_slice()).err().unwrap();
        assert!(matches!(e, TaleweaverError::CorruptArtifact(_)));
    }

    #[test]
    fn test_read_garbage_payload() {
        let mut buf = MAGIC.to_vec();
        buf.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
        buf.extend_from_slice(&[0xde, 0xad, 0xbe, 0xef, 0x00, 0x11, 0x22, 0x33]);
        let e = Model::read(buf.as_slice()).err().unwrap();
        assert!(matches!(e, TaleweaverError::CorruptArtifact(_)));
    }
}
