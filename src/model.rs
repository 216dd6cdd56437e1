//! Pre-trained classifier and label decoder loaded from disk.
//!
//! The two artifacts are opaque bincode blobs produced by an offline
//! training pipeline. They are loaded once at process start and held
//! as read-only state for the process lifetime; a failed load is a
//! permanent degraded state, never retried per request.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CultivarError, Result};
use crate::sanitize::FeatureVector;

/// Classifier artifact filename inside the model directory.
pub const CLASSIFIER_FILE: &str = "crop_forest.bin";
/// Label decoder artifact filename inside the model directory.
pub const DECODER_FILE: &str = "label_decoder.bin";

/// Number of input features the classifier expects.
pub const N_FEATURES: usize = 7;

/// One node of a serialized decision tree, stored in a flat array
/// with child links as indices.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TreeNode {
    /// Terminal node carrying a class id
    Leaf { class: usize },
    /// Internal split: `feature <= threshold` goes left, else right
    Split {
        feature: usize,
        threshold: f32,
        left: usize,
        right: usize,
    },
}

/// A single decision tree as a flat node array (root at index 0).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    pub nodes: Vec<TreeNode>,
}

impl DecisionTree {
    /// Predicts the class id for one sample by walking from the root.
    ///
    /// # Errors
    ///
    /// Returns [`CultivarError::PredictionFailed`] on malformed trees:
    /// empty node array, out-of-range feature or child index, or a
    /// walk longer than the node count (cycle).
    pub fn predict(&self, x: &[f32; N_FEATURES]) -> Result<usize> {
        if self.nodes.is_empty() {
            return Err(CultivarError::PredictionFailed(
                "decision tree has no nodes".to_string(),
            ));
        }

        let mut idx = 0;
        // A well-formed tree visits each node at most once.
        for _ in 0..=self.nodes.len() {
            match self.nodes.get(idx) {
                Some(TreeNode::Leaf { class }) => return Ok(*class),
                Some(TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    let value = x.get(*feature).copied().ok_or_else(|| {
                        CultivarError::PredictionFailed(format!(
                            "split references feature {feature}, but input has {N_FEATURES}"
                        ))
                    })?;
                    idx = if value <= *threshold { *left } else { *right };
                }
                None => {
                    return Err(CultivarError::PredictionFailed(format!(
                        "child index {idx} out of range (nodes={})",
                        self.nodes.len()
                    )))
                }
            }
        }

        Err(CultivarError::PredictionFailed(
            "cycle detected in decision tree".to_string(),
        ))
    }
}

/// Random-forest classifier: majority vote over serialized trees.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CropClassifier {
    /// Number of features the model was trained on (for validation)
    pub n_features: usize,
    /// Ensemble members
    pub trees: Vec<DecisionTree>,
}

impl CropClassifier {
    /// Predicts a class id by majority vote; ties break to the lowest id.
    ///
    /// # Errors
    ///
    /// Fails if the forest is empty or any tree is malformed.
    pub fn predict(&self, x: &[f32; N_FEATURES]) -> Result<usize> {
        if self.trees.is_empty() {
            return Err(CultivarError::PredictionFailed(
                "classifier has no trees".to_string(),
            ));
        }

        let mut votes: Vec<usize> = Vec::new();
        for tree in &self.trees {
            let class = tree.predict(x)?;
            if class >= votes.len() {
                votes.resize(class + 1, 0);
            }
            votes[class] += 1;
        }

        let winner = votes
            .iter()
            .enumerate()
            .max_by(|(ia, a), (ib, b)| a.cmp(b).then(ib.cmp(ia)))
            .map(|(class, _)| class)
            .ok_or_else(|| CultivarError::PredictionFailed("no votes cast".to_string()))?;

        Ok(winner)
    }

    /// Loads a classifier from a bincode file.
    ///
    /// # Errors
    ///
    /// [`CultivarError::FileNotFound`] if the path does not exist,
    /// [`CultivarError::InvalidArtifact`] on deserialization failure.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let bytes = read_artifact(path.as_ref())?;
        bincode::deserialize(&bytes)
            .map_err(|e| CultivarError::InvalidArtifact(format!("classifier: {e}")))
    }

    /// Saves the classifier to a bincode file (used by tooling and tests).
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or file writing fails.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let bytes = bincode::serialize(self)
            .map_err(|e| CultivarError::InvalidArtifact(format!("classifier: {e}")))?;
        fs::write(path, bytes)?;
        Ok(())
    }
}

/// Inverse mapping from internal class id to human-readable crop label.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelDecoder {
    /// Class names indexed by class id
    pub classes: Vec<String>,
}

impl LabelDecoder {
    /// Decodes a class id to its label.
    ///
    /// # Errors
    ///
    /// Fails when the id is outside the class table.
    pub fn decode(&self, class: usize) -> Result<&str> {
        self.classes
            .get(class)
            .map(String::as_str)
            .ok_or_else(|| {
                CultivarError::PredictionFailed(format!(
                    "class id {class} out of range (classes={})",
                    self.classes.len()
                ))
            })
    }

    /// Loads a decoder from a bincode file.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`CropClassifier::load`].
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let bytes = read_artifact(path.as_ref())?;
        bincode::deserialize(&bytes)
            .map_err(|e| CultivarError::InvalidArtifact(format!("label decoder: {e}")))
    }

    /// Saves the decoder to a bincode file (used by tooling and tests).
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or file writing fails.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let bytes = bincode::serialize(self)
            .map_err(|e| CultivarError::InvalidArtifact(format!("label decoder: {e}")))?;
        fs::write(path, bytes)?;
        Ok(())
    }
}

fn read_artifact(path: &Path) -> Result<Vec<u8>> {
    if !path.exists() {
        return Err(CultivarError::FileNotFound(path.to_path_buf()));
    }
    Ok(fs::read(path)?)
}

/// The pair of loaded model artifacts: write-once at startup, read-many.
#[derive(Debug, Clone)]
pub struct ModelBundle {
    pub classifier: CropClassifier,
    pub decoder: LabelDecoder,
}

impl ModelBundle {
    /// Loads both artifacts from fixed filenames under `dir` and runs
    /// basic sanity checks (feature count, non-empty class table).
    ///
    /// # Errors
    ///
    /// Any load or sanity failure; the caller treats this as the
    /// process-wide degraded state.
    pub fn load<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        let classifier = CropClassifier::load(dir.join(CLASSIFIER_FILE))?;
        let decoder = LabelDecoder::load(dir.join(DECODER_FILE))?;

        if classifier.n_features != N_FEATURES {
            return Err(CultivarError::InvalidArtifact(format!(
                "classifier expects {} features, this service provides {N_FEATURES}",
                classifier.n_features
            )));
        }
        if decoder.classes.is_empty() {
            return Err(CultivarError::InvalidArtifact(
                "label decoder has an empty class table".to_string(),
            ));
        }

        Ok(Self { classifier, decoder })
    }

    /// Number of crop classes known to the decoder.
    pub fn n_classes(&self) -> usize {
        self.decoder.classes.len()
    }

    /// Full inference path: classifier predict, then label decode.
    ///
    /// # Errors
    ///
    /// [`CultivarError::PredictionFailed`] carrying internal detail;
    /// callers log the detail and surface only the generic message.
    pub fn recommend(&self, features: &FeatureVector) -> Result<String> {
        let class = self.classifier.predict(&features.as_f32())?;
        Ok(self.decoder.decode(class)?.to_string())
    }
}
