//! Saving and loading the selected model

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use crate::dataset::FeatureMatrix;
use crate::error::{Error, Result};
use crate::ml::models::{FittedModel, Predictions};
use crate::ml::pipeline::Transformer;
use crate::ml::preprocessing::StandardScaler;
use crate::ml::target::TaskKind;

/// Save a model to a file and load it back
pub trait ModelPersistence {
    /// Write the model to `path`, replacing any existing file
    fn save_model<P: AsRef<Path>>(&self, path: P) -> Result<()>;

    /// Read a model previously written by [`ModelPersistence::save_model`]
    fn load_model<P: AsRef<Path>>(path: P) -> Result<Self>
    where
        Self: Sized;
}

/// Everything needed to reuse a winning model on raw rows
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedModel {
    pub task: TaskKind,
    pub target: String,
    /// Feature columns in the order the model expects them
    pub features: Vec<String>,
    /// Scaler fitted on the training partition
    pub scaler: StandardScaler,
    pub model: FittedModel,
    /// Held-out score that won the selection
    pub score: f64,
}

impl SavedModel {
    pub fn name(&self) -> &'static str {
        self.model.name()
    }

    /// Scale raw feature rows with the stored scaler, then predict
    pub fn predict(&self, raw: &FeatureMatrix) -> Result<Predictions> {
        if raw.column_names() != self.features.as_slice() {
            return Err(Error::DimensionMismatch(format!(
                "expected feature columns {:?}, found {:?}",
                self.features,
                raw.column_names()
            )));
        }
        let scaled = self.scaler.transform(raw)?;
        self.model.predict(&scaled)
    }
}

impl ModelPersistence for SavedModel {
    fn save_model<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush()?;

        log::info!("Saved {} to {}", self.name(), path.display());
        Ok(())
    }

    fn load_model<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| Error::DataAccess {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        let saved: SavedModel = serde_json::from_reader(BufReader::new(file))?;
        if !saved.scaler.is_fitted() {
            return Err(Error::InvalidInput(format!(
                "saved model in {} carries an unfitted scaler",
                path.display()
            )));
        }
        Ok(saved)
    }
}
