//! Target column selection and task classification

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::column::Column;
use crate::dataset::Dataset;
use crate::error::{Error, Result};

/// The problem the user asked to solve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskKind {
    Regressor,
    Classifier,
}

impl TaskKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskKind::Regressor => "regressor",
            TaskKind::Classifier => "classifier",
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "regressor" | "regression" => Ok(TaskKind::Regressor),
            "classifier" | "classification" => Ok(TaskKind::Classifier),
            other => Err(Error::InputParse(format!(
                "unknown task kind '{}', expected 'regressor' or 'classifier'",
                other
            ))),
        }
    }
}

/// Kind of values held by the target column, inferred from its storage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    Continuous,
    Categorical,
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetKind::Continuous => f.write_str("continuous"),
            TargetKind::Categorical => f.write_str("categorical"),
        }
    }
}

/// Chosen target column and its inferred kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetSpec {
    pub name: String,
    pub kind: TargetKind,
}

/// Result of [`select_target`]: the spec plus the partitioned table
#[derive(Debug, Clone)]
pub struct TargetSelection {
    pub spec: TargetSpec,
    /// Every column except the target, in original order
    pub features: Dataset,
    pub target: Column,
}

/// Numeric storage means continuous, text storage means categorical.
///
/// Label-encoded classes (0/1/2 stored as integers) are therefore reported
/// as continuous.
pub fn classify_target(target: &Column) -> TargetKind {
    if target.is_numeric() {
        TargetKind::Continuous
    } else {
        TargetKind::Categorical
    }
}

/// Split `dataset` into the feature table and the target column `column_name`
pub fn select_target(dataset: &Dataset, column_name: &str) -> Result<TargetSelection> {
    let target = dataset
        .column(column_name)
        .cloned()
        .ok_or_else(|| Error::InvalidTarget {
            name: column_name.to_string(),
            available: dataset.column_names().to_vec(),
        })?;

    let features = dataset.drop_column(column_name)?;
    let spec = TargetSpec {
        name: column_name.to_string(),
        kind: classify_target(&target),
    };

    log::debug!(
        "Selected target '{}' ({}), {} feature columns",
        spec.name,
        spec.kind,
        features.column_count()
    );

    Ok(TargetSelection {
        spec,
        features,
        target,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::{Float64Column, Int64Column, StringColumn};

    fn dataset() -> Dataset {
        Dataset::from_columns(vec![
            ("tv", Column::from(Float64Column::new(vec![1.0, 2.0]))),
            ("radio", Column::from(Int64Column::new(vec![3, 4]))),
            ("label", Column::from(StringColumn::new(vec!["a".into(), "b".into()]))),
        ])
        .unwrap()
    }

    #[test]
    fn test_task_kind_parsing() {
        assert_eq!("regressor".parse::<TaskKind>().unwrap(), TaskKind::Regressor);
        assert_eq!(" Classifier ".parse::<TaskKind>().unwrap(), TaskKind::Classifier);
        assert!(matches!("cluster".parse::<TaskKind>(), Err(Error::InputParse(_))));
    }

    #[test]
    fn test_select_target_partitions_columns() {
        let selection = select_target(&dataset(), "radio").unwrap();
        assert_eq!(selection.spec.kind, TargetKind::Continuous);
        assert_eq!(selection.features.column_names(), &["tv", "label"]);
        assert_eq!(selection.features.row_count(), 2);
        assert_eq!(selection.target.len(), 2);
    }

    #[test]
    fn test_text_target_is_categorical() {
        let selection = select_target(&dataset(), "label").unwrap();
        assert_eq!(selection.spec.kind, TargetKind::Categorical);
    }

    #[test]
    fn test_unknown_target() {
        let err = select_target(&dataset(), "nonexistent").unwrap_err();
        match err {
            Error::InvalidTarget { name, available } => {
                assert_eq!(name, "nonexistent");
                assert_eq!(available.len(), 3);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
