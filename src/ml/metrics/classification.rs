//! Metrics for evaluating classification models

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::error::{Error, Result};

fn check_lengths<T>(y_true: &[T], y_pred: &[T]) -> Result<()> {
    if y_true.len() != y_pred.len() {
        return Err(Error::DimensionMismatch(format!(
            "true and predicted labels differ in length: {} vs {}",
            y_true.len(),
            y_pred.len()
        )));
    }

    if y_true.is_empty() {
        return Err(Error::EmptyData(
            "cannot compute a metric on empty data".to_string(),
        ));
    }

    Ok(())
}

/// Fraction of predictions equal to the true label
///
/// # Arguments
/// * `y_true` - True labels
/// * `y_pred` - Predicted labels
///
/// # Returns
/// * `Result<f64>` - Accuracy in [0, 1]
pub fn accuracy_score<T: PartialEq>(y_true: &[T], y_pred: &[T]) -> Result<f64> {
    check_lengths(y_true, y_pred)?;

    let correct_count = y_true
        .iter()
        .zip(y_pred.iter())
        .filter(|(t, p)| t == p)
        .count();

    Ok(correct_count as f64 / y_true.len() as f64)
}

/// Sorted union of the labels seen in `y_true` and `y_pred`
pub fn unique_labels<T: Ord + Clone>(y_true: &[T], y_pred: &[T]) -> Vec<T> {
    y_true
        .iter()
        .chain(y_pred.iter())
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Counts of (actual, predicted) label pairs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfusionMatrix<T> {
    /// Row and column labels, sorted
    pub labels: Vec<T>,
    /// `counts[i][j]`: samples of class `labels[i]` predicted as `labels[j]`
    pub counts: Vec<Vec<usize>>,
}

impl<T: Ord + Clone> ConfusionMatrix<T> {
    pub fn new(y_true: &[T], y_pred: &[T]) -> Result<Self> {
        check_lengths(y_true, y_pred)?;

        let labels = unique_labels(y_true, y_pred);
        let index: BTreeMap<&T, usize> = labels.iter().enumerate().map(|(i, l)| (l, i)).collect();

        let mut counts = vec![vec![0usize; labels.len()]; labels.len()];
        for (t, p) in y_true.iter().zip(y_pred) {
            counts[index[t]][index[p]] += 1;
        }

        Ok(ConfusionMatrix { labels, counts })
    }

    /// Correct predictions for class `i`
    pub fn true_positives(&self, i: usize) -> usize {
        self.counts[i][i]
    }

    /// Samples predicted as class `i`
    pub fn predicted_count(&self, i: usize) -> usize {
        self.counts.iter().map(|row| row[i]).sum()
    }

    /// Samples whose true class is `i`
    pub fn support(&self, i: usize) -> usize {
        self.counts[i].iter().sum()
    }

    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }
}

impl<T: fmt::Display> fmt::Display for ConfusionMatrix<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.labels.iter().map(|l| l.to_string()).collect();
        let width = names
            .iter()
            .map(String::len)
            .chain(self.counts.iter().flatten().map(|c| c.to_string().len()))
            .max()
            .unwrap_or(1)
            .max(6);

        write!(f, "{:>width$}", "actual\\pred", width = width.max(11))?;
        for name in &names {
            write!(f, " {:>width$}", name, width = width)?;
        }
        writeln!(f)?;

        for (name, row) in names.iter().zip(&self.counts) {
            write!(f, "{:>width$}", name, width = width.max(11))?;
            for count in row {
                write!(f, " {:>width$}", count, width = width)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Precision, recall and F1 for one class (or one average)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub support: usize,
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

fn f1(precision: f64, recall: f64) -> f64 {
    if precision + recall == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / (precision + recall)
    }
}

/// Per-class precision/recall/F1 with accuracy and macro/weighted averages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationReport<T> {
    pub classes: Vec<(T, ClassMetrics)>,
    pub accuracy: f64,
    pub macro_avg: ClassMetrics,
    pub weighted_avg: ClassMetrics,
}

impl<T: Ord + Clone> ClassificationReport<T> {
    pub fn new(y_true: &[T], y_pred: &[T]) -> Result<Self> {
        let matrix = ConfusionMatrix::new(y_true, y_pred)?;
        Ok(Self::from_confusion_matrix(&matrix))
    }

    /// Derive the report from already counted pairs; zero divisions give 0.0
    pub fn from_confusion_matrix(matrix: &ConfusionMatrix<T>) -> Self {
        let classes: Vec<(T, ClassMetrics)> = matrix
            .labels
            .iter()
            .enumerate()
            .map(|(i, label)| {
                let tp = matrix.true_positives(i);
                let precision = ratio(tp, matrix.predicted_count(i));
                let recall = ratio(tp, matrix.support(i));
                (
                    label.clone(),
                    ClassMetrics {
                        precision,
                        recall,
                        f1_score: f1(precision, recall),
                        support: matrix.support(i),
                    },
                )
            })
            .collect();

        let total = matrix.total();
        let correct: usize = (0..matrix.labels.len()).map(|i| matrix.true_positives(i)).sum();
        let n_classes = classes.len().max(1) as f64;

        let macro_avg = ClassMetrics {
            precision: classes.iter().map(|(_, m)| m.precision).sum::<f64>() / n_classes,
            recall: classes.iter().map(|(_, m)| m.recall).sum::<f64>() / n_classes,
            f1_score: classes.iter().map(|(_, m)| m.f1_score).sum::<f64>() / n_classes,
            support: total,
        };

        let weight = |pick: fn(&ClassMetrics) -> f64| {
            classes
                .iter()
                .map(|(_, m)| pick(m) * m.support as f64)
                .sum::<f64>()
                / total.max(1) as f64
        };
        let weighted_avg = ClassMetrics {
            precision: weight(|m| m.precision),
            recall: weight(|m| m.recall),
            f1_score: weight(|m| m.f1_score),
            support: total,
        };

        ClassificationReport {
            classes,
            accuracy: ratio(correct, total),
            macro_avg,
            weighted_avg,
        }
    }

    /// Metrics for `label`, if it was seen
    pub fn class(&self, label: &T) -> Option<&ClassMetrics> {
        self.classes.iter().find(|(l, _)| l == label).map(|(_, m)| m)
    }
}

impl<T: fmt::Display> fmt::Display for ClassificationReport<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .classes
            .iter()
            .map(|(l, _)| l.to_string().len())
            .max()
            .unwrap_or(0)
            .max("weighted avg".len());

        writeln!(
            f,
            "{:>width$} {:>9} {:>9} {:>9} {:>9}",
            "", "precision", "recall", "f1-score", "support",
            width = width
        )?;
        writeln!(f)?;

        for (label, metrics) in &self.classes {
            write_metrics_row(f, width, &label.to_string(), metrics)?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:>width$} {:>9} {:>9} {:>9.2} {:>9}",
            "accuracy", "", "", self.accuracy, self.macro_avg.support,
            width = width
        )?;
        write_metrics_row(f, width, "macro avg", &self.macro_avg)?;
        write_metrics_row(f, width, "weighted avg", &self.weighted_avg)
    }
}

fn write_metrics_row(f: &mut fmt::Formatter<'_>, width: usize, name: &str, m: &ClassMetrics) -> fmt::Result {
    writeln!(
        f,
        "{:>width$} {:>9.2} {:>9.2} {:>9.2} {:>9}",
        name, m.precision, m.recall, m.f1_score, m.support,
        width = width
    )
}
