//! Best-of-catalogue selection with scripted candidates

use std::cell::Cell;
use std::rc::Rc;

use bakeoff::column::{Float64Column, StringColumn};
use bakeoff::ml::metrics::{accuracy_score, r2_score};
use bakeoff::ml::models::SupervisedModel;
use bakeoff::ml::selection::{check_readiness, evaluate_catalogue, select_best};
use bakeoff::ml::split::Split;
use bakeoff::ml::target::select_target;
use bakeoff::{Dataset, Error, FeatureMatrix, Result, TaskKind};

/// Candidate that replays a fixed prediction vector and counts its fits
struct Scripted<L> {
    name: &'static str,
    predictions: Vec<L>,
    fits: Rc<Cell<usize>>,
}

impl<L: Clone> SupervisedModel for Scripted<L> {
    type Label = L;

    fn name(&self) -> &'static str {
        self.name
    }

    fn fit(&mut self, _x: &FeatureMatrix, _y: &[L]) -> Result<()> {
        self.fits.set(self.fits.get() + 1);
        Ok(())
    }

    fn predict(&self, _x: &FeatureMatrix) -> Result<Vec<L>> {
        Ok(self.predictions.clone())
    }

    fn is_fitted(&self) -> bool {
        self.fits.get() > 0
    }
}

fn split_with_test_target<L: Clone>(test_target: Vec<L>) -> Split<L> {
    let rows = (0..test_target.len()).map(|i| vec![i as f64]).collect();
    let x = FeatureMatrix::from_rows(rows).unwrap();
    Split {
        train_features: x.clone(),
        train_target: test_target.clone(),
        test_features: x,
        test_target,
        train_indices: Vec::new(),
        test_indices: Vec::new(),
    }
}

#[test]
fn test_tie_goes_to_first_maximum() {
    let fits = Rc::new(Cell::new(0));
    let candidates: Vec<Scripted<f64>> = [("first", 0.8), ("second", 0.9), ("third", 0.9)]
        .iter()
        .map(|&(name, score)| Scripted {
            name,
            predictions: vec![score],
            fits: Rc::clone(&fits),
        })
        .collect();

    let selection = select_best(candidates, |m| Ok(m.predictions[0])).unwrap();
    assert_eq!(selection.best.name, "second");
    assert_eq!(selection.best.position, 1);
    assert_eq!(selection.best.score, 0.9);
}

#[test]
fn test_regression_scenario_picks_ridge() {
    // test target [1, -1]: shifting both predictions by e gives R² = 1 - e²
    let split = split_with_test_target(vec![1.0, -1.0]);
    let fits = Rc::new(Cell::new(0));
    let scripted = [
        ("Linear Regression", 0.41),
        ("Lasso", 0.55),
        ("Ridge", 0.60),
        ("ElasticNet", 0.58),
        ("Support Vector Regression", 0.52),
    ];
    let candidates: Vec<Scripted<f64>> = scripted
        .iter()
        .map(|&(name, r2): &(&'static str, f64)| {
            let e = (1.0 - r2).sqrt();
            Scripted {
                name,
                predictions: vec![1.0 - e, -1.0 - e],
                fits: Rc::clone(&fits),
            }
        })
        .collect();

    let selection = evaluate_catalogue(candidates, &split, r2_score).unwrap();

    assert_eq!(selection.best.name, "Ridge");
    assert!((selection.best.score - 0.60).abs() < 1e-9);
    assert_eq!(fits.get(), 5);
    for (entry, &(name, r2)) in selection.leaderboard.iter().zip(&scripted) {
        assert_eq!(entry.name, name);
        assert!((entry.score - r2).abs() < 1e-9);
    }
}

#[test]
fn test_classification_scenario_picks_svc() {
    let truth: Vec<String> = (0..100)
        .map(|i| if i % 2 == 0 { "spam" } else { "ham" }.to_string())
        .collect();
    let split = split_with_test_target(truth.clone());

    // first `correct` predictions right, the rest wrong
    let scripted_predictions = |correct: usize| -> Vec<String> {
        truth
            .iter()
            .enumerate()
            .map(|(i, label)| {
                if i < correct {
                    label.clone()
                } else if label == "spam" {
                    "ham".to_string()
                } else {
                    "spam".to_string()
                }
            })
            .collect()
    };

    let fits = Rc::new(Cell::new(0));
    let candidates = vec![
        Scripted {
            name: "Logistic Regression",
            predictions: scripted_predictions(77),
            fits: Rc::clone(&fits),
        },
        Scripted {
            name: "KNN",
            predictions: scripted_predictions(77),
            fits: Rc::clone(&fits),
        },
        Scripted {
            name: "SVC",
            predictions: scripted_predictions(81),
            fits: Rc::clone(&fits),
        },
    ];

    let selection =
        evaluate_catalogue(candidates, &split, |t, p| accuracy_score(t, p)).unwrap();

    assert_eq!(selection.best.name, "SVC");
    assert_eq!(selection.best.position, 2);
    assert!((selection.best.score - 0.81).abs() < 1e-12);
    assert_eq!(selection.leaderboard[0].score, selection.leaderboard[1].score);
}

#[test]
fn test_mismatch_stops_before_any_fit() {
    let data = Dataset::from_columns(vec![
        ("x", Float64Column::new(vec![1.0, 2.0, 3.0, 4.0]).into()),
        (
            "colour",
            StringColumn::new(vec!["red".into(), "blue".into(), "red".into(), "blue".into()])
                .into(),
        ),
    ])
    .unwrap();

    let fits = Rc::new(Cell::new(0));
    let candidates = vec![Scripted {
        name: "never",
        predictions: vec![0.0; 2],
        fits: Rc::clone(&fits),
    }];
    let split = split_with_test_target(vec![0.0, 1.0]);

    let selection = select_target(&data, "colour").unwrap();
    let result = check_readiness(TaskKind::Regressor, &selection)
        .and_then(|_| evaluate_catalogue(candidates, &split, r2_score));

    match result {
        Err(Error::TaskDataMismatch { columns, .. }) => assert_eq!(columns, vec!["colour"]),
        Err(other) => panic!("expected mismatch, got {:?}", other),
        Ok(_) => panic!("expected mismatch"),
    }
    assert_eq!(fits.get(), 0);
}
