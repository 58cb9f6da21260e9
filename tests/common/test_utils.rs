//! Test utilities for CSV fixtures and synthetic tables

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// CSV fixture on disk, removed when dropped
pub struct TempTestFile {
    file: NamedTempFile,
}

impl TempTestFile {
    pub fn new(test_name: &str, extension: &str) -> Self {
        let file = tempfile::Builder::new()
            .prefix(&format!("bakeoff_{}_", test_name))
            .suffix(&format!(".{}", extension))
            .tempfile()
            .unwrap();
        TempTestFile { file }
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Write `content` to the file, replacing what was there
    pub fn write(&self, content: &str) {
        std::fs::File::create(self.path())
            .and_then(|mut f| f.write_all(content.as_bytes()))
            .unwrap();
    }
}

/// CSV fixture with a header row followed by `rows`
pub fn create_test_csv(test_name: &str, headers: &[&str], rows: &[Vec<String>]) -> TempTestFile {
    let temp_file = TempTestFile::new(test_name, "csv");

    let mut content = headers.join(",");
    content.push('\n');
    for row in rows {
        content.push_str(&row.join(","));
        content.push('\n');
    }
    temp_file.write(&content);

    temp_file
}

/// `n` rows of `size,rooms,age,price` where price is linear in the
/// features plus small noise
pub fn regression_rows(n: usize, seed: u64) -> Vec<Vec<String>> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| {
            let size: f64 = rng.random_range(40.0..200.0);
            let rooms: i64 = rng.random_range(1..6);
            let age: f64 = rng.random_range(0.0..50.0);
            let noise: f64 = rng.random_range(-5.0..5.0);
            let price = 3.0 * size + 20.0 * rooms as f64 - 1.5 * age + 50.0 + noise;
            vec![
                format!("{:.2}", size),
                rooms.to_string(),
                format!("{:.1}", age),
                format!("{:.2}", price),
            ]
        })
        .collect()
}

/// `n` rows of `length,width,species` drawn from three well separated
/// clusters
pub fn classification_rows(n: usize, seed: u64) -> Vec<Vec<String>> {
    let mut rng = StdRng::seed_from_u64(seed);
    let centers = [("setosa", 1.0, 1.0), ("versicolor", 5.0, 1.5), ("virginica", 3.0, 6.0)];
    (0..n)
        .map(|i| {
            let (species, cx, cy) = centers[i % centers.len()];
            let length: f64 = cx + rng.random_range(-0.8..0.8);
            let width: f64 = cy + rng.random_range(-0.8..0.8);
            vec![
                format!("{:.3}", length),
                format!("{:.3}", width),
                species.to_string(),
            ]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_removed_on_drop() {
        let path;
        {
            let fixture = create_test_csv("drop", &["a"], &[vec!["1".to_string()]]);
            path = fixture.path().to_path_buf();
            assert_eq!(std::fs::read_to_string(&path).unwrap(), "a\n1\n");
        }
        assert!(!path.exists());
    }

    #[test]
    fn test_generators_are_seeded() {
        assert_eq!(regression_rows(5, 3), regression_rows(5, 3));
        assert_ne!(classification_rows(6, 1), classification_rows(6, 2));
    }
}
