//! Run configuration
//!
//! A [`SelectionConfig`] fixes the split and every catalogue
//! hyperparameter. The defaults reproduce the reference behaviour (30%
//! held out, seed 101) and can be overridden from a TOML, YAML or JSON
//! file, or with [`SelectionConfigBuilder`].

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};
use crate::ml::models::{
    ElasticNetConfig, Gamma, KnnConfig, LassoCvConfig, LogisticConfig, RidgeConfig, SvmConfig,
};
use crate::ml::split::{DEFAULT_SEED, DEFAULT_TEST_FRACTION};

/// Hyperparameters of every catalogue member
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub lasso: LassoCvConfig,
    pub ridge: RidgeConfig,
    pub elastic_net: ElasticNetConfig,
    pub svr: SvmConfig,
    pub logistic: LogisticConfig,
    pub knn: KnnConfig,
    pub svc: SvmConfig,
}

/// Split and catalogue settings for one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    /// Share of rows held out for scoring
    pub test_fraction: f64,
    /// Seed of the row permutation
    pub seed: u64,
    pub models: ModelConfig,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        SelectionConfig {
            test_fraction: DEFAULT_TEST_FRACTION,
            seed: DEFAULT_SEED,
            models: ModelConfig::default(),
        }
    }
}

impl SelectionConfig {
    pub fn builder() -> SelectionConfigBuilder {
        SelectionConfigBuilder::new()
    }

    /// Load from a `.toml`, `.yaml`/`.yml` or `.json` file and validate
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| Error::DataAccess {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        let config: SelectionConfig = match extension.as_str() {
            "toml" => toml::from_str(&content)?,
            "yaml" | "yml" => serde_yaml::from_str(&content)?,
            "json" => serde_json::from_str(&content)?,
            other => {
                return Err(Error::Config(format!(
                    "unsupported config format '{}' for {}",
                    other,
                    path.display()
                )))
            }
        };

        config.validate()?;
        log::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Check ranges that would otherwise fail deep inside a fit
    pub fn validate(&self) -> Result<()> {
        if !(self.test_fraction > 0.0 && self.test_fraction < 1.0) {
            return Err(Error::Config(format!(
                "test_fraction must lie strictly between 0 and 1, got {}",
                self.test_fraction
            )));
        }

        let m = &self.models;
        let positive = [
            ("ridge.alpha", m.ridge.alpha),
            ("elastic_net.alpha", m.elastic_net.alpha),
            ("lasso.eps", m.lasso.eps),
            ("svr.c", m.svr.c),
            ("svc.c", m.svc.c),
            ("logistic.c", m.logistic.c),
            ("logistic.learning_rate", m.logistic.learning_rate),
        ];
        for (name, value) in positive {
            if !(value > 0.0) {
                return Err(Error::Config(format!("{} must be positive, got {}", name, value)));
            }
        }

        if !(0.0..=1.0).contains(&m.elastic_net.l1_ratio) {
            return Err(Error::Config(format!(
                "elastic_net.l1_ratio must lie in [0, 1], got {}",
                m.elastic_net.l1_ratio
            )));
        }
        if m.svr.epsilon < 0.0 {
            return Err(Error::Config("svr.epsilon must not be negative".to_string()));
        }
        for (name, gamma) in [("svr.gamma", m.svr.gamma), ("svc.gamma", m.svc.gamma)] {
            if let Gamma::Value(g) = gamma {
                if !(g > 0.0) {
                    return Err(Error::Config(format!("{} must be positive, got {}", name, g)));
                }
            }
        }

        let counts = [
            ("knn.k", m.knn.k),
            ("lasso.folds", m.lasso.folds),
            ("lasso.n_alphas", m.lasso.n_alphas),
        ];
        for (name, value) in counts {
            if value == 0 {
                return Err(Error::Config(format!("{} must be at least 1", name)));
            }
        }
        if m.lasso.folds < 2 {
            return Err(Error::Config("lasso.folds must be at least 2".to_string()));
        }

        Ok(())
    }
}

/// Builder for [`SelectionConfig`]
#[derive(Debug, Clone, Default)]
pub struct SelectionConfigBuilder {
    config: SelectionConfig,
}

impl SelectionConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn test_fraction(mut self, fraction: f64) -> Self {
        self.config.test_fraction = fraction;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = seed;
        self
    }

    pub fn models(mut self, models: ModelConfig) -> Self {
        self.config.models = models;
        self
    }

    pub fn ridge_alpha(mut self, alpha: f64) -> Self {
        self.config.models.ridge.alpha = alpha;
        self
    }

    pub fn knn_neighbors(mut self, k: usize) -> Self {
        self.config.models.knn.k = k;
        self
    }

    pub fn lasso_folds(mut self, folds: usize) -> Self {
        self.config.models.lasso.folds = folds;
        self
    }

    /// Validate and return the configuration
    pub fn build(self) -> Result<SelectionConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::models::KernelType;

    #[test]
    fn test_defaults() {
        let config = SelectionConfig::default();
        assert_eq!(config.test_fraction, 0.3);
        assert_eq!(config.seed, 101);
        assert_eq!(config.models.knn.k, 5);
        assert_eq!(config.models.lasso.folds, 5);
        assert_eq!(config.models.elastic_net.l1_ratio, 0.5);
        assert_eq!(config.models.svc.kernel, KernelType::Rbf);
        assert_eq!(config.models.svr.gamma, Gamma::Scale);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_validates() {
        let config = SelectionConfig::builder().seed(7).knn_neighbors(3).build().unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.models.knn.k, 3);

        assert!(matches!(
            SelectionConfig::builder().test_fraction(1.0).build(),
            Err(Error::Config(_))
        ));
        assert!(SelectionConfig::builder().knn_neighbors(0).build().is_err());
        assert!(SelectionConfig::builder().ridge_alpha(-1.0).build().is_err());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: SelectionConfig = toml::from_str(
            r#"
            seed = 42

            [models.ridge]
            alpha = 0.5

            [models.svc]
            kernel = "linear"
            "#,
        )
        .unwrap();

        assert_eq!(config.seed, 42);
        assert_eq!(config.test_fraction, 0.3);
        assert_eq!(config.models.ridge.alpha, 0.5);
        assert_eq!(config.models.svc.kernel, KernelType::Linear);
        assert_eq!(config.models.svc.c, 1.0);
    }

    #[test]
    fn test_gamma_reads_the_same_in_every_format() {
        let yaml: SelectionConfig =
            serde_yaml::from_str("models:\n  svr:\n    gamma: 0.25\n  svc:\n    gamma: auto\n")
                .unwrap();
        let toml: SelectionConfig =
            toml::from_str("[models.svr]\ngamma = 0.25\n\n[models.svc]\ngamma = \"auto\"\n")
                .unwrap();
        let json: SelectionConfig = serde_json::from_str(
            r#"{"models": {"svr": {"gamma": 0.25}, "svc": {"gamma": "auto"}}}"#,
        )
        .unwrap();

        for config in [&yaml, &toml, &json] {
            assert_eq!(config.models.svr.gamma, Gamma::Value(0.25));
            assert_eq!(config.models.svc.gamma, Gamma::Auto);
        }

        let written = serde_json::to_string(&yaml.models.svr).unwrap();
        assert!(written.contains(r#""gamma":0.25"#), "{}", written);
        assert!(serde_json::to_string(&SvmConfig::default())
            .unwrap()
            .contains(r#""gamma":"scale""#));
    }

    #[test]
    fn test_unknown_gamma_name_is_rejected() {
        let result: std::result::Result<SelectionConfig, _> =
            toml::from_str("[models.svr]\ngamma = \"wide\"\n");
        assert!(result.is_err());
    }
}
