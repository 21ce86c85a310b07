//! Runtime configuration for a party holding labeled reference sets.

use std::path::Path;

use num_bigint::BigUint;
use serde::Deserialize;

use crate::error::{PsiError, Result};
use crate::partitioned_psi::PartitionedPsi;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LabeledSet {
    pub label: String,
    pub terms: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PsiConfig {
    pub partitions: usize,
    /// Decimal partition key, shared out of band with the counterparty.
    pub partition_key: String,
    pub bind: String,
    pub vocabulary: Vec<String>,
    pub sets: Vec<LabeledSet>,
}

impl Default for PsiConfig {
    fn default() -> Self {
        Self {
            partitions: 64,
            partition_key: "0".to_string(),
            bind: "127.0.0.1:8085".to_string(),
            vocabulary: Vec::new(),
            sets: Vec::new(),
        }
    }
}

impl PsiConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| PsiError::Config(e.to_string()))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| PsiError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    pub fn partition_key(&self) -> Result<BigUint> {
        self.partition_key
            .parse()
            .map_err(|_| PsiError::Config(format!("bad partition_key {:?}", self.partition_key)))
    }

    /// Partitioned index over the vocabulary with every configured set registered.
    pub fn build_index(&self) -> Result<PartitionedPsi> {
        let key = self.partition_key()?;
        let mut psi = PartitionedPsi::new(&key, self.partitions, self.vocabulary.as_slice())?;
        for set in &self.sets {
            psi.add_set(&set.label, set.terms.as_slice())?;
        }
        Ok(psi)
    }
}
