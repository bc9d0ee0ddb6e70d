use anyhow::{Context, Result};
use core_types::Owner;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// The on-disk export the CLI reads owners from.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    pub owners: Vec<Owner>,
}

/// Reads a JSON dataset and reports records filed under the wrong owner.
pub fn load(path: &Path) -> Result<Dataset> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open dataset {}", path.display()))?;
    let dataset: Dataset = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse dataset {}", path.display()))?;

    let mut mismatched = 0usize;
    for owner in &dataset.owners {
        let stray = owner
            .appointments
            .iter()
            .filter(|a| a.owner_id != owner.id)
            .count()
            + owner
                .transactions
                .iter()
                .filter(|t| t.owner_id != owner.id)
                .count();
        if stray > 0 {
            tracing::warn!(owner = %owner.id, name = %owner.name, stray, "Records reference a different owner ID.");
            mismatched += stray;
        }
    }

    tracing::info!(
        path = %path.display(),
        owners = dataset.owners.len(),
        mismatched,
        "Dataset loaded."
    );
    Ok(dataset)
}
