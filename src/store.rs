use crate::error::{ForecastError, Result};
use crate::schema::RevenueAdjustment;
use chrono::Utc;
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Where the weekly forecast gets its manual revenue entries from.
pub trait AdjustmentSource {
    fn load(&self) -> Result<Vec<RevenueAdjustment>>;
}

/// Loads adjustments, degrading to an empty list when the source is unavailable.
pub fn load_or_empty(source: &dyn AdjustmentSource) -> Vec<RevenueAdjustment> {
    match source.load() {
        Ok(adjustments) => adjustments,
        Err(e) => {
            warn!("Could not load revenue adjustments, continuing without them: {}", e);
            Vec::new()
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryAdjustments {
    entries: Vec<RevenueAdjustment>,
}

impl InMemoryAdjustments {
    pub fn new(entries: Vec<RevenueAdjustment>) -> Self {
        Self { entries }
    }
}

impl AdjustmentSource for InMemoryAdjustments {
    fn load(&self) -> Result<Vec<RevenueAdjustment>> {
        Ok(self.entries.clone())
    }
}

/// Adjustments kept as a single JSON array on disk.
///
/// A missing file reads as an empty list.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Validates and appends an entry, filling in `id` and `created_at` when absent.
    pub fn add(&self, adjustment: RevenueAdjustment) -> Result<RevenueAdjustment> {
        adjustment.validate()?;

        let stored = RevenueAdjustment {
            id: adjustment.id.or_else(|| Some(Uuid::new_v4().to_string())),
            created_at: adjustment.created_at.or_else(|| Some(Utc::now())),
            ..adjustment
        };

        let mut entries = self.load()?;
        entries.push(stored.clone());
        self.save(&entries)?;

        info!(
            "Stored {:?} adjustment {} for {:04}-{:02}",
            stored.kind,
            stored.id.as_deref().unwrap_or_default(),
            stored.year,
            stored.month
        );
        Ok(stored)
    }

    pub fn remove(&self, id: &str) -> Result<()> {
        let entries = self.load()?;
        let before = entries.len();
        let remaining: Vec<RevenueAdjustment> = entries
            .into_iter()
            .filter(|adj| adj.id.as_deref() != Some(id))
            .collect();

        if remaining.len() == before {
            return Err(ForecastError::AdjustmentNotFound(id.to_string()));
        }

        self.save(&remaining)?;
        info!("Removed revenue adjustment {}", id);
        Ok(())
    }

    fn save(&self, entries: &[RevenueAdjustment]) -> Result<()> {
        let json = serde_json::to_string_pretty(entries)?;
        std::fs::write(&self.path, json)?;
        debug!("Wrote {} adjustments to {}", entries.len(), self.path.display());
        Ok(())
    }
}

impl AdjustmentSource for JsonFileStore {
    fn load(&self) -> Result<Vec<RevenueAdjustment>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let raw = std::fs::read_to_string(&self.path)?;
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&raw)?)
    }
}
