use crate::core::building_manager::BuildingManager;
use crate::dataset::{ReadingRecord, UnifiedDataset};
use crate::errors::ReadingError;
use tracing::{info, warn};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PopulationSummary {
    pub loaded: usize,
    pub rejected: usize,
}

/// Replay every record of the dataset into the manager as a meter reading.
///
/// Records are applied in dataset order. A record whose kwh cannot become a reading is
/// skipped; its building is still registered.
pub fn populate(manager: &mut BuildingManager, dataset: &UnifiedDataset) -> PopulationSummary {
    info!("Populating building model from {} records", dataset.len());

    let mut summary = PopulationSummary::default();
    for record in dataset.records() {
        match load_record(manager, record) {
            Ok(()) => summary.loaded += 1,
            Err(e) => {
                warn!(
                    "Rejected reading for {} at {}: {e}",
                    record.building_name, record.timestamp
                );
                summary.rejected += 1;
            }
        }
    }

    summary
}

fn load_record(manager: &mut BuildingManager, record: &ReadingRecord) -> Result<(), ReadingError> {
    let building = manager.get_or_create(&record.building_name);
    building.add_reading(record.timestamp, record.kwh()?)
}
