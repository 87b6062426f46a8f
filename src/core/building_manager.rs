use crate::core::building::Building;
use indexmap::IndexMap;

/// Registry of every building seen during a run, in first-seen order.
#[derive(Debug, Default)]
pub struct BuildingManager {
    buildings: IndexMap<String, Building>,
}

impl BuildingManager {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn get_or_create(&mut self, name: &str) -> &mut Building {
        self.buildings
            .entry(name.to_string())
            .or_insert_with(|| Building::new(name))
    }

    pub fn get(&self, name: &str) -> Option<&Building> {
        self.buildings.get(name)
    }

    pub fn list_buildings(&self) -> impl Iterator<Item = &Building> {
        self.buildings.values()
    }

    pub fn len(&self) -> usize {
        self.buildings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buildings.is_empty()
    }
}
