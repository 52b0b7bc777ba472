//! Input collections and where they come from.
//!
//! Parsing raw timetable exports is left to the caller; a [`DataSource`]
//! only hands over ready-made sections and rooms.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::{AllocationResult, Room, Section};
use crate::solver::AllocationStrategy;

/// Producer of already-parsed sections and rooms.
pub trait DataSource {
    fn load_sections(&self) -> Result<Vec<Section>>;
    fn load_rooms(&self) -> Result<Vec<Room>>;
}

/// One term's sections and rooms, owned.
///
/// Also an in-memory [`DataSource`].
///
/// # Example
/// ```
/// use u_roomalloc::models::{Room, Section};
/// use u_roomalloc::solver::GreedySolver;
/// use u_roomalloc::source::Instance;
///
/// let instance = Instance::new(
///     vec![Section::new("MAT001", 40, "24M12")],
///     vec![Room::classroom("IC101", 45)],
/// );
/// let result = instance.allocate(&GreedySolver::new()).unwrap();
/// assert!(result.is_success());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Instance {
    pub sections: Vec<Section>,
    pub rooms: Vec<Room>,
}

impl Instance {
    pub fn new(sections: Vec<Section>, rooms: Vec<Room>) -> Self {
        Self { sections, rooms }
    }

    /// Loads both collections from a source.
    pub fn load(source: &dyn DataSource) -> Result<Self> {
        Ok(Self {
            sections: source.load_sections()?,
            rooms: source.load_rooms()?,
        })
    }

    /// Allocates this instance's sections.
    pub fn allocate(&self, strategy: &dyn AllocationStrategy) -> Result<AllocationResult<'_>> {
        crate::allocate(&self.sections, &self.rooms, strategy)
    }
}

impl DataSource for Instance {
    fn load_sections(&self) -> Result<Vec<Section>> {
        Ok(self.sections.clone())
    }

    fn load_rooms(&self) -> Result<Vec<Room>> {
        Ok(self.rooms.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AllocError;

    struct Broken;

    impl DataSource for Broken {
        fn load_sections(&self) -> Result<Vec<Section>> {
            Ok(vec![Section::new("S1", 10, "2M1")])
        }

        fn load_rooms(&self) -> Result<Vec<Room>> {
            Err(AllocError::Source("rooms sheet missing".into()))
        }
    }

    #[test]
    fn test_load_from_instance() {
        let original = Instance::new(
            vec![Section::new("S1", 10, "2M1")],
            vec![Room::classroom("R1", 20)],
        );
        let loaded = Instance::load(&original).unwrap();
        assert_eq!(loaded, original);
    }

    #[test]
    fn test_source_error_propagates() {
        let err = Instance::load(&Broken).unwrap_err();
        assert_eq!(err.to_string(), "Data source error: rooms sheet missing");
    }

    #[test]
    fn test_instance_serde() {
        let instance = Instance::new(
            vec![Section::new("S1", 10, "2M1 3T2")],
            vec![Room::classroom("R1", 20).with_location("IC")],
        );
        let json = serde_json::to_string(&instance).unwrap();
        let back: Instance = serde_json::from_str(&json).unwrap();
        assert_eq!(back, instance);
        assert_eq!(back.sections[0].slots().len(), 2);
    }
}
