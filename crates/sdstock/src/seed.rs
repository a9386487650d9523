//! The fixed card enumeration loaded into an empty store.
//!
//! Every container carries its own list of capacity bands, so adding a
//! container with a different layout only means adding a [`ContainerSeed`].

use std::ops::RangeInclusive;

use crate::card::Capacity;
use crate::error::{Error, Result};

/// A run of indexes that share a capacity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapacityBand {
    /// Indexes covered by this band.
    pub indexes: RangeInclusive<u32>,
    /// Capacity of every card in the band.
    pub capacity: Capacity,
}

/// How one container is populated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerSeed {
    /// Container label, also used as the card label prefix.
    pub container: String,
    /// Number of cards, indexed from 1.
    pub count: u32,
    /// Capacity bands; the first band containing an index wins.
    pub bands: Vec<CapacityBand>,
}

/// One card to insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedCard {
    /// Card label, `<container>-<index>`.
    pub label: String,
    /// Index within the container.
    pub index: u32,
    /// Capacity band.
    pub capacity: Capacity,
    /// Container label.
    pub container: String,
}

impl ContainerSeed {
    /// A container whose cards all share one capacity.
    #[must_use]
    pub fn uniform(container: &str, count: u32, capacity: Capacity) -> Self {
        Self {
            container: container.to_string(),
            count,
            bands: vec![CapacityBand {
                indexes: 1..=count,
                capacity,
            }],
        }
    }

    /// Capacity assigned to `index`, if any band covers it.
    #[must_use]
    pub fn capacity_for(&self, index: u32) -> Option<Capacity> {
        self.bands
            .iter()
            .find(|band| band.indexes.contains(&index))
            .map(|band| band.capacity)
    }

    /// Expand the container into cards.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SeedPlan`] if an index is not covered by any band.
    pub fn cards(&self) -> Result<Vec<SeedCard>> {
        (1..=self.count)
            .map(|index| {
                let capacity = self.capacity_for(index).ok_or_else(|| Error::SeedPlan {
                    container: self.container.clone(),
                    index,
                })?;
                Ok(SeedCard {
                    label: format!("{}-{index}", self.container),
                    index,
                    capacity,
                    container: self.container.clone(),
                })
            })
            .collect()
    }
}

/// The full seed enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedPlan {
    /// Containers in insertion order.
    pub containers: Vec<ContainerSeed>,
}

impl Default for SeedPlan {
    /// Three cases of 40 cards: `SD1` in three bands, `SD2` all 64G,
    /// `microSD` all 32G.
    fn default() -> Self {
        Self {
            containers: vec![
                ContainerSeed {
                    container: "SD1".to_string(),
                    count: 40,
                    bands: vec![
                        CapacityBand {
                            indexes: 1..=11,
                            capacity: Capacity::Gb32,
                        },
                        CapacityBand {
                            indexes: 12..=18,
                            capacity: Capacity::Gb64,
                        },
                        CapacityBand {
                            indexes: 19..=40,
                            capacity: Capacity::Gb128,
                        },
                    ],
                },
                ContainerSeed::uniform("SD2", 40, Capacity::Gb64),
                ContainerSeed::uniform("microSD", 40, Capacity::Gb32),
            ],
        }
    }
}

impl SeedPlan {
    /// Expand every container into cards, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SeedPlan`] if any container leaves an index without
    /// a capacity.
    pub fn cards(&self) -> Result<Vec<SeedCard>> {
        let mut cards = Vec::new();
        for container in &self.containers {
            cards.extend(container.cards()?);
        }
        Ok(cards)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_plan_has_120_cards() {
        let cards = SeedPlan::default().cards().unwrap();
        assert_eq!(cards.len(), 120);
    }

    #[test]
    fn test_sd1_bands() {
        let plan = SeedPlan::default();
        let sd1 = &plan.containers[0];
        assert_eq!(sd1.capacity_for(1), Some(Capacity::Gb32));
        assert_eq!(sd1.capacity_for(11), Some(Capacity::Gb32));
        assert_eq!(sd1.capacity_for(12), Some(Capacity::Gb64));
        assert_eq!(sd1.capacity_for(18), Some(Capacity::Gb64));
        assert_eq!(sd1.capacity_for(19), Some(Capacity::Gb128));
        assert_eq!(sd1.capacity_for(40), Some(Capacity::Gb128));
        assert_eq!(sd1.capacity_for(41), None);
    }

    #[test]
    fn test_uniform_containers() {
        let plan = SeedPlan::default();
        let cards = plan.cards().unwrap();
        assert!(cards
            .iter()
            .filter(|c| c.container == "SD2")
            .all(|c| c.capacity == Capacity::Gb64));
        assert!(cards
            .iter()
            .filter(|c| c.container == "microSD")
            .all(|c| c.capacity == Capacity::Gb32));
    }

    #[test]
    fn test_labels_follow_container_and_index() {
        let cards = SeedPlan::default().cards().unwrap();
        assert_eq!(cards[0].label, "SD1-1");
        assert_eq!(cards[39].label, "SD1-40");
        assert_eq!(cards[80].label, "microSD-1");
        assert_eq!(cards[80].index, 1);
    }

    #[test]
    fn test_gap_in_bands_is_an_error() {
        let seed = ContainerSeed {
            container: "SD3".to_string(),
            count: 5,
            bands: vec![CapacityBand {
                indexes: 1..=3,
                capacity: Capacity::Gb32,
            }],
        };
        let err = seed.cards().unwrap_err();
        assert!(matches!(err, Error::SeedPlan { index: 4, .. }));
    }
}
