//! Client-side stock pre-check.
//!
//! The check runs against the most recently fetched inventory and holds no
//! lock: the backend re-validates on submission and stays authoritative.

use itertools::Itertools as _;
use serde::Serialize;

use crate::api::{component, Component};

use super::Error;

/// Snapshot of the component inventory.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(transparent)]
pub struct Inventory {
    components: Vec<Component>,
}

impl Inventory {
    pub fn new(components: Vec<Component>) -> Self {
        Self { components }
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    pub fn get(&self, id: component::Id) -> Option<&Component> {
        self.components.iter().find(|c| c.id == id)
    }

    /// Verifies that every allocation fits the stock of this snapshot.
    ///
    /// Repeated allocations of one component are summed. The first
    /// offending component, in allocation order, is reported.
    pub fn check(
        &self,
        allocations: &[component::Allocation],
    ) -> Result<(), Error> {
        let totals = allocations
            .iter()
            .map(|a| (a.id, a.quantity))
            .into_grouping_map()
            .fold(0u32, |acc, _, quantity| acc.saturating_add(quantity));

        for id in allocations.iter().map(|a| a.id).unique() {
            let component = self.get(id).ok_or(Error::UnknownComponent(id))?;
            let requested = totals.get(&id).copied().unwrap_or_default();
            if requested > component.in_stock {
                return Err(Error::InsufficientStock {
                    id,
                    name: component.name.clone(),
                    requested,
                    in_stock: component.in_stock,
                });
            }
        }

        Ok(())
    }
}
