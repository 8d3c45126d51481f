use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Inventory line item.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Component {
    pub id: Id,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub in_stock: u32,
    #[serde(default)]
    pub price: Option<f64>,
}

#[derive(
    Clone,
    Copy,
    Debug,
    Deserialize,
    Display,
    Eq,
    Hash,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
pub struct Id(i64);

impl From<i64> for Id {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

/// Quantity of a component consumed by a repair.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Allocation {
    pub id: Id,
    pub quantity: u32,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct New {
    pub name: String,
    pub description: Option<String>,
    pub in_stock: u32,
    pub price: Option<f64>,
}

/// Partial update, absent fields are left untouched.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct Update {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_stock: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
}
