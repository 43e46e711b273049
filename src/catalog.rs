//! Static resource catalog and region list.
//!
//! Built once; shared read-only behind an `Arc`.

use std::collections::HashSet;
use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::schema::{Category, Region, ResourceDefinition};

const WORLD_BANK_INDICATORS: &str = "https://api.worldbank.org/v2/country/all/indicator/";

#[derive(Debug, Clone)]
pub struct Catalog {
    pub resources: Vec<ResourceDefinition>,
    pub regions: Vec<Region>,
}

impl Catalog {
    pub fn new(resources: Vec<ResourceDefinition>, regions: Vec<Region>) -> Self {
        Self { resources, regions }
    }

    /// Built-in catalog shared by the whole process.
    pub fn builtin() -> Arc<Catalog> {
        BUILTIN.clone()
    }

    /// Resolves the resources targeted by a run.
    ///
    /// CONTRACT:
    /// - `None` selects the full catalog
    /// - `Some(ids)` keeps catalog entries whose id is listed,
    ///   in catalog order; unknown ids are ignored
    pub fn resolve(&self, filter: Option<&[String]>) -> Vec<&ResourceDefinition> {
        match filter {
            None => self.resources.iter().collect(),
            Some(ids) => {
                let wanted: HashSet<&str> = ids.iter().map(String::as_str).collect();
                self.resources
                    .iter()
                    .filter(|r| wanted.contains(r.id.as_str()))
                    .collect()
            }
        }
    }
}

fn resource(
    id: &str,
    name: &str,
    category: Category,
    unit: &str,
    description: &str,
    indicator: &str,
) -> ResourceDefinition {
    ResourceDefinition {
        id: id.into(),
        name: name.into(),
        category,
        unit: unit.into(),
        description: description.into(),
        source_url: WORLD_BANK_INDICATORS.into(),
        indicator: indicator.into(),
    }
}

static BUILTIN: Lazy<Arc<Catalog>> = Lazy::new(|| {
    use Category::*;

    let resources = vec![
        resource("crude-oil", "Crude Oil", Energy, "million barrels/day", "Global crude oil production", "EG.ELC.PETR.ZS"),
        resource("natural-gas", "Natural Gas", Energy, "billion cubic meters", "Natural gas production", "EG.ELC.NGAS.ZS"),
        resource("coal", "Coal", Energy, "million tonnes", "Coal production and consumption", "EG.ELC.COAL.ZS"),
        resource("lithium", "Lithium", Mineral, "thousand tonnes LCE", "Lithium production for batteries", "TX.VAL.MMTL.ZS.UN"),
        resource("iron-ore", "Iron Ore", Mineral, "million tonnes", "Iron ore extraction", "TX.VAL.MMTL.ZS.UN"),
        resource("wheat", "Wheat", Food, "million tonnes", "Global wheat production and trade", "AG.PRD.FOOD.XD"),
        resource("rice", "Rice", Food, "million tonnes", "Global rice production", "AG.PRD.FOOD.XD"),
        resource("semiconductors", "Semiconductors", Technology, "billion USD", "Semiconductor production and trade value", "NV.IND.MANF.ZS"),
        resource("rare-earth", "Rare Earth Elements", Mineral, "thousand tonnes", "Rare earth extraction", "TX.VAL.MMTL.ZS.UN"),
        resource("copper", "Copper", Mineral, "million tonnes", "Copper mining and refining", "TX.VAL.MMTL.ZS.UN"),
    ];

    // major economies
    let regions = [
        ("USA", "United States"),
        ("CHN", "China"),
        ("JPN", "Japan"),
        ("DEU", "Germany"),
        ("GBR", "United Kingdom"),
        ("IND", "India"),
        ("FRA", "France"),
        ("BRA", "Brazil"),
        ("SAU", "Saudi Arabia"),
        ("RUS", "Russia"),
        ("AUS", "Australia"),
        ("KOR", "South Korea"),
        ("TWN", "Taiwan"),
        ("CHL", "Chile"),
        ("ARG", "Argentina"),
    ]
    .into_iter()
    .map(|(code, name)| Region {
        code: code.into(),
        name: name.into(),
    })
    .collect();

    Arc::new(Catalog::new(resources, regions))
});
