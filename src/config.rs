use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::model::{Commodity, CommodityCategory, ResourceBundle};

/// One tradable commodity in the ledger's schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommodityDef {
    pub name: Commodity,
    /// Display label for the presentation layer.
    pub label: String,
    pub category: CommodityCategory,
}

impl CommodityDef {
    fn new(name: &str, label: &str, category: CommodityCategory) -> Self {
        Self {
            name: Commodity::new(name),
            label: label.to_string(),
            category,
        }
    }
}

/// Configuration for a ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Commodities that may appear in balances, offers and bonds.
    pub commodities: Vec<CommodityDef>,
    /// Land area given to territories registered without an explicit one.
    #[serde(default = "default_land_area")]
    pub default_land_area: i64,
}

fn default_land_area() -> i64 {
    100
}

impl Default for LedgerConfig {
    /// The classic schema: currency plus 28 raw and finished goods.
    fn default() -> Self {
        use CommodityCategory::{Agricultural, Currency, Manufactured};
        let commodities = [
            ("currency", "Currency", Currency),
            ("wood1", "Wood I", Manufactured),
            ("wood2", "Wood II", Manufactured),
            ("wood3", "Wood III", Manufactured),
            ("stone1", "Stone I", Manufactured),
            ("stone2", "Stone II", Manufactured),
            ("gems", "Gems", Manufactured),
            ("spices", "Spices", Agricultural),
            ("coffee", "Coffee", Agricultural),
            ("yerba_mate", "Yerba mate", Agricultural),
            ("alcohol", "Alcohol", Agricultural),
            ("salt", "Salt", Agricultural),
            ("opium", "Opium", Agricultural),
            ("tea", "Tea", Agricultural),
            ("pearls", "Pearls", Manufactured),
            ("perfumery", "Perfumery", Manufactured),
            ("textiles1", "Textiles I", Manufactured),
            ("textiles2", "Textiles II", Manufactured),
            ("craft", "Craft", Manufactured),
            ("ore", "Ore", Manufactured),
            ("coal", "Coal", Manufactured),
            ("metal1", "Metal", Manufactured),
            ("metal2", "Precious Metal", Manufactured),
            ("food", "Food", Agricultural),
            ("fibre", "Fibre", Agricultural),
            ("guano", "Guano", Agricultural),
            ("saltpetre", "Saltpetre", Manufactured),
            ("sulfur", "Sulfur", Manufactured),
            ("gunpowder", "Gunpowder", Manufactured),
        ]
        .into_iter()
        .map(|(name, label, category)| CommodityDef::new(name, label, category))
        .collect();
        Self {
            commodities,
            default_land_area: default_land_area(),
        }
    }
}

impl LedgerConfig {
    /// The reduced schema with one commodity per category.
    pub fn compact() -> Self {
        Self {
            commodities: vec![
                CommodityDef::new("currency", "Currency", CommodityCategory::Currency),
                CommodityDef::new(
                    "agricultural",
                    "Agricultural Goods",
                    CommodityCategory::Agricultural,
                ),
                CommodityDef::new(
                    "manufactured",
                    "Manufactured Goods",
                    CommodityCategory::Manufactured,
                ),
            ],
            default_land_area: default_land_area(),
        }
    }

    /// Read and validate a JSON config file.
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: LedgerConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.commodities.is_empty() {
            return Err(ConfigError::NoCommodities);
        }
        let mut seen = HashSet::new();
        for def in &self.commodities {
            if def.name.as_str().is_empty() {
                return Err(ConfigError::EmptyCommodityName);
            }
            if !seen.insert(def.name.as_str()) {
                return Err(ConfigError::DuplicateCommodity(def.name.clone()));
            }
        }
        if self.default_land_area <= 0 {
            return Err(ConfigError::InvalidLandArea(self.default_land_area));
        }
        Ok(())
    }

    pub fn category_of(&self, commodity: &str) -> Option<CommodityCategory> {
        self.commodities
            .iter()
            .find(|d| d.name.as_str() == commodity)
            .map(|d| d.category)
    }

    pub fn is_known(&self, commodity: &str) -> bool {
        self.category_of(commodity).is_some()
    }

    /// First commodity in `bundle` that the schema does not list.
    pub fn first_unknown<'a>(&self, bundle: &'a ResourceBundle) -> Option<&'a Commodity> {
        bundle.commodities().find(|c| !self.is_known(c.as_str()))
    }

    /// True if `bundle` holds a positive amount of any commodity in `category`.
    pub fn bundle_has_category(&self, bundle: &ResourceBundle, category: CommodityCategory) -> bool {
        bundle
            .iter()
            .any(|(c, q)| q > 0 && self.category_of(c.as_str()) == Some(category))
    }
}
