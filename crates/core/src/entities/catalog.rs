//! Store catalog entities and the merged store listing.

use serde::{Deserialize, Serialize};

use super::ValidationError;
use crate::types::{BlobRef, Price, ProductId};

/// A store-owned (or backend-imported) product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    /// Price in whole dollars.
    pub price: u64,
    /// Units in stock.
    pub quantity: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<BlobRef>,
    /// Store-owned (`true`) or sourced from a partner catalog (`false`).
    pub is_internal: bool,
}

impl Product {
    /// Unit price as a [`Price`].
    #[must_use]
    pub fn unit_price(&self) -> Price {
        Price::from_units(self.price)
    }

    /// Whether at least one unit can be ordered.
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.quantity > 0
    }
}

/// Payload for creating or editing a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetails {
    pub name: String,
    pub description: String,
    pub price: u64,
    pub quantity: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<BlobRef>,
}

impl ProductDetails {
    /// Check the fields the admin form requires.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::new("name", "cannot be empty"));
        }
        if self.description.trim().is_empty() {
            return Err(ValidationError::new("description", "cannot be empty"));
        }
        if self.price == 0 {
            return Err(ValidationError::new("price", "must be greater than zero"));
        }
        Ok(())
    }
}

/// A product from the general partner store (read-only projection).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalProduct {
    /// Upstream id, or a client-generated UUID when upstream had none.
    pub id: String,
    pub name: String,
    pub price: Price,
    pub image_url: String,
    pub external_url: String,
}

/// A product from the sports equipment partner catalog (read-only projection).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalSportsProduct {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: Price,
    pub image_url: String,
    /// Category slug, e.g. `running-gear`.
    pub category: String,
    pub external_product_url: String,
}

impl ExternalSportsProduct {
    /// Case-insensitive substring match over name and description.
    ///
    /// A blank term matches everything.
    #[must_use]
    pub fn matches_term(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        term.is_empty()
            || self.name.to_lowercase().contains(&term)
            || self.description.to_lowercase().contains(&term)
    }
}

/// Where a catalog entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CatalogSource {
    /// Backend product with a persistent id.
    Internal,
    /// General partner store.
    External,
    /// Sports equipment partner catalog.
    Sports,
}

/// One entry in the merged store listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "camelCase")]
pub enum CatalogEntry {
    Internal(Product),
    External(ExternalProduct),
    Sports(ExternalSportsProduct),
}

impl CatalogEntry {
    /// The entry's source tag.
    #[must_use]
    pub const fn source(&self) -> CatalogSource {
        match self {
            Self::Internal(_) => CatalogSource::Internal,
            Self::External(_) => CatalogSource::External,
            Self::Sports(_) => CatalogSource::Sports,
        }
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Internal(p) => &p.name,
            Self::External(p) => &p.name,
            Self::Sports(p) => &p.name,
        }
    }

    /// Listing price.
    #[must_use]
    pub fn price(&self) -> Price {
        match self {
            Self::Internal(p) => p.unit_price(),
            Self::External(p) => p.price,
            Self::Sports(p) => p.price,
        }
    }

    /// Category slug, only sports entries carry one.
    #[must_use]
    pub fn category(&self) -> Option<&str> {
        match self {
            Self::Sports(p) => Some(&p.category),
            Self::Internal(_) | Self::External(_) => None,
        }
    }

    /// Internal product id; external entries cannot be added to the cart.
    #[must_use]
    pub const fn product_id(&self) -> Option<ProductId> {
        match self {
            Self::Internal(p) => Some(p.id),
            Self::External(_) | Self::Sports(_) => None,
        }
    }

    /// Link to the partner site for external entries.
    #[must_use]
    pub fn external_url(&self) -> Option<&str> {
        match self {
            Self::Internal(_) => None,
            Self::External(p) => Some(&p.external_url),
            Self::Sports(p) => Some(&p.external_product_url),
        }
    }
}

/// Store category filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StoreCategory {
    GymEquipment,
    RunningGear,
    SportsApparel,
    Supplements,
    Equipment,
}

impl StoreCategory {
    /// Slug used by the sports catalog.
    #[must_use]
    pub const fn slug(&self) -> &'static str {
        match self {
            Self::GymEquipment => "gym-equipment",
            Self::RunningGear => "running-gear",
            Self::SportsApparel => "sports-apparel",
            Self::Supplements => "supplements",
            Self::Equipment => "equipment",
        }
    }

    fn matches(self, entry: &CatalogEntry) -> bool {
        if entry.category() == Some(self.slug()) {
            return true;
        }
        let name = entry.name().to_lowercase();
        match self {
            Self::GymEquipment => name.contains("gym") || name.contains("equipment"),
            Self::RunningGear => name.contains("run"),
            Self::SportsApparel => name.contains("apparel") || name.contains("clothing"),
            Self::Supplements => name.contains("supplement") || name.contains("protein"),
            Self::Equipment => !name.contains("supplement"),
        }
    }
}

impl std::str::FromStr for StoreCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gym-equipment" => Ok(Self::GymEquipment),
            "running-gear" => Ok(Self::RunningGear),
            "sports-apparel" => Ok(Self::SportsApparel),
            "supplements" => Ok(Self::Supplements),
            "equipment" => Ok(Self::Equipment),
            _ => Err(format!("invalid store category: {s}")),
        }
    }
}

/// Filters applied to the merged store listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreFilter {
    /// `None` means all categories.
    pub category: Option<StoreCategory>,
    /// Inclusive price ceiling.
    pub max_price: Option<Price>,
}

impl StoreFilter {
    /// Whether an entry passes both the category and price filters.
    #[must_use]
    pub fn matches(&self, entry: &CatalogEntry) -> bool {
        let category_ok = self.category.is_none_or(|c| c.matches(entry));
        let price_ok = self.max_price.is_none_or(|max| entry.price() <= max);
        category_ok && price_ok
    }

    /// Merge the three product sources and keep entries passing the filter.
    ///
    /// Order is internal, then general external, then sports.
    #[must_use]
    pub fn apply(
        &self,
        internal: Vec<Product>,
        external: Vec<ExternalProduct>,
        sports: Vec<ExternalSportsProduct>,
    ) -> Vec<CatalogEntry> {
        internal
            .into_iter()
            .map(CatalogEntry::Internal)
            .chain(external.into_iter().map(CatalogEntry::External))
            .chain(sports.into_iter().map(CatalogEntry::Sports))
            .filter(|entry| self.matches(entry))
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product(id: u64, name: &str, price: u64) -> Product {
        Product {
            id: ProductId::new(id),
            name: name.to_string(),
            description: String::new(),
            price,
            quantity: 5,
            image: None,
            is_internal: true,
        }
    }

    fn sports(name: &str, category: &str, price: f64) -> ExternalSportsProduct {
        ExternalSportsProduct {
            id: name.to_lowercase(),
            name: name.to_string(),
            description: "Built for athletes".to_string(),
            price: Price::from_f64_lossy(price),
            image_url: String::new(),
            category: category.to_string(),
            external_product_url: String::new(),
        }
    }

    #[test]
    fn test_catalog_entry_dispatches_on_source() {
        let entry = CatalogEntry::Sports(sports("Olympic Barbell", "gym-equipment", 449.99));
        assert_eq!(entry.source(), CatalogSource::Sports);
        assert_eq!(entry.category(), Some("gym-equipment"));
        assert_eq!(entry.product_id(), None);

        let entry = CatalogEntry::Internal(product(3, "Protein Bar", 4));
        assert_eq!(entry.product_id(), Some(ProductId::new(3)));
        assert_eq!(entry.price(), Price::from_units(4));
    }

    #[test]
    fn test_filter_by_category_uses_tag_or_name_keywords() {
        let filter = StoreFilter {
            category: Some(StoreCategory::Supplements),
            max_price: None,
        };
        let listing = filter.apply(
            vec![product(1, "Whey Protein Tub", 40), product(2, "Yoga Mat", 20)],
            vec![],
            vec![
                sports("Creatine", "supplements", 29.99),
                sports("Running Shoes", "running-gear", 159.99),
            ],
        );
        let names: Vec<&str> = listing.iter().map(CatalogEntry::name).collect();
        assert_eq!(names, ["Whey Protein Tub", "Creatine"]);
    }

    #[test]
    fn test_filter_by_max_price_is_inclusive() {
        let filter = StoreFilter {
            category: None,
            max_price: Some(Price::from_units(40)),
        };
        let listing = filter.apply(
            vec![product(1, "Kettlebell", 40), product(2, "Treadmill", 900)],
            vec![],
            vec![sports("Hydration Belt", "running-gear", 39.99)],
        );
        assert_eq!(listing.len(), 2);
    }

    #[test]
    fn test_equipment_category_excludes_supplements() {
        let filter = StoreFilter {
            category: Some(StoreCategory::Equipment),
            max_price: None,
        };
        let listing = filter.apply(
            vec![product(1, "Supplement Stack", 60), product(2, "Jump Rope", 10)],
            vec![],
            vec![],
        );
        assert_eq!(listing.len(), 1);
        assert_eq!(listing[0].name(), "Jump Rope");
    }

    #[test]
    fn test_product_details_validation() {
        let mut details = ProductDetails {
            name: "Foam Roller".to_string(),
            description: "Recovery tool".to_string(),
            price: 25,
            quantity: 10,
            image: None,
        };
        assert!(details.validate().is_ok());
        details.price = 0;
        assert_eq!(details.validate().unwrap_err().field, "price");
    }

    #[test]
    fn test_sports_term_match_is_case_insensitive() {
        let item = sports("GPS Running Watch", "running-gear", 349.99);
        assert!(item.matches_term("gps"));
        assert!(item.matches_term("ATHLETES"));
        assert!(item.matches_term("  "));
        assert!(!item.matches_term("barbell"));
    }
}
