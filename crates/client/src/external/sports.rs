//! Built-in sports partner catalog.

use fit_amigo_core::{ExternalSportsProduct, Price};
use rust_decimal::Decimal;

/// Category slugs used by the sports catalog.
pub const SPORTS_CATEGORIES: [&str; 4] =
    ["gym-equipment", "running-gear", "sports-apparel", "supplements"];

const SHOP_BASE: &str = "https://workoutpuppy.com/products";

// (id, name, description, price in cents, image, category, slug)
type Row = (&'static str, &'static str, &'static str, i64, &'static str, &'static str, &'static str);

const GYM_IMAGE: &str = "/assets/generated/product-gym-equipment.dim_400x400.png";
const SHOES_IMAGE: &str = "/assets/generated/product-running-shoes.dim_400x400.png";
const APPAREL_IMAGE: &str = "/assets/generated/product-apparel.dim_400x400.png";
const SUPPLEMENTS_IMAGE: &str = "/assets/generated/product-supplements.dim_400x400.png";

const CATALOG: [Row; 16] = [
    (
        "gym-1",
        "Adjustable Dumbbell Set",
        "Professional grade adjustable dumbbells with quick-change weight system. Perfect for home workouts.",
        29999,
        GYM_IMAGE,
        "gym-equipment",
        "adjustable-dumbbells",
    ),
    (
        "gym-2",
        "Olympic Barbell Set",
        "Heavy-duty Olympic barbell with weight plates. Built to last for serious strength training.",
        44999,
        GYM_IMAGE,
        "gym-equipment",
        "olympic-barbell",
    ),
    (
        "gym-3",
        "Power Rack Station",
        "Complete power rack with pull-up bar and safety catches. Essential for home gym setup.",
        79999,
        GYM_IMAGE,
        "gym-equipment",
        "power-rack",
    ),
    (
        "gym-4",
        "Resistance Band Set",
        "Premium resistance bands with multiple resistance levels. Great for mobility and strength work.",
        4999,
        GYM_IMAGE,
        "gym-equipment",
        "resistance-bands",
    ),
    (
        "run-1",
        "Performance Running Shoes",
        "Lightweight running shoes with responsive cushioning. Engineered for speed and comfort.",
        15999,
        SHOES_IMAGE,
        "running-gear",
        "running-shoes",
    ),
    (
        "run-2",
        "GPS Running Watch",
        "Advanced GPS watch with heart rate monitoring and training metrics. Track every run.",
        34999,
        SHOES_IMAGE,
        "running-gear",
        "gps-watch",
    ),
    (
        "run-3",
        "Hydration Running Belt",
        "Comfortable running belt with water bottle holders. Stay hydrated on long runs.",
        3999,
        SHOES_IMAGE,
        "running-gear",
        "hydration-belt",
    ),
    (
        "run-4",
        "Reflective Running Vest",
        "High-visibility vest for safe night running. Lightweight and breathable design.",
        2999,
        SHOES_IMAGE,
        "running-gear",
        "reflective-vest",
    ),
    (
        "apparel-1",
        "Performance Training Shirt",
        "Moisture-wicking training shirt with anti-odor technology. Keeps you cool and dry.",
        4499,
        APPAREL_IMAGE,
        "sports-apparel",
        "training-shirt",
    ),
    (
        "apparel-2",
        "Compression Leggings",
        "High-performance compression leggings for enhanced muscle support and recovery.",
        6999,
        APPAREL_IMAGE,
        "sports-apparel",
        "compression-leggings",
    ),
    (
        "apparel-3",
        "Training Shorts",
        "Lightweight training shorts with built-in liner. Perfect for any workout.",
        3999,
        APPAREL_IMAGE,
        "sports-apparel",
        "training-shorts",
    ),
    (
        "apparel-4",
        "Sports Hoodie",
        "Comfortable sports hoodie for warm-ups and cool-downs. Soft fleece interior.",
        7999,
        APPAREL_IMAGE,
        "sports-apparel",
        "sports-hoodie",
    ),
    (
        "supp-1",
        "Whey Protein Powder",
        "Premium whey protein isolate with 25g protein per serving. Supports muscle growth.",
        5999,
        SUPPLEMENTS_IMAGE,
        "supplements",
        "whey-protein",
    ),
    (
        "supp-2",
        "Pre-Workout Energy",
        "Advanced pre-workout formula for explosive energy and focus. Zero sugar.",
        4499,
        SUPPLEMENTS_IMAGE,
        "supplements",
        "pre-workout",
    ),
    (
        "supp-3",
        "BCAA Recovery",
        "Branch chain amino acids for faster recovery and reduced muscle soreness.",
        3999,
        SUPPLEMENTS_IMAGE,
        "supplements",
        "bcaa",
    ),
    (
        "supp-4",
        "Creatine Monohydrate",
        "Pure creatine monohydrate for increased strength and power output.",
        2999,
        SUPPLEMENTS_IMAGE,
        "supplements",
        "creatine",
    ),
];

/// The full catalog.
#[must_use]
pub fn catalog() -> Vec<ExternalSportsProduct> {
    CATALOG
        .iter()
        .map(
            |&(id, name, description, cents, image, category, slug)| ExternalSportsProduct {
                id: id.to_string(),
                name: name.to_string(),
                description: description.to_string(),
                price: Price::new(Decimal::new(cents, 2)),
                image_url: image.to_string(),
                category: category.to_string(),
                external_product_url: format!("{SHOP_BASE}/{slug}"),
            },
        )
        .collect()
}

/// Catalog entries in `category` (exact) matching `term` (case-insensitive).
///
/// A missing category or a blank term does not filter.
#[must_use]
pub fn filter(
    products: Vec<ExternalSportsProduct>,
    category: Option<&str>,
    term: Option<&str>,
) -> Vec<ExternalSportsProduct> {
    products
        .into_iter()
        .filter(|p| category.is_none_or(|c| p.category == c))
        .filter(|p| term.is_none_or(|t| p.matches_term(t)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_shape() {
        let products = catalog();
        assert_eq!(products.len(), 16);
        for category in SPORTS_CATEGORIES {
            assert_eq!(products.iter().filter(|p| p.category == category).count(), 4);
        }
        let watch = products.iter().find(|p| p.id == "run-2");
        assert_eq!(
            watch.map(|p| p.external_product_url.as_str()),
            Some("https://workoutpuppy.com/products/gps-watch")
        );
    }

    #[test]
    fn test_filter_by_category_and_term() {
        let supplements = filter(catalog(), Some("supplements"), None);
        assert_eq!(supplements.len(), 4);

        let protein = filter(catalog(), Some("supplements"), Some("PROTEIN"));
        assert_eq!(protein.len(), 1);

        // "recovery" appears in a legging and a supplement description.
        let recovery = filter(catalog(), None, Some("recovery"));
        assert_eq!(recovery.len(), 2);

        assert_eq!(filter(catalog(), None, Some("   ")).len(), 16);
        assert!(filter(catalog(), Some("yoga"), None).is_empty());
    }
}
