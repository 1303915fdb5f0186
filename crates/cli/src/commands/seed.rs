//! Seed the database with a demo catalog.
//!
//! Inserts a handful of categories, restaurants with sectioned menus and
//! special offers through the same repositories the API uses, so seeded
//! rows pass the same validation as admin-created ones.

use sqlx::PgPool;
use tracing::info;

use swiftbite_api::db::catalog::{CategoryInput, MenuItemInput, OfferInput, RestaurantInput};
use swiftbite_api::db::{self, CatalogRepository};
use swiftbite_core::{CategoryId, Money};

use super::database_url;

struct DemoRestaurant {
    category: usize,
    name: &'static str,
    description: &'static str,
    address: &'static str,
    delivery_time: &'static str,
    /// Minor units.
    delivery_fee: i64,
    min_order: i64,
    menu: &'static [DemoItem],
    offer: Option<(&'static str, i32)>,
}

struct DemoItem {
    section: &'static str,
    name: &'static str,
    price: i64,
    popular: bool,
}

const fn item(section: &'static str, name: &'static str, price: i64, popular: bool) -> DemoItem {
    DemoItem {
        section,
        name,
        price,
        popular,
    }
}

const CATEGORIES: [(&str, &str); 4] = [
    ("Burgers", "burger"),
    ("Pizza", "pizza"),
    ("Grills", "grill"),
    ("Desserts", "cake"),
];

const RESTAURANTS: &[DemoRestaurant] = &[
    DemoRestaurant {
        category: 0,
        name: "Smash Street",
        description: "Double-smashed burgers and crinkle fries",
        address: "14 Tahrir Square",
        delivery_time: "25-35 min",
        delivery_fee: 1500,
        min_order: 5000,
        menu: &[
            item("Burgers", "Classic Smash", 9500, true),
            item("Burgers", "Mushroom Swiss", 11000, false),
            item("Sides", "Crinkle Fries", 3500, true),
            item("Drinks", "Lemon Mint", 2500, false),
        ],
        offer: Some(("Two smash burgers, one price", 20)),
    },
    DemoRestaurant {
        category: 1,
        name: "Forno Nero",
        description: "Wood-fired Neapolitan pizza",
        address: "3 Corniche Road",
        delivery_time: "35-45 min",
        delivery_fee: 2000,
        min_order: 8000,
        menu: &[
            item("Pizza", "Margherita", 12000, true),
            item("Pizza", "Diavola", 14500, false),
            item("Starters", "Garlic Knots", 4500, false),
        ],
        offer: None,
    },
    DemoRestaurant {
        category: 2,
        name: "Kebab House",
        description: "Charcoal kofta, shish tawook and fresh bread",
        address: "27 Nile Street",
        delivery_time: "30-40 min",
        delivery_fee: 1000,
        min_order: 6000,
        menu: &[
            item("Grills", "Kofta Plate", 13000, true),
            item("Grills", "Shish Tawook", 12500, true),
            item("Sides", "Tahini Salad", 2000, false),
            item("Sides", "Baladi Bread", 500, false),
        ],
        offer: Some(("Free delivery on family platters", 15)),
    },
    DemoRestaurant {
        category: 3,
        name: "Sugar Loaf",
        description: "Kunafa, basbousa and soft-serve",
        address: "9 Garden City Lane",
        delivery_time: "20-30 min",
        delivery_fee: 1000,
        min_order: 3000,
        menu: &[
            item("Sweets", "Cream Kunafa", 7000, true),
            item("Sweets", "Basbousa", 4000, false),
            item("Ice Cream", "Mango Soft-Serve", 3500, false),
        ],
        offer: None,
    },
];

/// Seed the demo catalog.
///
/// Skips seeding when restaurants already exist unless `force` is set.
///
/// # Errors
///
/// Returns an error if the database URL is missing or an insert fails.
pub async fn demo_catalog(force: bool) -> Result<(), Box<dyn std::error::Error>> {
    let database_url = database_url()?;
    let pool = db::create_pool(&database_url).await?;
    info!("Connected to database");

    let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM restaurants")
        .fetch_one(&pool)
        .await?;
    if existing > 0 && !force {
        info!(existing, "Restaurants already present, skipping (use --force to seed anyway)");
        return Ok(());
    }

    let counts = seed(&pool).await?;

    info!("Seeding complete!");
    info!("  Categories: {}", counts.categories);
    info!("  Restaurants: {}", counts.restaurants);
    info!("  Menu items: {}", counts.menu_items);
    info!("  Offers: {}", counts.offers);
    Ok(())
}

#[derive(Debug, Default)]
struct SeedCounts {
    categories: usize,
    restaurants: usize,
    menu_items: usize,
    offers: usize,
}

async fn seed(pool: &PgPool) -> Result<SeedCounts, db::RepositoryError> {
    let catalog = CatalogRepository::new(pool);
    let mut counts = SeedCounts::default();

    let mut category_ids: Vec<CategoryId> = Vec::with_capacity(CATEGORIES.len());
    for (sort_order, (name, icon)) in (0..).zip(CATEGORIES) {
        let category = catalog
            .create_category(&CategoryInput {
                name: Some(name.to_string()),
                icon: Some(icon.to_string()),
                sort_order: Some(sort_order),
                is_active: Some(true),
            })
            .await?;
        category_ids.push(category.id);
        counts.categories += 1;
    }

    for demo in RESTAURANTS {
        let restaurant = catalog
            .create_restaurant(&RestaurantInput {
                category_id: category_ids.get(demo.category).copied(),
                name: Some(demo.name.to_string()),
                description: Some(demo.description.to_string()),
                address: Some(demo.address.to_string()),
                delivery_time: Some(demo.delivery_time.to_string()),
                delivery_fee: Some(Money::from_minor(demo.delivery_fee)),
                min_order: Some(Money::from_minor(demo.min_order)),
                is_open: Some(true),
                is_active: Some(true),
                ..RestaurantInput::default()
            })
            .await?;
        counts.restaurants += 1;

        for dish in demo.menu {
            catalog
                .create_menu_item(
                    restaurant.id,
                    &MenuItemInput {
                        name: Some(dish.name.to_string()),
                        price: Some(Money::from_minor(dish.price)),
                        section: Some(dish.section.to_string()),
                        is_available: Some(true),
                        is_popular: Some(dish.popular),
                        ..MenuItemInput::default()
                    },
                )
                .await?;
            counts.menu_items += 1;
        }

        if let Some((title, discount)) = demo.offer {
            catalog
                .create_offer(&OfferInput {
                    restaurant_id: Some(restaurant.id),
                    title: Some(title.to_string()),
                    discount_percent: Some(discount),
                    is_active: Some(true),
                    ..OfferInput::default()
                })
                .await?;
            counts.offers += 1;
        }

        info!(restaurant = demo.name, "Seeded restaurant");
    }

    Ok(counts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_restaurants_reference_known_categories() {
        for demo in RESTAURANTS {
            assert!(demo.category < CATEGORIES.len(), "{}", demo.name);
            assert!(!demo.menu.is_empty(), "{}", demo.name);
        }
    }

    #[test]
    fn demo_offers_are_valid_percentages() {
        for (_, discount) in RESTAURANTS.iter().filter_map(|r| r.offer) {
            assert!((0..=100).contains(&discount));
        }
    }

    #[test]
    fn demo_prices_are_positive() {
        for dish in RESTAURANTS.iter().flat_map(|r| r.menu) {
            assert!(dish.price > 0, "{}", dish.name);
        }
    }
}
