//! Seed the catalog from a YAML file.
//!
//! ```yaml
//! products:
//!   - name: Classic Tee
//!     price: "25.00"
//!     description: Heavyweight cotton
//!     img: /img/classic-tee.jpg
//! ```
//!
//! The whole file is validated before the database is touched.

use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{error, info};

use yr_shop_core::Price;
use yr_shop_storefront::db::{self, NewProduct, ProductRepository};

/// Top-level structure of a seed file.
#[derive(Debug, Deserialize)]
pub struct CatalogSeed {
    pub products: Vec<SeedProduct>,
}

/// One product entry.
#[derive(Debug, Deserialize)]
pub struct SeedProduct {
    pub name: String,
    pub price: Decimal,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub img: Option<String>,
}

/// Check every entry and convert the valid ones.
///
/// Returns all problems at once so a bad file can be fixed in one pass.
pub fn validate(seed: &CatalogSeed) -> Result<Vec<NewProduct>, Vec<String>> {
    let mut products = Vec::with_capacity(seed.products.len());
    let mut errors = Vec::new();

    for (index, entry) in seed.products.iter().enumerate() {
        let position = index + 1;
        let name = entry.name.trim();
        if name.is_empty() {
            errors.push(format!("product #{position}: name is empty"));
            continue;
        }

        match Price::new(entry.price) {
            Ok(price) => products.push(NewProduct {
                name: name.to_owned(),
                price,
                description: non_blank(entry.description.as_deref()),
                image: non_blank(entry.img.as_deref()),
            }),
            Err(e) => errors.push(format!("product #{position} ({name}): {e}")),
        }
    }

    if errors.is_empty() {
        Ok(products)
    } else {
        Err(errors)
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_owned)
}

/// Insert catalog products from a YAML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, any entry is
/// invalid, or an insert fails.
pub async fn products(file_path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let path = Path::new(file_path);
    if !path.exists() {
        return Err(format!("File not found: {file_path}").into());
    }

    info!(path = %file_path, "Loading catalog seed");

    let content = tokio::fs::read_to_string(path).await?;
    let seed: CatalogSeed = serde_yaml::from_str(&content)?;

    let products = match validate(&seed) {
        Ok(products) => products,
        Err(errors) => {
            error!("Seed validation failed:");
            for err in &errors {
                error!("  - {err}");
            }
            return Err(format!("{} validation errors found", errors.len()).into());
        }
    };

    let database_url = super::database_url()?;
    let pool = db::create_pool(&database_url).await?;
    info!("Connected to database");

    let repo = ProductRepository::new(&pool);
    for product in &products {
        let inserted = repo.insert(product).await?;
        info!(id = %inserted.id, name = %inserted.name, price = %inserted.price, "Product inserted");
    }

    info!(count = products.len(), "Catalog seeding complete");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn parse(yaml: &str) -> CatalogSeed {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_validate_accepts_minimal_entries() {
        let seed = parse(
            r#"
products:
  - name: "  Classic Tee "
    price: "25.00"
  - name: Cap
    price: "12.5"
    description: ""
    img: /img/cap.jpg
"#,
        );

        let products = validate(&seed).unwrap();
        assert_eq!(products.len(), 2);
        assert_eq!(products[0].name, "Classic Tee");
        assert_eq!(products[0].price, Price::from_cents(2500).unwrap());
        assert_eq!(products[1].description, None);
        assert_eq!(products[1].image.as_deref(), Some("/img/cap.jpg"));
    }

    #[test]
    fn test_validate_reports_every_problem() {
        let seed = parse(
            r#"
products:
  - name: ""
    price: "1.00"
  - name: Refund
    price: "-3.00"
  - name: Fine
    price: "3.00"
"#,
        );

        let errors = validate(&seed).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors[0].contains("#1"));
        assert!(errors[1].contains("Refund"));
    }

    #[test]
    fn test_shipped_seed_file_is_valid() {
        let content = include_str!("../../seeds/products.yaml");
        let seed: CatalogSeed = serde_yaml::from_str(content).unwrap();
        assert!(!validate(&seed).unwrap().is_empty());
    }
}
