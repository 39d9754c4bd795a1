//! Catalog browsing.

use kedai_core::Product;
use kedai_storefront::state::Storefront;

use super::CliError;

/// Print every category.
pub async fn categories(storefront: &Storefront) -> Result<(), CliError> {
    let categories = storefront.api().categories().await?;

    for category in &categories {
        println!("{:<26} {:<20} {}", category.id, category.slug, category.name);
    }
    Ok(())
}

/// Print products, filtered by category slug or restricted to featured ones.
pub async fn products(
    storefront: &Storefront,
    category: Option<&str>,
    limit: Option<u32>,
    featured: bool,
) -> Result<(), CliError> {
    let api = storefront.api();
    let products = if featured {
        api.featured_products().await?
    } else if category.is_some() || limit.is_some() {
        api.products_by_category(category, limit).await?
    } else {
        api.products(None).await?
    };

    if products.is_empty() {
        println!("No products found");
    }
    for product in &products {
        print_product(product);
    }
    Ok(())
}

fn print_product(product: &Product) {
    let marker = if product.featured { "*" } else { " " };
    println!(
        "{marker} {:<26} {:<32} {:>14}",
        product.id, product.name, product.price
    );
}
