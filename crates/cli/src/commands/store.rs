//! Store, cart and order commands.

use std::io::Write;

use fit_amigo_client::{ClientError, FitAmigoClient, QueryState};
use fit_amigo_core::{CatalogSource, Price, ProductId, StoreCategory, StoreFilter};
use rust_decimal::Decimal;

use super::CliError;

const fn source_label(source: CatalogSource) -> &'static str {
    match source {
        CatalogSource::Internal => "store",
        CatalogSource::External => "partner",
        CatalogSource::Sports => "sports",
    }
}

/// Print the merged store listing.
///
/// # Errors
///
/// Returns `CliError::InvalidArgument` for a negative price ceiling, or an
/// I/O error from the writer.
pub async fn listing(
    client: &FitAmigoClient,
    category: Option<StoreCategory>,
    max_price: Option<Decimal>,
    out: &mut impl Write,
) -> Result<(), CliError> {
    if max_price.is_some_and(|max| max.is_sign_negative()) {
        return Err(CliError::InvalidArgument(
            "max price must not be negative".to_string(),
        ));
    }
    let filter = StoreFilter {
        category,
        max_price: max_price.map(Price::new),
    };

    let entries = client.store_listing(filter).await;
    if entries.is_empty() {
        writeln!(out, "No products match.")?;
        return Ok(());
    }
    for entry in &entries {
        writeln!(
            out,
            "{:<8} {:>10}  {}",
            source_label(entry.source()),
            entry.price().to_string(),
            entry.name()
        )?;
    }
    writeln!(out, "{} products", entries.len())?;
    Ok(())
}

/// Print one backend product.
///
/// # Errors
///
/// Returns `CliError::Client` for an unknown id or a failed call.
pub async fn product(
    client: &FitAmigoClient,
    id: ProductId,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let QueryState::Ready(product) = client.product(id).await? else {
        return Err(ClientError::NotReady.into());
    };

    writeln!(out, "{} (#{})", product.name, product.id)?;
    writeln!(out, "{}", product.description)?;
    writeln!(out, "Price: {}", product.unit_price())?;
    if product.in_stock() {
        writeln!(out, "In stock: {}", product.quantity)?;
    } else {
        writeln!(out, "Out of stock")?;
    }
    Ok(())
}

/// Print the caller's cart with totals.
///
/// # Errors
///
/// Returns an I/O error from the writer.
pub async fn cart(client: &FitAmigoClient, out: &mut impl Write) -> Result<(), CliError> {
    let items = client.cart().await;
    if items.is_empty() {
        writeln!(out, "Cart is empty.")?;
        return Ok(());
    }

    for item in &items {
        writeln!(out, "product #{} x{}", item.product_id, item.quantity)?;
    }
    let summary = client.cart_summary().await;
    writeln!(out, "Subtotal: {}", summary.subtotal)?;
    writeln!(out, "Tax:      {}", summary.tax)?;
    writeln!(out, "Total:    {}", summary.total)?;
    if summary.unpriced_lines > 0 {
        writeln!(
            out,
            "{} line(s) could not be priced and are excluded",
            summary.unpriced_lines
        )?;
    }
    Ok(())
}

/// Print the caller's orders.
///
/// # Errors
///
/// Returns an I/O error from the writer.
pub async fn orders(client: &FitAmigoClient, out: &mut impl Write) -> Result<(), CliError> {
    let orders = client.user_orders().await;
    if orders.is_empty() {
        writeln!(out, "No orders yet.")?;
        return Ok(());
    }
    for order in &orders {
        writeln!(
            out,
            "#{:<6} {:<10} {:>3} units  {}  -> {}",
            order.id,
            order.status.label(),
            order.unit_count(),
            order.total_price(),
            order.shipping_address
        )?;
    }
    Ok(())
}
