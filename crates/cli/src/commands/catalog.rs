//! Catalog browsing commands.

use std::collections::BTreeSet;

use clap::Args;
use rust_decimal::Decimal;
use shopfront_core::{FilterOptions, Price, SortKey, catalog::DEFAULT_MAX_PRICE};
use shopfront_storefront::AppError;
use shopfront_storefront::api::NewReview;
use shopfront_storefront::cards::{CardScope, CatalogState, load_product_detail};

use super::{Context, product_id, product_line};

#[derive(Debug, Args)]
pub struct ProductsArgs {
    /// Only show these categories (repeatable)
    #[arg(short, long = "category")]
    categories: Vec<String>,

    /// Lowest price, inclusive
    #[arg(long, default_value = "0")]
    min_price: Decimal,

    /// Highest price, inclusive
    #[arg(long, default_value_t = Decimal::from(DEFAULT_MAX_PRICE))]
    max_price: Decimal,

    /// Minimum average rating
    #[arg(long, default_value_t = 0.0)]
    min_rating: f64,

    /// Hide products without stock
    #[arg(long)]
    in_stock: bool,

    /// featured, price-low, price-high, rating or name
    #[arg(short, long, default_value = "featured")]
    sort: String,

    /// Case-insensitive search over name and description
    #[arg(short = 'q', long, default_value = "")]
    search: String,

    /// Also fetch live stock, reviews and category names per product
    #[arg(long)]
    details: bool,
}

impl ProductsArgs {
    fn filter_options(&self) -> Result<FilterOptions, AppError> {
        let price = |d: Decimal| Price::new(d).map_err(|e| AppError::BadRequest(e.to_string()));
        Ok(FilterOptions {
            categories: self.categories.iter().cloned().collect::<BTreeSet<_>>(),
            price_range: (price(self.min_price)?, price(self.max_price)?),
            min_rating: self.min_rating,
            in_stock_only: self.in_stock,
        })
    }
}

#[derive(Debug, Args)]
pub struct ReviewArgs {
    /// Product id
    id: String,

    /// Your display name
    #[arg(short, long)]
    name: String,

    /// Rating from 1 to 5
    #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=5))]
    rating: u8,

    /// Review text
    #[arg(short, long)]
    comment: String,
}

pub async fn products(ctx: &Context, args: ProductsArgs) -> Result<(), AppError> {
    let options = args.filter_options()?;
    let sort = SortKey::parse(&args.sort);

    let state = CatalogState::Ready(ctx.client.products().await?);

    let visible = state
        .visible(&options, sort, &args.search)
        .unwrap_or_default();
    if visible.is_empty() {
        println!("No products match your filters.");
        return Ok(());
    }

    println!("{} of {} products ({})", visible.len(), state.products().len(), sort.label());

    if !args.details {
        for product in &visible {
            println!("{}", product_line(product, None));
        }
        return Ok(());
    }

    let scope = CardScope::new();
    let handles: Vec<_> = visible
        .iter()
        .map(|p| scope.spawn(ctx.client.clone(), p.clone()))
        .collect();
    for (product, handle) in visible.iter().zip(handles) {
        let details = handle.await.ok().flatten();
        println!("{}", product_line(product, details.as_ref()));
    }
    Ok(())
}

pub async fn product(ctx: &Context, raw_id: &str) -> Result<(), AppError> {
    let id = product_id(raw_id)?;
    let detail = load_product_detail(&ctx.client, &id).await.map_err(|e| {
        if e.is_not_found() {
            AppError::NotFound(format!("product {id}"))
        } else {
            AppError::Api(e)
        }
    })?;
    let product = &detail.product;

    println!("{} ({})", product.name, detail.category_label);
    println!("{}", product.price);
    if let Some(original) = product.original_price.filter(|_| product.is_on_sale()) {
        println!("Was {original}");
    }
    println!("Stock: {}", product.stock_status().label());
    if ctx.favorites.is_favorite(&product.id) {
        println!("In your favorites");
    }
    if !product.description.is_empty() {
        println!("\n{}", product.description);
    }
    for feature in &product.features {
        println!("  - {feature}");
    }

    println!(
        "\n{} reviews, average {:.2}",
        detail.stats.count, detail.stats.average
    );
    for review in &detail.reviews {
        let verified = if review.verified { " (verified)" } else { "" };
        println!("  {:.1}★ {}{verified}: {}", review.rating, review.user_name, review.comment);
    }
    Ok(())
}

pub async fn categories(ctx: &Context) -> Result<(), AppError> {
    for name in ctx.client.categories().await? {
        println!("{name}");
    }
    Ok(())
}

pub async fn review(ctx: &Context, args: ReviewArgs) -> Result<(), AppError> {
    let id = product_id(&args.id)?;
    if args.comment.trim().is_empty() {
        return Err(AppError::BadRequest("review comment cannot be empty".to_string()));
    }

    let review = NewReview {
        product_id: id.to_string(),
        user_name: args.name,
        rating: args.rating,
        comment: args.comment,
    };
    ctx.client.submit_review(&review).await?;
    println!("Thanks for reviewing product {id}!");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        args: ProductsArgs,
    }

    #[test]
    fn test_default_filters_match_clear_all() {
        let harness = Harness::try_parse_from(["products"]).unwrap();
        assert_eq!(harness.args.filter_options().unwrap(), FilterOptions::default());
    }

    #[test]
    fn test_negative_price_is_rejected() {
        let harness =
            Harness::try_parse_from(["products", "--min-price=-5"]).unwrap();
        assert!(harness.args.filter_options().is_err());
    }

    #[test]
    fn test_repeated_categories() {
        let harness =
            Harness::try_parse_from(["products", "-c", "Audio", "-c", "Mobile"]).unwrap();
        let options = harness.args.filter_options().unwrap();
        assert_eq!(options.categories.len(), 2);
    }
}
