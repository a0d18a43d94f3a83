//! Cart commands.

use clap::Subcommand;
use shopfront_storefront::AppError;
use shopfront_storefront::checkout::{OrderSummary, ShippingMethod};

use super::{Context, fetch_product, product_id};

#[derive(Debug, Subcommand)]
pub enum CartAction {
    /// Show cart lines and the order summary
    Show {
        /// standard, express or overnight
        #[arg(long, default_value = "standard")]
        shipping: String,
    },
    /// Add a product to the cart
    Add {
        /// Product id
        id: String,
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
        /// Also add the line to the server-side cart
        #[arg(long)]
        sync: bool,
    },
    /// Set a line's quantity; zero or less removes it
    Update {
        /// Product id
        id: String,
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Remove a line
    Remove {
        /// Product id
        id: String,
    },
    /// Empty the cart
    Clear,
}

pub async fn run(ctx: &mut Context, action: CartAction) -> Result<(), AppError> {
    match action {
        CartAction::Show { shipping } => show(ctx, ShippingMethod::parse(&shipping)),
        CartAction::Add { id, quantity, sync } => {
            let id = product_id(&id)?;
            let product = fetch_product(ctx, &id).await?;
            if !product.in_stock() {
                println!("Note: {} is currently out of stock", product.name);
            }
            ctx.cart.add_to_cart(&product, quantity);
            if sync && quantity > 0 {
                ctx.client.add_cart_item(&id, quantity).await?;
            }
        }
        CartAction::Update { id, quantity } => {
            let id = product_id(&id)?;
            ctx.cart.update_quantity(&id, quantity);
        }
        CartAction::Remove { id } => {
            let id = product_id(&id)?;
            ctx.cart.remove_from_cart(&id);
        }
        CartAction::Clear => ctx.cart.clear_cart(),
    }
    Ok(())
}

fn show(ctx: &Context, method: ShippingMethod) {
    if ctx.cart.is_empty() {
        println!("Your cart is empty.");
        return;
    }

    for item in ctx.cart.items() {
        println!(
            "{:<8} {:<40} {:>4} x {:>10} = {:>10}",
            item.product.id,
            item.product.name,
            item.quantity,
            item.product.price.to_string(),
            item.line_total().to_string(),
        );
    }

    let summary = OrderSummary::for_cart(&ctx.cart, method);
    println!("\n{} items", ctx.cart.total_items());
    println!("Subtotal: {}", summary.subtotal);
    println!("Tax:      {}", summary.tax);
    if summary.shipping.is_zero() {
        println!("Shipping: Free ({})", method.label());
    } else {
        println!("Shipping: {} ({})", summary.shipping, method.label());
    }
    println!("Total:    {}", summary.total);
    if let Some(remaining) = summary.free_shipping_remaining {
        println!("Add {remaining} more for free standard shipping");
    }
}
