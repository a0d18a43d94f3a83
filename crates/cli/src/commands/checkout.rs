//! Checkout command.

use clap::Args;
use shopfront_storefront::AppError;
use shopfront_storefront::checkout::{CheckoutError, ShippingDetails, ShippingMethod, place_order};

use super::Context;

#[derive(Debug, Args)]
pub struct CheckoutArgs {
    #[arg(long)]
    first_name: String,
    #[arg(long)]
    last_name: String,
    #[arg(long)]
    email: String,
    #[arg(long, default_value = "")]
    phone: String,
    #[arg(long)]
    address: String,
    #[arg(long)]
    city: String,
    #[arg(long)]
    state: String,
    #[arg(long)]
    zip: String,
    #[arg(long, default_value = "US")]
    country: String,
    /// standard, express or overnight
    #[arg(long, default_value = "standard")]
    shipping: String,
}

impl From<CheckoutArgs> for ShippingDetails {
    fn from(args: CheckoutArgs) -> Self {
        Self {
            first_name: args.first_name,
            last_name: args.last_name,
            email: args.email,
            phone: args.phone,
            address: args.address,
            city: args.city,
            state: args.state,
            zip: args.zip,
            country: args.country,
        }
    }
}

pub async fn run(ctx: &mut Context, args: CheckoutArgs) -> Result<(), AppError> {
    let method = ShippingMethod::parse(&args.shipping);
    let details = ShippingDetails::from(args);

    let receipt = match place_order(&ctx.client, &mut ctx.cart, &details, method).await {
        Ok(receipt) => receipt,
        Err(CheckoutError::EmptyCart) => {
            println!("Your cart is empty.");
            return Ok(());
        }
        Err(e @ (CheckoutError::InvalidField(_) | CheckoutError::InvalidEmail(_))) => {
            return Err(AppError::BadRequest(e.to_string()));
        }
        Err(e) => return Err(e.into()),
    };

    println!("Order reference: {}", receipt.reference);
    if let Some(order_id) = &receipt.order_id {
        println!("Order number:    {order_id}");
    }
    println!("Total charged:   {}", receipt.summary.total);
    Ok(())
}
