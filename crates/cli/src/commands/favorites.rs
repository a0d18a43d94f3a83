//! Favorites commands.

use clap::Subcommand;
use shopfront_storefront::AppError;

use super::{Context, fetch_product, product_id, product_line};

#[derive(Debug, Subcommand)]
pub enum FavoritesAction {
    /// List liked products
    List,
    /// Like or unlike a product
    Toggle {
        /// Product id
        id: String,
    },
    /// Remove every favorite
    Clear,
}

pub async fn run(ctx: &mut Context, action: FavoritesAction) -> Result<(), AppError> {
    match action {
        FavoritesAction::List => {
            if ctx.favorites.favorites_count() == 0 {
                println!("You have no favorites yet.");
            }
            for product in ctx.favorites.favorites() {
                println!("{}", product_line(product, None));
            }
        }
        FavoritesAction::Toggle { id } => {
            let id = product_id(&id)?;
            // Unliking must work even if the product left the catalog.
            if ctx.favorites.is_favorite(&id) {
                ctx.favorites.remove_from_favorites(&id);
            } else {
                let product = fetch_product(ctx, &id).await?;
                ctx.favorites.toggle_favorite(&product);
            }
        }
        FavoritesAction::Clear => ctx.favorites.clear_favorites(),
    }
    Ok(())
}
