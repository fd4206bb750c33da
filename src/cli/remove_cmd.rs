//! `pricewatch remove <id>` — stop monitoring and delete history.

use crate::cli::output::{self, Styled};
use crate::config::Settings;
use crate::db::Database;
use anyhow::{bail, Result};
use std::io::Write;

pub async fn run(settings: &Settings, product_id: i64, yes: bool) -> Result<()> {
    let db = Database::open(&settings.db_path)?;

    let Some(product) = db.product_by_id(product_id)? else {
        bail!("product with ID {product_id} not found");
    };

    if !yes && !output::is_json() {
        println!("  Product: {}", product.title.as_deref().unwrap_or("--"));
        print!("  Remove this product and all its history? (y/N): ");
        std::io::stdout().flush()?;

        let mut answer = String::new();
        std::io::stdin().read_line(&mut answer)?;
        if !answer.trim().eq_ignore_ascii_case("y") {
            println!("  Cancelled.");
            return Ok(());
        }
    }

    db.delete_product(product_id)?;

    if output::is_json() {
        output::print_json(&serde_json::json!({ "removed": product_id }));
    } else {
        let s = Styled::new();
        println!("  {} Product removed.", s.ok_sym());
    }

    Ok(())
}
