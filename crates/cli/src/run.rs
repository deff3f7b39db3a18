use std::fs;

use console::style;
use kirana_core::api::{StorefrontState, start_storefront};
use kirana_core::db::DbManager;
use kirana_driver_payu::MerchantCredentials;
use kirana_types::Product;

use crate::Context;

#[derive(Debug, Clone, PartialEq, clap::Args)]
pub struct RunCommand {
    /// Port to run the server on (overrides the manifest)
    #[arg(long)]
    pub port: Option<u16>,
}

impl RunCommand {
    pub async fn execute(&self, ctx: &Context) -> Result<(), String> {
        println!();
        println!("{}{}", style("Kira").white(), style("na").green());
        if let Some(ref name) = ctx.manifest.name {
            println!("{}", style(name).dim());
        }
        println!("{}", style("Starting storefront server").dim());
        println!();

        // Load products from the catalog directory
        let catalog_dir = ctx.manifest_dir.join(&ctx.manifest.catalog.path);

        if !catalog_dir.exists() {
            return Err(format!(
                "Catalog directory not found: {}\nRun 'kirana init' first",
                catalog_dir.display()
            ));
        }

        print!("{} ", style("Loading products").dim());

        let mut products = Vec::new();
        let entries = fs::read_dir(&catalog_dir)
            .map_err(|e| format!("Failed to read catalog directory: {}", e))?;

        for entry in entries {
            let entry = entry.map_err(|e| format!("Failed to read directory entry: {}", e))?;
            let path = entry.path();

            if path.extension().and_then(|s| s.to_str()) == Some("yaml") {
                let content = fs::read_to_string(&path)
                    .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;

                match serde_yml::from_str::<Product>(&content) {
                    Ok(product) => {
                        products.push(product);
                    }
                    Err(e) => {
                        eprintln!(
                            "\n{} Failed to parse {}: {}",
                            style("✗").red(),
                            path.display(),
                            e
                        );
                        eprintln!("  {}", style("Skipping this file").dim());
                    }
                }
            }
        }

        if products.is_empty() {
            return Err("No products found in catalog directory".to_string());
        }

        println!(
            "{}",
            style(format!("✓ {} products", products.len())).green()
        );

        // Resolve gateway credentials. The salt only ever comes from the
        // environment and is not printed anywhere.
        let merchant_key = ctx.manifest.merchant_key().ok_or_else(|| {
            "Merchant key not found. Set gateway.merchant_key in storefront.yaml or the PAYU_MERCHANT_KEY environment variable (or run 'kirana init').".to_string()
        })?;
        let merchant_salt = ctx.manifest.merchant_salt()?;
        let credentials = MerchantCredentials::new(merchant_key, merchant_salt);

        let config = ctx.manifest.storefront_config()?;

        let port = self.port.unwrap_or(ctx.manifest.server.port);
        let database_path = ctx.manifest_dir.join(&ctx.manifest.server.database);

        println!();
        println!("{} {}", style("Port").dim(), port);
        println!("{} {}", style("Database").dim(), database_path.display());
        println!("{} {}", style("Gateway").dim(), config.gateway_base_url);
        println!();

        println!("{}", style("Endpoints").dim());
        println!("  GET  http://localhost:{}/v1/products", port);
        println!("  GET  http://localhost:{}/v1/products/{{id}}", port);
        println!("  POST http://localhost:{}/v1/orders", port);
        println!("  GET  http://localhost:{}/v1/orders", port);
        println!("  GET  http://localhost:{}/v1/orders/{{id}}", port);
        println!("  POST http://localhost:{}/v1/payments/initiate", port);
        println!("  POST http://localhost:{}/v1/payments/callback", port);
        println!("  GET  http://localhost:{}/health", port);
        println!();

        println!(
            "{}",
            style(format!(
                "Gateway callbacks post to {}",
                config.callback_url()
            ))
            .dim()
        );
        println!();
        println!("{}", style("Press Ctrl+C to stop").dim());
        println!();

        // Initialize tracing
        tracing_subscriber::fmt::init();

        let db = DbManager::open(&database_path.to_string_lossy())
            .map_err(|e| format!("Failed to open database: {}", e))?;

        let state = StorefrontState::new(products, db, credentials, config);

        // Start the server
        start_storefront(state, port)
            .await
            .map_err(|e| format!("Failed to start server: {}", e))?;

        Ok(())
    }
}
