use std::{fs, path::Path};

use console::style;
use dialoguer::{Input, Password, theme::ColorfulTheme};

use crate::{Context, manifest::Manifest};

#[derive(Debug, Clone, PartialEq, clap::Args)]
pub struct InitCommand {}

impl InitCommand {
    pub async fn execute(&self, ctx: &Context) -> Result<(), String> {
        println!(
            "{}{} {}\n",
            style("Kira"),
            style("na").green(),
            style("sets up a local storefront backed by your payment gateway.").dim()
        );

        // Step 1: Store name, shown in the startup banner
        let store_name: String = Input::with_theme(&ColorfulTheme::default())
            .with_prompt("Store name")
            .default("My Store".to_string())
            .interact_text()
            .map_err(|e| format!("Failed to get store name: {}", e))?;

        // Step 2: Merchant key. This is the public half of the credentials
        // and is embedded in every checkout form.
        println!("\nFind your credentials in the PayU dashboard under Settings > API Keys\n");

        let merchant_key: String = Input::with_theme(&ColorfulTheme::default())
            .with_prompt("Merchant key")
            .validate_with(|input: &String| -> Result<(), &str> {
                if input.trim().is_empty() {
                    Err("Merchant key cannot be empty")
                } else {
                    Ok(())
                }
            })
            .interact_text()
            .map_err(|e| format!("Failed to get merchant key: {}", e))?;

        // Step 3: Merchant salt (optional - leave empty to fill in .env later)
        let merchant_salt: Option<String> = Password::with_theme(&ColorfulTheme::default())
            .with_prompt("Merchant salt [press Enter to skip]")
            .allow_empty_password(true)
            .interact()
            .map_err(|e| format!("Failed to get merchant salt: {}", e))
            .map(|s| if s.is_empty() { None } else { Some(s) })?;

        // Save configuration
        let env_path = ctx.manifest_dir.join(".env");
        save_env_file(&env_path, &merchant_key, merchant_salt.as_deref())?;
        println!(
            "{} {} ./.env",
            style("✔").green(),
            style("Credentials saved to").dim()
        );

        let manifest_yaml_path = ctx.manifest_dir.join(kirana_types::MANIFEST_FILE_NAME);
        if !manifest_yaml_path.exists() {
            let mut manifest = Manifest::default();
            manifest.name = Some(store_name);
            manifest.save(&manifest_yaml_path)?;
            println!(
                "{} {} ./{}",
                style("✔").green(),
                style("Manifest saved to").dim(),
                kirana_types::MANIFEST_FILE_NAME
            );
        }

        // Create the catalog directory with a sample product
        let catalog_path = ctx.manifest_dir.join("catalog/v1");

        if !catalog_path.exists() {
            fs::create_dir_all(&catalog_path)
                .map_err(|e| format!("Failed to create catalog directory: {}", e))?;
        }

        let sample_path = catalog_path.join("masala-chai.yaml");
        if !sample_path.exists() {
            save_sample_product(&sample_path)?;
            println!(
                "{} {} ./catalog/v1/masala-chai.yaml",
                style("✔").green(),
                style("Sample product saved to").dim()
            );
        }

        if merchant_salt.is_none() {
            println!(
                "\n{} Merchant salt skipped. Set PAYU_MERCHANT_SALT in ./.env before running the server.",
                style("⚠").yellow()
            );
        }

        println!(
            "\n{}: Edit YAML files in catalog/ and run 'kirana run'",
            style("Next steps").yellow()
        );

        Ok(())
    }
}

fn save_env_file(
    path: &Path,
    merchant_key: &str,
    merchant_salt: Option<&str>,
) -> Result<(), String> {
    let mut content = String::new();

    content.push_str("# Kirana Configuration\n");
    content.push_str("# Generated by 'kirana init'\n\n");

    content.push_str("# PayU Merchant Key\n");
    content.push_str(&format!("PAYU_MERCHANT_KEY={}\n", merchant_key));

    content.push_str("\n# PayU Merchant Salt (keep this secret)\n");
    match merchant_salt {
        Some(salt) => content.push_str(&format!("PAYU_MERCHANT_SALT={}\n", salt)),
        None => content.push_str("# PAYU_MERCHANT_SALT=\n"),
    }

    fs::write(path, content).map_err(|e| format!("Failed to write .env file: {}", e))?;

    Ok(())
}

fn save_sample_product(path: &Path) -> Result<(), String> {
    let content = r#"---
# Product - API version v1

id: prod_masala_chai
name: Masala Chai
description: House-blend masala chai, 250g loose leaf tin
unit_amount: 24900
currency: INR
active: true
"#;

    fs::write(path, content).map_err(|e| format!("Failed to write sample product: {}", e))?;

    Ok(())
}
