//! Model schema and service health commands

use anyhow::Result;
use colored::Colorize;
use tabled::Tabled;

use crate::client::ApiClient;
use crate::output::{
    color_status, print_error, print_json, print_success, print_table, print_warning,
    OutputFormat,
};

/// Row for the schema table
#[derive(Tabled)]
struct ColumnRow {
    #[tabled(rename = "#")]
    position: usize,
    #[tabled(rename = "Column")]
    name: String,
}

/// Show the columns the loaded model expects
pub async fn show_schema(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let schema = client.schema().await?;

    match format {
        OutputFormat::Json => print_json(&schema)?,
        OutputFormat::Table => {
            println!("{}", "Model Schema".bold());
            println!("{}", "=".repeat(40));
            println!("Version: {}", schema.version.cyan());
            println!("Kind:    {}", schema.kind.cyan());
            if !schema.locations.is_empty() {
                println!("Locations with their own column: {}", schema.locations.join(", "));
            }
            println!();

            let rows: Vec<ColumnRow> = schema
                .columns
                .into_iter()
                .enumerate()
                .map(|(position, name)| ColumnRow { position, name })
                .collect();
            print_table(&rows);
        }
    }

    Ok(())
}

/// Show liveness and readiness of the server
pub async fn show_health(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let status = client.health().await?;

    match format {
        OutputFormat::Json => print_json(&status)?,
        OutputFormat::Table => {
            println!("Status: {}", color_status(&status.health.status));
            let model = &status.health.model;
            match (&model.version, &model.kind) {
                (Some(version), Some(kind)) => {
                    println!("Model:  {} ({}, {} columns)", version.cyan(), kind, model.columns.unwrap_or(0));
                }
                _ => print_warning(model.message.as_deref().unwrap_or("No model loaded")),
            }

            if status.readiness.ready {
                print_success("Ready to serve predictions");
            } else {
                print_error(status.readiness.reason.as_deref().unwrap_or("Not ready"));
            }
        }
    }

    Ok(())
}
