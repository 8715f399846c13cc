//! Price prediction command

use anyhow::Result;
use colored::Colorize;
use tabled::Tabled;

use crate::client::{ApiClient, PredictRequest};
use crate::output::{print_info, print_json, print_table, OutputFormat};

/// Row for the submitted attributes table
#[derive(Tabled)]
struct AttributeRow {
    #[tabled(rename = "Attribute")]
    name: &'static str,
    #[tabled(rename = "Value")]
    value: String,
}

fn yes_no(value: bool) -> String {
    let text = if value { "yes" } else { "no" };
    text.to_string()
}

fn attribute_rows(request: &PredictRequest) -> Vec<AttributeRow> {
    vec![
        AttributeRow { name: "Bedrooms", value: request.bedrooms.to_string() },
        AttributeRow { name: "Bathrooms", value: request.bathrooms.to_string() },
        AttributeRow { name: "Square feet", value: request.sqft.to_string() },
        AttributeRow { name: "Floors", value: request.floors.to_string() },
        AttributeRow { name: "Age (years)", value: request.age.to_string() },
        AttributeRow { name: "Waterfront", value: yes_no(request.waterfront) },
        AttributeRow { name: "Garage", value: yes_no(request.garage) },
        AttributeRow { name: "Garden", value: yes_no(request.garden) },
        AttributeRow { name: "Location", value: request.location.clone() },
    ]
}

/// Request a price prediction and print it
pub async fn predict(
    client: &ApiClient,
    request: &PredictRequest,
    format: OutputFormat,
    verbose: bool,
) -> Result<()> {
    if verbose {
        print_info(&format!("POST {}predict", client.base_url()));
    }

    let result = client.predict(request).await?;

    match format {
        OutputFormat::Json => print_json(&result)?,
        OutputFormat::Table => {
            println!("{}", "House Price Prediction".bold());
            println!("{}", "=".repeat(40));
            print_table(&attribute_rows(request));
            println!();
            println!("Predicted price: {}", result.prediction.green().bold());
            if let Some(version) = &result.model_version {
                println!("Model version:   {}", version.cyan());
            }
        }
    }

    Ok(())
}
