//! services/api/src/bin/openapi.rs
//!
//! Writes the analysis API's OpenAPI 3.0 specification to disk, so clients
//! can be generated without a running server.

use api_lib::web::rest::ApiDoc;
use utoipa::OpenApi;

const OUTPUT_PATH: &str = "openapi.json";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let spec_json = ApiDoc::openapi().to_pretty_json()?;
    std::fs::write(OUTPUT_PATH, spec_json)?;
    println!("Wrote the Sleep Insight OpenAPI specification to {OUTPUT_PATH}");
    Ok(())
}
