//! services/api/src/bin/openapi.rs
//!
//! Writes the OpenAPI document for the gateway, record and session routes.
//! `openapi [PATH]` writes to PATH (default `openapi.json`); `openapi -` prints it.

use api_lib::web::rest::ApiDoc;
use utoipa::OpenApi;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let doc = ApiDoc::openapi();
    let json = doc.to_pretty_json()?;

    match std::env::args().nth(1).as_deref() {
        Some("-") => println!("{}", json),
        target => {
            let path = target.unwrap_or("openapi.json");
            std::fs::write(path, json)?;
            eprintln!(
                "Wrote {} routes of the Promptt API to {}",
                doc.paths.paths.len(),
                path
            );
        }
    }
    Ok(())
}
