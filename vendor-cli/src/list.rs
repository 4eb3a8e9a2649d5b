use std::path::Path;

use vendor_fetch::{Manifest, MissingManifest};

use crate::args::OutputFormat;
use crate::error::AppError;

/// Print the dependencies recorded in the project's manifest.
pub fn list(
    project_dir: &Path,
    missing_manifest: MissingManifest,
    format: Option<OutputFormat>,
) -> Result<(), AppError> {
    let manifest = Manifest::load(vendor_fetch::manifest_path(project_dir), missing_manifest)
        .map_err(AppError::manifest)?;
    match format {
        Some(OutputFormat::Json) => {
            println!(
                "{}",
                serde_json::to_string_pretty(&manifest).map_err(AppError::json)?
            );
        }
        Some(OutputFormat::Toml) => {
            println!("{}", toml::to_string(&manifest).map_err(AppError::toml)?);
        }
        None => {
            for dep in &manifest {
                println!("{} {} {}", dep.import_path, dep.revision, dep.branch);
            }
        }
    }
    Ok(())
}
