use std::path::PathBuf;

use vendor_fetch::{FetchOptions, Fetcher, MissingManifest};

use crate::error::AppError;
use crate::progress::{complete_progress_bar, make_progress_spinner};

// Fetch a single import path, reporting progress on a spinner
pub fn fetch_one(
    project_dir: PathBuf,
    missing_manifest: MissingManifest,
    import_path: String,
    options: &FetchOptions,
) -> Result<(), AppError> {
    let fetcher = Fetcher::new(project_dir).with_missing_manifest(missing_manifest);
    let bar = make_progress_spinner(import_path.clone());
    bar.set_message(match (options.branch(), options.revision()) {
        (Some(branch), _) => format!("fetching branch {branch}"),
        (None, "") => "fetching".to_string(),
        (None, revision) => format!("fetching revision {revision}"),
    });
    let result = fetcher.fetch(&import_path, options);
    complete_progress_bar(bar, &result);
    let dep = result.map_err(|err| AppError::fetch(import_path, err))?;
    println!(
        "✅ 🔗 Vendored {} into {}",
        dep,
        fetcher.destination(&dep.import_path).display()
    );
    Ok(())
}
