//! # File I/O Module
//!
//! Reads and writes `.ctf` workspace files.
//!
//! - **Saves** go to `name.ctf.tmp`, are synced, then renamed over the target,
//!   so a crash never leaves a half-written workspace
//! - **Loads** check the schema version before decoding the document, then
//!   recompute every offer and plan so hand-edited or older files come back
//!   with consistent row totals, offer values and plan days
//!
//! Overlapping saves are not coordinated; the last rename wins.
//!
//! ## Example
//!
//! ```rust,no_run
//! use contract_core::file_io::{save_workspace, load_workspace};
//! use contract_core::workspace::Workspace;
//! use std::path::Path;
//!
//! let workspace = Workspace::with_default_catalog();
//! let path = Path::new("sales.ctf");
//!
//! save_workspace(&workspace, path).unwrap();
//! let loaded = load_workspace(path).unwrap();
//! assert_eq!(loaded.license_types.len(), workspace.license_types.len());
//! ```

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use log::{debug, info};
use serde_json::Value;

use crate::errors::{ContractError, ContractResult};
use crate::workspace::{Workspace, SCHEMA_VERSION};

/// Default extension for workspace files
pub const WORKSPACE_EXTENSION: &str = "ctf";

/// Temp file path used during an atomic save (`name.ctf` → `name.ctf.tmp`)
fn tmp_path_for(path: &Path) -> PathBuf {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    PathBuf::from(tmp)
}

fn io_error(operation: &str, path: &Path, e: std::io::Error) -> ContractError {
    ContractError::file_error(operation, path.display().to_string(), e.to_string())
}

/// Save a workspace, replacing `path` atomically.
pub fn save_workspace(workspace: &Workspace, path: &Path) -> ContractResult<()> {
    let bytes = serde_json::to_vec_pretty(workspace)?;
    write_atomic(path, &bytes)?;
    debug!(
        "Saved workspace to {} ({} offers, {} projects)",
        path.display(),
        workspace.offers.len(),
        workspace.projects.len()
    );
    Ok(())
}

fn write_atomic(path: &Path, bytes: &[u8]) -> ContractResult<()> {
    let tmp_path = tmp_path_for(path);

    let written = fs::File::create(&tmp_path)
        .and_then(|mut file| {
            file.write_all(bytes)?;
            file.sync_all()
        })
        .map_err(|e| io_error("write temp file", &tmp_path, e));
    if let Err(e) = written {
        let _ = fs::remove_file(&tmp_path);
        return Err(e);
    }

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        io_error("rename to final", path, e)
    })
}

/// Load a workspace and refresh its derived values.
///
/// # Returns
///
/// * `Ok(Workspace)` - Loaded and recomputed
/// * `Err(ContractError::VersionMismatch)` - Missing or incompatible schema version
/// * `Err(ContractError::SerializationError)` - Invalid JSON or document shape
/// * `Err(ContractError::FileError)` - I/O error
pub fn load_workspace(path: &Path) -> ContractResult<Workspace> {
    let contents = fs::read_to_string(path).map_err(|e| io_error("read", path, e))?;

    let document: Value = serde_json::from_str(&contents).map_err(|e| ContractError::SerializationError {
        reason: format!("Invalid JSON in {}: {}", path.display(), e),
    })?;

    let file_version = document
        .pointer("/meta/version")
        .and_then(Value::as_str)
        .unwrap_or_default();
    check_version(file_version)?;

    let mut workspace: Workspace = serde_json::from_value(document).map_err(|e| ContractError::SerializationError {
        reason: format!("Invalid workspace in {}: {}", path.display(), e),
    })?;

    let stale = workspace.refresh_derived();
    if stale > 0 {
        info!("Recomputed {} stale records in {}", stale, path.display());
    }
    Ok(workspace)
}

/// `(major, minor)` of a dotted version string.
fn parse_version(version: &str) -> Option<(u32, u32)> {
    let mut parts = version.split('.').map(str::parse::<u32>);
    let major = parts.next()?.ok()?;
    let minor = parts.next().unwrap_or(Ok(0)).ok()?;
    Some((major, minor))
}

/// A file is readable when its major version matches and, while the schema
/// is pre-1.0, its minor version is not newer than ours.
fn check_version(file_version: &str) -> ContractResult<()> {
    let compatible = match (parse_version(file_version), parse_version(SCHEMA_VERSION)) {
        (Some((file_major, file_minor)), Some((major, minor))) => {
            file_major == major && (major > 0 || file_minor <= minor)
        }
        _ => false,
    };

    if compatible {
        Ok(())
    } else {
        Err(ContractError::VersionMismatch {
            file_version: file_version.to_string(),
            expected_version: SCHEMA_VERSION.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::offer::Offer;
    use crate::planning::{ProjectPhase, ProjectPlan, ProjectTask};
    use crate::pricing::LineItemEdit;
    use crate::session::{Role, Session, User};
    use rust_decimal_macros::dec;
    use tempfile::TempDir;

    fn workspace_path(dir: &TempDir, name: &str) -> PathBuf {
        dir.path().join(format!("{}.{}", name, WORKSPACE_EXTENSION))
    }

    fn sales() -> Session {
        Session::new(User::new("sam@example.com", "Sam", Role::Sales))
    }

    #[test]
    fn test_tmp_path_generation() {
        let tmp = tmp_path_for(Path::new("/path/to/sales.ctf"));
        assert_eq!(tmp, Path::new("/path/to/sales.ctf.tmp"));
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = workspace_path(&dir, "roundtrip");

        let mut workspace = Workspace::with_default_catalog();
        let id = workspace.upsert_offer(Offer::new("Acme GmbH", "erp", &sales()));
        save_workspace(&workspace, &path).unwrap();

        let loaded = load_workspace(&path).unwrap();
        assert_eq!(loaded.get_offer(&id).unwrap().customer_name, "Acme GmbH");
        assert_eq!(loaded.license_types.len(), 3);
        assert_eq!(loaded.resource_rates.len(), 6);
        assert!(!tmp_path_for(&path).exists());
    }

    #[test]
    fn test_save_overwrites() {
        let dir = TempDir::new().unwrap();
        let path = workspace_path(&dir, "overwrite");

        save_workspace(&Workspace::with_default_catalog(), &path).unwrap();
        save_workspace(&Workspace::new(), &path).unwrap();

        assert!(load_workspace(&path).unwrap().license_types.is_empty());
    }

    #[test]
    fn test_load_repairs_stale_derived_values() {
        let dir = TempDir::new().unwrap();
        let path = workspace_path(&dir, "stale");

        let mut workspace = Workspace::new();
        let mut offer = Offer::new("Acme GmbH", "erp", &sales());
        let mut form = offer.form();
        let row = form.add_item(None);
        form.apply(row, LineItemEdit::UnitPrice(dec!(100)));
        form.apply(row, LineItemEdit::Quantity(2));
        offer.apply_form(form);
        offer.value = dec!(1);
        offer.line_items[0].total_value = dec!(1);
        let offer_id = workspace.upsert_offer(offer);

        let mut plan = ProjectPlan::new("Acme rollout", "erp");
        let dev = plan.add_phase(ProjectPhase::new("Development", "#10b981"));
        plan.add_task(&dev, ProjectTask::new("Build", 5)).unwrap();
        plan.total_days = 0;
        plan.phases[0].days = 0;
        let plan_id = workspace.upsert_project(plan);

        save_workspace(&workspace, &path).unwrap();
        let loaded = load_workspace(&path).unwrap();

        let offer = loaded.get_offer(&offer_id).unwrap();
        assert_eq!(offer.value, dec!(200));
        assert_eq!(offer.line_items[0].total_value, dec!(200));
        let plan = loaded.get_project(&plan_id).unwrap();
        assert_eq!(plan.phases[0].days, 5);
        assert_eq!(plan.total_days, 5);
    }

    #[test]
    fn test_load_legacy_product_id() {
        let dir = TempDir::new().unwrap();
        let path = workspace_path(&dir, "legacy");
        fs::write(
            &path,
            r#"{
                "meta": { "version": "0.1.0", "created": "2024-01-01T00:00:00Z", "modified": "2024-01-01T00:00:00Z" },
                "resource_rates": [ { "product_id": "erp", "resource_type_code": "BA", "rate_per_hour": 90 } ]
            }"#,
        )
        .unwrap();

        let loaded = load_workspace(&path).unwrap();
        assert_eq!(loaded.resource_rates[0].solution_id, "erp");
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = load_workspace(&workspace_path(&dir, "missing")).unwrap_err();
        assert_eq!(err.error_code(), "FILE_ERROR");
    }

    #[test]
    fn test_load_invalid_json() {
        let dir = TempDir::new().unwrap();
        let path = workspace_path(&dir, "invalid");
        fs::write(&path, "{ not json").unwrap();
        assert_eq!(load_workspace(&path).unwrap_err().error_code(), "SERIALIZATION_ERROR");
    }

    #[test]
    fn test_newer_schema_rejected_before_decoding() {
        let dir = TempDir::new().unwrap();
        let path = workspace_path(&dir, "newer");
        fs::write(&path, r#"{ "meta": { "version": "0.9.0" }, "offers": "reshaped" }"#).unwrap();

        assert_eq!(load_workspace(&path).unwrap_err().error_code(), "VERSION_MISMATCH");
    }

    #[test]
    fn test_version_check() {
        assert!(check_version(SCHEMA_VERSION).is_ok());
        assert!(check_version("0.1.5").is_ok());
        assert!(check_version("0.0.3").is_ok());
        assert!(check_version("0").is_ok());
        assert!(check_version("1.0.0").is_err());
        assert!(check_version("0.2.0").is_err());
        assert!(check_version("garbage").is_err());
        assert!(check_version("").is_err());
    }
}
