//! JSON documents handed to the engine: specifications, rate catalogs and quote snapshots.

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;

use crate::cpq::catalog::RateCatalog;
use crate::cpq::freezer::QuoteSnapshot;
use crate::domain::spec::ProjectSpecification;
use crate::errors::ApplicationError;

pub fn read_document<T: DeserializeOwned>(path: &Path) -> Result<T, ApplicationError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ApplicationError::ReadInput { path: path.to_path_buf(), source })?;
    let document = serde_json::from_str(&raw)
        .map_err(|source| ApplicationError::ParseInput { path: path.to_path_buf(), source })?;

    tracing::debug!(
        event_name = "documents.loaded",
        path = %path.display(),
        bytes = raw.len(),
        "input document loaded"
    );
    Ok(document)
}

pub fn read_specification(path: &Path) -> Result<ProjectSpecification, ApplicationError> {
    read_document(path)
}

pub fn read_catalog(path: &Path) -> Result<RateCatalog, ApplicationError> {
    read_document(path)
}

pub fn read_snapshot(path: &Path) -> Result<QuoteSnapshot, ApplicationError> {
    read_document(path)
}
