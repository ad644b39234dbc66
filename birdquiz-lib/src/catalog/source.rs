//! Loading a prepared species catalog from JSON.
//!
//! The file is an array of species records, each carrying its recordings with
//! the recording catalog's short field names:
//!
//! ```json
//! [{
//!   "com_name_fi": "korppi",
//!   "com_name_en": "Common Raven",
//!   "sci_name": "Corvus corax",
//!   "atlas_square_count": 3412,
//!   "recordings": [{
//!     "id": "512345",
//!     "url": "//xeno-canto.org/512345",
//!     "file": "https://xeno-canto.org/512345/download",
//!     "rec": "Jane Doe",
//!     "cnt": "Finland",
//!     "loc": "Nuuksio, Espoo",
//!     "type": "call",
//!     "lic": "//creativecommons.org/licenses/by-nc-sa/4.0/"
//!   }]
//! }]
//! ```

use std::collections::HashSet;
use std::path::Path;
use std::sync::OnceLock;

use log::{info, warn};
use regex::Regex;
use serde::{Deserialize, Deserializer};

use super::SpeciesCatalog;
use crate::clip::{ClipInfo, SoundClip};
use crate::error::CatalogError;
use crate::species::Species;

#[derive(Debug, Clone, Deserialize)]
pub struct SpeciesRecord {
    pub com_name_fi: String,
    pub com_name_en: String,
    pub sci_name: String,
    #[serde(default)]
    pub atlas_square_count: u32,
    #[serde(default)]
    pub recordings: Vec<RecordingRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecordingRecord {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub url: String,
    pub file: String,
    pub rec: String,
    #[serde(default)]
    pub cnt: String,
    #[serde(default)]
    pub loc: String,
    #[serde(default, rename = "type")]
    pub sound_type: String,
    #[serde(default)]
    pub lic: String,
}

impl RecordingRecord {
    pub fn to_clip_info(&self) -> ClipInfo {
        ClipInfo {
            id: format!("XC{}", self.id),
            url: with_scheme(&self.url),
            download_url: with_scheme(&self.file),
            recordist: self.rec.clone(),
            country: self.cnt.clone(),
            location: self.loc.clone(),
            sound_type: self.sound_type.clone(),
            license: license_label(&self.lic),
        }
    }
}

/// Catalog ids arrive as either JSON strings or numbers.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(u64),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(text) => text,
        Id::Number(number) => number.to_string(),
    })
}

/// Scheme-relative URLs (`//host/path`) are resolved against https.
fn with_scheme(url: &str) -> String {
    if url.starts_with("//") {
        format!("https:{}", url)
    } else {
        url.to_string()
    }
}

/// Turn a Creative Commons license URL into a display label.
///
/// `//creativecommons.org/licenses/by-nc-sa/4.0/` becomes `CC BY-NC-SA 4.0`;
/// anything unrecognized yields `None`.
pub fn license_label(license_url: &str) -> Option<String> {
    static LICENSE: OnceLock<Regex> = OnceLock::new();
    let regex = LICENSE.get_or_init(|| {
        Regex::new(r"^(?:https?:)?//creativecommons\.org/licenses/([a-z-]+)/(\d\.\d)/")
            .expect("license pattern compiles")
    });

    let captures = regex.captures(license_url.trim())?;
    Some(format!(
        "CC {} {}",
        captures[1].to_uppercase(),
        &captures[2]
    ))
}

/// Read and build a catalog from a JSON file.
pub fn load_catalog<P: AsRef<Path>>(path: P) -> Result<SpeciesCatalog, CatalogError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)?;
    let catalog = parse_catalog(&text)?;
    info!(
        "loaded {} species from {}",
        catalog.master_len(),
        path.display()
    );
    Ok(catalog)
}

/// Build a catalog from JSON text.
///
/// Species without recordings are skipped; repeated name triples are rejected.
pub fn parse_catalog(json: &str) -> Result<SpeciesCatalog, CatalogError> {
    let records: Vec<SpeciesRecord> = serde_json::from_str(json)?;
    let mut seen = HashSet::new();
    let mut species = Vec::with_capacity(records.len());

    for record in records {
        if record.recordings.is_empty() {
            warn!("skipping {}: no recordings", record.com_name_fi);
            continue;
        }

        let clips = record
            .recordings
            .iter()
            .map(|recording| SoundClip::new(recording.to_clip_info()))
            .collect();
        let entry = Species::new(
            &record.com_name_fi,
            &record.com_name_en,
            &record.sci_name,
            record.atlas_square_count,
            clips,
        )?;

        if !seen.insert(entry.names().clone()) {
            return Err(CatalogError::Duplicate(entry.primary_name().to_string()));
        }
        species.push(entry);
    }

    if species.is_empty() {
        return Err(CatalogError::Empty);
    }

    Ok(SpeciesCatalog::new(species))
}
