//! Joined catalog of near-Earth objects and their close approaches.
//!
//! [`NeoCatalog`] takes the output of both loaders and links every close
//! approach to the NEO with the same designation. Approaches whose
//! designation is not in the NEO file are linked to a placeholder NEO
//! instead (no name, unknown diameter, not hazardous), so no approach is
//! ever left unlinked.
//!
//! NEOs do not hold their approaches. The catalog keeps a designation to
//! approach-index lookup and serves it through [`NeoCatalog::approaches_for`].
//! After construction the catalog is read-only.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use log::{info, warn};

use super::loaders::{load_approaches, load_neos, LoaderError};
use super::models::{CloseApproach, NearEarthObject};
use crate::config::PipelineConfig;

/// NEOs and close approaches, linked by designation.
#[derive(Debug, Clone)]
pub struct NeoCatalog {
    /// Catalog NEOs in load order, unique by designation.
    neos: Vec<Arc<NearEarthObject>>,
    /// Designation -> index into `neos`.
    by_designation: HashMap<String, usize>,
    /// Name -> index into `neos`; the first NEO with a name wins.
    by_name: HashMap<String, usize>,
    /// All approaches in load order, each linked to a NEO.
    approaches: Vec<CloseApproach>,
    /// Designation -> indices into `approaches`, in load order.
    approach_index: HashMap<String, Vec<usize>>,
    /// Placeholders for designations missing from the NEO file.
    unknown: HashMap<String, Arc<NearEarthObject>>,
}

impl NeoCatalog {
    /// Build a catalog and link every approach to its NEO.
    ///
    /// If the NEO list repeats a designation, the first occurrence is kept
    /// and later ones are dropped with a warning. Approaches to the same
    /// unknown designation share a single placeholder NEO.
    pub fn new(neos: Vec<NearEarthObject>, mut approaches: Vec<CloseApproach>) -> Self {
        let mut catalog_neos: Vec<Arc<NearEarthObject>> = Vec::with_capacity(neos.len());
        let mut by_designation: HashMap<String, usize> = HashMap::with_capacity(neos.len());
        let mut by_name: HashMap<String, usize> = HashMap::new();

        for neo in neos {
            if by_designation.contains_key(neo.designation()) {
                warn!("Duplicate NEO designation {}, keeping the first", neo.designation());
                continue;
            }
            let idx = catalog_neos.len();
            by_designation.insert(neo.designation().to_string(), idx);
            if let Some(name) = neo.name() {
                by_name.entry(name.to_string()).or_insert(idx);
            }
            catalog_neos.push(Arc::new(neo));
        }

        let mut approach_index: HashMap<String, Vec<usize>> = HashMap::new();
        let mut unknown: HashMap<String, Arc<NearEarthObject>> = HashMap::new();

        for (idx, approach) in approaches.iter_mut().enumerate() {
            let designation = approach.designation().to_string();

            let neo = match by_designation.get(&designation) {
                Some(&neo_idx) => Arc::clone(&catalog_neos[neo_idx]),
                None => Arc::clone(unknown.entry(designation.clone()).or_insert_with(|| {
                    Arc::new(NearEarthObject::unknown(designation.as_str()))
                })),
            };

            approach.link(neo);
            approach_index.entry(designation).or_default().push(idx);
        }

        info!(
            "Catalog built: {} NEOs, {} close approaches, {} unknown designations",
            catalog_neos.len(),
            approaches.len(),
            unknown.len()
        );

        Self {
            neos: catalog_neos,
            by_designation,
            by_name,
            approaches,
            approach_index,
            unknown,
        }
    }

    /// Load both input files and build the catalog.
    ///
    /// # Arguments
    ///
    /// * `neo_path` - Path to the NEO catalog CSV
    /// * `cad_path` - Path to the close-approach JSON
    /// * `config` - Pipeline configuration (column names and field positions)
    ///
    /// # Errors
    ///
    /// Returns the first loader error encountered.
    pub fn from_files<P: AsRef<Path>, Q: AsRef<Path>>(
        neo_path: P,
        cad_path: Q,
        config: &PipelineConfig,
    ) -> Result<Self, LoaderError> {
        let neos = load_neos(neo_path, Some(&config.neos))?;
        let approaches = load_approaches(cad_path, Some(&config.approaches))?;
        Ok(Self::new(neos, approaches))
    }

    /// Look up a catalog NEO by its primary designation.
    ///
    /// Placeholders for unknown designations are never returned.
    pub fn get_neo_by_designation(&self, designation: &str) -> Option<&NearEarthObject> {
        self.by_designation
            .get(designation)
            .map(|&idx| self.neos[idx].as_ref())
    }

    /// Look up a catalog NEO by its exact name.
    pub fn get_neo_by_name(&self, name: &str) -> Option<&NearEarthObject> {
        self.by_name.get(name).map(|&idx| self.neos[idx].as_ref())
    }

    /// Catalog NEOs in load order.
    pub fn neos(&self) -> impl Iterator<Item = &NearEarthObject> + '_ {
        self.neos.iter().map(Arc::as_ref)
    }

    /// All close approaches in load order, each linked to a NEO.
    ///
    /// This is the input to any downstream selection stage, e.g.
    /// `catalog.approaches().filter(..).take(limit)`.
    pub fn approaches(&self) -> std::slice::Iter<'_, CloseApproach> {
        self.approaches.iter()
    }

    /// Close approaches of one designation, in load order.
    pub fn approaches_for(&self, designation: &str) -> impl Iterator<Item = &CloseApproach> + '_ {
        self.approach_index
            .get(designation)
            .into_iter()
            .flatten()
            .map(move |&idx| &self.approaches[idx])
    }

    /// Number of distinct designations linked to a placeholder NEO.
    pub fn unknown_designations(&self) -> usize {
        self.unknown.len()
    }

    #[inline]
    pub fn neo_count(&self) -> usize {
        self.neos.len()
    }

    #[inline]
    pub fn approach_count(&self) -> usize {
        self.approaches.len()
    }
}
