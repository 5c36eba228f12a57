//! Per-run audit context
//!
//! Owns the configuration, the platform services and every site-wide index
//! the records and rules consult. Indexes are built on first use and live
//! until the context is dropped or [`AuditContext::reset`] is called, so one
//! diagnostic run sees a consistent snapshot.

use crate::package_index::PackageAdoptionIndex;
use crate::record::ExtensionRecord;
use crate::footprint::Site;
use extdoctor_core::config::DoctorConfig;
use extdoctor_core::error::Result;
use extdoctor_core::platform::{
    CoreExtensions, CoreOracle, ExtensionQuery, ExtensionStore, SqliteStore,
};
use extdoctor_core::types::{ExtensionRow, UpdateSite};
use extdoctor_core::{LanguageCatalog, PathNormalizer};
use sha2::{Digest, Sha256};
use std::cell::{OnceCell, RefCell};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use tracing::{debug, warn};

pub struct AuditContext {
    config: DoctorConfig,
    paths: PathNormalizer,
    store: Box<dyn ExtensionStore>,
    core: Box<dyn CoreOracle>,
    languages: OnceCell<LanguageCatalog>,
    package_ids: OnceCell<HashSet<i64>>,
    update_sites: OnceCell<HashMap<i64, Vec<UpdateSite>>>,
    schema_versions: OnceCell<HashMap<i64, String>>,
    live_tables: OnceCell<HashSet<String>>,
    adoption: OnceCell<PackageAdoptionIndex>,
    records: RefCell<HashMap<String, Rc<ExtensionRecord>>>,
}

impl AuditContext {
    pub fn new(
        config: DoctorConfig,
        store: Box<dyn ExtensionStore>,
        core: Box<dyn CoreOracle>,
    ) -> Self {
        let paths = PathNormalizer::new(config.site.root.clone());

        Self {
            config,
            paths,
            store,
            core,
            languages: OnceCell::new(),
            package_ids: OnceCell::new(),
            update_sites: OnceCell::new(),
            schema_versions: OnceCell::new(),
            live_tables: OnceCell::new(),
            adoption: OnceCell::new(),
            records: RefCell::new(HashMap::new()),
        }
    }

    /// Open the configured database and load the core extension list
    pub fn open(config: DoctorConfig) -> Result<Self> {
        let store = SqliteStore::open(&config.database_path()?, &config.database.prefix)?;
        let core = CoreExtensions::load(&config.core.extra)?;
        Ok(Self::new(config, Box::new(store), Box::new(core)))
    }

    /// Forget every cached index and record
    pub fn reset(&mut self) {
        self.languages = OnceCell::new();
        self.package_ids = OnceCell::new();
        self.update_sites = OnceCell::new();
        self.schema_versions = OnceCell::new();
        self.live_tables = OnceCell::new();
        self.adoption = OnceCell::new();
        self.records.get_mut().clear();
        debug!("Audit context caches cleared");
    }

    pub fn config(&self) -> &DoctorConfig {
        &self.config
    }

    pub fn paths(&self) -> &PathNormalizer {
        &self.paths
    }

    pub fn store(&self) -> &dyn ExtensionStore {
        self.store.as_ref()
    }

    pub fn core(&self) -> &dyn CoreOracle {
        self.core.as_ref()
    }

    pub(crate) fn site(&self) -> Site<'_> {
        Site {
            paths: &self.paths,
            languages: self.languages(),
            driver: &self.config.database.driver,
            api_enabled: self.config.site.api_enabled,
        }
    }

    /// Installed locales, scanned on first use
    pub fn languages(&self) -> &LanguageCatalog {
        self.languages
            .get_or_init(|| LanguageCatalog::scan(&self.paths, self.config.site.api_enabled))
    }

    /// Whether `id` belongs to a package-type extension
    pub fn is_package_id(&self, id: i64) -> bool {
        self.package_ids().contains(&id)
    }

    pub fn package_ids(&self) -> &HashSet<i64> {
        self.package_ids.get_or_init(|| match self.store.package_ids() {
            Ok(ids) => ids.into_iter().collect(),
            Err(e) => {
                warn!("Package list unavailable: {}", e);
                HashSet::new()
            }
        })
    }

    /// Update sites linked to one extension
    pub fn update_sites_for(&self, extension_id: i64) -> &[UpdateSite] {
        let index = self.update_sites.get_or_init(|| {
            let mut index: HashMap<i64, Vec<UpdateSite>> = HashMap::new();
            match self.store.update_sites() {
                Ok(sites) => {
                    for (id, site) in sites {
                        index.entry(id).or_default().push(site);
                    }
                }
                Err(e) => warn!("Update site index unavailable: {}", e),
            }
            index
        });

        index.get(&extension_id).map(Vec::as_slice).unwrap_or_default()
    }

    /// Stored schema version of one extension
    pub fn schema_version(&self, extension_id: i64) -> Option<&str> {
        self.schema_versions
            .get_or_init(|| match self.store.schema_versions() {
                Ok(versions) => versions,
                Err(e) => {
                    warn!("Schema baseline index unavailable: {}", e);
                    HashMap::new()
                }
            })
            .get(&extension_id)
            .map(String::as_str)
    }

    /// Live tables, without the prefix
    pub fn live_tables(&self) -> &HashSet<String> {
        self.live_tables.get_or_init(|| match self.store.live_tables() {
            Ok(tables) => tables.into_iter().collect(),
            Err(e) => {
                warn!("Live table list unavailable: {}", e);
                HashSet::new()
            }
        })
    }

    /// Which package claims which extension
    pub fn adoption_index(&self) -> &PackageAdoptionIndex {
        self.adoption.get_or_init(|| PackageAdoptionIndex::build(self))
    }

    /// The record for a raw row, shared between identical rows
    pub fn make(&self, row: ExtensionRow) -> Result<Rc<ExtensionRecord>> {
        let key = row_key(&row)?;

        if let Some(record) = self.records.borrow().get(&key) {
            return Ok(Rc::clone(record));
        }

        let record = Rc::new(ExtensionRecord::build(self, row)?);
        self.records.borrow_mut().insert(key, Rc::clone(&record));
        Ok(record)
    }

    pub fn record_by_id(&self, id: i64) -> Result<Option<Rc<ExtensionRecord>>> {
        match self.store.extension_by_id(id)? {
            Some(row) => self.make(row).map(Some),
            None => Ok(None),
        }
    }

    pub fn find_record(&self, query: &ExtensionQuery) -> Result<Option<Rc<ExtensionRecord>>> {
        match self.store.find_extension(query)? {
            Some(row) => self.make(row).map(Some),
            None => Ok(None),
        }
    }
}

/// Memoization key: SHA-256 of the serialized row
fn row_key(row: &ExtensionRow) -> Result<String> {
    let serialized = serde_json::to_string(row)?;
    Ok(format!("{:x}", Sha256::digest(serialized.as_bytes())))
}
