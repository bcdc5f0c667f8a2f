use std::fs;

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

use crate::domain::PathwayName;
use crate::error::PathwayError;
use crate::mapping::Namespace;

pub const CONFIG_FILE: &str = "kegg-graph.json";

#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub schema_version: Option<u32>,
    #[serde(default)]
    pub species: Option<String>,
    #[serde(default)]
    pub namespace: Option<Namespace>,
    #[serde(default)]
    pub conversion: Option<String>,
    #[serde(default)]
    pub filter: Option<String>,
    #[serde(default)]
    pub outdir: Option<String>,
    #[serde(default)]
    pub pathways: Vec<PathwayEntry>,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(untagged)]
pub enum PathwayEntry {
    Shorthand(String),
    Detailed(PathwayEntryObject),
}

#[derive(Debug, Deserialize, Serialize)]
pub struct PathwayEntryObject {
    pub path: String,
    /// Overrides the name recorded inside the pathway file.
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PathwayRequest {
    pub path: Utf8PathBuf,
    pub name: Option<PathwayName>,
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub schema_version: u32,
    pub species: String,
    pub namespace: Namespace,
    pub conversion: Option<Utf8PathBuf>,
    pub filter: Option<Utf8PathBuf>,
    pub outdir: Utf8PathBuf,
    pub pathways: Vec<PathwayRequest>,
}

pub struct ConfigLoader;

impl ConfigLoader {
    pub fn resolve(path: Option<&str>) -> Result<ResolvedConfig, PathwayError> {
        let config_path = match path {
            Some(path) => Utf8PathBuf::from(path),
            None => Utf8PathBuf::from(CONFIG_FILE),
        };

        if path.is_none() && !config_path.as_std_path().exists() {
            return Err(PathwayError::MissingConfig);
        }

        let content = fs::read_to_string(config_path.as_std_path())
            .map_err(|_| PathwayError::ConfigRead(config_path.clone().into_std_path_buf()))?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|err| PathwayError::ConfigParse(err.to_string()))?;

        Self::resolve_config(config)
    }

    pub fn resolve_config(config: Config) -> Result<ResolvedConfig, PathwayError> {
        let schema_version = config.schema_version.unwrap_or(1);

        let pathways = config
            .pathways
            .into_iter()
            .map(|entry| match entry {
                PathwayEntry::Shorthand(path) => Ok(PathwayRequest {
                    path: Utf8PathBuf::from(path),
                    name: None,
                }),
                PathwayEntry::Detailed(obj) => Ok(PathwayRequest {
                    path: Utf8PathBuf::from(obj.path),
                    name: obj.name.map(|name| name.parse()).transpose()?,
                }),
            })
            .collect::<Result<Vec<_>, PathwayError>>()?;

        Ok(ResolvedConfig {
            schema_version,
            species: config.species.unwrap_or_else(default_species),
            namespace: config.namespace.unwrap_or(Namespace::Uniprot),
            conversion: config.conversion.map(Utf8PathBuf::from),
            filter: config.filter.map(Utf8PathBuf::from),
            outdir: config
                .outdir
                .map(Utf8PathBuf::from)
                .unwrap_or_else(default_outdir),
            pathways,
        })
    }
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            schema_version: 1,
            species: default_species(),
            namespace: Namespace::Uniprot,
            conversion: None,
            filter: None,
            outdir: default_outdir(),
            pathways: Vec::new(),
        }
    }
}

pub fn default_species() -> String {
    "hsa".to_string()
}

pub fn default_outdir() -> Utf8PathBuf {
    Utf8PathBuf::from("out")
}
