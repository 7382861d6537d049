//! Per-body atmosphere data and the query facade.
//!
//! Startup loads YAML config nodes into an [`AtmosphereRegistry`] (one
//! [`BodyAtmosphereStore`] per body). After that the registry is read-only
//! and a [`QueryFacade`] combines gridded datasets, procedural maps and the
//! host's stock atmosphere into tagged [`Sampled`](atmo_common::Sampled)
//! results.

pub mod config;
pub mod facade;
pub mod loader;
pub mod stock;
pub mod store;
pub mod variability;

pub use config::{ConfigFile, ConfigSection, DatasetNode, MapNode};
pub use facade::{DetailedSample, FacadeSettings, QueryFacade};
pub use loader::{load_config_dir, load_config_file, load_config_str, LoadReport};
pub use stock::{BodyProfile, ExponentialAtmosphere, StockAtmosphere};
pub use store::{
    AtmosphereRegistry, BodyAtmosphereStore, BodySummary, DatasetSummary, ScalarData, ScalarKind,
    WindData,
};
pub use variability::WindVariability;
