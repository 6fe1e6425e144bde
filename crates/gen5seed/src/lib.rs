//! gen5seed - Initial seed search engine for Gen 5 Pokemon games
//!
//! This crate provides functionality to:
//! - Project a boot seed into encounter outcomes (IVs, personality, C-Gear timer)
//! - Search boot date/time/key combinations whose outcomes match a filter
//! - Search packed C-Gear seeds and reverse an Entralink calibration reading

pub mod constants;
pub mod domain;
pub mod infra;
pub mod app;

// Re-export commonly used types
pub use app::calibration::{CalibrationReport, CalibrationSearcher, CalibrationTarget};
pub use app::generator::{
    Encounter, GeneratorConfig, GeneratorError, Lead, Method, Protocol, StationaryGenerator,
};
pub use app::searcher::{SearchError, SearchProgress, SearchResult, StationarySearcher};
pub use domain::filter::{AcceptAll, Filter, FilterFn, StateFilter};
pub use domain::keypress::Buttons;
pub use domain::profile::{DsType, Game, Profile, ProfileError};
pub use domain::state::{Gender, IvSet, Outcome, Personality, Shiny};
pub use domain::timer::CGearTimer;
