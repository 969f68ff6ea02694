//! # Target projection and orientation
//!
//! `targeting` finds where a user is pointing. Given an origin and a
//! bearing it either projects a target at a fixed range, or walks
//! outward asking an [ElevationOracle] for ground elevation until the
//! terrain departs from the origin's elevation. Device heading
//! samples drive either mode, and [LocationState] keeps distance and
//! bearing between origin and target consistent.

mod config;
mod error;
pub mod orientation;
pub mod search;
mod session;
mod state;
#[cfg(test)]
mod test_oracle;

pub use crate::{
    config::{
        SearchConfig, DEFAULT_ELEVATION_THRESHOLD_M, DEFAULT_MAX_DISTANCE_M,
        DEFAULT_STEP_DISTANCE_M, MAX_STEP_COUNT,
    },
    error::TargetingError,
    orientation::{
        HeadingSample, OrientationMode, OrientationSync, OrientationUpdate, RotationCommand,
    },
    search::{PartialSearchFailure, ProfileSample, Resolution, SearchOutcome, TargetSearchEngine},
    session::{distance_label, Session, SessionSnapshot},
    state::{Derived, LocationState},
};
pub use {elevation, elevation::ElevationOracle, geodesy, geodesy::GeoPoint};
