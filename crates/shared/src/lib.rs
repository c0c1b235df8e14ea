//! Domain model, static catalogs and wire protocol shared by the reading core and the apps.

pub mod catalog;
pub mod domain;
pub mod error;
pub mod protocol;
