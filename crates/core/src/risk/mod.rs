//! Disease-risk based visit recommendations

pub mod ports;
mod service;

pub use service::{DiseaseRiskService, RiskState};
