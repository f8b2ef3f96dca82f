pub mod cases;
pub mod config;
pub mod contract;
pub mod models;
pub mod regions;
pub mod stub;
pub mod suite;
