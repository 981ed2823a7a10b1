pub mod config;
pub mod fetch;
pub mod gazetteer;
pub mod occupancy;
pub mod output;
pub mod parser;
pub mod registry;
