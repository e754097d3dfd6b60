pub mod app;
pub mod catalog;
pub mod config;
pub mod detail;
pub mod domain;
pub mod error;
pub mod filter;
pub mod html;
pub mod normalize;
pub mod output;
pub mod site;
pub mod structure;
pub mod table;
pub mod tui;
