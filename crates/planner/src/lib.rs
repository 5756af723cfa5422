pub mod catalog;
pub mod config;
pub mod db;
pub mod plan;
pub mod recommend;
pub mod requirements;
pub mod server;
pub mod types;
