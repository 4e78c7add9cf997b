pub mod config;
pub mod dto;
pub mod routes;
