pub mod abstract_trait;
pub mod app;
pub mod domain;
pub mod handler;
pub mod service;
