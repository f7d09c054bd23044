//! Core library exports for the Greenmarket catalog engine.
//!
//! This crate exposes the domain model, forms, Diesel models, repositories
//! and service layers of the farmers' marketplace catalog: the category
//! tree with its moderation lifecycle, the per-category attribute schema
//! registry, crop attribute validation and the faceted crop search.

pub mod db;
pub mod domain;
pub mod dto;
mod error_conversions;
pub mod forms;
pub mod models;
pub mod repository;
pub mod schema;
pub mod services;
