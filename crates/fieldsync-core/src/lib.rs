//! # fieldsync-core
//!
//! Core types, document formats, and error types for fieldsync.
//!
//! This crate provides the foundational types shared across all fieldsync crates:
//! - Entity structs for the field schema (groups, fields, values) and their drafts
//! - Field type tags and sync state vocabularies
//! - Portable identity (UUID) minting
//! - Cross-cutting error types
//! - The on-disk sync document formats (per-group record, whole-store snapshot)
//! - Structured result types returned by import, export, and status checks

pub mod document;
pub mod entities;
pub mod enums;
pub mod errors;
pub mod ids;
pub mod responses;
