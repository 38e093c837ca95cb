//! # Akilhane Sync Engine
//!
//! Reconciles the Akilhane local store with a remote relational store.
//!
//! This crate provides:
//! - [`RemoteGateway`], the per-table list/create/update/delete API, with a
//!   PostgREST implementation ([`RestGateway`]) and an in-process one
//!   ([`MemoryGateway`])
//! - [`SyncCoordinator`], which runs push, pull and full passes
//! - Conversions between local records and remote rows
//!
//! ## Model
//!
//! A pass takes one snapshot of each side and creates on the target every
//! record whose content (or remote link) is absent there. Existing
//! counterparts are never modified, so passes are idempotent. Records
//! created remotely are linked back to their local source through
//! `remote_id`.
//!
//! Passes are single-flight: while one runs, further calls on the same
//! coordinator return a failed [`SyncOutcome`] instead of racing it.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod coordinator;
mod error;
mod gateway;
mod http;
mod identity;
pub mod mapping;
mod remote;
mod rest;
mod state;

pub use config::SyncConfig;
pub use coordinator::SyncCoordinator;
pub use error::{SyncError, SyncResult};
pub use gateway::{MemoryGateway, RemoteGateway};
pub use http::{HttpClient, HttpRequest, HttpResponse, Method, ReqwestClient};
pub use identity::{IdentityProvider, StaticIdentity};
pub use remote::{
    NewRemoteQuestion, NewRemoteSubject, RemoteQuestion, RemoteQuestionPatch, RemoteSubject,
    RemoteSubjectPatch,
};
pub use rest::RestGateway;
pub use state::{ConnectionCheck, SyncCounts, SyncOutcome, SyncState, SyncStatus};
