//! Bitrate allocation and packet-admission core for a Selective
//! Forwarding Middlebox (SFM).
//!
//! A single [`coordinator::Coordinator`] is bound to one destination
//! participant and decides, from the aggregate downlink bandwidth
//! estimate and the destination's UI intent (selected/pinned/last-N),
//! which incoming video sub-streams to forward and at what quality
//! layer. Per-source RTP/RTCP rewriting, bandwidth estimation,
//! conference membership and transport are all host-owned collaborator
//! interfaces; this crate owns only the allocation algorithm, the
//! SSRC routing table, and the packet-admission filter.

pub mod admission;
pub mod allocator;
pub mod clock;
pub mod conference;
pub mod config;
pub mod controller;
pub mod coordinator;
pub mod error;
pub mod layer;
pub mod pipeline;
pub mod prioritize;
pub mod rate;
pub mod routing_table;
pub mod source_allocation;
pub mod stats;

pub mod mock;

pub use config::AllocatorConfig;
pub use coordinator::{Coordinator, UpdateOutcome};
pub use error::{Error, Result};
