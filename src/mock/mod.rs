//! Test doubles for the collaborator interfaces of §6, mirroring the
//! teacher's `mock::mock_time`/`mock::mock_stream` split: one small,
//! inspectable fake per trait, built for `tests/` scenarios rather
//! than production use.

mod conference;
mod controller;
mod notifier;
mod transport;

pub use conference::{MockConferenceContext, MockEndpoint};
pub use controller::{MockController, MockControllerFactory};
pub use notifier::MockNotifier;
pub use transport::{MockBandwidthEstimator, MockTransport};

/// A plain in-memory track, the same shape every non-mock caller uses.
/// Kept under an alias here so test code reads as "the mock track"
/// alongside its sibling mocks.
pub use crate::layer::SimpleTrack as MockTrack;
