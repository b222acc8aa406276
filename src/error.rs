use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the allocator/coordinator.
///
/// Most of these kinds (precondition misses, controller close failures)
/// never reach a caller as an `Err`; they're represented in-band instead
/// (see [`crate::coordinator::UpdateOutcome`]), since an update cycle
/// fails silently on them. The variants still exist so unit tests can
/// assert on *why* a cycle was aborted.
#[derive(Error, Debug, PartialEq, Eq, Clone)]
#[non_exhaustive]
pub enum Error {
    #[error("destination endpoint is expired or missing")]
    DestinationExpired,
    #[error("conference has no endpoints")]
    EmptyConference,
    #[error("{0}")]
    Other(String),
}

/// Flattens multiple controller-close errors into one, mirroring how a
/// chain of interceptors aggregates per-child close failures without
/// letting any single one block the rest.
pub fn flatten_close_errors(errs: Vec<Error>) -> Result<()> {
    if errs.is_empty() {
        Ok(())
    } else {
        let joined: Vec<String> = errs.into_iter().map(|e| e.to_string()).collect();
        Err(Error::Other(joined.join("; ")))
    }
}
