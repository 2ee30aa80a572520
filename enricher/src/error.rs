use db_model::Asn;
use ipnet::IpNet;
use thiserror::Error;

/// Fatal pipeline conditions. Anything here aborts the whole run; retry is
/// the orchestrating collaborator's business, never ours.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum PipelineError {
    /// Precondition failure: a required input set is empty. Running the
    /// downstream stages on it would silently produce empty metadata.
    #[error("nothing to process: {what} is empty")]
    EmptyInput { what: &'static str },

    /// Internal-consistency bug (dense-ID gap, row-count mismatch, duplicate
    /// verdict row, ...). Must abort rather than attempt repair, since a
    /// dropped or duplicated row corrupts extrapolation results.
    #[error("pipeline invariant violated: {detail}")]
    Invariant { detail: String },

    /// The join found an announcement that no upstream stage produced
    /// metadata for. Upstream output is corrupt; nothing partial is emitted.
    #[error("no metadata for announced pair ({prefix}, AS{origin})")]
    MissingMetadata { prefix: IpNet, origin: Asn },
}

impl PipelineError {
    pub fn invariant(detail: impl Into<String>) -> Self {
        Self::Invariant {
            detail: detail.into(),
        }
    }
}
