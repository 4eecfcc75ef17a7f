use derive_more::Display;

/// Where a sync run has got to.
///
/// Runs move forward through these in order; `Failed` can follow any stage
/// before `Done` and is final.
#[derive(Debug, Display, Clone, Copy, Default, PartialEq, Eq)]
pub enum Stage {
    #[default]
    #[display("idle")]
    Idle,
    #[display("authenticating")]
    Authenticating,
    #[display("export triggered")]
    ExportTriggered,
    #[display("archive retrieved")]
    ArchiveRetrieved,
    #[display("extracted")]
    Extracted,
    #[display("transformed")]
    Transformed,
    #[display("persisted")]
    Persisted,
    #[display("done")]
    Done,
    #[display("failed")]
    Failed,
}
