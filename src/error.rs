#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when cross-validation is enabled with zero folds.
    #[error("invalid fold count: cross-validation requires at least one fold")]
    InvalidFoldCount,

    /// Returned when a trial record carries fewer model entries than the
    /// configured fold count. The render pass that hit this is abandoned.
    #[error(
        "fold {fold} out of range for trial #{trial_no}: record carries {available} model entries"
    )]
    FoldOutOfRange {
        /// The trial whose record is too short.
        trial_no: u64,
        /// The fold index that was requested.
        fold: usize,
        /// The number of model entries actually present.
        available: usize,
    },

    /// Returned when a series or feature block is applied to a surface that
    /// never registered the matching capability.
    #[error("surface capability {0:?} was not registered before use")]
    MissingCapability(crate::surface::Capability),

    /// Returned when a surface operation is attempted after `dispose`.
    #[error("rendering surface has been disposed")]
    SurfaceDisposed,

    /// Returned when a chart operation is attempted after `unmount`.
    #[error("chart is not mounted")]
    NotMounted,

    /// Returned when the HTML surface cannot write its output file.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Returned when an incoming action payload is malformed JSON.
    ///
    /// An action with an *unrecognized kind* is not an error; only payloads
    /// that cannot be decoded at all land here.
    #[cfg(feature = "serde")]
    #[error("malformed action payload: {0}")]
    Decode(String),
}

pub type Result<T> = core::result::Result<T, Error>;
