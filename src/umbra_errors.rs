use thiserror::Error;

/// Crate-wide error type.
///
/// Failures coming from the caller-supplied position provider are carried
/// through unchanged inside [`UmbraError::PositionProvider`]; the crate adds
/// no translation or recovery on top of them.
#[derive(Error, Debug)]
pub enum UmbraError {
    #[error("position provider failure: {0}")]
    PositionProvider(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("eclipse search exhausted after {tried} lunations starting from {start}")]
    SearchExhausted { start: i32, tried: u32 },

    #[error("instant {instant} is outside the elements window [{min}, {max}] (MJD TT)")]
    OutsideElementsWindow { instant: f64, min: f64, max: f64 },

    #[error("polynomial fit is singular; the sampled geometry may be degenerate")]
    SingularFit,

    #[error("location catalog record {record}: {message}")]
    LocationCatalog { record: u64, message: String },

    #[error("Unable to perform file operation: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("NaN in site coordinates: {0}")]
    NanCoordinate(#[from] ordered_float::FloatIsNan),
}

impl UmbraError {
    /// Wrap an arbitrary upstream error as a position-provider failure.
    pub fn provider<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        UmbraError::PositionProvider(err.into())
    }
}
