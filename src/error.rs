use thiserror::Error;

/// Domain errors for the scrape pipeline.
///
/// During the enrichment phase `Fetch` and `ControlNotFound` are recoverable:
/// the affected game keeps an empty genre list and the run continues. During
/// the listing phase any of these is fatal.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// Navigation, scrolling, or page evaluation failed.
    #[error("fetch failed: {0}")]
    Fetch(String),

    /// An expected page control is missing, e.g. the age-gate year select.
    #[error("control not found: {0}")]
    ControlNotFound(String),

    /// A group label matched no known normalization rule.
    #[error("malformed group label: {0:?}")]
    MalformedGroupLabel(String),

    /// The intermediate document could not be read or parsed.
    #[error("decode failed: {0}")]
    Decode(String),
}
