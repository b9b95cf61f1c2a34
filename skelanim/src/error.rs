use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("no source has markers '{start}' and '{stop}' for group '{group}'")]
    MarkersNotFound {
        group: String,
        start: String,
        stop: String,
    },

    #[error("markers '{start}' and '{stop}' for group '{group}' enclose an empty interval")]
    EmptyInterval {
        group: String,
        start: String,
        stop: String,
    },

    #[error("no skeleton root has been set")]
    NoSkeleton,

    #[error("invalid value: {message}")]
    InvalidValue { message: String },

    #[error("failed to load animation source '{path}': {message}")]
    SourceLoad { path: String, message: String },

    #[cfg(feature = "json")]
    #[error("failed to parse JSON source: {message}")]
    JsonParse { message: String },
}
