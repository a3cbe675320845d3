use std::path::PathBuf;

/// Result alias that carries the custom [`HuesError`] type.
pub type Result<T> = std::result::Result<T, HuesError>;

/// Common error type for the core crate.
#[derive(Debug, thiserror::Error)]
pub enum HuesError {
    /// Free-form failure, mostly raised by the command line front end.
    #[error("{0}")]
    Message(String),
    /// The pack catalog could not be built.
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    /// A song track or image could not be decoded.
    #[error(transparent)]
    Decode(#[from] DecodeError),
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
}

impl HuesError {
    /// Creates a new error that simply wraps the provided message.
    pub fn msg<T: Into<String>>(msg: T) -> Self {
        Self::Message(msg.into())
    }
}

/// Reasons a [`crate::ResourcePack`] fails to initialise.
///
/// Any of these leaves the pack uninitialised and its catalog empty.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("metadata file `{}` not found", .path.display())]
    FileNotFound { path: PathBuf },
    #[error("failed to read `{}`: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed metadata in `{}`: {message}", .path.display())]
    Parse { path: PathBuf, message: String },
    #[error("`{}`: entry {index} is missing required field `{field}`", .path.display())]
    MissingField {
        path: PathBuf,
        index: usize,
        field: &'static str,
    },
    #[error("resource pack at `{}` is already initialised", .path.display())]
    AlreadyInitialized { path: PathBuf },
}

/// Failure to turn a backing file into PCM or pixel data.
///
/// Decode errors are local to one track or image.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("no backing file for `{name}` under `{}`", .dir.display())]
    FileNotFound { dir: PathBuf, name: String },
    #[error("failed to open `{}`: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("audio decode failed for `{}`: {message}", .path.display())]
    Audio { path: PathBuf, message: String },
    #[error("image decode failed for `{}`: {message}", .path.display())]
    Image { path: PathBuf, message: String },
    #[error("decoded PCM is inconsistent: {0}")]
    InconsistentPcm(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_errors_name_the_offending_file() {
        let err = CatalogError::MissingField {
            path: PathBuf::from("pack/songs.xml"),
            index: 3,
            field: "title",
        };
        let text = err.to_string();
        assert!(text.contains("songs.xml"));
        assert!(text.contains("title"));
    }

    #[test]
    fn wraps_decode_errors_transparently() {
        let err: HuesError = DecodeError::InconsistentPcm("odd length".into()).into();
        assert_eq!(err.to_string(), "decoded PCM is inconsistent: odd length");
    }
}
