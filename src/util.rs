use std::fs::File;
use std::path::{Path, PathBuf};

/// Opens `path`, annotating failures with the kind of file being opened.
pub fn open(path: &Path, kind: &'static str) -> Result<File, OpenError> {
    File::open(path).map_err(|err| OpenError {
        kind,
        path: path.to_owned(),
        err,
    })
}

#[derive(Debug, thiserror::Error)]
#[error("opening {kind} file `{}`: {err}", path.display())]
pub struct OpenError {
    pub kind: &'static str,
    pub path: PathBuf,
    #[source]
    pub err: std::io::Error,
}
