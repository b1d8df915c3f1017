use std::fmt;
use std::path::PathBuf;

/// Largest document the backend accepts, in bytes.
pub const MAX_UPLOAD_BYTES: u64 = 256 * 1024 * 1024;

pub const ALLOWED_EXTENSIONS: [&str; 5] = ["pdf", "txt", "doc", "docx", "md"];

/// A local file the user picked for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileCandidate {
    pub name: String,
    pub size: u64,
    pub path: PathBuf,
}

impl FileCandidate {
    pub fn new(name: impl Into<String>, size: u64, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            size,
            path: path.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    Duplicate { name: String },
    TooLarge { name: String, size: u64 },
    ExtensionNotAllowed { name: String },
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::Duplicate { name } => write!(f, "The file \"{name}\" already exists"),
            Rejection::TooLarge { name, .. } => {
                write!(f, "The file {name} is too large (max 256 MB)")
            }
            Rejection::ExtensionNotAllowed { name } => write!(f, "File type not allowed: {name}"),
        }
    }
}

/// Checks a candidate against the listed names, the size cap and the
/// extension allow-list, in that order.
pub fn validate_candidate<'a, I>(candidate: &FileCandidate, listed: I) -> Result<(), Rejection>
where
    I: IntoIterator<Item = &'a str>,
{
    if listed.into_iter().any(|name| name == candidate.name) {
        return Err(Rejection::Duplicate {
            name: candidate.name.clone(),
        });
    }
    if candidate.size > MAX_UPLOAD_BYTES {
        return Err(Rejection::TooLarge {
            name: candidate.name.clone(),
            size: candidate.size,
        });
    }
    if !has_allowed_extension(&candidate.name) {
        return Err(Rejection::ExtensionNotAllowed {
            name: candidate.name.clone(),
        });
    }
    Ok(())
}

pub fn has_allowed_extension(name: &str) -> bool {
    match name.rsplit_once('.') {
        Some((_, ext)) => ALLOWED_EXTENSIONS
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(ext)),
        None => false,
    }
}
