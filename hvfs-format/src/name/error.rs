use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntoEntryNameError {
    UnrepresentableStr,
    ContainsNul,
    Empty,
}

impl std::error::Error for IntoEntryNameError {}

impl fmt::Display for IntoEntryNameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl IntoEntryNameError {
    pub fn as_str(&self) -> &str {
        match self {
            IntoEntryNameError::UnrepresentableStr => "unrepresentable string found in path",
            IntoEntryNameError::ContainsNul => "name contains a NUL byte",
            IntoEntryNameError::Empty => "no name provided",
        }
    }

    pub fn as_io_error(&self) -> std::io::Error {
        use std::io::{Error, ErrorKind};
        Error::new(ErrorKind::InvalidInput, self.as_str())
    }
}
