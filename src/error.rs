use custom_error::custom_error;
use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

custom_error! {pub Error
    Format{reason: String} = "Malformed field: {reason}",
    State{reason: String} = "Invalid state: {reason}",
    FileFormat{reason: String} = "Invalid IGC file: {reason}",
    FileRead{path: PathBuf, source: std::io::Error} = @{ format!("Could not read {}", path.display()) },
    WriteProtected{dir: PathBuf} = @{ format!("Destination is write-protected: {}", dir.display()) },
    NotADirectory{dir: PathBuf} = @{ format!("Destination is not a directory: {}", dir.display()) },
    DestinationMissing{dir: PathBuf} = @{ format!("Destination does not exist: {}", dir.display()) },
    Io{source: std::io::Error} = "I/O error",
    Utf8{source: std::string::FromUtf8Error} = "Generated document is not UTF-8",
    XML{quick_xml: quick_xml::Error} = "XML error"
}

impl From<quick_xml::Error> for Error {
    fn from(e: quick_xml::Error) -> Error {
        Error::XML { quick_xml: e }
    }
}

impl Error {
    pub fn format<S: Into<String>>(reason: S) -> Error {
        Error::Format { reason: reason.into() }
    }

    pub fn state<S: Into<String>>(reason: S) -> Error {
        Error::State { reason: reason.into() }
    }
}
