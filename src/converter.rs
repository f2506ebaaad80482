use crate::compiler::{Compiler, TrackOptionsBuilder};
use crate::error::{Error, Result};
use crate::igc::parse::IgcLog;
use crate::igc::RecordSource;
use crate::txt_data::{DataFile, Encoding};
use log::{debug, info};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Converts one IGC file to KML: `parse`, then `compile`, then `export`.
#[derive(Debug)]
pub struct Converter {
    log: IgcLog,
    compiler: Compiler,
    path: Option<PathBuf>,
}

impl Converter {
    pub fn new() -> Self {
        Converter {
            log: IgcLog::new(),
            compiler: Compiler::new(),
            path: None,
        }
    }

    pub fn parse<P: AsRef<Path>>(&mut self, path: P, encoding: Encoding) -> Result<()> {
        let path = path.as_ref();
        info!("Parsing {}...", path.display());
        self.path = None;
        self.compiler = Compiler::new();

        let data = DataFile::from_file(path, encoding)?;
        self.log.parse(&data)?;
        if let Some(device) = self.log.device_info() {
            debug!("Recorded by {}{}", device.manufacturer, device.id);
        }
        self.path = Some(path.to_path_buf());
        Ok(())
    }

    pub fn compile(&mut self, clamp: bool, extrude: bool, gps_altitude: bool) -> Result<()> {
        let path = match &self.path {
            Some(path) if self.log.ready() => path,
            _ => return Err(Error::state("cannot compile without preceding parse")),
        };

        let options = TrackOptionsBuilder::default()
            .name(track_name(path))
            .clamp(clamp)
            .extrude(extrude)
            .gps_altitude(gps_altitude)
            .build()
            .map_err(|e| Error::state(e.to_string()))?;

        info!("Compiling {} fixes...", self.log.fix_records().len());
        let doc = self.compiler.compile(&self.log, &options)?;
        debug!("Description:\n{}", doc.html());
        Ok(())
    }

    /// Writes `<dir>/<input stem>.kml`; `dir` defaults to the input's directory.
    pub fn export(&self, dir: Option<&Path>) -> Result<PathBuf> {
        let kml = self
            .kml()
            .ok_or_else(|| Error::state("cannot export before compile"))?;
        let path = self
            .path
            .as_ref()
            .ok_or_else(|| Error::state("cannot export before compile"))?;

        let dir = match dir {
            Some(dir) => dir.to_path_buf(),
            None => path.parent().map(Path::to_path_buf).unwrap_or_default(),
        };
        let dir = if dir.as_os_str().is_empty() { PathBuf::from(".") } else { dir };

        if !dir.exists() {
            return Err(Error::DestinationMissing { dir });
        }
        if !dir.is_dir() {
            return Err(Error::NotADirectory { dir });
        }

        let dest = dir.join(format!("{}.kml", track_name(path)));
        info!("Writing {}...", dest.display());
        let mut file = std::fs::File::create(&dest).map_err(|e| match e.kind() {
            ErrorKind::PermissionDenied => Error::WriteProtected { dir: dir.clone() },
            ErrorKind::NotFound => Error::DestinationMissing { dir: dir.clone() },
            _ => Error::Io { source: e },
        })?;
        file.write_all(kml.as_bytes())?;
        Ok(dest)
    }

    pub fn kml(&self) -> Option<&str> {
        self.compiler.last_document().map(|doc| doc.kml())
    }
}

impl Default for Converter {
    fn default() -> Self {
        Converter::new()
    }
}

fn track_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::igc::parse::SAMPLE_IGC;
    use tempfile::TempDir;

    fn sample_file(dir: &TempDir) -> PathBuf {
        let path = dir.path().join("2023-07-12-XSX-001.igc");
        std::fs::write(&path, SAMPLE_IGC).unwrap();
        path
    }

    #[test]
    fn converts_file_next_to_input() {
        let dir = tempfile::tempdir().unwrap();
        let input = sample_file(&dir);

        let mut converter = Converter::new();
        converter.parse(&input, Encoding::Latin1).unwrap();
        converter.compile(false, true, true).unwrap();
        let dest = converter.export(None).unwrap();

        assert_eq!(dest, dir.path().join("2023-07-12-XSX-001.kml"));
        let written = std::fs::read_to_string(&dest).unwrap();
        assert_eq!(Some(written.as_str()), converter.kml());
        assert!(written.contains("<name>2023-07-12-XSX-001</name>"));
        assert!(written.contains("<extrude>1</extrude>"));
    }

    #[test]
    fn exports_to_alternative_directory() {
        let input_dir = tempfile::tempdir().unwrap();
        let output_dir = tempfile::tempdir().unwrap();
        let input = sample_file(&input_dir);

        let mut converter = Converter::new();
        converter.parse(&input, Encoding::Utf8).unwrap();
        converter.compile(true, false, false).unwrap();
        let dest = converter.export(Some(output_dir.path())).unwrap();
        assert!(dest.starts_with(output_dir.path()));
        assert!(dest.is_file());
    }

    #[test]
    fn enforces_call_order() {
        let mut converter = Converter::new();
        assert!(matches!(converter.compile(false, false, false), Err(Error::State { .. })));
        assert!(matches!(converter.export(None), Err(Error::State { .. })));

        let dir = tempfile::tempdir().unwrap();
        converter.parse(sample_file(&dir), Encoding::Latin1).unwrap();
        assert!(matches!(converter.export(None), Err(Error::State { .. })));
        assert!(converter.kml().is_none());
    }

    #[test]
    fn new_parse_discards_previous_document() {
        let dir = tempfile::tempdir().unwrap();
        let first = sample_file(&dir);
        let second = dir.path().join("second.igc");
        std::fs::write(&second, SAMPLE_IGC).unwrap();

        let mut converter = Converter::new();
        converter.parse(&first, Encoding::Latin1).unwrap();
        converter.compile(false, false, false).unwrap();
        converter.parse(&second, Encoding::Latin1).unwrap();

        assert!(converter.kml().is_none());
        assert!(matches!(converter.export(None), Err(Error::State { .. })));
        assert!(!dir.path().join("second.kml").exists());
    }

    #[test]
    fn failed_parse_blocks_compile() {
        let dir = tempfile::tempdir().unwrap();
        let bad = dir.path().join("empty.igc");
        std::fs::write(&bad, "AXSX001\n").unwrap();

        let mut converter = Converter::new();
        assert!(matches!(converter.parse(&bad, Encoding::Latin1), Err(Error::FileFormat { .. })));
        assert!(matches!(converter.compile(false, false, false), Err(Error::State { .. })));
    }

    #[test]
    fn missing_input_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut converter = Converter::new();
        let result = converter.parse(dir.path().join("nope.igc"), Encoding::Latin1);
        assert!(matches!(result, Err(Error::FileRead { .. })));
    }

    #[test]
    fn reports_bad_destinations() {
        let dir = tempfile::tempdir().unwrap();
        let input = sample_file(&dir);
        let mut converter = Converter::new();
        converter.parse(&input, Encoding::Latin1).unwrap();
        converter.compile(false, false, false).unwrap();

        let missing = dir.path().join("missing");
        assert!(matches!(
            converter.export(Some(missing.as_path())),
            Err(Error::DestinationMissing { .. })
        ));
        assert!(matches!(
            converter.export(Some(input.as_path())),
            Err(Error::NotADirectory { .. })
        ));
    }
}
