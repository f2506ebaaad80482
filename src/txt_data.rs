use crate::error::{Error, Result};
use log::warn;
use std::ops::Index;
use std::path::Path;
use std::str::{FromStr, Lines};

/// Text encoding of a log file on disk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Encoding {
    Latin1,
    Utf8,
}

impl FromStr for Encoding {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match &*s.to_ascii_uppercase() {
            "ISO-8859-1" | "LATIN1" | "LATIN-1" => Ok(Encoding::Latin1),
            "UTF-8" | "UTF8" => Ok(Encoding::Utf8),
            other => Err(format!("unsupported encoding: {}", other)),
        }
    }
}

#[derive(Debug)]
pub struct DataFile {
    buf: String,
}

impl DataFile {
    pub fn from_file<P: AsRef<Path>>(path: P, encoding: Encoding) -> Result<DataFile> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| Error::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(DataFile::from_bytes(&bytes, encoding))
    }

    pub fn from_bytes(bytes: &[u8], encoding: Encoding) -> DataFile {
        let buf = match encoding {
            // ISO-8859-1 code points coincide with the first 256 of Unicode
            Encoding::Latin1 => bytes.iter().map(|&b| char::from(b)).collect(),
            Encoding::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
        };
        DataFile { buf }
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.buf.lines().map(|l| l.trim_end_matches('\r'))
    }
}

impl From<&str> for DataFile {
    fn from(s: &str) -> Self {
        DataFile { buf: s.to_owned() }
    }
}

#[derive(Clone, Copy)]
struct Span(usize, usize);

impl DataFile {
    /// Fixed-width records whose first span equals `ty`.
    pub fn records<'a, 'b>(&'a self, ty: &'b str, delimiters: &'b [(usize, usize)]) -> RecordIter<'a, 'b> {
        let delimiters = delimiters.iter().map(|&(p, l)| Span(p, p + l)).collect::<Vec<_>>();
        RecordIter {
            lines: self.buf.lines(),
            ty,
            delimiters,
        }
    }
}

pub struct RecordIter<'a, 'b> {
    lines: Lines<'a>,
    ty: &'b str,
    delimiters: Vec<Span>,
}

impl<'a, 'b> Iterator for RecordIter<'a, 'b> {
    type Item = Record<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = self.lines.next()?.trim_end_matches('\r');
            let Span(l, r) = self.delimiters[0];
            if line.get(l..r) != Some(self.ty) {
                continue;
            }
            let fields = self
                .delimiters
                .iter()
                .map(|&Span(l, r)| line.get(l..r).map(str::trim))
                .collect::<Option<Vec<_>>>();
            match fields {
                Some(fields) => break Some(Record { fields }),
                None => warn!("Truncated {} record ignored: {:?}", self.ty, line),
            }
        }
    }
}

#[derive(Debug)]
pub struct Record<'a> {
    fields: Vec<&'a str>,
}

impl<'a> Index<usize> for Record<'a> {
    type Output = &'a str;

    fn index(&self, i: usize) -> &Self::Output {
        &self.fields[i]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPANS: &[(usize, usize)] = &[(0, 1), (1, 2), (3, 4)];

    #[test]
    fn slices_matching_lines_only() {
        let data = DataFile::from("B12abcd\nH12abcd\nB34 xy \n");
        let records: Vec<_> = data.records("B", SPANS).collect();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0][1], "12");
        assert_eq!(records[0][2], "abcd");
        assert_eq!(records[1][2], "xy");
    }

    #[test]
    fn skips_truncated_lines() {
        let data = DataFile::from("B12ab\r\nB56wxyz\r\n");
        let records: Vec<_> = data.records("B", SPANS).collect();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0][2], "wxyz");
    }

    #[test]
    fn decodes_latin1_bytes() {
        let data = DataFile::from_bytes(b"HFPLTPILOT:J\xfcrgen\r\n", Encoding::Latin1);
        assert_eq!(data.lines().next(), Some("HFPLTPILOT:Jürgen"));
    }

    #[test]
    fn decodes_utf8_bytes() {
        let data = DataFile::from_bytes("HFPLTPILOT:Jürgen\n".as_bytes(), Encoding::Utf8);
        assert_eq!(data.lines().next(), Some("HFPLTPILOT:Jürgen"));
    }

    #[test]
    fn parses_encoding_names() {
        assert_eq!("iso-8859-1".parse::<Encoding>(), Ok(Encoding::Latin1));
        assert_eq!("UTF-8".parse::<Encoding>(), Ok(Encoding::Utf8));
        assert!("koi8-r".parse::<Encoding>().is_err());
    }
}
