use super::*;
use crate::error::{Error, Result};
use crate::txt_data::DataFile;
use lazy_static::lazy_static;
use log::{debug, warn};
use regex::Regex;

lazy_static! {
    static ref A_RECORD_REGEX: Regex = Regex::new(r"^A(\w{3})(\w{3})(.*)$").unwrap();
    static ref DATE_RECORD_REGEX: Regex = Regex::new(r"^HFDTE(?:DATE:)?(\d{2})(\d{2})(\d{2})").unwrap();
    static ref H_RECORD_REGEX: Regex = Regex::new(r"^H[FOP]([A-Z]{3})[^:]*:(.*)$").unwrap();
    static ref L_RECORD_REGEX: Regex = Regex::new(r"^L(\w{3})(.*)$").unwrap();
}

const B_RECORD_DELIM: &[(usize, usize)] = &[
    (0, 1),  // Type
    (1, 2),  // Hour
    (3, 2),  // Minute
    (5, 2),  // Second
    (7, 7),  // Lat DDMMmmm
    (14, 1), // N/S
    (15, 8), // Lon DDDMMmmm
    (23, 1), // E/W
    (24, 1), // Fix validity
    (25, 5), // Pressure altitude
    (30, 5), // GPS altitude
];

/// Record groups of one IGC flight log.
#[derive(Debug, Default)]
pub struct IgcLog {
    ready: bool,
    device: Option<DeviceInfo>,
    date: Option<DateInfo>,
    headers: Vec<HeaderEntry>,
    extensions: Vec<ExtensionEntry>,
    fixes: Vec<FixRecord>,
}

impl IgcLog {
    pub fn new() -> Self {
        IgcLog::default()
    }

    #[cfg(test)]
    pub fn parse_str(igc: &str) -> Result<IgcLog> {
        let mut log = IgcLog::new();
        log.parse(&DataFile::from(igc))?;
        Ok(log)
    }

    /// Replaces any previously parsed records. The log is ready only if this succeeds.
    pub fn parse(&mut self, data: &DataFile) -> Result<()> {
        *self = IgcLog::default();

        let mut device = None;
        let mut date = None;
        let mut headers = Vec::new();
        let mut extensions = Vec::new();

        for line in data.lines() {
            if let Some(cap) = A_RECORD_REGEX.captures(line) {
                if device.is_none() {
                    device = Some(get_device(&cap[1], &cap[2], &cap[3])?);
                }
            } else if let Some(cap) = DATE_RECORD_REGEX.captures(line) {
                date = Some(DateInfo {
                    day: cap[1].to_owned(),
                    month: cap[2].to_owned(),
                    year: cap[3].to_owned(),
                });
            } else if let Some(cap) = H_RECORD_REGEX.captures(line) {
                if &cap[1] != "DTE" {
                    headers.push(HeaderEntry {
                        code: cap[1].to_owned(),
                        value: cap[2].to_owned(),
                    });
                }
            } else if let Some(cap) = L_RECORD_REGEX.captures(line) {
                extensions.push(ExtensionEntry { text: cap[2].to_owned() });
            }
        }

        let fixes = data
            .records("B", B_RECORD_DELIM)
            .map(|r| FixRecord {
                hour: r[1].to_owned(),
                minute: r[2].to_owned(),
                second: r[3].to_owned(),
                latitude: r[4].to_owned(),
                lat_hemisphere: hemisphere(r[5]),
                longitude: r[6].to_owned(),
                lon_hemisphere: hemisphere(r[7]),
                pressure_altitude: r[9].to_owned(),
                gps_altitude: r[10].to_owned(),
            })
            .collect::<Vec<_>>();

        let device = device.ok_or_else(|| file_format("missing A record"))?;
        let date = date.ok_or_else(|| file_format("missing date record"))?;
        if fixes.is_empty() {
            return Err(file_format("no B records"));
        }

        debug!(
            "Parsed {} headers, {} L records, {} fixes",
            headers.len(),
            extensions.len(),
            fixes.len()
        );

        *self = IgcLog {
            ready: true,
            device: Some(device),
            date: Some(date),
            headers,
            extensions,
            fixes,
        };
        Ok(())
    }
}

impl RecordSource for IgcLog {
    fn ready(&self) -> bool {
        self.ready
    }

    fn device_info(&self) -> Option<&DeviceInfo> {
        self.device.as_ref()
    }

    fn date_info(&self) -> Option<&DateInfo> {
        self.date.as_ref()
    }

    fn header_entries(&self) -> &[HeaderEntry] {
        &self.headers
    }

    fn extension_entries(&self) -> &[ExtensionEntry] {
        &self.extensions
    }

    fn fix_records(&self) -> &[FixRecord] {
        &self.fixes
    }
}

fn get_device(manufacturer: &str, id: &str, rest: &str) -> Result<DeviceInfo> {
    let name = rest.trim();
    let name = if name.is_empty() { None } else { Some(name.to_owned()) };

    DeviceInfoBuilder::default()
        .manufacturer(manufacturer)
        .id(id)
        .name(name)
        .build()
        .map_err(|e| file_format(e.to_string()))
}

fn hemisphere(field: &str) -> char {
    let tag = field.chars().next().unwrap_or(' ');
    if tag == ' ' {
        warn!("B record without hemisphere tag");
    }
    tag
}

fn file_format<S: Into<String>>(reason: S) -> Error {
    Error::FileFormat { reason: reason.into() }
}

#[cfg(test)]
pub(crate) const SAMPLE_IGC: &str = "AXSX001 SkyTraxx 2.1\r
HFDTE120723\r
HFFXA035\r
HFPLTPILOTINCHARGE:Jane Doe\r
HFCIDCOMPETITIONID: \r
HFGTYGLIDERTYPE:Advance Sigma 10\r
HOSITSite:Lakeside\r
LXSXMC:3.5 MS:-1.2 MSP:45.0 Dist:120.3\r
B1015304730500N00830250EA0123401300\r
B1015354730600N00830350EA0124001310\r
B101540\r
B1015454730700S00830450WA0125001320\r
";
