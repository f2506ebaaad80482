use derive_builder::Builder;

pub mod parse;

/// Flight recorder identity taken from the A record.
#[derive(Debug, Builder, Clone, PartialEq, Eq)]
#[builder(setter(into))]
pub struct DeviceInfo {
    pub manufacturer: String,
    pub id: String,
    #[builder(default)]
    pub name: Option<String>,
}

/// Flight date as recorded, two digits per field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateInfo {
    pub day: String,
    pub month: String,
    pub year: String,
}

impl DateInfo {
    /// `DD.MM.YY`, exactly as recorded.
    pub fn label(&self) -> String {
        format!("{}.{}.{}", self.day, self.month, self.year)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderEntry {
    pub code: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionEntry {
    pub text: String,
}

/// One B record, fields kept as recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixRecord {
    pub hour: String,
    pub minute: String,
    pub second: String,
    pub latitude: String,
    pub lat_hemisphere: char,
    pub longitude: String,
    pub lon_hemisphere: char,
    pub pressure_altitude: String,
    pub gps_altitude: String,
}

/// Parsed record groups a track document is compiled from.
///
/// `device_info` and `date_info` are only guaranteed once `ready` is true.
pub trait RecordSource {
    fn ready(&self) -> bool;
    fn device_info(&self) -> Option<&DeviceInfo>;
    fn date_info(&self) -> Option<&DateInfo>;
    fn header_entries(&self) -> &[HeaderEntry];
    fn extension_entries(&self) -> &[ExtensionEntry];
    fn fix_records(&self) -> &[FixRecord];
}
