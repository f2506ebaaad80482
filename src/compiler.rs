//! Compiles parsed IGC record groups into a KML track document.
//!
//! The track is emitted as a `gx:Track`, which lists all `when` timestamps
//! first and all `gx:coord` tuples second. Both lists are derived together
//! from the fix records so the n-th timestamp always belongs to the n-th
//! coordinate.

use crate::error::{Error, Result};
use crate::geo::LatLon;
use crate::igc::{DateInfo, DeviceInfo, FixRecord, HeaderEntry, RecordSource};
use crate::stats;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, TimeZone, Utc};
use derive_builder::Builder;
use itertools::Itertools;
use quick_xml::events::{BytesCData, BytesDecl, BytesText, Event};
use quick_xml::Writer;

const XMLNS_KML: &str = "http://www.opengis.net/kml/2.2";
const XMLNS_GX: &str = "http://www.google.com/kml/ext/2.2";
const TRACK_ICON: &str = "http://earth.google.com/images/kml-icons/track-directional/track-0.png";
const LINE_COLOR: &str = "99ffac59";
const LINE_WIDTH: &str = "4";

static HEADER_LABELS: &[(&str, &str)] = &[
    ("PLT", "Pilot"),
    ("CID", "Competition ID"),
    ("GTY", "Glider"),
    ("GID", "Glider ID"),
    ("CCL", "Competition class"),
    ("SIT", "Site"),
];

type XmlWriter = Writer<Vec<u8>>;

#[derive(Debug, Builder, Clone, PartialEq, Eq)]
#[builder(setter(into))]
pub struct TrackOptions {
    pub name: String,
    /// `clampToGround` instead of `absolute` altitude mode
    #[builder(default)]
    pub clamp: bool,
    #[builder(default)]
    pub extrude: bool,
    /// Use GPS instead of pressure altitude
    #[builder(default)]
    pub gps_altitude: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledDocument {
    html: String,
    kml: String,
}

impl CompiledDocument {
    /// Balloon description embedded in the placemark.
    pub fn html(&self) -> &str {
        &self.html
    }

    pub fn kml(&self) -> &str {
        &self.kml
    }
}

#[derive(Debug, Default)]
pub struct Compiler {
    last: Option<CompiledDocument>,
}

impl Compiler {
    pub fn new() -> Self {
        Compiler::default()
    }

    /// The most recent successfully compiled document.
    pub fn last_document(&self) -> Option<&CompiledDocument> {
        self.last.as_ref()
    }

    /// Compiles `source` into a new document, replacing the retained one.
    ///
    /// On error the previously retained document is left untouched.
    pub fn compile<S>(&mut self, source: &S, options: &TrackOptions) -> Result<&CompiledDocument>
    where
        S: RecordSource + ?Sized,
    {
        if !source.ready() {
            return Err(Error::state("not ready to compile"));
        }
        let not_ready = || Error::state("not ready to compile");
        let device = source.device_info().ok_or_else(not_ready)?;
        let date = source.date_info().ok_or_else(not_ready)?;

        let html = description(source, device, date)?;
        let snippet = snippet(source.header_entries(), date);
        let samples = track_samples(date, source.fix_records(), options.gps_altitude)?;
        let kml = track_document(options, &snippet, &html, &samples)?;

        Ok(&*self.last.insert(CompiledDocument { html, kml }))
    }
}

struct TrackSample {
    when: String,
    coord: String,
}

fn new_writer() -> XmlWriter {
    Writer::new_with_indent(Vec::new(), b' ', 2)
}

fn finish(writer: XmlWriter) -> Result<String> {
    Ok(String::from_utf8(writer.into_inner())?)
}

fn header_label(code: &str) -> Option<&'static str> {
    HEADER_LABELS.iter().find(|(c, _)| *c == code).map(|&(_, label)| label)
}

fn label_value(w: &mut XmlWriter, label: &str, value: &str) -> quick_xml::Result<()> {
    w.create_element("strong")
        .write_text_content(BytesText::new(&format!("{}:", label)))?;
    w.create_element("dfn").write_text_content(BytesText::new(value))?;
    w.create_element("br").write_empty()?;
    Ok(())
}

fn description<S>(source: &S, device: &DeviceInfo, date: &DateInfo) -> Result<String>
where
    S: RecordSource + ?Sized,
{
    let mut writer = new_writer();
    writer
        .create_element("div")
        .with_attribute(("style", "width: 250;"))
        .write_inner_content(|w| {
            if let Some(name) = &device.name {
                w.create_element("p")
                    .write_inner_content(|w| label_value(w, "Device", name))?;
            }

            w.create_element("p").write_inner_content(|w| {
                for h in source.header_entries() {
                    let value = h.value.trim();
                    match header_label(&h.code) {
                        Some(label) if !value.is_empty() => label_value(w, label, value)?,
                        _ => (),
                    }
                }
                label_value(w, "Date", &date.label())
            })?;

            if let Some(vendor) = stats::vendor(&device.manufacturer) {
                for entry in source.extension_entries() {
                    let found = vendor.scan(&entry.text);
                    if found.is_empty() {
                        continue;
                    }
                    w.create_element("p").write_inner_content(|w| {
                        for stat in &found {
                            label_value(w, stat.label, &stat.display_value())?;
                        }
                        Ok::<(), quick_xml::Error>(())
                    })?;
                }
            }
            Ok::<(), quick_xml::Error>(())
        })?;
    finish(writer)
}

fn snippet(headers: &[HeaderEntry], date: &DateInfo) -> String {
    let mut summary = String::from("Flight");
    for h in headers.iter().filter(|h| h.code == "SIT") {
        let site = h.value.trim();
        if !site.is_empty() {
            summary += &format!(" from {}", site);
        }
    }
    summary += &format!(" on {}", date.label());
    summary
}

fn number(field: &str, what: &str) -> Result<u32> {
    field
        .parse()
        .map_err(|_| Error::format(format!("{} {:?} is not numeric", what, field)))
}

fn flight_date(date: &DateInfo) -> Result<NaiveDate> {
    let year = 2000 + number(&date.year, "year")? as i32;
    let month = number(&date.month, "month")?;
    let day = number(&date.day, "day")?;
    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| Error::format(format!("invalid date {}", date.label())))
}

// Fixes are placed on the date record's day; midnight rollover is not detected.
fn fix_time(day: NaiveDate, fix: &FixRecord) -> Result<NaiveDateTime> {
    let time = NaiveTime::from_hms_opt(
        number(&fix.hour, "hour")?,
        number(&fix.minute, "minute")?,
        number(&fix.second, "second")?,
    )
    .ok_or_else(|| {
        Error::format(format!("invalid time {}:{}:{}", fix.hour, fix.minute, fix.second))
    })?;
    Ok(day.and_time(time))
}

fn altitude(field: &str) -> Result<f64> {
    field
        .parse()
        .map_err(|_| Error::format(format!("altitude {:?} is not numeric", field)))
}

fn track_samples(date: &DateInfo, fixes: &[FixRecord], gps_altitude: bool) -> Result<Vec<TrackSample>> {
    let day = flight_date(date)?;

    fixes
        .iter()
        .map(|fix| {
            let when = Utc
                .from_utc_datetime(&fix_time(day, fix)?)
                .to_rfc3339_opts(SecondsFormat::Secs, false);

            let pos = LatLon::from_igc(
                &fix.latitude,
                fix.lat_hemisphere,
                &fix.longitude,
                fix.lon_hemisphere,
            )?;
            let alt = if gps_altitude {
                altitude(&fix.gps_altitude)?
            } else {
                altitude(&fix.pressure_altitude)?
            };
            // Debug formatting keeps the fractional part of whole numbers and
            // switches to exponent form near zero (1.6666666666666667e-5)
            let coord = [pos.lon(), pos.lat(), alt].iter().map(|v| format!("{:?}", v)).join(" ");

            Ok(TrackSample { when, coord })
        })
        .collect()
}

fn track_document(options: &TrackOptions, snippet: &str, html: &str, samples: &[TrackSample]) -> Result<String> {
    let mut writer = new_writer();
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    writer
        .create_element("kml")
        .with_attribute(("xmlns", XMLNS_KML))
        .with_attribute(("xmlns:gx", XMLNS_GX))
        .write_inner_content(|w| {
            w.create_element("Placemark").write_inner_content(|w| {
                w.create_element("name")
                    .write_text_content(BytesText::new(&options.name))?;
                w.create_element("Snippet")
                    .with_attribute(("maxLines", "2"))
                    .write_text_content(BytesText::new(snippet))?;
                w.create_element("description")
                    .write_cdata_content(BytesCData::new(html))?;
                write_style(w)?;
                write_track(w, options, samples)
            })?;
            Ok::<(), quick_xml::Error>(())
        })?;
    finish(writer)
}

fn write_style(w: &mut XmlWriter) -> quick_xml::Result<()> {
    w.create_element("Style").write_inner_content(|w| {
        w.create_element("IconStyle").write_inner_content(|w| {
            w.create_element("Icon").write_inner_content(|w| {
                w.create_element("href")
                    .write_text_content(BytesText::new(TRACK_ICON))?;
                Ok::<(), quick_xml::Error>(())
            })?;
            Ok::<(), quick_xml::Error>(())
        })?;
        w.create_element("LineStyle").write_inner_content(|w| {
            w.create_element("color")
                .write_text_content(BytesText::new(LINE_COLOR))?;
            w.create_element("width")
                .write_text_content(BytesText::new(LINE_WIDTH))?;
            Ok::<(), quick_xml::Error>(())
        })?;
        Ok::<(), quick_xml::Error>(())
    })?;
    Ok(())
}

fn write_track(w: &mut XmlWriter, options: &TrackOptions, samples: &[TrackSample]) -> quick_xml::Result<()> {
    w.create_element("gx:Track").write_inner_content(|w| {
        let mode = if options.clamp { "clampToGround" } else { "absolute" };
        w.create_element("altitudeMode")
            .write_text_content(BytesText::new(mode))?;
        let extrude = if options.extrude { "1" } else { "0" };
        w.create_element("extrude")
            .write_text_content(BytesText::new(extrude))?;

        for s in samples {
            w.create_element("when").write_text_content(BytesText::new(&s.when))?;
        }
        for s in samples {
            w.create_element("gx:coord")
                .write_text_content(BytesText::new(&s.coord))?;
        }
        Ok::<(), quick_xml::Error>(())
    })?;
    Ok(())
}
