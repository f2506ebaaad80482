use lazy_static::lazy_static;
use regex::Regex;

/// A statistic a vendor writes into its L records as `key:value`.
#[derive(Debug)]
pub struct StatKind {
    pub key: &'static str,
    pub label: &'static str,
    pub unit: &'static str,
}

#[derive(Debug)]
pub struct Vendor {
    pub code: &'static str,
    pub stats: &'static [StatKind],
}

pub static VENDORS: &[Vendor] = &[Vendor {
    code: "XSX",
    stats: &[
        StatKind { key: "MC", label: "Max. climb", unit: "m/s" },
        StatKind { key: "MS", label: "Max. sink", unit: "m/s" },
        StatKind { key: "MSP", label: "Max. speed", unit: "km/h" },
        StatKind { key: "Dist", label: "Track distance", unit: "km" },
    ],
}];

/// One recognized statistic, value kept as written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stat {
    pub label: &'static str,
    pub value: String,
    pub unit: &'static str,
}

impl Stat {
    pub fn display_value(&self) -> String {
        format!("{} {}", self.value, self.unit)
    }
}

pub fn vendor(manufacturer: &str) -> Option<&'static Vendor> {
    VENDORS.iter().find(|v| v.code == manufacturer)
}

impl Vendor {
    /// Recognized statistics in `text`, in order of appearance. Unknown keys are dropped.
    pub fn scan(&self, text: &str) -> Vec<Stat> {
        lazy_static! {
            static ref KEY_VALUE_REGEX: Regex = Regex::new(r"(\w*):(-?\d+(?:[.,]\d+)?)").unwrap();
        }

        KEY_VALUE_REGEX
            .captures_iter(text)
            .filter_map(|cap| {
                let kind = self.stats.iter().find(|s| s.key == &cap[1])?;
                Some(Stat {
                    label: kind.label,
                    value: cap[2].to_owned(),
                    unit: kind.unit,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scans_known_keys_in_order() {
        let stats = vendor("XSX").unwrap().scan("MC:3.5 MS:-1.2 MSP:45.0 Dist:120.3");
        let rendered: Vec<_> = stats.iter().map(|s| (s.label, s.display_value())).collect();
        assert_eq!(
            rendered,
            vec![
                ("Max. climb", "3.5 m/s".to_owned()),
                ("Max. sink", "-1.2 m/s".to_owned()),
                ("Max. speed", "45.0 km/h".to_owned()),
                ("Track distance", "120.3 km".to_owned()),
            ]
        );
    }

    #[test]
    fn ignores_unknown_keys() {
        let stats = vendor("XSX").unwrap().scan("FOO:1.0 MSP:12 BAR:-3");
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].display_value(), "12 km/h");
    }

    #[test]
    fn keeps_decimal_comma_values_whole() {
        let stats = vendor("XSX").unwrap().scan("MC:3,5 MSP:5 Dist:1.");
        let rendered: Vec<_> = stats.iter().map(Stat::display_value).collect();
        assert_eq!(rendered, vec!["3,5 m/s", "5 km/h", "1 km"]);
    }

    #[test]
    fn unknown_vendor_has_no_table() {
        assert!(vendor("XCT").is_none());
    }
}
