use crate::error::{DaikinError, Result};
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A typed value with a string form on the Daikin wire protocol
///
/// Encoding is total; decoding rejects anything outside the type's domain
/// with [`DaikinError::Decode`].
pub trait Parameter: Sized {
    /// Key of this parameter in `set_control_info` requests
    const KEY: &'static str;

    /// Wire representation of the value
    fn encode(&self) -> String;

    /// Parse a wire value, `None` if it is not in the domain
    fn parse(raw: &str) -> Option<Self>;

    /// Decode a wire value, reporting failures against [`Parameter::KEY`]
    fn decode(raw: &str) -> Result<Self> {
        decode_as(Self::KEY, raw)
    }
}

/// Decode `raw` and report failures against `key`.
///
/// Sensor readings reuse the control types under different keys
/// (`htemp`, `otemp`, `hhum`), so the reported field follows the key.
pub(crate) fn decode_as<T: Parameter>(key: &str, raw: &str) -> Result<T> {
    T::parse(raw).ok_or_else(|| DaikinError::decode(key, raw))
}

/// Declares a closed enumerated parameter backed by a single
/// `(variant, wire code, label)` table.
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $name:ident, key = $key:literal,
        { $( $(#[$vmeta:meta])* $variant:ident = $code:literal => $label:literal, )+ }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
        pub enum $name {
            $( $(#[$vmeta])* $variant, )+
        }

        impl $name {
            /// Wire code and display label of every variant
            pub const TABLE: &'static [($name, &'static str, &'static str)] = &[
                $( ($name::$variant, $code, $label), )+
            ];

            /// Wire code sent to the unit
            pub fn code(self) -> &'static str {
                Self::TABLE
                    .iter()
                    .find(|(v, _, _)| *v == self)
                    .map_or("", |&(_, code, _)| code)
            }

            /// Human readable label
            pub fn label(self) -> &'static str {
                Self::TABLE
                    .iter()
                    .find(|(v, _, _)| *v == self)
                    .map_or("", |&(_, _, label)| label)
            }

            /// All variants in table order
            pub fn variants() -> impl Iterator<Item = Self> {
                Self::TABLE.iter().map(|&(v, _, _)| v)
            }

            /// Look up a variant by label (ASCII case-insensitive).
            ///
            /// Labels shared by several variants resolve to the first row.
            pub fn from_label(label: &str) -> Option<Self> {
                Self::TABLE
                    .iter()
                    .find(|(_, _, l)| l.eq_ignore_ascii_case(label))
                    .map(|&(v, _, _)| v)
            }
        }

        impl Parameter for $name {
            const KEY: &'static str = $key;

            fn encode(&self) -> String {
                self.code().to_string()
            }

            fn parse(raw: &str) -> Option<Self> {
                Self::TABLE
                    .iter()
                    .find(|(_, code, _)| *code == raw)
                    .map(|&(v, _, _)| v)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }
    };
}

wire_enum! {
    /// Power status of the unit
    Power, key = "pow", {
        #[default]
        Off = "0" => "Off",
        On = "1" => "On",
    }
}

wire_enum! {
    /// Operating mode. Not every unit supports every mode.
    ///
    /// Units report automatic mode under three codes; each is kept as its
    /// own variant so the value round-trips unchanged.
    Mode, key = "mode", {
        #[default]
        Auto = "0" => "Auto",
        Auto1 = "1" => "Auto",
        Dehumidify = "2" => "Dehumidify",
        Cool = "3" => "Cool",
        Heat = "4" => "Heat",
        Fan = "6" => "Fan",
        Auto7 = "7" => "Auto",
    }
}

wire_enum! {
    /// Fan speed
    Fan, key = "f_rate", {
        #[default]
        Auto = "A" => "Auto",
        Silent = "B" => "Silent",
        Speed1 = "3" => "1",
        Speed2 = "4" => "2",
        Speed3 = "5" => "3",
        Speed4 = "6" => "4",
        Speed5 = "7" => "5",
    }
}

wire_enum! {
    /// Louvre swing setting
    FanDir, key = "f_dir", {
        #[default]
        Stopped = "0" => "Stopped",
        Vertical = "1" => "Vertical",
        Horizontal = "2" => "Horizontal",
        Both = "3" => "Both",
    }
}

impl FanDir {
    /// Louvre setting for the requested sweep axes.
    ///
    /// With no axis requested the louvres are stopped.
    pub fn from_sweep(vertical: bool, horizontal: bool) -> Self {
        match (vertical, horizontal) {
            (true, true) => FanDir::Both,
            (true, false) => FanDir::Vertical,
            (false, true) => FanDir::Horizontal,
            (false, false) => FanDir::Stopped,
        }
    }
}

/// Temperature in degrees Celsius
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct Temperature(pub f64);

impl Parameter for Temperature {
    const KEY: &'static str = "stemp";

    fn encode(&self) -> String {
        format!("{:.1}", self.0)
    }

    fn parse(raw: &str) -> Option<Self> {
        raw.parse::<f64>().ok().map(Temperature)
    }
}

impl fmt::Display for Temperature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}", self.0)
    }
}

/// Relative humidity in percent, `-1` when the unit has no reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Humidity(pub i32);

impl Humidity {
    /// Value the unit uses for "not available" (sent as `-`)
    pub const NOT_AVAILABLE: Humidity = Humidity(-1);

    const NOT_AVAILABLE_WIRE: &'static str = "-";

    pub fn is_available(self) -> bool {
        self != Self::NOT_AVAILABLE
    }
}

impl Parameter for Humidity {
    const KEY: &'static str = "shum";

    fn encode(&self) -> String {
        self.0.to_string()
    }

    fn parse(raw: &str) -> Option<Self> {
        if raw == Self::NOT_AVAILABLE_WIRE {
            return Some(Self::NOT_AVAILABLE);
        }
        raw.parse::<i32>().ok().map(Humidity)
    }
}

impl fmt::Display for Humidity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Characters escaped in a URL path segment: everything except unreserved
/// characters and the sub-delimiters allowed inside a segment.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b'$')
    .remove(b'&')
    .remove(b'+')
    .remove(b':')
    .remove(b'=')
    .remove(b'@');

/// Human readable unit name, path-escaped on the wire
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Name(pub String);

impl Name {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Parameter for Name {
    const KEY: &'static str = "name";

    fn encode(&self) -> String {
        utf8_percent_encode(&self.0, PATH_SEGMENT).to_string()
    }

    fn parse(raw: &str) -> Option<Self> {
        // Every '%' must start a two digit hex escape
        let escapes_valid = raw.split('%').skip(1).all(|rest| {
            rest.as_bytes()
                .get(..2)
                .is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit))
        });
        if !escapes_valid {
            return None;
        }
        // Bytes that are not UTF-8 become U+FFFD
        let name = percent_decode_str(raw).decode_utf8_lossy();
        Some(Name(name.into_owned()))
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn power_round_trips() {
        for p in Power::variants() {
            assert_eq!(Power::decode(&p.encode()).unwrap(), p);
        }
    }

    #[test]
    fn mode_round_trips() {
        for m in Mode::variants() {
            assert_eq!(Mode::decode(&m.encode()).unwrap(), m);
        }
        assert_eq!(Mode::Auto7.encode(), "7");
        assert_eq!(Mode::Auto7.to_string(), "Auto");
    }

    #[test]
    fn fan_round_trips() {
        for f in Fan::variants() {
            assert_eq!(Fan::decode(&f.encode()).unwrap(), f);
        }
        assert_eq!(Fan::Speed1.encode(), "3");
        assert_eq!(Fan::Speed1.to_string(), "1");
    }

    #[test]
    fn fan_dir_round_trips() {
        for d in FanDir::variants() {
            assert_eq!(FanDir::decode(&d.encode()).unwrap(), d);
        }
    }

    #[test]
    fn unknown_codes_are_rejected() {
        match Mode::decode("9") {
            Err(DaikinError::Decode { field, value }) => {
                assert_eq!(field, "mode");
                assert_eq!(value, "9");
            }
            other => panic!("expected decode error, got {:?}", other),
        }
        assert!(Power::decode("2").is_err());
        assert!(Fan::decode("a").is_err());
        assert!(FanDir::decode("03").is_err());
        assert!(FanDir::decode("").is_err());
    }

    #[test]
    fn humidity_sentinel() {
        assert_eq!(Humidity::decode("-").unwrap(), Humidity(-1));
        assert_eq!(Humidity::decode("55").unwrap(), Humidity(55));
        assert_eq!(Humidity(-1).encode(), "-1");
        assert!(!Humidity::NOT_AVAILABLE.is_available());
        assert!(Humidity::decode("abc").is_err());
    }

    #[test]
    fn temperature_one_decimal() {
        assert_eq!(Temperature(22.5).encode(), "22.5");
        assert_eq!(Temperature(22.0).encode(), "22.0");
        assert_eq!(Temperature(-3.0).encode(), "-3.0");
        assert_eq!(Temperature::decode("22.5").unwrap(), Temperature(22.5));
        assert_eq!(Temperature::decode("18").unwrap(), Temperature(18.0));
        assert!(Temperature::decode("abc").is_err());
        assert!(Temperature::decode("-").is_err());
    }

    #[test]
    fn name_escaping() {
        let name = Name::new("Living room/1");
        assert_eq!(name.encode(), "Living%20room%2F1");
        assert_eq!(Name::decode(&name.encode()).unwrap(), name);
        assert_eq!(
            Name::decode("%4c%69%76%69%6e%67").unwrap(),
            Name::new("Living")
        );
        assert_eq!(Name::decode("a+b").unwrap(), Name::new("a+b"));
    }

    #[test]
    fn name_rejects_bad_escapes() {
        assert!(Name::decode("bad%zzescape").is_err());
        assert!(Name::decode("trailing%4").is_err());
        assert!(Name::decode("%").is_err());
    }

    #[test]
    fn name_accepts_non_utf8_escapes() {
        assert_eq!(Name::decode("Caf%e9").unwrap(), Name::new("Caf\u{fffd}"));
        assert_eq!(
            Name::decode("%ff%fe").unwrap(),
            Name::new("\u{fffd}\u{fffd}")
        );
    }

    #[test]
    fn label_lookup() {
        assert_eq!(Fan::from_label("3"), Some(Fan::Speed3));
        assert_eq!(Fan::from_label("auto"), Some(Fan::Auto));
        assert_eq!(Mode::from_label("Auto"), Some(Mode::Auto));
        assert_eq!(Mode::from_label("heat"), Some(Mode::Heat));
        assert_eq!(Fan::from_label("turbo"), None);
    }

    #[test]
    fn sweep_defaults_to_stopped() {
        assert_eq!(FanDir::from_sweep(false, false), FanDir::Stopped);
        assert_eq!(FanDir::from_sweep(true, false), FanDir::Vertical);
        assert_eq!(FanDir::from_sweep(false, true), FanDir::Horizontal);
        assert_eq!(FanDir::from_sweep(true, true), FanDir::Both);
    }

    #[test]
    fn defaults() {
        assert_eq!(Power::default(), Power::Off);
        assert_eq!(Mode::default(), Mode::Auto);
        assert_eq!(FanDir::default(), FanDir::Stopped);
    }
}
