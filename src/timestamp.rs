use serde::de::Visitor;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

/// A `timestamptz` value, rendered as RFC 3339 in JSON.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Timestamptz(pub OffsetDateTime);

impl From<OffsetDateTime> for Timestamptz {
    fn from(value: OffsetDateTime) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for Timestamptz {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let formatted = self.0.format(&Rfc3339).map_err(|_| std::fmt::Error)?;
        f.write_str(&formatted)
    }
}

impl Serialize for Timestamptz {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&self)
    }
}

impl<'de> Deserialize<'de> for Timestamptz {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct StrVisitor;

        impl Visitor<'_> for StrVisitor {
            type Value = Timestamptz;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                f.pad("expected string")
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                OffsetDateTime::parse(v, &Rfc3339)
                    .map(Timestamptz)
                    .map_err(E::custom)
            }
        }

        deserializer.deserialize_str(StrVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamptz_display() {
        let ts = Timestamptz(OffsetDateTime::parse("2019-10-12T07:20:50.52Z", &Rfc3339).unwrap());
        assert_eq!("2019-10-12T07:20:50.52Z", format!("{}", ts));
    }

    #[test]
    fn timestamptz_json_roundtrip_keeps_instant() {
        let json = r#""2024-03-01T12:00:00Z""#;
        let ts: Timestamptz = serde_json::from_str(json).unwrap();

        assert_eq!(1709294400, ts.0.unix_timestamp());
        assert_eq!(json, serde_json::to_string(&ts).unwrap());
    }
}
