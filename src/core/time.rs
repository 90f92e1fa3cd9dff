use time::{format_description::well_known::Rfc3339, OffsetDateTime, PrimitiveDateTime};

pub(crate) fn primitive_now_utc() -> PrimitiveDateTime {
    let now = OffsetDateTime::now_utc();
    PrimitiveDateTime::new(now.date(), now.time())
}

/// Columns are `TIMESTAMP` holding UTC, so the value is rendered with a `Z` suffix.
pub(crate) fn format_primitive(value: PrimitiveDateTime) -> String {
    value.assume_utc().format(&Rfc3339).unwrap_or_else(|_| value.assume_utc().to_string())
}

/// Calendar dates on the wire, e.g. `2025-06-14`.
pub(crate) mod exam_date {
    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};
    use time::format_description::FormatItem;
    use time::macros::format_description;
    use time::Date;

    const FORMAT: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");

    pub(crate) fn parse(raw: &str) -> Result<Date, time::error::Parse> {
        Date::parse(raw.trim(), FORMAT)
    }

    pub(crate) fn render(value: Date) -> String {
        value.format(FORMAT).unwrap_or_else(|_| value.to_string())
    }

    pub(crate) fn serialize<S: Serializer>(value: &Date, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&render(*value))
    }

    pub(crate) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Date, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(|_| D::Error::custom(format!("invalid date '{raw}', expected YYYY-MM-DD")))
    }

    pub(crate) mod option {
        use serde::{Deserialize, Deserializer};
        use time::Date;

        pub(crate) fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<Date>, D::Error> {
            let raw = Option::<String>::deserialize(deserializer)?;
            raw.map(|value| {
                super::parse(&value).map_err(|_| {
                    <D::Error as serde::de::Error>::custom(format!(
                        "invalid date '{value}', expected YYYY-MM-DD"
                    ))
                })
            })
            .transpose()
        }
    }
}
