//! Query-string encoding of list option structs.
//!
//! Option structs derive `Serialize`; absent `Option` fields are skipped and
//! zero-valued paging fields are marked `skip_serializing_if`. `Date` and
//! `Time` encode through their own string forms and `ListOptions` is merged
//! in with `#[serde(flatten)]`.

use serde::{Serialize, ser};

use crate::error::{Error, Result};

/// Appends the encoded `opts` to `path`. Keys are sorted so the output is
/// stable regardless of field order.
pub fn add_options<O: Serialize + ?Sized>(path: &str, opts: Option<&O>) -> Result<String> {
    let Some(opts) = opts else {
        return Ok(path.to_string());
    };

    let encoded = serde_urlencoded::to_string(opts).map_err(Error::EncodeOptions)?;
    if encoded.is_empty() {
        return Ok(path.to_string());
    }

    let (base, existing) = match path.split_once('?') {
        Some((base, query)) => (base, query),
        None => (path, ""),
    };
    let mut pairs = parse_pairs(existing)?;
    pairs.extend(parse_pairs(&encoded)?);
    pairs.sort_by(|left, right| left.0.cmp(&right.0));

    let query = serde_urlencoded::to_string(&pairs).map_err(Error::EncodeOptions)?;
    Ok(format!("{base}?{query}"))
}

fn parse_pairs(query: &str) -> Result<Vec<(String, String)>> {
    serde_urlencoded::from_str(query)
        .map_err(|err| Error::EncodeOptions(ser::Error::custom(err)))
}

pub(crate) fn is_zero(value: &i32) -> bool {
    *value == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dates::{Date, Time};
    use crate::pagination::ListOptions;
    use serde::ser::{self, Serializer};

    #[derive(Debug, Default, Serialize)]
    struct SearchOptions {
        #[serde(skip_serializing_if = "Option::is_none")]
        query: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        date: Option<Date>,
        #[serde(skip_serializing_if = "Option::is_none")]
        starts_at: Option<Time>,
        #[serde(skip_serializing_if = "Option::is_none")]
        is_active: Option<bool>,
        #[serde(skip)]
        #[allow(dead_code)]
        untagged: i32,
        #[serde(flatten)]
        list: ListOptions,
    }

    #[test]
    fn encodes_present_fields() {
        let opts = SearchOptions {
            query: Some("foo".to_string()),
            date: Date::new(2019, 1, 2),
            ..Default::default()
        };
        let url = add_options("clients", Some(&opts)).unwrap();
        assert_eq!(url, "clients?date=2019-01-02&query=foo");
    }

    #[test]
    fn omitting_a_field_removes_it() {
        let opts = SearchOptions {
            query: Some("foo".to_string()),
            ..Default::default()
        };
        assert_eq!(add_options("clients", Some(&opts)).unwrap(), "clients?query=foo");

        let opts = SearchOptions {
            date: Date::new(2019, 1, 2),
            ..Default::default()
        };
        assert_eq!(add_options("clients", Some(&opts)).unwrap(), "clients?date=2019-01-02");
    }

    #[test]
    fn zero_valued_options_leave_url_unchanged() {
        let opts = SearchOptions {
            untagged: 5,
            ..Default::default()
        };
        assert_eq!(add_options("clients", Some(&opts)).unwrap(), "clients");
    }

    #[test]
    fn missing_options_leave_url_unchanged() {
        assert_eq!(add_options::<SearchOptions>("clients", None).unwrap(), "clients");
    }

    #[test]
    fn merges_paging_and_custom_types() {
        let opts = SearchOptions {
            starts_at: Time::new(15, 4),
            is_active: Some(false),
            list: ListOptions::new(2, 50),
            ..Default::default()
        };
        let url = add_options("time_entries", Some(&opts)).unwrap();
        assert_eq!(url, "time_entries?is_active=false&page=2&per_page=50&starts_at=3%3A04pm");
    }

    #[test]
    fn keeps_escaped_existing_parameters() {
        let opts = SearchOptions {
            query: Some("a b".to_string()),
            ..Default::default()
        };
        let url = add_options("clients?name=A%26B+Co&client_id=5", Some(&opts)).unwrap();
        assert_eq!(url, "clients?client_id=5&name=A%26B+Co&query=a+b");
    }

    #[test]
    fn keeps_existing_query_parameters() {
        let opts = ListOptions::new(3, 0);
        let url = add_options("clients?is_active=true", Some(&opts)).unwrap();
        assert_eq!(url, "clients?is_active=true&page=3");
    }

    struct Unencodable;

    impl Serialize for Unencodable {
        fn serialize<S: Serializer>(&self, _serializer: S) -> std::result::Result<S::Ok, S::Error> {
            Err(ser::Error::custom("unsupported"))
        }
    }

    #[test]
    fn encoding_failure_is_reported() {
        let err = add_options("clients", Some(&Unencodable)).unwrap_err();
        assert!(matches!(err, Error::EncodeOptions(_)));
    }
}
