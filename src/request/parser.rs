//! Query-string parsing
//!
//! Reserved keys (matched ignoring ASCII case):
//! - `sort`: `|`-separated members, `-` prefix for descending
//! - `fields`: comma-separated output fields
//! - `search`: free-text Contains (`!` prefix for NotContains), repeatable
//! - `skip`, `take`: raw paging markers
//!
//! Every other key is a filter member. The value prefix selects the operator:
//! `!` NotEqual, `>` GreaterThan, `<` LessThan, otherwise Equal.

use tracing::debug;

use super::model::{Field, Filter, FilterOperator, RequestDataSource, Sort};

/// Member name used for free-text search filters
pub const SEARCH_MEMBER: &str = "search";

impl RequestDataSource {
    /// Builds a request from decoded key/value pairs.
    ///
    /// `sort`, `fields`, `skip` and `take` use their first occurrence.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut request = RequestDataSource::new();
        let mut sort_seen = false;

        for (key, value) in pairs {
            let key = key.as_ref().trim();
            let value = value.as_ref();

            if key.is_empty() {
                continue;
            }

            if key.eq_ignore_ascii_case("sort") {
                if !sort_seen {
                    sort_seen = true;
                    request.sorts = parse_sorts(value);
                }
            } else if key.eq_ignore_ascii_case("fields") {
                if request.fields_raw.is_none() && !value.trim().is_empty() {
                    request.fields = parse_fields(value);
                    request.fields_raw = Some(value.to_string());
                }
            } else if key.eq_ignore_ascii_case("skip") {
                if request.skip_raw.is_none() && !value.trim().is_empty() {
                    request.skip_raw = Some(value.to_string());
                }
            } else if key.eq_ignore_ascii_case("take") {
                if request.take_raw.is_none() && !value.trim().is_empty() {
                    request.take_raw = Some(value.to_string());
                }
            } else if key.eq_ignore_ascii_case(SEARCH_MEMBER) {
                request.filters.push(parse_search(value));
            } else {
                request.filters.push(parse_filter(key, value));
            }
        }

        debug!(
            filters = request.filters.len(),
            sorts = request.sorts.len(),
            fields = request.fields.len(),
            "parsed request"
        );
        request
    }

    /// Parses a raw query string such as `name=Acme&sort=-created&take=10`.
    ///
    /// A leading `?` is ignored. `+` decodes to a space and `%XX` to its byte.
    pub fn parse_query(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let pairs = query
            .split('&')
            .filter(|part| !part.is_empty())
            .map(|part| match part.split_once('=') {
                Some((k, v)) => (decode_component(k), decode_component(v)),
                None => (decode_component(part), String::new()),
            });
        Self::from_pairs(pairs)
    }
}

fn parse_sorts(value: &str) -> Vec<Sort> {
    value
        .split('|')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|s| match s.strip_prefix('-') {
            Some(member) if !member.trim().is_empty() => Some(Sort::desc(member.trim())),
            Some(_) => None,
            None => Some(Sort::asc(s)),
        })
        .collect()
}

fn parse_fields(value: &str) -> Vec<Field> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(Field::new)
        .collect()
}

fn parse_search(value: &str) -> Filter {
    match value.strip_prefix('!') {
        Some(rest) => Filter::new(SEARCH_MEMBER, FilterOperator::NotContains, Some(rest)),
        None => Filter::new(SEARCH_MEMBER, FilterOperator::Contains, Some(value)),
    }
}

fn parse_filter(member: &str, value: &str) -> Filter {
    let (operator, rest) = if let Some(rest) = value.strip_prefix('!') {
        (FilterOperator::NotEqual, rest)
    } else if let Some(rest) = value.strip_prefix('>') {
        (FilterOperator::GreaterThan, rest)
    } else if let Some(rest) = value.strip_prefix('<') {
        (FilterOperator::LessThan, rest)
    } else {
        (FilterOperator::Equal, value)
    };

    let value = if rest.trim().eq_ignore_ascii_case("null") {
        None
    } else {
        Some(rest)
    };
    Filter::new(member, operator, value)
}

/// Percent-decoding for one query component; invalid escapes are kept verbatim.
fn decode_component(raw: &str) -> String {
    let bytes = raw.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b'%' if i + 2 < bytes.len() => {
                match (hex_value(bytes[i + 1]), hex_value(bytes[i + 2])) {
                    (Some(hi), Some(lo)) => {
                        out.push(hi << 4 | lo);
                        i += 3;
                    }
                    _ => {
                        out.push(b'%');
                        i += 1;
                    }
                }
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }

    String::from_utf8_lossy(&out).into_owned()
}

fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::SortDirection;

    #[test]
    fn test_operator_prefixes() {
        let request = RequestDataSource::parse_query("age=>30&name=!Bob&score=<5&city=Paris");
        let ops: Vec<_> = request.filters.iter().map(|f| f.operator).collect();
        assert_eq!(
            ops,
            vec![
                FilterOperator::GreaterThan,
                FilterOperator::NotEqual,
                FilterOperator::LessThan,
                FilterOperator::Equal,
            ]
        );
        assert_eq!(request.filters[0].value.as_deref(), Some("30"));
        assert_eq!(request.filters[1].value.as_deref(), Some("Bob"));
    }

    #[test]
    fn test_null_value() {
        let request = RequestDataSource::parse_query("manager=NULL&owner=!null");
        assert_eq!(request.filters[0].value, None);
        assert_eq!(request.filters[0].operator, FilterOperator::Equal);
        assert_eq!(request.filters[1].value, None);
        assert_eq!(request.filters[1].operator, FilterOperator::NotEqual);
    }

    #[test]
    fn test_repeated_member_keeps_every_value() {
        let request = RequestDataSource::parse_query("status=Active&status=Pending");
        assert_eq!(request.filters.len(), 2);
        assert_eq!(request.filters[1].value.as_deref(), Some("Pending"));
    }

    #[test]
    fn test_sort_parsing() {
        let request = RequestDataSource::parse_query("SORT=-created||name&sort=ignored");
        assert_eq!(request.sorts.len(), 2);
        assert_eq!(request.sorts[0].member, "created");
        assert_eq!(request.sorts[0].direction, SortDirection::Descending);
        assert_eq!(request.sorts[1].member, "name");
        assert_eq!(request.sorts[1].direction, SortDirection::Ascending);
    }

    #[test]
    fn test_fields_and_paging() {
        let request = RequestDataSource::parse_query("fields=name,%20city,&skip=10&take=5&take=99");
        let names: Vec<_> = request.fields.iter().map(|f| f.member.as_str()).collect();
        assert_eq!(names, vec!["name", "city"]);
        assert_eq!(request.fields_raw.as_deref(), Some("name, city,"));
        assert_eq!(request.skip(), Some(10));
        assert_eq!(request.take(), Some(5));
    }

    #[test]
    fn test_empty_paging_is_absent() {
        let request = RequestDataSource::parse_query("skip=&take");
        assert_eq!(request.skip_raw, None);
        assert_eq!(request.take_raw, None);
    }

    #[test]
    fn test_empty_fields_is_absent() {
        let request = RequestDataSource::parse_query("fields=&fields=name");
        assert_eq!(request.fields_raw.as_deref(), Some("name"));
        assert_eq!(request.fields.len(), 1);

        let request = RequestDataSource::parse_query("fields=%20");
        assert_eq!(request.fields_raw, None);
        assert!(request.fields.is_empty());
    }

    #[test]
    fn test_search() {
        let request = RequestDataSource::parse_query("search=acme&search=!beta");
        assert_eq!(request.filters.len(), 2);
        assert_eq!(request.filters[0].member, SEARCH_MEMBER);
        assert_eq!(request.filters[0].operator, FilterOperator::Contains);
        assert_eq!(request.filters[1].operator, FilterOperator::NotContains);
        assert_eq!(request.filters[1].value.as_deref(), Some("beta"));
    }

    #[test]
    fn test_decoding() {
        assert_eq!(decode_component("New+York"), "New York");
        assert_eq!(decode_component("a%2Bb"), "a+b");
        assert_eq!(decode_component("100%"), "100%");
        assert_eq!(decode_component("%zz"), "%zz");
        assert_eq!(decode_component("caf%C3%A9"), "café");

        let request = RequestDataSource::parse_query("?created=%3E2024-01-01");
        assert_eq!(request.filters[0].operator, FilterOperator::GreaterThan);
        assert_eq!(request.filters[0].value.as_deref(), Some("2024-01-01"));
    }
}
