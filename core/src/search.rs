//! Conversation search options and their query-string translation.
//!
//! The service accepts a fixed set of search filters. Each one is a variant
//! of [`SearchOption`]; the variant order is the order in which keys are
//! emitted on the wire.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use crate::http::Query;

// Largest float that still holds every integer exactly (2^53).
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

/// A recognized conversation search filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SearchOption {
    SearchQuery,
    SearchType,
    SearchOperator,
    IncludeEmpty,
    FilterUnread,
    FilterResolved,
    FilterNotResolved,
    FilterMention,
    FilterAssigned,
    FilterUnassigned,
    FilterDateStart,
    FilterDateEnd,
    OrderDateCreated,
    OrderDateUpdated,
}

impl SearchOption {
    pub const ALL: [SearchOption; 14] = [
        SearchOption::SearchQuery,
        SearchOption::SearchType,
        SearchOption::SearchOperator,
        SearchOption::IncludeEmpty,
        SearchOption::FilterUnread,
        SearchOption::FilterResolved,
        SearchOption::FilterNotResolved,
        SearchOption::FilterMention,
        SearchOption::FilterAssigned,
        SearchOption::FilterUnassigned,
        SearchOption::FilterDateStart,
        SearchOption::FilterDateEnd,
        SearchOption::OrderDateCreated,
        SearchOption::OrderDateUpdated,
    ];

    /// camelCase name accepted by [`SearchParams::from_options`].
    pub const fn option_name(self) -> &'static str {
        match self {
            SearchOption::SearchQuery => "searchQuery",
            SearchOption::SearchType => "searchType",
            SearchOption::SearchOperator => "searchOperator",
            SearchOption::IncludeEmpty => "includeEmpty",
            SearchOption::FilterUnread => "filterUnread",
            SearchOption::FilterResolved => "filterResolved",
            SearchOption::FilterNotResolved => "filterNotResolved",
            SearchOption::FilterMention => "filterMention",
            SearchOption::FilterAssigned => "filterAssigned",
            SearchOption::FilterUnassigned => "filterUnassigned",
            SearchOption::FilterDateStart => "filterDateStart",
            SearchOption::FilterDateEnd => "filterDateEnd",
            SearchOption::OrderDateCreated => "orderDateCreated",
            SearchOption::OrderDateUpdated => "orderDateUpdated",
        }
    }

    /// snake_case key sent in the query string.
    pub const fn query_key(self) -> &'static str {
        match self {
            SearchOption::SearchQuery => "search_query",
            SearchOption::SearchType => "search_type",
            SearchOption::SearchOperator => "search_operator",
            SearchOption::IncludeEmpty => "include_empty",
            SearchOption::FilterUnread => "filter_unread",
            SearchOption::FilterResolved => "filter_resolved",
            SearchOption::FilterNotResolved => "filter_not_resolved",
            SearchOption::FilterMention => "filter_mention",
            SearchOption::FilterAssigned => "filter_assigned",
            SearchOption::FilterUnassigned => "filter_unassigned",
            SearchOption::FilterDateStart => "filter_date_start",
            SearchOption::FilterDateEnd => "filter_date_end",
            SearchOption::OrderDateCreated => "order_date_created",
            SearchOption::OrderDateUpdated => "order_date_updated",
        }
    }

    pub fn from_option_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|option| option.option_name() == name)
    }
}

/// Search filters for `find_with_search`.
///
/// Falsy values (`null`, `false`, `0`, `""`) are kept here but never reach
/// the query string. This mirrors the long-standing client behavior, which
/// means `filter_unread=false` cannot be expressed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchParams(BTreeMap<SearchOption, Value>);

impl SearchParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, option: SearchOption, value: impl Into<Value>) -> Self {
        self.set(option, value);
        self
    }

    pub fn set(&mut self, option: SearchOption, value: impl Into<Value>) {
        self.0.insert(option, value.into());
    }

    pub fn get(&self, option: SearchOption) -> Option<&Value> {
        self.0.get(&option)
    }

    /// Build from a camelCase options object. Unrecognized keys are dropped;
    /// anything other than an object yields empty params.
    pub fn from_options(options: &Value) -> Self {
        match options {
            Value::Object(map) => Self::from_map(map),
            _ => Self::default(),
        }
    }

    fn from_map(map: &Map<String, Value>) -> Self {
        Self(
            map.iter()
                .filter_map(|(name, value)| {
                    SearchOption::from_option_name(name).map(|option| (option, value.clone()))
                })
                .collect(),
        )
    }

    /// Truthy options rendered as query parameters, in table order.
    pub fn to_query(&self) -> Query {
        self.0
            .iter()
            .filter(|(_, value)| is_truthy(value))
            .map(|(option, value)| (option.query_key(), render(value)))
            .collect()
    }
}

impl<'de> Deserialize<'de> for SearchParams {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let map = Map::<String, Value>::deserialize(deserializer)?;
        Ok(Self::from_map(&map))
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Whole-valued floats render without a fractional part (`1.0` -> `1`).
fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) if n.is_f64() => match n.as_f64() {
            Some(f) if f.fract() == 0.0 && f.abs() < MAX_SAFE_INTEGER => {
                format!("{}", f as i64)
            }
            _ => n.to_string(),
        },
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn table_maps_every_option_to_snake_case() {
        let keys: Vec<_> = SearchOption::ALL.iter().map(|o| o.query_key()).collect();
        assert_eq!(
            keys,
            vec![
                "search_query",
                "search_type",
                "search_operator",
                "include_empty",
                "filter_unread",
                "filter_resolved",
                "filter_not_resolved",
                "filter_mention",
                "filter_assigned",
                "filter_unassigned",
                "filter_date_start",
                "filter_date_end",
                "order_date_created",
                "order_date_updated",
            ]
        );
    }

    #[test]
    fn option_names_round_trip() {
        for option in SearchOption::ALL {
            assert_eq!(SearchOption::from_option_name(option.option_name()), Some(option));
        }
        assert_eq!(SearchOption::from_option_name("search_query"), None);
    }

    #[test]
    fn unknown_keys_are_dropped() {
        let params = SearchParams::from_options(&json!({
            "searchQuery": "refund",
            "pageSize": 50,
            "filter_unread": true
        }));
        let query = params.to_query();
        assert_eq!(query.keys().collect::<Vec<_>>(), vec!["search_query"]);
        assert_eq!(query.get("search_query"), Some("refund"));
    }

    #[test]
    fn falsy_values_are_omitted() {
        let params = SearchParams::from_options(&json!({
            "searchQuery": "",
            "filterUnread": false,
            "filterMention": 0,
            "filterAssigned": null,
            "filterResolved": true
        }));
        let query = params.to_query();
        assert_eq!(query.keys().collect::<Vec<_>>(), vec!["filter_resolved"]);
        assert_eq!(query.get("filter_resolved"), Some("true"));
    }

    #[test]
    fn query_follows_table_order_not_insertion_order() {
        let params = SearchParams::new()
            .with(SearchOption::OrderDateUpdated, 1)
            .with(SearchOption::SearchQuery, "hello")
            .with(SearchOption::FilterDateStart, "2021-01-01T00:00:00.000Z");
        let query = params.to_query();
        assert_eq!(
            query.keys().collect::<Vec<_>>(),
            vec!["search_query", "filter_date_start", "order_date_updated"]
        );
        assert_eq!(query.get("order_date_updated"), Some("1"));
    }

    #[test]
    fn whole_floats_render_as_integers() {
        let params = SearchParams::new()
            .with(SearchOption::OrderDateUpdated, 1.0)
            .with(SearchOption::OrderDateCreated, 2.5)
            .with(SearchOption::FilterDateStart, -3.0);
        let query = params.to_query();
        assert_eq!(query.get("order_date_updated"), Some("1"));
        assert_eq!(query.get("order_date_created"), Some("2.5"));
        assert_eq!(query.get("filter_date_start"), Some("-3"));
    }

    #[test]
    fn non_object_options_are_empty() {
        assert!(SearchParams::from_options(&json!(["searchQuery"])).to_query().is_empty());
        assert!(SearchParams::from_options(&Value::Null).to_query().is_empty());
    }

    #[test]
    fn deserializes_from_camel_case_object() {
        let params: SearchParams =
            serde_json::from_str(r#"{"filterUnassigned":true,"bogus":1}"#).unwrap();
        assert_eq!(params.get(SearchOption::FilterUnassigned), Some(&json!(true)));
        assert_eq!(params.to_query().len(), 1);
    }

    fn arb_value() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            (-3i64..3).prop_map(|n| json!(n)),
            "[a-z]{0,3}".prop_map(Value::String),
        ]
    }

    fn arb_key() -> impl Strategy<Value = String> {
        prop_oneof![
            (0..SearchOption::ALL.len())
                .prop_map(|i| SearchOption::ALL[i].option_name().to_string()),
            "[a-zA-Z_]{1,12}",
        ]
    }

    proptest! {
        #[test]
        fn only_recognized_truthy_keys_reach_the_query(
            entries in proptest::collection::vec((arb_key(), arb_value()), 0..20)
        ) {
            let map: Map<String, Value> = entries.into_iter().collect();
            let query = SearchParams::from_options(&Value::Object(map.clone())).to_query();

            let expected: Vec<&str> = SearchOption::ALL
                .iter()
                .filter(|o| map.get(o.option_name()).is_some_and(is_truthy))
                .map(|o| o.query_key())
                .collect();
            prop_assert_eq!(query.keys().collect::<Vec<_>>(), expected);
        }
    }
}
