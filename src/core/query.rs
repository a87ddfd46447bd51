//! Search criteria, pagination metadata and their query-parameter form
//!
//! A [`SearchCriteria`] is built fresh for every search action and travels as
//! flat key/value pairs:
//!
//! ```text
//! pageIndex=0&pageSize=20&whereClauseJoinOp=AND
//!   &whereClauses[0].name=status&whereClauses[0].oper=eq&whereClauses[0].values=active
//!   &sortByClauses[0].name=name&sortByClauses[0].type=asc
//!   &calculateStatTotal=true
//! ```

use crate::core::field::FieldValue;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;
use thiserror::Error;

/// Page size used when the caller does not pick one
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Errors raised while building or parsing search criteria
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("operator '{operator}' expects {expected} value(s), got {actual}")]
    InvalidArity {
        operator: WhereOperator,
        expected: &'static str,
        actual: usize,
    },

    #[error("unknown where operator '{0}'")]
    UnknownOperator(String),

    #[error("unknown sort direction '{0}'")]
    UnknownDirection(String),

    #[error("unknown join operator '{0}'")]
    UnknownJoinOperator(String),

    #[error("invalid value '{value}' for '{key}'")]
    InvalidNumber { key: String, value: String },

    #[error("page size must be positive")]
    InvalidPageSize,

    #[error("page {page_index} of size {page_size} is out of range")]
    PageOutOfRange { page_index: usize, page_size: usize },

    #[error("clause '{0}' is missing its name or operator")]
    IncompleteClause(String),
}

/// Comparison operator of a where clause
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WhereOperator {
    #[serde(rename = "eq")]
    Equals,
    #[serde(rename = "ne")]
    NotEquals,
    #[serde(rename = "in")]
    In,
    #[serde(rename = "ni")]
    NotIn,
    #[serde(rename = "btw")]
    Between,
    #[serde(rename = "lt")]
    LessThan,
    #[serde(rename = "lte")]
    LessOrEqual,
    #[serde(rename = "gt")]
    GreaterThan,
    #[serde(rename = "gte")]
    GreaterOrEqual,
    #[serde(rename = "like")]
    Like,
}

impl WhereOperator {
    /// Fixed lowercase wire token
    pub fn token(self) -> &'static str {
        match self {
            WhereOperator::Equals => "eq",
            WhereOperator::NotEquals => "ne",
            WhereOperator::In => "in",
            WhereOperator::NotIn => "ni",
            WhereOperator::Between => "btw",
            WhereOperator::LessThan => "lt",
            WhereOperator::LessOrEqual => "lte",
            WhereOperator::GreaterThan => "gt",
            WhereOperator::GreaterOrEqual => "gte",
            WhereOperator::Like => "like",
        }
    }

    fn check_arity(self, actual: usize) -> Result<(), QueryError> {
        let (ok, expected) = match self {
            WhereOperator::Between => (actual == 2, "exactly 2"),
            _ => (actual >= 1, "at least 1"),
        };

        if ok {
            Ok(())
        } else {
            Err(QueryError::InvalidArity {
                operator: self,
                expected,
                actual,
            })
        }
    }
}

impl fmt::Display for WhereOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for WhereOperator {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "eq" => Ok(WhereOperator::Equals),
            "ne" => Ok(WhereOperator::NotEquals),
            "in" => Ok(WhereOperator::In),
            "ni" => Ok(WhereOperator::NotIn),
            "btw" => Ok(WhereOperator::Between),
            "lt" => Ok(WhereOperator::LessThan),
            "lte" => Ok(WhereOperator::LessOrEqual),
            "gt" => Ok(WhereOperator::GreaterThan),
            "gte" => Ok(WhereOperator::GreaterOrEqual),
            "like" => Ok(WhereOperator::Like),
            other => Err(QueryError::UnknownOperator(other.to_string())),
        }
    }
}

/// A single filter on one field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhereClause {
    name: String,
    operator: WhereOperator,
    values: Vec<FieldValue>,
}

impl WhereClause {
    /// Build a clause, checking the operator's value count
    ///
    /// `between` takes exactly two values; every other operator needs at least one.
    pub fn new(
        name: impl Into<String>,
        operator: WhereOperator,
        values: Vec<FieldValue>,
    ) -> Result<Self, QueryError> {
        operator.check_arity(values.len())?;
        Ok(Self {
            name: name.into(),
            operator,
            values,
        })
    }

    /// Shorthand for an equality clause
    pub fn equals(name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self {
            name: name.into(),
            operator: WhereOperator::Equals,
            values: vec![value.into()],
        }
    }

    /// Shorthand for a `like` clause
    pub fn like(name: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            operator: WhereOperator::Like,
            values: vec![FieldValue::String(pattern.into())],
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn operator(&self) -> WhereOperator {
        self.operator
    }

    pub fn values(&self) -> &[FieldValue] {
        &self.values
    }

    /// Evaluate the clause against a record field
    ///
    /// `field` is `None` when the record has no such field; only the negative
    /// operators match a missing field.
    pub fn matches(&self, field: Option<&FieldValue>) -> bool {
        let Some(field) = field else {
            return matches!(
                self.operator,
                WhereOperator::NotEquals | WhereOperator::NotIn
            );
        };

        let values: Vec<FieldValue> = self.values.iter().map(|v| v.coerce_to(field)).collect();
        let equal = |v: &FieldValue| field.compare(v).is_eq();
        let against = |index: usize| values.get(index).map(|v| field.compare(v));

        match self.operator {
            WhereOperator::Equals | WhereOperator::In => values.iter().any(equal),
            WhereOperator::NotEquals | WhereOperator::NotIn => !values.iter().any(equal),
            WhereOperator::Between => {
                against(0).is_some_and(|o| o.is_ge()) && against(1).is_some_and(|o| o.is_le())
            }
            WhereOperator::LessThan => against(0).is_some_and(|o| o.is_lt()),
            WhereOperator::LessOrEqual => against(0).is_some_and(|o| o.is_le()),
            WhereOperator::GreaterThan => against(0).is_some_and(|o| o.is_gt()),
            WhereOperator::GreaterOrEqual => against(0).is_some_and(|o| o.is_ge()),
            WhereOperator::Like => values
                .iter()
                .any(|pattern| like_matches(&pattern.to_wire(), &field.to_wire())),
        }
    }
}

/// Case-insensitive SQL-style match; a pattern without `%` or `_` matches as a substring
fn like_matches(pattern: &str, candidate: &str) -> bool {
    if !pattern.contains(['%', '_']) {
        return candidate
            .to_lowercase()
            .contains(&pattern.to_lowercase());
    }

    let mut translated = String::from("(?is)^");
    for c in pattern.chars() {
        match c {
            '%' => translated.push_str(".*"),
            '_' => translated.push('.'),
            other => translated.push_str(&regex::escape(&other.to_string())),
        }
    }
    translated.push('$');

    Regex::new(&translated)
        .map(|regex| regex.is_match(candidate))
        .unwrap_or(false)
}

/// How where clauses of one criteria combine
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum JoinOperator {
    #[default]
    And,
    Or,
}

impl JoinOperator {
    pub fn token(self) -> &'static str {
        match self {
            JoinOperator::And => "AND",
            JoinOperator::Or => "OR",
        }
    }
}

impl FromStr for JoinOperator {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "AND" => Ok(JoinOperator::And),
            "OR" => Ok(JoinOperator::Or),
            other => Err(QueryError::UnknownJoinOperator(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn token(self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

impl FromStr for SortDirection {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            other => Err(QueryError::UnknownDirection(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortClause {
    pub name: String,
    pub direction: SortDirection,
}

impl SortClause {
    pub fn asc(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            direction: SortDirection::Desc,
        }
    }
}

/// Filters, sort order and pagination of one search action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchCriteria {
    pub where_clauses: Vec<WhereClause>,
    pub join_op: JoinOperator,
    pub sort_clauses: Vec<SortClause>,
    /// 0-based
    pub page_index: usize,
    pub page_size: usize,
    pub compute_total: bool,
}

impl Default for SearchCriteria {
    fn default() -> Self {
        Self::with_page_size(DEFAULT_PAGE_SIZE)
    }
}

impl SearchCriteria {
    /// First page, default size, no clauses
    pub fn create_default() -> Self {
        Self::default()
    }

    /// First page with the given size (clamped to at least 1)
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            where_clauses: Vec::new(),
            join_op: JoinOperator::And,
            sort_clauses: Vec::new(),
            page_index: 0,
            page_size: page_size.max(1),
            compute_total: false,
        }
    }

    pub fn with_where(mut self, clause: WhereClause) -> Self {
        self.where_clauses.push(clause);
        self
    }

    pub fn with_join(mut self, join_op: JoinOperator) -> Self {
        self.join_op = join_op;
        self
    }

    pub fn with_sort(mut self, clause: SortClause) -> Self {
        self.sort_clauses.push(clause);
        self
    }

    pub fn with_page(mut self, page_index: usize, page_size: usize) -> Self {
        self.page_index = page_index;
        self.page_size = page_size.max(1);
        self
    }

    pub fn with_total(mut self, compute_total: bool) -> Self {
        self.compute_total = compute_total;
        self
    }

    /// Number of records skipped before this page, saturating at `usize::MAX`
    pub fn offset(&self) -> usize {
        self.page_index.saturating_mul(self.page_size)
    }

    /// Cycle the sort state of a field: unsorted → asc → desc → desc
    ///
    /// A descending field stays descending; repeated clicks never drop the sort.
    pub fn toggle_sort(&mut self, field: &str) {
        match self.sort_clauses.iter_mut().find(|c| c.name == field) {
            None => self.sort_clauses.push(SortClause::asc(field)),
            Some(clause) => clause.direction = SortDirection::Desc,
        }
    }

    /// Current direction of a field, if it is sorted
    pub fn sort_direction(&self, field: &str) -> Option<SortDirection> {
        self.sort_clauses
            .iter()
            .find(|c| c.name == field)
            .map(|c| c.direction)
    }

    /// Whether a record matches every (AND) or any (OR) where clause
    pub fn matches<F>(&self, field_value: F) -> bool
    where
        F: Fn(&str) -> Option<FieldValue>,
    {
        if self.where_clauses.is_empty() {
            return true;
        }

        let mut results = self
            .where_clauses
            .iter()
            .map(|clause| clause.matches(field_value(clause.name()).as_ref()));

        match self.join_op {
            JoinOperator::And => results.all(|matched| matched),
            JoinOperator::Or => results.any(|matched| matched),
        }
    }

    /// Serialize to ordered query parameters
    ///
    /// Page fields, the join operator and `calculateStatTotal` are always
    /// present; clause keys only appear when there are clauses. Structurally
    /// equal criteria produce identical parameters.
    pub fn to_wire_params(&self) -> WireParams {
        let mut params = WireParams::default();

        params.push("pageIndex", self.page_index.to_string());
        params.push("pageSize", self.page_size.to_string());
        params.push("whereClauseJoinOp", self.join_op.token());

        for (i, clause) in self.where_clauses.iter().enumerate() {
            params.push(format!("whereClauses[{i}].name"), clause.name.clone());
            params.push(format!("whereClauses[{i}].oper"), clause.operator.token());
            for value in &clause.values {
                params.push(format!("whereClauses[{i}].values"), value.to_wire());
            }
        }

        for (i, clause) in self.sort_clauses.iter().enumerate() {
            params.push(format!("sortByClauses[{i}].name"), clause.name.clone());
            params.push(format!("sortByClauses[{i}].type"), clause.direction.token());
        }

        params.push("calculateStatTotal", self.compute_total.to_string());
        params
    }

    /// Parse query parameters produced by [`SearchCriteria::to_wire_params`]
    ///
    /// Missing page fields fall back to the defaults; unrelated keys are ignored.
    /// Clause values come back as [`FieldValue::String`], so a criteria only
    /// parses back equal to itself when its clause values are strings.
    pub fn from_wire_params(params: &WireParams) -> Result<Self, QueryError> {
        Self::from_wire_params_with_default(params, DEFAULT_PAGE_SIZE)
    }

    /// Same as [`SearchCriteria::from_wire_params`], with the page size used
    /// when `pageSize` is absent
    pub fn from_wire_params_with_default(
        params: &WireParams,
        default_page_size: usize,
    ) -> Result<Self, QueryError> {
        let mut criteria = Self::with_page_size(default_page_size);
        let mut wheres: BTreeMap<usize, PartialClause> = BTreeMap::new();
        let mut sorts: BTreeMap<usize, PartialClause> = BTreeMap::new();

        for (key, value) in params.iter() {
            match key {
                "pageIndex" => criteria.page_index = parse_number(key, value)?,
                "pageSize" => {
                    criteria.page_size = parse_number(key, value)?;
                    if criteria.page_size == 0 {
                        return Err(QueryError::InvalidPageSize);
                    }
                }
                "whereClauseJoinOp" => criteria.join_op = value.parse()?,
                "calculateStatTotal" => {
                    criteria.compute_total =
                        value.parse().map_err(|_| QueryError::InvalidNumber {
                            key: key.to_string(),
                            value: value.to_string(),
                        })?
                }
                _ => {
                    let Some((group, index, attribute)) = parse_clause_key(key) else {
                        continue;
                    };
                    let target = if group == "whereClauses" {
                        &mut wheres
                    } else {
                        &mut sorts
                    };
                    let partial = target.entry(index).or_default();
                    match attribute {
                        "name" => partial.name = Some(value.to_string()),
                        "oper" | "type" => partial.operator = Some(value.to_string()),
                        _ => partial.values.push(FieldValue::String(value.to_string())),
                    }
                }
            }
        }

        if criteria.page_index.checked_mul(criteria.page_size).is_none() {
            return Err(QueryError::PageOutOfRange {
                page_index: criteria.page_index,
                page_size: criteria.page_size,
            });
        }

        for (index, partial) in wheres {
            let (Some(name), Some(operator)) = (partial.name, partial.operator) else {
                return Err(QueryError::IncompleteClause(format!("whereClauses[{index}]")));
            };
            criteria
                .where_clauses
                .push(WhereClause::new(name, operator.parse()?, partial.values)?);
        }

        for (index, partial) in sorts {
            let (Some(name), Some(direction)) = (partial.name, partial.operator) else {
                return Err(QueryError::IncompleteClause(format!("sortByClauses[{index}]")));
            };
            criteria.sort_clauses.push(SortClause {
                name,
                direction: direction.parse()?,
            });
        }

        Ok(criteria)
    }
}

#[derive(Default)]
struct PartialClause {
    name: Option<String>,
    operator: Option<String>,
    values: Vec<FieldValue>,
}

fn parse_number(key: &str, value: &str) -> Result<usize, QueryError> {
    value.parse().map_err(|_| QueryError::InvalidNumber {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_clause_key(key: &str) -> Option<(&str, usize, &str)> {
    static CLAUSE_KEY: OnceLock<Option<Regex>> = OnceLock::new();
    let regex = CLAUSE_KEY
        .get_or_init(|| {
            Regex::new(r"^(whereClauses|sortByClauses)\[(\d+)\]\.(name|oper|values|type)$").ok()
        })
        .as_ref()?;

    let captures = regex.captures(key)?;
    let group = captures.get(1)?.as_str();
    let index = captures.get(2)?.as_str().parse().ok()?;
    let attribute = captures.get(3)?.as_str();

    let valid = matches!(
        (group, attribute),
        ("whereClauses", "name" | "oper" | "values") | ("sortByClauses", "name" | "type")
    );
    valid.then_some((group, index, attribute))
}

/// Ordered query parameters; a key may repeat (one entry per clause value)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WireParams(Vec<(String, String)>);

impl WireParams {
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.push((key.into(), value.into()));
    }

    /// First value of a key
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Every value of a repeated key, in order
    pub fn get_all(&self, key: &str) -> Vec<&str> {
        self.0
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.iter().any(|(k, _)| k == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> Vec<(String, String)> {
        self.0
    }
}

impl From<Vec<(String, String)>> for WireParams {
    fn from(pairs: Vec<(String, String)>) -> Self {
        Self(pairs)
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for WireParams {
    fn from_iter<I: IntoIterator<Item = (&'a str, &'a str)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }
}

/// One page of search results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult<T> {
    pub data: Vec<T>,

    #[serde(rename = "searchInfos")]
    pub meta: SearchMeta,
}

impl<T> SearchResult<T> {
    /// Slice one page out of an already filtered and sorted collection
    pub fn paginate(all: Vec<T>, criteria: &SearchCriteria) -> Self {
        let total = all.len();
        let offset = criteria.offset();
        let data: Vec<T> = all
            .into_iter()
            .skip(offset)
            .take(criteria.page_size)
            .collect();

        Self {
            data,
            meta: SearchMeta {
                page_index: criteria.page_index,
                page_size: criteria.page_size,
                total: criteria.compute_total.then_some(total),
                offset,
                limit: criteria.page_size,
                calculate_stat_total: criteria.compute_total,
            },
        }
    }
}

/// Pagination metadata (`searchInfos` on the wire)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchMeta {
    pub page_index: usize,
    pub page_size: usize,

    /// Present iff the total was requested
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<usize>,

    pub offset: usize,
    pub limit: usize,

    #[serde(default)]
    pub calculate_stat_total: bool,
}

impl SearchMeta {
    /// Number of pages, when the total is known
    pub fn total_pages(&self) -> Option<usize> {
        let limit = self.page_size.max(1);
        self.total.map(|total| total.div_ceil(limit))
    }

    /// Whether a page follows this one, when the total is known
    pub fn has_next(&self) -> Option<bool> {
        self.total
            .map(|total| self.offset.saturating_add(self.limit) < total)
    }
}
