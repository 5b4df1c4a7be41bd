//! Filter expressions for listings
//!
//! Grammar:
//!
//! ```text
//! filter     := condition (connective condition)*
//! connective := ","  (or) | ";"  (and)
//! condition  := field operator value
//! operator   := "===" | "==" | "!==" | "!=" | "=~" | "!~" | ">=" | "<=" | ">" | "<"
//! ```
//!
//! Fields are looked up in a fixed allow-list that maps each logical name to
//! a column path of the listing query. Values are never spliced into the
//! emitted SQL; they travel as bound parameters. Connectives keep SQL
//! precedence, so `and` binds tighter than `or`.

use thiserror::Error;

/// Errors raised while parsing or translating a filter
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    #[error("filter expression is empty")]
    Empty,

    #[error("empty condition at position {0}")]
    EmptyCondition(usize),

    #[error("filter ends with a dangling connective")]
    DanglingConnective,

    #[error("condition has no field name: {0}")]
    MissingField(String),

    #[error("unknown operator in condition: {0}")]
    UnknownOperator(String),

    #[error("no value given for field {0}")]
    MissingValue(String),

    #[error("field cannot be filtered on: {0}")]
    UnknownField(String),

    #[error("operator {operator} cannot be applied to field {field}")]
    OperatorNotApplicable { field: String, operator: String },

    #[error("field {field} expects an integer, got {value}")]
    NotAnInteger { field: String, value: String },
}

/// Value type of a filterable field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Integer,
}

/// An allow-listed field: logical name, query path and value type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub path: &'static str,
    pub kind: FieldKind,
}

/// Fields annotation and group listings may be filtered on.
///
/// Paths refer to the aliases used by the listing queries: `ann` for the
/// annotation collection, `term` for the linked term and `onto` for the
/// term's ontology.
pub const ANNOTATION_FIELDS: &[FieldSpec] = &[
    FieldSpec { name: "entry_id", path: "ann.entry_id", kind: FieldKind::Text },
    FieldSpec { name: "value", path: "ann.value", kind: FieldKind::Text },
    FieldSpec { name: "created_by", path: "ann.created_by", kind: FieldKind::Text },
    FieldSpec { name: "version", path: "ann.version", kind: FieldKind::Integer },
    FieldSpec { name: "rank", path: "ann.rank", kind: FieldKind::Integer },
    FieldSpec { name: "tag", path: "term.label", kind: FieldKind::Text },
    FieldSpec { name: "ontology", path: "onto.namespace", kind: FieldKind::Text },
];

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Equal,
    NotEqual,
    Contains,
    NotContains,
    Greater,
    GreaterOrEqual,
    Less,
    LessOrEqual,
}

/// Operator symbols, longest first so prefixes do not shadow them
const OPERATORS: &[(&str, Operator)] = &[
    ("===", Operator::Equal),
    ("!==", Operator::NotEqual),
    ("==", Operator::Equal),
    ("!=", Operator::NotEqual),
    ("=~", Operator::Contains),
    ("!~", Operator::NotContains),
    (">=", Operator::GreaterOrEqual),
    ("<=", Operator::LessOrEqual),
    (">", Operator::Greater),
    ("<", Operator::Less),
];

impl Operator {
    fn applies_to(self, kind: FieldKind) -> bool {
        match self {
            Operator::Equal | Operator::NotEqual => true,
            Operator::Contains | Operator::NotContains => kind == FieldKind::Text,
            Operator::Greater | Operator::GreaterOrEqual | Operator::Less | Operator::LessOrEqual => {
                kind == FieldKind::Integer
            }
        }
    }

    fn sql(self) -> &'static str {
        match self {
            Operator::Equal => "=",
            Operator::NotEqual => "<>",
            Operator::Contains => "LIKE",
            Operator::NotContains => "NOT LIKE",
            Operator::Greater => ">",
            Operator::GreaterOrEqual => ">=",
            Operator::Less => "<",
            Operator::LessOrEqual => "<=",
        }
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let symbol = OPERATORS
            .iter()
            .find(|(_, op)| op == self)
            .map(|(symbol, _)| *symbol)
            .unwrap_or("?");
        write!(f, "{symbol}")
    }
}

/// Logical connective between two conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connective {
    And,
    Or,
}

impl Connective {
    fn sql(self) -> &'static str {
        match self {
            Connective::And => "AND",
            Connective::Or => "OR",
        }
    }
}

/// One `field operator value` triple
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    pub field: String,
    pub operator: Operator,
    pub value: String,
}

/// A parsed filter expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterExpr {
    pub first: Condition,
    pub rest: Vec<(Connective, Condition)>,
}

impl FilterExpr {
    pub fn conditions(&self) -> impl Iterator<Item = &Condition> {
        std::iter::once(&self.first).chain(self.rest.iter().map(|(_, c)| c))
    }
}

/// A bound parameter of a translated filter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    Text(String),
    Integer(i64),
}

/// SQL fragment for a WHERE clause plus its positional parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterFragment {
    pub sql: String,
    pub values: Vec<FilterValue>,
}

/// Parse a filter expression
pub fn parse_filter(input: &str) -> Result<FilterExpr, FilterError> {
    if input.trim().is_empty() {
        return Err(FilterError::Empty);
    }

    // Split into (condition text, connective that follows it)
    let mut segments: Vec<(&str, Option<Connective>)> = Vec::new();
    let mut start = 0;
    for (idx, ch) in input.char_indices() {
        let connective = match ch {
            ',' => Connective::Or,
            ';' => Connective::And,
            _ => continue,
        };
        segments.push((&input[start..idx], Some(connective)));
        start = idx + ch.len_utf8();
    }
    segments.push((&input[start..], None));

    let last = segments.len() - 1;
    let mut conditions = Vec::with_capacity(segments.len());
    let mut connectives = Vec::with_capacity(last);
    for (position, (text, connective)) in segments.into_iter().enumerate() {
        if text.trim().is_empty() {
            return Err(if position == last && position > 0 {
                FilterError::DanglingConnective
            } else {
                FilterError::EmptyCondition(position)
            });
        }
        conditions.push(parse_condition(text.trim())?);
        if let Some(connective) = connective {
            connectives.push(connective);
        }
    }

    let mut conditions = conditions.into_iter();
    let first = conditions.next().ok_or(FilterError::Empty)?;
    Ok(FilterExpr {
        first,
        rest: connectives.into_iter().zip(conditions).collect(),
    })
}

fn parse_condition(text: &str) -> Result<Condition, FilterError> {
    let field_len = text
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(text.len());
    if field_len == 0 {
        return Err(FilterError::MissingField(text.to_string()));
    }
    let field = &text[..field_len];
    let rest = text[field_len..].trim_start();

    let (symbol, operator) = OPERATORS
        .iter()
        .find(|(symbol, _)| rest.starts_with(symbol))
        .ok_or_else(|| FilterError::UnknownOperator(text.to_string()))?;

    let value = rest[symbol.len()..].trim();
    if value.is_empty() {
        return Err(FilterError::MissingValue(field.to_string()));
    }

    Ok(Condition {
        field: field.to_string(),
        operator: *operator,
        value: value.to_string(),
    })
}

/// Translate a parsed expression against an allow-list
pub fn translate(expr: &FilterExpr, fields: &[FieldSpec]) -> Result<FilterFragment, FilterError> {
    let mut sql = String::new();
    let mut values = Vec::new();

    let (clause, value) = translate_condition(&expr.first, fields)?;
    sql.push_str(&clause);
    values.push(value);

    for (connective, condition) in &expr.rest {
        let (clause, value) = translate_condition(condition, fields)?;
        sql.push(' ');
        sql.push_str(connective.sql());
        sql.push(' ');
        sql.push_str(&clause);
        values.push(value);
    }

    Ok(FilterFragment { sql, values })
}

fn translate_condition(
    condition: &Condition,
    fields: &[FieldSpec],
) -> Result<(String, FilterValue), FilterError> {
    let spec = fields
        .iter()
        .find(|spec| spec.name == condition.field)
        .ok_or_else(|| FilterError::UnknownField(condition.field.clone()))?;

    if !condition.operator.applies_to(spec.kind) {
        return Err(FilterError::OperatorNotApplicable {
            field: condition.field.clone(),
            operator: condition.operator.to_string(),
        });
    }

    let value = match spec.kind {
        FieldKind::Integer => condition
            .value
            .parse::<i64>()
            .map(FilterValue::Integer)
            .map_err(|_| FilterError::NotAnInteger {
                field: condition.field.clone(),
                value: condition.value.clone(),
            })?,
        FieldKind::Text => match condition.operator {
            Operator::Contains | Operator::NotContains => {
                FilterValue::Text(format!("%{}%", escape_like(&condition.value)))
            }
            _ => FilterValue::Text(condition.value.clone()),
        },
    };

    let clause = match condition.operator {
        Operator::Contains | Operator::NotContains => {
            format!("{} {} ? ESCAPE '\\'", spec.path, condition.operator.sql())
        }
        _ => format!("{} {} ?", spec.path, condition.operator.sql()),
    };

    Ok((clause, value))
}

fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// Parse and translate in one step
pub fn translate_filter(input: &str, fields: &[FieldSpec]) -> Result<FilterFragment, FilterError> {
    let expr = parse_filter(input)?;
    translate(&expr, fields)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_condition() {
        let expr = parse_filter("entry_id===DDB_G0287317").unwrap();
        assert_eq!(expr.first.field, "entry_id");
        assert_eq!(expr.first.operator, Operator::Equal);
        assert_eq!(expr.first.value, "DDB_G0287317");
        assert!(expr.rest.is_empty());
    }

    #[test]
    fn test_parse_connectives() {
        let expr = parse_filter("tag===gene;ontology===sequence,rank>=2").unwrap();
        assert_eq!(expr.rest.len(), 2);
        assert_eq!(expr.rest[0].0, Connective::And);
        assert_eq!(expr.rest[1].0, Connective::Or);
        assert_eq!(expr.rest[1].1.operator, Operator::GreaterOrEqual);
        assert_eq!(expr.conditions().count(), 3);
    }

    #[test]
    fn test_parse_values_with_spaces_and_punctuation() {
        let expr = parse_filter("value =~ spore viability: 2.5 @home").unwrap();
        assert_eq!(expr.first.operator, Operator::Contains);
        assert_eq!(expr.first.value, "spore viability: 2.5 @home");
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(parse_filter("   "), Err(FilterError::Empty));
        assert_eq!(parse_filter("tag===gene;"), Err(FilterError::DanglingConnective));
        assert_eq!(parse_filter(";tag===gene"), Err(FilterError::EmptyCondition(0)));
        assert!(matches!(parse_filter("===gene"), Err(FilterError::MissingField(_))));
        assert!(matches!(parse_filter("tag gene"), Err(FilterError::UnknownOperator(_))));
        assert_eq!(
            parse_filter("tag==="),
            Err(FilterError::MissingValue("tag".to_string()))
        );
    }

    #[test]
    fn test_translate_binds_values() {
        let fragment =
            translate_filter("entry_id===DDB_G1;tag==gene", ANNOTATION_FIELDS).unwrap();
        assert_eq!(fragment.sql, "ann.entry_id = ? AND term.label = ?");
        assert_eq!(
            fragment.values,
            vec![
                FilterValue::Text("DDB_G1".to_string()),
                FilterValue::Text("gene".to_string())
            ]
        );
    }

    #[test]
    fn test_translate_integer_fields() {
        let fragment = translate_filter("rank>1,version!==3", ANNOTATION_FIELDS).unwrap();
        assert_eq!(fragment.sql, "ann.rank > ? OR ann.version <> ?");
        assert_eq!(
            fragment.values,
            vec![FilterValue::Integer(1), FilterValue::Integer(3)]
        );
    }

    #[test]
    fn test_translate_contains_escapes_wildcards() {
        let fragment = translate_filter("value=~50%_off", ANNOTATION_FIELDS).unwrap();
        assert_eq!(fragment.sql, "ann.value LIKE ? ESCAPE '\\'");
        assert_eq!(
            fragment.values,
            vec![FilterValue::Text("%50\\%\\_off%".to_string())]
        );
    }

    #[test]
    fn test_translate_rejects_fields_outside_allow_list() {
        assert_eq!(
            translate_filter("is_obsolete===true", ANNOTATION_FIELDS),
            Err(FilterError::UnknownField("is_obsolete".to_string()))
        );
        // Injection attempts never reach the query text
        assert!(translate_filter("1=1 OR entry_id===x", ANNOTATION_FIELDS).is_err());
    }

    #[test]
    fn test_translate_value_injection_is_bound() {
        let fragment =
            translate_filter("entry_id===x' OR '1'='1", ANNOTATION_FIELDS).unwrap();
        assert_eq!(fragment.sql, "ann.entry_id = ?");
        assert_eq!(
            fragment.values,
            vec![FilterValue::Text("x' OR '1'='1".to_string())]
        );
    }

    #[test]
    fn test_translate_type_checks() {
        assert!(matches!(
            translate_filter("rank===first", ANNOTATION_FIELDS),
            Err(FilterError::NotAnInteger { .. })
        ));
        assert!(matches!(
            translate_filter("tag>gene", ANNOTATION_FIELDS),
            Err(FilterError::OperatorNotApplicable { .. })
        ));
        assert!(matches!(
            translate_filter("rank=~1", ANNOTATION_FIELDS),
            Err(FilterError::OperatorNotApplicable { .. })
        ));
    }

    #[test]
    fn test_operator_display_uses_canonical_symbol() {
        assert_eq!(Operator::Equal.to_string(), "===");
        assert_eq!(Operator::LessOrEqual.to_string(), "<=");
    }
}
