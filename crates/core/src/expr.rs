//! Predicate expression tree.
//!
//! An [`Expr`] is a boolean condition over the fields of a [`Record`]. It is
//! plain data rather than a closure, so the same value can be:
//!
//! - evaluated directly against one in-memory record ([`Expr::evaluate`]),
//! - rendered for humans (`Display`),
//! - serialized (`serde`),
//! - walked by a storage backend and rewritten into its native filter syntax.
//!
//! Field access goes through [`Record::value_of`] only, so a backend that maps
//! every [`FieldName`] to a column sees exactly the attributes the in-memory
//! evaluator sees.

use core::cmp::Ordering;
use core::fmt;
use std::borrow::Cow;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A field that expressions may reference.
///
/// `name()` is the stable attribute/column name used when an expression is
/// rendered or translated.
pub trait FieldName: Copy + Eq + fmt::Debug + Send + Sync + 'static {
    fn name(&self) -> &'static str;

    /// Kind of every value [`Record::value_of`] returns for this field.
    ///
    /// Translators rely on it to reject comparisons the evaluator would treat
    /// as unordered, so it must agree with the record's values.
    fn kind(&self) -> ValueKind;
}

/// Read-only attribute access for expression evaluation.
pub trait Record {
    type Field: FieldName;

    /// Current value of `field`.
    fn value_of(&self, field: Self::Field) -> Value;
}

/// A scalar attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Timestamp(DateTime<Utc>),
}

/// The kind of a [`Value`], without its payload.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    Bool,
    Int,
    Float,
    Text,
    Timestamp,
}

impl ValueKind {
    /// Whether values of these kinds are ordered against each other.
    ///
    /// Int and Float are mutually comparable; every other kind only with itself.
    pub fn comparable_with(self, other: ValueKind) -> bool {
        use ValueKind::{Float, Int};
        self == other || matches!((self, other), (Int, Float) | (Float, Int))
    }
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Bool(_) => ValueKind::Bool,
            Value::Int(_) => ValueKind::Int,
            Value::Float(_) => ValueKind::Float,
            Value::Text(_) => ValueKind::Text,
            Value::Timestamp(_) => ValueKind::Timestamp,
        }
    }

    pub fn is_nan(&self) -> bool {
        matches!(self, Value::Float(v) if v.is_nan())
    }

    /// Order two values.
    ///
    /// Int and Float compare numerically. Any other kind mismatch, or a NaN,
    /// is unordered (`None`).
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
            (Value::Int(a), Value::Float(b)) => (*a as f64).partial_cmp(b),
            (Value::Float(a), Value::Int(b)) => a.partial_cmp(&(*b as f64)),
            (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
            (Value::Timestamp(a), Value::Timestamp(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "{}", if *v { "TRUE" } else { "FALSE" }),
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Text(v) => write!(f, "'{}'", v.replace('\'', "''")),
            Value::Timestamp(v) => write!(f, "'{}'", v.to_rfc3339()),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(value: DateTime<Utc>) -> Self {
        Value::Timestamp(value)
    }
}

/// Comparison operator.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompareOp {
    pub fn symbol(self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Ne => "!=",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
        }
    }

    /// Whether `left op right` holds given `left.cmp(right)`.
    pub fn holds(self, ordering: Ordering) -> bool {
        match self {
            CompareOp::Eq => ordering == Ordering::Equal,
            CompareOp::Ne => ordering != Ordering::Equal,
            CompareOp::Lt => ordering == Ordering::Less,
            CompareOp::Le => ordering != Ordering::Greater,
            CompareOp::Gt => ordering == Ordering::Greater,
            CompareOp::Ge => ordering != Ordering::Less,
        }
    }
}

/// One side of a comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operand<F> {
    Field(F),
    Value(Value),
}

impl<F: FieldName> Operand<F> {
    /// Kind of the value this operand yields.
    pub fn kind(&self) -> ValueKind {
        match self {
            Operand::Field(field) => field.kind(),
            Operand::Value(value) => value.kind(),
        }
    }

    /// Whether `self op other` can ever hold: the kinds are comparable and
    /// neither side is a NaN literal. When this is false the comparison
    /// evaluates to false for every record.
    pub fn is_comparable_with(&self, other: &Operand<F>) -> bool {
        let nan = |operand: &Operand<F>| matches!(operand, Operand::Value(v) if v.is_nan());
        self.kind().comparable_with(other.kind()) && !nan(self) && !nan(other)
    }

    fn resolve<R>(&self, record: &R) -> Cow<'_, Value>
    where
        R: Record<Field = F> + ?Sized,
    {
        match self {
            Operand::Field(field) => Cow::Owned(record.value_of(*field)),
            Operand::Value(value) => Cow::Borrowed(value),
        }
    }
}

impl<F: FieldName> fmt::Display for Operand<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Field(field) => f.write_str(field.name()),
            Operand::Value(value) => fmt::Display::fmt(value, f),
        }
    }
}

/// Boolean condition over the fields `F` of some record type.
///
/// `And([])` is true and `Or([])` is false.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expr<F> {
    Const(bool),
    Compare {
        left: Operand<F>,
        op: CompareOp,
        right: Operand<F>,
    },
    And(Vec<Expr<F>>),
    Or(Vec<Expr<F>>),
    Not(Box<Expr<F>>),
}

/// Builder returned by [`Expr::field`].
#[derive(Debug, Copy, Clone)]
pub struct FieldRef<F>(F);

impl<F: FieldName> FieldRef<F> {
    fn against(self, op: CompareOp, value: impl Into<Value>) -> Expr<F> {
        Expr::compare(Operand::Field(self.0), op, Operand::Value(value.into()))
    }

    pub fn eq(self, value: impl Into<Value>) -> Expr<F> {
        self.against(CompareOp::Eq, value)
    }

    pub fn ne(self, value: impl Into<Value>) -> Expr<F> {
        self.against(CompareOp::Ne, value)
    }

    pub fn lt(self, value: impl Into<Value>) -> Expr<F> {
        self.against(CompareOp::Lt, value)
    }

    pub fn le(self, value: impl Into<Value>) -> Expr<F> {
        self.against(CompareOp::Le, value)
    }

    pub fn gt(self, value: impl Into<Value>) -> Expr<F> {
        self.against(CompareOp::Gt, value)
    }

    pub fn ge(self, value: impl Into<Value>) -> Expr<F> {
        self.against(CompareOp::Ge, value)
    }

    /// Compare this field against another field of the same record.
    pub fn cmp_field(self, op: CompareOp, other: F) -> Expr<F> {
        Expr::compare(Operand::Field(self.0), op, Operand::Field(other))
    }
}

impl<F: FieldName> Expr<F> {
    /// The condition every record satisfies.
    pub fn always() -> Self {
        Expr::Const(true)
    }

    /// The condition no record satisfies.
    pub fn never() -> Self {
        Expr::Const(false)
    }

    /// Start a comparison on `field`.
    pub fn field(field: F) -> FieldRef<F> {
        FieldRef(field)
    }

    pub fn compare(left: Operand<F>, op: CompareOp, right: Operand<F>) -> Self {
        Expr::Compare { left, op, right }
    }

    /// Conjunction. Nested conjunctions are flattened into one term list.
    pub fn and(self, other: Expr<F>) -> Self {
        let mut terms = Vec::new();
        for expr in [self, other] {
            match expr {
                Expr::And(inner) => terms.extend(inner),
                expr => terms.push(expr),
            }
        }
        Expr::And(terms)
    }

    /// Disjunction. Nested disjunctions are flattened into one term list.
    pub fn or(self, other: Expr<F>) -> Self {
        let mut terms = Vec::new();
        for expr in [self, other] {
            match expr {
                Expr::Or(inner) => terms.extend(inner),
                expr => terms.push(expr),
            }
        }
        Expr::Or(terms)
    }

    pub fn negate(self) -> Self {
        Expr::Not(Box::new(self))
    }

    /// Evaluate the condition against one record.
    ///
    /// A comparison between unordered values (kind mismatch, NaN) is false.
    pub fn evaluate<R>(&self, record: &R) -> bool
    where
        R: Record<Field = F> + ?Sized,
    {
        match self {
            Expr::Const(value) => *value,
            Expr::Compare { left, op, right } => {
                let left = left.resolve(record);
                let right = right.resolve(record);
                left.compare(&right).is_some_and(|ordering| op.holds(ordering))
            }
            Expr::And(terms) => terms.iter().all(|term| term.evaluate(record)),
            Expr::Or(terms) => terms.iter().any(|term| term.evaluate(record)),
            Expr::Not(inner) => !inner.evaluate(record),
        }
    }

    /// Fields referenced anywhere in the tree, in first-seen order.
    pub fn fields(&self) -> Vec<F> {
        let mut out = Vec::new();
        self.collect_fields(&mut out);
        out
    }

    fn collect_fields(&self, out: &mut Vec<F>) {
        match self {
            Expr::Const(_) => {}
            Expr::Compare { left, right, .. } => {
                for operand in [left, right] {
                    if let Operand::Field(field) = operand {
                        if !out.contains(field) {
                            out.push(*field);
                        }
                    }
                }
            }
            Expr::And(terms) | Expr::Or(terms) => {
                for term in terms {
                    term.collect_fields(out);
                }
            }
            Expr::Not(inner) => inner.collect_fields(out),
        }
    }
}

impl<F: FieldName> fmt::Display for Expr<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Const(true) => f.write_str("TRUE"),
            Expr::Const(false) => f.write_str("FALSE"),
            Expr::Compare { left, op, right } => write!(f, "{left} {} {right}", op.symbol()),
            Expr::And(terms) if terms.is_empty() => f.write_str("TRUE"),
            Expr::Or(terms) if terms.is_empty() => f.write_str("FALSE"),
            Expr::And(terms) => write_joined(f, terms, " AND "),
            Expr::Or(terms) => write_joined(f, terms, " OR "),
            Expr::Not(inner) => match inner.as_ref() {
                Expr::Compare { .. } | Expr::Const(_) => write!(f, "NOT ({inner})"),
                _ => write!(f, "NOT {inner}"),
            },
        }
    }
}

fn write_joined<F: FieldName>(f: &mut fmt::Formatter<'_>, terms: &[Expr<F>], sep: &str) -> fmt::Result {
    f.write_str("(")?;
    for (idx, term) in terms.iter().enumerate() {
        if idx > 0 {
            f.write_str(sep)?;
        }
        write!(f, "{term}")?;
    }
    f.write_str(")")
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::TimeZone;

    #[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub(crate) enum TicketField {
        Seats,
        Price,
        Title,
        Starts,
        Premium,
    }

    impl FieldName for TicketField {
        fn name(&self) -> &'static str {
            match self {
                TicketField::Seats => "seats",
                TicketField::Price => "price",
                TicketField::Title => "title",
                TicketField::Starts => "starts",
                TicketField::Premium => "premium",
            }
        }

        fn kind(&self) -> ValueKind {
            match self {
                TicketField::Seats => ValueKind::Int,
                TicketField::Price => ValueKind::Float,
                TicketField::Title => ValueKind::Text,
                TicketField::Starts => ValueKind::Timestamp,
                TicketField::Premium => ValueKind::Bool,
            }
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    pub(crate) struct Ticket {
        pub(crate) seats: i64,
        pub(crate) price: f64,
        pub(crate) title: String,
        pub(crate) starts: DateTime<Utc>,
        pub(crate) premium: bool,
    }

    impl Record for Ticket {
        type Field = TicketField;

        fn value_of(&self, field: TicketField) -> Value {
            match field {
                TicketField::Seats => Value::Int(self.seats),
                TicketField::Price => Value::Float(self.price),
                TicketField::Title => Value::Text(self.title.clone()),
                TicketField::Starts => Value::Timestamp(self.starts),
                TicketField::Premium => Value::Bool(self.premium),
            }
        }
    }

    pub(crate) fn ticket(seats: i64, price: f64) -> Ticket {
        Ticket {
            seats,
            price,
            title: "Matinee".to_string(),
            starts: Utc.with_ymd_and_hms(2026, 1, 1, 14, 0, 0).unwrap(),
            premium: false,
        }
    }

    #[test]
    fn comparison_operators_follow_ordering() {
        let t = ticket(4, 12.5);

        assert!(Expr::field(TicketField::Seats).eq(4).evaluate(&t));
        assert!(Expr::field(TicketField::Seats).ne(5).evaluate(&t));
        assert!(Expr::field(TicketField::Seats).lt(5).evaluate(&t));
        assert!(Expr::field(TicketField::Seats).le(4).evaluate(&t));
        assert!(!Expr::field(TicketField::Seats).gt(4).evaluate(&t));
        assert!(Expr::field(TicketField::Seats).ge(4).evaluate(&t));
    }

    #[test]
    fn int_and_float_compare_numerically() {
        let t = ticket(4, 12.0);

        assert!(Expr::field(TicketField::Price).ge(12).evaluate(&t));
        assert!(Expr::field(TicketField::Seats).lt(4.5).evaluate(&t));
    }

    #[test]
    fn mismatched_kinds_never_satisfy() {
        let t = ticket(4, 12.0);

        assert!(!Expr::field(TicketField::Seats).eq("4").evaluate(&t));
        assert!(!Expr::field(TicketField::Seats).ne("4").evaluate(&t));
        assert!(!Expr::field(TicketField::Price).le(f64::NAN).evaluate(&t));
    }

    #[test]
    fn declared_field_kinds_match_record_values() {
        let t = ticket(2, 9.5);
        for field in [
            TicketField::Seats,
            TicketField::Price,
            TicketField::Title,
            TicketField::Starts,
            TicketField::Premium,
        ] {
            assert_eq!(t.value_of(field).kind(), field.kind(), "{field:?}");
        }
    }

    #[test]
    fn comparability_mirrors_evaluation() {
        let seats = Operand::Field(TicketField::Seats);
        let price = Operand::Field(TicketField::Price);
        let title = Operand::Field(TicketField::Title);

        assert!(seats.is_comparable_with(&price));
        assert!(seats.is_comparable_with(&Operand::Value(Value::Float(2.5))));
        assert!(!seats.is_comparable_with(&title));
        assert!(!title.is_comparable_with(&Operand::Value(Value::Int(5))));
        assert!(!price.is_comparable_with(&Operand::Value(Value::Float(f64::NAN))));

        assert!(ValueKind::Int.comparable_with(ValueKind::Float));
        assert!(!ValueKind::Bool.comparable_with(ValueKind::Int));
        assert!(!ValueKind::Text.comparable_with(ValueKind::Timestamp));
    }

    #[test]
    fn text_timestamp_and_bool_fields_compare() {
        let t = ticket(1, 1.0);
        let later = Utc.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).unwrap();

        assert!(Expr::field(TicketField::Title).eq("Matinee").evaluate(&t));
        assert!(Expr::field(TicketField::Title).lt("Night").evaluate(&t));
        assert!(Expr::field(TicketField::Starts).le(later).evaluate(&t));
        assert!(Expr::field(TicketField::Premium).eq(false).evaluate(&t));
    }

    #[test]
    fn field_to_field_comparison() {
        let t = ticket(10, 9.5);
        let expr = Expr::field(TicketField::Seats).cmp_field(CompareOp::Gt, TicketField::Price);
        assert!(expr.evaluate(&t));
    }

    #[test]
    fn empty_conjunction_is_true_and_empty_disjunction_is_false() {
        let t = ticket(1, 1.0);
        assert!(Expr::<TicketField>::And(vec![]).evaluate(&t));
        assert!(!Expr::<TicketField>::Or(vec![]).evaluate(&t));
    }

    #[test]
    fn connectives_flatten_and_evaluate() {
        let t = ticket(3, 8.0);
        let cheap = Expr::field(TicketField::Price).lt(10.0);
        let small = Expr::field(TicketField::Seats).le(2);
        let titled = Expr::field(TicketField::Title).eq("Matinee");

        let all = cheap.clone().and(small.clone()).and(titled.clone());
        match &all {
            Expr::And(terms) => assert_eq!(terms.len(), 3),
            other => panic!("Expected flattened And, got {other:?}"),
        }
        assert!(!all.evaluate(&t));

        let any = small.clone().or(cheap.clone()).or(titled);
        match &any {
            Expr::Or(terms) => assert_eq!(terms.len(), 3),
            other => panic!("Expected flattened Or, got {other:?}"),
        }
        assert!(any.evaluate(&t));

        assert!(small.negate().evaluate(&t));
    }

    #[test]
    fn display_is_readable_infix() {
        let expr = Expr::field(TicketField::Seats)
            .le(2)
            .and(Expr::field(TicketField::Title).eq("It's on").negate())
            .or(Expr::never());

        assert_eq!(
            expr.to_string(),
            "((seats <= 2 AND NOT (title = 'It''s on')) OR FALSE)"
        );
        assert_eq!(Expr::<TicketField>::And(vec![]).to_string(), "TRUE");
    }

    #[test]
    fn serializes_as_tagged_tree() {
        let expr = Expr::field(TicketField::Seats).le(2);
        let json = serde_json::to_value(&expr).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "compare": {
                    "left": { "field": "seats" },
                    "op": "le",
                    "right": { "value": { "type": "int", "value": 2 } }
                }
            })
        );

        let back: Expr<TicketField> = serde_json::from_value(json).unwrap();
        assert_eq!(back, expr);
    }

    #[test]
    fn fields_are_collected_once_in_order() {
        let expr = Expr::field(TicketField::Price)
            .lt(5.0)
            .or(Expr::field(TicketField::Seats).gt(1))
            .and(Expr::field(TicketField::Price).gt(1.0).negate());

        assert_eq!(expr.fields(), vec![TicketField::Price, TicketField::Seats]);
    }
}
