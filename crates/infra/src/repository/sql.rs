//! Expression → SQL translation.
//!
//! Walks an [`Expr`] and appends an equivalent Postgres boolean expression to a
//! [`QueryBuilder`]. Field operands become column names (from
//! [`FieldName::name`], which are static identifiers owned by the domain);
//! value operands are always bound as parameters (`$1`, `$2`, ...), never
//! spliced into the SQL text.
//!
//! The translation is structural, with three exceptions that keep Postgres
//! selecting the same rows as [`Expr::evaluate`]:
//!
//! - empty conjunctions/disjunctions become `TRUE`/`FALSE`;
//! - a comparison the evaluator treats as unordered (mismatched value kinds,
//!   a NaN literal) becomes `FALSE` instead of a type error or NaN ordering;
//! - text comparisons use `COLLATE "C"`, the byte order `str` compares by.
//!
//! Stored NaNs are not handled here; entities with float fields must reject
//! them (as `Movie` does).

use cinema_core::{CompareOp, Expr, FieldName, Operand, Value, ValueKind};
use sqlx::{Postgres, QueryBuilder};

/// Append `expr` as a SQL boolean expression.
pub fn push_filter<F: FieldName>(builder: &mut QueryBuilder<'_, Postgres>, expr: &Expr<F>) {
    match expr {
        Expr::Const(true) => {
            builder.push("TRUE");
        }
        Expr::Const(false) => {
            builder.push("FALSE");
        }
        Expr::Compare { left, right, .. } if !left.is_comparable_with(right) => {
            builder.push("FALSE");
        }
        Expr::Compare { left, op, right } => {
            push_operand(builder, left);
            if left.kind() == ValueKind::Text {
                builder.push(r#" COLLATE "C""#);
            }
            builder.push(" ").push(sql_operator(*op)).push(" ");
            push_operand(builder, right);
        }
        Expr::And(terms) if terms.is_empty() => {
            builder.push("TRUE");
        }
        Expr::Or(terms) if terms.is_empty() => {
            builder.push("FALSE");
        }
        Expr::And(terms) => push_joined(builder, terms, " AND "),
        Expr::Or(terms) => push_joined(builder, terms, " OR "),
        Expr::Not(inner) => {
            builder.push("NOT (");
            push_filter(builder, inner);
            builder.push(")");
        }
    }
}

/// Render `expr` as a standalone `WHERE` body. Placeholders are numbered from
/// `$1`; bound values are not included.
pub fn filter_sql<F: FieldName>(expr: &Expr<F>) -> String {
    let mut builder = QueryBuilder::<Postgres>::new("");
    push_filter(&mut builder, expr);
    builder.sql().to_string()
}

fn push_joined<F: FieldName>(builder: &mut QueryBuilder<'_, Postgres>, terms: &[Expr<F>], sep: &str) {
    builder.push("(");
    for (idx, term) in terms.iter().enumerate() {
        if idx > 0 {
            builder.push(sep);
        }
        push_filter(builder, term);
    }
    builder.push(")");
}

fn push_operand<F: FieldName>(builder: &mut QueryBuilder<'_, Postgres>, operand: &Operand<F>) {
    match operand {
        Operand::Field(field) => {
            builder.push(field.name());
        }
        Operand::Value(value) => push_value(builder, value),
    }
}

fn push_value(builder: &mut QueryBuilder<'_, Postgres>, value: &Value) {
    match value {
        Value::Bool(v) => builder.push_bind(*v),
        Value::Int(v) => builder.push_bind(*v),
        Value::Float(v) => builder.push_bind(*v),
        Value::Text(v) => builder.push_bind(v.clone()),
        Value::Timestamp(v) => builder.push_bind(*v),
    };
}

fn sql_operator(op: CompareOp) -> &'static str {
    match op {
        CompareOp::Eq => "=",
        CompareOp::Ne => "<>",
        CompareOp::Lt => "<",
        CompareOp::Le => "<=",
        CompareOp::Gt => ">",
        CompareOp::Ge => ">=",
    }
}
