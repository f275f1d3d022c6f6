//! Dialect-neutral SQL expressions and conditions.
//!
//! Search components build [`Expr`] and [`Condition`] trees. Nothing in these
//! trees is backend-specific: identifiers, placeholders, and JSON access are
//! spelled out by [`SqlWriter`] for the target [`Dialect`] at render time.

use crate::dialect::Dialect;

/// Type-safe parameter binding for SQL queries.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryParam {
    /// Integer parameter.
    Int(i64),
    /// Floating point parameter.
    Float(f64),
    /// String parameter.
    String(String),
}

/// A column reference, optionally qualified by a table alias.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub table: Option<String>,
    pub name: String,
}

impl Column {
    pub fn new(table: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            table: Some(table.into()),
            name: name.into(),
        }
    }

    pub fn bare(name: impl Into<String>) -> Self {
        Self {
            table: None,
            name: name.into(),
        }
    }
}

/// Arithmetic operators used in computed expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
}

impl BinaryOp {
    fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
        }
    }

    fn precedence(self) -> u8 {
        match self {
            Self::Add | Self::Sub => 1,
            Self::Mul => 2,
        }
    }
}

/// Comparison operators used in predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Le,
}

impl CompareOp {
    fn symbol(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Le => "<=",
        }
    }
}

/// A scalar SQL expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Column(Column),
    /// Reference to a projection alias.
    Alias(String),
    Int(i64),
    Float(f64),
    Null,
    Param(QueryParam),
    Func {
        name: &'static str,
        args: Vec<Expr>,
    },
    Binary {
        left: Box<Expr>,
        op: BinaryOp,
        right: Box<Expr>,
    },
    /// Explicit parentheses.
    Group(Box<Expr>),
    /// Numeric value stored under `key` in a JSON column.
    JsonNumber { column: Column, key: String },
}

impl Expr {
    pub fn column(table: &str, name: &str) -> Self {
        Self::Column(Column::new(table, name))
    }

    pub fn func(name: &'static str, args: Vec<Expr>) -> Self {
        Self::Func { name, args }
    }

    pub fn binary(left: Expr, op: BinaryOp, right: Expr) -> Self {
        Self::Binary {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }

    pub fn group(inner: Expr) -> Self {
        Self::Group(Box::new(inner))
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::Param(QueryParam::String(value.into()))
    }

    pub fn eq(self, right: Expr) -> Condition {
        Condition::Compare {
            left: self,
            op: CompareOp::Eq,
            right,
        }
    }

    pub fn le(self, right: Expr) -> Condition {
        Condition::Compare {
            left: self,
            op: CompareOp::Le,
            right,
        }
    }

    pub fn is_null(self) -> Condition {
        Condition::IsNull(self)
    }
}

/// A boolean SQL predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Compare {
        left: Expr,
        op: CompareOp,
        right: Expr,
    },
    IsNull(Expr),
    Not(Box<Condition>),
    And(Vec<Condition>),
    Or(Vec<Condition>),
}

impl Condition {
    pub fn not(inner: Condition) -> Self {
        Self::Not(Box::new(inner))
    }

    /// Conjunction that collapses to its only member when given one.
    pub fn all(mut conditions: Vec<Condition>) -> Self {
        if conditions.len() == 1 {
            conditions.remove(0)
        } else {
            Self::And(conditions)
        }
    }

    /// Disjunction that collapses to its only member when given one.
    pub fn any(mut conditions: Vec<Condition>) -> Self {
        if conditions.len() == 1 {
            conditions.remove(0)
        } else {
            Self::Or(conditions)
        }
    }
}

/// Renders expression trees for one dialect, collecting bound parameters
/// in placeholder order.
#[derive(Debug)]
pub struct SqlWriter {
    dialect: Dialect,
    params: Vec<QueryParam>,
}

impl SqlWriter {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            params: Vec::new(),
        }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Parameters collected so far.
    pub fn into_params(self) -> Vec<QueryParam> {
        self.params
    }

    pub fn column(&self, column: &Column) -> String {
        match &column.table {
            Some(table) => format!(
                "{}.{}",
                self.dialect.quote_identifier(table),
                self.dialect.quote_identifier(&column.name)
            ),
            None => self.dialect.quote_identifier(&column.name),
        }
    }

    pub fn expr(&mut self, expr: &Expr) -> String {
        match expr {
            Expr::Column(column) => self.column(column),
            Expr::Alias(alias) => self.dialect.quote_identifier(alias),
            Expr::Int(n) => n.to_string(),
            Expr::Float(n) => n.to_string(),
            Expr::Null => "NULL".to_string(),
            Expr::Param(param) => {
                self.params.push(param.clone());
                self.dialect.placeholder(self.params.len())
            }
            Expr::Func { name, args } => {
                let args: Vec<String> = args.iter().map(|arg| self.expr(arg)).collect();
                format!("{}({})", name, args.join(", "))
            }
            Expr::Binary { left, op, right } => {
                let l = self.operand(left, *op, false);
                let r = self.operand(right, *op, true);
                format!("{} {} {}", l, op.symbol(), r)
            }
            Expr::Group(inner) => format!("({})", self.expr(inner)),
            Expr::JsonNumber { column, key } => {
                let column = self.column(column);
                self.dialect.json_extract_number(&column, key)
            }
        }
    }

    fn operand(&mut self, expr: &Expr, parent: BinaryOp, is_right: bool) -> String {
        let needs_parens = match expr {
            Expr::Binary { op, .. } => {
                op.precedence() < parent.precedence()
                    || (is_right && op.precedence() == parent.precedence() && parent != BinaryOp::Add)
            }
            _ => false,
        };
        let rendered = self.expr(expr);
        if needs_parens {
            format!("({rendered})")
        } else {
            rendered
        }
    }

    pub fn condition(&mut self, condition: &Condition) -> String {
        match condition {
            Condition::Compare { left, op, right } => {
                let l = self.expr(left);
                let r = self.expr(right);
                format!("{} {} {}", l, op.symbol(), r)
            }
            Condition::IsNull(expr) => format!("{} IS NULL", self.expr(expr)),
            Condition::Not(inner) => match inner.as_ref() {
                Condition::And(_) | Condition::Or(_) => format!("NOT {}", self.condition(inner)),
                _ => format!("NOT ({})", self.condition(inner)),
            },
            Condition::And(items) => self.junction(items, " AND ", "TRUE"),
            Condition::Or(items) => self.junction(items, " OR ", "FALSE"),
        }
    }

    fn junction(&mut self, items: &[Condition], sep: &str, empty: &str) -> String {
        if items.is_empty() {
            return empty.to_string();
        }
        let mut out = String::from("(");
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                out.push_str(sep);
            }
            let rendered = self.condition(item);
            out.push_str(&rendered);
        }
        out.push(')');
        out
    }
}
