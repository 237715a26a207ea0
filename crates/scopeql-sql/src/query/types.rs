//! Query builder types and enums.

/// Comparison operators used in WHERE terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// Equal (=)
    Eq,
    /// Greater than (>)
    Gt,
    /// Less than (<)
    Lt,
    /// IN list
    In,
    /// IS NULL
    IsNull,
    /// LIKE
    Like,
}

impl Operator {
    /// Returns the SQL operator string.
    pub fn to_sql(&self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Gt => ">",
            Operator::Lt => "<",
            Operator::In => "IN",
            Operator::IsNull => "IS NULL",
            Operator::Like => "LIKE",
        }
    }
}

/// Sort order direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderDirection {
    /// Ascending order
    Asc,
    /// Descending order
    Desc,
}

impl OrderDirection {
    /// Returns the SQL order direction string.
    pub fn to_sql(&self) -> &'static str {
        match self {
            OrderDirection::Asc => "ASC",
            OrderDirection::Desc => "DESC",
        }
    }
}

/// Type of SQL JOIN
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinType {
    /// JOIN
    Inner,
}

impl JoinType {
    /// Returns the SQL JOIN type string.
    pub fn to_sql(&self) -> &'static str {
        match self {
            JoinType::Inner => "JOIN",
        }
    }
}
