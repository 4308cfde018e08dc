use crate::registry::{format_number, quote};
use std::fmt;

/// Infix comparison operators of the script language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    Greater,
    Less,
    Equal,
    NotEqual,
}

impl CompareOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            CompareOp::Greater => ">",
            CompareOp::Less => "<",
            CompareOp::Equal => "==",
            CompareOp::NotEqual => "!=",
        }
    }
}

/// Arithmetic operators of the script language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArithOp {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl ArithOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            ArithOp::Add => "+",
            ArithOp::Subtract => "-",
            ArithOp::Multiply => "*",
            ArithOp::Divide => "/",
        }
    }

    fn precedence(&self) -> u8 {
        match self {
            ArithOp::Add | ArithOp::Subtract => 5,
            ArithOp::Multiply | ArithOp::Divide => 6,
        }
    }
}

/// Expression tree for everything the emitter synthesizes.
///
/// `Display` prints the canonical source form, adding parentheses only where
/// precedence requires them.
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptExpr {
    // Leaves
    Ident(String),
    Number(f64),
    Bool(bool),
    Str(String),

    Call {
        function: String,
        args: Vec<ScriptExpr>,
    },
    Compare(CompareOp, Box<ScriptExpr>, Box<ScriptExpr>),
    Arith(ArithOp, Box<ScriptExpr>, Box<ScriptExpr>),

    // Logical
    Not(Box<ScriptExpr>),
    And(Vec<ScriptExpr>),
    Or(Vec<ScriptExpr>),
}

impl ScriptExpr {
    pub fn ident(name: impl Into<String>) -> Self {
        ScriptExpr::Ident(name.into())
    }

    pub fn call(function: impl Into<String>, args: Vec<ScriptExpr>) -> Self {
        ScriptExpr::Call {
            function: function.into(),
            args,
        }
    }

    pub fn compare(op: CompareOp, left: ScriptExpr, right: ScriptExpr) -> Self {
        ScriptExpr::Compare(op, Box::new(left), Box::new(right))
    }

    pub fn arith(op: ArithOp, left: ScriptExpr, right: ScriptExpr) -> Self {
        ScriptExpr::Arith(op, Box::new(left), Box::new(right))
    }

    /// Conjunction of `terms`; a single term is returned as is, none yields `false`.
    pub fn all(mut terms: Vec<ScriptExpr>) -> Self {
        match terms.len() {
            0 => ScriptExpr::Bool(false),
            1 => terms.remove(0),
            _ => ScriptExpr::And(terms),
        }
    }

    /// Disjunction of `terms`; a single term is returned as is, none yields `false`.
    pub fn any(mut terms: Vec<ScriptExpr>) -> Self {
        match terms.len() {
            0 => ScriptExpr::Bool(false),
            1 => terms.remove(0),
            _ => ScriptExpr::Or(terms),
        }
    }

    fn precedence(&self) -> u8 {
        match self {
            ScriptExpr::Or(_) => 1,
            ScriptExpr::And(_) => 2,
            ScriptExpr::Not(_) => 3,
            ScriptExpr::Compare(..) => 4,
            ScriptExpr::Arith(op, ..) => op.precedence(),
            _ => u8::MAX,
        }
    }

    fn fmt_with(&self, f: &mut fmt::Formatter<'_>, parent_precedence: u8) -> fmt::Result {
        let precedence = self.precedence();
        let needs_parens = precedence < parent_precedence;
        if needs_parens {
            f.write_str("(")?;
        }

        match self {
            ScriptExpr::Ident(name) => f.write_str(name)?,
            ScriptExpr::Number(n) => f.write_str(&format_number(*n))?,
            ScriptExpr::Bool(b) => write!(f, "{}", b)?,
            ScriptExpr::Str(s) => f.write_str(&quote(s))?,
            ScriptExpr::Call { function, args } => {
                write!(f, "{}(", function)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    arg.fmt_with(f, 0)?;
                }
                f.write_str(")")?;
            }
            ScriptExpr::Compare(op, l, r) => {
                // Comparisons do not chain, so both sides bind tighter than the operator.
                l.fmt_with(f, precedence + 1)?;
                write!(f, " {} ", op.symbol())?;
                r.fmt_with(f, precedence + 1)?;
            }
            ScriptExpr::Arith(op, l, r) => {
                l.fmt_with(f, precedence)?;
                write!(f, " {} ", op.symbol())?;
                r.fmt_with(f, precedence + 1)?;
            }
            ScriptExpr::Not(v) => {
                f.write_str("not ")?;
                v.fmt_with(f, precedence)?;
            }
            ScriptExpr::And(terms) => fmt_chain(f, terms, " and ", precedence)?,
            ScriptExpr::Or(terms) => fmt_chain(f, terms, " or ", precedence)?,
        }

        if needs_parens {
            f.write_str(")")?;
        }
        Ok(())
    }
}

fn fmt_chain(
    f: &mut fmt::Formatter<'_>,
    terms: &[ScriptExpr],
    separator: &str,
    precedence: u8,
) -> fmt::Result {
    for (i, term) in terms.iter().enumerate() {
        if i > 0 {
            f.write_str(separator)?;
        }
        term.fmt_with(f, precedence + 1)?;
    }
    Ok(())
}

impl fmt::Display for ScriptExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_with(f, 0)
    }
}
