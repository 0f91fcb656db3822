//! Binary, unary and assignment operators.
//!
//! Precedence levels follow the language's operator table (higher number
//! binds tighter):
//! - 1: `||`
//! - 2: `&&`
//! - 3: `|`
//! - 4: `&`
//! - 5: `<` `<=` `==` `!=` `>=` `>`
//! - 6: `:` (range expressions)
//! - 7: `+` `-`
//! - 8: `*` `/` `\` `.*` `./` `.\`
//! - 9: prefix unary `-` `!` `++` `--`
//! - 10: `^` `.^`
//! - 11: postfix `'` `.'` `++` `--`

/// Binary operators.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum BinaryOp {
    // Matrix arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Pow,
    LeftDiv,

    // Element-wise arithmetic
    ElMul,
    ElDiv,
    ElPow,
    ElLeftDiv,

    // Comparison (element-wise)
    Lt,
    Le,
    Eq,
    Ge,
    Gt,
    Ne,

    // Element-wise logical
    ElAnd,
    ElOr,

    // Short-circuit logical
    AndAnd,
    OrOr,
}

impl BinaryOp {
    /// Source-level symbol, used by the code printer and in error messages.
    pub const fn as_symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Pow => "^",
            Self::LeftDiv => "\\",
            Self::ElMul => ".*",
            Self::ElDiv => "./",
            Self::ElPow => ".^",
            Self::ElLeftDiv => ".\\",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Eq => "==",
            Self::Ge => ">=",
            Self::Gt => ">",
            Self::Ne => "!=",
            Self::ElAnd => "&",
            Self::ElOr => "|",
            Self::AndAnd => "&&",
            Self::OrOr => "||",
        }
    }

    /// Operation name used in "binary operator '+' not implemented for ..."
    /// style diagnostics.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Add => "addition",
            Self::Sub => "subtraction",
            Self::Mul => "multiplication",
            Self::Div => "division",
            Self::Pow => "power",
            Self::LeftDiv => "left division",
            Self::ElMul => "element-wise multiplication",
            Self::ElDiv => "element-wise division",
            Self::ElPow => "element-wise power",
            Self::ElLeftDiv => "element-wise left division",
            Self::Lt | Self::Le | Self::Eq | Self::Ge | Self::Gt | Self::Ne => "comparison",
            Self::ElAnd | Self::ElOr => "element-wise logical operation",
            Self::AndAnd | Self::OrOr => "short-circuit logical operation",
        }
    }

    /// Binding strength; see the module docs for the table.
    pub const fn precedence(self) -> u8 {
        match self {
            Self::OrOr => 1,
            Self::AndAnd => 2,
            Self::ElOr => 3,
            Self::ElAnd => 4,
            Self::Lt | Self::Le | Self::Eq | Self::Ge | Self::Gt | Self::Ne => 5,
            Self::Add | Self::Sub => 7,
            Self::Mul
            | Self::Div
            | Self::LeftDiv
            | Self::ElMul
            | Self::ElDiv
            | Self::ElLeftDiv => 8,
            Self::Pow | Self::ElPow => 10,
        }
    }

    /// True for operators whose result is computed independently per element
    /// (after scalar broadcasting). These are the operators that can update
    /// a matrix in place.
    pub const fn is_elementwise(self) -> bool {
        !matches!(
            self,
            Self::Mul | Self::Div | Self::LeftDiv | Self::Pow | Self::AndAnd | Self::OrOr
        )
    }

    /// True for the two short-circuit operators, whose right operand may be
    /// skipped.
    pub const fn is_short_circuit(self) -> bool {
        matches!(self, Self::AndAnd | Self::OrOr)
    }
}

/// Unary operators, both prefix and postfix.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum UnaryOp {
    // Prefix
    Neg,
    Not,
    PreIncrement,
    PreDecrement,

    // Postfix
    Transpose,
    Hermitian,
    PostIncrement,
    PostDecrement,
}

impl UnaryOp {
    pub const fn as_symbol(self) -> &'static str {
        match self {
            Self::Neg => "-",
            Self::Not => "!",
            Self::PreIncrement | Self::PostIncrement => "++",
            Self::PreDecrement | Self::PostDecrement => "--",
            Self::Transpose => ".'",
            Self::Hermitian => "'",
        }
    }

    pub const fn is_prefix(self) -> bool {
        matches!(
            self,
            Self::Neg | Self::Not | Self::PreIncrement | Self::PreDecrement
        )
    }

    /// Increment and decrement operators modify their operand's storage.
    pub const fn is_bump(self) -> bool {
        matches!(
            self,
            Self::PreIncrement | Self::PreDecrement | Self::PostIncrement | Self::PostDecrement
        )
    }

    /// Step applied by an increment or decrement, `None` for other operators.
    pub const fn bump_step(self) -> Option<f64> {
        match self {
            Self::PreIncrement | Self::PostIncrement => Some(1.0),
            Self::PreDecrement | Self::PostDecrement => Some(-1.0),
            _ => None,
        }
    }

    pub const fn precedence(self) -> u8 {
        if self.is_prefix() {
            9
        } else {
            11
        }
    }
}

/// Assignment operators.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum AssignOp {
    Assign,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
    LeftDivAssign,
    PowAssign,
    ElMulAssign,
    ElDivAssign,
    ElLeftDivAssign,
    ElPowAssign,
    AndAssign,
    OrAssign,
}

impl AssignOp {
    pub const fn as_symbol(self) -> &'static str {
        match self {
            Self::Assign => "=",
            Self::AddAssign => "+=",
            Self::SubAssign => "-=",
            Self::MulAssign => "*=",
            Self::DivAssign => "/=",
            Self::LeftDivAssign => "\\=",
            Self::PowAssign => "^=",
            Self::ElMulAssign => ".*=",
            Self::ElDivAssign => "./=",
            Self::ElLeftDivAssign => ".\\=",
            Self::ElPowAssign => ".^=",
            Self::AndAssign => "&=",
            Self::OrAssign => "|=",
        }
    }

    /// Binary operator applied by an operator-assignment (`x += e` applies
    /// `+`). Plain `=` has none.
    pub const fn binary_op(self) -> Option<BinaryOp> {
        match self {
            Self::Assign => None,
            Self::AddAssign => Some(BinaryOp::Add),
            Self::SubAssign => Some(BinaryOp::Sub),
            Self::MulAssign => Some(BinaryOp::Mul),
            Self::DivAssign => Some(BinaryOp::Div),
            Self::LeftDivAssign => Some(BinaryOp::LeftDiv),
            Self::PowAssign => Some(BinaryOp::Pow),
            Self::ElMulAssign => Some(BinaryOp::ElMul),
            Self::ElDivAssign => Some(BinaryOp::ElDiv),
            Self::ElLeftDivAssign => Some(BinaryOp::ElLeftDiv),
            Self::ElPowAssign => Some(BinaryOp::ElPow),
            Self::AndAssign => Some(BinaryOp::ElAnd),
            Self::OrAssign => Some(BinaryOp::ElOr),
        }
    }
}
