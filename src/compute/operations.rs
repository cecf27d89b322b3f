//! Primitive operation catalogue.
//!
//! Operations are evaluated lane-wise over sample vectors. Each operation
//! carries a domain guard; lanes outside the guard keep the value already in
//! the output row instead of producing NaN or infinity.

/// Operands of `+`, `-` and `*` must lie strictly inside `(-LIMIT, LIMIT)`.
///
/// `f64::MAX` is about `1.8e308`; `1e30 * 1e30 = 1e60` stays far below it
/// even after squaring in the fitness sum.
pub const ARITHMETIC_LIMIT: f64 = 1e30;

/// Largest argument `e^n` is evaluated for.
pub const EXP_LIMIT: f64 = 50.0;

/// A primitive operation. The discriminant is the gene operation code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Add = 0,
    Sub = 1,
    Mul = 2,
    Mod = 3,
    Sin = 4,
    Cos = 5,
    Exp = 6,
    Ln = 7,
}

impl Operation {
    /// All operations in code order.
    pub const ALL: [Operation; 8] = [
        Operation::Add,
        Operation::Sub,
        Operation::Mul,
        Operation::Mod,
        Operation::Sin,
        Operation::Cos,
        Operation::Exp,
        Operation::Ln,
    ];

    /// Number of operations in the catalogue.
    pub const COUNT: usize = Self::ALL.len();

    /// Look up an operation by gene code.
    #[inline]
    pub fn from_code(code: usize) -> Option<Self> {
        Self::ALL.get(code).copied()
    }

    #[inline]
    pub fn code(self) -> usize {
        self as usize
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Mod => "%",
            Self::Sin => "sin",
            Self::Cos => "cos",
            Self::Exp => "e^n",
            Self::Ln => "ln(|x|)",
        }
    }

    /// Number of operands the operation reads (1 or 2).
    #[inline]
    pub fn arity(self) -> usize {
        match self {
            Self::Add | Self::Sub | Self::Mul | Self::Mod => 2,
            Self::Sin | Self::Cos | Self::Exp | Self::Ln => 1,
        }
    }

    /// Evaluate a single lane. `y` is ignored by unary operations.
    ///
    /// Returns `None` when the lane is outside the operation's domain guard.
    #[inline]
    pub fn eval(self, x: f64, y: f64) -> Option<f64> {
        match self {
            Self::Add => in_range(x, y).then(|| x + y),
            Self::Sub => in_range(x, y).then(|| x - y),
            Self::Mul => in_range(x, y).then(|| x * y),
            Self::Mod => (y != 0.0).then(|| floored_mod(x, y)),
            Self::Sin => Some(x.sin()),
            Self::Cos => Some(x.cos()),
            Self::Exp => (x <= EXP_LIMIT).then(|| x.exp()),
            Self::Ln => (x != 0.0).then(|| x.abs().ln()),
        }
    }

    /// Evaluate over whole rows, writing guarded lanes into `out`.
    ///
    /// For unary operations `rhs` is not read and may alias `lhs`.
    pub fn apply(self, lhs: &[f64], rhs: &[f64], out: &mut [f64]) {
        for ((o, &x), &y) in out.iter_mut().zip(lhs).zip(rhs) {
            if let Some(value) = self.eval(x, y) {
                *o = value;
            }
        }
    }
}

#[inline]
fn in_range(x: f64, y: f64) -> bool {
    x.abs() < ARITHMETIC_LIMIT && y.abs() < ARITHMETIC_LIMIT
}

/// Modulo whose result takes the sign of the divisor.
#[inline]
fn floored_mod(x: f64, y: f64) -> f64 {
    let r = x % y;
    if r != 0.0 && (r < 0.0) != (y < 0.0) {
        r + y
    } else {
        r
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalogue_order() {
        for (code, op) in Operation::ALL.iter().enumerate() {
            assert_eq!(op.code(), code);
            assert_eq!(Operation::from_code(code), Some(*op));
        }
        assert_eq!(Operation::from_code(Operation::COUNT), None);
        assert_eq!(Operation::Mul.symbol(), "*");
    }

    #[test]
    fn test_arity() {
        let binary: Vec<_> = Operation::ALL.iter().filter(|op| op.arity() == 2).collect();
        assert_eq!(binary.len(), 4);
        assert_eq!(Operation::Sin.arity(), 1);
        assert_eq!(Operation::Ln.arity(), 1);
    }

    #[test]
    fn test_arithmetic_guard() {
        assert_eq!(Operation::Add.eval(1.0, 2.0), Some(3.0));
        assert_eq!(Operation::Mul.eval(1e29, 2.0), Some(2e29));
        assert_eq!(Operation::Mul.eval(1e30, 2.0), None);
        assert_eq!(Operation::Sub.eval(1.0, -1e31), None);
    }

    #[test]
    fn test_mod_guard_and_sign() {
        assert_eq!(Operation::Mod.eval(5.0, 0.0), None);
        assert_eq!(Operation::Mod.eval(5.0, 3.0), Some(2.0));
        assert_eq!(Operation::Mod.eval(-5.0, 3.0), Some(1.0));
        assert_eq!(Operation::Mod.eval(5.0, -3.0), Some(-1.0));
        assert_eq!(Operation::Mod.eval(6.0, 3.0), Some(0.0));
    }

    #[test]
    fn test_exp_and_ln_guards() {
        assert_eq!(Operation::Exp.eval(0.0, 0.0), Some(1.0));
        assert_eq!(Operation::Exp.eval(50.5, 0.0), None);
        assert_eq!(Operation::Ln.eval(0.0, 0.0), None);
        assert_eq!(Operation::Ln.eval(-1.0, 0.0), Some(0.0));
    }

    #[test]
    fn test_apply_keeps_guarded_lanes() {
        let x = [1.0, 2.0, 3.0];
        let y = [2.0, 0.0, 2.0];
        let mut out = [-7.0; 3];
        Operation::Mod.apply(&x, &y, &mut out);
        assert_eq!(out, [1.0, -7.0, 1.0]);

        let mut out = [9.0; 2];
        Operation::Ln.apply(&[0.0, 1.0], &[0.0, 1.0], &mut out);
        assert_eq!(out, [9.0, 0.0]);
    }
}
