//! The Type Registry: the finite universe of Hexen types and the coercion
//! lattice between them.
//!
//! Hexen types fall into two disjoint universes. *Concrete* types have a
//! committed machine representation (`i32`, `f64`, `[3]bool`, ...). *Comptime*
//! types are adaptable placeholders produced by literals; they carry no
//! representation of their own and commit to a concrete type at their use
//! site. `commit` is the single place a range check against a destination's
//! representable range occurs — nothing else in the crate re-derives it.

use std::fmt;

/// A Hexen type, concrete or comptime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    I32,
    I64,
    F32,
    F64,
    Bool,
    String,
    Void,
    /// A fixed-size array `[N]T`.
    Array(Box<Type>, u64),
    /// An inferred-size array `[_]T`; the size is supplied by context.
    InferredArray(Box<Type>),
    /// A parameterized function type `(T1, ..., Tn) -> R`.
    Function(Vec<Type>, Box<Type>),
    ComptimeInt,
    ComptimeFloat,
    ComptimeArrayInt,
    ComptimeArrayFloat,
    /// Best-effort placeholder assigned after an error. Coercible from/to
    /// anything and never itself a source of further diagnostics.
    Unknown,
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::I32 => write!(f, "i32"),
            Type::I64 => write!(f, "i64"),
            Type::F32 => write!(f, "f32"),
            Type::F64 => write!(f, "f64"),
            Type::Bool => write!(f, "bool"),
            Type::String => write!(f, "string"),
            Type::Void => write!(f, "void"),
            Type::Array(elem, n) => write!(f, "[{}]{}", n, elem),
            Type::InferredArray(elem) => write!(f, "[_]{}", elem),
            Type::Function(params, ret) => {
                write!(f, "(")?;
                for (i, p) in params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", p)?;
                }
                write!(f, ") -> {}", ret)
            }
            Type::ComptimeInt => write!(f, "comptime_int"),
            Type::ComptimeFloat => write!(f, "comptime_float"),
            Type::ComptimeArrayInt => write!(f, "comptime_array_int"),
            Type::ComptimeArrayFloat => write!(f, "comptime_array_float"),
            Type::Unknown => write!(f, "unknown"),
        }
    }
}

impl Type {
    /// True for the four adaptable placeholder types.
    pub fn is_comptime(&self) -> bool {
        matches!(
            self,
            Type::ComptimeInt | Type::ComptimeFloat | Type::ComptimeArrayInt | Type::ComptimeArrayFloat
        )
    }

    pub fn is_numeric(&self) -> bool {
        self.is_integer() || self.is_float()
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, Type::I32 | Type::I64 | Type::ComptimeInt)
    }

    pub fn is_float(&self) -> bool {
        matches!(self, Type::F32 | Type::F64 | Type::ComptimeFloat)
    }

    pub fn is_array(&self) -> bool {
        matches!(
            self,
            Type::Array(..) | Type::InferredArray(..) | Type::ComptimeArrayInt | Type::ComptimeArrayFloat
        )
    }

    /// Element type of an array type, if any.
    pub fn element_type(&self) -> Option<Type> {
        match self {
            Type::Array(elem, _) | Type::InferredArray(elem) => Some((**elem).clone()),
            Type::ComptimeArrayInt => Some(Type::ComptimeInt),
            Type::ComptimeArrayFloat => Some(Type::ComptimeFloat),
            _ => None,
        }
    }

    /// `Unknown` swallows diagnostics in both directions; it is the analyzer's
    /// best-effort fallback and must never itself trigger a mismatch.
    fn involves_unknown(src: &Type, dst: &Type) -> bool {
        matches!(src, Type::Unknown) || matches!(dst, Type::Unknown)
    }

    /// Is a value of type `src` implicitly (safely) usable where `dst` is expected?
    ///
    /// This is the safe half of the coercion lattice (§3): integer widening,
    /// integer-to-float promotion, float widening, and comptime adaptation.
    /// Anything not covered here is a *dangerous* coercion that requires an
    /// explicit `: T` acknowledgment (see `decl::check_precision_loss`).
    pub fn can_coerce(src: &Type, dst: &Type) -> bool {
        if src == dst {
            return true;
        }
        if Self::involves_unknown(src, dst) {
            return true;
        }
        match (src, dst) {
            (Type::I32, Type::I64 | Type::F32 | Type::F64) => true,
            (Type::I64, Type::F32 | Type::F64) => true,
            (Type::F32, Type::F64) => true,
            (Type::ComptimeInt, dst) if dst.is_numeric() => true,
            (Type::ComptimeFloat, Type::F32 | Type::F64) => true,
            (Type::ComptimeArrayInt, Type::Array(elem, _) | Type::InferredArray(elem)) => {
                Self::can_coerce(&Type::ComptimeInt, elem)
            }
            (Type::ComptimeArrayFloat, Type::Array(elem, _) | Type::InferredArray(elem)) => {
                Self::can_coerce(&Type::ComptimeFloat, elem)
            }
            _ => false,
        }
    }

    /// Promote two comptime numeric types to their unification: int+int stays
    /// int, anything with a float widens to comptime_float. Returns `None` if
    /// either side isn't a comptime numeric.
    pub fn unify_comptime(a: &Type, b: &Type) -> Option<Type> {
        match (a, b) {
            (Type::ComptimeInt, Type::ComptimeInt) => Some(Type::ComptimeInt),
            (Type::ComptimeInt, Type::ComptimeFloat) | (Type::ComptimeFloat, Type::ComptimeInt) => {
                Some(Type::ComptimeFloat)
            }
            (Type::ComptimeFloat, Type::ComptimeFloat) => Some(Type::ComptimeFloat),
            _ => None,
        }
    }
}

/// A comptime value tracked alongside a comptime type so that `commit` can
/// range-check it. Only literal expressions and arithmetic closed entirely
/// over comptime operands carry one; anything else is `None` and skips the
/// range check (it isn't a literal being committed).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ComptimeValue {
    Int(i128),
    Float(f64),
}

/// Inclusive representable range for a concrete numeric type, used by `commit`.
fn int_range(ty: &Type) -> Option<(i128, i128)> {
    match ty {
        Type::I32 => Some((i32::MIN as i128, i32::MAX as i128)),
        Type::I64 => Some((i64::MIN as i128, i64::MAX as i128)),
        _ => None,
    }
}

/// Error produced by [`commit`] when a literal doesn't fit its destination.
#[derive(Debug, Clone, PartialEq)]
pub struct LiteralOverflow {
    pub value: String,
    pub destination: Type,
}

/// Commit a comptime type to a concrete type, range-checking the carried
/// value if one is known. This is the only place in the crate a literal's
/// representable-range check happens.
pub fn commit(
    comptime: &Type,
    concrete: &Type,
    value: Option<ComptimeValue>,
) -> Result<Type, LiteralOverflow> {
    if let (Some(ComptimeValue::Int(n)), Some((lo, hi))) = (value, int_range(concrete)) {
        if n < lo || n > hi {
            return Err(LiteralOverflow {
                value: n.to_string(),
                destination: concrete.clone(),
            });
        }
    }
    if let (Some(ComptimeValue::Float(x)), Type::F32) = (value, concrete) {
        if x.is_finite() && x.abs() > f32::MAX as f64 {
            return Err(LiteralOverflow {
                value: x.to_string(),
                destination: concrete.clone(),
            });
        }
    }
    let _ = comptime;
    Ok(concrete.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn safe_widening_coerces() {
        assert!(Type::can_coerce(&Type::I32, &Type::I64));
        assert!(Type::can_coerce(&Type::I32, &Type::F64));
        assert!(Type::can_coerce(&Type::F32, &Type::F64));
    }

    #[test]
    fn narrowing_does_not_coerce() {
        assert!(!Type::can_coerce(&Type::I64, &Type::I32));
        assert!(!Type::can_coerce(&Type::F64, &Type::F32));
        assert!(!Type::can_coerce(&Type::F64, &Type::I32));
    }

    #[test]
    fn comptime_int_adapts_to_any_numeric() {
        assert!(Type::can_coerce(&Type::ComptimeInt, &Type::I32));
        assert!(Type::can_coerce(&Type::ComptimeInt, &Type::F64));
    }

    #[test]
    fn comptime_float_adapts_only_to_float() {
        assert!(Type::can_coerce(&Type::ComptimeFloat, &Type::F64));
        assert!(!Type::can_coerce(&Type::ComptimeFloat, &Type::I64));
    }

    #[test]
    fn unify_comptime_widens_to_float() {
        assert_eq!(
            Type::unify_comptime(&Type::ComptimeInt, &Type::ComptimeFloat),
            Some(Type::ComptimeFloat)
        );
        assert_eq!(
            Type::unify_comptime(&Type::ComptimeInt, &Type::ComptimeInt),
            Some(Type::ComptimeInt)
        );
    }

    #[test]
    fn commit_range_checks_overflowing_literal() {
        let err = commit(&Type::ComptimeInt, &Type::I32, Some(ComptimeValue::Int(9_000_000_000)))
            .unwrap_err();
        assert_eq!(err.destination, Type::I32);
    }

    #[test]
    fn commit_accepts_in_range_literal() {
        let ty = commit(&Type::ComptimeInt, &Type::I32, Some(ComptimeValue::Int(42))).unwrap();
        assert_eq!(ty, Type::I32);
    }

    #[test]
    fn unknown_coerces_both_ways() {
        assert!(Type::can_coerce(&Type::Unknown, &Type::I32));
        assert!(Type::can_coerce(&Type::I32, &Type::Unknown));
    }
}
