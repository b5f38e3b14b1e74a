use polars::prelude::AnyValue;
use std::borrow::Cow;

/// A raw scalar as read from the input frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell<'a> {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Text(Cow<'a, str>),
}

impl Cell<'_> {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Canonical UTF-8 form used for digests.
    ///
    /// Text is taken verbatim, integers in decimal, floats in the shortest form that
    /// round-trips (`{:?}`), booleans as `true`/`false`. Null has no canonical form.
    pub fn canonical(&self) -> Option<Cow<'_, str>> {
        match self {
            Self::Null => None,
            Self::Bool(b) => Some(Cow::Borrowed(if *b { "true" } else { "false" })),
            Self::Int(i) => Some(Cow::Owned(i.to_string())),
            Self::UInt(u) => Some(Cow::Owned(u.to_string())),
            Self::Float(f) => Some(Cow::Owned(format!("{f:?}"))),
            Self::Text(s) => Some(Cow::Borrowed(s.as_ref())),
        }
    }
}

impl<'a> From<AnyValue<'a>> for Cell<'a> {
    fn from(value: AnyValue<'a>) -> Self {
        match value {
            AnyValue::Null => Self::Null,
            AnyValue::Boolean(b) => Self::Bool(b),
            AnyValue::Int8(v) => Self::Int(v.into()),
            AnyValue::Int16(v) => Self::Int(v.into()),
            AnyValue::Int32(v) => Self::Int(v.into()),
            AnyValue::Int64(v) => Self::Int(v),
            AnyValue::UInt8(v) => Self::UInt(v.into()),
            AnyValue::UInt16(v) => Self::UInt(v.into()),
            AnyValue::UInt32(v) => Self::UInt(v.into()),
            AnyValue::UInt64(v) => Self::UInt(v),
            AnyValue::Float32(v) => Self::Float(v.into()),
            AnyValue::Float64(v) => Self::Float(v),
            AnyValue::String(s) => Self::Text(Cow::Borrowed(s)),
            AnyValue::StringOwned(s) => Self::Text(Cow::Owned(s.to_string())),
            other => Self::Text(Cow::Owned(other.to_string())),
        }
    }
}

impl<'a> From<Option<&'a str>> for Cell<'a> {
    fn from(value: Option<&'a str>) -> Self {
        value.map_or(Self::Null, |s| Self::Text(Cow::Borrowed(s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_from_any_value() {
        assert_eq!(Cell::from(AnyValue::Null), Cell::Null);
        assert_eq!(Cell::from(AnyValue::Int32(-4)), Cell::Int(-4));
        assert_eq!(Cell::from(AnyValue::UInt32(4)), Cell::UInt(4));
        assert_eq!(Cell::from(AnyValue::Float64(2.5)), Cell::Float(2.5));
        assert_eq!(
            Cell::from(AnyValue::String("East US")),
            Cell::Text(Cow::Borrowed("East US"))
        );
    }

    #[test]
    fn test_canonical_forms() {
        assert_eq!(Cell::Null.canonical(), None);
        assert_eq!(Cell::Bool(true).canonical().as_deref(), Some("true"));
        assert_eq!(Cell::Int(42).canonical().as_deref(), Some("42"));
        assert_eq!(Cell::Float(1.0).canonical().as_deref(), Some("1.0"));
        assert_eq!(Cell::from(Some("USD")).canonical().as_deref(), Some("USD"));
    }
}
