//! Simple types: conversion between attribute strings and typed values.

use super::schema::AttrKind;

/// Why a raw attribute string could not be converted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Invalid {
    pub expected: &'static str,
}

/// A value type that can be stored in an XML attribute.
pub trait SimpleType: Sized {
    /// Human-readable description of accepted values, used in errors.
    const EXPECTED: &'static str;

    /// Parse from the attribute's string representation.
    fn from_xml(value: &str) -> Result<Self, Invalid>;

    /// Serialize to the attribute's string representation.
    fn to_xml(&self) -> String;

    /// Whether a declared attribute kind stores values of this type.
    fn accepts(kind: AttrKind) -> bool;
}

/// `xsd:int` and friends.
pub type XsdInt = i64;

impl SimpleType for i64 {
    const EXPECTED: &'static str = "an integer";

    fn from_xml(value: &str) -> Result<Self, Invalid> {
        value.trim().parse::<i64>().map_err(|_| Invalid {
            expected: Self::EXPECTED,
        })
    }

    fn to_xml(&self) -> String {
        self.to_string()
    }

    fn accepts(kind: AttrKind) -> bool {
        kind == AttrKind::Int
    }
}

/// `xsd:string`.
pub type XsdString = String;

impl SimpleType for String {
    const EXPECTED: &'static str = "a string";

    fn from_xml(value: &str) -> Result<Self, Invalid> {
        Ok(value.to_string())
    }

    fn to_xml(&self) -> String {
        self.clone()
    }

    fn accepts(kind: AttrKind) -> bool {
        matches!(kind, AttrKind::String | AttrKind::Token(_))
    }
}

/// `ST_OnOff`: `true`/`false`, `1`/`0`, `on`/`off`.
impl SimpleType for bool {
    const EXPECTED: &'static str = "one of true, false, 1, 0, on, off";

    fn from_xml(value: &str) -> Result<Self, Invalid> {
        match value {
            "true" | "1" | "on" => Ok(true),
            "false" | "0" | "off" => Ok(false),
            _ => Err(Invalid {
                expected: Self::EXPECTED,
            }),
        }
    }

    fn to_xml(&self) -> String {
        String::from(if *self { "1" } else { "0" })
    }

    fn accepts(kind: AttrKind) -> bool {
        kind == AttrKind::Bool
    }
}

/// Macro for defining enumerated token simple types.
///
/// Generates the enum, its token table (for use in [`AttrKind::Token`]) and
/// a [`SimpleType`] implementation.
///
/// # Example
///
/// ```ignore
/// enum_token! {
///     /// Vertical alignment of a run.
///     pub enum VerticalAlign {
///         Baseline => "baseline",
///         Superscript => "superscript",
///         Subscript => "subscript",
///     }
/// }
/// ```
macro_rules! enum_token {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident => $token:literal
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant,
            )*
        }

        impl $name {
            /// Every token this type accepts, in declaration order.
            pub const TOKENS: &'static [&'static str] = &[$($token),*];

            /// Returns the XML token for this value.
            #[inline]
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $token,)*
                }
            }
        }

        impl $crate::oxml::simpletypes::SimpleType for $name {
            const EXPECTED: &'static str = concat!("one of:", $(" ", $token),*);

            fn from_xml(value: &str) -> Result<Self, $crate::oxml::simpletypes::Invalid> {
                match value {
                    $($token => Ok($name::$variant),)*
                    _ => Err($crate::oxml::simpletypes::Invalid {
                        expected: Self::EXPECTED,
                    }),
                }
            }

            fn to_xml(&self) -> String {
                self.as_str().to_string()
            }

            fn accepts(kind: $crate::oxml::schema::AttrKind) -> bool {
                kind == $crate::oxml::schema::AttrKind::Token($name::TOKENS)
            }
        }
    };
}

enum_token! {
    /// `ST_FtnEdn`: the role of a footnote or endnote.
    pub enum NoteType {
        Normal => "normal",
        Separator => "separator",
        ContinuationSeparator => "continuationSeparator",
        ContinuationNotice => "continuationNotice",
    }
}

enum_token! {
    /// `ST_VerticalAlignRun`: baseline shift of a run, used for note marks.
    pub enum VerticalAlignRun {
        Baseline => "baseline",
        Superscript => "superscript",
        Subscript => "subscript",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_parse() {
        assert_eq!(i64::from_xml("42"), Ok(42));
        assert_eq!(i64::from_xml("-1"), Ok(-1));
        assert_eq!(i64::from_xml(" 7 "), Ok(7));
        assert_eq!(
            i64::from_xml("seven"),
            Err(Invalid {
                expected: "an integer"
            })
        );
    }

    #[test]
    fn test_on_off() {
        assert_eq!(bool::from_xml("on"), Ok(true));
        assert_eq!(bool::from_xml("0"), Ok(false));
        assert!(bool::from_xml("yes").is_err());
        assert_eq!(true.to_xml(), "1");
    }

    #[test]
    fn test_token_round_trip() {
        assert_eq!(
            NoteType::from_xml("continuationSeparator"),
            Ok(NoteType::ContinuationSeparator)
        );
        assert_eq!(NoteType::Separator.to_xml(), "separator");
        assert_eq!(NoteType::TOKENS.len(), 4);
    }

    #[test]
    fn test_token_rejects_unknown() {
        let err = NoteType::from_xml("bogus").unwrap_err();
        assert_eq!(
            err.expected,
            "one of: normal separator continuationSeparator continuationNotice"
        );
    }

    #[test]
    fn test_accepts_kind() {
        assert!(i64::accepts(AttrKind::Int));
        assert!(!i64::accepts(AttrKind::String));
        assert!(NoteType::accepts(AttrKind::Token(NoteType::TOKENS)));
        assert!(!NoteType::accepts(AttrKind::Token(VerticalAlignRun::TOKENS)));
        assert!(String::accepts(AttrKind::Token(NoteType::TOKENS)));
    }
}
