//! Closed string enumerations (statuses, priorities, levels).
//!
//! Every enumeration is declared with [`closed_enum!`], which gives it a
//! `FromStr` returning `DomainError::Validation` for unknown values. The same
//! parse function backs the strict path (reject the request) and the lenient
//! path ([`normalize`], keep a fallback).

use core::str::FromStr;

use crate::error::DomainError;

/// Declare a closed enumeration whose wire form is a fixed string per variant.
///
/// Parsing trims the candidate and ignores ASCII case.
#[macro_export]
macro_rules! closed_enum {
    (
        $label:literal;
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $text:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, ::serde::Serialize, ::serde::Deserialize)]
        $vis enum $name {
            $( $(#[$vmeta])* #[serde(rename = $text)] $variant ),+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = $crate::DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let candidate = s.trim();
                $(
                    if candidate.eq_ignore_ascii_case($text) {
                        return Ok($name::$variant);
                    }
                )+
                let expected: Vec<&str> = vec![$($text),+];
                Err($crate::DomainError::validation(format!(
                    "unknown {} `{}` (expected one of: {})",
                    $label,
                    candidate,
                    expected.join(", ")
                )))
            }
        }
    };
}

/// Parse `candidate`, keeping `fallback` when it is absent or rejected.
///
/// Rejections are logged, not returned: callers that need strict validation
/// parse with `FromStr` themselves.
pub fn normalize<T>(candidate: Option<&str>, fallback: T) -> T
where
    T: FromStr<Err = DomainError>,
{
    let Some(raw) = candidate else {
        return fallback;
    };

    match raw.parse() {
        Ok(value) => value,
        Err(err) => {
            tracing::warn!(value = raw, error = %err, "rejected enumeration value, keeping fallback");
            fallback
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    closed_enum! {
        "colour";
        enum Colour {
            Red => "red",
            DeepBlue => "deep_blue",
        }
    }

    #[test]
    fn parses_known_values_ignoring_case_and_padding() {
        assert_eq!(" RED ".parse::<Colour>().unwrap(), Colour::Red);
        assert_eq!("deep_blue".parse::<Colour>().unwrap(), Colour::DeepBlue);
    }

    #[test]
    fn rejection_names_the_value_and_the_choices() {
        let err = "green".parse::<Colour>().unwrap_err();
        match err {
            DomainError::Validation(msg) => {
                assert!(msg.contains("green"));
                assert!(msg.contains("red, deep_blue"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn normalize_keeps_fallback_for_missing_or_invalid_values() {
        assert_eq!(normalize(None, Colour::Red), Colour::Red);
        assert_eq!(normalize(Some("purple"), Colour::Red), Colour::Red);
        assert_eq!(normalize(Some("deep_blue"), Colour::Red), Colour::DeepBlue);
    }

    #[test]
    fn serde_uses_wire_names() {
        assert_eq!(serde_json::to_string(&Colour::DeepBlue).unwrap(), "\"deep_blue\"");
        assert_eq!(Colour::ALL.len(), 2);
    }
}
