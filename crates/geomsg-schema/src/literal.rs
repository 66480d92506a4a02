//! Closed string-literal enumerations.
//!
//! Literal fields are plain Rust enums so matches stay exhaustive; the wire
//! strings live next to the variants and drive `serde`, `FromStr` and schema
//! validation alike.

/// An enum whose variants map one-to-one onto fixed wire strings.
pub trait Literal: Copy + Sized + 'static {
    /// Every variant, in declaration order.
    const ALL: &'static [Self];
    /// Every wire string, in declaration order.
    const VALUES: &'static [&'static str];

    /// Wire string for this variant.
    fn as_str(self) -> &'static str;

    /// Variant whose wire string is exactly `value`.
    fn from_literal(value: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|variant| variant.as_str() == value)
    }
}

/// Declare a closed literal enum.
///
/// Generates the enum with `serde` renames, a [`Literal`] impl, `Display` and
/// `FromStr` (failing with [`crate::error::LiteralError`]).
///
/// # Usage
/// ```ignore
/// closed_literal! {
///     pub enum DetectType {
///         GeoBrandPresence => "detect:geo-brand-presence",
///         GeoBrandPresenceDaily => "detect:geo-brand-presence-daily",
///     }
/// }
/// ```
macro_rules! closed_literal {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident => $value:literal
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                #[serde(rename = $value)]
                $variant,
            )+
        }

        impl $crate::literal::Literal for $name {
            const ALL: &'static [Self] = &[$(Self::$variant),+];
            const VALUES: &'static [&'static str] = &[$($value),+];

            fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $value,)+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str($crate::literal::Literal::as_str(*self))
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::error::LiteralError;

            fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
                <Self as $crate::literal::Literal>::from_literal(value).ok_or_else(|| {
                    $crate::error::LiteralError {
                        name: stringify!($name),
                        value: value.to_string(),
                        allowed: <Self as $crate::literal::Literal>::VALUES,
                    }
                })
            }
        }
    };
}
