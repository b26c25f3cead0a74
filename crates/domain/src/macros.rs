//! String conversions for configuration option enums.
//!
//! Recurrences and draw policies are read from config files and
//! `LAUNDER_*` variables as lowercase keywords.

/// Implements `Display` and `FromStr` for a fieldless option enum.
///
/// Parsing trims and ignores case. An unknown keyword fails with a message
/// listing the accepted ones, which the config loader passes through.
///
/// ```rust
/// use launder_domain::impl_option_conversions;
///
/// #[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// pub enum Cadence {
///     Hourly,
///     Daily,
/// }
///
/// impl_option_conversions!(Cadence {
///     Hourly => "hourly",
///     Daily => "daily",
/// });
///
/// assert_eq!("Daily".parse::<Cadence>(), Ok(Cadence::Daily));
/// ```
#[macro_export]
macro_rules! impl_option_conversions {
    ($option:ident { $($variant:ident => $keyword:literal),+ $(,)? }) => {
        impl std::fmt::Display for $option {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(match self {
                    $(Self::$variant => $keyword,)+
                })
            }
        }

        impl std::str::FromStr for $option {
            type Err = String;

            fn from_str(raw: &str) -> Result<Self, Self::Err> {
                match raw.trim().to_ascii_lowercase().as_str() {
                    $($keyword => Ok(Self::$variant),)+
                    _ => Err(format!(
                        "unknown {} '{}', expected one of: {}",
                        stringify!($option),
                        raw.trim(),
                        [$($keyword),+].join(", "),
                    )),
                }
            }
        }
    };
}
