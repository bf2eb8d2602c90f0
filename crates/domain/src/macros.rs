//! Macro for implementing Display and FromStr for status enums
//!
//! ```rust
//! use timesheet_domain::impl_domain_status_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum Backend {
//!     Rest,
//!     GitHub,
//! }
//!
//! impl_domain_status_conversions!(Backend {
//!     Rest => "rest",
//!     GitHub => "github",
//! });
//!
//! assert_eq!(Backend::GitHub.to_string(), "github");
//! assert_eq!("REST".parse::<Backend>().unwrap(), Backend::Rest);
//! ```

/// Implements Display and FromStr traits for status enums
///
/// Display writes the lowercase label; FromStr accepts it case-insensitively.
#[macro_export]
macro_rules! impl_domain_status_conversions {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(Self::$variant => write!(f, $str),)+
                }
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.to_lowercase().as_str() {
                    $($str => Ok(Self::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($enum_name), s)),
                }
            }
        }
    };
}
