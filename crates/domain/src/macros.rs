//! Display/FromStr boilerplate for status enums
//!
//! ```rust
//! use gifscout_domain::impl_domain_status_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum UploadStatus {
//!     Waiting,
//!     Sent,
//! }
//!
//! impl_domain_status_conversions!(UploadStatus {
//!     Waiting => "waiting",
//!     Sent => "sent",
//! });
//!
//! assert_eq!("SENT".parse::<UploadStatus>().unwrap(), UploadStatus::Sent);
//! ```

/// Implements `Display` (canonical lowercase name) and case-insensitive
/// `FromStr` for a fieldless enum.
#[macro_export]
macro_rules! impl_domain_status_conversions {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl $enum_name {
            /// Canonical string form.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $str,)+
                }
            }
        }

        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
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
