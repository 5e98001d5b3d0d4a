//! Closed sets of protocol tokens.
//!
//! Each generated enum renders to the exact string gpg expects and can only
//! be built from a token in its set, so an invalid code is caught before it
//! reaches the subprocess.

macro_rules! protocol_tokens {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $code:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Exact protocol token.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $( $name::$variant => $code ),+
                }
            }

            /// Look up a variant by its protocol token (case-insensitive).
            pub fn from_code(code: &str) -> Option<Self> {
                let code = code.trim();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|token| token.as_str().eq_ignore_ascii_case(code))
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::Error;

            fn from_str(s: &str) -> $crate::Result<Self> {
                Self::from_code(s).ok_or_else(|| {
                    $crate::Error::InvalidToken(format!(
                        "'{}' is not a valid {}",
                        s,
                        stringify!($name)
                    ))
                })
            }
        }
    };
}

pub(crate) use protocol_tokens;
