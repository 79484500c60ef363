/// Give a closed, fieldless enum its wire names.
///
/// Generates `ALL`, `as_str`, `Display`, `FromStr`, `From<T> for String` and
/// `TryFrom<String> for T`. Unknown names are an error. Put
/// `#[serde(into = "String", try_from = "String")]` on the enum to serialize
/// through these impls; the same names land in the Postgres `state`/`kind`
/// columns.
macro_rules! string_enum {
    ($name:ident { $($variant:ident => $str:literal),+ $(,)? }) => {
        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $str,)+
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($str => Ok($name::$variant),)+
                    other => Err(format!("unknown {}: {other:?}", stringify!($name))),
                }
            }
        }

        impl From<$name> for String {
            fn from(v: $name) -> Self {
                v.as_str().to_owned()
            }
        }

        impl TryFrom<String> for $name {
            type Error = String;

            fn try_from(s: String) -> Result<Self, Self::Error> {
                s.parse()
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::model::{BondState, ExchangeState, JournalEventKind, PlayerRole};

    #[test]
    fn names_parse_back_to_variants() {
        for state in ExchangeState::ALL {
            assert_eq!(state.as_str().parse::<ExchangeState>(), Ok(*state));
        }
        for state in BondState::ALL {
            assert_eq!(state.to_string().parse::<BondState>(), Ok(*state));
        }
        for kind in JournalEventKind::ALL {
            assert_eq!(JournalEventKind::try_from(String::from(*kind)), Ok(*kind));
        }
        assert_eq!(PlayerRole::ALL.len(), 3);
    }

    #[test]
    fn unknown_names_are_rejected() {
        assert_eq!(
            "pending".parse::<ExchangeState>(),
            Err("unknown ExchangeState: \"pending\"".to_string())
        );
    }
}
