//! Name + positional-argument parsing into typed calls.

use gridmatch_types::{AccountId, GridmatchError, Result, amount};
use rust_decimal::Decimal;

/// How many arguments a function accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Arity {
    /// At least `n`; extras are ignored.
    AtLeast(usize),
    /// Exactly `n`.
    Exactly(usize),
}

fn check_arity<A: AsRef<str>>(operation: &str, args: &[A], arity: Arity) -> Result<()> {
    let ok = match arity {
        Arity::AtLeast(n) => args.len() >= n,
        Arity::Exactly(n) => args.len() == n,
    };
    if ok {
        return Ok(());
    }
    let expected = match arity {
        Arity::AtLeast(n) | Arity::Exactly(n) => n,
    };
    tracing::warn!(operation, expected, got = args.len(), "Rejected: wrong argument count");
    Err(GridmatchError::WrongArgumentCount {
        operation: operation.to_string(),
        expected,
        got: args.len(),
    })
}

fn parse_i64(name: &str, text: &str) -> Result<i64> {
    text.trim()
        .parse()
        .map_err(|_| GridmatchError::InvalidArgument {
            name: name.to_string(),
            value: text.to_string(),
        })
}

fn account<A: AsRef<str>>(args: &[A]) -> AccountId {
    AccountId::from(args[0].as_ref())
}

/// Parse the `init` arguments: a single fee rate.
pub fn parse_init<A: AsRef<str>>(args: &[A]) -> Result<Decimal> {
    check_arity("init", args, Arity::AtLeast(1))?;
    amount::parse("fee_rate", args[0].as_ref())
}

/// A state-changing call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Enroll {
        id: AccountId,
        name: String,
        rate_per_kwh: i64,
    },
    Delete {
        id: AccountId,
    },
    /// Deposit (positive) or withdraw (negative) currency.
    ChangeAccountBalance {
        id: AccountId,
        amount: Decimal,
    },
    /// Add a signed kWh reading to the meter.
    ReportDelta {
        id: AccountId,
        delta_kwh: i64,
    },
    Settle,
}

impl Operation {
    /// Parse a function name and its positional arguments.
    ///
    /// # Errors
    /// - `UnknownOperation` for an unrecognized name
    /// - `WrongArgumentCount` if too few arguments are given
    /// - `InvalidArgument` if a numeric argument does not parse
    pub fn parse<A: AsRef<str>>(function: &str, args: &[A]) -> Result<Self> {
        let op = match function {
            "enroll" => {
                check_arity(function, args, Arity::AtLeast(3))?;
                Self::Enroll {
                    id: account(args),
                    name: args[1].as_ref().to_string(),
                    rate_per_kwh: parse_i64("rate_per_kwh", args[2].as_ref())?,
                }
            }
            "delete" => {
                check_arity(function, args, Arity::Exactly(1))?;
                Self::Delete { id: account(args) }
            }
            "changeAccountBalance" => {
                check_arity(function, args, Arity::AtLeast(2))?;
                Self::ChangeAccountBalance {
                    id: account(args),
                    amount: amount::parse("amount", args[1].as_ref())?,
                }
            }
            "reportDelta" => {
                check_arity(function, args, Arity::AtLeast(2))?;
                Self::ReportDelta {
                    id: account(args),
                    delta_kwh: parse_i64("delta_kwh", args[1].as_ref())?,
                }
            }
            "settle" => {
                check_arity(function, args, Arity::Exactly(0))?;
                Self::Settle
            }
            other => {
                tracing::warn!(function = other, "Rejected: unknown invoke function");
                return Err(GridmatchError::UnknownOperation(other.to_string()));
            }
        };
        Ok(op)
    }

    /// The external function name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Enroll { .. } => "enroll",
            Self::Delete { .. } => "delete",
            Self::ChangeAccountBalance { .. } => "changeAccountBalance",
            Self::ReportDelta { .. } => "reportDelta",
            Self::Settle => "settle",
        }
    }
}

/// A read-only call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    Balance { id: AccountId },
    ReportedKwh { id: AccountId },
    MeterInfo { id: AccountId },
    Meters,
    ExchangeRate,
    ExchangeAccountBalance,
}

impl Query {
    /// Parse a query name and its positional arguments.
    ///
    /// Single-account queries ignore extra arguments; the nullary ones
    /// reject any.
    pub fn parse<A: AsRef<str>>(function: &str, args: &[A]) -> Result<Self> {
        let query = match function {
            "balance" | "reportedKwh" | "meterInfo" => {
                check_arity(function, args, Arity::AtLeast(1))?;
                let id = account(args);
                match function {
                    "balance" => Self::Balance { id },
                    "reportedKwh" => Self::ReportedKwh { id },
                    _ => Self::MeterInfo { id },
                }
            }
            "meters" | "exchangeRate" | "exchangeAccountBalance" => {
                check_arity(function, args, Arity::Exactly(0))?;
                match function {
                    "meters" => Self::Meters,
                    "exchangeRate" => Self::ExchangeRate,
                    _ => Self::ExchangeAccountBalance,
                }
            }
            other => {
                tracing::warn!(function = other, "Rejected: unknown query function");
                return Err(GridmatchError::UnknownOperation(other.to_string()));
            }
        };
        Ok(query)
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Balance { .. } => "balance",
            Self::ReportedKwh { .. } => "reportedKwh",
            Self::MeterInfo { .. } => "meterInfo",
            Self::Meters => "meters",
            Self::ExchangeRate => "exchangeRate",
            Self::ExchangeAccountBalance => "exchangeAccountBalance",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NONE: [&str; 0] = [];

    #[test]
    fn parses_enroll() {
        let op = Operation::parse("enroll", &["m-1", "Roof A", "4"]).unwrap();
        assert_eq!(
            op,
            Operation::Enroll {
                id: AccountId::from("m-1"),
                name: "Roof A".to_string(),
                rate_per_kwh: 4,
            }
        );
        assert_eq!(op.name(), "enroll");
    }

    #[test]
    fn too_few_arguments() {
        let err = Operation::parse("enroll", &["m-1", "Roof A"]).unwrap_err();
        assert!(matches!(
            err,
            GridmatchError::WrongArgumentCount {
                expected: 3,
                got: 2,
                ..
            }
        ));
        assert!(Operation::parse("reportDelta", &["m-1"]).is_err());
        assert!(Query::parse("balance", &NONE).is_err());
        assert!(parse_init(&NONE).is_err());
    }

    #[test]
    fn extra_arguments_policy() {
        assert!(Operation::parse("reportDelta", &["m-1", "5", "ignored"]).is_ok());
        assert!(Query::parse("meterInfo", &["m-1", "ignored"]).is_ok());

        assert!(Operation::parse("delete", &["m-1", "m-2"]).is_err());
        assert!(Operation::parse("settle", &["now"]).is_err());
        let err = Query::parse("meters", &["x"]).unwrap_err();
        assert!(matches!(
            err,
            GridmatchError::WrongArgumentCount {
                expected: 0,
                got: 1,
                ..
            }
        ));
    }

    #[test]
    fn numeric_arguments_must_parse() {
        let err = Operation::parse("reportDelta", &["m-1", "1.5"]).unwrap_err();
        assert!(matches!(err, GridmatchError::InvalidArgument { ref name, .. } if name == "delta_kwh"));

        let err = Operation::parse("enroll", &["m-1", "Roof", "cheap"]).unwrap_err();
        assert!(err.is_validation());

        let op = Operation::parse("changeAccountBalance", &["m-1", "-12.5"]).unwrap();
        assert_eq!(
            op,
            Operation::ChangeAccountBalance {
                id: AccountId::from("m-1"),
                amount: Decimal::new(-125, 1),
            }
        );
        assert_eq!(parse_init(&["0.1"]).unwrap(), Decimal::new(1, 1));
        assert!(parse_init(&["ten percent"]).is_err());
    }

    #[test]
    fn unknown_names() {
        assert!(matches!(
            Operation::parse("mint", &NONE),
            Err(GridmatchError::UnknownOperation(_))
        ));
        // Query names are not invoke names and vice versa.
        assert!(Operation::parse("balance", &["m-1"]).is_err());
        assert!(Query::parse("settle", &NONE).is_err());
    }

    #[test]
    fn query_names_roundtrip() {
        for name in [
            "meters",
            "exchangeRate",
            "exchangeAccountBalance",
        ] {
            assert_eq!(Query::parse(name, &NONE).unwrap().name(), name);
        }
        for name in ["balance", "reportedKwh", "meterInfo"] {
            assert_eq!(Query::parse(name, &["m"]).unwrap().name(), name);
        }
    }
}
