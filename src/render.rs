use crate::error::{LedgerSynthError, Result};
use crate::schema::{AmountSpec, PostingSpec};
use crate::utils::{format_currency, format_ledger_date};
use chrono::NaiveDate;
use log::warn;
use rand::seq::SliceRandom;
use rand::Rng;
use rand_distr::{Distribution, Triangular};

pub const DEFAULT_CURRENCY: &str = "$";

const POSTING_INDENT: &str = "    ";
const POSTING_SEPARATOR: &str = "    ";

#[derive(Debug, Clone, PartialEq)]
pub enum Amount {
    Fixed(f64),
    /// Drawn fresh on every render.
    Triangular { low: f64, high: f64, mode: f64 },
}

impl Amount {
    /// Builds an amount from its input form. `account` is only used for error context.
    pub fn from_spec(account: &str, spec: AmountSpec) -> Result<Self> {
        match spec {
            AmountSpec::Fixed(value) => {
                if !value.is_finite() {
                    return Err(LedgerSynthError::InvalidAmount(format!(
                        "Posting '{}' has a non-finite amount",
                        account
                    )));
                }
                Ok(Amount::Fixed(value))
            }
            AmountSpec::Range(bounds) => {
                let (low, high, mode) = match bounds.as_slice() {
                    [low, high] => (*low, *high, (*low + *high) / 2.0),
                    [low, high, mode] => (*low, *high, *mode),
                    other => {
                        return Err(LedgerSynthError::InvalidAmount(format!(
                            "Posting '{}' range must have 2 or 3 elements, got {}",
                            account,
                            other.len()
                        )))
                    }
                };

                if !(low.is_finite() && high.is_finite() && mode.is_finite()) {
                    return Err(LedgerSynthError::InvalidAmount(format!(
                        "Posting '{}' has a non-finite range bound",
                        account
                    )));
                }

                if low > high || mode < low || mode > high {
                    return Err(LedgerSynthError::InvalidRange {
                        account: account.to_string(),
                        low,
                        high,
                    });
                }

                if low == high {
                    return Ok(Amount::Fixed(low));
                }

                Ok(Amount::Triangular { low, high, mode })
            }
        }
    }

    pub fn resolve<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match *self {
            Amount::Fixed(value) => value,
            Amount::Triangular { low, high, mode } => match Triangular::new(low, high, mode) {
                Ok(dist) => dist.sample(rng),
                Err(e) => {
                    warn!(
                        "Invalid triangular amount [{}, {}] mode {}: {}; using the mode",
                        low, high, mode, e
                    );
                    mode
                }
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PostingTemplate {
    pub account: String,
    /// `None` prints the account alone so the ledger tool balances against it.
    pub amount: Option<Amount>,
}

impl PostingTemplate {
    pub fn new(account: impl Into<String>, amount: Option<Amount>) -> Self {
        Self {
            account: account.into(),
            amount,
        }
    }

    pub fn from_spec(spec: PostingSpec) -> Result<Self> {
        match spec {
            PostingSpec::Balancing((account,)) | PostingSpec::WithAmount((account, None)) => {
                Ok(Self::new(account, None))
            }
            PostingSpec::WithAmount((account, Some(amount))) => {
                let amount = Amount::from_spec(&account, amount)?;
                Ok(Self::new(account, Some(amount)))
            }
        }
    }

    pub fn render<R: Rng + ?Sized>(&self, currency: &str, rng: &mut R) -> String {
        let amount = match &self.amount {
            Some(amount) => format_currency(currency, amount.resolve(rng)),
            None => String::new(),
        };
        format!(
            "{}{}{}{}",
            POSTING_INDENT, self.account, POSTING_SEPARATOR, amount
        )
    }
}

/// Renders one ledger transaction: a `DATE * PAYEE` header followed by one
/// indented line per posting, joined with newlines (no trailing newline).
pub fn render_entry<R: Rng + ?Sized>(
    payees: &[String],
    postings: &[PostingTemplate],
    date: NaiveDate,
    currency: &str,
    rng: &mut R,
) -> String {
    let payee = match payees {
        [only] => only.as_str(),
        _ => payees.choose(rng).map(String::as_str).unwrap_or_default(),
    };

    let mut lines = Vec::with_capacity(postings.len() + 1);
    lines.push(format!("{} * {}", format_ledger_date(date), payee));
    for posting in postings {
        lines.push(posting.render(currency, rng));
    }
    lines.join("\n")
}
