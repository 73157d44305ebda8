use crate::error::{LedgerSynthError, Result};
use crate::render::{render_entry, PostingTemplate};
use crate::schema::EntryDefinitionSpec;
use crate::utils::parse_date;
use chrono::{Datelike, NaiveDate};
use log::debug;
use rand::Rng;

/// Lifecycle of a `once` trigger. Moves from `Pending` to `Fired` exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnceState {
    Pending,
    Fired,
}

/// A validated recurring or one-off transaction template.
///
/// Built once from an [`EntryDefinitionSpec`] and kept for the whole run. The
/// `once` state is the only thing that changes during generation, so a second
/// run over the same definitions skips `once` entries that already fired.
#[derive(Debug, Clone)]
pub struct EntryDefinition {
    pub payees: Vec<String>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub once: Option<OnceState>,
    pub days: Option<Vec<u32>>,
    /// 0 = Monday through 6 = Sunday.
    pub weekdays: Option<Vec<u32>>,
    pub probability: Option<f64>,
    pub postings: Vec<PostingTemplate>,
}

impl EntryDefinition {
    pub fn new(payees: Vec<String>, postings: Vec<PostingTemplate>) -> Result<Self> {
        if payees.is_empty() {
            return Err(LedgerSynthError::EmptyPayee);
        }
        Ok(Self {
            payees,
            start: None,
            end: None,
            once: None,
            days: None,
            weekdays: None,
            probability: None,
            postings,
        })
    }

    pub fn with_window(mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        self.start = start;
        self.end = end;
        self
    }

    pub fn with_once(mut self) -> Self {
        self.once = Some(OnceState::Pending);
        self
    }

    pub fn with_days(mut self, days: Vec<u32>) -> Result<Self> {
        if let Some(&bad) = days.iter().find(|d| !(1..=31).contains(*d)) {
            return Err(LedgerSynthError::InvalidDayOfMonth(bad));
        }
        self.days = Some(days);
        Ok(self)
    }

    pub fn with_weekdays(mut self, weekdays: Vec<u32>) -> Result<Self> {
        if let Some(&bad) = weekdays.iter().find(|d| **d > 6) {
            return Err(LedgerSynthError::InvalidDayOfWeek(bad));
        }
        self.weekdays = Some(weekdays);
        Ok(self)
    }

    pub fn with_probability(mut self, probability: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&probability) {
            return Err(LedgerSynthError::InvalidProbability(probability));
        }
        self.probability = Some(probability);
        Ok(self)
    }

    /// Whether any of `once`, `day` or `dow` can ever make this entry fire.
    pub fn has_trigger(&self) -> bool {
        self.once.is_some() || self.days.is_some() || self.weekdays.is_some()
    }

    pub fn has_fired_once(&self) -> bool {
        self.once == Some(OnceState::Fired)
    }

    /// Decides whether the entry fires on `date`.
    ///
    /// Gates run in order: probability draw, date window, `once`, `day`, `dow`.
    /// The probability draw happens before the window check, so a failed draw
    /// never consumes a pending `once`. A pending `once` fires regardless of
    /// `day`/`dow`; after that, `day` and `dow` are checked in turn and a
    /// non-matching `day` falls through to `dow` exactly like an absent one.
    pub fn should_generate<R: Rng + ?Sized>(&mut self, date: NaiveDate, rng: &mut R) -> bool {
        if let Some(probability) = self.probability {
            let draw: f64 = rng.gen();
            if draw >= probability {
                return false;
            }
        }

        if self.start.is_some_and(|start| date < start) {
            return false;
        }
        if self.end.is_some_and(|end| date > end) {
            return false;
        }

        if self.once == Some(OnceState::Pending) {
            self.once = Some(OnceState::Fired);
            debug!("One-off entry for {:?} fired on {}", self.payees, date);
            return true;
        }

        if let Some(days) = &self.days {
            if days.contains(&date.day()) {
                return true;
            }
        }

        if let Some(weekdays) = &self.weekdays {
            if weekdays.contains(&date.weekday().num_days_from_monday()) {
                return true;
            }
        }

        false
    }

    pub fn render<R: Rng + ?Sized>(&self, date: NaiveDate, currency: &str, rng: &mut R) -> String {
        render_entry(&self.payees, &self.postings, date, currency, rng)
    }
}

impl TryFrom<EntryDefinitionSpec> for EntryDefinition {
    type Error = LedgerSynthError;

    fn try_from(spec: EntryDefinitionSpec) -> Result<Self> {
        let once_armed = spec.once_armed();

        let start = spec.start.as_deref().map(parse_date).transpose()?;
        let end = spec.end.as_deref().map(parse_date).transpose()?;

        let postings = spec
            .postings
            .into_iter()
            .map(PostingTemplate::from_spec)
            .collect::<Result<Vec<_>>>()?;

        let mut entry = EntryDefinition::new(spec.payee.into_vec(), postings)?
            .with_window(start, end);

        if once_armed {
            entry = entry.with_once();
        }
        if let Some(days) = spec.day {
            entry = entry.with_days(days.into_vec())?;
        }
        if let Some(weekdays) = spec.dow {
            entry = entry.with_weekdays(weekdays.into_vec())?;
        }
        if let Some(probability) = spec.probability {
            entry = entry.with_probability(probability)?;
        }

        debug!(
            "Loaded entry for {:?} with {} postings",
            entry.payees,
            entry.postings.len()
        );

        Ok(entry)
    }
}
