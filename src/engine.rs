use crate::error::{LedgerSynthError, Result};
use crate::recurrence::EntryDefinition;
use crate::render::DEFAULT_CURRENCY;
use chrono::NaiveDate;
use log::info;
use rand::Rng;

/// Inclusive range of calendar dates to generate entries for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl GenerationRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(LedgerSynthError::InvalidGenerationRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn num_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

impl Default for GenerationRange {
    /// 2008-01-01 through 2011-07-07.
    fn default() -> Self {
        Self {
            start: NaiveDate::from_ymd_opt(2008, 1, 1).unwrap_or_default(),
            end: NaiveDate::from_ymd_opt(2011, 7, 7).unwrap_or_default(),
        }
    }
}

/// Lazily walks the range day by day and yields each firing's rendered text.
///
/// Output is chronological; within one date it follows definition order.
/// The generator mutably borrows the definitions because firing a `once`
/// entry changes its state.
pub struct LedgerGenerator<'a, R: Rng + ?Sized> {
    entries: &'a mut [EntryDefinition],
    rng: &'a mut R,
    currency: String,
    current: Option<NaiveDate>,
    end: NaiveDate,
    next_index: usize,
}

impl<'a, R: Rng + ?Sized> LedgerGenerator<'a, R> {
    pub fn new(entries: &'a mut [EntryDefinition], range: GenerationRange, rng: &'a mut R) -> Self {
        info!(
            "Generating entries for {} definitions from {} to {} ({} days)",
            entries.len(),
            range.start,
            range.end,
            range.num_days()
        );

        Self {
            entries,
            rng,
            currency: DEFAULT_CURRENCY.to_string(),
            current: Some(range.start),
            end: range.end,
            next_index: 0,
        }
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }
}

impl<R: Rng + ?Sized> Iterator for LedgerGenerator<'_, R> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        while let Some(date) = self.current {
            while self.next_index < self.entries.len() {
                let entry = &mut self.entries[self.next_index];
                self.next_index += 1;

                if entry.should_generate(date, &mut *self.rng) {
                    return Some(entry.render(date, &self.currency, &mut *self.rng));
                }
            }

            self.next_index = 0;
            self.current = date.succ_opt().filter(|next| *next <= self.end);
        }

        None
    }
}

/// Runs the generator to completion and collects every rendered entry.
pub fn generate<R: Rng + ?Sized>(
    entries: &mut [EntryDefinition],
    range: GenerationRange,
    rng: &mut R,
) -> Vec<String> {
    LedgerGenerator::new(entries, range, rng).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{Amount, PostingTemplate};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn monthly(payee: &str, day: u32) -> EntryDefinition {
        EntryDefinition::new(
            vec![payee.to_string()],
            vec![
                PostingTemplate::new("Expenses:Misc", Some(Amount::Fixed(10.0))),
                PostingTemplate::new("Assets:Checking", None),
            ],
        )
        .unwrap()
        .with_days(vec![day])
        .unwrap()
    }

    #[test]
    fn test_default_range() {
        let range = GenerationRange::default();
        assert_eq!(range.start, date(2008, 1, 1));
        assert_eq!(range.end, date(2011, 7, 7));
    }

    #[test]
    fn test_inverted_range_rejected() {
        assert!(matches!(
            GenerationRange::new(date(2009, 1, 2), date(2009, 1, 1)),
            Err(LedgerSynthError::InvalidGenerationRange { .. })
        ));
        let single = GenerationRange::new(date(2009, 1, 1), date(2009, 1, 1)).unwrap();
        assert_eq!(single.num_days(), 1);
    }

    #[test]
    fn test_output_is_chronological_then_definition_order() {
        let mut entries = vec![monthly("B", 15), monthly("A", 1), monthly("C", 1)];
        let mut rng = StdRng::seed_from_u64(42);
        let range = GenerationRange::new(date(2008, 1, 1), date(2008, 2, 29)).unwrap();

        let headers: Vec<String> = generate(&mut entries, range, &mut rng)
            .into_iter()
            .map(|text| text.lines().next().unwrap().to_string())
            .collect();

        assert_eq!(
            headers,
            vec![
                "2008/01/01 * A",
                "2008/01/01 * C",
                "2008/01/15 * B",
                "2008/02/01 * A",
                "2008/02/01 * C",
                "2008/02/15 * B",
            ]
        );
    }

    #[test]
    fn test_generator_is_lazy() {
        let mut entries = vec![monthly("Rent", 1)];
        let mut rng = StdRng::seed_from_u64(1);
        let range = GenerationRange::new(date(2008, 1, 1), date(2011, 7, 7)).unwrap();

        let mut generator = LedgerGenerator::new(&mut entries, range, &mut rng);
        let first = generator.next().unwrap();
        assert!(first.starts_with("2008/01/01 * Rent"));
        let second = generator.next().unwrap();
        assert!(second.starts_with("2008/02/01 * Rent"));
    }

    #[test]
    fn test_range_end_is_inclusive() {
        let mut entries = vec![monthly("Rent", 7)];
        let mut rng = StdRng::seed_from_u64(1);
        let range = GenerationRange::new(date(2011, 7, 1), date(2011, 7, 7)).unwrap();
        let out = generate(&mut entries, range, &mut rng);
        assert_eq!(out.len(), 1);
        assert!(out[0].starts_with("2011/07/07"));
    }

    #[test]
    fn test_custom_currency() {
        let mut entries = vec![monthly("Rent", 1)];
        let mut rng = StdRng::seed_from_u64(1);
        let range = GenerationRange::new(date(2008, 1, 1), date(2008, 1, 1)).unwrap();
        let out: Vec<String> = LedgerGenerator::new(&mut entries, range, &mut rng)
            .with_currency("£")
            .collect();
        assert_eq!(
            out,
            vec!["2008/01/01 * Rent\n    Expenses:Misc    £10.00\n    Assets:Checking    "]
        );
    }

    #[test]
    fn test_same_seed_same_output() {
        let build = || {
            let mut e = monthly("Groceries", 3);
            e.postings[0].amount = Some(Amount::Triangular {
                low: 20.0,
                high: 90.0,
                mode: 55.0,
            });
            vec![e.with_probability(0.7).unwrap()]
        };
        let range = GenerationRange::new(date(2008, 1, 1), date(2009, 12, 31)).unwrap();

        let mut first_entries = build();
        let mut second_entries = build();
        let first = generate(&mut first_entries, range, &mut StdRng::seed_from_u64(9));
        let second = generate(&mut second_entries, range, &mut StdRng::seed_from_u64(9));
        assert_eq!(first, second);
    }
}
