use crate::engine::GenerationRange;
use crate::recurrence::EntryDefinition;
use crate::utils::windows_overlap;
use log::warn;
use std::fmt;

/// Configurations that load fine but probably don't do what the author meant.
#[derive(Debug, Clone, PartialEq)]
pub enum WarningKind {
    NoTrigger,
    OnceWithRecurrence,
    EmptyWindow,
    OutsideGenerationRange,
    ZeroProbability,
    DayMissingInSomeMonths(u32),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidationWarning {
    /// Position of the definition in the input document.
    pub index: usize,
    pub payee: String,
    pub kind: WarningKind,
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entry #{} ({}): ", self.index, self.payee)?;
        match &self.kind {
            WarningKind::NoTrigger => write!(f, "no day, dow or once trigger; it will never fire"),
            WarningKind::OnceWithRecurrence => write!(
                f,
                "once is combined with day/dow; it will keep firing on those after the first date"
            ),
            WarningKind::EmptyWindow => write!(f, "start is after end; it will never fire"),
            WarningKind::OutsideGenerationRange => {
                write!(f, "date window does not overlap the generation range")
            }
            WarningKind::ZeroProbability => write!(f, "probability is 0; it will never fire"),
            WarningKind::DayMissingInSomeMonths(day) => {
                write!(f, "day {} does not occur in every month", day)
            }
        }
    }
}

pub fn validate(entries: &[EntryDefinition], range: GenerationRange) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    for (index, entry) in entries.iter().enumerate() {
        let payee = entry.payees.join(" | ");
        let mut push = |kind| {
            warnings.push(ValidationWarning {
                index,
                payee: payee.clone(),
                kind,
            })
        };

        if !entry.has_trigger() {
            push(WarningKind::NoTrigger);
        }

        if entry.once.is_some() && (entry.days.is_some() || entry.weekdays.is_some()) {
            push(WarningKind::OnceWithRecurrence);
        }

        match (entry.start, entry.end) {
            (Some(start), Some(end)) if start > end => push(WarningKind::EmptyWindow),
            (start, end) if !windows_overlap(start, end, range.start, range.end) => {
                push(WarningKind::OutsideGenerationRange)
            }
            _ => {}
        }

        if entry.probability == Some(0.0) {
            push(WarningKind::ZeroProbability);
        }

        if let Some(days) = &entry.days {
            for &day in days.iter().filter(|d| **d > 28) {
                push(WarningKind::DayMissingInSomeMonths(day));
            }
        }
    }

    for warning in &warnings {
        warn!("{}", warning);
    }

    warnings
}
