//! Number of children living in the household over time

use crate::facts::{Bostatus, CaseFacts, SubjectFacts};
use bidrag_domain::{coalesce, merge_coverage, CanonicalPeriod, Interval};

/// Coalesced timeline of how many children live in the household
///
/// Only resident statuses count. A child is counted at most once per day,
/// even when its own periods overlap, and never after its date of death.
/// Days with no resident child are absent from the timeline.
pub fn children_in_household(facts: &CaseFacts) -> Vec<CanonicalPeriod<usize>> {
    let residence: Vec<Interval<()>> = facts
        .boforhold
        .iter()
        .flat_map(resident_coverage)
        .collect();

    coalesce(&residence)
}

fn resident_coverage(child: &SubjectFacts<Bostatus>) -> Vec<Interval<()>> {
    let resident: Vec<Interval<()>> = child
        .periods
        .iter()
        .filter(|period| period.tag().counts_as_resident())
        .map(|period| period.clone().map_tag(|_| ()))
        .collect();

    merge_coverage(&resident)
        .into_iter()
        // Residence starting after death clips to nothing
        .filter_map(|range| {
            let to = match (range.to, child.person.dodsdato) {
                (Some(to), Some(dod)) => Some(to.min(dod)),
                (None, dod) => dod,
                (to, None) => to,
            };
            Interval::new(range.from, to, ()).ok()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facts::{Person, Rolle};
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn child(ident: &str) -> Person {
        Person::new(ident, Rolle::Barn)
    }

    #[test]
    fn test_counts_resident_children() {
        let facts = CaseFacts::builder(date(2023, 1, 1))
            .barn(
                child("barn-1"),
                vec![Interval::ongoing(date(2023, 1, 1), Bostatus::MedForelder)],
            )
            .barn(
                child("barn-2"),
                vec![
                    Interval::new(date(2023, 1, 1), Some(date(2023, 5, 31)), Bostatus::IkkeMedForelder)
                        .unwrap(),
                    Interval::ongoing(date(2023, 6, 1), Bostatus::DeltBosted),
                ],
            )
            .build();

        let timeline = children_in_household(&facts);

        assert_eq!(timeline.len(), 2);
        assert_eq!(timeline[0].from, date(2023, 1, 1));
        assert_eq!(timeline[0].to, Some(date(2023, 5, 31)));
        assert_eq!(timeline[0].value, 1);
        assert_eq!(timeline[1].from, date(2023, 6, 1));
        assert_eq!(timeline[1].to, None);
        assert_eq!(timeline[1].value, 2);
    }

    #[test]
    fn test_overlapping_periods_count_once() {
        let facts = CaseFacts::builder(date(2023, 1, 1))
            .barn(
                child("barn-1"),
                vec![
                    Interval::ongoing(date(2023, 1, 1), Bostatus::MedForelder),
                    Interval::ongoing(date(2023, 3, 1), Bostatus::DokumentertSkolegang),
                ],
            )
            .build();

        let timeline = children_in_household(&facts);

        assert_eq!(timeline.len(), 1);
        assert_eq!(timeline[0].value, 1);
    }

    #[test]
    fn test_deceased_child_leaves_household() {
        let facts = CaseFacts::builder(date(2023, 1, 1))
            .barn(
                child("barn-1").deceased(date(2023, 8, 14)),
                vec![Interval::ongoing(date(2023, 1, 1), Bostatus::MedForelder)],
            )
            .build();

        let timeline = children_in_household(&facts);

        assert_eq!(timeline.len(), 1);
        assert_eq!(timeline[0].to, Some(date(2023, 8, 14)));
    }

    #[test]
    fn test_no_resident_children() {
        let facts = CaseFacts::builder(date(2023, 1, 1))
            .barn(
                child("barn-1"),
                vec![Interval::ongoing(date(2023, 1, 1), Bostatus::IkkeMedForelder)],
            )
            .build();

        assert!(children_in_household(&facts).is_empty());
    }
}
