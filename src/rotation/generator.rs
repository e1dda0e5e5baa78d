//! Rotation table generation.
//!
//! Generation is a pure function from (pattern, crews, date range, anchor)
//! to an ordered assignment table. Calling it twice with the same inputs
//! yields identical output.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{RosterError, RosterResult};
use crate::models::{Assignment, Crew, DateRange};

use super::catalog::{PatternCatalog, RotationPattern};

/// Inputs for generating a rotation table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotationRequest {
    /// Name of a pattern in the catalog.
    pub pattern: String,
    /// Crews to generate for.
    pub crews: Vec<Crew>,
    /// First date (inclusive).
    pub start_date: NaiveDate,
    /// Last date (inclusive).
    pub end_date: NaiveDate,
    /// The date at cycle offset zero.
    pub anchor_date: NaiveDate,
}

/// Generates the rotation table for a request against a catalog.
///
/// # Errors
///
/// - [`RosterError::PatternNotFound`] if the pattern name is unknown
/// - [`RosterError::Validation`] if `crews` is empty or the end date
///   precedes the start date
/// - [`RosterError::UnknownCrew`] if a crew has no row in the pattern
///
/// # Example
///
/// ```
/// use std::collections::BTreeMap;
/// use chrono::NaiveDate;
/// use crew_roster::models::{Crew, ShiftLabel};
/// use crew_roster::rotation::{
///     PatternCatalog, RotationPattern, RotationRequest, generate_rotation,
/// };
///
/// let mut table = BTreeMap::new();
/// table.insert(Crew::new("A"), vec![ShiftLabel::Day, ShiftLabel::Off]);
/// table.insert(Crew::new("B"), vec![ShiftLabel::Off, ShiftLabel::Day]);
/// let mut catalog = PatternCatalog::new();
/// catalog.insert(RotationPattern::new("alternate", "", 2, table).unwrap()).unwrap();
///
/// let request = RotationRequest {
///     pattern: "alternate".to_string(),
///     crews: vec![Crew::new("B"), Crew::new("A")],
///     start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
///     end_date: NaiveDate::from_ymd_opt(2025, 1, 2).unwrap(),
///     anchor_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
/// };
/// let table = generate_rotation(&catalog, &request).unwrap();
///
/// assert_eq!(table.len(), 4);
/// assert_eq!(table[0].crew, Crew::new("A"));
/// assert_eq!(table[0].shift, ShiftLabel::Day);
/// ```
pub fn generate_rotation(
    catalog: &PatternCatalog,
    request: &RotationRequest,
) -> RosterResult<Vec<Assignment>> {
    let pattern = catalog.get(&request.pattern)?;
    let range = DateRange::new(request.start_date, request.end_date)?;
    generate_for_pattern(pattern, &request.crews, range, request.anchor_date)
}

/// Generates the rotation table for an already-resolved pattern.
///
/// Output is ordered by date ascending, then crew ascending. Duplicate
/// crews in the input are collapsed.
pub fn generate_for_pattern(
    pattern: &RotationPattern,
    crews: &[Crew],
    range: DateRange,
    anchor: NaiveDate,
) -> RosterResult<Vec<Assignment>> {
    if crews.is_empty() {
        return Err(RosterError::validation("crews", "at least one crew is required"));
    }
    let crews: BTreeSet<&Crew> = crews.iter().collect();
    if let Some(missing) = crews.iter().find(|c| !pattern.covers(c)) {
        return Err(RosterError::UnknownCrew {
            crew: missing.to_string(),
            message: format!("pattern '{}' has no row for this crew", pattern.name()),
        });
    }

    let mut table = Vec::with_capacity(range.len_days() as usize * crews.len());
    for date in range.days() {
        let offset = pattern.offset_for(anchor, date);
        for crew in &crews {
            let shift = pattern.label_at(crew, offset).ok_or_else(|| {
                RosterError::consistency(format!(
                    "pattern '{}' has no label for crew {} at offset {}",
                    pattern.name(),
                    crew,
                    offset
                ))
            })?;
            table.push(Assignment {
                crew: (*crew).clone(),
                date,
                shift,
            });
        }
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ShiftLabel;
    use std::collections::BTreeMap;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn crews(ids: &[&str]) -> Vec<Crew> {
        ids.iter().map(|c| Crew::new(*c)).collect()
    }

    fn labels(codes: &str) -> Vec<ShiftLabel> {
        codes.chars().filter_map(ShiftLabel::from_code).collect()
    }

    /// 4-on-4-off: offset 0 has A and B on, C and D off.
    fn four_on_four_off() -> PatternCatalog {
        let mut table = BTreeMap::new();
        table.insert(Crew::new("A"), labels("DDDDOOOO"));
        table.insert(Crew::new("B"), labels("NNNNOOOO"));
        table.insert(Crew::new("C"), labels("OOOODDDD"));
        table.insert(Crew::new("D"), labels("OOOONNNN"));
        let mut catalog = PatternCatalog::new();
        catalog
            .insert(RotationPattern::new("4-on-4-off", "", 8, table).unwrap())
            .unwrap();
        catalog
    }

    fn request(start: NaiveDate, end: NaiveDate) -> RotationRequest {
        RotationRequest {
            pattern: "4-on-4-off".to_string(),
            crews: crews(&["A", "B", "C", "D"]),
            start_date: start,
            end_date: end,
            anchor_date: date(2025, 1, 1),
        }
    }

    fn day_of(table: &[Assignment], day: NaiveDate) -> Vec<(Crew, ShiftLabel)> {
        table
            .iter()
            .filter(|a| a.date == day)
            .map(|a| (a.crew.clone(), a.shift))
            .collect()
    }

    #[test]
    fn test_cycle_repeats_after_cycle_length() {
        let catalog = four_on_four_off();
        let table =
            generate_rotation(&catalog, &request(date(2025, 1, 1), date(2025, 1, 9))).unwrap();
        assert_eq!(day_of(&table, date(2025, 1, 1)), day_of(&table, date(2025, 1, 9)));
        assert_eq!(
            day_of(&table, date(2025, 1, 1)),
            vec![
                (Crew::new("A"), ShiftLabel::Day),
                (Crew::new("B"), ShiftLabel::Night),
                (Crew::new("C"), ShiftLabel::Off),
                (Crew::new("D"), ShiftLabel::Off),
            ]
        );
    }

    #[test]
    fn test_dates_before_anchor_resolve() {
        let catalog = four_on_four_off();
        let table =
            generate_rotation(&catalog, &request(date(2024, 12, 31), date(2024, 12, 31))).unwrap();
        // Offset 7: C and D on.
        assert_eq!(
            day_of(&table, date(2024, 12, 31)),
            vec![
                (Crew::new("A"), ShiftLabel::Off),
                (Crew::new("B"), ShiftLabel::Off),
                (Crew::new("C"), ShiftLabel::Day),
                (Crew::new("D"), ShiftLabel::Night),
            ]
        );
    }

    #[test]
    fn test_output_is_date_then_crew_ordered() {
        let catalog = four_on_four_off();
        let mut req = request(date(2025, 2, 1), date(2025, 2, 3));
        req.crews = crews(&["D", "A", "C"]);
        let table = generate_rotation(&catalog, &req).unwrap();
        let keys: Vec<_> = table.iter().map(|a| (a.date, a.crew.clone())).collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
        assert_eq!(table.len(), 9);
    }

    #[test]
    fn test_duplicate_crews_collapse() {
        let catalog = four_on_four_off();
        let mut req = request(date(2025, 2, 1), date(2025, 2, 1));
        req.crews = crews(&["A", "A", "B"]);
        assert_eq!(generate_rotation(&catalog, &req).unwrap().len(), 2);
    }

    #[test]
    fn test_generation_is_idempotent() {
        let catalog = four_on_four_off();
        let req = request(date(2025, 1, 1), date(2025, 3, 31));
        let first = generate_rotation(&catalog, &req).unwrap();
        let second = generate_rotation(&catalog, &req).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn test_unknown_pattern_is_rejected() {
        let catalog = four_on_four_off();
        let mut req = request(date(2025, 1, 1), date(2025, 1, 2));
        req.pattern = "dupont".to_string();
        assert!(matches!(
            generate_rotation(&catalog, &req),
            Err(RosterError::PatternNotFound { .. })
        ));
    }

    #[test]
    fn test_empty_crews_is_validation_error() {
        let catalog = four_on_four_off();
        let mut req = request(date(2025, 1, 1), date(2025, 1, 2));
        req.crews.clear();
        assert!(matches!(
            generate_rotation(&catalog, &req),
            Err(RosterError::Validation { .. })
        ));
    }

    #[test]
    fn test_end_before_start_is_validation_error() {
        let catalog = four_on_four_off();
        let req = request(date(2025, 1, 5), date(2025, 1, 4));
        assert!(matches!(
            generate_rotation(&catalog, &req),
            Err(RosterError::Validation { .. })
        ));
    }

    #[test]
    fn test_crew_missing_from_pattern_is_rejected() {
        let catalog = four_on_four_off();
        let mut req = request(date(2025, 1, 1), date(2025, 1, 2));
        req.crews = crews(&["A", "E"]);
        assert!(matches!(
            generate_rotation(&catalog, &req),
            Err(RosterError::UnknownCrew { .. })
        ));
    }
}
