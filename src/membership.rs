//! Memberships and current role resolution.
//!
//! A membership assigns a role to a person for a period of time. A membership
//! is active while its end date is absent or not yet passed; the current role
//! is the role of the first active membership, open-ended ones first.

use std::collections::BTreeMap;

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::schema::{get_title_fields, Schema};

/// A time-bounded assignment of a role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<NaiveDate>,
    /// `None` means the membership has not ended.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<NaiveDate>,
}

impl Membership {
    pub fn new(role: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            start: None,
            end: None,
        }
    }

    pub fn starting(mut self, start: NaiveDate) -> Self {
        self.start = Some(start);
        self
    }

    pub fn ending(mut self, end: NaiveDate) -> Self {
        self.end = Some(end);
        self
    }

    /// Active on `today` when open-ended or ending on or after `today`.
    pub fn is_active_on(&self, today: NaiveDate) -> bool {
        match self.end {
            Some(end) => end >= today,
            None => true,
        }
    }

    /// Open-ended memberships order before dated ones, dated ones by end.
    fn sort_key(&self) -> (bool, Option<NaiveDate>) {
        (self.end.is_some(), self.end)
    }
}

/// Returns today's date from the local system clock.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Active memberships as of today, sorted by end date.
///
/// Memberships without an end date come before memberships with one.
/// Ties keep their input order.
pub fn active_memberships(memberships: &[Membership]) -> Vec<&Membership> {
    active_memberships_on(memberships, today())
}

/// Active memberships as of `today`. See [`active_memberships`].
pub fn active_memberships_on(memberships: &[Membership], today: NaiveDate) -> Vec<&Membership> {
    let mut active: Vec<&Membership> = memberships
        .iter()
        .filter(|m| m.is_active_on(today))
        .collect();
    // sort_by_key is stable
    active.sort_by_key(|m| m.sort_key());
    active
}

/// The role of the first active membership, or an empty string.
pub fn current_role(memberships: &[Membership]) -> String {
    current_role_on(memberships, today())
}

/// The current role as of `today`. See [`current_role`].
pub fn current_role_on(memberships: &[Membership], today: NaiveDate) -> String {
    active_memberships_on(memberships, today)
        .first()
        .map(|m| m.role.clone())
        .unwrap_or_default()
}

/// A person record: field values plus the memberships it owns.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Person {
    #[serde(default)]
    pub fields: BTreeMap<String, String>,
    #[serde(default)]
    pub memberships: Vec<Membership>,
}

impl Person {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn with_membership(mut self, membership: Membership) -> Self {
        self.memberships.push(membership);
        self
    }

    pub fn memberships(&self) -> &[Membership] {
        &self.memberships
    }

    pub fn active_memberships(&self) -> Vec<&Membership> {
        active_memberships(&self.memberships)
    }

    pub fn current_role(&self) -> String {
        current_role(&self.memberships)
    }

    /// Display title composed from the schema's title fields.
    ///
    /// Missing or blank values are skipped; the rest are joined by a space.
    pub fn title(&self, schema: &Schema) -> String {
        get_title_fields(schema)
            .iter()
            .filter_map(|field| self.fields.get(field))
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::set_title_fields;
    use chrono::Duration;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn ended_membership_is_excluded() {
        let today = date(2024, 6, 1);
        let memberships = vec![
            Membership::new("Chair"),
            Membership::new("Member").ending(date(2020, 1, 1)),
        ];

        let active = active_memberships_on(&memberships, today);
        assert_eq!(active, vec![&memberships[0]]);
        assert_eq!(current_role_on(&memberships, today), "Chair");
    }

    #[test]
    fn end_today_is_active() {
        let today = date(2024, 6, 1);
        let memberships = vec![Membership::new("Treasurer").ending(today)];

        assert_eq!(current_role_on(&memberships, today), "Treasurer");
    }

    #[test]
    fn end_yesterday_is_inactive() {
        let today = date(2024, 6, 1);
        let memberships = vec![Membership::new("Treasurer").ending(today - Duration::days(1))];

        assert!(active_memberships_on(&memberships, today).is_empty());
        assert_eq!(current_role_on(&memberships, today), "");
    }

    #[test]
    fn open_memberships_sort_first() {
        let today = date(2024, 6, 1);
        let memberships = vec![
            Membership::new("Secretary").ending(date(9999, 12, 30)),
            Membership::new("President").starting(date(2010, 1, 1)),
        ];

        let roles: Vec<_> = active_memberships_on(&memberships, today)
            .iter()
            .map(|m| m.role.as_str())
            .collect();
        assert_eq!(roles, vec!["President", "Secretary"]);
    }

    #[test]
    fn open_membership_precedes_one_ending_after_today() {
        let memberships = vec![
            Membership::new("Dated").ending(today() + Duration::days(30)),
            Membership::new("Open"),
        ];

        let roles: Vec<_> = active_memberships(&memberships)
            .iter()
            .map(|m| m.role.as_str())
            .collect();
        assert_eq!(roles, vec!["Open", "Dated"]);
        assert_eq!(current_role(&memberships), "Open");
    }

    #[test]
    fn dated_memberships_sort_by_end() {
        let today = date(2024, 6, 1);
        let memberships = vec![
            Membership::new("Late").ending(date(2030, 1, 1)),
            Membership::new("Soon").ending(date(2025, 1, 1)),
        ];

        assert_eq!(current_role_on(&memberships, today), "Soon");
    }

    #[test]
    fn ties_keep_input_order() {
        let today = date(2024, 6, 1);
        let memberships = vec![
            Membership::new("First"),
            Membership::new("Second"),
            Membership::new("Third"),
        ];

        let roles: Vec<_> = active_memberships_on(&memberships, today)
            .iter()
            .map(|m| m.role.as_str())
            .collect();
        assert_eq!(roles, vec!["First", "Second", "Third"]);
    }

    #[test]
    fn empty_input_has_no_role() {
        assert_eq!(current_role(&[]), "");
        assert!(active_memberships(&[]).is_empty());
    }

    #[test]
    fn system_clock_variants() {
        let now = today();
        let memberships = vec![
            Membership::new("Former").ending(now - Duration::days(30)),
            Membership::new("Current").ending(now + Duration::days(30)),
        ];

        assert_eq!(current_role(&memberships), "Current");
        assert_eq!(active_memberships(&memberships).len(), 1);
    }

    #[test]
    fn person_title_from_title_fields() {
        let mut schema = Schema::new("person");
        set_title_fields(&mut schema, vec!["first".into(), "last".into()]);

        let person = Person::new()
            .with_field("last", "Lovelace")
            .with_field("first", "Ada")
            .with_field("email", "ada@example.org");
        assert_eq!(person.title(&schema), "Ada Lovelace");
    }

    #[test]
    fn person_title_skips_blank_fields() {
        let mut schema = Schema::new("person");
        set_title_fields(
            &mut schema,
            vec!["first".into(), "middle".into(), "last".into()],
        );

        let person = Person::new()
            .with_field("first", "Ada")
            .with_field("middle", "  ")
            .with_field("last", "Lovelace");
        assert_eq!(person.title(&schema), "Ada Lovelace");
        assert_eq!(Person::new().title(&schema), "");
    }

    #[test]
    fn person_delegates_to_resolver() {
        let person = Person::new()
            .with_membership(Membership::new("Member").ending(today() - Duration::days(1)))
            .with_membership(Membership::new("Chair"));

        assert_eq!(person.memberships().len(), 2);
        assert_eq!(person.current_role(), "Chair");
        assert_eq!(person.active_memberships().len(), 1);
    }

    #[test]
    fn membership_json_dates() {
        let m: Membership =
            serde_json::from_str(r#"{"role": "Chair", "start": "2019-03-01"}"#).unwrap();
        assert_eq!(m.start, Some(date(2019, 3, 1)));
        assert_eq!(m.end, None);
    }
}
