//! Integration tests for annotation round-trips and role resolution.

use chrono::{Duration, NaiveDate};
use people_schema::{
    active_memberships, active_memberships_on, build_model, current_role, current_role_on,
    get_columns, get_detail_fields, get_order, get_selectable_fields, get_title_fields,
    list_columns, load_model_str, read_model, set_columns, set_detail_fields, set_order,
    set_selectable_fields, set_title_fields, today, write_model, DetailFields, Membership, Schema,
    SchemaMetadataCodec,
};

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Writes `schema` into a model document, serializes it, and reads it back.
fn round_trip(schema: &Schema) -> (String, Schema) {
    let codec = SchemaMetadataCodec::new();
    let xml = write_model(&build_model(std::slice::from_ref(schema), &codec)).unwrap();
    let mut schemas = read_model(&load_model_str(&xml).unwrap(), &codec);
    (xml, schemas.remove(0))
}

fn read_schema(body: &str) -> Schema {
    let xml = format!(
        r#"<schema name="person" xmlns:people="http://namespaces.plone.org/supermodel/people">{}</schema>"#,
        body
    );
    let model = load_model_str(&xml).unwrap();
    read_model(&model, &SchemaMetadataCodec::new()).remove(0)
}

// === Role resolution ===

mod roles {
    use super::*;

    #[test]
    fn excludes_exactly_the_ended() {
        let now = date(2024, 3, 15);
        let memberships = vec![
            Membership::new("a").ending(now - Duration::days(1)),
            Membership::new("b").ending(now),
            Membership::new("c").ending(now + Duration::days(1)),
            Membership::new("d"),
            Membership::new("e").starting(date(2000, 1, 1)).ending(date(2001, 1, 1)),
        ];

        let roles: Vec<_> = active_memberships_on(&memberships, now)
            .iter()
            .map(|m| m.role.as_str())
            .collect();
        assert_eq!(roles, vec!["d", "b", "c"]);
    }

    #[test]
    fn open_membership_beats_far_future_end() {
        let memberships = vec![
            Membership::new("Until the end of time").ending(date(9999, 12, 31)),
            Membership::new("Open"),
        ];
        assert_eq!(current_role_on(&memberships, date(2024, 1, 1)), "Open");
    }

    #[test]
    fn chair_example() {
        let memberships = vec![
            Membership::new("Chair"),
            Membership::new("Member").ending(date(2020, 1, 1)),
        ];

        let active = active_memberships(&memberships);
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].role, "Chair");
        assert_eq!(current_role(&memberships), "Chair");
    }

    #[test]
    fn no_role_when_all_ended() {
        let yesterday = today() - Duration::days(1);
        let memberships = vec![
            Membership::new("Member").ending(yesterday),
            Membership::new("Chair").ending(yesterday - Duration::days(365)),
        ];
        assert_eq!(current_role(&memberships), "");
        assert_eq!(current_role(&[]), "");
    }
}

// === Annotation round-trips ===

mod round_trips {
    use super::*;

    #[test]
    fn title_and_order() {
        let mut schema = Schema::new("person");
        set_title_fields(&mut schema, strings(&["last_name", "first_name"]));
        set_order(&mut schema, strings(&["email", "last_name", "first_name"]));

        let (_, parsed) = round_trip(&schema);
        assert_eq!(get_title_fields(&parsed), strings(&["last_name", "first_name"]));
        assert_eq!(
            get_order(&parsed),
            strings(&["email", "last_name", "first_name"])
        );
    }

    #[test]
    fn selectable_column() {
        let mut schema = Schema::new("person");
        set_columns(&mut schema, vec![strings(&["town"]), strings(&["a", "b"])]);
        set_selectable_fields(&mut schema, strings(&["town"]));

        let (xml, parsed) = round_trip(&schema);
        assert_eq!(xml.matches("selectable=\"true\"").count(), 1);
        assert_eq!(get_columns(&parsed)[0], strings(&["town"]));
        assert_eq!(get_selectable_fields(&parsed), strings(&["town"]));
    }

    #[test]
    fn selectable_diverges_from_columns() {
        let mut schema = read_schema(
            r#"<people:columns>
                <people:column selectable="true"><people:item>town</people:item></people:column>
            </people:columns>"#,
        );
        assert_eq!(get_selectable_fields(&schema), strings(&["town"]));

        set_selectable_fields(&mut schema, Vec::new());
        let (xml, parsed) = round_trip(&schema);
        assert!(!xml.contains("selectable"));
        assert_eq!(get_columns(&parsed), vec![strings(&["town"])]);
        assert!(get_selectable_fields(&parsed).is_empty());
    }

    #[test]
    fn details_positions() {
        let mut schema = Schema::new("person");
        let mut details = DetailFields::new();
        details.insert("left".into(), strings(&["email", "phone"]));
        details.insert("right".into(), strings(&["photo"]));
        set_detail_fields(&mut schema, details.clone());

        let (_, parsed) = round_trip(&schema);
        assert_eq!(get_detail_fields(&parsed), details);
    }

    #[test]
    fn empty_details_write_nothing() {
        let mut schema = Schema::new("person");
        set_detail_fields(&mut schema, DetailFields::new());

        let (xml, parsed) = round_trip(&schema);
        assert!(!xml.contains("details"));
        assert!(!xml.contains("xmlns:people"));
        assert!(get_detail_fields(&parsed).is_empty());
    }

    #[test]
    fn details_same_position_keeps_last() {
        let schema = read_schema(
            r#"<people:details position="left"><people:item>first</people:item></people:details>
               <people:details position="left"><people:item>second</people:item></people:details>"#,
        );
        assert_eq!(get_detail_fields(&schema)["left"], strings(&["second"]));
    }
}

// === Listing ===

mod listing {
    use super::*;

    #[test]
    fn listing_uses_parsed_columns() {
        let schema = read_schema(
            r#"<people:columns>
                <people:column><people:item>first</people:item><people:item>last</people:item></people:column>
                <people:column selectable="true"><people:item>town</people:item></people:column>
            </people:columns>"#,
        );

        let columns = list_columns(Some(&schema));
        let labels: Vec<_> = columns.iter().map(|c| c.label()).collect();
        assert_eq!(labels, vec!["first last", "town"]);
        assert!(columns[1].selectable);
    }
}
