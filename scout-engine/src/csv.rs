//! Record-to-CSV rendering for the export command.
//!
//! Works over loose JSON records so any report shape can be exported.
//! Fields are taken from the explicit list when given, otherwise inferred
//! from the first record's keys.

use serde_json::Value;

pub fn to_csv(records: &[Value], fields: Option<&[String]>) -> String {
    if records.is_empty() {
        return String::new();
    }

    let fields: Vec<String> = match fields {
        Some(fields) => fields.to_vec(),
        None => records[0]
            .as_object()
            .map(|map| map.keys().cloned().collect())
            .unwrap_or_default(),
    };
    if fields.is_empty() {
        return String::new();
    }

    let mut out = String::new();
    push_row(&mut out, fields.iter().map(|f| escape_field(f)));

    for record in records {
        push_row(
            &mut out,
            fields.iter().map(|field| match record.get(field) {
                None | Some(Value::Null) => String::new(),
                Some(Value::String(s)) => escape_field(s),
                Some(other) => escape_field(&other.to_string()),
            }),
        );
    }

    out
}

fn push_row(out: &mut String, cells: impl Iterator<Item = String>) {
    let row: Vec<String> = cells.collect();
    out.push_str(&row.join(","));
    out.push('\n');
}

/// Quote fields containing separators or quotes; internal quotes double.
fn escape_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') || value.contains('\r') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_input_renders_the_empty_string() {
        let fields = vec!["a".to_string()];
        assert_eq!(to_csv(&[], Some(&fields)), "");
        assert_eq!(to_csv(&[], None), "");
    }

    #[test]
    fn headers_are_inferred_from_the_first_record() {
        let records = vec![json!({"id": "p1", "title": "hello"})];
        let csv = to_csv(&records, None);
        assert_eq!(csv, "id,title\np1,hello\n");
    }

    #[test]
    fn explicit_fields_control_order_and_selection() {
        let records = vec![json!({"id": "p1", "title": "hello", "score": 3})];
        let fields = vec!["title".to_string(), "id".to_string()];
        let csv = to_csv(&records, Some(&fields));
        assert_eq!(csv, "title,id\nhello,p1\n");
    }

    #[test]
    fn commas_force_quoting() {
        let records = vec![json!({"title": "one, two"})];
        let csv = to_csv(&records, None);
        assert_eq!(csv, "title\n\"one, two\"\n");
    }

    #[test]
    fn quotes_are_doubled_inside_a_quoted_field() {
        let records = vec![json!({"title": "say \"hi\""})];
        let csv = to_csv(&records, None);
        assert_eq!(csv, "title\n\"say \"\"hi\"\"\"\n");
    }

    #[test]
    fn newlines_force_quoting() {
        let records = vec![json!({"title": "line one\nline two"})];
        let csv = to_csv(&records, None);
        assert_eq!(csv, "title\n\"line one\nline two\"\n");
    }

    #[test]
    fn null_and_missing_fields_render_empty() {
        let records = vec![
            json!({"id": "p1", "note": null}),
            json!({"id": "p2"}),
        ];
        let fields = vec!["id".to_string(), "note".to_string()];
        let csv = to_csv(&records, Some(&fields));
        assert_eq!(csv, "id,note\np1,\np2,\n");
    }

    #[test]
    fn numbers_render_without_quotes() {
        let records = vec![json!({"score": 42, "ratio": 0.5})];
        let fields = vec!["score".to_string(), "ratio".to_string()];
        let csv = to_csv(&records, Some(&fields));
        assert_eq!(csv, "score,ratio\n42,0.5\n");
    }
}
