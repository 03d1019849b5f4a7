//! CSV rendering of generated code batches.

use aiborn_core::serde::format_rfc3339_ms;

use crate::domain::types::Code;

pub const CSV_HEADER: &str =
    "code,type,status,max_redemptions,valid_from,valid_until,org_id,description";

/// Quote a field when it holds a delimiter, quote or line break.
fn csv_field(raw: &str) -> String {
    if raw.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", raw.replace('"', "\"\""))
    } else {
        raw.to_owned()
    }
}

/// One header line plus one line per code, `\n`-terminated.
pub fn codes_to_csv(codes: &[Code]) -> String {
    let mut out = String::with_capacity((codes.len() + 1) * 96);
    out.push_str(CSV_HEADER);
    out.push('\n');
    for code in codes {
        let row = [
            code.code.clone(),
            code.code_type.as_str().to_owned(),
            code.status.as_str().to_owned(),
            code.max_redemptions
                .map(|max| max.to_string())
                .unwrap_or_default(),
            format_rfc3339_ms(&code.valid_from),
            code.valid_until
                .as_ref()
                .map(format_rfc3339_ms)
                .unwrap_or_default(),
            code.org_id.map(|id| id.to_string()).unwrap_or_default(),
            code.description.as_deref().map(csv_field).unwrap_or_default(),
        ];
        out.push_str(&row.join(","));
        out.push('\n');
    }
    out
}
