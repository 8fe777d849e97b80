//! Minimal RFC 4180 CSV encoding for the export endpoints.
//!
//! Exports are small (bounded by a date range) and built in memory, so this
//! only needs correct field quoting, not a streaming writer.

/// Quote a field when it contains a delimiter, quote, or line break.
/// Embedded quotes are doubled.
pub fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Accumulates CSV rows terminated by CRLF.
#[derive(Debug, Default)]
pub struct CsvBuilder {
    out: String,
}

impl CsvBuilder {
    /// Start a document with the given header row.
    pub fn with_header(columns: &[&str]) -> Self {
        let mut builder = Self::default();
        builder.push_row(columns.iter().copied());
        builder
    }

    /// Append one row.
    pub fn push_row<I, S>(&mut self, fields: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut first = true;
        for field in fields {
            if !first {
                self.out.push(',');
            }
            first = false;
            self.out.push_str(&escape_field(field.as_ref()));
        }
        self.out.push_str("\r\n");
    }

    pub fn finish(self) -> String {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_fields_untouched() {
        assert_eq!(escape_field("Fire"), "Fire");
        assert_eq!(escape_field(""), "");
    }

    #[test]
    fn special_characters_quoted() {
        assert_eq!(escape_field("Brgy. 1, Poblacion"), "\"Brgy. 1, Poblacion\"");
        assert_eq!(escape_field("line1\nline2"), "\"line1\nline2\"");
        assert_eq!(escape_field("say \"help\""), "\"say \"\"help\"\"\"");
    }

    #[test]
    fn builder_joins_rows_with_crlf() {
        let mut csv = CsvBuilder::with_header(&["id", "address"]);
        csv.push_row(["1", "Purok 2, San Roque"]);
        csv.push_row(["2", "Centro"]);
        assert_eq!(
            csv.finish(),
            "id,address\r\n1,\"Purok 2, San Roque\"\r\n2,Centro\r\n"
        );
    }
}
