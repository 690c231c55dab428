use crate::model::csv::CsvOptions;
use serde::Deserialize;

#[derive(Deserialize, Default, Debug)]
/// Query string accepted by the CSV parse endpoint.
/// Every field is optional and falls back to the `CsvOptions` default;
/// `columns` is a comma-separated list of header names.
pub struct CsvParseQuery {
    pub with_keys: Option<bool>,
    pub columns: Option<String>,
    pub strip_and_falsify: Option<bool>,
    pub lower_case_columns: Option<bool>,
    pub skip_blank_rows: Option<bool>,
}

impl CsvParseQuery {
    pub fn into_options(self) -> CsvOptions {
        let defaults = CsvOptions::default();
        let columns = self
            .columns
            .map(|list| {
                list.split(',')
                    .map(|c| c.trim().to_string())
                    .filter(|c| !c.is_empty())
                    .collect::<Vec<_>>()
            })
            .filter(|list| !list.is_empty());

        CsvOptions {
            with_keys: self.with_keys.unwrap_or(defaults.with_keys),
            columns,
            strip_and_falsify: self.strip_and_falsify.unwrap_or(defaults.strip_and_falsify),
            lower_case_columns: self
                .lower_case_columns
                .unwrap_or(defaults.lower_case_columns),
            skip_blank_rows: self.skip_blank_rows.unwrap_or(defaults.skip_blank_rows),
        }
    }
}
