use crate::domain::model::AccessRequirementRecord;
use crate::utils::error::{CompilerError, Result};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Reads the role mapping CSV. The `role_name_field` column is mandatory;
/// every other non-empty header is a service, kept in column order.
pub fn parse_mapping(data: &[u8], role_name_field: &str) -> Result<Vec<AccessRequirementRecord>> {
    let data = data.strip_prefix(UTF8_BOM).unwrap_or(data);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_reader(data);

    let headers = reader.headers()?.clone();
    let role_index = headers
        .iter()
        .position(|header| header == role_name_field)
        .ok_or_else(|| CompilerError::MissingField {
            field: role_name_field.to_string(),
            row: 0,
        })?;

    let mut records = Vec::new();
    for (index, row) in reader.records().enumerate() {
        let row = row?;
        let row_number = index + 1;

        let role_name = row
            .get(role_index)
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| CompilerError::MissingField {
                field: role_name_field.to_string(),
                row: row_number,
            })?;

        let mut record = AccessRequirementRecord::new(role_name);
        for (column, service) in headers.iter().enumerate() {
            if column == role_index || service.is_empty() {
                continue;
            }
            record = record.with_requirement(service, row.get(column).unwrap_or(""));
        }

        tracing::debug!(
            "Row {}: {} with {} granted services",
            row_number,
            record.role_name,
            record.grants().count()
        );
        records.push(record);
    }

    Ok(records)
}
