use serde::Deserialize;
use std::io::Read;

use crate::inspections::domain::Coordinates;

/// One row of a premise-register CSV. Header names are matched after
/// lowercasing so exports from different offices all parse.
#[derive(Debug, Deserialize)]
pub(crate) struct RegisterRow {
    pub(crate) name: String,
    pub(crate) category: String,
    pub(crate) region: String,
    pub(crate) district: String,
    #[serde(default)]
    pub(crate) location: String,
    #[serde(default)]
    pub(crate) latitude: Option<f64>,
    #[serde(default)]
    pub(crate) longitude: Option<f64>,
}

impl RegisterRow {
    pub(crate) fn coordinates(&self) -> Option<Coordinates> {
        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => Some(Coordinates {
                latitude,
                longitude,
            }),
            _ => None,
        }
    }
}

pub(crate) fn parse_rows<R: Read>(reader: R) -> Result<Vec<RegisterRow>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = csv_reader
        .headers()?
        .iter()
        .map(|header| header.trim().to_ascii_lowercase())
        .collect();
    let headers = csv::StringRecord::from(headers);

    let mut rows = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        let row: RegisterRow = record.deserialize(Some(&headers))?;
        rows.push(row);
    }

    Ok(rows)
}
