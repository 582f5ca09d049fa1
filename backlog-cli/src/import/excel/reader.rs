//! Read spreadsheet bytes into sheets of typed, colored cells

use std::io::Cursor;

use anyhow::Result;
use calamine::{Data, Range, Reader, Xlsx};
use chrono::Timelike;

use crate::import::{Cell, ImportError, Row, Sheet, Value, unnamed_header};

use super::styles::{SheetColors, read_fill_colors};

/// Parse an xlsx workbook into its non-empty sheets
///
/// The first physical row of each sheet supplies the headers. Fully empty
/// data rows are dropped, and sheets left without data rows are omitted.
/// Any failure to read the package is an [`ImportError::Parse`], raised
/// before a single sheet is returned.
pub fn read_workbook(bytes: &[u8]) -> Result<Vec<Sheet>> {
    let mut workbook: Xlsx<_> =
        Xlsx::new(Cursor::new(bytes)).map_err(|e| ImportError::Parse(e.to_string()))?;

    let mut colors =
        read_fill_colors(bytes).map_err(|e| ImportError::Parse(format!("{:#}", e)))?;

    let mut sheets = Vec::new();
    for sheet_name in workbook.sheet_names() {
        let range = workbook
            .worksheet_range(&sheet_name)
            .map_err(|e| ImportError::Parse(format!("sheet '{}': {}", sheet_name, e)))?;

        let sheet_colors = colors.remove(&sheet_name).unwrap_or_default();
        match build_sheet(&sheet_name, &range, &sheet_colors) {
            Some(sheet) => {
                log::debug!(
                    "Sheet '{}': {} headers, {} data rows",
                    sheet.name,
                    sheet.headers.len(),
                    sheet.rows.len()
                );
                sheets.push(sheet);
            }
            None => log::debug!("Sheet '{}' has no data rows, omitted", sheet_name),
        }
    }

    Ok(sheets)
}

fn build_sheet(name: &str, range: &Range<Data>, colors: &SheetColors) -> Option<Sheet> {
    let (start_row, start_col) = range.start()?;
    let (end_row, end_col) = range.end()?;
    let max_color_col = colors.keys().map(|(_, c)| *c).max().unwrap_or(0);
    let last_col = end_col.max(max_color_col);

    // Absolute positions; columns before the used range are never read
    let row_values = |row: u32| -> Vec<Value> {
        (start_col..=last_col)
            .map(|col| range.get_value((row, col)).map(data_to_value).unwrap_or_default())
            .collect()
    };

    // The first physical row with any value supplies the headers
    let header_row = (start_row..=end_row).find(|r| !row_values(*r).iter().all(Value::is_null))?;

    // Header per column, plus the de-duplicated ordered header list
    let mut column_headers = Vec::new();
    let mut headers: Vec<String> = Vec::new();
    for (offset, value) in row_values(header_row).into_iter().enumerate() {
        let column = (start_col as usize) + offset + 1;
        let text = match value {
            Value::Null => String::new(),
            value => value.key_string().trim().to_string(),
        };
        let header = if text.is_empty() { unnamed_header(column) } else { text };
        if !headers.contains(&header) {
            headers.push(header.clone());
        }
        column_headers.push(header);
    }

    let mut rows = Vec::new();
    for row_idx in header_row + 1..=end_row {
        let values = row_values(row_idx);
        if values.iter().all(Value::is_null) {
            continue;
        }

        let mut row = Row::new();
        for (offset, value) in values.into_iter().enumerate() {
            let color = colors.get(&(row_idx, start_col + offset as u32)).cloned();
            row.insert(column_headers[offset].clone(), Cell { value, color });
        }
        rows.push(row);
    }

    if rows.is_empty() {
        return None;
    }

    Some(Sheet {
        name: name.to_string(),
        headers,
        rows,
    })
}

fn data_to_value(data: &Data) -> Value {
    match data {
        Data::Empty => Value::Null,
        Data::String(s) => Value::String(s.clone()),
        Data::Float(f) => Value::from_number(*f),
        Data::Int(i) => Value::Int(*i),
        Data::Bool(b) => Value::Bool(*b),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(naive) if naive.time().num_seconds_from_midnight() == 0 => {
                Value::String(naive.format("%Y-%m-%d").to_string())
            }
            Some(naive) => Value::String(naive.format("%Y-%m-%d %H:%M:%S").to_string()),
            None => Value::from_number(dt.as_f64()),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => Value::String(s.clone()),
        Data::Error(e) => Value::String(e.to_string()),
    }
}

/// Look up a sheet by name
pub fn find_sheet<'a>(sheets: &'a [Sheet], name: &str) -> Option<&'a Sheet> {
    sheets.iter().find(|s| s.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::{Color, ExcelDateTime, Format, FormatPattern, Workbook};

    fn make_workbook() -> Vec<u8> {
        let mut workbook = Workbook::new();
        let green = Format::new()
            .set_background_color(Color::RGB(0x00FF00))
            .set_pattern(FormatPattern::Solid);

        let games = workbook.add_worksheet();
        games.set_name("Juegos").unwrap();
        games.write_string(0, 0, " Título ").unwrap();
        games.write_string(0, 1, "Nota").unwrap();
        games.write_string(0, 3, "Plataforma").unwrap();
        games.write_string(1, 0, "Hades").unwrap();
        games.write_number_with_format(1, 1, 9.0, &green).unwrap();
        games.write_string(1, 3, "PC").unwrap();
        // Row 2 left empty, dropped
        games.write_string(3, 0, "Celeste").unwrap();
        games.write_number(3, 1, 8.5).unwrap();

        let empty = workbook.add_worksheet();
        empty.set_name("Vacía").unwrap();
        empty.write_string(0, 0, "Title").unwrap();

        workbook.save_to_buffer().unwrap()
    }

    #[test]
    fn test_read_workbook_headers_values_and_colors() {
        let sheets = read_workbook(&make_workbook()).unwrap();

        // The header-only sheet is omitted
        assert_eq!(sheets.len(), 1);
        let sheet = &sheets[0];
        assert_eq!(sheet.name, "Juegos");
        assert_eq!(sheet.headers, vec!["Título", "Nota", "Unnamed:3", "Plataforma"]);
        assert_eq!(sheet.rows.len(), 2);

        let hades = &sheet.rows[0];
        assert_eq!(hades.value("Título"), Value::from("Hades"));
        assert_eq!(hades.value("Nota"), Value::Int(9));
        assert_eq!(hades.color("Nota"), Some("00FF00"));
        assert_eq!(hades.color("Título"), None);

        let celeste = &sheet.rows[1];
        assert_eq!(celeste.value("Nota"), Value::Float(8.5));
        assert_eq!(celeste.value("Plataforma"), Value::Null);
        assert_eq!(sheet.named_headers(), vec!["Título", "Nota", "Plataforma"]);
    }

    #[test]
    fn test_headers_come_from_first_non_empty_row() {
        let mut workbook = Workbook::new();
        let green = Format::new()
            .set_background_color(Color::RGB(0x00FF00))
            .set_pattern(FormatPattern::Solid);
        let sheet = workbook.add_worksheet();
        sheet.set_name("Backlog").unwrap();
        // Rows 0 and 1 and column A left blank
        sheet.write_string(2, 1, "Juego").unwrap();
        sheet.write_string(2, 2, "Nota").unwrap();
        sheet.write_string(3, 1, "Hades").unwrap();
        sheet.write_number_with_format(3, 2, 9.0, &green).unwrap();
        sheet.write_string(5, 1, "Celeste").unwrap();
        sheet.write_number(5, 3, 1.0).unwrap();
        let bytes = workbook.save_to_buffer().unwrap();

        let sheets = read_workbook(&bytes).unwrap();
        let sheet = &sheets[0];
        assert_eq!(sheet.headers, vec!["Juego", "Nota", "Unnamed:4"]);
        assert_eq!(sheet.named_headers(), vec!["Juego", "Nota"]);
        assert_eq!(sheet.rows.len(), 2);
        assert_eq!(sheet.rows[0].value("Juego"), Value::from("Hades"));
        assert_eq!(sheet.rows[0].value("Nota"), Value::Int(9));
        assert_eq!(sheet.rows[0].color("Nota"), Some("00FF00"));
        assert_eq!(sheet.rows[1].value("Juego"), Value::from("Celeste"));
        assert_eq!(sheet.rows[1].value("Unnamed:4"), Value::Int(1));
        let order: Vec<&str> = sheet.rows[1].iter().map(|(h, _)| h).collect();
        assert_eq!(order, vec!["Juego", "Nota", "Unnamed:4"]);
    }

    #[test]
    fn test_date_cells_become_iso_text() {
        let mut workbook = Workbook::new();
        let date_format = Format::new().set_num_format("yyyy-mm-dd");
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "Juego").unwrap();
        sheet.write_string(0, 1, "Terminado el").unwrap();
        sheet.write_string(1, 0, "Hades").unwrap();
        let finished = ExcelDateTime::from_ymd(2023, 11, 4).unwrap();
        sheet
            .write_datetime_with_format(1, 1, &finished, &date_format)
            .unwrap();
        let bytes = workbook.save_to_buffer().unwrap();

        let sheets = read_workbook(&bytes).unwrap();
        assert_eq!(sheets[0].rows[0].value("Terminado el"), Value::from("2023-11-04"));
    }

    #[test]
    fn test_read_workbook_rejects_garbage() {
        let err = read_workbook(b"definitely not a spreadsheet").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ImportError>(),
            Some(ImportError::Parse(_))
        ));
    }

    #[test]
    fn test_find_sheet() {
        let sheets = read_workbook(&make_workbook()).unwrap();
        assert!(find_sheet(&sheets, "Juegos").is_some());
        assert!(find_sheet(&sheets, "Vacía").is_none());
    }
}
