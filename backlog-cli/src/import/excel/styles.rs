//! Solid fill colors from the OOXML package
//!
//! calamine exposes cell values only, so fills are read straight from the
//! xlsx zip: `xl/styles.xml` maps style indices to fills, and each worksheet's
//! `<c s="..">` attribute points at a style index. Only `patternType="solid"`
//! fills with an explicit `rgb` foreground produce a color; theme and indexed
//! colors and gradients are reported as no color.

use std::collections::HashMap;
use std::io::{Cursor, Read};

use anyhow::{Context, Result};
use quick_xml::Reader as XmlReader;
use quick_xml::events::{BytesStart, Event};
use zip::ZipArchive;
use zip::result::ZipError;

/// Colors of one sheet keyed by zero-based (row, column)
pub type SheetColors = HashMap<(u32, u32), String>;

/// Read solid fill colors for every worksheet, keyed by sheet name
pub fn read_fill_colors(bytes: &[u8]) -> Result<HashMap<String, SheetColors>> {
    let mut archive =
        ZipArchive::new(Cursor::new(bytes)).context("Spreadsheet is not a valid xlsx package")?;

    let xf_colors = match read_entry(&mut archive, "xl/styles.xml")? {
        Some(xml) => parse_styles(&xml),
        None => Vec::new(),
    };

    let mut result = HashMap::new();
    if xf_colors.iter().all(Option::is_none) {
        return Ok(result);
    }

    let workbook_xml = read_entry(&mut archive, "xl/workbook.xml")?
        .context("xlsx package has no workbook part")?;
    let rels = match read_entry(&mut archive, "xl/_rels/workbook.xml.rels")? {
        Some(xml) => parse_relationships(&xml),
        None => HashMap::new(),
    };

    for (sheet_name, rel_id) in parse_workbook_sheets(&workbook_xml) {
        let Some(target) = rels.get(&rel_id) else {
            log::debug!("Sheet '{}' has no relationship target", sheet_name);
            continue;
        };
        let part = sheet_part_path(target);
        let Some(sheet_xml) = read_entry(&mut archive, &part)? else {
            log::debug!("Sheet part '{}' missing from package", part);
            continue;
        };
        result.insert(sheet_name, parse_sheet_colors(&sheet_xml, &xf_colors));
    }

    Ok(result)
}

fn read_entry(archive: &mut ZipArchive<Cursor<&[u8]>>, path: &str) -> Result<Option<String>> {
    let mut file = match archive.by_name(path) {
        Ok(file) => file,
        Err(ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(e).with_context(|| format!("Failed to open package part {}", path)),
    };
    let mut content = String::new();
    file.read_to_string(&mut content)
        .with_context(|| format!("Failed to read package part {}", path))?;
    Ok(Some(content))
}

fn sheet_part_path(target: &str) -> String {
    match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("xl/{}", target),
    }
}

fn attr(e: &BytesStart<'_>, name: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.local_name().as_ref() == name)
        .map(|a| String::from_utf8_lossy(&a.value).into_owned())
}

/// Color for each cell format (`cellXfs` index), `None` when not a solid rgb fill
fn parse_styles(xml: &str) -> Vec<Option<String>> {
    let mut reader = XmlReader::from_str(xml);

    let mut fills: Vec<Option<String>> = Vec::new();
    let mut xf_fill_ids: Vec<usize> = Vec::new();

    let mut in_fills = false;
    let mut in_cell_xfs = false;
    let mut solid = false;
    let mut fg_color: Option<String> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"fills" => in_fills = true,
                b"cellXfs" => in_cell_xfs = true,
                b"fill" if in_fills => {
                    solid = false;
                    fg_color = None;
                }
                b"patternFill" if in_fills => {
                    solid = attr(&e, b"patternType").as_deref() == Some("solid");
                }
                b"fgColor" if in_fills => fg_color = rgb_suffix(&e),
                b"xf" if in_cell_xfs => xf_fill_ids.push(fill_id(&e)),
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"fill" if in_fills => fills.push(None),
                b"patternFill" if in_fills => {
                    solid = attr(&e, b"patternType").as_deref() == Some("solid");
                }
                b"fgColor" if in_fills => fg_color = rgb_suffix(&e),
                b"xf" if in_cell_xfs => xf_fill_ids.push(fill_id(&e)),
                _ => {}
            },
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"fills" => in_fills = false,
                b"cellXfs" => in_cell_xfs = false,
                b"fill" if in_fills => {
                    fills.push(if solid { fg_color.take() } else { None });
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                log::warn!("Stopped reading styles at parse error: {}", e);
                break;
            }
            _ => {}
        }
    }

    xf_fill_ids
        .into_iter()
        .map(|id| fills.get(id).cloned().flatten())
        .collect()
}

fn fill_id(e: &BytesStart<'_>) -> usize {
    attr(e, b"fillId").and_then(|s| s.parse().ok()).unwrap_or(0)
}

/// Last six hex digits of an ARGB `rgb` attribute
fn rgb_suffix(e: &BytesStart<'_>) -> Option<String> {
    let rgb = attr(e, b"rgb")?;
    if rgb.len() < 6 || !rgb.is_ascii() {
        return None;
    }
    Some(rgb[rgb.len() - 6..].to_string())
}

/// (sheet name, relationship id) in workbook order
fn parse_workbook_sheets(xml: &str) -> Vec<(String, String)> {
    let mut reader = XmlReader::from_str(xml);
    let mut sheets = Vec::new();
    loop {
        match reader.read_event() {
            Ok(Event::Start(e) | Event::Empty(e)) if e.local_name().as_ref() == b"sheet" => {
                if let (Some(name), Some(id)) = (attr(&e, b"name"), attr(&e, b"id")) {
                    sheets.push((name, id));
                }
            }
            Ok(Event::Eof) | Err(_) => break,
            _ => {}
        }
    }
    sheets
}

fn parse_relationships(xml: &str) -> HashMap<String, String> {
    let mut reader = XmlReader::from_str(xml);
    let mut rels = HashMap::new();
    loop {
        match reader.read_event() {
            Ok(Event::Start(e) | Event::Empty(e))
                if e.local_name().as_ref() == b"Relationship" =>
            {
                if let (Some(id), Some(target)) = (attr(&e, b"Id"), attr(&e, b"Target")) {
                    rels.insert(id, target);
                }
            }
            Ok(Event::Eof) | Err(_) => break,
            _ => {}
        }
    }
    rels
}

fn parse_sheet_colors(xml: &str, xf_colors: &[Option<String>]) -> SheetColors {
    let mut reader = XmlReader::from_str(xml);
    let mut colors = SheetColors::new();

    // Position tracking for cells that omit their `r` reference
    let mut current_row: Option<u32> = None;
    let mut next_col: u32 = 0;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e) | Event::Empty(e)) => match e.local_name().as_ref() {
                b"row" => {
                    let row = attr(&e, b"r")
                        .and_then(|r| r.parse::<u32>().ok())
                        .map(|r| r.saturating_sub(1))
                        .unwrap_or_else(|| current_row.map_or(0, |r| r + 1));
                    current_row = Some(row);
                    next_col = 0;
                }
                b"c" => {
                    let (row, col) = attr(&e, b"r")
                        .and_then(|r| parse_cell_ref(&r))
                        .unwrap_or((current_row.unwrap_or(0), next_col));
                    next_col = col + 1;

                    let style = attr(&e, b"s").and_then(|s| s.parse::<usize>().ok()).unwrap_or(0);
                    if let Some(Some(color)) = xf_colors.get(style) {
                        colors.insert((row, col), color.clone());
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                log::warn!("Stopped reading sheet colors at parse error: {}", e);
                break;
            }
            _ => {}
        }
    }

    colors
}

/// Parse an A1-style reference into zero-based (row, column)
fn parse_cell_ref(reference: &str) -> Option<(u32, u32)> {
    let split = reference.find(|c: char| c.is_ascii_digit())?;
    let (letters, digits) = reference.split_at(split);
    if letters.is_empty() {
        return None;
    }

    let mut col: u32 = 0;
    for c in letters.chars() {
        if !c.is_ascii_alphabetic() {
            return None;
        }
        col = col * 26 + (c.to_ascii_uppercase() as u32 - 'A' as u32 + 1);
    }
    let row: u32 = digits.parse().ok()?;
    Some((row.checked_sub(1)?, col - 1))
}
