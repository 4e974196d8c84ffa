use chrono::{Datelike, Local, NaiveDate};
use std::path::Path;

use crate::config::{load_config, load_state, save_state, GrnRecord, State};
use crate::error::{GrnError, Result};
use crate::grn::{ChargeField, LineField, LineItem};

/// Format GRN number from template
pub fn format_grn_number(format: &str, year: u32, seq: u32) -> String {
    format
        .replace("{year}", &year.to_string())
        .replace("{seq:04}", &format!("{:04}", seq))
        .replace("{seq:05}", &format!("{:05}", seq))
        .replace("{seq:03}", &format!("{:03}", seq))
}

/// Resolve a GRN reference to the actual GRN number.
/// Accepts either an index (1-based) from 'list' or the full GRN number.
pub fn resolve_grn_number(state: &State, reference: &str) -> Result<String> {
    if let Ok(idx) = reference.parse::<usize>() {
        // Listed newest first
        let grns: Vec<_> = state.grns.iter().rev().collect();
        if idx == 0 || idx > grns.len() {
            return Err(GrnError::InvalidGrnIndex(reference.to_string()));
        }
        return Ok(grns[idx - 1].number.clone());
    }

    if state.grns.iter().any(|g| g.number == reference) {
        Ok(reference.to_string())
    } else {
        Err(GrnError::GrnNotFound(reference.to_string()))
    }
}

fn find_mut<'a>(state: &'a mut State, number: &str) -> Result<&'a mut GrnRecord> {
    state
        .grns
        .iter_mut()
        .find(|g| g.number == number)
        .ok_or_else(|| GrnError::GrnNotFound(number.to_string()))
}

/// Load state, run `edit` on the referenced GRN, save. Returns a copy of the
/// edited record alongside whatever `edit` produced.
fn with_grn<T>(
    cfg_dir: &Path,
    reference: &str,
    edit: impl FnOnce(&mut GrnRecord) -> Result<T>,
) -> Result<(GrnRecord, T)> {
    let mut state = load_state(cfg_dir)?;
    let number = resolve_grn_number(&state, reference)?;
    let record = find_mut(&mut state, &number)?;
    let out = edit(record)?;
    let snapshot = record.clone();
    save_state(cfg_dir, &state)?;
    Ok((snapshot, out))
}

/// Open a new, empty GRN
pub fn create_grn(
    cfg_dir: &Path,
    supplier: &str,
    invoice_no: Option<String>,
    date: Option<NaiveDate>,
) -> Result<GrnRecord> {
    let config = load_config(cfg_dir)?;
    let mut state = load_state(cfg_dir)?;

    let today = Local::now().date_naive();
    let current_year = today.year() as u32;

    let seq = if state.counter.last_year == current_year {
        state.counter.last_number + 1
    } else {
        1 // Reset for new year
    };

    let number = format_grn_number(&config.grn.number_format, current_year, seq);
    let record = GrnRecord::new(
        number,
        supplier.to_string(),
        invoice_no,
        date.unwrap_or(today),
    );

    state.counter.last_number = seq;
    state.counter.last_year = current_year;
    state.grns.push(record.clone());
    save_state(cfg_dir, &state)?;

    tracing::info!(number = %record.number, supplier, "Created GRN");
    Ok(record)
}

/// "Add Item": append a line, then apply any `field=value` edits to it in order.
/// Returns the record and the new line number.
pub fn add_item(
    cfg_dir: &Path,
    reference: &str,
    product: &str,
    edits: &[(LineField, String)],
) -> Result<(GrnRecord, usize)> {
    let options = load_config(cfg_dir)?.grn.calc;
    with_grn(cfg_dir, reference, |grn| {
        let line = grn.add_item(product);
        for (field, raw) in edits {
            grn.set_item_field(line, field, raw, &options)?;
        }
        Ok(line)
    })
}

/// "Remove Item"
pub fn remove_item(cfg_dir: &Path, reference: &str, line: usize) -> Result<(GrnRecord, LineItem)> {
    let options = load_config(cfg_dir)?.grn.calc;
    with_grn(cfg_dir, reference, |grn| grn.remove_item(line, &options))
}

/// Edit one field of one line
pub fn set_item_field(
    cfg_dir: &Path,
    reference: &str,
    line: usize,
    field: &LineField,
    raw: &str,
) -> Result<GrnRecord> {
    let options = load_config(cfg_dir)?.grn.calc;
    let (record, ()) = with_grn(cfg_dir, reference, |grn| {
        grn.set_item_field(line, field, raw, &options).map(|_| ())
    })?;
    Ok(record)
}

/// Edit one payment field
pub fn set_charge(
    cfg_dir: &Path,
    reference: &str,
    field: ChargeField,
    raw: &str,
) -> Result<GrnRecord> {
    let (record, ()) = with_grn(cfg_dir, reference, |grn| {
        grn.set_charge(field, raw);
        Ok(())
    })?;
    Ok(record)
}
