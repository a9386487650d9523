//! Drawing views as plain text.

use std::io::{self, Write};

use crate::card::{Card, ListingRow};
use crate::config::DisplayConfig;
use crate::workflow::{CheckoutForm, Notice, SelectedCard, View};

const LIST_HEADERS: [&str; 8] = [
    "Label",
    "Status",
    "Capacity",
    "Checked out",
    "Borrower",
    "Equipment",
    "Container",
    "Note",
];

/// Draw a whole screen: title, notice, body and key hints.
///
/// # Errors
///
/// Returns an error if writing to `out` fails.
pub fn screen<W: Write>(
    out: &mut W,
    view: &View,
    notice: Option<&Notice>,
    display: &DisplayConfig,
) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "== {} ==", title(view))?;
    if let Some(notice) = notice {
        notice_line(out, notice)?;
    }

    match view {
        View::Select => {
            writeln!(out, "  1) Check out cards")?;
            writeln!(out, "  2) Return cards")?;
            writeln!(out, "  3) Inventory")?;
            writeln!(out, "  q) Quit")?;
        }
        View::CheckoutForm { containers, form } => {
            previous_form(out, form)?;
            containers_menu(out, containers)?;
            writeln!(out, "(type /b to go back, /q to quit)")?;
        }
        View::CheckoutCards {
            ticket,
            available,
            selected,
        } => {
            writeln!(
                out,
                "{} for {} ({})",
                ticket.container, ticket.request.borrower, ticket.request.equipment
            )?;
            if available.is_empty() {
                writeln!(out, "No cards available in {}.", ticket.container)?;
            } else {
                grid(out, available, selected, display.cards_per_row)?;
            }
            if selected.is_empty() {
                writeln!(out, "Selected: none")?;
            } else {
                let labels: Vec<&str> = selected.iter().map(|card| card.label.as_str()).collect();
                writeln!(out, "Selected: {}", labels.join(", "))?;
            }
            writeln!(
                out,
                "(indexes or labels toggle cards, c confirms, b back, q quit)"
            )?;
        }
        View::Return {
            containers,
            container: None,
            ..
        }
        | View::List {
            containers,
            container: None,
            ..
        } => {
            containers_menu(out, containers)?;
            writeln!(out, "(b back, q quit)")?;
        }
        View::Return {
            container: Some(container),
            cards,
            ..
        } => {
            if cards.is_empty() {
                writeln!(out, "No cards checked out from {container}.")?;
            } else {
                for card in cards {
                    return_block(out, card, &display.date_format)?;
                }
            }
            writeln!(
                out,
                "(r <index> returns a card, c changes container, b back, q quit)"
            )?;
        }
        View::List {
            container: Some(_),
            rows,
            ..
        } => {
            listing_table(out, rows)?;
            writeln!(out, "(c changes container, b back, q quit)")?;
        }
    }
    Ok(())
}

fn title(view: &View) -> &'static str {
    match view {
        View::Select => "SD card inventory",
        View::CheckoutForm { .. } | View::CheckoutCards { .. } => "Check out cards",
        View::Return { .. } => "Return cards",
        View::List { .. } => "Inventory",
    }
}

/// Write a single status line for a notice.
///
/// # Errors
///
/// Returns an error if writing to `out` fails.
pub fn notice_line<W: Write>(out: &mut W, notice: &Notice) -> io::Result<()> {
    let tag = if notice.success { "OK" } else { "Error" };
    writeln!(out, "{tag}: {}", notice.message)
}

fn previous_form<W: Write>(out: &mut W, form: &CheckoutForm) -> io::Result<()> {
    if *form == CheckoutForm::default() {
        return Ok(());
    }
    writeln!(
        out,
        "Last entry: borrower '{}', equipment '{}', container '{}'",
        form.borrower,
        form.equipment,
        form.container.as_deref().unwrap_or("")
    )
}

fn containers_menu<W: Write>(out: &mut W, containers: &[String]) -> io::Result<()> {
    writeln!(out, "Containers:")?;
    for (i, container) in containers.iter().enumerate() {
        writeln!(out, "  {}) {container}", i + 1)?;
    }
    Ok(())
}

fn grid<W: Write>(
    out: &mut W,
    cards: &[Card],
    selected: &[SelectedCard],
    per_row: usize,
) -> io::Result<()> {
    let cells: Vec<String> = cards
        .iter()
        .map(|card| {
            let mark = if selected.iter().any(|s| s.id == card.id) {
                'x'
            } else {
                ' '
            };
            format!("[{mark}] {:>2} {}", card.index, card.short_label())
        })
        .collect();
    let width = cells
        .iter()
        .map(|cell| cell.chars().count())
        .max()
        .unwrap_or(0);

    for row in cells.chunks(per_row.max(1)) {
        let line = row
            .iter()
            .map(|cell| format!("{cell:<width$}"))
            .collect::<Vec<_>>()
            .join("  ");
        writeln!(out, "{}", line.trim_end())?;
    }
    Ok(())
}

fn return_block<W: Write>(out: &mut W, card: &Card, date_format: &str) -> io::Result<()> {
    writeln!(out, "[{:>2}] {}", card.index, card.short_label())?;
    if let Some(checkout) = &card.checkout {
        writeln!(out, "     Checked out: {}", checkout.date(date_format))?;
        writeln!(out, "     Borrower:    {}", checkout.borrower)?;
        writeln!(out, "     Equipment:   {}", checkout.equipment)?;
        if !checkout.note.is_empty() {
            writeln!(out, "     Note:        {}", checkout.note)?;
        }
    }
    Ok(())
}

fn row_cells(row: &ListingRow) -> [String; 8] {
    [
        row.label.clone(),
        row.status.label().to_string(),
        row.capacity.to_string(),
        row.checkout_date.clone(),
        row.borrower.clone(),
        row.equipment.clone(),
        row.container.clone(),
        row.note.clone(),
    ]
}

/// Write listing rows as an aligned table.
///
/// # Errors
///
/// Returns an error if writing to `out` fails.
pub fn listing_table<W: Write>(out: &mut W, rows: &[ListingRow]) -> io::Result<()> {
    let cells: Vec<[String; 8]> = rows.iter().map(row_cells).collect();
    let mut widths = LIST_HEADERS.map(str::len);
    for row in &cells {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let header: Vec<String> = LIST_HEADERS.iter().map(ToString::to_string).collect();
    table_line(out, &header, &widths)?;
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    table_line(out, &rule, &widths)?;
    for row in &cells {
        table_line(out, row, &widths)?;
    }
    Ok(())
}

fn table_line<W: Write>(out: &mut W, cells: &[String], widths: &[usize]) -> io::Result<()> {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join("  ");
    writeln!(out, "{}", line.trim_end())
}
