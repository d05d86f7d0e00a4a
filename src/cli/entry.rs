use crate::ledger::Session;
use crate::ledger::model::{Category, Hotel};
use crate::ledger::summary::format_grouped;
use anyhow::{Context, Result};
use dialoguer::{Confirm, Input, Select, theme::ColorfulTheme};

pub fn run_entry_loop(session: &mut Session) -> Result<()> {
    println!("──────────────────────────────────────────");
    println!("  Virtual360 Quick Data Entry");
    println!("  Leave the area name blank to finish.");
    println!("──────────────────────────────────────────");

    let theme = ColorfulTheme::default();
    let hotels = Hotel::ALL.map(Hotel::as_str);
    let categories = Category::ALL.map(Category::as_str);
    let mut form = session.new_form();

    loop {
        let hotel_index = Select::with_theme(&theme)
            .with_prompt("Hotel Name")
            .default(
                form.hotel_name
                    .and_then(|hotel| Hotel::ALL.iter().position(|item| *item == hotel))
                    .unwrap_or(0),
            )
            .items(&hotels)
            .interact()
            .context("Failed to read hotel selection")?;
        form.hotel_name = Hotel::ALL.get(hotel_index).copied();

        form.area_name = Input::with_theme(&theme)
            .with_prompt("Name of Area")
            .allow_empty(true)
            .interact_text()
            .context("Failed to read area name")?;
        if form.area_name.trim().is_empty() {
            break;
        }

        let category_index = Select::with_theme(&theme)
            .with_prompt("Category")
            .default(
                Category::ALL
                    .iter()
                    .position(|item| *item == form.category)
                    .unwrap_or(0),
            )
            .items(&categories)
            .interact()
            .context("Failed to read category selection")?;
        form.category = Category::ALL
            .get(category_index)
            .copied()
            .unwrap_or_default();

        form.coverage_sqm = Some(read_number(&theme, "Coverage (SQM)")?);
        form.cost_per_sqm = Some(read_number(&theme, "Cost / SQM")?);

        match session.submit(&mut form) {
            Ok(_) => {
                let view = session.refresh();
                println!(
                    "  ✓ Added. {} items, {} SQM in view",
                    view.summary.record_count,
                    format_grouped(view.summary.total_coverage_sqm, 1)
                );
            }
            Err(error) => println!("  ! {error}"),
        }

        let more = Confirm::with_theme(&theme)
            .with_prompt("Add another area?")
            .default(true)
            .interact()
            .context("Failed to read confirmation")?;
        if !more {
            break;
        }
    }

    Ok(())
}

fn read_number(theme: &ColorfulTheme, prompt: &str) -> Result<f64> {
    Input::<f64>::with_theme(theme)
        .with_prompt(prompt)
        .default(0.0)
        .validate_with(|value: &f64| -> std::result::Result<(), &str> {
            if value.is_finite() && *value >= 0.0 {
                Ok(())
            } else {
                Err("Enter a non-negative number")
            }
        })
        .interact_text()
        .with_context(|| format!("Failed to read {prompt}"))
}
