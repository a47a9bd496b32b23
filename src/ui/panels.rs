use eframe::egui::{self, Color32, RichText, Ui};

use crate::state::{AppState, Page};

// ---------------------------------------------------------------------------
// Left side panel – year selector
// ---------------------------------------------------------------------------

/// Render the left selector panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Vasalytics");
    ui.separator();

    if state.years.is_empty() {
        ui.label("No race data loaded.");
        ui.label(format!("Expected files in {}", state.store.data_dir().display()));
        return;
    }

    ui.strong("År");
    let current = state.selected_year;
    let mut chosen = current;
    egui::ComboBox::from_id_salt("year_select")
        .selected_text(current.map(|y| y.to_string()).unwrap_or_default())
        .show_ui(ui, |ui: &mut Ui| {
            for &year in &state.years {
                ui.selectable_value(&mut chosen, Some(year), year.to_string());
            }
        });

    if chosen != current {
        if let Some(year) = chosen {
            log::debug!("Year changed to {year}");
            state.select_year(year);
            state.page = Page::Year;
        }
    }

    if let Some(view) = &state.year_view {
        ui.add_space(8.0);
        ui.label(format!("{} anmälda", view.table.len()));
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the page switcher and the status line.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        for page in Page::ALL {
            if ui
                .selectable_label(state.page == page, page.label())
                .clicked()
            {
                state.page = page;
            }
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}
