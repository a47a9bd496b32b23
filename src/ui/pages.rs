use eframe::egui::{self, Ui};

use crate::data::model::{START_GROUPS, TimeColumn};
use crate::state::AppState;
use crate::ui::charts;

/// Mean finish time per start group over all years.
pub fn overview_page(ui: &mut Ui, state: &AppState) {
    ui.heading("Vasalytics");
    ui.add_space(8.0);
    charts::mean_time_trend(ui, &state.trend, &state.trend_colors);
}

/// Detail charts of the selected year.
pub fn year_page(ui: &mut Ui, state: &mut AppState) {
    let Some(view) = &state.year_view else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Select a year to view its race statistics");
        });
        return;
    };

    ui.heading(format!("Vasaloppet {}", view.year));
    if view.is_empty() {
        ui.label("No participants recorded for this year.");
    }
    ui.add_space(8.0);

    let config = &state.config;

    ui.columns(3, |cols| {
        charts::start_group_bars(&mut cols[0], &view.group_counts, &view.colors);
        charts::status_donut(&mut cols[1], &view.status_counts);
        charts::layered_histogram(
            &mut cols[2],
            &view.layered_histogram,
            &view.colors,
            config.histogram_bin_width,
        );
    });

    ui.separator();

    // Selector changes are applied after drawing so the view stays borrowed
    // read-only while rendering.
    let mut ridge_changes: [Option<TimeColumn>; 2] = [None; 2];
    ui.columns(2, |cols| {
        for (slot, col_ui) in cols.iter_mut().enumerate() {
            let current = state.selection.ridge_columns[slot];
            let mut chosen = current;
            egui::ComboBox::from_id_salt(("ridge_column", slot))
                .selected_text(current.label())
                .show_ui(col_ui, |ui: &mut Ui| {
                    for column in TimeColumn::SELECTABLE {
                        ui.selectable_value(&mut chosen, column, column.label());
                    }
                });
            if chosen != current {
                ridge_changes[slot] = Some(chosen);
            }
            charts::ridgeline_chart(
                col_ui,
                &format!("ridgeline_{slot}"),
                &view.ridgelines[slot],
                config.mean_fill_domain,
            );
        }
    });

    ui.separator();

    let mut histogram_group = state.selection.histogram_group;
    ui.columns(2, |cols| {
        charts::group_box_plot(&mut cols[0], &view.box_stats, &view.colors);

        let ui = &mut cols[1];
        ui.horizontal(|ui: &mut Ui| {
            ui.strong("Startled");
            egui::ComboBox::from_id_salt("histogram_group")
                .selected_text(histogram_group.to_string())
                .show_ui(ui, |ui: &mut Ui| {
                    for group in START_GROUPS {
                        ui.selectable_value(&mut histogram_group, group, group.to_string());
                    }
                });
        });
        charts::group_histogram(
            ui,
            state.selection.histogram_group,
            &view.group_histogram,
            view.colors.color_for(state.selection.histogram_group),
        );
    });

    ui.separator();
    charts::split_mean_table(ui, &view.split_means);

    for (slot, change) in ridge_changes.into_iter().enumerate() {
        if let Some(column) = change {
            log::debug!("Ridgeline {slot} column changed to {column}");
            state.set_ridge_column(slot, column);
        }
    }
    if histogram_group != state.selection.histogram_group {
        state.set_histogram_group(histogram_group);
    }
}
