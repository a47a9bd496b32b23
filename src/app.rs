use eframe::egui;

use crate::state::{AppState, Page};
use crate::ui::{pages, panels};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct VasalyticsApp {
    pub state: AppState,
}

impl VasalyticsApp {
    /// Wrap `state` and load the initial tables.
    pub fn new(mut state: AppState) -> Self {
        state.initialise();
        Self { state }
    }
}

impl eframe::App for VasalyticsApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: page switcher ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: year selector ----
        egui::SidePanel::left("selector_panel")
            .default_width(180.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: charts of the current page ----
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| match self.state.page {
                    Page::Overview => pages::overview_page(ui, &self.state),
                    Page::Year => pages::year_page(ui, &mut self.state),
                });
        });
    }
}
