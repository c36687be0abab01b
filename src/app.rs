use eframe::egui;

use crate::state::AppState;
use crate::ui::panels;

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct TitanicApp {
    pub state: AppState,
}

impl TitanicApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for TitanicApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        let Some(session) = self.state.session.as_mut() else {
            egui::CentralPanel::default().show(ctx, |ui| {
                panels::load_failure(ui, &mut self.state);
            });
            return;
        };

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::filter_panel(ui, &mut session.widgets);
            });

        // ---- Central panel: the report ----
        let selection = session.widgets.selection();
        let dataset = session.dataset.clone();
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    panels::report(ui, &self.state, &dataset, &selection);
                });
        });
    }
}
