use std::f32::consts::{FRAC_PI_2, TAU};

use eframe::egui::{self, Align2, Color32, Pos2, RichText, Sense, Shape, Stroke, Ui, Vec2};
use egui_extras::{Column, TableBuilder};
use egui_plot::{
    Bar, BarChart, BoxElem, BoxPlot, BoxSpread, Legend, Line, Plot, PlotPoint, PlotPoints,
    Points, Text,
};

use crate::color::{GroupColors, generate_palette, mean_time_fill};
use crate::stats::boxplot::BoxStats;
use crate::stats::counts::{GroupCount, StatusCount};
use crate::stats::histogram::GroupHistogram;
use crate::stats::ridgeline::Ridgeline;
use crate::stats::splits::SplitMeanTable;
use crate::stats::trend::TrendSeries;
use crate::stats::BinCount;

const CHART_HEIGHT: f32 = 240.0;

/// Vertical distance between ridgeline baselines.
const RIDGE_STEP: f64 = 1.0;
/// How far a band may reach into the band above, in steps.
const RIDGE_OVERLAP: f64 = 1.0;

fn placeholder(ui: &mut Ui, text: &str) {
    ui.add_sized(
        [ui.available_width(), CHART_HEIGHT],
        egui::Label::new(RichText::new(text).weak()),
    );
}

// ---------------------------------------------------------------------------
// Overview
// ---------------------------------------------------------------------------

/// Mean finish time per start group over the years.
pub fn mean_time_trend(ui: &mut Ui, series: &[TrendSeries], colors: &GroupColors) {
    ui.strong("Medeltid per startled");
    if series.is_empty() {
        placeholder(ui, "No yearly means available");
        return;
    }

    Plot::new("mean_time_trend")
        .legend(Legend::default())
        .height(CHART_HEIGHT * 1.5)
        .y_axis_label("Tid (h)")
        .show(ui, |plot_ui| {
            for s in series {
                let color = colors.color_for(s.start_group);
                let name = format!("Startled {}", s.start_group);
                let coords: Vec<[f64; 2]> = s
                    .points
                    .iter()
                    .map(|&(year, mean)| [year as f64, mean])
                    .collect();
                let line: PlotPoints = coords.iter().copied().collect();
                let dots: PlotPoints = coords.into_iter().collect();
                plot_ui.line(Line::new(line).color(color).name(&name));
                plot_ui.points(Points::new(dots).radius(3.0).color(color).name(&name));
            }
        });
}

// ---------------------------------------------------------------------------
// Year page
// ---------------------------------------------------------------------------

/// Registered participants per start group.
pub fn start_group_bars(ui: &mut Ui, counts: &[GroupCount], colors: &GroupColors) {
    ui.strong("Anmälda per led");
    if counts.is_empty() {
        placeholder(ui, "No participants");
        return;
    }

    let bars: Vec<Bar> = counts
        .iter()
        .map(|c| {
            Bar::new(c.start_group as f64, c.count as f64)
                .width(0.8)
                .fill(colors.color_for(c.start_group))
                .name(format!("Startled {}", c.start_group))
        })
        .collect();

    Plot::new("start_group_bars")
        .height(CHART_HEIGHT)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars));
        });
}

/// Share of participants per race status as a donut.
pub fn status_donut(ui: &mut Ui, counts: &[StatusCount]) {
    ui.strong("Anmälda per status");
    let total: usize = counts.iter().map(|c| c.count).sum();
    if total == 0 {
        placeholder(ui, "No participants");
        return;
    }

    let colors = generate_palette(counts.len());
    let side = ui.available_width().min(CHART_HEIGHT);
    let (response, painter) = ui.allocate_painter(Vec2::splat(side), Sense::hover());
    let center = response.rect.center();
    let outer = side / 2.0 - 4.0;
    let inner = outer * 0.5;

    let mut start = -FRAC_PI_2;
    for (c, &color) in counts.iter().zip(&colors) {
        let sweep = TAU * c.count as f32 / total as f32;
        // Thin wedge segments so every piece stays convex.
        let steps = ((sweep / 0.05).ceil() as usize).max(1);
        for i in 0..steps {
            let a0 = start + sweep * i as f32 / steps as f32;
            let a1 = start + sweep * (i + 1) as f32 / steps as f32;
            let quad = vec![
                polar(center, outer, a0),
                polar(center, outer, a1),
                polar(center, inner, a1),
                polar(center, inner, a0),
            ];
            painter.add(Shape::convex_polygon(quad, color, Stroke::NONE));
        }
        start += sweep;
    }
    painter.text(
        center,
        Align2::CENTER_CENTER,
        total.to_string(),
        egui::FontId::proportional(16.0),
        ui.visuals().text_color(),
    );

    for (c, &color) in counts.iter().zip(&colors) {
        ui.horizontal(|ui: &mut Ui| {
            ui.colored_label(color, "■");
            ui.label(format!("{}: {}", c.status, c.count));
        });
    }
}

fn polar(center: Pos2, radius: f32, angle: f32) -> Pos2 {
    center + radius * Vec2::angled(angle)
}

/// Finish-time histograms of all start groups overlaid.
pub fn layered_histogram(
    ui: &mut Ui,
    histograms: &[GroupHistogram],
    colors: &GroupColors,
    bin_width: f64,
) {
    ui.strong("Fördelning sluttid per startgrupp");
    if histograms.is_empty() {
        placeholder(ui, "No finish times");
        return;
    }

    Plot::new("layered_histogram")
        .height(CHART_HEIGHT)
        .legend(Legend::default())
        .x_axis_label("Tid (h)")
        .show(ui, |plot_ui| {
            for hist in histograms {
                let color = colors.color_for(hist.start_group).gamma_multiply(0.3);
                plot_ui.bar_chart(
                    BarChart::new(histogram_bars(&hist.bins, bin_width, color))
                        .color(color)
                        .name(format!("Startled {}", hist.start_group)),
                );
            }
        });
}

/// Finish-time histogram of one start group.
pub fn group_histogram(ui: &mut Ui, start_group: i64, bins: &[BinCount], color: Color32) {
    if bins.is_empty() {
        placeholder(ui, &format!("No finish times in start group {start_group}"));
        return;
    }
    let width = bins[0].end - bins[0].start;

    Plot::new("group_histogram")
        .height(CHART_HEIGHT)
        .x_axis_label("Tid (h)")
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(
                BarChart::new(histogram_bars(bins, width, color.gamma_multiply(0.6)))
                    .color(color)
                    .name(format!("Startled {start_group}")),
            );
        });
}

fn histogram_bars(bins: &[BinCount], width: f64, fill: Color32) -> Vec<Bar> {
    bins.iter()
        .map(|b| {
            Bar::new(b.center(), b.count as f64)
                .width(width)
                .fill(fill)
                .stroke(Stroke::NONE)
        })
        .collect()
}

/// One stacked density band per start group, filled by the group's mean.
pub fn ridgeline_chart(ui: &mut Ui, id: &str, ridgeline: &Ridgeline, fill_domain: [f64; 2]) {
    ui.strong(format!("Snittid per startgrupp – {}", ridgeline.column));
    if ridgeline.is_empty() {
        placeholder(ui, "No recorded times");
        return;
    }

    let max = ridgeline.max_count().max(1) as f64;
    let n = ridgeline.bands.len();
    let x_min = ridgeline
        .bands
        .first()
        .and_then(|b| b.bins.first())
        .map(|b| b.start)
        .unwrap_or(0.0);

    Plot::new(id)
        .height((n as f32 * 28.0).max(CHART_HEIGHT))
        .show_axes([true, false])
        .show_y(false)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .x_axis_label("Tid (h)")
        .show(ui, |plot_ui| {
            // Top band first so lower bands overlap it.
            for (i, band) in ridgeline.bands.iter().enumerate() {
                let base = (n - 1 - i) as f64 * RIDGE_STEP;
                let scale = RIDGE_STEP * (1.0 + RIDGE_OVERLAP) / max;
                let fill = mean_time_fill(band.mean, fill_domain);
                let width = band.bins.first().map(|b| b.end - b.start).unwrap_or(0.0);

                let bars: Vec<Bar> = band
                    .bins
                    .iter()
                    .map(|b| {
                        Bar::new(b.center(), b.count as f64 * scale)
                            .base_offset(base)
                            .width(width)
                            .fill(fill)
                            .stroke(Stroke::NONE)
                    })
                    .collect();
                plot_ui.bar_chart(BarChart::new(bars).color(fill));

                let outline: PlotPoints = band
                    .bins
                    .iter()
                    .map(|b| [b.center(), base + b.count as f64 * scale])
                    .collect();
                plot_ui.line(Line::new(outline).color(Color32::LIGHT_GRAY).width(0.5));

                plot_ui.text(
                    Text::new(
                        PlotPoint::new(x_min, base),
                        RichText::new(band.start_group.to_string()).small(),
                    )
                    .anchor(Align2::RIGHT_BOTTOM),
                );
            }
        });
}

/// Finish-time spread per start group, whiskers at min and max.
pub fn group_box_plot(ui: &mut Ui, stats: &[BoxStats], colors: &GroupColors) {
    ui.strong("Sluttid per startled");
    if stats.is_empty() {
        placeholder(ui, "No finish times");
        return;
    }

    let boxes: Vec<BoxElem> = stats
        .iter()
        .map(|s| {
            let color = colors.color_for(s.start_group);
            BoxElem::new(
                s.start_group as f64,
                BoxSpread::new(s.min, s.q1, s.median, s.q3, s.max),
            )
            .name(format!("Startled {}", s.start_group))
            .fill(color.gamma_multiply(0.4))
            .stroke(Stroke::new(1.5, color))
        })
        .collect();

    Plot::new("group_box_plot")
        .height(CHART_HEIGHT)
        .y_axis_label("Tid (h)")
        .show(ui, |plot_ui| {
            plot_ui.box_plot(BoxPlot::new(boxes));
        });
}

/// Mean time at every checkpoint per start group, as clock strings.
pub fn split_mean_table(ui: &mut Ui, table: &SplitMeanTable) {
    ui.heading("Snittid per kontroll");
    if table.rows.is_empty() {
        ui.label(RichText::new("No participants").weak());
        return;
    }

    egui::ScrollArea::horizontal()
        .id_salt("split_mean_scroll")
        .show(ui, |ui: &mut Ui| {
            TableBuilder::new(ui)
                .striped(true)
                .column(Column::auto().at_least(70.0))
                .columns(Column::auto().at_least(80.0), table.columns.len())
                .header(20.0, |mut header| {
                    header.col(|ui| {
                        ui.strong("Startled");
                    });
                    for col in &table.columns {
                        header.col(|ui| {
                            ui.strong(col.label());
                        });
                    }
                })
                .body(|mut body| {
                    for row in &table.rows {
                        body.row(18.0, |mut tr| {
                            tr.col(|ui| {
                                ui.label(row.start_group.to_string());
                            });
                            for clock in row.clock_strings() {
                                tr.col(|ui| {
                                    ui.monospace(clock);
                                });
                            }
                        });
                    }
                });
        });
}
