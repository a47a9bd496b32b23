use std::sync::Arc;

use crate::color::GroupColors;
use crate::config::DashboardConfig;
use crate::data::model::{RaceTable, TimeColumn};
use crate::data::DataStore;
use crate::stats::boxplot::{BoxStats, group_box_stats};
use crate::stats::counts::{GroupCount, StatusCount, start_group_counts, status_counts};
use crate::stats::histogram::{GroupHistogram, group_histogram, layered_histogram};
use crate::stats::ridgeline::{Ridgeline, ridgeline};
use crate::stats::splits::{SplitMeanTable, split_means};
use crate::stats::trend::{TrendSeries, trend_series};
use crate::stats::{BinCount, Binning};

// ---------------------------------------------------------------------------
// Pages
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Page {
    /// Mean time per start group across all years.
    #[default]
    Overview,
    /// Detail charts for the selected year.
    Year,
}

impl Page {
    pub const ALL: [Page; 2] = [Page::Overview, Page::Year];

    pub fn label(self) -> &'static str {
        match self {
            Page::Overview => "Sammanfattning",
            Page::Year => "Per år",
        }
    }
}

// ---------------------------------------------------------------------------
// YearView – every aggregate shown on the year page
// ---------------------------------------------------------------------------

/// Aggregates of one year's table for the current selection.
pub struct YearView {
    pub year: i32,
    pub table: Arc<RaceTable>,
    pub group_counts: Vec<GroupCount>,
    pub status_counts: Vec<StatusCount>,
    pub layered_histogram: Vec<GroupHistogram>,
    pub group_histogram: Vec<BinCount>,
    pub ridgelines: [Ridgeline; 2],
    pub box_stats: Vec<BoxStats>,
    pub split_means: SplitMeanTable,
    pub colors: GroupColors,
}

impl YearView {
    fn build(year: i32, table: Arc<RaceTable>, selection: &Selection, config: &DashboardConfig) -> Self {
        let group_counts = start_group_counts(&table);
        let colors = GroupColors::new(group_counts.iter().map(|c| c.start_group));
        YearView {
            year,
            status_counts: status_counts(&table),
            layered_histogram: layered_histogram(&table, config.histogram_bin_width),
            group_histogram: group_histogram(
                &table,
                selection.histogram_group,
                group_binning(config),
            ),
            ridgelines: selection
                .ridge_columns
                .map(|col| ridgeline(&table, col, config.ridgeline_bin_width)),
            box_stats: group_box_stats(&table),
            split_means: split_means(&table),
            group_counts,
            colors,
            table,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

fn group_binning(config: &DashboardConfig) -> Binning {
    Binning::new(config.group_histogram_anchor, config.group_histogram_step)
}

/// Selector values of the year page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Selection {
    pub ridge_columns: [TimeColumn; 2],
    pub histogram_group: i64,
}

impl Default for Selection {
    fn default() -> Self {
        Selection {
            ridge_columns: [TimeColumn::SELECTABLE[0], TimeColumn::SELECTABLE[1]],
            histogram_group: 0,
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub store: Arc<DataStore>,
    pub config: DashboardConfig,

    pub page: Page,

    /// Years offered by the selector, most recent first.
    pub years: Vec<i32>,
    pub selected_year: Option<i32>,
    pub selection: Selection,

    /// Aggregates for `selected_year` (None until a year is loaded).
    pub year_view: Option<YearView>,

    /// Series of the overview page.
    pub trend: Vec<TrendSeries>,
    pub trend_colors: GroupColors,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(store: Arc<DataStore>, config: DashboardConfig) -> Self {
        Self {
            store,
            config,
            page: Page::default(),
            years: Vec::new(),
            selected_year: None,
            selection: Selection::default(),
            year_view: None,
            trend: Vec::new(),
            trend_colors: GroupColors::default(),
            status_message: None,
        }
    }

    /// Load everything shown at start-up: the year list (selecting the most
    /// recent year) and the overview series.
    pub fn initialise(&mut self) {
        self.status_message = None;

        match self.store.load_yearly_means() {
            Ok(means) => {
                self.trend = trend_series(&means);
                self.trend_colors = GroupColors::new(self.trend.iter().map(|s| s.start_group));
            }
            Err(e) => self.report(e),
        }

        match self.store.available_years() {
            Ok(years) => {
                self.years = years.as_ref().clone();
                let latest = self.years.first().copied();
                if let Some(year) = latest {
                    self.select_year(year);
                }
            }
            Err(e) => self.report(e),
        }
    }

    /// Switch the year page to `year` and rebuild its aggregates.
    pub fn select_year(&mut self, year: i32) {
        self.selected_year = Some(year);
        match self.store.frame_for_year(year) {
            Ok(table) => {
                self.year_view = Some(YearView::build(year, table, &self.selection, &self.config));
            }
            Err(e) => {
                self.year_view = None;
                self.report(e);
            }
        }
    }

    /// Change one of the two ridgeline columns; only that ridgeline is
    /// recomputed.
    pub fn set_ridge_column(&mut self, slot: usize, column: TimeColumn) {
        let Some(current) = self.selection.ridge_columns.get_mut(slot) else {
            return;
        };
        if *current == column {
            return;
        }
        *current = column;
        if let Some(view) = &mut self.year_view {
            view.ridgelines[slot] = ridgeline(&view.table, column, self.config.ridgeline_bin_width);
        }
    }

    /// Change the start group of the single-group histogram.
    pub fn set_histogram_group(&mut self, start_group: i64) {
        if self.selection.histogram_group == start_group {
            return;
        }
        self.selection.histogram_group = start_group;
        if let Some(view) = &mut self.year_view {
            view.group_histogram =
                group_histogram(&view.table, start_group, group_binning(&self.config));
        }
    }

    fn report(&mut self, err: crate::data::DataError) {
        log::error!("{err}");
        self.status_message = Some(format!("Error: {err}"));
    }
}
