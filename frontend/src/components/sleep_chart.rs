use chrono::{Duration, NaiveDate};
use plotters::prelude::*;
use plotters_canvas::CanvasBackend;
use shared::analytics::{sleep_hours_per_day, TimeRange};
use shared::models::SleepLog;
use web_sys::HtmlCanvasElement;
use yew::prelude::*;

use crate::services::date_utils::today;

/// Hours slept on each of the `range` days ending `today`, zero-filled.
pub(crate) fn daily_series(logs: &[SleepLog], range: TimeRange, today: NaiveDate) -> Vec<(NaiveDate, f64)> {
    let per_day = sleep_hours_per_day(logs);
    (0..range.days())
        .rev()
        .map(|back| today - Duration::days(back))
        .map(|day| (day, per_day.get(&day).copied().unwrap_or(0.0)))
        .collect()
}

#[derive(Properties, PartialEq)]
pub struct SleepChartProps {
    pub logs: Vec<SleepLog>,
    pub loading: bool,
}

pub enum Msg {
    SetRange(TimeRange),
}

pub struct SleepChart {
    canvas_ref: NodeRef,
    selected_range: TimeRange,
}

impl Component for SleepChart {
    type Message = Msg;
    type Properties = SleepChartProps;

    fn create(_ctx: &Context<Self>) -> Self {
        Self {
            canvas_ref: NodeRef::default(),
            selected_range: TimeRange::Week,
        }
    }

    fn update(&mut self, _ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Msg::SetRange(range) => {
                self.selected_range = range;
                true
            }
        }
    }

    fn rendered(&mut self, ctx: &Context<Self>, _first_render: bool) {
        if !ctx.props().logs.is_empty() {
            self.draw_chart(&ctx.props().logs);
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let link = ctx.link();
        let props = ctx.props();

        html! {
            <div class="chart-container">
                <div class="chart-title-header">
                    <h3 class="chart-title">{"Hours Slept Per Day"}</h3>
                    <div class="chart-range-selector">
                        {for TimeRange::ALL.iter().map(|range| {
                            let range = *range;
                            let classes = if range == self.selected_range {
                                "range-button active"
                            } else {
                                "range-button"
                            };
                            html! {
                                <button class={classes} onclick={link.callback(move |_| Msg::SetRange(range))}>
                                    {range.label()}
                                </button>
                            }
                        })}
                    </div>
                </div>

                {if props.logs.is_empty() && props.loading {
                    html! {
                        <div class="chart-loading">
                            <div class="loading-spinner"></div>
                            <p>{"Loading chart data..."}</p>
                        </div>
                    }
                } else if props.logs.is_empty() {
                    html! {
                        <div class="chart-empty">
                            <p>{"No sleep logged yet"}</p>
                        </div>
                    }
                } else {
                    html! {
                        <div class="chart-content">
                            <canvas ref={self.canvas_ref.clone()} class="sleep-chart-canvas" width="800" height="320"></canvas>
                        </div>
                    }
                }}
            </div>
        }
    }
}

impl SleepChart {
    fn draw_chart(&self, logs: &[SleepLog]) {
        let canvas = match self.canvas_ref.cast::<HtmlCanvasElement>() {
            Some(canvas) => canvas,
            None => return,
        };
        canvas.set_width(800);
        canvas.set_height(320);

        let backend = match CanvasBackend::with_canvas_object(canvas) {
            Some(backend) => backend,
            None => return,
        };
        let root = backend.into_drawing_area();
        if root.fill(&WHITE).is_err() {
            return;
        }

        let series = daily_series(logs, self.selected_range, today());
        let max_hours = series.iter().map(|(_, hours)| *hours).fold(0.0, f64::max);
        let y_max = (max_hours * 1.1).max(1.0);
        let days = series.len() as i32;

        let mut chart = match ChartBuilder::on(&root)
            .margin(15)
            .x_label_area_size(40)
            .y_label_area_size(50)
            .build_cartesian_2d(0..days, 0.0..y_max)
        {
            Ok(chart) => chart,
            Err(_) => return,
        };

        let label_for = |index: &i32| {
            series
                .get(*index as usize)
                .map(|(day, _)| day.format("%m/%d").to_string())
                .unwrap_or_default()
        };

        if chart
            .configure_mesh()
            .y_desc("Hours")
            .x_label_formatter(&label_for)
            .y_label_formatter(&|v| format!("{:.0}h", v))
            .label_style(("sans-serif", 12, &RGBColor(102, 126, 234)))
            .axis_style(RGBColor(230, 230, 230))
            .light_line_style(RGBColor(250, 250, 250))
            .x_labels(7)
            .draw()
            .is_err()
        {
            return;
        }

        let bar_color = RGBColor(118, 75, 162);
        if chart
            .draw_series(series.iter().enumerate().map(|(index, (_, hours))| {
                let x = index as i32;
                Rectangle::new([(x, 0.0), (x + 1, *hours)], bar_color.mix(0.8).filled())
            }))
            .is_err()
        {
            return;
        }

        let _ = root.present();
    }
}
