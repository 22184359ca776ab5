use crate::models::{HeatMap, MonthPeriod, RestaurantMetrics, RestaurantReport};
use crate::stats::{month_name, weekday_name};
use std::fmt::Write;

const CHART_WIDTH: f64 = 600.0;
const CHART_HEIGHT: f64 = 260.0;
const PADDING_X: f64 = 44.0;
const PADDING_Y: f64 = 34.0;
const CHART_TOP: f64 = 24.0;

const PALETTE: [&str; 7] = [
    "#ff6b4a", "#2f4858", "#f6ae2d", "#33658a", "#86bbd8", "#758e4f", "#c05746",
];

pub struct DashboardView<'a> {
    pub period: &'a MonthPeriod,
    pub years: &'a [i32],
    pub ranking: &'a [RestaurantMetrics],
    pub report: &'a RestaurantReport,
}

pub fn render_dashboard(view: &DashboardView<'_>) -> String {
    let report = view.report;
    let restaurant = &report.restaurant;
    let period_label = escape_html(&view.period.label());
    let mut content = String::new();

    content.push_str(&section(
        &format!("Top {} &middot; {}", view.ranking.len(), period_label),
        &ranking_table(view.ranking),
    ));

    let top_bars: Vec<(String, u64)> = view
        .ranking
        .iter()
        .map(|r| (r.name.clone(), r.orders))
        .collect();
    content.push_str(&section("Top restaurants by orders", &bar_chart(&top_bars)));

    content.push_str(&format!("<h2 class=\"restaurant\">{}</h2>", escape_html(&restaurant.name)));
    content.push_str(&stat_panel(&[
        ("Average ticket", format_money(restaurant.avg_ticket), None),
        ("Avg delivery time (min)", format_minutes(restaurant.avg_delivery_minutes), None),
        ("Avg wait time (min)", format_minutes(restaurant.avg_wait_minutes), None),
        ("Unique clients", restaurant.unique_clients.to_string(), None),
    ]));

    let heat = match &report.heat_map {
        Some(map) => heat_map_svg(map),
        None => warning("No location data for the selected month."),
    };
    content.push_str(&section(
        &format!("Client heat map &middot; {period_label}"),
        &heat,
    ));
    content.push_str(&section(
        "Payments",
        &stat_panel(&[
            ("Card", restaurant.card_payments.to_string(), None),
            ("Cash", restaurant.cash_payments.to_string(), None),
            ("Transfer", restaurant.transfer_payments.to_string(), None),
        ]),
    ));

    let comparison = &report.comparison;
    content.push_str(&stat_panel(&[
        (
            "Total orders",
            comparison.current.orders.to_string(),
            comparison.orders_delta_pct,
        ),
        (
            "Active days",
            comparison.current.active_days.to_string(),
            comparison.active_days_delta_pct,
        ),
        (
            "Average orders per day",
            format!("{:.1}", comparison.avg_per_day),
            comparison.avg_per_day_delta_pct,
        ),
    ]));

    content.push_str(&format!(
        "<section class=\"analysis\">{}{}</section>",
        text_block(&format!("Daily patterns ({})", view.period.label()), &peak_summary(report)),
        text_block("Weekly evolution", &weekly_summary(report)),
    ));

    let daily: Vec<(String, u64)> = report
        .daily
        .iter()
        .map(|d| (d.date.format("%m-%d").to_string(), d.orders))
        .collect();
    content.push_str(&section(
        &format!("Orders per day &middot; {period_label}"),
        &line_chart(&daily),
    ));

    let weekdays: Vec<(String, u64)> = report
        .weekdays
        .iter()
        .map(|w| (weekday_name(w.weekday).to_string(), w.orders))
        .collect();
    content.push_str(&section("Orders by day of week", &pie_chart(&weekdays)));

    let hourly = if report.hourly.is_empty() {
        warning("No hourly orders in the selected month.")
    } else {
        let bars: Vec<(String, u64)> = report
            .hourly
            .iter()
            .map(|h| (format!("{:02}:00", h.hour), h.orders))
            .collect();
        bar_chart(&bars)
    };
    content.push_str(&section(&format!("Orders by hour &middot; {period_label}"), &hourly));

    let months: Vec<(String, u64)> = report
        .monthly
        .iter()
        .map(|m| (m.label.clone(), m.orders))
        .collect();
    let mut monthly = bar_chart(&months);
    monthly.push_str(&monthly_table(report));
    content.push_str(&section("Orders per month and rate of change", &monthly));

    render_page(view.period, view.years, view.ranking, Some(restaurant.id), &content)
}

/// Page shown when the month has no completed orders at all.
pub fn render_empty(period: &MonthPeriod, years: &[i32]) -> String {
    let content = format!(
        "<p class=\"notice\">No data yet for {}.</p>",
        escape_html(&period.label())
    );
    render_page(period, years, &[], None, &content)
}

/// Lines describing the peak window and the absolute peak hour.
pub fn peak_summary(report: &RestaurantReport) -> Vec<String> {
    let Some(window) = &report.peak_window else {
        return vec!["Not enough data to compute peaks".to_string()];
    };
    let mut lines = vec![format!(
        "Peak activity: {:02}:00 - {:02}:00 ({:.0}% of the day's orders)",
        window.start_hour, window.end_hour, window.coverage_pct
    )];
    if let Some(peak) = &report.peak_hour {
        lines.push(format!(
            "Absolute peak hour: {:02}:00 ({} orders)",
            peak.hour, peak.orders
        ));
    }
    lines
}

pub fn weekly_summary(report: &RestaurantReport) -> Vec<String> {
    match &report.trend {
        Some(trend) => vec![
            format!(
                "Strongest week: Week {} ({} orders)",
                trend.peak_week, trend.peak_week_orders
            ),
            format!("Overall trend: {}", trend.label),
        ],
        None => vec!["No data".to_string()],
    }
}

fn render_page(
    period: &MonthPeriod,
    years: &[i32],
    ranking: &[RestaurantMetrics],
    selected: Option<i64>,
    content: &str,
) -> String {
    let year_options: String = years
        .iter()
        .map(|year| option(&year.to_string(), &year.to_string(), *year == period.year))
        .collect();
    let month_options: String = (1..=12)
        .map(|month| option(&month.to_string(), month_name(month), month == period.month))
        .collect();
    let restaurant_field = if ranking.is_empty() {
        String::new()
    } else {
        let options: String = ranking
            .iter()
            .map(|r| option(&r.id.to_string(), &r.name, Some(r.id) == selected))
            .collect();
        format!(
            "<label>Restaurant<select name=\"restaurant\" onchange=\"this.form.submit()\">{options}</select></label>"
        )
    };

    PAGE_HTML
        .replace("{{TITLE}}", &escape_html(&period.label()))
        .replace("{{YEARS}}", &year_options)
        .replace("{{MONTHS}}", &month_options)
        .replace("{{RESTAURANTS}}", &restaurant_field)
        .replace("{{CONTENT}}", content)
}

fn option(value: &str, label: &str, selected: bool) -> String {
    let selected = if selected { " selected" } else { "" };
    format!(
        "<option value=\"{}\"{selected}>{}</option>",
        escape_html(value),
        escape_html(label)
    )
}

fn section(title: &str, body: &str) -> String {
    format!("<section class=\"card\"><h3>{title}</h3>{body}</section>")
}

fn warning(message: &str) -> String {
    format!("<p class=\"warning\">{}</p>", escape_html(message))
}

fn text_block(title: &str, lines: &[String]) -> String {
    let items: String = lines
        .iter()
        .map(|line| format!("<li>{}</li>", escape_html(line)))
        .collect();
    format!("<div><h3>{}</h3><ul>{items}</ul></div>", escape_html(title))
}

fn stat_panel(stats: &[(&str, String, Option<f64>)]) -> String {
    let mut out = String::from("<section class=\"panel\">");
    for (label, value, delta) in stats {
        let delta = match delta {
            Some(pct) => {
                let class = if *pct < 0.0 { "down" } else { "up" };
                format!("<span class=\"delta {class}\">{pct:+.1}%</span>")
            }
            None => String::new(),
        };
        let _ = write!(
            out,
            "<div class=\"stat\"><span class=\"label\">{}</span><span class=\"value\">{}</span>{delta}</div>",
            escape_html(label),
            escape_html(value)
        );
    }
    out.push_str("</section>");
    out
}

fn ranking_table(ranking: &[RestaurantMetrics]) -> String {
    let mut out = String::from(
        "<table><thead><tr><th>Restaurant</th><th>Orders</th><th>Avg ticket</th>\
         <th>Delivery (min)</th><th>Wait (min)</th><th>Card</th><th>Cash</th><th>Transfer</th>\
         </tr></thead><tbody>",
    );
    for r in ranking {
        let _ = write!(
            out,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            escape_html(&r.name),
            r.weekday_orders.iter().sum::<u64>(),
            format_money(r.avg_ticket),
            format_minutes(r.avg_delivery_minutes),
            format_minutes(r.avg_wait_minutes),
            r.card_payments,
            r.cash_payments,
            r.transfer_payments
        );
    }
    out.push_str("</tbody></table>");
    out
}

fn monthly_table(report: &RestaurantReport) -> String {
    let mut out = String::from(
        "<table><thead><tr><th>Month</th><th>Orders</th><th>Change %</th></tr></thead><tbody>",
    );
    for point in &report.monthly {
        let change = point
            .variation_pct
            .map(|pct| format!("{pct:.1}%"))
            .unwrap_or_else(|| "0.0%".to_string());
        let _ = write!(
            out,
            "<tr><td>{}</td><td>{}</td><td>{change}</td></tr>",
            escape_html(&point.label),
            point.orders
        );
    }
    out.push_str("</tbody></table>");
    out
}

fn chart_scale(values: impl Iterator<Item = u64>) -> f64 {
    let max = values.max().unwrap_or(0).max(1) as f64;
    (CHART_HEIGHT - CHART_TOP - PADDING_Y) / max
}

fn bar_chart(bars: &[(String, u64)]) -> String {
    if bars.is_empty() {
        return warning("No data");
    }
    let scale = chart_scale(bars.iter().map(|(_, v)| *v));
    let slot = (CHART_WIDTH - PADDING_X * 2.0) / bars.len() as f64;
    let bar_width = (slot * 0.7).max(1.0);
    let baseline = CHART_HEIGHT - PADDING_Y;
    let label_every = if bars.len() > 12 { 2 } else { 1 };

    let mut svg = svg_open();
    for (i, (label, value)) in bars.iter().enumerate() {
        let height = *value as f64 * scale;
        let x = PADDING_X + slot * i as f64 + (slot - bar_width) / 2.0;
        let center = x + bar_width / 2.0;
        let _ = write!(
            svg,
            "<rect class=\"chart-bar\" x=\"{x:.1}\" y=\"{:.1}\" width=\"{bar_width:.1}\" height=\"{height:.1}\" fill=\"{}\"><title>{}: {value}</title></rect>\
             <text class=\"chart-value\" x=\"{center:.1}\" y=\"{:.1}\" text-anchor=\"middle\">{value}</text>",
            baseline - height,
            PALETTE[i % PALETTE.len()],
            escape_html(label),
            baseline - height - 4.0,
        );
        if i % label_every == 0 {
            let _ = write!(
                svg,
                "<text class=\"chart-label\" x=\"{center:.1}\" y=\"{:.1}\" text-anchor=\"middle\">{}</text>",
                CHART_HEIGHT - 12.0,
                escape_html(&short_label(label))
            );
        }
    }
    let _ = write!(
        svg,
        "<line class=\"chart-axis\" x1=\"{PADDING_X}\" y1=\"{baseline}\" x2=\"{}\" y2=\"{baseline}\" />",
        CHART_WIDTH - PADDING_X
    );
    svg.push_str("</svg>");
    svg
}

fn line_chart(points: &[(String, u64)]) -> String {
    if points.is_empty() {
        return warning("No data");
    }
    let scale = chart_scale(points.iter().map(|(_, v)| *v));
    let step = if points.len() > 1 {
        (CHART_WIDTH - PADDING_X * 2.0) / (points.len() - 1) as f64
    } else {
        0.0
    };
    let x = |i: usize| PADDING_X + step * i as f64;
    let y = |v: u64| CHART_HEIGHT - PADDING_Y - v as f64 * scale;

    let path: Vec<String> = points
        .iter()
        .enumerate()
        .map(|(i, (_, v))| {
            let cmd = if i == 0 { 'M' } else { 'L' };
            format!("{cmd}{:.1},{:.1}", x(i), y(*v))
        })
        .collect();

    let mut svg = svg_open();
    let _ = write!(svg, "<path class=\"chart-line\" d=\"{}\" />", path.join(" "));
    let label_every = if points.len() > 8 { points.len().div_ceil(8) } else { 1 };
    for (i, (label, value)) in points.iter().enumerate() {
        let _ = write!(
            svg,
            "<circle class=\"chart-point\" cx=\"{:.1}\" cy=\"{:.1}\" r=\"4\"><title>{}: {value}</title></circle>",
            x(i),
            y(*value),
            escape_html(label)
        );
        if i % label_every == 0 {
            let _ = write!(
                svg,
                "<text class=\"chart-label\" x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\">{}</text>",
                x(i),
                CHART_HEIGHT - 12.0,
                escape_html(label)
            );
        }
    }
    svg.push_str("</svg>");
    svg
}

fn pie_chart(slices: &[(String, u64)]) -> String {
    let total: u64 = slices.iter().map(|(_, v)| *v).sum();
    if total == 0 {
        return warning("No data");
    }
    let (cx, cy, r) = (130.0, 130.0, 110.0);
    let mut svg = svg_open();
    let mut angle = -std::f64::consts::FRAC_PI_2;

    for (i, (label, value)) in slices.iter().enumerate() {
        if *value == 0 {
            continue;
        }
        let color = PALETTE[i % PALETTE.len()];
        let share = *value as f64 / total as f64;
        let title = format!("{}: {value} ({:.1}%)", escape_html(label), share * 100.0);
        if *value == total {
            let _ = write!(
                svg,
                "<circle cx=\"{cx}\" cy=\"{cy}\" r=\"{r}\" fill=\"{color}\"><title>{title}</title></circle>"
            );
        } else {
            let sweep = share * std::f64::consts::TAU;
            let (x1, y1) = (cx + r * angle.cos(), cy + r * angle.sin());
            angle += sweep;
            let (x2, y2) = (cx + r * angle.cos(), cy + r * angle.sin());
            let large = if sweep > std::f64::consts::PI { 1 } else { 0 };
            let _ = write!(
                svg,
                "<path d=\"M{cx},{cy} L{x1:.2},{y1:.2} A{r},{r} 0 {large} 1 {x2:.2},{y2:.2} Z\" fill=\"{color}\"><title>{title}</title></path>"
            );
        }
        let _ = write!(
            svg,
            "<rect x=\"300\" y=\"{:.0}\" width=\"12\" height=\"12\" fill=\"{color}\" />\
             <text class=\"chart-label\" x=\"320\" y=\"{:.0}\">{title}</text>",
            30.0 + 24.0 * i as f64,
            41.0 + 24.0 * i as f64,
        );
    }
    svg.push_str("</svg>");
    svg
}

fn heat_map_svg(map: &HeatMap) -> String {
    let size = CHART_HEIGHT;
    let cell = size / map.resolution as f64;
    let max = map.max_cell.max(1) as f64;
    let mut svg = format!(
        "<svg class=\"heat\" viewBox=\"0 0 {size} {size}\" role=\"img\"><rect width=\"{size}\" height=\"{size}\" fill=\"#f8f3e6\" />"
    );
    for (index, count) in map.cells.iter().enumerate() {
        if *count == 0 {
            continue;
        }
        let row = index / map.resolution;
        let col = index % map.resolution;
        let _ = write!(
            svg,
            "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{cell:.2}\" height=\"{cell:.2}\" fill=\"#ff6b4a\" fill-opacity=\"{:.2}\"><title>{count}</title></rect>",
            col as f64 * cell,
            row as f64 * cell,
            0.15 + 0.85 * (*count as f64 / max),
        );
    }
    svg.push_str("</svg>");
    let _ = write!(
        svg,
        "<p class=\"subtitle\">{} deliveries around {:.4}, {:.4}</p>",
        map.points, map.center.lat, map.center.lon
    );
    svg
}

fn svg_open() -> String {
    format!(
        "<svg class=\"chart\" viewBox=\"0 0 {CHART_WIDTH} {CHART_HEIGHT}\" role=\"img\">"
    )
}

fn short_label(label: &str) -> String {
    const MAX: usize = 12;
    if label.chars().count() <= MAX {
        label.to_string()
    } else {
        let truncated: String = label.chars().take(MAX - 1).collect();
        format!("{truncated}…")
    }
}

fn format_money(value: Option<f64>) -> String {
    let Some(value) = value else {
        return "-".to_string();
    };
    let fixed = format!("{:.2}", value.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let mut grouped = String::new();
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    let sign = if value < 0.0 { "-" } else { "" };
    format!("{sign}${grouped}.{cents}")
}

fn format_minutes(value: Option<f64>) -> String {
    value
        .map(|minutes| format!("{minutes:.1}"))
        .unwrap_or_else(|| "-".to_string())
}

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

const PAGE_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Top 10 by Month &middot; {{TITLE}}</title>
  <style>
    @import url('https://fonts.googleapis.com/css2?family=Space+Grotesk:wght@400;500;600&family=Fraunces:wght@600&display=swap');

    :root {
      --bg-1: #f8f3e6;
      --bg-2: #f5d3a7;
      --ink: #2b2a28;
      --accent: #ff6b4a;
      --accent-2: #2f4858;
      --card: rgba(255, 255, 255, 0.86);
      --shadow: 0 24px 60px rgba(47, 72, 88, 0.18);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: radial-gradient(circle at top, var(--bg-2), transparent 60%),
        linear-gradient(135deg, var(--bg-1), #ffe9d4 60%, #f9f2e9 100%);
      color: var(--ink);
      font-family: "Space Grotesk", "Trebuchet MS", sans-serif;
      display: grid;
      grid-template-columns: 240px 1fr;
      gap: 24px;
      padding: 32px 18px 48px;
    }

    aside form {
      position: sticky;
      top: 24px;
      display: grid;
      gap: 14px;
      background: var(--card);
      border-radius: 20px;
      padding: 20px;
      box-shadow: var(--shadow);
    }

    aside label {
      display: grid;
      gap: 6px;
      font-size: 0.85rem;
      text-transform: uppercase;
      letter-spacing: 0.12em;
      color: #8b857d;
    }

    select {
      font: inherit;
      padding: 8px 10px;
      border-radius: 12px;
      border: 1px solid rgba(47, 72, 88, 0.2);
    }

    .app {
      display: grid;
      gap: 24px;
      min-width: 0;
    }

    h1, h2.restaurant {
      font-family: "Fraunces", "Georgia", serif;
      font-weight: 600;
      margin: 0;
    }

    h1 {
      font-size: clamp(2rem, 4vw, 2.8rem);
    }

    .card, .analysis {
      background: var(--card);
      border-radius: 24px;
      box-shadow: var(--shadow);
      padding: 24px;
      overflow-x: auto;
    }

    .card h3 {
      margin-top: 0;
    }

    .analysis {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(240px, 1fr));
      gap: 16px;
    }

    .panel {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(180px, 1fr));
      gap: 16px;
    }

    .stat {
      background: white;
      border-radius: 18px;
      padding: 18px;
      border: 1px solid rgba(47, 72, 88, 0.08);
      display: grid;
      gap: 8px;
    }

    .stat .label {
      font-size: 0.85rem;
      text-transform: uppercase;
      letter-spacing: 0.12em;
      color: #8b857d;
    }

    .stat .value {
      font-size: 1.7rem;
      font-weight: 600;
      color: var(--accent-2);
    }

    .delta.up {
      color: #3c8d5a;
    }

    .delta.down {
      color: var(--accent);
    }

    table {
      width: 100%;
      border-collapse: collapse;
    }

    th, td {
      padding: 8px 10px;
      text-align: right;
      border-bottom: 1px solid rgba(47, 72, 88, 0.08);
    }

    th:first-child, td:first-child {
      text-align: left;
    }

    .chart, .heat {
      width: 100%;
      max-height: 320px;
      display: block;
    }

    .heat {
      max-width: 420px;
      border-radius: 16px;
    }

    .chart-line {
      fill: none;
      stroke: var(--accent);
      stroke-width: 3;
    }

    .chart-point {
      fill: var(--accent-2);
    }

    .chart-axis {
      stroke: rgba(47, 72, 88, 0.25);
    }

    .chart-label, .chart-value {
      font-size: 11px;
      fill: #5f5c57;
    }

    .warning, .notice {
      padding: 14px 18px;
      border-radius: 14px;
      background: rgba(246, 174, 45, 0.18);
    }

    .subtitle {
      color: #5f5c57;
    }

    @media (max-width: 800px) {
      body {
        grid-template-columns: 1fr;
      }
    }
  </style>
</head>
<body>
  <aside>
    <form method="get" action="/">
      <label>Year<select name="year" onchange="this.form.submit()">{{YEARS}}</select></label>
      <label>Month<select name="month" onchange="this.form.submit()">{{MONTHS}}</select></label>
      {{RESTAURANTS}}
      <noscript><button type="submit">Show</button></noscript>
    </form>
  </aside>
  <main class="app">
    <header>
      <h1>Top 10 by Month</h1>
      <p class="subtitle">{{TITLE}}</p>
    </header>
    {{CONTENT}}
  </main>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DailyCount, HourlyPoint, MonthSummary, PeakWindow, TrendLabel, TrendResult};
    use crate::stats::compare_periods;
    use chrono::NaiveDate;

    fn metrics(name: &str) -> RestaurantMetrics {
        RestaurantMetrics {
            id: 7,
            name: name.to_string(),
            orders: 12,
            unique_clients: 5,
            avg_ticket: Some(1234.5),
            avg_delivery_minutes: Some(18.25),
            avg_wait_minutes: None,
            card_payments: 6,
            cash_payments: 4,
            transfer_payments: 2,
            weekday_orders: [2, 2, 2, 2, 2, 1, 1],
        }
    }

    fn report(name: &str) -> RestaurantReport {
        let restaurant = metrics(name);
        RestaurantReport {
            period: MonthPeriod::new(2025, 3).unwrap(),
            weekdays: crate::stats::weekday_distribution(&restaurant),
            restaurant,
            comparison: compare_periods(
                MonthSummary {
                    orders: 12,
                    active_days: 4,
                    credits: 0.0,
                },
                MonthSummary::default(),
            ),
            hourly: vec![HourlyPoint { hour: 12, orders: 12 }],
            peak_window: Some(PeakWindow {
                start_hour: 12,
                end_hour: 13,
                coverage_pct: 87.5,
                total_orders: 40,
            }),
            peak_hour: Some(HourlyPoint { hour: 12, orders: 20 }),
            trend: Some(TrendResult {
                peak_week: 11,
                peak_week_orders: 20,
                label: TrendLabel::Growth,
            }),
            daily: vec![DailyCount {
                date: NaiveDate::from_ymd_opt(2025, 3, 3).unwrap(),
                orders: 12,
            }],
            monthly: Vec::new(),
            heat_map: None,
        }
    }

    #[test]
    fn peak_summary_formats_window() {
        let lines = peak_summary(&report("Cafe"));
        assert_eq!(lines[0], "Peak activity: 12:00 - 13:00 (88% of the day's orders)");
        assert_eq!(lines[1], "Absolute peak hour: 12:00 (20 orders)");
    }

    #[test]
    fn missing_analysis_reads_as_insufficient_data() {
        let mut report = report("Cafe");
        report.peak_window = None;
        report.trend = None;
        assert_eq!(peak_summary(&report), vec!["Not enough data to compute peaks"]);
        assert_eq!(weekly_summary(&report), vec!["No data"]);
    }

    #[test]
    fn weekly_summary_names_trend() {
        let lines = weekly_summary(&report("Cafe"));
        assert_eq!(lines[0], "Strongest week: Week 11 (20 orders)");
        assert_eq!(lines[1], "Overall trend: Growth");
    }

    #[test]
    fn dashboard_escapes_store_text() {
        let report = report("<script>alert(1)</script>");
        let ranking = vec![report.restaurant.clone()];
        let html = render_dashboard(&DashboardView {
            period: &report.period,
            years: &[2024, 2025],
            ranking: &ranking,
            report: &report,
        });
        assert!(!html.contains("<script>alert"));
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(html.contains("<option value=\"2025\" selected>2025</option>"));
        assert!(html.contains("<option value=\"3\" selected>March</option>"));
        assert!(html.contains("No location data for the selected month."));
        assert!(html.contains("$1,234.50"));
    }

    #[test]
    fn empty_page_mentions_month() {
        let period = MonthPeriod::new(2024, 11).unwrap();
        let html = render_empty(&period, &[2024]);
        assert!(html.contains("No data yet for November 2024."));
        assert!(!html.contains("name=\"restaurant\""));
    }

    #[test]
    fn money_groups_thousands() {
        assert_eq!(format_money(Some(0.5)), "$0.50");
        assert_eq!(format_money(Some(1234567.891)), "$1,234,567.89");
        assert_eq!(format_money(None), "-");
    }

    #[test]
    fn single_slice_pie_draws_full_circle() {
        let svg = pie_chart(&[("Monday".to_string(), 3), ("Tuesday".to_string(), 0)]);
        assert!(svg.contains("<circle"));
        assert!(!svg.contains("Tuesday"));
    }
}
