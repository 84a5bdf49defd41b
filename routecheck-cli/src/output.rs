use chrono::Local;
use routecheck_core::{LocationReport, RouteEvaluation};

pub fn render_route(result: &RouteEvaluation) -> String {
    let checked_at = result.evaluated_at.with_timezone(&Local);
    let mut out = format!(
        "Weather along the route (checked {})\n\n",
        checked_at.format("%Y-%m-%d %H:%M")
    );
    out.push_str(&render_location(&result.start));
    out.push('\n');
    out.push_str(&render_location(&result.end));
    out.push('\n');

    let summary = match (result.start_verdict(), result.end_verdict()) {
        (false, false) => "Good conditions at both ends of the route.",
        (true, false) => "Bad weather at the start point.",
        (false, true) => "Bad weather at the end point.",
        (true, true) => "Bad weather at both ends of the route.",
    };
    out.push_str(summary);
    out.push('\n');

    out
}

pub fn render_location(report: &LocationReport) -> String {
    let p = &report.params;
    let status = if report.adverse { "BAD" } else { "OK" };

    let mut out = format!(
        "{} ({:.4}, {:.4}): {status}\n",
        report.place, report.coordinates.latitude, report.coordinates.longitude
    );
    out.push_str(&format!("  temperature:   {:.1} °C\n", p.temperature));
    out.push_str(&format!("  wind:          {:.1} km/h\n", p.wind_speed));
    out.push_str(&format!(
        "  precipitation: {:.0}%\n",
        p.precipitation_probability
    ));
    out.push_str(&format!("  humidity:      {:.0}%\n", p.humidity));

    for reason in &report.reasons {
        out.push_str(&format!("  ! {reason}\n"));
    }

    out
}
