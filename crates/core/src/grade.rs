//! Free-text grade parsing.
//!
//! Trainers enter grades as letters ("A-"), fractions ("18/20") or plain
//! numbers. Aggregation maps them to a 0..=100 point scale and skips
//! anything it cannot read.

/// Map a free-text grade to points on a 0..=100 scale.
///
/// Letter grades use a fixed map; otherwise the first number in the string
/// is taken, rejected when above 100. Returns None for unreadable input so
/// callers can exclude (and log) the record instead of failing the read.
pub fn grade_to_points(grade: &str) -> Option<f32> {
    let trimmed = grade.trim();
    if trimmed.is_empty() {
        return None;
    }

    let points = match trimmed.to_uppercase().as_str() {
        "A+" => Some(100.0),
        "A" => Some(95.0),
        "A-" => Some(90.0),
        "B+" => Some(85.0),
        "B" => Some(80.0),
        "B-" => Some(75.0),
        "C" => Some(70.0),
        "D" => Some(60.0),
        "F" => Some(0.0),
        _ => None,
    };
    if points.is_some() {
        return points;
    }

    let re = regex::Regex::new(r"(\d+(\.\d+)?)").ok()?;
    let value: f32 = re.captures(trimmed)?.get(1)?.as_str().parse().ok()?;
    if value <= 100.0 {
        Some(value)
    } else {
        None
    }
}
