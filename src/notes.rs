/// A single hit object's position and timestamp, in file order.
///
/// Only consumed pairwise by [`build_intervals`]; not retained afterwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitEvent {
    pub x: f64,
    pub y: f64,
    pub time: i32,
}

/// The gap between two consecutive hit objects.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub time: i32,
    pub implied_bpm: i32,
    pub distance: f64,
    pub from: (f64, f64),
    pub to: (f64, f64),
}

impl Interval {
    fn between(a: HitEvent, b: HitEvent) -> Self {
        let dt = b.time - a.time;
        // Stacked notes imply an unbounded tempo; saturate.
        let implied_bpm = if dt > 0 {
            (60_000.0 / f64::from(dt)).round() as i32
        } else {
            i32::MAX
        };
        Self {
            time: b.time,
            implied_bpm,
            distance: (b.x - a.x).hypot(b.y - a.y),
            from: (a.x, a.y),
            to: (b.x, b.y),
        }
    }
}

fn parse_hit_event(line: &[u8]) -> Option<HitEvent> {
    let s = std::str::from_utf8(line).ok()?;
    let mut parts = s.split(',');
    let x = parts.next()?.trim().parse::<f64>().ok()?;
    let y = parts.next()?.trim().parse::<f64>().ok()?;
    let time = parts.next()?.trim().parse::<i32>().ok()?;
    Some(HitEvent { x, y, time })
}

/// Parses raw `[HitObjects]` lines into hit events.
///
/// A short or non-numeric line ends extraction: everything before it is
/// kept and everything after is dropped, matching the segmenter's terminal
/// flush. The truncation is absorbed here, never surfaced as an error.
pub fn parse_hit_events(lines: &[&[u8]]) -> Vec<HitEvent> {
    let mut events = Vec::with_capacity(lines.len());
    for line in lines {
        let Some(event) = parse_hit_event(line) else {
            log::debug!(
                "malformed hit object after {} events, truncating",
                events.len()
            );
            break;
        };
        events.push(event);
    }
    events
}

pub fn build_intervals(events: &[HitEvent]) -> Vec<Interval> {
    events
        .windows(2)
        .map(|pair| Interval::between(pair[0], pair[1]))
        .collect()
}

/// Seconds between the first and last hit object, floored.
pub fn drain_length_s(events: &[HitEvent]) -> u32 {
    match (events.first(), events.last()) {
        (Some(first), Some(last)) if last.time > first.time => {
            ((last.time - first.time) / 1000) as u32
        }
        _ => 0,
    }
}
