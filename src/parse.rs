#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Difficulty,
    TimingPoints,
    HitObjects,
    Other,
}

/// Raw line slices of the three sections the pipeline reads.
///
/// A section runs from its `[Header]` line to the next blank line, the next
/// header, or end of file. Everything else in the file (general metadata,
/// events, colours, storyboards) is skipped without being interpreted.
#[derive(Debug, Default)]
pub struct BeatmapSections<'a> {
    pub difficulty: Vec<&'a [u8]>,
    pub timing_points: Vec<&'a [u8]>,
    pub hit_objects: Vec<&'a [u8]>,
}

#[inline(always)]
fn eq_ci(slice: &[u8], tag: &[u8]) -> bool {
    slice.len() == tag.len()
        && slice
            .iter()
            .zip(tag)
            .all(|(a, b)| a.eq_ignore_ascii_case(b))
}

fn section_of(header: &[u8]) -> Section {
    if eq_ci(header, b"[Difficulty]") {
        Section::Difficulty
    } else if eq_ci(header, b"[TimingPoints]") {
        Section::TimingPoints
    } else if eq_ci(header, b"[HitObjects]") {
        Section::HitObjects
    } else {
        Section::Other
    }
}

pub fn extract_sections(data: &[u8]) -> BeatmapSections<'_> {
    let mut sections = BeatmapSections::default();
    let mut current = None;

    for raw in data.split(|&b| b == b'\n') {
        let line = raw.strip_suffix(b"\r").unwrap_or(raw);

        // A blank (or whitespace-only) line closes the open section.
        if line.iter().all(|b| b.is_ascii_whitespace()) {
            current = None;
            continue;
        }
        if line.starts_with(b"//") {
            continue;
        }
        if line.first() == Some(&b'[') && line.last() == Some(&b']') {
            current = Some(section_of(line));
            continue;
        }

        match current {
            Some(Section::Difficulty) => sections.difficulty.push(line),
            Some(Section::TimingPoints) => sections.timing_points.push(line),
            Some(Section::HitObjects) => sections.hit_objects.push(line),
            _ => {}
        }
    }

    sections
}

/// `[Difficulty]` values the pipeline consumes.
///
/// osu! treats every missing difficulty field as 5.0; the same default
/// applies here so a truncated header still segments deterministically.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DifficultyFields {
    pub circle_size: f64,
    pub approach_rate: f64,
    pub overall_difficulty: f64,
}

impl Default for DifficultyFields {
    fn default() -> Self {
        Self {
            circle_size: 5.0,
            approach_rate: 5.0,
            overall_difficulty: 5.0,
        }
    }
}

pub fn parse_difficulty_fields(lines: &[&[u8]]) -> DifficultyFields {
    let mut fields = DifficultyFields::default();
    for line in lines {
        let Ok(s) = std::str::from_utf8(line) else {
            continue;
        };
        let Some((key, value)) = s.split_once(':') else {
            continue;
        };
        let value = value.trim();
        match key.trim() {
            "CircleSize" => fields.circle_size = value.parse().unwrap_or(fields.circle_size),
            "ApproachRate" => fields.approach_rate = value.parse().unwrap_or(fields.approach_rate),
            "OverallDifficulty" => {
                fields.overall_difficulty = value.parse().unwrap_or(fields.overall_difficulty);
            }
            _ => {}
        }
    }
    fields
}
