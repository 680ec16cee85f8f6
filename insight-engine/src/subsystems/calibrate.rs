//! Developmental calibration
//!
//! Younger students verbalize confusion as a normal part of learning, older
//! students tend to go quiet, so the same raw composite is scaled by the
//! student's developmental stage. Grade level takes precedence over age;
//! anything unrecognized falls back to the middle-school reference point.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DevelopmentalPersona {
    /// Kindergarten to grade 2, ages up to 7.
    EarlyElementary,
    /// Grades 3 to 5, ages 8 to 10.
    LateElementary,
    /// Grades 6 to 8, ages 11 to 13.
    MiddleSchool,
    /// Grade 9 and above, ages 14 and above.
    HighSchool,
}

impl DevelopmentalPersona {
    pub fn multiplier(&self) -> f64 {
        match self {
            DevelopmentalPersona::EarlyElementary => 0.70,
            DevelopmentalPersona::LateElementary => 0.85,
            DevelopmentalPersona::MiddleSchool => 1.00,
            DevelopmentalPersona::HighSchool => 1.20,
        }
    }

    pub fn from_grade(grade: u32) -> Self {
        match grade {
            0..=2 => DevelopmentalPersona::EarlyElementary,
            3..=5 => DevelopmentalPersona::LateElementary,
            6..=8 => DevelopmentalPersona::MiddleSchool,
            _ => DevelopmentalPersona::HighSchool,
        }
    }

    pub fn from_age(age: i32) -> Option<Self> {
        match age {
            i32::MIN..=2 => None,
            3..=7 => Some(DevelopmentalPersona::EarlyElementary),
            8..=10 => Some(DevelopmentalPersona::LateElementary),
            11..=13 => Some(DevelopmentalPersona::MiddleSchool),
            _ => Some(DevelopmentalPersona::HighSchool),
        }
    }

    pub fn resolve(age: Option<i32>, grade_level: Option<&str>) -> Option<Self> {
        grade_level
            .and_then(parse_grade)
            .map(Self::from_grade)
            .or_else(|| age.and_then(Self::from_age))
    }
}

/// Multiplier applied to the raw composite; 1.0 when nothing is known.
pub fn developmental_multiplier(age: Option<i32>, grade_level: Option<&str>) -> f64 {
    DevelopmentalPersona::resolve(age, grade_level)
        .map(|p| p.multiplier())
        .unwrap_or(1.0)
}

/// Parses grade labels such as "K", "3", "5th", "Grade 10", "10th grade", "college".
fn parse_grade(raw: &str) -> Option<u32> {
    let label = raw.trim().to_lowercase();
    match label.as_str() {
        "" => return None,
        "k" | "tk" | "pk" | "pre-k" | "prek" | "kindergarten" => return Some(0),
        "college" | "university" | "undergraduate" | "adult" => return Some(13),
        _ => {}
    }

    let digits: String = label
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();

    match digits.parse::<u32>() {
        Ok(grade) if grade <= 16 => Some(grade),
        _ => None,
    }
}
