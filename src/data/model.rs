use std::fmt;

// ---------------------------------------------------------------------------
// Checkpoint – typed split columns
// ---------------------------------------------------------------------------

/// Intermediate timing stations along the course, in race order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Checkpoint {
    HogstaPunkten,
    Smagan,
    Mangsbodarna,
    Risberg,
    Evertsberg,
    Oxberg,
    Hokberg,
    Eldris,
    MoraForvarning,
}

impl Checkpoint {
    pub const COUNT: usize = 9;

    /// All checkpoints from start to finish.
    pub const ALL: [Checkpoint; Checkpoint::COUNT] = [
        Checkpoint::HogstaPunkten,
        Checkpoint::Smagan,
        Checkpoint::Mangsbodarna,
        Checkpoint::Risberg,
        Checkpoint::Evertsberg,
        Checkpoint::Oxberg,
        Checkpoint::Hokberg,
        Checkpoint::Eldris,
        Checkpoint::MoraForvarning,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Checkpoint::HogstaPunkten => "Högsta punkten",
            Checkpoint::Smagan => "Smågan",
            Checkpoint::Mangsbodarna => "Mångsbodarna",
            Checkpoint::Risberg => "Risberg",
            Checkpoint::Evertsberg => "Evertsberg",
            Checkpoint::Oxberg => "Oxberg",
            Checkpoint::Hokberg => "Hökberg",
            Checkpoint::Eldris => "Eldris",
            Checkpoint::MoraForvarning => "Mora Förvarning",
        }
    }

    /// Name of the column holding this split in the on-disk table.
    pub fn column_name(self) -> &'static str {
        match self {
            Checkpoint::HogstaPunkten => "split_Högsta punkten",
            Checkpoint::Smagan => "split_Smågan",
            Checkpoint::Mangsbodarna => "split_Mångsbodarna",
            Checkpoint::Risberg => "split_Risberg",
            Checkpoint::Evertsberg => "split_Evertsberg",
            Checkpoint::Oxberg => "split_Oxberg",
            Checkpoint::Hokberg => "split_Hökberg",
            Checkpoint::Eldris => "split_Eldris",
            Checkpoint::MoraForvarning => "split_Mora Förvarning",
        }
    }

    /// Position in [`Checkpoint::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }
}

// ---------------------------------------------------------------------------
// TimeColumn – finish time or one split
// ---------------------------------------------------------------------------

/// A numeric time column of a race record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeColumn {
    Finish,
    Split(Checkpoint),
}

impl TimeColumn {
    /// Choices offered by the ridgeline selectors: finish first, then every
    /// checkpoint up to Eldris.
    pub const SELECTABLE: [TimeColumn; 9] = [
        TimeColumn::Finish,
        TimeColumn::Split(Checkpoint::HogstaPunkten),
        TimeColumn::Split(Checkpoint::Smagan),
        TimeColumn::Split(Checkpoint::Mangsbodarna),
        TimeColumn::Split(Checkpoint::Risberg),
        TimeColumn::Split(Checkpoint::Evertsberg),
        TimeColumn::Split(Checkpoint::Oxberg),
        TimeColumn::Split(Checkpoint::Hokberg),
        TimeColumn::Split(Checkpoint::Eldris),
    ];

    /// Columns of the split-mean table: every checkpoint, then finish.
    pub fn table_columns() -> Vec<TimeColumn> {
        Checkpoint::ALL
            .iter()
            .map(|&cp| TimeColumn::Split(cp))
            .chain(std::iter::once(TimeColumn::Finish))
            .collect()
    }

    pub fn label(self) -> &'static str {
        match self {
            TimeColumn::Finish => "Mål",
            TimeColumn::Split(cp) => cp.label(),
        }
    }
}

impl fmt::Display for TimeColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// RaceStatus
// ---------------------------------------------------------------------------

/// Categorical outcome of a participant's race.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RaceStatus {
    Finished,
    DidNotFinish,
    DidNotStart,
    Disqualified,
    Other(String),
}

impl RaceStatus {
    /// Parse the status text stored in the data files.  Unknown values are
    /// kept verbatim.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "finished" | "finish" | "fin" | "ok" => RaceStatus::Finished,
            "dnf" | "did not finish" => RaceStatus::DidNotFinish,
            "dns" | "did not start" => RaceStatus::DidNotStart,
            "dsq" | "dq" | "disqualified" => RaceStatus::Disqualified,
            _ => RaceStatus::Other(trimmed.to_string()),
        }
    }
}

impl fmt::Display for RaceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RaceStatus::Finished => write!(f, "Finished"),
            RaceStatus::DidNotFinish => write!(f, "DNF"),
            RaceStatus::DidNotStart => write!(f, "DNS"),
            RaceStatus::Disqualified => write!(f, "DSQ"),
            RaceStatus::Other(s) => write!(f, "{s}"),
        }
    }
}

// ---------------------------------------------------------------------------
// RaceRecord – one participant in one year
// ---------------------------------------------------------------------------

/// Start groups that are always offered by the selectors.
pub const START_GROUPS: std::ops::RangeInclusive<i64> = 0..=10;

#[derive(Debug, Clone, PartialEq)]
pub struct RaceRecord {
    pub year: i32,
    pub start_group: i64,
    /// Finish time in hours; `None` for non-finishers.
    pub time: Option<f64>,
    pub race_status: RaceStatus,
    /// Split times in hours, indexed by [`Checkpoint::index`].
    pub splits: [Option<f64>; Checkpoint::COUNT],
}

impl RaceRecord {
    /// Value of a time column; missing and NaN values are both `None`.
    pub fn value(&self, column: TimeColumn) -> Option<f64> {
        let v = match column {
            TimeColumn::Finish => self.time,
            TimeColumn::Split(cp) => self.splits[cp.index()],
        };
        v.filter(|x| x.is_finite())
    }

    pub fn split(&self, checkpoint: Checkpoint) -> Option<f64> {
        self.value(TimeColumn::Split(checkpoint))
    }
}

// ---------------------------------------------------------------------------
// RaceTable – full dataset or one year of it
// ---------------------------------------------------------------------------

/// An immutable collection of race records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RaceTable {
    records: Vec<RaceRecord>,
}

impl RaceTable {
    pub fn new(records: Vec<RaceRecord>) -> Self {
        RaceTable { records }
    }

    pub fn records(&self) -> &[RaceRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RaceRecord> {
        self.records.iter()
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<'a> IntoIterator for &'a RaceTable {
    type Item = &'a RaceRecord;
    type IntoIter = std::slice::Iter<'a, RaceRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

// ---------------------------------------------------------------------------
// Mean-per-year table
// ---------------------------------------------------------------------------

/// Mean finish time of one start group in one year.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YearlyMean {
    pub year: i32,
    pub start_group: i64,
    pub mean_time: f64,
}

/// Aggregate keyed by (year, start_group).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct YearlyMeansTable {
    pub rows: Vec<YearlyMean>,
}

impl YearlyMeansTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
