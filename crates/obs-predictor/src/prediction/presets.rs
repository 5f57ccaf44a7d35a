use super::record::RawInputRecord;

/// Canned inputs offered by the form's demo buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuickExample {
    /// Germany, manufacturing, enterprises selling online, 2021.
    First,
    /// France, information & communication, enterprises using ICT, 2022.
    Second,
}

impl QuickExample {
    pub const ALL: [QuickExample; 2] = [QuickExample::First, QuickExample::Second];

    pub fn fields(self) -> [(&'static str, &'static str); 7] {
        match self {
            QuickExample::First => [
                ("freq", "A"),
                ("size_emp", "GE10"),
                ("nace_r2", "C"),
                ("indic_is", "E_SELL"),
                ("unit", "PC_ENT"),
                ("geo", "DE"),
                ("TIME_PERIOD", "2021"),
            ],
            QuickExample::Second => [
                ("freq", "A"),
                ("size_emp", "GE10"),
                ("nace_r2", "J"),
                ("indic_is", "PC_ENT"),
                ("unit", "PC_ENT"),
                ("geo", "FR"),
                ("TIME_PERIOD", "2022"),
            ],
        }
    }

    /// 1-based position, as shown on the demo buttons.
    pub fn number(self) -> u8 {
        match self {
            QuickExample::First => 1,
            QuickExample::Second => 2,
        }
    }

    pub fn record(self) -> RawInputRecord {
        self.fields().into_iter().collect()
    }

    pub fn label(self) -> &'static str {
        match self {
            QuickExample::First => "DE, Manufacturing, E_SELL, 2021",
            QuickExample::Second => "FR, ICT, PC_ENT, 2022",
        }
    }
}
