use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fmt;

pub const MIN_YEAR: u32 = 1970;
pub const MAX_YEAR: u32 = 2099;

static MONTH_ALIASES: Lazy<HashMap<&'static str, u32>> = Lazy::new(|| {
    [
        "JAN", "FEB", "MAR", "APR", "MAY", "JUN", "JUL", "AUG", "SEP", "OCT", "NOV", "DEC",
    ]
    .iter()
    .zip(1..)
    .map(|(name, n)| (*name, n))
    .collect()
});

static DAY_OF_WEEK_ALIASES: Lazy<HashMap<&'static str, u32>> = Lazy::new(|| {
    ["SUN", "MON", "TUE", "WED", "THU", "FRI", "SAT"]
        .iter()
        .zip(0..)
        .map(|(name, n)| (*name, n))
        .collect()
});

/// One of the seven positions of a schedule expression, finest first.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, PartialOrd, Ord)]
pub enum Field {
    Seconds,
    Minutes,
    Hours,
    DaysOfMonth,
    Months,
    DaysOfWeek,
    Years,
}

impl Field {
    pub const ALL: [Field; 7] = [
        Field::Seconds,
        Field::Minutes,
        Field::Hours,
        Field::DaysOfMonth,
        Field::Months,
        Field::DaysOfWeek,
        Field::Years,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn spec(self) -> &'static FieldSpec {
        &FIELDS[self.index()]
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::Seconds => "seconds",
            Field::Minutes => "minutes",
            Field::Hours => "hours",
            Field::DaysOfMonth => "day of month",
            Field::Months => "month",
            Field::DaysOfWeek => "day of week",
            Field::Years => "year",
        };
        f.write_str(name)
    }
}

/// Static description of a schedule field.
#[derive(Debug)]
pub struct FieldSpec {
    pub min: u32,
    pub max: u32,
    /// Text used when the field is omitted from an expression.
    pub default_text: &'static str,
    aliases: Option<&'static Lazy<HashMap<&'static str, u32>>>,
    /// Day of week only: 7 is folded onto 0 (Sunday).
    pub wrap: bool,
}

impl FieldSpec {
    pub fn alias(&self, name: &str) -> Option<u32> {
        self.aliases.and_then(|table| table.get(name).copied())
    }
}

static FIELDS: [FieldSpec; 7] = [
    FieldSpec {
        min: 0,
        max: 59,
        default_text: "0",
        aliases: None,
        wrap: false,
    },
    FieldSpec {
        min: 0,
        max: 59,
        default_text: "0",
        aliases: None,
        wrap: false,
    },
    FieldSpec {
        min: 0,
        max: 23,
        default_text: "0",
        aliases: None,
        wrap: false,
    },
    FieldSpec {
        min: 1,
        max: 31,
        default_text: "*",
        aliases: None,
        wrap: false,
    },
    FieldSpec {
        min: 1,
        max: 12,
        default_text: "*",
        aliases: Some(&MONTH_ALIASES),
        wrap: false,
    },
    FieldSpec {
        min: 0,
        max: 6,
        default_text: "*",
        aliases: Some(&DAY_OF_WEEK_ALIASES),
        wrap: true,
    },
    FieldSpec {
        min: MIN_YEAR,
        max: MAX_YEAR,
        default_text: "*",
        aliases: None,
        wrap: false,
    },
];
