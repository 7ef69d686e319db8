use crate::errors::{ExpressionFault, ParseFault, ParseScheduleError, RangeFault};
use crate::field::{Field, FieldSpec};
use crate::finder::{self, ResolvedOccurrence};
use std::collections::BTreeSet;
use std::str::FromStr;
use tracing::{info, warn};

/// Literals above this are rejected, which keeps ranges over retained
/// out-of-bounds values small.
const LITERAL_CEILING: u32 = 9999;

/// Sorted, duplicate free values of one field. Never empty once built by the parser.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct MatchSet(BTreeSet<u32>);

impl MatchSet {
    pub fn contains(&self, value: u32) -> bool {
        self.0.contains(&value)
    }

    pub fn min(&self) -> Option<u32> {
        self.0.iter().next().copied()
    }

    pub fn max(&self) -> Option<u32> {
        self.0.iter().next_back().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_vec(&self) -> Vec<u32> {
        self.0.iter().copied().collect()
    }

    /// Members within `low..=high`, highest first.
    pub(crate) fn descending(&self, low: u32, high: u32) -> impl Iterator<Item = u32> + '_ {
        (low <= high)
            .then(|| self.0.range(low..=high))
            .into_iter()
            .flatten()
            .rev()
            .copied()
    }
}

impl FromIterator<u32> for MatchSet {
    fn from_iter<I: IntoIterator<Item = u32>>(iter: I) -> Self {
        MatchSet(iter.into_iter().collect())
    }
}

/// A parsed schedule expression: one [`MatchSet`] per field.
///
/// Fields are `seconds minutes hours day-of-month month day-of-week [year]`.
/// Day of month and day of week must both match for a day to qualify.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Expression {
    seconds: MatchSet,
    minutes: MatchSet,
    hours: MatchSet,
    days_of_month: MatchSet,
    months: MatchSet,
    days_of_week: MatchSet,
    years: MatchSet,
}

impl Expression {
    /// Parses leniently: malformed chunks degrade to the field minimum and are logged.
    /// ```rust
    /// use cron_countdown::{Expression, Field};
    ///
    /// let expression = Expression::parse("0 */15 9-17 * * MON-FRI");
    /// assert_eq!(vec![0, 15, 30, 45], expression.field(Field::Minutes).to_vec());
    /// assert_eq!(vec![1, 2, 3, 4, 5], expression.field(Field::DaysOfWeek).to_vec());
    /// ```
    pub fn parse(text: &str) -> Expression {
        Self::parse_with_faults(text).0
    }

    /// Same as [`Expression::parse`], also handing back every fault that was reported.
    pub fn parse_with_faults(text: &str) -> (Expression, Vec<ExpressionFault>) {
        let tokens: Vec<&str> = text.split_whitespace().collect();
        let mut faults = Vec::new();

        if tokens.len() > Field::ALL.len() {
            let fault = ParseFault::TooManyFields(tokens.len());
            warn!(expression = text, %fault, "ignoring trailing fields");
            faults.push(ExpressionFault::Parse {
                field: Field::Years,
                fault,
            });
        }

        let texts = field_texts(&tokens);
        let mut parse = |field: Field| {
            let (set, mut field_faults) = parse_field(texts[field.index()], field);
            faults.append(&mut field_faults);
            set
        };

        let expression = Expression {
            seconds: parse(Field::Seconds),
            minutes: parse(Field::Minutes),
            hours: parse(Field::Hours),
            days_of_month: parse(Field::DaysOfMonth),
            months: parse(Field::Months),
            days_of_week: parse(Field::DaysOfWeek),
            years: parse(Field::Years),
        };
        (expression, faults)
    }

    pub fn field(&self, field: Field) -> &MatchSet {
        match field {
            Field::Seconds => &self.seconds,
            Field::Minutes => &self.minutes,
            Field::Hours => &self.hours,
            Field::DaysOfMonth => &self.days_of_month,
            Field::Months => &self.months,
            Field::DaysOfWeek => &self.days_of_week,
            Field::Years => &self.years,
        }
    }

    /// See [`finder::find_last_match`].
    pub fn find_last_match(&self, reference_millis: i64) -> ResolvedOccurrence {
        finder::find_last_match(self, reference_millis)
    }
}

impl FromStr for Expression {
    type Err = ParseScheduleError;

    /// Strict parse: the first malformed chunk is an error. Out of bounds values are not.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (expression, faults) = Expression::parse_with_faults(s);
        match faults.into_iter().find_map(|fault| match fault {
            ExpressionFault::Parse { field, fault } => Some(ParseScheduleError { field, fault }),
            ExpressionFault::Range { .. } => None,
        }) {
            Some(err) => Err(err),
            None => Ok(expression),
        }
    }
}

/// Lines tokens up with fields. Six or seven tokens start at seconds; fewer are
/// right aligned against day of week and the leading fields keep their defaults.
fn field_texts<'a>(tokens: &[&'a str]) -> [&'a str; 7] {
    let mut texts: [&'a str; 7] = Field::ALL.map(|field| field.spec().default_text);
    let supplied = tokens.len().min(texts.len());
    let first = if supplied >= 6 { 0 } else { 6 - supplied };
    for (i, token) in tokens.iter().take(supplied).enumerate() {
        texts[first + i] = *token;
    }
    texts
}

pub(crate) fn parse_field(value: &str, field: Field) -> (MatchSet, Vec<ExpressionFault>) {
    let spec = field.spec();
    let mut set = BTreeSet::<u32>::new();
    let mut faults = Vec::new();

    for chunk in value.split(',') {
        match parse_chunk(chunk, spec) {
            Ok(values) => set.extend(values),
            Err(fault) => {
                warn!(%field, chunk, %fault, "substituting field minimum");
                faults.push(ExpressionFault::Parse { field, fault });
                set.insert(spec.min);
            }
        }
    }

    if spec.wrap && set.remove(&7) {
        set.insert(0);
    }

    if let (Some(&lowest), Some(&highest)) = (set.iter().next(), set.iter().next_back()) {
        if lowest < spec.min || highest > spec.max {
            let fault = RangeFault {
                lowest,
                highest,
                min: spec.min,
                max: spec.max,
            };
            info!(%field, field_value = value, %fault, "keeping out of bounds values");
            faults.push(ExpressionFault::Range { field, fault });
        }
    }

    (MatchSet(set), faults)
}

fn parse_chunk(chunk: &str, spec: &FieldSpec) -> Result<impl Iterator<Item = u32>, ParseFault> {
    let mut step_iter = chunk.splitn(2, '/');
    let range_part = step_iter.next().unwrap_or_default();
    let step = step_iter
        .next()
        .map(|step| parse_step(step, chunk, spec))
        .transpose()?;

    let mut dash_iter = range_part.splitn(2, '-');
    let left = dash_iter.next().unwrap_or_default();
    let right = dash_iter.next();

    let (start, end) = match (left, right) {
        ("*", None) => (spec.min, spec.max),
        (value, None) => {
            let v = parse_time_unit(value, chunk, spec)?;
            match step {
                Some(_) => (v, spec.max.max(v)),
                None => (v, v),
            }
        }
        (left, Some(right)) => {
            let l = parse_time_unit(left, chunk, spec)?;
            let r = parse_time_unit(right, chunk, spec)?;
            if r < l {
                return Err(ParseFault::InvalidRange(chunk.into()));
            }
            (l, r)
        }
    };

    let step = step.unwrap_or(1);
    Ok((start..=end).filter(move |v| (v - start) % step == 0))
}

fn parse_time_unit(value: &str, chunk: &str, spec: &FieldSpec) -> Result<u32, ParseFault> {
    if let Some(n) = spec.alias(value) {
        return Ok(n);
    }
    match value.parse::<u32>() {
        Ok(n) if n <= LITERAL_CEILING => Ok(n),
        _ => Err(ParseFault::InvalidValue(chunk.into())),
    }
}

fn parse_step(value: &str, chunk: &str, spec: &FieldSpec) -> Result<u32, ParseFault> {
    match value.parse::<u32>() {
        Ok(step) if step >= 1 && step <= spec.max - spec.min + 1 => Ok(step),
        _ => Err(ParseFault::InvalidStep(chunk.into())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{MAX_YEAR, MIN_YEAR};
    use proptest::prelude::*;

    fn values(value: &str, field: Field) -> Vec<u32> {
        parse_field(value, field).0.to_vec()
    }

    #[test]
    fn parse_invalid() {
        let (set, faults) = parse_field("invalid", Field::Minutes);
        assert_eq!(vec![0], set.to_vec());
        assert_eq!(
            vec![ExpressionFault::Parse {
                field: Field::Minutes,
                fault: ParseFault::InvalidValue("invalid".into())
            }],
            faults
        );
    }

    #[test]
    fn parse_bad_chunk_keeps_the_rest() {
        let (set, faults) = parse_field("10-5,20", Field::Hours);
        assert_eq!(vec![0, 20], set.to_vec());
        assert_eq!(1, faults.len());

        let (set, faults) = parse_field("5,x,30", Field::DaysOfMonth);
        assert_eq!(vec![1, 5, 30], set.to_vec());
        assert_eq!(1, faults.len());
    }

    #[test]
    fn parse_seconds_minutes() {
        assert_eq!((0..=58).collect::<Vec<_>>(), values("0-58", Field::Seconds));
        assert_eq!((0..=59).collect::<Vec<_>>(), values("*", Field::Seconds));
        assert_eq!(vec![0, 15, 30, 45], values("*/15", Field::Minutes));
        assert_eq!(vec![5, 20, 35, 50], values("5/15", Field::Minutes));
        assert_eq!(vec![10, 13, 16, 19], values("10-20/3", Field::Minutes));
    }

    #[test]
    fn parse_steps() {
        assert_eq!(
            (0..=59).step_by(2).collect::<Vec<_>>(),
            values("0-59/2", Field::Seconds)
        );
        let (set, faults) = parse_field("*/0", Field::Minutes);
        assert_eq!(vec![0], set.to_vec());
        assert_eq!(
            vec![ExpressionFault::Parse {
                field: Field::Minutes,
                fault: ParseFault::InvalidStep("*/0".into())
            }],
            faults
        );
        let (_, faults) = parse_field("*/61", Field::Minutes);
        assert_eq!(1, faults.len());
        let (_, faults) = parse_field("*/x", Field::Minutes);
        assert_eq!(1, faults.len());
    }

    #[test]
    fn parse_months() {
        assert_eq!((1..=12).collect::<Vec<_>>(), values("JAN-DEC", Field::Months));
        assert_eq!(vec![2, 3, 4], values("FEB-APR", Field::Months));
        assert_eq!(vec![2, 3, 4], values("2-APR", Field::Months));
        assert_eq!(vec![2, 4, 11], values("FEB-APR/2,NOV", Field::Months));
        let (set, faults) = parse_field("feb", Field::Months);
        assert_eq!(vec![1], set.to_vec());
        assert_eq!(1, faults.len());
    }

    #[test]
    fn parse_days_of_week() {
        assert_eq!(vec![0], values("SUN", Field::DaysOfWeek));
        assert_eq!(vec![0], values("7", Field::DaysOfWeek));
        assert_eq!(vec![0, 5, 6], values("FRI-7", Field::DaysOfWeek));
        assert_eq!((0..=6).collect::<Vec<_>>(), values("*", Field::DaysOfWeek));
        assert_eq!((0..=6).collect::<Vec<_>>(), values("0-7", Field::DaysOfWeek));
    }

    #[test]
    fn parse_years() {
        assert_eq!(
            (1980..=2000).collect::<Vec<_>>(),
            values("1980-2000", Field::Years)
        );
        assert_eq!(
            (MIN_YEAR..=MAX_YEAR).step_by(2).collect::<Vec<_>>(),
            values("*/2", Field::Years)
        );
    }

    #[test]
    fn out_of_bounds_values_are_kept() {
        let (set, faults) = parse_field("10,75", Field::Minutes);
        assert_eq!(vec![10, 75], set.to_vec());
        assert_eq!(
            vec![ExpressionFault::Range {
                field: Field::Minutes,
                fault: RangeFault {
                    lowest: 10,
                    highest: 75,
                    min: 0,
                    max: 59
                }
            }],
            faults
        );
        let (set, faults) = parse_field("1969", Field::Years);
        assert_eq!(vec![1969], set.to_vec());
        assert_eq!(1, faults.len());
        assert_eq!(vec![70], values("70/5", Field::Minutes));
    }

    #[test]
    fn parse_full_wildcard() {
        let expression = Expression::parse("* * * * * * *");
        for field in Field::ALL {
            let spec = field.spec();
            assert_eq!(
                (spec.min..=spec.max).collect::<Vec<_>>(),
                expression.field(field).to_vec()
            );
        }
    }

    #[test]
    fn parse_optional_year() {
        let with_year = Expression::parse("*/5 * * * * * *");
        let without_year = Expression::parse("*/5 * * * * *");
        assert_eq!(with_year, without_year);
    }

    #[test]
    fn parse_short_expression_fills_leading_defaults() {
        let expression = Expression::parse("30 9 * * MON");
        assert_eq!(vec![0], expression.field(Field::Seconds).to_vec());
        assert_eq!(vec![30], expression.field(Field::Minutes).to_vec());
        assert_eq!(vec![9], expression.field(Field::Hours).to_vec());
        assert_eq!(vec![1], expression.field(Field::DaysOfWeek).to_vec());
        assert_eq!(
            (MIN_YEAR..=MAX_YEAR).collect::<Vec<_>>(),
            expression.field(Field::Years).to_vec()
        );

        assert_eq!(Expression::parse("0 0 0 * * *"), Expression::parse(""));
        assert_eq!(Expression::parse("0 0 0 * * WED"), Expression::parse("WED"));
    }

    #[test]
    fn parse_too_many_fields() {
        let (expression, faults) = Expression::parse_with_faults("0 0 0 * * * * extra");
        assert_eq!(Expression::parse("0 0 0 * * * *"), expression);
        assert_eq!(
            vec![ExpressionFault::Parse {
                field: Field::Years,
                fault: ParseFault::TooManyFields(8)
            }],
            faults
        );
    }

    #[test]
    fn from_str_is_strict() {
        assert!("0 30 9 1,15 MAY-AUG MON,WED,FRI 2018/2"
            .parse::<Expression>()
            .is_ok());
        assert!("0 75 * * * *".parse::<Expression>().is_ok());
        assert_eq!(
            Err(ParseScheduleError {
                field: Field::Hours,
                fault: ParseFault::InvalidRange("20-10".into())
            }),
            "0 0 20-10 * * *".parse::<Expression>()
        );
    }

    proptest! {
        #[test]
        fn lenient_parse_never_yields_empty_sets(text in "[0-9*/,A-Z-]{0,12}( [0-9*/,A-Z-]{1,8}){0,6}") {
            let expression = Expression::parse(&text);
            for field in Field::ALL {
                prop_assert!(!expression.field(field).is_empty());
            }
        }

        #[test]
        fn in_bounds_literals_stay_in_bounds(start in 0u32..60, len in 0u32..60, step in 1u32..=60) {
            let end = (start + len).min(59);
            let (set, faults) = parse_field(&format!("{}-{}/{}", start, end, step), Field::Minutes);
            prop_assert!(faults.is_empty());
            prop_assert_eq!(Some(start), set.min());
            prop_assert!(set.max().unwrap() <= 59);
        }
    }
}
