use chrono::{Datelike, Duration, Local, Month, NaiveDate};
use derive_more::Constructor;
use num_traits::FromPrimitive;
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Sub};

/// Sunday first.
pub const WEEKDAY_LABELS: [&str; 7] = ["Su", "Mo", "Tu", "We", "Th", "Fr", "Sa"];

fn is_leap_year(year: i32) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

pub fn days_of_month(month: &Month, year: i32) -> u32 {
    match month {
        Month::February if is_leap_year(year) => 29,
        Month::February => 28,
        Month::April | Month::June | Month::September | Month::November => 30,
        _ => 31,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Prev,
    Next,
}

/// A year and month pair. This is the whole state a date picker keeps about
/// what it displays.
///
/// The year is clamped to the range chrono can represent, so month
/// arithmetic saturates at the first and last supported month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthIndex {
    index: Month,
    year: i32,
}

impl MonthIndex {
    pub fn new(index: Month, year: i32) -> Self {
        let year = year.clamp(NaiveDate::MIN.year(), NaiveDate::MAX.year());
        MonthIndex { index, year }
    }

    /// `month0` is taken modulo 12 without touching the year.
    pub fn from_month0(month0: u32, year: i32) -> Self {
        let month = Month::from_u32(month0 % 12 + 1).unwrap_or(Month::January);
        MonthIndex::new(month, year)
    }

    pub fn month(&self) -> Month {
        self.index
    }

    /// Zero based month, January is 0.
    pub fn month0(&self) -> u32 {
        self.index.number_from_month() - 1
    }

    /// One based month, January is 1.
    pub fn number(&self) -> u32 {
        self.index.number_from_month()
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn name(&self) -> &'static str {
        self.index.name()
    }

    pub fn label(&self) -> String {
        format!("{} {}", self.name(), self.year)
    }

    pub fn first_day(&self) -> NaiveDate {
        // exists for every clamped year
        NaiveDate::from_ymd_opt(self.year, self.number(), 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn num_days(&self) -> u32 {
        days_of_month(&self.index, self.year)
    }

    pub fn contains<T: Datelike>(&self, date: &T) -> bool {
        date.year() == self.year && date.month() == self.number()
    }

    pub fn next(&self) -> Self {
        *self + 1
    }

    pub fn prev(&self) -> Self {
        *self - 1
    }

    pub fn navigate(&self, direction: Direction) -> Self {
        match direction {
            Direction::Prev => self.prev(),
            Direction::Next => self.next(),
        }
    }

    fn ordinal(&self) -> i64 {
        self.year as i64 * 12 + self.month0() as i64
    }

    fn from_ordinal(ordinal: i64) -> Self {
        let min = NaiveDate::MIN.year() as i64 * 12 + NaiveDate::MIN.month0() as i64;
        let max = NaiveDate::MAX.year() as i64 * 12 + NaiveDate::MAX.month0() as i64;
        let ordinal = ordinal.clamp(min, max);
        MonthIndex::from_month0(
            ordinal.rem_euclid(12) as u32,
            ordinal.div_euclid(12) as i32,
        )
    }
}

impl Default for MonthIndex {
    fn default() -> Self {
        MonthIndex::from(Local::now().date_naive())
    }
}

impl<T: Datelike> From<T> for MonthIndex {
    fn from(m: T) -> Self {
        MonthIndex::from_month0(m.month0(), m.year())
    }
}

impl Add<u32> for MonthIndex {
    type Output = MonthIndex;
    fn add(self, rhs: u32) -> Self::Output {
        MonthIndex::from_ordinal(self.ordinal() + rhs as i64)
    }
}

impl Sub<u32> for MonthIndex {
    type Output = MonthIndex;
    fn sub(self, rhs: u32) -> Self::Output {
        MonthIndex::from_ordinal(self.ordinal() - rhs as i64)
    }
}

impl PartialOrd for MonthIndex {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for MonthIndex {
    fn cmp(&self, other: &Self) -> Ordering {
        self.ordinal().cmp(&other.ordinal())
    }
}

impl fmt::Display for MonthIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name(), self.year)
    }
}

/// What a picked day reports back. `month` is one based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Constructor)]
pub struct Selection {
    pub month: u32,
    pub day: u32,
    pub year: i32,
}

impl Selection {
    pub fn to_date(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day)
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayCell {
    day_num: u8,
    date: Option<NaiveDate>,
    selection: Option<Selection>,
}

impl DayCell {
    pub fn day_num(&self) -> u8 {
        self.day_num
    }

    /// `None` for filler days beyond the range chrono can represent.
    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    pub fn in_current_month(&self) -> bool {
        self.selection.is_some()
    }

    /// Only set for days of the displayed month.
    pub fn selection(&self) -> Option<Selection> {
        self.selection
    }
}

pub type Week = [DayCell; 7];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarGrid {
    month: MonthIndex,
    rows: Vec<Week>,
}

impl CalendarGrid {
    pub const COLUMNS: usize = 7;
    pub const MAX_ROWS: usize = 6;

    pub fn month(&self) -> MonthIndex {
        self.month
    }

    pub fn rows(&self) -> &[Week] {
        &self.rows
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn cells(&self) -> impl Iterator<Item = &DayCell> + '_ {
        self.rows.iter().flat_map(|row| row.iter())
    }

    pub fn current_month_cells(&self) -> impl Iterator<Item = &DayCell> + '_ {
        self.cells().filter(|cell| cell.in_current_month())
    }
}

/// Lays out `month` as weeks starting on Sunday.
///
/// The first row starts on the Sunday on or before the 1st. Every later row
/// is only emitted while its first day still belongs to `month`, which gives
/// four to six rows.
///
/// The cursor is kept as a day offset from the 1st, so filler days at the
/// edges of chrono's range still get their day numbers.
pub fn build_grid(month: MonthIndex) -> CalendarGrid {
    let first = month.first_day();
    let offset = first.weekday().num_days_from_sunday() as i64;
    let num_days = month.num_days() as i64;
    let prev_num_days = if month.number() == 1 {
        days_of_month(&Month::December, month.year() - 1)
    } else {
        days_of_month(&month.month().pred(), month.year())
    } as i64;

    let cell_at = |cursor: i64| {
        let date = first.checked_add_signed(Duration::days(cursor));
        if cursor < 0 {
            DayCell {
                day_num: (prev_num_days + cursor + 1) as u8,
                date,
                selection: None,
            }
        } else if cursor < num_days {
            let day = cursor as u32 + 1;
            DayCell {
                day_num: day as u8,
                date,
                selection: Some(Selection::new(month.month0() + 1, day, month.year())),
            }
        } else {
            DayCell {
                day_num: (cursor - num_days + 1) as u8,
                date,
                selection: None,
            }
        }
    };

    let mut rows = Vec::with_capacity(CalendarGrid::MAX_ROWS);
    for row in 0..CalendarGrid::MAX_ROWS {
        let row_start = (row * CalendarGrid::COLUMNS) as i64 - offset;
        if row > 0 && !(0..num_days).contains(&row_start) {
            break;
        }

        let week: Week = std::array::from_fn(|col| cell_at(row_start + col as i64));
        rows.push(week);
    }

    CalendarGrid { month, rows }
}
