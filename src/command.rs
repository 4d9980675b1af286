use chrono::NaiveDate;
use nom::{
    branch::alt,
    bytes::complete::{tag, take_while1},
    character::complete::{char, digit1, space1},
    combinator::{all_consuming, map, map_opt, map_res, opt, recognize, verify},
    sequence::{pair, preceded, tuple},
    IResult,
};
use phf::phf_map;

use crate::error::{Error, ErrorKind, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Prev,
    Next,
    /// Day of the displayed month.
    Select(u32),
    Goto(NaiveDate),
    Show,
    Quit,
}

static KEYWORDS: phf::Map<&'static str, Command> = phf_map! {
    "<" => Command::Prev,
    "p" => Command::Prev,
    "prev" => Command::Prev,
    ">" => Command::Next,
    "n" => Command::Next,
    "next" => Command::Next,
    "show" => Command::Show,
    "q" => Command::Quit,
    "quit" => Command::Quit,
};

fn keyword(input: &str) -> IResult<&str, Command> {
    map_opt(take_while1(|c: char| !c.is_whitespace()), |word: &str| {
        KEYWORDS.get(word).copied()
    })(input)
}

fn day(input: &str) -> IResult<&str, Command> {
    map(
        verify(map_res(digit1, str::parse::<u32>), |d: &u32| (1..=31).contains(d)),
        Command::Select,
    )(input)
}

fn number<T: std::str::FromStr>(input: &str) -> IResult<&str, T> {
    map_res(recognize(pair(opt(char('-')), digit1)), str::parse::<T>)(input)
}

/// `YYYY-MM` or `YYYY-MM-DD`.
fn date(input: &str) -> IResult<&str, NaiveDate> {
    map_opt(
        tuple((
            number::<i32>,
            preceded(char('-'), map_res(digit1, str::parse::<u32>)),
            opt(preceded(char('-'), map_res(digit1, str::parse::<u32>))),
        )),
        |(year, month, day)| NaiveDate::from_ymd_opt(year, month, day.unwrap_or(1)),
    )(input)
}

fn goto(input: &str) -> IResult<&str, Command> {
    map(preceded(pair(tag("goto"), space1), date), Command::Goto)(input)
}

pub fn parse_command(line: &str) -> Result<Command> {
    let line = line.trim();
    all_consuming(alt((goto, day, keyword)))(line)
        .map(|(_, cmd)| cmd)
        .map_err(|e: nom::Err<nom::error::Error<&str>>| {
            Error::from(e).with_msg(&format!("unknown command '{}'", line))
        })
}

pub fn parse_date(input: &str) -> Result<NaiveDate> {
    let input = input.trim();
    all_consuming(date)(input)
        .map(|(_, date)| date)
        .map_err(|_: nom::Err<nom::error::Error<&str>>| {
            Error::new(ErrorKind::DateParse, &format!("'{}' is not a valid date", input))
        })
}
