//! Whitespace-delimited field parsers shared by the text readers.
//!
//! Every helper parses one complete token with `nom` and returns the offending
//! token in its error message; callers attach the line or table position.
//! Real values must be finite: `nan`, `inf` and `infinity` are rejected.
use nom::{
    character::complete::char,
    combinator::{all_consuming, map, opt},
    error::Error as NomError,
    number::complete::double,
    IResult, Parser,
};

fn float64(input: &str) -> IResult<&str, f64> {
    double(input)
}

fn int32(input: &str) -> IResult<&str, i32> {
    nom::character::complete::i32(input)
}

fn int64(input: &str) -> IResult<&str, i64> {
    nom::character::complete::i64(input)
}

fn uint32(input: &str) -> IResult<&str, u32> {
    nom::character::complete::u32(input)
}

fn reference_marker(input: &str) -> IResult<&str, bool> {
    map(opt(char('R')), |r| r.is_some()).parse(input)
}

fn whole_token<'a, O, P>(token: &'a str, parser: P, what: &str) -> Result<O, String>
where
    P: Parser<&'a str, Output = O, Error = NomError<&'a str>>,
{
    all_consuming(parser)
        .parse(token)
        .map(|(_, value)| value)
        .map_err(|_| format!("expected {what}, found '{token}'"))
}

fn finite(value: f64, token: &str, what: &str) -> Result<f64, String> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(format!("expected {what}, found non-finite '{token}'"))
    }
}

pub(crate) fn real(token: &str) -> Result<f64, String> {
    finite(whole_token(token, float64, "a number")?, token, "a finite number")
}

pub(crate) fn integer(token: &str) -> Result<i32, String> {
    whole_token(token, int32, "an integer")
}

pub(crate) fn long(token: &str) -> Result<i64, String> {
    whole_token(token, int64, "an integer timestamp")
}

pub(crate) fn count(token: &str) -> Result<u32, String> {
    whole_token(token, uint32, "a non-negative integer")
}

/// Amplitude ratio with its optional reference marker, e.g. `0.0029` or `0.0029R`.
pub(crate) fn ratio(token: &str) -> Result<(f64, bool), String> {
    let (value, reference) =
        whole_token(token, (float64, reference_marker), "an amplitude ratio")?;
    Ok((finite(value, token, "a finite amplitude ratio")?, reference))
}
