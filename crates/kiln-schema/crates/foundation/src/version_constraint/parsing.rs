// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

use nom::branch::alt;
use nom::bytes::complete::take_while1;
use nom::character::complete::char;
use nom::combinator::{map, opt};
use nom::error::ParseError;
use nom::multi::separated_list1;
use nom::sequence::{preceded, separated_pair};
use nom::IResult;

use crate::version::VERSION_SEPARATORS;

/// One comma separated item of a constraint, before its
/// versions have been validated.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RawItem<'a> {
    Prefix(&'a str),
    Exact(&'a str),
    Range(Option<&'a str>, Option<&'a str>),
}

pub fn is_version_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || VERSION_SEPARATORS.contains(&c)
}

/// Recognize the text of a single version.
pub fn version_str<'a, E>(input: &'a str) -> IResult<&'a str, &'a str, E>
where
    E: ParseError<&'a str>,
{
    take_while1(is_version_char)(input)
}

fn constraint_item<'a, E>(input: &'a str) -> IResult<&'a str, RawItem<'a>, E>
where
    E: ParseError<&'a str>,
{
    alt((
        map(preceded(char('='), version_str), RawItem::Exact),
        map(
            separated_pair(opt(version_str), char(':'), opt(version_str)),
            |(lower, upper)| RawItem::Range(lower, upper),
        ),
        map(version_str, RawItem::Prefix),
    ))(input)
}

/// Recognize a comma separated version constraint, eg `:4.2.3,5:6.1.1`.
pub fn version_constraint<'a, E>(input: &'a str) -> IResult<&'a str, Vec<RawItem<'a>>, E>
where
    E: ParseError<&'a str>,
{
    separated_list1(char(','), constraint_item)(input)
}
