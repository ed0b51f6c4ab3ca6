// Copyright (c) Contributors to the SPK project.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/spkenv/spk

//! Parsers for the spec syntax shared by requests and predicates.
//!
//! ```text
//! bazel@4.0.0:+nodepfail %gcc@9: platform=linux target=x86_64 ^java@11
//! ```
//!
//! Parsing yields raw text for every version so that version errors can
//! be reported as such once the overall syntax has been accepted.

use nom::IResult;
use nom::branch::alt;
use nom::bytes::complete::take_while1;
use nom::character::complete::{char, multispace0};
use nom::combinator::{all_consuming, map, opt};
use nom::error::{ContextError, ParseError, VerboseError, context, convert_error};
use nom::multi::many0;
use nom::sequence::{delimited, pair, preceded, separated_pair, terminated, tuple};

use crate::foundation::name::{is_pkg_name_char, is_variant_name_char};
use crate::foundation::version_constraint::parsing::{RawItem, version_constraint};
use crate::{Error, Result};

#[cfg(test)]
#[path = "./parsing_test.rs"]
mod parsing_test;

/// One clause of a spec, before validation.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RawClause<'a> {
    Versions(Vec<RawItem<'a>>),
    Flag(&'a str, bool),
    KeyValue(&'a str, &'a str),
    Compiler(&'a str, Option<Vec<RawItem<'a>>>),
}

/// A parsed spec, before validation.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RawSpec<'a> {
    pub name: Option<&'a str>,
    pub clauses: Vec<RawClause<'a>>,
    pub dependencies: Vec<RawSpec<'a>>,
}

fn is_value_char(c: char) -> bool {
    !(c.is_whitespace() || "^%@+~=".contains(c))
}

fn pkg_name<'a, E>(input: &'a str) -> IResult<&'a str, &'a str, E>
where
    E: ParseError<&'a str> + ContextError<&'a str>,
{
    context("package name", take_while1(is_pkg_name_char))(input)
}

fn variant_name<'a, E>(input: &'a str) -> IResult<&'a str, &'a str, E>
where
    E: ParseError<&'a str> + ContextError<&'a str>,
{
    context("variant name", take_while1(is_variant_name_char))(input)
}

fn clause<'a, E>(input: &'a str) -> IResult<&'a str, RawClause<'a>, E>
where
    E: ParseError<&'a str> + ContextError<&'a str>,
{
    preceded(
        multispace0,
        alt((
            context(
                "version constraint",
                map(preceded(char('@'), version_constraint), RawClause::Versions),
            ),
            map(preceded(char('+'), variant_name), |n| RawClause::Flag(n, true)),
            map(preceded(char('~'), variant_name), |n| RawClause::Flag(n, false)),
            context(
                "compiler",
                map(
                    preceded(
                        pair(char('%'), multispace0),
                        pair(pkg_name, opt(preceded(char('@'), version_constraint))),
                    ),
                    |(name, versions)| RawClause::Compiler(name, versions),
                ),
            ),
            map(
                separated_pair(variant_name, char('='), take_while1(is_value_char)),
                |(k, v)| RawClause::KeyValue(k, v),
            ),
        )),
    )(input)
}

fn named_spec<'a, E>(input: &'a str) -> IResult<&'a str, RawSpec<'a>, E>
where
    E: ParseError<&'a str> + ContextError<&'a str>,
{
    map(pair(pkg_name, many0(clause)), |(name, clauses)| RawSpec {
        name: Some(name),
        clauses,
        dependencies: Vec::new(),
    })(input)
}

fn dependency<'a, E>(input: &'a str) -> IResult<&'a str, RawSpec<'a>, E>
where
    E: ParseError<&'a str> + ContextError<&'a str>,
{
    context(
        "dependency",
        preceded(tuple((multispace0, char('^'), multispace0)), named_spec),
    )(input)
}

/// Parse a full request, eg `app@2:+newlib ^lib@3`.
pub fn request<'a, E>(input: &'a str) -> IResult<&'a str, RawSpec<'a>, E>
where
    E: ParseError<&'a str> + ContextError<&'a str>,
{
    map(
        delimited(multispace0, pair(named_spec, many0(dependency)), multispace0),
        |(mut root, dependencies)| {
            root.dependencies = dependencies;
            root
        },
    )(input)
}

/// Parse an anonymous spec, eg `@3.0:6+foo %gcc platform=linux`.
pub fn predicate<'a, E>(input: &'a str) -> IResult<&'a str, RawSpec<'a>, E>
where
    E: ParseError<&'a str> + ContextError<&'a str>,
{
    map(terminated(many0(clause), multispace0), |clauses| RawSpec {
        name: None,
        clauses,
        dependencies: Vec::new(),
    })(input)
}

/// Run one of the parsers above over an entire string.
pub fn parse_all<'a, F>(input: &'a str, parser: F) -> Result<RawSpec<'a>>
where
    F: FnMut(&'a str) -> IResult<&'a str, RawSpec<'a>, VerboseError<&'a str>>,
{
    all_consuming(parser)(input)
        .map(|(_, spec)| spec)
        .map_err(|err| {
            let message = match err {
                nom::Err::Error(e) | nom::Err::Failure(e) => convert_error(input, e),
                nom::Err::Incomplete(_) => "unexpected end of input".to_string(),
            };
            Error::InvalidSpec {
                spec: input.to_string(),
                message,
            }
        })
}
